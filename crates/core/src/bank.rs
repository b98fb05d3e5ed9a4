//! Bundled, read-only question bank.

use crate::model::{Category, Difficulty, Question, QuestionDraft, QuestionError};

/// Anything that can hand out the questions for a category/difficulty pair.
pub trait QuestionProvider: Send + Sync {
    /// Every question matching both keys exactly, in bank order.
    fn questions_for(&self, category: Category, difficulty: Difficulty) -> Vec<Question>;
}

/// Static collection of validated questions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank from drafts, validating each one.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionError` encountered.
    pub fn from_drafts(
        drafts: impl IntoIterator<Item = QuestionDraft>,
    ) -> Result<Self, QuestionError> {
        let questions = drafts
            .into_iter()
            .map(QuestionDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { questions })
    }

    #[must_use]
    pub fn from_questions(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// The OSM trivia and tag puzzle sets shipped with the game.
    ///
    /// # Panics
    ///
    /// Panics if the bundled data is malformed; the bank tests guard this.
    #[must_use]
    pub fn standard() -> Self {
        Self::from_drafts(standard_drafts()).expect("bundled questions should be valid")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn all(&self) -> &[Question] {
        &self.questions
    }

    pub fn matching(
        &self,
        category: Category,
        difficulty: Difficulty,
    ) -> impl Iterator<Item = &Question> {
        self.questions
            .iter()
            .filter(move |q| q.matches(category, difficulty))
    }
}

impl QuestionProvider for QuestionBank {
    fn questions_for(&self, category: Category, difficulty: Difficulty) -> Vec<Question> {
        self.matching(category, difficulty).cloned().collect()
    }
}

//
// ─── BUNDLED DATA ──────────────────────────────────────────────────────────────
//

struct BundledQuestion {
    id: &'static str,
    category: Category,
    difficulty: Difficulty,
    prompt: &'static str,
    options: [&'static str; 4],
    answer: &'static str,
    osm_tag: Option<&'static str>,
}

const fn trivia(
    id: &'static str,
    difficulty: Difficulty,
    prompt: &'static str,
    options: [&'static str; 4],
    answer: &'static str,
    osm_tag: Option<&'static str>,
) -> BundledQuestion {
    BundledQuestion {
        id,
        category: Category::OsmTrivia,
        difficulty,
        prompt,
        options,
        answer,
        osm_tag,
    }
}

/// Tag puzzles always carry their answer as the source tag.
const fn puzzle(
    id: &'static str,
    difficulty: Difficulty,
    prompt: &'static str,
    options: [&'static str; 4],
    answer: &'static str,
) -> BundledQuestion {
    BundledQuestion {
        id,
        category: Category::TagPuzzle,
        difficulty,
        prompt,
        options,
        answer,
        osm_tag: Some(answer),
    }
}

use Difficulty::{Easy, Hard, Medium};

const BUNDLED: &[BundledQuestion] = &[
    // OSM trivia: easy
    trivia(
        "osm-easy-1",
        Easy,
        "What does OSM stand for?",
        ["OpenStreetMap", "OpenSourceMap", "OnlineStreetMap", "OpenSatelliteMap"],
        "OpenStreetMap",
        None,
    ),
    trivia(
        "osm-easy-2",
        Easy,
        "What does amenity=cafe describe?",
        ["Cafe", "Restaurant", "Bar", "Shop"],
        "Cafe",
        Some("amenity=cafe"),
    ),
    trivia(
        "osm-easy-3",
        Easy,
        "Which key is used to tag shops?",
        ["shop", "store", "amenity", "retail"],
        "shop",
        Some("shop=*"),
    ),
    trivia(
        "osm-easy-4",
        Easy,
        "What does shop=bakery describe?",
        ["Bakery", "Supermarket", "Butcher", "Pharmacy"],
        "Bakery",
        Some("shop=bakery"),
    ),
    trivia(
        "osm-easy-5",
        Easy,
        "What does highway=footway mark?",
        ["A path for pedestrians", "A motorway", "A railway line", "A river"],
        "A path for pedestrians",
        Some("highway=footway"),
    ),
    trivia(
        "osm-easy-6",
        Easy,
        "Under which licence is OSM data published?",
        ["ODbL", "CC0", "GPL", "MIT"],
        "ODbL",
        None,
    ),
    // OSM trivia: medium
    trivia(
        "osm-medium-1",
        Medium,
        "Which element types make up OSM data?",
        [
            "Nodes, ways and relations",
            "Points, lines and polygons",
            "Tiles, layers and styles",
            "Rows, columns and tables",
        ],
        "Nodes, ways and relations",
        None,
    ),
    trivia(
        "osm-medium-2",
        Medium,
        "What does amenity=pharmacy describe?",
        ["Pharmacy", "Hospital", "Doctor's practice", "Drugstore warehouse"],
        "Pharmacy",
        Some("amenity=pharmacy"),
    ),
    trivia(
        "osm-medium-3",
        Medium,
        "What is a closed way tagged building=yes?",
        ["A building outline", "A roundabout", "An administrative boundary", "A parking lane"],
        "A building outline",
        Some("building=yes"),
    ),
    trivia(
        "osm-medium-4",
        Medium,
        "In which year was OpenStreetMap founded?",
        ["2004", "1999", "2008", "2012"],
        "2004",
        None,
    ),
    trivia(
        "osm-medium-5",
        Medium,
        "What does leisure=park describe?",
        ["Park", "Playground", "Sports pitch", "Garden centre"],
        "Park",
        Some("leisure=park"),
    ),
    trivia(
        "osm-medium-6",
        Medium,
        "Which key holds the primary name of a feature?",
        ["name", "label", "title", "addr:name"],
        "name",
        Some("name=*"),
    ),
    // OSM trivia: hard
    trivia(
        "osm-hard-1",
        Hard,
        "Which relation type groups the ways of a bus line?",
        ["type=route", "type=multipolygon", "type=boundary", "type=restriction"],
        "type=route",
        Some("type=route"),
    ),
    trivia(
        "osm-hard-2",
        Hard,
        "What does admin_level=2 usually denote?",
        ["A country border", "A municipality", "A state", "A district"],
        "A country border",
        Some("admin_level=2"),
    ),
    trivia(
        "osm-hard-3",
        Hard,
        "Who founded OpenStreetMap?",
        ["Steve Coast", "Linus Torvalds", "Tim Berners-Lee", "Jimmy Wales"],
        "Steve Coast",
        None,
    ),
    trivia(
        "osm-hard-4",
        Hard,
        "Which relation type models a turn restriction?",
        ["type=restriction", "type=route", "type=site", "type=multipolygon"],
        "type=restriction",
        Some("type=restriction"),
    ),
    trivia(
        "osm-hard-5",
        Hard,
        "What does oneway=-1 mean?",
        [
            "Traffic flows against the way direction",
            "Traffic flows in both directions",
            "No traffic is allowed",
            "The road has a single lane",
        ],
        "Traffic flows against the way direction",
        Some("oneway=-1"),
    ),
    // Tag puzzle: easy
    puzzle(
        "tag-easy-1",
        Easy,
        "Find the tag for a bakery",
        ["shop=bakery", "amenity=bakery", "shop=bread", "craft=baker"],
        "shop=bakery",
    ),
    puzzle(
        "tag-easy-2",
        Easy,
        "Find the tag for a cafe",
        ["amenity=cafe", "shop=cafe", "amenity=coffee", "leisure=cafe"],
        "amenity=cafe",
    ),
    puzzle(
        "tag-easy-3",
        Easy,
        "Find the tag for a bench",
        ["amenity=bench", "leisure=bench", "highway=bench", "man_made=bench"],
        "amenity=bench",
    ),
    puzzle(
        "tag-easy-4",
        Easy,
        "Find the tag for a supermarket",
        ["shop=supermarket", "amenity=supermarket", "shop=grocery_store", "building=supermarket"],
        "shop=supermarket",
    ),
    puzzle(
        "tag-easy-5",
        Easy,
        "Find the tag for a post box",
        ["amenity=post_box", "amenity=mailbox", "shop=post", "amenity=post_office"],
        "amenity=post_box",
    ),
    // Tag puzzle: medium
    puzzle(
        "tag-medium-1",
        Medium,
        "Find the tag for a football pitch",
        ["leisure=pitch", "sport=soccer", "amenity=sports", "sport=field"],
        "leisure=pitch",
    ),
    puzzle(
        "tag-medium-2",
        Medium,
        "Find the tag for a drinking water fountain",
        ["amenity=drinking_water", "man_made=fountain", "amenity=water_point", "natural=spring"],
        "amenity=drinking_water",
    ),
    puzzle(
        "tag-medium-3",
        Medium,
        "Find the tag for bicycle parking",
        ["amenity=bicycle_parking", "amenity=parking", "highway=cycleway", "shop=bicycle"],
        "amenity=bicycle_parking",
    ),
    puzzle(
        "tag-medium-4",
        Medium,
        "Find the tag for a playground",
        ["leisure=playground", "amenity=playground", "leisure=park", "landuse=recreation_ground"],
        "leisure=playground",
    ),
    puzzle(
        "tag-medium-5",
        Medium,
        "Find the tag for a recycling container",
        ["amenity=recycling", "amenity=waste_basket", "landuse=landfill", "amenity=waste_disposal"],
        "amenity=recycling",
    ),
    // Tag puzzle: hard
    puzzle(
        "tag-hard-1",
        Hard,
        "Find the tag for a public defibrillator",
        ["emergency=defibrillator", "amenity=defibrillator", "healthcare=aed", "emergency=aed"],
        "emergency=defibrillator",
    ),
    puzzle(
        "tag-hard-2",
        Hard,
        "Find the tag for a road crossing a railway at grade",
        [
            "railway=level_crossing",
            "railway=crossing",
            "highway=crossing",
            "railway=road_crossing",
        ],
        "railway=level_crossing",
    ),
    puzzle(
        "tag-hard-3",
        Hard,
        "Find the tag for an electric vehicle charging station",
        ["amenity=charging_station", "amenity=fuel", "power=charger", "shop=charging"],
        "amenity=charging_station",
    ),
    puzzle(
        "tag-hard-4",
        Hard,
        "Find the tag for a raised hunting stand",
        ["amenity=hunting_stand", "leisure=hunting_stand", "man_made=tower", "tourism=viewpoint"],
        "amenity=hunting_stand",
    ),
    puzzle(
        "tag-hard-5",
        Hard,
        "Find the tag for a wayside cross",
        [
            "historic=wayside_cross",
            "man_made=cross",
            "amenity=place_of_worship",
            "historic=memorial",
        ],
        "historic=wayside_cross",
    ),
];

fn standard_drafts() -> impl Iterator<Item = QuestionDraft> {
    BUNDLED.iter().map(|q| QuestionDraft {
        id: q.id.to_owned(),
        category: q.category,
        difficulty: q.difficulty,
        prompt: q.prompt.to_owned(),
        options: q.options.iter().map(|o| (*o).to_owned()).collect(),
        correct_answer: q.answer.to_owned(),
        osm_tag: q.osm_tag.map(str::to_owned),
    })
}
