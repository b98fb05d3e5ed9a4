use std::fmt;
use std::io::{self, BufRead, Write};

use services::{AppConfig, AppServices, Clock, MinigameLoopService, PlayOutcome};
use storage::DEFAULT_HISTORY_LIMIT;
use trivia_core::model::{Category, Difficulty, Question, QuizSession, UserId};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingCommand,
    InvalidCategory { raw: String },
    InvalidDifficulty { raw: String },
    InvalidLimit { raw: String },
    InvalidUserId { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingCommand => write!(f, "missing command"),
            ArgsError::InvalidCategory { raw } => write!(f, "invalid --category value: {raw}"),
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value: {raw}")
            }
            ArgsError::InvalidLimit { raw } => write!(f, "invalid --limit value: {raw}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user value: {raw:?}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play    [--category <c>] [--difficulty <d>] [common]");
    eprintln!("  cargo run -p app -- history [--limit <n>] [common]");
    eprintln!("  cargo run -p app -- profile [common]");
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  --source <seed|mock|live|local>   Data source (default: seed)");
    eprintln!("  --user <id>                       Player id (default: seed-user-1)");
    eprintln!("  --db <sqlite_url>                 Database for the local source");
    eprintln!();
    eprintln!("Categories: osm_trivia, tag_puzzle. Difficulties: easy, medium, hard.");
    eprintln!();
    eprintln!("Configuration is read from trivia.toml and TRIVIA_* variables, e.g.");
    eprintln!("  TRIVIA_DATASOURCE, TRIVIA_ENABLED_FEATURES, TRIVIA_SUPABASE_URL,");
    eprintln!("  TRIVIA_SUPABASE_KEY, TRIVIA_DATABASE_URL, TRIVIA_USER_ID");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play {
        category: Category,
        difficulty: Difficulty,
    },
    History {
        limit: u32,
    },
    Profile,
}

struct Args {
    command: Command,
    source: Option<String>,
    user_id: Option<UserId>,
    db_url: Option<String>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let command_name = args.next().ok_or(ArgsError::MissingCommand)?;
        if matches!(command_name.as_str(), "--help" | "-h") {
            print_usage();
            std::process::exit(0);
        }

        let mut category = Category::OsmTrivia;
        let mut difficulty = Difficulty::Easy;
        let mut limit = DEFAULT_HISTORY_LIMIT;
        let mut source = None;
        let mut user_id = None;
        let mut db_url = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--category" => {
                    let value = require_value(&mut args, "--category")?;
                    category = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidCategory { raw: value.clone() })?;
                }
                "--difficulty" => {
                    let value = require_value(&mut args, "--difficulty")?;
                    difficulty = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDifficulty { raw: value.clone() })?;
                }
                "--limit" => {
                    let value = require_value(&mut args, "--limit")?;
                    limit = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidLimit { raw: value.clone() })?;
                }
                "--source" => source = Some(require_value(&mut args, "--source")?),
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    user_id = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?,
                    );
                }
                "--db" => db_url = Some(require_value(&mut args, "--db")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match command_name.as_str() {
            "play" => Command::Play {
                category,
                difficulty,
            },
            "history" => Command::History { limit },
            "profile" => Command::Profile,
            _ => return Err(ArgsError::UnknownArg(command_name)),
        };

        Ok(Self {
            command,
            source,
            user_id,
            db_url,
        })
    }

    fn apply(&self, config: &mut AppConfig) {
        if let Some(source) = &self.source {
            config.datasource.clone_from(source);
        }
        if let Some(user_id) = &self.user_id {
            config.user_id = user_id.as_str().to_owned();
        }
        if let Some(db_url) = &self.db_url {
            config.database_url.clone_from(db_url);
        }
    }
}

fn prompt_answer(question: &Question, input: &mut impl BufRead) -> io::Result<String> {
    let options = question.options();
    loop {
        print!("Answer [1-{}]: ", options.len());
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(String::new());
        }
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return Ok(options[n - 1].clone()),
            _ => println!("Pick a number between 1 and {}.", options.len()),
        }
    }
}

fn print_outcome(outcome: &PlayOutcome) {
    let result = &outcome.result;
    println!();
    println!(
        "Score {}/{} ({:.1}%) in {}s",
        result.correct_answers,
        result.total_questions,
        result.accuracy_rounded(),
        result.elapsed_secs
    );
    println!(
        "XP earned: {} (base {}, bonus {})",
        result.reward.total_xp, result.reward.base_xp, result.reward.bonus_xp
    );
    if let Some(profile) = &outcome.profile {
        println!(
            "{} is now level {} with {} total XP",
            profile.username, profile.level, profile.total_xp
        );
    }
}

/// Ask every remaining question, reading choices from `input`.
fn answer_session(
    loop_svc: &MinigameLoopService,
    mut session: QuizSession,
    input: &mut impl BufRead,
) -> Result<QuizSession, Box<dyn std::error::Error>> {
    while let Some(question) = session.current_question().cloned() {
        println!();
        println!(
            "Q{}. {}",
            session.current_question_index() + 1,
            question.prompt()
        );
        for (i, option) in question.options().iter().enumerate() {
            println!("  {}) {option}", i + 1);
        }

        let answer = prompt_answer(&question, input)?;
        let next = loop_svc.answer(&session, question.id(), &answer)?;
        if next.score() > session.score() {
            println!("Correct!");
        } else {
            println!("The answer was {}.", question.correct_answer());
        }
        session = next;
    }
    Ok(session)
}

async fn play(
    loop_svc: &MinigameLoopService,
    user_id: &UserId,
    category: Category,
    difficulty: Difficulty,
) -> Result<(), Box<dyn std::error::Error>> {
    let session: QuizSession = loop_svc.start(category, difficulty).await?;
    println!(
        "{category} / {difficulty}: {} questions",
        session.total_questions()
    );

    // The stdin lock must not be held across the await below.
    let session = answer_session(loop_svc, session, &mut io::stdin().lock())?;

    let outcome = loop_svc.finish(user_id, &session).await?;
    print_outcome(&outcome);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut config = AppConfig::load_with_dotenv()?;
    args.apply(&mut config);

    let app = AppServices::from_config(&config, Clock::default_clock()).await?;
    let loop_svc = app.minigames();
    let user_id = app.user_id();

    match args.command {
        Command::Play {
            category,
            difficulty,
        } => play(&loop_svc, user_id, category, difficulty).await?,
        Command::History { limit } => {
            let history = loop_svc.history(user_id, limit).await?;
            if history.is_empty() {
                println!("No sessions yet for {user_id}.");
            }
            for record in history {
                println!(
                    "{}  {:<10} {:<6} {}/{}  {:>5.1}%  {:>4}s  +{} XP",
                    record.completed_at.format("%Y-%m-%d %H:%M"),
                    record.category.as_str(),
                    record.difficulty.as_str(),
                    record.score,
                    record.total_questions,
                    record.accuracy,
                    record.elapsed_secs,
                    record.xp_earned
                );
            }
        }
        Command::Profile => match loop_svc.profile(user_id).await? {
            Some(profile) => println!(
                "{} ({}): level {}, {} XP, {} total XP",
                profile.username, profile.id, profile.level, profile.xp, profile.total_xp
            ),
            None => println!("No profile for {user_id} in the {} source.", app.mode()),
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(args.iter().map(|s| (*s).to_owned()))
    }

    #[test]
    fn play_flags_are_parsed() {
        let args = parse(&["play", "--category", "tag-puzzle", "--difficulty", "HARD"]).unwrap();
        assert_eq!(
            args.command,
            Command::Play {
                category: Category::TagPuzzle,
                difficulty: Difficulty::Hard
            }
        );
    }

    #[test]
    fn overrides_are_applied_to_config() {
        let args = parse(&["history", "--limit", "3", "--source", "mock", "--user", "mock-user-1"])
            .unwrap();
        assert_eq!(args.command, Command::History { limit: 3 });

        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config.datasource, "mock");
        assert_eq!(config.user_id, "mock-user-1");
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(matches!(parse(&[]), Err(ArgsError::MissingCommand)));
        assert!(matches!(
            parse(&["play", "--difficulty", "extreme"]),
            Err(ArgsError::InvalidDifficulty { .. })
        ));
        assert!(matches!(
            parse(&["history", "--limit"]),
            Err(ArgsError::MissingValue { flag: "--limit" })
        ));
        assert!(matches!(parse(&["dance"]), Err(ArgsError::UnknownArg(_))));
    }

    #[tokio::test]
    async fn a_session_is_answered_from_input() {
        use std::sync::Arc;
        use services::MinigameEngine;
        use storage::memory::{MOCK_USER_ID, MockMinigameSource, MockUserSource};
        use storage::repository::DataSources;

        let sources = DataSources::new(
            Arc::new(MockMinigameSource::new()),
            Arc::new(MockUserSource::new()),
        );
        let loop_svc = MinigameLoopService::new(Arc::new(MinigameEngine::standard()), sources);
        let session = loop_svc
            .start(Category::TagPuzzle, Difficulty::Hard)
            .await
            .unwrap();

        let mut input = io::Cursor::new(b"1\n1\n1\n2\n".to_vec());
        let session = answer_session(&loop_svc, session, &mut input).unwrap();
        assert!(session.is_exhausted());
        assert_eq!(session.score(), 3);

        let outcome = loop_svc
            .finish(&UserId::new(MOCK_USER_ID), &session)
            .await
            .unwrap();
        assert_eq!(outcome.result.correct_answers, 3);
    }

    #[test]
    fn answers_are_read_by_number() {
        let question = trivia_core::bank::QuestionBank::standard().all()[0].clone();
        let mut input = io::Cursor::new(b"9\nx\n2\n".to_vec());
        let answer = prompt_answer(&question, &mut input).unwrap();
        assert_eq!(answer, question.options()[1]);
    }
}
