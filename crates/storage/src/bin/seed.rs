use std::fmt;

use chrono::{DateTime, Duration, Utc};
use storage::repository::DataSources;
use trivia_core::model::{Category, Difficulty, SessionId, SessionRecord, UserId};
use trivia_core::scoring::{RewardRules, accuracy};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user_id: UserId,
    sessions: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUserId { raw: String },
    InvalidSessions { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user value: {raw:?}"),
            ArgsError::InvalidSessions { raw } => write!(f, "invalid --sessions value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("TRIVIA_DATABASE_URL").unwrap_or_else(|_| "sqlite:trivia.sqlite3".into());
        let mut user_id = std::env::var("TRIVIA_USER_ID")
            .ok()
            .and_then(|value| value.parse::<UserId>().ok())
            .unwrap_or_else(|| UserId::new(storage::memory::SEED_USER_ID));
        let mut sessions = std::env::var("TRIVIA_SEED_SESSIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(3);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    user_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
                }
                "--sessions" => {
                    let value = require_value(&mut args, "--sessions")?;
                    sessions = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidSessions { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user_id,
            sessions,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:trivia.sqlite3)");
    eprintln!("  --user <id>               Player the sample history belongs to (default: seed-user-1)");
    eprintln!("  --sessions <n>            Number of sample sessions to append (default: 3)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  TRIVIA_DATABASE_URL, TRIVIA_USER_ID, TRIVIA_SEED_SESSIONS");
}

fn sample_record(user_id: &UserId, index: u32, now: DateTime<Utc>) -> SessionRecord {
    let rules = RewardRules::standard();
    let category = Category::ALL[index as usize % Category::ALL.len()];
    let difficulty = Difficulty::ALL[index as usize % Difficulty::ALL.len()];
    let total = 5;
    let correct = total - (index % 3);
    let elapsed_secs = 45 + u64::from(index) * 20;
    let reward = rules.reward(difficulty, correct, total, elapsed_secs);

    SessionRecord {
        id: SessionId::generate(),
        user_id: user_id.clone(),
        category,
        difficulty,
        score: correct,
        total_questions: total,
        accuracy: accuracy(correct, total),
        elapsed_secs,
        xp_earned: reward.total_xp,
        completed_at: now - Duration::days(i64::from(index)),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let now = args.now.unwrap_or_else(Utc::now);
    let sources = DataSources::sqlite(&args.db_url, now).await?;

    let mut earned = 0_u64;
    for i in 0..args.sessions {
        let record = sample_record(&args.user_id, i, now);
        earned += u64::from(record.xp_earned);
        sources.minigames.save_session(&record).await?;
    }
    if earned > 0 && sources.users.get_profile(&args.user_id).await?.is_some() {
        sources.users.add_xp(&args.user_id, earned).await?;
    }

    println!(
        "Seeded {} sample sessions ({earned} XP) for {} into {}",
        args.sessions, args.user_id, args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
