mod ids;
mod profile;
mod question;
mod record;
mod result;
mod session;

pub use ids::{ParseIdError, QuestionId, SessionId, UserId};
pub use profile::{ProfileUpdate, UserProfile, XP_PER_LEVEL, level_for_total_xp};
pub use question::{Category, Difficulty, Question, QuestionDraft, QuestionError};
pub use record::SessionRecord;
pub use result::{Reward, SessionResult};
pub use session::{QuizSession, SessionError};
