pub mod absence;
pub mod metrics;
pub mod review;
pub mod session;
pub mod user;

pub use absence::{AbsenceEvent, AbsenceKind, CompetitionDetails, NewAbsence, RaceOutcome};
pub use metrics::{AthleteMetrics, TrainingZone, ZoneRow};
pub use review::WeeklyReview;
pub use session::{
  Effort, Intensity, NewSession, Session, SessionLog, SessionPlanUpdate, SessionStatus, Sport,
};
pub use user::{NewAccount, Role, User};
