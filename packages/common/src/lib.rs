pub mod error;
pub mod retry;
pub mod scoring;
pub mod session_status;
pub mod tenant;

pub use error::ParseStatusError;
pub use retry::RetryPolicy;
pub use scoring::{ScoreTier, ScoringPolicy};
pub use session_status::{SessionStatus, SessionTransition, TransitionOutcome};
pub use tenant::{AdminRole, TenantStatus};
