//! Credential rotation: generating new versions of a credential, validating
//! them, and swapping them in with a grace period or two-phase commit.

mod blue_green;
pub mod error;
mod backup;
mod events;
pub mod grace_period;
pub mod policy;
mod retry;
mod scheduler;
pub mod state;
mod transaction;
pub mod validation;

pub use backup::RotationBackup;
pub use blue_green::BlueGreenRotation;
pub use error::{RotationError, RotationErrorLog, RotationResult};
pub use events::{
    EmergencyRotationData, LogEntryType, NotificationEvent, NotificationSender, RollbackData,
    TransactionLog, TransactionLogEntry, TransactionOutcome,
};
pub use grace_period::{GracePeriodConfig, GracePeriodState, GracePeriodTracker, UsageMetrics};
pub use retry::RotationRetryPolicy;
pub use scheduler::{ExpiryMonitor, PeriodicScheduler, ScheduledRotation};
pub use state::RotationState;
pub use transaction::{
    BackupId, ManualRotation, OptimisticLock, RollbackStrategy, RotationId, RotationTransaction,
    TransactionPhase, ValidationResult,
};
pub use validation::{FailureHandler, FailureKind, SuccessCriteria, TestContext, TestMethod, TestResult, ValidationTest};
