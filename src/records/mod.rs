//! Employee records: the data model and the repository UI code talks to.

mod cache;
pub mod directory;
pub mod documents;
pub mod fallback;
pub mod repository;
pub mod stats;
pub mod types;

pub use cache::SNAPSHOT_KEY;
pub use directory::{AdminIdentity, LoginEntry, Role};
pub use documents::{DocumentItem, DocumentStatus};
pub use repository::{RecordRepository, SaveOutcome};
pub use stats::DashboardStats;
pub use types::{EmployeeRecord, EmploymentStatus, VerificationStatus};
