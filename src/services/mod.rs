pub mod file_store;
pub mod lockout;
pub mod roster_service;

pub use file_store::{CommitOutcome, FileStore, RemoteFile};
pub use lockout::{LockoutPolicy, LockoutTracker};
pub use roster_service::{AdminCredentials, RosterOp, RosterService, ServiceError};
