//! Domain service orchestrating the roster lifecycle:
//! fetch → extract → evaluate → authorize → mutate → render → commit.
//!
//! The roster is read fresh from the remote store on every request; there is
//! no cache and no lock between the read and the conditional write.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use crate::roster::{
    self, CreatePayload, DeletePayload, EditPayload, RosterError, UserRecord,
};
use crate::services::file_store::{CommitOutcome, FileStore, RemoteFile};

/// Errors surfaced by roster operations, mapped to HTTP statuses at the API
/// boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account has expired")]
    Expired,

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("remote store error: {0}")]
    Transport(anyhow::Error),
}

/// Caller-supplied admin credentials, compared by exact equality against the
/// privileged record.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// One mutating operation, carrying its payload.
#[derive(Debug, Clone)]
pub enum RosterOp {
    Create(CreatePayload),
    Edit(EditPayload),
    Delete(DeletePayload),
}

impl RosterOp {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Edit(_) => "edit",
            Self::Delete(_) => "delete",
        }
    }
}

pub struct RosterService {
    store: Arc<dyn FileStore>,
}

impl RosterService {
    #[must_use]
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store }
    }

    /// Fetches the managed file and evaluates the roster block.
    pub async fn load(&self) -> Result<(RemoteFile, Vec<UserRecord>), ServiceError> {
        let file = self
            .store
            .fetch()
            .await
            .map_err(ServiceError::Transport)?;
        let span = roster::find_block(&file.content).ok_or(RosterError::BlockNotFound)?;
        let records = roster::parse_block(span.raw(&file.content))?;
        Ok((file, records))
    }

    /// Returns every record except the privileged one. Never commits.
    pub async fn list_users(
        &self,
        creds: &AdminCredentials,
    ) -> Result<Vec<UserRecord>, ServiceError> {
        let (_, records) = self.load().await?;
        authorize(creds, &records)?;
        Ok(roster::list(&records))
    }

    /// Applies one mutating operation and commits the rewritten block.
    ///
    /// Authorization and the mutation itself run before any write; a failed
    /// commit leaves the previous state intact.
    pub async fn apply(
        &self,
        creds: &AdminCredentials,
        op: &RosterOp,
    ) -> Result<CommitOutcome, ServiceError> {
        let file = self
            .store
            .fetch()
            .await
            .map_err(ServiceError::Transport)?;
        let span = roster::find_block(&file.content).ok_or(RosterError::BlockNotFound)?;
        let records = roster::parse_block(span.raw(&file.content))?;
        authorize(creds, &records)?;

        let mut working = records.clone();
        match op {
            RosterOp::Create(payload) => roster::create(&mut working, payload)?,
            RosterOp::Edit(payload) => roster::edit(&mut working, payload)?,
            RosterOp::Delete(payload) => roster::delete(&mut working, payload)?,
        }

        let combined = roster::ensure_admin(working, &records);
        let block = roster::render_block(&combined);
        let updated = roster::splice_block(&file.content, span, &block);
        let message = format!("Update access roster via admin API: {}", op.name());

        let outcome = self
            .store
            .commit(&updated, &file.sha, &message)
            .await
            .map_err(ServiceError::Transport)?;
        info!(action = op.name(), commit = %outcome.commit_sha, "roster committed");
        Ok(outcome)
    }

    /// Verifies an end-user login against the current roster.
    pub async fn verify_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserRecord, ServiceError> {
        let (_, records) = self.load().await?;
        let user = records
            .iter()
            .find(|user| user.username == username)
            .ok_or(ServiceError::InvalidCredentials)?;
        if user.password != password {
            return Err(ServiceError::InvalidCredentials);
        }
        if user.is_expired(Utc::now().date_naive()) {
            return Err(ServiceError::Expired);
        }
        Ok(user.clone())
    }
}

/// Admin authorization: exact credential match against the privileged record,
/// plus a day-granular expiry check. Runs before any mutation.
fn authorize(creds: &AdminCredentials, records: &[UserRecord]) -> Result<(), ServiceError> {
    let admin = records
        .iter()
        .find(|user| user.is_admin())
        .ok_or(ServiceError::InvalidCredentials)?;
    if creds.username != admin.username || creds.password != admin.password {
        return Err(ServiceError::InvalidCredentials);
    }
    if admin.is_expired(Utc::now().date_naive()) {
        return Err(ServiceError::Expired);
    }
    Ok(())
}
