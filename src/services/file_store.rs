//! Remote file store seam.
//!
//! The production implementation is the GitHub contents client; tests use an
//! in-memory store.

use async_trait::async_trait;

/// A file fetched from the remote store, with the content hash used for the
/// optimistic-concurrency commit.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub content: String,
    pub sha: String,
}

/// Outcome of a successful commit.
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub commit_sha: String,
}

/// Read/write access to the single managed file.
///
/// `commit` is conditional on `sha` still matching the stored content; a
/// stale hash fails the call outright rather than merging. Concurrent
/// invocations can therefore race and lose, which is accepted.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<RemoteFile>;

    async fn commit(
        &self,
        content: &str,
        sha: &str,
        message: &str,
    ) -> anyhow::Result<CommitOutcome>;
}
