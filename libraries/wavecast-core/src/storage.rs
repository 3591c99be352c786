//! Storage traits consumed by the access-control services
//!
//! The session manager and the play accounting engine only need two narrow
//! views of the database. Keeping them as traits lets the services run
//! against in-memory stubs in tests.

use crate::error::Result;
use crate::types::{Credential, TrackId, Username};
use async_trait::async_trait;

/// Read access to stored login material
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up the credential for an account
    ///
    /// Returns `Ok(None)` when the account does not exist. Errors are
    /// reserved for the store itself being unreachable or broken.
    async fn find_credential(&self, username: &Username) -> Result<Option<Credential>>;
}

/// Write access to durable play counters
#[async_trait]
pub trait PlayStore: Send + Sync {
    /// Add one counted play to a track and return the new total
    async fn increment_play_count(&self, track_id: &TrackId) -> Result<i64>;
}
