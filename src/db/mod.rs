//! Document store access.
//!
//! Three record collections (invitations, guests, songs) keyed by opaque ids.
//! Every write touches a single record; there are no multi-record transactions.
//! Foreign keys are plain ids, so backends check that a referenced invitation
//! exists before writing a record that points at it.

pub mod memory;
pub mod pool;
pub mod postgres;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Guest, GuestPatch, Invitation, NewGuest, NewSong, Song};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("referenced invitation does not exist")]
    InvalidReference,
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::AlreadyExists
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────── Invitations ─────────────────────────────

    async fn list_invitations(&self) -> Result<Vec<Invitation>, StoreError>;

    /// Fails with `AlreadyExists` when the name is taken.
    async fn create_invitation(&self, name: &str) -> Result<Invitation, StoreError>;

    async fn get_invitation(&self, id: Uuid) -> Result<Invitation, StoreError>;

    async fn get_invitation_by_name(&self, name: &str) -> Result<Invitation, StoreError>;

    /// Removes the invitation record only; guests and songs keep their reference.
    async fn delete_invitation(&self, id: Uuid) -> Result<(), StoreError>;

    /// Atomically bump the view counter and return the updated record.
    async fn increment_seen(&self, id: Uuid) -> Result<Invitation, StoreError>;

    // ──────────────────────────────── Guests ───────────────────────────────

    async fn list_guests(&self) -> Result<Vec<Guest>, StoreError>;

    async fn list_guests_by_invitation(&self, invitation_id: Uuid)
        -> Result<Vec<Guest>, StoreError>;

    async fn get_guest(&self, id: Uuid) -> Result<Guest, StoreError>;

    async fn find_guest_by_name(&self, name: &str, last_name: &str)
        -> Result<Guest, StoreError>;

    /// Fails with `InvalidReference` when the invitation does not exist.
    async fn insert_guest(&self, guest: &NewGuest) -> Result<Guest, StoreError>;

    /// Apply `patch` to a single guest. An empty patch returns the guest unchanged.
    async fn update_guest(&self, id: Uuid, patch: &GuestPatch) -> Result<Guest, StoreError>;

    async fn delete_guest(&self, id: Uuid) -> Result<(), StoreError>;

    // ──────────────────────────────── Songs ────────────────────────────────

    async fn list_songs(&self) -> Result<Vec<Song>, StoreError>;

    async fn list_songs_by_invitation(&self, invitation_id: Uuid) -> Result<Vec<Song>, StoreError>;

    async fn get_song(&self, id: Uuid) -> Result<Song, StoreError>;

    /// Fails with `InvalidReference` when the invitation does not exist.
    async fn insert_song(&self, song: &NewSong) -> Result<Song, StoreError>;

    async fn rename_song(&self, id: Uuid, name: &str) -> Result<Song, StoreError>;

    async fn delete_song(&self, id: Uuid) -> Result<(), StoreError>;

    // ──────────────────────────────── Health ───────────────────────────────

    async fn ping(&self) -> Result<(), StoreError>;
}
