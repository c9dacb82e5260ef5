//! Persistence gateway
//!
//! The catalog core reaches storage only through [`CatalogGateway`]. Every
//! read excludes soft-deleted rows unless a method says otherwise.

use async_trait::async_trait;
use songbook_common::db::{DeleteOutcome, Group, Song, SongFields, SongFilter};
use songbook_common::Result;
use uuid::Uuid;

mod sqlite;

pub use sqlite::SqliteGateway;

/// Storage operations the catalog core depends on
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Visible group by id
    async fn fetch_group(&self, id: Uuid) -> Result<Option<Group>>;

    /// Visible song by id
    async fn fetch_song(&self, id: Uuid) -> Result<Option<Song>>;

    async fn insert_group(&self, name: &str) -> Result<Group>;

    /// Insert a song; `fields.lyrics` must be set
    async fn insert_song(&self, fields: &SongFields) -> Result<Song>;

    /// Rename a visible group; `None` if it is absent or deleted
    async fn update_group(&self, id: Uuid, name: &str) -> Result<Option<Group>>;

    /// Replace a visible song's mutable fields; `None` if absent or deleted
    async fn update_song(&self, id: Uuid, fields: &SongFields) -> Result<Option<Song>>;

    /// Stamp `deleted_at`
    ///
    /// Looks at deleted rows too: `None` only when the id never existed.
    async fn soft_delete_group(&self, id: Uuid) -> Result<Option<DeleteOutcome>>;

    /// Same contract as [`CatalogGateway::soft_delete_group`]
    async fn soft_delete_song(&self, id: Uuid) -> Result<Option<DeleteOutcome>>;

    async fn count_groups(&self) -> Result<i64>;

    async fn count_songs(&self) -> Result<i64>;

    async fn count_songs_filtered(&self, filter: &SongFilter) -> Result<i64>;

    async fn count_songs_by_group(&self, group_id: Uuid) -> Result<i64>;

    /// Newest first
    async fn list_groups_page(&self, limit: i64, offset: i64) -> Result<Vec<Group>>;

    /// Newest first
    async fn list_songs_page(&self, limit: i64, offset: i64) -> Result<Vec<Song>>;

    /// Songs joined to their group, filtered, newest first
    async fn list_songs_filtered_page(
        &self,
        limit: i64,
        offset: i64,
        filter: &SongFilter,
    ) -> Result<Vec<Song>>;

    /// One group's songs, most recent release first
    async fn list_songs_by_group_page(
        &self,
        group_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Song>>;
}
