//! Database models

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Rows that are soft-deleted by stamping `deleted_at`
///
/// Query code checks visibility through this trait instead of inspecting
/// the timestamp directly.
pub trait SoftDeletable {
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }

    fn is_visible(&self) -> bool {
        !self.is_deleted()
    }
}

/// Musical group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDeletable for Group {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// Song as stored; `lyrics` holds the serialized lyrics document
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub id: Uuid,
    pub group_id: Uuid,
    pub title: String,
    /// Runtime in seconds
    pub runtime: i32,
    pub lyrics: String,
    pub release_date: NaiveDate,
    pub link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDeletable for Song {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// Mutable song fields for insert and full-replacement update
#[derive(Debug, Clone, PartialEq)]
pub struct SongFields {
    pub group_id: Uuid,
    pub title: String,
    pub runtime: i32,
    /// Serialized lyrics document; `None` on update keeps the stored one
    pub lyrics: Option<String>,
    pub release_date: NaiveDate,
    pub link: String,
}

/// Substring filters for the song listing
///
/// Matching is case-insensitive. An empty string on either axis matches
/// everything; both axes combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub group_name: String,
    pub song_title: String,
}

impl SongFilter {
    pub fn new(group_name: impl Into<String>, song_title: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            song_title: song_title.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.group_name.is_empty() && self.song_title.is_empty()
    }
}

/// Result of a soft-delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Row was visible and is now stamped
    Deleted,
    /// Row had been deleted earlier; nothing changed
    AlreadyDeleted,
}
