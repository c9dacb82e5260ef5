//! Song response formatting
//!
//! A formatted song carries its decoded lyrics document and, when the
//! group is still visible, the group record.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use songbook_common::db::{Group, Song};
use songbook_common::{LyricsDocument, Result};
use uuid::Uuid;

use super::Catalog;

/// Song as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongView {
    pub id: Uuid,
    pub group_id: Uuid,
    /// `None` once the owning group has been deleted
    pub group: Option<Group>,
    pub title: String,
    pub runtime: i32,
    pub lyrics: LyricsDocument,
    pub release_date: NaiveDate,
    pub link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SongView {
    /// Decode the stored lyrics and attach `group`
    pub fn build(song: Song, group: Option<Group>) -> Result<Self> {
        let lyrics = LyricsDocument::from_stored(&song.lyrics)?;

        Ok(Self {
            id: song.id,
            group_id: song.group_id,
            group,
            title: song.title,
            runtime: song.runtime,
            lyrics,
            release_date: song.release_date,
            link: song.link,
            created_at: song.created_at,
            updated_at: song.updated_at,
        })
    }
}

impl Catalog {
    pub async fn format_song(&self, song: Song) -> Result<SongView> {
        let group = self.lookup_group(song.group_id).await?;
        SongView::build(song, group)
    }

    /// Format a batch, looking each distinct group up once
    ///
    /// The memo lives only for this call.
    pub async fn format_songs(&self, songs: Vec<Song>) -> Result<Vec<SongView>> {
        let mut groups: HashMap<Uuid, Option<Group>> = HashMap::new();
        let mut views = Vec::with_capacity(songs.len());

        for song in songs {
            let group = match groups.get(&song.group_id) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.lookup_group(song.group_id).await?;
                    groups.insert(song.group_id, fetched.clone());
                    fetched
                }
            };
            views.push(SongView::build(song, group)?);
        }

        Ok(views)
    }
}
