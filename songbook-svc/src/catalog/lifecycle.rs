//! Create, update and soft-delete for groups and songs
//!
//! Timestamps are stamped by the gateway. Lyrics always pass through the
//! codec before storage, so text and verses never drift apart.

use chrono::NaiveDate;
use songbook_common::db::{DeleteOutcome, Group, SongFields};
use songbook_common::{Error, LyricsDocument, Result};
use tracing::info;
use uuid::Uuid;

use super::{Catalog, SongView};

/// Typed song input
#[derive(Debug, Clone, PartialEq)]
pub struct SongParams {
    pub group_id: Uuid,
    pub title: String,
    /// Seconds
    pub runtime: i64,
    /// Raw lyric text; `None` or empty on update keeps the stored lyrics
    pub lyrics: Option<String>,
    pub release_date: NaiveDate,
    pub link: String,
}

fn require_non_empty(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

fn validate_runtime(runtime: i64) -> Result<i32> {
    if runtime <= 0 {
        return Err(Error::InvalidInput(
            "runtime must be a positive number of seconds".to_string(),
        ));
    }
    i32::try_from(runtime)
        .map_err(|_| Error::InvalidInput(format!("runtime out of range: {}", runtime)))
}

impl SongParams {
    /// Validate and encode into gateway fields
    ///
    /// `keep_missing_lyrics` maps absent lyrics to "keep stored"; otherwise
    /// they encode as an empty document.
    fn into_fields(self, keep_missing_lyrics: bool) -> Result<SongFields> {
        let title = require_non_empty(&self.title, "title")?;
        let link = require_non_empty(&self.link, "link")?;
        let runtime = validate_runtime(self.runtime)?;

        let raw = self.lyrics.filter(|text| !text.is_empty());
        let lyrics = match raw {
            Some(text) => Some(LyricsDocument::encode(&text).to_stored()?),
            None if keep_missing_lyrics => None,
            None => Some(LyricsDocument::encode("").to_stored()?),
        };

        Ok(SongFields {
            group_id: self.group_id,
            title,
            runtime,
            lyrics,
            release_date: self.release_date,
            link,
        })
    }
}

impl Catalog {
    async fn require_live_group(&self, group_id: Uuid) -> Result<Group> {
        self.lookup_group(group_id)
            .await?
            .ok_or_else(|| Error::InvalidReference(format!("Group does not exist: {}", group_id)))
    }

    pub async fn create_group(&self, name: &str) -> Result<Group> {
        let name = require_non_empty(name, "name")?;
        let group = self.gateway().insert_group(&name).await?;

        info!(group_id = %group.id, name = %group.name, "Created group");
        Ok(group)
    }

    pub async fn update_group(&self, id: Uuid, name: &str) -> Result<Group> {
        let name = require_non_empty(name, "name")?;
        let group = self
            .gateway()
            .update_group(id, &name)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Group not found: {}", id)))?;

        info!(group_id = %id, name = %group.name, "Updated group");
        Ok(group)
    }

    /// Soft-delete a group; its songs stay in place
    pub async fn delete_group(&self, id: Uuid) -> Result<DeleteOutcome> {
        let outcome = self
            .gateway()
            .soft_delete_group(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Group not found: {}", id)))?;

        info!(group_id = %id, ?outcome, "Deleted group");
        Ok(outcome)
    }

    pub async fn create_song(&self, params: SongParams) -> Result<SongView> {
        let fields = params.into_fields(false)?;
        let group = self.require_live_group(fields.group_id).await?;
        let song = self.gateway().insert_song(&fields).await?;

        info!(song_id = %song.id, group_id = %song.group_id, title = %song.title, "Created song");
        SongView::build(song, Some(group))
    }

    pub async fn update_song(&self, id: Uuid, params: SongParams) -> Result<SongView> {
        let fields = params.into_fields(true)?;

        let current = self.get_song(id).await?;
        if current.group_id != fields.group_id {
            self.require_live_group(fields.group_id).await?;
        }

        let song = self
            .gateway()
            .update_song(id, &fields)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Song not found: {}", id)))?;

        info!(song_id = %id, group_id = %song.group_id, "Updated song");
        self.format_song(song).await
    }

    pub async fn delete_song(&self, id: Uuid) -> Result<DeleteOutcome> {
        let outcome = self
            .gateway()
            .soft_delete_song(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Song not found: {}", id)))?;

        info!(song_id = %id, ?outcome, "Deleted song");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(lyrics: Option<&str>) -> SongParams {
        SongParams {
            group_id: Uuid::new_v4(),
            title: "  Bohemian Rhapsody ".to_string(),
            runtime: 354,
            lyrics: lyrics.map(str::to_string),
            release_date: NaiveDate::from_ymd_opt(1975, 10, 31).unwrap(),
            link: "http://example.com".to_string(),
        }
    }

    #[test]
    fn test_into_fields_encodes_lyrics() {
        let fields = params(Some("a\r\nb")).into_fields(false).unwrap();
        let doc = LyricsDocument::from_stored(fields.lyrics.as_deref().unwrap()).unwrap();

        assert_eq!(doc.text, "a\r\nb");
        assert_eq!(doc.verses, vec!["a", "b"]);
        assert_eq!(fields.title, "Bohemian Rhapsody");
    }

    #[test]
    fn test_missing_lyrics_on_create_is_empty_document() {
        let fields = params(None).into_fields(false).unwrap();
        let doc = LyricsDocument::from_stored(fields.lyrics.as_deref().unwrap()).unwrap();
        assert_eq!(doc, LyricsDocument::default());
    }

    #[test]
    fn test_missing_or_empty_lyrics_on_update_keeps_stored() {
        assert!(params(None).into_fields(true).unwrap().lyrics.is_none());
        assert!(params(Some("")).into_fields(true).unwrap().lyrics.is_none());
    }

    #[test]
    fn test_invalid_fields_rejected() {
        let mut p = params(None);
        p.title = "   ".to_string();
        assert!(matches!(p.into_fields(false), Err(Error::InvalidInput(_))));

        let mut p = params(None);
        p.link = String::new();
        assert!(matches!(p.into_fields(false), Err(Error::InvalidInput(_))));

        let mut p = params(None);
        p.runtime = 0;
        assert!(matches!(p.into_fields(false), Err(Error::InvalidInput(_))));

        let mut p = params(None);
        p.runtime = i64::from(i32::MAX) + 1;
        assert!(matches!(p.into_fields(false), Err(Error::InvalidInput(_))));
    }
}
