//! Verse paging and whole-lyrics access

use serde::Serialize;
use songbook_common::pagination::{page_count, PageRequest};
use songbook_common::{LyricsDocument, Result};
use uuid::Uuid;

use super::Catalog;

/// One slice of a document's verse list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseSlice {
    pub verses: Vec<String>,
    pub total: i64,
    pub pages: i64,
}

/// Cut the verses for `request` out of `doc`
///
/// A page past the end is an empty slice, with `total` and `pages` still
/// describing the whole document.
pub fn slice_verses(doc: &LyricsDocument, request: PageRequest) -> Result<VerseSlice> {
    let total = doc.verse_count() as i64;
    let pages = page_count(total, request.limit())?;

    let start = request.offset();
    let verses = if start >= total {
        Vec::new()
    } else {
        let end = start.saturating_add(request.limit()).min(total);
        doc.verses[start as usize..end as usize].to_vec()
    };

    Ok(VerseSlice {
        verses,
        total,
        pages,
    })
}

/// Verse page response
#[derive(Debug, Clone, Serialize)]
pub struct VersePage {
    pub song_id: Uuid,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
    pub total: i64,
    pub verses: Vec<String>,
}

/// Whole-lyrics response
#[derive(Debug, Clone, Serialize)]
pub struct LyricsView {
    pub song_id: Uuid,
    pub text: String,
    pub total_verses: usize,
}

impl Catalog {
    pub async fn song_verses(&self, song_id: Uuid, request: PageRequest) -> Result<VersePage> {
        let song = self.get_song(song_id).await?;
        let doc = LyricsDocument::from_stored(&song.lyrics)?;
        let slice = slice_verses(&doc, request)?;

        Ok(VersePage {
            song_id,
            page: request.page(),
            limit: request.limit(),
            pages: slice.pages,
            total: slice.total,
            verses: slice.verses,
        })
    }

    pub async fn song_lyrics(&self, song_id: Uuid) -> Result<LyricsView> {
        let song = self.get_song(song_id).await?;
        let doc = LyricsDocument::from_stored(&song.lyrics)?;

        Ok(LyricsView {
            song_id,
            text: doc.display_text(),
            total_verses: doc.verse_count(),
        })
    }
}
