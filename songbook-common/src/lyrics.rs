//! Lyrics codec
//!
//! Lyrics are stored as a JSON document holding the verbatim submitted text
//! and the verse list derived from it. The verse list is never edited on its
//! own: every lyrics mutation goes through [`LyricsDocument::encode`].

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Stored lyrics document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricsDocument {
    /// Verbatim submitted text (line breaks preserved)
    #[serde(default)]
    pub text: String,
    /// Non-blank trimmed lines of `text`, in order
    #[serde(default)]
    pub verses: Vec<String>,
}

impl LyricsDocument {
    /// Build a document from raw submitted text
    ///
    /// CRLF and LF are both line separators. Each line is trimmed and
    /// blank lines are dropped. Empty input yields an empty document.
    pub fn encode(raw: &str) -> Self {
        Self {
            text: raw.to_string(),
            verses: split_verses(raw),
        }
    }

    /// Text shown to clients
    ///
    /// Older rows may carry only `verses`; those are joined with `\n`.
    pub fn display_text(&self) -> String {
        if !self.text.is_empty() {
            return self.text.clone();
        }
        self.verses.join("\n")
    }

    /// Serialize to the stored form
    pub fn to_stored(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::MalformedDocument)
    }

    /// Parse the stored form
    pub fn from_stored(stored: &str) -> Result<Self> {
        serde_json::from_str(stored).map_err(Error::MalformedDocument)
    }

    pub fn verse_count(&self) -> usize {
        self.verses.len()
    }
}

fn split_verses(raw: &str) -> Vec<String> {
    // str::lines treats "\r\n" and "\n" alike
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
