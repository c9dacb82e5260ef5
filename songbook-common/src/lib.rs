//! # Songbook Common Library
//!
//! Shared code for the songbook catalog service:
//! - Database models and schema bootstrap
//! - Error kinds
//! - Lyrics codec (text + derived verse list)
//! - Pagination arithmetic
//! - Configuration loading
//! - Time and identifier helpers

pub mod config;
pub mod db;
pub mod error;
pub mod lyrics;
pub mod pagination;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use lyrics::LyricsDocument;
pub use pagination::{Page, PageRequest};
