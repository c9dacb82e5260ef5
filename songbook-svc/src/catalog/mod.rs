//! Catalog core
//!
//! Query layer, response formatting, verse slicing and lifecycle
//! operations, all written against [`CatalogGateway`]. The core keeps no
//! state between calls.

use std::sync::Arc;

use crate::gateway::CatalogGateway;

mod format;
mod lifecycle;
mod query;
mod verses;

pub use format::SongView;
pub use lifecycle::SongParams;
pub use verses::{slice_verses, LyricsView, VersePage, VerseSlice};

/// Entry point for every catalog operation
#[derive(Clone)]
pub struct Catalog {
    gateway: Arc<dyn CatalogGateway>,
}

impl Catalog {
    pub fn new(gateway: Arc<dyn CatalogGateway>) -> Self {
        Self { gateway }
    }

    pub(crate) fn gateway(&self) -> &dyn CatalogGateway {
        self.gateway.as_ref()
    }
}
