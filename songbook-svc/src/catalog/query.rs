//! Catalog query layer
//!
//! Every listing goes through [`paginate`] so rows and totals are always
//! fetched with the same predicate.

use songbook_common::db::{Group, SoftDeletable, Song, SongFilter};
use songbook_common::pagination::{paginate, Page, PageRequest};
use songbook_common::{Error, Result};
use tracing::debug;
use uuid::Uuid;

use super::{Catalog, SongView};

impl Catalog {
    /// Visible group, or `None`
    ///
    /// Shared by [`Catalog::get_group`] and song formatting.
    pub(crate) async fn lookup_group(&self, id: Uuid) -> Result<Option<Group>> {
        let group = self.gateway().fetch_group(id).await?;
        Ok(group.filter(|g| g.is_visible()))
    }

    pub async fn get_group(&self, id: Uuid) -> Result<Group> {
        self.lookup_group(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Group not found: {}", id)))
    }

    pub async fn get_song(&self, id: Uuid) -> Result<Song> {
        self.gateway()
            .fetch_song(id)
            .await?
            .filter(|s| s.is_visible())
            .ok_or_else(|| Error::NotFound(format!("Song not found: {}", id)))
    }

    /// Song with its group embedded
    pub async fn song_view(&self, id: Uuid) -> Result<SongView> {
        let song = self.get_song(id).await?;
        self.format_song(song).await
    }

    pub async fn list_groups(&self, request: PageRequest) -> Result<Page<Group>> {
        let gateway = self.gateway();
        paginate(
            request,
            |limit, offset| gateway.list_groups_page(limit, offset),
            || gateway.count_groups(),
        )
        .await
    }

    /// Song listing, optionally filtered by group name and song title
    ///
    /// An empty filter takes the plain listing path; both paths return the
    /// same rows and totals for it.
    pub async fn list_songs(
        &self,
        request: PageRequest,
        filter: &SongFilter,
    ) -> Result<Page<SongView>> {
        let gateway = self.gateway();
        let page = if filter.is_empty() {
            paginate(
                request,
                |limit, offset| gateway.list_songs_page(limit, offset),
                || gateway.count_songs(),
            )
            .await?
        } else {
            debug!(
                group = %filter.group_name,
                song = %filter.song_title,
                "Filtered song listing"
            );
            paginate(
                request,
                |limit, offset| gateway.list_songs_filtered_page(limit, offset, filter),
                || gateway.count_songs_filtered(filter),
            )
            .await?
        };

        self.format_page(page).await
    }

    /// Songs of one visible group, most recent release first
    pub async fn list_group_songs(
        &self,
        group_id: Uuid,
        request: PageRequest,
    ) -> Result<Page<SongView>> {
        self.get_group(group_id).await?;

        let gateway = self.gateway();
        let page = paginate(
            request,
            |limit, offset| gateway.list_songs_by_group_page(group_id, limit, offset),
            || gateway.count_songs_by_group(group_id),
        )
        .await?;

        self.format_page(page).await
    }

    async fn format_page(&self, mut page: Page<Song>) -> Result<Page<SongView>> {
        let songs = std::mem::take(&mut page.items);
        let views = self.format_songs(songs).await?;
        Ok(page.with_items(views))
    }
}
