//! Song, verse and lyrics endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use songbook_common::db::SongFilter;
use songbook_common::pagination::{Page, PageRequest};
use songbook_common::{time, uuid_utils, Result};

use super::{first_value, DataResponse, PageQuery, QueryPairs};
use crate::catalog::{LyricsView, SongParams, SongView, VersePage};
use crate::error::ApiResult;
use crate::AppState;

/// Body for song create and full update
#[derive(Debug, Deserialize)]
pub struct SongRequest {
    pub group_id: String,
    pub title: String,
    pub runtime: i64,
    #[serde(default)]
    pub lyrics: Option<String>,
    pub release_date: String,
    pub link: String,
}

impl SongRequest {
    fn into_params(self) -> Result<SongParams> {
        Ok(SongParams {
            group_id: uuid_utils::parse_id(&self.group_id, "group")?,
            title: self.title,
            runtime: self.runtime,
            lyrics: self.lyrics,
            release_date: time::parse_release_date(&self.release_date)?,
            link: self.link,
        })
    }
}

/// Song listing query: pagination plus optional substring filters
#[derive(Debug, Default)]
pub struct SongListQuery {
    pub paging: PageQuery,
    /// Group name substring
    pub group: Option<String>,
    /// Song title substring
    pub song: Option<String>,
}

impl SongListQuery {
    fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            paging: PageQuery::from_pairs(pairs),
            group: first_value(pairs, "group").map(str::to_string),
            song: first_value(pairs, "song").map(str::to_string),
        }
    }

    fn request(&self) -> PageRequest {
        self.paging.request()
    }

    fn filter(&self) -> SongFilter {
        SongFilter::new(
            self.group.as_deref().unwrap_or_default().trim(),
            self.song.as_deref().unwrap_or_default().trim(),
        )
    }
}

/// POST /api/v1/songs
pub async fn create_song(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SongRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DataResponse<SongView>>)> {
    let Json(request) = payload?;
    let song = state.catalog.create_song(request.into_params()?).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(song))))
}

/// GET /api/v1/songs?page&limit&group&song
pub async fn list_songs(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> ApiResult<Json<Page<SongView>>> {
    let query = SongListQuery::from_pairs(&pairs);
    let page = state
        .catalog
        .list_songs(query.request(), &query.filter())
        .await?;
    Ok(Json(page))
}

/// GET /api/v1/songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<SongView>>> {
    let id = uuid_utils::parse_id(&id, "song")?;
    let song = state.catalog.song_view(id).await?;
    Ok(Json(DataResponse::new(song)))
}

/// PUT /api/v1/songs/:id
pub async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<SongRequest>, JsonRejection>,
) -> ApiResult<Json<DataResponse<SongView>>> {
    let id = uuid_utils::parse_id(&id, "song")?;
    let Json(request) = payload?;
    let song = state.catalog.update_song(id, request.into_params()?).await?;
    Ok(Json(DataResponse::new(song)))
}

/// DELETE /api/v1/songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = uuid_utils::parse_id(&id, "song")?;
    state.catalog.delete_song(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/songs/:id/verses?page&limit
pub async fn song_verses(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(pairs): Query<QueryPairs>,
) -> ApiResult<Json<VersePage>> {
    let id = uuid_utils::parse_id(&id, "song")?;
    let query = PageQuery::from_pairs(&pairs);
    let verses = state.catalog.song_verses(id, query.request()).await?;
    Ok(Json(verses))
}

/// GET /api/v1/songs/:id/lyrics
pub async fn song_lyrics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LyricsView>> {
    let id = uuid_utils::parse_id(&id, "song")?;
    let lyrics = state.catalog.song_lyrics(id).await?;
    Ok(Json(lyrics))
}

/// Build song routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/songs", get(list_songs).post(create_song))
        .route(
            "/api/v1/songs/:id",
            get(get_song).put(update_song).delete(delete_song),
        )
        .route("/api/v1/songs/:id/verses", get(song_verses))
        .route("/api/v1/songs/:id/lyrics", get(song_lyrics))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(group_id: &str, release_date: &str) -> SongRequest {
        SongRequest {
            group_id: group_id.to_string(),
            title: "Song".to_string(),
            runtime: 100,
            lyrics: None,
            release_date: release_date.to_string(),
            link: "http://example.com".to_string(),
        }
    }

    #[test]
    fn test_into_params_parses_ids_and_dates() {
        let id = uuid::Uuid::new_v4();
        let params = request(&id.to_string(), "1975-10-31").into_params().unwrap();
        assert_eq!(params.group_id, id);
        assert_eq!(params.release_date.to_string(), "1975-10-31");

        let params = request(&id.to_string(), "1975-10-31T12:00:00Z").into_params().unwrap();
        assert_eq!(params.release_date.to_string(), "1975-10-31");
    }

    #[test]
    fn test_into_params_rejects_bad_input() {
        use songbook_common::Error;

        assert!(matches!(
            request("nope", "1975-10-31").into_params(),
            Err(Error::InvalidInput(_))
        ));
        let id = uuid::Uuid::new_v4().to_string();
        assert!(matches!(
            request(&id, "31/10/1975").into_params(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_filter_trims_and_defaults() {
        let query = SongListQuery {
            group: Some("  que ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.filter(), SongFilter::new("que", ""));
        assert!(SongListQuery::default().filter().is_empty());
    }

    #[test]
    fn test_list_query_from_repeated_pairs() {
        let pairs: QueryPairs = [("group", "que"), ("group", "abba"), ("limit", "5"), ("limit", "x")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let query = SongListQuery::from_pairs(&pairs);

        assert_eq!(query.filter(), SongFilter::new("que", ""));
        assert_eq!(query.request().limit(), 5);
    }
}
