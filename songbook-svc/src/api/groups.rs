//! Group endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use songbook_common::db::Group;
use songbook_common::pagination::Page;
use songbook_common::uuid_utils;

use super::{DataResponse, PageQuery, QueryPairs};
use crate::catalog::SongView;
use crate::error::ApiResult;
use crate::AppState;

/// Body for group create and update
#[derive(Debug, Deserialize)]
pub struct GroupRequest {
    pub name: String,
}

/// POST /api/v1/groups
pub async fn create_group(
    State(state): State<AppState>,
    payload: Result<Json<GroupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DataResponse<Group>>)> {
    let Json(request) = payload?;
    let group = state.catalog.create_group(&request.name).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(group))))
}

/// GET /api/v1/groups
pub async fn list_groups(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> ApiResult<Json<Page<Group>>> {
    let query = PageQuery::from_pairs(&pairs);
    let page = state.catalog.list_groups(query.request()).await?;
    Ok(Json(page))
}

/// GET /api/v1/groups/:id
pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Group>>> {
    let id = uuid_utils::parse_id(&id, "group")?;
    let group = state.catalog.get_group(id).await?;
    Ok(Json(DataResponse::new(group)))
}

/// PUT /api/v1/groups/:id
pub async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<GroupRequest>, JsonRejection>,
) -> ApiResult<Json<DataResponse<Group>>> {
    let id = uuid_utils::parse_id(&id, "group")?;
    let Json(request) = payload?;
    let group = state.catalog.update_group(id, &request.name).await?;
    Ok(Json(DataResponse::new(group)))
}

/// DELETE /api/v1/groups/:id
///
/// Repeating the delete is still 204.
pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = uuid_utils::parse_id(&id, "group")?;
    state.catalog.delete_group(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/groups/:id/songs
pub async fn list_group_songs(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(pairs): Query<QueryPairs>,
) -> ApiResult<Json<Page<SongView>>> {
    let id = uuid_utils::parse_id(&id, "group")?;
    let query = PageQuery::from_pairs(&pairs);
    let page = state.catalog.list_group_songs(id, query.request()).await?;
    Ok(Json(page))
}

/// Build group routes
pub fn group_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/groups", get(list_groups).post(create_group))
        .route(
            "/api/v1/groups/:id",
            get(get_group).put(update_group).delete(delete_group),
        )
        .route("/api/v1/groups/:id/songs", get(list_group_songs))
}
