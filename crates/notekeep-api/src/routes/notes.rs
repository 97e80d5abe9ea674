//! Note routes
//!
//! All routes here sit behind the authentication middleware and act only on
//! the caller's own notes. A note owned by someone else is reported exactly
//! like a missing one.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use notekeep_auth::CurrentUser;
use notekeep_db::{DEFAULT_LIMIT, DEFAULT_PAGE, NewNote, Note, NoteChanges, NotePage, NoteQuery};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{
    CreateNoteRequest, ListNotesParams, MessageResponse, UpdateNoteRequest, non_blank,
};

const NOT_FOUND: &str = "Note not found";
const NOT_FOUND_OR_UNAUTHORIZED: &str = "Note not found or unauthorized";

// ==================== Input Validation ====================

/// Build a new note from a create request, rejecting blank title or content
fn validate_new_note(owner: &str, request: CreateNoteRequest) -> Result<NewNote, ApiError> {
    let (Some(title), Some(content)) = (non_blank(request.title), non_blank(request.content))
    else {
        return Err(ApiError::BadRequest(
            "Title and content are required".to_string(),
        ));
    };

    Ok(NewNote {
        owner: owner.to_string(),
        title,
        content,
        tags: request.tags.map(|t| t.normalize()).unwrap_or_default(),
    })
}

/// Build partial changes from an update request
///
/// Fields that are present must still satisfy the create-time rules.
fn validate_changes(request: UpdateNoteRequest) -> Result<NoteChanges, ApiError> {
    let title = match request.title {
        Some(title) => Some(
            non_blank(Some(title))
                .ok_or_else(|| ApiError::BadRequest("Title cannot be empty".to_string()))?,
        ),
        None => None,
    };
    let content = match request.content {
        Some(content) => Some(
            non_blank(Some(content))
                .ok_or_else(|| ApiError::BadRequest("Content cannot be empty".to_string()))?,
        ),
        None => None,
    };

    Ok(NoteChanges {
        title,
        content,
        tags: request.tags.map(|t| t.normalize()),
    })
}

/// Lenient integer parsing for query strings; unparsable values use the default
fn parse_or(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

/// Turn raw query parameters into a normalized, owner-scoped query
fn build_query(owner: &str, params: ListNotesParams, max_page_size: Option<i64>) -> NoteQuery {
    NoteQuery {
        owner: Some(owner.to_string()),
        tag: params.tag,
        search: params.search,
        page: parse_or(params.page.as_deref(), DEFAULT_PAGE),
        limit: parse_or(params.limit.as_deref(), DEFAULT_LIMIT),
    }
    .validated(max_page_size)
}

// ==================== Note Routes ====================

/// POST /api/notes
async fn create_note(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let Json(request) = payload?;
    let new_note = validate_new_note(user.id(), request)?;

    let note = state.db.insert_note(new_note).await?;

    metrics::counter!("notekeep_notes_created_total").increment(1);
    info!("User {} created note {}", user.id(), note.id);

    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /api/notes?tag=&search=&page=&limit=
async fn list_notes(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<ListNotesParams>,
) -> Result<Json<NotePage>, ApiError> {
    let query = build_query(user.id(), params, state.max_page_size);
    debug!("Listing notes: {:?}", query);

    let page = state.db.list_notes(&query).await?;
    Ok(Json(page))
}

/// GET /api/notes/{id}
async fn get_note(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let note = state
        .db
        .get_note(&id, user.id())
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    Ok(Json(note))
}

/// PUT /api/notes/{id}
async fn update_note(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let Json(request) = payload?;
    let changes = validate_changes(request)?;

    debug!("Updating note {} for user {}", id, user.id());

    let note = state
        .db
        .update_note(&id, user.id(), changes)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND_OR_UNAUTHORIZED.to_string()))?;

    metrics::counter!("notekeep_notes_updated_total").increment(1);
    info!("User {} updated note {}", user.id(), note.id);

    Ok(Json(note))
}

/// DELETE /api/notes/{id}
async fn delete_note(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!("Deleting note {} for user {}", id, user.id());

    if !state.db.delete_note(&id, user.id()).await? {
        return Err(ApiError::NotFound(NOT_FOUND_OR_UNAUTHORIZED.to_string()));
    }

    metrics::counter!("notekeep_notes_deleted_total").increment(1);
    info!("User {} deleted note {}", user.id(), id);

    Ok(Json(MessageResponse {
        message: "Note deleted".to_string(),
    }))
}

/// Create note routes (authentication is layered on by the caller)
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route(
            "/api/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
}
