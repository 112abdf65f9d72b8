//! Handlers for viewing, editing and listing the history of pages.
//!
//! Page paths come from the URL tail: `/docs/intro` is the page at
//! `/docs/intro`, `/_edit/docs/intro` edits it and `/_history/docs/intro`
//! lists its versions. The root page `/` is reached through the bare prefixes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use versawiki_core::history::{PageVersion, VersionSummary};
use versawiki_core::types::VersionNumber;
use versawiki_core::validation::{parse_version_param, validate_page_path};
use versawiki_db::models::user::User;
use versawiki_wiki::SaveOutcome;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query string accepted by the view and edit pages.
#[derive(Debug, Default, Deserialize)]
pub struct VersionQuery {
    /// Version to show; anything that is not a plain number means "latest".
    pub version: Option<String>,
}

/// Request body for `POST /_edit/{path}`.
#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub content: String,
}

/// A page version as shown to readers.
#[derive(Debug, Serialize)]
pub struct PageView {
    pub path: String,
    #[serde(flatten)]
    pub version: PageVersion,
}

/// What the editor starts from.
#[derive(Debug, Serialize)]
pub struct EditDraft {
    pub path: String,
    /// Content to pre-fill; empty for a page that does not exist yet.
    pub content: String,
    /// Version the draft is based on, if the page exists.
    pub version: Option<VersionNumber>,
}

/// Result of a successful edit.
#[derive(Debug, Serialize)]
pub struct SavedPage {
    pub path: String,
    /// Number of the version just written.
    pub version: VersionNumber,
    pub created: bool,
}

/// A page's version listing, newest first.
#[derive(Debug, Serialize)]
pub struct HistoryView {
    pub path: String,
    pub versions: Vec<VersionSummary>,
}

/// Turn a captured URL tail into a page path.
fn page_path(tail: &str) -> String {
    format!("/{tail}")
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// GET /{path}
///
/// Show a version of the page, or redirect to its editor if it does not
/// exist yet.
pub async fn view(
    State(state): State<AppState>,
    Path(tail): Path<String>,
    Query(query): Query<VersionQuery>,
) -> AppResult<Response> {
    show(&state, page_path(&tail), &query).await
}

/// GET /
pub async fn view_root(
    State(state): State<AppState>,
    Query(query): Query<VersionQuery>,
) -> AppResult<Response> {
    show(&state, page_path(""), &query).await
}

async fn show(state: &AppState, path: String, query: &VersionQuery) -> AppResult<Response> {
    validate_page_path(&path)?;

    let Some(page) = state.wiki.pages.find(&path).await? else {
        tracing::debug!(path = %path, "Page missing, redirecting to editor");
        return Ok(Redirect::to(&format!("/_edit{path}")).into_response());
    };

    let requested = parse_version_param(query.version.as_deref());
    let version = state.wiki.pages.read_version(&page, requested)?;
    Ok(Json(DataResponse {
        data: PageView { path, version },
    })
    .into_response())
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

/// GET /_edit/{path}
///
/// The content to edit: the requested (or latest) version of the page, or
/// an empty draft for a new page.
pub async fn edit_form(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(tail): Path<String>,
    Query(query): Query<VersionQuery>,
) -> AppResult<Json<DataResponse<EditDraft>>> {
    draft(&state, page_path(&tail), &query).await
}

/// GET /_edit/
pub async fn edit_root_form(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(query): Query<VersionQuery>,
) -> AppResult<Json<DataResponse<EditDraft>>> {
    draft(&state, page_path(""), &query).await
}

async fn draft(
    state: &AppState,
    path: String,
    query: &VersionQuery,
) -> AppResult<Json<DataResponse<EditDraft>>> {
    validate_page_path(&path)?;

    let data = match state.wiki.pages.find(&path).await? {
        Some(page) => {
            let requested = parse_version_param(query.version.as_deref());
            let base = state.wiki.pages.read_version(&page, requested)?;
            EditDraft {
                path,
                content: base.content,
                version: Some(base.version),
            }
        }
        None => EditDraft {
            path,
            content: String::new(),
            version: None,
        },
    };
    Ok(Json(DataResponse { data }))
}

/// POST /_edit/{path}
///
/// Create the page or append a version. Empty or unchanged content is a 422
/// carrying the reason.
pub async fn save(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(tail): Path<String>,
    Json(input): Json<EditRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SavedPage>>)> {
    store(&state, &user, page_path(&tail), &input.content).await
}

/// POST /_edit/
pub async fn save_root(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(input): Json<EditRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SavedPage>>)> {
    store(&state, &user, page_path(""), &input.content).await
}

async fn store(
    state: &AppState,
    user: &User,
    path: String,
    content: &str,
) -> AppResult<(StatusCode, Json<DataResponse<SavedPage>>)> {
    validate_page_path(&path)?;

    let (page, outcome) = state.wiki.pages.save(&path, content).await?;
    tracing::info!(
        user_id = user.id,
        path = %path,
        version = page.version_count(),
        ?outcome,
        "Page saved"
    );

    let created = outcome == SaveOutcome::Created;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(DataResponse {
            data: SavedPage {
                path,
                version: page.version_count(),
                created,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// GET /_history/{path}
pub async fn history(
    State(state): State<AppState>,
    Path(tail): Path<String>,
) -> AppResult<Json<DataResponse<HistoryView>>> {
    list_versions(&state, page_path(&tail)).await
}

/// GET /_history/
pub async fn history_root(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<HistoryView>>> {
    list_versions(&state, page_path("")).await
}

async fn list_versions(state: &AppState, path: String) -> AppResult<Json<DataResponse<HistoryView>>> {
    validate_page_path(&path)?;
    let page = state.wiki.pages.get(&path).await?;
    let versions = state.wiki.pages.history(&page);
    Ok(Json(DataResponse {
        data: HistoryView { path, versions },
    }))
}
