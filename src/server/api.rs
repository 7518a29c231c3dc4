//! JSON handlers for the content API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use super::ServerState;
use crate::content::{
    query, reading_time_minutes, ContentError, NewPost, Post, PostMeta, PostUpdate, Resolved,
    TagCount,
};

/// Error returned by API handlers
#[derive(Debug)]
pub enum ApiError {
    Content(ContentError),
    Internal(anyhow::Error),
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        ApiError::Content(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Content(ContentError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, json!({ "message": msg }))
            }
            ApiError::Content(ContentError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, json!({ "message": "Post not found" }))
            }
            ApiError::Content(err @ ContentError::Conflict(_)) => (
                StatusCode::CONFLICT,
                json!({ "message": "Post already exists", "error": err.to_string() }),
            ),
            ApiError::Content(err @ ContentError::Io { .. }) => {
                tracing::error!("Content I/O failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error", "error": err.to_string() }),
                )
            }
            ApiError::Internal(err) => {
                tracing::error!("Request failed: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal server error", "error": format!("{:#}", err) }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Tags as sent by the editor: a JSON array or a comma-separated string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Text(String),
}

impl TagsInput {
    fn into_tags(self) -> Vec<String> {
        match self {
            TagsInput::List(tags) => tags,
            TagsInput::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// A flag that may arrive as a boolean or as the string `"true"`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlagInput {
    Bool(bool),
    Text(String),
}

impl FlagInput {
    fn is_set(&self) -> bool {
        match self {
            FlagInput::Bool(b) => *b,
            FlagInput::Text(s) => s == "true",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    title: Option<String>,
    #[serde(default)]
    content: String,
    category: Option<String>,
    tags: Option<TagsInput>,
    pinned: Option<FlagInput>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    category: Option<String>,
    slug: Option<String>,
    content: Option<String>,
    title: Option<String>,
    tags: Option<TagsInput>,
    pinned: Option<FlagInput>,
}

#[derive(Debug, Deserialize)]
pub struct DeletePostRequest {
    category: Option<String>,
    slug: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    title: String,
    description: String,
    default_tags: Vec<String>,
    recent_count: usize,
}

/// A resolved blog path
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlogPage {
    #[serde(rename_all = "camelCase")]
    Post {
        post: Post,
        html: String,
        reading_time: usize,
    },
    Category {
        name: String,
        posts: Vec<PostMeta>,
    },
}

/// Run filesystem-bound repository work on the blocking pool
async fn blocking<T, E, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", e)))?
        .map_err(Into::into)
}

pub async fn site_info(State(state): State<Arc<ServerState>>) -> Json<SiteInfo> {
    let config = &state.board.config;
    Json(SiteInfo {
        title: config.title.clone(),
        description: config.description.clone(),
        default_tags: config.default_tags.clone(),
        recent_count: config.recent_count,
    })
}

pub async fn list_posts(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<ListQuery>,
) -> ApiResult<Json<Vec<PostMeta>>> {
    let posts = blocking(move || state.board.repository().list_all()).await?;
    Ok(Json(match params.limit {
        Some(n) => query::recent(&posts, n),
        None => posts,
    }))
}

pub async fn recent_posts(State(state): State<Arc<ServerState>>) -> ApiResult<Json<Vec<PostMeta>>> {
    let count = state.board.config.recent_count;
    let posts = blocking(move || state.board.repository().list_all()).await?;
    Ok(Json(query::recent(&posts, count)))
}

pub async fn list_categories(
    State(state): State<Arc<ServerState>>,
) -> ApiResult<Json<Vec<String>>> {
    let categories = blocking(move || state.board.repository().list_categories()).await?;
    Ok(Json(categories))
}

pub async fn blog_page(
    State(state): State<Arc<ServerState>>,
    Path(path): Path<String>,
) -> ApiResult<Json<BlogPage>> {
    let page = blocking(move || -> ApiResult<BlogPage> {
        Ok(match state.board.repository().resolve(&path)? {
            Resolved::Post(post) => {
                let html = state.renderer.render(&post.content)?;
                let reading_time = reading_time_minutes(&post.content);
                BlogPage::Post {
                    post,
                    html,
                    reading_time,
                }
            }
            Resolved::Category { name, posts } => BlogPage::Category { name, posts },
        })
    })
    .await?;
    Ok(Json(page))
}

pub async fn list_tags(State(state): State<Arc<ServerState>>) -> ApiResult<Json<Vec<TagCount>>> {
    let posts = blocking(move || state.board.repository().list_all()).await?;
    Ok(Json(query::tag_counts(&posts)))
}

pub async fn tag_posts(
    State(state): State<Arc<ServerState>>,
    Path(tag): Path<String>,
) -> ApiResult<Json<Vec<PostMeta>>> {
    let posts = blocking(move || state.board.repository().list_all()).await?;
    Ok(Json(query::by_tag(&posts, &tag)))
}

pub async fn create_post(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<CreatePostRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let new = NewPost {
        title: req.title.unwrap_or_default(),
        content: req.content,
        category: req.category.unwrap_or_default(),
        tags: req.tags.map(TagsInput::into_tags).unwrap_or_default(),
        pinned: req.pinned.is_some_and(|p| p.is_set()),
    };

    let today = state.board.config.today()?;
    let address = blocking(move || state.board.repository().create(&new, today)).await?;

    Ok(Json(json!({
        "message": "Post created successfully",
        "category": address.category,
        "slug": address.slug,
    })))
}

pub async fn update_post(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<UpdatePostRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let update = PostUpdate {
        category: req.category.unwrap_or_default(),
        slug: req.slug.unwrap_or_default(),
        content: req.content.unwrap_or_default(),
        title: req.title,
        tags: req.tags.map(TagsInput::into_tags),
        pinned: req.pinned.map(|p| p.is_set()),
    };

    blocking(move || state.board.repository().update(&update)).await?;
    Ok(Json(json!({ "message": "Post updated successfully" })))
}

pub async fn delete_post(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<DeletePostRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let category = req.category.unwrap_or_default();
    let slug = req.slug.unwrap_or_default();

    blocking(move || state.board.repository().delete(&category, &slug)).await?;
    Ok(Json(json!({ "message": "Post deleted successfully" })))
}
