//! Post listings, detail, create and edit.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use yatube_core::PostForm;
use yatube_shared::dto::{PostDetailResponse, PostRequest, ProfileResponse};

use super::{QueryParams, page_request, present};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn form(body: PostRequest) -> PostForm {
    PostForm::submitted(body.text, body.group)
}

async fn detail_response(state: &AppState, post_id: Uuid) -> AppResult<PostDetailResponse> {
    let detail = state.posts.detail(post_id).await?;
    Ok(PostDetailResponse {
        title: present::title(&detail.entry.post.text),
        post: present::entry(detail.entry),
        posts_count: detail.posts_count,
    })
}

/// GET /api/posts?page=
pub async fn index(
    state: web::Data<AppState>,
    query: QueryParams,
) -> AppResult<HttpResponse> {
    let page = state.posts.feed(page_request(&query)).await?;
    Ok(HttpResponse::Ok().json(present::page(page)))
}

/// GET /api/profiles/{username}?page=
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: QueryParams,
) -> AppResult<HttpResponse> {
    let listing = state.posts.profile(&path, page_request(&query)).await?;
    Ok(HttpResponse::Ok().json(ProfileResponse {
        author: present::author(listing.author),
        page: present::page(listing.page),
    }))
}

/// GET /api/posts/{post_id}
pub async fn detail(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(detail_response(&state, path.into_inner()).await?))
}

/// POST /api/posts - the author is always the caller.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .create(identity.user_id, form(body.into_inner()))
        .await?;

    Ok(HttpResponse::Created().json(detail_response(&state, post.id).await?))
}

/// PUT /api/posts/{post_id} - author only.
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .edit(identity.user_id, path.into_inner(), form(body.into_inner()))
        .await?;

    Ok(HttpResponse::Ok().json(detail_response(&state, post.id).await?))
}
