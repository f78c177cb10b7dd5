//! Group listing and creation.

use actix_web::{HttpResponse, web};

use yatube_shared::dto::{CreateGroupRequest, GroupPostsResponse};

use super::{QueryParams, page_request, present};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/groups/{slug}?page=
pub async fn group_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: QueryParams,
) -> AppResult<HttpResponse> {
    let listing = state
        .posts
        .group_posts(&path, page_request(&query))
        .await?;

    Ok(HttpResponse::Ok().json(GroupPostsResponse {
        group: present::group(listing.group),
        page: present::page(listing.page),
    }))
}

/// POST /api/groups - admins only.
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateGroupRequest>,
) -> AppResult<HttpResponse> {
    if !identity.has_role("admin") {
        return Err(AppError::Forbidden);
    }

    let req = body.into_inner();
    let group = state
        .posts
        .create_group(identity.user_id, &req.title, &req.slug, &req.description)
        .await?;

    Ok(HttpResponse::Created().json(present::group(group)))
}
