//! HTTP handlers and route configuration.

mod auth;
mod groups;
mod health;
mod posts;
mod present;


use std::collections::HashMap;

use actix_web::{error::JsonPayloadError, web};

use yatube_core::PageRequest;

use crate::middleware::error::AppError;

/// Raw query string. A repeated key keeps its last value.
type QueryParams = web::Query<HashMap<String, String>>;

/// `?page=` as requested; anything missing or unusable is page 1.
fn page_request(query: &QueryParams) -> PageRequest {
    PageRequest::parse(query.get("page").map(String::as_str))
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::index))
                    .route("", web::post().to(posts::create))
                    .route("/{post_id}", web::get().to(posts::detail))
                    .route("/{post_id}", web::put().to(posts::edit)),
            )
            .service(
                web::scope("/groups")
                    .route("", web::post().to(groups::create))
                    .route("/{slug}", web::get().to(groups::group_posts)),
            )
            .route("/profiles/{username}", web::get().to(posts::profile)),
    );
}
