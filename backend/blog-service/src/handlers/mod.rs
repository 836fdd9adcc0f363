/// HTTP handlers
///
/// Page handlers respond with the JSON render context a template layer would
/// receive; successful writes answer with a 302 redirect.
pub mod admin;
pub mod comments;
pub mod feed;
pub mod follow;
pub mod health;
pub mod posts;

use actix_web::{http::header, HttpResponse};
use serde::Deserialize;

/// `?page=` query; left raw so invalid numbers fall back to page 1
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

pub(crate) fn redirect(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

pub(crate) fn profile_url(username: &str) -> String {
    format!("/profile/{}/", username)
}

pub(crate) fn post_detail_url(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}
