/// Listing handlers: index, group, profile and the followed-authors feed
use crate::app_state::AppState;
use crate::error::Result;
use crate::handlers::PageQuery;
use crate::middleware::{CurrentUser, MaybeViewer};
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use page_cache::{CacheKey, CachedPage};
use serde_json::json;
use tracing::debug;

/// List all posts; the rendered page is served from the page cache while fresh
pub async fn index(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let key = CacheKey::page(req.method().as_str(), path_and_query);

    match state.page_cache.get(&key).await {
        Ok(Some(cached)) => return Ok(cached_response(cached)),
        Ok(None) => {}
        Err(e) => debug!(key = %key, error = %e, "rendering index uncached"),
    }

    let page_obj = state.feed.list_all(query.page.as_deref()).await?;
    let rendered = CachedPage::json(serde_json::to_string(&json!({ "page_obj": page_obj }))?);

    if let Err(e) = state.page_cache.put(&key, &rendered).await {
        debug!(key = %key, error = %e, "index page not cached");
    }

    Ok(cached_response(rendered))
}

fn cached_response(page: CachedPage) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, page.content_type))
        .body(page.body)
}

pub async fn group_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (group, page_obj) = state
        .feed
        .list_by_group(&slug, query.page.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "group": group,
        "page_obj": page_obj,
    })))
}

/// Author page; `following` tells whether the viewer follows this author
pub async fn profile(
    state: web::Data<AppState>,
    viewer: MaybeViewer,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let (author, page_obj) = state
        .feed
        .list_by_author(&username, query.page.as_deref())
        .await?;

    let following = match viewer.id() {
        Some(viewer_id) => state.follows.is_following(viewer_id, author.id).await?,
        None => false,
    };

    Ok(HttpResponse::Ok().json(json!({
        "author": author,
        "page_obj": page_obj,
        "following": following,
    })))
}

pub async fn follow_index(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page_obj = state
        .feed
        .list_followed_feed(user.0.id, query.page.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "page_obj": page_obj })))
}
