use crate::app_state::AppState;
use crate::error::Result;
use crate::handlers::{profile_url, redirect};
use crate::middleware::CurrentUser;
use actix_web::{web, HttpResponse};

pub async fn profile_follow(
    state: web::Data<AppState>,
    user: CurrentUser,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let author = state.follows.author(&username).await?;
    state.follows.follow(user.0.id, author.id).await?;

    Ok(redirect(profile_url(&author.username)))
}

pub async fn profile_unfollow(
    state: web::Data<AppState>,
    user: CurrentUser,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let author = state.follows.author(&username).await?;
    state.follows.unfollow(user.0.id, author.id).await?;

    Ok(redirect(profile_url(&author.username)))
}
