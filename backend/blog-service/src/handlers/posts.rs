/// Post handlers - detail page, create and edit forms
use crate::app_state::AppState;
use crate::error::{AppError, Result};
use crate::forms::{CommentForm, PostForm};
use crate::handlers::{post_detail_url, profile_url, redirect};
use crate::middleware::CurrentUser;
use crate::models::{Group, PostView};
use crate::services::EditOutcome;
use actix_web::{http::StatusCode, web, HttpResponse};
use serde_json::json;
use validator::ValidationErrors;

pub async fn post_detail(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let detail = state.posts.detail(post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "post": detail.post,
        "comments": detail.comments,
        "form": CommentForm::default(),
    })))
}

/// Empty post form with the group choices
pub async fn create_form(state: web::Data<AppState>, _user: CurrentUser) -> Result<HttpResponse> {
    let groups = state.posts.groups().await?;

    Ok(HttpResponse::Ok().json(json!({
        "form": PostForm::default(),
        "groups": groups,
        "is_edit": false,
    })))
}

/// Create a post and go to the author's profile
pub async fn create_post(
    state: web::Data<AppState>,
    user: CurrentUser,
    form: web::Form<PostForm>,
) -> Result<HttpResponse> {
    match state.posts.create_post(user.0.id, &form).await {
        Ok(_) => Ok(redirect(profile_url(&user.0.username))),
        Err(AppError::Validation(errors)) => {
            let groups = state.posts.groups().await?;
            rejected_form(&form, &errors, groups, None)
        }
        Err(e) => Err(e),
    }
}

/// Pre-filled form; only the author gets it
pub async fn edit_form(
    state: web::Data<AppState>,
    user: CurrentUser,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();
    let post = state.posts.get_post(post_id).await?;
    if post.author.id != user.0.id {
        return Ok(redirect(post_detail_url(post_id)));
    }
    let groups = state.posts.groups().await?;

    Ok(HttpResponse::Ok().json(json!({
        "form": PostForm::from_post(&post),
        "groups": groups,
        "post": post,
        "is_edit": true,
    })))
}

/// Apply an edit; non-authors are sent back to the detail page unchanged
pub async fn edit_post(
    state: web::Data<AppState>,
    user: CurrentUser,
    post_id: web::Path<i64>,
    form: web::Form<PostForm>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();

    match state.posts.edit_post(post_id, user.0.id, &form).await {
        Ok(EditOutcome::Updated(_)) | Ok(EditOutcome::NotAuthor) => {
            Ok(redirect(post_detail_url(post_id)))
        }
        Err(AppError::Validation(errors)) => {
            let post = state.posts.get_post(post_id).await?;
            let groups = state.posts.groups().await?;
            rejected_form(&form, &errors, groups, Some(&post))
        }
        Err(e) => Err(e),
    }
}

/// Submitted values with their errors, rendered in the same context as the GET form
fn rejected_form(
    form: &PostForm,
    errors: &ValidationErrors,
    groups: Vec<Group>,
    post: Option<&PostView>,
) -> Result<HttpResponse> {
    let mut form_context = serde_json::to_value(form)?;
    form_context["errors"] = serde_json::to_value(errors)?;

    let status = StatusCode::BAD_REQUEST;
    let mut body = json!({
        "error": "Validation failed",
        "status": status.as_u16(),
        "form": form_context,
        "groups": groups,
        "is_edit": post.is_some(),
    });
    if let Some(post) = post {
        body["post"] = serde_json::to_value(post)?;
    }

    Ok(HttpResponse::build(status).json(body))
}
