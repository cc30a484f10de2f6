use actix_web::{web, HttpRequest, HttpResponse};

use super::{post_url, read_form, redirect, require_login};
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::CommentForm;
use crate::services::CommentOutcome;
use crate::state::AppState;

/// Add a comment; anonymous requests are sent to the login page and write nothing.
pub async fn add_comment(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
    current: CurrentUser,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let user = match require_login(&state, current, &req) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let post_id = post_id.into_inner();
    let form: CommentForm = read_form(&req, payload).await?;

    match state
        .comments
        .add_comment(&user, post_id, form)
        .await?
    {
        CommentOutcome::Saved(_) => Ok(redirect(&post_url(post_id))),
        CommentOutcome::Invalid(view) => Ok(HttpResponse::BadRequest().json(view)),
    }
}
