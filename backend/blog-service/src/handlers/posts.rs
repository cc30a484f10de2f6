/// Post handlers - detail view and author-only mutations
use actix_web::{web, HttpRequest, HttpResponse};

use super::{post_url, profile_url, read_form, redirect, require_login};
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::PostForm;
use crate::services::{EditOutcome, FormOutcome};
use crate::state::AppState;

pub async fn post_detail(state: web::Data<AppState>, post_id: web::Path<i64>) -> Result<HttpResponse> {
    let detail = state.feed.post_detail(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

pub async fn post_create_form(
    state: web::Data<AppState>,
    current: CurrentUser,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(redirect) = require_login(&state, current, &req) {
        return Ok(redirect);
    }

    Ok(HttpResponse::Ok().json(state.posts.create_form().await?))
}

/// Any author supplied by the client is ignored; the requester is the author.
pub async fn post_create(
    state: web::Data<AppState>,
    current: CurrentUser,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse> {
    let user = match require_login(&state, current, &req) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let form: PostForm = read_form(&req, payload).await?;

    match state.posts.create_post(&user, form).await? {
        FormOutcome::Saved(_) => Ok(redirect(&profile_url(&user.username))),
        FormOutcome::Invalid(view) => Ok(HttpResponse::BadRequest().json(view)),
    }
}

pub async fn post_edit_form(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
    current: CurrentUser,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match require_login(&state, current, &req) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let post_id = post_id.into_inner();

    match state.posts.edit_form(&user, post_id).await? {
        EditOutcome::Ready(view) => Ok(HttpResponse::Ok().json(view)),
        EditOutcome::NotAuthor => Ok(redirect(&post_url(post_id))),
        EditOutcome::Invalid(view) => Ok(HttpResponse::BadRequest().json(view)),
    }
}

pub async fn post_edit(
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
    let form: PostForm = read_form(&req, payload).await?;

    match state.posts.edit_post(&user, post_id, form).await? {
        EditOutcome::Ready(_) | EditOutcome::NotAuthor => Ok(redirect(&post_url(post_id))),
        EditOutcome::Invalid(view) => Ok(HttpResponse::BadRequest().json(view)),
    }
}

pub async fn post_delete(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
    current: CurrentUser,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match require_login(&state, current, &req) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    state.posts.delete_post(user.id, post_id.into_inner()).await?;
    Ok(redirect(&profile_url(&user.username)))
}
