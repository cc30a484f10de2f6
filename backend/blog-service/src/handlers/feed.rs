use actix_web::{http::header::ContentType, web, HttpRequest, HttpResponse};

use super::require_login;
use crate::cache::PageCache;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::pagination::{PageQuery, RequestedPage};
use crate::state::AppState;

/// Global feed, served from the page cache
pub async fn index(state: web::Data<AppState>, query: web::Query<PageQuery>) -> Result<HttpResponse> {
    let requested = query.requested();
    let number = requested.get().max(1);
    let key = PageCache::<String>::global_index_key(number as usize);

    let feed = state.feed.clone();
    let body = state
        .page_cache
        .get_or_compute(&key, || async move {
            let page = feed.global_feed(RequestedPage::new(number)).await?;
            Ok::<_, AppError>(serde_json::to_string(&page)?)
        })
        .await?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

pub async fn group_posts(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let feed = state.feed.group_feed(&slug, query.requested()).await?;
    Ok(HttpResponse::Ok().json(feed))
}

pub async fn profile(
    state: web::Data<AppState>,
    username: web::Path<String>,
    query: web::Query<PageQuery>,
    current: CurrentUser,
) -> Result<HttpResponse> {
    let feed = state
        .feed
        .profile_feed(&username, query.requested(), current.user())
        .await?;
    Ok(HttpResponse::Ok().json(feed))
}

/// Posts by authors the current user follows
pub async fn follow_index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
    current: CurrentUser,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match require_login(&state, current, &req) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let feed = state.feed.following_feed(user.id, query.requested()).await?;
    Ok(HttpResponse::Ok().json(feed))
}
