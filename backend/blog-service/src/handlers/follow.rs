use actix_web::{web, HttpRequest, HttpResponse};

use super::{profile_url, redirect, require_login};
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::state::AppState;

pub async fn profile_follow(
    state: web::Data<AppState>,
    username: web::Path<String>,
    current: CurrentUser,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match require_login(&state, current, &req) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    state.follows.follow(&user, &username).await?;
    Ok(redirect(&profile_url(&username)))
}

pub async fn profile_unfollow(
    state: web::Data<AppState>,
    username: web::Path<String>,
    current: CurrentUser,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match require_login(&state, current, &req) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    state.follows.unfollow(&user, &username).await?;
    Ok(redirect(&profile_url(&username)))
}
