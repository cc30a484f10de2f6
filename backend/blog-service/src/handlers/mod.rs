/// HTTP handlers for blog endpoints
///
/// This module contains handlers for:
/// - Feeds: index, group, profile and following listings
/// - Posts: detail, create, edit, delete
/// - Comments: add a comment to a post
/// - Follow: subscribe to and unsubscribe from authors
pub mod comments;
pub mod feed;
pub mod follow;
pub mod health;
pub mod posts;

use actix_web::{http::header, web, FromRequest, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::metrics::serve_metrics;
use crate::middleware::{login_required, Access, CurrentUser};
use crate::models::User;
use crate::openapi::openapi_json;
use crate::state::AppState;

/// 302 to `location`
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

pub fn post_url(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

/// The logged-in user, or the login redirect to answer with.
pub(crate) fn require_login(
    state: &AppState,
    current: CurrentUser,
    req: &HttpRequest,
) -> Result<User, HttpResponse> {
    match login_required(current.into_inner(), req.path(), &state.site.login_url) {
        Access::Granted(user) => Ok(user),
        Access::Redirect(location) => Err(redirect(&location)),
    }
}

/// Decode the urlencoded body. Called only once the login check has passed, so
/// anonymous requests are redirected whatever their body looks like.
pub(crate) async fn read_form<T>(req: &HttpRequest, payload: web::Payload) -> Result<T, AppError>
where
    T: DeserializeOwned + 'static,
{
    web::Form::<T>::from_request(req, &mut payload.into_inner())
        .await
        .map(web::Form::into_inner)
        .map_err(|e| AppError::Validation(e.to_string()))
}

async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound(req.path().to_string()))
}

/// Register every route of the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(serve_metrics))
        .route("/openapi.json", web::get().to(openapi_json))
        .route("/", web::get().to(feed::index))
        .route("/follow/", web::get().to(feed::follow_index))
        .route("/group/{slug}/", web::get().to(feed::group_posts))
        .route("/profile/{username}/", web::get().to(feed::profile))
        .route(
            "/profile/{username}/follow/",
            web::get().to(follow::profile_follow),
        )
        .route(
            "/profile/{username}/unfollow/",
            web::get().to(follow::profile_unfollow),
        )
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .route("/posts/{post_id}/delete/", web::post().to(posts::post_delete))
        .route(
            "/posts/{post_id}/comment/",
            web::post().to(comments::add_comment),
        )
        .default_service(web::to(not_found));
}
