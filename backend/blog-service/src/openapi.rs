/// OpenAPI documentation for the blog service view-models
use actix_web::HttpResponse;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

use crate::models::{
    AuthorView, CommentForm, CommentFormView, CommentView, FeedItem, FeedPage, GroupChoice,
    GroupFeed, GroupRef, GroupView, PageInfo, PostDetail, PostForm, PostFormView, ProfileFeed,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Yatube Blog Service API",
        version = "1.0.0",
        description = "Posts, groups, comments and author subscriptions. Feeds are paginated with `?page=`; mutations take urlencoded forms and answer with redirects.",
        license(
            name = "MIT"
        )
    ),
    components(schemas(
        AuthorView,
        GroupRef,
        FeedItem,
        PageInfo,
        FeedPage,
        GroupView,
        GroupFeed,
        ProfileFeed,
        CommentView,
        CommentFormView,
        PostDetail,
        GroupChoice,
        PostForm,
        PostFormView,
        CommentForm,
    )),
    tags(
        (name = "feed", description = "Global, group, profile and following feeds"),
        (name = "posts", description = "Post detail, creation, editing and deletion"),
        (name = "follow", description = "Author subscriptions"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("sessionid"))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token signed by the identity provider"))
                        .build(),
                ),
            );
        }
    }
}

pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
