mod common;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use serde_json::Value;

use blog_service::db::{GroupRepository, PostRepository};
use blog_service::handlers::configure;
use blog_service::models::{NewPost, PostChanges};

use common::context;

fn post_ids(page: &Value) -> Vec<i64> {
    page["posts"]
        .as_array()
        .expect("posts array")
        .iter()
        .map(|p| p["id"].as_i64().expect("post id"))
        .collect()
}

#[actix_web::test]
async fn group_with_thirteen_posts_splits_ten_and_three() {
    let ctx = context();
    let author = ctx.user("leo").await;
    let group = ctx.group("cats").await;
    ctx.posts(&author, Some(&group), 13).await;

    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure)).await;

    let first: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/group/cats/").to_request(),
    )
    .await;
    assert_eq!(first["group"]["slug"], "cats");
    assert_eq!(first["group"]["description"], "All about cats");
    assert_eq!(first["feed"]["posts"].as_array().unwrap().len(), 10);
    assert_eq!(first["feed"]["page"]["total_pages"], 2);
    assert_eq!(first["feed"]["page"]["has_next"], true);

    let second: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/group/cats/?page=2")
            .to_request(),
    )
    .await;
    assert_eq!(second["feed"]["posts"].as_array().unwrap().len(), 3);
    assert_eq!(second["feed"]["page"]["number"], 2);
    assert_eq!(second["feed"]["page"]["has_previous"], true);
    assert_eq!(second["feed"]["page"]["has_next"], false);
}

#[actix_web::test]
async fn index_and_profile_paginate_by_ten() {
    let ctx = context();
    let author = ctx.user("leo").await;
    ctx.posts(&author, None, 13).await;

    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure)).await;

    for (uri, expected) in [
        ("/", 10),
        ("/?page=2", 3),
        ("/profile/leo/", 10),
        ("/profile/leo/?page=2", 3),
    ] {
        let body: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri(uri).to_request())
                .await;
        let posts = if body.get("feed").is_some() {
            &body["feed"]["posts"]
        } else {
            &body["posts"]
        };
        assert_eq!(posts.as_array().unwrap().len(), expected, "uri {}", uri);
    }
}

#[actix_web::test]
async fn global_feed_is_newest_first_across_pages() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let anna = ctx.user("anna").await;
    let mut created = Vec::new();
    for i in 0..12i64 {
        let author = if i % 2 == 0 { &leo } else { &anna };
        created.push(ctx.post(author, None, &format!("post {}", i), 100 - i).await);
    }

    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure)).await;

    let mut ids = Vec::new();
    for page in 1..=2 {
        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("/?page={}", page))
                .to_request(),
        )
        .await;
        ids.extend(post_ids(&body));
    }

    let expected: Vec<i64> = created.iter().rev().map(|p| p.id).collect();
    assert_eq!(ids, expected);
}

#[actix_web::test]
async fn out_of_range_and_garbage_pages_are_clamped() {
    let ctx = context();
    let author = ctx.user("leo").await;
    ctx.posts(&author, None, 13).await;

    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure)).await;

    let last: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/leo/?page=99")
            .to_request(),
    )
    .await;
    assert_eq!(last["feed"]["page"]["number"], 2);
    assert_eq!(last["feed"]["posts"].as_array().unwrap().len(), 3);

    let garbage: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/leo/?page=abc")
            .to_request(),
    )
    .await;
    assert_eq!(garbage["feed"]["page"]["number"], 1);
}

#[actix_web::test]
async fn empty_feed_is_page_one_with_no_pages() {
    let ctx = context();
    ctx.group("empty").await;

    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure)).await;

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/group/empty/?page=3")
            .to_request(),
    )
    .await;
    assert_eq!(body["feed"]["page"]["number"], 1);
    assert_eq!(body["feed"]["page"]["total_pages"], 0);
    assert!(body["feed"]["posts"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn unknown_group_user_and_post_are_404() {
    let ctx = context();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure)).await;

    for uri in [
        "/group/does-not-exist/",
        "/profile/nobody/",
        "/posts/999/",
        "/posts/not-a-number/",
        "/no/such/page/",
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "uri {}", uri);
    }

    let body: Value = test::read_body_json(
        test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/group/does-not-exist/")
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(body["status"], 404);
}

#[actix_web::test]
async fn profile_exposes_total_post_count() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let anna = ctx.user("anna").await;
    ctx.posts(&leo, None, 13).await;
    ctx.posts(&anna, None, 2).await;

    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure)).await;

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/leo/?page=2")
            .to_request(),
    )
    .await;
    assert_eq!(body["profile"]["username"], "leo");
    assert_eq!(body["profile"]["display_name"], "leo-first");
    assert_eq!(body["posts_count"], 13);
    assert_eq!(body["following"], false);
}

#[actix_web::test]
async fn feed_item_carries_author_group_and_image() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let group = ctx.group("cats").await;
    ctx.memory
        .create_post(NewPost {
            author_id: leo.id,
            text: "with picture".to_string(),
            group_id: Some(group.id),
            image: Some("posts/cat.png".to_string()),
        })
        .await
        .unwrap();

    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure)).await;

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    let item = &body["posts"][0];
    assert_eq!(item["text"], "with picture");
    assert_eq!(item["author"]["username"], "leo");
    assert_eq!(item["group"]["slug"], "cats");
    assert_eq!(item["group"]["title"], "Group cats");
    assert_eq!(item["image"], "posts/cat.png");
}

#[actix_web::test]
async fn post_detail_lists_comments_and_author_count() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let anna = ctx.user("anna").await;
    let posts = ctx.posts(&leo, None, 3).await;
    let target = posts[0].id;

    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure)).await;

    for text in ["first!", "second"] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/posts/{}/comment/", target))
                .insert_header(ctx.bearer(&anna))
                .set_form([("text", text)])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/", target))
            .to_request(),
    )
    .await;
    assert_eq!(body["post"]["id"], target);
    assert_eq!(body["post_title"], "post number 0");
    assert_eq!(body["author_posts_count"], 3);
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["text"], "second");
    assert_eq!(comments[1]["author"]["username"], "anna");
}

#[actix_web::test]
async fn cached_index_hides_new_post_until_invalidated() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    ctx.posts(&leo, None, 2).await;

    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure)).await;

    let before: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(post_ids(&before).len(), 2);

    let fresh = ctx.post(&leo, None, "fresh", 0).await;

    let cached: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(cached, before);

    // other feeds are not cached
    let profile: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/profile/leo/").to_request(),
    )
    .await;
    assert_eq!(profile["feed"]["posts"][0]["id"], fresh.id);

    assert!(ctx.state.page_cache.invalidate("global-index:page=1"));
    let after: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(post_ids(&after)[0], fresh.id);
}

#[actix_web::test]
async fn deleting_group_keeps_its_posts() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let group = ctx.group("cats").await;
    let post = ctx.post(&leo, Some(&group), "meow", 1).await;

    assert!(ctx.memory.delete_group(group.id).await.unwrap());

    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/group/cats/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let detail: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/", post.id))
            .to_request(),
    )
    .await;
    assert_eq!(detail["post"]["text"], "meow");
    assert!(detail["post"]["group"].is_null());

    let stored = PostRepository::find_by_id(&ctx.memory, post.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.group_id, None);

    // editing such a post still works without a group
    ctx.memory
        .update_post(
            post.id,
            PostChanges {
                text: "still here".to_string(),
                group_id: None,
                image: None,
            },
        )
        .await
        .unwrap();
}

#[actix_web::test]
async fn health_metrics_and_openapi_respond() {
    let ctx = context();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure)).await;

    for uri in ["/health", "/metrics", "/openapi.json"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "uri {}", uri);
    }

    let doc: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/openapi.json").to_request(),
    )
    .await;
    assert!(doc["components"]["schemas"]["FeedPage"].is_object());
}

#[actix_web::test]
async fn post_title_is_cut_to_thirty_characters() {
    let ctx = context();
    let leo = ctx.user("leo").await;
    let post = ctx
        .post(&leo, None, "A rather long post that keeps going past the title", 1)
        .await;

    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure)).await;

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}/", post.id))
            .to_request(),
    )
    .await;
    assert_eq!(body["post_title"], "A rather long post that keeps ");
    assert_eq!(body["post"]["text"], post.text);
}
