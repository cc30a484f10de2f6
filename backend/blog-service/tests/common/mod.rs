//! Shared fixtures for HTTP-level tests: an in-memory store behind the full
//! route table, seeded users and groups, and signed session tokens.
#![allow(dead_code)]

use actix_web::http::header;
use actix_web::web;
use chrono::{DateTime, Duration, Utc};

use blog_service::config::SiteConfig;
use blog_service::db::{GroupRepository, MemoryStore, Store, UserRepository};
use blog_service::models::{Group, NewGroup, NewPost, NewUser, Post, User};
use blog_service::AppState;

pub const SECRET: &str = "test-session-secret";

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub memory: MemoryStore,
}

pub fn site() -> SiteConfig {
    SiteConfig {
        session_secret: SECRET.to_string(),
        ..SiteConfig::default()
    }
}

pub fn context() -> TestContext {
    let memory = MemoryStore::new();
    let state = AppState::new(Store::from_memory(memory.clone()), site());
    TestContext {
        state: web::Data::new(state),
        memory,
    }
}

impl TestContext {
    pub async fn user(&self, username: &str) -> User {
        let mut new_user = NewUser::new(username);
        new_user.first_name = format!("{}-first", username);
        UserRepository::create_user(&self.memory, new_user)
            .await
            .expect("create user")
    }

    pub async fn group(&self, slug: &str) -> Group {
        self.memory
            .create_group(NewGroup {
                title: format!("Group {}", slug),
                slug: slug.to_string(),
                description: format!("All about {}", slug),
            })
            .await
            .expect("create group")
    }

    /// Post published `minutes_ago` minutes before now.
    pub async fn post(
        &self,
        author: &User,
        group: Option<&Group>,
        text: &str,
        minutes_ago: i64,
    ) -> Post {
        self.memory
            .create_post_at(
                NewPost {
                    author_id: author.id,
                    text: text.to_string(),
                    group_id: group.map(|g| g.id),
                    image: None,
                },
                minutes_ago_to_time(minutes_ago),
            )
            .await
            .expect("create post")
    }

    /// `count` posts, the first one being the oldest.
    pub async fn posts(&self, author: &User, group: Option<&Group>, count: usize) -> Vec<Post> {
        let mut posts = Vec::with_capacity(count);
        for i in 0..count {
            let minutes_ago = (count - i) as i64;
            posts.push(
                self.post(author, group, &format!("post number {}", i), minutes_ago)
                    .await,
            );
        }
        posts
    }

    pub fn bearer(&self, user: &User) -> (header::HeaderName, String) {
        let token = self.state.sessions.issue(user.id).expect("issue token");
        (header::AUTHORIZATION, format!("Bearer {}", token))
    }

    pub fn cookie(&self, user: &User) -> actix_web::cookie::Cookie<'static> {
        let token = self.state.sessions.issue(user.id).expect("issue token");
        actix_web::cookie::Cookie::new(self.state.site.session_cookie_name.clone(), token)
    }
}

pub fn minutes_ago_to_time(minutes: i64) -> DateTime<Utc> {
    Utc::now() - Duration::minutes(minutes)
}

pub fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
