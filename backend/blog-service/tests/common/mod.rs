#![allow(dead_code)]

use blog_service::db::MemoryStore;
use blog_service::models::{Post, PostDraft, User};
use blog_service::security::TokenVerifier;
use blog_service::AppState;
use chrono::{Duration as ChronoDuration, Utc};
use page_cache::{PageCache, DEFAULT_MAX_ENTRIES};
use std::sync::Arc;
use std::time::Duration;

pub const TEST_SECRET: &str = "blog-service-test-secret";
pub const SESSION_COOKIE: &str = "session";

/// Memory-backed state plus handles the tests seed and inspect
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub page_cache: Arc<PageCache>,
    pub state: AppState,
    pub verifier: Arc<TokenVerifier>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_per_page(10)
    }

    pub fn with_per_page(per_page: u64) -> Self {
        let store = Arc::new(MemoryStore::new());
        let page_cache = Arc::new(PageCache::in_memory(
            Duration::from_secs(20),
            DEFAULT_MAX_ENTRIES,
        ));
        let state = AppState::new(store.clone(), page_cache.clone(), per_page);

        Self {
            store,
            page_cache,
            state,
            verifier: Arc::new(TokenVerifier::new(TEST_SECRET)),
        }
    }

    pub fn bearer(&self, user: &User) -> (&'static str, String) {
        let token = self
            .verifier
            .issue(user.id, &user.username)
            .expect("issue token");
        ("Authorization", format!("Bearer {}", token))
    }

    /// Post created `minutes_ago` minutes in the past
    pub async fn post(
        &self,
        author: &User,
        text: &str,
        group_id: Option<i64>,
        minutes_ago: i64,
    ) -> Post {
        self.store
            .insert_post_at(
                author.id,
                &PostDraft {
                    text: text.to_string(),
                    group_id,
                    image: None,
                },
                Utc::now() - ChronoDuration::minutes(minutes_ago),
            )
            .await
            .expect("insert post")
    }
}

/// Build the service under test with every route mounted
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($ctx.state.clone()))
                .app_data(actix_web::web::Data::new(
                    blog_service::middleware::AuthSettings::default(),
                ))
                .wrap(blog_service::middleware::SessionAuthMiddleware::new(
                    $ctx.verifier.clone(),
                    $ctx.state.store.clone(),
                    common::SESSION_COOKIE,
                ))
                .configure(blog_service::routes::configure)
                .configure(blog_service::routes::configure_admin),
        )
    };
}

pub fn location(resp: &actix_web::dev::ServiceResponse) -> String {
    resp.headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
