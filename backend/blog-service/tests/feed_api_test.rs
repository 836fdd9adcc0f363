#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use blog_service::db::FollowRepository;
use common::{location, TestContext};
use serde_json::Value;

fn ids(body: &Value) -> Vec<i64> {
    body["page_obj"]["object_list"]
        .as_array()
        .expect("object_list")
        .iter()
        .map(|p| p["id"].as_i64().expect("id"))
        .collect()
}

#[actix_web::test]
async fn index_lists_newest_first() {
    let ctx = TestContext::new();
    let author = ctx.store.insert_user("author").await;
    let oldest = ctx.post(&author, "oldest", None, 30).await;
    let middle = ctx.post(&author, "middle", None, 20).await;
    let newest = ctx.post(&author, "newest", None, 10).await;
    let app = test_app!(ctx).await;

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(ids(&body), vec![newest.id, middle.id, oldest.id]);
    assert_eq!(body["page_obj"]["object_list"][0]["author"]["username"], "author");
}

#[actix_web::test]
async fn pages_split_thirteen_posts_into_ten_and_three() {
    let ctx = TestContext::new();
    let author = ctx.store.insert_user("author").await;
    for i in 0..13 {
        ctx.post(&author, &format!("post {}", i), None, i).await;
    }
    let app = test_app!(ctx).await;

    let first: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(ids(&first).len(), 10);
    assert_eq!(first["page_obj"]["num_pages"], 2);
    assert_eq!(first["page_obj"]["has_next"], true);

    let second: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/?page=2").to_request(),
    )
    .await;
    assert_eq!(ids(&second).len(), 3);

    let mut all = ids(&first);
    all.extend(ids(&second));
    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len(), 13);
}

#[actix_web::test]
async fn invalid_page_numbers_clamp() {
    let ctx = TestContext::new();
    let author = ctx.store.insert_user("author").await;
    let group = ctx.store.insert_group("Test", "test_slug", "").await;
    for i in 0..13 {
        ctx.post(&author, &format!("post {}", i), Some(group.id), i).await;
    }
    let app = test_app!(ctx).await;

    for (uri, expected) in [
        ("/group/test_slug/?page=abc", 1),
        ("/group/test_slug/?page=0", 1),
        ("/group/test_slug/?page=99", 2),
    ] {
        let body: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri(uri).to_request())
                .await;
        assert_eq!(body["page_obj"]["number"], expected, "{}", uri);
    }
}

#[actix_web::test]
async fn group_page_only_shows_its_posts() {
    let ctx = TestContext::new();
    let author = ctx.store.insert_user("author").await;
    let group = ctx.store.insert_group("Test group", "test_slug", "about").await;
    ctx.store.insert_group("Other group", "other_slug", "").await;
    let post = ctx.post(&author, "grouped", Some(group.id), 1).await;
    ctx.post(&author, "ungrouped", None, 2).await;
    let app = test_app!(ctx).await;

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/group/test_slug/").to_request(),
    )
    .await;
    assert_eq!(ids(&body), vec![post.id]);
    assert_eq!(body["group"]["title"], "Test group");
    assert_eq!(body["group"]["description"], "about");

    let other: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/group/other_slug/").to_request(),
    )
    .await;
    assert!(ids(&other).is_empty());
}

#[actix_web::test]
async fn unknown_group_user_and_post_are_404() {
    let ctx = TestContext::new();
    let app = test_app!(ctx).await;

    for uri in [
        "/group/missing/",
        "/profile/nobody/",
        "/posts/999/",
        "/posts/not-a-number/",
        "/unexisting_page/",
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[actix_web::test]
async fn profile_shows_author_posts_and_following_flag() {
    let ctx = TestContext::new();
    let author = ctx.store.insert_user("author").await;
    let reader = ctx.store.insert_user("reader").await;
    let post = ctx.post(&author, "mine", None, 1).await;
    ctx.post(&reader, "not mine", None, 2).await;
    ctx.store.insert_follow(reader.id, author.id).await.unwrap();
    let app = test_app!(ctx).await;

    let anonymous: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/profile/author/").to_request(),
    )
    .await;
    assert_eq!(ids(&anonymous), vec![post.id]);
    assert_eq!(anonymous["author"]["username"], "author");
    assert_eq!(anonymous["following"], false);

    let as_reader: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/author/")
            .insert_header(ctx.bearer(&reader))
            .to_request(),
    )
    .await;
    assert_eq!(as_reader["following"], true);

    let as_author: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/profile/author/")
            .insert_header(ctx.bearer(&author))
            .to_request(),
    )
    .await;
    assert_eq!(as_author["following"], false);
}

#[actix_web::test]
async fn follow_feed_shows_only_followed_authors() {
    let ctx = TestContext::new();
    let author = ctx.store.insert_user("author").await;
    let follower = ctx.store.insert_user("follower").await;
    let bystander = ctx.store.insert_user("bystander").await;
    let post = ctx.post(&author, "followed post", None, 1).await;
    ctx.store.insert_follow(follower.id, author.id).await.unwrap();
    let app = test_app!(ctx).await;

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/follow/")
            .insert_header(ctx.bearer(&follower))
            .to_request(),
    )
    .await;
    assert_eq!(ids(&body), vec![post.id]);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/follow/")
            .insert_header(ctx.bearer(&bystander))
            .to_request(),
    )
    .await;
    assert!(ids(&body).is_empty());
    assert_eq!(body["page_obj"]["num_pages"], 1);
}

#[actix_web::test]
async fn follow_feed_merges_authors_newest_first_across_pages() {
    let ctx = TestContext::with_per_page(3);
    let reader = ctx.store.insert_user("reader").await;
    let alice = ctx.store.insert_user("alice").await;
    let bob = ctx.store.insert_user("bob").await;
    let stranger = ctx.store.insert_user("stranger").await;

    ctx.post(&stranger, "stranger newest", None, 5).await;
    let a1 = ctx.post(&alice, "alice newer", None, 10).await;
    ctx.post(&stranger, "stranger middle", None, 15).await;
    let b1 = ctx.post(&bob, "bob newer", None, 20).await;
    ctx.post(&stranger, "stranger older", None, 25).await;
    let a2 = ctx.post(&alice, "alice older", None, 30).await;
    let b2 = ctx.post(&bob, "bob older", None, 40).await;

    ctx.store.insert_follow(reader.id, alice.id).await.unwrap();
    ctx.store.insert_follow(reader.id, bob.id).await.unwrap();
    let app = test_app!(ctx).await;

    let first: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/follow/")
            .insert_header(ctx.bearer(&reader))
            .to_request(),
    )
    .await;
    assert_eq!(ids(&first), vec![a1.id, b1.id, a2.id]);
    assert_eq!(first["page_obj"]["count"], 4);
    assert_eq!(first["page_obj"]["num_pages"], 2);
    assert_eq!(first["page_obj"]["has_next"], true);

    let second: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/follow/?page=2")
            .insert_header(ctx.bearer(&reader))
            .to_request(),
    )
    .await;
    assert_eq!(ids(&second), vec![b2.id]);
    assert_eq!(second["page_obj"]["has_next"], false);
    assert_eq!(second["page_obj"]["has_previous"], true);
}

#[actix_web::test]
async fn follow_feed_requires_login() {
    let ctx = TestContext::new();
    let app = test_app!(ctx).await;

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/follow/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login/?next=/follow/");
}

#[actix_web::test]
async fn session_cookie_authenticates() {
    let ctx = TestContext::new();
    let reader = ctx.store.insert_user("reader").await;
    let token = ctx.verifier.issue(reader.id, &reader.username).unwrap();
    let app = test_app!(ctx).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/follow/")
            .cookie(actix_web::cookie::Cookie::new(common::SESSION_COOKIE, token))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn invalid_token_is_treated_as_anonymous() {
    let ctx = TestContext::new();
    let app = test_app!(ctx).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/follow/")
            .insert_header(("Authorization", "Bearer garbage"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}
