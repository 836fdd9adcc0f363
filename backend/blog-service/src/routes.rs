use crate::handlers::{admin, comments, feed, follow, health, posts};
use crate::metrics::serve_metrics;
use actix_web::web;

/// Public pages, authenticated actions and operational endpoints
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::liveness_check))
        .route("/ready", web::get().to(health::readiness_check))
        .route("/metrics", web::get().to(serve_metrics))
        .route("/", web::get().to(feed::index))
        .route("/group/{slug}/", web::get().to(feed::group_posts))
        .route("/follow/", web::get().to(feed::follow_index))
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::create_form))
                .route(web::post().to(posts::create_post)),
        )
        .service(
            web::scope("/profile/{username}")
                .route("/", web::get().to(feed::profile))
                .route("/follow/", web::get().to(follow::profile_follow))
                .route("/follow/", web::post().to(follow::profile_follow))
                .route("/unfollow/", web::get().to(follow::profile_unfollow))
                .route("/unfollow/", web::post().to(follow::profile_unfollow)),
        )
        .service(
            web::scope("/posts/{post_id}")
                .route("/", web::get().to(posts::post_detail))
                .service(
                    web::resource("/edit/")
                        .route(web::get().to(posts::edit_form))
                        .route(web::post().to(posts::edit_post)),
                )
                .route("/comment/", web::route().to(comments::add_comment)),
        );
}

/// Maintenance routes
pub fn configure_admin(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/admin/cache/clear/",
        web::post().to(admin::clear_page_cache),
    );
}
