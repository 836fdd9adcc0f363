/// Blog Service Library
///
/// Posts, groups, comments and follows with a personalized feed. Listings are
/// paginated, and the index listing is served from a short-lived page cache.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers returning render contexts or redirects
/// - `models`: Row and view types for posts, groups, comments, follows
/// - `services`: Feed building, pagination, posting, commenting, following
/// - `db`: Repository traits with PostgreSQL and in-memory implementations
/// - `forms`: Submission payloads and their validation
/// - `middleware`: Session authentication and request metrics
/// - `security`: Session token verification
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;

pub use app_state::AppState;
pub use config::Config;
pub use error::{AppError, Result};
