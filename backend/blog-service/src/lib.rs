/// Blog Service Library
///
/// Posts, groups, comments and author subscriptions for the Yatube blogging
/// platform. Feeds are paginated listings returned as typed view-models.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: Entities, submitted forms and view-models
/// - `pagination`: Page-number pagination with clamping
/// - `services`: Feed assembly, post mutation, comments and subscriptions
/// - `db`: Repository traits with PostgreSQL and in-memory stores
/// - `cache`: TTL page cache for the global feed
/// - `middleware`: Session identity and ownership guards
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod pagination;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
