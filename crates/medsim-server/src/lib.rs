pub mod config;
pub mod handlers;
pub mod observability;
pub mod server;

pub use config::AppConfig;
pub use observability::{apply_logging_config, filter_directives, init_tracing};
pub use server::{AppState, MedsimServer, ServerBuilder, build_app, build_app_with_state};
