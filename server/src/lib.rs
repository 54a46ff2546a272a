pub mod config;
pub mod error;
pub mod migrations;
pub mod static_files;

use axum::Router;
use tower_http::trace::TraceLayer;

use config::Config;
use static_files::StaticFiles;

/// Static site for the configured root, with request tracing.
pub fn app(config: &Config) -> Router {
    let files = StaticFiles::new(config.static_root.clone(), config.rewrite_target());
    static_files::router(files).layer(TraceLayer::new_for_http())
}
