mod health;
mod metrics;
mod preview;
mod reconcile;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use preview::preview_handler;
pub use reconcile::reconcile_handler;
