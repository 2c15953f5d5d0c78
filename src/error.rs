use reqwest::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Template(#[from] handlebars::RenderError),
    #[error("upstream answered with status {status}")]
    UpstreamStatus { status: StatusCode },
    #[error("rate gate worker is not running")]
    GateClosed,
    #[error("{message}")]
    InvalidConfig { message: String },
}
