use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("ERR-DB-000: store unavailable: {0}")]
    Connection(String),

    #[error("ERR-DB-001: {0}")]
    Store(#[from] sqlx::Error),

    #[error("ERR-DB-002: malformed id {0:?}")]
    MalformedId(String),

    #[error("ERR-DB-003: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("{label}")]
    Failed {
        label: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("ERR-API-000: {status}: {body}")]
    Api { status: u16, body: String },

    #[error("ERR-API-001: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ERR-CONF-000: {0}")]
    Config(#[from] config::ConfigError),

    #[error("ERR-UI-000: {0}")]
    Template(#[from] askama::Error),

    #[error("ERR-IO-000: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Tags a store fault with the operation it broke. Validation errors pass
    /// through untouched so they still answer 400.
    pub fn during(self, label: &'static str) -> Self {
        match self {
            Error::Validation(_) | Error::Failed { .. } => self,
            source => Error::Failed {
                label,
                source: Box::new(source),
            },
        }
    }
}

/// A body axum cannot decode is a client error, same as a missing field.
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Error::Failed { label, source } => {
                tracing::error!("{}: {}", label, source);
                (StatusCode::INTERNAL_SERVER_ERROR, label).into_response()
            }
            other => {
                tracing::error!("request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let res = Error::invalid("Missing required fields").into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn during_keeps_validation_and_wraps_store_faults() {
        let kept = Error::invalid("nope").during("Failed to create job");
        assert!(matches!(kept, Error::Validation(_)));

        let wrapped = Error::Connection("no url".into()).during("Failed to load jobs");
        assert_eq!(wrapped.to_string(), "Failed to load jobs");
        assert_eq!(
            wrapped.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
