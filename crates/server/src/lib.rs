use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
};
use engine::{EngineError, ValidationErrors};

use serde::Serialize;
pub use server::{router, run_with_listener};

mod media;
mod server;
mod tags;
mod transactions;
mod user;
mod wallets;

pub mod types {
    pub mod user {
        pub use api_types::user::{ProfileUpdate, TokenRequest, TokenResponse, UserCreate, UserView};
    }

    pub mod wallet {
        pub use api_types::wallet::{WalletNew, WalletView};
    }

    pub mod tag {
        pub use api_types::tag::{TagNew, TagView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionDetailView, TransactionQuery, TransactionView, TransactionWrite,
        };
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
    Unauthorized,
}

#[derive(Serialize)]
struct Error {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<ValidationErrors>,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_)
        | EngineError::InvalidCredentials
        | EngineError::InvalidImage(_) => StatusCode::BAD_REQUEST,
        EngineError::Unauthorized => StatusCode::UNAUTHORIZED,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::PasswordHash(_) | EngineError::Storage(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn body_for_engine_error(err: EngineError) -> Error {
    match err {
        EngineError::Validation(fields) => Error {
            error: "invalid input".to_string(),
            fields: Some(fields),
        },
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            Error {
                error: "internal server error".to_string(),
                fields: None,
            }
        }
        EngineError::Storage(io_err) => {
            tracing::error!("storage error: {io_err}");
            Error {
                error: "internal server error".to_string(),
                fields: None,
            }
        }
        EngineError::PasswordHash(hash_err) => {
            tracing::error!("password hashing failed: {hash_err}");
            Error {
                error: "internal server error".to_string(),
                fields: None,
            }
        }
        other => Error {
            error: other.to_string(),
            fields: None,
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(err) => (
                StatusCode::BAD_REQUEST,
                Error {
                    error: err,
                    fields: None,
                },
            ),
            ServerError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Error {
                    error: "Authentication credentials were not provided.".to_string(),
                    fields: None,
                },
            ),
        };

        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], Json(body)).into_response();
        }
        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

/// A path segment that does not parse names no existing item.
impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        tracing::debug!("path rejected: {}", value.body_text());
        Self::Engine(EngineError::KeyNotFound("id".to_string()))
    }
}

/// Path extractor whose rejections use the API error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServerError))]
pub(crate) struct ApiPath<T>(pub T);

/// JSON body extractor whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub(crate) struct ApiJson<T>(pub T);
