//! Read access to uploaded files.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use engine::EngineError;

use crate::{ApiPath, ServerError, server::ServerState};

/// URL path under which a stored reference is served.
pub(crate) fn url(reference: &str) -> String {
    format!("/media/{reference}")
}

pub async fn serve(
    State(state): State<ServerState>,
    ApiPath(path): ApiPath<String>,
) -> Result<Response, ServerError> {
    let Some((bytes, content_type)) = state.engine.media().read(&path).await? else {
        return Err(EngineError::KeyNotFound("file not exists".to_string()).into());
    };

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
