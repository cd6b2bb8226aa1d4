use api_types::tag::{TagNew, TagView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{Account, Tag, TagCmd};

use crate::{ApiJson, ServerError, server::ServerState};

pub(crate) fn tag_view(tag: Tag) -> TagView {
    TagView {
        id: tag.id,
        user: tag.user_id,
        name: tag.name,
    }
}

pub async fn list(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TagView>>, ServerError> {
    let tags = state.engine.list_tags(account.id).await?;
    Ok(Json(tags.into_iter().map(tag_view).collect()))
}

pub async fn create(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<TagNew>,
) -> Result<(StatusCode, Json<TagView>), ServerError> {
    let tag = state
        .engine
        .create_tag(account.id, TagCmd { name: payload.name })
        .await?;

    Ok((StatusCode::CREATED, Json(tag_view(tag))))
}
