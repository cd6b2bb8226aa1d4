//! Transactions API endpoints

use api_types::transaction::{
    TransactionDetailView, TransactionQuery, TransactionView, TransactionWrite,
};
use axum::{
    Extension, Json,
    extract::{Multipart, Query, State},
    http::StatusCode,
};
use engine::{Account, EngineError, Transaction, TransactionCmd, UpdateMode, ValidationErrors};

use crate::{ApiJson, ApiPath, ServerError, media, server::ServerState, tags::tag_view};

/// Multipart field carrying the upload.
const IMAGE_FIELD: &str = "image";

fn transaction_view(tx: Transaction) -> TransactionView {
    let tags = tx.tag_ids();
    TransactionView {
        id: tx.id,
        user: tx.user_id,
        flow: tx.flow,
        category: tx.category,
        wallet: tx.wallet_id,
        tags,
        date: tx.date,
        note: tx.note,
        amount: tx.amount,
        image: tx.image.as_deref().map(media::url),
    }
}

fn transaction_detail_view(tx: Transaction) -> TransactionDetailView {
    TransactionDetailView {
        id: tx.id,
        user: tx.user_id,
        flow: tx.flow,
        category: tx.category,
        wallet: tx.wallet_id,
        tags: tx.tags.into_iter().map(tag_view).collect(),
        date: tx.date,
        note: tx.note,
        amount: tx.amount,
        image: tx.image.as_deref().map(media::url),
    }
}

fn command(payload: TransactionWrite) -> TransactionCmd {
    TransactionCmd {
        flow: payload.flow,
        category: payload.category,
        wallet_id: payload.wallet,
        tags: payload.tags,
        date: payload.date,
        note: payload.note,
        amount: payload.amount,
    }
}

pub async fn list(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let txs = state
        .engine
        .list_transactions(account.id, query.keyword.as_deref())
        .await?;

    Ok(Json(txs.into_iter().map(transaction_view).collect()))
}

pub async fn create(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<TransactionWrite>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let tx = state
        .engine
        .create_transaction(account.id, command(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(transaction_view(tx))))
}

pub async fn detail(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<TransactionDetailView>, ServerError> {
    let tx = state.engine.transaction(account.id, id).await?;
    Ok(Json(transaction_detail_view(tx)))
}

/// `PUT`: every required field must be sent again.
pub async fn replace(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<TransactionWrite>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .update_transaction(account.id, id, command(payload), UpdateMode::Full)
        .await?;

    Ok(Json(transaction_view(tx)))
}

/// `PATCH`: only the fields sent are changed.
pub async fn update(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<TransactionWrite>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .update_transaction(account.id, id, command(payload), UpdateMode::Partial)
        .await?;

    Ok(Json(transaction_view(tx)))
}

pub async fn delete(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(account.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload_image(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i32>,
    mut multipart: Multipart,
) -> Result<Json<TransactionView>, ServerError> {
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ServerError::Generic(err.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ServerError::Generic(err.body_text()))?;
        image = Some(bytes.to_vec());
    }

    let Some(bytes) = image else {
        // a foreign transaction is reported missing even without a file
        state.engine.transaction(account.id, id).await?;
        return Err(EngineError::Validation(ValidationErrors::single(
            IMAGE_FIELD,
            "No file was submitted.",
        ))
        .into());
    };

    let tx = state
        .engine
        .upload_transaction_image(account.id, id, bytes)
        .await?;
    Ok(Json(transaction_view(tx)))
}
