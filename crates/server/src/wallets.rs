use api_types::wallet::{WalletNew, WalletView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{Account, Wallet, WalletCmd};

use crate::{ApiJson, ServerError, server::ServerState};

fn wallet_view(wallet: Wallet) -> WalletView {
    WalletView {
        id: wallet.id,
        user: wallet.user_id,
        name: wallet.name,
        balance: wallet.balance,
        currency: wallet.currency,
    }
}

pub async fn list(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<WalletView>>, ServerError> {
    let wallets = state.engine.list_wallets(account.id).await?;
    Ok(Json(wallets.into_iter().map(wallet_view).collect()))
}

/// Any `user` sent by the client is ignored: the owner is the caller.
pub async fn create(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<WalletNew>,
) -> Result<(StatusCode, Json<WalletView>), ServerError> {
    let wallet = state
        .engine
        .create_wallet(
            account.id,
            WalletCmd {
                name: payload.name,
                currency: payload.currency,
                balance: payload.balance,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(wallet_view(wallet))))
}
