use axum::{
    Router,
    extract::{DefaultBodyLimit, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use std::sync::Arc;

use crate::{ServerError, media, tags, transactions, user, wallets};
use engine::Engine;

/// Largest accepted image upload, multipart overhead included.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolve `Authorization: Bearer <token>` to an account and hand it to the
/// handler as an `Extension<Account>`.
async fn auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>()
    else {
        return Err(ServerError::Unauthorized);
    };

    let account = state.engine.principal(bearer.token()).await?;
    tracing::trace!(user_id = account.id, "authenticated request");

    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

/// Build the application router around `engine`.
///
/// Authentication is layered per method router, so a wrong method on a
/// protected path is a 405 before any token is looked at.
pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };
    let auth = middleware::from_fn_with_state(state.clone(), auth);

    Router::new()
        .route("/user/create", post(user::create))
        .route("/user/token", post(user::token))
        .route(
            "/user/profile",
            get(user::profile)
                .patch(user::update_profile)
                .route_layer(auth.clone()),
        )
        .route(
            "/wallets",
            get(wallets::list)
                .post(wallets::create)
                .route_layer(auth.clone()),
        )
        .route(
            "/tags",
            get(tags::list).post(tags::create).route_layer(auth.clone()),
        )
        .route(
            "/transactions",
            get(transactions::list)
                .post(transactions::create)
                .route_layer(auth.clone()),
        )
        .route(
            "/transactions/{id}",
            get(transactions::detail)
                .put(transactions::replace)
                .patch(transactions::update)
                .delete(transactions::delete)
                .route_layer(auth.clone()),
        )
        .route(
            "/transactions/{id}/upload-image",
            post(transactions::upload_image)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
                .route_layer(auth),
        )
        .route("/media/{*path}", get(media::serve))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}
