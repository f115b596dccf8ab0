mod http_handler;

use std::sync::Arc;

use http_handler::function_handler;
use lambda_http::{run, service_fn, tracing, Error};
use shopfront_shared::AppState;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let state = Arc::new(AppState::from_env().await);
    tracing::info!("🚀 Shopfront API cold start complete");

    run(service_fn(move |event| {
        let state = state.clone();
        async move { function_handler(event, state).await }
    }))
    .await
}
