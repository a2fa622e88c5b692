pub mod error;
pub mod logging;
pub mod routes;
pub mod state;

use std::future::Future;

use axum::Router;
use log::info;
use tokio::net::TcpListener;

pub use error::ServerError;
pub use routes::api_routes;
pub use state::AppState;

/// The full HTTP application.
pub fn app(state: AppState) -> Router {
    Router::new().merge(api_routes()).with_state(state)
}

/// Serves the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
}
