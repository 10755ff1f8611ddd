//! Liveness HTTP endpoint.
//!
//! Hosting platforms poll `/` to keep the process alive; `/health` adds a
//! JSON view of the tracker for quick inspection. Runs axum on a dedicated
//! thread with a current-thread tokio runtime so the rest of the bot stays
//! plain blocking code.

use crate::engine::EngineState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

type SharedState = Arc<Mutex<EngineState>>;

pub fn spawn_health_server(port: u16, state: SharedState) -> JoinHandle<()> {
    thread::Builder::new()
        .name("sniper-health".into())
        .spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_io()
                .build()
                .expect("failed to build health server runtime");
            runtime.block_on(serve(port, state));
        })
        .expect("failed to spawn health server thread")
}

async fn serve(port: u16, state: SharedState) {
    let app = router(state);
    let addr = format!("0.0.0.0:{port}");
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %addr, "health server failed to bind");
            return;
        }
    };
    tracing::info!(%addr, "health server listening");
    if let Err(error) = axum::serve(listener, app).await {
        tracing::error!(%error, "health server exited");
    }
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
}

async fn root() -> &'static str {
    "Sniper bot active"
}

async fn health(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let state = state.lock().expect("engine state poisoned");
    Json(serde_json::json!({
        "status": "healthy",
        "analysis_cycles": state.analysis_cycles,
        "open_trades": if state.tracker.has_open_trade() { 1 } else { 0 },
        "closed_trades": state.tracker.history().len(),
        "balance": state.tracker.account().balance(),
    }))
}
