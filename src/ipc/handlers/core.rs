use crate::config::AcceptancePolicy;
use crate::db;
use crate::ipc::error::{err, internal, ok};
use crate::ipc::types::{AppState, Request, ACCEPTANCE_KEY};
use serde_json::json;

fn settings_view(state: &AppState, req: &Request) -> serde_json::Value {
    match state.acceptance() {
        Ok(policy) => ok(&req.id, json!({ "acceptance": policy.as_str() })),
        Err(e) => internal(&req.id, "db_query_failed", e),
    }
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    let acceptance = state
        .acceptance()
        .unwrap_or(state.config.acceptance)
        .as_str();
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "acceptance": acceptance,
        }),
    )
}

fn handle_session_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.reset() {
        Ok(()) => {
            tracing::info!("session reset");
            ok(&req.id, json!({ "reset": true }))
        }
        Err(e) => internal(&req.id, "internal", e),
    }
}

fn handle_settings_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    settings_view(state, req)
}

fn handle_settings_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(raw) = req.params.get("acceptance") {
        let Some(policy) = raw.as_str().and_then(AcceptancePolicy::parse) else {
            return err(
                &req.id,
                "bad_params",
                "acceptance must be \"gated\" or \"optimistic\"",
                Some(json!({ "got": raw })),
            );
        };
        if let Err(e) = db::settings_set_json(&state.db, ACCEPTANCE_KEY, &json!(policy.as_str())) {
            return internal(&req.id, "db_insert_failed", e);
        }
        tracing::info!(acceptance = policy.as_str(), "acceptance policy changed");
    }
    settings_view(state, req)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "session.reset" => Some(handle_session_reset(state, req)),
        "settings.get" => Some(handle_settings_get(state, req)),
        "settings.set" => Some(handle_settings_set(state, req)),
        _ => None,
    }
}
