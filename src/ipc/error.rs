use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let message = message.into();
    tracing::debug!(id, code, %message, "request failed");
    let mut error = json!({
        "code": code,
        "message": message,
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Storage failures are logged with their full context chain.
pub fn internal(id: &str, code: &str, e: anyhow::Error) -> serde_json::Value {
    let message = format!("{e:#}");
    tracing::warn!(id, code, error = %message, "storage failure");
    err(id, code, message, None)
}
