use crate::entity::EntityKind;
use crate::ipc::error::err;
use crate::ipc::types::Request;
use serde_json::Value;

/// Reads `params.entity`; the `Err` side is a ready-to-send error response.
pub fn entity_param(req: &Request) -> Result<EntityKind, Value> {
    let Some(raw) = req.params.get("entity").and_then(|v| v.as_str()) else {
        return Err(err(&req.id, "bad_params", "missing entity", None));
    };
    EntityKind::parse(raw).ok_or_else(|| {
        err(
            &req.id,
            "unknown_entity",
            format!("unknown entity: {raw}"),
            Some(serde_json::json!({
                "known": EntityKind::ALL.iter().map(|k| k.as_str()).collect::<Vec<_>>()
            })),
        )
    })
}

pub fn required_str<'a>(req: &'a Request, key: &str) -> Result<&'a str, Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {key}"), None))
}

/// Missing and `null` both read as the empty string.
pub fn optional_str<'a>(req: &'a Request, key: &str) -> &'a str {
    req.params.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

/// Accepts numbers or numeric strings, since the UI sends raw input values.
pub fn text_param(req: &Request, key: &str) -> Result<String, Value> {
    match req.params.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Null) | None => Ok(String::new()),
        Some(_) => Err(err(
            &req.id,
            "bad_params",
            format!("{key} must be a string or a number"),
            None,
        )),
    }
}

/// Copies the keys of `extra` into `target` when both are objects.
pub fn merge_object(target: &mut Value, extra: Value) {
    if let (Some(out), Value::Object(more)) = (target.as_object_mut(), extra) {
        out.extend(more);
    }
}
