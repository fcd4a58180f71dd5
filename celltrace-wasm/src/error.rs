use celltrace::CellTraceError;
use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;

fn set_kv(obj: &Object, k: &str, v: &JsValue) { let _ = Reflect::set(obj, &JsValue::from_str(k), v); }

fn new_obj() -> Object { Object::new() }

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data { set_kv(&e, "data", &d); }
    set_kv(&root, "error", &e.into());
    root.into()
}

#[inline]
pub fn non_finite(param: &str) -> JsValue {
    let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(param));
    err("non_finite", format!("parameter '{}' must be finite", param), Some(d.into()))
}

#[inline]
pub fn invalid_id(kind: &str, id: u32) -> JsValue {
    let d = new_obj();
    set_kv(&d, "kind", &JsValue::from_str(kind));
    set_kv(&d, "id", &JsValue::from_f64(id as f64));
    err("invalid_id", format!("invalid {} id", kind), Some(d.into()))
}

#[inline]
pub fn invalid_config(what: &str, e: impl std::fmt::Display) -> JsValue {
    let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(what));
    err("invalid_config", format!("{}: {}", what, e), Some(d.into()))
}

#[inline]
pub fn serialize(e: serde_wasm_bindgen::Error) -> JsValue {
    err("serialize", e.to_string(), None)
}

/// Envelope for a core error, with a stable code per variant.
pub fn from_core(e: &CellTraceError) -> JsValue {
    let message = e.to_string();
    match e {
        CellTraceError::InvalidNode(n) => {
            let d = new_obj();
            set_kv(&d, "kind", &JsValue::from_str("node"));
            set_kv(&d, "id", &JsValue::from_f64(*n as f64));
            err("invalid_id", message, Some(d.into()))
        }
        CellTraceError::SelfLoop(_) | CellTraceError::DuplicateEdge(_, _) => err("invalid_edge", message, None),
        CellTraceError::NonFinite(param) => {
            let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(param));
            err("non_finite", message, Some(d.into()))
        }
        CellTraceError::LimitExceeded { what, max } => {
            let d = new_obj();
            set_kv(&d, "what", &JsValue::from_str(what));
            set_kv(&d, "max", &JsValue::from_f64(*max as f64));
            err("limit_exceeded", message, Some(d.into()))
        }
        CellTraceError::ProjectionMismatch { .. } => err("projection_mismatch", message, None),
        CellTraceError::InvalidNormal => err("invalid_normal", message, None),
        CellTraceError::InvalidConfig(_) => err("invalid_config", message, None),
        CellTraceError::Json(_) => err("json_parse", message, None),
    }
}
