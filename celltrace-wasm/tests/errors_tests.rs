use celltrace_wasm::CellGraph;
use js_sys::{Float64Array, Object, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn is_err(v: &JsValue, code: &str) -> bool {
    if let Ok(ok) =
        Reflect::get(v, &JsValue::from_str("ok")).and_then(|x| x.as_bool().ok_or(JsValue::NULL))
    {
        if ok {
            return false;
        }
        if let Ok(err) = Reflect::get(v, &JsValue::from_str("error")) {
            if let Ok(c) = Reflect::get(&err, &JsValue::from_str("code")) {
                return c.as_string().map_or(false, |s| s == code);
            }
        }
    }
    false
}

#[wasm_bindgen_test]
fn invalid_ids_and_inputs_return_typed_errors() {
    let mut g = CellGraph::new();
    let ver = g.version();
    assert!(is_err(&g.add_node_res(f64::NAN, 0.0, 0.0), "non_finite"));
    assert!(is_err(&g.add_node_res(1.0e13, 0.0, 0.0), "non_finite"));
    assert!(is_err(&g.add_edge_res(0, 1), "invalid_id"));
    assert!(is_err(&g.set_edge_valid_res(3, false), "invalid_id"));
    assert_eq!(g.version(), ver, "state mutated on error");

    let a = g.add_node(0.0, 0.0, 0.0).unwrap();
    assert!(is_err(&g.add_edge_res(a, a), "invalid_edge"));
    let b = g.add_node(1.0, 0.0, 0.0).unwrap();
    g.add_edge(a, b).unwrap();
    assert!(is_err(&g.add_edge_res(b, a), "invalid_edge"));
}

#[wasm_bindgen_test]
fn bad_configuration_is_reported() {
    let g = CellGraph::new();
    assert!(is_err(&g.find_cells(JsValue::UNDEFINED, 0.0, 0.0, 0.0), "invalid_normal"));
    assert!(is_err(&g.find_cells(JsValue::UNDEFINED, f64::NAN, 0.0, 1.0), "non_finite"));

    let details = Object::new();
    Reflect::set(&details, &JsValue::from_str("winding"), &JsValue::from_str("sideways")).unwrap();
    assert!(is_err(&g.find_cells(details.into(), 0.0, 0.0, 1.0), "invalid_config"));

    let seeds = Float64Array::from(&[0.0, 1.0][..]);
    let r = g.find_contours(seeds, JsValue::UNDEFINED, JsValue::UNDEFINED, JsValue::UNDEFINED, 0.0, 0.0, 1.0);
    assert!(is_err(&r, "invalid_seeds"));
}

#[wasm_bindgen_test]
fn reserved_artifact_tags_are_refused() {
    let g = CellGraph::new();
    let artifacts = Object::new();
    Reflect::set(&artifacts, &JsValue::from_str("tag_convex"), &JsValue::TRUE).unwrap();
    Reflect::set(&artifacts, &JsValue::from_str("convex_tag"), &JsValue::from_str("celltrace:convex")).unwrap();
    let r = g.find_cells_with_artifacts(JsValue::UNDEFINED, artifacts.into(), 0.0, 0.0, 1.0);
    assert!(is_err(&r, "invalid_config"));
}

#[wasm_bindgen_test]
fn malformed_json_is_rejected() {
    let mut g = CellGraph::new();
    let doc = Object::new();
    Reflect::set(&doc, &JsValue::from_str("nodes"), &JsValue::from_str("nope")).unwrap();
    assert!(is_err(&g.from_json_res(doc.into()), "json_parse"));
    assert_eq!(g.node_count(), 0);
}
