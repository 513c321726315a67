#![cfg(target_arch = "wasm32")]

use js_sys::Reflect;
use lineage_mapper_wasm::LineageMapperWasm;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::wasm_bindgen_test;

fn rows(data: &[&[&str]]) -> JsValue {
    serde_wasm_bindgen::to_value(&data.to_vec()).expect("rows serialize")
}

fn field(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).expect("field readable")
}

fn viewer() -> LineageMapperWasm {
    let mut viewer = LineageMapperWasm::new(JsValue::UNDEFINED).ok().expect("default config");
    viewer
        .load_birth_death(rows(&[&["A", "0", "5"], &["B", "3", "9"], &["C", "9", "20"]]))
        .ok()
        .expect("birth/death rows load");
    viewer
        .load_relations(rows(&[&["1", "C", "A", "B"]]), true)
        .ok()
        .expect("relation rows load");
    viewer
}

#[wasm_bindgen_test]
fn wasm_show_now_renders_view() {
    let mut viewer = viewer();
    assert_eq!(viewer.cell_count(), 3);
    assert_eq!(viewer.tree_count(), 1);
    assert_eq!(viewer.relation_kind(), "fusion");

    let outcome = viewer.show_now("C", "0").ok().expect("view builds");
    assert_eq!(field(&outcome, "status").as_string().as_deref(), Some("rendered"));
    assert_eq!(viewer.screen_positions().length(), 2);
}

#[wasm_bindgen_test]
fn wasm_not_found_is_a_status() {
    let mut viewer = viewer();
    let outcome = viewer.show_now("Z", "1").ok().expect("not-found is not thrown");
    assert_eq!(field(&outcome, "status").as_string().as_deref(), Some("notFound"));
    assert!(viewer.current_view().ok().expect("readable").is_undefined());
}

#[wasm_bindgen_test]
fn wasm_debounced_tick() {
    let mut viewer = viewer();
    viewer.request_view("C", "*", 0.0);
    assert!(viewer.tick(10.0).ok().expect("tick").is_undefined());
    let outcome = viewer.tick(1000.0).ok().expect("tick");
    assert_eq!(field(&outcome, "status").as_string().as_deref(), Some("rendered"));
    assert!(!viewer.has_pending_request());
}

#[wasm_bindgen_test]
fn wasm_unknown_relation_id_throws() {
    let mut viewer = viewer();
    assert!(viewer.load_relations(rows(&[&["1", "C", "Q"]]), false).is_err());
    assert_eq!(viewer.relation_kind(), "fusion");
}
