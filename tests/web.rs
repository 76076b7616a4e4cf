//! Browser tests for the WASM bridge

#![cfg(target_arch = "wasm32")]

use paper_editor::wasm::{render_preview_js, WasmEditor};
use wasm_bindgen::{JsError, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn ok<T>(result: Result<T, JsError>) -> T {
    result.map_err(JsValue::from).unwrap()
}

#[wasm_bindgen_test]
fn test_before_mount() {
    let editor = ok(WasmEditor::new(None));
    assert_eq!(editor.get_html(), "");
    assert_eq!(editor.get_page_count(), 1);
    assert!(editor.export_pdf(None).is_err());
}

#[wasm_bindgen_test]
fn test_mount_and_edit() {
    let config = r#"{"initialContent":"<p>Hi</p>","pagination":false}"#;
    let mut editor = ok(WasmEditor::new(Some(config.to_string())));
    ok(editor.mount());

    assert!(ok(editor.insert_text(3, "!")));
    assert_eq!(editor.get_html(), "<p>Hi!</p>");
    assert!(ok(editor.undo()));
    assert_eq!(editor.get_html(), "<p>Hi</p>");
}

#[wasm_bindgen_test]
fn test_estimated_pagination() {
    let content = "<p>paragraph of text</p>".repeat(60);
    let config = serde_json::json!({ "initialContent": content }).to_string();
    let mut editor = ok(WasmEditor::new(Some(config))).use_estimated_layout();
    ok(editor.mount());

    assert_eq!(editor.next_tick_in(), Some(50.0));
    assert!(editor.get_decorated_html().contains("<p>"));
}

#[wasm_bindgen_test]
fn test_export_with_builtin_rasterizer() {
    let mut editor = ok(WasmEditor::new(None));
    ok(editor.mount());
    let pdf = ok(editor.export_pdf(None));
    assert!(pdf.starts_with(b"%PDF-1.7"));
}

#[wasm_bindgen_test]
fn test_render_preview() {
    let pages = ok(render_preview_js("<p>a</p>", Some("letter".to_string())));
    assert!(js_sys::Array::is_array(&pages));
    assert_eq!(js_sys::Array::from(&pages).length(), 1);
    assert!(render_preview_js("<p>a</p>", Some("a5".to_string())).is_err());
}

fn error_message(result: Result<Vec<u8>, JsError>) -> String {
    let err = JsValue::from(result.err().unwrap());
    js_sys::Reflect::get(&err, &JsValue::from_str("message"))
        .unwrap()
        .as_string()
        .unwrap()
}

#[wasm_bindgen_test]
fn test_async_rasterizer_is_rejected() {
    let mut editor = ok(WasmEditor::new(None));
    ok(editor.mount());
    let rasterize = js_sys::Function::new_with_args("page, html", "return Promise.resolve(new Uint8Array());");

    let message = error_message(editor.export_pdf(Some(rasterize)));
    assert!(message.contains("Promise"));
}

#[wasm_bindgen_test]
fn test_throwing_on_change_does_not_break_edits() {
    let config = r#"{"initialContent":"<p>Hi</p>","pagination":false}"#;
    let mut editor = ok(WasmEditor::new(Some(config.to_string())));
    editor.set_on_change(js_sys::Function::new_with_args("html, json", "throw new Error('boom');"));
    ok(editor.mount());

    assert!(ok(editor.insert_text(3, "!")));
    assert_eq!(editor.get_html(), "<p>Hi!</p>");
}
