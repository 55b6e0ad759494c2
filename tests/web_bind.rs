#![cfg(target_arch = "wasm32")]

use dom_wire::{dom::BindingValue, web::init_web, AppConfig, BindingError, StateMap};
use js_sys::{Array, Function};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, Document, Event, HtmlBodyElement, HtmlButtonElement, HtmlInputElement};

wasm_bindgen_test_configure!(run_in_browser);

static mut LOG_INITIALIZED: bool = false;

fn document() -> Document {
	unsafe {
		if !LOG_INITIALIZED {
			tracing_wasm::set_as_global_default();
			LOG_INITIALIZED = true;
		}
	}
	window().unwrap().document().unwrap()
}

fn mount(id: &str, html: &str) {
	let document = document();
	let body = document.body().unwrap().dyn_into::<HtmlBodyElement>().unwrap();
	let root = document.create_element("div").unwrap();
	root.set_id(id);
	root.set_inner_html(html);
	body.append_child(&root).unwrap();
}

fn state(entries: Vec<(&'static str, JsValue)>) -> AppConfig<dom_wire::web::WebDom> {
	AppConfig::new(move || entries.into_iter().map(|(name, value)| (name.to_owned(), value)).collect::<StateMap<_>>())
}

#[wasm_bindgen_test]
fn content_and_input() {
	mount("web-content", r#"<input id="web-content-input" data-bind-data="name"><p id="web-content-echo" data-bind-content="name"></p>"#);

	let app = init_web("web-content", state(vec![("name", JsValue::from_str("start"))]));
	assert!(app.diagnostics().is_empty());

	let document = document();
	let input: HtmlInputElement = document.get_element_by_id("web-content-input").unwrap().dyn_into().unwrap();
	let echo = document.get_element_by_id("web-content-echo").unwrap();
	assert_eq!(input.value(), "start");
	assert_eq!(echo.text_content().unwrap(), "start");

	input.set_value("abc");
	input.dispatch_event(&Event::new("input").unwrap()).unwrap();
	assert_eq!(app.state()["name"].as_string().unwrap(), "abc");
	assert_eq!(echo.text_content().unwrap(), "abc");
}

#[wasm_bindgen_test]
fn list() {
	mount("web-list", r#"<ul id="web-list-ul" data-bind-for="item:items"><li data-bind-content="item"></li></ul>"#);

	let items: Array = [1, 2, 3].iter().map(|&n| JsValue::from(n)).collect();
	let app = init_web("web-list", state(vec![("items", items.into())]));
	assert!(app.diagnostics().is_empty());

	let list = document().get_element_by_id("web-list-ul").unwrap();
	assert_eq!(list.children().length(), 3);
	assert_eq!(list.text_content().unwrap(), "123");

	let items: Array = [JsValue::from_str("x")].iter().collect();
	app.set_state("items", items.into()).unwrap();
	assert_eq!(list.children().length(), 1);
	assert_eq!(list.text_content().unwrap(), "x");

	app.set_state("items", JsValue::from_str("not a list")).unwrap();
	assert_eq!(app.diagnostics(), [BindingError::NotASequence { name: "items".to_owned() }]);
	assert_eq!(list.text_content().unwrap(), "x");
}

#[wasm_bindgen_test]
fn click() {
	mount("web-click", r#"<button id="web-click-button" data-bind-on-click="count"></button>"#);

	let window = window().unwrap();
	js_sys::Reflect::set(&window, &"domWireClicks".into(), &0.into()).unwrap();
	let handler = Function::new_no_args("window.domWireClicks += 1");

	let app = init_web("web-click", state(vec![]).with_handler("count", handler));
	assert!(app.diagnostics().is_empty());

	let button: HtmlButtonElement = document().get_element_by_id("web-click-button").unwrap().dyn_into().unwrap();
	button.click();
	button.click();
	assert_eq!(js_sys::Reflect::get(&window, &"domWireClicks".into()).unwrap().as_f64(), Some(2.0));
}

#[wasm_bindgen_test]
fn text_follows_javascript_coercion() {
	assert_eq!(JsValue::from(1.5).to_text(), "1.5");
	assert_eq!(JsValue::from(1e21).to_text(), "1e+21");
	assert_eq!(JsValue::from(true).to_text(), "true");
	assert_eq!(JsValue::NULL.to_text(), "");
	assert_eq!(JsValue::UNDEFINED.to_text(), "");

	let array: JsValue = [1, 2].iter().copied().map(JsValue::from).collect::<Array>().into();
	assert_eq!(array.to_text(), "1,2");
	assert_eq!(JsValue::from(js_sys::Object::new()).to_text(), "[object Object]");
}

#[wasm_bindgen_test]
fn js_entry_point() {
	mount("web-entry", r#"<span id="web-entry-title" data-bind-content="title"></span>"#);

	let config = js_sys::Object::new();
	js_sys::Reflect::set(&config, &"init".into(), &Function::new_no_args("return { title: 'hi' }")).unwrap();
	let app = dom_wire::web::init_app("web-entry", &config).unwrap();
	assert_eq!(app.diagnostics().length(), 0);

	let title = document().get_element_by_id("web-entry-title").unwrap();
	assert_eq!(title.text_content().unwrap(), "hi");
	app.set_state("title", "bye".into()).unwrap();
	assert_eq!(title.text_content().unwrap(), "bye");

	assert!(dom_wire::web::init_app("web-entry", &js_sys::Object::new()).is_err());
}
