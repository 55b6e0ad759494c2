//! Browser host on top of `web-sys`, with [`JsValue`] state.

use crate::{
	app::{init, App, AppConfig, StateMap},
	dom::{BindingValue, Dom},
	error::BindingError,
};
use js_sys::{Array, Function, Object, Reflect};
use std::rc::Rc;
use tracing::error;
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue, UnwrapThrowExt};
use web_sys::{Document, Element, EventTarget, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

/// [`Dom`] for a [***Document***](https://developer.mozilla.org/en-US/docs/Web/API/Document).
#[derive(Debug, Clone)]
pub struct WebDom {
	document: Document,
}

impl WebDom {
	/// Uses the current window's document.
	///
	/// # Panics
	///
	/// Throws into JavaScript if there is no window or document, e.g. in a worker.
	#[must_use]
	pub fn new() -> Self {
		let document = web_sys::window()
			.expect_throw("dom-wire: No `window` found.")
			.document()
			.expect_throw("dom-wire: No `document` found.");
		Self::for_document(document)
	}

	#[must_use]
	pub fn for_document(document: Document) -> Self {
		Self { document }
	}
}

impl Default for WebDom {
	fn default() -> Self {
		Self::new()
	}
}

impl Dom for WebDom {
	type Element = Element;
	type Value = JsValue;
	type Handler = Function;
	type ListenerGuard = Closure<dyn Fn(web_sys::Event)>;

	fn element_by_id(&self, id: &str) -> Option<Element> {
		self.document.get_element_by_id(id)
	}

	fn tag_name(&self, element: &Element) -> String {
		element.tag_name().to_ascii_lowercase()
	}

	fn attributes(&self, element: &Element) -> Vec<(String, String)> {
		let attributes = element.attributes();
		(0..attributes.length())
			.filter_map(|i| attributes.item(i))
			.map(|attribute| (attribute.name(), attribute.value()))
			.collect()
	}

	fn children(&self, element: &Element) -> Vec<Element> {
		let children = element.children();
		(0..children.length()).filter_map(|i| children.item(i)).collect()
	}

	fn clone_deep(&self, element: &Element) -> Result<Element, BindingError> {
		element
			.clone_node_with_deep(true)
			.map_err(dom_error)?
			.dyn_into::<Element>()
			.map_err(|node| BindingError::Dom {
				message: format!("Cloned element is not an element: {:?}", node),
			})
	}

	fn clear_children(&self, element: &Element) {
		element.set_inner_html("")
	}

	fn append_child(&self, parent: &Element, child: &Element) -> Result<(), BindingError> {
		parent.append_child(child).map(drop).map_err(dom_error)
	}

	fn set_text_content(&self, element: &Element, text: &str) {
		element.set_text_content(Some(text))
	}

	fn set_value(&self, element: &Element, value: &str) {
		if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
			input.set_value(value)
		} else if let Some(text_area) = element.dyn_ref::<HtmlTextAreaElement>() {
			text_area.set_value(value)
		} else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
			select.set_value(value)
		}
	}

	fn on_input(&self, element: &Element, callback: Box<dyn Fn(String)>) -> Result<Self::ListenerGuard, BindingError> {
		let closure = Closure::wrap(Box::new(move |event: web_sys::Event| match event.target().as_ref().and_then(control_value) {
			Some(value) => callback(value),
			None => error!("`input` event without a form control target: {:?}", event),
		}) as Box<dyn Fn(web_sys::Event)>);
		element
			.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())
			.map_err(dom_error)?;
		Ok(closure)
	}

	fn add_event_listener(&self, element: &Element, event: &str, handler: &Function) -> Result<(), BindingError> {
		element.add_event_listener_with_callback(event, handler).map_err(dom_error)
	}
}

fn control_value(target: &EventTarget) -> Option<String> {
	if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
		Some(input.value())
	} else if let Some(text_area) = target.dyn_ref::<HtmlTextAreaElement>() {
		Some(text_area.value())
	} else {
		target.dyn_ref::<HtmlSelectElement>().map(HtmlSelectElement::value)
	}
}

#[allow(clippy::needless_pass_by_value)]
fn dom_error(error: JsValue) -> BindingError {
	BindingError::Dom { message: format!("{:?}", error) }
}

#[wasm_bindgen]
extern "C" {
	/// `String(value)`, so arrays render as `1,2` and numbers as JavaScript formats them.
	#[wasm_bindgen(js_name = String, catch)]
	fn js_string(value: &JsValue) -> Result<String, JsValue>;
}

impl BindingValue for JsValue {
	fn from_text(text: String) -> Self {
		JsValue::from(text)
	}

	fn to_text(&self) -> String {
		if self.is_undefined() || self.is_null() {
			String::new()
		} else if let Some(text) = self.as_string() {
			text
		} else {
			js_string(self).unwrap_or_else(|error| {
				error!("Failed to convert {:?} to text: {:?}", self, error);
				String::new()
			})
		}
	}

	fn items(&self) -> Option<Vec<Self>> {
		self.dyn_ref::<Array>().map(|array| array.iter().collect())
	}
}

/// [`init`] against the current document.
pub fn init_web(root_element_id: &str, config: AppConfig<WebDom>) -> Rc<App<WebDom>> {
	init(WebDom::new(), root_element_id, config)
}

/// Handle returned to JavaScript by [`init_app`]. Bindings stop working once it is freed.
#[wasm_bindgen]
pub struct WebApp {
	app: Rc<App<WebDom>>,
}

#[wasm_bindgen]
impl WebApp {
	/// A snapshot of the page-level state as a plain object.
	pub fn state(&self) -> Object {
		state_to_object(&self.app.state())
	}

	/// # Errors
	///
	/// Iff `name` isn't part of the page-level state or listeners nest too deeply.
	#[wasm_bindgen(js_name = setState)]
	pub fn set_state(&self, name: &str, value: JsValue) -> Result<(), JsValue> {
		self.app.set_state(name, value).map_err(|error| JsValue::from_str(&error.to_string()))
	}

	/// Messages of all problems reported so far.
	pub fn diagnostics(&self) -> Array {
		self.app.diagnostics().iter().map(|error| JsValue::from_str(&error.to_string())).collect()
	}
}

impl WebApp {
	#[must_use]
	pub fn app(&self) -> &Rc<App<WebDom>> {
		&self.app
	}
}

/// JavaScript entry point.
///
/// `config` is an object with an `init` function returning the initial state object,
/// and optionally `handlers`, `reducer` and `actionCreators` objects mapping names to functions.
///
/// # Errors
///
/// Iff `config` doesn't have that shape.
#[wasm_bindgen(js_name = initApp)]
pub fn init_app(root_element_id: &str, config: &Object) -> Result<WebApp, JsValue> {
	let config = config_from_js(config).map_err(|error| JsValue::from_str(&error.to_string()))?;
	Ok(WebApp {
		app: init_web(root_element_id, config),
	})
}

/// Reads an [`AppConfig`] from a JavaScript object.
///
/// # Errors
///
/// Iff `init` is missing or any configured entry isn't a function.
pub fn config_from_js(config: &Object) -> Result<AppConfig<WebDom>, BindingError> {
	let init = Reflect::get(config, &JsValue::from_str("init"))
		.map_err(dom_error)?
		.dyn_into::<Function>()
		.map_err(|_| config_error("`init` must be a function"))?;
	let mut app_config = AppConfig::new(move || match init.call0(&JsValue::UNDEFINED) {
		Ok(state) => object_to_state(&state),
		Err(error) => {
			error!("`init` threw: {:?}", error);
			StateMap::new()
		}
	});

	for (name, handler) in entries(config, "handlers")? {
		let handler = function(&name, handler)?;
		app_config = app_config.with_handler(name, handler);
	}

	for (name, reducer) in entries(config, "reducer")? {
		let reducer = function(&name, reducer)?;
		let action_name = name.clone();
		app_config = app_config.with_reducer(name, move |state, action| {
			match reducer.call2(&JsValue::UNDEFINED, &state_to_object(state), action) {
				Ok(next) => object_to_state(&next),
				Err(error) => {
					error!("Reducer {:?} threw: {:?}", action_name, error);
					state.clone()
				}
			}
		});
	}

	for (name, action_creator) in entries(config, "actionCreators")? {
		let action_creator = function(&name, action_creator)?;
		let action_name = name.clone();
		app_config = app_config.with_action_creator(name, move |arguments| {
			action_creator
				.apply(&JsValue::UNDEFINED, &arguments.iter().collect::<Array>())
				.unwrap_or_else(|error| {
					error!("Action creator {:?} threw: {:?}", action_name, error);
					JsValue::UNDEFINED
				})
		});
	}

	Ok(app_config)
}

fn config_error(message: impl Into<String>) -> BindingError {
	BindingError::Config { message: message.into() }
}

fn function(name: &str, value: JsValue) -> Result<Function, BindingError> {
	value.dyn_into::<Function>().map_err(|_| config_error(format!("{:?} must be a function", name)))
}

fn entries(config: &Object, key: &str) -> Result<Vec<(String, JsValue)>, BindingError> {
	let value = Reflect::get(config, &JsValue::from_str(key)).map_err(dom_error)?;
	if value.is_undefined() || value.is_null() {
		return Ok(Vec::new());
	}
	let object = value.dyn_into::<Object>().map_err(|_| config_error(format!("`{}` must be an object", key)))?;
	Ok(object_entries(&object))
}

fn object_entries(object: &Object) -> Vec<(String, JsValue)> {
	Object::entries(object)
		.iter()
		.filter_map(|entry| {
			let entry: Array = entry.unchecked_into();
			Some((entry.get(0).as_string()?, entry.get(1)))
		})
		.collect()
}

fn object_to_state(value: &JsValue) -> StateMap<JsValue> {
	match value.dyn_ref::<Object>() {
		Some(object) => object_entries(object).into_iter().collect(),
		None => {
			error!("State must be an object but is {:?}", value);
			StateMap::new()
		}
	}
}

fn state_to_object(state: &StateMap<JsValue>) -> Object {
	let object = Object::new();
	for (name, value) in state {
		if let Err(error) = Reflect::set(&object, &JsValue::from_str(name), value) {
			error!("Failed to copy state variable {:?}: {:?}", name, error)
		}
	}
	object
}
