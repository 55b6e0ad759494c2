//! The host operations the directive processor relies on.
//!
//! [`WebDom`](`crate::web::WebDom`) implements these on top of `web-sys`.

use crate::error::BindingError;

/// A state value that can be shown in and read back from the DOM.
pub trait BindingValue: Clone + 'static {
	/// Wraps the raw value of a form control.
	fn from_text(text: String) -> Self;

	/// How the value is displayed as text content or a form control's value.
	fn to_text(&self) -> String;

	/// The items of a sequence, or [`None`] if `self` isn't one.
	fn items(&self) -> Option<Vec<Self>>;
}

pub trait Dom {
	type Element: Clone + 'static;
	type Value: BindingValue;
	/// Native event handler, attached as-is by `on` directives.
	type Handler;
	/// Keeps an event listener registered by [`on_input`](`Dom::on_input`) alive.
	type ListenerGuard: 'static;

	fn element_by_id(&self, id: &str) -> Option<Self::Element>;

	/// The element's tag name in lowercase.
	fn tag_name(&self, element: &Self::Element) -> String;

	/// Attribute names and values in document order.
	fn attributes(&self, element: &Self::Element) -> Vec<(String, String)>;

	/// Child elements (not other nodes) in document order.
	fn children(&self, element: &Self::Element) -> Vec<Self::Element>;

	/// A detached deep copy of `element`, without event listeners.
	///
	/// # Errors
	///
	/// Iff the host fails to clone the element.
	fn clone_deep(&self, element: &Self::Element) -> Result<Self::Element, BindingError>;

	/// Removes all child nodes of `element`.
	fn clear_children(&self, element: &Self::Element);

	/// # Errors
	///
	/// Iff the host rejects the insertion.
	fn append_child(&self, parent: &Self::Element, child: &Self::Element) -> Result<(), BindingError>;

	fn set_text_content(&self, element: &Self::Element, text: &str);

	/// Sets the value of a form control. Does nothing for other elements.
	fn set_value(&self, element: &Self::Element, value: &str);

	/// Calls `callback` with the new raw value whenever `element` fires `input`.
	///
	/// # Errors
	///
	/// Iff the host rejects the listener.
	fn on_input(&self, element: &Self::Element, callback: Box<dyn Fn(String)>) -> Result<Self::ListenerGuard, BindingError>;

	/// # Errors
	///
	/// Iff the host rejects the listener.
	fn add_event_listener(&self, element: &Self::Element, event: &str, handler: &Self::Handler) -> Result<(), BindingError>;
}
