#![allow(dead_code)]

use dom_wire::{
	dom::{BindingValue, Dom},
	BindingError,
};
use std::{cell::RefCell, rc::Rc};

#[derive(Debug, Clone, PartialEq)]
pub enum Val {
	Text(String),
	Number(i64),
	List(Vec<Val>),
}

pub fn text(text: &str) -> Val {
	Val::Text(text.to_owned())
}

pub fn numbers(numbers: &[i64]) -> Val {
	Val::List(numbers.iter().copied().map(Val::Number).collect())
}

impl BindingValue for Val {
	fn from_text(text: String) -> Self {
		Val::Text(text)
	}

	fn to_text(&self) -> String {
		match self {
			Val::Text(text) => text.clone(),
			Val::Number(number) => number.to_string(),
			Val::List(items) => items.iter().map(Val::to_text).collect::<Vec<_>>().join(","),
		}
	}

	fn items(&self) -> Option<Vec<Self>> {
		match self {
			Val::List(items) => Some(items.clone()),
			_ => None,
		}
	}
}

#[derive(Debug, Clone)]
pub struct MockEvent {
	pub kind: String,
}

pub type Handler = Rc<dyn Fn(&MockEvent)>;

#[derive(Default)]
struct Node {
	tag: String,
	attributes: Vec<(String, String)>,
	children: Vec<MockElement>,
	text: String,
	value: String,
	rejects_input: bool,
	input_listeners: Vec<Rc<dyn Fn(String)>>,
	event_listeners: Vec<(String, Handler)>,
}

/// Element in a tiny in-memory document. Clones share the same node.
#[derive(Clone)]
pub struct MockElement(Rc<RefCell<Node>>);

impl MockElement {
	pub fn new(tag: &str) -> Self {
		Self(Rc::new(RefCell::new(Node {
			tag: tag.to_ascii_lowercase(),
			..Node::default()
		})))
	}

	pub fn attr(self, name: &str, value: &str) -> Self {
		self.0.borrow_mut().attributes.push((name.to_owned(), value.to_owned()));
		self
	}

	pub fn child(self, child: MockElement) -> Self {
		self.0.borrow_mut().children.push(child);
		self
	}

	/// Makes attaching `input` listeners fail, like a host that can't observe this element.
	pub fn rejecting_input(self) -> Self {
		self.0.borrow_mut().rejects_input = true;
		self
	}

	pub fn input_listener_count(&self) -> usize {
		self.0.borrow().input_listeners.len()
	}

	pub fn text(&self) -> String {
		self.0.borrow().text.clone()
	}

	pub fn value(&self) -> String {
		self.0.borrow().value.clone()
	}

	pub fn children(&self) -> Vec<MockElement> {
		self.0.borrow().children.clone()
	}

	pub fn child_at(&self, index: usize) -> MockElement {
		self.0.borrow().children[index].clone()
	}

	pub fn same_node(&self, other: &MockElement) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	/// Sets the value like a user would and fires `input`.
	pub fn type_text(&self, value: &str) {
		let listeners = {
			let mut node = self.0.borrow_mut();
			node.value = value.to_owned();
			node.input_listeners.clone()
		};
		for listener in listeners {
			listener(value.to_owned())
		}
	}

	pub fn dispatch(&self, kind: &str) {
		let listeners: Vec<Handler> = self
			.0
			.borrow()
			.event_listeners
			.iter()
			.filter(|(event, _)| event == kind)
			.map(|(_, handler)| Rc::clone(handler))
			.collect();
		let event = MockEvent { kind: kind.to_owned() };
		for listener in listeners {
			listener(&event)
		}
	}

	fn find_by_id(&self, id: &str) -> Option<MockElement> {
		let node = self.0.borrow();
		if node.attributes.iter().any(|(name, value)| name == "id" && value == id) {
			return Some(self.clone());
		}
		node.children.iter().find_map(|child| child.find_by_id(id))
	}

	fn deep_copy(&self) -> MockElement {
		let node = self.0.borrow();
		MockElement(Rc::new(RefCell::new(Node {
			tag: node.tag.clone(),
			attributes: node.attributes.clone(),
			children: node.children.iter().map(MockElement::deep_copy).collect(),
			text: node.text.clone(),
			value: node.value.clone(),
			..Node::default()
		})))
	}
}

#[derive(Clone)]
pub struct MockDom {
	document: MockElement,
}

impl MockDom {
	pub fn new(document: MockElement) -> Self {
		Self { document }
	}
}

impl Dom for MockDom {
	type Element = MockElement;
	type Value = Val;
	type Handler = Handler;
	type ListenerGuard = ();

	fn element_by_id(&self, id: &str) -> Option<MockElement> {
		self.document.find_by_id(id)
	}

	fn tag_name(&self, element: &MockElement) -> String {
		element.0.borrow().tag.clone()
	}

	fn attributes(&self, element: &MockElement) -> Vec<(String, String)> {
		element.0.borrow().attributes.clone()
	}

	fn children(&self, element: &MockElement) -> Vec<MockElement> {
		element.children()
	}

	fn clone_deep(&self, element: &MockElement) -> Result<MockElement, BindingError> {
		Ok(element.deep_copy())
	}

	fn clear_children(&self, element: &MockElement) {
		element.0.borrow_mut().children.clear()
	}

	fn append_child(&self, parent: &MockElement, child: &MockElement) -> Result<(), BindingError> {
		parent.0.borrow_mut().children.push(child.clone());
		Ok(())
	}

	fn set_text_content(&self, element: &MockElement, text: &str) {
		let mut node = element.0.borrow_mut();
		node.children.clear();
		node.text = text.to_owned();
	}

	fn set_value(&self, element: &MockElement, value: &str) {
		element.0.borrow_mut().value = value.to_owned()
	}

	fn on_input(&self, element: &MockElement, callback: Box<dyn Fn(String)>) -> Result<(), BindingError> {
		let mut node = element.0.borrow_mut();
		if node.rejects_input {
			return Err(BindingError::Dom {
				message: "input listeners unsupported".to_owned(),
			});
		}
		node.input_listeners.push(Rc::from(callback));
		Ok(())
	}

	fn add_event_listener(&self, element: &MockElement, event: &str, handler: &Handler) -> Result<(), BindingError> {
		element.0.borrow_mut().event_listeners.push((event.to_owned(), Rc::clone(handler)));
		Ok(())
	}
}
