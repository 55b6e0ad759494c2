//! Application state, configuration and the directive processor.

use crate::{
	directive::{Directive, DEFAULT_PREFIX, TWO_WAY_TAGS},
	dom::{BindingValue, Dom},
	error::BindingError,
	scope::{ScopeId, ScopeTree, DEFAULT_MAX_NOTIFY_DEPTH},
};
use core::cell::RefCell;
use hashbrown::HashMap;
use std::{collections::VecDeque, rc::Rc};
use tracing::{error, info, instrument, trace};

/// Named state values, as produced by [`AppConfig::init`] and returned by [`App::state`].
pub type StateMap<V> = HashMap<String, V>;

/// Pure state transition for one action.
pub type Reducer<V> = Rc<dyn Fn(&StateMap<V>, &V) -> StateMap<V>>;

/// Default bound on [`App::diagnostics`].
pub const DEFAULT_MAX_DIAGNOSTICS: usize = 256;

/// Builds an action payload from its arguments.
pub type ActionCreator<V> = Rc<dyn Fn(&[V]) -> V>;

/// Everything [`init`] needs besides the host and the root element.
pub struct AppConfig<D: Dom> {
	/// Handlers that `on` directives can refer to by name.
	pub handlers: HashMap<String, D::Handler>,
	/// Produces the initial page-level state. Each key becomes a variable in the root scope.
	pub init: Box<dyn FnOnce() -> StateMap<D::Value>>,
	pub reducer: HashMap<String, Reducer<D::Value>>,
	pub action_creators: HashMap<String, ActionCreator<D::Value>>,
	/// Attribute name prefix marking directives.
	pub prefix: String,
	/// See [`ScopeTree::with_max_notify_depth`].
	pub max_notify_depth: usize,
	/// How many problems [`App::diagnostics`] retains. Older ones are discarded first.
	pub max_diagnostics: usize,
}

impl<D: Dom> AppConfig<D> {
	#[must_use]
	pub fn new(init: impl FnOnce() -> StateMap<D::Value> + 'static) -> Self {
		Self {
			handlers: HashMap::new(),
			init: Box::new(init),
			reducer: HashMap::new(),
			action_creators: HashMap::new(),
			prefix: DEFAULT_PREFIX.to_owned(),
			max_notify_depth: DEFAULT_MAX_NOTIFY_DEPTH,
			max_diagnostics: DEFAULT_MAX_DIAGNOSTICS,
		}
	}

	#[must_use]
	pub fn with_handler(mut self, name: impl Into<String>, handler: D::Handler) -> Self {
		self.handlers.insert(name.into(), handler);
		self
	}

	#[must_use]
	pub fn with_reducer(mut self, name: impl Into<String>, reducer: impl Fn(&StateMap<D::Value>, &D::Value) -> StateMap<D::Value> + 'static) -> Self {
		self.reducer.insert(name.into(), Rc::new(reducer));
		self
	}

	#[must_use]
	pub fn with_action_creator(mut self, name: impl Into<String>, action_creator: impl Fn(&[D::Value]) -> D::Value + 'static) -> Self {
		self.action_creators.insert(name.into(), Rc::new(action_creator));
		self
	}

	#[must_use]
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	#[must_use]
	pub fn with_max_notify_depth(mut self, max_notify_depth: usize) -> Self {
		self.max_notify_depth = max_notify_depth;
		self
	}

	#[must_use]
	pub fn with_max_diagnostics(mut self, max_diagnostics: usize) -> Self {
		self.max_diagnostics = max_diagnostics;
		self
	}
}

/// A bound page: the host, its scope tree and the configured handlers.
///
/// Bindings only hold weak references to the [`App`], so they go inert once it is dropped.
pub struct App<D: Dom> {
	dom: D,
	scopes: ScopeTree<D::Value>,
	root: ScopeId,
	prefix: String,
	handlers: HashMap<String, D::Handler>,
	reducer: HashMap<String, Reducer<D::Value>>,
	action_creators: HashMap<String, ActionCreator<D::Value>>,
	diagnostics: RefCell<VecDeque<BindingError>>,
	max_diagnostics: usize,
}

/// Binds the element with id `root_element_id` and its subtree.
///
/// This never fails outright. Each problem is logged, recorded in [`App::diagnostics`] and only disables the directive it was found in.
#[instrument(skip(dom, config))]
pub fn init<D: Dom + 'static>(dom: D, root_element_id: &str, config: AppConfig<D>) -> Rc<App<D>> {
	let AppConfig {
		handlers,
		init,
		reducer,
		action_creators,
		prefix,
		max_notify_depth,
		max_diagnostics,
	} = config;

	let scopes = ScopeTree::with_max_notify_depth(max_notify_depth);
	let root = scopes.create_root_scope();
	let app = Rc::new(App {
		dom,
		scopes,
		root,
		prefix,
		handlers,
		reducer,
		action_creators,
		diagnostics: RefCell::default(),
		max_diagnostics,
	});

	for (name, value) in init() {
		if let Err(error) = app.scopes.declare_variable(root, name, value) {
			app.report(error)
		}
	}

	match app.dom.element_by_id(root_element_id) {
		Some(element) => app.bind_element(&element, root),
		None => app.report(BindingError::RootNotFound { id: root_element_id.to_owned() }),
	}

	info!("Bound {} scope(s) with {} diagnostic(s).", app.scopes.len(), app.diagnostics.borrow().len());
	app
}

impl<D: Dom + 'static> App<D> {
	pub fn dom(&self) -> &D {
		&self.dom
	}

	pub fn scopes(&self) -> &ScopeTree<D::Value> {
		&self.scopes
	}

	/// The scope holding the page-level state.
	pub fn root_scope(&self) -> ScopeId {
		self.root
	}

	/// A snapshot of the page-level state.
	pub fn state(&self) -> StateMap<D::Value> {
		self.scopes.variables(self.root).unwrap_or_default()
	}

	/// Sets a page-level variable, updating every binding that depends on it.
	///
	/// # Errors
	///
	/// See [`ScopeTree::set_variable`].
	pub fn set_state(&self, name: &str, value: D::Value) -> Result<(), BindingError> {
		self.scopes.set_variable(self.root, name, value)
	}

	pub fn reducer(&self, name: &str) -> Option<&Reducer<D::Value>> {
		self.reducer.get(name)
	}

	pub fn action_creator(&self, name: &str) -> Option<&ActionCreator<D::Value>> {
		self.action_creators.get(name)
	}

	/// The most recent problems reported, oldest first, up to [`AppConfig::max_diagnostics`] of them.
	///
	/// Every problem is logged regardless.
	pub fn diagnostics(&self) -> Vec<BindingError> {
		self.diagnostics.borrow().iter().cloned().collect()
	}

	fn report(&self, error: BindingError) {
		error!("{}", error);
		if self.max_diagnostics == 0 {
			return;
		}
		let mut diagnostics = self.diagnostics.borrow_mut();
		if diagnostics.len() == self.max_diagnostics {
			diagnostics.pop_front();
		}
		diagnostics.push_back(error)
	}

	/// Applies the directives on `element` against `scope`, then walks its child elements, each in a new child scope.
	#[instrument(skip(self, element))]
	pub fn bind_element(self: &Rc<Self>, element: &D::Element, scope: ScopeId) {
		let mut owns_children = false;
		for (name, value) in self.dom.attributes(element) {
			let directive = match Directive::parse(&self.prefix, &name, &value) {
				None => continue,
				Some(Ok(directive)) => directive,
				Some(Err(error)) => {
					self.report(error);
					continue;
				}
			};
			if cfg!(feature = "dangerous-logging") {
				trace!(%name, %value, "Applying directive.");
			} else {
				trace!(kind = directive.kind(), "Applying directive.");
			}

			let applied = match &directive {
				Directive::Data { variable } => self.bind_data(element, scope, variable),
				Directive::Content { variable } => self.bind_content(element, scope, variable),
				Directive::For { item, list } => {
					let applied = self.bind_for(element, scope, item, list);
					owns_children |= applied.is_ok();
					applied
				}
				Directive::On { event, handler } => self.bind_event(element, event, handler),
			};
			if let Err(error) = applied {
				self.report(error)
			}
		}

		if owns_children {
			return trace!("Children are rendered by a list directive.");
		}

		for child in self.dom.children(element) {
			match self.scopes.create_child_scope(scope) {
				Ok(child_scope) => self.bind_element(&child, child_scope),
				Err(error) => self.report(error),
			}
		}
	}

	fn bind_data(self: &Rc<Self>, element: &D::Element, scope: ScopeId, variable: &str) -> Result<(), BindingError> {
		let tag = self.dom.tag_name(element);
		if !TWO_WAY_TAGS.contains(&tag.as_str()) {
			return Err(BindingError::DisallowedElement { directive: "data", tag });
		}

		// Neither half is attached unless both can be.
		self.scopes.resolve(scope, variable)?;

		let app = Rc::downgrade(self);
		let name = variable.to_owned();
		let guard = self.dom.on_input(
			element,
			Box::new(move |raw| {
				if let Some(app) = app.upgrade() {
					if let Err(error) = app.scopes.set_variable(scope, &name, D::Value::from_text(raw)) {
						app.report(error)
					}
				}
			}),
		)?;
		self.scopes.keep_alive(scope, guard)?;

		let app = Rc::downgrade(self);
		let target = element.clone();
		self.scopes.subscribe(
			scope,
			variable,
			move |value| {
				if let Some(app) = app.upgrade() {
					app.dom.set_value(&target, &value.to_text())
				}
			},
			true,
		)
	}

	fn bind_content(self: &Rc<Self>, element: &D::Element, scope: ScopeId, variable: &str) -> Result<(), BindingError> {
		let app = Rc::downgrade(self);
		let target = element.clone();
		self.scopes.subscribe(
			scope,
			variable,
			move |value| {
				if let Some(app) = app.upgrade() {
					app.dom.set_text_content(&target, &value.to_text())
				}
			},
			true,
		)
	}

	fn bind_for(self: &Rc<Self>, element: &D::Element, scope: ScopeId, item: &str, list: &str) -> Result<(), BindingError> {
		self.scopes.resolve(scope, list)?;

		let template = self.dom.children(element).iter().map(|child| self.dom.clone_deep(child)).collect::<Result<Vec<_>, _>>()?;
		self.dom.clear_children(element);

		let rendered = RefCell::new(Vec::new());
		let app = Rc::downgrade(self);
		let container = element.clone();
		let item = item.to_owned();
		let list_name = list.to_owned();
		self.scopes.subscribe(
			scope,
			list,
			move |value| {
				if let Some(app) = app.upgrade() {
					app.render_list(&container, scope, &item, &list_name, &template, &rendered, value)
				}
			},
			true,
		)
	}

	/// Replaces everything a list directive rendered previously with one bound copy of `template` per item.
	#[allow(clippy::too_many_arguments)]
	#[instrument(skip(self, container, template, rendered, value))]
	fn render_list(self: &Rc<Self>, container: &D::Element, scope: ScopeId, item: &str, list: &str, template: &[D::Element], rendered: &RefCell<Vec<ScopeId>>, value: &D::Value) {
		let items = match value.items() {
			Some(items) => items,
			None => return self.report(BindingError::NotASequence { name: list.to_owned() }),
		};

		let released = self.scopes.release_all(rendered.replace(Vec::new()));
		trace!("Released {} previously rendered scope(s).", released);
		self.dom.clear_children(container);

		let mut scopes = Vec::with_capacity(items.len() * template.len());
		'items: for value in items {
			for child in template {
				let item_scope = match self.scopes.create_child_scope(scope) {
					Ok(item_scope) => item_scope,
					Err(error) => {
						self.report(error);
						break 'items;
					}
				};
				scopes.push(item_scope);
				let rendered_child = self
					.scopes
					.declare_variable(item_scope, item, value.clone())
					.and_then(|()| self.dom.clone_deep(child));
				match rendered_child {
					Ok(node) => {
						self.bind_element(&node, item_scope);
						if let Err(error) = self.dom.append_child(container, &node) {
							self.report(error)
						}
					}
					Err(error) => self.report(error),
				}
			}
		}
		trace!("Rendered {} list scope(s).", scopes.len());
		*rendered.borrow_mut() = scopes;
	}

	fn bind_event(&self, element: &D::Element, event: &str, handler: &str) -> Result<(), BindingError> {
		let handler = self.handlers.get(handler).ok_or_else(|| BindingError::MissingHandler { name: handler.to_owned() })?;
		self.dom.add_event_listener(element, event, handler)
	}
}
