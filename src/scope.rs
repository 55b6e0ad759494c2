//! Lexical scopes for state variables.
//!
//! Scopes live in an arena owned by a [`ScopeTree`] and refer to their parent by [`ScopeId`].
//! Name lookup walks from a scope towards the root and stops at the first scope declaring the name,
//! so a variable declared in a child scope shadows same-named ones further up for that child and its descendants only.

use crate::{default_map::DefaultMap, error::BindingError};
use core::{
	any::Any,
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
	mem,
};
use hashbrown::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{trace, warn};

/// Default bound on nested listener notifications.
pub const DEFAULT_MAX_NOTIFY_DEPTH: usize = 32;

/// Identifies a scope within one [`ScopeTree`].
///
/// Ids of released scopes stay detectably stale even after their slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
	index: usize,
	generation: u32,
}

type Callback<V> = Rc<dyn Fn(&V)>;

struct Listener<V> {
	/// The scope that subscribed, which isn't necessarily the one declaring the variable.
	owner: ScopeId,
	callback: Callback<V>,
}

struct Scope<V> {
	parent: Option<ScopeId>,
	children: Vec<ScopeId>,
	variables: HashMap<String, V>,
	listeners: DefaultMap<String, Vec<Listener<V>>>,
	keep_alive: Vec<Box<dyn Any>>,
}
impl<V> Scope<V> {
	fn new(parent: Option<ScopeId>) -> Self {
		Self {
			parent,
			children: Vec::new(),
			variables: HashMap::new(),
			listeners: DefaultMap::new(),
			keep_alive: Vec::new(),
		}
	}
}

struct Slot<V> {
	generation: u32,
	scope: Option<Scope<V>>,
}

struct Arena<V> {
	slots: Vec<Slot<V>>,
	free: Vec<usize>,
}
impl<V> Arena<V> {
	fn get(&self, id: ScopeId) -> Result<&Scope<V>, BindingError> {
		self.slots
			.get(id.index)
			.filter(|slot| slot.generation == id.generation)
			.and_then(|slot| slot.scope.as_ref())
			.ok_or(BindingError::StaleScope { scope: id })
	}

	fn get_mut(&mut self, id: ScopeId) -> Result<&mut Scope<V>, BindingError> {
		self.slots
			.get_mut(id.index)
			.filter(|slot| slot.generation == id.generation)
			.and_then(|slot| slot.scope.as_mut())
			.ok_or(BindingError::StaleScope { scope: id })
	}

	fn insert(&mut self, scope: Scope<V>) -> ScopeId {
		if let Some(index) = self.free.pop() {
			let slot = &mut self.slots[index];
			debug_assert!(slot.scope.is_none());
			slot.scope = Some(scope);
			ScopeId { index, generation: slot.generation }
		} else {
			self.slots.push(Slot { generation: 0, scope: Some(scope) });
			ScopeId {
				index: self.slots.len() - 1,
				generation: 0,
			}
		}
	}

	fn take(&mut self, id: ScopeId) -> Option<Scope<V>> {
		let slot = self.slots.get_mut(id.index).filter(|slot| slot.generation == id.generation)?;
		let scope = slot.scope.take()?;
		slot.generation = slot.generation.wrapping_add(1);
		self.free.push(id.index);
		Some(scope)
	}

	fn resolve(&self, mut id: ScopeId, name: &str) -> Result<ScopeId, BindingError> {
		loop {
			let scope = self.get(id)?;
			if scope.variables.contains_key(name) {
				return Ok(id);
			}
			match scope.parent {
				Some(parent) => id = parent,
				None => return Err(BindingError::Unresolved { name: name.to_owned() }),
			}
		}
	}

	fn live_mut(&mut self) -> impl Iterator<Item = &mut Scope<V>> {
		self.slots.iter_mut().filter_map(|slot| slot.scope.as_mut())
	}
}

/// Restores the notification depth when a round of listener calls ends, even by unwinding.
struct DepthReset<'a>(&'a Cell<usize>, usize);
impl Drop for DepthReset<'_> {
	fn drop(&mut self) {
		self.0.set(self.1)
	}
}

/// An arena of lexical scopes holding state variables of type `V` and their change listeners.
///
/// All methods take `&self`, and no internal borrow is held while a listener runs,
/// so listeners are free to declare, set, subscribe and release in the same tree.
pub struct ScopeTree<V> {
	arena: RefCell<Arena<V>>,
	notify_depth: Cell<usize>,
	max_notify_depth: usize,
}

impl<V> Default for ScopeTree<V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<V> Debug for ScopeTree<V> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("ScopeTree")
			.field("len", &self.len())
			.field("notify_depth", &self.notify_depth.get())
			.field("max_notify_depth", &self.max_notify_depth)
			.finish()
	}
}

impl<V> ScopeTree<V> {
	#[must_use]
	pub fn new() -> Self {
		Self::with_max_notify_depth(DEFAULT_MAX_NOTIFY_DEPTH)
	}

	/// Creates an empty tree whose [`set_variable`](`ScopeTree::set_variable`) refuses to nest listener notifications deeper than `max_notify_depth`.
	#[must_use]
	pub fn with_max_notify_depth(max_notify_depth: usize) -> Self {
		Self {
			arena: RefCell::new(Arena { slots: Vec::new(), free: Vec::new() }),
			notify_depth: Cell::new(0),
			max_notify_depth,
		}
	}

	pub fn create_root_scope(&self) -> ScopeId {
		let id = self.arena.borrow_mut().insert(Scope::new(None));
		trace!(?id, "Created root scope.");
		id
	}

	/// # Errors
	///
	/// Iff `parent` is stale.
	pub fn create_child_scope(&self, parent: ScopeId) -> Result<ScopeId, BindingError> {
		let mut arena = self.arena.borrow_mut();
		arena.get(parent)?;
		let id = arena.insert(Scope::new(Some(parent)));
		arena.get_mut(parent)?.children.push(id);
		Ok(id)
	}

	/// Declares `name` in `scope` itself, overwriting any previous value there without notifying listeners.
	///
	/// # Errors
	///
	/// Iff `scope` is stale.
	pub fn declare_variable(&self, scope: ScopeId, name: impl Into<String>, value: V) -> Result<(), BindingError> {
		self.arena.borrow_mut().get_mut(scope)?.variables.insert(name.into(), value);
		Ok(())
	}

	/// Finds the nearest scope, starting at `scope` itself, that declares `name`.
	///
	/// # Errors
	///
	/// [`BindingError::Unresolved`] if neither `scope` nor any of its ancestors declares `name`,
	/// [`BindingError::StaleScope`] if `scope` was released.
	pub fn resolve(&self, scope: ScopeId, name: &str) -> Result<ScopeId, BindingError> {
		self.arena.borrow().resolve(scope, name)
	}

	/// Reads the value `name` resolves to from `scope`.
	///
	/// # Errors
	///
	/// As [`resolve`](`ScopeTree::resolve`).
	pub fn get(&self, scope: ScopeId, name: &str) -> Result<V, BindingError>
	where
		V: Clone,
	{
		let arena = self.arena.borrow();
		let owner = arena.resolve(scope, name)?;
		Ok(arena.get(owner)?.variables[name].clone())
	}

	/// Assigns `value` to the variable `name` resolves to and notifies that variable's listeners,
	/// in registration order, before returning.
	///
	/// Listeners whose owning scope is released while this runs are skipped.
	///
	/// # Errors
	///
	/// As [`resolve`](`ScopeTree::resolve`), or [`BindingError::NotifyDepthExceeded`] if called from too deeply nested listeners.
	/// Nothing is changed in either case.
	pub fn set_variable(&self, scope: ScopeId, name: &str, value: V) -> Result<(), BindingError>
	where
		V: Clone,
	{
		let depth = self.notify_depth.get();
		if depth >= self.max_notify_depth {
			return Err(BindingError::NotifyDepthExceeded {
				name: name.to_owned(),
				limit: self.max_notify_depth,
			});
		}

		let listeners: Vec<(ScopeId, Callback<V>)> = {
			let mut arena = self.arena.borrow_mut();
			let owner = arena.resolve(scope, name)?;
			let owner = arena.get_mut(owner)?;
			owner.variables.insert(name.to_owned(), value.clone());
			owner
				.listeners
				.get(name)
				.map(|listeners| listeners.iter().map(|listener| (listener.owner, Rc::clone(&listener.callback))).collect())
				.unwrap_or_default()
		};
		trace!(name, listeners = listeners.len(), depth, "Set variable.");

		self.notify_depth.set(depth + 1);
		let _reset = DepthReset(&self.notify_depth, depth);
		for (owner, callback) in listeners {
			if self.is_live(owner) {
				callback(&value)
			}
		}
		Ok(())
	}

	/// Registers `callback` for changes of the variable `name` resolves to from `scope`.
	///
	/// The listener belongs to `scope` and is dropped when `scope` is released.
	/// With `call_immediately`, `callback` also runs once right away with the current value.
	///
	/// # Errors
	///
	/// As [`resolve`](`ScopeTree::resolve`). Nothing is registered in that case.
	pub fn subscribe(&self, scope: ScopeId, name: &str, callback: impl Fn(&V) + 'static, call_immediately: bool) -> Result<(), BindingError>
	where
		V: Clone,
	{
		let callback: Callback<V> = Rc::new(callback);
		let current = {
			let mut arena = self.arena.borrow_mut();
			let owner = arena.resolve(scope, name)?;
			let owner = arena.get_mut(owner)?;
			owner.listeners.get_or_insert_default(name.to_owned()).push(Listener {
				owner: scope,
				callback: Rc::clone(&callback),
			});
			if call_immediately {
				owner.variables.get(name).cloned()
			} else {
				None
			}
		};

		if let Some(current) = current {
			callback(&current)
		}
		Ok(())
	}

	/// Ties `guard` to the lifetime of `scope`. It is dropped when the scope is released.
	///
	/// # Errors
	///
	/// Iff `scope` is stale, in which case `guard` is dropped immediately.
	pub fn keep_alive(&self, scope: ScopeId, guard: impl Any) -> Result<(), BindingError> {
		self.arena.borrow_mut().get_mut(scope)?.keep_alive.push(Box::new(guard));
		Ok(())
	}

	/// Releases `scope` and all of its descendants, along with every listener they registered anywhere in the tree.
	///
	/// # Errors
	///
	/// Iff `scope` is stale.
	pub fn release(&self, scope: ScopeId) -> Result<(), BindingError> {
		self.arena.borrow().get(scope)?;
		self.release_all(Some(scope));
		Ok(())
	}

	/// Releases each of `scopes` as [`release`](`ScopeTree::release`) does, purging listeners in a single pass over the tree.
	///
	/// Stale ids, including ones below a scope released earlier in the same call, are skipped.
	/// Returns how many scopes were released, descendants included.
	pub fn release_all(&self, scopes: impl IntoIterator<Item = ScopeId>) -> usize {
		let (released, purged) = {
			let mut arena = self.arena.borrow_mut();
			let mut released = Vec::new();
			let mut ids = HashSet::new();
			for scope in scopes {
				let parent = match arena.get(scope) {
					Ok(record) => record.parent,
					Err(error) => {
						trace!("Skipping release: {}", error);
						continue;
					}
				};
				if let Some(parent) = parent {
					match arena.get_mut(parent) {
						Ok(parent) => parent.children.retain(|&child| child != scope),
						Err(error) => warn!("Releasing scope below a released parent: {}", error),
					}
				}

				let mut pending = vec![scope];
				while let Some(id) = pending.pop() {
					if let Some(record) = arena.take(id) {
						pending.extend(record.children.iter().copied());
						ids.insert(id);
						released.push(record);
					}
				}
			}

			// Purged listeners are moved out rather than dropped in place.
			let mut purged = Vec::new();
			if !ids.is_empty() {
				for record in arena.live_mut() {
					for listeners in record.listeners.values_mut() {
						if listeners.iter().any(|listener| ids.contains(&listener.owner)) {
							let (gone, kept): (Vec<_>, Vec<_>) = mem::take(listeners).into_iter().partition(|listener| ids.contains(&listener.owner));
							*listeners = kept;
							purged.extend(gone);
						}
					}
				}
			}
			(released, purged)
		};
		let count = released.len();
		trace!(count, purged = purged.len(), "Released scope(s).");

		// Guards and callbacks may run arbitrary code when dropped, so this happens only after the arena is unlocked.
		drop(purged);
		drop(released);
		count
	}

	#[must_use]
	pub fn is_live(&self, scope: ScopeId) -> bool {
		self.arena.borrow().get(scope).is_ok()
	}

	/// # Errors
	///
	/// Iff `scope` is stale.
	pub fn parent(&self, scope: ScopeId) -> Result<Option<ScopeId>, BindingError> {
		Ok(self.arena.borrow().get(scope)?.parent)
	}

	/// Child scopes in creation order.
	///
	/// # Errors
	///
	/// Iff `scope` is stale.
	pub fn children(&self, scope: ScopeId) -> Result<Vec<ScopeId>, BindingError> {
		Ok(self.arena.borrow().get(scope)?.children.clone())
	}

	/// A snapshot of the variables declared directly in `scope`.
	///
	/// # Errors
	///
	/// Iff `scope` is stale.
	pub fn variables(&self, scope: ScopeId) -> Result<HashMap<String, V>, BindingError>
	where
		V: Clone,
	{
		Ok(self.arena.borrow().get(scope)?.variables.clone())
	}

	/// How many listeners are registered for `name` at `scope` itself.
	///
	/// # Errors
	///
	/// Iff `scope` is stale.
	pub fn listener_count(&self, scope: ScopeId, name: &str) -> Result<usize, BindingError> {
		Ok(self.arena.borrow().get(scope)?.listeners.get(name).map_or(0, Vec::len))
	}

	/// The number of live scopes.
	#[must_use]
	pub fn len(&self) -> usize {
		let arena = self.arena.borrow();
		arena.slots.len() - arena.free.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
