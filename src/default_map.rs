//! A [`HashMap`] that materialises missing values on mutable access.

use core::{
	borrow::Borrow,
	fmt::{self, Debug, Formatter},
	hash::{BuildHasher, Hash},
};
use hashbrown::{hash_map::DefaultHashBuilder, HashMap};

pub struct DefaultMap<K, V, S = DefaultHashBuilder>(HashMap<K, V, S>)
where
	K: Hash + Eq,
	V: Default,
	S: BuildHasher;
impl<K, V, S> Default for DefaultMap<K, V, S>
where
	K: Hash + Eq,
	V: Default,
	S: Default + BuildHasher,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<K, V, S> DefaultMap<K, V, S>
where
	K: Hash + Eq,
	V: Default,
	S: BuildHasher,
{
	#[must_use]
	pub fn new() -> Self
	where
		S: Default,
	{
		Self(HashMap::with_hasher(S::default()))
	}

	/// Returns the value for `k`, inserting `V::default()` first if it is missing.
	pub fn get_or_insert_default(&mut self, k: K) -> &mut V {
		self.0.entry(k).or_default()
	}

	/// Unlike [`get_or_insert_default`](`DefaultMap::get_or_insert_default`), this never inserts.
	pub fn get<Q: ?Sized>(&self, k: &Q) -> Option<&V>
	where
		K: Borrow<Q>,
		Q: Eq + Hash,
	{
		self.0.get(k)
	}

	pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
		self.0.values_mut()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<K, V, S> Debug for DefaultMap<K, V, S>
where
	K: Hash + Eq + Debug,
	V: Default + Debug,
	S: BuildHasher,
{
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("DefaultMap").field(&self.0).finish()
	}
}
