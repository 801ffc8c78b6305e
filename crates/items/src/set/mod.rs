//! Bitmap-backed item sets.
//!
//! # Role
//!
//! An [`ItemSet`] exclusively owns a fixed-length word array sized by its registry. Membership
//! of a composite item means all of its primitive bits are present. Adding or removing a
//! composite item adds or removes all of its bits.
//!
//! # Invariants
//!
//! - Binary operations require both sets to come from the same registry.
//!   - Enforced in: `ItemSet::assert_compatible` (panics).
//! - Equality and hashing cover the registry identity and the words, nothing else.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::registry::{ItemId, ItemRegistry, Slot};

mod compact;


/// A set of items from one registry.
#[derive(Clone)]
pub struct ItemSet {
	registry: Arc<ItemRegistry>,
	words: Box<[u64]>,
}

impl ItemSet {
	/// Creates an empty set over `registry`.
	pub fn new(registry: &Arc<ItemRegistry>) -> Self {
		Self {
			registry: Arc::clone(registry),
			words: vec![0u64; registry.words()].into_boxed_slice(),
		}
	}

	pub fn registry(&self) -> &Arc<ItemRegistry> {
		&self.registry
	}

	pub fn words(&self) -> &[u64] {
		&self.words
	}

	/// Adds `item`; for a composite item, all of its components.
	pub fn add(&mut self, item: ItemId) {
		let bitmap = self.registry.managed(item).bitmap();
		for (dst, src) in self.words.iter_mut().zip(bitmap) {
			*dst |= *src;
		}
	}

	pub fn add_all(&mut self, other: &ItemSet) {
		self.assert_compatible(other);
		for (dst, src) in self.words.iter_mut().zip(other.words.iter()) {
			*dst |= *src;
		}
	}

	/// Removes `item`; for a composite item, all of its components.
	pub fn remove(&mut self, item: ItemId) {
		let bitmap = self.registry.managed(item).bitmap();
		for (dst, src) in self.words.iter_mut().zip(bitmap) {
			*dst &= !*src;
		}
	}

	pub fn remove_all(&mut self, other: &ItemSet) {
		self.assert_compatible(other);
		for (dst, src) in self.words.iter_mut().zip(other.words.iter()) {
			*dst &= !*src;
		}
	}

	/// Keeps only the items also present in `other`.
	pub fn retain_all(&mut self, other: &ItemSet) {
		self.assert_compatible(other);
		for (dst, src) in self.words.iter_mut().zip(other.words.iter()) {
			*dst &= *src;
		}
	}

	/// Returns true if every bit of `item` is present.
	pub fn contains(&self, item: ItemId) -> bool {
		self.contains_bits(self.registry.managed(item).bitmap())
	}

	pub fn contains_all(&self, other: &ItemSet) -> bool {
		self.assert_compatible(other);
		self.contains_bits(&other.words)
	}

	/// Returns true if the sets share at least one item.
	pub fn contains_one(&self, other: &ItemSet) -> bool {
		self.assert_compatible(other);
		self.words
			.iter()
			.zip(other.words.iter())
			.any(|(a, b)| a & b != 0)
	}

	/// Returns true if the sets are disjoint.
	pub fn contains_none(&self, other: &ItemSet) -> bool {
		!self.contains_one(other)
	}

	pub fn clear(&mut self) {
		self.words.fill(0);
	}

	/// Number of primitive items present.
	pub fn len(&self) -> usize {
		self.words.iter().map(|w| w.count_ones() as usize).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.words.iter().all(|&w| w == 0)
	}

	pub fn union(&self, other: &ItemSet) -> ItemSet {
		let mut out = self.clone();
		out.add_all(other);
		out
	}

	pub fn intersection(&self, other: &ItemSet) -> ItemSet {
		let mut out = self.clone();
		out.retain_all(other);
		out
	}

	pub fn difference(&self, other: &ItemSet) -> ItemSet {
		let mut out = self.clone();
		out.remove_all(other);
		out
	}

	/// Iterates over the primitive items present, in slot order.
	pub fn iter(&self) -> Iter<'_> {
		Iter {
			set: self,
			word: 0,
			pending: self.words.first().copied().unwrap_or(0),
		}
	}

	/// Names of the primitive items present, in slot order.
	pub fn names(&self) -> Vec<&str> {
		self.iter().map(|id| self.registry.name(id)).collect()
	}

	pub(crate) fn contains_bits(&self, bitmap: &[u64]) -> bool {
		self.words
			.iter()
			.zip(bitmap)
			.all(|(have, want)| have & want == *want)
	}

	fn assert_compatible(&self, other: &ItemSet) {
		assert!(
			self.registry.id() == other.registry.id(),
			"item sets from different registries combined: {} {:?} vs {} {:?}",
			self.registry.label(),
			self.registry.id(),
			other.registry.label(),
			other.registry.id()
		);
	}
}

/// Iterator over the primitive items of an [`ItemSet`].
pub struct Iter<'a> {
	set: &'a ItemSet,
	word: usize,
	pending: u64,
}

impl Iterator for Iter<'_> {
	type Item = ItemId;

	fn next(&mut self) -> Option<ItemId> {
		loop {
			if self.pending != 0 {
				let bit = self.pending.trailing_zeros();
				self.pending &= self.pending - 1;
				let slot = Slot {
					word: self.word as u32,
					bit,
				};
				if let Some(item) = self.set.registry.item_at_ordinal(slot.ordinal()) {
					return Some(item.id());
				}
				continue;
			}
			self.word += 1;
			self.pending = *self.set.words.get(self.word)?;
		}
	}
}

impl<'a> IntoIterator for &'a ItemSet {
	type Item = ItemId;
	type IntoIter = Iter<'a>;

	fn into_iter(self) -> Iter<'a> {
		self.iter()
	}
}

impl Extend<ItemId> for ItemSet {
	fn extend<I: IntoIterator<Item = ItemId>>(&mut self, iter: I) {
		for item in iter {
			self.add(item);
		}
	}
}

impl PartialEq for ItemSet {
	fn eq(&self, other: &Self) -> bool {
		self.registry.id() == other.registry.id() && self.words == other.words
	}
}

impl Eq for ItemSet {}

impl Hash for ItemSet {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.registry.id().hash(state);
		self.words.hash(state);
	}
}

impl core::fmt::Debug for ItemSet {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_set().entries(self.names()).finish()
	}
}

/// Formats the set through its compact cover, e.g. `{optimized, three-address-code}`.
impl core::fmt::Display for ItemSet {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		let names: Vec<&str> = match self.compact() {
			Ok(cover) => cover.into_iter().map(|id| self.registry.name(id)).collect(),
			Err(_) => self.names(),
		};
		write!(f, "{{{}}}", names.join(", "))
	}
}
