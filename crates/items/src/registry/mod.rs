//! Item registries.
//!
//! # Role
//!
//! A [`RegistryBuilder`] accepts declarations (thread-safe, atomic slot allocation) and freezes
//! into an [`ItemRegistry`]. Only the frozen registry can back an [`crate::ItemSet`], which is
//! what guarantees every set over a registry has the same word count.
//!
//! # Invariants
//!
//! - Slots are assigned once, densely, in registration order, and never reused.
//!   - Enforced in: [`RegistryBuilder::register`].
//!   - Tested by: `tests::test_slots_are_unique_and_dense`.
//! - Composite resolution terminates: a cycle is a configuration error.
//!   - Enforced in: `resolve::resolve_bitmaps`.
//!   - Tested by: `tests::test_cycle_is_rejected`.
//! - Ids are only meaningful for the registry that issued them.
//!   - Enforced in: [`ItemRegistry::managed`] (panics on a foreign id).

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashMap;

use crate::error::ItemError;
use crate::kind::{ItemKind, RegistryDomain};
use crate::set::ItemSet;

mod builder;
mod resolve;

pub use builder::RegistryBuilder;


static NEXT_REGISTRY: AtomicU32 = AtomicU32::new(0);

/// Process-unique identity of one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryId(u32);

impl RegistryId {
	pub(crate) fn next() -> Self {
		Self(NEXT_REGISTRY.fetch_add(1, Ordering::Relaxed))
	}
}

/// Handle to an item, scoped to the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId {
	pub(crate) registry: RegistryId,
	pub(crate) index: u32,
}

impl ItemId {
	pub fn registry(self) -> RegistryId {
		self.registry
	}

	/// Dense registration index within the owning registry.
	pub fn index(self) -> u32 {
		self.index
	}
}

/// Bit position of a primitive item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
	pub word: u32,
	pub bit: u32,
}

impl Slot {
	pub const fn from_ordinal(ordinal: u32) -> Self {
		Self {
			word: ordinal / crate::BITS_PER_WORD,
			bit: ordinal % crate::BITS_PER_WORD,
		}
	}

	pub const fn ordinal(self) -> u32 {
		self.word * crate::BITS_PER_WORD + self.bit
	}

	pub const fn mask(self) -> u64 {
		1u64 << self.bit
	}
}

/// Number of words needed to hold `slots` bits.
pub(crate) const fn words_for(slots: u32) -> usize {
	slots.div_ceil(crate::BITS_PER_WORD) as usize
}

/// The registry's record for one item.
#[derive(Debug, Clone)]
pub struct ManagedItem {
	id: ItemId,
	name: Box<str>,
	description: Box<str>,
	kind: ItemKind,
	slot: Option<Slot>,
	is_abstract: bool,
	composed_of: Box<[ItemId]>,
	valid_on: Box<[ItemId]>,
	bitmap: Box<[u64]>,
	cardinality: u32,
}

impl ManagedItem {
	pub fn id(&self) -> ItemId {
		self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	pub fn kind(&self) -> ItemKind {
		self.kind
	}

	/// Returns the item's own slot; `None` for composite and abstract items.
	pub fn slot(&self) -> Option<Slot> {
		self.slot
	}

	pub fn is_primitive(&self) -> bool {
		self.slot.is_some()
	}

	pub fn is_composite(&self) -> bool {
		!self.composed_of.is_empty()
	}

	pub fn is_abstract(&self) -> bool {
		self.is_abstract
	}

	pub fn composed_of(&self) -> &[ItemId] {
		&self.composed_of
	}

	/// Components a marker may be attached to. Empty means unrestricted.
	pub fn valid_on(&self) -> &[ItemId] {
		&self.valid_on
	}

	/// Resolved bitmap: one bit for primitives, the union of components otherwise.
	pub fn bitmap(&self) -> &[u64] {
		&self.bitmap
	}

	/// Number of primitive items covered by this item.
	pub fn cardinality(&self) -> u32 {
		self.cardinality
	}
}

/// Frozen, read-only item registry.
pub struct ItemRegistry {
	id: RegistryId,
	domain: RegistryDomain,
	items: Box<[ManagedItem]>,
	by_name: FxHashMap<Box<str>, u32>,
	by_ordinal: Box<[u32]>,
	words: usize,
	kind_masks: [Box<[u64]>; 5],
}

impl ItemRegistry {
	pub fn id(&self) -> RegistryId {
		self.id
	}

	pub fn domain(&self) -> RegistryDomain {
		self.domain
	}

	pub fn label(&self) -> &'static str {
		self.domain.label()
	}

	/// Number of 64-bit words every set over this registry holds.
	pub fn words(&self) -> usize {
		self.words
	}

	/// Number of registered items, composite ones included.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Number of items that own a slot.
	pub fn primitive_count(&self) -> usize {
		self.by_ordinal.len()
	}

	/// Iterates over all items in registration order.
	pub fn iter(&self) -> impl Iterator<Item = &ManagedItem> + '_ {
		self.items.iter()
	}

	/// Returns the id registered under `name`.
	pub fn get(&self, name: &str) -> Option<ItemId> {
		self.by_name.get(name).map(|&index| ItemId {
			registry: self.id,
			index,
		})
	}

	/// Returns the id registered under `name`, failing if there is none.
	pub fn lookup(&self, name: &str) -> Result<ItemId, ItemError> {
		self.get(name).ok_or_else(|| ItemError::NotRegistered {
			registry: self.label(),
			name: name.to_string(),
		})
	}

	/// Looks up `name` and checks that it is of `kind`.
	pub fn lookup_kind(&self, name: &str, kind: ItemKind) -> Result<ItemId, ItemError> {
		let id = self.lookup(name)?;
		let actual = self.managed(id).kind;
		if actual != kind {
			return Err(ItemError::KindMismatch {
				name: name.to_string(),
				expected: kind,
				actual,
			});
		}
		Ok(id)
	}

	/// Returns the record for `id`.
	///
	/// # Panics
	///
	/// Panics if `id` was issued by another registry.
	pub fn managed(&self, id: ItemId) -> &ManagedItem {
		self.assert_owns(id);
		&self.items[id.index as usize]
	}

	/// Reverse lookup by slot.
	pub fn managed_at(&self, word: u32, bit: u32) -> Result<&ManagedItem, ItemError> {
		let slot = Slot { word, bit };
		if bit >= crate::BITS_PER_WORD || word as usize >= self.words {
			return Err(self.empty_slot(slot));
		}
		self.by_ordinal
			.get(slot.ordinal() as usize)
			.map(|&index| &self.items[index as usize])
			.ok_or_else(|| self.empty_slot(slot))
	}

	pub fn name(&self, id: ItemId) -> &str {
		self.managed(id).name()
	}

	/// Union of the bits of all primitive items of `kind`.
	pub fn kind_mask(&self, kind: ItemKind) -> &[u64] {
		&self.kind_masks[kind.index()]
	}

	pub fn owns(&self, id: ItemId) -> bool {
		id.registry == self.id && (id.index as usize) < self.items.len()
	}

	pub(crate) fn assert_owns(&self, id: ItemId) {
		assert!(
			self.owns(id),
			"item {id:?} was not issued by the {} registry {:?}",
			self.label(),
			self.id
		);
	}

	pub(crate) fn item_at_ordinal(&self, ordinal: u32) -> Option<&ManagedItem> {
		self.by_ordinal
			.get(ordinal as usize)
			.map(|&index| &self.items[index as usize])
	}

	/// Creates an empty set over this registry.
	pub fn empty_set(self: &Arc<Self>) -> ItemSet {
		ItemSet::new(self)
	}

	/// Creates a set holding the named items.
	pub fn set_of<I, S>(self: &Arc<Self>, names: I) -> Result<ItemSet, ItemError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut set = ItemSet::new(self);
		for name in names {
			set.add(self.lookup(name.as_ref())?);
		}
		Ok(set)
	}

	fn empty_slot(&self, slot: Slot) -> ItemError {
		ItemError::EmptySlot {
			registry: self.label(),
			word: slot.word,
			bit: slot.bit,
		}
	}
}

impl core::fmt::Debug for ItemRegistry {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("ItemRegistry")
			.field("id", &self.id)
			.field("domain", &self.domain)
			.field("items", &self.items.len())
			.field("words", &self.words)
			.finish()
	}
}
