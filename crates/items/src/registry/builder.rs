use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::resolve::resolve_bitmaps;
use super::{ItemId, ItemRegistry, ManagedItem, RegistryId, Slot, words_for};
use crate::def::ItemDef;
use crate::error::ItemError;
use crate::kind::{ItemKind, RegistryDomain};

/// Collects item declarations for one registry.
///
/// Registration takes `&self` so independent item families can register from several threads
/// during startup. Slots come from a monotonic counter, packed 64 per word.
pub struct RegistryBuilder {
	id: RegistryId,
	domain: RegistryDomain,
	next_slot: AtomicU32,
	pending: Mutex<Pending>,
}

#[derive(Default)]
struct Pending {
	defs: Vec<PendingItem>,
	by_name: FxHashMap<Box<str>, u32>,
}

struct PendingItem {
	def: ItemDef,
	slot: Option<Slot>,
}

impl RegistryBuilder {
	pub fn new(domain: RegistryDomain) -> Self {
		Self {
			id: RegistryId::next(),
			domain,
			next_slot: AtomicU32::new(0),
			pending: Mutex::new(Pending::default()),
		}
	}

	pub fn id(&self) -> RegistryId {
		self.id
	}

	pub fn domain(&self) -> RegistryDomain {
		self.domain
	}

	/// Registers one item and returns its id.
	///
	/// Primitive items are assigned the next free slot; composite and abstract items get none.
	pub fn register(&self, def: ItemDef) -> Result<ItemId, ItemError> {
		if !self.domain.admits(def.kind) {
			return Err(ItemError::WrongDomain {
				domain: self.domain,
				kind: def.kind,
				name: def.name,
			});
		}
		if !def.valid_on.is_empty() && def.kind != ItemKind::Marker {
			return Err(ItemError::ValidOnNotMarker {
				name: def.name,
				kind: def.kind,
			});
		}

		let mut pending = self.pending.lock();
		if pending.by_name.contains_key(def.name.as_str()) {
			return Err(ItemError::Duplicate {
				registry: self.domain.label(),
				name: def.name,
			});
		}

		let slot = def
			.is_primitive()
			.then(|| Slot::from_ordinal(self.next_slot.fetch_add(1, Ordering::AcqRel)));
		let index = pending.defs.len() as u32;
		pending
			.by_name
			.insert(def.name.clone().into_boxed_str(), index);

		tracing::debug!(
			registry = self.domain.label(),
			item = %def.name,
			kind = %def.kind,
			?slot,
			"registered item"
		);
		pending.defs.push(PendingItem { def, slot });

		Ok(ItemId {
			registry: self.id,
			index,
		})
	}

	/// Returns the id of an already registered item.
	pub fn get(&self, name: &str) -> Option<ItemId> {
		self.pending
			.lock()
			.by_name
			.get(name)
			.map(|&index| ItemId {
				registry: self.id,
				index,
			})
	}

	/// Number of words needed for the primitive items registered so far.
	pub fn words_needed(&self) -> usize {
		words_for(self.next_slot.load(Ordering::Acquire))
	}

	pub fn len(&self) -> usize {
		self.pending.lock().defs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Freezes the registry: resolves references and composite bitmaps.
	pub fn build(self) -> Result<ItemRegistry, ItemError> {
		let Pending { defs, by_name } = self.pending.into_inner();
		let slot_count = self.next_slot.into_inner();
		let words = words_for(slot_count);

		let resolve_ref = |item: &ItemDef, reference: &str| -> Result<u32, ItemError> {
			by_name
				.get(reference)
				.copied()
				.ok_or_else(|| ItemError::UnknownReference {
					item: item.name.clone(),
					reference: reference.to_string(),
				})
		};

		let mut composed = Vec::with_capacity(defs.len());
		let mut valid_on = Vec::with_capacity(defs.len());
		for pending in &defs {
			let def = &pending.def;
			let components = def
				.composed_of
				.iter()
				.map(|name| resolve_ref(def, name))
				.collect::<Result<Vec<_>, _>>()?;
			let targets = def
				.valid_on
				.iter()
				.map(|name| {
					let index = resolve_ref(def, name)?;
					let target = &defs[index as usize].def;
					if target.kind != ItemKind::Component {
						return Err(ItemError::KindMismatch {
							name: target.name.clone(),
							expected: ItemKind::Component,
							actual: target.kind,
						});
					}
					Ok(index)
				})
				.collect::<Result<Vec<_>, _>>()?;
			composed.push(components);
			valid_on.push(targets);
		}

		let names: Vec<&str> = defs.iter().map(|p| p.def.name.as_str()).collect();
		let slots: Vec<Option<Slot>> = defs.iter().map(|p| p.slot).collect();
		let bitmaps = resolve_bitmaps(&names, &slots, &composed, words)?;

		let mut by_ordinal = vec![0u32; slot_count as usize];
		let mut kind_masks: [Box<[u64]>; 5] =
			std::array::from_fn(|_| vec![0u64; words].into_boxed_slice());
		let id = self.id;
		let to_id = |index: u32| ItemId {
			registry: id,
			index,
		};

		let items: Box<[ManagedItem]> = defs
			.into_iter()
			.zip(composed)
			.zip(valid_on)
			.zip(bitmaps)
			.enumerate()
			.map(|(index, (((pending, components), targets), bitmap))| {
				let PendingItem { def, slot } = pending;
				if let Some(slot) = slot {
					by_ordinal[slot.ordinal() as usize] = index as u32;
					kind_masks[def.kind.index()][slot.word as usize] |= slot.mask();
				}
				let cardinality = bitmap.iter().map(|w| w.count_ones()).sum();
				ManagedItem {
					id: to_id(index as u32),
					name: def.name.into_boxed_str(),
					description: def.description.into_boxed_str(),
					kind: def.kind,
					slot,
					is_abstract: def.is_abstract,
					composed_of: components.into_iter().map(to_id).collect(),
					valid_on: targets.into_iter().map(to_id).collect(),
					bitmap,
					cardinality,
				}
			})
			.collect();

		tracing::debug!(
			registry = self.domain.label(),
			items = items.len(),
			slots = slot_count,
			words,
			"froze item registry"
		);

		Ok(ItemRegistry {
			id,
			domain: self.domain,
			items,
			by_name,
			by_ordinal: by_ordinal.into_boxed_slice(),
			words,
			kind_masks,
		})
	}
}
