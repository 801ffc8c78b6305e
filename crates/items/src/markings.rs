//! Live tags and marker payloads of one data unit.

use std::any::Any;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::ItemError;
use crate::kind::ItemKind;
use crate::registry::{ItemId, ItemRegistry};
use crate::set::ItemSet;

/// A marker payload type, bound by name to a registered marker item.
pub trait Marker: Any + Send + Sync {
	/// Name of the marker item in the data registry.
	const NAME: &'static str;
}

/// Tag state and marker payloads attached to a single data unit.
///
/// The marker's bit in [`Markings::tags`] and its payload are kept in step: attaching a payload
/// sets the bit and dropping the bit through [`Markings::remove_all`] drops the payload.
pub struct Markings {
	component: ItemId,
	tags: ItemSet,
	payloads: FxHashMap<ItemId, Box<dyn Any + Send + Sync>>,
}

impl Markings {
	/// Creates empty markings for a unit of the named component.
	pub fn new(registry: &Arc<ItemRegistry>, component: &str) -> Result<Self, ItemError> {
		let component = registry.lookup_kind(component, ItemKind::Component)?;
		Ok(Self {
			component,
			tags: ItemSet::new(registry),
			payloads: FxHashMap::default(),
		})
	}

	pub fn component(&self) -> ItemId {
		self.component
	}

	pub fn component_name(&self) -> &str {
		self.tags.registry().name(self.component)
	}

	pub fn tags(&self) -> &ItemSet {
		&self.tags
	}

	/// Direct access to the tag bits. Marker payloads are not touched.
	pub fn tags_mut(&mut self) -> &mut ItemSet {
		&mut self.tags
	}

	/// Removes `items` and drops the payloads of any marker among them.
	pub fn remove_all(&mut self, items: &ItemSet) {
		self.tags.remove_all(items);
		let tags = &self.tags;
		self.payloads.retain(|&marker, _| tags.contains(marker));
	}

	/// Attaches a marker payload, returning the payload it replaces.
	pub fn add_marker<M: Marker>(&mut self, marker: M) -> Result<Option<M>, ItemError> {
		let id = self.marker_id::<M>()?;
		let registry = Arc::clone(self.tags.registry());
		let managed = registry.managed(id);
		if !managed.valid_on().is_empty() && !managed.valid_on().contains(&self.component) {
			return Err(ItemError::MarkerNotValidOn {
				marker: M::NAME.to_string(),
				component: registry.name(self.component).to_string(),
			});
		}

		self.tags.add(id);
		let previous = self.payloads.insert(id, Box::new(marker));
		Ok(previous.and_then(|old| old.downcast::<M>().ok().map(|b| *b)))
	}

	pub fn marker<M: Marker>(&self) -> Option<&M> {
		let id = self.tags.registry().get(M::NAME)?;
		self.payloads.get(&id)?.downcast_ref::<M>()
	}

	pub fn marker_mut<M: Marker>(&mut self) -> Option<&mut M> {
		let id = self.tags.registry().get(M::NAME)?;
		self.payloads.get_mut(&id)?.downcast_mut::<M>()
	}

	/// Detaches a marker payload and clears its bit.
	pub fn remove_marker<M: Marker>(&mut self) -> Option<M> {
		let id = self.tags.registry().get(M::NAME)?;
		self.tags.remove(id);
		let payload = self.payloads.remove(&id)?;
		payload.downcast::<M>().ok().map(|b| *b)
	}

	pub fn has_marker<M: Marker>(&self) -> bool {
		self.tags
			.registry()
			.get(M::NAME)
			.is_some_and(|id| self.payloads.contains_key(&id))
	}

	/// Returns true if a payload is attached for the marker item `id`.
	pub fn has_payload(&self, id: ItemId) -> bool {
		self.payloads.contains_key(&id)
	}

	fn marker_id<M: Marker>(&self) -> Result<ItemId, ItemError> {
		self.tags
			.registry()
			.lookup_kind(M::NAME, ItemKind::Marker)
	}
}

impl core::fmt::Debug for Markings {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Markings")
			.field("component", &self.component_name())
			.field("tags", &self.tags)
			.field("payloads", &self.payloads.len())
			.finish()
	}
}
