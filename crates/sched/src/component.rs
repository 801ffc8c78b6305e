use std::any::Any;

use sched_items::{Catalog, ItemError, Markings};

/// A data granularity the scheduler runs passes over.
///
/// `NAME` must match a component item in the catalog's data registry. Every unit carries its
/// own [`Markings`], which the executor reads before and updates after each step.
pub trait Component: Send + 'static {
	const NAME: &'static str;

	fn markings(&self) -> &Markings;

	fn markings_mut(&mut self) -> &mut Markings;
}

/// Creates empty markings for a unit of `C`.
pub fn markings_for<C: Component>(catalog: &Catalog) -> Result<Markings, ItemError> {
	Markings::new(catalog.data(), C::NAME)
}

/// Object-safe view of a [`Component`], used where the executor walks units of mixed types.
pub(crate) trait DynComponent: Send {
	fn component_name(&self) -> &'static str;

	fn markings(&self) -> &Markings;

	fn markings_mut(&mut self) -> &mut Markings;

	fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> DynComponent for C {
	fn component_name(&self) -> &'static str {
		C::NAME
	}

	fn markings(&self) -> &Markings {
		Component::markings(self)
	}

	fn markings_mut(&mut self) -> &mut Markings {
		Component::markings_mut(self)
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}
