use crate::kind::ItemKind;

/// Declaration of one item, consumed by [`crate::RegistryBuilder::register`].
///
/// Component and validity references are by name and are resolved when the registry is built,
/// so declarations may appear in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDef {
	pub name: String,
	pub description: String,
	pub kind: ItemKind,
	pub composed_of: Vec<String>,
	pub is_abstract: bool,
	pub valid_on: Vec<String>,
}

impl ItemDef {
	pub fn new(kind: ItemKind, name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			description: String::new(),
			kind,
			composed_of: Vec::new(),
			is_abstract: false,
			valid_on: Vec::new(),
		}
	}

	pub fn tag(name: impl Into<String>) -> Self {
		Self::new(ItemKind::Tag, name)
	}

	pub fn marker(name: impl Into<String>) -> Self {
		Self::new(ItemKind::Marker, name)
	}

	pub fn component(name: impl Into<String>) -> Self {
		Self::new(ItemKind::Component, name)
	}

	pub fn feature(name: impl Into<String>) -> Self {
		Self::new(ItemKind::Feature, name)
	}

	pub fn production(name: impl Into<String>) -> Self {
		Self::new(ItemKind::Production, name)
	}

	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();
		self
	}

	/// Declares this item as the union of `components`.
	pub fn composed_of<I, S>(mut self, components: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.composed_of.extend(components.into_iter().map(Into::into));
		self
	}

	/// Marks the item abstract: it gets no slot of its own.
	pub fn abstract_item(mut self) -> Self {
		self.is_abstract = true;
		self
	}

	/// Restricts a marker to units of the named components.
	pub fn valid_on<I, S>(mut self, components: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.valid_on.extend(components.into_iter().map(Into::into));
		self
	}

	/// Returns true if the item owns a slot.
	pub fn is_primitive(&self) -> bool {
		!self.is_abstract && self.composed_of.is_empty()
	}
}
