use crate::kind::{ItemKind, RegistryDomain};

/// Errors raised while declaring, resolving or looking up items.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemError {
	/// The item name was never registered in this registry.
	#[error("item '{name}' is not registered in the {registry} registry")]
	NotRegistered { registry: &'static str, name: String },

	/// Two declarations share a name.
	#[error("item '{name}' is registered twice in the {registry} registry")]
	Duplicate { registry: &'static str, name: String },

	/// The declaration's kind does not belong in this registry.
	#[error("{kind} '{name}' cannot be registered in the {domain} registry")]
	WrongDomain {
		domain: RegistryDomain,
		kind: ItemKind,
		name: String,
	},

	/// An item was used where another kind was expected.
	#[error("item '{name}' is a {actual}, expected a {expected}")]
	KindMismatch {
		name: String,
		expected: ItemKind,
		actual: ItemKind,
	},

	/// A `composed-of` or `valid-on` reference names no registered item.
	#[error("item '{item}' references unknown item '{reference}'")]
	UnknownReference { item: String, reference: String },

	/// Composite declarations form a cycle.
	#[error("cyclic composition: {}", cycle.join(" -> "))]
	CyclicComposition { cycle: Vec<String> },

	/// Only markers may declare `valid-on`.
	#[error("item '{name}' declares valid-on but is a {kind}")]
	ValidOnNotMarker { name: String, kind: ItemKind },

	/// No item occupies the requested slot.
	#[error("no item occupies slot ({word}, {bit}) in the {registry} registry")]
	EmptySlot {
		registry: &'static str,
		word: u32,
		bit: u32,
	},

	/// A set still had bits left that no registered item covers.
	#[error("{remaining} bit(s) of the set are not covered by any registered item")]
	IncompleteCover { remaining: u32 },

	/// A marker payload was attached to a unit of a component it is not valid on.
	#[error("marker '{marker}' is not valid on component '{component}'")]
	MarkerNotValidOn { marker: String, component: String },

	/// The TOML manifest could not be parsed.
	#[error("invalid item manifest: {0}")]
	Manifest(String),
}
