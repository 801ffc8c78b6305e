use serde::Deserialize;

/// Role of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
	/// Boolean property of a data unit.
	Tag,
	/// Tag-like property that also carries a payload.
	Marker,
	/// A data granularity that schedulables run on.
	Component,
	/// Boolean property of a scheduling run.
	Feature,
	/// Goal a schedulable may declare it produces.
	Production,
}

impl ItemKind {
	pub const ALL: [ItemKind; 5] = [
		ItemKind::Tag,
		ItemKind::Marker,
		ItemKind::Component,
		ItemKind::Feature,
		ItemKind::Production,
	];

	/// Returns the registry domain that holds items of this kind.
	pub const fn domain(self) -> RegistryDomain {
		match self {
			Self::Tag | Self::Marker | Self::Component => RegistryDomain::Data,
			Self::Feature => RegistryDomain::Feature,
			Self::Production => RegistryDomain::Production,
		}
	}

	pub(crate) const fn index(self) -> usize {
		match self {
			Self::Tag => 0,
			Self::Marker => 1,
			Self::Component => 2,
			Self::Feature => 3,
			Self::Production => 4,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Tag => "tag",
			Self::Marker => "marker",
			Self::Component => "component",
			Self::Feature => "feature",
			Self::Production => "production",
		}
	}
}

impl core::fmt::Display for ItemKind {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Partition of items into registries.
///
/// Tags, markers and components share one registry so a single [`crate::ItemSet`] can describe
/// the full state of a data unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryDomain {
	/// Tags, markers and components.
	Data,
	/// Run-level features.
	Feature,
	/// Production goals.
	Production,
}

impl RegistryDomain {
	/// Returns true if items of `kind` belong to this domain.
	pub const fn admits(self, kind: ItemKind) -> bool {
		matches!(
			(self, kind.domain()),
			(Self::Data, RegistryDomain::Data)
				| (Self::Feature, RegistryDomain::Feature)
				| (Self::Production, RegistryDomain::Production)
		)
	}

	pub const fn label(self) -> &'static str {
		match self {
			Self::Data => "data",
			Self::Feature => "features",
			Self::Production => "productions",
		}
	}
}

impl core::fmt::Display for RegistryDomain {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.write_str(self.label())
	}
}
