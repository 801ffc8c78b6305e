use std::sync::Arc;

use crate::def::ItemDef;
use crate::error::ItemError;
use crate::kind::RegistryDomain;
use crate::manifest::Manifest;
use crate::registry::{ItemId, ItemRegistry, RegistryBuilder};
use crate::set::ItemSet;

/// Builder for the three item registries.
pub struct CatalogBuilder {
	data: RegistryBuilder,
	features: RegistryBuilder,
	productions: RegistryBuilder,
}

impl Default for CatalogBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl CatalogBuilder {
	pub fn new() -> Self {
		Self {
			data: RegistryBuilder::new(RegistryDomain::Data),
			features: RegistryBuilder::new(RegistryDomain::Feature),
			productions: RegistryBuilder::new(RegistryDomain::Production),
		}
	}

	/// Registers `def` into the registry for its kind.
	pub fn register(&self, def: ItemDef) -> Result<ItemId, ItemError> {
		self.builder(def.kind.domain()).register(def)
	}

	/// Registers every item declared in `manifest`.
	pub fn load_manifest(&self, manifest: &Manifest) -> Result<Vec<ItemId>, ItemError> {
		manifest
			.items
			.iter()
			.map(|item| self.register(item.to_def()))
			.collect()
	}

	pub fn builder(&self, domain: RegistryDomain) -> &RegistryBuilder {
		match domain {
			RegistryDomain::Data => &self.data,
			RegistryDomain::Feature => &self.features,
			RegistryDomain::Production => &self.productions,
		}
	}

	pub fn build(self) -> Result<Catalog, ItemError> {
		Ok(Catalog {
			data: Arc::new(self.data.build()?),
			features: Arc::new(self.features.build()?),
			productions: Arc::new(self.productions.build()?),
		})
	}
}

/// Frozen registries for tags/markers/components, features and productions.
#[derive(Debug, Clone)]
pub struct Catalog {
	data: Arc<ItemRegistry>,
	features: Arc<ItemRegistry>,
	productions: Arc<ItemRegistry>,
}

impl Catalog {
	/// Registry of tags, markers and components.
	pub fn data(&self) -> &Arc<ItemRegistry> {
		&self.data
	}

	pub fn features(&self) -> &Arc<ItemRegistry> {
		&self.features
	}

	pub fn productions(&self) -> &Arc<ItemRegistry> {
		&self.productions
	}

	pub fn registry(&self, domain: RegistryDomain) -> &Arc<ItemRegistry> {
		match domain {
			RegistryDomain::Data => &self.data,
			RegistryDomain::Feature => &self.features,
			RegistryDomain::Production => &self.productions,
		}
	}

	pub fn data_set(&self) -> ItemSet {
		ItemSet::new(&self.data)
	}

	pub fn feature_set(&self) -> ItemSet {
		ItemSet::new(&self.features)
	}

	pub fn production_set(&self) -> ItemSet {
		ItemSet::new(&self.productions)
	}
}
