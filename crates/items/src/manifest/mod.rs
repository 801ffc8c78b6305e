//! Declarative item manifests.
//!
//! ```toml
//! [[item]]
//! name = "method"
//! kind = "component"
//!
//! [[item]]
//! name = "optimized"
//! kind = "tag"
//! composed-of = ["constants-folded", "dead-code-removed"]
//! ```

use serde::Deserialize;

use crate::def::ItemDef;
use crate::error::ItemError;
use crate::kind::ItemKind;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
	#[serde(default, rename = "item")]
	pub items: Vec<ManifestItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ManifestItem {
	pub name: String,
	pub kind: ItemKind,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub composed_of: Vec<String>,
	#[serde(default, rename = "abstract")]
	pub is_abstract: bool,
	#[serde(default)]
	pub valid_on: Vec<String>,
}

impl Manifest {
	pub fn from_toml_str(source: &str) -> Result<Self, ItemError> {
		toml::from_str(source).map_err(|e| ItemError::Manifest(e.to_string()))
	}
}

impl ManifestItem {
	pub fn to_def(&self) -> ItemDef {
		ItemDef {
			name: self.name.clone(),
			description: self.description.clone(),
			kind: self.kind,
			composed_of: self.composed_of.clone(),
			is_abstract: self.is_abstract,
			valid_on: self.valid_on.clone(),
		}
	}
}
