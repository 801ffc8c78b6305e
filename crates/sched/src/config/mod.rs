//! Typed configuration properties.
//!
//! # Role
//!
//! Schedulables read tuning knobs (and the executor reads its runner mode) through typed
//! [`Property`] handles over static [`PropertyDef`]s. A [`ConfigBuilder`] collects definitions
//! and values, from code, from strings or from a TOML file, and freezes them into an immutable
//! [`Config`].
//!
//! Runners reach the active configuration through [`RunContext`](crate::RunContext) or, without
//! threading it through, via [`get`], which reads the configuration installed on the current
//! thread by [`scope`]. The executor installs it on every thread it runs steps on.
//!
//! # Invariants
//!
//! - Every stored value matches its definition's type.
//! - Reading an unset property yields the definition's default.

mod builtins;
mod property;
mod scope;
#[cfg(test)]
mod tests;

use rustc_hash::FxHashMap;
use tracing::debug;

pub use builtins::{RUNNER, RUNNER_DEF, RUNNER_THREADS, RUNNER_THREADS_DEF, RunnerMode};
pub use property::{
	FromPropertyValue, Property, PropertyDef, PropertyDefault, PropertyType, PropertyValue,
};
pub use scope::{current, get, scope};

use crate::error::ConfigError;

/// Frozen property values.
#[derive(Debug, Clone)]
pub struct Config {
	defs: FxHashMap<&'static str, &'static PropertyDef>,
	values: FxHashMap<&'static str, PropertyValue>,
}

impl Default for Config {
	fn default() -> Self {
		ConfigBuilder::new().build()
	}
}

impl Config {
	pub fn builder() -> ConfigBuilder {
		ConfigBuilder::new()
	}

	/// Reads `property`, falling back to its default when unset.
	pub fn get<T: FromPropertyValue>(&self, property: &Property<T>) -> T {
		self.values
			.get(property.name())
			.and_then(T::from_value)
			.unwrap_or_else(|| property.default_value())
	}

	/// Reads a property by name.
	pub fn value(&self, name: &str) -> Result<PropertyValue, ConfigError> {
		let def = lookup(&self.defs, name)?;
		Ok(self
			.values
			.get(def.name)
			.cloned()
			.unwrap_or_else(|| def.default.to_value()))
	}

	/// Registered definitions, sorted by name.
	pub fn defs(&self) -> Vec<&'static PropertyDef> {
		let mut defs: Vec<_> = self.defs.values().copied().collect();
		defs.sort_by_key(|def| def.name);
		defs
	}
}

/// Mutable counterpart of [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	defs: FxHashMap<&'static str, &'static PropertyDef>,
	values: FxHashMap<&'static str, PropertyValue>,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Creates a builder with the scheduler's own properties registered.
	pub fn new() -> Self {
		let mut defs = FxHashMap::default();
		for def in builtins::BUILTINS {
			defs.insert(def.name, def);
		}
		Self {
			defs,
			values: FxHashMap::default(),
		}
	}

	pub fn register(&mut self, def: &'static PropertyDef) -> Result<(), ConfigError> {
		if self.defs.contains_key(def.name) {
			return Err(ConfigError::Duplicate(def.name.to_string()));
		}
		def.default
			.to_value()
			.check(def.ty)
			.map_err(|reason| ConfigError::InvalidValue {
				property: def.name.to_string(),
				reason,
			})?;
		self.defs.insert(def.name, def);
		Ok(())
	}

	pub fn set(&mut self, name: &str, value: PropertyValue) -> Result<(), ConfigError> {
		let def = lookup(&self.defs, name)?;
		if let Err(reason) = value.check(def.ty) {
			return Err(match def.ty {
				PropertyType::Enum(_) if value.as_str().is_some() => ConfigError::InvalidValue {
					property: def.name.to_string(),
					reason,
				},
				_ => ConfigError::TypeMismatch {
					property: def.name.to_string(),
					expected: def.ty,
					got: value.type_name(),
				},
			});
		}
		debug!(property = def.name, ?value, "property set");
		self.values.insert(def.name, value);
		Ok(())
	}

	/// Sets a property from its textual form, parsed according to its type.
	pub fn set_str(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
		let def = lookup(&self.defs, name)?;
		let parsed =
			PropertyValue::parse(value, def.ty).map_err(|reason| ConfigError::InvalidValue {
				property: def.name.to_string(),
				reason,
			})?;
		self.set(def.name, parsed)
	}

	/// Loads values from a TOML document. Nested tables form dotted names, so
	/// `[sched] runner = "parallel"` sets `sched.runner`.
	pub fn load_toml(&mut self, source: &str) -> Result<(), ConfigError> {
		let table: toml::Table =
			toml::from_str(source).map_err(|e| ConfigError::Toml(e.to_string()))?;
		self.load_table(None, &table)
	}

	fn load_table(&mut self, prefix: Option<&str>, table: &toml::Table) -> Result<(), ConfigError> {
		for (key, value) in table {
			let name = match prefix {
				Some(prefix) => format!("{prefix}.{key}"),
				None => key.clone(),
			};
			let value = match value {
				toml::Value::Table(nested) => {
					self.load_table(Some(&name), nested)?;
					continue;
				}
				toml::Value::Boolean(v) => PropertyValue::Bool(*v),
				toml::Value::Integer(v) => PropertyValue::Int(*v),
				toml::Value::String(v) => PropertyValue::String(v.clone()),
				other => {
					let def = lookup(&self.defs, &name)?;
					return Err(ConfigError::TypeMismatch {
						property: def.name.to_string(),
						expected: def.ty,
						got: other.type_str(),
					});
				}
			};
			self.set(&name, value)?;
		}
		Ok(())
	}

	pub fn build(self) -> Config {
		Config {
			defs: self.defs,
			values: self.values,
		}
	}
}

fn lookup(
	defs: &FxHashMap<&'static str, &'static PropertyDef>,
	name: &str,
) -> Result<&'static PropertyDef, ConfigError> {
	defs.get(name)
		.copied()
		.ok_or_else(|| ConfigError::UnknownProperty {
			name: name.to_string(),
			suggestion: suggest(defs, name),
		})
}

/// Suggests a registered property name close to `name`.
fn suggest(defs: &FxHashMap<&'static str, &'static PropertyDef>, name: &str) -> Option<String> {
	defs.keys()
		.map(|candidate| (strsim::levenshtein(name, candidate), *candidate))
		.filter(|(distance, _)| *distance <= 3)
		.min()
		.map(|(_, candidate)| candidate.to_string())
}
