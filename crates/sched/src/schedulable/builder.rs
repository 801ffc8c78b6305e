use std::sync::Arc;

use sched_items::{Catalog, ItemKind, ItemRegistry, ItemSet};
use tracing::debug;

use super::{Conditional, Contract, Runner, Schedulable, SchedulableKind, owned_names};
use crate::error::SchedulableError;

pub(crate) enum PendingKind {
	Runnable,
	Adapter { to: &'static str },
	Separator,
}

fn to_names<I, S>(names: I) -> impl Iterator<Item = String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	names.into_iter().map(|name| name.as_ref().to_string())
}

/// Unresolved feature-conditioned constraints, see [`SchedulableBuilder::optional`].
#[derive(Debug, Clone, Default)]
pub struct ConditionalDef {
	feature: String,
	need: Vec<String>,
	no: Vec<String>,
	add: Vec<String>,
	remove: Vec<String>,
}

impl ConditionalDef {
	pub fn when(feature: impl Into<String>) -> Self {
		Self {
			feature: feature.into(),
			..Self::default()
		}
	}

	pub fn need<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, names: I) -> Self {
		self.need.extend(to_names(names));
		self
	}

	pub fn no<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, names: I) -> Self {
		self.no.extend(to_names(names));
		self
	}

	pub fn add<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, names: I) -> Self {
		self.add.extend(to_names(names));
		self
	}

	pub fn remove<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, names: I) -> Self {
		self.remove.extend(to_names(names));
		self
	}
}

/// Declares a schedulable by item name; resolved and validated by [`SchedulableBuilder::build`].
pub struct SchedulableBuilder {
	name: String,
	description: String,
	priority: i16,
	component: String,
	kind: PendingKind,
	need: Vec<String>,
	no: Vec<String>,
	add: Vec<String>,
	remove: Vec<String>,
	modify: Vec<String>,
	conditionals: Vec<ConditionalDef>,
	support: Vec<String>,
	production: Option<String>,
	family: Option<String>,
	on_demand: bool,
	runner: Runner,
}

impl SchedulableBuilder {
	pub(crate) fn new(name: String, component: String, kind: PendingKind, runner: Runner) -> Self {
		Self {
			name,
			description: String::new(),
			priority: 0,
			component,
			kind,
			need: Vec::new(),
			no: Vec::new(),
			add: Vec::new(),
			remove: Vec::new(),
			modify: Vec::new(),
			conditionals: Vec::new(),
			support: Vec::new(),
			production: None,
			family: None,
			on_demand: false,
			runner,
		}
	}

	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();
		self
	}

	pub fn priority(mut self, priority: i16) -> Self {
		self.priority = priority;
		self
	}

	pub fn need<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, names: I) -> Self {
		self.need.extend(to_names(names));
		self
	}

	pub fn no<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, names: I) -> Self {
		self.no.extend(to_names(names));
		self
	}

	pub fn add<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, names: I) -> Self {
		self.add.extend(to_names(names));
		self
	}

	pub fn remove<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, names: I) -> Self {
		self.remove.extend(to_names(names));
		self
	}

	/// Components whose structure this pass rewrites.
	pub fn modify<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, names: I) -> Self {
		self.modify.extend(to_names(names));
		self
	}

	pub fn optional(mut self, conditional: ConditionalDef) -> Self {
		self.conditionals.push(conditional);
		self
	}

	/// Features that must all be enabled for the pass to be considered.
	pub fn support<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, names: I) -> Self {
		self.support.extend(to_names(names));
		self
	}

	pub fn produce(mut self, production: impl Into<String>) -> Self {
		self.production = Some(production.into());
		self
	}

	/// Family label barriers refer to.
	pub fn family(mut self, family: impl Into<String>) -> Self {
		self.family = Some(family.into());
		self
	}

	/// Only scheduled when something selected needs what it adds or removes.
	pub fn on_demand(mut self) -> Self {
		self.on_demand = true;
		self
	}

	pub fn build(self, catalog: &Catalog) -> Result<Arc<Schedulable>, SchedulableError> {
		let resolver = Resolver {
			schedulable: &self.name,
			catalog,
		};
		let data = catalog.data();

		let component = resolver.component(&self.component)?;
		let kind = match self.kind {
			PendingKind::Runnable => SchedulableKind::Runnable,
			PendingKind::Separator => SchedulableKind::Separator,
			PendingKind::Adapter { to } => {
				let to_id = resolver.component(to)?;
				if to_id == component {
					return Err(SchedulableError::SelfAdapter {
						schedulable: self.name.clone(),
						component: self.component.clone(),
					});
				}
				SchedulableKind::Adapter { to: to_id }
			}
		};

		let contract = Contract {
			need: resolver.set(data, &self.need)?,
			no: resolver.set(data, &self.no)?,
			add: resolver.effects(&self.add, true)?,
			remove: resolver.effects(&self.remove, false)?,
			modify: resolver.components(&self.modify)?,
		};
		resolver.disjoint_effects(&contract.add, &contract.remove)?;
		let contradiction = contract.need.intersection(&contract.no);
		if !contradiction.is_empty() {
			return Err(SchedulableError::NeedNoOverlap {
				schedulable: self.name.clone(),
				items: owned_names(&contradiction),
			});
		}
		resolver.markers_valid_on(&contract.add, component)?;

		let mut conditionals = Vec::with_capacity(self.conditionals.len());
		for def in &self.conditionals {
			let conditional = Conditional {
				feature: catalog
					.features()
					.lookup(&def.feature)
					.map_err(|source| resolver.item_error(source))?,
				need: resolver.set(data, &def.need)?,
				no: resolver.set(data, &def.no)?,
				add: resolver.effects(&def.add, true)?,
				remove: resolver.effects(&def.remove, false)?,
			};
			resolver.disjoint_effects(
				&contract.add.union(&conditional.add),
				&contract.remove.union(&conditional.remove),
			)?;
			resolver.markers_valid_on(&conditional.add, component)?;
			conditionals.push(conditional);
		}

		let support = resolver.set(catalog.features(), &self.support)?;
		let production = self
			.production
			.as_deref()
			.map(|name| catalog.productions().lookup(name))
			.transpose()
			.map_err(|source| resolver.item_error(source))?;

		if matches!(kind, SchedulableKind::Adapter { .. })
			&& (contract.has_effects()
				|| !contract.modify.is_empty()
				|| production.is_some()
				|| conditionals
					.iter()
					.any(|c| !c.add.is_empty() || !c.remove.is_empty()))
		{
			return Err(SchedulableError::AdapterEffects {
				schedulable: self.name.clone(),
			});
		}

		debug!(
			schedulable = %self.name,
			component = %self.component,
			need = %contract.need,
			add = %contract.add,
			remove = %contract.remove,
			"schedulable built"
		);

		Ok(Arc::new(Schedulable {
			name: self.name,
			description: self.description,
			priority: self.priority,
			component,
			kind,
			contract,
			conditionals,
			support,
			production,
			family: self.family,
			on_demand: self.on_demand,
			runner: self.runner,
		}))
	}
}

struct Resolver<'a> {
	schedulable: &'a str,
	catalog: &'a Catalog,
}

impl Resolver<'_> {
	fn item_error(&self, source: sched_items::ItemError) -> SchedulableError {
		SchedulableError::Item {
			schedulable: self.schedulable.to_string(),
			source,
		}
	}

	fn component(&self, name: &str) -> Result<sched_items::ItemId, SchedulableError> {
		self.catalog
			.data()
			.lookup_kind(name, ItemKind::Component)
			.map_err(|source| self.item_error(source))
	}

	fn set(&self, registry: &Arc<ItemRegistry>, names: &[String]) -> Result<ItemSet, SchedulableError> {
		registry.set_of(names).map_err(|source| self.item_error(source))
	}

	fn components(&self, names: &[String]) -> Result<ItemSet, SchedulableError> {
		let mut set = self.catalog.data_set();
		for name in names {
			set.add(self.component(name)?);
		}
		Ok(set)
	}

	/// Resolves add/remove names, rejecting components and, for additions, empty items.
	fn effects(&self, names: &[String], adding: bool) -> Result<ItemSet, SchedulableError> {
		let data = self.catalog.data();
		let mut set = self.catalog.data_set();
		for name in names {
			let id = data.lookup(name).map_err(|source| self.item_error(source))?;
			let item = data.managed(id);
			if adding && item.cardinality() == 0 {
				return Err(SchedulableError::EmptyEffect {
					schedulable: self.schedulable.to_string(),
					item: name.clone(),
				});
			}
			set.add(id);
		}
		if let Some(component) = set
			.iter()
			.find(|&id| data.managed(id).kind() == ItemKind::Component)
		{
			return Err(SchedulableError::ComponentEffect {
				schedulable: self.schedulable.to_string(),
				item: data.name(component).to_string(),
			});
		}
		Ok(set)
	}

	fn disjoint_effects(&self, add: &ItemSet, remove: &ItemSet) -> Result<(), SchedulableError> {
		let overlap = add.intersection(remove);
		if overlap.is_empty() {
			return Ok(());
		}
		Err(SchedulableError::AddRemoveOverlap {
			schedulable: self.schedulable.to_string(),
			items: owned_names(&overlap),
		})
	}

	fn markers_valid_on(
		&self,
		add: &ItemSet,
		component: sched_items::ItemId,
	) -> Result<(), SchedulableError> {
		let data = self.catalog.data();
		for id in add {
			let item = data.managed(id);
			if item.kind() == ItemKind::Marker
				&& !item.valid_on().is_empty()
				&& !item.valid_on().contains(&component)
			{
				return Err(SchedulableError::MarkerNotValidOn {
					schedulable: self.schedulable.to_string(),
					marker: item.name().to_string(),
					component: data.name(component).to_string(),
				});
			}
		}
		Ok(())
	}
}
