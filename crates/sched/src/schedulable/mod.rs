//! Schedulable descriptors.
//!
//! # Role
//!
//! A [`Schedulable`] is the resolved, immutable description of one pass: the component it runs
//! on, its [`Contract`] (need, no, add, remove, modify), feature-conditioned extra constraints,
//! the features it requires, the production it satisfies and how it is selected. It also owns
//! the type-erased runner the executor calls.
//!
//! Descriptors are declared with [`SchedulableBuilder`] against a frozen
//! [`Catalog`](sched_items::Catalog); every malformed declaration is reported there as a
//! [`SchedulableError`](crate::SchedulableError), never later.
//!
//! # Invariants
//!
//! - `add` and `remove` are disjoint, also once conditionals apply, and never name components.
//! - `need` and `no` of the base contract are disjoint.
//! - Adapters carry no effects and no production and never adapt a component to itself.

mod builder;
mod registry;
mod runner;
#[cfg(test)]
mod tests;

pub use builder::{ConditionalDef, SchedulableBuilder};
pub use registry::SchedulableRegistry;
pub(crate) use runner::Runner;
pub use runner::{AdapterSchedulable, RunContext, RunnableSchedulable};
use sched_items::{ItemId, ItemSet};

/// Names of the primitive items in `set`, owned for error reports.
pub(crate) fn owned_names(set: &ItemSet) -> Vec<String> {
	set.names().into_iter().map(str::to_string).collect()
}

/// Structural classification of a schedulable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulableKind {
	/// Transforms units of its component.
	Runnable,
	/// Maps one unit of its component to a sequence of units of `to`.
	Adapter { to: ItemId },
	/// Moves tags without touching data.
	Separator,
}

/// Declared constraints and effects, all over the data registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
	pub need: ItemSet,
	pub no: ItemSet,
	pub add: ItemSet,
	pub remove: ItemSet,
	/// Components whose structure the pass rewrites.
	pub modify: ItemSet,
}

impl Contract {
	/// Returns true if `state` holds every needed item and no forbidden one.
	pub fn admits(&self, state: &ItemSet) -> bool {
		state.contains_all(&self.need) && state.contains_none(&self.no)
	}

	/// Needed items absent from `state`.
	pub fn missing(&self, state: &ItemSet) -> ItemSet {
		self.need.difference(state)
	}

	/// Forbidden items present in `state`.
	pub fn forbidden(&self, state: &ItemSet) -> ItemSet {
		self.no.intersection(state)
	}

	/// Applies the effects to `state`, removals first.
	pub fn apply(&self, state: &mut ItemSet) {
		state.remove_all(&self.remove);
		state.add_all(&self.add);
	}

	pub fn has_effects(&self) -> bool {
		!self.add.is_empty() || !self.remove.is_empty()
	}
}

/// Extra constraints and effects that apply only while `feature` is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
	pub feature: ItemId,
	pub need: ItemSet,
	pub no: ItemSet,
	pub add: ItemSet,
	pub remove: ItemSet,
}

/// A resolved pass descriptor.
pub struct Schedulable {
	name: String,
	description: String,
	priority: i16,
	component: ItemId,
	kind: SchedulableKind,
	contract: Contract,
	conditionals: Vec<Conditional>,
	support: ItemSet,
	production: Option<ItemId>,
	family: Option<String>,
	on_demand: bool,
	runner: Runner,
}

impl Schedulable {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	/// Tie-break weight; higher is placed first.
	pub fn priority(&self) -> i16 {
		self.priority
	}

	pub fn component(&self) -> ItemId {
		self.component
	}

	pub fn component_name(&self) -> &str {
		self.contract.need.registry().name(self.component)
	}

	pub fn kind(&self) -> SchedulableKind {
		self.kind
	}

	pub fn is_adapter(&self) -> bool {
		matches!(self.kind, SchedulableKind::Adapter { .. })
	}

	/// Target component of an adapter.
	pub fn adapts_to(&self) -> Option<ItemId> {
		match self.kind {
			SchedulableKind::Adapter { to } => Some(to),
			_ => None,
		}
	}

	/// The base contract, without conditionals.
	pub fn contract(&self) -> &Contract {
		&self.contract
	}

	pub fn conditionals(&self) -> &[Conditional] {
		&self.conditionals
	}

	/// Features that must all be enabled for the schedulable to be eligible at all.
	pub fn support(&self) -> &ItemSet {
		&self.support
	}

	pub fn production(&self) -> Option<ItemId> {
		self.production
	}

	pub fn family(&self) -> Option<&str> {
		self.family.as_deref()
	}

	pub fn is_on_demand(&self) -> bool {
		self.on_demand
	}

	/// Mandatory members run whenever they are supported.
	pub fn is_mandatory(&self) -> bool {
		!self.on_demand && self.production.is_none() && !self.is_adapter()
	}

	pub fn is_supported(&self, features: &ItemSet) -> bool {
		features.contains_all(&self.support)
	}

	/// The contract with every conditional whose feature is in `features` folded in.
	pub fn effective_contract(&self, features: &ItemSet) -> Contract {
		let mut contract = self.contract.clone();
		for conditional in &self.conditionals {
			if features.contains(conditional.feature) {
				contract.need.add_all(&conditional.need);
				contract.no.add_all(&conditional.no);
				contract.add.add_all(&conditional.add);
				contract.remove.add_all(&conditional.remove);
			}
		}
		contract
	}

	pub(crate) fn runner(&self) -> &Runner {
		&self.runner
	}
}

impl core::fmt::Debug for Schedulable {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Schedulable")
			.field("name", &self.name)
			.field("component", &self.component_name())
			.field("kind", &self.kind)
			.field("contract", &self.contract)
			.field("production", &self.production)
			.field("family", &self.family)
			.field("on_demand", &self.on_demand)
			.finish_non_exhaustive()
	}
}

impl Schedulable {
	/// Starts a runnable pass over units of `C`.
	pub fn runnable<C, F>(name: impl Into<String>, runner: F) -> SchedulableBuilder
	where
		C: crate::Component,
		F: Fn(&mut C, &RunContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
	{
		Self::from_runner::<C, F>(name, runner)
	}

	/// Starts a runnable pass backed by a [`RunnableSchedulable`] implementation.
	pub fn from_runner<C, R>(name: impl Into<String>, runner: R) -> SchedulableBuilder
	where
		C: crate::Component,
		R: RunnableSchedulable<C>,
	{
		SchedulableBuilder::new(
			name.into(),
			C::NAME.to_string(),
			builder::PendingKind::Runnable,
			Runner::Run(Box::new(runner::RunEntry::<C, R> {
				runner,
				_marker: std::marker::PhantomData,
			})),
		)
	}

	/// Starts an adapter expanding units of `S` into units of `D`.
	pub fn adapter<S, D, F>(name: impl Into<String>, adapter: F) -> SchedulableBuilder
	where
		S: crate::Component,
		D: crate::Component,
		F: for<'a> Fn(&'a mut S, &RunContext<'_>) -> anyhow::Result<Vec<&'a mut D>>
			+ Send
			+ Sync
			+ 'static,
	{
		Self::from_adapter::<S, D, F>(name, adapter)
	}

	/// Starts an adapter backed by an [`AdapterSchedulable`] implementation.
	pub fn from_adapter<S, D, A>(name: impl Into<String>, adapter: A) -> SchedulableBuilder
	where
		S: crate::Component,
		D: crate::Component,
		A: AdapterSchedulable<S, D>,
	{
		SchedulableBuilder::new(
			name.into(),
			S::NAME.to_string(),
			builder::PendingKind::Adapter { to: D::NAME },
			Runner::Adapt(Box::new(runner::AdaptEntry::<S, D, A> {
				adapter,
				_marker: std::marker::PhantomData,
			})),
		)
	}

	/// Starts a separator on the named component: a step that only moves tags.
	pub fn separator(name: impl Into<String>, component: impl Into<String>) -> SchedulableBuilder {
		SchedulableBuilder::new(
			name.into(),
			component.into(),
			builder::PendingKind::Separator,
			Runner::None,
		)
	}
}
