//! Solved plans.
//!
//! # Role
//!
//! A [`Plan`] is the immutable output of the solver: an ordered list of [`PlanStep`]s for one
//! component, where an [`PlanStep::Adapt`] step nests a [`SubPlan`] run once per unit the
//! adapter yields. [`PlanBuilder`] is the mutable counterpart the solver appends to.
//!
//! Each plan records the planned state on entry and exit. The executor uses the difference to
//! hand a sub-plan's net effect back to the parent unit once every child has finished.
//!
//! # Invariants
//!
//! - `exit` is `entry` with every step's effects applied in order, removals first.
//! - A sub-plan's `entry` is the parent's state at the adapt step.

mod builder;
mod check;
mod display;
#[cfg(test)]
mod tests;

use std::sync::Arc;

pub use builder::PlanBuilder;
use sched_items::{ItemId, ItemSet};

use crate::schedulable::{Contract, Schedulable};

/// One schedulable placed in a plan, with the contract in force for the request.
#[derive(Debug, Clone)]
pub struct ScheduledStep {
	schedulable: Arc<Schedulable>,
	contract: Contract,
}

impl ScheduledStep {
	pub fn new(schedulable: Arc<Schedulable>, contract: Contract) -> Self {
		Self {
			schedulable,
			contract,
		}
	}

	pub fn schedulable(&self) -> &Arc<Schedulable> {
		&self.schedulable
	}

	/// Effective contract: base plus the conditionals enabled by the request.
	pub fn contract(&self) -> &Contract {
		&self.contract
	}
}

/// A nested plan bound to the adapter that produces its units.
#[derive(Debug, Clone)]
pub struct SubPlan {
	adapter: ScheduledStep,
	plan: Plan,
	exclusive: bool,
}

impl SubPlan {
	pub fn adapter(&self) -> &ScheduledStep {
		&self.adapter
	}

	pub fn plan(&self) -> &Plan {
		&self.plan
	}

	/// Children must be processed one at a time: some step rewrites the parent component.
	pub fn is_exclusive(&self) -> bool {
		self.exclusive
	}
}

#[derive(Debug, Clone)]
pub enum PlanStep {
	Run(ScheduledStep),
	Adapt(SubPlan),
	/// Marks where a barrier was crossed.
	Barrier(String),
}

/// An ordered, immutable schedule for one component.
#[derive(Debug, Clone)]
pub struct Plan {
	component: ItemId,
	steps: Vec<PlanStep>,
	entry: ItemSet,
	exit: ItemSet,
}

impl Plan {
	pub fn component(&self) -> ItemId {
		self.component
	}

	pub fn component_name(&self) -> &str {
		self.entry.registry().name(self.component)
	}

	pub fn steps(&self) -> &[PlanStep] {
		&self.steps
	}

	/// Planned state when the plan starts.
	pub fn entry(&self) -> &ItemSet {
		&self.entry
	}

	/// Planned state once every step has run.
	pub fn exit(&self) -> &ItemSet {
		&self.exit
	}

	/// Number of scheduled runs, sub-plans included, adapters excluded.
	pub fn len(&self) -> usize {
		self.steps
			.iter()
			.map(|step| match step {
				PlanStep::Run(_) => 1,
				PlanStep::Adapt(sub) => sub.plan.len(),
				PlanStep::Barrier(_) => 0,
			})
			.sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Names of scheduled runs in execution order, flattening sub-plans.
	pub fn schedulable_names(&self) -> Vec<&str> {
		let mut names = Vec::new();
		self.collect_names(&mut names);
		names
	}

	fn collect_names<'a>(&'a self, names: &mut Vec<&'a str>) {
		for step in &self.steps {
			match step {
				PlanStep::Run(step) => names.push(step.schedulable.name()),
				PlanStep::Adapt(sub) => sub.plan.collect_names(names),
				PlanStep::Barrier(_) => {}
			}
		}
	}
}
