//! Plan execution.
//!
//! # Role
//!
//! [`ScheduleInstance`] walks a [`Plan`] over a root unit. Before each step it checks the unit's
//! live tags against the step's contract; after the step it applies the declared removals
//! (dropping marker payloads) and additions. An adapt step expands the unit into children,
//! each of which first inherits the parent's tags, runs the sub-plan, and when all are done the
//! parent receives the sub-plan's net effect.
//!
//! Siblings run on `rayon` when `sched.runner` is `parallel`, unless the sub-plan is exclusive.
//! The configuration is installed on every thread a step runs on.
//!
//! # Invariants
//!
//! - Steps of one unit run in plan order, each at most once.
//! - Every marker a step declares as added carries a payload once the step returns.
//! - Errors are reported with the schedulable and component names and never retried.


use std::sync::Arc;

use rayon::prelude::*;
use sched_items::{ItemKind, ItemSet};
use tracing::{debug, debug_span, trace};

use crate::component::{Component, DynComponent};
use crate::config::{self, Config, RUNNER, RUNNER_THREADS, RunnerMode};
use crate::error::ProcessError;
use crate::plan::{Plan, PlanStep, ScheduledStep, SubPlan};
use crate::schedulable::{Contract, RunContext, Runner, owned_names};

impl Plan {
	/// Prepares this plan for execution under `config`.
	pub fn schedule_instance(&self, config: Arc<Config>) -> Result<ScheduleInstance<'_>, ProcessError> {
		let mode = config.get(&RUNNER);
		let threads = config.get(&RUNNER_THREADS);
		let pool = match (mode, threads) {
			(RunnerMode::Parallel, n) if n > 0 => Some(
				rayon::ThreadPoolBuilder::new()
					.num_threads(n as usize)
					.thread_name(|i| format!("sched-worker-{i}"))
					.build()
					.map_err(|e| ProcessError::ThreadPool(e.to_string()))?,
			),
			_ => None,
		};
		Ok(ScheduleInstance {
			plan: self,
			config,
			mode,
			pool,
		})
	}
}

/// A plan bound to a configuration, ready to process root units.
pub struct ScheduleInstance<'p> {
	plan: &'p Plan,
	config: Arc<Config>,
	mode: RunnerMode,
	pool: Option<rayon::ThreadPool>,
}

impl ScheduleInstance<'_> {
	pub fn mode(&self) -> RunnerMode {
		self.mode
	}

	/// Runs the plan over `root`, seeding it with the plan's entry tags.
	pub fn process<C: Component>(&self, root: &mut C) -> Result<(), ProcessError> {
		let expected = self.plan.component_name();
		if C::NAME != expected {
			return Err(ProcessError::ComponentMismatch {
				expected: expected.to_string(),
				actual: C::NAME.to_string(),
			});
		}
		Component::markings_mut(root)
			.tags_mut()
			.add_all(self.plan.entry());

		let mut run = || config::scope(&self.config, || self.run_plan(self.plan, root));
		match &self.pool {
			Some(pool) => pool.install(run),
			None => run(),
		}
	}

	fn run_plan(&self, plan: &Plan, unit: &mut dyn DynComponent) -> Result<(), ProcessError> {
		for step in plan.steps() {
			match step {
				PlanStep::Run(step) => self.run_step(step, unit)?,
				PlanStep::Adapt(sub) => self.run_sub_plan(sub, unit)?,
				PlanStep::Barrier(name) => trace!(barrier = %name, "barrier"),
			}
		}
		Ok(())
	}

	fn run_step(&self, step: &ScheduledStep, unit: &mut dyn DynComponent) -> Result<(), ProcessError> {
		let schedulable = step.schedulable();
		let contract = step.contract();
		check_preconditions(schedulable.name(), contract, unit)?;

		let span = debug_span!(
			"step",
			schedulable = schedulable.name(),
			component = unit.component_name()
		);
		let _enter = span.enter();
		if let Runner::Run(runner) = schedulable.runner() {
			let ctx = RunContext::new(schedulable, &self.config);
			runner
				.run(unit, &ctx)
				.map_err(|source| ProcessError::Run {
					schedulable: schedulable.name().to_string(),
					component: unit.component_name().to_string(),
					source,
				})?;
		}

		let markings = unit.markings();
		let registry = contract.add.registry();
		if let Some(marker) = contract.add.iter().find(|&id| {
			registry.managed(id).kind() == ItemKind::Marker && !markings.has_payload(id)
		}) {
			return Err(ProcessError::MarkerNotAttached {
				schedulable: schedulable.name().to_string(),
				marker: registry.name(marker).to_string(),
				component: unit.component_name().to_string(),
			});
		}

		let markings = unit.markings_mut();
		markings.remove_all(&contract.remove);
		markings.tags_mut().add_all(&contract.add);
		Ok(())
	}

	fn run_sub_plan(&self, sub: &SubPlan, parent: &mut dyn DynComponent) -> Result<(), ProcessError> {
		let adapter = sub.adapter().schedulable();
		check_preconditions(adapter.name(), sub.adapter().contract(), parent)?;
		let Runner::Adapt(runner) = adapter.runner() else {
			return Err(ProcessError::Run {
				schedulable: adapter.name().to_string(),
				component: parent.component_name().to_string(),
				source: anyhow::anyhow!("`{}` has no adapter runner", adapter.name()),
			});
		};

		let snapshot = parent.markings().tags().clone();
		let component = parent.component_name();
		{
			let ctx = RunContext::new(adapter, &self.config);
			let mut children =
				runner
					.adapt(parent, &ctx)
					.map_err(|source| ProcessError::Run {
						schedulable: adapter.name().to_string(),
						component: component.to_string(),
						source,
					})?;
			let parallel = self.mode == RunnerMode::Parallel && !sub.is_exclusive();
			debug!(
				adapter = adapter.name(),
				children = children.len(),
				parallel,
				"entering sub-plan"
			);

			if parallel {
				children.par_iter_mut().try_for_each(|child| {
					config::scope(&self.config, || self.run_child(sub.plan(), &mut **child, &snapshot))
				})?;
			} else {
				for child in &mut children {
					self.run_child(sub.plan(), &mut **child, &snapshot)?;
				}
			}
		}

		let plan = sub.plan();
		let markings = parent.markings_mut();
		markings.remove_all(&plan.entry().difference(plan.exit()));
		markings.tags_mut().add_all(&plan.exit().difference(plan.entry()));
		Ok(())
	}

	fn run_child(
		&self,
		plan: &Plan,
		child: &mut dyn DynComponent,
		inherited: &ItemSet,
	) -> Result<(), ProcessError> {
		let markings = child.markings_mut();
		let stale = markings.tags().difference(inherited);
		markings.remove_all(&stale);
		markings.tags_mut().add_all(inherited);
		self.run_plan(plan, child)
	}
}

fn check_preconditions(
	schedulable: &str,
	contract: &Contract,
	unit: &dyn DynComponent,
) -> Result<(), ProcessError> {
	let tags = unit.markings().tags();
	if contract.admits(tags) {
		return Ok(());
	}
	Err(ProcessError::PreconditionViolated {
		schedulable: schedulable.to_string(),
		component: unit.component_name().to_string(),
		missing: owned_names(&contract.missing(tags)),
		forbidden: owned_names(&contract.forbidden(tags)),
	})
}
