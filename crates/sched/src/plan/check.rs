use rustc_hash::FxHashSet;
use sched_items::ItemSet;

use super::{Plan, PlanStep};
use crate::error::PlanError;
use crate::request::Request;
use crate::schedulable::{Contract, Schedulable, owned_names};

struct Walk<'a> {
	request: &'a Request,
	state: ItemSet,
	produced: ItemSet,
	seen: FxHashSet<&'a str>,
}

impl Plan {
	/// Validates this plan against `request` without solving it again.
	///
	/// Contracts are re-derived from the request's features, so a plan built under one feature
	/// set can be checked against another.
	pub fn check(&self, request: &Request) -> Result<(), PlanError> {
		let mut walk = Walk {
			request,
			state: request.initial().clone(),
			produced: request.catalog().production_set(),
			seen: FxHashSet::default(),
		};
		walk.steps(self)?;

		let missing = request.include().difference(&walk.state);
		if !missing.is_empty() {
			return Err(PlanError::TargetUnreachable {
				missing: owned_names(&missing),
			});
		}
		let present = request.exclude().intersection(&walk.state);
		if !present.is_empty() {
			return Err(PlanError::TargetExcluded {
				present: owned_names(&present),
			});
		}
		if let Some(production) = request.productions().difference(&walk.produced).iter().next() {
			return Err(PlanError::ProductionMissing(
				request.catalog().productions().name(production).to_string(),
			));
		}
		Ok(())
	}
}

impl<'a> Walk<'a> {
	fn steps(&mut self, plan: &'a Plan) -> Result<(), PlanError> {
		for step in &plan.steps {
			match step {
				PlanStep::Run(step) => {
					let schedulable = step.schedulable();
					if !self.seen.insert(schedulable.name()) {
						return Err(PlanError::DuplicateStep(schedulable.name().to_string()));
					}
					let contract = self.admit(schedulable)?;
					contract.apply(&mut self.state);
					if let Some(production) = schedulable.production() {
						self.produced.add(production);
					}
				}
				PlanStep::Adapt(sub) => {
					self.admit(sub.adapter.schedulable())?;
					self.steps(&sub.plan)?;
				}
				PlanStep::Barrier(_) => {}
			}
		}
		Ok(())
	}

	fn admit(&self, schedulable: &Schedulable) -> Result<Contract, PlanError> {
		let features = self.request.features();
		if !schedulable.is_supported(features) {
			return Err(PlanError::Unsupported(schedulable.name().to_string()));
		}
		let contract = schedulable.effective_contract(features);
		if !contract.admits(&self.state) {
			return Err(PlanError::PreconditionUnmet {
				schedulable: schedulable.name().to_string(),
				missing: owned_names(&contract.missing(&self.state)),
				forbidden: owned_names(&contract.forbidden(&self.state)),
			});
		}
		Ok(contract)
	}
}
