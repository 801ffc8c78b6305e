//! Request solving.
//!
//! # Role
//!
//! Turns a [`Request`] into a [`Plan`] in three passes:
//!
//! 1. [`select`] decides which pool members take part: every supported mandatory member, one
//!    producer per requested production, and on-demand helpers pulled in to supply missing
//!    needs or clear excluded items. Among producers and helpers, the preferred one whose
//!    needs can be supplied wins.
//! 2. [`paths`] finds, for each component, the adapter chain leading to it from the root.
//! 3. [`order`] places the members one at a time, always picking the best eligible candidate,
//!    opening and closing sub-plans along the way.
//!
//! # Invariants
//!
//! - The result is a function of the request alone; pool order breaks the last ties.
//! - Failure is total: either every selected member is placed and the targets hold, or the
//!   request fails with the reason.

mod order;
mod paths;
mod select;

use std::sync::Arc;

use sched_items::{ItemKind, ItemSet};
use tracing::info;

use crate::error::PlanError;
use crate::plan::Plan;
use crate::request::Request;
use crate::schedulable::{Contract, Schedulable};

/// A pool member taking part in the plan.
#[derive(Debug, Clone)]
pub(crate) struct Member {
	/// Position in the request pool.
	pub decl: usize,
	pub schedulable: Arc<Schedulable>,
	/// Contract with the request's features applied.
	pub contract: Contract,
}

impl Member {
	fn new(decl: usize, schedulable: &Arc<Schedulable>, features: &ItemSet) -> Self {
		Self {
			decl,
			contract: schedulable.effective_contract(features),
			schedulable: Arc::clone(schedulable),
		}
	}

	/// Static preference: higher priority, then earlier declaration.
	fn preference(&self) -> (core::cmp::Reverse<i16>, usize) {
		(core::cmp::Reverse(self.schedulable.priority()), self.decl)
	}

	fn name(&self) -> &str {
		self.schedulable.name()
	}
}

pub(crate) fn solve(request: &Request, root: &str) -> Result<Plan, PlanError> {
	let root = request
		.catalog()
		.data()
		.lookup_kind(root, ItemKind::Component)?;
	check_barriers(request)?;

	let members = select::select(request)?;
	let graph = paths::AdapterGraph::new(request, root);
	let plan = order::order(request, root, members, &graph)?;

	info!(
		root = plan.component_name(),
		steps = plan.len(),
		exit = %plan.exit(),
		"plan built"
	);
	Ok(plan)
}

/// Every family a barrier names must be declared by some pool member.
fn check_barriers(request: &Request) -> Result<(), PlanError> {
	for barrier in request.barriers() {
		for family in barrier
			.before_families()
			.iter()
			.chain(barrier.after_families())
		{
			let declared = request
				.pool()
				.iter()
				.any(|s| s.family() == Some(family.as_str()));
			if !declared {
				return Err(PlanError::UnknownBarrierFamily {
					barrier: barrier.name().to_string(),
					family: family.clone(),
				});
			}
		}
	}
	Ok(())
}
