//! Greedy placement of selected members.
//!
//! Each round assesses every pending member against the accumulated state and places the
//! best eligible one. A member is eligible when its needs hold, none of its forbidden items
//! is present, no barrier holds it back and every adapter it must open is admitted by the
//! state. Eligible members rank by:
//!
//! 1. safety: placing it must not remove an item another pending member needs, nor add one
//!    another pending member forbids;
//! 2. locality: fewest sub-plans to close, then fewest to open;
//! 3. priority, higher first;
//! 4. declaration order.

use std::cmp::Reverse;
use std::sync::Arc;

use sched_items::{ItemId, ItemSet};
use tracing::debug;

use super::Member;
use super::paths::AdapterGraph;
use crate::error::{Blocked, PlanError};
use crate::plan::{Plan, PlanBuilder, ScheduledStep};
use crate::request::Request;
use crate::schedulable::owned_names;

type Rank = (bool, usize, usize, Reverse<i16>, usize);

struct Placement {
	/// Open sub-plans left in place.
	keep: usize,
	/// Hops to open after closing down to `keep`.
	open: Vec<usize>,
	/// Barriers crossed for the first time.
	crossing: Vec<usize>,
	rank: Rank,
}

struct Orderer<'a> {
	request: &'a Request,
	graph: &'a AdapterGraph,
	pending: Vec<Member>,
	state: ItemSet,
	builder: PlanBuilder,
	crossed: Vec<bool>,
}

pub(crate) fn order(
	request: &Request,
	root: ItemId,
	members: Vec<Member>,
	graph: &AdapterGraph,
) -> Result<Plan, PlanError> {
	let data = request.catalog().data();
	for member in &members {
		if graph.path(member.schedulable.component()).is_none() {
			return Err(PlanError::NoAdapterPath {
				schedulable: member.name().to_string(),
				from: data.name(root).to_string(),
				to: member.schedulable.component_name().to_string(),
			});
		}
	}

	let state = request.initial().clone();
	let mut orderer = Orderer {
		request,
		graph,
		builder: PlanBuilder::new(root, &state),
		pending: members,
		state,
		crossed: vec![false; request.barriers().len()],
	};

	while !orderer.pending.is_empty() {
		let best = (0..orderer.pending.len())
			.filter_map(|index| orderer.assess(index).map(|p| (index, p)))
			.min_by_key(|(_, placement)| placement.rank);
		let Some((index, placement)) = best else {
			return Err(orderer.diagnose());
		};
		orderer.place(index, placement);
	}

	let Orderer { builder, state, .. } = orderer;
	let plan = builder.build(&state);

	let missing = request.include().difference(&state);
	if !missing.is_empty() {
		return Err(PlanError::TargetUnreachable {
			missing: owned_names(&missing),
		});
	}
	let present = request.exclude().intersection(&state);
	if !present.is_empty() {
		return Err(PlanError::TargetExcluded {
			present: owned_names(&present),
		});
	}
	Ok(plan)
}

impl Orderer<'_> {
	fn assess(&self, index: usize) -> Option<Placement> {
		let member = &self.pending[index];
		let family = member.schedulable.family();
		if self.held_back(index).next().is_some() || !member.contract.admits(&self.state) {
			return None;
		}

		let path = self.graph.path(member.schedulable.component())?;
		let mut keep = self.common_prefix(path);
		let mut crossing = Vec::new();
		for (b, barrier) in self.request.barriers().iter().enumerate() {
			if !barrier.holds_back(family) {
				continue;
			}
			if let Some(depth) = self
				.builder
				.shallowest_with_family(|f| barrier.goes_first(Some(f)))
			{
				keep = keep.min(depth - 1);
			}
			if !self.crossed[b] {
				crossing.push(b);
			}
		}

		let open = &path[keep..];
		if open
			.iter()
			.any(|&hop| !self.graph.hop(hop).contract.admits(&self.state))
		{
			return None;
		}

		let rank = (
			self.is_unsafe(index),
			self.builder.depth() - keep,
			open.len(),
			Reverse(member.schedulable.priority()),
			member.decl,
		);
		Some(Placement {
			keep,
			open: open.to_vec(),
			crossing,
			rank,
		})
	}

	fn place(&mut self, index: usize, placement: Placement) {
		let member = self.pending.remove(index);
		self.builder.close_to(placement.keep, &self.state);
		for b in placement.crossing {
			self.crossed[b] = true;
			let name = self.request.barriers()[b].name();
			debug!(barrier = name, at = member.name(), "barrier crossed");
			self.builder.push_barrier(name);
		}
		for hop in placement.open {
			let hop = self.graph.hop(hop);
			self.builder.open(
				ScheduledStep::new(Arc::clone(&hop.schedulable), hop.contract.clone()),
				&self.state,
			);
		}

		member.contract.apply(&mut self.state);
		debug!(
			schedulable = member.name(),
			component = member.schedulable.component_name(),
			depth = self.builder.depth(),
			unsafe_placement = placement.rank.0,
			state = %self.state,
			"placed step"
		);
		self.builder
			.push(ScheduledStep::new(member.schedulable, member.contract));
	}

	/// Barriers holding back the pending member at `index`.
	fn held_back(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
		let family = self.pending[index].schedulable.family();
		self.request
			.barriers()
			.iter()
			.filter(move |barrier| {
				barrier.holds_back(family)
					&& self
						.pending
						.iter()
						.enumerate()
						.any(|(j, other)| j != index && barrier.goes_first(other.schedulable.family()))
			})
			.map(|barrier| barrier.name())
	}

	/// Number of open sub-plans that already lie on `path`.
	fn common_prefix(&self, path: &[usize]) -> usize {
		self.builder
			.open_adapters()
			.zip(path)
			.take_while(|(open, hop)| {
				open.schedulable().name() == self.graph.hop(**hop).schedulable.name()
			})
			.count()
	}

	fn is_unsafe(&self, index: usize) -> bool {
		let contract = &self.pending[index].contract;
		let clears = contract.remove.intersection(&self.state);
		let introduces = contract.add.difference(&self.state);
		self.pending
			.iter()
			.enumerate()
			.filter(|(j, _)| *j != index)
			.any(|(_, other)| {
				other.contract.need.contains_one(&clears) || other.contract.no.contains_one(&introduces)
			})
	}

	fn diagnose(&self) -> PlanError {
		let mut supply = ItemSet::new(self.state.registry());
		for member in &self.pending {
			supply.add_all(&member.contract.add);
		}

		let mut unproducible = ItemSet::new(self.state.registry());
		let blocked = self
			.pending
			.iter()
			.enumerate()
			.map(|(index, member)| {
				let missing = member.contract.missing(&self.state);
				unproducible.add_all(&missing.difference(&supply));

				let mut waiting_on: Vec<String> = self
					.held_back(index)
					.map(|name| format!("barrier {name}"))
					.collect();
				if let Some(path) = self.graph.path(member.schedulable.component()) {
					let keep = self.common_prefix(path);
					waiting_on.extend(
						path[keep..]
							.iter()
							.map(|&hop| self.graph.hop(hop))
							.filter(|hop| !hop.contract.admits(&self.state))
							.map(|hop| format!("adapter {}", hop.name())),
					);
				}

				Blocked {
					schedulable: member.name().to_string(),
					missing: owned_names(&missing),
					forbidden: owned_names(&member.contract.forbidden(&self.state)),
					waiting_on,
				}
			})
			.collect();

		PlanError::Unsatisfiable {
			blocked,
			unproducible: owned_names(&unproducible),
		}
	}
}
