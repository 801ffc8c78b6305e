//! Member selection.

use sched_items::ItemSet;
use tracing::debug;

use super::Member;
use crate::error::PlanError;
use crate::request::Request;
use crate::schedulable::owned_names;

/// Selects the members of the plan, in pool order.
pub(crate) fn select(request: &Request) -> Result<Vec<Member>, PlanError> {
	let features = request.features();
	let mut candidates = Vec::new();
	for (decl, schedulable) in request.pool().iter().enumerate() {
		if schedulable.is_adapter() {
			continue;
		}
		if !schedulable.is_supported(features) {
			debug!(
				schedulable = schedulable.name(),
				support = %schedulable.support(),
				"skipping unsupported schedulable"
			);
			continue;
		}
		candidates.push(Member::new(decl, schedulable, features));
	}

	let mut chosen: Vec<bool> = candidates
		.iter()
		.map(|m| m.schedulable.is_mandatory())
		.collect();

	let supplied = reachable(request, &candidates, &chosen);
	for production in request.productions() {
		let producer = pick(&candidates, &supplied, |m| {
			m.schedulable.production() == Some(production)
		});
		match producer {
			Some(index) => chosen[index] = true,
			None => {
				return Err(PlanError::ProductionUnavailable {
					production: request.catalog().productions().name(production).to_string(),
				});
			}
		}
	}

	while pull_helper(request, &candidates, &mut chosen)? {}

	let members: Vec<Member> = candidates
		.into_iter()
		.zip(chosen)
		.filter_map(|(member, chosen)| chosen.then_some(member))
		.collect();

	for member in &members {
		let contradiction = member.contract.need.intersection(&member.contract.no);
		if !contradiction.is_empty() {
			return Err(PlanError::SelfContradictory {
				schedulable: member.name().to_string(),
				items: owned_names(&contradiction),
			});
		}
	}
	Ok(members)
}

/// Index of the preferred candidate matching `pred` whose needs lie in `supplied`.
///
/// Falls back to the preferred match when none can run, so the failure names it.
fn pick(
	candidates: &[Member],
	supplied: &ItemSet,
	pred: impl Fn(&Member) -> bool,
) -> Option<usize> {
	let mut matches: Vec<(usize, &Member)> =
		candidates.iter().enumerate().filter(|(_, m)| pred(m)).collect();
	matches.sort_by_key(|(_, m)| m.preference());
	matches
		.iter()
		.find(|(_, m)| supplied.contains_all(&m.contract.need))
		.or_else(|| matches.first())
		.map(|&(index, _)| index)
}

/// Everything the initial state, the chosen members and the on-demand helpers could add,
/// counting a member only once its own needs are covered.
fn reachable(request: &Request, candidates: &[Member], chosen: &[bool]) -> ItemSet {
	let mut supplied = request.initial().clone();
	let mut counted = vec![false; candidates.len()];
	loop {
		let mut grew = false;
		for (index, member) in candidates.iter().enumerate() {
			let usable = chosen[index] || member.schedulable.is_on_demand();
			if counted[index] || !usable || !supplied.contains_all(&member.contract.need) {
				continue;
			}
			counted[index] = true;
			supplied.add_all(&member.contract.add);
			grew = true;
		}
		if !grew {
			return supplied;
		}
	}
}

/// Pulls in one on-demand helper if some demand is unmet. Returns whether it did.
fn pull_helper(
	request: &Request,
	candidates: &[Member],
	chosen: &mut [bool],
) -> Result<bool, PlanError> {
	let data = request.catalog().data();
	let mut supply = request.initial().clone();
	let mut demand = request.include().clone();
	let mut removed = ItemSet::new(data);
	for (member, _) in candidates.iter().zip(chosen.iter()).filter(|(_, c)| **c) {
		supply.add_all(&member.contract.add);
		demand.add_all(&member.contract.need);
		removed.add_all(&member.contract.remove);
	}

	let supplied = reachable(request, candidates, chosen);
	for item in &demand.difference(&supply) {
		let helper = pick(candidates, &supplied, |m| {
			m.schedulable.is_on_demand() && m.contract.add.contains(item)
		})
		.filter(|&index| !chosen[index]);
		match helper {
			Some(index) => {
				debug!(
					helper = candidates[index].name(),
					item = data.name(item),
					"pulling on-demand helper"
				);
				chosen[index] = true;
				return Ok(true);
			}
			None => {
				let mut needed_by: Vec<String> = candidates
					.iter()
					.zip(chosen.iter())
					.filter(|(m, c)| **c && m.contract.need.contains(item))
					.map(|(m, _)| m.name().to_string())
					.collect();
				if request.include().contains(item) {
					needed_by.push("target".to_string());
				}
				return Err(PlanError::Unreachable {
					item: data.name(item).to_string(),
					needed_by,
				});
			}
		}
	}

	let lingering = request.exclude().intersection(&supply).difference(&removed);
	for item in &lingering {
		let helper = pick(candidates, &supplied, |m| {
			m.schedulable.is_on_demand() && m.contract.remove.contains(item)
		})
		.filter(|&index| !chosen[index]);
		if let Some(index) = helper {
			debug!(
				helper = candidates[index].name(),
				item = data.name(item),
				"pulling on-demand remover"
			);
			chosen[index] = true;
			return Ok(true);
		}
	}
	Ok(false)
}
