//! Adapter chains from the root component.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use sched_items::ItemId;

use super::Member;
use crate::request::Request;

pub(crate) struct AdapterGraph {
	/// Supported adapters, preferred first.
	hops: Vec<Member>,
	/// Shortest hop chain from the root to each reachable component.
	paths: FxHashMap<ItemId, Vec<usize>>,
}

impl AdapterGraph {
	/// Breadth-first from `root`; between adapters on the same edge the preferred one wins.
	pub(crate) fn new(request: &Request, root: ItemId) -> Self {
		let features = request.features();
		let mut hops: Vec<Member> = request
			.pool()
			.iter()
			.enumerate()
			.filter(|(_, s)| s.is_adapter() && s.is_supported(features))
			.map(|(decl, s)| Member::new(decl, s, features))
			.collect();
		hops.sort_by_key(Member::preference);

		let mut paths = FxHashMap::default();
		paths.insert(root, Vec::new());
		let mut queue = VecDeque::from([root]);
		while let Some(component) = queue.pop_front() {
			let prefix = paths.get(&component).cloned().unwrap_or_default();
			for (index, hop) in hops.iter().enumerate() {
				if hop.schedulable.component() != component {
					continue;
				}
				let Some(to) = hop.schedulable.adapts_to() else {
					continue;
				};
				if paths.contains_key(&to) {
					continue;
				}
				let mut path = prefix.clone();
				path.push(index);
				paths.insert(to, path);
				queue.push_back(to);
			}
		}
		Self { hops, paths }
	}

	pub(crate) fn path(&self, component: ItemId) -> Option<&[usize]> {
		self.paths.get(&component).map(Vec::as_slice)
	}

	pub(crate) fn hop(&self, index: usize) -> &Member {
		&self.hops[index]
	}
}
