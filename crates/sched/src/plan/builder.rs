use rustc_hash::FxHashSet;
use sched_items::{ItemId, ItemSet};

use super::{Plan, PlanStep, ScheduledStep, SubPlan};

struct Frame {
	adapter: Option<ScheduledStep>,
	component: ItemId,
	entry: ItemSet,
	steps: Vec<PlanStep>,
	/// Families placed in this frame or any frame nested in it.
	families: FxHashSet<String>,
	/// Components modified by steps in this frame or nested in it.
	modifies: ItemSet,
}

impl Frame {
	fn new(adapter: Option<ScheduledStep>, component: ItemId, entry: &ItemSet) -> Self {
		Self {
			adapter,
			component,
			entry: entry.clone(),
			steps: Vec::new(),
			families: FxHashSet::default(),
			modifies: ItemSet::new(entry.registry()),
		}
	}
}

/// Mutable plan under construction: a stack of open frames, the root at the bottom.
pub struct PlanBuilder {
	frames: Vec<Frame>,
}

impl PlanBuilder {
	pub fn new(root: ItemId, entry: &ItemSet) -> Self {
		Self {
			frames: vec![Frame::new(None, root, entry)],
		}
	}

	/// Number of open sub-plans.
	pub fn depth(&self) -> usize {
		self.frames.len() - 1
	}

	/// Component of the innermost open frame.
	pub fn component(&self) -> ItemId {
		self.top().component
	}

	/// Adapters of the open sub-plans, outermost first.
	pub fn open_adapters(&self) -> impl Iterator<Item = &ScheduledStep> + '_ {
		self.frames.iter().filter_map(|frame| frame.adapter.as_ref())
	}

	/// Opens a sub-plan under `adapter`, starting from `state`.
	///
	/// # Panics
	///
	/// Panics if `adapter` is not an adapter over the innermost frame's component.
	pub fn open(&mut self, adapter: ScheduledStep, state: &ItemSet) {
		let schedulable = adapter.schedulable();
		let Some(to) = schedulable.adapts_to() else {
			panic!("`{}` is not an adapter", schedulable.name());
		};
		assert_eq!(
			schedulable.component(),
			self.component(),
			"adapter `{}` does not start from the open frame's component",
			schedulable.name()
		);
		self.frames.push(Frame::new(Some(adapter), to, state));
	}

	/// Closes the innermost sub-plan at `state`. Returns false at the root.
	pub fn close(&mut self, state: &ItemSet) -> bool {
		if self.frames.len() == 1 {
			return false;
		}
		let Some(frame) = self.frames.pop() else {
			return false;
		};
		let Some(adapter) = frame.adapter else {
			return false;
		};
		let exclusive = frame.modifies.contains(adapter.schedulable().component());
		let parent = self.top_mut();
		parent.modifies.add_all(&frame.modifies);
		parent.steps.push(PlanStep::Adapt(SubPlan {
			adapter,
			plan: Plan {
				component: frame.component,
				steps: frame.steps,
				entry: frame.entry,
				exit: state.clone(),
			},
			exclusive,
		}));
		true
	}

	/// Closes sub-plans until `depth` remain open.
	pub fn close_to(&mut self, depth: usize, state: &ItemSet) {
		while self.depth() > depth && self.close(state) {}
	}

	/// Appends a run to the innermost frame.
	pub fn push(&mut self, step: ScheduledStep) {
		if let Some(family) = step.schedulable().family() {
			for frame in &mut self.frames {
				frame.families.insert(family.to_string());
			}
		}
		let top = self.top_mut();
		top.modifies.add_all(&step.contract().modify);
		top.steps.push(PlanStep::Run(step));
	}

	pub fn push_barrier(&mut self, name: impl Into<String>) {
		self.top_mut().steps.push(PlanStep::Barrier(name.into()));
	}

	/// Depth of the outermost open sub-plan holding a member of a family matching `pred`.
	pub fn shallowest_with_family(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
		self.frames
			.iter()
			.enumerate()
			.skip(1)
			.find(|(_, frame)| frame.families.iter().any(|family| pred(family)))
			.map(|(depth, _)| depth)
	}

	/// Closes every open sub-plan and returns the root plan, ending at `state`.
	pub fn build(mut self, state: &ItemSet) -> Plan {
		self.close_to(0, state);
		let root = self.frames.swap_remove(0);
		Plan {
			component: root.component,
			steps: root.steps,
			entry: root.entry,
			exit: state.clone(),
		}
	}

	fn top(&self) -> &Frame {
		&self.frames[self.frames.len() - 1]
	}

	fn top_mut(&mut self) -> &mut Frame {
		let last = self.frames.len() - 1;
		&mut self.frames[last]
	}
}
