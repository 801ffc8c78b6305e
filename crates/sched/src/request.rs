use std::sync::Arc;

use rustc_hash::FxHashSet;
use sched_items::{Catalog, ItemSet};

use crate::error::PlanError;
use crate::plan::Plan;
use crate::schedulable::Schedulable;

/// Ordering edge between two groups of schedulables, identified by family.
///
/// Every selected member of a `before` family is placed ahead of any member of an `after`
/// family, and sub-plans holding `before` members are closed first, so the earlier phase has
/// finished on every unit when the later one starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barrier {
	name: String,
	before: Vec<String>,
	after: Vec<String>,
}

impl Barrier {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			before: Vec::new(),
			after: Vec::new(),
		}
	}

	pub fn before(mut self, family: impl Into<String>) -> Self {
		self.before.push(family.into());
		self
	}

	pub fn after(mut self, family: impl Into<String>) -> Self {
		self.after.push(family.into());
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn before_families(&self) -> &[String] {
		&self.before
	}

	pub fn after_families(&self) -> &[String] {
		&self.after
	}

	pub(crate) fn holds_back(&self, family: Option<&str>) -> bool {
		family.is_some_and(|family| self.after.iter().any(|f| f == family))
	}

	pub(crate) fn goes_first(&self, family: Option<&str>) -> bool {
		family.is_some_and(|family| self.before.iter().any(|f| f == family))
	}
}

/// Input to the solver.
#[derive(Debug, Clone)]
pub struct Request {
	catalog: Catalog,
	pool: Vec<Arc<Schedulable>>,
	names: FxHashSet<String>,
	initial: ItemSet,
	include: ItemSet,
	exclude: ItemSet,
	productions: ItemSet,
	features: ItemSet,
	barriers: Vec<Barrier>,
}

impl Request {
	pub fn new(catalog: &Catalog) -> Self {
		Self {
			catalog: catalog.clone(),
			pool: Vec::new(),
			names: FxHashSet::default(),
			initial: catalog.data_set(),
			include: catalog.data_set(),
			exclude: catalog.data_set(),
			productions: catalog.production_set(),
			features: catalog.feature_set(),
			barriers: Vec::new(),
		}
	}

	/// Adds a candidate. Pool order is declaration order, the last tie-break.
	pub fn add_schedulable(&mut self, schedulable: Arc<Schedulable>) -> Result<(), PlanError> {
		if schedulable.contract().need.registry().id() != self.catalog.data().id()
			|| schedulable.support().registry().id() != self.catalog.features().id()
		{
			return Err(PlanError::ForeignSchedulable(schedulable.name().to_string()));
		}
		if !self.names.insert(schedulable.name().to_string()) {
			return Err(PlanError::DuplicateSchedulable(
				schedulable.name().to_string(),
			));
		}
		self.pool.push(schedulable);
		Ok(())
	}

	pub fn add_schedulables<I>(&mut self, pool: I) -> Result<(), PlanError>
	where
		I: IntoIterator<Item = Arc<Schedulable>>,
	{
		pool.into_iter()
			.try_for_each(|schedulable| self.add_schedulable(schedulable))
	}

	pub fn add_initial_tag(&mut self, name: &str) -> Result<(), PlanError> {
		self.initial.add(self.catalog.data().lookup(name)?);
		Ok(())
	}

	pub fn add_target_include_tag(&mut self, name: &str) -> Result<(), PlanError> {
		self.include.add(self.catalog.data().lookup(name)?);
		Ok(())
	}

	pub fn add_target_exclude_tag(&mut self, name: &str) -> Result<(), PlanError> {
		self.exclude.add(self.catalog.data().lookup(name)?);
		Ok(())
	}

	pub fn add_production(&mut self, name: &str) -> Result<(), PlanError> {
		self.productions
			.add(self.catalog.productions().lookup(name)?);
		Ok(())
	}

	pub fn add_feature(&mut self, name: &str) -> Result<(), PlanError> {
		self.features.add(self.catalog.features().lookup(name)?);
		Ok(())
	}

	pub fn add_barrier(&mut self, barrier: Barrier) {
		self.barriers.push(barrier);
	}

	/// Solves the request into a plan rooted at the named component.
	pub fn build_plan(&self, root: &str) -> Result<Plan, PlanError> {
		crate::solver::solve(self, root)
	}

	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	pub fn pool(&self) -> &[Arc<Schedulable>] {
		&self.pool
	}

	pub fn initial(&self) -> &ItemSet {
		&self.initial
	}

	pub fn include(&self) -> &ItemSet {
		&self.include
	}

	pub fn exclude(&self) -> &ItemSet {
		&self.exclude
	}

	pub fn productions(&self) -> &ItemSet {
		&self.productions
	}

	pub fn features(&self) -> &ItemSet {
		&self.features
	}

	pub fn barriers(&self) -> &[Barrier] {
		&self.barriers
	}
}
