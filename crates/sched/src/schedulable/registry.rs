use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::Schedulable;
use crate::error::SchedulableError;

/// Name-keyed pool of every schedulable known to the process, in registration order.
#[derive(Debug, Default)]
pub struct SchedulableRegistry {
	entries: Vec<Arc<Schedulable>>,
	by_name: FxHashMap<String, usize>,
}

impl SchedulableRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, schedulable: Arc<Schedulable>) -> Result<(), SchedulableError> {
		if self.by_name.contains_key(schedulable.name()) {
			return Err(SchedulableError::Duplicate {
				name: schedulable.name().to_string(),
			});
		}
		debug!(schedulable = schedulable.name(), "schedulable registered");
		self.by_name
			.insert(schedulable.name().to_string(), self.entries.len());
		self.entries.push(schedulable);
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&Arc<Schedulable>> {
		self.by_name.get(name).map(|&index| &self.entries[index])
	}

	pub fn iter(&self) -> impl Iterator<Item = &Arc<Schedulable>> + '_ {
		self.entries.iter()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
