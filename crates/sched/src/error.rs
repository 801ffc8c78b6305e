use sched_items::ItemError;

use crate::config::PropertyType;

/// Malformed schedulable declarations, detected when a descriptor is built or registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulableError {
	#[error("schedulable `{schedulable}`: {source}")]
	Item {
		schedulable: String,
		#[source]
		source: ItemError,
	},
	#[error("schedulable `{schedulable}` both adds and removes {items:?}")]
	AddRemoveOverlap {
		schedulable: String,
		items: Vec<String>,
	},
	#[error("schedulable `{schedulable}` both needs and forbids {items:?}")]
	NeedNoOverlap {
		schedulable: String,
		items: Vec<String>,
	},
	#[error("schedulable `{schedulable}` adds `{item}`, which resolves to no items")]
	EmptyEffect { schedulable: String, item: String },
	#[error("schedulable `{schedulable}` cannot add or remove component `{item}`")]
	ComponentEffect { schedulable: String, item: String },
	#[error("schedulable `{schedulable}` adds marker `{marker}`, which is not valid on `{component}`")]
	MarkerNotValidOn {
		schedulable: String,
		marker: String,
		component: String,
	},
	#[error("adapter `{schedulable}` adapts `{component}` to itself")]
	SelfAdapter {
		schedulable: String,
		component: String,
	},
	#[error("adapter `{schedulable}` declares effects or a production; adapters only constrain")]
	AdapterEffects { schedulable: String },
	#[error("schedulable `{name}` is already registered")]
	Duplicate { name: String },
}

/// Why a blocked member could not be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocked {
	pub schedulable: String,
	/// Needed items absent from the state.
	pub missing: Vec<String>,
	/// Forbidden items present in the state.
	pub forbidden: Vec<String>,
	/// Barriers and adapters the member is waiting on.
	pub waiting_on: Vec<String>,
}

impl core::fmt::Display for Blocked {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "`{}`", self.schedulable)?;
		if !self.missing.is_empty() {
			write!(f, " missing {:?}", self.missing)?;
		}
		if !self.forbidden.is_empty() {
			write!(f, " forbidden {:?}", self.forbidden)?;
		}
		if !self.waiting_on.is_empty() {
			write!(f, " waiting on {:?}", self.waiting_on)?;
		}
		Ok(())
	}
}

fn join_blocked(blocked: &[Blocked]) -> String {
	blocked
		.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join("; ")
}

/// Request and planning failures. All are fatal to the request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
	#[error(transparent)]
	Item(#[from] ItemError),
	#[error("schedulable `{0}` is already part of the request")]
	DuplicateSchedulable(String),
	#[error("schedulable `{0}` was built against a different catalog")]
	ForeignSchedulable(String),
	#[error("schedulable `{schedulable}` both needs and forbids {items:?} with the enabled features")]
	SelfContradictory {
		schedulable: String,
		items: Vec<String>,
	},
	#[error("no supported schedulable produces `{production}`")]
	ProductionUnavailable { production: String },
	#[error("`{item}` is needed by {needed_by:?} but no selectable schedulable adds it")]
	Unreachable { item: String, needed_by: Vec<String> },
	#[error("no adapter path from `{from}` to `{to}` for `{schedulable}`")]
	NoAdapterPath {
		schedulable: String,
		from: String,
		to: String,
	},
	#[error("no remaining schedulable can run (unproducible: {unproducible:?}): {}", join_blocked(.blocked))]
	Unsatisfiable {
		blocked: Vec<Blocked>,
		/// Missing items that no remaining member adds.
		unproducible: Vec<String>,
	},
	#[error("target items {missing:?} are not reached by the plan")]
	TargetUnreachable { missing: Vec<String> },
	#[error("excluded items {present:?} are still present at the end of the plan")]
	TargetExcluded { present: Vec<String> },
	#[error("barrier `{barrier}` names family `{family}`, which no schedulable in the pool declares")]
	UnknownBarrierFamily { barrier: String, family: String },
	#[error("step `{schedulable}` is missing {missing:?} and meets forbidden {forbidden:?}")]
	PreconditionUnmet {
		schedulable: String,
		missing: Vec<String>,
		forbidden: Vec<String>,
	},
	#[error("schedulable `{0}` is not supported with the enabled features")]
	Unsupported(String),
	#[error("schedulable `{0}` appears more than once in the plan")]
	DuplicateStep(String),
	#[error("production `{0}` is requested but not produced by the plan")]
	ProductionMissing(String),
}

/// Failures while running a plan over data.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
	#[error("plan is rooted at `{expected}` but was given a `{actual}`")]
	ComponentMismatch { expected: String, actual: String },
	#[error("`{schedulable}` on `{component}`: missing {missing:?}, forbidden present {forbidden:?}")]
	PreconditionViolated {
		schedulable: String,
		component: String,
		missing: Vec<String>,
		forbidden: Vec<String>,
	},
	#[error("`{schedulable}` declares marker `{marker}` but did not attach it on `{component}`")]
	MarkerNotAttached {
		schedulable: String,
		marker: String,
		component: String,
	},
	#[error("`{schedulable}` failed on `{component}`")]
	Run {
		schedulable: String,
		component: String,
		#[source]
		source: anyhow::Error,
	},
	#[error("failed to start worker pool: {0}")]
	ThreadPool(String),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
	suggestion
		.as_ref()
		.map(|s| format!(" (did you mean `{s}`?)"))
		.unwrap_or_default()
}

/// Configuration property failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
	#[error("unknown property `{name}`{}", did_you_mean(.suggestion))]
	UnknownProperty {
		name: String,
		suggestion: Option<String>,
	},
	#[error("property `{property}` expects {expected}, got {got}")]
	TypeMismatch {
		property: String,
		expected: PropertyType,
		got: &'static str,
	},
	#[error("invalid value for `{property}`: {reason}")]
	InvalidValue { property: String, reason: String },
	#[error("property `{0}` is already registered")]
	Duplicate(String),
	#[error("invalid configuration file: {0}")]
	Toml(String),
}
