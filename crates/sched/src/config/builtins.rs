use super::property::{FromPropertyValue, Property, PropertyDef, PropertyDefault, PropertyType, PropertyValue};

/// How sibling units of a sub-plan are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerMode {
	Sequential,
	Parallel,
}

impl RunnerMode {
	pub const NAMES: &'static [&'static str] = &["sequential", "parallel"];

	pub fn as_str(self) -> &'static str {
		match self {
			RunnerMode::Sequential => "sequential",
			RunnerMode::Parallel => "parallel",
		}
	}
}

impl FromPropertyValue for RunnerMode {
	fn from_value(value: &PropertyValue) -> Option<Self> {
		match value.as_str()? {
			"sequential" => Some(RunnerMode::Sequential),
			"parallel" => Some(RunnerMode::Parallel),
			_ => None,
		}
	}
}

pub static RUNNER_DEF: PropertyDef = PropertyDef::new(
	"sched.runner",
	"Process sibling units sequentially or on a worker pool",
	PropertyType::Enum(RunnerMode::NAMES),
	PropertyDefault::Str("sequential"),
);

pub static RUNNER_THREADS_DEF: PropertyDef = PropertyDef::new(
	"sched.runner.threads",
	"Worker threads for the parallel runner; 0 uses the global pool",
	PropertyType::Int,
	PropertyDefault::Int(0),
);

pub static RUNNER: Property<RunnerMode> = Property::new(&RUNNER_DEF);
pub static RUNNER_THREADS: Property<i64> = Property::new(&RUNNER_THREADS_DEF);

pub(crate) static BUILTINS: [&PropertyDef; 2] = [&RUNNER_DEF, &RUNNER_THREADS_DEF];
