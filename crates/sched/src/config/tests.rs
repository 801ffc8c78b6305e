use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

static DEPTH_DEF: PropertyDef = PropertyDef::new(
	"inline.depth",
	"Maximum inlining depth",
	PropertyType::Int,
	PropertyDefault::Int(3),
);
static DEPTH: Property<i64> = Property::new(&DEPTH_DEF);

static VERBOSE_DEF: PropertyDef = PropertyDef::new(
	"inline.verbose",
	"Report every inlined call",
	PropertyType::Bool,
	PropertyDefault::Bool(false),
);
static VERBOSE: Property<bool> = Property::new(&VERBOSE_DEF);

static BROKEN_DEF: PropertyDef = PropertyDef::new(
	"inline.broken",
	"Default does not match the declared type",
	PropertyType::Int,
	PropertyDefault::Str("three"),
);

fn builder() -> ConfigBuilder {
	let mut builder = Config::builder();
	builder.register(&DEPTH_DEF).unwrap();
	builder.register(&VERBOSE_DEF).unwrap();
	builder
}

#[test]
fn test_defaults_apply_when_unset() {
	let config = builder().build();
	assert_eq!(config.get(&RUNNER), RunnerMode::Sequential);
	assert_eq!(config.get(&RUNNER_THREADS), 0);
	assert_eq!(config.get(&DEPTH), 3);
	assert!(!config.get(&VERBOSE));
	assert_eq!(config.value("inline.depth").unwrap(), PropertyValue::Int(3));
}

#[test]
fn test_defs_are_sorted_and_include_builtins() {
	let config = builder().build();
	let names: Vec<_> = config.defs().iter().map(|def| def.name).collect();
	assert_eq!(
		names,
		vec![
			"inline.depth",
			"inline.verbose",
			"sched.runner",
			"sched.runner.threads"
		]
	);
}

#[test]
fn test_register_rejects_duplicates_and_bad_defaults() {
	let mut builder = builder();
	assert_eq!(
		builder.register(&DEPTH_DEF),
		Err(ConfigError::Duplicate("inline.depth".into()))
	);
	assert!(matches!(
		builder.register(&BROKEN_DEF),
		Err(ConfigError::InvalidValue { property, .. }) if property == "inline.broken"
	));
}

#[rstest]
#[case("inline.depth", "7", PropertyValue::Int(7))]
#[case("inline.depth", " -2 ", PropertyValue::Int(-2))]
#[case("inline.verbose", "yes", PropertyValue::Bool(true))]
#[case("inline.verbose", "Off", PropertyValue::Bool(false))]
#[case("sched.runner", "parallel", PropertyValue::String("parallel".into()))]
fn test_set_str_parses_by_type(
	#[case] name: &str,
	#[case] text: &str,
	#[case] expected: PropertyValue,
) {
	let mut builder = builder();
	builder.set_str(name, text).unwrap();
	assert_eq!(builder.build().value(name).unwrap(), expected);
}

#[rstest]
#[case("inline.depth", "deep")]
#[case("inline.verbose", "maybe")]
#[case("sched.runner", "eager")]
fn test_set_str_rejects_unparsable_text(#[case] name: &str, #[case] text: &str) {
	let err = builder().set_str(name, text).unwrap_err();
	assert!(
		matches!(&err, ConfigError::InvalidValue { property, .. } if property == name),
		"{err}"
	);
}

#[test]
fn test_set_checks_value_type() {
	let mut builder = builder();
	assert_eq!(
		builder.set("inline.depth", PropertyValue::Bool(true)),
		Err(ConfigError::TypeMismatch {
			property: "inline.depth".into(),
			expected: PropertyType::Int,
			got: "bool",
		})
	);
	assert!(matches!(
		builder.set("sched.runner", PropertyValue::String("eager".into())),
		Err(ConfigError::InvalidValue { .. })
	));
	assert!(matches!(
		builder.set("sched.runner", PropertyValue::Int(1)),
		Err(ConfigError::TypeMismatch { .. })
	));
}

#[test]
fn test_unknown_property_suggests_close_name() {
	let err = builder().set_str("sched.runer", "parallel").unwrap_err();
	assert_eq!(
		err,
		ConfigError::UnknownProperty {
			name: "sched.runer".into(),
			suggestion: Some("sched.runner".into()),
		}
	);
	assert!(err.to_string().contains("did you mean `sched.runner`?"));

	let err = builder().set_str("codegen.target", "x86").unwrap_err();
	assert!(matches!(
		err,
		ConfigError::UnknownProperty { suggestion: None, .. }
	));
}

#[test]
fn test_load_toml_flattens_tables() {
	let mut builder = builder();
	builder
		.load_toml(
			r#"
			[sched]
			runner = "parallel"
			"runner.threads" = 4

			[inline]
			depth = 5
			verbose = true
			"#,
		)
		.unwrap();
	let config = builder.build();
	assert_eq!(config.get(&RUNNER), RunnerMode::Parallel);
	assert_eq!(config.get(&RUNNER_THREADS), 4);
	assert_eq!(config.get(&DEPTH), 5);
	assert!(config.get(&VERBOSE));
}

#[test]
fn test_load_toml_reports_errors() {
	let mut builder = builder();
	assert!(matches!(
		builder.load_toml("[inline\ndepth = 1"),
		Err(ConfigError::Toml(_))
	));
	assert!(matches!(
		builder.load_toml("inline.depth = 1.5"),
		Err(ConfigError::TypeMismatch { got: "float", .. })
	));
	assert!(matches!(
		builder.load_toml("[inline]\ndepht = 1"),
		Err(ConfigError::UnknownProperty { suggestion: Some(s), .. }) if s == "inline.depth"
	));
}

#[test]
fn test_scope_installs_and_restores() {
	assert!(current().is_none());
	assert_eq!(get(&DEPTH), 3);

	let mut outer = builder();
	outer.set("inline.depth", PropertyValue::Int(8)).unwrap();
	let outer = Arc::new(outer.build());
	let mut inner = builder();
	inner.set("inline.depth", PropertyValue::Int(1)).unwrap();
	let inner = Arc::new(inner.build());

	scope(&outer, || {
		assert_eq!(get(&DEPTH), 8);
		scope(&inner, || assert_eq!(get(&DEPTH), 1));
		assert_eq!(get(&DEPTH), 8);
	});
	assert!(current().is_none());
}

#[test]
fn test_scope_restores_on_unwind() {
	let config = Arc::new(builder().build());
	let result = std::panic::catch_unwind(|| scope(&config, || panic!("runner failed")));
	assert!(result.is_err());
	assert!(current().is_none());
}
