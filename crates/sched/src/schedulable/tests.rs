use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use sched_items::{Catalog, CatalogBuilder, ItemDef, ItemError, ItemKind};

use super::*;
use crate::error::SchedulableError;
use crate::fixtures::{self, Class, Method, Program, classes, data_set, methods, step};

#[fixture]
fn catalog() -> Catalog {
	fixtures::catalog()
}

#[rstest]
fn test_runnable_resolves_contract(catalog: Catalog) {
	let s = step::<Method>("inline")
		.description("inline small calls")
		.priority(3)
		.need(["typed"])
		.no(["dirty"])
		.add(["inlined", "optimized"])
		.remove(["lowered"])
		.modify(["class"])
		.family("opt")
		.build(&catalog)
		.unwrap();

	assert_eq!(s.name(), "inline");
	assert_eq!(s.description(), "inline small calls");
	assert_eq!(s.priority(), 3);
	assert_eq!(s.component_name(), "method");
	assert_eq!(s.kind(), SchedulableKind::Runnable);
	assert_eq!(s.family(), Some("opt"));
	assert!(s.is_mandatory());
	assert_eq!(s.contract().need, data_set(&catalog, &["typed"]));
	assert_eq!(s.contract().no, data_set(&catalog, &["dirty"]));
	assert_eq!(s.contract().add, data_set(&catalog, &["inlined", "optimized"]));
	assert_eq!(s.contract().remove, data_set(&catalog, &["lowered"]));
	assert_eq!(s.contract().modify, data_set(&catalog, &["class"]));
}

#[rstest]
fn test_composite_names_expand(catalog: Catalog) {
	let s = step::<Program>("parse")
		.add(["frontend"])
		.build(&catalog)
		.unwrap();
	assert_eq!(s.contract().add.names(), vec!["parsed", "resolved"]);
}

#[rstest]
fn test_selection_classes(catalog: Catalog) {
	let helper = step::<Program>("helper")
		.add(["checked"])
		.on_demand()
		.build(&catalog)
		.unwrap();
	assert!(helper.is_on_demand());
	assert!(!helper.is_mandatory());

	let producer = step::<Program>("emit")
		.produce("binary")
		.build(&catalog)
		.unwrap();
	assert_eq!(
		producer.production(),
		Some(catalog.productions().lookup("binary").unwrap())
	);
	assert!(!producer.is_mandatory());

	let adapter = classes().build(&catalog).unwrap();
	assert!(adapter.is_adapter());
	assert!(!adapter.is_mandatory());
	assert_eq!(
		adapter.adapts_to(),
		Some(catalog.data().lookup("class").unwrap())
	);

	let separator = Schedulable::separator("sep", "program")
		.remove(["parsed"])
		.build(&catalog)
		.unwrap();
	assert_eq!(separator.kind(), SchedulableKind::Separator);
	assert!(matches!(separator.runner(), Runner::None));
}

#[rstest]
fn test_support_is_all_of(catalog: Catalog) {
	let s = step::<Program>("trace")
		.support(["fast", "debug"])
		.build(&catalog)
		.unwrap();
	let mut features = catalog.feature_set();
	features.add(catalog.features().lookup("fast").unwrap());
	assert!(!s.is_supported(&features));
	features.add(catalog.features().lookup("debug").unwrap());
	assert!(s.is_supported(&features));
}

#[rstest]
fn test_effective_contract_folds_enabled_conditionals(catalog: Catalog) {
	let s = step::<Program>("lower")
		.need(["typed"])
		.add(["lowered"])
		.optional(ConditionalDef::when("fast").add(["optimized"]).no(["dirty"]))
		.optional(ConditionalDef::when("debug").need(["checked"]))
		.build(&catalog)
		.unwrap();
	assert_eq!(s.conditionals().len(), 2);

	let none = catalog.feature_set();
	assert_eq!(s.effective_contract(&none), *s.contract());

	let fast = catalog.features().set_of(["fast"]).unwrap();
	let contract = s.effective_contract(&fast);
	assert_eq!(contract.add, data_set(&catalog, &["lowered", "optimized"]));
	assert_eq!(contract.no, data_set(&catalog, &["dirty"]));
	assert_eq!(contract.need, data_set(&catalog, &["typed"]));

	let both = catalog.features().set_of(["fast", "debug"]).unwrap();
	assert_eq!(
		s.effective_contract(&both).need,
		data_set(&catalog, &["typed", "checked"])
	);
}

#[rstest]
fn test_contract_admits_and_applies(catalog: Catalog) {
	let s = step::<Program>("lower")
		.need(["typed"])
		.no(["dirty"])
		.add(["lowered"])
		.remove(["typed"])
		.build(&catalog)
		.unwrap();
	let contract = s.contract();

	let mut state = data_set(&catalog, &["typed", "dirty"]);
	assert!(!contract.admits(&state));
	assert_eq!(contract.forbidden(&state).names(), vec!["dirty"]);
	state.remove(catalog.data().lookup("dirty").unwrap());
	assert!(contract.admits(&state));
	assert!(contract.missing(&state).is_empty());

	contract.apply(&mut state);
	assert_eq!(state, data_set(&catalog, &["lowered"]));
	assert!(contract.has_effects());
}

#[rstest]
#[case::unknown_item(
	step::<Program>("s").need(["missing"]),
	"unknown item"
)]
#[case::add_remove_overlap(
	step::<Program>("s").add(["parsed"]).remove(["frontend"]),
	"add/remove overlap"
)]
#[case::need_no_overlap(
	step::<Program>("s").need(["frontend"]).no(["resolved"]),
	"need/no overlap"
)]
#[case::empty_effect(
	step::<Program>("s").add(["phase"]),
	"empty effect"
)]
#[case::component_effect(
	step::<Program>("s").remove(["class"]),
	"component effect"
)]
#[case::marker_on_wrong_component(
	step::<Class>("s").add(["inlined"]),
	"marker validity"
)]
#[case::conditional_overlap(
	step::<Program>("s").add(["typed"]).optional(ConditionalDef::when("fast").remove(["typed"])),
	"conditional overlap"
)]
#[case::unknown_feature(
	step::<Program>("s").optional(ConditionalDef::when("turbo").add(["typed"])),
	"unknown feature"
)]
#[case::adapter_with_effects(
	classes().add(["parsed"]),
	"adapter effects"
)]
#[case::adapter_with_production(
	methods().produce("listing"),
	"adapter production"
)]
#[case::separator_on_tag(
	Schedulable::separator("s", "parsed"),
	"separator component"
)]
fn test_build_rejects(catalog: Catalog, #[case] builder: SchedulableBuilder, #[case] what: &str) {
	let err = builder.build(&catalog).unwrap_err();
	let ok = match what {
		"unknown item" => matches!(
			&err,
			SchedulableError::Item { source: ItemError::NotRegistered { name, .. }, .. } if name == "missing"
		),
		"add/remove overlap" | "conditional overlap" => {
			matches!(&err, SchedulableError::AddRemoveOverlap { .. })
		}
		"need/no overlap" => matches!(
			&err,
			SchedulableError::NeedNoOverlap { items, .. } if items == &["resolved"]
		),
		"empty effect" => matches!(&err, SchedulableError::EmptyEffect { item, .. } if item == "phase"),
		"component effect" => {
			matches!(&err, SchedulableError::ComponentEffect { item, .. } if item == "class")
		}
		"marker validity" => matches!(
			&err,
			SchedulableError::MarkerNotValidOn { marker, component, .. }
				if marker == "inlined" && component == "class"
		),
		"unknown feature" => matches!(&err, SchedulableError::Item { .. }),
		"adapter effects" | "adapter production" => {
			matches!(&err, SchedulableError::AdapterEffects { .. })
		}
		"separator component" => matches!(
			&err,
			SchedulableError::Item {
				source: ItemError::KindMismatch {
					expected: ItemKind::Component,
					..
				},
				..
			}
		),
		other => unreachable!("unexpected case {other}"),
	};
	assert!(ok, "{what}: got {err:?}");
}

#[test]
fn test_self_adapter_is_rejected() {
	let catalog = fixtures::catalog();
	let err = Schedulable::adapter::<Class, Class, _>(
		"self",
		|class: &mut Class, _: &RunContext<'_>| Ok(vec![class]),
	)
	.build(&catalog)
	.unwrap_err();
	assert_eq!(
		err,
		SchedulableError::SelfAdapter {
			schedulable: "self".into(),
			component: "class".into(),
		}
	);
}

#[test]
fn test_component_must_be_registered() {
	let builder = CatalogBuilder::new();
	builder.register(ItemDef::component("class")).unwrap();
	let catalog = builder.build().unwrap();
	let err = step::<Program>("s").build(&catalog).unwrap_err();
	assert!(matches!(
		err,
		SchedulableError::Item {
			source: ItemError::NotRegistered { .. },
			..
		}
	));
}

#[rstest]
fn test_registry_rejects_duplicates(catalog: Catalog) {
	let mut registry = SchedulableRegistry::new();
	assert!(registry.is_empty());
	registry
		.register(step::<Program>("parse").build(&catalog).unwrap())
		.unwrap();
	registry
		.register(step::<Program>("check").build(&catalog).unwrap())
		.unwrap();
	let err = registry
		.register(step::<Class>("parse").build(&catalog).unwrap())
		.unwrap_err();
	assert_eq!(
		err,
		SchedulableError::Duplicate {
			name: "parse".into()
		}
	);

	assert_eq!(registry.len(), 2);
	assert_eq!(registry.get("check").unwrap().component_name(), "program");
	let names: Vec<_> = registry.iter().map(|s| s.name()).collect();
	assert_eq!(names, vec!["parse", "check"]);
}
