use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use sched_items::{Catalog, ItemSet};

use super::*;
use crate::error::PlanError;
use crate::fixtures::{self, Class, Method, Program, classes, data_set, methods, step};
use crate::request::Request;
use crate::schedulable::SchedulableBuilder;

#[fixture]
fn catalog() -> Catalog {
	fixtures::catalog()
}

fn scheduled(catalog: &Catalog, builder: SchedulableBuilder) -> ScheduledStep {
	let schedulable = builder.build(catalog).unwrap();
	let contract = schedulable.contract().clone();
	ScheduledStep::new(schedulable, contract)
}

fn root(catalog: &Catalog) -> sched_items::ItemId {
	catalog.data().lookup("program").unwrap()
}

fn applied(mut state: ItemSet, step: &ScheduledStep) -> ItemSet {
	step.contract().apply(&mut state);
	state
}

#[rstest]
fn test_builder_nests_sub_plans(catalog: Catalog) {
	let parse = scheduled(&catalog, step::<Program>("parse").add(["typed"]));
	let layout = scheduled(&catalog, step::<Class>("layout").need(["typed"]).add(["lowered"]));
	let inline = scheduled(&catalog, step::<Method>("inline").need(["lowered"]).add(["optimized"]));
	let emit = scheduled(&catalog, step::<Program>("emit").need(["optimized"]));

	let start = catalog.data_set();
	let mut builder = PlanBuilder::new(root(&catalog), &start);
	let s1 = applied(start.clone(), &parse);
	builder.push(parse);
	builder.open(scheduled(&catalog, classes()), &s1);
	assert_eq!(builder.depth(), 1);
	assert_eq!(builder.component(), catalog.data().lookup("class").unwrap());
	let s2 = applied(s1.clone(), &layout);
	builder.push(layout);
	builder.open(scheduled(&catalog, methods()), &s2);
	let s3 = applied(s2.clone(), &inline);
	builder.push(inline);
	let open: Vec<_> = builder
		.open_adapters()
		.map(|a| a.schedulable().name())
		.collect();
	assert_eq!(open, vec!["classes", "methods"]);

	builder.close_to(0, &s3);
	assert_eq!(builder.depth(), 0);
	builder.push(emit);
	let plan = builder.build(&s3);

	assert_eq!(plan.component_name(), "program");
	assert_eq!(plan.len(), 4);
	assert!(!plan.is_empty());
	assert_eq!(
		plan.schedulable_names(),
		vec!["parse", "layout", "inline", "emit"]
	);
	assert_eq!(plan.entry(), &start);
	assert_eq!(plan.exit(), &s3);

	let PlanStep::Adapt(class_plan) = &plan.steps()[1] else {
		panic!("expected an adapt step, got {:?}", plan.steps()[1]);
	};
	assert_eq!(class_plan.adapter().schedulable().name(), "classes");
	assert_eq!(class_plan.plan().component_name(), "class");
	assert_eq!(class_plan.plan().entry(), &s1);
	assert_eq!(class_plan.plan().exit(), &s3);
	assert!(!class_plan.is_exclusive());
	let PlanStep::Adapt(method_plan) = &class_plan.plan().steps()[1] else {
		panic!("expected a nested adapt step");
	};
	assert_eq!(method_plan.plan().entry(), &s2);
	assert_eq!(method_plan.plan().schedulable_names(), vec!["inline"]);
}

#[rstest]
fn test_modifying_the_source_component_makes_sub_plan_exclusive(catalog: Catalog) {
	let state = catalog.data_set();
	let mut builder = PlanBuilder::new(root(&catalog), &state);
	builder.open(scheduled(&catalog, classes()), &state);
	builder.open(scheduled(&catalog, methods()), &state);
	builder.push(scheduled(&catalog, step::<Method>("hoist").modify(["program"])));
	let plan = builder.build(&state);

	let PlanStep::Adapt(class_plan) = &plan.steps()[0] else {
		panic!("expected an adapt step");
	};
	let PlanStep::Adapt(method_plan) = &class_plan.plan().steps()[0] else {
		panic!("expected a nested adapt step");
	};
	assert!(class_plan.is_exclusive());
	assert!(!method_plan.is_exclusive());
}

#[rstest]
fn test_families_propagate_to_enclosing_frames(catalog: Catalog) {
	let state = catalog.data_set();
	let mut builder = PlanBuilder::new(root(&catalog), &state);
	assert_eq!(builder.shallowest_with_family(|f| f == "opt"), None);
	builder.open(scheduled(&catalog, classes()), &state);
	builder.open(scheduled(&catalog, methods()), &state);
	builder.push(scheduled(&catalog, step::<Method>("inline").family("opt")));
	assert_eq!(builder.shallowest_with_family(|f| f == "opt"), Some(1));
	assert_eq!(builder.shallowest_with_family(|f| f == "emit"), None);
	assert!(builder.close(&state));
	assert!(builder.close(&state));
	assert!(!builder.close(&state));
}

#[rstest]
#[should_panic(expected = "is not an adapter")]
fn test_open_rejects_runnable(catalog: Catalog) {
	let state = catalog.data_set();
	let mut builder = PlanBuilder::new(root(&catalog), &state);
	builder.open(scheduled(&catalog, step::<Program>("parse")), &state);
}

#[rstest]
#[should_panic(expected = "does not start from")]
fn test_open_rejects_adapter_from_other_component(catalog: Catalog) {
	let state = catalog.data_set();
	let mut builder = PlanBuilder::new(root(&catalog), &state);
	builder.open(scheduled(&catalog, methods()), &state);
}

#[rstest]
fn test_display_renders_nested_plan(catalog: Catalog) {
	let parse = scheduled(&catalog, step::<Program>("parse").add(["typed"]));
	let layout = scheduled(
		&catalog,
		step::<Class>("layout")
			.remove(["typed"])
			.add(["lowered"])
			.modify(["program"]),
	);
	let start = catalog.data_set();
	let mut builder = PlanBuilder::new(root(&catalog), &start);
	let s1 = applied(start.clone(), &parse);
	builder.push(parse);
	builder.push_barrier("front");
	builder.open(scheduled(&catalog, classes()), &s1);
	let s2 = applied(s1, &layout);
	builder.push(layout);
	let plan = builder.build(&s2);

	assert_eq!(
		plan.to_string(),
		"plan for program from {}\n\
		 \x20 run parse +{typed}\n\
		 \x20 barrier front\n\
		 \x20 adapt classes -> class (exclusive)\n\
		 \x20   run layout -{typed} +{lowered}\n\
		 ending at {lowered}"
	);
}

fn pool(catalog: &Catalog) -> Vec<Arc<crate::schedulable::Schedulable>> {
	vec![
		step::<Program>("parse").add(["typed"]).build(catalog).unwrap(),
		step::<Program>("lower")
			.need(["typed"])
			.add(["lowered"])
			.optional(crate::ConditionalDef::when("debug").need(["checked"]))
			.build(catalog)
			.unwrap(),
		step::<Program>("emit")
			.need(["lowered"])
			.produce("binary")
			.build(catalog)
			.unwrap(),
	]
}

fn request(catalog: &Catalog) -> Request {
	let mut request = Request::new(catalog);
	request.add_schedulables(pool(catalog)).unwrap();
	request.add_production("binary").unwrap();
	request.add_target_include_tag("lowered").unwrap();
	request
}

#[rstest]
fn test_check_accepts_solved_plan(catalog: Catalog) {
	let request = request(&catalog);
	let plan = request.build_plan("program").unwrap();
	assert_eq!(plan.schedulable_names(), vec!["parse", "lower", "emit"]);
	plan.check(&request).unwrap();
}

#[rstest]
fn test_check_rederives_contracts_from_features(catalog: Catalog) {
	let plan = request(&catalog).build_plan("program").unwrap();
	let mut debug = request(&catalog);
	debug.add_feature("debug").unwrap();
	assert_eq!(
		plan.check(&debug),
		Err(PlanError::PreconditionUnmet {
			schedulable: "lower".into(),
			missing: vec!["checked".into()],
			forbidden: vec![],
		})
	);
}

#[rstest]
fn test_check_reports_unsupported_step(catalog: Catalog) {
	let tracer = step::<Program>("trace")
		.support(["debug"])
		.build(&catalog)
		.unwrap();
	let contract = tracer.contract().clone();
	let state = catalog.data_set();
	let mut builder = PlanBuilder::new(root(&catalog), &state);
	builder.push(ScheduledStep::new(tracer, contract));
	let plan = builder.build(&state);
	assert_eq!(
		plan.check(&Request::new(&catalog)),
		Err(PlanError::Unsupported("trace".into()))
	);
}

#[rstest]
fn test_check_reports_duplicates_and_targets(catalog: Catalog) {
	let parse = scheduled(&catalog, step::<Program>("parse").add(["typed"]));
	let state = catalog.data_set();
	let mut builder = PlanBuilder::new(root(&catalog), &state);
	builder.push(parse.clone());
	builder.push(parse.clone());
	let plan = builder.build(&state);
	assert_eq!(
		plan.check(&Request::new(&catalog)),
		Err(PlanError::DuplicateStep("parse".into()))
	);

	let mut builder = PlanBuilder::new(root(&catalog), &state);
	builder.push(parse);
	let plan = builder.build(&data_set(&catalog, &["typed"]));

	let mut wants_lowered = Request::new(&catalog);
	wants_lowered.add_target_include_tag("lowered").unwrap();
	assert_eq!(
		plan.check(&wants_lowered),
		Err(PlanError::TargetUnreachable {
			missing: vec!["lowered".into()]
		})
	);

	let mut forbids_typed = Request::new(&catalog);
	forbids_typed.add_target_exclude_tag("typed").unwrap();
	assert_eq!(
		plan.check(&forbids_typed),
		Err(PlanError::TargetExcluded {
			present: vec!["typed".into()]
		})
	);

	let mut wants_listing = Request::new(&catalog);
	wants_listing.add_production("listing").unwrap();
	assert_eq!(
		plan.check(&wants_listing),
		Err(PlanError::ProductionMissing("listing".into()))
	);
}
