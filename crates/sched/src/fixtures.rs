//! Shared catalog and component types for unit tests.
//!
//! The data model is a small compiler: a `program` holds `class`es, a class holds `method`s.
//! Every unit keeps a trail of the steps that ran on it.

use sched_items::{Catalog, CatalogBuilder, ItemDef, ItemSet, Marker, Markings};

use crate::component::{Component, markings_for};
use crate::schedulable::{RunContext, Schedulable, SchedulableBuilder};

pub(crate) fn catalog() -> Catalog {
	let builder = CatalogBuilder::new();
	for def in [
		ItemDef::component("program"),
		ItemDef::component("class"),
		ItemDef::component("method"),
		ItemDef::tag("parsed"),
		ItemDef::tag("resolved"),
		ItemDef::tag("typed"),
		ItemDef::tag("lowered"),
		ItemDef::tag("optimized"),
		ItemDef::tag("dirty"),
		ItemDef::tag("checked"),
		ItemDef::tag("t1"),
		ItemDef::tag("t2").composed_of(["t1"]),
		ItemDef::tag("frontend").composed_of(["parsed", "resolved"]),
		ItemDef::tag("phase").abstract_item(),
		ItemDef::marker("inlined").valid_on(["method"]),
		ItemDef::marker("layout").valid_on(["class"]),
		ItemDef::feature("fast"),
		ItemDef::feature("debug"),
		ItemDef::production("listing"),
		ItemDef::production("binary"),
	] {
		builder.register(def).unwrap();
	}
	builder.build().unwrap()
}

pub(crate) fn data_set(catalog: &Catalog, names: &[&str]) -> ItemSet {
	catalog.data().set_of(names).unwrap()
}

/// Units that remember which steps ran on them.
pub(crate) trait Traced: Component {
	fn trail(&mut self) -> &mut Vec<String>;
}

pub(crate) struct Method {
	pub markings: Markings,
	pub trail: Vec<String>,
}

pub(crate) struct Class {
	pub markings: Markings,
	pub trail: Vec<String>,
	pub methods: Vec<Method>,
}

pub(crate) struct Program {
	pub markings: Markings,
	pub trail: Vec<String>,
	pub classes: Vec<Class>,
}

impl Program {
	/// A program whose `i`-th class holds `shape[i]` methods.
	pub(crate) fn new(catalog: &Catalog, shape: &[usize]) -> Self {
		let classes = shape
			.iter()
			.map(|&methods| Class {
				markings: markings_for::<Class>(catalog).unwrap(),
				trail: Vec::new(),
				methods: (0..methods)
					.map(|_| Method {
						markings: markings_for::<Method>(catalog).unwrap(),
						trail: Vec::new(),
					})
					.collect(),
			})
			.collect();
		Self {
			markings: markings_for::<Program>(catalog).unwrap(),
			trail: Vec::new(),
			classes,
		}
	}

	pub(crate) fn methods(&self) -> impl Iterator<Item = &Method> + '_ {
		self.classes.iter().flat_map(|class| &class.methods)
	}
}

macro_rules! component {
	($ty:ident, $name:literal) => {
		impl Component for $ty {
			const NAME: &'static str = $name;

			fn markings(&self) -> &Markings {
				&self.markings
			}

			fn markings_mut(&mut self) -> &mut Markings {
				&mut self.markings
			}
		}

		impl Traced for $ty {
			fn trail(&mut self) -> &mut Vec<String> {
				&mut self.trail
			}
		}
	};
}

component!(Program, "program");
component!(Class, "class");
component!(Method, "method");

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Inlined {
	pub calls: usize,
}

impl Marker for Inlined {
	const NAME: &'static str = "inlined";
}

/// A runnable step that only records itself on the unit's trail.
pub(crate) fn step<C: Traced>(name: &str) -> SchedulableBuilder {
	let label = name.to_string();
	Schedulable::runnable::<C, _>(name, move |unit: &mut C, _: &RunContext<'_>| {
		unit.trail().push(label.clone());
		Ok(())
	})
}

pub(crate) fn classes() -> SchedulableBuilder {
	Schedulable::adapter::<Program, Class, _>(
		"classes",
		|program: &mut Program, _: &RunContext<'_>| Ok(program.classes.iter_mut().collect()),
	)
}

pub(crate) fn methods() -> SchedulableBuilder {
	Schedulable::adapter::<Class, Method, _>(
		"methods",
		|class: &mut Class, _: &RunContext<'_>| Ok(class.methods.iter_mut().collect()),
	)
}
