use std::marker::PhantomData;

use anyhow::anyhow;

use super::Schedulable;
use crate::component::{Component, DynComponent};
use crate::config::{Config, FromPropertyValue, Property};

/// What a runner sees besides its data unit.
pub struct RunContext<'a> {
	schedulable: &'a Schedulable,
	config: &'a Config,
}

impl<'a> RunContext<'a> {
	pub(crate) fn new(schedulable: &'a Schedulable, config: &'a Config) -> Self {
		Self {
			schedulable,
			config,
		}
	}

	pub fn schedulable(&self) -> &'a Schedulable {
		self.schedulable
	}

	pub fn config(&self) -> &'a Config {
		self.config
	}

	pub fn get<T: FromPropertyValue>(&self, property: &Property<T>) -> T {
		self.config.get(property)
	}
}

/// A pass over units of `C`.
pub trait RunnableSchedulable<C: Component>: Send + Sync + 'static {
	fn run(&self, unit: &mut C, ctx: &RunContext<'_>) -> anyhow::Result<()>;
}

impl<C, F> RunnableSchedulable<C> for F
where
	C: Component,
	F: Fn(&mut C, &RunContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
{
	fn run(&self, unit: &mut C, ctx: &RunContext<'_>) -> anyhow::Result<()> {
		self(unit, ctx)
	}
}

/// Expands one unit of `S` into the units of `D` it contains.
pub trait AdapterSchedulable<S: Component, D: Component>: Send + Sync + 'static {
	fn adapt<'a>(&self, source: &'a mut S, ctx: &RunContext<'_>) -> anyhow::Result<Vec<&'a mut D>>;
}

impl<S, D, F> AdapterSchedulable<S, D> for F
where
	S: Component,
	D: Component,
	F: for<'a> Fn(&'a mut S, &RunContext<'_>) -> anyhow::Result<Vec<&'a mut D>>
		+ Send
		+ Sync
		+ 'static,
{
	fn adapt<'a>(&self, source: &'a mut S, ctx: &RunContext<'_>) -> anyhow::Result<Vec<&'a mut D>> {
		self(source, ctx)
	}
}

/// Type-erased runner stored on a [`Schedulable`].
pub(crate) enum Runner {
	Run(Box<dyn ErasedRun>),
	Adapt(Box<dyn ErasedAdapt>),
	/// Separators only move tags.
	None,
}

pub(crate) trait ErasedRun: Send + Sync {
	fn run(&self, unit: &mut dyn DynComponent, ctx: &RunContext<'_>) -> anyhow::Result<()>;
}

pub(crate) trait ErasedAdapt: Send + Sync {
	fn adapt<'a>(
		&self,
		unit: &'a mut dyn DynComponent,
		ctx: &RunContext<'_>,
	) -> anyhow::Result<Vec<&'a mut dyn DynComponent>>;
}

pub(crate) struct RunEntry<C, R> {
	pub(crate) runner: R,
	pub(crate) _marker: PhantomData<fn(&mut C)>,
}

impl<C: Component, R: RunnableSchedulable<C>> ErasedRun for RunEntry<C, R> {
	fn run(&self, unit: &mut dyn DynComponent, ctx: &RunContext<'_>) -> anyhow::Result<()> {
		let actual = unit.component_name();
		let unit = unit
			.as_any_mut()
			.downcast_mut::<C>()
			.ok_or_else(|| anyhow!("expected a `{}` unit, got `{actual}`", C::NAME))?;
		self.runner.run(unit, ctx)
	}
}

pub(crate) struct AdaptEntry<S, D, A> {
	pub(crate) adapter: A,
	pub(crate) _marker: PhantomData<fn(&mut S) -> D>,
}

impl<S: Component, D: Component, A: AdapterSchedulable<S, D>> ErasedAdapt for AdaptEntry<S, D, A> {
	fn adapt<'a>(
		&self,
		unit: &'a mut dyn DynComponent,
		ctx: &RunContext<'_>,
	) -> anyhow::Result<Vec<&'a mut dyn DynComponent>> {
		let actual = unit.component_name();
		let source = unit
			.as_any_mut()
			.downcast_mut::<S>()
			.ok_or_else(|| anyhow!("expected a `{}` unit, got `{actual}`", S::NAME))?;
		let children = self.adapter.adapt(source, ctx)?;
		Ok(children
			.into_iter()
			.map(|child| child as &mut dyn DynComponent)
			.collect())
	}
}
