//! Constraint-driven pass scheduler.
//!
//! # Purpose
//!
//! Independently authored passes ("schedulables") declare what they need, forbid, add and
//! remove in terms of items from a [`Catalog`]. A [`Request`] names the starting state, the
//! target state, the requested productions and the enabled features; the solver turns it into
//! an ordered [`Plan`], nesting sub-plans wherever a pass works on a finer data granularity
//! than its caller. A [`ScheduleInstance`] then walks the plan over real data, tracking each
//! unit's live tags in its [`Markings`].
//!
//! # Mental Model
//!
//! 1. **Declare:** items go into a [`CatalogBuilder`]; schedulables are built against the frozen
//!    catalog with [`Schedulable::runnable`], [`Schedulable::adapter`] or
//!    [`Schedulable::separator`].
//! 2. **Request:** the caller fills a [`Request`] with a pool of schedulables, tags, productions,
//!    features and [`Barrier`]s, then calls [`Request::build_plan`].
//! 3. **Solve:** members are selected (mandatory, producers of requested productions, on-demand
//!    helpers), then placed greedily: a member is eligible once its needs hold and its
//!    forbidden items are absent. Ties break on safety, locality, priority and declaration
//!    order, so the same request always yields the same plan.
//! 4. **Execute:** [`Plan::schedule_instance`] runs the plan over a root unit, sequentially or
//!    fanning sibling units out over `rayon`.
//!
//! # Invariants
//!
//! - Every step's need/no holds against the accumulated state at its position in the plan.
//! - Every selected schedulable appears exactly once; each runs at most once per data unit.
//! - Effects apply remove-then-add, in the solver and in the executor alike.
//! - A failed request never yields a partial plan.

pub mod config;
mod component;
mod error;
mod exec;
#[cfg(test)]
mod fixtures;
mod plan;
mod request;
mod schedulable;
mod solver;

pub use component::{Component, markings_for};
pub use config::{Config, ConfigBuilder, Property, PropertyDef, PropertyType, PropertyValue};
pub use error::{Blocked, ConfigError, PlanError, ProcessError, SchedulableError};
pub use exec::ScheduleInstance;
pub use plan::{Plan, PlanBuilder, PlanStep, ScheduledStep, SubPlan};
pub use request::{Barrier, Request};
pub use sched_items::{
	Catalog, CatalogBuilder, ItemDef, ItemError, ItemId, ItemKind, ItemSet, Manifest, Marker,
	Markings,
};
pub use schedulable::{
	AdapterSchedulable, ConditionalDef, Conditional, Contract, RunContext, RunnableSchedulable,
	Schedulable, SchedulableBuilder, SchedulableKind, SchedulableRegistry,
};
