//! Item registries and bitmap-backed item sets.
//!
//! # Purpose
//!
//! Items are the vocabulary the scheduler reasons with: tags and markers describe the state of
//! a data unit, components name data granularities, features describe a scheduling run and
//! productions name goals. Every item lives in exactly one [`ItemRegistry`], which assigns each
//! primitive item a stable `(word, bit)` slot. An [`ItemSet`] is a fixed-width word array over
//! one registry.
//!
//! # Mental Model
//!
//! 1. **Declaration:** [`ItemDef`]s are registered into a [`RegistryBuilder`] (possibly from
//!    several threads, or from a TOML [`Manifest`]). Primitive items receive the next slot.
//! 2. **Freeze:** [`RegistryBuilder::build`] resolves names, checks kinds and resolves every
//!    composite item into the union of its components, rejecting cycles.
//! 3. **Use:** the frozen registry is shared behind an `Arc` and never changes again, so every
//!    [`ItemSet`] built from it has the same word count.
//!
//! # Invariants
//!
//! - Each primitive item owns a unique slot; composite and abstract items own none.
//! - A composite item's bitmap is the OR of its components' bitmaps, transitively.
//! - Sets from different registries never compare equal and never combine (panics).

mod catalog;
mod def;
mod error;
mod kind;
mod manifest;
mod markings;
mod registry;
mod set;

pub use catalog::{Catalog, CatalogBuilder};
pub use def::ItemDef;
pub use error::ItemError;
pub use kind::{ItemKind, RegistryDomain};
pub use manifest::{Manifest, ManifestItem};
pub use markings::{Marker, Markings};
pub use registry::{ItemId, ItemRegistry, ManagedItem, RegistryBuilder, RegistryId, Slot};
pub use set::{ItemSet, Iter};

/// Number of item slots held by one bitmap word.
pub const BITS_PER_WORD: u32 = u64::BITS;
