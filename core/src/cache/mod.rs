//! Bounded inline caches.
//!
//! Caches are a performance path only: every lookup returns exactly what the
//! uncached path would.

pub mod chain;
pub mod elements;
pub mod names;

pub use chain::{Append, ChainArena, ChainHead};
pub use elements::{ElementReader, ElementSite, ShapeArena};
pub use names::{NameCache, NameRegistry, NameSite};
