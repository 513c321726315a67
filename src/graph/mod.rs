//! Lineage data structures.
//!
//! Entities live in a flat arena owned by `LineageStore`; parent and child
//! links are arena handles. `Forest` indexes the trees formed once relation
//! rows have been wired.

mod edge;
mod forest;
mod node;
mod record;
mod store;

pub use edge::{RelationKind, RelationRow};
pub use forest::{Forest, Tree};
pub use node::{Branch, Entity, EntityId, EntityKind};
pub use record::BirthDeathRecord;
pub use store::LineageStore;
