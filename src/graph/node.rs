//! Entity type and related structures.
//!
//! Entities are the cells or colonies of the lineage forest. Each entity has:
//! - A stable arena handle (`EntityId`) plus its external string id
//! - Birth frame and optional death frame
//! - At most one parent
//! - An ordered child list that is either displayed or collapsed

use std::fmt;

/// Stable entity handle into the store's arena.
///
/// Handles are only meaningful for the store that issued them and are
/// invalidated by `LineageStore::clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create a new EntityId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Arena slot of this entity.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl From<u32> for EntityId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<EntityId> for u32 {
    #[inline]
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Whether an entity is an observed cell or the synthetic forest root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Cell,
    /// Parents every natural root; has no birth/death semantics and is never displayed.
    Virtual,
}

/// Child list of an entity, tagged with its display state.
///
/// `Expanded` children are traversed by layout; `Collapsed` children are kept
/// as a backup so a depth cut can be undone exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch {
    Expanded(Vec<EntityId>),
    Collapsed(Vec<EntityId>),
}

impl Default for Branch {
    fn default() -> Self {
        Branch::Expanded(Vec::new())
    }
}

impl Branch {
    /// Children that layout should descend into.
    pub fn displayed(&self) -> &[EntityId] {
        match self {
            Branch::Expanded(children) => children,
            Branch::Collapsed(_) => &[],
        }
    }

    /// Children removed by a depth cut (empty unless collapsed).
    pub fn pruned(&self) -> &[EntityId] {
        match self {
            Branch::Expanded(_) => &[],
            Branch::Collapsed(children) => children,
        }
    }

    /// All children regardless of display state.
    pub fn all(&self) -> &[EntityId] {
        match self {
            Branch::Expanded(children) | Branch::Collapsed(children) => children,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(self, Branch::Collapsed(_))
    }

    /// Append a child to the list, keeping the current display state.
    pub fn push(&mut self, child: EntityId) {
        match self {
            Branch::Expanded(children) | Branch::Collapsed(children) => children.push(child),
        }
    }

    /// Move displayed children into the backup. Returns true if anything moved.
    pub fn collapse(&mut self) -> bool {
        match self {
            Branch::Expanded(children) if !children.is_empty() => {
                *self = Branch::Collapsed(std::mem::take(children));
                true
            }
            _ => false,
        }
    }

    /// Bring backed-up children back into display. Returns true if anything moved.
    pub fn restore(&mut self) -> bool {
        match self {
            Branch::Collapsed(children) => {
                *self = Branch::Expanded(std::mem::take(children));
                true
            }
            Branch::Expanded(_) => false,
        }
    }
}

/// A cell or colony record.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// External identifier from the birth/death table.
    pub id: String,
    /// Frame the entity first appears in.
    pub birth: u32,
    /// Frame the entity disappears in; `None` while still alive at the end of observation.
    pub death: Option<u32>,
    pub kind: EntityKind,
    /// Back-reference; the parent owns this entity through its `branch`.
    pub parent: Option<EntityId>,
    pub branch: Branch,
}

impl Entity {
    /// Create an unlinked cell.
    pub fn cell(id: impl Into<String>, birth: u32, death: Option<u32>) -> Self {
        Self {
            id: id.into(),
            birth,
            death,
            kind: EntityKind::Cell,
            parent: None,
            branch: Branch::default(),
        }
    }

    /// Create the synthetic forest root.
    pub fn virtual_root() -> Self {
        Self {
            id: "*".into(),
            birth: 0,
            death: None,
            kind: EntityKind::Virtual,
            parent: None,
            branch: Branch::default(),
        }
    }

    #[inline]
    pub fn is_virtual(&self) -> bool {
        self.kind == EntityKind::Virtual
    }
}
