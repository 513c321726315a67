//! LineageStore - entity arena and relation wiring.
//!
//! The store owns every entity in a flat arena. Parent and child links are
//! arena handles, so the back-reference from a child to its parent never
//! forms an ownership cycle. Relation rows are wired in one pass; a
//! union-find over the arena slots rejects rows that would close a cycle.

use std::collections::HashMap;

use petgraph::unionfind::UnionFind;
use tracing::{debug, info, warn};

use super::edge::RelationRow;
use super::node::{Branch, Entity, EntityId};
use super::record::BirthDeathRecord;
use crate::error::{LineageError, Result};

/// The entity store.
///
/// This struct manages:
/// - The entity arena (cells plus the optional virtual root)
/// - Mapping from external string ids to arena handles
/// - The observed end frame (largest death frame)
#[derive(Debug, Clone, Default)]
pub struct LineageStore {
    entities: Vec<Entity>,

    /// External id -> arena handle. The virtual root is not indexed.
    id_to_entity: HashMap<String, EntityId>,

    virtual_root: Option<EntityId>,

    /// Largest death frame seen.
    max_death: Option<u32>,
}

impl LineageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one unlinked cell per record.
    pub fn from_records(records: &[BirthDeathRecord]) -> Result<Self> {
        let mut store = Self {
            entities: Vec::with_capacity(records.len() + 1),
            id_to_entity: HashMap::with_capacity(records.len()),
            virtual_root: None,
            max_death: None,
        };
        for (row, record) in records.iter().enumerate() {
            if store.id_to_entity.contains_key(&record.id) {
                return Err(LineageError::InvalidRecord {
                    row,
                    reason: format!("duplicate entity id '{}'", record.id),
                });
            }
            store.insert_cell(Entity::cell(record.id.clone(), record.birth, record.death));
        }
        Ok(store)
    }

    fn insert_cell(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        if let Some(death) = entity.death {
            self.max_death = Some(self.max_death.map_or(death, |m| m.max(death)));
        }
        self.id_to_entity.insert(entity.id.clone(), id);
        self.entities.push(entity);
        id
    }

    // =========================================================================
    // Relation Builder
    // =========================================================================

    /// Wire parent/child links from tokenized relation rows.
    ///
    /// Each row `[event, parent, child_1, ..., child_k]` appends the children
    /// to the parent's child list (in row order) and sets their parent link.
    /// Returns the number of links created.
    ///
    /// Links from earlier calls are kept and take part in cycle detection.
    /// Any unknown id, second parent, or cycle aborts with an error; the
    /// store may then be partially wired and should be discarded.
    pub fn wire_relations<S: AsRef<str>>(&mut self, rows: &[Vec<S>]) -> Result<usize> {
        let mut components = self.components();
        let mut links = 0;

        for (row_index, cells) in rows.iter().enumerate() {
            let Some(row) = RelationRow::parse(cells) else {
                continue;
            };

            let parent = self.require(row.parent, row_index)?;
            for child_id in &row.children {
                let child = self.require(child_id, row_index)?;

                if let Some(existing) = self.entities[child.index()].parent {
                    if existing == parent {
                        warn!(row = row_index, child = child_id, "duplicate relation ignored");
                        continue;
                    }
                    return Err(LineageError::ConflictingParent {
                        child: child_id.to_string(),
                        existing: self.entities[existing.index()].id.clone(),
                        attempted: row.parent.to_string(),
                    });
                }

                // The child is the root of its component; sharing a component
                // with the parent means it is already the parent's ancestor.
                if !components.union(parent.index(), child.index()) {
                    return Err(LineageError::CyclicRelation {
                        id: child_id.to_string(),
                    });
                }

                self.entities[parent.index()].branch.push(child);
                self.entities[child.index()].parent = Some(parent);
                links += 1;
            }
        }

        info!(rows = rows.len(), links, "relation table wired");
        Ok(links)
    }

    /// Union-find over the arena with every existing parent link merged.
    fn components(&self) -> UnionFind<usize> {
        let mut components = UnionFind::new(self.entities.len());
        for (index, entity) in self.entities.iter().enumerate() {
            if let Some(parent) = entity.parent {
                components.union(parent.index(), index);
            }
        }
        components
    }

    fn require(&self, id: &str, row: usize) -> Result<EntityId> {
        self.lookup(id).ok_or_else(|| LineageError::UnknownEntity {
            id: id.to_string(),
            row,
        })
    }

    /// Create the virtual root and attach every natural root under it.
    ///
    /// Idempotent: a second call returns the existing root.
    pub fn attach_virtual_root(&mut self) -> EntityId {
        if let Some(root) = self.virtual_root {
            return root;
        }

        let natural_roots = self.natural_roots();
        let root = EntityId(self.entities.len() as u32);
        let mut entity = Entity::virtual_root();
        entity.branch = Branch::Expanded(natural_roots.clone());
        self.entities.push(entity);

        for &child in &natural_roots {
            self.entities[child.index()].parent = Some(root);
        }
        self.virtual_root = Some(root);
        debug!(roots = natural_roots.len(), "virtual root attached");
        root
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Arena handle for an external id.
    pub fn lookup(&self, id: &str) -> Option<EntityId> {
        self.id_to_entity.get(id).copied()
    }

    /// Entity by handle.
    ///
    /// Panics if the handle was not issued by this store.
    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.index()]
    }

    pub fn virtual_root(&self) -> Option<EntityId> {
        self.virtual_root
    }

    pub fn is_virtual(&self, id: EntityId) -> bool {
        self.virtual_root == Some(id)
    }

    /// Number of real cells (the virtual root excluded).
    pub fn cell_count(&self) -> usize {
        self.id_to_entity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Handles of all real cells in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = EntityId> + '_ {
        (0..self.entities.len() as u32)
            .map(EntityId)
            .filter(|&id| !self.is_virtual(id))
    }

    /// Largest death frame in the birth/death table.
    pub fn max_death(&self) -> Option<u32> {
        self.max_death
    }

    /// Parent link, ignoring the virtual root.
    pub fn real_parent(&self, id: EntityId) -> Option<EntityId> {
        self.entity(id).parent.filter(|&p| !self.is_virtual(p))
    }

    /// Cells with no real parent, in insertion order.
    pub fn natural_roots(&self) -> Vec<EntityId> {
        self.cells()
            .filter(|&id| self.real_parent(id).is_none())
            .collect()
    }

    /// Topmost real ancestor of a cell (the cell itself for a natural root).
    /// The virtual root maps to itself.
    pub fn tree_root(&self, id: EntityId) -> EntityId {
        let mut current = id;
        while let Some(parent) = self.real_parent(current) {
            current = parent;
        }
        current
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Pre-order traversal over displayed children.
    pub fn displayed_subtree(&self, root: EntityId) -> Vec<EntityId> {
        self.preorder(root, |e| e.branch.displayed())
    }

    /// Pre-order traversal over all children, collapsed or not.
    pub fn full_subtree(&self, root: EntityId) -> Vec<EntityId> {
        self.preorder(root, |e| e.branch.all())
    }

    fn preorder<'a>(
        &'a self,
        root: EntityId,
        children: impl Fn(&'a Entity) -> &'a [EntityId],
    ) -> Vec<EntityId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(children(self.entity(id)).iter().rev().copied());
        }
        order
    }

    // =========================================================================
    // Collapse / Restore
    // =========================================================================

    /// Hide the displayed children of an entity. Returns true if anything moved.
    pub fn collapse(&mut self, id: EntityId) -> bool {
        self.entities[id.index()].branch.collapse()
    }

    /// Show every collapsed branch in the store.
    pub fn restore_all(&mut self) -> usize {
        self.entities
            .iter_mut()
            .filter_map(|e| e.branch.restore().then_some(()))
            .count()
    }

    /// Drop all entities, resetting the store to its initial state.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.id_to_entity.clear();
        self.virtual_root = None;
        self.max_death = None;
    }
}
