//! Forest index over the wired store.

use tracing::debug;

use super::node::EntityId;
use super::store::LineageStore;

/// One tree of the forest, flattened in pre-order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub root: EntityId,
    pub members: Vec<EntityId>,
}

impl Tree {
    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Ordered set of trees: one per natural root, followed by the whole-forest
/// tree when the store has a virtual root.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    trees: Vec<Tree>,
    whole: Option<usize>,
}

impl Forest {
    /// Index every tree of a fully wired store.
    pub fn build(store: &LineageStore) -> Self {
        let mut trees: Vec<Tree> = store
            .natural_roots()
            .into_iter()
            .map(|root| Tree {
                root,
                members: store.full_subtree(root),
            })
            .collect();

        let whole = store.virtual_root().map(|root| {
            trees.push(Tree {
                root,
                members: store.full_subtree(root),
            });
            trees.len() - 1
        });

        debug!(trees = trees.len(), "forest indexed");
        Self { trees, whole }
    }

    /// Index of the first tree containing `id`, scanning in order.
    pub fn find_tree(&self, id: EntityId) -> Option<usize> {
        self.trees.iter().position(|tree| tree.contains(id))
    }

    /// Resolve an external id to its tree and handle. Unknown ids are a
    /// normal outcome and yield `None`.
    pub fn locate(&self, store: &LineageStore, id: &str) -> Option<(usize, EntityId)> {
        let entity = store.lookup(id)?;
        self.find_tree(entity).map(|tree| (tree, entity))
    }

    /// The whole-forest tree rooted at the virtual root, if any.
    pub fn whole_forest(&self) -> Option<&Tree> {
        self.whole.map(|i| &self.trees[i])
    }

    pub fn tree(&self, index: usize) -> Option<&Tree> {
        self.trees.get(index)
    }

    /// Natural-root trees only.
    pub fn natural_trees(&self) -> &[Tree] {
        match self.whole {
            Some(i) => &self.trees[..i],
            None => &self.trees,
        }
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
