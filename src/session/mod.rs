//! LineageSession - the explicit context object behind the viewer.
//!
//! A session owns the loaded tables, the wired store, the forest index and
//! the last rendered view. Loading a table builds a fresh store and swaps it
//! in only on success, so a rejected file never disturbs what is on screen.
//! View requests from text inputs go through a [`Debouncer`]; clicks use
//! [`LineageSession::show_now`].

pub mod debounce;

pub use debounce::Debouncer;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::LineageConfig;
use crate::error::Result;
use crate::graph::{BirthDeathRecord, EntityId, Forest, LineageStore, RelationKind};
use crate::layout::{
    ClusterLayout, DepthBound, FocalSelector, HierarchyLayout, LineageView, Timeline,
    select_subtree,
};

/// A focal id and depth exactly as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    pub focal: String,
    pub depth: String,
}

impl ViewRequest {
    pub fn new(focal: impl Into<String>, depth: impl Into<String>) -> Self {
        Self {
            focal: focal.into(),
            depth: depth.into(),
        }
    }
}

/// Lineage neighbours of one entity, labelled by relation kind.
///
/// For division data the parent is the mother cell and the children are the
/// daughters. For fusion data the tree children are the merged cells (shown
/// as parents) and the tree parent is the resulting colony (shown as child).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityInfo {
    pub id: String,
    pub birth: u32,
    pub death: Option<u32>,
    pub kind: RelationKind,
    pub parents: Vec<String>,
    pub children: Vec<String>,
}

/// Owns all lineage state for one viewer.
pub struct LineageSession<L = ClusterLayout> {
    config: LineageConfig,
    layout: L,
    timeline: Timeline,
    records: Vec<BirthDeathRecord>,
    store: LineageStore,
    forest: Forest,
    kind: Option<RelationKind>,
    view: Option<LineageView>,
    debouncer: Debouncer<ViewRequest>,
}

impl LineageSession<ClusterLayout> {
    /// Create a session using the cluster dendrogram layout.
    pub fn new(config: LineageConfig) -> Result<Self> {
        let layout = ClusterLayout::new(config.cluster.clone());
        Self::with_layout(config, layout)
    }
}

impl<L: HierarchyLayout> LineageSession<L> {
    /// Create a session with a custom hierarchy layout.
    pub fn with_layout(config: LineageConfig, layout: L) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            timeline: Timeline::new(config.timeline.clone()),
            debouncer: Debouncer::new(config.debounce_ms),
            config,
            layout,
            records: Vec::new(),
            store: LineageStore::new(),
            forest: Forest::default(),
            kind: None,
            view: None,
        })
    }

    /// Drop every table and view.
    pub fn reset(&mut self) {
        self.records.clear();
        self.store.clear();
        self.forest = Forest::default();
        self.kind = None;
        self.view = None;
        self.debouncer.cancel();
        info!("session reset");
    }

    // =========================================================================
    // Ingest
    // =========================================================================

    /// Load a birth/death table. Any previously loaded relations are dropped
    /// since they referred to the old entity set.
    ///
    /// Returns the number of entities loaded.
    pub fn load_birth_death<S: AsRef<str>>(&mut self, rows: &[Vec<S>]) -> Result<usize> {
        let records = BirthDeathRecord::parse_rows(rows)?;
        let store = self.prepare(LineageStore::from_records(&records)?);

        self.forest = Forest::build(&store);
        self.store = store;
        self.records = records;
        self.kind = None;
        self.view = None;
        self.debouncer.cancel();

        info!(
            entities = self.records.len(),
            max_death = ?self.store.max_death(),
            "birth/death table loaded"
        );
        Ok(self.records.len())
    }

    /// Load a relation table against the current birth/death table.
    ///
    /// The store is rebuilt from the birth/death records, so loading a second
    /// relation table replaces the first. Returns the number of links wired.
    pub fn load_relations<S: AsRef<str>>(
        &mut self,
        rows: &[Vec<S>],
        kind: RelationKind,
    ) -> Result<usize> {
        let mut store = LineageStore::from_records(&self.records)?;
        let links = store.wire_relations(rows)?;
        let store = self.prepare(store);

        self.forest = Forest::build(&store);
        self.store = store;
        self.kind = Some(kind);
        self.view = None;
        self.debouncer.cancel();

        info!(
            %kind,
            links,
            trees = self.forest.natural_trees().len(),
            "relation table loaded"
        );
        Ok(links)
    }

    fn prepare(&self, mut store: LineageStore) -> LineageStore {
        if self.config.virtual_root {
            store.attach_virtual_root();
        }
        store
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Build and keep the view for a focal id and depth.
    ///
    /// On error the previous view stays in place.
    pub fn show(&mut self, focal: &str, depth: &str) -> Result<&LineageView> {
        let bound = depth
            .parse::<DepthBound>()
            .inspect_err(|e| warn!(error = %e, "rejected depth"))?;
        let selector = FocalSelector::parse(focal);
        let kind = self.relation_kind();

        let selection = select_subtree(
            &mut self.store,
            &self.forest,
            &self.layout,
            &selector,
            bound,
        )
        .inspect_err(|e| warn!(error = %e, "no lineage to show"))?;

        let view = self.timeline.compose(
            &mut self.store,
            &self.layout,
            &selection,
            kind,
            selector.label(),
        );
        debug!(
            focal = %view.focal,
            depth = %bound,
            nodes = view.nodes.len(),
            links = view.links.len(),
            "view updated"
        );
        let view: &LineageView = self.view.insert(view);
        Ok(view)
    }

    /// Show a view immediately, discarding any pending debounced request.
    pub fn show_now(&mut self, focal: &str, depth: &str) -> Result<&LineageView> {
        if self.debouncer.cancel().is_some() {
            debug!("pending request superseded");
        }
        self.show(focal, depth)
    }

    /// Queue a view request; it runs from [`poll`](Self::poll) once the
    /// input has been quiet for `debounce_ms`.
    pub fn request_view(&mut self, request: ViewRequest, now: f64) {
        self.debouncer.schedule(now, request);
    }

    /// Run the pending request if it is due.
    pub fn poll(&mut self, now: f64) -> Option<Result<&LineageView>> {
        let request = self.debouncer.poll(now)?;
        Some(self.show(&request.focal, &request.depth))
    }

    pub fn has_pending_request(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn view(&self) -> Option<&LineageView> {
        self.view.as_ref()
    }

    pub fn clear_view(&mut self) {
        self.view = None;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Birth, death and labelled neighbours of an entity.
    pub fn entity_info(&self, id: &str) -> Option<EntityInfo> {
        let handle = self.store.lookup(id)?;
        let entity = self.store.entity(handle);
        let kind = self.relation_kind();

        let parent: Vec<String> = self
            .store
            .real_parent(handle)
            .map(|p| self.store.entity(p).id.clone())
            .into_iter()
            .collect();
        let children = self.ids(entity.branch.all());

        let (parents, children) = match kind {
            RelationKind::Division => (parent, children),
            RelationKind::Fusion => (children, parent),
        };
        Some(EntityInfo {
            id: entity.id.clone(),
            birth: entity.birth,
            death: entity.death,
            kind,
            parents,
            children,
        })
    }

    fn ids(&self, list: &[EntityId]) -> Vec<String> {
        list.iter().map(|&c| self.store.entity(c).id.clone()).collect()
    }

    /// Relation kind of the loaded table; division until one is loaded.
    pub fn relation_kind(&self) -> RelationKind {
        self.kind.unwrap_or(RelationKind::Division)
    }

    pub fn has_relations(&self) -> bool {
        self.kind.is_some()
    }

    pub fn cell_count(&self) -> usize {
        self.store.cell_count()
    }

    /// Number of natural trees.
    pub fn tree_count(&self) -> usize {
        self.forest.natural_trees().len()
    }

    pub fn store(&self) -> &LineageStore {
        &self.store
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn config(&self) -> &LineageConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LineageError;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn example() -> LineageSession {
        let mut session = LineageSession::new(LineageConfig::default()).unwrap();
        session
            .load_birth_death(&rows(&[
                &["Cell ID", "Birth Frame", "Death Frame"],
                &["A", "0", "5"],
                &["B", "3", "9"],
                &["C", "9", "20"],
            ]))
            .unwrap();
        session
            .load_relations(&rows(&[&["1", "C", "A", "B"]]), RelationKind::Fusion)
            .unwrap();
        session
    }

    #[test]
    fn test_example_depth_zero() {
        let mut session = example();
        let view = session.show("C", "0").unwrap();
        assert_eq!(view.nodes.len(), 1);
        assert_eq!(view.nodes[0].pruned_children, vec!["A", "B"]);

        let c = session.store().lookup("C").unwrap();
        assert!(session.store().entity(c).branch.is_collapsed());
    }

    #[test]
    fn test_successive_views_do_not_compound() {
        let mut session = example();
        session.show("C", "0").unwrap();
        let view = session.show("C", "*").unwrap();
        assert_eq!(view.nodes.len(), 3);
    }

    #[test]
    fn test_errors_keep_previous_view() {
        let mut session = example();
        session.show("C", "*").unwrap();

        let err = session.show("Z", "1").unwrap_err();
        assert_eq!(err, LineageError::EntityNotFound("Z".into()));
        assert!(err.is_view_error());

        let err = session.show("C", "deep").unwrap_err();
        assert!(matches!(err, LineageError::InvalidDepth(_)));

        assert_eq!(session.view().unwrap().nodes.len(), 3);
    }

    #[test]
    fn test_failed_relation_load_is_transactional() {
        let mut session = example();
        session.show("C", "*").unwrap();

        let err = session
            .load_relations(&rows(&[&["2", "A", "Q"]]), RelationKind::Division)
            .unwrap_err();
        assert!(matches!(err, LineageError::UnknownEntity { .. }));
        assert_eq!(session.relation_kind(), RelationKind::Fusion);
        assert!(session.view().is_some());
        assert_eq!(session.tree_count(), 1);
    }

    #[test]
    fn test_debounced_request() {
        let mut session = example();
        session.request_view(ViewRequest::new("C", "0"), 0.0);
        session.request_view(ViewRequest::new("C", "*"), 500.0);
        assert!(session.poll(1000.0).is_none());

        let view = session.poll(1500.0).unwrap().unwrap();
        assert_eq!(view.nodes.len(), 3);
        assert!(!session.has_pending_request());
    }

    #[test]
    fn test_show_now_cancels_pending() {
        let mut session = example();
        session.request_view(ViewRequest::new("C", "0"), 0.0);
        session.show_now("A", "*").unwrap();
        assert!(session.poll(10_000.0).is_none());
        assert_eq!(session.view().unwrap().focal, "A");
    }

    #[test]
    fn test_entity_info_labels_fusion() {
        let session = example();
        let c = session.entity_info("C").unwrap();
        assert_eq!(c.parents, vec!["A", "B"]);
        assert!(c.children.is_empty());

        let a = session.entity_info("A").unwrap();
        assert_eq!(a.children, vec!["C"]);
        assert_eq!(a.death, Some(5));
        assert!(session.entity_info("*").is_none());
    }

    #[test]
    fn test_entity_info_labels_division() {
        let mut session = example();
        session
            .load_relations(&rows(&[&["1", "C", "A", "B"]]), RelationKind::Division)
            .unwrap();
        let c = session.entity_info("C").unwrap();
        assert_eq!(c.children, vec!["A", "B"]);
        assert!(c.parents.is_empty());
    }

    #[test]
    fn test_wildcard_without_virtual_root() {
        let config = LineageConfig {
            virtual_root: false,
            ..Default::default()
        };
        let mut session = LineageSession::new(config).unwrap();
        session.load_birth_death(&rows(&[&["A", "0", ""]])).unwrap();
        assert_eq!(
            session.show("*", "*").unwrap_err(),
            LineageError::EntityNotFound("*".into())
        );
        assert_eq!(session.show("A", "*").unwrap().nodes.len(), 1);
    }

    #[test]
    fn test_reset() {
        let mut session = example();
        session.show("C", "*").unwrap();
        session.reset();
        assert_eq!(session.cell_count(), 0);
        assert!(session.view().is_none());
        assert!(!session.has_relations());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = LineageConfig::default();
        config.timeline.bucket_width = 0;
        assert!(LineageSession::new(config).is_err());
    }
}
