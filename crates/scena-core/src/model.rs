//! Scene model: the ordered tree of elements that makes up the document.
//!
//! Nodes live in a `StableDiGraph` arena; containment edges point
//! parent → child and the sibling order of each parent is kept explicitly in
//! `child_order`, because that order is the z-order and the serialization
//! order. Two side indexes (id → node, live handle → node) make lookups O(1).
//! Every mutator updates the arena and both indexes before returning, so no
//! caller can observe a half-applied batch.

use crate::error::{SceneError, SceneResult};
use crate::frame::Frame;
use crate::id::{ElementHandle, ElementId};
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

// ─── Element data ────────────────────────────────────────────────────────

/// Inner content of an element. HTML and text are mutually exclusive:
/// content-editable elements carry text, everything else carries markup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Content {
    #[default]
    None,
    Html(String),
    Text(String),
}

impl Content {
    pub fn inner_html(&self) -> Option<&str> {
        match self {
            Self::Html(s) => Some(s),
            _ => None,
        }
    }

    pub fn inner_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One element in the arena. Children are not stored here; see
/// [`Scene::children_of`].
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub id: ElementId,
    pub name: String,
    pub tag_name: String,
    pub attrs: BTreeMap<String, String>,
    pub component_id: Option<String>,
    pub jsx_id: Option<String>,
    pub content: Content,
    /// Frame the element was materialized with. The live frame belongs to
    /// the transform store.
    pub frame: Frame,
    pub el: Option<ElementHandle>,
}

impl ElementNode {
    pub fn is_content_editable(&self) -> bool {
        is_content_editable(&self.attrs)
    }
}

pub fn is_content_editable(attrs: &BTreeMap<String, String>) -> bool {
    attrs
        .get("contenteditable")
        .is_some_and(|v| v != "false")
}

/// Input shape for inserting elements. A fresh id is assigned when `id` is
/// `None` or already taken. `el` is the host's handle for the live element,
/// if it already has one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementDescriptor {
    pub id: Option<ElementId>,
    pub el: Option<ElementHandle>,
    pub name: String,
    pub tag_name: String,
    pub attrs: BTreeMap<String, String>,
    pub component_id: Option<String>,
    pub jsx_id: Option<String>,
    pub content: Content,
    pub frame: Frame,
    pub children: Vec<ElementDescriptor>,
}

impl ElementDescriptor {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn with_handle(mut self, el: ElementHandle) -> Self {
        self.el = Some(el);
        self
    }

    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    #[must_use]
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: Content) -> Self {
        self.content = content;
        self
    }

    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: ElementDescriptor) -> Self {
        self.children.push(child);
        self
    }
}

impl From<&ElementInfo> for ElementDescriptor {
    fn from(info: &ElementInfo) -> Self {
        Self {
            id: Some(info.id),
            el: info.el,
            name: info.name.clone(),
            tag_name: info.tag_name.clone(),
            attrs: info.attrs.clone(),
            component_id: info.component_id.clone(),
            jsx_id: info.jsx_id.clone(),
            content: info.content.clone(),
            frame: info.frame.clone(),
            children: info.children.iter().map(ElementDescriptor::from).collect(),
        }
    }
}

/// A captured subtree: everything needed to put it back exactly where it
/// was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    pub id: ElementId,
    pub name: String,
    pub tag_name: String,
    pub attrs: BTreeMap<String, String>,
    pub component_id: Option<String>,
    pub jsx_id: Option<String>,
    pub content: Content,
    pub frame: Frame,
    pub children: Vec<ElementInfo>,
    pub scope_id: ElementId,
    /// Sibling position inside `scope_id` when captured.
    pub index: usize,
    #[serde(skip)]
    pub el: Option<ElementHandle>,
}

impl ElementInfo {
    /// Ids of this subtree in pre-order.
    pub fn ids(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        self.walk(&mut |info| out.push(info.id));
        out
    }

    pub fn walk(&self, f: &mut impl FnMut(&ElementInfo)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut ElementInfo)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }
}

// ─── Moves ───────────────────────────────────────────────────────────────

/// A position in the tree: `index` among the children of `scope_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTarget {
    pub id: ElementId,
    pub scope_id: ElementId,
    pub index: usize,
}

/// Positions of the moved nodes before and after a batch move.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MoveResult {
    pub moved: Vec<ElementId>,
    pub prev: Vec<MoveTarget>,
    pub next: Vec<MoveTarget>,
}

// ─── Scene ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Scene {
    pub graph: StableDiGraph<ElementNode, ()>,
    pub root: NodeIndex,
    id_index: HashMap<ElementId, NodeIndex>,
    handle_index: HashMap<ElementHandle, NodeIndex>,
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene with only the root scope.
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root_id = ElementId::root();
        let root = graph.add_node(ElementNode {
            id: root_id,
            name: "root".to_string(),
            tag_name: "div".to_string(),
            attrs: BTreeMap::new(),
            component_id: None,
            jsx_id: None,
            content: Content::None,
            frame: Frame::new(),
            el: None,
        });
        let mut id_index = HashMap::new();
        id_index.insert(root_id, root);
        Self {
            graph,
            root,
            id_index,
            handle_index: HashMap::new(),
            child_order: HashMap::new(),
        }
    }

    /// Number of elements, excluding the root.
    pub fn len(&self) -> usize {
        self.id_index.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ─── Lookup ──────────────────────────────────────────────────────────

    pub fn contains(&self, id: ElementId) -> bool {
        self.id_index.contains_key(&id)
    }

    pub fn index_of(&self, id: ElementId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementNode> {
        self.index_of(id).map(|idx| &self.graph[idx])
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut ElementNode> {
        self.index_of(id).map(|idx| &mut self.graph[idx])
    }

    /// Resolve a live element handle back to its id.
    pub fn id_of_handle(&self, handle: ElementHandle) -> Option<ElementId> {
        self.handle_index.get(&handle).map(|idx| self.graph[*idx].id)
    }

    pub fn handle_of(&self, id: ElementId) -> Option<ElementHandle> {
        self.get(id).and_then(|n| n.el)
    }

    /// Attach the host's live handle to an element, replacing any previous
    /// one.
    ///
    /// # Errors
    /// `NotFound` if the element does not exist; `InvalidHandle` if another
    /// element already holds `handle`.
    pub fn bind_handle(&mut self, id: ElementId, handle: ElementHandle) -> SceneResult<()> {
        let idx = self.index_of(id).ok_or(SceneError::NotFound(id))?;
        match self.handle_index.get(&handle) {
            Some(owner) if *owner != idx => return Err(SceneError::InvalidHandle(handle)),
            _ => {}
        }
        if let Some(old) = self.graph[idx].el.replace(handle) {
            self.handle_index.remove(&old);
        }
        self.handle_index.insert(handle, idx);
        Ok(())
    }

    fn parent_idx(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    fn child_indices(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.child_order.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parent of `id`; top-level elements report the root id.
    pub fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        let idx = self.index_of(id)?;
        self.parent_idx(idx).map(|p| self.graph[p].id)
    }

    /// Children of `id` in z-order. Use [`ElementId::root`] for the top level.
    pub fn children_of(&self, id: ElementId) -> Vec<ElementId> {
        self.index_of(id)
            .map(|idx| {
                self.child_indices(idx)
                    .iter()
                    .map(|c| self.graph[*c].id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Scope and sibling index of `id`.
    pub fn position(&self, id: ElementId) -> Option<(ElementId, usize)> {
        let idx = self.index_of(id)?;
        let parent = self.parent_idx(idx)?;
        let pos = self.child_indices(parent).iter().position(|c| *c == idx)?;
        Some((self.graph[parent].id, pos))
    }

    pub fn next_sibling(&self, id: ElementId) -> Option<ElementId> {
        let (scope, pos) = self.position(id)?;
        self.children_of(scope).get(pos + 1).copied()
    }

    pub fn prev_sibling(&self, id: ElementId) -> Option<ElementId> {
        let (scope, pos) = self.position(id)?;
        pos.checked_sub(1)
            .and_then(|p| self.children_of(scope).get(p).copied())
    }

    pub fn last_child(&self, scope: ElementId) -> Option<ElementId> {
        self.children_of(scope).last().copied()
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: ElementId, descendant: ElementId) -> bool {
        if ancestor == descendant {
            return false;
        }
        let mut current = match self.index_of(descendant) {
            Some(idx) => idx,
            None => return false,
        };
        while let Some(parent) = self.parent_idx(current) {
            if self.graph[parent].id == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }

    /// Drop unknown ids, duplicates, and any id that has an ancestor in the
    /// set. Order is preserved.
    pub fn filter_descendants(&self, ids: &[ElementId]) -> Vec<ElementId> {
        let mut seen = HashSet::new();
        let known: Vec<ElementId> = ids
            .iter()
            .copied()
            .filter(|id| self.contains(*id) && !id.is_root() && seen.insert(*id))
            .collect();
        known
            .iter()
            .copied()
            .filter(|id| !known.iter().any(|other| self.is_ancestor_of(*other, *id)))
            .collect()
    }

    /// Sibling-index path from the root to `id`.
    pub fn path_of(&self, id: ElementId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = id;
        while !current.is_root() {
            let (scope, pos) = self.position(current)?;
            path.push(pos);
            current = scope;
        }
        path.reverse();
        Some(path)
    }

    /// Index paths of `ids`, sorted in document order. Unknown ids are
    /// skipped.
    pub fn sorted_indexes_list(&self, ids: &[ElementId]) -> Vec<Vec<usize>> {
        let mut list: Vec<Vec<usize>> = ids.iter().filter_map(|id| self.path_of(*id)).collect();
        list.sort();
        list.dedup();
        list
    }

    /// Element at an index path.
    pub fn info_by_indexes(&self, path: &[usize]) -> Option<ElementId> {
        let mut current = self.root;
        for &pos in path {
            current = *self.child_indices(current).get(pos)?;
        }
        (current != self.root).then(|| self.graph[current].id)
    }

    /// `ids` sorted in document order.
    pub fn document_order(&self, ids: &[ElementId]) -> Vec<ElementId> {
        self.sorted_indexes_list(ids)
            .iter()
            .filter_map(|path| self.info_by_indexes(path))
            .collect()
    }

    /// Every element id in pre-order.
    pub fn all_ids(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<NodeIndex> =
            self.child_indices(self.root).iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            out.push(self.graph[idx].id);
            stack.extend(self.child_indices(idx).iter().rev().copied());
        }
        out
    }

    /// Capture the subtree rooted at `id`.
    pub fn info(&self, id: ElementId) -> Option<ElementInfo> {
        let idx = self.index_of(id)?;
        if idx == self.root {
            return None;
        }
        Some(self.capture(idx))
    }

    /// Capture every top-level subtree.
    pub fn infos(&self) -> Vec<ElementInfo> {
        self.child_indices(self.root)
            .iter()
            .map(|idx| self.capture(*idx))
            .collect()
    }

    fn capture(&self, idx: NodeIndex) -> ElementInfo {
        let node = &self.graph[idx];
        let (scope_id, index) = self.position(node.id).unwrap_or((ElementId::root(), 0));
        ElementInfo {
            id: node.id,
            name: node.name.clone(),
            tag_name: node.tag_name.clone(),
            attrs: node.attrs.clone(),
            component_id: node.component_id.clone(),
            jsx_id: node.jsx_id.clone(),
            content: node.content.clone(),
            frame: node.frame.clone(),
            children: self
                .child_indices(idx)
                .iter()
                .map(|c| self.capture(*c))
                .collect(),
            scope_id,
            index,
            el: node.el,
        }
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Insert `descriptors` as children of `scope` (root when `None`),
    /// starting at `insert_index` (end when `None`, clamped otherwise).
    ///
    /// # Errors
    /// `InvalidScope` if `scope` does not exist; nothing is inserted.
    pub fn append_nodes(
        &mut self,
        descriptors: Vec<ElementDescriptor>,
        insert_index: Option<usize>,
        scope: Option<ElementId>,
    ) -> SceneResult<Vec<ElementInfo>> {
        let scope = scope.unwrap_or_else(ElementId::root);
        let parent = self.index_of(scope).ok_or(SceneError::InvalidScope(scope))?;
        let len = self.child_indices(parent).len();
        let start = insert_index.map_or(len, |i| i.min(len));

        let mut added = Vec::with_capacity(descriptors.len());
        for (offset, desc) in descriptors.into_iter().enumerate() {
            let idx = self.insert_subtree(parent, start + offset, desc);
            added.push(idx);
        }
        Ok(added.into_iter().map(|idx| self.capture(idx)).collect())
    }

    /// Put captured subtrees back at their recorded scope and index, keeping
    /// their ids. Infos whose scope is gone or whose id is taken are
    /// skipped.
    pub fn restore_nodes(&mut self, infos: &[ElementInfo]) -> Vec<ElementInfo> {
        let mut ordered: Vec<&ElementInfo> = infos.iter().collect();
        // Ascending index per scope so each lands exactly at its recorded slot.
        ordered.sort_by_key(|info| info.index);

        let mut restored = Vec::with_capacity(infos.len());
        for info in ordered {
            let Some(parent) = self.index_of(info.scope_id) else {
                log::warn!("restore {}: scope {} is gone", info.id, info.scope_id);
                continue;
            };
            if info.ids().iter().any(|id| self.contains(*id)) {
                log::warn!("restore {}: id already present", info.id);
                continue;
            }
            restored.push(self.insert_subtree(parent, info.index, ElementDescriptor::from(info)));
        }
        restored.into_iter().map(|idx| self.capture(idx)).collect()
    }

    fn insert_subtree(
        &mut self,
        parent: NodeIndex,
        index: usize,
        desc: ElementDescriptor,
    ) -> NodeIndex {
        let id = match desc.id {
            Some(id) if !self.contains(id) && !id.is_root() => id,
            _ => ElementId::generate(),
        };
        let el = desc.el.filter(|handle| {
            let free = !self.handle_index.contains_key(handle);
            if !free {
                log::warn!("insert {id}: handle {handle:?} is already bound");
            }
            free
        });

        let node = ElementNode {
            id,
            name: desc.name,
            tag_name: desc.tag_name,
            attrs: desc.attrs,
            component_id: desc.component_id,
            jsx_id: desc.jsx_id,
            content: desc.content,
            frame: desc.frame,
            el,
        };
        let idx = self.graph.add_node(node);
        self.id_index.insert(id, idx);
        if let Some(handle) = el {
            self.handle_index.insert(handle, idx);
        }
        self.attach(parent, idx, index);

        for (i, child) in desc.children.into_iter().enumerate() {
            self.insert_subtree(idx, i, child);
        }
        idx
    }

    fn attach(&mut self, parent: NodeIndex, child: NodeIndex, index: usize) {
        self.graph.add_edge(parent, child, ());
        let order = self.child_order.entry(parent).or_default();
        let index = index.min(order.len());
        order.insert(index, child);
    }

    fn detach(&mut self, child: NodeIndex) {
        if let Some(parent) = self.parent_idx(child) {
            if let Some(edge) = self.graph.find_edge(parent, child) {
                self.graph.remove_edge(edge);
            }
            if let Some(order) = self.child_order.get_mut(&parent) {
                order.retain(|c| *c != child);
            }
        }
    }

    /// Remove the named elements and their subtrees.
    ///
    /// Returns the removed subtrees in document order, captured before
    /// detachment. Unknown ids and ids nested under another removed id are
    /// skipped.
    pub fn remove_nodes(&mut self, ids: &[ElementId]) -> Vec<ElementInfo> {
        for id in ids {
            if !self.contains(*id) {
                log::warn!("remove: unknown element {id}");
            }
        }
        let targets = self.document_order(&self.filter_descendants(ids));
        let removed: Vec<ElementInfo> = targets
            .iter()
            .filter_map(|id| self.info(*id))
            .collect();

        for id in targets.iter().rev() {
            if let Some(idx) = self.index_of(*id) {
                self.detach(idx);
                self.drop_subtree(idx);
            }
        }
        removed
    }

    fn drop_subtree(&mut self, idx: NodeIndex) {
        let children = self.child_order.remove(&idx).unwrap_or_default();
        for child in children {
            self.drop_subtree(child);
        }
        if let Some(node) = self.graph.remove_node(idx) {
            self.id_index.remove(&node.id);
            if let Some(handle) = node.el {
                self.handle_index.remove(&handle);
            }
        }
    }

    /// Which element should be selected after removing `ids`: the next
    /// sibling of the last removed element (document order), else its
    /// previous sibling, else its parent. Siblings that are themselves being
    /// removed are passed over; the root is never returned.
    pub fn selection_after_removal(&self, ids: &[ElementId]) -> Option<ElementId> {
        let targets = self.document_order(&self.filter_descendants(ids));
        let last = *targets.last()?;
        let removing = |id: ElementId| {
            targets
                .iter()
                .any(|t| *t == id || self.is_ancestor_of(*t, id))
        };
        let (scope, pos) = self.position(last)?;
        let siblings = self.children_of(scope);

        siblings[pos + 1..]
            .iter()
            .copied()
            .find(|id| !removing(*id))
            .or_else(|| siblings[..pos].iter().rev().copied().find(|id| !removing(*id)))
            .or_else(|| (!scope.is_root() && !removing(scope)).then_some(scope))
    }

    /// Re-parent and reorder a batch of elements in one step.
    ///
    /// All moved elements are detached first, then inserted in ascending
    /// target index, so every element ends exactly at its requested index
    /// (clamped). Unknown ids are skipped.
    ///
    /// # Errors
    /// `InvalidScope` if a target scope does not exist or the batch would
    /// put an element inside itself; nothing is moved.
    pub fn move_nodes(&mut self, moves: &[MoveTarget]) -> SceneResult<MoveResult> {
        let mut seen = HashSet::new();
        let moves: Vec<MoveTarget> = moves
            .iter()
            .filter(|m| {
                let known = self.contains(m.id) && !m.id.is_root();
                if !known {
                    log::warn!("move: unknown element {}", m.id);
                }
                known && seen.insert(m.id)
            })
            .copied()
            .collect();

        // Validate the whole batch against the post-move parent map.
        let new_parent: HashMap<ElementId, ElementId> =
            moves.iter().map(|m| (m.id, m.scope_id)).collect();
        for m in &moves {
            if !self.contains(m.scope_id) {
                return Err(SceneError::InvalidScope(m.scope_id));
            }
            let mut current = m.scope_id;
            let mut steps = 0;
            while !current.is_root() {
                if current == m.id || steps > self.len() {
                    return Err(SceneError::InvalidScope(m.scope_id));
                }
                current = match new_parent.get(&current) {
                    Some(p) => *p,
                    None => self.parent_of(current).unwrap_or_else(ElementId::root),
                };
                steps += 1;
            }
        }

        let ids: Vec<ElementId> = moves.iter().map(|m| m.id).collect();
        let prev: Vec<MoveTarget> = self
            .document_order(&ids)
            .into_iter()
            .filter_map(|id| {
                self.position(id)
                    .map(|(scope_id, index)| MoveTarget { id, scope_id, index })
            })
            .collect();

        for m in &moves {
            if let Some(idx) = self.index_of(m.id) {
                self.detach(idx);
            }
        }
        let mut ordered = moves.clone();
        ordered.sort_by_key(|m| m.index);
        for m in &ordered {
            if let (Some(parent), Some(child)) = (self.index_of(m.scope_id), self.index_of(m.id)) {
                self.attach(parent, child, m.index);
            }
        }

        let next: Vec<MoveTarget> = self
            .document_order(&ids)
            .into_iter()
            .filter_map(|id| {
                self.position(id)
                    .map(|(scope_id, index)| MoveTarget { id, scope_id, index })
            })
            .collect();

        Ok(MoveResult {
            moved: next.iter().map(|m| m.id).collect(),
            prev,
            next,
        })
    }

    /// Replace the content of an element with `text`, returning the previous
    /// content whatever its kind.
    pub fn set_text(&mut self, id: ElementId, text: &str) -> SceneResult<Content> {
        self.set_content(id, Content::Text(text.to_string()))
    }

    /// Replace the content of an element, returning the previous content.
    pub fn set_content(&mut self, id: ElementId, content: Content) -> SceneResult<Content> {
        let node = self.get_mut(id).ok_or(SceneError::NotFound(id))?;
        Ok(std::mem::replace(&mut node.content, content))
    }

    /// Record the frame an element should be captured with.
    pub fn set_frame_snapshot(&mut self, id: ElementId, frame: Frame) -> SceneResult<()> {
        let node = self.get_mut(id).ok_or(SceneError::NotFound(id))?;
        node.frame = frame;
        Ok(())
    }
}
