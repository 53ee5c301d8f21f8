//! The set of selected elements.

use scena_core::{ElementId, Scene};
use smallvec::SmallVec;

/// Ordered selection. No member is a descendant of another member and every
/// member exists in the scene it was filtered against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: SmallVec<[ElementId; 4]>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    pub fn to_vec(&self) -> Vec<ElementId> {
        self.ids.to_vec()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    pub fn first(&self) -> Option<ElementId> {
        self.ids.first().copied()
    }

    /// Replace the selection with `candidates`, dropping unknown ids and
    /// descendants of other candidates. Returns whether it changed.
    pub fn replace(&mut self, scene: &Scene, candidates: &[ElementId]) -> bool {
        let next: SmallVec<[ElementId; 4]> = scene.filter_descendants(candidates).into();
        if next == self.ids {
            return false;
        }
        self.ids = next;
        true
    }

    /// Re-filter after the tree changed shape.
    pub fn refresh(&mut self, scene: &Scene) -> bool {
        let current = self.ids.to_vec();
        self.replace(scene, &current)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
