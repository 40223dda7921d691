//! Knowledge Components
//!
//! The explorer's private beliefs about the cave. Built only from percepts
//! and direct contact, never from the hidden grid.

use bevy_ecs::prelude::*;
use cave_events::{Cell, Percept, Percepts};
use std::collections::BTreeSet;

/// Resource: belief sets keyed by cell
///
/// `visited` is always a subset of `safe`. `safe` and `danger` are not kept
/// disjoint: a cell inferred safe can later be contacted as a hazard and
/// then sits in both sets.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBase {
    size: usize,
    visited: BTreeSet<Cell>,
    safe: BTreeSet<Cell>,
    danger: BTreeSet<Cell>,
    beast_target: Option<Cell>,
}

impl KnowledgeBase {
    /// Fresh beliefs for a grid of `size`; the entrance is visited and safe.
    pub fn new(size: usize) -> Self {
        let mut knowledge = Self {
            size,
            visited: BTreeSet::new(),
            safe: BTreeSet::new(),
            danger: BTreeSet::new(),
            beast_target: None,
        };
        knowledge.record_visit(Cell::ENTRANCE);
        knowledge
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn visited(&self) -> &BTreeSet<Cell> {
        &self.visited
    }

    pub fn safe_cells(&self) -> &BTreeSet<Cell> {
        &self.safe
    }

    pub fn danger_cells(&self) -> &BTreeSet<Cell> {
        &self.danger
    }

    pub fn is_visited(&self, cell: Cell) -> bool {
        self.visited.contains(&cell)
    }

    pub fn is_safe(&self, cell: Cell) -> bool {
        self.safe.contains(&cell)
    }

    pub fn is_dangerous(&self, cell: Cell) -> bool {
        self.danger.contains(&cell)
    }

    /// Known safe and never contacted as a hazard.
    pub fn is_safe_step(&self, cell: Cell) -> bool {
        self.is_safe(cell) && !self.is_dangerous(cell)
    }

    /// The explorer has physically occupied `cell`.
    pub fn record_visit(&mut self, cell: Cell) {
        self.visited.insert(cell);
        self.safe.insert(cell);
    }

    /// Marks the neighbours of `cell` safe when no danger signal was sensed
    /// there. Any breeze, stench, pit or beast leaves them unclassified.
    ///
    /// Returns the number of cells newly marked safe.
    pub fn update_from_percepts(&mut self, cell: Cell, percepts: &Percepts) -> usize {
        if percepts.has_danger_signal() {
            return 0;
        }

        let mut added = 0;
        for neighbor in cell.neighbors(self.size) {
            if !self.visited.contains(&neighbor) && self.safe.insert(neighbor) {
                added += 1;
            }
        }
        added
    }

    /// The explorer was hurt by a pit or the beast at `cell`.
    pub fn record_danger(&mut self, cell: Cell) {
        self.danger.insert(cell);
    }

    /// Unvisited, not-known-dangerous cells adjacent to any safe cell.
    ///
    /// Recomputed from the other sets on every call.
    pub fn rebuild_frontier(&self) -> BTreeSet<Cell> {
        self.safe
            .iter()
            .flat_map(|cell| cell.neighbors(self.size))
            .filter(|cell| !self.visited.contains(cell) && !self.danger.contains(cell))
            .collect()
    }

    pub fn beast_target(&self) -> Option<Cell> {
        self.beast_target
    }

    pub fn set_beast_target(&mut self, cell: Cell) {
        self.beast_target = Some(cell);
    }

    pub fn clear_beast_target(&mut self) {
        self.beast_target = None;
    }

    /// Pins the beast down from a stench sensed at `cell`.
    ///
    /// If exactly one neighbour of `cell` is not yet known safe, the beast
    /// must be there. Ignored once a scream has been heard or a target is
    /// already remembered.
    pub fn locate_beast(&mut self, cell: Cell, percepts: &Percepts) -> Option<Cell> {
        if self.beast_target.is_some()
            || !percepts.contains(Percept::Stench)
            || percepts.contains(Percept::Scream)
        {
            return None;
        }

        let mut unknown = cell.neighbors(self.size).filter(|n| !self.is_safe(*n));
        let candidate = unknown.next()?;
        if unknown.next().is_some() {
            return None;
        }

        tracing::debug!(cell = %candidate, "stench pins the beast down");
        self.beast_target = Some(candidate);
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn percepts(list: &[Percept]) -> Percepts {
        list.iter().copied().collect()
    }

    #[test]
    fn test_new_knows_entrance() {
        let knowledge = KnowledgeBase::new(5);
        assert!(knowledge.is_visited(Cell::ENTRANCE));
        assert!(knowledge.is_safe(Cell::ENTRANCE));
        assert!(knowledge.danger_cells().is_empty());
        assert_eq!(knowledge.beast_target(), None);
    }

    #[test]
    fn test_quiet_cell_marks_neighbors_safe() {
        let mut knowledge = KnowledgeBase::new(5);
        let added = knowledge.update_from_percepts(Cell::ENTRANCE, &Percepts::new());

        assert_eq!(added, 2);
        assert!(knowledge.is_safe(Cell::new(0, 1)));
        assert!(knowledge.is_safe(Cell::new(1, 0)));
        assert!(!knowledge.is_visited(Cell::new(0, 1)));
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut knowledge = KnowledgeBase::new(5);
        knowledge.record_visit(Cell::new(2, 2));

        let quiet = percepts(&[Percept::Scream]);
        assert_eq!(knowledge.update_from_percepts(Cell::new(2, 2), &quiet), 4);
        let after_first = knowledge.safe_cells().clone();

        assert_eq!(knowledge.update_from_percepts(Cell::new(2, 2), &quiet), 0);
        assert_eq!(knowledge.safe_cells(), &after_first);
    }

    #[test]
    fn test_danger_signal_leaves_neighbors_unclassified() {
        for signal in [Percept::Breeze, Percept::Stench, Percept::Pit, Percept::Beast] {
            let mut knowledge = KnowledgeBase::new(5);
            let added = knowledge.update_from_percepts(Cell::ENTRANCE, &percepts(&[signal]));
            assert_eq!(added, 0);
            assert!(!knowledge.is_safe(Cell::new(0, 1)));
            assert!(!knowledge.is_dangerous(Cell::new(0, 1)));
        }
    }

    #[test]
    fn test_frontier() {
        let mut knowledge = KnowledgeBase::new(5);
        let frontier = knowledge.rebuild_frontier();
        assert_eq!(
            frontier.into_iter().collect::<Vec<_>>(),
            vec![Cell::new(0, 1), Cell::new(1, 0)]
        );

        knowledge.record_visit(Cell::new(0, 1));
        knowledge.record_danger(Cell::new(1, 0));
        let frontier = knowledge.rebuild_frontier();
        assert_eq!(
            frontier.into_iter().collect::<Vec<_>>(),
            vec![Cell::new(0, 2), Cell::new(1, 1)]
        );
    }

    #[test]
    fn test_frontier_includes_inferred_safe_cells() {
        let mut knowledge = KnowledgeBase::new(5);
        knowledge.update_from_percepts(Cell::ENTRANCE, &Percepts::new());

        // Inferred-safe but unvisited cells are both frontier and frontier sources
        let frontier = knowledge.rebuild_frontier();
        assert!(frontier.contains(&Cell::new(0, 1)));
        assert!(frontier.contains(&Cell::new(0, 2)));
        assert!(frontier.contains(&Cell::new(1, 1)));
        assert!(!frontier.contains(&Cell::ENTRANCE));
    }

    #[test]
    fn test_safe_then_dangerous_keeps_both() {
        let mut knowledge = KnowledgeBase::new(5);
        knowledge.update_from_percepts(Cell::ENTRANCE, &Percepts::new());
        knowledge.record_visit(Cell::new(0, 1));
        knowledge.record_danger(Cell::new(0, 1));

        assert!(knowledge.is_safe(Cell::new(0, 1)));
        assert!(knowledge.is_dangerous(Cell::new(0, 1)));
        assert!(!knowledge.is_safe_step(Cell::new(0, 1)));
        assert!(knowledge.visited().is_subset(knowledge.safe_cells()));
    }

    #[test]
    fn test_locate_beast_single_candidate() {
        let mut knowledge = KnowledgeBase::new(5);
        // Corner cell (0, 0) has neighbours (1, 0) and (0, 1); make one safe
        knowledge.record_visit(Cell::new(1, 0));

        let found = knowledge.locate_beast(Cell::ENTRANCE, &percepts(&[Percept::Stench]));
        assert_eq!(found, Some(Cell::new(0, 1)));
        assert_eq!(knowledge.beast_target(), Some(Cell::new(0, 1)));
    }

    #[test]
    fn test_locate_beast_ambiguous_or_silenced() {
        let mut knowledge = KnowledgeBase::new(5);
        let stench = percepts(&[Percept::Stench]);
        assert_eq!(knowledge.locate_beast(Cell::ENTRANCE, &stench), None);

        knowledge.record_visit(Cell::new(1, 0));
        let after_scream = percepts(&[Percept::Stench, Percept::Scream]);
        assert_eq!(knowledge.locate_beast(Cell::ENTRANCE, &after_scream), None);

        assert_eq!(knowledge.locate_beast(Cell::ENTRANCE, &Percepts::new()), None);
        assert_eq!(knowledge.beast_target(), None);
    }

    #[test]
    fn test_beast_target_set_and_clear() {
        let mut knowledge = KnowledgeBase::new(5);
        knowledge.set_beast_target(Cell::new(3, 3));
        assert_eq!(knowledge.beast_target(), Some(Cell::new(3, 3)));

        // An existing target is not overwritten by inference
        knowledge.record_visit(Cell::new(1, 0));
        assert_eq!(
            knowledge.locate_beast(Cell::ENTRANCE, &percepts(&[Percept::Stench])),
            None
        );

        knowledge.clear_beast_target();
        assert_eq!(knowledge.beast_target(), None);
    }
}
