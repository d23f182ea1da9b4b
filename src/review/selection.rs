use crate::core::transaction::TransactionId;
use log::debug;
use std::collections::BTreeSet;

/// Identifiers the employee has ticked for a batch action.
///
/// The set knows nothing about the store. Keeping it a subset of the
/// visible set is done by calling [`SelectionSet::reconcile`] with the
/// new visible ids every time they are recomputed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<TransactionId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &TransactionId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    /// Select exactly `visible`, unless that is already the selection, in
    /// which case clear it.
    pub fn select_all(&mut self, visible: &[TransactionId]) {
        if self.equals(visible) {
            self.clear_all();
        } else {
            self.ids = visible.iter().cloned().collect();
        }
    }

    pub fn clear_all(&mut self) {
        self.ids.clear();
    }

    /// Drop every id that is not in `visible`. Never adds. Returns the
    /// number of ids pruned.
    pub fn reconcile(&mut self, visible: &[TransactionId]) -> usize {
        let before = self.ids.len();
        let keep: BTreeSet<&TransactionId> = visible.iter().collect();
        self.ids.retain(|id| keep.contains(id));
        let pruned = before - self.ids.len();
        if pruned > 0 {
            debug!("selection: pruned {} id(s) no longer visible", pruned);
        }
        pruned
    }

    /// True when the selection is exactly the given set of ids.
    pub fn equals(&self, ids: &[TransactionId]) -> bool {
        let other: BTreeSet<&TransactionId> = ids.iter().collect();
        other.len() == self.ids.len() && self.ids.iter().all(|id| other.contains(id))
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.ids.contains(id)
    }

    pub fn is_subset_of(&self, ids: &[TransactionId]) -> bool {
        let other: BTreeSet<&TransactionId> = ids.iter().collect();
        self.ids.iter().all(|id| other.contains(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransactionId> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
