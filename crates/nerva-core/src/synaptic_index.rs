// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Multi-key lookup over (source, target, position) connection triples.

use ahash::AHashMap;

/// Hash views over a projection's connections: non-unique by source neuron,
/// non-unique by target neuron, unique by position in the synapse sequence.
///
/// When current, the index holds exactly one triple per synapse.
#[derive(Debug, Clone, Default)]
pub struct SynapticIndex {
    by_source: AHashMap<u32, Vec<usize>>,
    by_target: AHashMap<u32, Vec<usize>>,
    by_position: AHashMap<usize, (u32, u32)>,
}

impl SynapticIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: u32, target: u32, position: usize) {
        self.by_source.entry(source).or_default().push(position);
        self.by_target.entry(target).or_default().push(position);
        self.by_position.insert(position, (source, target));
    }

    /// Remove the triple at `position`. Returns whether it existed.
    pub fn remove(&mut self, position: usize) -> bool {
        let Some((source, target)) = self.by_position.remove(&position) else {
            return false;
        };
        remove_position(&mut self.by_source, source, position);
        remove_position(&mut self.by_target, target, position);
        true
    }

    pub fn clear(&mut self) {
        self.by_source.clear();
        self.by_target.clear();
        self.by_position.clear();
    }

    pub fn rebuild(&mut self, triples: impl Iterator<Item = (u32, u32, usize)>) {
        self.clear();
        for (source, target, position) in triples {
            self.insert(source, target, position);
        }
    }

    /// Positions of the synapses leaving `source`.
    pub fn of_source(&self, source: u32) -> &[usize] {
        self.by_source
            .get(&source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Positions of the synapses arriving at `target`.
    pub fn of_target(&self, target: u32) -> &[usize] {
        self.by_target
            .get(&target)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The (source, target) pair at `position`, if indexed.
    pub fn connection(&self, position: usize) -> Option<(u32, u32)> {
        self.by_position.get(&position).copied()
    }

    pub fn len(&self) -> usize {
        self.by_position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_position.is_empty()
    }
}

fn remove_position(view: &mut AHashMap<u32, Vec<usize>>, key: u32, position: usize) {
    if let Some(positions) = view.get_mut(&key) {
        positions.retain(|&indexed| indexed != position);
        if positions.is_empty() {
            view.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_query() {
        let mut index = SynapticIndex::new();
        index.insert(0, 1, 0);
        index.insert(0, 2, 1);
        index.insert(3, 1, 2);

        assert_eq!(index.len(), 3);
        assert_eq!(index.of_source(0), &[0, 1]);
        assert_eq!(index.of_target(1), &[0, 2]);
        assert_eq!(index.connection(1), Some((0, 2)));
        assert!(index.of_source(9).is_empty());
    }

    #[test]
    fn test_remove_updates_all_views() {
        let mut index = SynapticIndex::new();
        index.insert(0, 1, 0);
        index.insert(0, 1, 1);

        assert!(index.remove(0));
        assert!(!index.remove(0));
        assert_eq!(index.len(), 1);
        assert_eq!(index.of_source(0), &[1]);
        assert_eq!(index.of_target(1), &[1]);
    }

    #[test]
    fn test_rebuild() {
        let mut index = SynapticIndex::new();
        index.insert(7, 7, 99);
        index.rebuild([(0u32, 1u32, 0usize), (1, 0, 1)].into_iter());

        assert_eq!(index.len(), 2);
        assert!(index.connection(99).is_none());
        assert_eq!(index.of_source(1), &[1]);
    }
}
