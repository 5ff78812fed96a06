// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;

use crate::shape::WaveformShape;
use crate::synth::synthesize;
use crate::table::WaveformTable;

/// Cache key of a table. The duty cycle is dropped for shapes that ignore it,
/// so every sine request maps to the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TableKey {
    shape: WaveformShape,
    duty_bits: Option<u64>,
}

impl TableKey {
    fn new(shape: WaveformShape, duty: f64) -> Self {
        // -0.0 and 0.0 produce the same table
        let duty = if duty == 0.0 { 0.0 } else { duty };
        TableKey {
            shape,
            duty_bits: shape.uses_duty_cycle().then(|| duty.to_bits()),
        }
    }
}

/// Bounded memo of synthesized tables of one length, evicting the least
/// recently used entry.
#[derive(Debug)]
pub struct WaveformCache {
    table_len: usize,
    capacity: usize,
    entries: IndexMap<TableKey, WaveformTable>,
}

impl WaveformCache {
    /// A `capacity` of zero is raised to one.
    pub fn new(table_len: usize, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        WaveformCache {
            table_len,
            capacity,
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn get_or_synthesize(&mut self, shape: WaveformShape, duty: f64) -> WaveformTable {
        let key = TableKey::new(shape, duty);
        if let Some(index) = self.entries.get_index_of(&key) {
            let last = self.entries.len() - 1;
            self.entries.move_index(index, last);
            return self.entries[last].clone();
        }
        let table = synthesize(shape, duty, self.table_len);
        if self.entries.len() >= self.capacity {
            if let Some((evicted, _)) = self.entries.shift_remove_index(0) {
                siggen_log::diagnostic!("Evicting {} table from waveform cache", evicted.shape);
            }
        }
        self.entries.insert(key, table.clone());
        table
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::square;

    #[test]
    fn test_hit_returns_shared_buffer() {
        let mut cache = WaveformCache::new(64, 4);
        let first = cache.get_or_synthesize(WaveformShape::Square, 0.25);
        let second = cache.get_or_synthesize(WaveformShape::Square, 0.25);
        assert!(first.ptr_eq(&second));
        assert_eq!(first, square(0.25, 64));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sine_ignores_duty_in_key() {
        let mut cache = WaveformCache::new(64, 4);
        let a = cache.get_or_synthesize(WaveformShape::Sine, 0.1);
        let b = cache.get_or_synthesize(WaveformShape::Sine, 0.9);
        assert!(a.ptr_eq(&b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let mut cache = WaveformCache::new(16, 2);
        let sine = cache.get_or_synthesize(WaveformShape::Sine, 0.5);
        let square = cache.get_or_synthesize(WaveformShape::Square, 0.5);
        // touch sine so the square table becomes the oldest entry
        cache.get_or_synthesize(WaveformShape::Sine, 0.5);
        cache.get_or_synthesize(WaveformShape::Sawtooth, 0.5);
        assert_eq!(cache.len(), 2);
        assert!(sine.ptr_eq(&cache.get_or_synthesize(WaveformShape::Sine, 0.5)));
        let resynthesized = cache.get_or_synthesize(WaveformShape::Square, 0.5);
        assert!(!square.ptr_eq(&resynthesized));
        assert_eq!(square, resynthesized);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut cache = WaveformCache::new(16, 0);
        cache.get_or_synthesize(WaveformShape::Square, 0.5);
        cache.get_or_synthesize(WaveformShape::Square, 0.6);
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_empty());
    }
}
