//! Position remapping through document changes

use smallvec::SmallVec;

/// A replaced range: `old_size` positions starting at `start` became `new_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRange {
    pub start: usize,
    pub old_size: usize,
    pub new_size: usize,
}

/// Which side of a replaced range a position sticks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Assoc {
    /// Stay before content inserted at the position
    Before,
    /// Move past content inserted at the position
    #[default]
    After,
}

/// Result of mapping a single position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
    pub pos: usize,
    /// The position sat strictly inside a replaced range
    pub deleted: bool,
}

/// The position changes made by one step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepMap {
    ranges: SmallVec<[MapRange; 2]>,
}

impl StepMap {
    /// A map that changes nothing
    pub fn identity() -> Self {
        Self::default()
    }

    /// A map with a single replaced range
    pub fn replace(start: usize, old_size: usize, new_size: usize) -> Self {
        let mut ranges = SmallVec::new();
        if old_size != 0 || new_size != 0 {
            ranges.push(MapRange {
                start,
                old_size,
                new_size,
            });
        }
        Self { ranges }
    }

    /// Replaced ranges in document order
    pub fn ranges(&self) -> &[MapRange] {
        &self.ranges
    }

    /// Map a position through this step
    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut diff: isize = 0;

        for range in &self.ranges {
            let start = range.start;
            if start > pos {
                break;
            }
            let end = start + range.old_size;
            if pos <= end {
                let at_start = pos == start;
                let at_end = pos == end;
                let side = if range.old_size == 0 {
                    assoc
                } else if at_start {
                    Assoc::Before
                } else if at_end {
                    Assoc::After
                } else {
                    assoc
                };
                let mapped = match side {
                    Assoc::Before => start,
                    Assoc::After => start + range.new_size,
                };
                return MapResult {
                    pos: offset(mapped, diff),
                    deleted: !at_start && !at_end,
                };
            }
            diff += range.new_size as isize - range.old_size as isize;
        }

        MapResult {
            pos: offset(pos, diff),
            deleted: false,
        }
    }

    /// Map a position through this step
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }
}

fn offset(pos: usize, diff: isize) -> usize {
    (pos as isize + diff).max(0) as usize
}

/// A sequence of step maps, applied in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the map of the next step
    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    /// Check if any step moved positions
    pub fn is_identity(&self) -> bool {
        self.maps.iter().all(|m| m.ranges.is_empty())
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    /// Map a position through every step
    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut deleted = false;
        let mut pos = pos;
        for map in &self.maps {
            let result = map.map_result(pos, assoc);
            pos = result.pos;
            deleted |= result.deleted;
        }
        MapResult { pos, deleted }
    }

    /// Map a position through every step
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_shifts_later_positions() {
        let map = StepMap::replace(5, 0, 3);
        assert_eq!(map.map(2, Assoc::After), 2);
        assert_eq!(map.map(8, Assoc::After), 11);
    }

    #[test]
    fn test_insertion_at_position_respects_assoc() {
        let map = StepMap::replace(5, 0, 3);
        assert_eq!(map.map(5, Assoc::Before), 5);
        assert_eq!(map.map(5, Assoc::After), 8);
    }

    #[test]
    fn test_deletion_collapses_positions() {
        let map = StepMap::replace(4, 6, 0);
        assert_eq!(map.map(12, Assoc::After), 6);
        let inside = map.map_result(7, Assoc::After);
        assert_eq!(inside.pos, 4);
        assert!(inside.deleted);
        assert!(!map.map_result(4, Assoc::After).deleted);
        assert!(!map.map_result(10, Assoc::Before).deleted);
    }

    #[test]
    fn test_mapping_composes_steps() {
        let mut mapping = Mapping::new();
        mapping.push(StepMap::replace(0, 0, 4));
        mapping.push(StepMap::replace(10, 2, 0));
        // 9 -> 13 -> 11
        assert_eq!(mapping.map(9, Assoc::After), 11);
        assert!(!mapping.is_identity());
        assert!(Mapping::new().is_identity());
    }
}
