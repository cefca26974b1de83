//! One horizontal level of the grid: an ordered run of nodes bounded by a
//! pair of sentinels.

use thiserror::Error;

use crate::node::{Arena, NodeId};

// ////////////////////////////////////////////////////////////////////////////
// Level
// ////////////////////////////////////////////////////////////////////////////

/// Failure of a level-local splice.
///
/// These are only producible by handing the level an out-of-order
/// location/value pair. The multi-level insert path rules both cases out
/// before splicing, so one of these surfacing through
/// [`SkipList::insert`][crate::SkipList::insert] means the structure is
/// corrupt.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SpliceError {
    /// The splice location is the tail sentinel; nothing fits after it.
    #[error("cannot splice after the tail sentinel.")]
    AtTail,
    /// The value does not sort between the location and its successor.
    #[error("value is out of order at the splice location.")]
    OutOfOrder,
}

/// An ordered, doubly linked sequence of nodes starting at a head sentinel
/// holding the minimum bound and ending at a tail sentinel holding the
/// maximum bound.
///
/// The level does not own its nodes (the arena does); it remembers the two
/// sentinel handles and maintains strictly increasing values between them.
#[derive(Clone, Copy, Debug)]
pub struct Level {
    pub head: NodeId,
    pub tail: NodeId,
}

impl Level {
    /// Create a level holding only its two sentinels.
    ///
    /// Vertical links of the sentinels start unset; the list wires them to
    /// the neighbouring levels when it stacks a level onto another.
    pub fn new<T>(arena: &mut Arena<T>, min: T, max: T) -> Self {
        let head = arena.alloc(min);
        let tail = arena.alloc(max);
        arena[head].next = Some(tail);
        arena[tail].prev = Some(head);
        Level { head, tail }
    }

    /// Walk forward from `start` while the next node is a real node whose
    /// value does not exceed `target`.
    ///
    /// Returns the node holding `target` on an exact hit, and the tightest
    /// predecessor within this level otherwise. The tail sentinel is never
    /// returned: a target at or beyond the maximum bound stops on the last
    /// real node.
    pub fn search<T: Ord>(&self, arena: &Arena<T>, start: NodeId, target: &T) -> NodeId {
        let mut at = start;
        while let Some(next) = arena[at].next {
            if next == self.tail || arena[next].value > *target {
                break;
            }
            at = next;
        }
        at
    }

    /// Splice a new node holding `value` immediately after `location`.
    ///
    /// Succeeds only if `location` has a successor and
    /// `location.value < value <= successor.value`, keeping the mutation
    /// local to a two-node neighbourhood and the level strictly increasing
    /// by construction. On failure the level is left untouched.
    pub fn splice<T: Ord>(
        &self,
        arena: &mut Arena<T>,
        location: NodeId,
        value: T,
    ) -> Result<NodeId, SpliceError> {
        if location == self.tail {
            return Err(SpliceError::AtTail);
        }
        let Some(after) = arena[location].next else {
            return Err(SpliceError::AtTail);
        };
        if arena[location].value >= value || arena[after].value < value {
            return Err(SpliceError::OutOfOrder);
        }
        let node = arena.alloc(value);
        arena[node].next = Some(after);
        arena[node].prev = Some(location);
        arena[after].prev = Some(node);
        arena[location].next = Some(node);
        Ok(node)
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{Level, SpliceError};
    use crate::node::{Arena, NodeId};

    fn values(arena: &Arena<i64>, level: Level) -> Vec<i64> {
        let mut out = Vec::new();
        let mut at = level.head;
        while let Some(next) = arena[at].next {
            at = next;
            out.push(arena[at].value);
        }
        out
    }

    /// Build a level over the bounds (0, 100) containing the given values.
    fn filled(arena: &mut Arena<i64>, values: &[i64]) -> Level {
        let level = Level::new(arena, 0, 100);
        for &value in values {
            let location = level.search(arena, level.head, &value);
            level.splice(arena, location, value).unwrap();
        }
        level
    }

    #[test]
    fn sentinels_only() {
        let mut arena = Arena::new();
        let level = Level::new(&mut arena, 0, 100);
        assert_eq!(arena[level.head].value, 0);
        assert_eq!(arena[level.tail].value, 100);
        assert_eq!(arena[level.head].next, Some(level.tail));
        assert_eq!(arena[level.tail].prev, Some(level.head));
        assert!(arena[level.head].prev.is_none());
        assert!(arena[level.tail].next.is_none());
    }

    #[test]
    fn splice_keeps_order() {
        let mut arena = Arena::new();
        let level = filled(&mut arena, &[50, 20, 80, 35]);
        assert_eq!(values(&arena, level), [20, 35, 50, 80, 100]);
    }

    #[test]
    fn splice_fixes_both_directions() {
        let mut arena = Arena::new();
        let level = Level::new(&mut arena, 0, 100);
        let node = level.splice(&mut arena, level.head, 42).unwrap();
        assert_eq!(arena[level.head].next, Some(node));
        assert_eq!(arena[node].prev, Some(level.head));
        assert_eq!(arena[node].next, Some(level.tail));
        assert_eq!(arena[level.tail].prev, Some(node));
    }

    #[test]
    fn splice_at_tail() {
        let mut arena = Arena::new();
        let level = Level::new(&mut arena, 0, 100);
        assert_eq!(
            level.splice(&mut arena, level.tail, 42),
            Err(SpliceError::AtTail)
        );
        assert_eq!(values(&arena, level), [100]);
    }

    #[test]
    fn splice_out_of_order() {
        let mut arena = Arena::new();
        let level = filled(&mut arena, &[40]);
        let node = level.search(&arena, level.head, &40);

        // Value sorts before the location.
        assert_eq!(
            level.splice(&mut arena, node, 30),
            Err(SpliceError::OutOfOrder)
        );
        // Value sorts after the location's successor.
        assert_eq!(
            level.splice(&mut arena, level.head, 60),
            Err(SpliceError::OutOfOrder)
        );
        // Failure must not mutate the level.
        assert_eq!(values(&arena, level), [40, 100]);
    }

    #[test]
    fn search_exact_and_predecessor() {
        let mut arena = Arena::new();
        let level = filled(&mut arena, &[10, 20, 30]);

        let hit = level.search(&arena, level.head, &20);
        assert_eq!(arena[hit].value, 20);

        let pred = level.search(&arena, level.head, &25);
        assert_eq!(arena[pred].value, 20);
    }

    #[test]
    fn search_stops_at_head_for_small_targets() {
        let mut arena = Arena::new();
        let level = filled(&mut arena, &[10, 20]);
        let at = level.search(&arena, level.head, &5);
        assert_eq!(at, level.head);
    }

    #[test]
    fn search_never_returns_the_tail() {
        let mut arena = Arena::new();
        let level = filled(&mut arena, &[10, 20]);
        // Probes at and beyond the maximum bound stop on the last real node.
        for target in [99, 100] {
            let at = level.search(&arena, level.head, &target);
            assert_eq!(arena[at].value, 20);
        }
    }

    #[test]
    fn search_from_intermediate_start() {
        let mut arena = Arena::new();
        let level = filled(&mut arena, &[10, 20, 30, 40]);
        let start: NodeId = level.search(&arena, level.head, &20);
        let at = level.search(&arena, start, &35);
        assert_eq!(arena[at].value, 30);
    }
}
