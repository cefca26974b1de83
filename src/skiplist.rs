//! A skip list whose levels are bounded by caller-supplied sentinel values.

use std::fmt;

use thiserror::Error;

use crate::{
    level::{Level, SpliceError},
    level_generator::{CoinFlip, LevelGenerator},
    node::{Arena, Iter, Node, NodeId},
};

/// Default number of levels a list may grow to.
///
/// Towers taller than this are truncated; with a fair coin the cap is
/// reached about once per 65k insertions.
const DEFAULT_LEVELS: usize = 16;

// ////////////////////////////////////////////////////////////////////////////
// Errors
// ////////////////////////////////////////////////////////////////////////////

/// Errors that can occur when creating a [`SkipList`].
#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SentinelError {
    /// The minimum sentinel must compare strictly below the maximum.
    #[error("min must compare strictly less than max.")]
    Unordered,
}

/// Outcomes of [`SkipList::insert`] other than an insertion.
#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum InsertError {
    /// The value is already present; the list is unchanged.
    #[error("value is already present.")]
    AlreadyPresent,
    /// The value does not compare strictly between the sentinel bounds.
    #[error("value must lie strictly between the sentinel bounds.")]
    OutOfBounds,
    /// A level refused the splice the multi-level search asked for.
    ///
    /// The bounds and duplicate checks rule this out, so seeing it means
    /// the structure is corrupt.
    #[error(transparent)]
    InvalidSplice(#[from] SpliceError),
}

// ////////////////////////////////////////////////////////////////////////////
// SkipList
// ////////////////////////////////////////////////////////////////////////////

/// An ordered set of elements stored in stacked, sentinel-bounded levels.
///
/// The bottom level holds every element; each level above holds a random
/// subset of the one below, with the copies of one element linked into a
/// vertical tower. Searches start at the sparsest level and drop down
/// whenever they overshoot, and insertions grow towers by flipping a fair
/// coin, giving both operations an expected logarithmic cost.
///
/// The two bounds passed at construction must compare strictly below and
/// above every element ever inserted. They are the values carried by the
/// sentinel nodes of every level, including levels grown later.
///
/// Elements are `Clone` because each level of a tower carries its own copy
/// of the element.
pub struct SkipList<T> {
    /// Owner of every node in the grid.
    arena: Arena<T>,
    /// Levels bottom-first; the last entry is the sparsest, top level.
    levels: Vec<Level>,
    len: usize,
    min: T,
    max: T,
    level_generator: CoinFlip,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<T> SkipList<T>
where
    T: Ord + Clone,
{
    /// Create a list bounded by `min` and `max`, with randomness drawn from
    /// the process entropy source.
    ///
    /// # Errors
    ///
    /// Fails with [`SentinelError::Unordered`] unless `min < max`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipgrid::SkipList;
    ///
    /// let mut list = SkipList::new(0_i64, 100)?;
    /// list.insert(42)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    pub fn new(min: T, max: T) -> Result<Self, SentinelError> {
        let generator =
            CoinFlip::new(DEFAULT_LEVELS).expect("the default level count is non-zero");
        Self::assemble(min, max, generator)
    }

    /// Create a list bounded by `min` and `max` whose coin flips are driven
    /// by a fixed seed.
    ///
    /// Two lists built from the same seed and fed the same insertions end
    /// up with identical level structures, which makes failures
    /// reproducible. The seed is per-instance state: lists never share a
    /// random source.
    ///
    /// # Errors
    ///
    /// Fails with [`SentinelError::Unordered`] unless `min < max`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipgrid::SkipList;
    ///
    /// let mut a = SkipList::with_seed(0_i64, 100, 7)?;
    /// let mut b = SkipList::with_seed(0_i64, 100, 7)?;
    /// for value in [30, 10, 20] {
    ///     a.insert(value)?;
    ///     b.insert(value)?;
    /// }
    /// assert_eq!(a, b);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    pub fn with_seed(min: T, max: T, seed: u64) -> Result<Self, SentinelError> {
        let generator =
            CoinFlip::with_seed(DEFAULT_LEVELS, seed).expect("the default level count is non-zero");
        Self::assemble(min, max, generator)
    }

    fn assemble(min: T, max: T, level_generator: CoinFlip) -> Result<Self, SentinelError> {
        if min >= max {
            return Err(SentinelError::Unordered);
        }
        let mut arena = Arena::new();
        let base = Level::new(&mut arena, min.clone(), max.clone());
        Ok(SkipList {
            arena,
            levels: vec![base],
            len: 0,
            min,
            max,
            level_generator,
        })
    }

    /// Insert `value`, growing a tower whose height is decided by coin
    /// flips, and return a handle to its bottom-level node.
    ///
    /// # Errors
    ///
    /// - [`InsertError::AlreadyPresent`] if the value is in the list; this
    ///   is a defined no-op and the list is unchanged.
    /// - [`InsertError::OutOfBounds`] if the value does not compare
    ///   strictly between the sentinel bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipgrid::{InsertError, SkipList};
    ///
    /// let mut list = SkipList::new(0_i64, 100)?;
    /// let node = list.insert(42)?;
    /// assert_eq!(node.value(), &42);
    ///
    /// assert_eq!(list.insert(42).unwrap_err(), InsertError::AlreadyPresent);
    /// assert_eq!(list.insert(100).unwrap_err(), InsertError::OutOfBounds);
    /// assert_eq!(list.len(), 1);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn insert(&mut self, value: T) -> Result<NodeRef<'_, T>, InsertError> {
        if value <= self.min || value >= self.max {
            return Err(InsertError::OutOfBounds);
        }
        let found = self.locate(&value);
        if self.arena[found].value == value {
            return Err(InsertError::AlreadyPresent);
        }

        let top_level = self.level_generator.level();
        while self.levels.len() <= top_level {
            self.grow();
        }

        // Build the tower bottom-up, linking each copy to the one below it
        // so a later search can descend through the tower.
        let base = self.levels[0];
        let location = base.search(&self.arena, base.head, &value);
        let bottom = base.splice(&mut self.arena, location, value.clone())?;
        let mut below = bottom;
        for index in 1..=top_level {
            let level = self.levels[index];
            let location = level.search(&self.arena, level.head, &value);
            let node = level.splice(&mut self.arena, location, value.clone())?;
            self.arena[below].up = Some(node);
            self.arena[node].down = Some(below);
            below = node;
        }

        self.len += 1;
        Ok(NodeRef {
            list: &*self,
            id: bottom,
        })
    }

    /// Stack a fresh sentinel-only level on top, wiring its sentinels into
    /// the vertical sentinel towers.
    ///
    /// The new level is bounded by clones of the bounds the list was
    /// constructed with.
    fn grow(&mut self) {
        let below = *self.top();
        let level = Level::new(&mut self.arena, self.min.clone(), self.max.clone());
        self.arena[level.head].down = Some(below.head);
        self.arena[below.head].up = Some(level.head);
        self.arena[level.tail].down = Some(below.tail);
        self.arena[below.tail].up = Some(level.tail);
        self.levels.push(level);
    }
}

impl<T> SkipList<T>
where
    T: Ord,
{
    /// Find `target`, or the element closest below it.
    ///
    /// Starting from the top level's head sentinel, the search scans
    /// forward until the next step would overshoot, then drops one level
    /// and continues, ending on the bottom level. The returned handle is
    /// the node holding `target` on an exact hit, and the tightest
    /// predecessor otherwise; if nothing in the list compares at or below
    /// `target`, it is the bottom head sentinel.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipgrid::SkipList;
    ///
    /// let mut list = SkipList::new(0_i64, 100)?;
    /// for value in [10, 30, 50] {
    ///     list.insert(value)?;
    /// }
    ///
    /// assert_eq!(list.search(&30).value(), &30);
    /// assert_eq!(list.search(&40).value(), &30);
    /// assert!(list.search(&5).is_sentinel());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn search(&self, target: &T) -> NodeRef<'_, T> {
        NodeRef {
            list: self,
            id: self.locate(target),
        }
    }

    /// Returns `true` if the value is contained in the list.
    ///
    /// The sentinel bounds themselves are never contained.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipgrid::SkipList;
    ///
    /// let mut list = SkipList::new(0_i64, 100)?;
    /// list.insert(4)?;
    /// assert!(list.contains(&4));
    /// assert!(!list.contains(&15));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        let found = self.locate(value);
        self.arena[found].prev.is_some() && self.arena[found].value == *value
    }

    /// Multi-level descent shared by `search`, `contains` and `insert`:
    /// scan forward within a level, drop through the `down` link, repeat
    /// until the bottom level is reached.
    fn locate(&self, target: &T) -> NodeId {
        let mut at = self.top().head;
        for level in self.levels.iter().rev() {
            at = level.search(&self.arena, at, target);
            if let Some(down) = self.arena[at].down {
                at = down;
            }
        }
        at
    }

    /// Checks the integrity of the whole grid.
    #[allow(dead_code)]
    fn check(&self) {
        assert!(!self.levels.is_empty(), "at least one level must exist");

        // Horizontal pass: sentinel endpoints, mutual next/prev links, and
        // strictly increasing values on every level.
        let mut rows: Vec<Vec<&T>> = Vec::new();
        for level in &self.levels {
            assert!(self.arena[level.head].prev.is_none());
            assert!(self.arena[level.head].value == self.min);
            assert!(self.arena[level.tail].next.is_none());
            assert!(self.arena[level.tail].value == self.max);

            let mut row = Vec::new();
            let mut at = level.head;
            while let Some(next) = self.arena[at].next {
                assert_eq!(self.arena[next].prev, Some(at), "next/prev must agree");
                assert!(
                    self.arena[at].value < self.arena[next].value,
                    "levels must be strictly increasing"
                );
                at = next;
                if at != level.tail {
                    row.push(&self.arena[at].value);
                }
            }
            assert_eq!(at, level.tail, "every level must end at its tail");
            rows.push(row);
        }

        assert_eq!(rows[0].len(), self.len, "the bottom level holds every key");
        for pair in rows.windows(2) {
            for value in &pair[1] {
                assert!(
                    pair[0].contains(value),
                    "upper levels must be subsets of the level below"
                );
            }
        }

        // Sentinel towers connect adjacent levels.
        for pair in self.levels.windows(2) {
            assert_eq!(self.arena[pair[1].head].down, Some(pair[0].head));
            assert_eq!(self.arena[pair[0].head].up, Some(pair[1].head));
            assert_eq!(self.arena[pair[1].tail].down, Some(pair[0].tail));
            assert_eq!(self.arena[pair[0].tail].up, Some(pair[1].tail));
        }

        // Vertical pass: towers are mutually linked, repeat a single key,
        // and span exactly the levels that carry that key.
        let base = self.levels[0];
        let mut at = self.arena[base.head].next;
        while let Some(id) = at {
            let mut height = 1;
            let mut lower = id;
            while let Some(upper) = self.arena[lower].up {
                assert_eq!(self.arena[upper].down, Some(lower), "towers must link back");
                assert!(
                    self.arena[upper].value == self.arena[lower].value,
                    "towers must repeat one key"
                );
                height += 1;
                lower = upper;
            }
            if self.arena[id].next.is_some() {
                let value = &self.arena[id].value;
                let presence = rows.iter().filter(|row| row.contains(&value)).count();
                assert_eq!(presence, height, "a tower spans every level with its key");
            }
            at = self.arena[id].next;
        }
    }
}

impl<T> SkipList<T> {
    /// Returns the number of elements in the list.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipgrid::SkipList;
    ///
    /// let mut list = SkipList::new(0_i64, 100)?;
    /// list.insert(1)?;
    /// list.insert(2)?;
    /// assert_eq!(list.len(), 2);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list contains no elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipgrid::SkipList;
    ///
    /// let mut list = SkipList::new(0_i64, 100)?;
    /// assert!(list.is_empty());
    ///
    /// list.insert(1)?;
    /// assert!(!list.is_empty());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Provides a reference to the smallest element, or `None` if the list
    /// is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipgrid::SkipList;
    ///
    /// let mut list = SkipList::new(0_i64, 100)?;
    /// assert!(list.front().is_none());
    ///
    /// list.insert(2)?;
    /// list.insert(1)?;
    /// assert_eq!(list.front(), Some(&1));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        let base = self.base();
        let first = self.arena[base.head].next?;
        (first != base.tail).then(|| &self.arena[first].value)
    }

    /// Provides a reference to the largest element, or `None` if the list
    /// is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipgrid::SkipList;
    ///
    /// let mut list = SkipList::new(0_i64, 100)?;
    /// assert!(list.back().is_none());
    ///
    /// list.insert(2)?;
    /// list.insert(1)?;
    /// assert_eq!(list.back(), Some(&2));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    #[must_use]
    pub fn back(&self) -> Option<&T> {
        let base = self.base();
        let last = self.arena[base.tail].prev?;
        (last != base.head).then(|| &self.arena[last].value)
    }

    /// Creates an iterator over the elements, smallest first.
    ///
    /// The iterator walks the bottom level and skips the sentinels.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipgrid::SkipList;
    ///
    /// let mut list = SkipList::new(0_i64, 100)?;
    /// for value in [2, 3, 1] {
    ///     list.insert(value)?;
    /// }
    /// assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    /// assert_eq!(list.iter().rev().next(), Some(&3));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        let base = self.base();
        Iter {
            arena: &self.arena,
            first: self.arena[base.head].next.filter(|&id| id != base.tail),
            last: self.arena[base.tail].prev.filter(|&id| id != base.head),
            size: self.len,
        }
    }

    /// The bottom level, the one holding every element.
    fn base(&self) -> &Level {
        &self.levels[0]
    }

    /// The sparsest level, where searches start.
    fn top(&self) -> &Level {
        // The constructor seeds one level and none is ever removed.
        &self.levels[self.levels.len() - 1]
    }
}

impl<T> SkipList<T>
where
    T: fmt::Display,
{
    /// Renders the grid level by level, sparsest level first, for
    /// debugging.
    #[allow(dead_code)]
    fn debug_structure(&self) -> String {
        let mut out = String::new();
        for level in self.levels.iter().rev() {
            out.push_str("<min>");
            let mut at = level.head;
            while let Some(next) = self.arena[at].next {
                at = next;
                if at != level.tail {
                    out.push_str(&format!(" -> {}", self.arena[at].value));
                }
            }
            out.push_str(" -> <max>\n");
        }
        out
    }
}

// ////////////////////////////////////////////////////////////////////////////
// NodeRef
// ////////////////////////////////////////////////////////////////////////////

/// A handle to one node of the grid, returned by [`SkipList::search`] and
/// [`SkipList::insert`].
///
/// The handle borrows the list, so it can be held and navigated freely while
/// reading but not across mutations. Navigation follows the raw grid links
/// and will reach the sentinel nodes; [`NodeRef::is_sentinel`] tells them
/// apart from element nodes.
pub struct NodeRef<'a, T> {
    list: &'a SkipList<T>,
    id: NodeId,
}

impl<'a, T> NodeRef<'a, T> {
    /// The value held by this node. Sentinel nodes hold the bounds.
    #[inline]
    #[must_use]
    pub fn value(&self) -> &'a T {
        &self.list.arena[self.id].value
    }

    /// Step toward the tail of this node's level.
    #[inline]
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        self.step(|node| node.next)
    }

    /// Step toward the head of this node's level.
    #[inline]
    #[must_use]
    pub fn prev(&self) -> Option<Self> {
        self.step(|node| node.prev)
    }

    /// Step to this node's copy one level up, if its tower reaches there.
    #[inline]
    #[must_use]
    pub fn up(&self) -> Option<Self> {
        self.step(|node| node.up)
    }

    /// Step to this node's copy one level down; `None` on the bottom level.
    #[inline]
    #[must_use]
    pub fn down(&self) -> Option<Self> {
        self.step(|node| node.down)
    }

    /// Whether this node is one of its level's bounding sentinels.
    #[inline]
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        let node = &self.list.arena[self.id];
        node.prev.is_none() || node.next.is_none()
    }

    fn step(&self, link: impl FnOnce(&Node<T>) -> Option<NodeId>) -> Option<Self> {
        link(&self.list.arena[self.id]).map(|id| NodeRef {
            list: self.list,
            id,
        })
    }
}

impl<T> Clone for NodeRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<'_, T> {}

impl<T> fmt::Debug for NodeRef<'_, T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("value", self.value())
            .field("sentinel", &self.is_sentinel())
            .finish()
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

/// Inserts every element of the iterator, silently skipping values that are
/// already present or that fall outside the sentinel bounds.
impl<T> Extend<T> for SkipList<T>
where
    T: Ord + Clone,
{
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iterable: I) {
        for element in iterable {
            let _ = self.insert(element);
        }
    }
}

/// This implementation of `PartialEq` only checks that the *elements* are
/// equal; the sentinel bounds and the random tower shapes are not compared.
impl<T> PartialEq for SkipList<T>
where
    T: PartialEq,
{
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T> Eq for SkipList<T> where T: Eq {}

impl<T> fmt::Debug for SkipList<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, entry) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{entry:?}")?;
        }
        write!(f, "]")
    }
}

impl<T> fmt::Display for SkipList<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, entry) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{entry}")?;
        }
        write!(f, "]")
    }
}

impl<'a, T> IntoIterator for &'a SkipList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////
