//! A sentinel-bounded skip list.
//!
//! Elements are stored in stacked, ordered levels: the bottom level holds
//! every element, and each level above it holds a random subset of the level
//! below. Every level is bracketed by a pair of sentinel nodes carrying the
//! caller-supplied minimum and maximum bounds:
//!
//! ```text
//! <min> ------------------------------------> [9] -----------> <max>
//! <min> ----------> [3] --------------------> [9] -----------> <max>
//! <min> --> [1] --> [3] --> [5] --> [7] ----> [9] --> [10] --> <max>
//! ```
//!
//! The copies of one element stacked across levels form a *tower*, linked
//! vertically so that a search can drop from a sparse level into a denser
//! one. How tall a tower grows is decided at insertion by flipping a fair
//! coin until it lands tails, which keeps expected search and insert cost
//! logarithmic in the number of elements without any rebalancing.
//!
//! The two bounds must compare strictly below and above every element ever
//! inserted; [`SkipList::insert`] rejects anything else.
//!
//! ```
//! use skipgrid::SkipList;
//!
//! let mut list = SkipList::new(i64::MIN, i64::MAX)?;
//! list.insert(5)?;
//! list.insert(1)?;
//! list.insert(9)?;
//!
//! assert!(list.contains(&9));
//! assert_eq!(list.search(&7).value(), &5);
//! assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 5, 9]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod level;
mod level_generator;
mod node;
mod skiplist;

pub use crate::{
    level::SpliceError,
    level_generator::{CoinFlip, CoinFlipError, LevelGenerator},
    node::Iter,
    skiplist::{InsertError, NodeRef, SentinelError, SkipList},
};
