//! # seriescursor: Cursors and Navigation for Ordered Time-Series
//!
//! This crate provides the traversal core of an ordered time-series library: a uniform
//! abstraction for moving through, querying, and asynchronously consuming a key-ordered
//! sequence of `(key, value)` pairs, where keys may arrive out of order relative to a
//! position a consumer already observed.
//!
//! ## Design Overview
//!
//! ### Key Concepts
//!
//! **Cursors**: A [`Cursor`] is a positioned traversal handle. It moves forward, optionally
//! backward, to either bound, or to an arbitrary key through a directional [`Lookup`].
//! Storage backends implement the trait; everything else is written against it.
//!
//! **Navigation cursor**: A [`Series`] answers random-access queries (`first`, `last`,
//! `try_find`, `get_at`, `is_empty`) through one lazily created cursor guarded by a
//! per-series lock. Enumeration never touches that cursor: every enumerator gets its own.
//!
//! **Owner cursor**: The first [`Series::clone_cursor`] call made on the thread that built the
//! series hands out a cursor the series already owns, instead of creating one. Every other
//! call creates a new cursor, so two consumers never alias one position.
//!
//! **Out-of-order recovery**: Live series accept writes behind a cursor. A relative move that
//! detects such a write fails with [`Error::OutOfOrder`], carrying an [`OutOfOrderKey`] from
//! which the consumer resynchronizes the cursor with [`Cursor::move_at`].
//!
//! **Asynchronous consumption**: [`AsyncCursor`] turns a pull-based cursor into a cancellable
//! asynchronous sequence that suspends only when a live series has no data yet.
//!
//! ### Control Flow
//!
//! ```text
//!                      ┌──────────────────────────┐
//!   random access ───► │  Series (navigation lock)│ ───► navigation cursor ──┐
//!                      └──────────────────────────┘                          │
//!                                                                            ▼
//!   enumeration  ───► Series::iter / keys / values ───► fresh cursor ───► backend
//!                                                                            ▲
//!   async        ───► Series::async_cursor ───► AsyncCursor ───► fresh cursor┘
//! ```
//!
//! ## Basic Usage
//!
//! ```
//! use seriescursor::{mem::SortedMap, Lookup};
//!
//! let map: SortedMap<u32, &str> = [(1, "a"), (3, "b"), (5, "c")].into_iter().collect();
//! let series = map.series();
//!
//! assert_eq!(series.first().unwrap(), (1, "a"));
//! assert_eq!(series.try_find(&4, Lookup::GE).unwrap(), Some((5, "c")));
//! assert_eq!(series.get_at(1).unwrap(), (3, "b"));
//!
//! let keys: Vec<u32> = series.keys().collect::<Result<_, _>>().unwrap();
//! assert_eq!(keys, vec![1, 3, 5]);
//! ```
//!
//! ## Thread Safety
//!
//! A [`Series`] is `Sync` whenever its cursor type is, and can be shared across threads via
//! `Arc<Series<C>>`. The navigation lock is the only shared mutable state in the core; the
//! storage backend brings its own concurrency discipline.

pub mod async_cursor;
pub mod config;
pub mod conformance;
pub mod cursor;
pub mod error;
pub mod mem;
pub mod series;

mod sync;

pub use async_cursor::{AsyncCursor, AsyncState, ConcreteCursor, MoveNextAsync};
pub use cursor::{Cursor, CursorState, Lookup};
pub use error::{Error, OutOfOrderKey, Result};
pub use series::{Iter, Keys, Series, Values};
