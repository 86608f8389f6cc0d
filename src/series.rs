//! Random-access navigation over any cursor backend.
//!
//! A [`Series`] answers `first`, `last`, `try_find`, `get_at` and `is_empty`
//! through one internally owned navigation cursor, and hands out independent
//! cursors for enumeration.
//!
//! ## Navigation Path
//!
//! ```text
//!  thread A ──┐
//!  thread B ──┼──► navigation lock ──► navigation cursor ──► backend
//!  thread C ──┘        (Mutex)          (created lazily,
//!                                        under the same lock)
//! ```
//!
//! Every random-access call takes the per-series lock, repositions the shared
//! navigation cursor, copies out the result and releases the lock. The lock
//! only serializes the position of that one cursor; it is not a consistency
//! lock over the series contents.
//!
//! ## Enumeration Path
//!
//! [`Series::iter`], [`Series::keys`], [`Series::values`] and
//! [`Series::async_cursor`] always create a fresh cursor, so concurrent
//! enumerations never share position state with each other or with the
//! navigation cursor.
//!
//! ## The Owner Cursor
//!
//! A series is built with one spare unpositioned cursor. The first call to
//! [`Series::clone_cursor`] made from the thread that constructed the series
//! hands out that spare cursor instead of creating a new one. Every later call,
//! and every call from another thread, creates a new cursor. The navigation
//! cursor never comes from the spare slot.
//!
//! The spare is created together with the series, so the owner path moves one
//! creation to construction time rather than saving it. What the slot enforces
//! is aliasing discipline: the cursor can leave the slot exactly once, and only
//! to the owner thread, so no two consumers ever share a position.

use std::fmt;
use std::iter::FusedIterator;

use tracing::{debug, warn};

use crate::async_cursor::AsyncCursor;
use crate::cursor::{Cursor, CursorState, Lookup};
use crate::error::{Error, Result};
use crate::sync::{current_thread, Mutex, ThreadId};

/// Navigation surface over a cursor backend.
///
/// `Series` is `Sync` whenever its cursor type is, and is meant to be shared
/// across threads behind an `Arc`.
pub struct Series<C: Cursor> {
	/// Template used to create fresh cursors. Never moved.
	source: C,
	/// The owner cursor, handed out once by `clone_cursor` on the owner thread.
	spare: Mutex<Option<C>>,
	/// Thread that constructed the series.
	owner: ThreadId,
	/// Lazily created navigation cursor, guarded by the navigation lock.
	navigation: Mutex<Option<C>>,
}

impl<C: Cursor> fmt::Debug for Series<C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Series")
			.field("owner", &self.owner)
			.field("spare_available", &self.spare.lock().is_some())
			.field("navigation_created", &self.navigation.lock().is_some())
			.finish()
	}
}

impl<C: Cursor> Series<C> {
	/// Creates a series over the backend `source` cursor belongs to.
	///
	/// `source` should be fresh and unpositioned; it is used only as a
	/// template for [`Cursor::create`]. The calling thread becomes the owner
	/// thread.
	pub fn new(source: C) -> Self {
		debug_assert_eq!(source.state(), CursorState::None, "series source must be unpositioned");
		let spare = source.create();
		Series {
			source,
			spare: Mutex::new(Some(spare)),
			owner: current_thread(),
			navigation: Mutex::new(None),
		}
	}

	/// Thread that constructed this series.
	pub fn owner(&self) -> ThreadId {
		self.owner
	}

	/// Returns a cursor positioned like the series itself, i.e. unpositioned.
	///
	/// On the owner thread, the first call hands out the series' own spare
	/// cursor and moves it out of the `None` state. Every other call creates a
	/// new cursor, so two consumers never alias the same position. The spare
	/// was created with the series; handing it out does not save a creation.
	pub fn clone_cursor(&self) -> C {
		if current_thread() == self.owner {
			if let Some(mut cursor) = self.spare.lock().take() {
				if cursor.state() == CursorState::None {
					cursor.set_state(CursorState::Initialized);
					debug!("series handed out its owner cursor");
					return cursor;
				}
				warn!(state = ?cursor.state(), "owner cursor left the None state before it was handed out");
				debug_assert!(false, "owner cursor must be in the None state when handed out");
			}
		}
		let mut cursor = self.source.create();
		cursor.set_state(CursorState::Initialized);
		cursor
	}

	/// Runs `f` against the navigation cursor while holding the navigation lock.
	///
	/// The cursor is created on first use, inside the same critical section.
	/// The lock is released on every exit path, including errors.
	fn navigate<R>(&self, f: impl FnOnce(&mut C) -> Result<R, C::Key>) -> Result<R, C::Key> {
		let mut guard = self.navigation.lock();
		let cursor = guard.get_or_insert_with(|| {
			let mut cursor = self.source.create();
			cursor.set_state(CursorState::Navigating);
			debug!("created navigation cursor");
			cursor
		});
		f(cursor)
	}

	fn current_pair(cursor: &C) -> Result<(C::Key, C::Value), C::Key> {
		let (key, value) = cursor.current()?;
		Ok((key.clone(), value.clone()))
	}

	/// Returns `true` if the series has no elements.
	pub fn is_empty(&self) -> Result<bool, C::Key> {
		self.navigate(|c| Ok(!c.move_first()?))
	}

	/// Returns the pair with the smallest key.
	///
	/// # Errors
	///
	/// Returns [`Error::EmptySeries`] if the series has no elements.
	pub fn first(&self) -> Result<(C::Key, C::Value), C::Key> {
		self.try_get_first()?.ok_or(Error::EmptySeries)
	}

	/// Returns the pair with the largest key.
	///
	/// # Errors
	///
	/// Returns [`Error::EmptySeries`] if the series has no elements.
	pub fn last(&self) -> Result<(C::Key, C::Value), C::Key> {
		self.try_get_last()?.ok_or(Error::EmptySeries)
	}

	/// Returns the pair with the smallest key, or `None` for an empty series.
	pub fn try_get_first(&self) -> Result<Option<(C::Key, C::Value)>, C::Key> {
		self.navigate(|c| if c.move_first()? { Self::current_pair(c).map(Some) } else { Ok(None) })
	}

	/// Returns the pair with the largest key, or `None` for an empty series.
	pub fn try_get_last(&self) -> Result<Option<(C::Key, C::Value)>, C::Key> {
		self.navigate(|c| if c.move_last()? { Self::current_pair(c).map(Some) } else { Ok(None) })
	}

	/// Finds the pair satisfying `direction` relative to `key`.
	///
	/// A miss is `Ok(None)`, not an error.
	pub fn try_find(
		&self,
		key: &C::Key,
		direction: Lookup,
	) -> Result<Option<(C::Key, C::Value)>, C::Key> {
		self.navigate(|c| {
			if c.move_at(key, direction)? {
				Self::current_pair(c).map(Some)
			} else {
				Ok(None)
			}
		})
	}

	/// Returns the pair at 0-based position `index` in key order.
	///
	/// # Errors
	///
	/// - [`Error::InvalidArgument`] for a negative index, before any movement.
	/// - [`Error::NotFound`] if the series has `index` or fewer elements.
	pub fn get_at(&self, index: isize) -> Result<(C::Key, C::Value), C::Key> {
		if index < 0 {
			return Err(Error::InvalidArgument("index must not be negative"));
		}
		self.navigate(|c| {
			if !c.move_first()? {
				return Err(Error::NotFound);
			}
			for _ in 0..index {
				if !c.move_next()? {
					return Err(Error::NotFound);
				}
			}
			Self::current_pair(c)
		})
	}

	/// Independent enumerator over all pairs in key order.
	pub fn iter(&self) -> Iter<C> {
		Iter::new(self.source.create())
	}

	/// Independent, single-pass sequence of all keys.
	pub fn keys(&self) -> Keys<C> {
		Keys(self.iter())
	}

	/// Independent, single-pass sequence of all values.
	pub fn values(&self) -> Values<C> {
		Values(self.iter())
	}

	/// Asynchronous cursor over the series.
	///
	/// The underlying cursor is created on the first asynchronous move.
	pub fn async_cursor(&self) -> AsyncCursor<C, impl FnOnce() -> C + Send + '_>
	where
		C: Sync,
	{
		let source = &self.source;
		AsyncCursor::new(move || source.create())
	}

	/// Returns a concrete, unpositioned cursor over the series.
	///
	/// This is the typed counterpart of [`Series::async_cursor`], for callers
	/// that need the cursor rather than the adapter.
	pub fn typed_cursor(&self) -> C {
		self.source.create()
	}
}

impl<'s, C: Cursor> IntoIterator for &'s Series<C> {
	type Item = Result<(C::Key, C::Value), C::Key>;
	type IntoIter = Iter<C>;

	fn into_iter(self) -> Iter<C> {
		self.iter()
	}
}

/// Enumerator driving one independent cursor to completion.
///
/// Yields `Err` once if a movement fails (for example on an out-of-order
/// disruption), then ends. The cursor can be recovered with
/// [`ConcreteCursor::try_unwrap_concrete`](crate::ConcreteCursor::try_unwrap_concrete)
/// to resynchronize it.
pub struct Iter<C: Cursor> {
	cursor: C,
	done: bool,
}

impl<C: Cursor> Iter<C> {
	pub(crate) fn new(mut cursor: C) -> Self {
		cursor.set_state(CursorState::Initialized);
		Iter {
			cursor,
			done: false,
		}
	}

	/// The cursor behind this enumerator.
	pub fn cursor(&self) -> &C {
		&self.cursor
	}

	/// Consumes the enumerator, returning its cursor.
	pub fn into_cursor(self) -> C {
		self.cursor
	}
}

impl<C: Cursor> Iterator for Iter<C> {
	type Item = Result<(C::Key, C::Value), C::Key>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}
		match self.cursor.move_next() {
			Ok(true) => {
				let item = self.cursor.current().map(|(k, v)| (k.clone(), v.clone()));
				if item.is_err() {
					self.done = true;
				}
				Some(item)
			}
			Ok(false) => {
				self.done = true;
				None
			}
			Err(e) => {
				self.done = true;
				Some(Err(e))
			}
		}
	}
}

impl<C: Cursor> FusedIterator for Iter<C> {}

/// Keys of a series, see [`Series::keys`].
pub struct Keys<C: Cursor>(Iter<C>);

impl<C: Cursor> Iterator for Keys<C> {
	type Item = Result<C::Key, C::Key>;

	fn next(&mut self) -> Option<Self::Item> {
		self.0.next().map(|r| r.map(|(k, _)| k))
	}
}

impl<C: Cursor> FusedIterator for Keys<C> {}

/// Values of a series, see [`Series::values`].
pub struct Values<C: Cursor>(Iter<C>);

impl<C: Cursor> Iterator for Values<C> {
	type Item = Result<C::Value, C::Key>;

	fn next(&mut self) -> Option<Self::Item> {
		self.0.next().map(|r| r.map(|(_, v)| v))
	}
}

impl<C: Cursor> FusedIterator for Values<C> {}
