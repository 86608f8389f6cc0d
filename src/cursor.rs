//! The cursor capability shared by every ordered-series backend.
//!
//! A [`Cursor`] is a stateful, positioned traversal handle over a series. It
//! can move forward, optionally backward, to either bound, or to an arbitrary
//! key through a directional [`Lookup`]. Backends implement this trait over
//! their own storage; everything else in the crate ([`Series`](crate::Series),
//! [`AsyncCursor`](crate::AsyncCursor)) is written against it.

use std::sync::Arc;

use tokio::sync::Notify;

use crate::error::{Error, Result};

/// Directional lookup used by [`Cursor::move_at`] and [`Series::try_find`](crate::Series::try_find).
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Lookup {
	/// Less than.
	LT,
	/// Less than or equal.
	LE,
	/// Exactly equal.
	EQ,
	/// Greater than or equal.
	GE,
	/// Greater than.
	GT,
}

impl Lookup {
	/// Returns `true` for the lookups that search toward higher keys.
	pub fn is_forward(self) -> bool {
		matches!(self, Lookup::GE | Lookup::GT)
	}

	/// Returns `true` for the lookups that search toward lower keys.
	pub fn is_backward(self) -> bool {
		matches!(self, Lookup::LE | Lookup::LT)
	}
}

/// Lifecycle tag of a cursor.
///
/// ```text
///   None ──► Initialized ──► Initialized ...
///     │
///     └────► Navigating
/// ```
///
/// There is no transition back to `None`.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Default)]
pub enum CursorState {
	/// Freshly constructed, never positioned.
	#[default]
	None,
	/// Positioned at least once, or handed out to a consumer.
	Initialized,
	/// Serving as a series' internal navigation cursor.
	Navigating,
}

impl CursorState {
	/// Returns the state after a transition to `next`.
	///
	/// `Navigating` is sticky: a navigation cursor that moves stays a
	/// navigation cursor.
	///
	/// # Panics
	///
	/// In debug builds, panics on an attempt to move back to `None`.
	#[inline]
	pub fn transition(self, next: CursorState) -> CursorState {
		debug_assert!(
			next != CursorState::None || self == CursorState::None,
			"cursor state cannot return to None"
		);
		match (self, next) {
			(CursorState::Navigating, _) => CursorState::Navigating,
			(_, CursorState::None) => self,
			(_, next) => next,
		}
	}
}

/// A stateful traversal handle over an ordered, key-unique series.
///
/// All movement methods return `Ok(true)` when the cursor is positioned on an
/// element afterwards, `Ok(false)` when no element satisfies the move, and
/// `Err(Error::OutOfOrder(..))` when the backend detects that data at or before
/// the cursor position changed since the cursor last observed it.
///
/// Reading the current element of an unpositioned cursor fails with
/// [`Error::InvalidState`].
///
/// `Clone` produces an independent cursor at the same position; it always
/// allocates. [`Cursor::create`] produces a fresh, unpositioned cursor over the
/// same series.
pub trait Cursor: Clone + Send {
	/// Key type, totally ordered.
	type Key: Ord + Clone + Send;
	/// Value type.
	type Value: Clone + Send;

	/// Current lifecycle state.
	fn state(&self) -> CursorState;

	/// Applies a lifecycle transition, see [`CursorState::transition`].
	fn set_state(&mut self, state: CursorState);

	/// Creates a brand new, unpositioned cursor over the same series.
	fn create(&self) -> Self;

	/// Moves to the smallest key. Returns `false` and leaves the cursor
	/// unpositioned if the series is empty.
	fn move_first(&mut self) -> Result<bool, Self::Key>;

	/// Moves to the largest key. Returns `false` and leaves the cursor
	/// unpositioned if the series is empty.
	fn move_last(&mut self) -> Result<bool, Self::Key>;

	/// Moves to the next key strictly greater than the current one.
	///
	/// An unpositioned cursor moves to the first key.
	fn move_next(&mut self) -> Result<bool, Self::Key>;

	/// Moves to the previous key strictly smaller than the current one.
	///
	/// Backward movement is optional.
	fn move_prev(&mut self) -> Result<bool, Self::Key> {
		Err(Error::NotSupported("backward movement"))
	}

	/// Moves to the key satisfying `direction` relative to `key`.
	fn move_at(&mut self, key: &Self::Key, direction: Lookup) -> Result<bool, Self::Key>;

	/// Key at the current position.
	fn current_key(&self) -> Result<&Self::Key, Self::Key>;

	/// Value at the current position.
	fn current_value(&self) -> Result<&Self::Value, Self::Key>;

	/// Key and value at the current position.
	fn current(&self) -> Result<(&Self::Key, &Self::Value), Self::Key> {
		Ok((self.current_key()?, self.current_value()?))
	}

	/// Signal notified whenever new data may be available.
	///
	/// `None` means the series is complete and a `false` from
	/// [`Cursor::move_next`] is final. Live backends return a [`Notify`] that
	/// they trigger on every write and on completion.
	fn updates(&self) -> Option<Arc<Notify>> {
		None
	}
}
