//! Asynchronous, cancellable consumption of a pull-based cursor.
//!
//! [`AsyncCursor`] wraps a factory producing a fresh cursor. The cursor is
//! created on the first asynchronous move. Each [`AsyncCursor::move_next`]
//! first tries the inner cursor synchronously; only when no element is
//! available and the series is still live does it suspend until the backend
//! signals new data or the caller cancels.
//!
//! ## State Machine
//!
//! ```text
//!   Created ──► Resumed ◄──► Suspended
//!                  │             │
//!                  ├─────────────┼──► Completed   end of data
//!                  │             ├──► Canceled    token fired while suspended
//!                  └─────────────┴──► Faulted     movement error
//! ```
//!
//! [`AsyncCursor::move_at`] leaves `Faulted` or `Canceled` for `Resumed` when
//! the lookup finds an element, and for `Suspended` when it does not: the
//! inner cursor is then anchored at the lookup key and the next move waits
//! there for new data.
//!
//! Only one `move_next` can be outstanding at a time; this is enforced by
//! `&mut self`.

use std::fmt;
use std::future::Future;

use futures::stream::{self, Stream};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cursor::{Cursor, Lookup};
use crate::error::{Error, Result};
use crate::series::Iter;

/// Lifecycle of an [`AsyncCursor`].
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum AsyncState {
	/// No move was attempted yet; the inner cursor may not exist.
	Created,
	/// No element is available at the current position; the next move waits
	/// for the backend to signal new data.
	Suspended,
	/// The last move produced a value.
	Resumed,
	/// End of data was reached on a complete series.
	Completed,
	/// Cancellation was requested while suspended.
	Canceled,
	/// A movement raised an error; reposition with [`AsyncCursor::move_at`].
	Faulted,
}

/// Capability to move a cursor asynchronously.
pub trait MoveNextAsync {
	/// Key type of the underlying series.
	type Key;

	/// Moves to the next element, waiting for new data if necessary.
	fn move_next_async(
		&mut self,
		cancel: &CancellationToken,
	) -> impl Future<Output = Result<bool, Self::Key>> + Send;
}

/// Capability to recover the concrete cursor behind a wrapper.
pub trait ConcreteCursor {
	/// The wrapped cursor type.
	type Cursor: Cursor;

	/// Returns the wrapped cursor, or `None` if this wrapper cannot provide one.
	fn try_unwrap_concrete(self) -> Option<Self::Cursor>;
}

/// Adapter presenting a synchronous cursor as an asynchronous sequence.
pub struct AsyncCursor<C, F> {
	factory: Option<F>,
	inner: Option<C>,
	state: AsyncState,
}

impl<C: Cursor, F> fmt::Debug for AsyncCursor<C, F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AsyncCursor")
			.field("state", &self.state)
			.field("created", &self.inner.is_some())
			.finish()
	}
}

impl<C, F> AsyncCursor<C, F>
where
	C: Cursor,
	F: FnOnce() -> C,
{
	/// Creates an adapter; `factory` runs on the first move.
	pub fn new(factory: F) -> Self {
		AsyncCursor {
			factory: Some(factory),
			inner: None,
			state: AsyncState::Created,
		}
	}

	/// Current lifecycle state.
	pub fn state(&self) -> AsyncState {
		self.state
	}

	/// The inner cursor, if it was created.
	pub fn inner(&self) -> Option<&C> {
		self.inner.as_ref()
	}

	/// Consumes the adapter, returning the inner cursor if it was created.
	///
	/// After a cancellation the inner cursor still stands on the last element
	/// the adapter produced, so nothing already read is lost.
	pub fn into_inner(self) -> Option<C> {
		self.inner
	}

	fn cursor_mut(&mut self) -> &mut C {
		let factory = &mut self.factory;
		self.inner.get_or_insert_with(|| {
			// exactly one of `factory` and `inner` is set
			let factory = factory.take().expect("cursor factory already consumed");
			factory()
		})
	}

	/// Key and value at the current position.
	pub fn current(&self) -> Result<(&C::Key, &C::Value), C::Key> {
		match &self.inner {
			Some(cursor) => cursor.current(),
			None => Err(Error::InvalidState("cursor is not positioned")),
		}
	}

	/// Key at the current position.
	pub fn current_key(&self) -> Result<&C::Key, C::Key> {
		self.current().map(|(k, _)| k)
	}

	/// Value at the current position.
	pub fn current_value(&self) -> Result<&C::Value, C::Key> {
		self.current().map(|(_, v)| v)
	}

	/// Repositions the inner cursor, clearing a faulted or canceled state.
	///
	/// This is how a consumer recovers from an out-of-order disruption raised
	/// through the adapter.
	pub fn move_at(&mut self, key: &C::Key, direction: Lookup) -> Result<bool, C::Key> {
		let result = self.cursor_mut().move_at(key, direction);
		self.state = match result {
			Ok(true) => AsyncState::Resumed,
			Ok(false) => AsyncState::Suspended,
			Err(_) => AsyncState::Faulted,
		};
		result
	}

	/// Moves to the next element.
	///
	/// Resolves to `Ok(true)` once an element is available, `Ok(false)` at the
	/// end of a complete series, and `Err(Error::Canceled)` if `cancel` fires
	/// while waiting. Cancellation is only observed while suspended: an element
	/// that is available synchronously is returned even if `cancel` already
	/// fired.
	pub async fn move_next(&mut self, cancel: &CancellationToken) -> Result<bool, C::Key> {
		match self.state {
			AsyncState::Completed => return Ok(false),
			AsyncState::Canceled => return Err(Error::Canceled),
			AsyncState::Faulted => {
				return Err(Error::InvalidState("async cursor faulted; reposition with move_at"))
			}
			_ => {}
		}

		loop {
			let cursor = self.cursor_mut();
			let Some(updates) = cursor.updates() else {
				let result = cursor.move_next();
				self.state = match result {
					Ok(true) => AsyncState::Resumed,
					Ok(false) => AsyncState::Completed,
					Err(_) => AsyncState::Faulted,
				};
				return result;
			};

			// Register interest before looking, so a write landing between the
			// failed move and the await is not missed.
			let notified = updates.notified();
			tokio::pin!(notified);
			notified.as_mut().enable();

			match cursor.move_next() {
				Ok(true) => {
					self.state = AsyncState::Resumed;
					return Ok(true);
				}
				Ok(false) => {
					// Completed since the move: look once more, a final write
					// may have landed in between.
					if cursor.updates().is_none() {
						continue;
					}
				}
				Err(e) => {
					self.state = AsyncState::Faulted;
					return Err(e);
				}
			}

			self.state = AsyncState::Suspended;
			tokio::select! {
				biased;
				_ = cancel.cancelled() => {
					debug!("async cursor canceled while waiting for data");
					self.state = AsyncState::Canceled;
					return Err(Error::Canceled);
				}
				_ = &mut notified => {}
			}
		}
	}

	/// Converts the adapter into a stream of owned pairs.
	///
	/// The stream ends at the end of a complete series, and yields a final
	/// `Err` on cancellation or movement errors.
	pub fn into_stream(
		self,
		cancel: CancellationToken,
	) -> impl Stream<Item = Result<(C::Key, C::Value), C::Key>> {
		stream::unfold(Some((self, cancel)), |state| async move {
			let (mut cursor, cancel) = state?;
			match cursor.move_next(&cancel).await {
				Ok(true) => {
					let item = cursor.current().map(|(k, v)| (k.clone(), v.clone()));
					let next = if item.is_ok() { Some((cursor, cancel)) } else { None };
					Some((item, next))
				}
				Ok(false) => None,
				Err(e) => Some((Err(e), None)),
			}
		})
	}
}

impl<C, F> MoveNextAsync for AsyncCursor<C, F>
where
	C: Cursor,
	F: FnOnce() -> C + Send,
{
	type Key = C::Key;

	fn move_next_async(
		&mut self,
		cancel: &CancellationToken,
	) -> impl Future<Output = Result<bool, C::Key>> + Send {
		self.move_next(cancel)
	}
}

impl<C, F> ConcreteCursor for AsyncCursor<C, F>
where
	C: Cursor,
	F: FnOnce() -> C,
{
	type Cursor = C;

	fn try_unwrap_concrete(mut self) -> Option<C> {
		self.cursor_mut();
		self.inner
	}
}

impl<C: Cursor> MoveNextAsync for Iter<C> {
	type Key = C::Key;

	fn move_next_async(
		&mut self,
		_cancel: &CancellationToken,
	) -> impl Future<Output = Result<bool, C::Key>> + Send {
		std::future::ready(Err(Error::NotSupported(
			"enumerators move synchronously; use AsyncCursor for asynchronous movement",
		)))
	}
}

impl<C: Cursor> ConcreteCursor for Iter<C> {
	type Cursor = C;

	fn try_unwrap_concrete(self) -> Option<C> {
		Some(self.into_cursor())
	}
}
