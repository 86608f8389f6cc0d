//! # Error Types for Series Cursors
//!
//! This module defines the error taxonomy shared by cursors, series navigation
//! and the asynchronous cursor adapter.
//!
//! ## Error Handling Strategy
//!
//! Most errors are ordinary failures of a single call (an empty series, a
//! missing index, a bad argument). One is different: [`Error::OutOfOrder`] is
//! an expected, recoverable signal raised by live series that accept writes
//! behind a cursor's position. It carries an [`OutOfOrderKey`] payload with
//! enough information to resynchronize the cursor.
//!
//! ## Recovery Flow
//!
//! ```text
//! cursor.move_next()
//!      │
//!      ├──► Ok(true)  ───► read current
//!      │
//!      ├──► Ok(false) ───► end of data
//!      │
//!      └──► Err(OutOfOrder(ooo))
//!                │
//!                ├──► move_at(ooo.current_key(), Lookup::GT)   skip the disruption
//!                │
//!                └──► move_at(ooo.new_key(), Lookup::EQ)       replay from it
//! ```
//!
//! Cursors never recover on their own. After an out-of-order error the
//! cursor's position is invalid and every relative move fails with
//! [`Error::InvalidState`] until the consumer repositions it.

use thiserror::Error;

/// Errors that can occur while moving cursors or querying a series.
///
/// `K` is the key type of the series. Only [`Error::OutOfOrder`] carries a key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error<K> {
	/// An argument was rejected before any cursor movement happened.
	///
	/// Raised by [`Series::get_at`](crate::Series::get_at) for a negative index.
	#[error("invalid argument: {0}")]
	InvalidArgument(&'static str),

	/// `first` or `last` was requested from a series with no elements.
	#[error("series is empty")]
	EmptySeries,

	/// The requested position does not exist in the series.
	#[error("key not found")]
	NotFound,

	/// Data at or before the cursor position changed after the cursor observed it.
	///
	/// This is the only recoverable variant. See [`OutOfOrderKey`] for the
	/// recovery idioms.
	#[error("out of order data")]
	OutOfOrder(OutOfOrderKey<K>),

	/// The entry point does not support the requested operation.
	///
	/// Asynchronous movement through a synchronous enumerator fails with this
	/// variant; use [`AsyncCursor`](crate::AsyncCursor) instead.
	#[error("operation not supported: {0}")]
	NotSupported(&'static str),

	/// The cursor is not positioned, or was invalidated by an out-of-order
	/// disruption and has not been repositioned yet.
	#[error("cursor is in an invalid state: {0}")]
	InvalidState(&'static str),

	/// An asynchronous move was cancelled while waiting for data.
	#[error("operation was canceled")]
	Canceled,
}

impl<K> Error<K> {
	/// Returns `true` if the error is an expected signal the consumer can recover from.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, Error::OutOfOrder(_))
	}

	/// Returns the out-of-order payload, if this is an out-of-order error.
	pub fn as_out_of_order(&self) -> Option<&OutOfOrderKey<K>> {
		match self {
			Error::OutOfOrder(ooo) => Some(ooo),
			_ => None,
		}
	}
}

impl<K> From<OutOfOrderKey<K>> for Error<K> {
	fn from(ooo: OutOfOrderKey<K>) -> Self {
		Error::OutOfOrder(ooo)
	}
}

/// Payload describing an out-of-order disruption.
///
/// Raised during cursor movement when new data could affect values the cursor
/// already produced: a key at or before the current position was inserted,
/// updated or removed after the cursor last observed that region.
///
/// Two recovery idioms exist:
/// - `move_at(current_key, Lookup::GT)` continues as if nothing happened.
/// - `move_at(new_key, Lookup::EQ)` replays from the out-of-order point.
///
/// The state of the cursor is undefined after the error is raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("out of order data")]
pub struct OutOfOrderKey<K> {
	current_key: K,
	new_key: Option<K>,
}

impl<K> OutOfOrderKey<K> {
	/// Creates a payload whose out-of-order key is known.
	pub fn new(current_key: K, new_key: K) -> Self {
		OutOfOrderKey {
			current_key,
			new_key: Some(new_key),
		}
	}

	/// Creates a payload for a disruption whose key could not be determined.
	pub fn unknown(current_key: K) -> Self {
		OutOfOrderKey {
			current_key,
			new_key: None,
		}
	}

	/// The key the cursor was at, or was about to move from, when the disruption was detected.
	pub fn current_key(&self) -> &K {
		&self.current_key
	}

	/// The key of the out-of-order write, when known.
	pub fn new_key(&self) -> Option<&K> {
		self.new_key.as_ref()
	}

	/// Whether [`OutOfOrderKey::new_key`] is available.
	pub fn has_known_new_key(&self) -> bool {
		self.new_key.is_some()
	}

	/// Consumes the payload, returning `(current_key, new_key)`.
	pub fn into_parts(self) -> (K, Option<K>) {
		(self.current_key, self.new_key)
	}
}

/// A Result type alias using the crate's [`Error`] type.
pub type Result<T, K> = std::result::Result<T, Error<K>>;
