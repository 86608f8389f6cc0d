//! Shared helpers for integration tests.

#![allow(dead_code)]

use seriescursor::mem::{SortedCursor, SortedMap};
use seriescursor::{Cursor, CursorState, Lookup, Result, Series};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A cursor that counts how many cursors were created over its series and
/// tags each one with its creation number.
#[derive(Clone, Debug)]
pub struct CountingCursor {
	inner: SortedCursor<i64, i64>,
	created: Arc<AtomicUsize>,
	pub id: usize,
}

impl CountingCursor {
	/// Returns a fresh cursor over `map` with id 0 and a new counter.
	pub fn over(map: &SortedMap<i64, i64>) -> Self {
		CountingCursor {
			inner: map.cursor(),
			created: Arc::new(AtomicUsize::new(1)),
			id: 0,
		}
	}

	/// Total number of cursors created over the series so far.
	pub fn created(&self) -> usize {
		self.created.load(Ordering::SeqCst)
	}
}

impl Cursor for CountingCursor {
	type Key = i64;
	type Value = i64;

	fn state(&self) -> CursorState {
		self.inner.state()
	}

	fn set_state(&mut self, state: CursorState) {
		self.inner.set_state(state)
	}

	fn create(&self) -> Self {
		let id = self.created.fetch_add(1, Ordering::SeqCst);
		CountingCursor {
			inner: self.inner.create(),
			created: Arc::clone(&self.created),
			id,
		}
	}

	fn move_first(&mut self) -> Result<bool, i64> {
		self.inner.move_first()
	}

	fn move_last(&mut self) -> Result<bool, i64> {
		self.inner.move_last()
	}

	fn move_next(&mut self) -> Result<bool, i64> {
		self.inner.move_next()
	}

	fn move_at(&mut self, key: &i64, direction: Lookup) -> Result<bool, i64> {
		self.inner.move_at(key, direction)
	}

	fn current_key(&self) -> Result<&i64, i64> {
		self.inner.current_key()
	}

	fn current_value(&self) -> Result<&i64, i64> {
		self.inner.current_value()
	}
}

/// Installs a test-friendly tracing subscriber once per test binary.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

/// Builds a map holding `pairs`.
pub fn map_of(pairs: &[(i64, i64)]) -> SortedMap<i64, i64> {
	pairs.iter().copied().collect()
}

/// Builds a counting series holding `pairs`.
pub fn counting_series(pairs: &[(i64, i64)]) -> (Series<CountingCursor>, CountingCursor) {
	let map = map_of(pairs);
	let source = CountingCursor::over(&map);
	let probe = source.clone();
	(Series::new(source), probe)
}
