//! Conformance checks for cursor backends.
//!
//! These checks verify that a backend behaves according to the [`Cursor`]
//! contract when consumed through a [`Series`]. To use them with a custom
//! backend, pass a function that builds a series holding exactly the given
//! pairs.
//!
//! ```
//! use seriescursor::{conformance::conformance, mem::SortedMap};
//!
//! conformance(|pairs| pairs.iter().copied().collect::<SortedMap<i64, i64>>().series()).unwrap();
//! ```

use crate::cursor::{Cursor, CursorState, Lookup};
use crate::error::{Error, Result};
use crate::series::Series;

/// Run all conformance checks against a backend.
pub fn conformance<C, F>(build: F) -> Result<(), i64>
where
	C: Cursor<Key = i64, Value = i64>,
	F: Fn(&[(i64, i64)]) -> Series<C>,
{
	test_empty_series(&build)?;
	test_bounds(&build)?;
	test_directional_lookup(&build)?;
	test_get_at(&build)?;
	test_independent_cursors(&build)?;
	test_owner_cursor(&build)?;
	test_cursor_movement(&build)?;
	Ok(())
}

const SAMPLE: &[(i64, i64)] = &[(1, 10), (3, 30), (5, 50)];

/// An empty series is empty, and `first`/`last` fail with [`Error::EmptySeries`].
pub fn test_empty_series<C, F>(build: &F) -> Result<(), i64>
where
	C: Cursor<Key = i64, Value = i64>,
	F: Fn(&[(i64, i64)]) -> Series<C>,
{
	let series = build(&[]);
	assert!(series.is_empty()?);
	assert_eq!(series.first(), Err(Error::EmptySeries));
	assert_eq!(series.last(), Err(Error::EmptySeries));
	assert_eq!(series.try_get_first()?, None);
	assert_eq!(series.try_get_last()?, None);
	assert!(!series.clone_cursor().move_first()?);
	assert_eq!(series.iter().count(), 0);
	Ok(())
}

/// `first`/`last` return the minimum and maximum keys, and `is_empty` agrees
/// with `move_first` on a fresh cursor.
pub fn test_bounds<C, F>(build: &F) -> Result<(), i64>
where
	C: Cursor<Key = i64, Value = i64>,
	F: Fn(&[(i64, i64)]) -> Series<C>,
{
	let series = build(&[(5, 50), (1, 10), (3, 30)]);
	assert!(!series.is_empty()?);
	assert!(series.typed_cursor().move_first()?);
	assert_eq!(series.first()?, (1, 10));
	assert_eq!(series.last()?, (5, 50));
	Ok(())
}

/// Directional lookups through `try_find`.
pub fn test_directional_lookup<C, F>(build: &F) -> Result<(), i64>
where
	C: Cursor<Key = i64, Value = i64>,
	F: Fn(&[(i64, i64)]) -> Series<C>,
{
	let series = build(SAMPLE);
	assert_eq!(series.try_find(&3, Lookup::EQ)?, Some((3, 30)));
	assert_eq!(series.try_find(&4, Lookup::GE)?, Some((5, 50)));
	assert_eq!(series.try_find(&4, Lookup::LE)?, Some((3, 30)));
	assert_eq!(series.try_find(&3, Lookup::GT)?, Some((5, 50)));
	assert_eq!(series.try_find(&3, Lookup::LT)?, Some((1, 10)));
	assert_eq!(series.try_find(&6, Lookup::GE)?, None);
	assert_eq!(series.try_find(&0, Lookup::LE)?, None);
	assert_eq!(series.try_find(&4, Lookup::EQ)?, None);
	Ok(())
}

/// `get_at` is 0-based and rejects out-of-range indices.
pub fn test_get_at<C, F>(build: &F) -> Result<(), i64>
where
	C: Cursor<Key = i64, Value = i64>,
	F: Fn(&[(i64, i64)]) -> Series<C>,
{
	let series = build(SAMPLE);
	for (i, pair) in SAMPLE.iter().enumerate() {
		assert_eq!(series.get_at(i as isize)?, *pair);
	}
	assert_eq!(series.get_at(SAMPLE.len() as isize), Err(Error::NotFound));
	assert!(matches!(series.get_at(-1), Err(Error::InvalidArgument(_))));
	Ok(())
}

/// Cursors obtained independently never observe each other's movement.
pub fn test_independent_cursors<C, F>(build: &F) -> Result<(), i64>
where
	C: Cursor<Key = i64, Value = i64>,
	F: Fn(&[(i64, i64)]) -> Series<C>,
{
	let series = build(SAMPLE);
	let mut a = series.keys();
	let mut b = series.keys();
	assert_eq!(a.next().transpose()?, Some(1));
	assert_eq!(a.next().transpose()?, Some(3));
	assert_eq!(b.next().transpose()?, Some(1));
	assert_eq!(series.first()?, (1, 10));
	assert_eq!(a.next().transpose()?, Some(5));
	assert_eq!(b.next().transpose()?, Some(3));

	let mut c = series.clone_cursor();
	assert!(c.move_last()?);
	let d = c.clone();
	assert!(c.move_first()?);
	assert_eq!(c.current_key()?, &1);
	assert_eq!(d.current_key()?, &5);
	Ok(())
}

/// The owner thread's first clone moves out of `None`; later clones are fresh.
pub fn test_owner_cursor<C, F>(build: &F) -> Result<(), i64>
where
	C: Cursor<Key = i64, Value = i64>,
	F: Fn(&[(i64, i64)]) -> Series<C>,
{
	let series = build(SAMPLE);
	let mut first = series.clone_cursor();
	let mut second = series.clone_cursor();
	assert_eq!(first.state(), CursorState::Initialized);
	assert_eq!(second.state(), CursorState::Initialized);
	assert!(first.move_first()?);
	assert!(second.move_last()?);
	assert_eq!(first.current_key()?, &1);
	assert_eq!(second.current_key()?, &5);
	Ok(())
}

/// Raw movement contract: `move_next` from unpositioned starts at the first
/// key, reading an unpositioned cursor fails, and `create` is unpositioned.
pub fn test_cursor_movement<C, F>(build: &F) -> Result<(), i64>
where
	C: Cursor<Key = i64, Value = i64>,
	F: Fn(&[(i64, i64)]) -> Series<C>,
{
	let series = build(SAMPLE);
	let mut cursor = series.typed_cursor();
	assert!(matches!(cursor.current(), Err(Error::InvalidState(_))));
	let mut keys = vec![];
	while cursor.move_next()? {
		keys.push(*cursor.current_key()?);
	}
	assert_eq!(keys, vec![1, 3, 5]);

	assert!(cursor.move_at(&2, Lookup::GE)?);
	assert_eq!(cursor.current()?, (&3, &30));
	let fresh = cursor.create();
	assert_eq!(fresh.state(), CursorState::None);
	assert!(fresh.current().is_err());
	assert_eq!(cursor.current_key()?, &3);
	Ok(())
}
