//! # Integration Tests for Series Navigation
//!
//! End-to-end tests that exercise series, cursors and the out-of-order
//! recovery contract through the public API.

mod common;

use common::{counting_series, init_tracing, map_of};
use rand::prelude::*;
use seriescursor::mem::SortedMap;
use seriescursor::{ConcreteCursor, Cursor, CursorState, Error, Lookup, OutOfOrderKey};
use std::collections::BTreeMap;
use std::thread;

// ===========================================================================
// Random Access
// ===========================================================================

#[test]
fn try_find_scenario() {
	let map: SortedMap<i32, &str> = [(1, "a"), (3, "b"), (5, "c")].into_iter().collect();
	let series = map.series();

	assert_eq!(series.try_find(&3, Lookup::EQ).unwrap(), Some((3, "b")));
	assert_eq!(series.try_find(&4, Lookup::GE).unwrap(), Some((5, "c")));
	assert_eq!(series.try_find(&4, Lookup::LE).unwrap(), Some((3, "b")));
	assert_eq!(series.try_find(&6, Lookup::GE).unwrap(), None);
}

#[test]
fn empty_series_scenario() {
	let map: SortedMap<i32, &str> = SortedMap::new();
	let series = map.series();

	assert_eq!(series.first(), Err(Error::EmptySeries));
	assert_eq!(series.last(), Err(Error::EmptySeries));
	assert!(series.is_empty().unwrap());
	assert_eq!(series.get_at(0), Err(Error::NotFound));
}

#[test]
fn get_at_counts_from_first_element() {
	let pairs: Vec<(i64, i64)> = (0..100).map(|i| (i * 2, i)).collect();
	let series = map_of(&pairs).series();

	for (i, pair) in pairs.iter().enumerate() {
		assert_eq!(series.get_at(i as isize).unwrap(), *pair, "index {}", i);
	}
	assert_eq!(series.get_at(100), Err(Error::NotFound));
	assert_eq!(series.get_at(-1), Err(Error::InvalidArgument("index must not be negative")));
}

#[test]
fn random_access_matches_btreemap() {
	let mut rng = rand::rng();
	let mut expected = BTreeMap::new();
	let map = SortedMap::new();
	for _ in 0..1_000 {
		let key: i64 = rng.random_range(0..5_000);
		map.insert(key, key * 10).unwrap();
		expected.insert(key, key * 10);
	}
	let series = map.series();

	assert_eq!(series.first().unwrap(), expected.first_key_value().map(|(k, v)| (*k, *v)).unwrap());
	assert_eq!(series.last().unwrap(), expected.last_key_value().map(|(k, v)| (*k, *v)).unwrap());

	for _ in 0..1_000 {
		let probe: i64 = rng.random_range(-10..5_010);
		let ge = expected.range(probe..).next().map(|(k, v)| (*k, *v));
		let le = expected.range(..=probe).next_back().map(|(k, v)| (*k, *v));
		assert_eq!(series.try_find(&probe, Lookup::GE).unwrap(), ge);
		assert_eq!(series.try_find(&probe, Lookup::LE).unwrap(), le);
	}

	let keys: Vec<i64> = series.keys().collect::<Result<_, _>>().unwrap();
	assert_eq!(keys, expected.keys().copied().collect::<Vec<_>>());
	let values: Vec<i64> = series.values().collect::<Result<_, _>>().unwrap();
	assert_eq!(values, expected.values().copied().collect::<Vec<_>>());
}

// ===========================================================================
// Owner Cursor
// ===========================================================================

#[test]
fn owner_clone_reuses_spare_cursor_once() {
	init_tracing();
	let (series, probe) = counting_series(&[(1, 10), (2, 20)]);
	// source + spare
	assert_eq!(probe.created(), 2);

	let first = series.clone_cursor();
	assert_eq!(first.id, 1);
	assert_eq!(first.state(), CursorState::Initialized);
	assert_eq!(probe.created(), 2);

	let second = series.clone_cursor();
	assert_ne!(second.id, first.id);
	assert_eq!(probe.created(), 3);

	let third = series.clone_cursor();
	assert_ne!(third.id, second.id);
	assert_eq!(probe.created(), 4);
}

#[test]
fn navigation_cursor_never_takes_spare() {
	let (series, probe) = counting_series(&[(1, 10)]);
	assert_eq!(series.first().unwrap(), (1, 10));
	assert_eq!(series.last().unwrap(), (1, 10));
	// one navigation cursor, created once
	assert_eq!(probe.created(), 3);

	let owned = series.clone_cursor();
	assert_eq!(owned.id, 1);
	assert_eq!(probe.created(), 3);
}

#[test]
fn clone_from_other_thread_allocates() {
	let (series, probe) = counting_series(&[(1, 10)]);
	let remote_id = thread::scope(|s| s.spawn(|| series.clone_cursor().id).join().unwrap());
	assert_eq!(remote_id, 2);
	assert_eq!(probe.created(), 3);

	// The owner still gets the spare.
	assert_eq!(series.clone_cursor().id, 1);
	assert_eq!(series.owner(), thread::current().id());
}

#[test]
fn enumeration_always_creates_cursors() {
	let (series, probe) = counting_series(&[(1, 10), (2, 20)]);
	let a = series.iter();
	let b = series.iter();
	assert_eq!(probe.created(), 4);
	assert_ne!(a.cursor().id, b.cursor().id);
	assert_ne!(a.cursor().id, 1);

	let typed = series.typed_cursor();
	assert_eq!(typed.state(), CursorState::None);
	assert_eq!(probe.created(), 5);
}

#[test]
fn backward_movement_is_optional() {
	let (series, _) = counting_series(&[(1, 10)]);
	let mut cursor = series.clone_cursor();
	assert!(cursor.move_last().unwrap());
	assert!(matches!(cursor.move_prev(), Err(Error::NotSupported(_))));
}

// ===========================================================================
// Out-of-Order Recovery
// ===========================================================================

#[test]
fn recovery_idioms() {
	let map = map_of(&[(1, 1), (3, 3), (5, 5), (7, 7)]);
	let mut cursor = map.cursor();
	assert!(cursor.move_at(&5, Lookup::EQ).unwrap());

	map.insert(4, 4).unwrap();
	let err = cursor.move_next().unwrap_err();
	assert!(err.is_recoverable());
	let ooo = err.as_out_of_order().cloned().unwrap();
	assert_eq!(ooo, OutOfOrderKey::new(5, 4));

	// Replay from the out-of-order key.
	let mut replay = cursor.clone();
	assert!(replay.move_at(ooo.new_key().unwrap(), Lookup::EQ).unwrap());
	assert_eq!(replay.current().unwrap(), (&4, &4));
	assert!(replay.move_next().unwrap());
	assert_eq!(replay.current_key().unwrap(), &5);

	// Or skip it.
	assert!(cursor.move_at(ooo.current_key(), Lookup::GT).unwrap());
	assert_eq!(cursor.current_key().unwrap(), &7);
}

#[test]
fn disrupted_enumeration_can_be_resumed() {
	let map = map_of(&[(10, 1), (20, 2), (30, 3), (40, 4)]);
	let series = map.series();
	let mut iter = series.iter();
	assert_eq!(iter.next(), Some(Ok((10, 1))));
	assert_eq!(iter.next(), Some(Ok((20, 2))));

	map.insert(15, 0).unwrap();
	let err = iter.next().unwrap().unwrap_err();
	assert_eq!(iter.next(), None);

	let ooo = err.as_out_of_order().unwrap();
	let mut cursor = iter.try_unwrap_concrete().unwrap();
	assert!(cursor.move_at(ooo.new_key().unwrap(), Lookup::EQ).unwrap());
	let mut rest = vec![*cursor.current_key().unwrap()];
	while cursor.move_next().unwrap() {
		rest.push(*cursor.current_key().unwrap());
	}
	assert_eq!(rest, vec![15, 20, 30, 40]);
}

#[test]
fn navigation_ignores_writes_between_calls() {
	let map = map_of(&[(1, 1), (2, 2), (3, 3)]);
	let series = map.series();
	assert_eq!(series.get_at(2).unwrap(), (3, 3));
	// Navigation always starts from an absolute move, so writes between
	// calls never surface as disruptions.
	map.insert(0, 0).unwrap();
	assert_eq!(series.get_at(2).unwrap(), (2, 2));
	assert_eq!(series.first().unwrap(), (0, 0));
}

#[test]
fn iterate_by_reference() {
	let map = map_of(&[(1, 10), (2, 20)]);
	let series = map.series();
	let mut seen = vec![];
	for pair in &series {
		seen.push(pair.unwrap());
	}
	assert_eq!(seen, vec![(1, 10), (2, 20)]);
}
