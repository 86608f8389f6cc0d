//! In-memory, live ordered series.
//!
//! [`SortedMap`] stores its entries in a [`BTreeMap`] behind a read-write
//! lock. It accepts writes while cursors are traversing it, including writes
//! at or before a cursor's position. Such out-of-order writes are recorded
//! with the map version at which they happened, so that a [`SortedCursor`]
//! moving relative to its position can tell whether the region it already
//! traversed changed and raise [`Error::OutOfOrder`].
//!
//! The map notifies waiting asynchronous cursors on every write and when it is
//! marked complete.
//!
//! ```
//! use seriescursor::{mem::SortedMap, Cursor, Lookup};
//!
//! let map = SortedMap::new();
//! map.append(1, "a").unwrap();
//! map.append(3, "b").unwrap();
//!
//! let mut cursor = map.cursor();
//! assert!(cursor.move_next().unwrap());
//! assert_eq!(cursor.current_key().unwrap(), &1);
//!
//! // A write behind the cursor disrupts it.
//! map.insert(0, "z").unwrap();
//! let err = cursor.move_next().unwrap_err();
//! let ooo = err.as_out_of_order().unwrap();
//! assert_eq!(ooo.new_key(), Some(&0));
//!
//! // Replay from the out-of-order key.
//! assert!(cursor.move_at(&0, Lookup::EQ).unwrap());
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::ops::Bound;
use std::sync::Arc;

use tokio::sync::Notify;
use tracing::trace;

use crate::config::MapConfig;
use crate::cursor::{Cursor, CursorState, Lookup};
use crate::error::{Error, OutOfOrderKey, Result};
use crate::series::Series;
use crate::sync::{AtomicBool, Ordering, RwLock};

struct Inner<K, V> {
	map: BTreeMap<K, V>,
	/// Incremented on every write.
	version: u64,
	/// Out-of-order writes as `(version, key)`, oldest first.
	disruptions: VecDeque<(u64, K)>,
	/// Version of the newest disruption dropped from `disruptions`.
	evicted_through: u64,
	/// Smallest key among the dropped disruptions.
	evicted_min: Option<K>,
}

impl<K: Ord + Clone, V> Inner<K, V> {
	fn record_disruption(&mut self, key: K, history: usize) {
		self.disruptions.push_back((self.version, key));
		while self.disruptions.len() > history {
			if let Some((version, key)) = self.disruptions.pop_front() {
				self.evicted_through = version;
				if self.evicted_min.as_ref().map_or(true, |min| key < *min) {
					self.evicted_min = Some(key);
				}
			}
		}
	}

	/// Finds a disruption behind `anchor` that happened after `seen`.
	///
	/// A key equal to the anchor counts only when `inclusive` is set. Returns
	/// the smallest such key, or `Some(None)` if an evicted disruption may lie
	/// behind the anchor and the key cannot be known.
	fn disruption_since(&self, seen: u64, anchor: &K, inclusive: bool) -> Option<Option<K>> {
		if self.version == seen {
			return None;
		}
		let behind = |key: &K| if inclusive { key <= anchor } else { key < anchor };
		if seen < self.evicted_through && self.evicted_min.as_ref().is_some_and(behind) {
			return Some(None);
		}
		self.disruptions
			.iter()
			.rev()
			.take_while(|(version, _)| *version > seen)
			.map(|(_, key)| key)
			.filter(|key| behind(*key))
			.min()
			.map(|key| Some(key.clone()))
	}
}

struct Shared<K, V> {
	inner: RwLock<Inner<K, V>>,
	completed: AtomicBool,
	updates: Arc<Notify>,
	config: MapConfig,
}

/// A thread-safe, in-memory ordered series that accepts live writes.
///
/// Cloning a `SortedMap` produces another handle to the same data.
pub struct SortedMap<K, V> {
	shared: Arc<Shared<K, V>>,
}

impl<K, V> Clone for SortedMap<K, V> {
	fn clone(&self) -> Self {
		SortedMap {
			shared: Arc::clone(&self.shared),
		}
	}
}

impl<K: Ord + Clone, V: Clone> Default for SortedMap<K, V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SortedMap<K, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let inner = self.shared.inner.read();
		f.debug_struct("SortedMap")
			.field("len", &inner.map.len())
			.field("version", &inner.version)
			.field("completed", &self.shared.completed.load(Ordering::SeqCst))
			.finish_non_exhaustive()
	}
}

impl<K: Ord + Clone, V: Clone> SortedMap<K, V> {
	/// Creates an empty map with the default configuration.
	pub fn new() -> Self {
		Self::with_config(MapConfig::default())
	}

	/// Creates an empty map with the given configuration.
	pub fn with_config(config: MapConfig) -> Self {
		SortedMap {
			shared: Arc::new(Shared {
				inner: RwLock::new(Inner {
					map: BTreeMap::new(),
					version: 0,
					disruptions: VecDeque::new(),
					evicted_through: 0,
					evicted_min: None,
				}),
				completed: AtomicBool::new(false),
				updates: Arc::new(Notify::new()),
				config,
			}),
		}
	}

	/// The configuration this map was created with.
	pub fn config(&self) -> &MapConfig {
		&self.shared.config
	}

	/// Inserts a value at any key, returning the previous value for the key.
	///
	/// A key at or before the current last key is an out-of-order write: it is
	/// recorded so that cursors positioned after it observe the disruption.
	///
	/// # Errors
	///
	/// - [`Error::InvalidState`] if the map was marked complete.
	/// - [`Error::OutOfOrder`] if the write is out of order and the map does not
	///   accept out-of-order writes. The payload holds the last key and the
	///   rejected key.
	pub fn insert(&self, key: K, value: V) -> Result<Option<V>, K> {
		let previous = {
			let mut inner = self.shared.inner.write();
			self.check_writable()?;
			let last = inner.map.last_key_value().map(|(last, _)| last.clone());
			let in_order = last.as_ref().map_or(true, |last| key > *last);
			if !in_order && !self.shared.config.allow_out_of_order {
				// `in_order` is only false when a last key exists
				let last = last.unwrap_or_else(|| key.clone());
				return Err(OutOfOrderKey::new(last, key).into());
			}
			inner.version += 1;
			if !in_order {
				trace!(version = inner.version, "recorded out-of-order write");
				inner.record_disruption(key.clone(), self.shared.config.out_of_order_history);
			}
			inner.map.insert(key, value)
		};
		self.shared.updates.notify_waiters();
		Ok(previous)
	}

	/// Appends a value whose key must be greater than every existing key.
	///
	/// # Errors
	///
	/// - [`Error::InvalidState`] if the map was marked complete.
	/// - [`Error::OutOfOrder`] if `key` is not greater than the last key.
	pub fn append(&self, key: K, value: V) -> Result<(), K> {
		{
			let mut inner = self.shared.inner.write();
			self.check_writable()?;
			if let Some((last, _)) = inner.map.last_key_value() {
				if key <= *last {
					return Err(OutOfOrderKey::new(last.clone(), key).into());
				}
			}
			inner.version += 1;
			inner.map.insert(key, value);
		}
		self.shared.updates.notify_waiters();
		Ok(())
	}

	/// Removes the entry for `key`. A removal is recorded as a disruption.
	///
	/// # Errors
	///
	/// Returns [`Error::InvalidState`] if the map was marked complete.
	pub fn remove(&self, key: &K) -> Result<Option<V>, K> {
		let removed = {
			let mut inner = self.shared.inner.write();
			self.check_writable()?;
			let removed = inner.map.remove(key);
			if removed.is_some() {
				inner.version += 1;
				inner.record_disruption(key.clone(), self.shared.config.out_of_order_history);
			}
			removed
		};
		if removed.is_some() {
			self.shared.updates.notify_waiters();
		}
		Ok(removed)
	}

	/// Marks the map as complete: no more writes are accepted and a cursor
	/// reaching the end of the data sees a final end-of-data.
	pub fn complete(&self) {
		{
			// Serialize with writers so a write cannot land after completion.
			let _inner = self.shared.inner.write();
			self.shared.completed.store(true, Ordering::SeqCst);
		}
		self.shared.updates.notify_waiters();
	}

	/// Whether [`SortedMap::complete`] was called.
	pub fn is_completed(&self) -> bool {
		self.shared.completed.load(Ordering::SeqCst)
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.shared.inner.read().map.len()
	}

	/// Whether the map has no entries.
	pub fn is_empty(&self) -> bool {
		self.shared.inner.read().map.is_empty()
	}

	/// Current write version.
	pub fn version(&self) -> u64 {
		self.shared.inner.read().version
	}

	/// Creates a fresh, unpositioned cursor over this map.
	pub fn cursor(&self) -> SortedCursor<K, V> {
		SortedCursor {
			shared: Arc::clone(&self.shared),
			position: Position::Start,
			seen: 0,
			state: CursorState::None,
		}
	}

	fn check_writable(&self) -> Result<(), K> {
		if self.shared.completed.load(Ordering::SeqCst) {
			return Err(Error::InvalidState("series is complete"));
		}
		Ok(())
	}
}

impl<K, V> SortedMap<K, V>
where
	K: Ord + Clone + Send + Sync,
	V: Clone + Send + Sync,
{
	/// Wraps this map in a [`Series`] navigation surface.
	pub fn series(&self) -> Series<SortedCursor<K, V>> {
		Series::new(self.cursor())
	}
}

impl<K: Ord + Clone, V: Clone> FromIterator<(K, V)> for SortedMap<K, V> {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let map = SortedMap::new();
		{
			let mut inner = map.shared.inner.write();
			inner.map.extend(iter);
			inner.version += 1;
		}
		map
	}
}

/// Where a [`SortedCursor`] stands.
///
/// `After` and `Before` are anchors: the cursor is unpositioned, but remembers
/// the key it last stood on, or the key a missed lookup searched from, so
/// relative moves resume from there.
#[derive(Debug, Clone)]
enum Position<K, V> {
	Start,
	At(K, V),
	After(K),
	Before(K),
	Invalid,
}

impl<K, V> Position<K, V> {
	/// The anchor key, and whether a write at exactly that key lies behind
	/// the cursor.
	fn anchor(&self) -> Option<(&K, bool)> {
		match self {
			Position::At(key, _) | Position::After(key) => Some((key, true)),
			Position::Before(key) => Some((key, false)),
			Position::Start | Position::Invalid => None,
		}
	}

	/// Anchor left behind by a lookup from `key` that found nothing.
	///
	/// A missed `EQ` anchors before the key, so a later `move_next` lands on
	/// the key itself once it is written.
	fn missed(key: &K, direction: Lookup) -> Self
	where
		K: Clone,
	{
		match direction {
			Lookup::GT | Lookup::LE => Position::After(key.clone()),
			Lookup::GE | Lookup::LT | Lookup::EQ => Position::Before(key.clone()),
		}
	}
}

/// Cursor over a [`SortedMap`].
///
/// The cursor caches the entry it stands on; no lock is held between moves.
pub struct SortedCursor<K, V> {
	shared: Arc<Shared<K, V>>,
	position: Position<K, V>,
	/// Map version observed by the last move.
	seen: u64,
	state: CursorState,
}

impl<K: Clone, V: Clone> Clone for SortedCursor<K, V> {
	fn clone(&self) -> Self {
		SortedCursor {
			shared: Arc::clone(&self.shared),
			position: self.position.clone(),
			seen: self.seen,
			state: self.state,
		}
	}
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SortedCursor<K, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SortedCursor")
			.field("position", &self.position)
			.field("seen", &self.seen)
			.field("state", &self.state)
			.finish()
	}
}

#[derive(Copy, Clone)]
enum Step {
	Next,
	Prev,
}

fn above<K: Ord>(key: &K) -> (Bound<&K>, Bound<&K>) {
	(Bound::Excluded(key), Bound::Unbounded)
}

fn at_or_above<K: Ord>(key: &K) -> (Bound<&K>, Bound<&K>) {
	(Bound::Included(key), Bound::Unbounded)
}

fn below<K: Ord>(key: &K) -> (Bound<&K>, Bound<&K>) {
	(Bound::Unbounded, Bound::Excluded(key))
}

fn at_or_below<K: Ord>(key: &K) -> (Bound<&K>, Bound<&K>) {
	(Bound::Unbounded, Bound::Included(key))
}

fn owned<K: Clone, V: Clone>(entry: Option<(&K, &V)>) -> Option<(K, V)> {
	entry.map(|(k, v)| (k.clone(), v.clone()))
}

impl<K: Ord + Clone, V: Clone> SortedCursor<K, V> {
	fn seek(map: &BTreeMap<K, V>, key: &K, direction: Lookup) -> Option<(K, V)> {
		owned(match direction {
			Lookup::EQ => map.get_key_value(key),
			Lookup::GE => map.range::<K, _>(at_or_above(key)).next(),
			Lookup::GT => map.range::<K, _>(above(key)).next(),
			Lookup::LE => map.range::<K, _>(at_or_below(key)).next_back(),
			Lookup::LT => map.range::<K, _>(below(key)).next_back(),
		})
	}

	fn neighbour(map: &BTreeMap<K, V>, position: &Position<K, V>, step: Step) -> Option<(K, V)> {
		owned(match (position, step) {
			(Position::Start, Step::Next) => map.iter().next(),
			(Position::Start, Step::Prev) => map.iter().next_back(),
			(Position::At(key, _) | Position::After(key), Step::Next) => {
				map.range::<K, _>(above(key)).next()
			}
			(Position::Before(key), Step::Next) => map.range::<K, _>(at_or_above(key)).next(),
			(Position::At(key, _) | Position::Before(key), Step::Prev) => {
				map.range::<K, _>(below(key)).next_back()
			}
			(Position::After(key), Step::Prev) => map.range::<K, _>(at_or_below(key)).next_back(),
			(Position::Invalid, _) => None,
		})
	}

	/// Repositions without regard to the previous position, leaving `miss`
	/// when nothing is found.
	fn reposition<F>(&mut self, find: F, miss: Position<K, V>) -> Result<bool, K>
	where
		F: FnOnce(&BTreeMap<K, V>) -> Option<(K, V)>,
	{
		let (found, version) = {
			let inner = self.shared.inner.read();
			(find(&inner.map), inner.version)
		};
		self.seen = version;
		self.state = self.state.transition(CursorState::Initialized);
		self.position = match found {
			Some((key, value)) => Position::At(key, value),
			None => miss,
		};
		Ok(matches!(self.position, Position::At(..)))
	}

	/// Moves relative to the current position, checking for disruptions first.
	fn step(&mut self, step: Step) -> Result<bool, K> {
		if matches!(self.position, Position::Invalid) {
			return Err(Error::InvalidState("cursor was disrupted by out-of-order data"));
		}
		let (found, version) = {
			let inner = self.shared.inner.read();
			if let Some((anchor, inclusive)) = self.position.anchor() {
				if let Some(new_key) = inner.disruption_since(self.seen, anchor, inclusive) {
					let current_key = anchor.clone();
					drop(inner);
					trace!("cursor disrupted by out-of-order data");
					self.position = Position::Invalid;
					return Err(match new_key {
						Some(new_key) => OutOfOrderKey::new(current_key, new_key),
						None => OutOfOrderKey::unknown(current_key),
					}
					.into());
				}
			}
			(Self::neighbour(&inner.map, &self.position, step), inner.version)
		};
		self.seen = version;
		self.state = self.state.transition(CursorState::Initialized);
		match found {
			Some((key, value)) => {
				self.position = Position::At(key, value);
				Ok(true)
			}
			None => {
				if let Position::At(key, _) = &self.position {
					let key = key.clone();
					self.position = match step {
						Step::Next => Position::After(key),
						Step::Prev => Position::Before(key),
					};
				}
				Ok(false)
			}
		}
	}
}

impl<K, V> Cursor for SortedCursor<K, V>
where
	K: Ord + Clone + Send + Sync,
	V: Clone + Send + Sync,
{
	type Key = K;
	type Value = V;

	fn state(&self) -> CursorState {
		self.state
	}

	fn set_state(&mut self, state: CursorState) {
		self.state = self.state.transition(state);
	}

	fn create(&self) -> Self {
		SortedCursor {
			shared: Arc::clone(&self.shared),
			position: Position::Start,
			seen: 0,
			state: CursorState::None,
		}
	}

	fn move_first(&mut self) -> Result<bool, K> {
		self.reposition(|map| owned(map.iter().next()), Position::Start)
	}

	fn move_last(&mut self) -> Result<bool, K> {
		self.reposition(|map| owned(map.iter().next_back()), Position::Start)
	}

	fn move_next(&mut self) -> Result<bool, K> {
		self.step(Step::Next)
	}

	fn move_prev(&mut self) -> Result<bool, K> {
		self.step(Step::Prev)
	}

	fn move_at(&mut self, key: &K, direction: Lookup) -> Result<bool, K> {
		self.reposition(|map| Self::seek(map, key, direction), Position::missed(key, direction))
	}

	fn current_key(&self) -> Result<&K, K> {
		match &self.position {
			Position::At(key, _) => Ok(key),
			Position::Invalid => Err(Error::InvalidState("cursor was disrupted by out-of-order data")),
			_ => Err(Error::InvalidState("cursor is not positioned")),
		}
	}

	fn current_value(&self) -> Result<&V, K> {
		match &self.position {
			Position::At(_, value) => Ok(value),
			Position::Invalid => Err(Error::InvalidState("cursor was disrupted by out-of-order data")),
			_ => Err(Error::InvalidState("cursor is not positioned")),
		}
	}

	fn updates(&self) -> Option<Arc<Notify>> {
		if self.shared.completed.load(Ordering::SeqCst) {
			None
		} else {
			Some(Arc::clone(&self.shared.updates))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> SortedMap<u32, &'static str> {
		[(1, "a"), (3, "b"), (5, "c")].into_iter().collect()
	}

	#[test]
	fn forward_and_backward() {
		let map = sample();
		let mut c = map.cursor();
		assert_eq!(c.state(), CursorState::None);

		let mut keys = vec![];
		while c.move_next().unwrap() {
			keys.push(*c.current_key().unwrap());
		}
		assert_eq!(keys, vec![1, 3, 5]);
		assert_eq!(c.state(), CursorState::Initialized);

		keys.clear();
		while c.move_prev().unwrap() {
			keys.push(*c.current_key().unwrap());
		}
		assert_eq!(keys, vec![5, 3, 1]);
	}

	#[test]
	fn exhausted_cursor_is_unpositioned_but_anchored() {
		let map = sample();
		let mut c = map.cursor();
		assert!(c.move_last().unwrap());
		assert!(!c.move_next().unwrap());
		assert!(matches!(c.current_key(), Err(Error::InvalidState(_))));

		map.append(7, "d").unwrap();
		assert!(c.move_next().unwrap());
		assert_eq!(c.current().unwrap(), (&7, &"d"));
	}

	#[test]
	fn move_at_directions() {
		let map = sample();
		let mut c = map.cursor();
		assert!(c.move_at(&3, Lookup::EQ).unwrap());
		assert_eq!(c.current_key().unwrap(), &3);
		assert!(!c.move_at(&4, Lookup::EQ).unwrap());
		assert!(c.current_key().is_err());
		assert!(c.move_at(&4, Lookup::GE).unwrap());
		assert_eq!(c.current_key().unwrap(), &5);
		assert!(c.move_at(&3, Lookup::GT).unwrap());
		assert_eq!(c.current_key().unwrap(), &5);
		assert!(c.move_at(&4, Lookup::LE).unwrap());
		assert_eq!(c.current_key().unwrap(), &3);
		assert!(c.move_at(&3, Lookup::LT).unwrap());
		assert_eq!(c.current_key().unwrap(), &1);
		assert!(!c.move_at(&1, Lookup::LT).unwrap());
		assert!(!c.move_at(&6, Lookup::GE).unwrap());
	}

	#[test]
	fn empty_map() {
		let map: SortedMap<u32, u32> = SortedMap::new();
		let mut c = map.cursor();
		assert!(!c.move_first().unwrap());
		assert!(!c.move_last().unwrap());
		assert!(!c.move_next().unwrap());
		assert!(c.current().is_err());
	}

	#[test]
	fn append_rejects_non_increasing_keys() {
		let map = sample();
		let err = map.append(5, "x").unwrap_err();
		let ooo = err.as_out_of_order().unwrap();
		assert_eq!(ooo.current_key(), &5);
		assert_eq!(ooo.new_key(), Some(&5));
		assert_eq!(map.len(), 3);
	}

	#[test]
	fn append_only_config_rejects_inserts_behind() {
		let map = SortedMap::with_config(MapConfig::append_only());
		map.insert(2, "b").unwrap();
		assert!(map.insert(1, "a").unwrap_err().is_recoverable());
		map.insert(3, "c").unwrap();
		assert_eq!(map.len(), 2);
	}

	#[test]
	fn disruption_behind_cursor() {
		let map = sample();
		let mut c = map.cursor();
		assert!(c.move_at(&3, Lookup::EQ).unwrap());

		map.insert(2, "x").unwrap();
		let err = c.move_next().unwrap_err();
		assert_eq!(err, Error::OutOfOrder(OutOfOrderKey::new(3, 2)));

		// Invalid until repositioned.
		assert!(matches!(c.move_next(), Err(Error::InvalidState(_))));
		assert!(c.current_key().is_err());

		assert!(c.move_at(&2, Lookup::EQ).unwrap());
		assert!(c.move_next().unwrap());
		assert_eq!(c.current_key().unwrap(), &3);
	}

	#[test]
	fn writes_ahead_of_cursor_do_not_disrupt() {
		let map = sample();
		let mut c = map.cursor();
		assert!(c.move_first().unwrap());
		map.insert(4, "x").unwrap();
		map.append(9, "y").unwrap();
		assert!(c.move_next().unwrap());
		assert_eq!(c.current_key().unwrap(), &3);
		assert!(c.move_next().unwrap());
		assert_eq!(c.current_key().unwrap(), &4);
	}

	#[test]
	fn update_at_position_disrupts() {
		let map = sample();
		let mut c = map.cursor();
		assert!(c.move_at(&3, Lookup::EQ).unwrap());
		map.insert(3, "changed").unwrap();
		let err = c.move_next().unwrap_err();
		assert_eq!(err.as_out_of_order().unwrap().new_key(), Some(&3));
	}

	#[test]
	fn removal_behind_cursor_disrupts() {
		let map = sample();
		let mut c = map.cursor();
		assert!(c.move_last().unwrap());
		assert_eq!(map.remove(&1).unwrap(), Some("a"));
		let err = c.move_prev().unwrap_err();
		assert_eq!(err, Error::OutOfOrder(OutOfOrderKey::new(5, 1)));
	}

	#[test]
	fn smallest_disruption_is_reported() {
		let map = sample();
		let mut c = map.cursor();
		assert!(c.move_last().unwrap());
		map.insert(4, "x").unwrap();
		map.insert(2, "y").unwrap();
		let err = c.move_next().unwrap_err();
		assert_eq!(err.as_out_of_order().unwrap().new_key(), Some(&2));
	}

	#[test]
	fn evicted_history_yields_unknown_key() {
		let config = MapConfig {
			allow_out_of_order: true,
			out_of_order_history: 2,
		};
		let map = SortedMap::with_config(config);
		for k in [10, 20, 30] {
			map.append(k, k).unwrap();
		}
		let mut c = map.cursor();
		assert!(c.move_last().unwrap());
		map.insert(1, 1).unwrap();
		map.insert(2, 2).unwrap();
		map.insert(3, 3).unwrap();
		let err = c.move_next().unwrap_err();
		let ooo = err.as_out_of_order().unwrap();
		assert_eq!(ooo.current_key(), &30);
		assert!(!ooo.has_known_new_key());
	}

	#[test]
	fn evicted_history_ahead_of_cursor_does_not_disrupt() {
		let config = MapConfig {
			allow_out_of_order: true,
			out_of_order_history: 2,
		};
		let map = SortedMap::with_config(config);
		for k in [10, 20, 30] {
			map.append(k, k).unwrap();
		}
		let mut c = map.cursor();
		assert!(c.move_first().unwrap());
		map.insert(25, 25).unwrap();
		map.insert(26, 26).unwrap();
		map.insert(27, 27).unwrap();
		assert!(c.move_next().unwrap());
		assert_eq!(c.current_key().unwrap(), &20);
	}

	#[test]
	fn skip_at_live_tail_resumes_after_key() {
		let map = sample();
		let mut c = map.cursor();
		assert!(c.move_last().unwrap());
		map.insert(2, "x").unwrap();
		let err = c.move_next().unwrap_err();
		assert_eq!(err, Error::OutOfOrder(OutOfOrderKey::new(5, 2)));

		assert!(!c.move_at(&5, Lookup::GT).unwrap());
		assert!(!c.move_next().unwrap());
		map.append(7, "d").unwrap();
		assert!(c.move_next().unwrap());
		assert_eq!(c.current_key().unwrap(), &7);
	}

	#[test]
	fn missed_lookup_anchors_by_direction() {
		let map = sample();

		let mut c = map.cursor();
		assert!(!c.move_at(&5, Lookup::GT).unwrap());
		assert!(c.current_key().is_err());
		assert!(c.move_prev().unwrap());
		assert_eq!(c.current_key().unwrap(), &5);

		let mut c = map.cursor();
		assert!(!c.move_at(&6, Lookup::GE).unwrap());
		map.append(6, "e").unwrap();
		assert!(c.move_next().unwrap());
		assert_eq!(c.current_key().unwrap(), &6);

		let mut c = map.cursor();
		assert!(!c.move_at(&1, Lookup::LT).unwrap());
		assert!(c.move_next().unwrap());
		assert_eq!(c.current_key().unwrap(), &1);

		let mut c = map.cursor();
		assert!(!c.move_at(&0, Lookup::LE).unwrap());
		assert!(c.move_next().unwrap());
		assert_eq!(c.current_key().unwrap(), &1);

		let mut c = map.cursor();
		assert!(!c.move_at(&4, Lookup::EQ).unwrap());
		assert!(c.move_next().unwrap());
		assert_eq!(c.current_key().unwrap(), &5);
		assert!(!c.move_at(&4, Lookup::EQ).unwrap());
		assert!(c.move_prev().unwrap());
		assert_eq!(c.current_key().unwrap(), &3);
	}

	#[test]
	fn write_at_missed_lookup_key_is_not_behind() {
		let map = sample();
		let mut c = map.cursor();
		assert!(!c.move_at(&4, Lookup::EQ).unwrap());
		map.insert(4, "x").unwrap();
		assert!(c.move_next().unwrap());
		assert_eq!(c.current().unwrap(), (&4, &"x"));
	}

	#[test]
	fn completed_map_rejects_writes_and_reports_no_updates() {
		let map = sample();
		let c = map.cursor();
		assert!(c.updates().is_some());
		map.complete();
		assert!(map.is_completed());
		assert!(c.updates().is_none());
		assert!(matches!(map.append(9, "z"), Err(Error::InvalidState(_))));
	}

	#[test]
	fn clone_is_independent() {
		let map = sample();
		let mut a = map.cursor();
		assert!(a.move_first().unwrap());
		let mut b = a.clone();
		assert_eq!(b.current_key().unwrap(), &1);
		assert!(b.move_next().unwrap());
		assert_eq!(a.current_key().unwrap(), &1);
		assert_eq!(b.current_key().unwrap(), &3);

		let fresh = a.create();
		assert_eq!(fresh.state(), CursorState::None);
		assert!(fresh.current().is_err());
	}
}
