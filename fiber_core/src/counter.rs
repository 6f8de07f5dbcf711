//! # Stitch / Row Counter
//!
//! A board of independent counters. Each counter owns its count and a
//! bounded undo/redo history:
//!
//! ```text
//! increment / decrement / reset:  push prior count to undo, clear redo
//! undo:                           pop undo, push current to redo
//! redo:                           pop redo, push current to undo
//! ```
//!
//! Counts are `u32` and decrements floor at zero, so a count can never go
//! negative. When a transition lands on a positive multiple of the row
//! reminder interval, the returned [`CounterEvent`] carries a one-shot
//! `reminder` flag; the count itself is unaffected.
//!
//! [`PersistedBoard`] writes the whole board through a
//! [`StateStore`] after every mutation and rehydrates it on open.
//!
//! ## Example
//!
//! ```rust
//! use fiber_core::counter::{CounterAction, CounterBoard, CounterOptions};
//!
//! let mut board = CounterBoard::default();
//! let id = board.add("Body rows", CounterOptions::default()).id.to_string();
//!
//! for _ in 0..3 {
//!     board.apply(&id, CounterAction::Increment).unwrap();
//! }
//! assert_eq!(board.apply(&id, CounterAction::Undo).unwrap().count, 2);
//! assert_eq!(board.apply(&id, CounterAction::Redo).unwrap().count, 3);
//! ```

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{FiberError, FiberResult};
use crate::store::{Record, StateStore, StorageBackend};

/// Undo steps kept per counter unless configured otherwise
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Shortest id prefix accepted when selecting a counter
pub const MIN_ID_PREFIX: usize = 4;

// ============================================================================
// History
// ============================================================================

/// Bounded undo/redo stacks of prior counts.
///
/// At capacity the oldest entry is evicted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    undo: VecDeque<u32>,
    redo: VecDeque<u32>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        History::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        History {
            undo: VecDeque::with_capacity(capacity),
            redo: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push_bounded(stack: &mut VecDeque<u32>, value: u32, capacity: usize) {
        while stack.len() >= capacity {
            stack.pop_front();
        }
        stack.push_back(value);
    }

    /// Record the count before a mutating action. Clears the redo stack.
    pub fn record(&mut self, prior: u32) {
        Self::push_bounded(&mut self.undo, prior, self.capacity);
        self.redo.clear();
    }

    /// Pop the undo stack, pushing `current` onto redo. Returns the count to restore.
    pub fn undo(&mut self, current: u32) -> Option<u32> {
        let previous = self.undo.pop_back()?;
        Self::push_bounded(&mut self.redo, current, self.capacity);
        Some(previous)
    }

    /// Pop the redo stack, pushing `current` onto undo. Returns the count to restore.
    pub fn redo(&mut self, current: u32) -> Option<u32> {
        let next = self.redo.pop_back()?;
        Self::push_bounded(&mut self.undo, current, self.capacity);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change capacity, dropping the oldest entries that no longer fit.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
        while self.redo.len() > self.capacity {
            self.redo.pop_front();
        }
    }
}

// ============================================================================
// Counter
// ============================================================================

/// A user action on one counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterAction {
    Increment,
    Decrement,
    Reset,
    Undo,
    Redo,
}

impl CounterAction {
    pub const ALL: [CounterAction; 5] = [
        CounterAction::Increment,
        CounterAction::Decrement,
        CounterAction::Reset,
        CounterAction::Undo,
        CounterAction::Redo,
    ];
}

impl fmt::Display for CounterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CounterAction::Increment => "increment",
            CounterAction::Decrement => "decrement",
            CounterAction::Reset => "reset",
            CounterAction::Undo => "undo",
            CounterAction::Redo => "redo",
        };
        write!(f, "{}", name)
    }
}

/// What a transition did, for the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterEvent {
    pub action: CounterAction,
    pub previous: u32,
    pub count: u32,
    /// False when undo/redo had nothing to restore
    pub applied: bool,
    /// Landed on a multiple of the row-reminder interval
    pub reminder: bool,
    /// Reached (or passed) the target on this transition
    pub target_reached: bool,
}

/// Settings for a new counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterOptions {
    pub step: u32,
    pub target: Option<u32>,
    pub reminder_interval: Option<u32>,
}

impl Default for CounterOptions {
    fn default() -> Self {
        CounterOptions {
            step: 1,
            target: None,
            reminder_interval: None,
        }
    }
}

/// One stitch or row counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub id: Uuid,
    pub label: String,
    count: u32,
    step: u32,
    pub target: Option<u32>,
    reminder_interval: Option<u32>,
    pub created: DateTime<Utc>,
    #[serde(default)]
    history: History,
}

impl Counter {
    pub fn new(label: impl Into<String>, options: CounterOptions, history_capacity: usize) -> Self {
        Counter {
            id: Uuid::new_v4(),
            label: label.into(),
            count: 0,
            step: options.step.max(1),
            target: options.target,
            reminder_interval: options.reminder_interval.filter(|&n| n > 0),
            created: Utc::now(),
            history: History::with_capacity(history_capacity),
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    /// Step sizes below 1 are raised to 1
    pub fn set_step(&mut self, step: u32) {
        self.step = step.max(1);
    }

    pub fn reminder_interval(&self) -> Option<u32> {
        self.reminder_interval
    }

    /// `None` or `Some(0)` turns the reminder off
    pub fn set_reminder_interval(&mut self, interval: Option<u32>) {
        self.reminder_interval = interval.filter(|&n| n > 0);
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Rows left to the target, if one is set
    pub fn remaining(&self) -> Option<u32> {
        self.target.map(|t| t.saturating_sub(self.count))
    }

    /// Apply one transition.
    pub fn apply(&mut self, action: CounterAction) -> CounterEvent {
        let previous = self.count;
        let applied = match action {
            CounterAction::Increment => {
                self.history.record(previous);
                self.count = previous.saturating_add(self.step);
                true
            }
            CounterAction::Decrement => {
                self.history.record(previous);
                self.count = previous.saturating_sub(self.step);
                true
            }
            CounterAction::Reset => {
                self.history.record(previous);
                self.count = 0;
                true
            }
            CounterAction::Undo => match self.history.undo(previous) {
                Some(restored) => {
                    self.count = restored;
                    true
                }
                None => false,
            },
            CounterAction::Redo => match self.history.redo(previous) {
                Some(restored) => {
                    self.count = restored;
                    true
                }
                None => false,
            },
        };

        let moved = self.count != previous;
        let reminder = moved
            && self.count > 0
            && self.reminder_interval.is_some_and(|n| self.count % n == 0);
        let target_reached = moved && self.target.is_some_and(|t| self.count >= t && previous < t);

        CounterEvent {
            action,
            previous,
            count: self.count,
            applied,
            reminder,
            target_reached,
        }
    }
}

// ============================================================================
// Board
// ============================================================================

/// Ordered list of counters; the unit that gets persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterBoard {
    counters: Vec<Counter>,
    #[serde(skip, default = "default_capacity")]
    history_capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

impl Default for CounterBoard {
    fn default() -> Self {
        CounterBoard::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl Record for CounterBoard {
    const KEY: &'static str = "counters";
    const SCHEMA_VERSION: &'static str = "1.0.0";
}

impl CounterBoard {
    pub fn with_history_capacity(capacity: usize) -> Self {
        CounterBoard {
            counters: Vec::new(),
            history_capacity: capacity.max(1),
        }
    }

    /// Apply a new history capacity to the board and every counter on it.
    pub fn set_history_capacity(&mut self, capacity: usize) {
        self.history_capacity = capacity.max(1);
        for counter in &mut self.counters {
            counter.history.set_capacity(self.history_capacity);
        }
    }

    pub fn counters(&self) -> &[Counter] {
        &self.counters
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Add a counter at the end of the board.
    pub fn add(&mut self, label: impl Into<String>, options: CounterOptions) -> &Counter {
        let counter = Counter::new(label, options, self.history_capacity);
        debug!(id = %counter.id, label = %counter.label, "counter added");
        self.counters.push(counter);
        &self.counters[self.counters.len() - 1]
    }

    /// Resolve a selector: full id, unique label (case-insensitive), or
    /// unique id prefix of at least [`MIN_ID_PREFIX`] characters.
    fn position(&self, selector: &str) -> FiberResult<usize> {
        let selector = selector.trim();

        if let Ok(id) = Uuid::parse_str(selector) {
            if let Some(index) = self.counters.iter().position(|c| c.id == id) {
                return Ok(index);
            }
        }

        let by_label: Vec<usize> = self
            .counters
            .iter()
            .enumerate()
            .filter(|(_, c)| c.label.eq_ignore_ascii_case(selector))
            .map(|(i, _)| i)
            .collect();
        if let [index] = by_label[..] {
            return Ok(index);
        }

        if selector.len() >= MIN_ID_PREFIX {
            let prefix = selector.to_ascii_lowercase();
            let by_prefix: Vec<usize> = self
                .counters
                .iter()
                .enumerate()
                .filter(|(_, c)| c.id.to_string().starts_with(&prefix))
                .map(|(i, _)| i)
                .collect();
            match by_prefix[..] {
                [index] => return Ok(index),
                [] => {}
                _ => {
                    return Err(FiberError::invalid_input(
                        "counter",
                        selector,
                        "Matches more than one counter; use a longer id",
                    ))
                }
            }
        }

        if by_label.len() > 1 {
            return Err(FiberError::invalid_input(
                "counter",
                selector,
                "Several counters share this label; select by id",
            ));
        }

        Err(FiberError::counter_not_found(selector))
    }

    pub fn find(&self, selector: &str) -> FiberResult<&Counter> {
        let index = self.position(selector)?;
        Ok(&self.counters[index])
    }

    pub fn find_mut(&mut self, selector: &str) -> FiberResult<&mut Counter> {
        let index = self.position(selector)?;
        Ok(&mut self.counters[index])
    }

    /// Delete a counter and its history.
    pub fn remove(&mut self, selector: &str) -> FiberResult<Counter> {
        let index = self.position(selector)?;
        let counter = self.counters.remove(index);
        debug!(id = %counter.id, "counter removed");
        Ok(counter)
    }

    pub fn apply(&mut self, selector: &str, action: CounterAction) -> FiberResult<CounterEvent> {
        let counter = self.find_mut(selector)?;
        let event = counter.apply(action);
        debug!(id = %counter.id, %action, count = event.count, "counter transition");
        Ok(event)
    }

    pub fn clear(&mut self) {
        self.counters.clear();
    }
}

/// A partial settings change. `None` leaves the field as it is; for target
/// and reminder, `Some(None)` clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterUpdate {
    pub step: Option<u32>,
    pub target: Option<Option<u32>>,
    pub reminder_interval: Option<Option<u32>>,
}

impl CounterUpdate {
    pub fn is_empty(&self) -> bool {
        self.step.is_none() && self.target.is_none() && self.reminder_interval.is_none()
    }

    fn apply_to(&self, counter: &mut Counter) {
        if let Some(step) = self.step {
            counter.set_step(step);
        }
        if let Some(target) = self.target {
            counter.target = target;
        }
        if let Some(interval) = self.reminder_interval {
            counter.set_reminder_interval(interval);
        }
    }
}

impl From<CounterOptions> for CounterUpdate {
    fn from(options: CounterOptions) -> Self {
        CounterUpdate {
            step: Some(options.step),
            target: Some(options.target),
            reminder_interval: Some(options.reminder_interval),
        }
    }
}

// ============================================================================
// Persisted Board
// ============================================================================

/// A board that is rehydrated on open and written through after every
/// mutation.
pub struct PersistedBoard<B: StorageBackend> {
    board: CounterBoard,
    store: StateStore<CounterBoard, B>,
}

impl<B: StorageBackend> PersistedBoard<B> {
    /// Rehydrate from storage. Missing or corrupt state gives an empty board.
    pub fn open(backend: B, history_capacity: usize) -> Self {
        let store: StateStore<CounterBoard, B> = StateStore::new(backend);
        let mut board = store.load();
        board.set_history_capacity(history_capacity);
        PersistedBoard { board, store }
    }

    pub fn board(&self) -> &CounterBoard {
        &self.board
    }

    /// Save the full board. The in-memory change is kept when the write
    /// fails, but the error is returned so the caller can report it.
    fn persist(&self) -> FiberResult<()> {
        self.store.save(&self.board).inspect_err(|e| {
            warn!(error = %e, "failed to persist counters");
        })
    }

    pub fn add(&mut self, label: impl Into<String>, options: CounterOptions) -> FiberResult<Counter> {
        let counter = self.board.add(label, options).clone();
        self.persist()?;
        Ok(counter)
    }

    pub fn remove(&mut self, selector: &str) -> FiberResult<Counter> {
        let counter = self.board.remove(selector)?;
        self.persist()?;
        Ok(counter)
    }

    pub fn apply(&mut self, selector: &str, action: CounterAction) -> FiberResult<CounterEvent> {
        let event = self.board.apply(selector, action)?;
        self.persist()?;
        Ok(event)
    }

    /// Change a counter's settings without touching its count or history.
    /// Only the fields set in `update` change.
    pub fn configure(&mut self, selector: &str, update: CounterUpdate) -> FiberResult<Counter> {
        let counter = self.board.find_mut(selector)?;
        update.apply_to(counter);
        let updated = counter.clone();
        self.persist()?;
        Ok(updated)
    }

    /// Delete every counter and the stored record.
    pub fn reset(&mut self) -> FiberResult<()> {
        self.board.clear();
        self.store.reset()
    }
}
