//! One-shot timer table.
//!
//! Each entry is keyed by an action identity. Arming a key that is already
//! pending replaces the pending entry, so an action is never queued twice.
//! Cancelling a key that is not pending does nothing.

use core::fmt;

/// Errors raised by the scheduler.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// Every slot holds a pending timer.
    Full,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Full => f.write_str("timer table full"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Full => defmt::write!(f, "Full"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry<K> {
    key: K,
    deadline_ms: u64,
}

/// A fixed-capacity table of pending one-shot timers.
#[derive(Debug)]
pub struct Scheduler<K, const N: usize> {
    entries: [Option<Entry<K>>; N],
}

impl<K: Copy + PartialEq, const N: usize> Default for Scheduler<K, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + PartialEq, const N: usize> Scheduler<K, N> {
    /// Create an empty table.
    pub const fn new() -> Self {
        Self { entries: [None; N] }
    }

    /// Run `key` once, `delay_ms` after `now_ms`. Any pending entry for the
    /// same key is cancelled first.
    pub fn arm(&mut self, key: K, now_ms: u64, delay_ms: u32) -> Result<(), Error> {
        self.cancel(key);

        let slot = self
            .entries
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or(Error::Full)?;
        *slot = Some(Entry {
            key,
            deadline_ms: now_ms.saturating_add(u64::from(delay_ms)),
        });
        Ok(())
    }

    /// Drop the pending entry for `key`, if any.
    pub fn cancel(&mut self, key: K) {
        for slot in self.entries.iter_mut() {
            if matches!(slot, Some(entry) if entry.key == key) {
                *slot = None;
            }
        }
    }

    /// Whether `key` is pending.
    pub fn is_armed(&self, key: K) -> bool {
        self.entries.iter().flatten().any(|entry| entry.key == key)
    }

    /// Number of pending entries.
    pub fn pending(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.iter().flatten().map(|entry| entry.deadline_ms).min()
    }

    /// Remove and return the earliest entry that is due at `now_ms`.
    ///
    /// Call repeatedly until it returns `None` to drain everything due.
    pub fn expire(&mut self, now_ms: u64) -> Option<K> {
        let slot = self
            .entries
            .iter_mut()
            .filter(|slot| matches!(slot, Some(entry) if entry.deadline_ms <= now_ms))
            .min_by_key(|slot| slot.as_ref().map_or(u64::MAX, |entry| entry.deadline_ms))?;
        slot.take().map(|entry| entry.key)
    }
}
