// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::reservoir::MAX_RATE;

/// Error returned when a reservoir is asked for more than [`MAX_RATE`] samples per second
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("reservoir of {per_second} samples per second exceeds the supported maximum of {} per second", MAX_RATE - 1)]
pub struct ReservoirConfigError {
    per_second: u64,
}

impl ReservoirConfigError {
    /// The rejected capacity
    pub fn per_second(&self) -> u64 {
        self.per_second
    }
}

#[inline]
fn pack(epoch: u64, count: u64) -> u64 {
    epoch * MAX_RATE + count
}

#[inline]
fn epoch_of(packed: u64) -> u64 {
    packed / MAX_RATE
}

#[inline]
fn count_of(packed: u64) -> u64 {
    packed % MAX_RATE
}

fn current_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// Grants at most `per_second` takes per wall-clock second.
///
/// The current second and the number of takes seen during that second are packed in a single
/// atomic word (`epoch * MAX_RATE + count`) so the common case is one `fetch_add`. The mutex is
/// only taken by calls that observe a stale second, to reset the word once per second.
pub struct Reservoir {
    per_second: u64,
    packed: AtomicU64,
    rollover: Mutex<()>,
}

impl fmt::Debug for Reservoir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let packed = self.packed.load(Ordering::Relaxed);
        f.debug_struct("Reservoir")
            .field("per_second", &self.per_second)
            .field("epoch", &epoch_of(packed))
            .field("taken", &count_of(packed))
            .finish()
    }
}

impl Reservoir {
    /// Creates a reservoir granting `per_second` takes every second.
    ///
    /// Fails if `per_second` is not strictly below [`MAX_RATE`].
    pub fn new(per_second: u64) -> Result<Self, ReservoirConfigError> {
        if per_second >= MAX_RATE {
            return Err(ReservoirConfigError { per_second });
        }
        Ok(Reservoir {
            per_second,
            packed: AtomicU64::new(0),
            rollover: Mutex::new(()),
        })
    }

    /// Returns the number of takes granted every second
    pub fn per_second(&self) -> u64 {
        self.per_second
    }

    /// Consumes one slot of the current second.
    ///
    /// # Returns
    /// `true` if the current second still had capacity, `false` otherwise
    pub fn take(&self) -> bool {
        self.take_at(current_epoch())
    }

    pub(crate) fn take_at(&self, now: u64) -> bool {
        let mut packed = self.packed.fetch_add(1, Ordering::AcqRel) + 1;

        // The increment landed on an older second: the reset erases it, so count again.
        // A caller behind the stored second keeps the slot it already took there.
        if epoch_of(packed) < now {
            let _guard = self
                .rollover
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            // another caller may have rolled the counter over while we waited for the lock
            if epoch_of(self.packed.load(Ordering::Acquire)) < now {
                self.packed.store(pack(now, 0), Ordering::Release);
            }
            packed = self.packed.fetch_add(1, Ordering::AcqRel) + 1;
        }

        count_of(packed) <= self.per_second
    }
}
