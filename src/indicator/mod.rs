//! Status LEDs.
//!
//! Two patterns are shown:
//!
//! - **searching**: the first two LEDs blink together every
//!   `indicator_interval_ms`. The third blinks with them while the network is
//!   down and stays lit once an address is held, so "network up, session down"
//!   can be told apart from "no network".
//! - **connected**: all three LEDs steadily on.
//!
//! The blink is a one-shot timer in the caller's [`Scheduler`] that re-arms
//! itself on every toggle. Switching pattern always cancels the pending toggle
//! first.

use crate::system::scheduler::Scheduler;

/// One of the three status LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Led {
    /// First LED.
    First,
    /// Second LED.
    Second,
    /// Third LED, doubles as the network indicator.
    Third,
}

impl Led {
    /// Every LED in board order.
    pub const ALL: [Led; 3] = [Led::First, Led::Second, Led::Third];
}

/// GPIO access for the status LEDs. `on` is the logical state; polarity is
/// the board's business.
pub trait IndicatorDriver {
    /// Switch one LED.
    fn set(&mut self, led: Led, on: bool);
}

/// What the LEDs are showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Blinking while no session is up.
    Searching,
    /// Steady on.
    Connected,
}

/// Drives the status LEDs from a toggle timer.
#[derive(Debug)]
pub struct Indicator<K> {
    toggle: K,
    interval_ms: u32,
    pattern: Pattern,
    lit: bool,
}

impl<K: Copy + PartialEq> Indicator<K> {
    /// `toggle` is the scheduler key this indicator arms for its blink.
    pub fn new(toggle: K, interval_ms: u32) -> Self {
        Self {
            toggle,
            interval_ms,
            pattern: Pattern::Searching,
            lit: true,
        }
    }

    /// Current pattern.
    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    /// Switch to `pattern`.
    pub fn set_pattern<D: IndicatorDriver, const N: usize>(
        &mut self,
        pattern: Pattern,
        now_ms: u64,
        timers: &mut Scheduler<K, N>,
        driver: &mut D,
    ) {
        timers.cancel(self.toggle);
        self.pattern = pattern;

        match pattern {
            Pattern::Searching => {
                self.lit = true;
                self.arm(now_ms, timers);
            }
            Pattern::Connected => {
                for led in Led::ALL {
                    driver.set(led, true);
                }
            }
        }
    }

    /// The toggle timer fired.
    pub fn on_toggle<D: IndicatorDriver, const N: usize>(
        &mut self,
        now_ms: u64,
        network_up: bool,
        timers: &mut Scheduler<K, N>,
        driver: &mut D,
    ) {
        if self.pattern != Pattern::Searching {
            return;
        }

        driver.set(Led::First, self.lit);
        driver.set(Led::Second, self.lit);
        driver.set(Led::Third, network_up || self.lit);
        self.lit = !self.lit;

        self.arm(now_ms, timers);
    }

    fn arm<const N: usize>(&mut self, now_ms: u64, timers: &mut Scheduler<K, N>) {
        if timers.arm(self.toggle, now_ms, self.interval_ms).is_err() {
            log::warn!("indicator: no timer slot, blink stopped");
        }
    }
}
