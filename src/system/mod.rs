//! System services shared by the firmware components.
//!
//! # Available Utilities
//!
//! - **[`scheduler`]**: one-shot deferred actions driven by a millisecond clock
//!
//! The firmware runs as a single event loop. Nothing in here owns a thread or
//! reads a clock on its own; the caller passes `now_ms` in and gets due work
//! back out.
//!
//! ```rust
//! use iotlink::system::scheduler::Scheduler;
//!
//! let mut timers: Scheduler<&str, 4> = Scheduler::new();
//! timers.arm("blink", 0, 300).unwrap();
//! assert_eq!(timers.expire(299), None);
//! assert_eq!(timers.expire(300), Some("blink"));
//! ```

/// One-shot timer table.
pub mod scheduler;
