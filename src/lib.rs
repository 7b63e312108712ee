//! Drive up to eight hobby servos from the hardware PWM of a Pico 1 or Pico 2.
//!
//! A [`ServoBank`] owns a fixed table of servos keyed by GPIO number. Each servo is
//! configured once with its calibration (pulse widths for 0° and 180°), then moved with
//! [`ServoBank::set_degrees`], and relaxed or re-energized with [`ServoBank::detach`] /
//! [`ServoBank::attach`].
//!
//! ```rust,ignore
//! use servo_bank::{Result, ServoBank, hardware::RpPwm};
//!
//! fn example() -> Result<()> {
//!     let _p = embassy_rp::init(Default::default());
//!     let mut servo_bank = ServoBank::new(RpPwm::new());
//!
//!     servo_bank.init_default(2)?; // 1000..2000 µs
//!     servo_bank.init(15, 500, 2_500)?;
//!     servo_bank.set_degrees(2, 90)?;
//!     servo_bank.detach(2)?; // relaxes every servo on PWM slice 1
//!     servo_bank.set_degrees(2, 45)?; // re-attaches
//!     Ok(())
//! }
//! ```
//!
//! # Glossary
//!
//! - **PWM ([Pulse Width Modulation](https://en.wikipedia.org/wiki/Pulse-width_modulation)) Slices:**
//!   Pico 1 has 8 slices, Pico 2 has 12. Each slice has one counter and drives two
//!   channels (A for even GPIOs, B for odd GPIOs). These "slices" are unrelated to Rust
//!   slices.
//! - **Wrap:** the counter value at which a slice restarts its period.
//! - **Level:** the compare value that ends the high part of the pulse on one channel.
//! - **Attach/Detach:** enabling/disabling a whole slice. Detaching one servo also stops
//!   any other servo on the same slice.
#![cfg_attr(not(feature = "host"), no_std)]

// Compile-time checks: exactly one board must be selected (unless testing with host feature)
#[cfg(all(not(any(feature = "pico1", feature = "pico2")), not(feature = "host")))]
compile_error!("Must enable exactly one board feature: 'pico1' or 'pico2'");

#[cfg(all(feature = "pico1", feature = "pico2"))]
compile_error!("Cannot enable both 'pico1' and 'pico2' features simultaneously");

mod error;
pub mod hardware;
pub mod pwm_math;
pub mod registry;
pub mod servo;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
pub use crate::pwm_math::{
    Calibration, PwmParameters, SERVO_MAX_US_DEFAULT, SERVO_MIN_US_DEFAULT, SERVO_PWM_FREQ_HZ,
};
pub use crate::registry::{MAX_SERVOS, ServoEntry};
pub use crate::servo::{ServoBank, shared::SharedServoBank};
