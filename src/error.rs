//! Error type shared by every operation in this crate.

use derive_more::{Display, Error};

/// Crate-wide result type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Why a servo operation was refused.
///
/// No error is retried internally and none leaves partial state behind.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Every one of the [`MAX_SERVOS`](crate::MAX_SERVOS) slots already holds a servo.
    #[display("no free servo slot (capacity {})", crate::MAX_SERVOS)]
    CapacityExhausted,

    /// The pin already has a servo.
    #[display("servo on GPIO {pin} already initialized")]
    AlreadyInitialized {
        /// GPIO number.
        pin: u8,
    },

    /// Pulse widths are zero or not strictly increasing.
    #[display("invalid pulse widths (min {min_us} us, max {max_us} us)")]
    InvalidCalibration {
        /// Pulse width for 0 degrees.
        min_us: u16,
        /// Pulse width for 180 degrees.
        max_us: u16,
    },

    /// The pin has no PWM output on this chip.
    #[display("GPIO {pin} has no PWM output")]
    InvalidPin {
        /// GPIO number.
        pin: u8,
    },

    /// The system clock reads 0 Hz.
    #[display("system clock not configured")]
    ClockNotConfigured,

    /// The divider needed for the frequency is outside 1.0..=255.9375, or the period
    /// collapses to zero ticks.
    #[display("cannot generate {target_hz} Hz from a {clk_sys_hz} Hz system clock")]
    FrequencyUnachievable {
        /// Requested PWM frequency.
        target_hz: u32,
        /// System clock the divider was derived from.
        clk_sys_hz: u32,
    },

    /// No servo was initialized on the pin.
    #[display("no servo initialized on GPIO {pin}")]
    UnknownPin {
        /// GPIO number.
        pin: u8,
    },
}
