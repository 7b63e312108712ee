//! Pure PWM arithmetic: slice divider/wrap from a frequency, and compare level from an angle.
//!
//! Everything here is exact integer arithmetic so results are identical on the Pico and
//! on the host.

use fixed::types::U12F4;

use crate::{Error, Result};

/// Servo refresh frequency shared by every managed slice (Hz).
pub const SERVO_PWM_FREQ_HZ: u32 = 50;

/// Default pulse width for 0° (microseconds).
pub const SERVO_MIN_US_DEFAULT: u16 = 1_000;

/// Default pulse width for 180° (microseconds).
pub const SERVO_MAX_US_DEFAULT: u16 = 2_000;

/// Largest commandable angle; larger requests saturate here.
pub const MAX_DEGREES: u16 = 180;

const MICROS_PER_SECOND: u64 = 1_000_000;

// The counter is 16 bits wide; the divider has 4 fractional bits.
const COUNTER_STEPS: u64 = 1 << 16;
const DIVIDER_FRAC_STEPS: u64 = 16;
const DIVIDER_MIN_BITS: u16 = 0x010; // 1.0
const DIVIDER_MAX_BITS: u16 = 0xFFF; // 255.9375

/// Clock divider of a PWM slice: 8 integer bits and 4 fractional bits in hardware.
pub type Divider = U12F4;

/// Calibration of one servo: the pulse widths for 0° and 180°.
///
/// Construction validates `0 < min_us < max_us`, so every `Calibration` in the program
/// describes a usable servo.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    min_us: u16,
    max_us: u16,
}

impl Calibration {
    /// Create a calibration from the pulse widths (µs) for 0° and 180°.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCalibration`] if either width is zero or `min_us >= max_us`.
    pub const fn new(min_us: u16, max_us: u16) -> Result<Self> {
        if min_us == 0 || max_us == 0 || min_us >= max_us {
            return Err(Error::InvalidCalibration { min_us, max_us });
        }
        Ok(Self { min_us, max_us })
    }

    /// Pulse width for 0°.
    #[must_use]
    pub const fn min_us(&self) -> u16 {
        self.min_us
    }

    /// Pulse width for 180°.
    #[must_use]
    pub const fn max_us(&self) -> u16 {
        self.max_us
    }

    /// Pulse width (µs, rounded) this calibration produces for `degrees`.
    ///
    /// Angles above 180° saturate.
    ///
    /// ```
    /// use servo_bank::Calibration;
    ///
    /// let calibration = Calibration::default();
    /// assert_eq!(calibration.pulse_us(0), 1_000);
    /// assert_eq!(calibration.pulse_us(90), 1_500);
    /// assert_eq!(calibration.pulse_us(250), 2_000);
    /// ```
    #[must_use]
    pub fn pulse_us(&self, degrees: u16) -> u16 {
        let scaled = self.scaled_pulse(degrees);
        let max_degrees = u64::from(MAX_DEGREES);
        let pulse_us = (scaled + max_degrees / 2) / max_degrees;
        // Bounded by max_us.
        u16::try_from(pulse_us).unwrap_or(self.max_us)
    }

    // Pulse width times 180, so the interpolation stays exact.
    fn scaled_pulse(&self, degrees: u16) -> u64 {
        let degrees = u64::from(degrees.min(MAX_DEGREES));
        let min_us = u64::from(self.min_us);
        let span_us = u64::from(self.max_us - self.min_us);
        min_us * u64::from(MAX_DEGREES) + degrees * span_us
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            min_us: SERVO_MIN_US_DEFAULT,
            max_us: SERVO_MAX_US_DEFAULT,
        }
    }
}

/// Period and divider settings for one PWM slice.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PwmParameters {
    wrap: u16,
    divider: Divider,
}

impl PwmParameters {
    /// Counter value at which the slice wraps (period in ticks minus one). Never zero.
    #[must_use]
    pub const fn wrap(&self) -> u16 {
        self.wrap
    }

    /// Effective clock divider, in steps of 1/16.
    #[must_use]
    pub const fn divider(&self) -> Divider {
        self.divider
    }

    /// Integer part of the divider, 1..=255.
    #[must_use]
    pub fn divider_int(&self) -> u8 {
        // DIVIDER_MAX_BITS keeps the integer part within 8 bits.
        u8::try_from(self.divider.to_bits() >> 4).unwrap_or(u8::MAX)
    }

    /// Fractional part of the divider in sixteenths, 0..=15.
    #[must_use]
    pub fn divider_frac(&self) -> u8 {
        // Masked to 4 bits.
        u8::try_from(self.divider.to_bits() & 0xF).unwrap_or(0)
    }
}

/// Derive the slice divider and wrap value that produce `target_hz` from `clk_sys_hz`.
///
/// The divider is chosen so that the full 16-bit counter range covers one period, truncated
/// to the hardware's 1/16 resolution and never below 1.0. The wrap value is then recomputed
/// from that quantized divider (rounded), and clamped to 65 535 if quantization pushed it
/// past the counter width.
///
/// ```
/// use servo_bank::pwm_math::compute_pwm_parameters;
///
/// let parameters = compute_pwm_parameters(50, 125_000_000)?;
/// assert_eq!((parameters.divider_int(), parameters.divider_frac()), (38, 2));
/// assert_eq!(parameters.wrap(), u16::MAX);
/// # Ok::<(), servo_bank::Error>(())
/// ```
///
/// # Errors
///
/// - [`Error::ClockNotConfigured`] if `clk_sys_hz` is 0.
/// - [`Error::FrequencyUnachievable`] if `target_hz` is 0, the divider would exceed
///   255.9375, or the period would be a single tick.
pub fn compute_pwm_parameters(target_hz: u32, clk_sys_hz: u32) -> Result<PwmParameters> {
    if clk_sys_hz == 0 {
        return Err(Error::ClockNotConfigured);
    }
    let unachievable = Error::FrequencyUnachievable {
        target_hz,
        clk_sys_hz,
    };
    if target_hz == 0 {
        return Err(unachievable);
    }

    let clk_hz = u64::from(clk_sys_hz);
    let freq_hz = u64::from(target_hz);

    // Ideal divider in sixteenths: clk * 16 / (freq * 65536).
    let sixteenths_den = freq_hz * (COUNTER_STEPS / DIVIDER_FRAC_STEPS);
    if clk_hz > u64::from(DIVIDER_MAX_BITS) * sixteenths_den {
        return Err(unachievable);
    }
    let divider_bits = (clk_hz / sixteenths_den).max(u64::from(DIVIDER_MIN_BITS));
    let divider_bits = u16::try_from(divider_bits).map_err(|_| unachievable)?;

    // Ticks per period with the effective divider: clk / ((bits / 16) * freq), rounded.
    let ticks_num = clk_hz * DIVIDER_FRAC_STEPS;
    let ticks_den = u64::from(divider_bits) * freq_hz;
    let ticks = (ticks_num + ticks_den / 2) / ticks_den;
    let wrap = ticks.saturating_sub(1);
    if wrap == 0 {
        return Err(unachievable);
    }

    Ok(PwmParameters {
        wrap: u16::try_from(wrap).unwrap_or(u16::MAX),
        divider: Divider::from_bits(divider_bits),
    })
}

/// Compare level that makes a slice with period `wrap + 1` ticks at `pwm_hz` emit the pulse
/// `calibration` assigns to `degrees`.
///
/// Angles above 180° saturate. The result is rounded to the nearest tick and never exceeds
/// `wrap`. A `pwm_hz` of 0 gives level 0.
///
/// ```
/// use servo_bank::{Calibration, pwm_math::angle_to_level};
///
/// // 20 ms period split into 20 000 ticks: one tick per microsecond.
/// let calibration = Calibration::new(500, 2_500)?;
/// assert_eq!(angle_to_level(0, calibration, 19_999, 50), 500);
/// assert_eq!(angle_to_level(90, calibration, 19_999, 50), 1_500);
/// assert_eq!(angle_to_level(180, calibration, 19_999, 50), 2_500);
/// # Ok::<(), servo_bank::Error>(())
/// ```
#[must_use]
pub fn angle_to_level(degrees: u16, calibration: Calibration, wrap: u16, pwm_hz: u32) -> u16 {
    // level = pulse_us / period_us * (wrap + 1), period_us = 1e6 / pwm_hz
    let numerator = u128::from(calibration.scaled_pulse(degrees))
        * u128::from(pwm_hz)
        * (u128::from(wrap) + 1);
    let denominator = u128::from(MAX_DEGREES) * u128::from(MICROS_PER_SECOND);
    let level = (numerator + denominator / 2) / denominator;
    u16::try_from(level).map_or(wrap, |level| level.min(wrap))
}
