//! The hardware seam: what a [`ServoBank`](crate::ServoBank) needs from the PWM peripheral.
//!
//! [`RpPwm`] drives the real RP2040/RP2350 registers. With the `host` feature,
//! [`HostPwm`] stands in for the chip and records every call.

#[cfg(feature = "host")]
mod host;
#[cfg(all(any(feature = "pico1", feature = "pico2"), not(feature = "host")))]
mod rp;

#[cfg(feature = "host")]
pub use host::{HostPwm, SliceRecord};
#[cfg(all(any(feature = "pico1", feature = "pico2"), not(feature = "host")))]
pub use rp::RpPwm;

use crate::pwm_math::PwmParameters;

/// Highest GPIO with a PWM function on the RP2040.
pub const RP2040_MAX_PWM_PIN: u8 = 29;

/// Highest GPIO with a PWM function on the RP2350 (80-pin package).
pub const RP2350_MAX_PWM_PIN: u8 = 47;

/// Index of a PWM slice (one counter, two channels).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SliceId(u8);

impl SliceId {
    /// Wrap a raw slice number.
    #[must_use]
    pub const fn new(slice: u8) -> Self {
        Self(slice)
    }

    /// Raw slice number, usable as a register-block index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One of the two outputs of a slice.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Even GPIOs.
    A,
    /// Odd GPIOs.
    B,
}

/// Which slice and channel a GPIO drives when muxed to PWM.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmRoute {
    /// Slice that owns the counter.
    pub slice: SliceId,
    /// Output of that slice.
    pub channel: Channel,
}

impl PwmRoute {
    /// Routing on the RP2040: GPIO 0..=29, slices 0..=7 repeating every 16 pins.
    ///
    /// ```
    /// use servo_bank::hardware::{Channel, PwmRoute, SliceId};
    ///
    /// let route = PwmRoute::rp2040(11).expect("GPIO 11 has PWM");
    /// assert_eq!(route.slice, SliceId::new(5));
    /// assert_eq!(route.channel, Channel::B);
    /// assert_eq!(PwmRoute::rp2040(30), None);
    /// ```
    #[must_use]
    pub const fn rp2040(pin: u8) -> Option<Self> {
        if pin > RP2040_MAX_PWM_PIN {
            return None;
        }
        Some(Self::new((pin >> 1) & 7, pin))
    }

    /// Routing on the RP2350: GPIO 0..=31 as on the RP2040, GPIO 32..=47 on slices 8..=11.
    ///
    /// ```
    /// use servo_bank::hardware::{Channel, PwmRoute, SliceId};
    ///
    /// let route = PwmRoute::rp2350(38).expect("GPIO 38 has PWM");
    /// assert_eq!(route.slice, SliceId::new(11));
    /// assert_eq!(route.channel, Channel::A);
    /// ```
    #[must_use]
    pub const fn rp2350(pin: u8) -> Option<Self> {
        if pin > RP2350_MAX_PWM_PIN {
            return None;
        }
        if pin < 32 {
            Some(Self::new((pin >> 1) & 7, pin))
        } else {
            Some(Self::new(8 + ((pin >> 1) & 3), pin))
        }
    }

    const fn new(slice: u8, pin: u8) -> Self {
        let channel = if pin & 1 == 0 { Channel::A } else { Channel::B };
        Self {
            slice: SliceId(slice),
            channel,
        }
    }
}

/// Register-level operations a servo bank performs on the PWM peripheral.
///
/// Implementations do no validation of their own; the bank only calls them with pins
/// that [`route`](Self::route) accepted.
pub trait PwmHardware {
    /// Current system clock (Hz). 0 means the clock tree is not set up yet.
    fn clk_sys_hz(&self) -> u32;

    /// Slice and channel for `pin`, or `None` if the pin has no PWM function.
    fn route(&self, pin: u8) -> Option<PwmRoute>;

    /// Mux `pin` to its PWM function.
    fn set_pwm_function(&mut self, pin: u8);

    /// Program wrap and divider of `slice` and restart its counter. Leaves the slice
    /// disabled and its compare levels untouched.
    fn configure_slice(&mut self, slice: SliceId, parameters: &PwmParameters);

    /// Start or stop the counter (and so both outputs) of `slice`.
    fn set_slice_enabled(&mut self, slice: SliceId, enabled: bool);

    /// Set the compare level of one channel.
    fn set_level(&mut self, route: PwmRoute, level: u16);
}
