#![cfg(feature = "host")]

use std::collections::{BTreeMap, BTreeSet};

use super::{Channel, PwmHardware, PwmRoute, SliceId};
use crate::pwm_math::PwmParameters;

/// Register state of one slice as seen by [`HostPwm`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SliceRecord {
    /// Last wrap/divider written, if any.
    pub parameters: Option<PwmParameters>,
    /// Whether the counter is running.
    pub enabled: bool,
    /// Compare level of channel A.
    pub level_a: u16,
    /// Compare level of channel B.
    pub level_b: u16,
    /// How many times the slice has been (re)configured.
    pub configure_count: u32,
    /// How many times the enable bit has been written.
    pub enable_writes: u32,
}

impl SliceRecord {
    /// Compare level of `channel`.
    #[must_use]
    pub const fn level(&self, channel: Channel) -> u16 {
        match channel {
            Channel::A => self.level_a,
            Channel::B => self.level_b,
        }
    }
}

/// [`PwmHardware`] that keeps the PWM block in memory, for host tests and simulation.
///
/// ```
/// use servo_bank::{ServoBank, hardware::HostPwm};
///
/// let mut servo_bank = ServoBank::new(HostPwm::rp2040(125_000_000));
/// servo_bank.init_default(2)?;
/// servo_bank.set_degrees(2, 180)?;
/// assert_eq!(servo_bank.hardware().level(2), Some(6_554));
/// # Ok::<(), servo_bank::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct HostPwm {
    clk_sys_hz: u32,
    route: fn(u8) -> Option<PwmRoute>,
    slices: BTreeMap<SliceId, SliceRecord>,
    pwm_pins: BTreeSet<u8>,
}

impl HostPwm {
    /// A simulated RP2040 running at `clk_sys_hz`.
    #[must_use]
    pub fn rp2040(clk_sys_hz: u32) -> Self {
        Self::with_route(clk_sys_hz, PwmRoute::rp2040)
    }

    /// A simulated RP2350 (80-pin) running at `clk_sys_hz`.
    #[must_use]
    pub fn rp2350(clk_sys_hz: u32) -> Self {
        Self::with_route(clk_sys_hz, PwmRoute::rp2350)
    }

    fn with_route(clk_sys_hz: u32, route: fn(u8) -> Option<PwmRoute>) -> Self {
        Self {
            clk_sys_hz,
            route,
            slices: BTreeMap::new(),
            pwm_pins: BTreeSet::new(),
        }
    }

    /// Change the reported system clock.
    pub const fn set_clk_sys_hz(&mut self, clk_sys_hz: u32) {
        self.clk_sys_hz = clk_sys_hz;
    }

    /// Register state of `slice`, if anything was ever written to it.
    #[must_use]
    pub fn slice(&self, slice: SliceId) -> Option<&SliceRecord> {
        self.slices.get(&slice)
    }

    /// Whether `slice` is currently running.
    #[must_use]
    pub fn is_slice_enabled(&self, slice: SliceId) -> bool {
        self.slice(slice).is_some_and(|record| record.enabled)
    }

    /// Whether the slice driving `pin` is running.
    #[must_use]
    pub fn is_pin_driven(&self, pin: u8) -> bool {
        self.pwm_pins.contains(&pin)
            && (self.route)(pin).is_some_and(|route| self.is_slice_enabled(route.slice))
    }

    /// Compare level on the channel `pin` drives.
    #[must_use]
    pub fn level(&self, pin: u8) -> Option<u16> {
        let route = (self.route)(pin)?;
        self.slice(route.slice)
            .map(|record| record.level(route.channel))
    }

    /// Whether `pin` has been muxed to PWM.
    #[must_use]
    pub fn is_pwm_function(&self, pin: u8) -> bool {
        self.pwm_pins.contains(&pin)
    }

    fn record_mut(&mut self, slice: SliceId) -> &mut SliceRecord {
        self.slices.entry(slice).or_default()
    }
}

impl PwmHardware for HostPwm {
    fn clk_sys_hz(&self) -> u32 {
        self.clk_sys_hz
    }

    fn route(&self, pin: u8) -> Option<PwmRoute> {
        (self.route)(pin)
    }

    fn set_pwm_function(&mut self, pin: u8) {
        self.pwm_pins.insert(pin);
    }

    fn configure_slice(&mut self, slice: SliceId, parameters: &PwmParameters) {
        let record = self.record_mut(slice);
        record.parameters = Some(*parameters);
        record.enabled = false;
        record.configure_count = record.configure_count.saturating_add(1);
    }

    fn set_slice_enabled(&mut self, slice: SliceId, enabled: bool) {
        let record = self.record_mut(slice);
        record.enabled = enabled;
        record.enable_writes = record.enable_writes.saturating_add(1);
    }

    fn set_level(&mut self, route: PwmRoute, level: u16) {
        let record = self.record_mut(route.slice);
        match route.channel {
            Channel::A => record.level_a = level,
            Channel::B => record.level_b = level,
        }
    }
}
