use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::pac;

use super::{Channel, PwmHardware, PwmRoute, SliceId};
use crate::pwm_math::PwmParameters;

// IO_BANK0 function select for the PWM peripheral (same on RP2040 and RP2350).
const FUNCSEL_PWM: u8 = 4;

/// [`PwmHardware`] for the Pico's own PWM block.
///
/// Registers are written directly, so the slices of every pin given to the bank must not
/// also be handed to `embassy_rp::pwm::Pwm`. Call `embassy_rp::init` before the first
/// servo is initialized; the divider is derived from the running system clock.
#[derive(Debug, Default)]
pub struct RpPwm {
    _private: (),
}

impl RpPwm {
    /// Create the binding.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(feature = "pico1")]
const fn chip_route(pin: u8) -> Option<PwmRoute> {
    PwmRoute::rp2040(pin)
}

#[cfg(feature = "pico2")]
const fn chip_route(pin: u8) -> Option<PwmRoute> {
    PwmRoute::rp2350(pin)
}

impl PwmHardware for RpPwm {
    fn clk_sys_hz(&self) -> u32 {
        clk_sys_freq()
    }

    fn route(&self, pin: u8) -> Option<PwmRoute> {
        chip_route(pin)
    }

    fn set_pwm_function(&mut self, pin: u8) {
        let index = usize::from(pin);
        // RP2350 pads power up isolated.
        #[cfg(feature = "pico2")]
        pac::PADS_BANK0.gpio(index).modify(|w| w.set_iso(false));
        pac::IO_BANK0
            .gpio(index)
            .ctrl()
            .write(|w| w.set_funcsel(FUNCSEL_PWM));
    }

    fn configure_slice(&mut self, slice: SliceId, parameters: &PwmParameters) {
        let ch = pac::PWM.ch(slice.index());
        // Free-running, edge-aligned, disabled.
        ch.csr().write(|w| w.set_en(false));
        ch.div().write(|w| {
            w.set_int(parameters.divider_int());
            w.set_frac(parameters.divider_frac());
        });
        ch.top().write(|w| w.set_top(parameters.wrap()));
        ch.ctr().write(|w| w.set_ctr(0));
    }

    fn set_slice_enabled(&mut self, slice: SliceId, enabled: bool) {
        pac::PWM
            .ch(slice.index())
            .csr()
            .modify(|w| w.set_en(enabled));
    }

    fn set_level(&mut self, route: PwmRoute, level: u16) {
        pac::PWM
            .ch(route.slice.index())
            .cc()
            .modify(|w| match route.channel {
                Channel::A => w.set_a(level),
                Channel::B => w.set_b(level),
            });
    }
}
