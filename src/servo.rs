//! A device abstraction for a bank of hobby servos (SG90 and similar) on shared PWM slices.
//!
//! See [`ServoBank`] for usage. [`SharedServoBank`](shared::SharedServoBank) wraps a bank
//! for use from a `static`.

pub mod shared;

use crate::hardware::{PwmHardware, SliceId};
use crate::pwm_math::{
    Calibration, SERVO_MAX_US_DEFAULT, SERVO_MIN_US_DEFAULT, SERVO_PWM_FREQ_HZ, angle_to_level,
    compute_pwm_parameters,
};
use crate::registry::{Registry, ServoEntry};
use crate::{Error, Result};

/// A device abstraction for up to [`MAX_SERVOS`](crate::MAX_SERVOS) servos, addressed by
/// GPIO number.
///
/// Each pin moves through three states: unconfigured, attached (PWM running) and
/// detached (PWM stopped). [`init`](Self::init) is the only way out of unconfigured and
/// there is no way back.
///
/// # PWM slices
///
/// Every slice has one counter and two outputs, so two GPIOs share a slice
/// (`slice = (pin / 2) % 8` below GPIO 32). All servos run at the same
/// [50 Hz](crate::SERVO_PWM_FREQ_HZ), so sharing is fine for angles, but
/// [`detach`](Self::detach) stops the whole slice: the other servo on it goes limp too,
/// and both report detached.
///
/// # Example
///
/// ```
/// use servo_bank::{ServoBank, hardware::HostPwm};
///
/// let mut servo_bank = ServoBank::new(HostPwm::rp2040(125_000_000));
///
/// servo_bank.init(2, 1_000, 2_000)?;
/// servo_bank.set_degrees(2, 90)?;
/// servo_bank.detach(2)?;
/// assert_eq!(servo_bank.is_attached(2), Some(false));
///
/// servo_bank.set_degrees(2, 45)?; // re-attaches
/// assert_eq!(servo_bank.is_attached(2), Some(true));
///
/// assert!(servo_bank.init(2, 1_000, 2_000).is_err()); // already initialized
/// # Ok::<(), servo_bank::Error>(())
/// ```
#[derive(Debug)]
pub struct ServoBank<H: PwmHardware> {
    hardware: H,
    registry: Registry,
}

impl<H: PwmHardware> ServoBank<H> {
    /// Create an empty bank driving `hardware`.
    #[must_use]
    pub const fn new(hardware: H) -> Self {
        Self {
            hardware,
            registry: Registry::new(),
        }
    }

    /// Start a servo on `pin` with the pulse widths (µs) for 0° and 180°, and move it to 0°.
    ///
    /// Configures the pin's slice for 50 Hz the first time a servo uses it and starts the
    /// slice, re-attaching the other servo on it if that one was detached. Either
    /// everything succeeds or nothing is recorded.
    ///
    /// # Errors
    ///
    /// - [`Error::CapacityExhausted`] if the bank already has [`MAX_SERVOS`](crate::MAX_SERVOS) servos.
    /// - [`Error::AlreadyInitialized`] if `pin` already has a servo.
    /// - [`Error::InvalidCalibration`] if a width is zero or `min_us >= max_us`.
    /// - [`Error::InvalidPin`] if `pin` has no PWM output.
    /// - [`Error::ClockNotConfigured`] / [`Error::FrequencyUnachievable`] if the system
    ///   clock cannot produce 50 Hz.
    pub fn init(&mut self, pin: u8, min_us: u16, max_us: u16) -> Result<()> {
        let vacant = self.registry.allocate(pin).inspect_err(|err| {
            warn_failure("init", pin, err);
        })?;
        let calibration = Calibration::new(min_us, max_us).inspect_err(|err| {
            warn_failure("init", pin, err);
        })?;
        let route = self
            .hardware
            .route(pin)
            .ok_or(Error::InvalidPin { pin })
            .inspect_err(|err| {
                warn_failure("init", pin, err);
            })?;
        let parameters = compute_pwm_parameters(SERVO_PWM_FREQ_HZ, self.hardware.clk_sys_hz())
            .inspect_err(|err| {
                warn_failure("init", pin, err);
            })?;

        self.hardware.set_pwm_function(pin);
        // A slice shared with an existing servo keeps its configuration, counter and the
        // sibling's level.
        if !vacant.is_slice_in_use(route.slice) {
            self.hardware.configure_slice(route.slice, &parameters);
        }
        self.hardware.set_slice_enabled(route.slice, true);
        vacant.insert(route, parameters.wrap(), calibration)?;

        let level = angle_to_level(0, calibration, parameters.wrap(), SERVO_PWM_FREQ_HZ);
        self.hardware.set_level(route, level);

        #[cfg(feature = "defmt")]
        defmt::info!(
            "servo GPIO {} on slice {} channel {}: div={}.{}/16 wrap={} pulse={}..{}us",
            pin,
            route.slice,
            route.channel,
            parameters.divider_int(),
            parameters.divider_frac(),
            parameters.wrap(),
            min_us,
            max_us
        );
        Ok(())
    }

    /// [`init`](Self::init) with the default 1000 µs / 2000 µs pulse widths.
    ///
    /// # Errors
    ///
    /// Same as [`init`](Self::init).
    pub fn init_default(&mut self, pin: u8) -> Result<()> {
        self.init(pin, SERVO_MIN_US_DEFAULT, SERVO_MAX_US_DEFAULT)
    }

    /// Move the servo on `pin` to `degrees` (0..=180; larger values saturate at 180).
    ///
    /// A detached servo is re-attached first, so output is always running afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPin`] if `pin` has no servo.
    pub fn set_degrees(&mut self, pin: u8, degrees: u16) -> Result<()> {
        let entry = self.entry_or_warn("set_degrees", pin)?;
        if !self.registry.is_slice_attached(entry.slice()) {
            self.enable_slice(entry.slice(), true);
            #[cfg(feature = "defmt")]
            defmt::info!("servo GPIO {} re-attached (slice {})", pin, entry.slice());
        }

        let level = angle_to_level(
            degrees,
            entry.calibration(),
            entry.wrap(),
            SERVO_PWM_FREQ_HZ,
        );
        self.hardware.set_level(entry.route(), level);
        #[cfg(feature = "defmt")]
        defmt::debug!("servo GPIO {} -> {} degrees (level {})", pin, degrees, level);
        Ok(())
    }

    /// Stop the PWM slice driving `pin`, letting the servo relax.
    ///
    /// The other servo on the same slice stops as well. Detaching an already detached
    /// servo succeeds without touching the hardware.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPin`] if `pin` has no servo.
    pub fn detach(&mut self, pin: u8) -> Result<()> {
        let entry = self.entry_or_warn("detach", pin)?;
        if !self.registry.is_slice_attached(entry.slice()) {
            #[cfg(feature = "defmt")]
            defmt::debug!("servo GPIO {} already detached", pin);
            return Ok(());
        }
        self.enable_slice(entry.slice(), false);
        #[cfg(feature = "defmt")]
        defmt::info!("servo GPIO {} detached (slice {} disabled)", pin, entry.slice());
        Ok(())
    }

    /// Restart the PWM slice driving `pin`.
    ///
    /// The level is not rewritten: the servo returns to the last commanded position (or to
    /// whatever the other servo on the slice last left there). Attaching an attached servo
    /// succeeds without touching the hardware.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPin`] if `pin` has no servo.
    pub fn attach(&mut self, pin: u8) -> Result<()> {
        let entry = self.entry_or_warn("attach", pin)?;
        if self.registry.is_slice_attached(entry.slice()) {
            #[cfg(feature = "defmt")]
            defmt::debug!("servo GPIO {} already attached", pin);
            return Ok(());
        }
        self.enable_slice(entry.slice(), true);
        #[cfg(feature = "defmt")]
        defmt::info!("servo GPIO {} attached (slice {} enabled)", pin, entry.slice());
        Ok(())
    }

    /// Whether the servo on `pin` is attached, or `None` if `pin` has no servo.
    #[must_use]
    pub fn is_attached(&self, pin: u8) -> Option<bool> {
        self.registry.is_attached(pin)
    }

    /// The servo on `pin`, if any.
    #[must_use]
    pub fn entry(&self, pin: u8) -> Option<&ServoEntry> {
        self.registry.lookup(pin)
    }

    /// Number of servos in the bank.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether the bank has no servos yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// The servo table.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The PWM binding.
    #[must_use]
    pub const fn hardware(&self) -> &H {
        &self.hardware
    }

    /// The PWM binding, mutably. Writes made here bypass the bank's bookkeeping.
    pub const fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    /// Give the PWM binding back.
    #[must_use]
    pub fn into_hardware(self) -> H {
        self.hardware
    }

    fn enable_slice(&mut self, slice: SliceId, enabled: bool) {
        self.hardware.set_slice_enabled(slice, enabled);
        self.registry.set_slice_attached(slice, enabled);
    }

    fn entry_or_warn(&self, operation: &'static str, pin: u8) -> Result<ServoEntry> {
        self.registry.lookup(pin).copied().ok_or_else(|| {
            let err = Error::UnknownPin { pin };
            warn_failure(operation, pin, &err);
            err
        })
    }
}

#[cfg_attr(not(feature = "defmt"), allow(unused_variables, reason = "only logged"))]
fn warn_failure(operation: &'static str, pin: u8, err: &Error) {
    #[cfg(feature = "defmt")]
    defmt::warn!("servo {} on GPIO {} failed: {}", operation, pin, err);
}
