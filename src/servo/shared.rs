//! A [`ServoBank`] behind a critical-section mutex.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use super::ServoBank;
use crate::Result;
use crate::hardware::PwmHardware;

/// A [`ServoBank`] that can live in a `static` and be used from both thread mode and
/// interrupt handlers.
///
/// Every call runs inside a critical section, so operations from different contexts never
/// interleave. Calling back into the same `SharedServoBank` from inside
/// [`lock`](Self::lock) panics.
///
/// ```
/// use servo_bank::{SharedServoBank, hardware::HostPwm};
///
/// let servos = SharedServoBank::new(HostPwm::rp2040(125_000_000));
/// servos.init_default(4)?;
/// servos.set_degrees(4, 30)?;
/// assert_eq!(servos.lock(|servo_bank| servo_bank.is_attached(4)), Some(true));
/// # Ok::<(), servo_bank::Error>(())
/// ```
pub struct SharedServoBank<H: PwmHardware> {
    servo_bank: Mutex<CriticalSectionRawMutex, RefCell<ServoBank<H>>>,
}

impl<H: PwmHardware> SharedServoBank<H> {
    /// Create an empty shared bank driving `hardware`.
    #[must_use]
    pub const fn new(hardware: H) -> Self {
        Self {
            servo_bank: Mutex::new(RefCell::new(ServoBank::new(hardware))),
        }
    }

    /// Run `f` with exclusive access to the bank.
    pub fn lock<R>(&self, f: impl FnOnce(&mut ServoBank<H>) -> R) -> R {
        self.servo_bank.lock(|servo_bank| f(&mut servo_bank.borrow_mut()))
    }

    /// See [`ServoBank::init`].
    ///
    /// # Errors
    ///
    /// Same as [`ServoBank::init`].
    pub fn init(&self, pin: u8, min_us: u16, max_us: u16) -> Result<()> {
        self.lock(|servo_bank| servo_bank.init(pin, min_us, max_us))
    }

    /// See [`ServoBank::init_default`].
    ///
    /// # Errors
    ///
    /// Same as [`ServoBank::init`].
    pub fn init_default(&self, pin: u8) -> Result<()> {
        self.lock(|servo_bank| servo_bank.init_default(pin))
    }

    /// See [`ServoBank::set_degrees`].
    ///
    /// # Errors
    ///
    /// Same as [`ServoBank::set_degrees`].
    pub fn set_degrees(&self, pin: u8, degrees: u16) -> Result<()> {
        self.lock(|servo_bank| servo_bank.set_degrees(pin, degrees))
    }

    /// See [`ServoBank::detach`].
    ///
    /// # Errors
    ///
    /// Same as [`ServoBank::detach`].
    pub fn detach(&self, pin: u8) -> Result<()> {
        self.lock(|servo_bank| servo_bank.detach(pin))
    }

    /// See [`ServoBank::attach`].
    ///
    /// # Errors
    ///
    /// Same as [`ServoBank::attach`].
    pub fn attach(&self, pin: u8) -> Result<()> {
        self.lock(|servo_bank| servo_bank.attach(pin))
    }
}
