//! Fixed-capacity table of managed servos, keyed by GPIO number.
//!
//! Lookups are linear scans; with at most [`MAX_SERVOS`] entries nothing faster pays off.
//! Entries are never removed.
//!
//! Whether a servo is attached is a property of its PWM slice, not of the pin: the
//! registry keeps one attached flag per slice in use, and every entry on that slice
//! reads the same flag.

use heapless::Vec;

use crate::hardware::{Channel, PwmRoute, SliceId};
use crate::pwm_math::Calibration;
use crate::{Error, Result};

/// Maximum number of servos one bank manages at the same time.
pub const MAX_SERVOS: usize = 8;

/// One managed servo.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoEntry {
    pin: u8,
    route: PwmRoute,
    wrap: u16,
    calibration: Calibration,
}

impl ServoEntry {
    /// GPIO number.
    #[must_use]
    pub const fn pin(&self) -> u8 {
        self.pin
    }

    /// Slice and channel this servo is driven from.
    #[must_use]
    pub const fn route(&self) -> PwmRoute {
        self.route
    }

    /// Slice this servo shares with the other pin of the pair.
    #[must_use]
    pub const fn slice(&self) -> SliceId {
        self.route.slice
    }

    /// Output of the slice this servo uses.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        self.route.channel
    }

    /// Wrap value the slice was configured with.
    #[must_use]
    pub const fn wrap(&self) -> u16 {
        self.wrap
    }

    /// Pulse widths for 0° and 180°.
    #[must_use]
    pub const fn calibration(&self) -> Calibration {
        self.calibration
    }
}

#[derive(Clone, Copy, Debug)]
struct SliceState {
    slice: SliceId,
    attached: bool,
}

/// Table of up to [`MAX_SERVOS`] servos plus the attached state of their slices.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    entries: Vec<ServoEntry, MAX_SERVOS>,
    // Never more distinct slices than entries.
    slices: Vec<SliceState, MAX_SERVOS>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            slices: Vec::new(),
        }
    }

    /// Reserve room for a servo on `pin`.
    ///
    /// Nothing is recorded until [`Vacant::insert`] is called, so a caller that bails out
    /// after allocating leaves the registry unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::CapacityExhausted`] if all [`MAX_SERVOS`] slots are in use (checked first).
    /// - [`Error::AlreadyInitialized`] if `pin` already has a servo.
    pub fn allocate(&mut self, pin: u8) -> Result<Vacant<'_>> {
        if self.entries.is_full() {
            return Err(Error::CapacityExhausted);
        }
        if self.lookup(pin).is_some() {
            return Err(Error::AlreadyInitialized { pin });
        }
        Ok(Vacant {
            registry: self,
            pin,
        })
    }

    /// The servo on `pin`, if any.
    #[must_use]
    pub fn lookup(&self, pin: u8) -> Option<&ServoEntry> {
        self.entries.iter().find(|entry| entry.pin == pin)
    }

    /// Whether the servo on `pin` is attached, or `None` if there is no such servo.
    #[must_use]
    pub fn is_attached(&self, pin: u8) -> Option<bool> {
        self.lookup(pin)
            .map(|entry| self.is_slice_attached(entry.slice()))
    }

    /// Whether `slice` is marked attached. Slices with no servo report `false`.
    #[must_use]
    pub fn is_slice_attached(&self, slice: SliceId) -> bool {
        self.slice_state(slice).is_some_and(|state| state.attached)
    }

    /// Whether some servo already uses `slice` (and so has configured it).
    #[must_use]
    pub fn is_slice_in_use(&self, slice: SliceId) -> bool {
        self.slice_state(slice).is_some()
    }

    /// Mark `slice` attached or detached, for every servo on it. No-op for unused slices.
    pub fn set_slice_attached(&mut self, slice: SliceId, attached: bool) {
        if let Some(state) = self.slices.iter_mut().find(|state| state.slice == slice) {
            state.attached = attached;
        }
    }

    /// Number of managed servos.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no servo has been added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Managed servos in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &ServoEntry> {
        self.entries.iter()
    }

    fn slice_state(&self, slice: SliceId) -> Option<&SliceState> {
        self.slices.iter().find(|state| state.slice == slice)
    }
}

/// A reserved, still empty slot returned by [`Registry::allocate`].
#[derive(Debug)]
pub struct Vacant<'a> {
    registry: &'a mut Registry,
    pin: u8,
}

impl Vacant<'_> {
    /// GPIO the slot was reserved for.
    #[must_use]
    pub const fn pin(&self) -> u8 {
        self.pin
    }

    /// Whether another servo already uses `slice`.
    #[must_use]
    pub fn is_slice_in_use(&self, slice: SliceId) -> bool {
        self.registry.is_slice_in_use(slice)
    }

    /// Record the servo and mark its slice attached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapacityExhausted`] only if the registry filled up after
    /// allocation, which `&mut` borrowing rules out.
    pub fn insert(self, route: PwmRoute, wrap: u16, calibration: Calibration) -> Result<()> {
        let Self { registry, pin } = self;
        registry
            .entries
            .push(ServoEntry {
                pin,
                route,
                wrap,
                calibration,
            })
            .map_err(|_| Error::CapacityExhausted)?;

        if let Some(state) = registry
            .slices
            .iter_mut()
            .find(|state| state.slice == route.slice)
        {
            state.attached = true;
        } else {
            registry
                .slices
                .push(SliceState {
                    slice: route.slice,
                    attached: true,
                })
                .map_err(|_| Error::CapacityExhausted)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(pin: u8) -> PwmRoute {
        PwmRoute::rp2040(pin).expect("pin has PWM")
    }

    fn add(registry: &mut Registry, pin: u8) {
        registry
            .allocate(pin)
            .and_then(|vacant| vacant.insert(route(pin), 999, Calibration::default()))
            .expect("slot available");
    }

    #[test]
    fn dropped_vacancy_leaves_no_entry() {
        let mut registry = Registry::new();
        let vacant = registry.allocate(4).expect("empty registry has room");
        assert_eq!(vacant.pin(), 4);
        drop(vacant);
        assert!(registry.is_empty());
        assert_eq!(registry.lookup(4), None);
        assert_eq!(registry.is_attached(4), None);
    }

    #[test]
    fn capacity_is_checked_before_duplicates() {
        let mut registry = Registry::new();
        for pin in 0..8 {
            add(&mut registry, pin);
        }
        assert_eq!(registry.len(), MAX_SERVOS);
        assert_eq!(registry.allocate(0).err(), Some(Error::CapacityExhausted));
        assert_eq!(registry.allocate(20).err(), Some(Error::CapacityExhausted));
    }

    #[test]
    fn duplicate_pin_is_refused() {
        let mut registry = Registry::new();
        add(&mut registry, 6);
        assert_eq!(
            registry.allocate(6).err(),
            Some(Error::AlreadyInitialized { pin: 6 })
        );
    }

    #[test]
    fn slice_flag_is_shared_by_both_channels() {
        let mut registry = Registry::new();
        add(&mut registry, 2);
        add(&mut registry, 3);
        let slice = route(2).slice;

        registry.set_slice_attached(slice, false);
        assert_eq!(registry.is_attached(2), Some(false));
        assert_eq!(registry.is_attached(3), Some(false));

        registry.set_slice_attached(slice, true);
        assert_eq!(registry.is_attached(3), Some(true));
    }

    #[test]
    fn unused_slice_reports_detached() {
        let registry = Registry::new();
        assert!(!registry.is_slice_attached(SliceId::new(3)));
        assert!(!registry.is_slice_in_use(SliceId::new(3)));
    }
}
