#![allow(missing_docs, reason = "integration tests")]
//! Host-level tests for the servo bank state machine.

use servo_bank::hardware::{Channel, HostPwm, PwmRoute, SliceId};
use servo_bank::pwm_math::angle_to_level;
use servo_bank::{Calibration, Error, MAX_SERVOS, SERVO_PWM_FREQ_HZ, ServoBank};

const CLK_SYS_HZ: u32 = 125_000_000;

fn new_bank() -> ServoBank<HostPwm> {
    ServoBank::new(HostPwm::rp2040(CLK_SYS_HZ))
}

fn level_for(servo_bank: &ServoBank<HostPwm>, pin: u8, degrees: u16) -> u16 {
    let entry = servo_bank.entry(pin).expect("servo present");
    angle_to_level(degrees, entry.calibration(), entry.wrap(), SERVO_PWM_FREQ_HZ)
}

#[test]
fn init_starts_slice_at_zero_degrees() {
    let mut servo_bank = new_bank();
    servo_bank.init(2, 1_000, 2_000).expect("init");

    let entry = *servo_bank.entry(2).expect("servo present");
    assert_eq!(entry.slice(), SliceId::new(1));
    assert_eq!(entry.channel(), Channel::A);
    assert_eq!(entry.wrap(), u16::MAX);
    assert_eq!(entry.calibration(), Calibration::new(1_000, 2_000).expect("valid"));

    let hardware = servo_bank.hardware();
    assert!(hardware.is_pwm_function(2));
    assert!(hardware.is_pin_driven(2));
    let record = hardware.slice(SliceId::new(1)).expect("slice written");
    assert_eq!(record.configure_count, 1);
    assert_eq!(record.parameters.map(|parameters| parameters.wrap()), Some(u16::MAX));
    assert_eq!(hardware.level(2), Some(3_277));
    assert_eq!(servo_bank.is_attached(2), Some(true));
}

#[test]
fn scenario_set_detach_set_reinit() {
    let mut servo_bank = new_bank();
    assert!(servo_bank.init(2, 1_000, 2_000).is_ok());

    assert!(servo_bank.set_degrees(2, 90).is_ok());
    let low = level_for(&servo_bank, 2, 0);
    let high = level_for(&servo_bank, 2, 180);
    let mid = servo_bank.hardware().level(2).expect("level written");
    assert!(mid.abs_diff((low + high) / 2) <= 1);

    assert!(servo_bank.detach(2).is_ok());
    assert!(!servo_bank.hardware().is_pin_driven(2));

    assert!(servo_bank.set_degrees(2, 45).is_ok());
    assert_eq!(servo_bank.is_attached(2), Some(true));
    assert!(servo_bank.hardware().is_pin_driven(2));
    assert_eq!(servo_bank.hardware().level(2), Some(level_for(&servo_bank, 2, 45)));

    assert_eq!(
        servo_bank.init(2, 1_000, 2_000),
        Err(Error::AlreadyInitialized { pin: 2 })
    );
}

#[test]
fn endpoints_follow_calibration() {
    let mut servo_bank = new_bank();
    servo_bank.init(6, 500, 2_500).expect("init");
    let calibration = Calibration::new(500, 2_500).expect("valid");

    servo_bank.set_degrees(6, 0).expect("set");
    assert_eq!(
        servo_bank.hardware().level(6),
        Some(angle_to_level(0, calibration, u16::MAX, 50))
    );
    servo_bank.set_degrees(6, 180).expect("set");
    assert_eq!(servo_bank.hardware().level(6), Some(8_192));
}

#[test]
fn init_default_uses_default_pulse_widths() {
    let mut servo_bank = new_bank();
    servo_bank.init_default(9).expect("init");
    assert_eq!(
        servo_bank.entry(9).map(|entry| entry.calibration()),
        Some(Calibration::default())
    );
    assert_eq!(
        servo_bank.entry(9).map(|entry| entry.route()),
        PwmRoute::rp2040(9)
    );
}

#[test]
fn ninth_servo_is_refused() {
    let mut servo_bank = new_bank();
    for pin in 0..8 {
        servo_bank.init_default(pin).expect("room for eight");
    }
    assert_eq!(servo_bank.len(), MAX_SERVOS);
    assert_eq!(servo_bank.init_default(20), Err(Error::CapacityExhausted));
    assert_eq!(servo_bank.entry(20), None);
    assert!(!servo_bank.hardware().is_pwm_function(20));
}

#[test]
fn invalid_calibration_leaves_nothing_behind() {
    let mut servo_bank = new_bank();
    for (min_us, max_us) in [(0, 2_000), (1_000, 0), (2_000, 1_000), (1_500, 1_500)] {
        assert_eq!(
            servo_bank.init(4, min_us, max_us),
            Err(Error::InvalidCalibration { min_us, max_us })
        );
    }
    assert!(servo_bank.is_empty());
    assert!(servo_bank.hardware().slice(SliceId::new(2)).is_none());
    assert!(servo_bank.init_default(4).is_ok());
}

#[test]
fn pin_without_pwm_is_refused() {
    let mut servo_bank = new_bank();
    assert_eq!(servo_bank.init_default(30), Err(Error::InvalidPin { pin: 30 }));
    assert!(servo_bank.is_empty());
}

#[test]
fn clock_problems_leave_nothing_behind() {
    let mut servo_bank = ServoBank::new(HostPwm::rp2040(0));
    assert_eq!(servo_bank.init_default(2), Err(Error::ClockNotConfigured));
    assert!(servo_bank.is_empty());
    assert!(!servo_bank.hardware().is_pwm_function(2));

    // 50 Hz needs a divider above 255.9375 at 1 GHz.
    servo_bank.hardware_mut().set_clk_sys_hz(1_000_000_000);
    assert_eq!(
        servo_bank.init_default(2),
        Err(Error::FrequencyUnachievable {
            target_hz: 50,
            clk_sys_hz: 1_000_000_000
        })
    );
    assert!(servo_bank.is_empty());

    servo_bank.hardware_mut().set_clk_sys_hz(CLK_SYS_HZ);
    assert!(servo_bank.init_default(2).is_ok());
}

#[test]
fn unknown_pin_is_reported_everywhere() {
    let mut servo_bank = new_bank();
    servo_bank.init_default(2).expect("init");
    assert_eq!(servo_bank.set_degrees(3, 90), Err(Error::UnknownPin { pin: 3 }));
    assert_eq!(servo_bank.detach(3), Err(Error::UnknownPin { pin: 3 }));
    assert_eq!(servo_bank.attach(3), Err(Error::UnknownPin { pin: 3 }));
    assert_eq!(servo_bank.is_attached(3), None);
}

#[test]
fn repeated_detach_and_attach_never_fail() {
    let mut servo_bank = new_bank();
    servo_bank.init_default(14).expect("init");
    let slice = SliceId::new(7);
    let writes = |servo_bank: &ServoBank<HostPwm>| {
        servo_bank
            .hardware()
            .slice(slice)
            .map_or(0, |record| record.enable_writes)
    };

    let after_init = writes(&servo_bank);
    assert!(servo_bank.attach(14).is_ok());
    assert_eq!(writes(&servo_bank), after_init);

    assert!(servo_bank.detach(14).is_ok());
    assert!(servo_bank.detach(14).is_ok());
    assert_eq!(writes(&servo_bank), after_init + 1);
    assert_eq!(servo_bank.is_attached(14), Some(false));

    assert!(servo_bank.attach(14).is_ok());
    assert!(servo_bank.attach(14).is_ok());
    assert_eq!(writes(&servo_bank), after_init + 2);

    assert!(servo_bank.detach(14).is_ok());
    assert_eq!(servo_bank.is_attached(14), Some(false));
}

#[test]
fn attach_restores_last_level_without_rewriting() {
    let mut servo_bank = new_bank();
    servo_bank.init_default(10).expect("init");
    servo_bank.set_degrees(10, 120).expect("set");
    let level = servo_bank.hardware().level(10);

    servo_bank.detach(10).expect("detach");
    servo_bank.attach(10).expect("attach");
    assert_eq!(servo_bank.hardware().level(10), level);
    assert!(servo_bank.hardware().is_pin_driven(10));
}

#[test]
fn rp2350_routes_upper_bank_pins() {
    let mut servo_bank = ServoBank::new(HostPwm::rp2350(150_000_000));
    servo_bank.init_default(40).expect("GPIO 40 has PWM on RP2350");
    assert_eq!(servo_bank.entry(40).map(|entry| entry.slice()), Some(SliceId::new(8)));
    assert!(servo_bank.hardware().is_pin_driven(40));
    assert_eq!(servo_bank.init_default(48), Err(Error::InvalidPin { pin: 48 }));
}

#[test]
fn registry_lists_servos_in_insertion_order() {
    let mut servo_bank = new_bank();
    for pin in [9, 2, 14] {
        servo_bank.init_default(pin).expect("init");
    }
    let pins: Vec<u8> = servo_bank.registry().iter().map(|entry| entry.pin()).collect();
    assert_eq!(pins, [9, 2, 14]);
    assert_eq!(servo_bank.registry().len(), 3);
}

#[test]
fn hardware_outlives_the_bank() {
    let mut servo_bank = new_bank();
    servo_bank.init_default(5).expect("init");
    servo_bank.set_degrees(5, 180).expect("set");

    let hardware = servo_bank.into_hardware();
    assert_eq!(hardware.level(5), Some(6_554));
    assert!(hardware.is_pin_driven(5));
}
