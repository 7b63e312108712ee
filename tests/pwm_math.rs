#![allow(missing_docs, reason = "integration tests")]
//! Host-level tests for divider/wrap derivation and angle-to-level mapping.

use servo_bank::pwm_math::{angle_to_level, compute_pwm_parameters};
use servo_bank::{Calibration, Error, SERVO_PWM_FREQ_HZ};

#[test]
fn pico1_default_clock_gives_full_range_wrap() {
    let parameters =
        compute_pwm_parameters(SERVO_PWM_FREQ_HZ, 125_000_000).expect("125 MHz reaches 50 Hz");
    assert_eq!(parameters.divider_int(), 38);
    assert_eq!(parameters.divider_frac(), 2);
    assert_eq!(parameters.wrap(), u16::MAX);
}

#[test]
fn pico2_default_clock_gives_full_range_wrap() {
    let parameters =
        compute_pwm_parameters(SERVO_PWM_FREQ_HZ, 150_000_000).expect("150 MHz reaches 50 Hz");
    assert_eq!(parameters.divider_int(), 45);
    assert_eq!(parameters.divider_frac(), 12);
    assert_eq!(parameters.wrap(), u16::MAX);
}

#[test]
fn divider_parts_stay_in_hardware_range() {
    for clk_sys_hz in [
        1_000_000,
        12_000_000,
        48_000_000,
        125_000_000,
        133_000_000,
        150_000_000,
        200_000_000,
    ] {
        let parameters = compute_pwm_parameters(SERVO_PWM_FREQ_HZ, clk_sys_hz)
            .expect("common clocks reach 50 Hz");
        assert!((1..=255).contains(&parameters.divider_int()));
        assert!(parameters.divider_frac() <= 15);
        assert!(parameters.wrap() > 0);
    }
}

#[test]
fn exact_divider_keeps_exact_period() {
    // 50 Hz * 65536 * 16 -> divider exactly 16.0, wrap 65535.
    let parameters = compute_pwm_parameters(50, 52_428_800).expect("exact divider");
    assert_eq!((parameters.divider_int(), parameters.divider_frac()), (16, 0));
    assert_eq!(parameters.wrap(), 65_535);
}

#[test]
fn zero_clock_is_reported() {
    assert_eq!(
        compute_pwm_parameters(SERVO_PWM_FREQ_HZ, 0),
        Err(Error::ClockNotConfigured)
    );
}

#[test]
fn too_low_frequency_is_unachievable() {
    // Needs a divider of ~1907.
    assert_eq!(
        compute_pwm_parameters(1, 125_000_000),
        Err(Error::FrequencyUnachievable {
            target_hz: 1,
            clk_sys_hz: 125_000_000
        })
    );
}

#[test]
fn divider_just_above_ceiling_is_unachievable() {
    // 255.9375 * 65536 * 50 Hz is the fastest clock that still works.
    let ceiling_hz = 4_095 * 4_096 * 50;
    assert!(compute_pwm_parameters(50, ceiling_hz).is_ok());
    assert!(matches!(
        compute_pwm_parameters(50, ceiling_hz + 1),
        Err(Error::FrequencyUnachievable { .. })
    ));
}

#[test]
fn endpoints_match_calibration() {
    let parameters = compute_pwm_parameters(SERVO_PWM_FREQ_HZ, 125_000_000).expect("parameters");
    let ticks = u32::from(parameters.wrap()) + 1;
    for (min_us, max_us) in [(1_000, 2_000), (500, 2_500), (544, 2_400), (1, 2)] {
        let calibration = Calibration::new(min_us, max_us).expect("valid calibration");
        let at_min = angle_to_level(0, calibration, parameters.wrap(), SERVO_PWM_FREQ_HZ);
        let at_max = angle_to_level(180, calibration, parameters.wrap(), SERVO_PWM_FREQ_HZ);

        // Back to microseconds: level * 20_000 / ticks, within one tick.
        let tick_us = 20_000 / ticks + 1;
        let us = |level: u16| u32::from(level) * 20_000 / ticks;
        assert!(us(at_min).abs_diff(u32::from(min_us)) <= tick_us);
        assert!(us(at_max).abs_diff(u32::from(max_us)) <= tick_us);
    }
}

#[test]
fn level_is_monotonic_in_angle() {
    let calibration = Calibration::new(544, 2_400).expect("valid calibration");
    let mut previous = 0;
    for degrees in 0..=200 {
        let level = angle_to_level(degrees, calibration, u16::MAX, SERVO_PWM_FREQ_HZ);
        assert!(level >= previous, "level dropped at {degrees} degrees");
        previous = level;
    }
}

#[test]
fn angles_past_180_saturate() {
    let calibration = Calibration::default();
    let at_180 = angle_to_level(180, calibration, u16::MAX, SERVO_PWM_FREQ_HZ);
    assert_eq!(angle_to_level(181, calibration, u16::MAX, SERVO_PWM_FREQ_HZ), at_180);
    assert_eq!(angle_to_level(u16::MAX, calibration, u16::MAX, SERVO_PWM_FREQ_HZ), at_180);
}

#[test]
fn default_calibration_levels_at_125_mhz() {
    let calibration = Calibration::default();
    assert_eq!(angle_to_level(0, calibration, u16::MAX, 50), 3_277);
    assert_eq!(angle_to_level(90, calibration, u16::MAX, 50), 4_915);
    assert_eq!(angle_to_level(180, calibration, u16::MAX, 50), 6_554);
}

#[test]
fn invalid_calibrations_are_rejected() {
    for (min_us, max_us) in [(0, 2_000), (1_000, 0), (2_000, 1_000), (1_500, 1_500)] {
        assert_eq!(
            Calibration::new(min_us, max_us),
            Err(Error::InvalidCalibration { min_us, max_us })
        );
    }
}
