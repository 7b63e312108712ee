#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};
use embassy_executor::Spawner;
use embassy_time::Timer;
use servo_bank::{Result, SharedServoBank, hardware::RpPwm};
use {defmt::info, defmt_rtt as _, panic_probe as _};

// Both servos sit on PWM slice 7 (GPIO 14 = A, GPIO 15 = B).
static SERVOS: SharedServoBank<RpPwm> = SharedServoBank::new(RpPwm::new());

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let _p = embassy_rp::init(Default::default());

    SERVOS.init_default(14)?;
    SERVOS.init_default(15)?;

    loop {
        SERVOS.set_degrees(14, 45)?;
        SERVOS.set_degrees(15, 135)?;
        Timer::after_secs(1).await;

        // Detaching GPIO 14 also lets GPIO 15 go limp.
        SERVOS.detach(14)?;
        let sibling_attached = SERVOS.lock(|servo_bank| servo_bank.is_attached(15));
        info!("GPIO 15 attached after detaching GPIO 14: {}", sibling_attached);
        Timer::after_secs(2).await;

        // Re-attaching through the sibling brings both back at their last angles.
        SERVOS.attach(15)?;
        Timer::after_secs(1).await;
    }
}
