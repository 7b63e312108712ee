#![no_std]
#![no_main]
#![cfg(not(feature = "host"))]

use core::{convert::Infallible, panic};
use embassy_executor::Spawner;
use embassy_time::Timer;
use servo_bank::{Result, ServoBank, hardware::RpPwm};
use {defmt::info, defmt_rtt as _, panic_probe as _};

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let _p = embassy_rp::init(Default::default());
    let mut servo_bank = ServoBank::new(RpPwm::new());

    // GPIO 11 → slice 5 channel B, GPIO 12 → slice 6 channel A
    servo_bank.init_default(11)?;
    servo_bank.init(12, 500, 2_500)?;

    loop {
        info!("Sweeping");
        // Loop by 10 degrees. Include 180 degrees.
        for degrees in (0..=180).step_by(10) {
            servo_bank.set_degrees(11, degrees)?;
            servo_bank.set_degrees(12, 180 - degrees)?;
            Timer::after_millis(100).await;
        }

        info!("Relaxing");
        servo_bank.detach(11)?;
        servo_bank.detach(12)?;
        Timer::after_secs(2).await;

        // set_degrees re-attaches
        servo_bank.set_degrees(11, 90)?;
        servo_bank.attach(12)?;
        Timer::after_secs(1).await;
    }
}
