//! Photodiode sampling
//!
//! Samples the photodiodes on the ADC and publishes one bit per sensor, first sensor in the
//! most significant bit. A sensor is active when its raw sample is on the configured side of
//! the threshold.

use core::sync::atomic::{AtomicU8, Ordering};

use actuator_controller::system::config::{
    PHOTODIODE_COUNT, PHOTODIODE_INTERVAL, PHOTODIODE_POLARITY, PHOTODIODE_THRESHOLD,
};
use actuator_controller::system::error::{Error, Result};
use actuator_controller::system::status::pack_sensor_bits;
use defmt::warn;
use embassy_rp::adc::{Adc, Async, Channel, Config as AdcConfig};
use embassy_rp::gpio::Pull;
use embassy_time::Ticker;

use crate::task::resources::{Irqs, PhotodiodeResources};

/// Latest packed sensor bits
static SENSOR_BITS: AtomicU8 = AtomicU8::new(0);

/// Latest packed sensor bits
pub fn sensor_bits() -> u8 {
    SENSOR_BITS.load(Ordering::Relaxed)
}

async fn sample_all(
    adc: &mut Adc<'static, Async>,
    channels: &mut [Channel<'static>; PHOTODIODE_COUNT],
) -> Result<u8> {
    let mut active = [false; PHOTODIODE_COUNT];
    for (channel, on) in channels.iter_mut().zip(active.iter_mut()) {
        let sample = adc.read(channel).await.map_err(|_| Error::Adc)?;
        *on = PHOTODIODE_POLARITY.is_active(sample, PHOTODIODE_THRESHOLD);
    }
    Ok(pack_sensor_bits(active))
}

#[embassy_executor::task]
pub async fn photodiodes(r: PhotodiodeResources) {
    let mut adc = Adc::new(r.adc, Irqs, AdcConfig::default());
    let mut channels = [
        Channel::new_pin(r.sensor0_pin, Pull::None),
        Channel::new_pin(r.sensor1_pin, Pull::None),
        Channel::new_pin(r.sensor2_pin, Pull::None),
    ];

    let mut ticker = Ticker::every(PHOTODIODE_INTERVAL);
    loop {
        match sample_all(&mut adc, &mut channels).await {
            Ok(bits) => SENSOR_BITS.store(bits, Ordering::Relaxed),
            // Keep the last good bits
            Err(e) => warn!("Photodiodes: {:?}", e),
        }
        ticker.next().await;
    }
}
