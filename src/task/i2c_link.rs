//! I2C host link
//!
//! The board is an I2C slave at [`I2C_ADDRESS`]. Every byte the host writes is one command in
//! the extended encoding. A read returns one byte: the motor/error word or the photodiode bits,
//! whichever the last report selection asked for.

use actuator_controller::system::command::Encoding;
use actuator_controller::system::config::I2C_ADDRESS;
use actuator_controller::system::error::{Error, Result};
use actuator_controller::system::router::{CommandRouter, MotorPort};
use defmt::{info, warn};
use embassy_rp::i2c_slave::{self, I2cSlave};
use embassy_time::Instant;

use crate::task::photodiodes;
use crate::task::resources::{I2cLinkResources, Irqs};

fn handle_writes(router: &mut CommandRouter, port: &(dyn MotorPort + Sync), bytes: &[u8]) {
    let now = Instant::now();
    for &byte in bytes {
        router.handle(byte, port, now);
    }
}

/// Outcome of answering a read. Extra bytes clocked out by the host read as zero.
fn respond<E>(status: core::result::Result<i2c_slave::ReadStatus, E>) -> Result<()> {
    status.map(|_| ()).map_err(|_| Error::Bus)
}

#[embassy_executor::task]
pub async fn i2c_link(r: I2cLinkResources, port: &'static (dyn MotorPort + Sync)) {
    let mut config = i2c_slave::Config::default();
    config.addr = u16::from(I2C_ADDRESS);
    let mut device = I2cSlave::new(r.i2c, r.scl_pin, r.sda_pin, Irqs, config);
    let mut router = CommandRouter::new(Encoding::Extended);
    info!("I2C link listening at {=u8:#x}", I2C_ADDRESS);

    let mut buf = [0u8; 16];
    loop {
        let result = match device.listen(&mut buf).await {
            Ok(i2c_slave::Command::Write(len)) => {
                handle_writes(&mut router, port, &buf[..len]);
                Ok(())
            }
            Ok(i2c_slave::Command::WriteRead(len)) => {
                handle_writes(&mut router, port, &buf[..len]);
                let response = router.response(port, photodiodes::sensor_bits());
                respond(device.respond_and_fill(&[response], 0x00).await)
            }
            Ok(i2c_slave::Command::Read) => {
                let response = router.response(port, photodiodes::sensor_bits());
                respond(device.respond_and_fill(&[response], 0x00).await)
            }
            Ok(i2c_slave::Command::GeneralCall(_)) => Ok(()),
            Err(_) => Err(Error::Bus),
        };

        if let Err(e) = result {
            warn!("I2C link: {:?}", e);
        }
    }
}
