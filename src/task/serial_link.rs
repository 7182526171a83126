//! Serial host link
//!
//! The host sends each command byte as a decimal line, tagged in bits 5..2. Independently of
//! commands, a combined status line (limits, motors, photodiodes) goes out every
//! [`STATUS_PUSH_INTERVAL`].

use actuator_controller::system::command::Encoding;
use actuator_controller::system::config::{SERIAL_BAUD, STATUS_PUSH_INTERVAL};
use actuator_controller::system::error::{Error, Result};
use actuator_controller::system::router::{CommandRouter, MotorPort};
use actuator_controller::system::serial_line::LineParser;
use actuator_controller::system::status::StatusLine;
use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_rp::uart::{self, BufferedUart};
use embassy_time::{Instant, Ticker};
use embedded_io_async::{Read, Write};

use crate::task::photodiodes;
use crate::task::resources::{Irqs, SerialLinkResources};

async fn push_status<W: Write>(tx: &mut W, port: &(dyn MotorPort + Sync)) -> Result<()> {
    let line = StatusLine::new(&port.snapshot(), photodiodes::sensor_bits()).render();
    tx.write_all(line.as_bytes()).await.map_err(|_| Error::Uart)
}

#[embassy_executor::task]
pub async fn serial_link(r: SerialLinkResources, port: &'static (dyn MotorPort + Sync)) {
    let mut config = uart::Config::default();
    config.baudrate = SERIAL_BAUD;

    let mut tx_buf = [0u8; 64];
    let mut rx_buf = [0u8; 64];
    let mut uart = BufferedUart::new(
        r.uart,
        Irqs,
        r.tx_pin,
        r.rx_pin,
        &mut tx_buf,
        &mut rx_buf,
        config,
    );
    info!("Serial link at {} baud", SERIAL_BAUD);

    let mut parser = LineParser::new();
    let mut router = CommandRouter::new(Encoding::Tagged);
    let mut ticker = Ticker::every(STATUS_PUSH_INTERVAL);
    let mut chunk = [0u8; 16];

    loop {
        let result = match select(uart.read(&mut chunk), ticker.next()).await {
            Either::First(Ok(len)) => {
                let now = Instant::now();
                for value in chunk[..len].iter().filter_map(|&b| parser.push(b)) {
                    router.handle(value, port, now);
                }
                Ok(())
            }
            Either::First(Err(_)) => Err(Error::Uart),
            Either::Second(_) => push_status(&mut uart, port).await,
        };

        if let Err(e) = result {
            warn!("Serial link: {:?}", e);
        }
    }
}
