use std::io;
use std::time::Duration;

/// Byte channel to the device. Knows nothing about the protocol.
pub trait Transport {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read whatever is available, returning the number of bytes read.
    /// Returns `TimedOut` when nothing arrives within the configured timeout.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Drop received bytes nobody has read yet.
    fn clear_input(&mut self) -> io::Result<()>;
}

/// Serial port settings.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub baud_rate: u32,
    /// Read timeout. Without it a silent device blocks a read forever.
    pub timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            baud_rate: 9600,
            timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(feature = "serial")]
pub use serial::SerialLink;

#[cfg(feature = "serial")]
mod serial {
    use std::io::{self, Read, Write};
    use std::path::Path;

    use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};

    use super::{LinkConfig, Transport};

    /// Serial connection to the device. The port is closed when dropped.
    pub struct SerialLink {
        port: Box<dyn SerialPort>,
    }

    impl SerialLink {
        pub fn connect<P: AsRef<Path>>(path: P, config: &LinkConfig) -> io::Result<Self> {
            let path = path.as_ref().to_string_lossy().into_owned();
            let port = serialport::new(path.as_str(), config.baud_rate)
                .data_bits(DataBits::Eight)
                .parity(Parity::None)
                .stop_bits(StopBits::One)
                .flow_control(FlowControl::None)
                .timeout(config.timeout)
                .open()?;

            log::info!("Opened {} at {} baud", path, config.baud_rate);

            Ok(SerialLink { port })
        }
    }

    impl Transport for SerialLink {
        fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
            self.port.write_all(data)?;
            self.port.flush()
        }

        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.port.read(buf)
        }

        fn clear_input(&mut self) -> io::Result<()> {
            self.port.clear(ClearBuffer::Input)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_link_settings() {
        let config = LinkConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert!(config.timeout > Duration::from_millis(3000));
    }
}
