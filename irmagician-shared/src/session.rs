use std::fmt;
use std::io;
use std::thread;
use std::time::Duration;

use crate::bank::{BankPager, PAGE_SIZE};
use crate::error::{Error, Result};
use crate::link::Transport;
use crate::protocol::{self, Command, Param, TERMINATOR};
use crate::waveform::{Waveform, DEFAULT_POSTSCALE};

/// Quiet periods the device needs after a command before it is ready again.
#[derive(Debug, Clone)]
pub struct Timing {
    pub command_delay: Duration,
    /// Time the device spends recording before a capture reply is ready
    pub capture_window: Duration,
    pub temperature_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            command_delay: Duration::from_millis(10),
            capture_window: Duration::from_millis(3000),
            temperature_delay: Duration::from_millis(100),
        }
    }
}

impl Timing {
    /// No delays at all, for simulated devices.
    pub fn immediate() -> Self {
        Timing {
            command_delay: Duration::from_millis(0),
            capture_window: Duration::from_millis(0),
            temperature_delay: Duration::from_millis(0),
        }
    }

    pub fn after(&self, cmd: &Command) -> Duration {
        match cmd {
            Command::Capture => self.capture_window,
            Command::Temperature => self.temperature_delay,
            _ => self.command_delay,
        }
    }
}

/// Where a dump takes the sample count and post-scaler from.
///
/// Older firmware cannot report what it holds, so the count has to come from
/// a capture done in the same session.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DumpStrategy {
    /// Count from the last successful capture, post-scaler [`DEFAULT_POSTSCALE`].
    CapturedCount,
    /// Ask the device for both.
    QueryDevice,
}

impl Default for DumpStrategy {
    fn default() -> Self {
        DumpStrategy::CapturedCount
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub dump: DumpStrategy,
    pub timing: Timing,
}

/// Sensor reading with the device's linear calibration applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    pub raw: i32,
    /// Degrees Celsius, rounded half up to one decimal
    pub celsius: f64,
}

impl Temperature {
    pub fn from_raw(raw: i32) -> Self {
        let celsius = ((5.0 / 1024.0 * f64::from(raw)) - 0.4) / (19.53 / 1000.0);

        Temperature {
            raw,
            celsius: (celsius * 10.0 + 0.5).floor() / 10.0,
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.celsius)
    }
}

/// An open conversation with one device.
///
/// The session owns the transport; dropping the session closes it. Every
/// operation takes `&mut self` since replies carry no request id and two
/// interleaved exchanges could not be told apart.
pub struct Session<T: Transport> {
    link: T,
    config: SessionConfig,
    /// Sample count of the last successful capture, 0 when there is none
    captured: usize,
}

impl<T: Transport> Session<T> {
    pub fn new(link: T, config: SessionConfig) -> Self {
        Session {
            link,
            config,
            captured: 0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn link(&self) -> &T {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut T {
        &mut self.link
    }

    /// Close the session, handing back the transport.
    pub fn into_link(self) -> T {
        self.link
    }

    /// Sample count recorded by the last successful capture.
    pub fn captured_count(&self) -> Option<usize> {
        Some(self.captured).filter(|&count| count > 0)
    }

    /// Record an incoming signal into device memory.
    ///
    /// Returns the number of samples captured. When the device answers with
    /// anything but a count, its text becomes the error and the session
    /// forgets any earlier capture.
    pub fn capture(&mut self) -> Result<usize> {
        log::info!("Capturing");

        self.captured = 0;
        let reply = self.request(Command::Capture)?;
        let count = protocol::decode_count(&reply)?;
        self.captured = count;

        log::info!("Captured {} samples", count);
        Ok(count)
    }

    /// Replay device memory.
    pub fn play(&mut self) -> Result<()> {
        log::info!("Playing");
        self.execute(Command::Play)
    }

    pub fn temperature(&mut self) -> Result<Temperature> {
        let reply = self.request(Command::Temperature)?;
        let temperature = Temperature::from_raw(protocol::decode_temperature(&reply)?);

        log::debug!("Temperature: {:?}", temperature);
        Ok(temperature)
    }

    /// Write `waveform` into device memory and play it.
    ///
    /// There is no rollback: an error midway leaves device memory partially
    /// overwritten.
    pub fn load(&mut self, waveform: &Waveform) -> Result<()> {
        log::info!(
            "Loading {} samples, postscale {}",
            waveform.len(),
            waveform.postscale
        );

        self.execute(Command::SetLength(waveform.len()))?;
        self.execute(Command::SetPostScaler(waveform.postscale))?;

        let mut pager = BankPager::new();
        for (index, &value) in waveform.data.iter().enumerate() {
            let (addr, select) = pager.address(index);
            if let Some(select) = select {
                self.execute(select)?;
            }
            self.execute(Command::WriteSample {
                offset: addr.offset,
                value,
            })?;
        }

        self.play()
    }

    /// Read the waveform held in device memory.
    ///
    /// Any failed sample read aborts the whole dump.
    pub fn dump(&mut self) -> Result<Waveform> {
        let (count, postscale) = match self.config.dump {
            DumpStrategy::CapturedCount => {
                let count = self
                    .captured_count()
                    .ok_or(Error::State("no capture recorded in this session"))?;
                (count, DEFAULT_POSTSCALE)
            }
            DumpStrategy::QueryDevice => {
                let count = self.query(Param::SampleCount)? as usize;
                (count, self.query(Param::PostScaler)?)
            }
        };

        log::info!("Dumping {} samples", count);

        let mut pager = BankPager::new();
        // The count comes from the device; don't trust it for the allocation
        let mut data = Vec::with_capacity(count.min(PAGE_SIZE * 16));
        for index in 0..count {
            let (addr, select) = pager.address(index);
            if let Some(select) = select {
                self.execute(select)?;
            }
            let reply = self.request(Command::DumpSample(addr.offset))?;
            data.push(protocol::decode_sample(&reply)?);
        }

        Ok(Waveform::raw(data, postscale))
    }

    /// Read a device parameter.
    pub fn query(&mut self, param: Param) -> Result<u32> {
        let reply = self.request(Command::QueryParam(param))?;
        protocol::decode_param(param, &reply)
    }

    /// Send `cmd`, reading and dropping its reply if it has one.
    fn execute(&mut self, cmd: Command) -> Result<()> {
        self.send(&cmd)?;
        if cmd.expects_reply() {
            self.read_reply()?;
        }
        Ok(())
    }

    fn request(&mut self, cmd: Command) -> Result<String> {
        self.send(&cmd)?;
        self.read_reply()
    }

    fn send(&mut self, cmd: &Command) -> Result<()> {
        let encoded = cmd.encode()?;
        log::debug!("-> {:?}", encoded.as_str());

        // Lines left over from an earlier multi-line reply are not ours
        self.link.clear_input()?;
        self.link.write_all(encoded.as_bytes())?;
        thread::sleep(self.config.timing.after(cmd));

        Ok(())
    }

    /// Read until a full line has arrived. Whatever follows the first line
    /// belongs to the same reply and is dropped, here or by the input clear
    /// before the next command.
    fn read_reply(&mut self) -> Result<String> {
        let mut recvbuf = [0; 128];
        let mut reply = Vec::new();

        while !contains_terminator(&reply) {
            let readlen = self.link.read(&mut recvbuf)?;
            if readlen == 0 {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
            }
            reply.extend_from_slice(&recvbuf[..readlen]);
        }

        let reply = String::from_utf8_lossy(&reply).into_owned();
        log::debug!("<- {:?}", reply);

        Ok(reply)
    }
}

fn contains_terminator(buf: &[u8]) -> bool {
    buf.windows(TERMINATOR.len())
        .any(|w| w == TERMINATOR.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_baseline() {
        let t = Temperature::from_raw(0);
        assert_eq!(t.celsius, -20.5);
        assert_eq!(t.to_string(), "-20.5°C");
    }

    #[test]
    fn temperature_conversion() {
        assert_eq!(Temperature::from_raw(200).celsius, 29.5);
        assert_eq!(Temperature::from_raw(100).celsius, 4.5);
        assert_eq!(Temperature::from_raw(100).raw, 100);
    }

    #[test]
    fn timing_per_command() {
        let timing = Timing::default();
        assert_eq!(timing.after(&Command::Capture), Duration::from_millis(3000));
        assert_eq!(timing.after(&Command::Temperature), Duration::from_millis(100));
        assert_eq!(timing.after(&Command::Play), Duration::from_millis(10));
        assert_eq!(Timing::immediate().after(&Command::Capture), Duration::from_millis(0));
    }

    #[test]
    fn terminator_detection() {
        assert!(contains_terminator(b"12\r\n"));
        assert!(!contains_terminator(b"12\r"));
        assert!(!contains_terminator(b""));
    }
}
