//! irMagician text protocol.
//!
//! Commands are a single ASCII letter, optionally followed by comma separated
//! decimal arguments, and terminated by `\r\n`:
//!
//! ```text
//! w,12,31\r\n
//! ```
//!
//! Replies are `\r\n` terminated text lines. Only the first line matters.
//! The device never marks a reply as an error: a capture that found no
//! signal answers with plain text where the sample count would be. Every
//! decoder therefore parses the expected shape and, when that fails, hands
//! back the cleaned reply text as [`Error::Protocol`].

use core::fmt::Write;
use std::io;

use crate::error::{Error, Result};

/// Line terminator used in both directions.
pub const TERMINATOR: &str = "\r\n";

/// Upper bound of an encoded command, terminator included.
pub const MAX_COMMAND_LEN: usize = 32;

/// Status marker the device may put in front of a reply.
pub const STATUS_MARKER: &str = "...";

/// One sample of device waveform memory.
pub type Sample = u8;

/// An encoded command, ready to be written to the link.
pub type Encoded = heapless::String<MAX_COMMAND_LEN>;

/// Device parameter readable with [`Command::QueryParam`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Param {
    /// Number of samples held in waveform memory, replied in hex.
    SampleCount = 1,
    /// Post-scaler of the held waveform, replied in decimal.
    PostScaler = 6,
}

impl Param {
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Radix the device uses when replying with this parameter.
    pub fn radix(self) -> u32 {
        match self {
            Param::SampleCount => 16,
            Param::PostScaler => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Command {
    /// Select the memory bank subsequent sample commands address
    BankSelect(usize),
    /// Record an incoming signal
    Capture,
    /// Replay waveform memory
    Play,
    /// Read the temperature sensor
    Temperature,
    /// Number of samples to replay
    SetLength(usize),
    SetPostScaler(u32),
    /// Write one sample into the selected bank
    WriteSample { offset: usize, value: Sample },
    /// Read one sample from the selected bank
    DumpSample(usize),
    QueryParam(Param),
}

impl Command {
    /// Encode the command, terminator included.
    pub fn encode(&self) -> Result<Encoded> {
        let mut buf = Encoded::new();

        let res = match *self {
            Command::BankSelect(bank) => write!(buf, "b,{}", bank),
            Command::Capture => buf.write_str("c"),
            Command::Play => buf.write_str("p"),
            Command::Temperature => buf.write_str("t"),
            Command::SetLength(count) => write!(buf, "n,{}", count),
            Command::SetPostScaler(value) => write!(buf, "k,{}", value),
            Command::WriteSample { offset, value } => write!(buf, "w,{},{}", offset, value),
            Command::DumpSample(offset) => write!(buf, "d,{}", offset),
            Command::QueryParam(param) => write!(buf, "I,{}", param.id()),
        };

        res.and_then(|_| buf.write_str(TERMINATOR)).map_err(|_| {
            Error::Transport(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{:?} does not fit in {} bytes", self, MAX_COMMAND_LEN),
            ))
        })?;

        Ok(buf)
    }

    /// Whether the device answers this command at all.
    ///
    /// Bank selection and sample writes are silent; reading after them would
    /// block until the link times out.
    pub fn expects_reply(&self) -> bool {
        !matches!(self, Command::BankSelect(_) | Command::WriteSample { .. })
    }
}

/// First line of a raw reply, without its terminator.
pub fn first_line(raw: &str) -> &str {
    raw.split(TERMINATOR)
        .next()
        .unwrap_or_default()
        .trim_end_matches(&['\r', '\n'][..])
}

/// First line with surrounding whitespace and a leading status marker removed.
pub fn clean(raw: &str) -> &str {
    let line = first_line(raw).trim();
    line.strip_prefix(STATUS_MARKER)
        .map(str::trim_start)
        .unwrap_or(line)
}

fn first_token(cleaned: &str) -> &str {
    cleaned.split_whitespace().next().unwrap_or_default()
}

fn protocol_error(cleaned: &str) -> Error {
    Error::Protocol(cleaned.to_string())
}

/// Decode a capture reply into the number of recorded samples.
pub fn decode_count(raw: &str) -> Result<usize> {
    let cleaned = clean(raw);
    first_token(cleaned)
        .parse()
        .map_err(|_| protocol_error(cleaned))
}

/// Decode a temperature reply into the raw sensor value.
pub fn decode_temperature(raw: &str) -> Result<i32> {
    let cleaned = clean(raw);
    cleaned.parse().map_err(|_| protocol_error(cleaned))
}

/// Decode a dump reply: a hex sample, possibly followed by trailing text.
pub fn decode_sample(raw: &str) -> Result<Sample> {
    let cleaned = clean(raw);
    let token = first_token(cleaned);

    let sample = Sample::from_str_radix(token, 16).map_err(|_| protocol_error(cleaned))?;
    if token.len() != cleaned.len() {
        log::warn!("Ignoring text after sample: {:?}", &cleaned[token.len()..]);
    }

    Ok(sample)
}

/// Decode a parameter reply using the radix the device uses for `param`.
pub fn decode_param(param: Param, raw: &str) -> Result<u32> {
    let cleaned = clean(raw);
    u32::from_str_radix(first_token(cleaned), param.radix()).map_err(|_| protocol_error(cleaned))
}
