use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::protocol::Sample;

/// Carrier frequency, in kHz, of everything the device captures.
pub const DEFAULT_FREQ: u32 = 38;

/// Post-scaler assumed when the device is not asked for its own.
pub const DEFAULT_POSTSCALE: u32 = 100;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Raw,
}

/// A waveform as held in device memory, plus what the device needs to replay it.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
pub struct Waveform {
    pub data: Vec<Sample>,
    pub format: Format,
    /// Carrier frequency in kHz
    #[serde(default = "default_freq")]
    pub freq: u32,
    pub postscale: u32,
}

fn default_freq() -> u32 {
    DEFAULT_FREQ
}

/// Failures of the underlying reader or writer are I/O errors, not bad content.
fn classify(e: serde_json::Error) -> Error {
    if e.is_io() {
        Error::Transport(e.into())
    } else {
        Error::Format(e)
    }
}

impl Waveform {
    pub fn raw(data: Vec<Sample>, postscale: u32) -> Self {
        Waveform {
            data,
            format: Format::Raw,
            freq: DEFAULT_FREQ,
            postscale,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self).map_err(classify)
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(classify)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
