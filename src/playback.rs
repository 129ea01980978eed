use std::path::Path;

use log::info;

use irmagician_shared::{Result, Session, Transport, Waveform};

/// Load a waveform file into the device and play it.
pub fn command_send<T: Transport>(session: &mut Session<T>, path: &Path) -> Result<()> {
    let waveform = Waveform::load(path)?;
    info!("Sending {} ({} samples)", path.display(), waveform.len());

    session.load(&waveform)
}
