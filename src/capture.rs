use std::path::Path;

use log::info;

use irmagician_shared::{Result, Session, Transport};

pub fn command_capture<T: Transport>(session: &mut Session<T>) -> Result<()> {
    let count = session.capture()?;
    println!("Captured {} samples", count);
    Ok(())
}

/// Dump device memory into a waveform file.
pub fn command_save<T: Transport>(session: &mut Session<T>, path: &Path) -> Result<()> {
    let waveform = session.dump()?;
    waveform.save(path)?;

    info!("Saved {} samples to {}", waveform.len(), path.display());
    Ok(())
}
