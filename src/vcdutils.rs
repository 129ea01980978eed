use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;
use vcd::{self, SimulationCommand, TimescaleUnit, Value};

use irmagician_shared::{Result, Waveform};

/// Writes waveforms as a single `ir` wire. Samples are durations between
/// edges, the line starts low.
///
/// One timestamp step is one device sample unit, written as 1 us. The real
/// duration of a unit depends on the post-scaler the waveform was captured
/// with, which the trace does not apply.
pub struct VcdWriter<W: Write> {
    vcd: vcd::Writer<W>,
    wire_id: vcd::IdCode,
}

impl<W: Write> VcdWriter<W> {
    pub fn new(w: W) -> Self {
        VcdWriter {
            vcd: vcd::Writer::new(w),
            wire_id: vcd::IdCode::FIRST,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        let writer = &mut self.vcd;

        writer.timescale(1, TimescaleUnit::US)?;
        writer.add_module("top")?;

        let id = writer.add_wire(1, "ir")?;
        self.wire_id = id;

        writer.upscope()?;
        writer.enddefinitions()?;

        writer.begin(SimulationCommand::Dumpvars)?;
        writer.change_scalar(id, Value::V0)?;
        writer.end()?;

        Ok(())
    }

    pub fn write_slice<T: Copy + Into<u64>>(&mut self, v: &[T]) -> io::Result<()> {
        let edges: Vec<u64> = v
            .iter()
            .map(|v| (*v).into())
            .scan(0, |state, delta: u64| {
                *state += delta;
                Some(*state)
            })
            .collect();

        let mut level = true;
        for ts in edges {
            self.write_value(ts, level)?;
            level = !level;
        }

        Ok(())
    }

    fn write_value(&mut self, ts: u64, high: bool) -> io::Result<()> {
        self.vcd.timestamp(ts)?;
        let value = if high { Value::V1 } else { Value::V0 };
        self.vcd.change_scalar(self.wire_id, value)
    }
}

pub fn write_waveform<W: Write>(waveform: &Waveform, w: W) -> io::Result<()> {
    let mut vcd = VcdWriter::new(w);
    vcd.init()?;
    vcd.write_slice(&waveform.data)
}

/// Convert the waveform file at `path` into a vcd trace at `out`.
pub fn export(path: &Path, out: &Path) -> Result<()> {
    let waveform = Waveform::load(path)?;

    let mut file = BufWriter::new(File::create(out)?);
    write_waveform(&waveform, &mut file)?;
    file.flush()?;

    info!("Wrote {} samples to {}", waveform.len(), out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(data: Vec<u8>) -> String {
        render_waveform(&Waveform::raw(data, 100))
    }

    fn render_waveform(waveform: &Waveform) -> String {
        let mut out = Vec::new();
        write_waveform(waveform, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn header_declares_ir_wire() {
        let text = render(vec![3]);
        assert!(text.contains("$timescale") && text.contains("1 us"));
        assert!(text.contains(" ir "));
        assert!(text.contains("$enddefinitions"));
    }

    #[test]
    fn samples_become_edges() {
        let text = render(vec![3, 5, 2]);
        let stamps: Vec<&str> = text.lines().filter(|l| l.starts_with('#')).collect();
        assert_eq!(stamps, vec!["#3", "#8", "#10"]);
    }

    #[test]
    fn timescale_is_independent_of_carrier() {
        let mut waveform = Waveform::raw(vec![4], 100);
        waveform.freq = 40;
        let text = render_waveform(&waveform);
        assert!(text.contains("$timescale") && text.contains("1 us"));
        assert!(text.lines().any(|l| l == "#4"));
    }
}
