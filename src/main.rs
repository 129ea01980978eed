use std::path::PathBuf;

use structopt::StructOpt;

use irmagician_shared::{
    DumpStrategy, LinkConfig, Result, SerialLink, Session, SessionConfig, Timing,
};

mod capture;
mod playback;
mod vcdutils;

#[derive(Debug, StructOpt)]
#[structopt(name = "irmagician", about = "irMagician infrared transceiver tool")]
struct Opt {
    /// Serial Device. Defaults to /dev/ttyACM0
    #[structopt(long = "device", parse(from_os_str))]
    serial: Option<PathBuf>,
    #[structopt(short, long)]
    debug: bool,
    /// Ask the device for sample count and postscale when saving,
    /// instead of relying on a capture in the same run
    #[structopt(long)]
    query_device: bool,
    #[structopt(subcommand)]
    cmd: CliCommand,
}

#[derive(StructOpt, Debug)]
enum CliCommand {
    /// Read the temperature sensor
    Temp,
    /// Capture a signal into device memory
    Capture,
    /// Play device memory
    Play,
    /// Save device memory to file
    Save {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },
    /// Capture a signal and save it to file
    CaptureSave {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },
    /// Load a waveform file into the device and play it
    Send {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },
    /// Convert a waveform file to a vcd trace
    ExportVcd {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
        #[structopt(parse(from_os_str))]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    let loglevel = if opt.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut logger = env_logger::Builder::new();
    logger.filter_level(loglevel);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    logger.init();

    if let CliCommand::ExportVcd { path, out } = &opt.cmd {
        return vcdutils::export(path, out);
    }

    let devpath = opt.serial.unwrap_or_else(|| PathBuf::from("/dev/ttyACM0"));
    let link = SerialLink::connect(&devpath, &LinkConfig::default())?;

    let config = SessionConfig {
        dump: if opt.query_device {
            DumpStrategy::QueryDevice
        } else {
            DumpStrategy::CapturedCount
        },
        timing: Timing::default(),
    };
    let mut session = Session::new(link, config);

    match opt.cmd {
        CliCommand::Temp => {
            println!("{}", session.temperature()?);
            Ok(())
        }
        CliCommand::Capture => capture::command_capture(&mut session),
        CliCommand::Play => session.play(),
        CliCommand::Save { path } => capture::command_save(&mut session, &path),
        CliCommand::CaptureSave { path } => {
            capture::command_capture(&mut session)?;
            capture::command_save(&mut session, &path)
        }
        CliCommand::Send { path } => playback::command_send(&mut session, &path),
        CliCommand::ExportVcd { .. } => Ok(()),
    }
}
