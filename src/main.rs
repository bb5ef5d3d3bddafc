use std::{
    io::{self, Write},
    net::Ipv4Addr,
    path::PathBuf,
    process::ExitCode,
    thread,
    time::Duration,
};

use adb_shell::{
    AdbConfig, CancellationFlag, CollectingReceiver, LineHandler, LineReceiver,
    NullOutputReceiver, adb,
    receiver::{ReceiverError, ReceiverResult},
};
use anyhow::Context;
use clap::Parser;
use color_print::cprintln;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run a shell command on an Android device and stream its output
#[derive(Parser, Debug)]
#[command(name = "adb-shell")]
struct Args {
    /// Config file (toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// adb server address, overrides the config file
    #[arg(long)]
    host: Option<Ipv4Addr>,

    /// adb server port, overrides the config file
    #[arg(long)]
    port: Option<u16>,

    /// Cancel the command after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Throw the output away
    #[arg(long, conflicts_with_all = ["timeout", "max_bytes"])]
    discard: bool,

    /// Stop the command once this many bytes were received
    #[arg(long)]
    max_bytes: Option<usize>,

    /// Print the effective config as toml and exit
    #[arg(long)]
    print_config: bool,

    /// Device serial, e.g. `emulator-5554` or `192.168.1.3:40919`
    #[arg(required_unless_present = "print_config")]
    serial: Option<String>,

    #[arg(
        required_unless_present = "print_config",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command: Vec<String>,
}

/// Prints every line as soon as it arrives
struct PrintLines;

impl LineHandler for PrintLines {
    fn process_lines(&mut self, lines: &[String]) -> ReceiverResult<()> {
        let mut stdout = io::stdout().lock();
        for line in lines {
            writeln!(stdout, "{line}").map_err(|err| ReceiverError::Handler(err.to_string()))?;
        }
        Ok(())
    }
}

fn init_tracing_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive("INFO".parse().unwrap())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .try_init();
}

fn load_config(args: &Args) -> anyhow::Result<AdbConfig> {
    let mut config = match &args.config {
        Some(path) => AdbConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AdbConfig::default(),
    };
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    Ok(config)
}

fn arm_timeout(flag: CancellationFlag, timeout: Duration) {
    thread::spawn(move || {
        thread::sleep(timeout);
        info!("timeout of {timeout:?} reached, cancelling");
        flag.cancel();
    });
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let serial = args.serial.as_deref().context("no device serial given")?;
    let device = adb::connect(serial, config)
        .with_context(|| format!("failed to connect to {serial}"))?;
    let command = args.command.join(" ");

    let flag = CancellationFlag::new();
    if let Some(secs) = args.timeout {
        arm_timeout(flag.clone(), Duration::from_secs(secs));
    }

    let outcome = if args.discard {
        let mut receiver = NullOutputReceiver::instance();
        device.execute_remote_command(&command, &mut receiver)?
    } else if let Some(max_bytes) = args.max_bytes {
        let mut receiver = CollectingReceiver::with_limit(max_bytes).with_cancellation_flag(flag);
        let outcome = device.execute_remote_command(&command, &mut receiver)?;
        io::stdout()
            .write_all(receiver.as_bytes())
            .context("failed to write output")?;
        outcome
    } else {
        let mut receiver = LineReceiver::new(PrintLines).with_cancellation_flag(flag);
        device.execute_remote_command(&command, &mut receiver)?
    };

    if outcome.is_cancelled() {
        info!("`{command}` cancelled after {} bytes", outcome.bytes_read);
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing_subscriber();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            cprintln!("<red,bold>error</>: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
