use anyhow::Context;
use clap::Parser;
use std::{
    net::{Ipv4Addr, SocketAddrV4},
    path::PathBuf,
    process::ExitCode,
};
use tasmota_shutter_control::{
    configuration::get_configuration,
    controller::ShutterController,
    device_client::TasmotaClient,
    logging::setup_tracing,
    shutter::{Operation, ShutterId},
};
use tracing::*;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Select a shutter behind a Tasmota relay and move it"
)]
struct Opts {
    /// The IP of the Tasmota device
    #[arg(short, long, value_name = "ADDRESS")]
    ip: Ipv4Addr,
    /// The operation to execute
    #[arg(short, long, value_name = "OP", value_enum, ignore_case = true)]
    operation: Operation,
    /// The number of the shutter to control
    #[arg(short, long, value_name = "NUM", value_parser = parse_shutter)]
    shutter: ShutterId,
    /// Configuration file with device port and credentials
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Increase log verbosity, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_shutter(value: &str) -> Result<ShutterId, String> {
    let number: u8 = value
        .parse()
        .map_err(|_| format!("`{}` is not a shutter number", value))?;
    ShutterId::new(number).ok_or_else(|| {
        format!(
            "shutter must be between {} and {}",
            ShutterId::MIN,
            ShutterId::MAX
        )
    })
}

fn main() -> ExitCode {
    let opts = Opts::parse();
    setup_tracing(opts.verbose);
    info!(
        "{} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    match run(opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(opts: Opts) -> anyhow::Result<()> {
    let app_config = get_configuration(opts.config).context("Failed to load configuration")?;

    let address = SocketAddrV4::new(opts.ip, app_config.device_port);
    let client = TasmotaClient::new(address, app_config.credentials)
        .context("Failed to create http client")?;
    let controller = ShutterController::new(client);

    controller
        .execute(opts.operation, opts.shutter)
        .with_context(|| {
            format!(
                "Failed to send {:?} to shutter {} on {}",
                opts.operation, opts.shutter, address
            )
        })
}
