use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;
use tokio::io::{stdin, stdout, BufReader};
use lib_code::*;

/// Send and receive TCP messages over a persistent server connection.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Server host
    #[arg(short, long, default_value = DEFAULT_SERVER)]
    server: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Add a new line to every request
    #[arg(short, long)]
    newline: bool,

    /// When a response is complete: line, rolloffino or raw
    #[arg(short, long, default_value_t = FrameRule::Rolloffino)]
    frame: FrameRule,

    /// Give up when a single read waits longer than this
    #[arg(short, long = "timeout-ms")]
    timeout: Option<u64>,
}

impl From<Args> for ClientConfig {
    fn from(args: Args) -> Self {
        Self {
            server: args.server,
            port: args.port,
            newline: args.newline,
            frame: args.frame,
            timeout: args.timeout.map(Duration::from_millis),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = ClientConfig::from(Args::parse());
    let mut session = connect(&config)
        .await
        .with_context(|| format!("cannot connect to {}:{}", config.server, config.port))?;
    info!("connected to {}:{} (frame rule: {})", config.server, config.port, session.rule());

    let mut input = BufReader::new(stdin());
    let mut output = stdout();

    let exchanged = run_console(&mut session, &mut input, &mut output, config.newline)
        .await
        .context("session ended")?;
    info!("done after {} exchanges", exchanged);

    Ok(())
}
