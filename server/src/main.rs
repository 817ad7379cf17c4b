use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use tokio::net::TcpListener;
use lib_code::DEFAULT_PORT;
use server::roof_server;

/// Mock roll-off roof controller answering `(CMD:TARGET:VALUE)` commands.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let listener = TcpListener::bind((args.bind.as_str(), args.port))
        .await
        .with_context(|| format!("cannot bind {}:{}", args.bind, args.port))?;

    roof_server(listener).await;
    Ok(())
}
