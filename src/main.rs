use anyhow::Result;
use clap::Parser;
use std::path::Path;

#[derive(Parser, Debug)]
#[command(
    name = "text-overlay-rust",
    version,
    about = "Overlay text on images over HTTP"
)]
struct Cli {
    /// Address to bind the HTTP server to
    #[arg(short = 'a', long = "addr", default_value = "127.0.0.1:8080")]
    addr: String,

    /// Directory served under /public (overrides settings)
    #[arg(long = "public-dir")]
    public_dir: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    text_overlay_rust::logging::init(cli.verbose)?;
    let mut settings = text_overlay_rust::settings::load_settings(
        cli.read_settings.as_deref().map(Path::new),
    )?;
    if let Some(dir) = cli.public_dir {
        settings.public_dir = dir;
    }
    text_overlay_rust::server::run_server(settings, cli.addr).await
}
