use anyhow::{Context, Result};
use clap::Parser;
use transmission_bot::{cli::Cli, config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = config::locate(cli.config.as_deref());
    let mut config = match &path {
        Some(path) => config::load(path).await?,
        None => config::Config::default(),
    };
    cli.apply(&mut config);

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", config.log.filter());
    }
    pretty_env_logger::init_timed();

    match &path {
        Some(path) => log::info!("loaded config {}", path.display()),
        None => log::info!("no config file found, using defaults"),
    }

    config.validate().context("validating config")?;

    transmission_bot::runner::run(config).await?;

    Ok(())
}
