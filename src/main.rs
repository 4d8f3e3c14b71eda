use anyhow::{Context, Result};
use inventory_scan::{app::App, cli, config::Config, logger};
use log::LevelFilter;
use std::io::stdout;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build().get_matches();
    let (options, command) = cli::parse(&matches)?;

    let mut config = Config::new();
    config
        .load(options.config_dir.as_deref())
        .context("Failed to load configuration")?;

    let level = if options.verbose {
        LevelFilter::Debug
    } else {
        config.log_level
    };
    logger::init(level).context("Failed to initialize logger")?;

    let mut app = App::start(config, &options).context("Failed to open inventory store")?;
    let result = app.run(command, &mut stdout()).await;
    app.finish();
    result?;
    Ok(())
}
