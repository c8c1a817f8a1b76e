use std::path::PathBuf;
use std::process;

use clap::Parser;
use supervisor_event_relay::{
    Config, Dispatcher, EventListener, config::DEFAULT_CONFIG_PATH, logging, utils,
};
use tracing::info;

/// Forward supervisord process events to a notification channel.
#[derive(Debug, Parser)]
#[command(name = "supervisor-event-relay", version, about)]
struct Args {
    /// Path to the INI configuration file.
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Send one test notification through the configured channel and exit.
    #[arg(long)]
    test: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let _guard = logging::init_logging(&config.logging)?;

    let hostname = utils::hostname();
    let dispatcher = Dispatcher::from_config(&config)?;

    if args.test {
        dispatcher.notifier().test(&hostname).await?;
        info!(
            channel = dispatcher.notifier().channel_type(),
            "Test notification sent"
        );
        return Ok(());
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        hostname = %hostname,
        config = %args.config.display(),
        "supervisor-event-relay started"
    );

    let mut listener = EventListener::new(dispatcher, hostname);
    listener.run(tokio::io::stdin(), tokio::io::stdout()).await?;

    Ok(())
}
