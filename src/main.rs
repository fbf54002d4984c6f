// Regtest transaction orchestrator - CLI

use clap::Parser;
use regtest_orchestrator::{Cli, CliHandler, HttpConnector};

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let config = match cli.options.into_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    let handler = CliHandler::new(HttpConnector, config);

    if let Err(e) = handler.handle(cli.command) {
        eprintln!("Error: {}", e);
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = std::error::Error::source(cause);
        }
        std::process::exit(e.exit_code());
    }
}
