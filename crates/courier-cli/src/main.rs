use courier_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // Initialize logging as early as possible; stderr when asked or when the log file is unavailable.
    if cli.verbose || logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = cli.run().await {
        eprintln!("courier error: {:#}", err);
        std::process::exit(1);
    }
}
