// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, parse arguments, hand off to `cli`.
// - Any error is printed to stderr and the process exits non-zero.

use clap::Parser;
use scrapgox::cli::{self, Cli};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();
    if let Err(err) = cli::run(args) {
        log::debug!("list failed: {err:?}");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
