//! Main entry point for the fwpack CLI tool

use clap::Parser;
use clap::error::ErrorKind;
use fwpack::cli::{Args, run_cli};
use fwpack::logger;
use log::LevelFilter;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            // Usage errors share exit status 1 and the `[ERROR]` prefix with every other failure.
            logger::init(LevelFilter::Info);
            let rendered = e.render().to_string();
            let message = rendered.trim_end();
            log::error!("{}", message.strip_prefix("error: ").unwrap_or(message));
            std::process::exit(1);
        }
    };

    logger::init(args.log_level());

    if let Err(e) = run_cli(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
