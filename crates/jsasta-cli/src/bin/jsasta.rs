//! `jsasta` binary entry point. Parses arguments, installs tracing, and
//! delegates to [`jsasta_cli::driver::run`], exiting with the code it
//! returns.

use clap::Parser;
use jsasta_cli::args::CliArgs;
use jsasta_cli::{driver, tracing_config};

fn main() {
    let args = CliArgs::parse();
    tracing_config::init(args.verbose, args.quiet);
    let code = driver::run(&args);
    std::process::exit(code);
}
