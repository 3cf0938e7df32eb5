use std::process;

use biggest::args::Args;
use biggest::config::Config;
use clap::Parser;

fn main() {
    let args = Args::parse();

    // warnings always reach stderr; RUST_LOG overrides the default level
    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = Config::build(&args).unwrap_or_else(|err| {
        eprintln!("Could not build configuration: {err}");
        process::exit(1);
    });

    if let Err(e) = biggest::run(&config) {
        eprintln!("Fatal Error: {e}");
        process::exit(1);
    }
}
