use clap::Parser;
use pricetrend::cli::{Cli, init_tracing, run};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing();
    run(cli)
}
