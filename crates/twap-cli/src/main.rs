//! Command-line TWAP order planner.
//!
//! Solves the order schedule from the given flags, runs the submission
//! checks and prints the encoded `ask` call.
//!
//! Run with: `cargo run -p twap-cli -- plan --sell WETH --buy USDC --amount 10 --duration 1h --chunk-size 1`
//!
//! Add `--account <addr> --allowance 10 --usd-price 1850 --contract <addr>`
//! to get past the submission checks and print the calldata.

mod args;
mod logging;
mod plan;
mod tokens;

use crate::args::{Cli, Command};
use clap::Parser;

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level);

    let tokens = tokens::default_tokens();
    match cli.command {
        Command::Plan(args) => plan::run(args, &tokens),
        Command::Tokens => {
            tokens::print_tokens(&tokens);
            Ok(())
        }
    }
}
