//! `octo-explore` binary entry point.

use std::process::ExitCode;

use clap::Parser;
use octo_cli::{CliArgs, OctoCli, error_lines};

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let result = match OctoCli::from_args("octo-explore", &args) {
        Ok(cli) => cli.run(args).await,
        Err(err) => Err(err),
    };

    match result.and_then(|out| out.emit()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            for line in error_lines(&err) {
                eprintln!("{line}");
            }
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}
