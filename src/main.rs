//! acp-conductor command-line entry point.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use acp_conductor::cli::{Cli, execute};
use acp_conductor::error::{AgentError, Error};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "acp_conductor=debug"
    } else {
        "acp_conductor=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn report_error(err: &Error) {
    match err {
        Error::Agent(agent) => {
            eprintln!("Error: {} failed: {agent}", agent.component());
            if let AgentError::Planning { raw, .. } = agent
                && !raw.is_empty()
            {
                eprintln!("\nRaw planner completion:\n{raw}");
            }
        }
        Error::Command(cmd) => eprintln!("Error: {cmd}"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(&cli) {
        Ok(output) => {
            if !output.text.is_empty() {
                print!("{}", output.text);
                if !output.text.ends_with('\n') {
                    println!();
                }
            }
            if output.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            report_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}
