//! docsift - batch structured extraction from documents with an LLM.

use anyhow::Context;
use clap::Parser;
use docsift_cli::{commands, logging, Cli, Command, Formatter};

fn main() {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    let formatter = Formatter::new(!cli.no_color);

    if let Err(e) = run(cli, &formatter) {
        eprintln!("{}", formatter.error(&format!("Error: {:#}", e)));
        std::process::exit(1);
    }
}

fn run(cli: Cli, formatter: &Formatter) -> anyhow::Result<()> {
    let env_file = cli.env_file.as_deref();

    match cli.command {
        Command::Run(args) => {
            commands::execute_run(args, env_file, formatter).context("batch run failed")?;
        }
        Command::Complete(args) => {
            commands::execute_complete(args, env_file, formatter).context("completion failed")?;
        }
        Command::Status(args) => {
            commands::execute_status(args, formatter).context("status failed")?;
        }
    }

    Ok(())
}
