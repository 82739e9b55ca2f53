//! Complete command implementation.

use crate::cli::CompleteArgs;
use crate::config::load_api_settings;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use docsift_llm::{CompletionClient, CompletionOptions};
use std::path::Path;

/// Execute the complete command.
pub fn execute_complete(
    args: CompleteArgs,
    env_file: Option<&Path>,
    formatter: &Formatter,
) -> Result<()> {
    let options = completion_options(&args)?;
    let settings = load_api_settings(env_file)?;
    let client = CompletionClient::new(&settings, options)?;

    eprintln!("{}", formatter.info(&format!("Asking {}", client.model())));
    let reply = client.complete(&args.prompt)?;
    println!("{}", reply);

    Ok(())
}

/// Client options for a one-off completion.
pub fn completion_options(args: &CompleteArgs) -> Result<CompletionOptions> {
    if args.prompt.trim().is_empty() {
        return Err(CliError::InvalidInput("Prompt must not be empty".to_string()));
    }

    let mut options = CompletionOptions::default();
    if let Some(system) = &args.system {
        options = options.with_system(system.clone());
    }
    if let Some(max_tokens) = args.max_tokens {
        if max_tokens == 0 {
            return Err(CliError::InvalidInput("--max-tokens must be positive".to_string()));
        }
        options = options.with_max_tokens(max_tokens);
    }
    if let Some(model) = &args.model {
        options = options.with_model(model.clone());
    }
    Ok(options)
}
