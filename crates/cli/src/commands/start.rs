use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{error, info};

use mmi_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use mmi_core::errors::{PresentationError, WorkflowError};
use mmi_core::flows::WorkflowEngine;
use mmi_documents::DocumentGenerator;
use mmi_store::HttpQuotationStore;

use crate::commands::CommandResult;
use crate::console::TerminalConsole;
use crate::logging;
use crate::StartArgs;

pub fn load_options(args: &StartArgs) -> LoadOptions {
    LoadOptions {
        config_path: args.config.clone(),
        require_file: args.config.is_some(),
        overrides: ConfigOverrides {
            store_base_url: args.store_url.clone(),
            log_level: args.log_level.clone(),
            output_dir: args.output_dir.clone(),
        },
    }
}

pub fn run(args: StartArgs) -> CommandResult {
    let config = match AppConfig::load(load_options(&args)) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("start", "config", error.to_string(), 2),
    };

    let log_path = match logging::init(&config.logging, Local::now().date_naive()) {
        Ok(path) => path,
        Err(error) => return CommandResult::failure("start", "logging", format!("{error:#}"), 2),
    };
    info!(
        event_name = "system.session.starting",
        store_url = %config.store.base_url,
        log_file = %log_path.display(),
        "mmi session starting"
    );

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::failure("start", "runtime", error.to_string(), 1),
    };

    let outcome = runtime.block_on(run_session(&config, TerminalConsole::stdio()));
    match outcome {
        Ok(()) => {
            info!(event_name = "system.session.ended", "mmi session ended");
            CommandResult { exit_code: 0, output: String::new() }
        }
        Err(error) => {
            error!(
                event_name = "system.session.failed",
                error = %format!("{error:#}"),
                "session failed"
            );
            let class = match error.downcast_ref::<WorkflowError>() {
                Some(WorkflowError::Presentation(PresentationError::InputClosed)) => "input_closed",
                Some(_) => "terminal",
                None => "startup",
            };
            CommandResult::failure("start", class, format!("{error:#}"), 1)
        }
    }
}

/// Wires the HTTP store and document generator to `console` and runs the
/// menu loop until the operator exits.
pub async fn run_session<R, W>(config: &AppConfig, console: TerminalConsole<R, W>) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let store = HttpQuotationStore::from_config(&config.store)
        .context("cannot build quotation store client")?;
    let documents = DocumentGenerator::from_config(&config.documents)
        .context("cannot load document templates")?;

    let mut engine = WorkflowEngine::new(console, store, documents);
    engine.run().await?;
    Ok(())
}
