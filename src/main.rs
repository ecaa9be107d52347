use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

mod api;
mod cli;
mod config;
mod intake_tui;
mod models;
mod poller;

use api::ApiClient;
use cli::{Cli, Commands};
use config::Config;
use models::SubmissionFields;
use poller::{StatusPoller, POLL_INTERVAL};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "breeam_intake=info");
    }

    init_logging(matches!(cli.command, Commands::Tui { .. }));

    let config = Config::from_env()?;
    config.validate()?;

    match cli.command {
        Commands::Criteria { query } => {
            let client = ApiClient::new(&config)?;
            match client.fetch_criteria().await {
                Ok(criteria) => {
                    let query = query.unwrap_or_default();
                    let matches = models::filter_criteria(&criteria, &query);
                    println!("Found {} criteria:", matches.len());
                    for crit in matches {
                        println!(
                            "{} - {} ({} {})",
                            crit.criteria_id, crit.name, crit.issue_number, crit.issue_name
                        );
                    }
                }
                Err(e) => error!("Criteria fetch failed: {}", e),
            }
        }

        Commands::Submit {
            project_name,
            entrepreneur_responsible,
            civil_engineer_responsible,
            assessor,
            criteria,
            premise,
            prepared_by,
            file,
            wait,
            output,
        } => {
            let premise = Commands::parse_premise(&premise)?;
            let fields = SubmissionFields {
                project_name,
                breeam_entrepreneur_responsible: entrepreneur_responsible,
                breeam_civil_engineer_responsible: civil_engineer_responsible,
                breeam_assessor: assessor,
                audit_criteria: criteria,
                premise: premise.as_str().to_string(),
                prepared_by,
            };
            if let Some(field) = fields.first_missing_field() {
                anyhow::bail!("{} must not be empty", field);
            }

            info!("Submitting project '{}'", fields.project_name);
            let client = ApiClient::new(&config)?;
            match client.submit(&fields, &file).await {
                Ok(task_id) => {
                    println!("Submission accepted, task id: {}", task_id);
                    if wait || output.is_some() {
                        wait_and_download(&client, &config, &task_id, output).await?;
                    }
                }
                Err(e) => error!("Submission failed: {}", e),
            }
        }

        Commands::Status {
            task_id,
            wait,
            output,
        } => {
            let client = ApiClient::new(&config)?;
            if wait || output.is_some() {
                wait_and_download(&client, &config, &task_id, output).await?;
            } else {
                let poller = StatusPoller::new(&client, POLL_INTERVAL);
                match poller.check(&task_id).await {
                    poller::TaskState::Completed { file_url } => {
                        println!("completed: {}", file_url);
                    }
                    poller::TaskState::Pending => println!("in progress"),
                }
            }
        }

        Commands::Tui { task_id, file_url } => {
            info!("Launching intake TUI");
            let entry = if let Some(task_id) = task_id {
                intake_tui::Entry::Processing { task_id }
            } else if let Some(file_url) = file_url {
                intake_tui::Entry::Result {
                    file_url: Some(file_url),
                }
            } else {
                intake_tui::Entry::Form
            };

            match intake_tui::run(config, entry).await {
                Ok(()) => info!("TUI exited successfully"),
                Err(e) => error!("TUI failed: {}", e),
            }
        }
    }

    Ok(())
}

/// Poll the task to completion, print the result URL, and optionally
/// download the report. Polling is unbounded; interrupt to give up.
async fn wait_and_download(
    client: &ApiClient,
    config: &Config,
    task_id: &str,
    output: Option<std::path::PathBuf>,
) -> Result<()> {
    let poller = StatusPoller::new(client, POLL_INTERVAL);
    println!("Waiting for report generation (task {})...", task_id);
    let file_url = poller.run_to_completion(task_id).await;
    println!("completed: {}", file_url);

    let output_dir = output.unwrap_or_else(|| config.download_dir.clone());
    match client.download_report(&file_url, &output_dir).await {
        Ok(path) => println!("Report saved to {}", path.display()),
        Err(e) => error!("Report download failed: {}", e),
    }
    Ok(())
}

fn init_logging(interactive: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let file_appender = tracing_appender::rolling::never(".", "breeam-intake.log");

    if interactive {
        // Log to file only so output does not interfere with the TUI display
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_filter(EnvFilter::from_default_env()),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(EnvFilter::from_default_env()),
            )
            .with(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_filter(EnvFilter::from_default_env()),
            )
            .init();
    }
}
