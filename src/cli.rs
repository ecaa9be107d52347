use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "breeam-intake")]
#[command(about = "Terminal client for submitting BREEAM audit documentation and tracking report generation")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List audit criteria, optionally filtered by identifier substring
    Criteria {
        /// Case-insensitive substring matched against criteria identifiers
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Submit a project with attached documentation files
    Submit {
        /// Project name
        #[arg(long)]
        project_name: String,

        /// BREEAM responsible at the entrepreneur
        #[arg(long)]
        entrepreneur_responsible: String,

        /// BREEAM responsible at the civil engineer
        #[arg(long)]
        civil_engineer_responsible: String,

        /// BREEAM assessor
        #[arg(long)]
        assessor: String,

        /// Identifier of the audit criterion
        #[arg(long)]
        criteria: String,

        /// Premise flag (ja or nei)
        #[arg(long)]
        premise: String,

        /// Name of the preparer
        #[arg(long)]
        prepared_by: String,

        /// Documentation file to attach (repeatable)
        #[arg(short, long)]
        file: Vec<PathBuf>,

        /// Poll the task until the report is ready
        #[arg(long)]
        wait: bool,

        /// Download the finished report to this directory (implies --wait)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check the status of a submitted task
    Status {
        /// Task identifier returned by submit
        task_id: String,

        /// Poll until the report is ready instead of checking once
        #[arg(long)]
        wait: bool,

        /// Download the finished report to this directory (implies --wait)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Launch the interactive intake form
    Tui {
        /// Open the processing view for an existing task
        #[arg(long)]
        task_id: Option<String>,

        /// Open the result view for an already generated report
        #[arg(long)]
        file_url: Option<String>,
    },
}

impl Commands {
    pub fn parse_premise(premise: &str) -> Result<crate::models::Premise, anyhow::Error> {
        match premise.to_lowercase().as_str() {
            "ja" | "yes" => Ok(crate::models::Premise::Ja),
            "nei" | "no" => Ok(crate::models::Premise::Nei),
            other => Err(anyhow::anyhow!(
                "Unsupported premise value: {}. Use ja or nei",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Premise;

    #[test]
    fn test_parse_premise() {
        assert_eq!(Commands::parse_premise("ja").unwrap(), Premise::Ja);
        assert_eq!(Commands::parse_premise("NEI").unwrap(), Premise::Nei);
        assert_eq!(Commands::parse_premise("yes").unwrap(), Premise::Ja);
        assert!(Commands::parse_premise("maybe").is_err());
    }
}
