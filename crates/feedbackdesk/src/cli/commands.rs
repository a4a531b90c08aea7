//! CLI command definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::record::{NewFeedback, Priority};

/// Submit command arguments.
///
/// Required fields are optional here so that a missing one is reported by
/// record validation, together with any others that are missing.
#[derive(Debug, Args)]
pub struct SubmitCommand {
    /// Department name (required)
    #[arg(short, long)]
    pub department: Option<String>,

    /// Contact person (required)
    #[arg(short = 'n', long)]
    pub contact_name: Option<String>,

    /// Contact phone
    #[arg(long)]
    pub phone: Option<String>,

    /// Contact email
    #[arg(short, long)]
    pub email: Option<String>,

    /// The problem to solve (required)
    #[arg(long)]
    pub problem: Option<String>,

    /// What the program should do (required)
    #[arg(short, long)]
    pub requirements: Option<String>,

    /// Priority
    #[arg(short, long, value_enum, default_value = "medium")]
    pub priority: PriorityArg,

    /// Expected completion date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub expected_completion: Option<NaiveDate>,

    /// Additional notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl SubmitCommand {
    /// Build the submission from the arguments.
    #[must_use]
    pub fn to_new_feedback(&self) -> NewFeedback {
        let mut new = NewFeedback::new(
            self.department.clone().unwrap_or_default(),
            self.contact_name.clone().unwrap_or_default(),
            self.problem.clone().unwrap_or_default(),
            self.requirements.clone().unwrap_or_default(),
        )
        .with_priority(self.priority.into());

        if let Some(phone) = &self.phone {
            new = new.with_phone(phone.as_str());
        }
        if let Some(email) = &self.email {
            new = new.with_email(email.as_str());
        }
        if let Some(date) = self.expected_completion {
            new = new.with_expected_completion(date);
        }
        if let Some(notes) = &self.notes {
            new = new.with_notes(notes.as_str());
        }
        new
    }
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show this priority
    #[arg(short, long, value_enum)]
    pub priority: Option<PriorityArg>,

    /// Show every field, not just the summary line
    #[arg(short, long)]
    pub expand: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Request id
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Request id
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Clear command arguments.
#[derive(Debug, Args)]
pub struct ClearCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Directory to write the spreadsheet to
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

/// Login command arguments.
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Admin password
    pub secret: String,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Priority argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PriorityArg {
    /// Low priority
    Low,
    /// Medium priority
    #[default]
    Medium,
    /// High priority
    High,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Self::Low,
            PriorityArg::Medium => Self::Medium,
            PriorityArg::High => Self::High,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
