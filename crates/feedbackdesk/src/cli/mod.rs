//! Command-line interface for feedbackdesk.
//!
//! This module provides the CLI structure for the `fbdesk` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ClearCommand, ConfigCommand, DeleteCommand, ExportCommand, ListCommand, LoginCommand,
    OutputFormat, PriorityArg, ShowCommand, StatusCommand, SubmitCommand,
};

/// fbdesk - Collect and review internal feature requests
///
/// Departments submit what they need built; reviewers list, filter, export
/// and clean up the queue.
#[derive(Debug, Parser)]
#[command(name = "fbdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a new request
    Submit(SubmitCommand),

    /// List requests, high priority first
    List(ListCommand),

    /// Show one request in full
    Show(ShowCommand),

    /// Delete one request (admin mode)
    Delete(DeleteCommand),

    /// Delete every request (admin mode)
    Clear(ClearCommand),

    /// Export all requests to a spreadsheet
    Export(ExportCommand),

    /// Switch on admin mode with the admin password
    Login(LoginCommand),

    /// Leave admin mode
    Logout,

    /// Show backend, mode and request counts
    Status(StatusCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Logout,
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "fbdesk");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_submit() {
        let cli = Cli::try_parse_from([
            "fbdesk",
            "submit",
            "--department",
            "财务部",
            "--contact-name",
            "李雷",
            "--problem",
            "报表手工填写耗时",
            "--requirements",
            "自动生成月报",
            "--priority",
            "high",
            "--expected-completion",
            "2025-03-01",
        ])
        .unwrap();

        let Command::Submit(cmd) = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(cmd.department.as_deref(), Some("财务部"));
        assert_eq!(cmd.priority, PriorityArg::High);
        assert_eq!(
            cmd.expected_completion,
            chrono::NaiveDate::from_ymd_opt(2025, 3, 1)
        );
    }

    #[test]
    fn test_parse_submit_rejects_bad_date() {
        let result = Cli::try_parse_from(["fbdesk", "submit", "--expected-completion", "soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_list_with_filter() {
        let cli = Cli::try_parse_from(["fbdesk", "list", "--priority", "low", "--expand"]).unwrap();
        let Command::List(cmd) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(cmd.priority, Some(PriorityArg::Low));
        assert!(cmd.expand);
        assert_eq!(cmd.format, OutputFormat::Plain);
    }

    #[test]
    fn test_parse_list_rejects_unknown_priority() {
        assert!(Cli::try_parse_from(["fbdesk", "list", "--priority", "urgent"]).is_err());
    }

    #[test]
    fn test_parse_delete() {
        let cli = Cli::try_parse_from(["fbdesk", "delete", "abc", "--yes"]).unwrap();
        let Command::Delete(cmd) = cli.command else {
            panic!("expected delete");
        };
        assert_eq!(cmd.id, "abc");
        assert!(cmd.yes);
    }

    #[test]
    fn test_parse_login_logout() {
        let cli = Cli::try_parse_from(["fbdesk", "login", "admin123"]).unwrap();
        assert!(matches!(cli.command, Command::Login(_)));

        let cli = Cli::try_parse_from(["fbdesk", "logout"]).unwrap();
        assert!(matches!(cli.command, Command::Logout));
    }

    #[test]
    fn test_parse_export_output() {
        let cli = Cli::try_parse_from(["fbdesk", "export", "-o", "/tmp/out"]).unwrap();
        let Command::Export(cmd) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(cmd.output, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["fbdesk", "-c", "/custom/config.toml", "-v", "status"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Command::Status(_)));
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::try_parse_from(["fbdesk", "config", "show", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: true })
        ));
    }
}
