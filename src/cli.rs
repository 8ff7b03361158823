//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{flexible_date, Priority, TaskStatus};
use crate::state::Theme;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Taskify - project and task dashboard
///
/// Browse projects, move cards across the kanban board, chart project
/// analytics and export task lists, against built-in mock data or a
/// Taskify REST backend.
///
/// Examples:
///   taskify projects
///   taskify analytics 1 --format json
///   taskify export 1
///   taskify move 1 --from todo --to in-progress
///   taskify --api-url https://taskify.example.com/api login --email me@example.com
///   taskify init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .taskify.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Taskify API base URL; selects the REST backend
    #[arg(long, value_name = "URL", env = "TASKIFY_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Use the built-in mock data even if an API is configured
    #[arg(long, global = true)]
    pub mock: bool,

    /// JSON workspace snapshot to serve as mock data
    #[arg(long, value_name = "FILE", global = true)]
    pub data_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// File holding the session token and preferences
    #[arg(long, value_name = "FILE", global = true)]
    pub state_file: Option<PathBuf>,

    /// Keep session state in memory only for this run
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Dashboard commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List projects with their progress
    Projects,

    /// Show analytics for a project
    Analytics {
        #[arg(value_name = "PROJECT_ID")]
        project: String,

        /// Report format
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Export a project's tasks as CSV
    Export {
        #[arg(value_name = "PROJECT_ID")]
        project: String,

        /// Output file (default: <project name>-tasks.csv)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show the kanban board of a project
    Board {
        #[arg(value_name = "PROJECT_ID")]
        project: String,
    },

    /// Move a card on the kanban board
    Move {
        #[arg(value_name = "PROJECT_ID")]
        project: String,

        /// Source column
        #[arg(long)]
        from: TaskStatus,

        /// Card index in the source column
        #[arg(long, default_value = "0", value_name = "INDEX")]
        from_index: usize,

        /// Destination column
        #[arg(long)]
        to: TaskStatus,

        /// Insert position in the destination column
        #[arg(long, default_value = "0", value_name = "INDEX")]
        to_index: usize,
    },

    /// Toggle a task between completed and to-do
    Toggle {
        #[arg(value_name = "PROJECT_ID")]
        project: String,

        #[arg(value_name = "TASK_ID")]
        task: String,
    },

    /// List a project's tasks
    List {
        #[arg(value_name = "PROJECT_ID")]
        project: String,

        /// Only tasks with this status
        #[arg(long)]
        status: Option<TaskStatus>,

        /// Only tasks with this priority
        #[arg(long)]
        priority: Option<Priority>,
    },

    /// Show a project's tasks by due date
    Calendar {
        #[arg(value_name = "PROJECT_ID")]
        project: String,
    },

    /// Show one task with its comments and files
    Task {
        #[arg(value_name = "TASK_ID")]
        id: String,
    },

    /// Sign in to the API
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "TASKIFY_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Confirm an email address with a one-time password
    VerifyOtp {
        #[arg(long)]
        email: String,

        #[arg(long)]
        otp: String,
    },

    /// Send a new one-time password
    ResendOtp {
        #[arg(long)]
        email: String,
    },

    /// Request a password reset code
    ForgotPassword {
        #[arg(long)]
        email: String,
    },

    /// Set a new password using a reset code
    ResetPassword {
        #[arg(long)]
        email: String,

        #[arg(long)]
        otp: String,

        #[arg(long, env = "TASKIFY_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },

    /// Sign out and forget the stored token
    Logout,

    /// Answer the onboarding questions
    Onboard {
        #[arg(long)]
        role: String,

        #[arg(long, value_name = "SIZE")]
        team_size: String,

        #[arg(long, value_name = "TEXT")]
        use_case: String,
    },

    /// Update account settings
    Settings {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Create a project
    CreateProject {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "General")]
        category: String,

        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(long, value_name = "DATE")]
        due: Option<String>,

        #[arg(long, default_value = "📁")]
        icon: String,

        #[arg(long, default_value = "blue")]
        color: String,
    },

    /// Invite someone to a project
    Invite {
        #[arg(value_name = "PROJECT_ID")]
        project: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "Member")]
        role: String,
    },

    /// Show or change view preferences
    Prefs {
        /// Collapse the sidebar
        #[arg(long, value_name = "BOOL")]
        sidebar_collapsed: Option<bool>,

        #[arg(long)]
        theme: Option<Theme>,

        /// Mobile navigation order (comma-separated)
        #[arg(long, value_name = "ITEMS", value_delimiter = ',')]
        nav: Option<Vec<String>>,
    },

    /// Generate a default .taskify.toml configuration file
    InitConfig,
}

/// Output format for the analytics report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Validate API URL format
        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Validate data file if provided
        if let Some(ref data_file) = self.data_file {
            if !data_file.is_file() {
                return Err(format!("Data file does not exist: {}", data_file.display()));
            }
        }

        match &self.command {
            Command::Login { email, password } => {
                validate_email(email)?;
                if password.is_empty() {
                    return Err("Password is required".to_string());
                }
            }
            Command::VerifyOtp { email, otp } => {
                validate_email(email)?;
                validate_otp(otp)?;
            }
            Command::ResendOtp { email } | Command::ForgotPassword { email } => {
                validate_email(email)?;
            }
            Command::ResetPassword {
                email,
                otp,
                new_password,
            } => {
                validate_email(email)?;
                validate_otp(otp)?;
                if new_password.chars().count() < 8 {
                    return Err("New password must be at least 8 characters".to_string());
                }
            }
            Command::Settings { name, email } => {
                if name.is_none() && email.is_none() {
                    return Err("Nothing to update: pass --name and/or --email".to_string());
                }
                if let Some(email) = email {
                    validate_email(email)?;
                }
            }
            Command::CreateProject { name, due, .. } => {
                if name.trim().is_empty() {
                    return Err("Project name cannot be empty".to_string());
                }
                if let Some(due) = due {
                    if flexible_date::parse(due).is_none() {
                        return Err(format!("Invalid due date: {}", due));
                    }
                }
            }
            Command::Invite { email, .. } => validate_email(email)?,
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

fn validate_email(email: &str) -> Result<(), String> {
    let valid = email
        .split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));

    if valid {
        Ok(())
    } else {
        Err(format!("Invalid email address: {}", email))
    }
}

fn validate_otp(otp: &str) -> Result<(), String> {
    if otp.len() == 6 && otp.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("OTP must be 6 digits".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(command: Command) -> Args {
        Args {
            config: None,
            api_url: None,
            mock: false,
            data_file: None,
            timeout: None,
            state_file: None,
            ephemeral: false,
            verbose: false,
            quiet: false,
            command,
        }
    }

    #[test]
    fn test_parse_move_command() {
        let args = Args::try_parse_from([
            "taskify", "move", "1", "--from", "todo", "--to", "in-progress", "--to-index", "2",
        ])
        .unwrap();

        match args.command {
            Command::Move {
                project,
                from,
                from_index,
                to,
                to_index,
            } => {
                assert_eq!(project, "1");
                assert_eq!(from, TaskStatus::Todo);
                assert_eq!(from_index, 0);
                assert_eq!(to, TaskStatus::InProgress);
                assert_eq!(to_index, 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from(["taskify", "projects", "--mock", "--verbose"]).unwrap();
        assert!(args.mock);
        assert!(args.verbose);
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args(Command::Projects);
        args.api_url = Some("localhost:8000".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args(Command::Projects);
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_auth_inputs() {
        let bad_email = make_args(Command::ForgotPassword {
            email: "not-an-email".to_string(),
        });
        assert!(bad_email.validate().is_err());

        let bad_otp = make_args(Command::VerifyOtp {
            email: "me@example.com".to_string(),
            otp: "12ab".to_string(),
        });
        assert!(bad_otp.validate().is_err());

        let ok = make_args(Command::VerifyOtp {
            email: "me@example.com".to_string(),
            otp: "123456".to_string(),
        });
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_validation_create_project_due_date() {
        let make = |due: &str| {
            make_args(Command::CreateProject {
                name: "Launch".to_string(),
                description: String::new(),
                category: "General".to_string(),
                due: Some(due.to_string()),
                icon: "📁".to_string(),
                color: "blue".to_string(),
            })
        };
        assert!(make("2024-09-01").validate().is_ok());
        assert!(make("soon").validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(Command::Projects);
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
