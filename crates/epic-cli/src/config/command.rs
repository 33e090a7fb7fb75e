//! Subcommands.

use clap::Subcommand;
use epic_auth::{Permission, Role};

/// Operation to perform.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate the token signing secret file (never overwrites).
    InitSecret,

    /// Create an employee account.
    Provision {
        /// Employee number, generated when omitted.
        #[arg(long)]
        identifier: Option<String>,
        /// Full name.
        #[arg(long)]
        name: String,
        /// Email address.
        #[arg(long)]
        email: String,
        /// Role of the employee.
        #[arg(long)]
        role: Role,
        /// Password, read from stdin when omitted.
        #[arg(long, env = "EPIC_EVENTS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log in and store the session.
    Login {
        /// Employee number.
        identifier: String,
        /// Password, read from stdin when omitted.
        #[arg(long, env = "EPIC_EVENTS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log out and delete the stored session.
    Logout,

    /// Show the logged-in employee.
    Whoami,

    /// Show details about the stored session.
    Session,

    /// Check whether the logged-in employee holds a permission.
    Check {
        /// Permission name, e.g. `create_customer`.
        permission: Permission,
    },

    /// List the permissions of a role.
    Permissions {
        /// Role name.
        role: Role,
    },
}

impl Command {
    /// Returns the subcommand name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::InitSecret => "init-secret",
            Self::Provision { .. } => "provision",
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::Whoami => "whoami",
            Self::Session => "session",
            Self::Check { .. } => "check",
            Self::Permissions { .. } => "permissions",
        }
    }
}
