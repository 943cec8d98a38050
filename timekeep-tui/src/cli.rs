use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "timekeep-tui")]
#[command(about = "Terminal UI for the timekeep time tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run against the configured API server (default)
    Run,
    /// Run in dev mode with local in-memory data
    Dev,
    /// Sign in from the command line and store the token
    Login,
    /// Create an account from the command line and store the token
    Register,
    /// Remove the stored session token
    Logout,
    /// Print config path and create default file if missing
    ConfigPath,
}

impl Cli {
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_is_the_default_command() {
        let cli = Cli::parse_from(["timekeep-tui"]);
        assert!(matches!(cli.command(), Commands::Run));

        let cli = Cli::parse_from(["timekeep-tui", "config-path"]);
        assert!(matches!(cli.command(), Commands::ConfigPath));
    }
}
