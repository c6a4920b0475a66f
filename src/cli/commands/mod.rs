//! Command execution.
//!
//! Each command returns an exit code; errors are printed here together with
//! their recovery suggestions.

mod helpers;
mod release;
mod secure;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use release::execute_release;
use secure::execute_secure;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        // Validation errors are never quiet
        let output = super::OutputManager::new(false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::SecureRelease { .. } => execute_secure(&args, &config).await,
        _ => execute_release(&args, &config).await,
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }
            if e.is_recoverable() {
                config.println("Backups are kept; fix the issue and re-run the same command.");
            }

            Ok(1)
        }
    }
}
