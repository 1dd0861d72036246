//! User confirmation between pipeline stages.

use tracing::info;

/// Asks the user whether to go on.
pub trait Confirm: Send + Sync {
    /// Ask a yes/no question. `false` stops the current playlist.
    fn confirm(&self, prompt: &str) -> bool;

    /// Present a list the next question refers to.
    fn show(&self, heading: &str, lines: &[String]) {
        info!("{}", heading);
        for line in lines {
            info!("  {}", line);
        }
    }
}

/// Answers yes to everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
