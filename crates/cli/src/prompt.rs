//! Terminal interaction.

use std::io::{self, BufRead, Write};

use redlist_core::{ApiKeySource, Confirm};

/// Asks yes/no questions on stdin and prints lists to stdout.
pub struct TerminalPrompter;

impl Confirm for TerminalPrompter {
    fn confirm(&self, prompt: &str) -> bool {
        match read_line(&format!("\n{} (y/n): ", prompt)) {
            Some(answer) => is_yes(&answer),
            None => false,
        }
    }

    fn show(&self, heading: &str, lines: &[String]) {
        println!("\n{}", heading);
        for line in lines {
            println!("{}", line);
        }
    }
}

/// Asks for the catalog API key when it is first needed.
pub struct ApiKeyPrompt;

impl ApiKeySource for ApiKeyPrompt {
    fn api_key(&self) -> Option<String> {
        read_line("\nCatalog API key (empty to cancel): ")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

/// Print `prompt` and read one line from stdin.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    io::stdout().flush().ok()?;
    read_answer(&mut io::stdin().lock())
}

/// Read one line; `None` on EOF or read errors.
///
/// Runs through `block_in_place` so a terminal wait does not stall the
/// runtime worker it was called from.
fn read_answer<R: BufRead>(input: &mut R) -> Option<String> {
    tokio::task::block_in_place(|| {
        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        }
    })
}

fn is_yes(answer: &str) -> bool {
    answer.trim_start().to_lowercase().starts_with('y')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes("Yes"));
        assert!(is_yes("  YEAH"));
        assert!(!is_yes("n"));
        assert!(!is_yes(""));
        assert!(!is_yes("sure"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_read_answer_inside_runtime() {
        let mut input = Cursor::new("yes\nsecond\n");
        let background = tokio::spawn(async { 42 });

        assert_eq!(read_answer(&mut input).as_deref(), Some("yes\n"));
        assert_eq!(read_answer(&mut input).as_deref(), Some("second\n"));
        assert_eq!(read_answer(&mut input), None);
        assert_eq!(background.await.unwrap(), 42);
    }

    #[test]
    fn test_read_answer_outside_runtime() {
        let mut input = Cursor::new("n\n");
        assert_eq!(read_answer(&mut input).as_deref(), Some("n\n"));
    }
}
