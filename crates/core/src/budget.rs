//! Pre-acquisition capacity check.

use serde::Serialize;

use crate::catalog::ReleaseCandidate;

/// Result of checking selected releases against the available bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetReport {
    /// Sum of the selected variants' sizes.
    pub total_bytes: u64,
    pub available_bytes: u64,
    /// What is left after acquiring everything, floored at zero.
    pub projected_remaining: u64,
    /// How far the selection exceeds the budget, if it does.
    pub shortfall: Option<u64>,
}

impl BudgetReport {
    pub fn is_sufficient(&self) -> bool {
        self.shortfall.is_none()
    }
}

/// Check the selected releases against `available_bytes`.
///
/// Pure: only reports. Whether a shortfall stops acquisition is up to the
/// caller.
pub fn check_budget<'a, I>(selected: I, available_bytes: u64) -> BudgetReport
where
    I: IntoIterator<Item = &'a ReleaseCandidate>,
{
    let total_bytes = selected
        .into_iter()
        .fold(0u64, |sum, c| sum.saturating_add(c.variant.size_bytes));

    let shortfall = total_bytes
        .checked_sub(available_bytes)
        .filter(|over| *over > 0);

    BudgetReport {
        total_bytes,
        available_bytes,
        projected_remaining: available_bytes.saturating_sub(total_bytes),
        shortfall,
    }
}

/// Human-readable byte count for prompts and logs.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
