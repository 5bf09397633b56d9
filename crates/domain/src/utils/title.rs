//! Pure string utility functions for entry title construction

use crate::constants::{MAX_TITLE_LENGTH, TITLE_TRUNCATE_SUFFIX};
use crate::types::plan::Discipline;

/// Build a calendar entry title from a session's discipline and type.
///
/// Titles are always engine-computed (never raw session text) and are
/// capped at `MAX_TITLE_LENGTH` characters including the truncation
/// suffix.
pub fn build_entry_title(discipline: Discipline, session_type: &str) -> String {
    let session_type = session_type.trim();
    let title = if session_type.is_empty() {
        discipline.label().to_string()
    } else {
        format!("{}: {}", discipline.label(), session_type)
    };

    truncate_title(&title)
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() <= MAX_TITLE_LENGTH {
        return title.to_string();
    }

    let keep = MAX_TITLE_LENGTH.saturating_sub(TITLE_TRUNCATE_SUFFIX.chars().count());
    let mut truncated: String = title.chars().take(keep).collect();
    truncated.push_str(TITLE_TRUNCATE_SUFFIX);
    truncated
}
