//! Structured workout detail: validation and text rendering.
//!
//! A session's detail is the structured description of what the athlete
//! actually does: an optional focus line plus an ordered list of steps.
//! The engine validates every detail before any calendar write and renders
//! it to deterministic text for the calendar entry body.

use serde::{Deserialize, Serialize};

use crate::constants::MAX_STEP_DURATION_MINUTES;
use crate::errors::{Result, TaperError};
use crate::impl_domain_status_conversions;

/// Phase of a workout step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepPhase {
    Warmup,
    Main,
    Cooldown,
}

impl_domain_status_conversions!(StepPhase {
    Warmup => "warmup",
    Main => "main",
    Cooldown => "cooldown",
});

impl StepPhase {
    /// Human-facing label used in rendered text.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Warmup => "Warm-up",
            Self::Main => "Main",
            Self::Cooldown => "Cool-down",
        }
    }
}

/// One step of a structured workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutStep {
    pub phase: StepPhase,
    pub description: String,
    pub duration_minutes: Option<u32>,
}

/// Structured workout detail attached to a draft session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDetail {
    pub focus: Option<String>,
    pub steps: Vec<WorkoutStep>,
}

/// Validate a workout detail structurally.
///
/// Rejected: an empty step list, blank step descriptions, zero-minute
/// steps, and step durations above `MAX_STEP_DURATION_MINUTES`.
pub fn validate_detail(detail: &WorkoutDetail) -> Result<()> {
    if detail.steps.is_empty() {
        return Err(TaperError::Validation("workout detail has no steps".into()));
    }

    for (index, step) in detail.steps.iter().enumerate() {
        if step.description.trim().is_empty() {
            return Err(TaperError::Validation(format!(
                "workout step {index} has a blank description"
            )));
        }

        if let Some(minutes) = step.duration_minutes {
            if minutes == 0 {
                return Err(TaperError::Validation(format!(
                    "workout step {index} has a zero duration"
                )));
            }
            if minutes > MAX_STEP_DURATION_MINUTES {
                return Err(TaperError::Validation(format!(
                    "workout step {index} exceeds {MAX_STEP_DURATION_MINUTES} minutes"
                )));
            }
        }
    }

    Ok(())
}

/// Render a workout detail to deterministic multi-line text.
///
/// The focus line (when present) comes first, followed by one line per
/// step. Identical details always render to identical text; the
/// materializer relies on this to keep repeated runs byte-identical.
pub fn render_detail(detail: &WorkoutDetail) -> String {
    let mut lines = Vec::with_capacity(detail.steps.len() + 1);

    if let Some(focus) = detail.focus.as_deref() {
        let trimmed = focus.trim();
        if !trimmed.is_empty() {
            lines.push(format!("Focus: {trimmed}"));
        }
    }

    for step in &detail.steps {
        let description = step.description.trim();
        match step.duration_minutes {
            Some(minutes) => {
                lines.push(format!("{}: {} ({} min)", step.phase.label(), description, minutes));
            }
            None => lines.push(format!("{}: {}", step.phase.label(), description)),
        }
    }

    lines.join("\n")
}
