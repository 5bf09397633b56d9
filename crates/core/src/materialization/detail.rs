//! Default structural implementation of the `DetailRenderer` port.

use taper_domain::utils::workout_detail::{render_detail, validate_detail, WorkoutDetail};
use taper_domain::Result;

use super::ports::DetailRenderer;

/// Structural validator/renderer backed by the pure domain functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredDetailRenderer;

impl DetailRenderer for StructuredDetailRenderer {
    fn validate(&self, detail: &WorkoutDetail) -> Result<()> {
        validate_detail(detail)
    }

    fn render(&self, detail: &WorkoutDetail) -> String {
        render_detail(detail)
    }
}

#[cfg(test)]
mod tests {
    use taper_domain::utils::workout_detail::{StepPhase, WorkoutStep};

    use super::*;

    #[test]
    fn renderer_delegates_to_domain_functions() {
        let renderer = StructuredDetailRenderer;

        let empty = WorkoutDetail { focus: None, steps: vec![] };
        assert!(renderer.validate(&empty).is_err());

        let detail = WorkoutDetail {
            focus: None,
            steps: vec![WorkoutStep {
                phase: StepPhase::Main,
                description: "steady ride".into(),
                duration_minutes: Some(60),
            }],
        };
        assert!(renderer.validate(&detail).is_ok());
        assert_eq!(renderer.render(&detail), "Main: steady ride (60 min)");
    }
}
