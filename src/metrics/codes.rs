//! Numeric encodings of canary state published through the gauges.
//!
//! Dashboards and alerts key on these integers. Reordering either table is a
//! breaking change for every consumer of the scrape surface.

use crate::models::CanaryPhase;

/// `canary_phase` codes: a phase's code is its index in this table.
pub const PHASE_CODES: [CanaryPhase; 11] = [
    CanaryPhase::Initializing,
    CanaryPhase::Initialized,
    CanaryPhase::Waiting,
    CanaryPhase::Progressing,
    CanaryPhase::WaitingPromotion,
    CanaryPhase::Promoting,
    CanaryPhase::Finalising,
    CanaryPhase::Succeeded,
    CanaryPhase::Failed,
    CanaryPhase::Terminating,
    CanaryPhase::Terminated,
];

/// Code used for phases missing from [`PHASE_CODES`].
pub const FALLBACK_PHASE_CODE: i64 = 3;

/// Returns the `canary_phase` code for `phase`.
pub fn phase_code(phase: CanaryPhase) -> i64 {
    PHASE_CODES
        .iter()
        .position(|known| *known == phase)
        .map(|index| index as i64)
        .unwrap_or(FALLBACK_PHASE_CODE)
}

/// Value of the `canary_status` gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanaryStatus {
    Running = 0,
    Successful = 1,
    Failed = 2,
}

/// Phases with a status other than [`CanaryStatus::Successful`].
const STATUS_CODES: [(CanaryPhase, CanaryStatus); 2] = [
    (CanaryPhase::Progressing, CanaryStatus::Running),
    (CanaryPhase::Failed, CanaryStatus::Failed),
];

impl CanaryStatus {
    /// Collapses a phase into the tri-state status.
    ///
    /// Everything that is neither progressing nor failed counts as successful,
    /// terminal and unknown phases included.
    pub fn from_phase(phase: CanaryPhase) -> Self {
        STATUS_CODES
            .iter()
            .find(|(known, _)| *known == phase)
            .map(|(_, status)| *status)
            .unwrap_or(CanaryStatus::Successful)
    }

    pub fn code(self) -> i64 {
        self as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_codes_are_stable() {
        let expected = [
            (CanaryPhase::Initializing, 0),
            (CanaryPhase::Initialized, 1),
            (CanaryPhase::Waiting, 2),
            (CanaryPhase::Progressing, 3),
            (CanaryPhase::WaitingPromotion, 4),
            (CanaryPhase::Promoting, 5),
            (CanaryPhase::Finalising, 6),
            (CanaryPhase::Succeeded, 7),
            (CanaryPhase::Failed, 8),
            (CanaryPhase::Terminating, 9),
            (CanaryPhase::Terminated, 10),
        ];
        for (phase, code) in expected {
            assert_eq!(phase_code(phase), code, "phase {}", phase);
        }
    }

    #[test]
    fn test_unknown_phase_reports_progressing() {
        assert_eq!(phase_code(CanaryPhase::Unknown), FALLBACK_PHASE_CODE);
        assert_eq!(
            phase_code(CanaryPhase::Unknown),
            phase_code(CanaryPhase::Progressing)
        );
    }

    #[test]
    fn test_status_distinguishes_only_progressing_and_failed() {
        assert_eq!(
            CanaryStatus::from_phase(CanaryPhase::Progressing).code(),
            0
        );
        assert_eq!(CanaryStatus::from_phase(CanaryPhase::Failed).code(), 2);

        for phase in PHASE_CODES
            .iter()
            .copied()
            .chain(std::iter::once(CanaryPhase::Unknown))
            .filter(|p| !matches!(p, CanaryPhase::Progressing | CanaryPhase::Failed))
        {
            assert_eq!(
                CanaryStatus::from_phase(phase),
                CanaryStatus::Successful,
                "phase {}",
                phase
            );
        }
    }
}
