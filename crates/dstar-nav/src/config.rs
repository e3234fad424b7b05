#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tuning knobs for [`DStarPlanner`](crate::DStarPlanner).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Upper bound on vertices popped by one repair pass. Unbounded by default.
    ///
    /// Hitting it leaves the open set in place; the next call resumes from there.
    pub max_expansions: usize,
    /// Upper bound on steps taken by greedy descent before giving up with an empty path.
    ///
    /// Descent is always bounded by the grid's cell count per repair; this only tightens that.
    pub max_path_steps: usize,
    /// On-demand repairs allowed when descent stalls on a single extraction.
    pub max_stall_repairs: usize,
    /// Run a full plan whenever the start cell moves, not only when the goal changes.
    ///
    /// Priorities are keyed against the current start; a start that drifts far between repairs
    /// skews the ordering of the open set.
    pub replan_on_start_move: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_expansions: usize::MAX,
            max_path_steps: usize::MAX,
            max_stall_repairs: 1,
            replan_on_start_move: false,
        }
    }
}
