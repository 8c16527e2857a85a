//! Run trace types for inspecting matcher behaviour.
//!
//! [`Program::trace`](crate::Program::trace) runs the same simulation as
//! [`Program::matches`](crate::Program::matches) but records what happened at
//! every input position instead of reconstructing captures. Use it to see
//! where a pattern stops matching, or how fast an ambiguous pattern's frontier
//! grows.
//!
//! # Example
//!
//! ```
//! use tokre::{seq, Program};
//!
//! let program = Program::compile(&seq("abc".chars()));
//! let trace = program.trace("abx".chars());
//! assert_eq!(trace.accepted, 0);
//! assert_eq!(trace.halted_at, Some(3));
//! for step in &trace.steps {
//!     println!("  [{}] {} -> {}", step.position, step.frontier_before, step.frontier_after);
//! }
//! ```

use std::fmt;

use crate::MatchError;

/// What happened while consuming one input token.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct StepTrace {
    /// Index of the token in the input (0-based).
    pub position: usize,
    /// Live explorers before the token.
    pub frontier_before: usize,
    /// Leaf edges whose matcher was invoked.
    pub edges_tried: usize,
    /// Live explorers after the token.
    pub frontier_after: usize,
}

impl fmt::Debug for StepTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepTrace")
            .field("position", &self.position)
            .field("frontier_before", &self.frontier_before)
            .field("edges_tried", &self.edges_tried)
            .field("frontier_after", &self.frontier_after)
            .finish()
    }
}

/// Trace of a full run over one input.
///
/// # INV: `accepted` == `matches(input)?.len()`
///
/// When `error` is `None`, `accepted` always equals the number of matches
/// [`Program::matches`](crate::Program::matches) returns for the same input.
pub struct RunTrace {
    /// One entry per consumed token.
    pub steps: Vec<StepTrace>,
    /// Number of accepting paths at the end of the run.
    pub accepted: usize,
    /// Explorers alive when the run ended.
    pub final_frontier: usize,
    /// Tokens consumed when the frontier died, if it did.
    pub halted_at: Option<usize>,
    /// The error that aborted the run, if any.
    pub error: Option<MatchError>,
}

impl RunTrace {
    /// Whether at least one path was accepted.
    #[must_use]
    pub fn matched(&self) -> bool {
        self.accepted > 0
    }

    /// Largest frontier observed during the run.
    #[must_use]
    pub fn peak_frontier(&self) -> usize {
        self.steps
            .iter()
            .map(|s| s.frontier_before.max(s.frontier_after))
            .max()
            .unwrap_or(self.final_frontier)
    }

    /// Sum of matcher invocations over the whole run.
    #[must_use]
    pub fn edges_tried(&self) -> usize {
        self.steps.iter().map(|s| s.edges_tried).sum()
    }
}

impl fmt::Debug for RunTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunTrace")
            .field("steps", &self.steps)
            .field("accepted", &self.accepted)
            .field("final_frontier", &self.final_frontier)
            .field("halted_at", &self.halted_at)
            .field("error", &self.error)
            .finish()
    }
}
