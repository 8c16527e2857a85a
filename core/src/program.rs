//! `Program`: a compiled pattern, ready to match inputs
//!
//! ```
//! use tokre::prelude::*;
//!
//! let user = (leaf(ClassMatcher::new(CharClass::AsciiAlnum)).at_least(1))
//!     .capture("user")
//!     .unwrap();
//! let program = Program::compile(&(user + seq("!".chars())));
//!
//! let found = program.matches_joined("bob!".chars()).unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0]["user"].trail(), "bob");
//! ```

use std::borrow::Borrow;
use std::fmt::{self, Debug};

use crate::capture::{reconstruct, JoinTrail, MatchList};
use crate::compiler::build_graph;
use crate::engine::{run, Frontier, Limits};
use crate::graph::Graph;
use crate::trace::RunTrace;
use crate::{Expr, MatchError};

/// A compiled pattern.
///
/// Compiling copies the expression into a fresh [`Graph`]; the graph is never
/// mutated afterwards, so a `Program` can be shared across threads and used
/// for any number of concurrent runs.
pub struct Program<Tok, Out = Tok> {
    graph: Graph<Tok, Out>,
    limits: Limits,
}

impl<Tok, Out> Program<Tok, Out> {
    /// Compile `expr` with default [`Limits`].
    #[must_use]
    pub fn compile(expr: &Expr<Tok, Out>) -> Self {
        Self {
            graph: build_graph(expr),
            limits: Limits::default(),
        }
    }

    /// Replace the run-time limits.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The run-time limits in effect.
    #[must_use]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// The compiled graph.
    #[must_use]
    pub fn graph(&self) -> &Graph<Tok, Out> {
        &self.graph
    }

    /// Every way the whole `input` matches, with trails as `Vec<Out>`.
    ///
    /// An empty list means no match. The order follows the frontier and is
    /// stable for a given program and input.
    ///
    /// # Errors
    ///
    /// - [`MatchError::FrontierExceeded`] if the pattern is too ambiguous for
    ///   the configured [`Limits`].
    /// - [`MatchError::MalformedGraph`] on an internal capture bookkeeping
    ///   defect.
    pub fn matches<I, B>(&self, input: I) -> Result<MatchList<Vec<Out>>, MatchError>
    where
        Out: Clone,
        I: IntoIterator<Item = B>,
        B: Borrow<Tok>,
    {
        run(&self.graph, input, self.limits)?
            .iter()
            .map(|path| reconstruct(&path.trail))
            .collect()
    }

    /// Like [`matches`](Self::matches), with every trail joined into a single
    /// value (`char` → `String`, ...).
    ///
    /// # Errors
    ///
    /// Same as [`matches`](Self::matches).
    pub fn matches_joined<I, B>(&self, input: I) -> Result<MatchList<Out::Joined>, MatchError>
    where
        Out: JoinTrail + Clone,
        I: IntoIterator<Item = B>,
        B: Borrow<Tok>,
    {
        self.matches(input).map(MatchList::joined)
    }

    /// Whether the whole `input` matches at least once. Skips capture
    /// reconstruction.
    ///
    /// # Errors
    ///
    /// [`MatchError::FrontierExceeded`] as for [`matches`](Self::matches).
    pub fn is_match<I, B>(&self, input: I) -> Result<bool, MatchError>
    where
        I: IntoIterator<Item = B>,
        B: Borrow<Tok>,
    {
        let mut frontier = Frontier::new(&self.graph, self.limits);
        for token in input {
            frontier.advance(token.borrow())?;
            if frontier.is_empty() {
                return Ok(false);
            }
        }
        Ok(frontier.accepting_count() > 0)
    }

    /// Run `input` and record per-token statistics instead of matches.
    ///
    /// Never fails: a run aborted by [`Limits`] is reported in
    /// [`RunTrace::error`].
    pub fn trace<I, B>(&self, input: I) -> RunTrace
    where
        I: IntoIterator<Item = B>,
        B: Borrow<Tok>,
    {
        let mut frontier = Frontier::new(&self.graph, self.limits);
        let mut steps = Vec::new();
        let mut halted_at = None;

        for token in input {
            match frontier.advance(token.borrow()) {
                Ok(step) => steps.push(step),
                Err(error) => {
                    return RunTrace {
                        steps,
                        accepted: 0,
                        final_frontier: frontier.len(),
                        halted_at: Some(frontier.position()),
                        error: Some(error),
                    };
                }
            }
            if frontier.is_empty() {
                halted_at = Some(frontier.position());
                break;
            }
        }

        RunTrace {
            steps,
            accepted: frontier.accepting_count(),
            final_frontier: frontier.len(),
            halted_at,
            error: None,
        }
    }
}

impl<Tok, Out> Debug for Program<Tok, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .field("limits", &self.limits)
            .finish()
    }
}

impl<Tok, Out> Expr<Tok, Out> {
    /// Compile this expression. Shorthand for [`Program::compile`].
    #[must_use]
    pub fn compile(&self) -> Program<Tok, Out> {
        Program::compile(self)
    }
}
