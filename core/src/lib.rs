//! tokre - Regular expressions over sequences of typed tokens
//!
//! A regex engine whose alphabet is any Rust type: characters, words, parsed
//! records, maps. Patterns support concatenation, alternation, bounded and
//! unbounded repetition, and named captures that may nest and repeat. Matching
//! returns *every* accepting interpretation of the input, each with its own
//! capture tree.
//!
//! # Architecture
//!
//! - [`TokenMatcher<Tok, Out>`]: Accepts one token, producing zero or more outputs
//! - [`Expr<Tok, Out>`]: Immutable expression tree built with `+`, `|` and helpers
//! - [`build_graph`]: Rewrites an expression into a flat [`Graph`] of leaves
//! - [`run`]: Simulates the graph over an input, no backtracking
//! - [`reconstruct`]: Replays capture markers into a [`Match`] tree
//! - [`Program`]: The three stages above behind one entry point
//!
//! # Key Design Insights
//!
//! 1. **Leaves have identity**: every leaf occurrence becomes its own graph node,
//!    even when the same matcher appears several times in the expression.
//!
//! 2. **Edges carry capture markers**: group boundaries live on the edges, as an
//!    ordered list of `Start`/`Stop` markers. Captures cost nothing at match time;
//!    they are rebuilt only for accepting paths.
//!
//! 3. **No disambiguation**: ambiguous patterns return one [`Match`] per
//!    interpretation. [`Limits`] bound the frontier so that pathological
//!    patterns fail with [`MatchError::FrontierExceeded`] instead of exhausting
//!    memory.
//!
//! # Example
//!
//! ```
//! use tokre::prelude::*;
//!
//! let user = capture("user", alnums()).unwrap();
//! let host = capture("host", alnums() + seq(".".chars()) + alnums()).unwrap();
//! let program = Program::compile(&(user + seq("@".chars()) + host));
//!
//! let found = program.matches_joined("ada@example.org".chars()).unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0]["user"].trail(), "ada");
//! assert_eq!(found[0]["host"].trail(), "example.org");
//! ```
//!
//! # Extensions
//!
//! - [`patterns`]: Ready-made character patterns (`email`, `url`, ...)
//! - `registry` feature: Build patterns from serde configs ([`Registry`])
//! - [`tokre-test`](https://docs.rs/tokre-test): Conformance fixtures (internal)

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod capture;
mod compiler;
mod engine;
mod expr;
mod graph;
mod program;
mod token_matcher;
mod trace;

pub mod patterns;

#[cfg(feature = "registry")]
mod config;
#[cfg(feature = "registry")]
mod registry;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use capture::{reconstruct, JoinTrail, Match, MatchList};
pub use compiler::build_graph;
pub use engine::{run, AcceptingPath, Limits, TrailItem};
pub use expr::{
    alt, anything, at_least, between, capture, concat, leaf, maybe, repeat, seq, times, try_seq,
    Expr,
};
pub use graph::{Edge, Graph, Marker, Markers, Node, NodeId};
pub use program::Program;
pub use token_matcher::TokenMatcher;

// Registry (feature-gated)
#[cfg(feature = "registry")]
pub use config::{
    ClassConfig, ExactConfig, PatternConfig, RangesConfig, RegexConfig, TypedConfig, UnitConfig,
    ValuesConfig,
};
#[cfg(feature = "registry")]
pub use registry::{
    register_char_matchers, register_string_matchers, IntoTokenMatcher, LiteralParser, Registry,
    RegistryBuilder,
};

// Trace types
pub use trace::{RunTrace, StepTrace};

// Concrete matchers
pub use token_matcher::{
    AnyMatcher, AttributeMatcher, CharClass, ClassMatcher, ExactMatcher, InListMatcher,
    InSetMatcher, KeyValueMatcher, KeyedToken, NotMatcher, OutOfMatcher, RangeMatcher,
    RegexMatcher, TestMatcher,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use tokre::prelude::*;
/// ```
pub mod prelude {
    pub use crate::patterns::*;
    pub use crate::{
        // Algebra
        alt,
        anything,
        at_least,
        between,
        capture,
        concat,
        leaf,
        maybe,
        repeat,
        seq,
        times,
        // Concrete matchers
        AnyMatcher,
        AttributeMatcher,
        CharClass,
        ClassMatcher,
        ExactMatcher,
        // Core types
        Expr,
        InListMatcher,
        InSetMatcher,
        JoinTrail,
        KeyValueMatcher,
        Limits,
        Match,
        // Errors
        MatchError,
        MatchList,
        NotMatcher,
        OutOfMatcher,
        PatternError,
        Program,
        RangeMatcher,
        RegexMatcher,
        // Trace types
        RunTrace,
        StepTrace,
        TestMatcher,
        // Traits
        TokenMatcher,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Default ceiling on the number of live explorers after any step.
///
/// Each explorer is one partial interpretation of the input. Ambiguous
/// patterns multiply them; this limit turns runaway growth into
/// [`MatchError::FrontierExceeded`]. Override per program with
/// [`Program::with_limits`].
pub const MAX_FRONTIER: usize = 65_536;

/// Maximum nesting depth of a pattern loaded from configuration.
///
/// Protects the recursive config loader against stack overflow. Patterns built
/// in code are not checked.
pub const MAX_PATTERN_DEPTH: usize = 64;

/// Largest repetition bound accepted from configuration.
///
/// Bounded repetition is unrolled into copies of the repeated pattern, so a
/// bound of `n` costs `n` copies of graph nodes.
pub const MAX_REPEAT_BOUND: usize = 1024;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from building or loading a pattern.
///
/// These are raised before any matching happens. Fix the pattern and build
/// it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A capture name is not identifier-like.
    InvalidCaptureName {
        /// The rejected name.
        name: String,
    },
    /// Repetition bounds are negative, inverted, or describe nothing.
    InvalidRepeatBound {
        /// Lower bound (or exact count).
        min: i64,
        /// Upper bound, `None` for unbounded.
        max: Option<i64>,
    },
    /// Configuration deserialization or construction failed.
    InvalidConfig {
        /// The underlying error message.
        source: String,
    },
    /// A regex pattern does not compile.
    InvalidRegex {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying error message.
        source: String,
    },
    /// A type URL was not found in the registry.
    UnknownTypeUrl {
        /// The unregistered type URL.
        type_url: String,
        /// Type URLs that ARE registered (for self-correcting error messages).
        available: Vec<String>,
    },
    /// Pattern nesting exceeds [`MAX_PATTERN_DEPTH`].
    DepthExceeded {
        /// Depth reached.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },
    /// A repetition bound exceeds [`MAX_REPEAT_BOUND`].
    RepeatTooLarge {
        /// Requested bound.
        bound: usize,
        /// Maximum allowed bound.
        max: usize,
    },
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCaptureName { name } => {
                write!(
                    f,
                    "invalid capture name \"{name}\": expected a letter or '_' followed by \
                     letters, digits or '_'"
                )
            }
            Self::InvalidRepeatBound { min, max } => match max {
                Some(max) => write!(f, "invalid repetition bounds {{{min}, {max}}}"),
                None => write!(f, "invalid repetition bounds {{{min},}}"),
            },
            Self::InvalidConfig { source } => {
                write!(f, "invalid config: {source}")
            }
            Self::InvalidRegex { pattern, source } => {
                write!(f, "invalid regex \"{pattern}\": {source}")
            }
            Self::UnknownTypeUrl {
                type_url,
                available,
            } => {
                write!(f, "unknown matcher type URL \"{type_url}\"")?;
                if available.is_empty() {
                    write!(f, "; no matcher types are registered")
                } else {
                    write!(f, "; registered: {}", available.join(", "))
                }
            }
            Self::DepthExceeded { depth, max } => {
                write!(
                    f,
                    "pattern nesting depth is {depth}, but maximum allowed is {max}"
                )
            }
            Self::RepeatTooLarge { bound, max } => {
                write!(
                    f,
                    "repetition bound is {bound}, but maximum allowed is {max}"
                )
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// Errors raised while matching.
///
/// "No match" is never an error; it is an empty [`MatchList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The frontier outgrew [`Limits::max_frontier`].
    FrontierExceeded {
        /// Frontier size when the limit tripped.
        size: usize,
        /// Configured maximum.
        max: usize,
        /// Index of the token being consumed.
        position: usize,
    },
    /// A capture marker closed a group other than the innermost open one.
    ///
    /// This is an internal defect of graph construction, not a user error.
    MalformedGraph {
        /// The innermost open group, if any.
        expected: Option<String>,
        /// The group the marker tried to close.
        found: String,
        /// Index of the trail item carrying the marker.
        position: usize,
    },
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FrontierExceeded {
                size,
                max,
                position,
            } => {
                write!(
                    f,
                    "frontier reached {size} explorers at token {position}, but maximum allowed \
                     is {max}; the pattern is too ambiguous for this input"
                )
            }
            Self::MalformedGraph {
                expected,
                found,
                position,
            } => match expected {
                Some(open) => write!(
                    f,
                    "malformed graph: trail item {position} closes \"{found}\" while \"{open}\" \
                     is the innermost open group"
                ),
                None => write!(
                    f,
                    "malformed graph: trail item {position} closes \"{found}\" but no group is open"
                ),
            },
        }
    }
}

impl std::error::Error for MatchError {}
