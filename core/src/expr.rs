//! Expression tree and its algebra.
//!
//! An [`Expr`] is an immutable description of a pattern. Expressions are built
//! by composition: every operation returns a new tree and leaves its operands
//! untouched.
//!
//! ```
//! use tokre::{capture, leaf, maybe, seq, ExactMatcher, Expr};
//!
//! // "say" followed by an optional " hello"
//! let greeting: Expr<char> = seq("say".chars()) + maybe(seq(" hello".chars()));
//!
//! // one letter 'a', captured as "first"
//! let first = capture("first", leaf(ExactMatcher::new('a'))).unwrap();
//! let _ = greeting | first;
//! ```
//!
//! Leaves are shared by reference inside the tree (`Arc`), so cloning an
//! expression is cheap. Each leaf still becomes its own graph node when the
//! expression is compiled, even if the same leaf appears many times.

use std::fmt::{self, Debug};
use std::ops::{Add, BitOr};
use std::sync::Arc;

use crate::{AnyMatcher, ExactMatcher, PatternError, TokenMatcher};

/// A pattern over `Tok` tokens producing `Out` values.
pub enum Expr<Tok, Out = Tok> {
    /// Exactly one token accepted by a matcher.
    Leaf(Arc<dyn TokenMatcher<Tok, Out>>),
    /// `left` then `right`.
    Concat(Box<Expr<Tok, Out>>, Box<Expr<Tok, Out>>),
    /// `left` or `right`.
    Alt(Box<Expr<Tok, Out>>, Box<Expr<Tok, Out>>),
    /// Zero or one occurrence.
    Maybe(Box<Expr<Tok, Out>>),
    /// Zero or more occurrences.
    Repeat(Box<Expr<Tok, Out>>),
    /// Everything matched by `inner` is reported under `name`.
    ///
    /// Building the variant directly skips name validation; any string is
    /// accepted and reported as-is. Use [`capture`] to reject names that are
    /// not identifiers.
    Capture {
        /// Group name (identifier-like).
        name: String,
        /// Captured sub-expression.
        inner: Box<Expr<Tok, Out>>,
    },
}

impl<Tok, Out> Clone for Expr<Tok, Out> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(m) => Self::Leaf(Arc::clone(m)),
            Self::Concat(l, r) => Self::Concat(l.clone(), r.clone()),
            Self::Alt(l, r) => Self::Alt(l.clone(), r.clone()),
            Self::Maybe(x) => Self::Maybe(x.clone()),
            Self::Repeat(x) => Self::Repeat(x.clone()),
            Self::Capture { name, inner } => Self::Capture {
                name: name.clone(),
                inner: inner.clone(),
            },
        }
    }
}

impl<Tok, Out> Debug for Expr<Tok, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(m) => f.debug_tuple("Leaf").field(m).finish(),
            Self::Concat(l, r) => f.debug_tuple("Concat").field(l).field(r).finish(),
            Self::Alt(l, r) => f.debug_tuple("Alt").field(l).field(r).finish(),
            Self::Maybe(x) => f.debug_tuple("Maybe").field(x).finish(),
            Self::Repeat(x) => f.debug_tuple("Repeat").field(x).finish(),
            Self::Capture { name, inner } => f
                .debug_struct("Capture")
                .field("name", name)
                .field("inner", inner)
                .finish(),
        }
    }
}

impl<Tok, Out> Expr<Tok, Out> {
    /// Wrap this expression in [`Expr::Maybe`].
    #[must_use]
    pub fn maybe(self) -> Self {
        maybe(self)
    }

    /// Wrap this expression in [`Expr::Repeat`].
    #[must_use]
    pub fn repeat(self) -> Self {
        repeat(self)
    }

    /// Capture this expression under `name`. See [`capture`].
    ///
    /// # Errors
    ///
    /// [`PatternError::InvalidCaptureName`] if `name` is not identifier-like.
    pub fn capture(self, name: impl Into<String>) -> Result<Self, PatternError> {
        capture(name, self)
    }

    /// Exactly `n` occurrences. See [`times`].
    ///
    /// # Errors
    ///
    /// [`PatternError::InvalidRepeatBound`] if `n` is zero.
    pub fn times(self, n: usize) -> Result<Self, PatternError> {
        times(self, n)
    }

    /// Between `lo` and `hi` occurrences. See [`between`].
    ///
    /// # Errors
    ///
    /// [`PatternError::InvalidRepeatBound`] if `hi < lo` or both are zero.
    pub fn between(self, lo: usize, hi: usize) -> Result<Self, PatternError> {
        between(self, lo, hi)
    }

    /// `lo` or more occurrences. See [`at_least`].
    #[must_use]
    pub fn at_least(self, lo: usize) -> Self {
        at_least(self, lo)
    }

    /// Number of `Leaf` nodes in the tree, counting repeats of a shared leaf.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Concat(l, r) | Self::Alt(l, r) => l.leaf_count() + r.leaf_count(),
            Self::Maybe(x) | Self::Repeat(x) | Self::Capture { inner: x, .. } => x.leaf_count(),
        }
    }

    /// Nesting depth of the tree. A lone leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Concat(l, r) | Self::Alt(l, r) => 1 + l.depth().max(r.depth()),
            Self::Maybe(x) | Self::Repeat(x) | Self::Capture { inner: x, .. } => 1 + x.depth(),
        }
    }
}

impl<Tok, Out> Add for Expr<Tok, Out> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        concat(self, rhs)
    }
}

impl<Tok, Out> BitOr for Expr<Tok, Out> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        alt(self, rhs)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Algebra
// ═══════════════════════════════════════════════════════════════════════════════

/// A single token accepted by `matcher`.
pub fn leaf<Tok, Out, M>(matcher: M) -> Expr<Tok, Out>
where
    M: TokenMatcher<Tok, Out> + 'static,
{
    Expr::Leaf(Arc::new(matcher))
}

/// `a` followed by `b`. Same as `a + b`.
pub fn concat<Tok, Out>(a: Expr<Tok, Out>, b: Expr<Tok, Out>) -> Expr<Tok, Out> {
    Expr::Concat(Box::new(a), Box::new(b))
}

/// `a` or `b`. Same as `a | b`.
pub fn alt<Tok, Out>(a: Expr<Tok, Out>, b: Expr<Tok, Out>) -> Expr<Tok, Out> {
    Expr::Alt(Box::new(a), Box::new(b))
}

/// Zero or one occurrence of `a`.
pub fn maybe<Tok, Out>(a: Expr<Tok, Out>) -> Expr<Tok, Out> {
    Expr::Maybe(Box::new(a))
}

/// Zero or more occurrences of `a`.
pub fn repeat<Tok, Out>(a: Expr<Tok, Out>) -> Expr<Tok, Out> {
    Expr::Repeat(Box::new(a))
}

/// Report everything matched by `a` under the group `name`.
///
/// Names must look like identifiers: an ASCII letter or `_`, followed by
/// ASCII letters, digits or `_`.
///
/// # Errors
///
/// [`PatternError::InvalidCaptureName`] for any other name.
pub fn capture<Tok, Out>(
    name: impl Into<String>,
    a: Expr<Tok, Out>,
) -> Result<Expr<Tok, Out>, PatternError> {
    let name = name.into();
    if !is_identifier(&name) {
        return Err(PatternError::InvalidCaptureName { name });
    }
    Ok(Expr::Capture {
        name,
        inner: Box::new(a),
    })
}

/// Exactly `n` occurrences of `a`, as an `n`-fold concatenation.
///
/// # Errors
///
/// [`PatternError::InvalidRepeatBound`] if `n` is zero.
pub fn times<Tok, Out>(a: Expr<Tok, Out>, n: usize) -> Result<Expr<Tok, Out>, PatternError> {
    if n == 0 {
        return Err(PatternError::InvalidRepeatBound {
            min: 0,
            max: Some(0),
        });
    }
    Ok(unroll(a, n))
}

/// Between `lo` and `hi` occurrences of `a` (both inclusive).
///
/// Lowered to `lo` mandatory copies followed by `hi - lo` optional copies.
///
/// # Errors
///
/// [`PatternError::InvalidRepeatBound`] if `hi < lo`, or if `lo == hi == 0`
/// (which would describe an empty pattern).
pub fn between<Tok, Out>(
    a: Expr<Tok, Out>,
    lo: usize,
    hi: usize,
) -> Result<Expr<Tok, Out>, PatternError> {
    let invalid = PatternError::InvalidRepeatBound {
        min: lo as i64,
        max: Some(hi as i64),
    };
    if hi < lo || hi == 0 {
        return Err(invalid);
    }
    let mandatory = std::iter::repeat(a.clone()).take(lo);
    let optional = std::iter::repeat(a).take(hi - lo).map(maybe);
    chain(mandatory.chain(optional)).ok_or(invalid)
}

/// `lo` or more occurrences of `a`. `at_least(a, 0)` is `repeat(a)`.
pub fn at_least<Tok, Out>(a: Expr<Tok, Out>, lo: usize) -> Expr<Tok, Out> {
    if lo == 0 {
        return repeat(a);
    }
    concat(unroll(a.clone(), lo), repeat(a))
}

/// Concatenate exact-match leaves for every token in `tokens`.
///
/// An empty sequence has no expression. Callers building from user data
/// should use [`try_seq`].
///
/// # Panics
///
/// Panics if `tokens` is empty.
pub fn seq<T, I>(tokens: I) -> Expr<T>
where
    I: IntoIterator<Item = T>,
    T: PartialEq + Clone + Send + Sync + Debug + 'static,
{
    match try_seq(tokens) {
        Some(expr) => expr,
        None => panic!("seq() needs at least one token"),
    }
}

/// Like [`seq`], but returns `None` for an empty sequence.
pub fn try_seq<T, I>(tokens: I) -> Option<Expr<T>>
where
    I: IntoIterator<Item = T>,
    T: PartialEq + Clone + Send + Sync + Debug + 'static,
{
    chain(tokens.into_iter().map(|t| leaf(ExactMatcher::new(t))))
}

/// Any number of arbitrary tokens (the `.*` of character regexes).
pub fn anything<T: Clone + 'static>() -> Expr<T> {
    repeat(leaf(AnyMatcher))
}

/// Left-fold a sequence of expressions with [`concat`].
fn chain<Tok, Out>(parts: impl IntoIterator<Item = Expr<Tok, Out>>) -> Option<Expr<Tok, Out>> {
    parts.into_iter().reduce(concat)
}

/// `n >= 1` copies of `a`, concatenated left to right.
fn unroll<Tok, Out>(a: Expr<Tok, Out>, n: usize) -> Expr<Tok, Out> {
    let mut expr = a.clone();
    for _ in 1..n {
        expr = concat(expr, a.clone());
    }
    expr
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
