//! Config types for building patterns from data.
//!
//! These types mirror the expression algebra but are serde-deserializable,
//! so a pattern can live in a JSON or YAML file and be turned into an
//! [`Expr`](crate::Expr) by [`Registry::load_pattern()`](crate::Registry::load_pattern).
//!
//! # Relationship to runtime types
//!
//! | Config variant | Runtime expression |
//! |----------------|--------------------|
//! | `leaf` | [`leaf`](crate::leaf) over a registered matcher, optionally negated |
//! | `literal` | token sequence from the registry's literal parser |
//! | `any` | a single arbitrary token |
//! | `concat` / `alt` | left-folded [`concat`](crate::concat) / [`alt`](crate::alt) |
//! | `maybe` | [`maybe`](crate::maybe) |
//! | `repeat` | [`repeat`](crate::repeat), [`at_least`](crate::at_least) or [`between`](crate::between) |
//! | `capture` | [`capture`](crate::capture) |
//! | [`TypedConfig`] | `Box<dyn TokenMatcher<Tok, Out>>` via registry factory |

use serde::Deserialize;

use crate::CharClass;

/// Configuration for a pattern.
///
/// Uses `#[serde(tag = "type")]` for discriminated union deserialization:
///
/// ```json
/// { "type": "literal", "value": "hello" }
/// { "type": "leaf", "matcher": { "type_url": "tokre.char.v1.Class", "config": { "class": "digit" } } }
/// { "type": "repeat", "min": 1, "pattern": { "type": "any" } }
/// { "type": "capture", "name": "word", "pattern": { ... } }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternConfig {
    /// One token accepted by a registered matcher.
    Leaf {
        /// The matcher, resolved through the registry's `type_url` lookup.
        matcher: TypedConfig,
        /// Accept exactly the tokens the matcher rejects.
        #[serde(default)]
        negate: bool,
    },

    /// A literal token sequence, parsed by the registry's literal parser.
    Literal {
        /// The literal, in whatever shape the parser expects.
        value: serde_json::Value,
    },

    /// Any single token.
    Any,

    /// Every item in order.
    Concat {
        /// Items to concatenate (at least one).
        items: Vec<PatternConfig>,
    },

    /// Any one of the items.
    Alt {
        /// Alternatives (at least one).
        items: Vec<PatternConfig>,
    },

    /// Zero or one occurrence.
    Maybe {
        /// The optional pattern.
        pattern: Box<PatternConfig>,
    },

    /// Repetition, unbounded unless `max` is set.
    Repeat {
        /// The repeated pattern.
        pattern: Box<PatternConfig>,
        /// Minimum count (default 0).
        #[serde(default)]
        min: Option<i64>,
        /// Maximum count (default unbounded).
        #[serde(default)]
        max: Option<i64>,
    },

    /// A named group.
    Capture {
        /// Group name, identifier-like.
        name: String,
        /// The captured pattern.
        pattern: Box<PatternConfig>,
    },
}

impl PatternConfig {
    /// Nesting depth of this config (a lone leaf has depth 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } | Self::Literal { .. } | Self::Any => 1,
            Self::Concat { items } | Self::Alt { items } => {
                1 + items.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Maybe { pattern }
            | Self::Repeat { pattern, .. }
            | Self::Capture { pattern, .. } => 1 + pattern.depth(),
        }
    }
}

/// Reference to a registered matcher type with its configuration.
///
/// - `type_url` identifies the registered type
/// - `config` carries the type-specific configuration payload
#[derive(Debug, Clone, Deserialize)]
pub struct TypedConfig {
    /// The type URL identifying the registered matcher type.
    /// Must match a `type_url` registered in the [`Registry`](crate::Registry).
    pub type_url: String,

    /// Type-specific configuration payload.
    /// Deserialized as the `Config` associated type of the registered
    /// [`IntoTokenMatcher`](crate::IntoTokenMatcher).
    #[serde(default = "default_config")]
    pub config: serde_json::Value,
}

fn default_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Empty configuration for matchers that need none.
///
/// Accepts any JSON value (`{}`, `null`, etc.) and ignores it.
#[derive(Debug, Clone, Copy)]
pub struct UnitConfig;

impl<'de> Deserialize<'de> for UnitConfig {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(UnitConfig)
    }
}

/// Config for [`ExactMatcher`](crate::ExactMatcher): `{ "value": ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExactConfig<T> {
    /// The token to match.
    pub value: T,
}

/// Config for [`InSetMatcher`](crate::InSetMatcher): `{ "values": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValuesConfig<T> {
    /// Accepted tokens.
    pub values: Vec<T>,
}

/// Config for [`RangeMatcher`](crate::RangeMatcher): `{ "ranges": [["a", "z"], ...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct RangesConfig {
    /// Inclusive `(start, end)` pairs.
    pub ranges: Vec<(char, char)>,
}

/// Config for [`ClassMatcher`](crate::ClassMatcher): `{ "class": "digit" }`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ClassConfig {
    /// The character class.
    pub class: CharClass,
}

/// Config for [`RegexMatcher`](crate::RegexMatcher): `{ "pattern": "..." }`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegexConfig {
    /// Whole-token regex.
    pub pattern: String,
}
