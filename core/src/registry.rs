//! Type registry for config-driven pattern construction.
//!
//! The registry turns a [`PatternConfig`] tree into an [`Expr`] without
//! domain-specific loading code. Each matcher type registers itself via
//! [`IntoTokenMatcher`]; at registration time the concrete type `T` is
//! monomorphized into a closure and erased behind `Box<dyn Fn>`, so loading
//! only needs the `type_url` found in the config.
//!
//! Token types differ in how a literal is written down (a string of
//! characters, a list of words, ...). A [`LiteralParser`] registered on the
//! builder decides that for `literal` configs.
//!
//! # Example
//!
//! ```
//! use tokre::{register_char_matchers, PatternConfig, Program, RegistryBuilder};
//!
//! let registry = register_char_matchers(RegistryBuilder::new()).build();
//! let config: PatternConfig = serde_json::from_value(serde_json::json!({
//!     "type": "concat",
//!     "items": [
//!         { "type": "literal", "value": "id-" },
//!         { "type": "repeat", "min": 1, "pattern": {
//!             "type": "leaf",
//!             "matcher": { "type_url": "tokre.char.v1.Class", "config": { "class": "digit" } }
//!         } }
//!     ]
//! }))
//! .unwrap();
//!
//! let program = Program::compile(&registry.load_pattern(&config).unwrap());
//! assert!(program.is_match("id-42".chars()).unwrap());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::{
    alt, at_least, between, capture, concat,
    config::{
        ClassConfig, ExactConfig, PatternConfig, RangesConfig, RegexConfig, TypedConfig,
        UnitConfig, ValuesConfig,
    },
    leaf, maybe, repeat, try_seq, AnyMatcher, ClassMatcher, ExactMatcher, Expr, InSetMatcher,
    NotMatcher, PatternError, RangeMatcher, RegexMatcher, TokenMatcher, MAX_PATTERN_DEPTH,
    MAX_REPEAT_BOUND,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Traits
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait for matcher types that can be constructed from configuration.
///
/// Each matcher type knows its own config shape via the associated `Config`
/// type. The registry calls [`from_config`](Self::from_config) at load time.
///
/// # Example
///
/// ```
/// use serde::Deserialize;
/// use tokre::{IntoTokenMatcher, PatternError, TestMatcher, TokenMatcher};
///
/// #[derive(Deserialize)]
/// struct EvenConfig {}
///
/// struct Even;
///
/// impl IntoTokenMatcher<u32, u32> for Even {
///     type Config = EvenConfig;
///     fn from_config(_: EvenConfig) -> Result<Box<dyn TokenMatcher<u32, u32>>, PatternError> {
///         Ok(Box::new(TestMatcher::new("even", |n: &u32| n % 2 == 0)))
///     }
/// }
/// ```
pub trait IntoTokenMatcher<Tok, Out>: Send + Sync + 'static {
    /// The configuration type deserialized from JSON/YAML.
    type Config: DeserializeOwned + Send + Sync;

    /// Construct a matcher from deserialized configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidConfig`] if the config is semantically
    /// invalid, or [`PatternError::InvalidRegex`] if a regex does not compile.
    fn from_config(config: Self::Config)
        -> Result<Box<dyn TokenMatcher<Tok, Out>>, PatternError>;
}

/// Turns the `value` of a `literal` config into a token sequence.
pub type LiteralParser<Tok, Out> = fn(&serde_json::Value) -> Result<Expr<Tok, Out>, PatternError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Type-erased factories
// ═══════════════════════════════════════════════════════════════════════════════

/// Type-erased matcher factory closure.
type BoxedMatcherFactory<Tok, Out> = Box<
    dyn Fn(&serde_json::Value) -> Result<Box<dyn TokenMatcher<Tok, Out>>, PatternError>
        + Send
        + Sync,
>;

fn invalid_config(source: impl fmt::Display) -> PatternError {
    PatternError::InvalidConfig {
        source: source.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`Registry`].
///
/// Register matcher types with their type URLs and optionally a literal
/// parser, then call [`build()`](Self::build) to produce an immutable
/// `Registry`. No registration is possible after `build()`.
pub struct RegistryBuilder<Tok, Out = Tok> {
    matcher_factories: HashMap<String, BoxedMatcherFactory<Tok, Out>>,
    literals: Option<LiteralParser<Tok, Out>>,
}

impl<Tok: 'static, Out: 'static> RegistryBuilder<Tok, Out> {
    /// Create a new empty registry builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            matcher_factories: HashMap::new(),
            literals: None,
        }
    }

    /// Register a matcher type with a type URL.
    ///
    /// At load time the registry deserializes the config as `T::Config` and
    /// calls `T::from_config()`. Registering the same URL twice keeps the
    /// last registration.
    #[must_use]
    pub fn matcher<T: IntoTokenMatcher<Tok, Out>>(mut self, type_url: &str) -> Self {
        self.matcher_factories.insert(
            type_url.to_owned(),
            Box::new(|value: &serde_json::Value| {
                let config: T::Config =
                    serde_json::from_value(value.clone()).map_err(invalid_config)?;
                T::from_config(config)
            }),
        );
        self
    }

    /// Set the parser used for `literal` configs.
    #[must_use]
    pub fn literals(mut self, parser: LiteralParser<Tok, Out>) -> Self {
        self.literals = Some(parser);
        self
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> Registry<Tok, Out> {
        Registry {
            matcher_factories: self.matcher_factories,
            literals: self.literals,
        }
    }
}

impl<Tok: 'static, Out: 'static> Default for RegistryBuilder<Tok, Out> {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the matchers for `char` tokens.
///
/// | Type URL | Matcher | Config |
/// |----------|---------|--------|
/// | `tokre.char.v1.Eq` | [`ExactMatcher`] | `{ "value": "a" }` |
/// | `tokre.char.v1.In` | [`InSetMatcher`] | `{ "values": ["a", "b"] }` |
/// | `tokre.char.v1.Ranges` | [`RangeMatcher`] | `{ "ranges": [["a", "z"]] }` |
/// | `tokre.char.v1.Class` | [`ClassMatcher`] | `{ "class": "alnum" }` |
/// | `tokre.core.v1.Anything` | [`AnyMatcher`] | none |
///
/// Literals are JSON strings, one token per character.
#[must_use]
pub fn register_char_matchers(builder: RegistryBuilder<char>) -> RegistryBuilder<char> {
    builder
        .matcher::<ExactMatcher<char>>("tokre.char.v1.Eq")
        .matcher::<InSetMatcher<char>>("tokre.char.v1.In")
        .matcher::<RangeMatcher>("tokre.char.v1.Ranges")
        .matcher::<ClassMatcher>("tokre.char.v1.Class")
        .matcher::<AnyMatcher>("tokre.core.v1.Anything")
        .literals(char_literal)
}

/// Register the matchers for `String` tokens (words, log fields, ...).
///
/// | Type URL | Matcher | Config |
/// |----------|---------|--------|
/// | `tokre.string.v1.Exact` | [`ExactMatcher`] | `{ "value": "GET" }` |
/// | `tokre.string.v1.In` | [`InSetMatcher`] | `{ "values": ["GET", "HEAD"] }` |
/// | `tokre.string.v1.Regex` | [`RegexMatcher`] | `{ "pattern": "[0-9]+" }` |
/// | `tokre.core.v1.Anything` | [`AnyMatcher`] | none |
///
/// Literals are either a JSON array of strings or a single string split on
/// whitespace.
#[must_use]
pub fn register_string_matchers(builder: RegistryBuilder<String>) -> RegistryBuilder<String> {
    builder
        .matcher::<ExactMatcher<String>>("tokre.string.v1.Exact")
        .matcher::<InSetMatcher<String>>("tokre.string.v1.In")
        .matcher::<RegexMatcher>("tokre.string.v1.Regex")
        .matcher::<AnyMatcher>("tokre.core.v1.Anything")
        .literals(string_literal)
}

fn char_literal(value: &serde_json::Value) -> Result<Expr<char>, PatternError> {
    let text = value
        .as_str()
        .ok_or_else(|| invalid_config(format!("char literal must be a string, got {value}")))?;
    try_seq(text.chars()).ok_or_else(|| invalid_config("literal must not be empty"))
}

fn string_literal(value: &serde_json::Value) -> Result<Expr<String>, PatternError> {
    let words: Vec<String> = match value {
        serde_json::Value::String(text) => text.split_whitespace().map(str::to_owned).collect(),
        serde_json::Value::Array(_) => {
            serde_json::from_value(value.clone()).map_err(invalid_config)?
        }
        other => {
            return Err(invalid_config(format!(
                "word literal must be a string or an array of strings, got {other}"
            )))
        }
    };
    try_seq(words).ok_or_else(|| invalid_config("literal must not be empty"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Built-in factories
// ═══════════════════════════════════════════════════════════════════════════════

impl<T> IntoTokenMatcher<T, T> for ExactMatcher<T>
where
    T: DeserializeOwned + PartialEq + Clone + Send + Sync + fmt::Debug + 'static,
{
    type Config = ExactConfig<T>;

    fn from_config(config: Self::Config) -> Result<Box<dyn TokenMatcher<T, T>>, PatternError> {
        Ok(Box::new(ExactMatcher::new(config.value)))
    }
}

impl<T> IntoTokenMatcher<T, T> for InSetMatcher<T>
where
    T: DeserializeOwned + Hash + Eq + Clone + Send + Sync + fmt::Debug + 'static,
{
    type Config = ValuesConfig<T>;

    fn from_config(config: Self::Config) -> Result<Box<dyn TokenMatcher<T, T>>, PatternError> {
        if config.values.is_empty() {
            return Err(invalid_config("values must not be empty"));
        }
        Ok(Box::new(InSetMatcher::new(config.values)))
    }
}

impl IntoTokenMatcher<char, char> for RangeMatcher {
    type Config = RangesConfig;

    fn from_config(config: Self::Config) -> Result<Box<dyn TokenMatcher<char, char>>, PatternError> {
        if config.ranges.is_empty() {
            return Err(invalid_config("ranges must not be empty"));
        }
        if let Some((start, end)) = config.ranges.iter().find(|(start, end)| start > end) {
            return Err(invalid_config(format!(
                "range start {start:?} is after its end {end:?}"
            )));
        }
        Ok(Box::new(RangeMatcher::new(config.ranges)))
    }
}

impl IntoTokenMatcher<char, char> for ClassMatcher {
    type Config = ClassConfig;

    fn from_config(config: Self::Config) -> Result<Box<dyn TokenMatcher<char, char>>, PatternError> {
        Ok(Box::new(ClassMatcher::new(config.class)))
    }
}

impl IntoTokenMatcher<String, String> for RegexMatcher {
    type Config = RegexConfig;

    fn from_config(
        config: Self::Config,
    ) -> Result<Box<dyn TokenMatcher<String, String>>, PatternError> {
        Ok(Box::new(RegexMatcher::new(&config.pattern)?))
    }
}

impl<T> IntoTokenMatcher<T, T> for AnyMatcher
where
    T: Clone + 'static,
{
    type Config = UnitConfig;

    fn from_config(_: Self::Config) -> Result<Box<dyn TokenMatcher<T, T>>, PatternError> {
        Ok(Box::new(AnyMatcher))
    }
}

/// Accepts every token, converted into the output type. Backs `any` configs.
#[derive(Debug, Clone, Copy)]
struct AnyToken;

impl<Tok, Out> TokenMatcher<Tok, Out> for AnyToken
where
    Tok: Clone + Into<Out>,
{
    fn matches(&self, token: &Tok, out: &mut Vec<Out>) {
        out.push(token.clone().into());
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable registry of matcher factories.
///
/// Constructed via [`RegistryBuilder`]. Use [`load_pattern()`](Self::load_pattern)
/// to turn config into an [`Expr`].
pub struct Registry<Tok, Out = Tok> {
    matcher_factories: HashMap<String, BoxedMatcherFactory<Tok, Out>>,
    literals: Option<LiteralParser<Tok, Out>>,
}

impl<Tok, Out> Registry<Tok, Out>
where
    Tok: Clone + Into<Out> + 'static,
    Out: 'static,
{
    /// Load an expression from configuration.
    ///
    /// Walks the config tree, constructs matchers via registered factories and
    /// assembles them with the expression algebra.
    ///
    /// # Errors
    ///
    /// - [`PatternError::UnknownTypeUrl`]: matcher `type_url` not registered
    /// - [`PatternError::InvalidConfig`]: config deserialization or construction
    ///   failed, an empty `concat`/`alt`, or a `literal` without a literal parser
    /// - [`PatternError::InvalidRegex`]: a regex matcher does not compile
    /// - [`PatternError::InvalidCaptureName`]: a capture name is not identifier-like
    /// - [`PatternError::InvalidRepeatBound`]: negative or inverted `repeat` bounds
    /// - [`PatternError::RepeatTooLarge`]: a bound above [`MAX_REPEAT_BOUND`]
    /// - [`PatternError::DepthExceeded`]: nesting deeper than [`MAX_PATTERN_DEPTH`]
    pub fn load_pattern(&self, config: &PatternConfig) -> Result<Expr<Tok, Out>, PatternError> {
        self.load_at(config, 1)
    }

    fn load_at(&self, config: &PatternConfig, depth: usize) -> Result<Expr<Tok, Out>, PatternError> {
        if depth > MAX_PATTERN_DEPTH {
            return Err(PatternError::DepthExceeded {
                depth,
                max: MAX_PATTERN_DEPTH,
            });
        }
        match config {
            PatternConfig::Leaf { matcher, negate } => {
                let matcher = self.load_matcher(matcher)?;
                if *negate {
                    Ok(leaf(NotMatcher::new(matcher)))
                } else {
                    Ok(Expr::Leaf(Arc::from(matcher)))
                }
            }
            PatternConfig::Literal { value } => {
                let parse = self.literals.ok_or_else(|| {
                    invalid_config("no literal parser is registered for this token type")
                })?;
                parse(value)
            }
            PatternConfig::Any => Ok(leaf(AnyToken)),
            PatternConfig::Concat { items } => self.load_items(items, depth, "concat", concat),
            PatternConfig::Alt { items } => self.load_items(items, depth, "alt", alt),
            PatternConfig::Maybe { pattern } => Ok(maybe(self.load_at(pattern, depth + 1)?)),
            PatternConfig::Repeat { pattern, min, max } => {
                let (min, max) = Self::check_bounds(*min, *max)?;
                let inner = self.load_at(pattern, depth + 1)?;
                match (min, max) {
                    (0, None) => Ok(repeat(inner)),
                    (lo, None) => Ok(at_least(inner, lo)),
                    (lo, Some(hi)) => between(inner, lo, hi),
                }
            }
            PatternConfig::Capture { name, pattern } => {
                capture(name.as_str(), self.load_at(pattern, depth + 1)?)
            }
        }
    }

    fn load_items(
        &self,
        items: &[PatternConfig],
        depth: usize,
        kind: &str,
        combine: fn(Expr<Tok, Out>, Expr<Tok, Out>) -> Expr<Tok, Out>,
    ) -> Result<Expr<Tok, Out>, PatternError> {
        let mut loaded = items.iter().map(|item| self.load_at(item, depth + 1));
        let first = loaded
            .next()
            .ok_or_else(|| invalid_config(format!("{kind} needs at least one item")))??;
        loaded.try_fold(first, |acc, next| Ok(combine(acc, next?)))
    }

    /// Validate `repeat` bounds and convert them to counts.
    fn check_bounds(
        min: Option<i64>,
        max: Option<i64>,
    ) -> Result<(usize, Option<usize>), PatternError> {
        let invalid = PatternError::InvalidRepeatBound {
            min: min.unwrap_or(0),
            max,
        };
        let to_count = |bound: i64| -> Result<usize, PatternError> {
            let count = usize::try_from(bound).map_err(|_| invalid.clone())?;
            if count > MAX_REPEAT_BOUND {
                return Err(PatternError::RepeatTooLarge {
                    bound: count,
                    max: MAX_REPEAT_BOUND,
                });
            }
            Ok(count)
        };
        let lo = min.map(to_count).transpose()?.unwrap_or(0);
        let hi = max.map(to_count).transpose()?;
        Ok((lo, hi))
    }
}

impl<Tok: 'static, Out: 'static> Registry<Tok, Out> {
    fn load_matcher(
        &self,
        config: &TypedConfig,
    ) -> Result<Box<dyn TokenMatcher<Tok, Out>>, PatternError> {
        let factory = self.matcher_factories.get(&config.type_url).ok_or_else(|| {
            PatternError::UnknownTypeUrl {
                type_url: config.type_url.clone(),
                available: self.type_urls().into_iter().map(str::to_owned).collect(),
            }
        })?;
        factory(&config.config)
    }

    /// Returns the number of registered matcher types.
    #[must_use]
    pub fn matcher_count(&self) -> usize {
        self.matcher_factories.len()
    }

    /// Returns `true` if no matcher types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matcher_factories.is_empty()
    }

    /// Returns `true` if the given matcher type URL is registered.
    #[must_use]
    pub fn contains(&self, type_url: &str) -> bool {
        self.matcher_factories.contains_key(type_url)
    }

    /// Returns `true` if `literal` configs can be loaded.
    #[must_use]
    pub fn has_literals(&self) -> bool {
        self.literals.is_some()
    }

    /// Returns all registered matcher type URLs (sorted).
    #[must_use]
    pub fn type_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.matcher_factories.keys().map(String::as_str).collect();
        urls.sort_unstable();
        urls
    }
}

impl<Tok: 'static, Out: 'static> fmt::Debug for Registry<Tok, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("type_urls", &self.type_urls())
            .field("literals", &self.has_literals())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Program;

    fn chars() -> Registry<char> {
        register_char_matchers(RegistryBuilder::new()).build()
    }

    fn load(registry: &Registry<char>, json: serde_json::Value) -> Result<Expr<char>, PatternError> {
        let config: PatternConfig = serde_json::from_value(json).unwrap();
        registry.load_pattern(&config)
    }

    fn count(expr: &Expr<char>, input: &str) -> usize {
        Program::compile(expr).matches(input.chars()).unwrap().len()
    }

    #[test]
    fn builder_registers_and_freezes() {
        let registry = chars();
        assert_eq!(registry.matcher_count(), 5);
        assert!(registry.contains("tokre.char.v1.Class"));
        assert!(registry.has_literals());
        assert!(!registry.is_empty());
    }

    #[test]
    fn empty_registry() {
        let registry: Registry<char> = RegistryBuilder::new().build();
        assert!(registry.is_empty());
        assert!(!registry.has_literals());
        let err = load(&registry, serde_json::json!({ "type": "literal", "value": "a" }))
            .unwrap_err();
        assert!(matches!(err, PatternError::InvalidConfig { .. }));
    }

    #[test]
    fn introspection_type_urls_sorted() {
        let registry = chars();
        assert_eq!(
            registry.type_urls(),
            vec![
                "tokre.char.v1.Class",
                "tokre.char.v1.Eq",
                "tokre.char.v1.In",
                "tokre.char.v1.Ranges",
                "tokre.core.v1.Anything",
            ]
        );
    }

    #[test]
    fn load_literal_and_leaf() {
        let expr = load(
            &chars(),
            serde_json::json!({
                "type": "concat",
                "items": [
                    { "type": "literal", "value": "say " },
                    { "type": "capture", "name": "what", "pattern": {
                        "type": "repeat", "min": 1, "pattern": { "type": "any" }
                    } }
                ]
            }),
        )
        .unwrap();
        let found = Program::compile(&expr)
            .matches_joined("say hello".chars())
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["what"].trail(), "hello");
    }

    #[test]
    fn load_each_char_matcher() {
        let registry = chars();
        let leaf_of = |type_url: &str, config: serde_json::Value| {
            serde_json::json!({
                "type": "leaf",
                "matcher": { "type_url": type_url, "config": config }
            })
        };

        let eq = load(&registry, leaf_of("tokre.char.v1.Eq", serde_json::json!({ "value": "x" })))
            .unwrap();
        assert_eq!(count(&eq, "x"), 1);
        assert_eq!(count(&eq, "y"), 0);

        let within = load(
            &registry,
            leaf_of("tokre.char.v1.In", serde_json::json!({ "values": ["+", "."] })),
        )
        .unwrap();
        assert_eq!(count(&within, "."), 1);
        assert_eq!(count(&within, "-"), 0);

        let ranges = load(
            &registry,
            leaf_of(
                "tokre.char.v1.Ranges",
                serde_json::json!({ "ranges": [["a", "f"], ["0", "9"]] }),
            ),
        )
        .unwrap();
        assert_eq!(count(&ranges, "c"), 1);
        assert_eq!(count(&ranges, "g"), 0);

        let class = load(
            &registry,
            leaf_of("tokre.char.v1.Class", serde_json::json!({ "class": "upper" })),
        )
        .unwrap();
        assert_eq!(count(&class, "Q"), 1);
        assert_eq!(count(&class, "q"), 0);

        let any = load(&registry, leaf_of("tokre.core.v1.Anything", serde_json::Value::Null))
            .unwrap();
        assert_eq!(count(&any, "?"), 1);
    }

    #[test]
    fn negated_leaf() {
        let expr = load(
            &chars(),
            serde_json::json!({
                "type": "repeat",
                "min": 1,
                "pattern": {
                    "type": "leaf",
                    "negate": true,
                    "matcher": { "type_url": "tokre.char.v1.In", "config": { "values": ["'", ">"] } }
                }
            }),
        )
        .unwrap();
        assert_eq!(count(&expr, "abc"), 1);
        assert_eq!(count(&expr, "a>c"), 0);
    }

    #[test]
    fn repeat_bounds() {
        let registry = chars();
        let repeat_a = |min: Option<i64>, max: Option<i64>| {
            let mut json = serde_json::json!({
                "type": "repeat",
                "pattern": { "type": "literal", "value": "a" }
            });
            if let Some(min) = min {
                json["min"] = min.into();
            }
            if let Some(max) = max {
                json["max"] = max.into();
            }
            load(&registry, json)
        };

        let unbounded = repeat_a(None, None).unwrap();
        assert_eq!(count(&unbounded, "aaaa"), 1);

        let two_or_more = repeat_a(Some(2), None).unwrap();
        assert_eq!(count(&two_or_more, "a"), 0);
        assert_eq!(count(&two_or_more, "aaa"), 1);

        let up_to_two = repeat_a(None, Some(2)).unwrap();
        assert!(count(&up_to_two, "aa") >= 1);
        assert_eq!(count(&up_to_two, "aaa"), 0);

        let exactly_three = repeat_a(Some(3), Some(3)).unwrap();
        assert_eq!(count(&exactly_three, "aaa"), 1);
        assert_eq!(count(&exactly_three, "aa"), 0);
    }

    #[test]
    fn invalid_repeat_bounds() {
        let registry = chars();
        let err = load(
            &registry,
            serde_json::json!({ "type": "repeat", "min": -1, "pattern": { "type": "any" } }),
        )
        .unwrap_err();
        assert_eq!(err, PatternError::InvalidRepeatBound { min: -1, max: None });

        let err = load(
            &registry,
            serde_json::json!({ "type": "repeat", "min": 3, "max": 2, "pattern": { "type": "any" } }),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PatternError::InvalidRepeatBound {
                min: 3,
                max: Some(2)
            }
        );

        let err = load(
            &registry,
            serde_json::json!({ "type": "repeat", "max": 0, "pattern": { "type": "any" } }),
        )
        .unwrap_err();
        assert!(matches!(err, PatternError::InvalidRepeatBound { .. }));
    }

    #[test]
    fn repeat_bound_too_large() {
        let err = load(
            &chars(),
            serde_json::json!({ "type": "repeat", "max": 100_000, "pattern": { "type": "any" } }),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PatternError::RepeatTooLarge {
                bound: 100_000,
                max: MAX_REPEAT_BOUND
            }
        );
    }

    #[test]
    fn unknown_type_url_lists_available() {
        let err = load(
            &chars(),
            serde_json::json!({ "type": "leaf", "matcher": { "type_url": "tokre.char.v1.Nope" } }),
        )
        .unwrap_err();
        match err {
            PatternError::UnknownTypeUrl {
                type_url,
                available,
            } => {
                assert_eq!(type_url, "tokre.char.v1.Nope");
                assert_eq!(available.len(), 5);
                assert!(available.contains(&"tokre.char.v1.Eq".to_owned()));
            }
            other => panic!("expected UnknownTypeUrl, got {other:?}"),
        }
    }

    #[test]
    fn invalid_config_returns_error() {
        let registry = chars();
        let err = load(
            &registry,
            serde_json::json!({
                "type": "leaf",
                "matcher": { "type_url": "tokre.char.v1.Eq", "config": { "value": 42 } }
            }),
        )
        .unwrap_err();
        assert!(matches!(err, PatternError::InvalidConfig { .. }));

        let err = load(
            &registry,
            serde_json::json!({
                "type": "leaf",
                "matcher": { "type_url": "tokre.char.v1.Ranges", "config": { "ranges": [["z", "a"]] } }
            }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("after its end"));

        let err = load(&registry, serde_json::json!({ "type": "alt", "items": [] })).unwrap_err();
        assert!(err.to_string().contains("alt needs at least one item"));

        let err = load(&registry, serde_json::json!({ "type": "literal", "value": "" }))
            .unwrap_err();
        assert!(matches!(err, PatternError::InvalidConfig { .. }));
    }

    #[test]
    fn invalid_capture_name() {
        let err = load(
            &chars(),
            serde_json::json!({ "type": "capture", "name": "1st", "pattern": { "type": "any" } }),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PatternError::InvalidCaptureName {
                name: "1st".into()
            }
        );
    }

    #[test]
    fn depth_exceeded() {
        let mut json = serde_json::json!({ "type": "any" });
        for _ in 0..MAX_PATTERN_DEPTH {
            json = serde_json::json!({ "type": "maybe", "pattern": json });
        }
        let err = load(&chars(), json).unwrap_err();
        assert_eq!(
            err,
            PatternError::DepthExceeded {
                depth: MAX_PATTERN_DEPTH + 1,
                max: MAX_PATTERN_DEPTH
            }
        );
    }

    #[test]
    fn depth_at_limit_succeeds() {
        let mut json = serde_json::json!({ "type": "any" });
        for _ in 1..MAX_PATTERN_DEPTH {
            json = serde_json::json!({ "type": "maybe", "pattern": json });
        }
        assert!(load(&chars(), json).is_ok());
    }

    #[test]
    fn string_registry_words() {
        let registry = register_string_matchers(RegistryBuilder::new()).build();
        let config: PatternConfig = serde_json::from_value(serde_json::json!({
            "type": "concat",
            "items": [
                { "type": "literal", "value": "I like" },
                { "type": "capture", "name": "food", "pattern": {
                    "type": "leaf",
                    "matcher": { "type_url": "tokre.string.v1.Regex", "config": { "pattern": "[a-z]+s" } }
                } }
            ]
        }))
        .unwrap();
        let expr = registry.load_pattern(&config).unwrap();
        let words: Vec<String> = "I like sausages".split(' ').map(str::to_owned).collect();
        let found = Program::compile(&expr).matches(words).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["food"].trail(), &vec!["sausages".to_owned()]);
    }

    #[test]
    fn string_literal_shapes() {
        let array = string_literal(&serde_json::json!(["a", "b"])).unwrap();
        assert_eq!(array.leaf_count(), 2);
        let split = string_literal(&serde_json::json!("a  b c")).unwrap();
        assert_eq!(split.leaf_count(), 3);
        assert!(string_literal(&serde_json::json!(7)).is_err());
        assert!(string_literal(&serde_json::json!([])).is_err());
    }

    #[test]
    fn invalid_regex_surfaces() {
        let registry = register_string_matchers(RegistryBuilder::new()).build();
        let config: PatternConfig = serde_json::from_value(serde_json::json!({
            "type": "leaf",
            "matcher": { "type_url": "tokre.string.v1.Regex", "config": { "pattern": "(" } }
        }))
        .unwrap();
        let err = registry.load_pattern(&config).unwrap_err();
        assert!(matches!(err, PatternError::InvalidRegex { .. }));
    }

    #[test]
    fn debug_lists_type_urls() {
        let debug = format!("{:?}", chars());
        assert!(debug.contains("tokre.char.v1.Eq"));
        assert!(debug.contains("literals: true"));
    }
}
