//! `TokenMatcher`: predicates over a single input token
//!
//! A `TokenMatcher` decides whether one token is accepted and, if so, which
//! output value(s) it contributes to the trail. Returning zero outputs rejects
//! the token; returning more than one forks the match into separate branches.
//!
//! # Available Matchers
//!
//! - [`ExactMatcher`]: Token equality
//! - [`InListMatcher`] / [`InSetMatcher`]: Membership
//! - [`OutOfMatcher`]: Container holds a value, outputs the value (projection)
//! - [`KeyValueMatcher`]: Map token has `key == value`
//! - [`AttributeMatcher`]: Projected attribute equals a value
//! - [`AnyMatcher`]: Accepts everything
//! - [`RangeMatcher`] / [`ClassMatcher`]: Character ranges and classes
//! - [`TestMatcher`]: Arbitrary boolean test
//! - [`NotMatcher`]: Negation of another matcher
//! - [`RegexMatcher`]: Whole-token regex for string tokens

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{self, Debug};
use std::hash::{BuildHasher, Hash};
use std::str::FromStr;
use std::sync::Arc;

use crate::PatternError;

/// Decides whether a token is accepted, and what it outputs.
///
/// Implementations push zero or more outputs into `out`. Zero means the token
/// is rejected. The output type may differ from the token type: a matcher can
/// project a token into something else (see [`OutOfMatcher`]).
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so that a compiled
/// [`Program`](crate::Program) can be shared across threads.
///
/// # Example
///
/// ```
/// use tokre::{ExactMatcher, TokenMatcher};
///
/// let matcher = ExactMatcher::new('a');
/// assert_eq!(matcher.outputs(&'a'), vec!['a']);
/// assert!(matcher.outputs(&'b').is_empty());
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `TokenMatcher<{Tok}, {Out}>`",
    label = "this type cannot match `{Tok}` tokens into `{Out}` outputs",
    note = "implement `matches(&self, token: &{Tok}, out: &mut Vec<{Out}>)` or use a built-in matcher"
)]
pub trait TokenMatcher<Tok, Out>: Send + Sync + Debug {
    /// Push the outputs produced by `token` into `out`.
    fn matches(&self, token: &Tok, out: &mut Vec<Out>);

    /// Collect the outputs produced by `token`.
    fn outputs(&self, token: &Tok) -> Vec<Out> {
        let mut out = Vec::new();
        self.matches(token, &mut out);
        out
    }
}

#[diagnostic::do_not_recommend]
impl<Tok, Out> TokenMatcher<Tok, Out> for Box<dyn TokenMatcher<Tok, Out>> {
    fn matches(&self, token: &Tok, out: &mut Vec<Out>) {
        (**self).matches(token, out);
    }
}

#[diagnostic::do_not_recommend]
impl<Tok, Out> TokenMatcher<Tok, Out> for Arc<dyn TokenMatcher<Tok, Out>> {
    fn matches(&self, token: &Tok, out: &mut Vec<Out>) {
        (**self).matches(token, out);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Equality & Membership
// ═══════════════════════════════════════════════════════════════════════════════

/// Token equality matcher. Outputs the token itself.
///
/// ```
/// use tokre::{ExactMatcher, TokenMatcher};
///
/// let matcher = ExactMatcher::new(String::from("GET"));
/// assert_eq!(matcher.outputs(&"GET".to_string()).len(), 1);
/// assert!(matcher.outputs(&"get".to_string()).is_empty()); // case-sensitive
/// ```
#[derive(Debug, Clone)]
pub struct ExactMatcher<T> {
    expected: T,
}

impl<T> ExactMatcher<T> {
    /// Create a new exact matcher.
    pub fn new(expected: T) -> Self {
        Self { expected }
    }

    /// Returns the expected token.
    #[must_use]
    pub fn expected(&self) -> &T {
        &self.expected
    }
}

impl<T> TokenMatcher<T, T> for ExactMatcher<T>
where
    T: PartialEq + Clone + Send + Sync + Debug,
{
    fn matches(&self, token: &T, out: &mut Vec<T>) {
        if *token == self.expected {
            out.push(token.clone());
        }
    }
}

/// Membership in a list (only `PartialEq` required).
#[derive(Debug, Clone)]
pub struct InListMatcher<T> {
    values: Vec<T>,
}

impl<T> InListMatcher<T> {
    /// Create a list membership matcher.
    pub fn new(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl<T> TokenMatcher<T, T> for InListMatcher<T>
where
    T: PartialEq + Clone + Send + Sync + Debug,
{
    fn matches(&self, token: &T, out: &mut Vec<T>) {
        if self.values.contains(token) {
            out.push(token.clone());
        }
    }
}

/// Membership in a hash set. Faster than [`InListMatcher`] for large sets,
/// but requires `Hash + Eq` tokens.
///
/// ```
/// use tokre::{InSetMatcher, TokenMatcher};
///
/// let matcher = InSetMatcher::new(['+', '-', '.']);
/// assert_eq!(matcher.outputs(&'-'), vec!['-']);
/// assert!(matcher.outputs(&'x').is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct InSetMatcher<T, S = std::collections::hash_map::RandomState> {
    values: HashSet<T, S>,
}

impl<T: Hash + Eq> InSetMatcher<T> {
    /// Create a set membership matcher.
    pub fn new(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl<T, S> InSetMatcher<T, S> {
    /// Wrap an existing set, keeping its hasher.
    pub fn from_set(values: HashSet<T, S>) -> Self {
        Self { values }
    }
}

impl<T, S> TokenMatcher<T, T> for InSetMatcher<T, S>
where
    T: Hash + Eq + Clone + Send + Sync + Debug,
    S: BuildHasher + Send + Sync + Debug,
{
    fn matches(&self, token: &T, out: &mut Vec<T>) {
        if self.values.contains(token) {
            out.push(token.clone());
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Projecting Matchers
// ═══════════════════════════════════════════════════════════════════════════════

/// Matches a container token holding `value`, and outputs `value` itself.
///
/// This is the canonical "transforming" matcher: the token type is a
/// collection, the output type is its element type.
///
/// ```
/// use tokre::{OutOfMatcher, TokenMatcher};
///
/// let matcher = OutOfMatcher::new('o');
/// assert_eq!(matcher.outputs(&['o', 'a']), vec!['o']);
/// assert!(matcher.outputs(&['b', 'a']).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct OutOfMatcher<T> {
    value: T,
}

impl<T> OutOfMatcher<T> {
    /// Create a matcher that looks for `value` inside container tokens.
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<C, T> TokenMatcher<C, T> for OutOfMatcher<T>
where
    for<'a> &'a C: IntoIterator<Item = &'a T>,
    T: PartialEq + Clone + Send + Sync + Debug,
{
    fn matches(&self, token: &C, out: &mut Vec<T>) {
        if token.into_iter().any(|item| *item == self.value) {
            out.push(self.value.clone());
        }
    }
}

/// Keyed lookup used by [`KeyValueMatcher`].
pub trait KeyedToken<K, V> {
    /// Returns the value stored under `key`, if any.
    fn value_of(&self, key: &K) -> Option<&V>;
}

impl<K: Hash + Eq, V, S: BuildHasher> KeyedToken<K, V> for HashMap<K, V, S> {
    fn value_of(&self, key: &K) -> Option<&V> {
        self.get(key)
    }
}

impl<K: Ord, V> KeyedToken<K, V> for BTreeMap<K, V> {
    fn value_of(&self, key: &K) -> Option<&V> {
        self.get(key)
    }
}

/// Matches map tokens whose `key` holds `value`. Outputs the token.
///
/// ```
/// use std::collections::HashMap;
/// use tokre::{KeyValueMatcher, TokenMatcher};
///
/// let matcher = KeyValueMatcher::new("kind", "verb");
/// let token: HashMap<&str, &str> = [("kind", "verb"), ("text", "run")].into();
/// assert_eq!(matcher.outputs(&token).len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct KeyValueMatcher<K, V> {
    key: K,
    value: V,
}

impl<K, V> KeyValueMatcher<K, V> {
    /// Create a key/value matcher.
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

impl<Tok, K, V> TokenMatcher<Tok, Tok> for KeyValueMatcher<K, V>
where
    Tok: KeyedToken<K, V> + Clone,
    K: Send + Sync + Debug,
    V: PartialEq + Send + Sync + Debug,
{
    fn matches(&self, token: &Tok, out: &mut Vec<Tok>) {
        if token.value_of(&self.key) == Some(&self.value) {
            out.push(token.clone());
        }
    }
}

/// Matches tokens whose projected attribute equals `expected`.
///
/// The projection returns `None` when the token has no such attribute,
/// which rejects the token.
///
/// ```
/// use tokre::{AttributeMatcher, TokenMatcher};
///
/// #[derive(Debug, Clone)]
/// struct Word { tag: &'static str }
///
/// fn tag(word: &Word) -> Option<&&'static str> { Some(&word.tag) }
///
/// let matcher = AttributeMatcher::new("tag", tag, "NOUN");
/// assert_eq!(matcher.outputs(&Word { tag: "NOUN" }).len(), 1);
/// assert!(matcher.outputs(&Word { tag: "VERB" }).is_empty());
/// ```
pub struct AttributeMatcher<Tok, V> {
    name: &'static str,
    project: fn(&Tok) -> Option<&V>,
    expected: V,
}

impl<Tok, V> AttributeMatcher<Tok, V> {
    /// Create an attribute matcher. `name` is only used for `Debug` output.
    pub fn new(name: &'static str, project: fn(&Tok) -> Option<&V>, expected: V) -> Self {
        Self {
            name,
            project,
            expected,
        }
    }
}

impl<Tok, V: Debug> Debug for AttributeMatcher<Tok, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeMatcher")
            .field("name", &self.name)
            .field("expected", &self.expected)
            .finish()
    }
}

impl<Tok, V> TokenMatcher<Tok, Tok> for AttributeMatcher<Tok, V>
where
    Tok: Clone,
    V: PartialEq + Send + Sync + Debug,
{
    fn matches(&self, token: &Tok, out: &mut Vec<Tok>) {
        if (self.project)(token) == Some(&self.expected) {
            out.push(token.clone());
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Catch-all, Tests, Negation
// ═══════════════════════════════════════════════════════════════════════════════

/// Accepts every token as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyMatcher;

impl<T: Clone> TokenMatcher<T, T> for AnyMatcher {
    fn matches(&self, token: &T, out: &mut Vec<T>) {
        out.push(token.clone());
    }
}

/// Runs an arbitrary test and accepts the token as-is when it passes.
///
/// ```
/// use tokre::{TestMatcher, TokenMatcher};
///
/// let even = TestMatcher::new("even", |n: &u32| n % 2 == 0);
/// assert_eq!(even.outputs(&4), vec![4]);
/// assert!(even.outputs(&3).is_empty());
/// ```
pub struct TestMatcher<F> {
    name: &'static str,
    test: F,
}

impl<F> TestMatcher<F> {
    /// Create a test matcher. `name` is only used for `Debug` output.
    pub fn new(name: &'static str, test: F) -> Self {
        Self { name, test }
    }
}

impl<F> Debug for TestMatcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TestMatcher").field(&self.name).finish()
    }
}

impl<T, F> TokenMatcher<T, T> for TestMatcher<F>
where
    T: Clone,
    F: Fn(&T) -> bool + Send + Sync,
{
    fn matches(&self, token: &T, out: &mut Vec<T>) {
        if (self.test)(token) {
            out.push(token.clone());
        }
    }
}

/// Negates another matcher: the token is accepted as-is exactly when the
/// inner matcher produces no output.
///
/// ```
/// use tokre::{InSetMatcher, NotMatcher, TokenMatcher};
///
/// let not_quote = NotMatcher::new(InSetMatcher::new(['\'', '>']));
/// assert_eq!(not_quote.outputs(&'a'), vec!['a']);
/// assert!(not_quote.outputs(&'>').is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct NotMatcher<M> {
    inner: M,
}

impl<M> NotMatcher<M> {
    /// Wrap `inner` in a negation.
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<Tok, Out, M> TokenMatcher<Tok, Out> for NotMatcher<M>
where
    M: TokenMatcher<Tok, Out>,
    Tok: Clone + Into<Out>,
{
    fn matches(&self, token: &Tok, out: &mut Vec<Out>) {
        if self.inner.outputs(token).is_empty() {
            out.push(token.clone().into());
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Character Matchers
// ═══════════════════════════════════════════════════════════════════════════════

/// Matches characters inside any of a set of inclusive ranges.
///
/// One output is produced per range containing the character, so
/// overlapping ranges fork the match.
///
/// ```
/// use tokre::{RangeMatcher, TokenMatcher};
///
/// let letters = RangeMatcher::new([('a', 'z'), ('A', 'Z')]);
/// assert_eq!(letters.outputs(&'Q'), vec!['Q']);
/// assert!(letters.outputs(&'9').is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct RangeMatcher {
    ranges: Vec<(char, char)>,
}

impl RangeMatcher {
    /// Create a range matcher from `(start, end)` pairs, both inclusive.
    pub fn new(ranges: impl IntoIterator<Item = (char, char)>) -> Self {
        Self {
            ranges: ranges.into_iter().collect(),
        }
    }

    /// Returns the configured ranges.
    #[must_use]
    pub fn ranges(&self) -> &[(char, char)] {
        &self.ranges
    }
}

impl TokenMatcher<char, char> for RangeMatcher {
    fn matches(&self, token: &char, out: &mut Vec<char>) {
        for &(start, end) in &self.ranges {
            if (start..=end).contains(token) {
                out.push(*token);
            }
        }
    }
}

/// Named character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CharClass {
    /// Unicode alphabetic.
    Alpha,
    /// Unicode alphanumeric.
    Alnum,
    /// ASCII `0-9`.
    Digit,
    /// Unicode numeric.
    Numeric,
    /// Unicode whitespace.
    Space,
    /// Unicode lowercase letter.
    Lower,
    /// Unicode uppercase letter.
    Upper,
    /// Anything that is not a control character.
    Printable,
    /// `0-9`, `a-f`, `A-F`.
    HexDigit,
    /// ASCII letter.
    AsciiAlpha,
    /// ASCII letter or digit.
    AsciiAlnum,
    /// ASCII lowercase letter.
    AsciiLower,
    /// ASCII uppercase letter.
    AsciiUpper,
    /// ASCII whitespace.
    AsciiSpace,
    /// ASCII graphic character or space.
    AsciiPrintable,
    /// Unicode decimal digit (general category `Nd`).
    Decimal,
    /// Lowercase alphanumeric character.
    LowerAlnum,
    /// Uppercase alphanumeric character.
    UpperAlnum,
}

/// `\p{Nd}` has no `char` method; the regex crate carries the table.
fn is_decimal(c: char) -> bool {
    static DECIMAL: std::sync::OnceLock<Option<regex::Regex>> = std::sync::OnceLock::new();
    DECIMAL
        .get_or_init(|| regex::Regex::new(r"^\p{Nd}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(c.encode_utf8(&mut [0; 4])))
}

impl CharClass {
    /// Every class, in declaration order.
    pub const ALL: [CharClass; 18] = [
        Self::Alpha,
        Self::Alnum,
        Self::Digit,
        Self::Numeric,
        Self::Space,
        Self::Lower,
        Self::Upper,
        Self::Printable,
        Self::HexDigit,
        Self::AsciiAlpha,
        Self::AsciiAlnum,
        Self::AsciiLower,
        Self::AsciiUpper,
        Self::AsciiSpace,
        Self::AsciiPrintable,
        Self::Decimal,
        Self::LowerAlnum,
        Self::UpperAlnum,
    ];

    /// Returns `true` if `c` belongs to this class.
    #[must_use]
    pub fn contains(self, c: char) -> bool {
        match self {
            Self::Alpha => c.is_alphabetic(),
            Self::Alnum => c.is_alphanumeric(),
            Self::Digit => c.is_ascii_digit(),
            Self::Numeric => c.is_numeric(),
            Self::Space => c.is_whitespace(),
            Self::Lower => c.is_lowercase(),
            Self::Upper => c.is_uppercase(),
            Self::Printable => !c.is_control(),
            Self::HexDigit => c.is_ascii_hexdigit(),
            Self::AsciiAlpha => c.is_ascii_alphabetic(),
            Self::AsciiAlnum => c.is_ascii_alphanumeric(),
            Self::AsciiLower => c.is_ascii_lowercase(),
            Self::AsciiUpper => c.is_ascii_uppercase(),
            Self::AsciiSpace => c.is_ascii_whitespace(),
            Self::AsciiPrintable => c.is_ascii_graphic() || c == ' ',
            Self::Decimal => is_decimal(c),
            Self::LowerAlnum => c.is_alphanumeric() && c.is_lowercase(),
            Self::UpperAlnum => c.is_alphanumeric() && c.is_uppercase(),
        }
    }

    /// The `snake_case` name used in configuration.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Alnum => "alnum",
            Self::Digit => "digit",
            Self::Numeric => "numeric",
            Self::Space => "space",
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Printable => "printable",
            Self::HexDigit => "hex_digit",
            Self::AsciiAlpha => "ascii_alpha",
            Self::AsciiAlnum => "ascii_alnum",
            Self::AsciiLower => "ascii_lower",
            Self::AsciiUpper => "ascii_upper",
            Self::AsciiSpace => "ascii_space",
            Self::AsciiPrintable => "ascii_printable",
            Self::Decimal => "decimal",
            Self::LowerAlnum => "lower_alnum",
            Self::UpperAlnum => "upper_alnum",
        }
    }
}

impl FromStr for CharClass {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.name() == s)
            .ok_or_else(|| PatternError::InvalidConfig {
                source: format!("unknown character class \"{s}\""),
            })
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Matches characters belonging to a [`CharClass`].
///
/// ```
/// use tokre::{CharClass, ClassMatcher, TokenMatcher};
///
/// let digit = ClassMatcher::new(CharClass::Digit);
/// assert_eq!(digit.outputs(&'7'), vec!['7']);
/// assert!(digit.outputs(&'x').is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ClassMatcher {
    class: CharClass,
}

impl ClassMatcher {
    /// Create a class matcher.
    #[must_use]
    pub fn new(class: CharClass) -> Self {
        Self { class }
    }
}

impl TokenMatcher<char, char> for ClassMatcher {
    fn matches(&self, token: &char, out: &mut Vec<char>) {
        if self.class.contains(*token) {
            out.push(*token);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// String Matchers
// ═══════════════════════════════════════════════════════════════════════════════

/// Whole-token regular expression matcher for string tokens.
///
/// The pattern is anchored on both ends: the entire token must match.
/// Uses the `regex` crate (linear time, no backtracking).
///
/// ```
/// use tokre::{RegexMatcher, TokenMatcher};
///
/// let number = RegexMatcher::new(r"\d+").unwrap();
/// assert_eq!(number.outputs(&"42".to_string()).len(), 1);
/// assert!(number.outputs(&"42nd".to_string()).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    pattern: String,
    regex: regex::Regex,
}

impl RegexMatcher {
    /// Compile a whole-token regex matcher.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidRegex`] if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let regex = regex::Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            PatternError::InvalidRegex {
                pattern: pattern.to_owned(),
                source: e.to_string(),
            }
        })?;
        Ok(Self {
            pattern: pattern.to_owned(),
            regex,
        })
    }

    /// Returns the pattern as written (without the implicit anchors).
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl TokenMatcher<String, String> for RegexMatcher {
    fn matches(&self, token: &String, out: &mut Vec<String>) {
        if self.regex.is_match(token) {
            out.push(token.clone());
        }
    }
}

impl<'a> TokenMatcher<&'a str, &'a str> for RegexMatcher {
    fn matches(&self, token: &&'a str, out: &mut Vec<&'a str>) {
        if self.regex.is_match(token) {
            out.push(*token);
        }
    }
}
