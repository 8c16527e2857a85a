//! tokre-test: Test domain for conformance testing
//!
//! Wires the built-in char and word matchers into registries and adds one
//! domain matcher of its own, [`IgnoreCase`]. This is the reference extension
//! that demonstrates how to plug matchers into tokre from another crate.
//!
//! # Example
//!
//! ```
//! use tokre_test::prelude::*;
//!
//! let registry = char_registry();
//! let config: PatternConfig = serde_json::from_value(serde_json::json!({
//!     "type": "leaf",
//!     "matcher": { "type_url": "tokre.test.v1.IgnoreCase", "config": { "value": "q" } }
//! }))
//! .unwrap();
//!
//! let program = Program::compile(&registry.load_pattern(&config).unwrap());
//! assert!(program.is_match("Q".chars()).unwrap());
//! ```

use tokre::{
    register_char_matchers, register_string_matchers, IntoTokenMatcher, PatternError, Registry,
    RegistryBuilder, TokenMatcher,
};

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Matches a token equal to `value` ignoring case.
///
/// For `char` tokens `value` must be a single character.
#[derive(Debug, Clone)]
pub struct IgnoreCase {
    value: String,
}

impl IgnoreCase {
    /// Create a case-insensitive matcher.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into().to_lowercase(),
        }
    }
}

impl TokenMatcher<char, char> for IgnoreCase {
    fn matches(&self, token: &char, out: &mut Vec<char>) {
        if token.to_lowercase().eq(self.value.chars()) {
            out.push(*token);
        }
    }
}

impl TokenMatcher<String, String> for IgnoreCase {
    fn matches(&self, token: &String, out: &mut Vec<String>) {
        if token.to_lowercase() == self.value {
            out.push(token.clone());
        }
    }
}

/// Configuration for [`IgnoreCase`].
#[derive(serde::Deserialize)]
pub struct IgnoreCaseConfig {
    /// The token to compare against.
    pub value: String,
}

impl IntoTokenMatcher<char, char> for IgnoreCase {
    type Config = IgnoreCaseConfig;

    fn from_config(
        config: Self::Config,
    ) -> Result<Box<dyn TokenMatcher<char, char>>, PatternError> {
        if config.value.chars().count() != 1 {
            return Err(PatternError::InvalidConfig {
                source: format!("expected a single character, got \"{}\"", config.value),
            });
        }
        Ok(Box::new(IgnoreCase::new(config.value)))
    }
}

impl IntoTokenMatcher<String, String> for IgnoreCase {
    type Config = IgnoreCaseConfig;

    fn from_config(
        config: Self::Config,
    ) -> Result<Box<dyn TokenMatcher<String, String>>, PatternError> {
        Ok(Box::new(IgnoreCase::new(config.value)))
    }
}

/// Register the char test domain: built-in char matchers plus
/// `tokre.test.v1.IgnoreCase`.
#[must_use]
pub fn register_chars(builder: RegistryBuilder<char>) -> RegistryBuilder<char> {
    register_char_matchers(builder).matcher::<IgnoreCase>("tokre.test.v1.IgnoreCase")
}

/// Register the word test domain: built-in string matchers plus
/// `tokre.test.v1.IgnoreCase`.
#[must_use]
pub fn register_words(builder: RegistryBuilder<String>) -> RegistryBuilder<String> {
    register_string_matchers(builder).matcher::<IgnoreCase>("tokre.test.v1.IgnoreCase")
}

/// A frozen registry for `char` tokens.
#[must_use]
pub fn char_registry() -> Registry<char> {
    register_chars(RegistryBuilder::new()).build()
}

/// A frozen registry for word (`String`) tokens.
#[must_use]
pub fn word_registry() -> Registry<String> {
    register_words(RegistryBuilder::new()).build()
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{char_registry, word_registry, IgnoreCase};
    pub use tokre::prelude::*;
    pub use tokre::{PatternConfig, Registry};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_case_chars() {
        let m = IgnoreCase::new("q");
        assert_eq!(TokenMatcher::<char, char>::outputs(&m, &'Q'), vec!['Q']);
        assert_eq!(TokenMatcher::<char, char>::outputs(&m, &'q'), vec!['q']);
        assert!(TokenMatcher::<char, char>::outputs(&m, &'x').is_empty());
    }

    #[test]
    fn ignore_case_words() {
        let m = IgnoreCase::new("Hello");
        let out = TokenMatcher::<String, String>::outputs(&m, &"HELLO".to_owned());
        assert_eq!(out, vec!["HELLO".to_owned()]);
    }

    #[test]
    fn registries_include_domain_matcher() {
        let chars = char_registry();
        assert!(chars.contains("tokre.test.v1.IgnoreCase"));
        assert!(chars.contains("tokre.char.v1.Class"));
        let words = word_registry();
        assert!(words.contains("tokre.test.v1.IgnoreCase"));
        assert!(words.contains("tokre.string.v1.Regex"));
    }

    #[test]
    fn char_ignore_case_rejects_long_values() {
        let config: tokre::PatternConfig = serde_json::from_value(serde_json::json!({
            "type": "leaf",
            "matcher": { "type_url": "tokre.test.v1.IgnoreCase", "config": { "value": "ab" } }
        }))
        .unwrap();
        let err = char_registry().load_pattern(&config).unwrap_err();
        assert!(err.to_string().contains("single character"));
    }
}
