//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the tokre engine. A fixture is a
//! pattern config plus cases; each case gives an input and the matches it
//! must produce.
//!
//! ```yaml
//! name: say hello
//! description: optional suffix
//! pattern:
//!   type: concat
//!   items:
//!     - { type: literal, value: "say" }
//!     - { type: maybe, pattern: { type: literal, value: " hello" } }
//! cases:
//!   - name: bare
//!     input: "say"
//!     expect: { count: 1, trails: ["say"] }
//! ```
//!
//! Match order is not part of the contract, so trails and groups are
//! compared as sorted lists.

use std::collections::BTreeMap;

use serde::Deserialize;
use tokre::{Limits, Match, MatchError, PatternConfig, Program, Registry};

use crate::{char_registry, word_registry};

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    pub description: String,
    /// How `input` strings become tokens.
    #[serde(default)]
    pub tokens: TokenKind,
    pub pattern: PatternConfig,
    /// When set, loading the pattern must fail with a message containing this.
    #[serde(default)]
    pub load_error: Option<String>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// Token domain of a fixture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// One token per character.
    #[default]
    Chars,
    /// One token per whitespace-separated word.
    Words,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    /// Frontier limit for this case (defaults to the library default).
    #[serde(default)]
    pub max_frontier: Option<usize>,
    pub expect: Expectation,
}

/// Expected outcome of one case
#[derive(Debug, Default, Deserialize)]
pub struct Expectation {
    /// Number of matches.
    #[serde(default)]
    pub count: Option<usize>,
    /// Rendered trail of every match.
    #[serde(default)]
    pub trails: Option<Vec<String>>,
    /// Top-level groups of every match: group name to rendered occurrences.
    #[serde(default)]
    pub groups: Option<Vec<BTreeMap<String, Vec<String>>>>,
    /// When set, matching must fail with a message containing this.
    #[serde(default)]
    pub error: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// What a case actually produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub trails: Vec<String>,
    pub groups: Vec<BTreeMap<String, Vec<String>>>,
}

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub detail: String,
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all test cases and return results.
    ///
    /// A pattern that fails to load yields a single failed result, unless the
    /// fixture expects exactly that failure.
    pub fn run(&self) -> Vec<CaseResult> {
        match self.tokens {
            TokenKind::Chars => self.run_with(
                &char_registry(),
                |input| input.chars().collect(),
                |trail| trail.iter().collect(),
            ),
            TokenKind::Words => self.run_with(
                &word_registry(),
                |input| input.split_whitespace().map(str::to_owned).collect(),
                |trail| trail.join(" "),
            ),
        }
    }

    fn run_with<Tok: Clone + 'static>(
        &self,
        registry: &Registry<Tok>,
        tokenize: fn(&str) -> Vec<Tok>,
        render: fn(&[Tok]) -> String,
    ) -> Vec<CaseResult> {
        let expr = match (registry.load_pattern(&self.pattern), &self.load_error) {
            (Ok(expr), None) => expr,
            (Err(err), Some(expected)) => {
                let message = err.to_string();
                return vec![CaseResult {
                    case_name: "load".into(),
                    passed: message.contains(expected.as_str()),
                    detail: format!("expected load error containing {expected:?}, got {message:?}"),
                }];
            }
            (Ok(_), Some(expected)) => {
                return vec![CaseResult {
                    case_name: "load".into(),
                    passed: false,
                    detail: format!("expected load error containing {expected:?}, but it loaded"),
                }];
            }
            (Err(err), None) => {
                return vec![CaseResult {
                    case_name: "load".into(),
                    passed: false,
                    detail: format!("pattern failed to load: {err}"),
                }];
            }
        };

        self.cases
            .iter()
            .map(|case| {
                let limits = case
                    .max_frontier
                    .map_or_else(Limits::default, |max| Limits::default().with_max_frontier(max));
                let input = tokenize(&case.input);
                let result = Program::compile(&expr)
                    .with_limits(limits)
                    .matches(&input)
                    .map(|found| found.iter().map(|m| rendered(m, render)).collect());
                let (passed, detail) = case.expect.check(result);
                CaseResult {
                    case_name: case.name.clone(),
                    passed,
                    detail,
                }
            })
            .collect()
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        for result in self.run() {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: {}",
                self.name, result.case_name, result.detail
            );
        }
    }
}

/// A match rendered for comparison: trail and top-level groups.
type Rendered = (String, BTreeMap<String, Vec<String>>);

fn rendered<Tok>(m: &Match<Vec<Tok>>, render: fn(&[Tok]) -> String) -> Rendered {
    let groups = m
        .groups()
        .iter()
        .map(|(name, occurrences)| {
            let rendered = occurrences.iter().map(|g| render(g.trail())).collect();
            (name.clone(), rendered)
        })
        .collect();
    (render(m.trail()), groups)
}

impl Expectation {
    fn check(&self, result: Result<Vec<Rendered>, MatchError>) -> (bool, String) {
        let found = match (result, &self.error) {
            (Err(err), Some(expected)) => {
                let message = err.to_string();
                return (
                    message.contains(expected.as_str()),
                    format!("expected error containing {expected:?}, got {message:?}"),
                );
            }
            (Err(err), None) => return (false, format!("unexpected error: {err}")),
            (Ok(found), Some(expected)) => {
                return (
                    false,
                    format!("expected error containing {expected:?}, got {} matches", found.len()),
                )
            }
            (Ok(found), None) => found,
        };

        let (trails, groups) = found.into_iter().unzip();
        let mut outcome = Outcome { trails, groups };
        outcome.trails.sort();
        outcome.groups.sort();

        if let Some(count) = self.count {
            if outcome.trails.len() != count {
                return (false, format!("expected {count} matches, got {outcome:?}"));
            }
        }
        if let Some(trails) = &self.trails {
            let mut expected = trails.clone();
            expected.sort();
            if outcome.trails != expected {
                return (false, format!("expected trails {expected:?}, got {:?}", outcome.trails));
            }
        }
        if let Some(groups) = &self.groups {
            let mut expected = groups.clone();
            expected.sort();
            if outcome.groups != expected {
                return (false, format!("expected groups {expected:?}, got {:?}", outcome.groups));
            }
        }
        (true, String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAY_HELLO: &str = r#"
name: say hello
description: optional suffix
pattern:
  type: concat
  items:
    - { type: literal, value: "say" }
    - { type: maybe, pattern: { type: literal, value: " hello" } }
cases:
  - name: bare
    input: "say"
    expect: { count: 1, trails: ["say"] }
  - name: truncated
    input: "say hell"
    expect: { count: 0 }
"#;

    #[test]
    fn parse_and_run_fixture() {
        let fixture = Fixture::from_yaml(SAY_HELLO).unwrap();
        assert_eq!(fixture.tokens, TokenKind::Chars);
        assert_eq!(fixture.cases.len(), 2);
        fixture.run_and_assert();
    }

    #[test]
    fn failed_expectation_is_reported() {
        let yaml = SAY_HELLO.replace("count: 0", "count: 2");
        let fixture = Fixture::from_yaml(&yaml).unwrap();
        let results = fixture.run();
        assert!(results[0].passed);
        assert!(!results[1].passed);
        assert!(results[1].detail.contains("expected 2 matches"));
    }

    #[test]
    fn multi_document_yaml() {
        let yaml = format!("{SAY_HELLO}\n---\n{SAY_HELLO}");
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap();
        assert_eq!(fixtures.len(), 2);
    }

    #[test]
    fn load_error_expectation() {
        let yaml = r#"
name: bad name
description: capture names must be identifiers
pattern: { type: capture, name: "no spaces", pattern: { type: any } }
load_error: "invalid capture name"
"#;
        Fixture::from_yaml(yaml).unwrap().run_and_assert();
    }
}
