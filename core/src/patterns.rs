//! Ready-made character patterns.
//!
//! Every function returns a fresh [`Expr<char>`]. Single-character classes
//! come in two forms: `alpha()` matches one character, `alphas()` one or more.
//!
//! | One | One or more | Class |
//! |-----|-------------|-------|
//! | [`alpha`] | [`alphas`] | Unicode alphabetic |
//! | [`alnum`] | [`alnums`] | Unicode alphanumeric |
//! | [`digit`] | [`digits`] | `0-9` |
//! | [`numeric`] | [`numerics`] | Unicode numeric |
//! | [`space`] | [`spaces`] | Unicode whitespace |
//! | [`lower`] | [`lowers`] | Unicode lowercase |
//! | [`upper`] | [`uppers`] | Unicode uppercase |
//! | [`printable`] | [`printables`] | Not a control character |
//! | [`hex_digit`] | [`hex_digits`] | `0-9a-fA-F` |
//! | [`ascii_alpha`] | [`ascii_alphas`] | ASCII letter |
//! | [`ascii_alnum`] | [`ascii_alnums`] | ASCII letter or digit |
//! | [`ascii_lower`] | [`ascii_lowers`] | ASCII lowercase |
//! | [`ascii_upper`] | [`ascii_uppers`] | ASCII uppercase |
//! | [`ascii_space`] | [`ascii_spaces`] | ASCII whitespace |
//! | [`ascii_printable`] | [`ascii_printables`] | ASCII graphic or space |
//! | [`decimal`] | [`decimals`] | Unicode decimal digit |
//! | [`lower_alnum`] | [`lower_alnums`] | Lowercase alphanumeric |
//! | [`upper_alnum`] | [`upper_alnums`] | Uppercase alphanumeric |
//!
//! Composite patterns: [`domain_name`], [`email`], [`url`] and [`html_tag`],
//! with named groups documented on each.

use crate::{
    leaf, maybe, repeat, seq, CharClass, ClassMatcher, ExactMatcher, Expr, InSetMatcher,
    NotMatcher, RangeMatcher, TestMatcher,
};

/// One character of `class`.
#[must_use]
pub fn class(class: CharClass) -> Expr<char> {
    leaf(ClassMatcher::new(class))
}

/// One or more characters of `class`.
#[must_use]
pub fn class_plus(class: CharClass) -> Expr<char> {
    self::class(class).at_least(1)
}

/// One Unicode alphabetic character.
#[must_use]
pub fn alpha() -> Expr<char> {
    class(CharClass::Alpha)
}

/// One or more Unicode alphabetic characters.
#[must_use]
pub fn alphas() -> Expr<char> {
    class_plus(CharClass::Alpha)
}

/// One Unicode alphanumeric character.
#[must_use]
pub fn alnum() -> Expr<char> {
    class(CharClass::Alnum)
}

/// One or more Unicode alphanumeric characters.
#[must_use]
pub fn alnums() -> Expr<char> {
    class_plus(CharClass::Alnum)
}

/// One ASCII digit.
#[must_use]
pub fn digit() -> Expr<char> {
    class(CharClass::Digit)
}

/// One or more ASCII digits.
#[must_use]
pub fn digits() -> Expr<char> {
    class_plus(CharClass::Digit)
}

/// One Unicode numeric character.
#[must_use]
pub fn numeric() -> Expr<char> {
    class(CharClass::Numeric)
}

/// One or more Unicode numeric characters.
#[must_use]
pub fn numerics() -> Expr<char> {
    class_plus(CharClass::Numeric)
}

/// One whitespace character.
#[must_use]
pub fn space() -> Expr<char> {
    class(CharClass::Space)
}

/// One or more whitespace characters.
#[must_use]
pub fn spaces() -> Expr<char> {
    class_plus(CharClass::Space)
}

/// Zero or more whitespace characters.
#[must_use]
pub fn spaces_maybe() -> Expr<char> {
    repeat(space())
}

/// One lowercase letter.
#[must_use]
pub fn lower() -> Expr<char> {
    class(CharClass::Lower)
}

/// One or more lowercase letters.
#[must_use]
pub fn lowers() -> Expr<char> {
    class_plus(CharClass::Lower)
}

/// One uppercase letter.
#[must_use]
pub fn upper() -> Expr<char> {
    class(CharClass::Upper)
}

/// One or more uppercase letters.
#[must_use]
pub fn uppers() -> Expr<char> {
    class_plus(CharClass::Upper)
}

/// One printable character.
#[must_use]
pub fn printable() -> Expr<char> {
    class(CharClass::Printable)
}

/// One or more printable characters.
#[must_use]
pub fn printables() -> Expr<char> {
    class_plus(CharClass::Printable)
}

/// One hexadecimal digit.
#[must_use]
pub fn hex_digit() -> Expr<char> {
    leaf(RangeMatcher::new([('a', 'f'), ('A', 'F'), ('0', '9')]))
}

/// One or more hexadecimal digits.
#[must_use]
pub fn hex_digits() -> Expr<char> {
    hex_digit().at_least(1)
}

/// One ASCII letter.
#[must_use]
pub fn ascii_alpha() -> Expr<char> {
    class(CharClass::AsciiAlpha)
}

/// One or more ASCII letters.
#[must_use]
pub fn ascii_alphas() -> Expr<char> {
    class_plus(CharClass::AsciiAlpha)
}

/// One ASCII letter or digit.
#[must_use]
pub fn ascii_alnum() -> Expr<char> {
    class(CharClass::AsciiAlnum)
}

/// One or more ASCII letters or digits.
#[must_use]
pub fn ascii_alnums() -> Expr<char> {
    class_plus(CharClass::AsciiAlnum)
}

/// One ASCII lowercase letter.
#[must_use]
pub fn ascii_lower() -> Expr<char> {
    class(CharClass::AsciiLower)
}

/// One or more ASCII lowercase letters.
#[must_use]
pub fn ascii_lowers() -> Expr<char> {
    class_plus(CharClass::AsciiLower)
}

/// One ASCII uppercase letter.
#[must_use]
pub fn ascii_upper() -> Expr<char> {
    class(CharClass::AsciiUpper)
}

/// One or more ASCII uppercase letters.
#[must_use]
pub fn ascii_uppers() -> Expr<char> {
    class_plus(CharClass::AsciiUpper)
}

/// One ASCII whitespace character.
#[must_use]
pub fn ascii_space() -> Expr<char> {
    class(CharClass::AsciiSpace)
}

/// One or more ASCII whitespace characters.
#[must_use]
pub fn ascii_spaces() -> Expr<char> {
    class_plus(CharClass::AsciiSpace)
}

/// One printable ASCII character.
#[must_use]
pub fn ascii_printable() -> Expr<char> {
    class(CharClass::AsciiPrintable)
}

/// One or more printable ASCII characters.
#[must_use]
pub fn ascii_printables() -> Expr<char> {
    class_plus(CharClass::AsciiPrintable)
}

/// One Unicode decimal digit, in any script.
#[must_use]
pub fn decimal() -> Expr<char> {
    class(CharClass::Decimal)
}

/// One or more Unicode decimal digits.
#[must_use]
pub fn decimals() -> Expr<char> {
    class_plus(CharClass::Decimal)
}

/// One lowercase alphanumeric character.
#[must_use]
pub fn lower_alnum() -> Expr<char> {
    class(CharClass::LowerAlnum)
}

/// One or more lowercase alphanumeric characters.
#[must_use]
pub fn lower_alnums() -> Expr<char> {
    class_plus(CharClass::LowerAlnum)
}

/// One uppercase alphanumeric character.
#[must_use]
pub fn upper_alnum() -> Expr<char> {
    class(CharClass::UpperAlnum)
}

/// One or more uppercase alphanumeric characters.
#[must_use]
pub fn upper_alnums() -> Expr<char> {
    class_plus(CharClass::UpperAlnum)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Composite patterns
// ═══════════════════════════════════════════════════════════════════════════════

fn lit(s: &str) -> Expr<char> {
    seq(s.chars())
}

/// Builds the variant directly; the names used in this module are identifiers.
fn named(name: &str, expr: Expr<char>) -> Expr<char> {
    Expr::Capture {
        name: name.to_owned(),
        inner: Box::new(expr),
    }
}

/// One label of a domain name: alphanumeric runs joined by single dashes,
/// optionally behind an IDNA `xn--` prefix.
fn domain_label() -> Expr<char> {
    maybe(lit("xn--")) + ascii_alnums() + repeat(lit("-") + ascii_alnums())
}

/// A dotted domain name with at least two labels, the last one being at least
/// two characters long.
///
/// ```
/// use tokre::{patterns::domain_name, Program};
///
/// let program = Program::compile(&domain_name());
/// assert!(program.is_match("bar.xn--hello.com".chars()).unwrap());
/// assert!(!program.is_match("com".chars()).unwrap());
/// ```
#[must_use]
pub fn domain_name() -> Expr<char> {
    domain_label() + repeat(lit(".") + domain_label()) + lit(".") + ascii_alnum().at_least(2)
}

/// An email address.
///
/// Groups: `user`, `domain`.
///
/// ```
/// use tokre::{patterns::email, Program};
///
/// let found = Program::compile(&email())
///     .matches_joined("foo.bar+baz@bar.com".chars())
///     .unwrap();
/// assert_eq!(found[0]["user"].trail(), "foo.bar+baz");
/// assert_eq!(found[0]["domain"].trail(), "bar.com");
/// ```
#[must_use]
pub fn email() -> Expr<char> {
    let separator = leaf(InSetMatcher::new(['+', '.']));
    let user = ascii_alnums() + repeat(separator + ascii_alnums());
    named("user", user) + lit("@") + named("domain", domain_name())
}

/// An `http` or `https` URL.
///
/// Groups: `proto`, `auth` (with nested `user` and `password`), `domain`,
/// `path`, `query`, `hash`.
#[must_use]
pub fn url() -> Expr<char> {
    let encoded = || (ascii_alnum() | (lit("%") + hex_digit() + hex_digit()) | lit("+")).at_least(1);

    let proto = named("proto", lit("http") + maybe(lit("s"))) + lit("://");
    let auth = named("user", encoded()) + lit(":") + named("password", encoded());
    let path = maybe(encoded() + repeat(lit("/") + encoded()));
    let query_var = || encoded() + maybe(lit("=") + encoded());
    let query = query_var() + repeat(lit("&") + query_var());

    proto
        + maybe(named("auth", auth) + lit("@"))
        + named("domain", domain_name())
        + maybe(lit("/") + named("path", path))
        + maybe(lit("?") + named("query", query))
        + maybe(lit("#") + named("hash", encoded()))
}

/// An HTML opening or self-closing tag.
///
/// Groups: `name` (the tag name) and one `attr` per attribute, each with a
/// nested `name` and, when a value is given, `value`. Values may be single
/// quoted, double quoted or bare.
///
/// ```
/// use tokre::{patterns::html_tag, Program};
///
/// let found = Program::compile(&html_tag())
///     .matches_joined(r#"<a href="/home" hidden>"#.chars())
///     .unwrap();
/// assert_eq!(found[0]["name"].trail(), "a");
/// assert_eq!(found[0]["attr"]["value"].trail(), "/home");
/// ```
#[must_use]
pub fn html_tag() -> Expr<char> {
    let ident = || ascii_alnums() + repeat(lit("-") + ascii_alnums());
    let quoted = |q: char| {
        let body = repeat(leaf(NotMatcher::new(InSetMatcher::new([q, '>']))));
        leaf(ExactMatcher::new(q)) + named("value", body) + leaf(ExactMatcher::new(q))
    };
    let bare = leaf(TestMatcher::new("bare attribute value", |c: &char| {
        !c.is_whitespace() && !matches!(*c, '/' | '>' | '\'' | '"')
    }))
    .at_least(1);
    let value = quoted('\'') | quoted('"') | named("value", bare);
    let attr = named(
        "attr",
        named("name", ident()) + maybe(spaces_maybe() + lit("=") + spaces_maybe() + value),
    );

    lit("<")
        + spaces_maybe()
        + named("name", ident())
        + repeat(spaces() + attr)
        + spaces_maybe()
        + (lit("/>") | lit(">"))
}
