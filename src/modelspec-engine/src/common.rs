// Copyright 2026 The Modelspec Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

use lazy_static::lazy_static;
use regex::Regex;

/// Loc describes a span of the input text, in byte offsets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Loc {
    pub start: u16,
    pub end: u16,
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl Loc {
    pub fn new(start: usize, end: usize) -> Self {
        Loc {
            start: start as u16,
            end: end as u16,
        }
    }

    /// union takes a second Loc and returns the inclusive range from the
    /// start of the earlier token to the end of the later token.
    pub fn union(&self, rhs: &Self) -> Self {
        Loc {
            start: self.start.min(rhs.start),
            end: self.end.max(rhs.end),
        }
    }
}

#[test]
fn test_loc_basics() {
    let a = Loc { start: 3, end: 7 };
    assert_eq!(a, Loc::new(3, 7));

    let b = Loc { start: 4, end: 11 };
    assert_eq!(Loc::new(3, 11), a.union(&b));

    let c = Loc { start: 1, end: 5 };
    assert_eq!(Loc::new(1, 7), a.union(&c));
}

/// An identifier as written in a model specification: a phenotype name,
/// variant id, outcome key, or alias.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ident(String);

impl Ident {
    pub fn new(s: String) -> Self {
        Ident(s)
    }

    pub fn new_from_str(s: &str) -> Self {
        Ident(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_:]+$").unwrap();
}

/// Whether `s` is a well-formed name under the grammar.  Colons are part
/// of the name class so genomic coordinates like `chr1:123456` work as
/// variant ids.
pub fn is_valid_name(s: &str) -> bool {
    NAME_RE.is_match(s)
}

#[test]
fn test_is_valid_name() {
    assert!(is_valid_name("y"));
    assert!(is_valid_name("x_1"));
    assert!(is_valid_name("chr1:123456"));
    assert!(is_valid_name("123"));
    assert!(!is_valid_name(""));
    assert!(!is_valid_name("a b"));
    assert!(!is_valid_name("g(x)"));
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError, // will never be produced
    UnrecognizedToken,
    UnrecognizedEof,
    ExtraToken,
    ExpectedInteger,
    IntegerOutOfRange,
    InvalidName,
    DuplicateOutcomeKey,
    DuplicateAlias,
    TooFewInteractionMembers,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            NoError => "no_error",
            UnrecognizedToken => "unrecognized_token",
            UnrecognizedEof => "unrecognized_eof",
            ExtraToken => "extra_token",
            ExpectedInteger => "expected_integer",
            IntegerOutOfRange => "integer_out_of_range",
            InvalidName => "invalid_name",
            DuplicateOutcomeKey => "duplicate_outcome_key",
            DuplicateAlias => "duplicate_alias",
            TooFewInteractionMembers => "too_few_interaction_members",
        };

        write!(f, "{name}")
    }
}

/// A syntax error: the input doesn't match the grammar.  Carries the span
/// of the offending token (or the position just past the end of input),
/// the grammar rule that failed, and the token descriptions that would
/// have been accepted there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    pub start: u16,
    pub end: u16,
    pub code: ErrorCode,
    pub rule: &'static str,
    pub expected: Vec<&'static str>,
    pub found: Option<String>,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{} in {}", self.start, self.end, self.code, self.rule)?;
        if !self.expected.is_empty() {
            write!(f, ": expected {}", self.expected.join(" or "))?;
        }
        if let Some(ref found) = self.found {
            write!(f, ", found '{found}'")?;
        }
        Ok(())
    }
}

/// A semantic error: grammatically valid input with an invalid structure,
/// like a duplicate outcome key or a colliding alias.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SemanticError {
    pub code: ErrorCode,
    pub loc: Loc,
    pub detail: Option<String>,
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail {
            Some(ref detail) => write!(f, "{}:{} -- {}", self.loc, self.code, detail),
            None => write!(f, "{}:{}", self.loc, self.code),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    Syntax(SyntaxError),
    Semantic(SemanticError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Syntax(err) => write!(f, "syntax error: {err}"),
            ParseError::Semantic(err) => write!(f, "semantic error: {err}"),
        }
    }
}

impl error::Error for ParseError {}

impl From<SyntaxError> for ParseError {
    fn from(err: SyntaxError) -> Self {
        ParseError::Syntax(err)
    }
}

impl From<SemanticError> for ParseError {
    fn from(err: SemanticError) -> Self {
        ParseError::Semantic(err)
    }
}

pub type ParseResult<T> = result::Result<T, ParseError>;

#[test]
fn test_error_display() {
    let err = SyntaxError {
        start: 4,
        end: 5,
        code: ErrorCode::UnrecognizedToken,
        rule: "condition",
        expected: vec!["name", "`g(`"],
        found: Some("~".to_string()),
    };
    assert_eq!(
        "4:5:unrecognized_token in condition: expected name or `g(`, found '~'",
        format!("{err}")
    );

    let err = SemanticError {
        code: ErrorCode::DuplicateOutcomeKey,
        loc: Loc::new(6, 9),
        detail: None,
    };
    assert_eq!("6:9:duplicate_outcome_key", format!("{err}"));
}
