// Copyright 2026 The Modelspec Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Hand-written backtracking recursive descent parser for model
//! specifications.
//!
//! Each grammar rule is a method on `Parser`; ordered choice is expressed
//! with [`Parser::attempt`], which rolls the cursor back on a recoverable
//! failure so the next alternative can run.  Crossing a cut turns failures
//! into hard errors that abort the whole parse instead of silently falling
//! through to a worse-matching alternative.

use crate::ast::{Condition, Entity, LabelledOutcome, Model, Outcome, Predictor, TransformKind};
use crate::common::{ErrorCode, Ident, Loc, ParseError, SyntaxError};
use crate::token::{Lexer, Spanned, Token};
use crate::validate::check_model;


/// Which grammar the parser accepts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dialect {
    /// The full grammar: labelled outcome groups, `SNPs`, the
    /// `pow`/`ln`/`log10` transforms, and `factor(...)` heads in
    /// interactions.
    Full,
    /// The historical subset: single outcomes only, no `SNPs`, no
    /// transforms, and a stricter interaction lookahead.
    Legacy,
}

/// TokenKind discriminant for efficient peek comparisons without payload
/// matching
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TokenKind {
    Pipe,
    Tilde,
    Plus,
    Mul,
    Comma,
    Eq,
    LParen,
    RParen,
    LBracket,
    RBracket,
    As,
    Snps,
    GOpen,
    FactorOpen,
    PowOpen,
    LnOpen,
    Log10Open,
    Ident,
    Num,
}

impl<'a> From<&Token<'a>> for TokenKind {
    fn from(token: &Token<'a>) -> Self {
        match token {
            Token::Pipe => TokenKind::Pipe,
            Token::Tilde => TokenKind::Tilde,
            Token::Plus => TokenKind::Plus,
            Token::Mul => TokenKind::Mul,
            Token::Comma => TokenKind::Comma,
            Token::Eq => TokenKind::Eq,
            Token::LParen => TokenKind::LParen,
            Token::RParen => TokenKind::RParen,
            Token::LBracket => TokenKind::LBracket,
            Token::RBracket => TokenKind::RBracket,
            Token::As => TokenKind::As,
            Token::Snps => TokenKind::Snps,
            Token::GOpen => TokenKind::GOpen,
            Token::FactorOpen => TokenKind::FactorOpen,
            Token::PowOpen => TokenKind::PowOpen,
            Token::LnOpen => TokenKind::LnOpen,
            Token::Log10Open => TokenKind::Log10Open,
            Token::Ident(_) => TokenKind::Ident,
            Token::Num(_) => TokenKind::Num,
        }
    }
}

impl TokenKind {
    fn describe(self) -> &'static str {
        match self {
            TokenKind::Pipe => "`|`",
            TokenKind::Tilde => "`~`",
            TokenKind::Plus => "`+`",
            TokenKind::Mul => "`*`",
            TokenKind::Comma => "`,`",
            TokenKind::Eq => "`=`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::As => "`as`",
            TokenKind::Snps => "`SNPs`",
            TokenKind::GOpen => "`g(`",
            TokenKind::FactorOpen => "`factor(`",
            TokenKind::PowOpen => "`pow(`",
            TokenKind::LnOpen => "`ln(`",
            TokenKind::Log10Open => "`log10(`",
            TokenKind::Ident => "name",
            TokenKind::Num => "integer",
        }
    }
}

/// How a rule failed: a Soft failure lets an enclosing ordered choice roll
/// back and try its next alternative, while a Hard failure crossed a cut
/// and aborts the whole parse.
#[derive(Debug)]
enum Failure {
    Soft(SyntaxError),
    Hard(SyntaxError),
}

impl Failure {
    /// cut marks the commitment point of a rule: any failure that crosses
    /// it stops being a candidate for trying sibling alternatives.
    fn cut(self) -> Failure {
        match self {
            Failure::Soft(err) => Failure::Hard(err),
            hard => hard,
        }
    }

    fn into_inner(self) -> SyntaxError {
        match self {
            Failure::Soft(err) => err,
            Failure::Hard(err) => err,
        }
    }
}

type Parse<T> = Result<T, Failure>;

fn expression_expected(dialect: Dialect) -> Vec<&'static str> {
    match dialect {
        Dialect::Full => vec![
            "`SNPs`",
            "`g(`",
            "`factor(`",
            "`ln(`",
            "`log10(`",
            "`pow(`",
            "name",
        ],
        Dialect::Legacy => vec!["`g(`", "`factor(`", "name"],
    }
}

/// Parser state holding tokenized input
struct Parser<'input> {
    text: &'input str,
    tokens: Vec<Spanned<Token<'input>>>,
    pos: usize,
    dialect: Dialect,
}

impl<'input> Parser<'input> {
    /// Create a new parser from a lexer, collecting all tokens up front.
    /// Returns an error if the lexer produces any errors.
    fn new(text: &'input str, lexer: Lexer<'input>, dialect: Dialect) -> Result<Self, SyntaxError> {
        let mut tokens = Vec::new();
        for result in lexer {
            match result {
                Ok(tok) => tokens.push(tok),
                Err(err) => return Err(err),
            }
        }
        Ok(Parser {
            text,
            tokens,
            pos: 0,
            dialect,
        })
    }

    /// Peek at the current token without consuming it
    fn peek(&self) -> Option<&Spanned<Token<'input>>> {
        self.tokens.get(self.pos)
    }

    /// Peek at the kind of the current token
    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|(_, tok, _)| TokenKind::from(tok))
    }

    /// Peek at the kind of the token `n` past the current one
    fn kind_at(&self, n: usize) -> Option<TokenKind> {
        self.tokens
            .get(self.pos + n)
            .map(|(_, tok, _)| TokenKind::from(tok))
    }

    /// Advance to the next token and return the consumed token
    fn advance(&mut self) -> Option<&Spanned<Token<'input>>> {
        if self.pos < self.tokens.len() {
            let tok = &self.tokens[self.pos];
            self.pos += 1;
            Some(tok)
        } else {
            None
        }
    }

    /// Get the position for EOF errors
    fn eof_position(&self) -> usize {
        if let Some((_, _, end)) = self.tokens.last() {
            *end
        } else {
            0
        }
    }

    /// Build a syntax error at the current token (or at end of input),
    /// with an explicit error code.
    fn err_at_current(
        &self,
        code: ErrorCode,
        rule: &'static str,
        expected: Vec<&'static str>,
    ) -> SyntaxError {
        match self.peek() {
            Some(&(start, _, end)) => SyntaxError {
                start: start as u16,
                end: end as u16,
                code,
                rule,
                expected,
                found: Some(self.text[start..end].to_string()),
            },
            None => {
                let pos = self.eof_position();
                SyntaxError {
                    start: pos as u16,
                    end: (pos + 1) as u16,
                    code: ErrorCode::UnrecognizedEof,
                    rule,
                    expected,
                    found: None,
                }
            }
        }
    }

    fn soft(&self, rule: &'static str, expected: Vec<&'static str>) -> Failure {
        Failure::Soft(self.err_at_current(ErrorCode::UnrecognizedToken, rule, expected))
    }

    /// Expect the current token to match the expected kind; failing this is
    /// always recoverable, callers harden with [`Failure::cut`] past their
    /// commitment point.
    fn expect(&mut self, kind: TokenKind, rule: &'static str) -> Parse<Spanned<Token<'input>>> {
        if self.peek_kind() == Some(kind) {
            Ok(*self.advance().unwrap())
        } else {
            Err(self.soft(rule, vec![kind.describe()]))
        }
    }

    /// Try one alternative of an ordered choice: on a soft failure the
    /// cursor is rolled back and `None` is returned so the next alternative
    /// may run; successes and hard failures pass through.
    fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> Parse<T>) -> Option<Parse<T>> {
        let saved = self.pos;
        match f(self) {
            Err(Failure::Soft(_)) => {
                self.pos = saved;
                None
            }
            other => Some(other),
        }
    }

    /// A name: any identifier.  An all-digit run is also a valid name, the
    /// lexer just classifies it as an integer first.
    fn parse_name(&mut self, rule: &'static str) -> Parse<(Ident, Loc)> {
        let tok = self.peek().copied();
        match tok {
            Some((start, Token::Ident(s) | Token::Num(s), end)) => {
                self.pos += 1;
                Ok((Ident::new_from_str(s), Loc::new(start, end)))
            }
            _ => Err(self.soft(rule, vec!["name"])),
        }
    }

    fn parse_integer(&mut self, rule: &'static str) -> Parse<(u32, Loc)> {
        let tok = self.peek().copied();
        match tok {
            Some((start, Token::Num(s), end)) => {
                self.pos += 1;
                match s.parse::<u32>() {
                    Ok(n) => Ok((n, Loc::new(start, end))),
                    Err(_) => Err(Failure::Soft(SyntaxError {
                        start: start as u16,
                        end: end as u16,
                        code: ErrorCode::IntegerOutOfRange,
                        rule,
                        expected: vec!["integer"],
                        found: Some(s.to_string()),
                    })),
                }
            }
            _ => Err(Failure::Soft(self.err_at_current(
                ErrorCode::ExpectedInteger,
                rule,
                vec!["integer"],
            ))),
        }
    }

    /// Parse a complete model specification; the whole input must be
    /// consumed.  At this level the soft/hard distinction stops mattering:
    /// there is no enclosing alternative left to try.
    fn parse_model(&mut self) -> Result<Model, SyntaxError> {
        let outcome = self.parse_outcome().map_err(Failure::into_inner)?;

        let conditions = if self.peek_kind() == Some(TokenKind::Pipe) {
            self.advance();
            // cut: past the `|` a condition list must follow
            Some(
                self.parse_condition_group()
                    .map_err(|e| e.cut().into_inner())?,
            )
        } else {
            None
        };

        self.expect(TokenKind::Tilde, "model")
            .map_err(Failure::into_inner)?;

        let predictors = self
            .parse_predictors()
            .map_err(|e| e.cut().into_inner())?;

        // Check for extra tokens after the model
        if let Some(&(start, _, end)) = self.peek() {
            return Err(SyntaxError {
                start: start as u16,
                end: end as u16,
                code: ErrorCode::ExtraToken,
                rule: "model",
                expected: Vec::new(),
                found: Some(self.text[start..end].to_string()),
            });
        }

        Ok(Model {
            outcome,
            conditions,
            predictors,
        })
    }

    /// A single phenotype-or-variant, or (in the full grammar) a bracketed
    /// comma-separated group of `key=phenotype` pairs.
    fn parse_outcome(&mut self) -> Parse<Outcome> {
        if self.dialect == Dialect::Full && self.peek_kind() == Some(TokenKind::LBracket) {
            let (lpos, _, _) = *self.advance().unwrap();
            // cut: committed to a labelled outcome group
            let mut outcomes = vec![self.parse_labelled_outcome().map_err(Failure::cut)?];
            while self.peek_kind() == Some(TokenKind::Comma) {
                self.advance();
                outcomes.push(self.parse_labelled_outcome().map_err(Failure::cut)?);
            }
            let (_, _, rpos) = self
                .expect(TokenKind::RBracket, "outcome")
                .map_err(Failure::cut)?;
            Ok(Outcome::Group(outcomes, Loc::new(lpos, rpos)))
        } else {
            Ok(Outcome::Single(self.parse_entity("outcome")?))
        }
    }

    fn parse_labelled_outcome(&mut self) -> Parse<LabelledOutcome> {
        let (key, key_loc) = self.parse_name("labelled_outcome")?;
        self.expect(TokenKind::Eq, "labelled_outcome")?;
        // cut: past the `=` a phenotype name must follow
        let (phenotype, phen_loc) = self.parse_name("labelled_outcome").map_err(Failure::cut)?;
        Ok(LabelledOutcome {
            key,
            phenotype,
            loc: key_loc.union(&phen_loc),
        })
    }

    /// phenotype-or-variant: `g(name)` or a bare name.
    fn parse_entity(&mut self, rule: &'static str) -> Parse<Entity> {
        if self.peek_kind() == Some(TokenKind::GOpen) {
            let (lpos, _, _) = *self.advance().unwrap();
            // cut: nothing else starts with `g(`
            let (variant, _) = self.parse_name("genotype").map_err(Failure::cut)?;
            let (_, _, rpos) = self
                .expect(TokenKind::RParen, "genotype")
                .map_err(Failure::cut)?;
            Ok(Entity::Genotype(variant, Loc::new(lpos, rpos)))
        } else {
            let (name, loc) = self.parse_name(rule)?;
            Ok(Entity::Phenotype(name, loc))
        }
    }

    fn parse_condition_group(&mut self) -> Parse<Vec<Condition>> {
        let mut conditions = vec![self.parse_condition()?];
        while self.peek_kind() == Some(TokenKind::Comma) {
            self.advance();
            // cut: a condition must follow each `,`
            conditions.push(self.parse_condition().map_err(Failure::cut)?);
        }
        Ok(conditions)
    }

    /// A phenotype-or-variant, optionally followed by `= integer`.
    fn parse_condition(&mut self) -> Parse<Condition> {
        let subject = self.parse_entity("condition")?;
        let mut loc = subject.get_loc();
        let level = if self.peek_kind() == Some(TokenKind::Eq) {
            self.advance();
            // cut: past the `=` a level must follow
            let (level, level_loc) = self.parse_integer("condition").map_err(Failure::cut)?;
            loc = loc.union(&level_loc);
            Some(level)
        } else {
            None
        };
        Ok(Condition {
            subject,
            level,
            loc,
        })
    }

    /// One-or-more expressions separated by `+`.
    fn parse_predictors(&mut self) -> Parse<Vec<Predictor>> {
        let mut predictors = vec![self.parse_expression()?];
        while self.peek_kind() == Some(TokenKind::Plus) {
            self.advance();
            // cut: an expression must follow each `+`
            predictors.push(self.parse_expression().map_err(Failure::cut)?);
        }
        Ok(predictors)
    }

    /// Ordered choice over the predictor forms.  Order matters: the
    /// interaction has to be tried before the plainer alternatives, or a
    /// bare phenotype would win on the first member of what should be an
    /// interaction.
    fn parse_expression(&mut self) -> Parse<Predictor> {
        if self.dialect == Dialect::Full {
            if let Some(result) = self.attempt(|p| p.parse_snps()) {
                return result;
            }
        }

        if self.looks_like_interaction() {
            return self.parse_interaction();
        }

        if let Some(result) = self.attempt(|p| p.parse_genotype_term()) {
            return result;
        }
        if let Some(result) = self.attempt(|p| p.parse_factor()) {
            return result;
        }
        if self.dialect == Dialect::Full {
            if let Some(result) = self.attempt(|p| p.parse_transform(TransformKind::Ln)) {
                return result;
            }
            if let Some(result) = self.attempt(|p| p.parse_transform(TransformKind::Log10)) {
                return result;
            }
            if let Some(result) = self.attempt(|p| p.parse_pow()) {
                return result;
            }
        }
        if let Some(result) = self.attempt(|p| p.parse_plain()) {
            return result;
        }

        // all alternatives exhausted without consuming anything; report the
        // full set of acceptable tokens at this point
        Err(self.soft("expression", expression_expected(self.dialect)))
    }

    /// The and-predicate gating the interaction rule: true when the
    /// upcoming tokens read `(g( name ) | factor( name ) | name) *`.
    /// Inspects token kinds only -- consumes nothing and constructs
    /// nothing, so a failed gate leaves no trace.
    fn looks_like_interaction(&self) -> bool {
        let head_len = match self.kind_at(0) {
            Some(TokenKind::GOpen) => match (self.kind_at(1), self.kind_at(2)) {
                (Some(TokenKind::Ident | TokenKind::Num), Some(TokenKind::RParen)) => 3,
                _ => return false,
            },
            Some(TokenKind::FactorOpen) if self.dialect == Dialect::Full => {
                match (self.kind_at(1), self.kind_at(2)) {
                    (Some(TokenKind::Ident | TokenKind::Num), Some(TokenKind::RParen)) => 3,
                    _ => return false,
                }
            }
            Some(TokenKind::Ident | TokenKind::Num) => 1,
            _ => return false,
        };
        self.kind_at(head_len) == Some(TokenKind::Mul)
    }

    /// A `*`-separated list of members, then an optional alias.  Only
    /// entered when [`Parser::looks_like_interaction`] fired, so at least
    /// one `*` is ahead.
    fn parse_interaction(&mut self) -> Parse<Predictor> {
        let first = self.parse_member()?;
        let mut loc = first.get_loc();
        let mut members = vec![first];
        while self.peek_kind() == Some(TokenKind::Mul) {
            self.advance();
            // cut: a member must follow each `*`
            let member = self.parse_member().map_err(Failure::cut)?;
            loc = loc.union(&member.get_loc());
            members.push(member);
        }
        let (alias, alias_loc) = self.parse_alias()?;
        if let Some(alias_loc) = alias_loc {
            loc = loc.union(&alias_loc);
        }
        Ok(Predictor::Interaction {
            members,
            alias,
            loc,
        })
    }

    /// An interaction member: a phenotype/genotype leaf.  `factor(x)` is
    /// accepted in member position and contributes its phenotype; how a
    /// member gets encoded into design-matrix columns is the consumer's
    /// concern.
    fn parse_member(&mut self) -> Parse<Entity> {
        if self.dialect == Dialect::Full && self.peek_kind() == Some(TokenKind::FactorOpen) {
            let (lpos, _, _) = *self.advance().unwrap();
            let (phen, _) = self.parse_name("interaction").map_err(Failure::cut)?;
            let (_, _, rpos) = self
                .expect(TokenKind::RParen, "interaction")
                .map_err(Failure::cut)?;
            return Ok(Entity::Phenotype(phen, Loc::new(lpos, rpos)));
        }
        self.parse_entity("interaction")
    }

    fn parse_snps(&mut self) -> Parse<Predictor> {
        let (start, _, end) = self.expect(TokenKind::Snps, "expression")?;
        Ok(Predictor::Snps(Loc::new(start, end)))
    }

    fn parse_genotype_term(&mut self) -> Parse<Predictor> {
        if self.peek_kind() != Some(TokenKind::GOpen) {
            return Err(self.soft("genotype", vec!["`g(`"]));
        }
        match self.parse_entity("genotype")? {
            Entity::Genotype(variant, loc) => Ok(Predictor::Genotype(variant, loc)),
            Entity::Phenotype(_, _) => unreachable!(),
        }
    }

    fn parse_factor(&mut self) -> Parse<Predictor> {
        let (lpos, _, _) = self.expect(TokenKind::FactorOpen, "factor")?;
        // cut: committed to a factor term
        let (phen, _) = self.parse_name("factor").map_err(Failure::cut)?;
        let (_, _, rpos) = self
            .expect(TokenKind::RParen, "factor")
            .map_err(Failure::cut)?;
        let (alias, alias_loc) = self.parse_alias()?;
        let mut loc = Loc::new(lpos, rpos);
        if let Some(alias_loc) = alias_loc {
            loc = loc.union(&alias_loc);
        }
        Ok(Predictor::Factor { phen, alias, loc })
    }

    fn parse_transform(&mut self, kind: TransformKind) -> Parse<Predictor> {
        let open = match kind {
            TransformKind::Ln => TokenKind::LnOpen,
            TransformKind::Log10 => TokenKind::Log10Open,
        };
        let (lpos, _, _) = self.expect(open, kind.as_str())?;
        // cut: committed to this transform
        let (phen, _) = self.parse_name(kind.as_str()).map_err(Failure::cut)?;
        let (_, _, rpos) = self
            .expect(TokenKind::RParen, kind.as_str())
            .map_err(Failure::cut)?;
        let (alias, alias_loc) = self.parse_alias()?;
        let mut loc = Loc::new(lpos, rpos);
        if let Some(alias_loc) = alias_loc {
            loc = loc.union(&alias_loc);
        }
        Ok(Predictor::Transform {
            kind,
            phen,
            alias,
            loc,
        })
    }

    fn parse_pow(&mut self) -> Parse<Predictor> {
        let (lpos, _, _) = self.expect(TokenKind::PowOpen, "pow")?;
        // cut: committed to a pow term
        let (phen, _) = self.parse_name("pow").map_err(Failure::cut)?;
        self.expect(TokenKind::Comma, "pow").map_err(Failure::cut)?;
        let (power, _) = self.parse_integer("pow").map_err(Failure::cut)?;
        let (_, _, rpos) = self
            .expect(TokenKind::RParen, "pow")
            .map_err(Failure::cut)?;
        let (alias, alias_loc) = self.parse_alias()?;
        let mut loc = Loc::new(lpos, rpos);
        if let Some(alias_loc) = alias_loc {
            loc = loc.union(&alias_loc);
        }
        Ok(Predictor::Pow {
            phen,
            power,
            alias,
            loc,
        })
    }

    fn parse_plain(&mut self) -> Parse<Predictor> {
        let (name, loc) = self.parse_name("expression")?;
        Ok(Predictor::Plain(name, loc))
    }

    /// Optional `as name` alias suffix.
    fn parse_alias(&mut self) -> Parse<(Option<Ident>, Option<Loc>)> {
        if self.peek_kind() != Some(TokenKind::As) {
            return Ok((None, None));
        }
        self.advance();
        // cut: past the `as` a name must follow
        let (name, loc) = self.parse_name("alias").map_err(Failure::cut)?;
        Ok((Some(name), Some(loc)))
    }
}

/// Parse a model specification against the full grammar.
///
/// Returns the validated [`Model`] AST, or the first syntax or semantic
/// error encountered.  No partial results are ever returned on error.
pub fn parse(spec: &str) -> Result<Model, ParseError> {
    parse_dialect(spec, Dialect::Full)
}

/// Parse a model specification against a specific grammar dialect.
pub fn parse_dialect(spec: &str, dialect: Dialect) -> Result<Model, ParseError> {
    let lexer = Lexer::new(spec);
    let mut parser = Parser::new(spec, lexer, dialect).map_err(ParseError::Syntax)?;
    let model = parser.parse_model().map_err(ParseError::Syntax)?;
    check_model(&model).map_err(ParseError::Semantic)?;
    Ok(model)
}
