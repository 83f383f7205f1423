// Copyright 2026 The Modelspec Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::str::CharIndices;

use self::Token::*;
use crate::common::ErrorCode::*;
use crate::common::{ErrorCode, SyntaxError};

#[cfg(test)]
mod test;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Token<'input> {
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
    Ident(&'input str),
    Num(&'input str),
}

pub type Spanned<T> = (usize, T, usize);

pub struct Lexer<'input> {
    text: &'input str,
    chars: CharIndices<'input>,
    lookahead: Option<(usize, char)>,
}

// keywords are case-sensitive: `snps` is an ordinary name
const KEYWORDS: &[(&str, Token<'static>)] = &[("as", As), ("SNPs", Snps)];

// words that form a single opener token, but only when the paren is flush
// against the word: `g (x)` is a name followed by a stray paren
const OPENERS: &[(&str, Token<'static>)] = &[
    ("g", GOpen),
    ("factor", FactorOpen),
    ("pow", PowOpen),
    ("ln", LnOpen),
    ("log10", Log10Open),
];

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        let mut t = Lexer {
            text: input,
            chars: input.char_indices(),
            lookahead: None,
        };
        t.bump();
        t
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        self.lookahead = self.chars.next();
        self.lookahead
    }

    fn word(&mut self, idx0: usize) -> Spanned<&'input str> {
        match self.take_while(is_name_char) {
            Some(end) => (idx0, &self.text[idx0..end], end),
            None => (idx0, &self.text[idx0..], self.text.len()),
        }
    }

    fn take_while<F>(&mut self, mut keep_going: F) -> Option<usize>
    where
        F: FnMut(char) -> bool,
    {
        loop {
            match self.lookahead {
                None => {
                    return None;
                }
                Some((idx1, c)) => {
                    if !keep_going(c) {
                        return Some(idx1);
                    } else {
                        self.bump();
                    }
                }
            }
        }
    }

    fn identifierish(&mut self, idx0: usize) -> Spanned<Token<'input>> {
        let (start, word, end) = self.word(idx0);

        // an opener like `factor(` is one token when the paren immediately
        // follows the word; the lookahead after the word scan is exactly
        // that next character
        if let Some(&(_, opener)) = OPENERS.iter().find(|&&(w, _)| w == word) {
            if let Some((idx1, '(')) = self.lookahead {
                self.bump();
                return (start, opener, idx1 + 1);
            }
        }

        let tok = KEYWORDS
            .iter()
            .filter(|&&(w, _)| w == word)
            .map(|(_, t)| *t)
            .next()
            .unwrap_or_else(|| {
                if word.bytes().all(|b| b.is_ascii_digit()) {
                    Num(word)
                } else {
                    Ident(word)
                }
            });

        (start, tok, end)
    }

    fn error(
        &self,
        code: ErrorCode,
        start: usize,
        end: usize,
    ) -> Result<Spanned<Token<'input>>, SyntaxError> {
        Err(SyntaxError {
            start: start as u16,
            end: end as u16,
            code,
            rule: "token",
            expected: Vec::new(),
            found: Some(self.text[start..end].to_string()),
        })
    }

    #[allow(clippy::unnecessary_wraps)]
    fn consume(
        &mut self,
        i: usize,
        tok: Token<'input>,
        len: usize,
    ) -> Option<Result<Spanned<Token<'input>>, SyntaxError>> {
        self.bump();
        Some(Ok((i, tok, i + len)))
    }
}

impl<'input> Iterator for Lexer<'input> {
    type Item = Result<Spanned<Token<'input>>, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            return match self.lookahead {
                Some((i, '|')) => self.consume(i, Pipe, 1),
                Some((i, '~')) => self.consume(i, Tilde, 1),
                Some((i, '+')) => self.consume(i, Plus, 1),
                Some((i, '*')) => self.consume(i, Mul, 1),
                Some((i, ',')) => self.consume(i, Comma, 1),
                Some((i, '=')) => self.consume(i, Eq, 1),
                Some((i, '(')) => self.consume(i, LParen, 1),
                Some((i, ')')) => self.consume(i, RParen, 1),
                Some((i, '[')) => self.consume(i, LBracket, 1),
                Some((i, ']')) => self.consume(i, RBracket, 1),
                Some((i, c)) if is_name_char(c) => Some(Ok(self.identifierish(i))),
                Some((_, c)) if c.is_whitespace() => {
                    self.bump();
                    continue;
                }
                Some((i, _)) => {
                    self.bump(); // eat whatever is killing us
                    let end = match self.lookahead {
                        Some((end, _)) => end,
                        None => self.text.len(),
                    };
                    Some(self.error(UnrecognizedToken, i, end))
                }
                None => None,
            };
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}
