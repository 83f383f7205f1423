// Copyright 2026 The Modelspec Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Parser for the model-specification language used in genetic and
//! epidemiological analyses.
//!
//! A model specification is a short text like `y ~ x1 + x2`,
//! `y | g(rs12345) ~ x`, or `[tte=t, event=e] ~ age + SNPs`: an outcome
//! (one phenotype, or a labelled group for survival/competing-risk
//! models), optional stratification conditions after `|`, and a
//! `+`-separated list of predictor terms after `~`.  [`parse`] turns such
//! text into a validated [`Model`] AST; downstream statistical code
//! consumes the AST to build design matrices, stratify samples, and
//! substitute genotypes for the `SNPs` placeholder.
//!
//! Predictor terms cover plain phenotypes, genotype references
//! (`g(rs123)`), categorical factors (`factor(x)`), log transforms
//! (`ln(x)`, `log10(x)`), integer powers (`pow(x, 2)`), interactions
//! (`x1 * x2`), and the `SNPs` GWAS placeholder; the composite forms take
//! an optional `as name` alias.

#![forbid(unsafe_code)]

pub mod ast;
pub mod common;
pub mod json;
mod parser;
mod token;
mod validate;

#[cfg(test)]
mod roundtrip_proptest;

pub use self::ast::Model;
pub use self::common::{
    ErrorCode, Ident, Loc, ParseError, ParseResult, SemanticError, SyntaxError, is_valid_name,
};
pub use self::parser::{Dialect, parse, parse_dialect};
