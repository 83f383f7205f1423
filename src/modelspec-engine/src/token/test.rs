// Copyright 2026 The Modelspec Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use super::Token::*;
use super::{Lexer, Token};
use crate::common::ErrorCode;

fn test(input: &str, expected: Vec<(&str, Token)>) {
    let tokenizer = Lexer::new(input);
    let len = expected.len();
    for (token, (expected_span, expected_tok)) in tokenizer.zip(expected.into_iter()) {
        let expected_start = expected_span.find('~').unwrap();
        let expected_end = expected_span.rfind('~').unwrap() + 1;
        assert_eq!(Ok((expected_start, expected_tok, expected_end)), token);
    }

    let tokenizer = Lexer::new(input);
    assert_eq!(None, tokenizer.skip(len).next());
}

fn test_err(input: &str, expected: (&str, ErrorCode)) {
    let tokenizer = Lexer::new(input);
    let token = tokenizer.into_iter().last().unwrap();
    let (expected_span, expected_code) = expected;
    let expected_start = expected_span.find('~').unwrap();
    let expected_end = expected_span.rfind('~').unwrap() + 1;
    let err = token.unwrap_err();
    assert_eq!(expected_start as u16, err.start);
    assert_eq!(expected_end as u16, err.end);
    assert_eq!(expected_code, err.code);
}

#[test]
fn formula() {
    test(
        "y ~ x1 + x2",
        vec![
            ("~          ", Ident("y")),
            ("  ~        ", Tilde),
            ("    ~~     ", Ident("x1")),
            ("       ~   ", Plus),
            ("         ~~", Ident("x2")),
        ],
    );
}

#[test]
fn conditions() {
    test(
        "y | d = 2",
        vec![
            ("~        ", Ident("y")),
            ("  ~      ", Pipe),
            ("    ~    ", Ident("d")),
            ("      ~  ", Eq),
            ("        ~", Num("2")),
        ],
    );
}

#[test]
fn genotype_call() {
    test(
        "g(rs123)",
        vec![
            ("~~      ", GOpen),
            ("  ~~~~~ ", Ident("rs123")),
            ("       ~", RParen),
        ],
    );
}

#[test]
fn spaced_paren_is_not_a_call() {
    test(
        "g (x)",
        vec![
            ("~    ", Ident("g")),
            ("  ~  ", LParen),
            ("   ~ ", Ident("x")),
            ("    ~", RParen),
        ],
    );
}

#[test]
fn factor_call() {
    test(
        "factor(w)",
        vec![
            ("~~~~~~~  ", FactorOpen),
            ("       ~ ", Ident("w")),
            ("        ~", RParen),
        ],
    );
}

#[test]
fn ln_call() {
    test(
        "ln(x)",
        vec![
            ("~~~  ", LnOpen),
            ("   ~ ", Ident("x")),
            ("    ~", RParen),
        ],
    );
}

#[test]
fn log10_call() {
    test(
        "log10(y)",
        vec![
            ("~~~~~~  ", Log10Open),
            ("      ~ ", Ident("y")),
            ("       ~", RParen),
        ],
    );
}

#[test]
fn pow_call() {
    test(
        "pow(z, 2)",
        vec![
            ("~~~~     ", PowOpen),
            ("    ~    ", Ident("z")),
            ("     ~   ", Comma),
            ("       ~ ", Num("2")),
            ("        ~", RParen),
        ],
    );
}

#[test]
fn opener_words_are_plain_names_without_a_paren() {
    test(
        "ln + pow",
        vec![
            ("~~      ", Ident("ln")),
            ("   ~    ", Plus),
            ("     ~~~", Ident("pow")),
        ],
    );
}

#[test]
fn interaction() {
    test(
        "x1 * x2",
        vec![
            ("~~     ", Ident("x1")),
            ("   ~   ", Mul),
            ("     ~~", Ident("x2")),
        ],
    );
}

#[test]
fn keywords_are_case_sensitive() {
    test(
        "as AS SNPs snps",
        vec![
            ("~~             ", As),
            ("   ~~          ", Ident("AS")),
            ("      ~~~~     ", Snps),
            ("           ~~~~", Ident("snps")),
        ],
    );
}

#[test]
fn colons_in_names() {
    test("chr1:123", vec![("~~~~~~~~", Ident("chr1:123"))]);
}

#[test]
fn digit_runs() {
    test(
        "123 1a2",
        vec![("~~~    ", Num("123")), ("    ~~~", Ident("1a2"))],
    );
}

#[test]
fn underscores() {
    test(
        "_3 n3_",
        vec![("~~    ", Ident("_3")), ("   ~~~", Ident("n3_"))],
    );
}

#[test]
fn labelled_group() {
    test(
        "[tte=t]",
        vec![
            ("~      ", LBracket),
            (" ~~~   ", Ident("tte")),
            ("    ~  ", Eq),
            ("     ~ ", Ident("t")),
            ("      ~", RBracket),
        ],
    );
}

#[test]
fn snps_with_paren_is_not_an_opener() {
    test(
        "SNPs(x)",
        vec![
            ("~~~~   ", Snps),
            ("    ~  ", LParen),
            ("     ~ ", Ident("x")),
            ("      ~", RParen),
        ],
    );
}

#[test]
fn whitespace_is_insignificant() {
    test(
        "  y\t~\n x ",
        vec![
            ("  ~      ", Ident("y")),
            ("    ~    ", Tilde),
            ("       ~ ", Ident("x")),
        ],
    );
}

#[test]
fn unrecognized_token() {
    test_err("y ^", ("  ~", ErrorCode::UnrecognizedToken));
}

#[test]
fn unrecognized_token_alone() {
    test_err("%", ("~", ErrorCode::UnrecognizedToken));
}
