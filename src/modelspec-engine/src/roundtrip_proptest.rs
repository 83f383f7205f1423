// Copyright 2026 The Modelspec Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Property-based tests for parsing and serialization using proptest.
//!
//! Strategies build arbitrary valid `Model` values; the properties check
//! that the canonical text rendering reparses to the same structure, and
//! that the JSON mirror types are lossless.

use proptest::prelude::*;

use crate::ast::{Condition, Entity, LabelledOutcome, Model, Outcome, Predictor, TransformKind};
use crate::common::{Ident, Loc};
use crate::json;
use crate::parse;
use crate::validate::check_model;

fn arb_name() -> impl Strategy<Value = Ident> {
    "[A-Za-z_][A-Za-z0-9_:]{0,11}"
        .prop_filter("keywords are not names", |s| s != "as" && s != "SNPs")
        .prop_map(Ident::new)
}

fn arb_entity() -> impl Strategy<Value = Entity> {
    prop_oneof![
        arb_name().prop_map(|name| Entity::Phenotype(name, Loc::default())),
        arb_name().prop_map(|name| Entity::Genotype(name, Loc::default())),
    ]
}

fn arb_alias() -> impl Strategy<Value = Option<Ident>> {
    prop::option::of(arb_name())
}

fn arb_predictor() -> impl Strategy<Value = Predictor> {
    prop_oneof![
        Just(Predictor::Snps(Loc::default())),
        (prop::collection::vec(arb_entity(), 2..4), arb_alias()).prop_map(|(members, alias)| {
            Predictor::Interaction {
                members,
                alias,
                loc: Loc::default(),
            }
        }),
        arb_name().prop_map(|variant| Predictor::Genotype(variant, Loc::default())),
        (arb_name(), arb_alias()).prop_map(|(phen, alias)| Predictor::Factor {
            phen,
            alias,
            loc: Loc::default(),
        }),
        (
            prop_oneof![Just(TransformKind::Ln), Just(TransformKind::Log10)],
            arb_name(),
            arb_alias()
        )
            .prop_map(|(kind, phen, alias)| Predictor::Transform {
                kind,
                phen,
                alias,
                loc: Loc::default(),
            }),
        (arb_name(), 0u32..1000, arb_alias()).prop_map(|(phen, power, alias)| Predictor::Pow {
            phen,
            power,
            alias,
            loc: Loc::default(),
        }),
        arb_name().prop_map(|name| Predictor::Plain(name, Loc::default())),
    ]
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        arb_entity().prop_map(Outcome::Single),
        prop::collection::vec((arb_name(), arb_name()), 1..4).prop_map(|pairs| {
            // keys get an index suffix so the group always validates
            let outcomes = pairs
                .into_iter()
                .enumerate()
                .map(|(i, (key, phenotype))| LabelledOutcome {
                    key: Ident::new(format!("{}_{}", key.as_str(), i)),
                    phenotype,
                    loc: Loc::default(),
                })
                .collect();
            Outcome::Group(outcomes, Loc::default())
        }),
    ]
}

fn arb_conditions() -> impl Strategy<Value = Option<Vec<Condition>>> {
    prop::option::of(prop::collection::vec(
        (arb_entity(), prop::option::of(0u32..100)).prop_map(|(subject, level)| Condition {
            subject,
            level,
            loc: Loc::default(),
        }),
        1..3,
    ))
}

fn arb_model() -> impl Strategy<Value = Model> {
    (
        arb_outcome(),
        arb_conditions(),
        prop::collection::vec(arb_predictor(), 1..5),
    )
        .prop_map(|(outcome, conditions, predictors)| Model {
            outcome,
            conditions,
            predictors,
        })
        .prop_filter("model must pass semantic checks", |model| {
            check_model(model).is_ok()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn roundtrip_format_then_parse(model in arb_model()) {
        let text = model.to_string();
        let reparsed = parse(&text)
            .unwrap_or_else(|e| panic!("'{text}' failed to reparse: {e}"));
        prop_assert_eq!(model.clone().strip_loc(), reparsed.strip_loc());
    }

    #[test]
    fn roundtrip_json(model in arb_model()) {
        let wire = json::Model::from(&model);
        let text = serde_json::to_string(&wire).unwrap();
        let back: json::Model = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(&wire, &back);

        let restored = crate::ast::Model::try_from(back).unwrap();
        prop_assert_eq!(model.clone().strip_loc(), restored.strip_loc());
    }

    #[test]
    fn parse_never_panics(input in "\\PC{0,48}") {
        let _ = parse(&input);
    }
}
