// Copyright 2026 The Modelspec Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashSet;

use crate::ast::{Model, Outcome, Predictor};
use crate::common::{ErrorCode, SemanticError};

/// check_model runs the post-parse semantic checks over a Model: outcome
/// keys must be unique, interactions need at least two members, and an
/// alias must not collide with a column label declared earlier in the
/// predictor list.  The first violation in left-to-right, depth-first
/// order wins.
pub(crate) fn check_model(model: &Model) -> Result<(), SemanticError> {
    if let Outcome::Group(outcomes, _) = &model.outcome {
        let mut seen: HashSet<&str> = HashSet::new();
        for labelled in outcomes {
            if !seen.insert(labelled.key.as_str()) {
                return Err(SemanticError {
                    code: ErrorCode::DuplicateOutcomeKey,
                    loc: labelled.loc,
                    detail: Some(format!("outcome key '{}' is declared twice", labelled.key)),
                });
            }
        }
    }

    // Each predictor claims a column label (its alias, or its own
    // rendering).  Only an alias declaration can collide: duplicate plain
    // terms are redundant but harmless, and the first occurrence of any
    // label wins.
    let mut declared: HashSet<String> = HashSet::new();
    for predictor in &model.predictors {
        if let Predictor::Interaction { members, loc, .. } = predictor {
            if members.len() < 2 {
                return Err(SemanticError {
                    code: ErrorCode::TooFewInteractionMembers,
                    loc: *loc,
                    detail: Some("an interaction needs at least two members".to_string()),
                });
            }
        }

        let label = predictor.column_label();
        if predictor.alias().is_some() && declared.contains(&label) {
            return Err(SemanticError {
                code: ErrorCode::DuplicateAlias,
                loc: predictor.get_loc(),
                detail: Some(format!("alias '{label}' collides with an earlier term")),
            });
        }
        declared.insert(label);
    }

    Ok(())
}
