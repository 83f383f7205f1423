// Copyright 2026 The Modelspec Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! JSON serialization for model specifications.
//!
//! Provides a stable wire form of the AST for downstream consumers, as
//! mirror types with serde derives so the core AST stays serde-free.
//! Deserialized values are re-validated on conversion back into the AST:
//! names are checked against the grammar's name pattern and the semantic
//! checks rerun, so a hand-edited JSON document can't smuggle in a model
//! the parser would have rejected.
//!
//! # Example
//! ```
//! use modelspec_engine::{json, parse};
//!
//! let model = parse("y ~ x1 + factor(x2) as site").unwrap();
//! let wire = json::Model::from(&model);
//! let text = serde_json::to_string(&wire).unwrap();
//! let back: json::Model = serde_json::from_str(&text).unwrap();
//! assert_eq!(wire, back);
//! ```

use serde::{Deserialize, Serialize};

use crate::ast;
use crate::common::{ErrorCode, Ident, Loc, ParseError, SemanticError, is_valid_name};
use crate::validate::check_model;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Phenotype { name: String },
    Genotype { variant: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledOutcome {
    pub key: String,
    pub phenotype: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Single { entity: Entity },
    Group { outcomes: Vec<LabelledOutcome> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub subject: Entity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predictor {
    Snps,
    Interaction {
        members: Vec<Entity>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
    Genotype {
        variant: String,
    },
    Factor {
        phen: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
    Ln {
        phen: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
    Log10 {
        phen: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
    Pow {
        phen: String,
        power: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
    Plain {
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    pub predictors: Vec<Predictor>,
}

impl From<&ast::Entity> for Entity {
    fn from(entity: &ast::Entity) -> Self {
        match entity {
            ast::Entity::Phenotype(name, _) => Entity::Phenotype {
                name: name.as_str().to_string(),
            },
            ast::Entity::Genotype(variant, _) => Entity::Genotype {
                variant: variant.as_str().to_string(),
            },
        }
    }
}

impl From<&ast::Outcome> for Outcome {
    fn from(outcome: &ast::Outcome) -> Self {
        match outcome {
            ast::Outcome::Single(entity) => Outcome::Single {
                entity: entity.into(),
            },
            ast::Outcome::Group(outcomes, _) => Outcome::Group {
                outcomes: outcomes
                    .iter()
                    .map(|o| LabelledOutcome {
                        key: o.key.as_str().to_string(),
                        phenotype: o.phenotype.as_str().to_string(),
                    })
                    .collect(),
            },
        }
    }
}

impl From<&ast::Condition> for Condition {
    fn from(condition: &ast::Condition) -> Self {
        Condition {
            subject: (&condition.subject).into(),
            level: condition.level,
        }
    }
}

fn alias_string(alias: &Option<Ident>) -> Option<String> {
    alias.as_ref().map(|a| a.as_str().to_string())
}

impl From<&ast::Predictor> for Predictor {
    fn from(predictor: &ast::Predictor) -> Self {
        match predictor {
            ast::Predictor::Snps(_) => Predictor::Snps,
            ast::Predictor::Interaction { members, alias, .. } => Predictor::Interaction {
                members: members.iter().map(Entity::from).collect(),
                alias: alias_string(alias),
            },
            ast::Predictor::Genotype(variant, _) => Predictor::Genotype {
                variant: variant.as_str().to_string(),
            },
            ast::Predictor::Factor { phen, alias, .. } => Predictor::Factor {
                phen: phen.as_str().to_string(),
                alias: alias_string(alias),
            },
            ast::Predictor::Transform {
                kind: ast::TransformKind::Ln,
                phen,
                alias,
                ..
            } => Predictor::Ln {
                phen: phen.as_str().to_string(),
                alias: alias_string(alias),
            },
            ast::Predictor::Transform {
                kind: ast::TransformKind::Log10,
                phen,
                alias,
                ..
            } => Predictor::Log10 {
                phen: phen.as_str().to_string(),
                alias: alias_string(alias),
            },
            ast::Predictor::Pow {
                phen, power, alias, ..
            } => Predictor::Pow {
                phen: phen.as_str().to_string(),
                power: *power,
                alias: alias_string(alias),
            },
            ast::Predictor::Plain(name, _) => Predictor::Plain {
                name: name.as_str().to_string(),
            },
        }
    }
}

impl From<&ast::Model> for Model {
    fn from(model: &ast::Model) -> Self {
        Model {
            outcome: (&model.outcome).into(),
            conditions: model
                .conditions
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(Condition::from)
                .collect(),
            predictors: model.predictors.iter().map(Predictor::from).collect(),
        }
    }
}

// Conversions back into the AST.  JSON carries no source spans, so
// everything gets a default Loc.

fn ident(s: String, what: &'static str) -> Result<Ident, ParseError> {
    if is_valid_name(&s) {
        Ok(Ident::new(s))
    } else {
        Err(ParseError::Semantic(SemanticError {
            code: ErrorCode::InvalidName,
            loc: Loc::default(),
            detail: Some(format!("invalid {what} '{s}'")),
        }))
    }
}

fn alias_ident(alias: Option<String>) -> Result<Option<Ident>, ParseError> {
    alias.map(|a| ident(a, "alias")).transpose()
}

impl TryFrom<Entity> for ast::Entity {
    type Error = ParseError;

    fn try_from(entity: Entity) -> Result<Self, Self::Error> {
        match entity {
            Entity::Phenotype { name } => Ok(ast::Entity::Phenotype(
                ident(name, "phenotype name")?,
                Loc::default(),
            )),
            Entity::Genotype { variant } => Ok(ast::Entity::Genotype(
                ident(variant, "variant id")?,
                Loc::default(),
            )),
        }
    }
}

impl TryFrom<Outcome> for ast::Outcome {
    type Error = ParseError;

    fn try_from(outcome: Outcome) -> Result<Self, Self::Error> {
        match outcome {
            Outcome::Single { entity } => Ok(ast::Outcome::Single(entity.try_into()?)),
            Outcome::Group { outcomes } => Ok(ast::Outcome::Group(
                outcomes
                    .into_iter()
                    .map(|o| {
                        Ok(ast::LabelledOutcome {
                            key: ident(o.key, "outcome key")?,
                            phenotype: ident(o.phenotype, "phenotype name")?,
                            loc: Loc::default(),
                        })
                    })
                    .collect::<Result<Vec<_>, ParseError>>()?,
                Loc::default(),
            )),
        }
    }
}

impl TryFrom<Condition> for ast::Condition {
    type Error = ParseError;

    fn try_from(condition: Condition) -> Result<Self, Self::Error> {
        Ok(ast::Condition {
            subject: condition.subject.try_into()?,
            level: condition.level,
            loc: Loc::default(),
        })
    }
}

impl TryFrom<Predictor> for ast::Predictor {
    type Error = ParseError;

    fn try_from(predictor: Predictor) -> Result<Self, Self::Error> {
        let loc = Loc::default();
        match predictor {
            Predictor::Snps => Ok(ast::Predictor::Snps(loc)),
            Predictor::Interaction { members, alias } => Ok(ast::Predictor::Interaction {
                members: members
                    .into_iter()
                    .map(ast::Entity::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
                alias: alias_ident(alias)?,
                loc,
            }),
            Predictor::Genotype { variant } => Ok(ast::Predictor::Genotype(
                ident(variant, "variant id")?,
                loc,
            )),
            Predictor::Factor { phen, alias } => Ok(ast::Predictor::Factor {
                phen: ident(phen, "phenotype name")?,
                alias: alias_ident(alias)?,
                loc,
            }),
            Predictor::Ln { phen, alias } => Ok(ast::Predictor::Transform {
                kind: ast::TransformKind::Ln,
                phen: ident(phen, "phenotype name")?,
                alias: alias_ident(alias)?,
                loc,
            }),
            Predictor::Log10 { phen, alias } => Ok(ast::Predictor::Transform {
                kind: ast::TransformKind::Log10,
                phen: ident(phen, "phenotype name")?,
                alias: alias_ident(alias)?,
                loc,
            }),
            Predictor::Pow { phen, power, alias } => Ok(ast::Predictor::Pow {
                phen: ident(phen, "phenotype name")?,
                power,
                alias: alias_ident(alias)?,
                loc,
            }),
            Predictor::Plain { name } => Ok(ast::Predictor::Plain(
                ident(name, "phenotype name")?,
                loc,
            )),
        }
    }
}

impl TryFrom<Model> for ast::Model {
    type Error = ParseError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let conditions = if model.conditions.is_empty() {
            None
        } else {
            Some(
                model
                    .conditions
                    .into_iter()
                    .map(ast::Condition::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            )
        };
        let model = ast::Model {
            outcome: model.outcome.try_into()?,
            conditions,
            predictors: model
                .predictors
                .into_iter()
                .map(ast::Predictor::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        };
        check_model(&model).map_err(ParseError::Semantic)?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_wire_roundtrip() {
        let model =
            parse("[tte=t, event=e] | g(rs1), site = 2 ~ age + factor(apoe) as apoe + SNPs")
                .unwrap();
        let wire = Model::from(&model);
        let text = serde_json::to_string(&wire).unwrap();
        let back: Model = serde_json::from_str(&text).unwrap();
        assert_eq!(wire, back);

        let restored = ast::Model::try_from(back).unwrap();
        assert_eq!(restored.strip_loc(), model.strip_loc());
    }

    #[test]
    fn test_absent_conditions_are_omitted() {
        let model = parse("y ~ x").unwrap();
        let text = serde_json::to_string(&Model::from(&model)).unwrap();
        assert!(!text.contains("conditions"));
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        let wire = Model {
            outcome: Outcome::Single {
                entity: Entity::Phenotype {
                    name: "y".to_string(),
                },
            },
            conditions: vec![],
            predictors: vec![Predictor::Plain {
                name: "not a name".to_string(),
            }],
        };
        let err = ast::Model::try_from(wire).unwrap_err();
        match err {
            ParseError::Semantic(e) => assert_eq!(ErrorCode::InvalidName, e.code),
            other => panic!("expected semantic error, got {other:?}"),
        }
    }

    #[test]
    fn test_undersized_interaction_is_rejected() {
        let wire = Model {
            outcome: Outcome::Single {
                entity: Entity::Phenotype {
                    name: "y".to_string(),
                },
            },
            conditions: vec![],
            predictors: vec![Predictor::Interaction {
                members: vec![Entity::Phenotype {
                    name: "x".to_string(),
                }],
                alias: None,
            }],
        };
        let err = ast::Model::try_from(wire).unwrap_err();
        match err {
            ParseError::Semantic(e) => {
                assert_eq!(ErrorCode::TooFewInteractionMembers, e.code)
            }
            other => panic!("expected semantic error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_alias_is_rejected() {
        let wire = Model {
            outcome: Outcome::Single {
                entity: Entity::Phenotype {
                    name: "y".to_string(),
                },
            },
            conditions: vec![],
            predictors: vec![
                Predictor::Plain {
                    name: "x".to_string(),
                },
                Predictor::Factor {
                    phen: "site".to_string(),
                    alias: Some("x".to_string()),
                },
            ],
        };
        let err = ast::Model::try_from(wire).unwrap_err();
        match err {
            ParseError::Semantic(e) => assert_eq!(ErrorCode::DuplicateAlias, e.code),
            other => panic!("expected semantic error, got {other:?}"),
        }
    }
}
