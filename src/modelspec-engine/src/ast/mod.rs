// Copyright 2026 The Modelspec Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;

use crate::common::{Ident, Loc};

/// An observed phenotype or a genetic-variant reference: the leaf subjects
/// that outcomes, conditions, and interaction members draw from.
#[derive(PartialEq, Eq, Clone, Debug, Hash)]
pub enum Entity {
    Phenotype(Ident, Loc),
    Genotype(Ident, Loc),
}

impl Entity {
    pub fn name(&self) -> &Ident {
        match self {
            Entity::Phenotype(name, _) => name,
            Entity::Genotype(name, _) => name,
        }
    }

    pub fn get_loc(&self) -> Loc {
        match self {
            Entity::Phenotype(_, loc) => *loc,
            Entity::Genotype(_, loc) => *loc,
        }
    }

    #[cfg(test)]
    pub(crate) fn strip_loc(self) -> Self {
        let loc = Loc::default();
        match self {
            Entity::Phenotype(name, _loc) => Entity::Phenotype(name, loc),
            Entity::Genotype(name, _loc) => Entity::Genotype(name, loc),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Phenotype(name, _) => write!(f, "{name}"),
            Entity::Genotype(name, _) => write!(f, "g({name})"),
        }
    }
}

/// One tagged slot of a multi-outcome model, e.g. the `tte=t` in
/// `[tte=t, event=e]`.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct LabelledOutcome {
    pub key: Ident,
    pub phenotype: Ident,
    pub loc: Loc,
}

impl LabelledOutcome {
    #[cfg(test)]
    pub(crate) fn strip_loc(self) -> Self {
        LabelledOutcome {
            loc: Loc::default(),
            ..self
        }
    }
}

impl fmt::Display for LabelledOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.phenotype)
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Outcome {
    Single(Entity),
    Group(Vec<LabelledOutcome>, Loc),
}

impl Outcome {
    pub fn get_loc(&self) -> Loc {
        match self {
            Outcome::Single(entity) => entity.get_loc(),
            Outcome::Group(_, loc) => *loc,
        }
    }

    #[cfg(test)]
    pub(crate) fn strip_loc(self) -> Self {
        match self {
            Outcome::Single(entity) => Outcome::Single(entity.strip_loc()),
            Outcome::Group(outcomes, _loc) => Outcome::Group(
                outcomes.into_iter().map(|o| o.strip_loc()).collect(),
                Loc::default(),
            ),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Single(entity) => write!(f, "{entity}"),
            Outcome::Group(outcomes, _) => {
                write!(f, "[")?;
                for (i, outcome) in outcomes.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{outcome}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A stratification constraint: subset the sample where the subject equals
/// the level, or stratify over the subject's distinct values when no level
/// is given.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Condition {
    pub subject: Entity,
    pub level: Option<u32>,
    pub loc: Loc,
}

impl Condition {
    #[cfg(test)]
    pub(crate) fn strip_loc(self) -> Self {
        Condition {
            subject: self.subject.strip_loc(),
            level: self.level,
            loc: Loc::default(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.subject)?;
        if let Some(level) = self.level {
            write!(f, " = {level}")?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Ln,
    Log10,
}

impl TransformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformKind::Ln => "ln",
            TransformKind::Log10 => "log10",
        }
    }
}

/// A single additive term on the right-hand side of a model specification.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Predictor {
    /// GWAS placeholder: the consumer fits the model once per variant,
    /// substituting that variant's genotypes for this term.
    Snps(Loc),
    Interaction {
        members: Vec<Entity>,
        alias: Option<Ident>,
        loc: Loc,
    },
    Genotype(Ident, Loc),
    Factor {
        phen: Ident,
        alias: Option<Ident>,
        loc: Loc,
    },
    Transform {
        kind: TransformKind,
        phen: Ident,
        alias: Option<Ident>,
        loc: Loc,
    },
    Pow {
        phen: Ident,
        power: u32,
        alias: Option<Ident>,
        loc: Loc,
    },
    Plain(Ident, Loc),
}

impl Predictor {
    pub fn alias(&self) -> Option<&Ident> {
        match self {
            Predictor::Snps(_) | Predictor::Genotype(_, _) | Predictor::Plain(_, _) => None,
            Predictor::Interaction { alias, .. } => alias.as_ref(),
            Predictor::Factor { alias, .. } => alias.as_ref(),
            Predictor::Transform { alias, .. } => alias.as_ref(),
            Predictor::Pow { alias, .. } => alias.as_ref(),
        }
    }

    pub fn get_loc(&self) -> Loc {
        match self {
            Predictor::Snps(loc) => *loc,
            Predictor::Interaction { loc, .. } => *loc,
            Predictor::Genotype(_, loc) => *loc,
            Predictor::Factor { loc, .. } => *loc,
            Predictor::Transform { loc, .. } => *loc,
            Predictor::Pow { loc, .. } => *loc,
            Predictor::Plain(_, loc) => *loc,
        }
    }

    /// column_label returns the name the design-matrix column for this term
    /// gets in output: the alias when one was given, otherwise the canonical
    /// rendering of the term itself.
    pub fn column_label(&self) -> String {
        match self.alias() {
            Some(alias) => alias.as_str().to_string(),
            None => self.render_base(),
        }
    }

    // the term without its alias suffix
    fn render_base(&self) -> String {
        match self {
            Predictor::Snps(_) => "SNPs".to_string(),
            Predictor::Interaction { members, .. } => members
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(" * "),
            Predictor::Genotype(variant, _) => format!("g({variant})"),
            Predictor::Factor { phen, .. } => format!("factor({phen})"),
            Predictor::Transform { kind, phen, .. } => format!("{}({phen})", kind.as_str()),
            Predictor::Pow { phen, power, .. } => format!("pow({phen}, {power})"),
            Predictor::Plain(name, _) => name.as_str().to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn strip_loc(self) -> Self {
        let loc = Loc::default();
        match self {
            Predictor::Snps(_loc) => Predictor::Snps(loc),
            Predictor::Interaction {
                members, alias, ..
            } => Predictor::Interaction {
                members: members.into_iter().map(|m| m.strip_loc()).collect(),
                alias,
                loc,
            },
            Predictor::Genotype(variant, _loc) => Predictor::Genotype(variant, loc),
            Predictor::Factor { phen, alias, .. } => Predictor::Factor { phen, alias, loc },
            Predictor::Transform {
                kind, phen, alias, ..
            } => Predictor::Transform {
                kind,
                phen,
                alias,
                loc,
            },
            Predictor::Pow {
                phen, power, alias, ..
            } => Predictor::Pow {
                phen,
                power,
                alias,
                loc,
            },
            Predictor::Plain(name, _loc) => Predictor::Plain(name, loc),
        }
    }
}

impl fmt::Display for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_base())?;
        if let Some(alias) = self.alias() {
            write!(f, " as {alias}")?;
        }
        Ok(())
    }
}

/// The root AST: the parser's sole deliverable.  Immutable once built;
/// downstream statistical code consumes it to construct design matrices,
/// subset or stratify samples, and resolve genotype references.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Model {
    pub outcome: Outcome,
    pub conditions: Option<Vec<Condition>>,
    pub predictors: Vec<Predictor>,
}

impl Model {
    pub fn get_loc(&self) -> Loc {
        let mut loc = self.outcome.get_loc();
        for predictor in &self.predictors {
            loc = loc.union(&predictor.get_loc());
        }
        loc
    }

    #[cfg(test)]
    pub(crate) fn strip_loc(self) -> Self {
        Model {
            outcome: self.outcome.strip_loc(),
            conditions: self
                .conditions
                .map(|conditions| conditions.into_iter().map(|c| c.strip_loc()).collect()),
            predictors: self
                .predictors
                .into_iter()
                .map(|p| p.strip_loc())
                .collect(),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.outcome)?;
        if let Some(conditions) = &self.conditions {
            write!(f, " | ")?;
            for (i, condition) in conditions.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{condition}")?;
            }
        }
        write!(f, " ~ ")?;
        for (i, predictor) in self.predictors.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{predictor}")?;
        }
        Ok(())
    }
}
