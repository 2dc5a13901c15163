//! # Column selection
//!
//! Steps declare the columns they operate on with a [`Selector`], an ordered
//! list of include/exclude terms. Resolution happens against the variable
//! information ([`VarInfo`]) known at fit time, never at construction.

use std::fmt;

use crate::error::{StepError, StepResult};
use crate::frame::{ColumnData, DataFrame};

pub const PREDICTOR: &str = "predictor";
pub const OUTCOME: &str = "outcome";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Numeric,
    Nominal,
    Logical,
}

impl VarType {
    pub fn of(data: &ColumnData) -> Self {
        match data {
            ColumnData::Double(_) | ColumnData::Integer(_) => VarType::Numeric,
            ColumnData::Logical(_) => VarType::Logical,
            ColumnData::Text(_) => VarType::Nominal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VarType::Numeric => "numeric",
            VarType::Nominal => "nominal",
            VarType::Logical => "logical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Original,
    Derived,
}

/// Schema entry for one variable as seen by the pipeline at a given point.
#[derive(Debug, Clone, PartialEq)]
pub struct VarInfo {
    pub variable: String,
    pub var_type: VarType,
    pub role: Option<String>,
    pub source: Source,
}

impl VarInfo {
    pub fn new(variable: impl Into<String>, var_type: VarType, role: Option<&str>, source: Source) -> Self {
        VarInfo {
            variable: variable.into(),
            var_type,
            role: role.map(str::to_string),
            source,
        }
    }

    /// Infers one entry per column. Columns listed in `outcomes` get the
    /// outcome role, everything else is a predictor.
    pub fn from_frame(data: &DataFrame, outcomes: &[&str]) -> Vec<VarInfo> {
        data.columns()
            .iter()
            .map(|column| {
                let role = if outcomes.contains(&column.name()) {
                    OUTCOME
                } else {
                    PREDICTOR
                };
                VarInfo::new(
                    column.name(),
                    VarType::of(column.data()),
                    Some(role),
                    Source::Original,
                )
            })
            .collect()
    }

    fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Name(String),
    AllPredictors,
    AllNumeric,
    AllNumericPredictors,
    AllOutcomes,
    HasRole(String),
    HasType(VarType),
    StartsWith(String),
    EndsWith(String),
    Contains(String),
}

impl Pattern {
    fn matches(&self, info: &VarInfo) -> bool {
        let name = info.variable.as_str();
        match self {
            Pattern::Name(n) => n == name,
            Pattern::AllPredictors => info.has_role(PREDICTOR),
            Pattern::AllNumeric => info.var_type == VarType::Numeric,
            Pattern::AllNumericPredictors => {
                info.has_role(PREDICTOR) && info.var_type == VarType::Numeric
            }
            Pattern::AllOutcomes => info.has_role(OUTCOME),
            Pattern::HasRole(role) => info.has_role(role),
            Pattern::HasType(t) => info.var_type == *t,
            Pattern::StartsWith(p) => name.starts_with(p.as_str()),
            Pattern::EndsWith(s) => name.ends_with(s.as_str()),
            Pattern::Contains(s) => name.contains(s.as_str()),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Name(n) => write!(f, "{}", n),
            Pattern::AllPredictors => write!(f, "all_predictors()"),
            Pattern::AllNumeric => write!(f, "all_numeric()"),
            Pattern::AllNumericPredictors => write!(f, "all_numeric_predictors()"),
            Pattern::AllOutcomes => write!(f, "all_outcomes()"),
            Pattern::HasRole(r) => write!(f, "has_role(\"{}\")", r),
            Pattern::HasType(t) => write!(f, "has_type(\"{}\")", t.as_str()),
            Pattern::StartsWith(p) => write!(f, "starts_with(\"{}\")", p),
            Pattern::EndsWith(s) => write!(f, "ends_with(\"{}\")", s),
            Pattern::Contains(s) => write!(f, "contains(\"{}\")", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorTerm {
    Include(Pattern),
    Exclude(Pattern),
}

impl fmt::Display for SelectorTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorTerm::Include(p) => write!(f, "{}", p),
            SelectorTerm::Exclude(p) => write!(f, "-{}", p),
        }
    }
}

/// Unresolved selection expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    terms: Vec<SelectorTerm>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Selector {
            terms: names
                .into_iter()
                .map(|n| SelectorTerm::Include(Pattern::Name(n.into())))
                .collect(),
        }
    }

    pub fn and(mut self, pattern: Pattern) -> Self {
        self.terms.push(SelectorTerm::Include(pattern));
        self
    }

    pub fn minus(mut self, pattern: Pattern) -> Self {
        self.terms.push(SelectorTerm::Exclude(pattern));
        self
    }

    pub fn terms(&self) -> &[SelectorTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Text form of each term, in declaration order.
    pub fn term_labels(&self) -> Vec<String> {
        self.terms.iter().map(ToString::to_string).collect()
    }

    /// Resolves the selector to an ordered, duplicate-free list of names.
    ///
    /// Terms are applied left to right. A leading exclusion starts from every
    /// known variable. Explicit names must exist in `info`.
    pub fn resolve(&self, info: &[VarInfo]) -> StepResult<Vec<String>> {
        let first = self
            .terms
            .first()
            .ok_or_else(|| StepError::Selection("no selector terms were supplied".to_string()))?;

        let mut selected: Vec<String> = match first {
            SelectorTerm::Exclude(_) => info.iter().map(|v| v.variable.clone()).collect(),
            SelectorTerm::Include(_) => Vec::new(),
        };

        for term in &self.terms {
            let pattern = match term {
                SelectorTerm::Include(p) | SelectorTerm::Exclude(p) => p,
            };
            if let Pattern::Name(name) = pattern {
                if !info.iter().any(|v| &v.variable == name) {
                    return Err(StepError::Selection(format!(
                        "can't subset columns that don't exist; column `{}` doesn't exist",
                        name
                    )));
                }
            }

            let matched = info.iter().filter(|v| pattern.matches(v));
            match term {
                SelectorTerm::Include(_) => {
                    for v in matched {
                        if !selected.contains(&v.variable) {
                            selected.push(v.variable.clone());
                        }
                    }
                }
                SelectorTerm::Exclude(_) => {
                    let dropped: Vec<&str> = matched.map(|v| v.variable.as_str()).collect();
                    selected.retain(|name| !dropped.contains(&name.as_str()));
                }
            }
        }

        if selected.is_empty() {
            return Err(StepError::Selection(format!(
                "selector `{}` did not match any columns",
                self
            )));
        }
        Ok(selected)
    }
}

impl From<Pattern> for Selector {
    fn from(pattern: Pattern) -> Self {
        Selector::new().and(pattern)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.term_labels().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;

    fn info() -> Vec<VarInfo> {
        let df = DataFrame::new(vec![
            Column::double("x1", vec![1.0, 2.0]),
            Column::double("x2", vec![1.0, 2.0]),
            Column::text("group", ["a", "b"]),
            Column::integer("count_y", vec![3_i64, 4]),
            Column::double("y", vec![0.0, 1.0]),
        ])
        .unwrap();
        VarInfo::from_frame(&df, &["y"])
    }

    #[test]
    fn test_from_frame_roles_and_types() {
        let info = info();
        assert_eq!(info[2].var_type, VarType::Nominal);
        assert_eq!(info[3].var_type, VarType::Numeric);
        assert_eq!(info[4].role.as_deref(), Some(OUTCOME));
        assert_eq!(info[0].role.as_deref(), Some(PREDICTOR));
    }

    #[test]
    fn test_names_keep_declaration_order() {
        let sel = Selector::names(["x2", "x1"]);
        assert_eq!(sel.resolve(&info()).unwrap(), vec!["x2", "x1"]);
    }

    #[test]
    fn test_numeric_predictors() {
        let sel = Selector::from(Pattern::AllNumericPredictors);
        assert_eq!(
            sel.resolve(&info()).unwrap(),
            vec!["x1", "x2", "count_y"]
        );
    }

    #[test]
    fn test_exclusion() {
        let sel = Selector::from(Pattern::AllNumeric).minus(Pattern::EndsWith("y".into()));
        assert_eq!(sel.resolve(&info()).unwrap(), vec!["x1", "x2"]);

        let sel = Selector::new().minus(Pattern::HasType(VarType::Nominal));
        assert_eq!(
            sel.resolve(&info()).unwrap(),
            vec!["x1", "x2", "count_y", "y"]
        );
    }

    #[test]
    fn test_unknown_name_is_selection_error() {
        let sel = Selector::names(["x1", "x9"]);
        assert!(matches!(
            sel.resolve(&info()),
            Err(StepError::Selection(_))
        ));
    }

    #[test]
    fn test_empty_result_is_selection_error() {
        let sel = Selector::from(Pattern::StartsWith("z".into()));
        assert!(matches!(
            sel.resolve(&info()),
            Err(StepError::Selection(_))
        ));
        assert!(matches!(
            Selector::new().resolve(&info()),
            Err(StepError::Selection(_))
        ));
    }

    #[test]
    fn test_term_labels() {
        let sel = Selector::names(["x1"])
            .and(Pattern::StartsWith("x".into()))
            .minus(Pattern::HasRole("id".into()));
        assert_eq!(
            sel.term_labels(),
            vec!["x1", "starts_with(\"x\")", "-has_role(\"id\")"]
        );
    }
}
