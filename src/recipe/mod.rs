//! # Recipes
//!
//! A recipe is an ordered list of steps together with the variable
//! information of its template data. Prepping a recipe never mutates it:
//! a new recipe holding the trained steps is returned.

use std::collections::BTreeSet;

use crate::error::{StepError, StepResult};
use crate::frame::DataFrame;
use crate::selection::{Source, VarInfo, VarType};
use crate::step::{Step, DEFAULT_PRINT_WIDTH};

/// Row of the recipe-wide tidy summary, one per term of every step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeTidyRow {
    pub number: usize,
    pub operation: &'static str,
    pub kind: &'static str,
    pub trained: bool,
    pub skip: bool,
    pub terms: String,
    pub id: String,
}

#[derive(Debug)]
pub struct Recipe {
    template_info: Vec<VarInfo>,
    var_info: Vec<VarInfo>,
    steps: Vec<Box<dyn Step>>,
    retained: Option<DataFrame>,
}

impl Recipe {
    /// Recipe whose columns are all predictors.
    pub fn new(template: &DataFrame) -> Self {
        Self::with_outcomes(template, &[])
    }

    pub fn with_outcomes(template: &DataFrame, outcomes: &[&str]) -> Self {
        let info = VarInfo::from_frame(template, outcomes);
        Recipe {
            template_info: info.clone(),
            var_info: info,
            steps: Vec::new(),
            retained: None,
        }
    }

    pub fn add_step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn steps(&self) -> &[Box<dyn Step>] {
        &self.steps
    }

    /// Variable information of the template, or of the processed training
    /// data once prepped.
    pub fn var_info(&self) -> &[VarInfo] {
        &self.var_info
    }

    pub fn trained(&self) -> bool {
        self.retained.is_some()
    }

    /// Fits every step in order. Each step sees the training data as baked
    /// by the steps before it, skipped steps included.
    pub fn prep(&self, training: &DataFrame) -> StepResult<Recipe> {
        let mut data = training.clone();
        let mut info = self.template_info.clone();
        let mut steps: Vec<Box<dyn Step>> = Vec::with_capacity(self.steps.len());

        for (number, step) in self.steps.iter().enumerate() {
            log::debug!("Prepping step {} ({})", number + 1, step.id());
            let trained = step.prep(&data, &info)?;
            data = trained.bake(&data)?;
            info = update_info(&info, &data, trained.role());
            steps.push(trained);
        }

        Ok(Recipe {
            template_info: self.template_info.clone(),
            var_info: info,
            steps,
            retained: Some(data),
        })
    }

    /// Applies the trained steps to `new_data`, leaving out steps marked `skip`.
    pub fn bake(&self, new_data: &DataFrame) -> StepResult<DataFrame> {
        let mut data = new_data.clone();
        for step in self.steps.iter().filter(|s| !s.skip()) {
            data = step.bake(&data)?;
        }
        Ok(data)
    }

    /// Training data as processed during prep. Skipped steps are applied
    /// here too, `skip` only affects [`bake`](Self::bake).
    pub fn juice(&self) -> StepResult<DataFrame> {
        self.retained.clone().ok_or_else(|| {
            StepError::InvalidArgument("the recipe has not been prepped".to_string())
        })
    }

    /// Stacks the tidy rows of every step with step-level metadata.
    pub fn tidy(&self) -> Vec<RecipeTidyRow> {
        self.steps
            .iter()
            .enumerate()
            .flat_map(|(i, step)| {
                step.tidy().into_iter().map(move |row| RecipeTidyRow {
                    number: i + 1,
                    operation: "step",
                    kind: step.kind(),
                    trained: step.trained(),
                    skip: step.skip(),
                    terms: row.terms,
                    id: row.id,
                })
            })
            .collect()
    }

    /// Crates the steps of this recipe depend on.
    pub fn required_packages(&self) -> Vec<&'static str> {
        self.steps
            .iter()
            .flat_map(|s| s.required_packages())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn describe(&self) -> String {
        let mut out = String::from("Recipe\n\nOperations:\n");
        for step in &self.steps {
            out.push_str(&step.describe(DEFAULT_PRINT_WIDTH));
            out.push('\n');
        }
        out
    }
}

/// Variable information after a step has baked the training data: surviving
/// variables keep their entry, new ones are derived with the step's role.
fn update_info(info: &[VarInfo], data: &DataFrame, role: Option<&str>) -> Vec<VarInfo> {
    data.columns()
        .iter()
        .map(|column| {
            info.iter()
                .find(|v| v.variable == column.name())
                .cloned()
                .unwrap_or_else(|| {
                    VarInfo::new(
                        column.name(),
                        VarType::of(column.data()),
                        role,
                        Source::Derived,
                    )
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;
    use crate::kernel::KernelParams;
    use crate::selection::{Pattern, Selector, OUTCOME, PREDICTOR};
    use crate::step::StepKpca;
    use ndarray::Array1;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn data(n: usize) -> DataFrame {
        let t = Array1::<f64>::linspace(-1.0, 1.0, n);
        DataFrame::new(vec![
            Column::double("a", t.mapv(|v| v * 2.0)),
            Column::double("b", t.mapv(|v| v.powi(3))),
            Column::double("c", t.mapv(|v| (4.0 * v).sin())),
            Column::double("outcome", t.mapv(|v| v + 0.5)),
        ])
        .unwrap()
    }

    fn kpca(num_comp: usize) -> StepKpca {
        StepKpca::builder(Selector::from(Pattern::AllNumericPredictors))
            .num_comp(num_comp)
            .build()
            .unwrap()
    }

    #[test]
    fn test_prep_replaces_steps_and_keeps_original() {
        init();
        let df = data(40);
        let recipe = Recipe::with_outcomes(&df, &["outcome"]).add_step(kpca(2));
        let prepped = recipe.prep(&df).unwrap();

        assert!(!recipe.trained());
        assert!(!recipe.steps()[0].trained());
        assert!(prepped.trained());
        assert!(prepped.steps()[0].trained());
        assert_eq!(prepped.steps()[0].id(), recipe.steps()[0].id());
    }

    #[test]
    fn test_prep_updates_var_info() {
        init();
        let df = data(40);
        let prepped = Recipe::with_outcomes(&df, &["outcome"])
            .add_step(kpca(2))
            .prep(&df)
            .unwrap();

        let info = prepped.var_info();
        let names: Vec<&str> = info.iter().map(|v| v.variable.as_str()).collect();
        assert_eq!(names, vec!["outcome", "kPC1", "kPC2"]);
        assert_eq!(info[0].role.as_deref(), Some(OUTCOME));
        assert_eq!(info[1].role.as_deref(), Some(PREDICTOR));
        assert_eq!(info[1].source, Source::Derived);
    }

    #[test]
    fn test_bake_and_juice() {
        init();
        let df = data(40);
        let prepped = Recipe::with_outcomes(&df, &["outcome"])
            .add_step(kpca(2))
            .prep(&df)
            .unwrap();

        let juiced = prepped.juice().unwrap();
        let baked = prepped.bake(&data(7)).unwrap();
        assert_eq!(juiced.names(), vec!["outcome", "kPC1", "kPC2"]);
        assert_eq!(baked.names(), juiced.names());
        assert_eq!(baked.nrows(), 7);
    }

    #[test]
    fn test_skipped_steps_are_not_baked() {
        init();
        let df = data(40);
        let step = StepKpca::builder(Selector::names(["a", "b"]))
            .num_comp(1)
            .skip(true)
            .build()
            .unwrap();
        let prepped = Recipe::new(&df).add_step(step).prep(&df).unwrap();

        assert_eq!(prepped.juice().unwrap().names(), vec!["c", "outcome", "kPC1"]);
        assert_eq!(prepped.bake(&df).unwrap(), df);
    }

    #[test]
    fn test_chained_steps_see_derived_columns() {
        init();
        let df = data(40);
        let second = StepKpca::builder(Selector::from(Pattern::StartsWith("kPC".into())))
            .num_comp(1)
            .prefix("second")
            .build()
            .unwrap();
        let prepped = Recipe::with_outcomes(&df, &["outcome"])
            .add_step(kpca(2))
            .add_step(second)
            .prep(&df)
            .unwrap();

        assert_eq!(prepped.juice().unwrap().names(), vec!["outcome", "second1"]);
        assert_eq!(prepped.bake(&data(5)).unwrap().names(), vec!["outcome", "second1"]);
    }

    #[test]
    fn test_reprep_resolves_against_template() {
        init();
        let df = data(40);
        let prepped = Recipe::with_outcomes(&df, &["outcome"])
            .add_step(kpca(2))
            .prep(&df)
            .unwrap();
        let again = prepped.prep(&data(30)).unwrap();

        assert_eq!(again.juice().unwrap().names(), vec!["outcome", "kPC1", "kPC2"]);
        assert_eq!(
            again.steps()[0].tidy().iter().map(|r| r.terms.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert_eq!(again.steps()[0].id(), prepped.steps()[0].id());
    }

    #[test]
    fn test_prep_surfaces_projector_errors() {
        let df = data(20);
        let step = StepKpca::builder(Selector::names(["a", "b"]))
            .options(KernelParams::default().with_extra("th", 1e9))
            .build()
            .unwrap();
        match Recipe::new(&df).add_step(step).prep(&df) {
            Err(StepError::Projector(e)) => {
                assert!(e.to_string().starts_with("No eigenvalues of the kernel matrix"))
            }
            other => panic!("expected a projector error, got {:?}", other),
        }
    }

    #[test]
    fn test_juice_requires_prep() {
        let df = data(10);
        let recipe = Recipe::new(&df).add_step(kpca(2));
        assert!(matches!(recipe.juice(), Err(StepError::InvalidArgument(_))));
    }

    #[test]
    fn test_prep_propagates_step_errors() {
        let df = data(10);
        let step = StepKpca::builder(Selector::names(["missing"])).build().unwrap();
        let res = Recipe::new(&df).add_step(step).prep(&df);
        assert!(matches!(res, Err(StepError::Selection(_))));
    }

    #[test]
    fn test_tidy_stacks_step_rows() {
        init();
        let df = data(40);
        let recipe = Recipe::with_outcomes(&df, &["outcome"]).add_step(
            StepKpca::builder(Selector::names(["a", "b", "c"]))
                .num_comp(2)
                .build()
                .unwrap(),
        );

        let before = recipe.tidy();
        assert_eq!(before.len(), 3);
        assert!(before.iter().all(|r| !r.trained && r.number == 1));
        assert!(before.iter().all(|r| r.operation == "step" && r.kind == "kpca"));

        let after = recipe.prep(&df).unwrap().tidy();
        assert_eq!(
            after.iter().map(|r| r.terms.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert!(after.iter().all(|r| r.trained && r.id == before[0].id));
    }

    #[test]
    fn test_required_packages_and_describe() {
        let df = data(10);
        let recipe = Recipe::new(&df).add_step(kpca(2)).add_step(kpca(3));
        assert_eq!(recipe.required_packages(), vec!["nalgebra"]);
        assert_eq!(
            recipe.describe(),
            "Recipe\n\nOperations:\n\
             Kernel PCA extraction with all_numeric_predictors()\n\
             Kernel PCA extraction with all_numeric_predictors()\n"
        );
    }
}
