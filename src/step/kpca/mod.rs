//! # Kernel PCA feature extraction
//!
//! Replaces a set of numeric columns with kernel principal components. The
//! kernel basis is learned on the training data during prep; baking projects
//! any data holding the training columns onto that basis.

use std::fmt;
use std::sync::Arc;

use ndarray::s;

use crate::error::{StepError, StepResult};
use crate::frame::DataFrame;
use crate::kernel::{KernelKind, KernelOptions, KernelParams};
use crate::projector::{Engine, KernelProjector};
use crate::selection::{Selector, VarInfo, PREDICTOR};
use crate::step::{Step, TidyRow, TunableParam, DEFAULT_PRINT_WIDTH};
use crate::utils::{format_ch_vec, names0, rand_id};

const STEP_NAME: &str = "step_kpca";

pub struct StepKpcaBuilder {
    terms: Selector,
    role: String,
    num_comp: usize,
    num: Option<usize>,
    options: KernelParams,
    engine: Engine,
    prefix: String,
    keep_original_cols: bool,
    skip: bool,
    id: Option<String>,
}

impl StepKpcaBuilder {
    pub fn new(terms: Selector) -> Self {
        StepKpcaBuilder {
            terms,
            role: PREDICTOR.to_string(),
            num_comp: 5,
            num: None,
            options: KernelParams::default(),
            engine: Engine::default(),
            prefix: "kPC".to_string(),
            keep_original_cols: false,
            skip: false,
            id: None,
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn num_comp(mut self, num_comp: usize) -> Self {
        self.num_comp = num_comp;
        self
    }

    /// Takes precedence over [`num_comp`](Self::num_comp) when set.
    #[deprecated(note = "use `num_comp` instead")]
    pub fn num(mut self, num: usize) -> Self {
        self.num = Some(num);
        self
    }

    pub fn options(mut self, options: KernelParams) -> Self {
        self.options = options;
        self
    }

    pub fn kernel(mut self, kernel: KernelKind) -> Self {
        self.options.kernel = kernel;
        self
    }

    pub fn kernel_options(mut self, kernel_options: KernelOptions) -> Self {
        self.options.kernel_options = kernel_options;
        self
    }

    pub fn engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn keep_original_cols(mut self, keep: bool) -> Self {
        self.keep_original_cols = keep;
        self
    }

    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn build(self) -> StepResult<StepKpca> {
        if !self.engine.is_available() {
            return Err(StepError::DependencyMissing {
                step: STEP_NAME,
                dependency: self.engine.dependency(),
            });
        }

        let num_comp = match self.num {
            Some(num) => {
                log::warn!(
                    "Parameter `num` of `{}` is deprecated; use `num_comp` instead. Using num = {}",
                    STEP_NAME,
                    num
                );
                num
            }
            None => self.num_comp,
        };
        if num_comp == 0 {
            return Err(StepError::InvalidArgument(
                "`num_comp` must be a positive integer".to_string(),
            ));
        }
        self.options
            .kernel_fn()
            .map_err(|e| StepError::InvalidArgument(e.to_string()))?;

        Ok(StepKpca {
            terms: self.terms,
            role: self.role,
            trained: false,
            num_comp,
            options: self.options,
            engine: self.engine,
            res: None,
            prefix: self.prefix,
            keep_original_cols: self.keep_original_cols,
            skip: self.skip,
            id: self.id.unwrap_or_else(|| rand_id("kpca")),
        })
    }
}

/// Kernel PCA step, untrained or trained.
#[derive(Debug, Clone)]
pub struct StepKpca {
    terms: Selector,
    role: String,
    trained: bool,
    num_comp: usize,
    options: KernelParams,
    engine: Engine,
    res: Option<Arc<dyn KernelProjector>>,
    prefix: String,
    keep_original_cols: bool,
    skip: bool,
    id: String,
}

impl StepKpca {
    pub fn builder(terms: impl Into<Selector>) -> StepKpcaBuilder {
        StepKpcaBuilder::new(terms.into())
    }

    pub fn terms(&self) -> &Selector {
        &self.terms
    }

    pub fn num_comp(&self) -> usize {
        self.num_comp
    }

    pub fn options(&self) -> &KernelParams {
        &self.options
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn projector(&self) -> Option<&Arc<dyn KernelProjector>> {
        self.res.as_ref()
    }

    /// Number of component columns bake produces, once trained.
    pub fn effective_dimension(&self) -> Option<usize> {
        self.res
            .as_ref()
            .map(|res| self.num_comp.min(res.n_components()))
    }

    /// Resolves the selector, checks the selected columns and fits the kernel
    /// projector. The receiver is left untouched.
    pub fn fit(&self, training: &DataFrame, info: &[VarInfo]) -> StepResult<StepKpca> {
        let col_names = self.terms.resolve(info)?;
        check_columns(training, &col_names)?;

        let x = training
            .numeric_matrix(&col_names)
            .map_err(StepError::Frame)?;
        let res = self
            .engine
            .fit(x.view(), &col_names, self.num_comp, &self.options)
            .map_err(StepError::Projector)?;

        log::debug!(
            "{} ({}) trained on {} rows of {:?}",
            STEP_NAME,
            self.id,
            training.nrows(),
            col_names
        );

        Ok(StepKpca {
            trained: true,
            res: Some(res),
            ..self.clone()
        })
    }

    /// Replaces the training columns of `new_data` with component scores.
    ///
    /// # Panics
    /// When the step has not been trained.
    pub fn apply(&self, new_data: &DataFrame) -> StepResult<DataFrame> {
        let res = match (self.trained, &self.res) {
            (true, Some(res)) => res,
            _ => panic!(
                "`{}` ({}) has not been trained; call `prep` before `bake`",
                STEP_NAME, self.id
            ),
        };

        let cols = res.original_columns();
        check_columns(new_data, cols)?;

        let x = new_data.numeric_matrix(cols).map_err(StepError::Frame)?;
        let scores = res.project(x.view()).map_err(StepError::Projector)?;

        let n_comp = self.num_comp.min(scores.ncols());
        let names = names0(n_comp, &self.prefix);

        let base = if self.keep_original_cols {
            new_data.clone()
        } else {
            new_data.without_columns(cols)
        };
        let collisions: Vec<String> = names.iter().filter(|n| base.contains(n)).cloned().collect();
        if !collisions.is_empty() {
            return Err(StepError::NameCollision {
                columns: collisions,
            });
        }

        base.append_matrix(&names, scores.slice(s![.., ..n_comp]))
            .map_err(StepError::Frame)
    }
}

/// Every name must be present in `data` and hold numeric values.
fn check_columns(data: &DataFrame, names: &[String]) -> StepResult<()> {
    let missing = data.missing_columns(names);
    if !missing.is_empty() {
        return Err(StepError::Schema { missing });
    }

    let non_numeric: Vec<String> = names
        .iter()
        .filter(|name| {
            data.column(name)
                .map(|c| !c.data().is_numeric())
                .unwrap_or(false)
        })
        .cloned()
        .collect();
    if !non_numeric.is_empty() {
        return Err(StepError::TypeMismatch {
            columns: non_numeric,
        });
    }
    Ok(())
}

impl Step for StepKpca {
    fn kind(&self) -> &'static str {
        "kpca"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn trained(&self) -> bool {
        self.trained
    }

    fn skip(&self) -> bool {
        self.skip
    }

    fn role(&self) -> Option<&str> {
        Some(self.role.as_str())
    }

    fn prep(&self, training: &DataFrame, info: &[VarInfo]) -> StepResult<Box<dyn Step>> {
        Ok(Box::new(self.fit(training, info)?))
    }

    fn bake(&self, new_data: &DataFrame) -> StepResult<DataFrame> {
        self.apply(new_data)
    }

    fn describe(&self, width: usize) -> String {
        match &self.res {
            Some(res) if self.trained => format!(
                "Kernel PCA ({}) extraction with {} [trained]",
                res.kernel(),
                format_ch_vec(res.original_columns(), width)
            ),
            _ => format!(
                "Kernel PCA extraction with {}",
                format_ch_vec(&self.terms.term_labels(), width)
            ),
        }
    }

    fn tidy(&self) -> Vec<TidyRow> {
        let terms = match &self.res {
            Some(res) if self.trained => res.original_columns().to_vec(),
            _ => self.terms.term_labels(),
        };
        terms
            .into_iter()
            .map(|terms| TidyRow {
                terms,
                id: self.id.clone(),
            })
            .collect()
    }

    fn required_packages(&self) -> Vec<&'static str> {
        vec![self.engine.dependency()]
    }

    fn tunable(&self) -> Vec<TunableParam> {
        let mut params = vec!["num_comp"];
        match self.options.kernel {
            KernelKind::RadialBasis | KernelKind::Laplace => params.push("bandwidth"),
            KernelKind::Polynomial => params.extend(["degree", "scale", "offset"]),
            KernelKind::HyperbolicTangent => params.extend(["scale", "offset"]),
            KernelKind::Anova => params.extend(["bandwidth", "degree"]),
            KernelKind::Linear => {}
        }
        params
            .into_iter()
            .map(|name| TunableParam {
                name,
                component: STEP_NAME,
                component_id: self.id.clone(),
            })
            .collect()
    }
}

impl fmt::Display for StepKpca {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(DEFAULT_PRINT_WIDTH))
    }
}
