//! # Preprocessing steps
//!
//! Every step follows the same lifecycle:
//! 1. **Construct** an untrained specification (builder, no data access)
//! 2. **Prep** on training data, returning a new trained value with the same id
//! 3. **Bake** new data with the trained value, which is never mutated
//! 4. **Describe** / **Tidy** either form for display and introspection
//!
//! A pipeline keeps one owning slot per step and swaps the untrained value for
//! the trained one after prep, so readers holding the old value stay valid.
//!
//! ## Currently Available
//! - **Kernel PCA** ([`kpca`]): replaces numeric columns with kernel principal components

use std::fmt;

use crate::error::StepResult;
use crate::frame::DataFrame;
use crate::selection::VarInfo;

pub mod kpca;

pub use kpca::{StepKpca, StepKpcaBuilder};

/// Display width used by `Display` implementations of steps.
pub const DEFAULT_PRINT_WIDTH: usize = 40;

/// One row of a step's own tidy output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TidyRow {
    pub terms: String,
    pub id: String,
}

/// Tunable parameter exposed by a step for hyperparameter search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunableParam {
    pub name: &'static str,
    pub component: &'static str,
    pub component_id: String,
}

pub trait Step: Send + Sync + fmt::Debug {
    /// Short step type, e.g. `"kpca"`.
    fn kind(&self) -> &'static str;

    fn id(&self) -> &str;

    fn trained(&self) -> bool;

    fn skip(&self) -> bool;

    /// Role given to the columns this step creates.
    fn role(&self) -> Option<&str> {
        None
    }

    /// Learns the step's parameters and returns the trained step.
    fn prep(&self, training: &DataFrame, info: &[VarInfo]) -> StepResult<Box<dyn Step>>;

    /// Applies a trained step. Panics when called on an untrained step.
    fn bake(&self, new_data: &DataFrame) -> StepResult<DataFrame>;

    fn describe(&self, width: usize) -> String;

    fn tidy(&self) -> Vec<TidyRow>;

    fn required_packages(&self) -> Vec<&'static str> {
        Vec::new()
    }

    fn tunable(&self) -> Vec<TunableParam> {
        Vec::new()
    }
}
