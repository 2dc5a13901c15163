use thiserror::Error;

/// Errors raised while constructing, fitting or applying a step.
///
/// Every variant is fatal for the operation that produced it. Failures coming
/// out of a numerical backend are carried in [`StepError::Projector`] without
/// being reworded.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("`{step}` requires the `{dependency}` backend, which is not available in this build")]
    DependencyMissing {
        step: &'static str,
        dependency: &'static str,
    },

    #[error("column selection failed: {0}")]
    Selection(String),

    #[error("all columns selected for the step should be numeric; non-numeric columns: {}", .columns.join(", "))]
    TypeMismatch { columns: Vec<String> },

    #[error("the following required columns are missing from `new_data`: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("name collision occurred; the following variable names already exist: {}", .columns.join(", "))]
    NameCollision { columns: Vec<String> },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Projector(anyhow::Error),

    #[error("data frame operation failed: {0}")]
    Frame(anyhow::Error),
}

pub type StepResult<T> = Result<T, StepError>;
