pub mod error;
pub mod frame;
pub mod kernel;
pub mod projector;
pub mod recipe;
pub mod selection;
pub mod step;
mod utils;

pub use error::{StepError, StepResult};
pub use frame::{Column, ColumnData, DataFrame};
pub use kernel::{KernelKind, KernelOptions, KernelParams};
pub use projector::{Engine, KernelProjector};
pub use recipe::Recipe;
pub use selection::{Pattern, Selector, VarInfo};
pub use step::{Step, StepKpca, TidyRow};
pub use utils::names0;
