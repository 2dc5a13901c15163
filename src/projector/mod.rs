//! # Kernel projection
//!
//! Kernel PCA as a fitted, read-only capability. A projector remembers the
//! names of the columns it was trained on and maps any compatible matrix into
//! component space. Components are ordered by decreasing eigenvalue.
//!
//! The symmetric eigendecomposition is pluggable through [`EigenSolver`]:
//! - [`native::NativeEigen`] uses `nalgebra` and is always available
//! - `lapack::LapackEigen` uses `nalgebra-lapack` behind the `lapack` feature

use std::fmt;
use std::sync::Arc;

use anyhow::{anyhow, bail};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

use crate::kernel::{Kernel, KernelKind, KernelParams};

pub mod native;

#[cfg(feature = "lapack")]
pub mod lapack;

/// Default lower bound for retained eigenvalues of the centered kernel matrix.
pub const DEFAULT_THRESHOLD: f64 = 1e-4;

/// Key in [`KernelParams::extra`] that overrides [`DEFAULT_THRESHOLD`].
pub const THRESHOLD_KEY: &str = "th";

pub trait KernelProjector: Send + Sync + fmt::Debug {
    /// Training column names, in the order the projector consumes them.
    fn original_columns(&self) -> &[String];

    fn kernel(&self) -> KernelKind;

    /// Number of components `project` produces.
    fn n_components(&self) -> usize;

    fn eigenvalues(&self) -> ArrayView1<'_, f64>;

    fn project(&self, x: ArrayView2<f64>) -> anyhow::Result<Array2<f64>>;
}

// Trait for symmetric eigendecomposition backends
pub trait EigenSolver: Send + Sync {
    /// Eigenvalues and eigenvectors (as columns), both sorted by decreasing eigenvalue.
    fn symmetric_eigen(&self, matrix: Array2<f64>) -> anyhow::Result<(Array1<f64>, Array2<f64>)>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Engine {
    #[default]
    Native,
    Lapack,
}

impl Engine {
    /// Crate backing the engine.
    pub fn dependency(&self) -> &'static str {
        match self {
            Engine::Native => "nalgebra",
            Engine::Lapack => "nalgebra-lapack",
        }
    }

    pub fn is_available(&self) -> bool {
        match self {
            Engine::Native => true,
            Engine::Lapack => cfg!(feature = "lapack"),
        }
    }

    /// Fits a kernel PCA projector on `x`, whose columns are named by `columns`.
    pub fn fit(
        &self,
        x: ArrayView2<f64>,
        columns: &[String],
        dimension: usize,
        params: &KernelParams,
    ) -> anyhow::Result<Arc<dyn KernelProjector>> {
        match self {
            Engine::Native => Ok(Arc::new(KernelPca::fit(
                &native::NativeEigen,
                x,
                columns,
                dimension,
                params,
            )?)),
            #[cfg(feature = "lapack")]
            Engine::Lapack => Ok(Arc::new(KernelPca::fit(
                &lapack::LapackEigen,
                x,
                columns,
                dimension,
                params,
            )?)),
            #[cfg(not(feature = "lapack"))]
            Engine::Lapack => bail!("nalgebra-lapack support was not compiled in"),
        }
    }
}

/// Fitted kernel PCA model.
#[derive(Debug, Clone)]
pub struct KernelPca {
    columns: Vec<String>,
    kind: KernelKind,
    kernel: Kernel,
    xmatrix: Array2<f64>,
    kernel_col_means: Array1<f64>,
    kernel_mean: f64,
    eigenvalues: Array1<f64>,
    pcv: Array2<f64>,
}

impl KernelPca {
    pub fn fit<S: EigenSolver>(
        solver: &S,
        x: ArrayView2<f64>,
        columns: &[String],
        dimension: usize,
        params: &KernelParams,
    ) -> anyhow::Result<Self> {
        let (n_samples, n_features) = x.dim();
        if n_features != columns.len() {
            bail!(
                "Got {} column names for {} input features",
                columns.len(),
                n_features
            );
        }
        if n_samples < 2 {
            bail!("Kernel PCA needs at least two rows, got {}", n_samples);
        }
        if x.iter().any(|v| !v.is_finite()) {
            bail!("Kernel PCA input contains missing or non-finite values");
        }

        let kernel = params.kernel_fn()?;
        let threshold = params
            .extra
            .get(THRESHOLD_KEY)
            .copied()
            .unwrap_or(DEFAULT_THRESHOLD);
        if !(threshold.is_finite() && threshold > 0.0) {
            bail!(
                "Eigenvalue threshold `{}` must be a positive finite number, got {}",
                THRESHOLD_KEY,
                threshold
            );
        }

        let gram = kernel_matrix(&kernel, x, x);
        let kernel_col_means = gram
            .mean_axis(Axis(0))
            .ok_or_else(|| anyhow!("Failed to compute kernel matrix means"))?;
        let kernel_mean = kernel_col_means.mean().unwrap_or(0.0);

        // Double centering; the Gram matrix is symmetric so row means equal column means
        let mut centered = gram;
        let n = n_samples as f64;
        for ((i, j), v) in centered.indexed_iter_mut() {
            *v = (*v - kernel_col_means[j] - kernel_col_means[i] + kernel_mean) / n;
        }

        let (values, vectors) = solver.symmetric_eigen(centered)?;
        if values.iter().any(|v| !v.is_finite()) {
            bail!("Eigendecomposition of the kernel matrix produced non-finite values");
        }

        let available = values.iter().take_while(|&&v| v > threshold).count();
        if available == 0 {
            bail!(
                "No eigenvalues of the kernel matrix are above the threshold ({})",
                threshold
            );
        }
        let n_components = available.min(dimension);
        if n_components < dimension {
            log::warn!(
                "Only {} kernel components have eigenvalues above {}; {} were requested",
                n_components,
                threshold,
                dimension
            );
        }

        let eigenvalues = values.slice(s![..n_components]).to_owned();
        let mut pcv = vectors.slice(s![.., ..n_components]).to_owned();
        for (mut col, &lambda) in pcv.columns_mut().into_iter().zip(eigenvalues.iter()) {
            col /= lambda.sqrt();
        }

        log::debug!(
            "Fitted kernel PCA ({}) on {} x {}; retained {} of {} components",
            params.kernel,
            n_samples,
            n_features,
            n_components,
            dimension
        );

        Ok(KernelPca {
            columns: columns.to_vec(),
            kind: params.kernel,
            kernel,
            xmatrix: x.to_owned(),
            kernel_col_means,
            kernel_mean,
            eigenvalues,
            pcv,
        })
    }

    /// Component scores of the training rows.
    pub fn training_scores(&self) -> Array2<f64> {
        self.centered_cross_kernel(self.xmatrix.view()).dot(&self.pcv)
    }

    fn centered_cross_kernel(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let mut cross = kernel_matrix(&self.kernel, x, self.xmatrix.view());
        let m = self.xmatrix.nrows() as f64;
        for mut row in cross.rows_mut() {
            let row_mean = row.sum() / m;
            for (v, &col_mean) in row.iter_mut().zip(self.kernel_col_means.iter()) {
                *v = *v - col_mean - row_mean + self.kernel_mean;
            }
        }
        cross
    }
}

impl KernelProjector for KernelPca {
    fn original_columns(&self) -> &[String] {
        &self.columns
    }

    fn kernel(&self) -> KernelKind {
        self.kind
    }

    fn n_components(&self) -> usize {
        self.pcv.ncols()
    }

    fn eigenvalues(&self) -> ArrayView1<'_, f64> {
        self.eigenvalues.view()
    }

    fn project(&self, x: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        if x.ncols() != self.columns.len() {
            bail!(
                "Projection input has {} columns, the model was fitted on {}",
                x.ncols(),
                self.columns.len()
            );
        }
        Ok(self.centered_cross_kernel(x).dot(&self.pcv))
    }
}

/// Pairwise kernel values between the rows of `a` and the rows of `b`.
pub fn kernel_matrix(kernel: &Kernel, a: ArrayView2<f64>, b: ArrayView2<f64>) -> Array2<f64> {
    let mut out = Array2::zeros((a.nrows(), b.nrows()));
    out.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            let xa = a.row(i);
            for (j, xb) in b.rows().into_iter().enumerate() {
                row[j] = kernel.evaluate(xa, xb);
            }
        });
    out
}

/// Reorders an unsorted decomposition by decreasing eigenvalue.
pub(crate) fn sort_descending(values: Array1<f64>, vectors: Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let sorted_values = order.iter().map(|&i| values[i]).collect::<Array1<f64>>();
    let sorted_vectors = vectors.select(Axis(1), &order);
    (sorted_values, sorted_vectors)
}
