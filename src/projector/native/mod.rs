use anyhow::anyhow;
use nalgebra::SymmetricEigen;
use ndarray::{Array1, Array2};
use nshare::IntoNalgebra;

use super::{sort_descending, EigenSolver};

/// Symmetric eigendecomposition with `nalgebra`'s implicit QR iteration.
pub struct NativeEigen;

impl EigenSolver for NativeEigen {
    fn symmetric_eigen(&self, matrix: Array2<f64>) -> anyhow::Result<(Array1<f64>, Array2<f64>)> {
        let n = matrix.nrows();
        let matrix = matrix.into_nalgebra();

        let eigen = SymmetricEigen::try_new(matrix, f64::EPSILON, 0)
            .ok_or_else(|| anyhow!("Symmetric eigendecomposition did not converge"))?;

        let values = Array1::from_iter(eigen.eigenvalues.iter().cloned());
        let vectors = Array2::from_shape_fn((n, n), |(i, j)| eigen.eigenvectors[(i, j)]);

        Ok(sort_descending(values, vectors))
    }
}
