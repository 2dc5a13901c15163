use anyhow::anyhow;
use ndarray::{Array1, Array2};
use nshare::IntoNalgebra;

use super::{sort_descending, EigenSolver};

/// Symmetric eigendecomposition through LAPACK's `dsyev`.
pub struct LapackEigen;

impl EigenSolver for LapackEigen {
    fn symmetric_eigen(&self, matrix: Array2<f64>) -> anyhow::Result<(Array1<f64>, Array2<f64>)> {
        let n = matrix.nrows();
        let matrix = matrix.into_nalgebra();

        let eigen = nalgebra_lapack::SymmetricEigen::try_new(matrix)
            .ok_or_else(|| anyhow!("LAPACK symmetric eigendecomposition failed"))?;

        let values = Array1::from(eigen.eigenvalues.as_slice().to_vec());
        let vectors = Array2::from_shape_fn((n, n), |(i, j)| eigen.eigenvectors[(i, j)]);

        Ok(sort_descending(values, vectors))
    }
}
