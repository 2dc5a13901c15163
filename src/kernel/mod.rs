//! # Kernel functions
//!
//! Typed configuration for the kernel used by kernel PCA, and pairwise kernel
//! evaluation on dense rows.
//!
//! ## Available kernels
//! - **radial-basis** (`rbfdot`): `exp(-bandwidth * |x - y|^2)`
//! - **laplace** (`laplacedot`): `exp(-bandwidth * |x - y|)`
//! - **polynomial** (`polydot`): `(scale * <x, y> + offset)^degree`
//! - **linear** (`vanilladot`): `<x, y>`
//! - **hyperbolic-tangent** (`tanhdot`): `tanh(scale * <x, y> + offset)`
//! - **anova** (`anovadot`): `(sum_k exp(-bandwidth * (x_k - y_k)^2))^degree`

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ndarray::ArrayView1;

use crate::error::StepError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelKind {
    #[default]
    RadialBasis,
    Laplace,
    Polynomial,
    Linear,
    HyperbolicTangent,
    Anova,
}

impl KernelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            KernelKind::RadialBasis => "radial-basis",
            KernelKind::Laplace => "laplace",
            KernelKind::Polynomial => "polynomial",
            KernelKind::Linear => "linear",
            KernelKind::HyperbolicTangent => "hyperbolic-tangent",
            KernelKind::Anova => "anova",
        }
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KernelKind {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "radial-basis" | "rbfdot" => Ok(KernelKind::RadialBasis),
            "laplace" | "laplacedot" => Ok(KernelKind::Laplace),
            "polynomial" | "polydot" => Ok(KernelKind::Polynomial),
            "linear" | "vanilladot" => Ok(KernelKind::Linear),
            "hyperbolic-tangent" | "tanhdot" => Ok(KernelKind::HyperbolicTangent),
            "anova" | "anovadot" => Ok(KernelKind::Anova),
            other => Err(StepError::InvalidArgument(format!(
                "unknown kernel `{}`",
                other
            ))),
        }
    }
}

/// Kernel hyperparameters. Unset fields fall back to per-kernel defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KernelOptions {
    pub bandwidth: Option<f64>,
    pub degree: Option<u32>,
    pub scale: Option<f64>,
    pub offset: Option<f64>,
}

impl KernelOptions {
    pub fn bandwidth(mut self, bandwidth: f64) -> Self {
        self.bandwidth = Some(bandwidth);
        self
    }

    pub fn degree(mut self, degree: u32) -> Self {
        self.degree = Some(degree);
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Kernel configuration handed to the projector.
///
/// `extra` carries implementation-specific settings (for example the
/// eigenvalue threshold `th`) through to the backend without interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelParams {
    pub kernel: KernelKind,
    pub kernel_options: KernelOptions,
    pub extra: BTreeMap<String, f64>,
}

impl Default for KernelParams {
    fn default() -> Self {
        KernelParams {
            kernel: KernelKind::RadialBasis,
            kernel_options: KernelOptions::default().bandwidth(0.2),
            extra: BTreeMap::new(),
        }
    }
}

impl KernelParams {
    pub fn new(kernel: KernelKind) -> Self {
        KernelParams {
            kernel,
            kernel_options: KernelOptions::default(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_options(mut self, options: KernelOptions) -> Self {
        self.kernel_options = options;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: f64) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Resolves the configuration into a concrete kernel function.
    pub fn kernel_fn(&self) -> anyhow::Result<Kernel> {
        let o = &self.kernel_options;
        let kernel = match self.kernel {
            KernelKind::RadialBasis => Kernel::RadialBasis {
                sigma: o.bandwidth.unwrap_or(0.2),
            },
            KernelKind::Laplace => Kernel::Laplace {
                sigma: o.bandwidth.unwrap_or(1.0),
            },
            KernelKind::Polynomial => Kernel::Polynomial {
                degree: o.degree.unwrap_or(1),
                scale: o.scale.unwrap_or(1.0),
                offset: o.offset.unwrap_or(1.0),
            },
            KernelKind::Linear => Kernel::Linear,
            KernelKind::HyperbolicTangent => Kernel::HyperbolicTangent {
                scale: o.scale.unwrap_or(1.0),
                offset: o.offset.unwrap_or(1.0),
            },
            KernelKind::Anova => Kernel::Anova {
                sigma: o.bandwidth.unwrap_or(1.0),
                degree: o.degree.unwrap_or(1),
            },
        };
        kernel.validate()?;
        Ok(kernel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kernel {
    RadialBasis { sigma: f64 },
    Laplace { sigma: f64 },
    Polynomial { degree: u32, scale: f64, offset: f64 },
    Linear,
    HyperbolicTangent { scale: f64, offset: f64 },
    Anova { sigma: f64, degree: u32 },
}

impl Kernel {
    fn validate(&self) -> anyhow::Result<()> {
        match *self {
            Kernel::RadialBasis { sigma } | Kernel::Laplace { sigma } | Kernel::Anova { sigma, .. } => {
                if !(sigma.is_finite() && sigma > 0.0) {
                    anyhow::bail!("Kernel bandwidth must be a positive finite number, got {}", sigma);
                }
            }
            _ => {}
        }
        if let Kernel::Polynomial { degree, .. } | Kernel::Anova { degree, .. } = *self {
            if degree == 0 || i32::try_from(degree).is_err() {
                anyhow::bail!(
                    "Kernel degree must be between 1 and {}, got {}",
                    i32::MAX,
                    degree
                );
            }
        }
        Ok(())
    }

    pub fn evaluate(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
        match *self {
            Kernel::RadialBasis { sigma } => (-sigma * squared_distance(x, y)).exp(),
            Kernel::Laplace { sigma } => (-sigma * squared_distance(x, y).sqrt()).exp(),
            Kernel::Polynomial {
                degree,
                scale,
                offset,
            } => (scale * x.dot(&y) + offset).powi(i32::try_from(degree).unwrap_or(i32::MAX)),
            Kernel::Linear => x.dot(&y),
            Kernel::HyperbolicTangent { scale, offset } => (scale * x.dot(&y) + offset).tanh(),
            Kernel::Anova { sigma, degree } => x
                .iter()
                .zip(y.iter())
                .map(|(&a, &b)| (-sigma * (a - b) * (a - b)).exp())
                .sum::<f64>()
                .powi(i32::try_from(degree).unwrap_or(i32::MAX)),
        }
    }
}

fn squared_distance(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(&a, &b)| (a - b) * (a - b))
        .sum()
}
