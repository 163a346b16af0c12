//! 1-D interpolation over curve nodes.
//!
//! A factory builds an [`Interpolation`] from parallel abscissa/ordinate
//! slices; the fitted object owns a copy of the data. Factories advertise
//! whether the scheme is *global* (every coefficient depends on every node,
//! as for cubic splines) or *local* (a node only affects its neighbouring
//! segments); the bootstrapper uses this to decide how many passes it needs.

use qc_core::errors::{Error, Result};
use qc_core::Real;

/// A fitted 1-D interpolant.
pub trait Interpolation {
    /// Smallest abscissa of the fitted range.
    fn x_min(&self) -> Real;

    /// Largest abscissa of the fitted range.
    fn x_max(&self) -> Real;

    /// Interpolated value at `x`. Outside the fitted range the boundary
    /// segment is extrapolated.
    fn value(&self, x: Real) -> Real;
}

/// Builds interpolants of one scheme over given nodes.
pub trait InterpolationFactory {
    /// The interpolant this factory produces.
    type Output: Interpolation;

    /// Fit the scheme over `(x, y)` pairs. `x` must be strictly increasing
    /// and at least two points long.
    fn interpolate(&self, x: &[Real], y: &[Real]) -> Result<Self::Output>;

    /// Whether changing one node can move the interpolant everywhere.
    fn is_global(&self) -> bool {
        false
    }
}

fn validate_nodes(x: &[Real], y: &[Real]) -> Result<()> {
    if x.len() != y.len() {
        return Err(Error::Precondition(format!(
            "mismatched node lengths: {} abscissae, {} ordinates",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(Error::Precondition(format!(
            "at least 2 nodes required, got {}",
            x.len()
        )));
    }
    for w in x.windows(2) {
        if !(w[0] < w[1]) {
            return Err(Error::Precondition(format!(
                "abscissae not strictly increasing: {} then {}",
                w[0], w[1]
            )));
        }
    }
    Ok(())
}

/// Index of the segment containing `x`, clamped to the boundary segments.
fn locate(xs: &[Real], x: Real) -> usize {
    let i = xs.partition_point(|&xi| xi <= x);
    i.clamp(1, xs.len() - 1) - 1
}

/// Piecewise-linear interpolation. Local.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

/// A fitted piecewise-linear interpolant.
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    x: Vec<Real>,
    y: Vec<Real>,
}

impl InterpolationFactory for Linear {
    type Output = LinearInterpolation;

    fn interpolate(&self, x: &[Real], y: &[Real]) -> Result<LinearInterpolation> {
        validate_nodes(x, y)?;
        Ok(LinearInterpolation {
            x: x.to_vec(),
            y: y.to_vec(),
        })
    }
}

impl Interpolation for LinearInterpolation {
    fn x_min(&self) -> Real {
        self.x[0]
    }

    fn x_max(&self) -> Real {
        self.x[self.x.len() - 1]
    }

    fn value(&self, x: Real) -> Real {
        let i = locate(&self.x, x);
        let slope = (self.y[i + 1] - self.y[i]) / (self.x[i + 1] - self.x[i]);
        self.y[i] + slope * (x - self.x[i])
    }
}

/// Linear interpolation of the logarithm of the ordinates. Local; the
/// natural choice for discount factors, where it corresponds to piecewise
/// flat forward rates. Requires strictly positive ordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLinear;

/// A fitted log-linear interpolant.
#[derive(Debug, Clone)]
pub struct LogLinearInterpolation {
    inner: LinearInterpolation,
}

impl InterpolationFactory for LogLinear {
    type Output = LogLinearInterpolation;

    fn interpolate(&self, x: &[Real], y: &[Real]) -> Result<LogLinearInterpolation> {
        validate_nodes(x, y)?;
        let log_y = y
            .iter()
            .map(|&v| {
                if v > 0.0 {
                    Ok(v.ln())
                } else {
                    Err(Error::Precondition(format!(
                        "log-linear interpolation requires positive values, got {v}"
                    )))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(LogLinearInterpolation {
            inner: LinearInterpolation {
                x: x.to_vec(),
                y: log_y,
            },
        })
    }
}

impl Interpolation for LogLinearInterpolation {
    fn x_min(&self) -> Real {
        self.inner.x_min()
    }

    fn x_max(&self) -> Real {
        self.inner.x_max()
    }

    fn value(&self, x: Real) -> Real {
        self.inner.value(x).exp()
    }
}

/// Natural cubic spline: C2, zero second derivative at both ends. Global;
/// a bootstrapper fitting through it must iterate to convergence.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalCubic;

/// A fitted natural cubic spline.
#[derive(Debug, Clone)]
pub struct CubicInterpolation {
    x: Vec<Real>,
    y: Vec<Real>,
    /// Second derivatives at the nodes.
    y2: Vec<Real>,
}

impl InterpolationFactory for NaturalCubic {
    type Output = CubicInterpolation;

    fn interpolate(&self, x: &[Real], y: &[Real]) -> Result<CubicInterpolation> {
        validate_nodes(x, y)?;
        let n = x.len();
        let mut y2 = vec![0.0; n];
        if n > 2 {
            // Tridiagonal system for the interior second derivatives,
            // solved by forward elimination and back substitution.
            let mut gamma = vec![0.0; n];
            for i in 1..n - 1 {
                let h_lo = x[i] - x[i - 1];
                let h_hi = x[i + 1] - x[i];
                let sig = h_lo / (h_lo + h_hi);
                let p = sig * y2[i - 1] + 2.0;
                y2[i] = (sig - 1.0) / p;
                gamma[i] = (y[i + 1] - y[i]) / h_hi - (y[i] - y[i - 1]) / h_lo;
                gamma[i] = (6.0 * gamma[i] / (h_lo + h_hi) - sig * gamma[i - 1]) / p;
            }
            for i in (1..n - 1).rev() {
                y2[i] = y2[i] * y2[i + 1] + gamma[i];
            }
            y2[0] = 0.0;
            y2[n - 1] = 0.0;
        }
        Ok(CubicInterpolation {
            x: x.to_vec(),
            y: y.to_vec(),
            y2,
        })
    }

    fn is_global(&self) -> bool {
        true
    }
}

impl Interpolation for CubicInterpolation {
    fn x_min(&self) -> Real {
        self.x[0]
    }

    fn x_max(&self) -> Real {
        self.x[self.x.len() - 1]
    }

    fn value(&self, x: Real) -> Real {
        let i = locate(&self.x, x);
        let h = self.x[i + 1] - self.x[i];
        let a = (self.x[i + 1] - x) / h;
        let b = (x - self.x[i]) / h;
        a * self.y[i]
            + b * self.y[i + 1]
            + ((a * a * a - a) * self.y2[i] + (b * b * b - b) * self.y2[i + 1]) * (h * h) / 6.0
    }
}
