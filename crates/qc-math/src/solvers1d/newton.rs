//! Newton-Raphson solvers over `(f, f')` objectives.

use qc_core::errors::Result;
use qc_core::Real;

use super::{DerivativeSolver1D, SolverOptions, SolverState};

/// Plain Newton-Raphson. Quadratic convergence near the root; when a tangent
/// step leaves the bracket (or the derivative vanishes) the remaining budget
/// is handed to [`NewtonSafe`].
#[derive(Debug, Clone, Default)]
pub struct Newton {
    /// Solver configuration.
    pub options: SolverOptions,
}

impl DerivativeSolver1D for Newton {
    fn options(&self) -> &SolverOptions {
        &self.options
    }

    fn refine<F>(&self, f: &mut F, state: &mut SolverState, accuracy: Real) -> Result<Real>
    where
        F: FnMut(Real) -> (Real, Real),
    {
        let mut root = state.root;
        loop {
            let (froot, dfroot) = state.evaluate_pair(f, root)?;
            if froot == 0.0 {
                return Ok(root);
            }
            if dfroot == 0.0 {
                // Flat tangent: let the bracketed variant take over with
                // whatever budget is left.
                state.root = root;
                return NewtonSafe::fallback().refine(f, state, accuracy);
            }
            let dx = froot / dfroot;
            let next = root - dx;
            if next <= state.x_min || next >= state.x_max {
                state.root = root;
                return NewtonSafe::fallback().refine(f, state, accuracy);
            }
            root = next;
            if dx.abs() < accuracy {
                return Ok(root);
            }
        }
    }
}

/// Bracketed Newton-Raphson: a tangent step that would leave the bracket is
/// replaced by a bisection step, so the iterate can never escape.
#[derive(Debug, Clone, Default)]
pub struct NewtonSafe {
    /// Solver configuration.
    pub options: SolverOptions,
}

impl NewtonSafe {
    fn fallback() -> Self {
        Self::default()
    }
}

impl DerivativeSolver1D for NewtonSafe {
    fn options(&self) -> &SolverOptions {
        &self.options
    }

    fn refine<F>(&self, f: &mut F, state: &mut SolverState, accuracy: Real) -> Result<Real>
    where
        F: FnMut(Real) -> (Real, Real),
    {
        // Orient so that f(x_lo) < 0 < f(x_hi).
        let (mut x_lo, mut x_hi) = if state.fx_min < 0.0 {
            (state.x_min, state.x_max)
        } else {
            (state.x_max, state.x_min)
        };

        let mut root = state.root;
        let mut dx_old = (state.x_max - state.x_min).abs();
        let mut dx = dx_old;
        let (mut froot, mut dfroot) = state.evaluate_pair(f, root)?;

        loop {
            let tangent_exits = ((root - x_hi) * dfroot - froot) * ((root - x_lo) * dfroot - froot)
                > 0.0;
            let too_slow = (2.0 * froot).abs() > (dx_old * dfroot).abs();
            if tangent_exits || too_slow {
                dx_old = dx;
                dx = 0.5 * (x_hi - x_lo);
                root = x_lo + dx;
            } else {
                dx_old = dx;
                dx = froot / dfroot;
                root -= dx;
            }
            if dx.abs() < accuracy {
                return Ok(root);
            }
            (froot, dfroot) = state.evaluate_pair(f, root)?;
            if froot < 0.0 {
                x_lo = root;
            } else {
                x_hi = root;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qc_core::errors::Error;

    const CUBIC_ROOT: Real = 1.521_379_706_804_567_6;

    fn cubic(x: Real) -> (Real, Real) {
        (x * x * x - x - 2.0, 3.0 * x * x - 1.0)
    }

    #[test]
    fn newton_finds_cubic_root() {
        let root = Newton::default().solve(cubic, 1e-12, 1.0, 0.5).unwrap();
        assert_abs_diff_eq!(root, CUBIC_ROOT, epsilon = 1e-10);
    }

    #[test]
    fn newton_safe_finds_cubic_root() {
        let root = NewtonSafe::default()
            .solve_bracketed(cubic, 1e-12, 1.5, 1.0, 2.0)
            .unwrap();
        assert_abs_diff_eq!(root, CUBIC_ROOT, epsilon = 1e-10);
    }

    #[test]
    fn newton_hands_off_on_runaway_tangent() {
        // f(x) = x^5 - x - 1, root near 1.1673. A Newton step from a flat
        // region overshoots the bracket and must fall back to the safe
        // variant instead of escaping.
        let f = |x: Real| (x.powi(5) - x - 1.0, 5.0 * x.powi(4) - 1.0);
        let root = Newton::default()
            .solve_bracketed(f, 1e-12, 0.1, -0.5, 2.0)
            .unwrap();
        assert_abs_diff_eq!(root, 1.167_303_978_261_419, epsilon = 1e-9);
    }

    #[test]
    fn handoff_shares_the_evaluation_budget() {
        let f = |x: Real| (x.powi(5) - x - 1.0, 5.0 * x.powi(4) - 1.0);
        let solver = Newton {
            options: SolverOptions {
                max_evaluations: 6,
                ..SolverOptions::default()
            },
        };
        // Bracketing spends 2, the first Newton step 2, the handoff gets
        // only 2 more: not enough to converge to 1e-12.
        let err = solver
            .solve_bracketed(f, 1e-12, 0.1, -0.5, 2.0)
            .unwrap_err();
        assert!(matches!(err, Error::MaxEvaluations { max: 6 }), "{err}");
    }

    #[test]
    fn derivative_solver_auto_brackets() {
        let root = NewtonSafe::default().solve(cubic, 1e-12, 0.0, 1.0).unwrap();
        assert_abs_diff_eq!(root, CUBIC_ROOT, epsilon = 1e-10);
    }
}
