//! Derivative-free solvers: bisection, false position, secant, Ridder's
//! method, and the Brent solver the bootstrapper uses by default.

use qc_core::errors::Result;
use qc_core::Real;

use super::{Solver1D, SolverOptions, SolverState};

/// Interval bisection. Linear convergence, unconditionally safe.
#[derive(Debug, Clone, Default)]
pub struct Bisection {
    /// Solver configuration.
    pub options: SolverOptions,
}

impl Solver1D for Bisection {
    fn options(&self) -> &SolverOptions {
        &self.options
    }

    fn refine<F>(&self, f: &mut F, state: &mut SolverState, accuracy: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Real,
    {
        // Keep the decreasing side in (x_lo, moving toward the root).
        let (mut x_lo, mut dx) = if state.fx_min < 0.0 {
            (state.x_min, state.x_max - state.x_min)
        } else {
            (state.x_max, state.x_min - state.x_max)
        };

        loop {
            dx /= 2.0;
            let x_mid = x_lo + dx;
            let f_mid = state.evaluate(f, x_mid)?;
            if f_mid <= 0.0 {
                x_lo = x_mid;
            }
            if dx.abs() < accuracy || f_mid == 0.0 {
                return Ok(x_mid);
            }
        }
    }
}

/// False position (regula falsi): secant step kept inside the bracket.
#[derive(Debug, Clone, Default)]
pub struct FalsePosition {
    /// Solver configuration.
    pub options: SolverOptions,
}

impl Solver1D for FalsePosition {
    fn options(&self) -> &SolverOptions {
        &self.options
    }

    fn refine<F>(&self, f: &mut F, state: &mut SolverState, accuracy: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Real,
    {
        // Orient the bracket so f(x_lo) < 0 < f(x_hi).
        let (mut x_lo, mut f_lo, mut x_hi, mut f_hi) = if state.fx_min < 0.0 {
            (state.x_min, state.fx_min, state.x_max, state.fx_max)
        } else {
            (state.x_max, state.fx_max, state.x_min, state.fx_min)
        };
        let mut dx = x_hi - x_lo;

        loop {
            let root = x_lo + dx * f_lo / (f_lo - f_hi);
            let froot = state.evaluate(f, root)?;
            let del;
            if froot < 0.0 {
                del = x_lo - root;
                x_lo = root;
                f_lo = froot;
            } else {
                del = x_hi - root;
                x_hi = root;
                f_hi = froot;
            }
            dx = x_hi - x_lo;
            if del.abs() < accuracy || froot == 0.0 {
                return Ok(root);
            }
        }
    }
}

/// Secant method. Superlinear when it behaves; the evaluation budget stops
/// it when the iteration wanders.
#[derive(Debug, Clone, Default)]
pub struct Secant {
    /// Solver configuration.
    pub options: SolverOptions,
}

impl Solver1D for Secant {
    fn options(&self) -> &SolverOptions {
        &self.options
    }

    fn refine<F>(&self, f: &mut F, state: &mut SolverState, accuracy: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Real,
    {
        // Seed from the bracket endpoints, root chasing the smaller |f|.
        let (mut x_lo, mut f_lo, mut root, mut froot) =
            if state.fx_min.abs() < state.fx_max.abs() {
                (state.x_max, state.fx_max, state.x_min, state.fx_min)
            } else {
                (state.x_min, state.fx_min, state.x_max, state.fx_max)
            };

        loop {
            let dx = (x_lo - root) * froot / (froot - f_lo);
            x_lo = root;
            f_lo = froot;
            root += dx;
            froot = state.evaluate(f, root)?;
            if dx.abs() < accuracy || froot == 0.0 {
                return Ok(root);
            }
        }
    }
}

/// Ridder's method: exponential correction to the false-position step.
#[derive(Debug, Clone, Default)]
pub struct Ridder {
    /// Solver configuration.
    pub options: SolverOptions,
}

impl Solver1D for Ridder {
    fn options(&self) -> &SolverOptions {
        &self.options
    }

    fn refine<F>(&self, f: &mut F, state: &mut SolverState, accuracy: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Real,
    {
        let (mut x_lo, mut f_lo) = (state.x_min, state.fx_min);
        let (mut x_hi, mut f_hi) = (state.x_max, state.fx_max);
        // No estimate yet; comparisons against NaN are false, so the first
        // iteration cannot terminate early.
        let mut root = Real::NAN;

        loop {
            let x_mid = 0.5 * (x_lo + x_hi);
            let f_mid = state.evaluate(f, x_mid)?;
            let s = (f_mid * f_mid - f_lo * f_hi).sqrt();
            if s == 0.0 {
                return Ok(root);
            }
            // Updating formula: midpoint pushed toward the root.
            let sign = if f_lo >= f_hi { 1.0 } else { -1.0 };
            let next = x_mid + (x_mid - x_lo) * sign * f_mid / s;
            if (next - root).abs() <= accuracy {
                return Ok(root);
            }
            root = next;
            let froot = state.evaluate(f, root)?;
            if froot == 0.0 {
                return Ok(root);
            }
            // Re-bracket using whichever side keeps the sign change.
            if sign_transfer(f_mid, froot) != f_mid {
                x_lo = x_mid;
                f_lo = f_mid;
                x_hi = root;
                f_hi = froot;
            } else if sign_transfer(f_lo, froot) != f_lo {
                x_hi = root;
                f_hi = froot;
            } else if sign_transfer(f_hi, froot) != f_hi {
                x_lo = root;
                f_lo = froot;
            } else {
                return Ok(root);
            }
            if (x_hi - x_lo).abs() <= accuracy {
                return Ok(root);
            }
        }
    }
}

/// |a| with the sign of b.
fn sign_transfer(a: Real, b: Real) -> Real {
    if b >= 0.0 {
        a.abs()
    } else {
        -a.abs()
    }
}

/// The Brent solver: inverse quadratic interpolation with bisection
/// fallback. The workhorse for curve bootstrapping.
#[derive(Debug, Clone, Default)]
pub struct Brent {
    /// Solver configuration.
    pub options: SolverOptions,
}

impl Solver1D for Brent {
    fn options(&self) -> &SolverOptions {
        &self.options
    }

    fn refine<F>(&self, f: &mut F, state: &mut SolverState, accuracy: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Real,
    {
        let mut a = state.x_min;
        let mut fa = state.fx_min;
        let mut b = state.x_max;
        let mut fb = state.fx_max;
        let mut c = b;
        let mut fc = fb;
        let mut d = b - a;
        let mut e = d;

        loop {
            if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }
            let tol = 2.0 * Real::EPSILON * b.abs() + 0.5 * accuracy;
            let xm = 0.5 * (c - b);
            if xm.abs() <= tol || fb == 0.0 {
                state.root = b;
                return Ok(b);
            }
            if e.abs() >= tol && fa.abs() > fb.abs() {
                // Attempt inverse quadratic interpolation.
                let s = fb / fa;
                let (mut p, mut q) = if a == c {
                    (2.0 * xm * s, 1.0 - s)
                } else {
                    let q = fa / fc;
                    let r = fb / fc;
                    (
                        s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                        (q - 1.0) * (r - 1.0) * (s - 1.0),
                    )
                };
                if p > 0.0 {
                    q = -q;
                }
                p = p.abs();
                let min1 = 3.0 * xm * q - (tol * q).abs();
                let min2 = (e * q).abs();
                if 2.0 * p < min1.min(min2) {
                    // Interpolation accepted.
                    e = d;
                    d = p / q;
                } else {
                    // Interpolation failed, fall back to bisection.
                    d = xm;
                    e = d;
                }
            } else {
                // Bounds are decreasing too slowly, use bisection.
                d = xm;
                e = d;
            }
            a = b;
            fa = fb;
            b += if d.abs() > tol {
                d
            } else {
                sign_transfer(tol, xm)
            };
            fb = state.evaluate(f, b)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qc_core::errors::Error;

    // f(x) = x^3 - x - 2, single real root near 1.5213797.
    const CUBIC_ROOT: Real = 1.521_379_706_804_567_6;

    fn cubic(x: Real) -> Real {
        x * x * x - x - 2.0
    }

    fn check_solver<S: Solver1D>(solver: &S) {
        let accuracy = 1e-10;
        let root = solver.solve(cubic, accuracy, 1.0, 0.5).unwrap();
        assert_abs_diff_eq!(root, CUBIC_ROOT, epsilon = 1e-8);

        let root = solver
            .solve_bracketed(cubic, accuracy, 1.5, 1.0, 2.0)
            .unwrap();
        assert_abs_diff_eq!(root, CUBIC_ROOT, epsilon = 1e-8);
    }

    #[test]
    fn bisection_finds_cubic_root() {
        check_solver(&Bisection::default());
    }

    #[test]
    fn false_position_finds_cubic_root() {
        check_solver(&FalsePosition::default());
    }

    #[test]
    fn secant_finds_cubic_root() {
        check_solver(&Secant::default());
    }

    #[test]
    fn ridder_finds_cubic_root() {
        check_solver(&Ridder::default());
    }

    #[test]
    fn brent_finds_cubic_root() {
        check_solver(&Brent::default());
    }

    #[test]
    fn brent_finds_sqrt_two() {
        let root = Brent::default()
            .solve_bracketed(|x| x * x - 2.0, 1e-12, 1.5, 0.0, 2.0)
            .unwrap();
        assert_abs_diff_eq!(root, 2.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn nan_objective_never_becomes_a_root() {
        // An objective undefined below zero must not have the bad endpoint
        // returned as the root.
        let err = Brent::default()
            .solve_bracketed(
                |x: Real| if x <= 0.0 { Real::NAN } else { x - 0.0455 },
                1e-12,
                0.0455,
                -0.10,
                0.30,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Runtime(_)), "{err}");
    }

    #[test]
    fn bad_bracket_is_rejected() {
        let err = Brent::default()
            .solve_bracketed(cubic, 1e-10, 3.0, 2.5, 4.0)
            .unwrap_err();
        assert!(matches!(err, Error::Bracketing { .. }), "{err}");
    }

    #[test]
    fn inverted_bracket_is_rejected() {
        let err = Brent::default()
            .solve_bracketed(cubic, 1e-10, 1.5, 2.0, 1.0)
            .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)), "{err}");
    }

    #[test]
    fn guess_outside_bracket_is_rejected() {
        let err = Brent::default()
            .solve_bracketed(cubic, 1e-10, 5.0, 1.0, 2.0)
            .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)), "{err}");
    }

    #[test]
    fn rootless_function_fails_to_bracket() {
        let err = Brent::default()
            .solve(|x: Real| x * x + 1.0, 1e-10, 0.0, 0.1)
            .unwrap_err();
        assert!(matches!(err, Error::Bracketing { .. }), "{err}");
    }

    #[test]
    fn bound_enforcement_keeps_expansion_inside() {
        // Root at 0.25; lower bound keeps the expansion out of x <= 0 where
        // the objective is undefined for the caller.
        let solver = Brent {
            options: SolverOptions {
                lower_bound: Some(1e-9),
                ..SolverOptions::default()
            },
        };
        let mut probed_below = false;
        let root = solver
            .solve(
                |x: Real| {
                    if x < 1e-9 {
                        probed_below = true;
                    }
                    x.max(1e-9).ln() - 0.25_f64.ln()
                },
                1e-10,
                1.0,
                0.5,
            )
            .unwrap();
        assert_abs_diff_eq!(root, 0.25, epsilon = 1e-8);
        assert!(!probed_below, "bracketing probed below the lower bound");
    }

    #[test]
    fn exact_zero_at_guess_returns_immediately() {
        let solver = Bisection::default();
        let root = solver.solve(|x: Real| x - 1.5, 1e-10, 1.5, 0.1).unwrap();
        assert_eq!(root, 1.5);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // The returned root never leaves the caller's bracket.
            #[test]
            fn brent_root_stays_in_bracket(k in -800.0f64..800.0) {
                let root = Brent::default()
                    .solve_bracketed(|x: Real| x * x * x - k, 1e-10, 0.0, -10.0, 10.0)
                    .unwrap();
                prop_assert!((-10.0..=10.0).contains(&root));
                prop_assert!((root - k.cbrt()).abs() < 1e-7);
            }

            #[test]
            fn bisection_root_stays_in_bracket(k in -800.0f64..800.0) {
                let root = Bisection::default()
                    .solve_bracketed(|x: Real| x * x * x - k, 1e-10, 0.0, -10.0, 10.0)
                    .unwrap();
                prop_assert!((-10.0..=10.0).contains(&root));
            }
        }
    }

    #[test]
    fn budget_bounds_total_evaluations() {
        let solver = Bisection {
            options: SolverOptions {
                max_evaluations: 5,
                ..SolverOptions::default()
            },
        };
        // Tight accuracy: bisection cannot converge in 5 evaluations.
        let err = solver
            .solve_bracketed(cubic, 1e-15, 1.5, 1.0, 2.0)
            .unwrap_err();
        assert!(matches!(err, Error::MaxEvaluations { max: 5 }), "{err}");
    }
}
