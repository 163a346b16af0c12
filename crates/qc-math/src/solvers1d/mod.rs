//! 1-D root-finding solvers.
//!
//! All solvers share the same bracket-and-refine contract. The entry points
//! are provided by [`Solver1D`] (scalar objectives) and
//! [`DerivativeSolver1D`] (objectives that also return their derivative):
//!
//! * `solve(f, accuracy, guess, step)` — expands a bracket geometrically
//!   around the guess until a sign change is found, then refines. Failure to
//!   bracket within the evaluation budget is a [bracketing
//!   failure](qc_core::Error::Bracketing).
//! * `solve_bracketed(f, accuracy, guess, x_min, x_max)` — the caller
//!   supplies a bracket; `f(x_min)` and `f(x_max)` must have opposite signs
//!   (an exact zero at either endpoint returns early).
//!
//! Every function evaluation — derivative evaluations included — is charged
//! against a per-solve budget held in [`SolverState`]; exceeding it fails
//! deterministically with [`Error::MaxEvaluations`]. No solver ever
//! substitutes a default value for a failed solve; a NaN function value
//! fails the solve on the spot.

mod derivative_free;
mod newton;

pub use derivative_free::{Bisection, Brent, FalsePosition, Ridder, Secant};
pub use newton::{Newton, NewtonSafe};

use qc_core::errors::{Error, Result};
use qc_core::Real;

/// Default cap on function evaluations per solve.
pub const MAX_FUNCTION_EVALUATIONS: usize = 100;

/// Geometric growth factor used when expanding a bracket.
const GROWTH_FACTOR: Real = 1.6;

/// Per-solver configuration, embedded in each solver type.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Maximum function evaluations per `solve` call.
    pub max_evaluations: usize,
    /// Optional hard lower bound the bracket expansion must not cross.
    pub lower_bound: Option<Real>,
    /// Optional hard upper bound the bracket expansion must not cross.
    pub upper_bound: Option<Real>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_evaluations: MAX_FUNCTION_EVALUATIONS,
            lower_bound: None,
            upper_bound: None,
        }
    }
}

impl SolverOptions {
    fn enforce_bounds(&self, x: Real) -> Real {
        let x = match self.lower_bound {
            Some(lo) if x < lo => lo,
            _ => x,
        };
        match self.upper_bound {
            Some(hi) if x > hi => hi,
            _ => x,
        }
    }
}

/// Per-call solver state: the current bracket, best estimate, and the
/// evaluation budget. Created fresh for every solve; never shared.
#[derive(Debug)]
pub struct SolverState {
    /// Current best root estimate.
    pub root: Real,
    /// Lower bracket end.
    pub x_min: Real,
    /// Upper bracket end.
    pub x_max: Real,
    /// Function value at `x_min`.
    pub fx_min: Real,
    /// Function value at `x_max`.
    pub fx_max: Real,
    evaluations: usize,
    max_evaluations: usize,
}

impl SolverState {
    fn new(max_evaluations: usize) -> Self {
        Self {
            root: Real::NAN,
            x_min: Real::NAN,
            x_max: Real::NAN,
            fx_min: Real::NAN,
            fx_max: Real::NAN,
            evaluations: 0,
            max_evaluations,
        }
    }

    /// Number of evaluations performed so far in this solve.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    fn charge(&mut self, n: usize) -> Result<()> {
        if self.evaluations + n > self.max_evaluations {
            return Err(Error::MaxEvaluations {
                max: self.max_evaluations,
            });
        }
        self.evaluations += n;
        Ok(())
    }

    /// Evaluate `f(x)`, charging one evaluation against the budget.
    ///
    /// A NaN function value fails the solve immediately: every sign
    /// comparison on NaN is false, so letting it into the bracket logic
    /// would make a solver converge onto the bad point and return it.
    pub fn evaluate<F>(&mut self, f: &mut F, x: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Real,
    {
        self.charge(1)?;
        let fx = f(x);
        if fx.is_nan() {
            return Err(Error::Runtime(format!(
                "objective returned NaN at x = {x}"
            )));
        }
        Ok(fx)
    }

    /// Evaluate `(f(x), f'(x))`, charging two evaluations (the derivative
    /// counts as one of its own). NaN in either component fails the solve.
    pub fn evaluate_pair<F>(&mut self, f: &mut F, x: Real) -> Result<(Real, Real)>
    where
        F: FnMut(Real) -> (Real, Real),
    {
        self.charge(2)?;
        let (fx, dfx) = f(x);
        if fx.is_nan() || dfx.is_nan() {
            return Err(Error::Runtime(format!(
                "objective returned NaN at x = {x}"
            )));
        }
        Ok((fx, dfx))
    }

    fn bracketing_failure(&self) -> Error {
        Error::Bracketing {
            evaluations: self.evaluations,
            x_min: self.x_min,
            x_max: self.x_max,
            fx_min: self.fx_min,
            fx_max: self.fx_max,
        }
    }
}

/// Validate the requested accuracy and floor it at machine epsilon.
fn effective_accuracy(accuracy: Real) -> Result<Real> {
    if !(accuracy > 0.0) {
        return Err(Error::Precondition(format!(
            "accuracy ({accuracy}) must be positive"
        )));
    }
    Ok(accuracy.max(Real::EPSILON))
}

/// Expand a bracket around `guess` until `f` changes sign.
///
/// On success the state holds a valid bracket and `root` is its midpoint;
/// `Ok(Some(x))` short-circuits when an exact zero is hit. Exhausting the
/// evaluation budget is reported as a bracketing failure carrying the last
/// bracket attempt.
fn auto_bracket<E>(
    state: &mut SolverState,
    options: &SolverOptions,
    guess: Real,
    step: Real,
    mut eval: E,
) -> Result<Option<Real>>
where
    E: FnMut(&mut SolverState, Real) -> Result<Real>,
{
    if !(step > 0.0) {
        return Err(Error::Precondition(format!(
            "bracketing step ({step}) must be positive"
        )));
    }

    let expand = |state: &mut SolverState, eval: &mut E| -> Result<Option<Real>> {
        let f_guess = eval(state, guess)?;
        if f_guess == 0.0 {
            return Ok(Some(guess));
        }
        // Orient the initial bracket according to the sign at the guess.
        if f_guess > 0.0 {
            state.x_min = options.enforce_bounds(guess - step);
            state.fx_min = eval(state, state.x_min)?;
            state.x_max = guess;
            state.fx_max = f_guess;
        } else {
            state.x_min = guess;
            state.fx_min = f_guess;
            state.x_max = options.enforce_bounds(guess + step);
            state.fx_max = eval(state, state.x_max)?;
        }

        let mut flipflop = -1;
        while state.evaluations < state.max_evaluations {
            if state.fx_min * state.fx_max <= 0.0 {
                if state.fx_min == 0.0 {
                    return Ok(Some(state.x_min));
                }
                if state.fx_max == 0.0 {
                    return Ok(Some(state.x_max));
                }
                state.root = 0.5 * (state.x_min + state.x_max);
                return Ok(None);
            }
            // Same |f| on both ends: alternate which side grows.
            if state.fx_min.abs() < state.fx_max.abs()
                || (state.fx_min.abs() == state.fx_max.abs() && flipflop == -1)
            {
                state.x_min =
                    options.enforce_bounds(state.x_min + GROWTH_FACTOR * (state.x_min - state.x_max));
                state.fx_min = eval(state, state.x_min)?;
                flipflop = 1;
            } else {
                state.x_max =
                    options.enforce_bounds(state.x_max + GROWTH_FACTOR * (state.x_max - state.x_min));
                state.fx_max = eval(state, state.x_max)?;
                flipflop = -1;
            }
        }
        Err(Error::MaxEvaluations {
            max: state.max_evaluations,
        })
    };

    match expand(state, &mut eval) {
        Ok(out) => Ok(out),
        // Budget ran out while still expanding: that is a bracketing failure.
        Err(Error::MaxEvaluations { .. }) => Err(state.bracketing_failure()),
        Err(e) => Err(e),
    }
}

/// Validate an explicit bracket and evaluate its endpoints.
///
/// `Ok(Some(x))` short-circuits on an exact endpoint zero; otherwise the
/// state holds the bracket and `root == guess`.
fn check_bracket<E>(
    state: &mut SolverState,
    guess: Real,
    x_min: Real,
    x_max: Real,
    mut eval: E,
) -> Result<Option<Real>>
where
    E: FnMut(&mut SolverState, Real) -> Result<Real>,
{
    if !(x_min < x_max) {
        return Err(Error::Precondition(format!(
            "invalid bracket: x_min ({x_min}) >= x_max ({x_max})"
        )));
    }
    state.x_min = x_min;
    state.x_max = x_max;
    state.fx_min = eval(state, x_min)?;
    if state.fx_min == 0.0 {
        return Ok(Some(x_min));
    }
    state.fx_max = eval(state, x_max)?;
    if state.fx_max == 0.0 {
        return Ok(Some(x_max));
    }
    if state.fx_min * state.fx_max > 0.0 {
        return Err(state.bracketing_failure());
    }
    if !(guess > x_min && guess < x_max) {
        return Err(Error::Precondition(format!(
            "guess ({guess}) outside bracket [{x_min}, {x_max}]"
        )));
    }
    state.root = guess;
    Ok(None)
}

/// The bracket-and-refine contract for solvers over scalar objectives.
pub trait Solver1D {
    /// The solver's configuration.
    fn options(&self) -> &SolverOptions;

    /// Run the algorithm's refinement loop over an established bracket.
    ///
    /// On entry the state holds a valid bracket (`fx_min * fx_max < 0`) and
    /// an in-bracket starting estimate in `root`.
    fn refine<F>(&self, f: &mut F, state: &mut SolverState, accuracy: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Real;

    /// Find a root of `f` near `guess`, auto-bracketing with the given step.
    fn solve<F>(&self, mut f: F, accuracy: Real, guess: Real, step: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Real,
    {
        let accuracy = effective_accuracy(accuracy)?;
        let mut state = SolverState::new(self.options().max_evaluations);
        match auto_bracket(&mut state, self.options(), guess, step, |s, x| {
            s.evaluate(&mut f, x)
        })? {
            Some(root) => Ok(root),
            None => self.refine(&mut f, &mut state, accuracy),
        }
    }

    /// Find a root of `f` inside the bracket `[x_min, x_max]`.
    fn solve_bracketed<F>(
        &self,
        mut f: F,
        accuracy: Real,
        guess: Real,
        x_min: Real,
        x_max: Real,
    ) -> Result<Real>
    where
        F: FnMut(Real) -> Real,
    {
        let accuracy = effective_accuracy(accuracy)?;
        let mut state = SolverState::new(self.options().max_evaluations);
        match check_bracket(&mut state, guess, x_min, x_max, |s, x| {
            s.evaluate(&mut f, x)
        })? {
            Some(root) => Ok(root),
            None => self.refine(&mut f, &mut state, accuracy),
        }
    }
}

/// The bracket-and-refine contract for solvers that use the derivative.
///
/// The objective returns `(f(x), f'(x))`; each invocation is charged as two
/// evaluations.
pub trait DerivativeSolver1D {
    /// The solver's configuration.
    fn options(&self) -> &SolverOptions;

    /// Run the algorithm's refinement loop over an established bracket.
    fn refine<F>(&self, f: &mut F, state: &mut SolverState, accuracy: Real) -> Result<Real>
    where
        F: FnMut(Real) -> (Real, Real);

    /// Find a root of `f` near `guess`, auto-bracketing with the given step.
    fn solve<F>(&self, mut f: F, accuracy: Real, guess: Real, step: Real) -> Result<Real>
    where
        F: FnMut(Real) -> (Real, Real),
    {
        let accuracy = effective_accuracy(accuracy)?;
        let mut state = SolverState::new(self.options().max_evaluations);
        match auto_bracket(&mut state, self.options(), guess, step, |s, x| {
            s.evaluate_pair(&mut f, x).map(|(v, _)| v)
        })? {
            Some(root) => Ok(root),
            None => self.refine(&mut f, &mut state, accuracy),
        }
    }

    /// Find a root of `f` inside the bracket `[x_min, x_max]`.
    fn solve_bracketed<F>(
        &self,
        mut f: F,
        accuracy: Real,
        guess: Real,
        x_min: Real,
        x_max: Real,
    ) -> Result<Real>
    where
        F: FnMut(Real) -> (Real, Real),
    {
        let accuracy = effective_accuracy(accuracy)?;
        let mut state = SolverState::new(self.options().max_evaluations);
        match check_bracket(&mut state, guess, x_min, x_max, |s, x| {
            s.evaluate_pair(&mut f, x).map(|(v, _)| v)
        })? {
            Some(root) => Ok(root),
            None => self.refine(&mut f, &mut state, accuracy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_must_be_positive() {
        assert!(matches!(
            effective_accuracy(0.0),
            Err(Error::Precondition(_))
        ));
        assert!(matches!(
            effective_accuracy(-1e-8),
            Err(Error::Precondition(_))
        ));
        // Sub-epsilon requests are floored, not rejected.
        assert_eq!(effective_accuracy(1e-300).unwrap(), Real::EPSILON);
    }

    #[test]
    fn budget_is_charged_per_evaluation() {
        let mut state = SolverState::new(3);
        let mut f = |x: Real| x;
        assert!(state.evaluate(&mut f, 1.0).is_ok());
        assert!(state.evaluate(&mut f, 2.0).is_ok());
        assert!(state.evaluate(&mut f, 3.0).is_ok());
        assert!(matches!(
            state.evaluate(&mut f, 4.0),
            Err(Error::MaxEvaluations { max: 3 })
        ));
        assert_eq!(state.evaluations(), 3);
    }

    #[test]
    fn derivative_evaluations_count_as_one_each() {
        let mut state = SolverState::new(3);
        let mut f = |x: Real| (x, 1.0);
        assert!(state.evaluate_pair(&mut f, 1.0).is_ok());
        assert_eq!(state.evaluations(), 2);
        assert!(state.evaluate_pair(&mut f, 2.0).is_err(), "3rd+4th over cap");
    }

    #[test]
    fn auto_bracket_finds_sign_change() {
        let mut state = SolverState::new(100);
        let options = SolverOptions::default();
        let mut f = |x: Real| x * x - 2.0;
        let out = auto_bracket(&mut state, &options, 1.0, 0.1, |s, x| {
            s.evaluate(&mut f, x)
        })
        .unwrap();
        assert!(out.is_none());
        assert!(state.fx_min * state.fx_max < 0.0);
        assert!(state.x_min < 2.0_f64.sqrt() && 2.0_f64.sqrt() < state.x_max);
    }

    #[test]
    fn auto_bracket_fails_on_rootless_function() {
        let mut state = SolverState::new(50);
        let options = SolverOptions::default();
        let mut f = |x: Real| x * x + 1.0;
        let err = auto_bracket(&mut state, &options, 0.0, 0.1, |s, x| {
            s.evaluate(&mut f, x)
        })
        .unwrap_err();
        assert!(matches!(err, Error::Bracketing { .. }), "{err}");
    }

    #[test]
    fn check_bracket_rejects_same_sign() {
        let mut state = SolverState::new(100);
        let mut f = |x: Real| x * x + 1.0;
        let err = check_bracket(&mut state, 1.0, 0.0, 2.0, |s, x| s.evaluate(&mut f, x))
            .unwrap_err();
        assert!(matches!(err, Error::Bracketing { .. }), "{err}");
    }

    #[test]
    fn nan_function_values_fail_the_solve() {
        // A NaN endpoint slips past the sign test (every NaN comparison is
        // false), so it must be rejected at evaluation time.
        let mut state = SolverState::new(10);
        let mut f = |x: Real| if x <= 0.0 { Real::NAN } else { x - 0.0455 };
        let err = check_bracket(&mut state, 0.0455, -0.10, 0.30, |s, x| {
            s.evaluate(&mut f, x)
        })
        .unwrap_err();
        assert!(matches!(err, Error::Runtime(_)), "{err}");
    }

    #[test]
    fn nan_derivatives_fail_the_solve() {
        let mut state = SolverState::new(10);
        let mut f = |x: Real| (x, Real::NAN);
        let err = state.evaluate_pair(&mut f, 1.0).unwrap_err();
        assert!(matches!(err, Error::Runtime(_)), "{err}");
    }

    #[test]
    fn check_bracket_returns_exact_endpoint_zero() {
        let mut state = SolverState::new(100);
        let mut f = |x: Real| x - 2.0;
        let out = check_bracket(&mut state, 1.0, 0.0, 2.0, |s, x| s.evaluate(&mut f, x)).unwrap();
        assert_eq!(out, Some(2.0));
    }
}
