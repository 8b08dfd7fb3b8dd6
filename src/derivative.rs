//! Numerical differentiation by central differences.
//!
//! The first derivative is estimated as `(f(p+h) - f(p-h)) / 2h`, accurate to second
//! order in `h`. There is no adaptive step selection: the caller chooses `h` through
//! [`EvalConfig::step`](crate::EvalConfig). Too large a step biases the estimate,
//! too small a step amplifies rounding error.

use crate::config::EvalConfig;
use crate::errors::EvalError;
use crate::formula::{finite, Formula};
use crate::types::FunctionDef;

/// Estimates `f'(point)` with a centered difference of half-width `h`.
///
/// # Errors
/// Returns `EvalError::InvalidStep` if `h` is zero or not finite, the error of `f` if
/// either evaluation fails, and `EvalError::NonFinite` if the quotient overflows.
pub fn central_difference<F>(f: F, point: f64, h: f64) -> Result<f64, EvalError>
where
    F: Fn(f64) -> Result<f64, EvalError>,
{
    let h = valid_step(h)?;
    let forward = f(point + h)?;
    let backward = f(point - h)?;
    finite((forward - backward) / (2.0 * h))
}

/// Estimates `f''(point)` as `(f(p+h) - 2f(p) + f(p-h)) / h²`.
pub fn second_difference<F>(f: F, point: f64, h: f64) -> Result<f64, EvalError>
where
    F: Fn(f64) -> Result<f64, EvalError>,
{
    let h = valid_step(h)?;
    let forward = f(point + h)?;
    let center = f(point)?;
    let backward = f(point - h)?;
    finite((forward - 2.0 * center + backward) / (h * h))
}

fn valid_step(h: f64) -> Result<f64, EvalError> {
    if h.is_finite() && h != 0.0 {
        Ok(h.abs())
    } else {
        Err(EvalError::InvalidStep(h))
    }
}

/// Numerical derivative of `expr` at `point`, with user functions resolved.
///
/// Returns `None` if the expression does not parse, if either perturbed evaluation fails,
/// or if `config.step` is not usable.
///
/// # Example
/// ```
/// use plotexpr::{numerical_derivative, EvalConfig};
///
/// let config = EvalConfig::default().with_independent_var("u");
/// let slope = numerical_derivative("u^3", 2.0, &config).unwrap();
/// assert!((slope - 12.0).abs() < 1e-3);
/// ```
pub fn numerical_derivative(expr: &str, point: f64, config: &EvalConfig) -> Option<f64> {
    try_numerical_derivative(expr, point, config).ok()
}

/// Like [`numerical_derivative`], reporting why the derivative is unavailable.
pub fn try_numerical_derivative(expr: &str, point: f64, config: &EvalConfig) -> Result<f64, EvalError> {
    Formula::parse(expr)?.derivative_at(point, config)
}

/// Numerical second derivative of `expr` at `point`, with user functions resolved.
pub fn second_derivative(expr: &str, point: f64, config: &EvalConfig) -> Option<f64> {
    Formula::parse(expr)
        .and_then(|formula| formula.second_derivative_at(point, config))
        .ok()
}

/// Derivative of a user function at `point`.
///
/// A non-empty closed-form `derivative` on the definition is evaluated directly; otherwise
/// the derivative of `def.expr` is estimated numerically. Either way the function's own
/// independent variable is used and the function is excluded from composition.
pub fn derivative_of(def: &FunctionDef, point: f64, config: &EvalConfig) -> Option<f64> {
    try_derivative_of(def, point, config).ok()
}

/// Like [`derivative_of`], reporting why the derivative is unavailable.
pub fn try_derivative_of(def: &FunctionDef, point: f64, config: &EvalConfig) -> Result<f64, EvalError> {
    let config = config.for_function(def);
    match def.derivative.as_deref().map(str::trim) {
        Some(derivative) if !derivative.is_empty() => {
            Formula::parse(derivative)?.eval_at(point, &config)
        }
        _ => Formula::parse(&def.expr)?.derivative_at(point, &config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Variable;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_central_difference() {
        let f = |x: f64| Ok(x * x);
        assert_abs_diff_eq!(central_difference(f, 3.0, 1e-3).unwrap(), 6.0, epsilon = 1e-9);
        // negative steps are used by magnitude
        assert_abs_diff_eq!(central_difference(f, 3.0, -1e-3).unwrap(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_steps() {
        let f = |x: f64| Ok(x);
        assert!(matches!(central_difference(f, 1.0, 0.0), Err(EvalError::InvalidStep(_))));
        assert!(central_difference(f, 1.0, f64::NAN).is_err());
        assert!(second_difference(f, 1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_sin_derivative() {
        let config = EvalConfig::default().with_step(1e-5);
        let slope = numerical_derivative("sin(x)", PI / 6.0, &config).unwrap();
        assert_abs_diff_eq!(slope, (PI / 6.0).cos(), epsilon = 1e-4);
    }

    #[test]
    fn test_custom_independent_variable() {
        let config = EvalConfig::default().with_independent_var("u");
        let slope = numerical_derivative("u^3", 2.0, &config).unwrap();
        assert_abs_diff_eq!(slope, 12.0, epsilon = 1e-3);
    }

    #[test]
    fn test_fails_when_either_side_fails() {
        let config = EvalConfig::default();
        // sqrt is undefined left of zero
        assert!(numerical_derivative("sqrt(x)", 0.0, &config).is_none());
        assert!(numerical_derivative("1/(", 1.0, &config).is_none());
        assert!(numerical_derivative("x", 1.0, &config.with_step(0.0)).is_none());
    }

    #[test]
    fn test_derivative_through_composition() {
        let defs = [FunctionDef::new("1", "x^2")];
        let config = EvalConfig::default().with_functions(&defs);
        let slope = numerical_derivative("3f(x)", 2.0, &config).unwrap();
        assert_abs_diff_eq!(slope, 12.0, epsilon = 1e-6);
    }

    #[test]
    fn test_second_derivative() {
        let config = EvalConfig::default().with_step(1e-3);
        let curvature = second_derivative("sin(x)", PI / 2.0, &config).unwrap();
        assert_abs_diff_eq!(curvature, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_derivative_of_prefers_closed_form() {
        let vars = [Variable::new("a", 2.0)];
        let config = EvalConfig::default().with_variables(&vars);

        // a deliberately "wrong" closed form shows which path was taken
        let def = FunctionDef::new("1", "a*t^2")
            .with_independent_var("t")
            .with_derivative("100 + t");
        assert_eq!(derivative_of(&def, 3.0, &config), Some(103.0));

        let def = FunctionDef::new("1", "a*t^2")
            .with_independent_var("t")
            .with_derivative("  ");
        assert_abs_diff_eq!(derivative_of(&def, 3.0, &config).unwrap(), 12.0, epsilon = 1e-6);
    }

    #[test]
    fn test_derivative_of_excludes_itself() {
        let def = FunctionDef::new("1", "f(x) + x");
        let defs = [def.clone()];
        let config = EvalConfig::default().with_functions(&defs);
        assert!(derivative_of(&def, 1.0, &config).is_none());
    }
}
