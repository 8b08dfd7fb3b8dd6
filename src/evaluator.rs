//! One-shot evaluation entry points.
//!
//! These functions parse the expression, evaluate it once and fold every failure into
//! `None`. A `None` means "unevaluable at this point": the text does not parse, a name is
//! unbound, a call cannot be resolved, or the result is NaN or infinite. The `try_*`
//! variants return the underlying [`EvalError`] instead.
//!
//! To evaluate the same expression at many points, parse it once with
//! [`Formula::parse`] instead.

use crate::config::EvalConfig;
use crate::errors::EvalError;
use crate::formula::Formula;

/// Evaluates `expr` at `point` against the library and `config.variables`.
///
/// `config.functions` is not consulted; use [`evaluate`] for expressions that call
/// other user functions.
///
/// # Example
/// ```
/// use plotexpr::{evaluate_simple, EvalConfig, Variable};
///
/// let vars = [Variable::new("a", 2.0)];
/// let config = EvalConfig::default().with_variables(&vars);
/// assert_eq!(evaluate_simple("3a x", 1.0, &config), None);
/// assert_eq!(evaluate_simple("3a*x", 1.0, &config), Some(6.0));
/// ```
pub fn evaluate_simple(expr: &str, point: f64, config: &EvalConfig) -> Option<f64> {
    try_evaluate_simple(expr, point, config).ok()
}

/// Like [`evaluate_simple`], reporting why the expression is unevaluable.
pub fn try_evaluate_simple(expr: &str, point: f64, config: &EvalConfig) -> Result<f64, EvalError> {
    Formula::parse(expr)?.eval_simple_at(point, config)
}

/// Evaluates `expr` at `point`, resolving calls to the visible functions in
/// `config.functions` other than `config.current_function`.
///
/// # Example
/// ```
/// use plotexpr::{evaluate, EvalConfig, FunctionDef};
///
/// let defs = [
///     FunctionDef::new(1u64, "x^2"),
///     FunctionDef::new(2u64, "f(t) + 1").with_dependent_var("g").with_independent_var("t"),
/// ];
/// let config = EvalConfig::default().with_functions(&defs);
/// assert_eq!(evaluate("f(3) - 1", 0.0, &config), Some(8.0));
/// assert_eq!(evaluate("f((x+1)*2)", 0.5, &config), Some(9.0));
/// ```
pub fn evaluate(expr: &str, point: f64, config: &EvalConfig) -> Option<f64> {
    try_evaluate(expr, point, config).ok()
}

/// Like [`evaluate`], reporting why the expression is unevaluable.
pub fn try_evaluate(expr: &str, point: f64, config: &EvalConfig) -> Result<f64, EvalError> {
    Formula::parse(expr)?.eval_at(point, config)
}
