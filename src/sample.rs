//! Evaluation of an expression over a grid of points, for plotting.
//!
//! A curve is drawn from many evaluations of the same expression. The sampler parses the
//! expression once, binds it to the configuration once (parsing the user functions it
//! calls), and evaluates the points in parallel on the rayon pool. Points where the
//! expression is unevaluable come back as `y: None`, so a plotter can break the curve
//! there instead of dropping the whole series.

use rayon::prelude::*;

use crate::config::EvalConfig;
use crate::context::build_variable_context;
use crate::errors::EvalError;
use crate::formula::{BoundFormula, Formula};

/// One evaluated point of a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: Option<f64>,
}

/// `count` evenly spaced points from `start` to `end`, both included.
///
/// A single point is placed at `start`.
pub fn grid(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Samples the value of `expr` at `count` points from `start` to `end`.
///
/// # Errors
/// Returns the parse error if `expr` does not parse. Failures at individual points are
/// reported as `y: None`.
///
/// # Example
/// ```
/// use plotexpr::{sample, EvalConfig};
///
/// let points = sample("1/x", -1.0, 1.0, 3, &EvalConfig::default()).unwrap();
/// let ys: Vec<_> = points.iter().map(|p| p.y).collect();
/// assert_eq!(ys, vec![Some(-1.0), None, Some(1.0)]);
/// ```
pub fn sample(
    expr: &str,
    start: f64,
    end: f64,
    count: usize,
    config: &EvalConfig,
) -> Result<Vec<Sample>, EvalError> {
    Ok(sample_formula(&Formula::parse(expr)?, start, end, count, config))
}

/// Samples the numerical derivative of `expr` at `count` points from `start` to `end`.
pub fn sample_derivative(
    expr: &str,
    start: f64,
    end: f64,
    count: usize,
    config: &EvalConfig,
) -> Result<Vec<Sample>, EvalError> {
    Ok(sample_formula_derivative(
        &Formula::parse(expr)?,
        start,
        end,
        count,
        config,
    ))
}

/// Like [`sample`], for an already parsed formula.
pub fn sample_formula(
    formula: &Formula,
    start: f64,
    end: f64,
    count: usize,
    config: &EvalConfig,
) -> Vec<Sample> {
    let variables = build_variable_context(config.variables);
    let bound = formula.bind(config, &variables);
    sample_bound(&bound, &grid(start, end, count))
}

/// Like [`sample_derivative`], for an already parsed formula.
pub fn sample_formula_derivative(
    formula: &Formula,
    start: f64,
    end: f64,
    count: usize,
    config: &EvalConfig,
) -> Vec<Sample> {
    let variables = build_variable_context(config.variables);
    let bound = formula.bind(config, &variables);
    sample_with(&grid(start, end, count), |x| bound.derivative(x))
}

/// Samples an already bound formula at the given points.
pub fn sample_bound(bound: &BoundFormula, xs: &[f64]) -> Vec<Sample> {
    sample_with(xs, |x| bound.value(x))
}

fn sample_with<F>(xs: &[f64], f: F) -> Vec<Sample>
where
    F: Fn(f64) -> Result<f64, EvalError> + Sync + Send,
{
    xs.par_iter()
        .map(|&x| Sample { x, y: f(x).ok() })
        .collect()
}
