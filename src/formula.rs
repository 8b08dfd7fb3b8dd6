//! Parsed expressions that can be evaluated and differentiated repeatedly.
//!
//! A [`Formula`] runs the text pipeline once, normalization, parsing and conversion
//! into an [`Expr`] tree, and keeps the result. Evaluating it at many points (for a
//! derivative, or to sample a curve) then only walks the tree.
//!
//! # Example
//!
//! ```
//! use plotexpr::{EvalConfig, Formula, Variable};
//!
//! let formula = Formula::parse("a*x^2 + 1").unwrap();
//! let vars = [Variable::new("a", 3.0)];
//! let config = EvalConfig::default().with_variables(&vars);
//!
//! assert_eq!(formula.eval_at(2.0, &config).unwrap(), 13.0);
//! let slope = formula.derivative_at(2.0, &config).unwrap();
//! assert!((slope - 12.0).abs() < 1e-6);
//! ```
//!
//! # Binding
//!
//! [`Formula::bind`] fixes a configuration and prepares the user functions the formula
//! calls, producing a [`BoundFormula`] that evaluates a point without any further
//! setup. The sampler shares one bound formula across threads.

use std::collections::BTreeSet;

use colored::Colorize;
use evalexpr::{build_operator_tree, Node};

use crate::compose::Composer;
use crate::config::EvalConfig;
use crate::context::{build_variable_context, EvaluationContext, VariableMap};
use crate::convert::{build_ast, MAX_NESTING_DEPTH};
use crate::derivative::{central_difference, second_difference};
use crate::errors::EvalError;
use crate::expr::Expr;
use crate::normalize::normalize;

/// An expression parsed into a tree, ready for evaluation.
#[derive(Clone)]
pub struct Formula {
    source: String,
    normalized: String,
    ast: Expr,
    calls: BTreeSet<String>,
}

impl std::fmt::Debug for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{{")?;
        writeln!(f, "    {}: {}", "Source".cyan(), self.source)?;
        writeln!(f, "    {}: {}", "Normalized".cyan(), self.normalized)?;
        writeln!(f, "    {}: {}", "Tree".cyan(), self.ast)?;
        writeln!(f, "    {}: {:?}", "Calls".cyan(), self.calls)?;
        writeln!(f, "}}")
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ast)
    }
}

impl Formula {
    /// Parses expression text.
    ///
    /// # Errors
    /// Returns `EvalError::Syntax` if the normalized text does not parse,
    /// `EvalError::UnsupportedOperator`/`UnsupportedValue` if it is not arithmetic and
    /// `EvalError::RecursionLimitExceeded` if it nests deeper than [`MAX_NESTING_DEPTH`].
    pub fn parse(source: &str) -> Result<Self, EvalError> {
        let normalized = normalize(source);
        check_nesting(&normalized)?;
        let node: Node = build_operator_tree(&normalized)?;
        let ast = build_ast(&node)?;
        let calls = ast.called_functions();
        Ok(Self {
            source: source.to_string(),
            normalized,
            ast,
            calls,
        })
    }

    /// The text the formula was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The source after normalization, as handed to the parser.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    /// Names of all functions the formula calls, library and user functions alike.
    pub fn calls(&self) -> &BTreeSet<String> {
        &self.calls
    }

    /// Binds the formula to a configuration, resolving calls to `config.functions`.
    pub fn bind<'a>(&'a self, config: &EvalConfig<'a>, variables: &'a VariableMap) -> BoundFormula<'a> {
        BoundFormula {
            ast: &self.ast,
            independent_var: config.independent_var,
            variables,
            composer: Composer::new(&self.calls, config, variables),
            step: config.step,
        }
    }

    /// Binds the formula without user functions; calls resolve to the library only.
    pub fn bind_simple<'a>(&'a self, independent_var: &'a str, variables: &'a VariableMap) -> BoundFormula<'a> {
        BoundFormula {
            ast: &self.ast,
            independent_var,
            variables,
            composer: Composer::empty(variables),
            step: crate::config::DEFAULT_STEP,
        }
    }

    /// Evaluates the formula at `point`, resolving calls to user functions.
    pub fn eval_at(&self, point: f64, config: &EvalConfig) -> Result<f64, EvalError> {
        let variables = build_variable_context(config.variables);
        self.bind(config, &variables).value(point)
    }

    /// Evaluates the formula at `point` against the library and variables only.
    pub fn eval_simple_at(&self, point: f64, config: &EvalConfig) -> Result<f64, EvalError> {
        let variables = build_variable_context(config.variables);
        self.bind_simple(config.independent_var, &variables)
            .value(point)
    }

    /// Central-difference derivative at `point` with half-width `config.step`.
    pub fn derivative_at(&self, point: f64, config: &EvalConfig) -> Result<f64, EvalError> {
        let variables = build_variable_context(config.variables);
        self.bind(config, &variables).derivative(point)
    }

    /// Central-difference second derivative at `point` with half-width `config.step`.
    pub fn second_derivative_at(&self, point: f64, config: &EvalConfig) -> Result<f64, EvalError> {
        let variables = build_variable_context(config.variables);
        self.bind(config, &variables).second_derivative(point)
    }
}

/// A formula bound to one configuration, see [`Formula::bind`].
pub struct BoundFormula<'a> {
    ast: &'a Expr,
    independent_var: &'a str,
    variables: &'a VariableMap,
    composer: Composer<'a>,
    step: f64,
}

impl BoundFormula<'_> {
    /// Value at `point`; fails unless the result is finite.
    pub fn value(&self, point: f64) -> Result<f64, EvalError> {
        let context = EvaluationContext::new(self.variables, self.independent_var, point);
        let value = if self.composer.is_empty() {
            self.ast.eval(&context)?
        } else {
            self.ast.eval(&self.composer.scope(context))?
        };
        finite(value)
    }

    pub fn derivative(&self, point: f64) -> Result<f64, EvalError> {
        central_difference(|p| self.value(p), point, self.step)
    }

    pub fn second_derivative(&self, point: f64) -> Result<f64, EvalError> {
        second_difference(|p| self.value(p), point, self.step)
    }
}

pub(crate) fn finite(value: f64) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite(value))
    }
}

/// Rejects text whose parentheses nest deeper than the evaluator allows, before the
/// parser sees it.
fn check_nesting(text: &str) -> Result<(), EvalError> {
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' => {
                depth += 1;
                if depth > MAX_NESTING_DEPTH {
                    return Err(EvalError::RecursionLimitExceeded(MAX_NESTING_DEPTH));
                }
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}
