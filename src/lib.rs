//! Evaluation and numerical differentiation of user-authored math expressions.
//!
//! This crate evaluates expressions such as `a*sin(b*x) + c` against a single independent
//! variable, a set of named scalar variables and a fixed library of math functions and
//! constants. Expressions may call other user-defined functions by name, and can be
//! differentiated numerically. It builds on the [evalexpr](https://github.com/ISibboI/evalexpr)
//! crate for parsing and evaluates its own expression tree in `f64` arithmetic.
//!
//! # Features
//!
//! - Shorthand notation: `3x`, `2(x+1)`, `(x+1)(x-1)`, `pi`, `e`
//! - Named variables and a custom independent variable name
//! - Function composition: `g(x) = f(x)^2` where `f` is another user function
//! - Central-difference first and second derivatives
//! - Parallel sampling of curves over a range
//!
//! Every public operation either returns a finite number or `None`; the `try_*` variants
//! report the reason as an [`EvalError`].
//!
//! # Example
//!
//! ```rust
//! use plotexpr::{evaluate, numerical_derivative, EvalConfig, FunctionDef, Variable};
//!
//! let vars = [Variable::new("a", 2.0), Variable::new("b", 0.5), Variable::new("c", 1.0)];
//! let funcs = [FunctionDef::new(1u64, "a*sin(b*x) + c")];
//! let config = EvalConfig::default().with_variables(&vars).with_functions(&funcs);
//!
//! // Evaluate g(x) = f(x)^2 at x = 2
//! let value = evaluate("f(x)^2", 2.0, &config).unwrap();
//! assert!((value - (2.0 * 1.0_f64.sin() + 1.0).powi(2)).abs() < 1e-12);
//!
//! // d/dx (3x^2) at x = 1
//! let slope = numerical_derivative("3x^2", 1.0, &config).unwrap();
//! assert!((slope - 6.0).abs() < 1e-6);
//!
//! // Unevaluable points are None
//! assert_eq!(evaluate("1/(", 0.0, &config), None);
//! ```

pub use config::{EvalConfig, DEFAULT_STEP};
pub use context::build_variable_context;
pub use convert::{MAX_CHAIN_LENGTH, MAX_NESTING_DEPTH};
pub use derivative::{
    derivative_of, numerical_derivative, second_derivative, try_derivative_of,
    try_numerical_derivative,
};
pub use errors::EvalError;
pub use evaluator::{evaluate, evaluate_simple, try_evaluate, try_evaluate_simple};
pub use formula::Formula;
pub use sample::{
    sample, sample_derivative, sample_formula, sample_formula_derivative, Sample,
};
pub use types::{FunctionDef, FunctionId, Variable};

pub mod prelude {
    pub use crate::config::EvalConfig;
    pub use crate::convert::build_ast;
    pub use crate::evaluator::{evaluate, evaluate_simple};
    pub use crate::expr::Expr;
    pub use crate::formula::Formula;
    pub use crate::normalize::normalize;
    pub use crate::types::{FunctionDef, Variable};
}

/// Resolution of calls to other user functions
pub mod compose;
/// Per-call evaluation settings
pub mod config;
/// Variable tables and name resolution
pub mod context;
/// Conversion from parsed expressions to internal AST
pub mod convert;
/// Central-difference differentiation
pub mod derivative;
/// Error types for the various failure modes
pub mod errors;
/// One-shot evaluation entry points
pub mod evaluator;
/// Expression tree representation and evaluation
pub mod expr;
/// Parsed, reusable expressions
pub mod formula;
/// Library of constants and functions
pub mod library;
/// Rewriting of shorthand notation
pub mod normalize;
/// Parallel sampling over a range
pub mod sample;
/// Caller-owned variable and function definitions
pub mod types;
