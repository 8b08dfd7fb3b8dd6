//! Error types for the plotexpr crate.
//!
//! Every failure of the evaluation pipeline is described by [`EvalError`]. The public
//! `Option`-returning operations fold all of these into `None`; the `try_*` variants
//! hand them to the caller for diagnostics.
//!
//! The failure modes group into:
//!
//! - Parsing: the text is not a well-formed expression (`Syntax`), or it parses into
//!   something that is not arithmetic (`UnsupportedOperator`, `UnsupportedValue`)
//! - Name resolution: `UnboundName`, `UnknownFunction`, `InvalidFunction`, `NotAFunction`,
//!   `Arity`
//! - Numerics: `NonFinite`, `InvalidStep`
//! - Resource limits: `RecursionLimitExceeded`, `ChainTooLong`

use evalexpr::{DefaultNumericTypes, EvalexprError};
use thiserror::Error;

/// Errors that can occur while parsing or evaluating an expression.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Error when the normalized text cannot be parsed by evalexpr
    #[error("Failed to parse expression: {0}")]
    Syntax(#[from] EvalexprError<DefaultNumericTypes>),
    /// Error when the operator tree contains a non-arithmetic operator
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
    /// Error when a literal is not numeric (strings, booleans, tuples, empty groups)
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),
    /// Error when an identifier is neither a variable, the independent variable nor a constant
    #[error("Unbound name: {0}")]
    UnboundName(String),
    /// Error when a called name is neither a user function nor a library function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),
    /// Error when a referenced user function has a body that does not parse
    #[error("Function {name} cannot be evaluated: {reason}")]
    InvalidFunction { name: String, reason: String },
    /// Error when a name bound to a number is used as a function
    #[error("Not a function: {0}")]
    NotAFunction(String),
    /// Error when a function is called with the wrong number of arguments
    #[error("Function {name} expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },
    /// Error when the result of an evaluation is NaN or infinite
    #[error("Result is not finite: {0}")]
    NonFinite(f64),
    /// Error when the expression nests deeper than the evaluator allows
    #[error("Expression nesting exceeds the limit of {0}")]
    RecursionLimitExceeded(usize),
    /// Error when a run of `+ - * / %` holds more operators than the evaluator allows
    #[error("Expression chains more than {0} operators")]
    ChainTooLong(usize),
    /// Error when a finite-difference step is zero or not finite
    #[error("Invalid finite difference step: {0}")]
    InvalidStep(f64),
}
