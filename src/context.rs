//! Name resolution for expression evaluation.
//!
//! [`build_variable_context`] turns the caller's variable list into a lookup table, and
//! [`EvaluationContext`] layers that table over the library and the independent variable
//! binding. Lookups are shadowed in the order
//! `library < variables < independent variable`.
//!
//! The [`Scope`] trait is the seam the expression tree evaluates against. The plain
//! context resolves calls through the library only; the composition resolver wraps it
//! to add calls to user functions.

use std::collections::HashMap;
use std::str::FromStr;

use crate::errors::EvalError;
use crate::library::{self, Builtin};
use crate::types::Variable;

/// Name → value table built from a variable list.
pub type VariableMap = HashMap<String, f64>;

/// Resolves names and calls while an expression tree is evaluated.
pub trait Scope {
    /// Returns the value bound to `name`.
    fn value(&self, name: &str) -> Result<f64, EvalError>;

    /// Calls the function `name` with already evaluated arguments.
    fn call(&self, name: &str, args: &[f64]) -> Result<f64, EvalError>;
}

/// Builds the name → value mapping for a variable list.
///
/// Entries with an empty name or a non-finite value are skipped. When a name occurs more
/// than once, the last entry wins.
///
/// # Example
/// ```
/// use plotexpr::{build_variable_context, Variable};
///
/// let vars = build_variable_context(&[
///     Variable::new("a", 2.0),
///     Variable::new("b", f64::NAN),
///     Variable::new("a", 3.0),
/// ]);
/// assert_eq!(vars.get("a"), Some(&3.0));
/// assert!(!vars.contains_key("b"));
/// ```
pub fn build_variable_context(variables: &[Variable]) -> VariableMap {
    variables
        .iter()
        .filter(|var| !var.name.is_empty() && var.value.is_finite())
        .map(|var| (var.name.clone(), var.value))
        .collect()
}

/// Merged lookup of library constants, variables and the independent variable.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    variables: &'a VariableMap,
    independent_var: &'a str,
    point: f64,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(variables: &'a VariableMap, independent_var: &'a str, point: f64) -> Self {
        Self {
            variables,
            independent_var,
            point,
        }
    }

    /// Returns true if `name` is bound to a number by the caller (not the library).
    pub fn binds(&self, name: &str) -> bool {
        name == self.independent_var || self.variables.contains_key(name)
    }
}

impl Scope for EvaluationContext<'_> {
    fn value(&self, name: &str) -> Result<f64, EvalError> {
        if name == self.independent_var {
            return Ok(self.point);
        }
        self.variables
            .get(name)
            .copied()
            .or_else(|| library::constant(name))
            .ok_or_else(|| EvalError::UnboundName(name.to_string()))
    }

    fn call(&self, name: &str, args: &[f64]) -> Result<f64, EvalError> {
        if self.binds(name) {
            return Err(EvalError::NotAFunction(name.to_string()));
        }
        Builtin::from_str(name)
            .map_err(|_| EvalError::UnknownFunction(name.to_string()))?
            .apply(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_variable_context_skips_malformed() {
        let vars = build_variable_context(&[
            Variable::new("a", 1.0),
            Variable::new("", 2.0),
            Variable::new("b", f64::INFINITY),
            Variable::new("c", f64::NAN),
            Variable::new("d", -4.5),
        ]);
        assert_eq!(vars.len(), 2);
        assert_eq!(vars["a"], 1.0);
        assert_eq!(vars["d"], -4.5);
    }

    #[test]
    fn test_build_variable_context_empty() {
        assert!(build_variable_context(&[]).is_empty());
    }

    #[test]
    fn test_shadowing_order() {
        let vars = build_variable_context(&[Variable::new("PI", 3.0), Variable::new("x", 10.0)]);
        let ctx = EvaluationContext::new(&vars, "x", 2.0);

        // variables shadow library constants
        assert_eq!(ctx.value("PI").unwrap(), 3.0);
        // the independent variable shadows variables
        assert_eq!(ctx.value("x").unwrap(), 2.0);
        assert_eq!(ctx.value("E").unwrap(), std::f64::consts::E);
        assert!(matches!(ctx.value("y"), Err(EvalError::UnboundName(_))));
    }

    #[test]
    fn test_calls() {
        let vars = build_variable_context(&[Variable::new("sin", 1.0)]);
        let ctx = EvaluationContext::new(&vars, "t", 0.5);

        assert_eq!(ctx.call("sqrt", &[9.0]).unwrap(), 3.0);
        assert!(matches!(ctx.call("sin", &[0.0]), Err(EvalError::NotAFunction(_))));
        assert!(matches!(ctx.call("t", &[0.0]), Err(EvalError::NotAFunction(_))));
        assert!(matches!(ctx.call("g", &[0.0]), Err(EvalError::UnknownFunction(_))));
    }
}
