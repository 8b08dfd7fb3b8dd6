//! Expression tree representation and direct evaluation.
//!
//! [`Expr`] is the crate's own operator-precedence tree, built from the evalexpr parse
//! tree by [`crate::convert::build_ast`]. It is evaluated by walking the tree against a
//! [`Scope`], which resolves identifiers and calls:
//!
//! - Leaf nodes: constants and named references
//! - Unary operations: negation
//! - Binary operations: `+`, `-`, `*`, `/`, `%`, `^`
//! - Calls: library functions and user functions, resolved by name at evaluation time
//!
//! Arithmetic follows IEEE 754 semantics throughout. Intermediate infinities and NaNs
//! are not errors on their own; only the final result is checked for finiteness (see
//! [`crate::formula::Formula`]).

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::context::Scope;
use crate::errors::EvalError;

/// An expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal
    Const(f64),
    /// A reference to a variable, the independent variable or a library constant
    Var(String),
    /// Addition of two expressions
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction of two expressions
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication of two expressions
    Mul(Box<Expr>, Box<Expr>),
    /// Division of two expressions
    Div(Box<Expr>, Box<Expr>),
    /// Floating point remainder of two expressions
    Rem(Box<Expr>, Box<Expr>),
    /// Exponentiation of an expression by another expression
    Pow(Box<Expr>, Box<Expr>),
    /// Negation of an expression
    Neg(Box<Expr>),
    /// Call of a library or user function
    Call { name: String, args: Vec<Expr> },
}

impl Expr {
    /// Evaluates the expression tree.
    ///
    /// Operands are evaluated left to right. Arguments of a call are evaluated before the
    /// call is resolved, so a failing argument fails the call regardless of the callee.
    pub fn eval(&self, scope: &dyn Scope) -> Result<f64, EvalError> {
        // Left operands of `+ - * / %` are followed in a loop; a flat chain of any
        // length uses one stack frame
        let mut pending = Vec::new();
        let mut node = self;
        let mut value = loop {
            match node {
                Expr::Const(val) => break *val,
                Expr::Var(name) => break scope.value(name)?,
                Expr::Add(left, right) => {
                    pending.push((Link::Add, right));
                    node = left;
                }
                Expr::Sub(left, right) => {
                    pending.push((Link::Sub, right));
                    node = left;
                }
                Expr::Mul(left, right) => {
                    pending.push((Link::Mul, right));
                    node = left;
                }
                Expr::Div(left, right) => {
                    pending.push((Link::Div, right));
                    node = left;
                }
                Expr::Rem(left, right) => {
                    pending.push((Link::Rem, right));
                    node = left;
                }
                Expr::Pow(base, exponent) => break base.eval(scope)?.powf(exponent.eval(scope)?),
                Expr::Neg(expr) => break -expr.eval(scope)?,
                Expr::Call { name, args } => {
                    let values = args
                        .iter()
                        .map(|arg| arg.eval(scope))
                        .collect::<Result<Vec<f64>, EvalError>>()?;
                    break scope.call(name, &values)?;
                }
            }
        };
        for (link, right) in pending.into_iter().rev() {
            value = link.apply(value, right.eval(scope)?);
        }
        Ok(value)
    }

    /// Returns the names of all functions called anywhere in the tree.
    pub fn called_functions(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                Expr::Const(_) | Expr::Var(_) => {}
                Expr::Add(left, right)
                | Expr::Sub(left, right)
                | Expr::Mul(left, right)
                | Expr::Div(left, right)
                | Expr::Rem(left, right)
                | Expr::Pow(left, right) => {
                    stack.push(left);
                    stack.push(right);
                }
                Expr::Neg(expr) => stack.push(expr),
                Expr::Call { name, args } => {
                    names.insert(name.clone());
                    stack.extend(args);
                }
            }
        }
        names
    }
}

/// A left-associative operator waiting for its right operand.
#[derive(Clone, Copy)]
enum Link {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Link {
    fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Link::Add => left + right,
            Link::Sub => left - right,
            Link::Mul => left * right,
            Link::Div => left / right,
            Link::Rem => left % right,
        }
    }
}

/// Formats the tree with every binary operation parenthesized, so the output parses
/// back into the same tree.
impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Const(val) => write!(f, "{val}"),
            Expr::Var(name) => write!(f, "{name}"),
            Expr::Add(left, right) => write!(f, "({left} + {right})"),
            Expr::Sub(left, right) => write!(f, "({left} - {right})"),
            Expr::Mul(left, right) => write!(f, "({left} * {right})"),
            Expr::Div(left, right) => write!(f, "({left} / {right})"),
            Expr::Rem(left, right) => write!(f, "({left} % {right})"),
            Expr::Pow(base, exponent) => write!(f, "({base}^{exponent})"),
            Expr::Neg(expr) => write!(f, "-({expr})"),
            Expr::Call { name, args } => write!(f, "{name}({})", args.iter().join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{build_variable_context, EvaluationContext};
    use crate::types::Variable;
    use approx::assert_abs_diff_eq;

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Var(name.to_string()))
    }

    fn num(val: f64) -> Box<Expr> {
        Box::new(Expr::Const(val))
    }

    fn call(name: &str, args: Vec<Expr>) -> Box<Expr> {
        Box::new(Expr::Call {
            name: name.to_string(),
            args,
        })
    }

    #[test]
    fn test_eval_arithmetic() {
        let vars = build_variable_context(&[Variable::new("a", 3.0)]);
        let ctx = EvaluationContext::new(&vars, "x", 2.0);

        // a*x^2 - 1
        let expr = Expr::Sub(
            Box::new(Expr::Mul(var("a"), Box::new(Expr::Pow(var("x"), num(2.0))))),
            num(1.0),
        );
        assert_eq!(expr.eval(&ctx).unwrap(), 11.0);

        // -(x % a) / 4
        let expr = Expr::Div(
            Box::new(Expr::Neg(Box::new(Expr::Rem(var("x"), var("a"))))),
            num(4.0),
        );
        assert_eq!(expr.eval(&ctx).unwrap(), -0.5);
    }

    #[test]
    fn test_eval_calls() {
        let vars = build_variable_context(&[]);
        let ctx = EvaluationContext::new(&vars, "x", 0.25);

        // sin(PI * x) + max(x, 1)
        let expr = Expr::Add(
            call(
                "sin",
                vec![Expr::Mul(var("PI"), var("x"))],
            ),
            call("max", vec![Expr::Var("x".to_string()), Expr::Const(1.0)]),
        );
        assert_abs_diff_eq!(
            expr.eval(&ctx).unwrap(),
            (std::f64::consts::PI / 4.0).sin() + 1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_eval_failures() {
        let vars = build_variable_context(&[]);
        let ctx = EvaluationContext::new(&vars, "x", 1.0);

        assert!(matches!(
            Expr::Add(var("x"), var("y")).eval(&ctx),
            Err(EvalError::UnboundName(name)) if name == "y"
        ));
        assert!(matches!(
            call("nope", vec![Expr::Const(1.0)]).eval(&ctx),
            Err(EvalError::UnknownFunction(_))
        ));
        assert!(matches!(
            call("sqrt", vec![]).eval(&ctx),
            Err(EvalError::Arity { .. })
        ));
    }

    #[test]
    fn test_eval_long_chain() {
        let vars = build_variable_context(&[]);
        let ctx = EvaluationContext::new(&vars, "x", 1.5);

        // x - 1 + x - 1 + ... evaluated left to right
        let expr = (0..2000).fold(Expr::Var("x".to_string()), |acc, i| {
            if i % 2 == 0 {
                Expr::Sub(Box::new(acc), num(1.0))
            } else {
                Expr::Add(Box::new(acc), var("x"))
            }
        });
        assert_abs_diff_eq!(expr.eval(&ctx).unwrap(), 501.5, epsilon = 1e-9);
        assert!(expr.called_functions().is_empty());
    }

    #[test]
    fn test_division_by_zero_is_infinite() {
        let vars = build_variable_context(&[]);
        let ctx = EvaluationContext::new(&vars, "x", 0.0);
        let value = Expr::Div(num(1.0), var("x")).eval(&ctx).unwrap();
        assert!(value.is_infinite());
    }

    #[test]
    fn test_called_functions() {
        // f(sin(a*x)) + g(x)
        let expr = Expr::Add(
            call(
                "f",
                vec![*call("sin", vec![Expr::Mul(var("a"), var("x"))])],
            ),
            call("g", vec![Expr::Var("x".to_string())]),
        );
        let calls: Vec<String> = expr.called_functions().into_iter().collect();
        assert_eq!(calls, vec!["f", "g", "sin"]);
    }

    #[test]
    fn test_display() {
        let expr = Expr::Add(
            Box::new(Expr::Mul(num(2.0), var("x"))),
            Box::new(Expr::Neg(call(
                "pow",
                vec![Expr::Var("x".to_string()), Expr::Const(0.5)],
            ))),
        );
        assert_eq!(expr.to_string(), "((2 * x) + -(pow(x, 0.5)))");
        assert_eq!(
            Expr::Pow(var("x"), num(3.0)).to_string(),
            "(x^3)"
        );
    }
}
