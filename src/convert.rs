//! Conversion module for transforming evalexpr AST nodes into our internal expression representation.
//!
//! evalexpr is used purely as a parser: its operator tree is walked once and rebuilt as an
//! [`Expr`], which is then evaluated in `f64` arithmetic. Integer literals become floats,
//! so `1/2` is `0.5` rather than evalexpr's integer division.
//!
//! Only arithmetic survives the conversion. Boolean, string, assignment and chaining
//! operators are rejected. A function name must be followed by a parenthesized argument
//! list; `sin x` is not a call.
//!
//! Two shapes of the evalexpr tree are adjusted on the way:
//!
//! - evalexpr nests `^` to the left. The converter regroups `a^b^c` as `a^(b^c)` and
//!   `a^-b^c` as `a^(-(b^c))`; a parenthesized base such as `(a^b)^c` keeps its grouping.
//! - Runs of `+ - * / %` are nested to the left and walked iteratively, so a long flat
//!   sum does not count as nesting. Such a run may hold at most [`MAX_CHAIN_LENGTH`]
//!   operators; everything else nests at most [`MAX_NESTING_DEPTH`] levels.

use evalexpr::{Node, Operator, Value};

use crate::errors::EvalError;
use crate::expr::Expr;

/// Deepest operator nesting accepted by the evaluator.
///
/// Evaluation recurses once per nesting level, so this also bounds the evaluation stack.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Longest run of left-associative operators (`a + b - c * d ...`) accepted in one place.
pub const MAX_CHAIN_LENGTH: usize = 2048;

/// Converts an evalexpr AST node into our internal expression representation.
///
/// # Arguments
/// * `node` - The evalexpr AST node to convert
///
/// # Returns
/// * `Result<Expr, EvalError>` - The converted expression or an error if conversion fails
///
/// # Examples of supported operations:
/// * Arithmetic: +, -, *, /, %, ^ and unary minus
/// * Identifiers: x, a, PI, ...
/// * Constants: integer and floating point literals
/// * Function calls: sin(x), max(a, b), f(x)
pub fn build_ast(node: &Node) -> Result<Expr, EvalError> {
    build_at_depth(node, 0)
}

fn build_at_depth(node: &Node, depth: usize) -> Result<Expr, EvalError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(EvalError::RecursionLimitExceeded(MAX_NESTING_DEPTH));
    }
    let build = |child: &Node| build_at_depth(child, depth + 1);
    let children = node.children();

    match node.operator() {
        Operator::Add | Operator::Sub | Operator::Mul | Operator::Div | Operator::Mod => {
            chain(node, depth)
        }
        Operator::Exp => power(node, depth),
        Operator::Neg => match children {
            [child] => Ok(Expr::Neg(Box::new(build(child)?))),
            _ => Err(operand_count(node, 1)),
        },
        Operator::Const { value } => match value {
            Value::Float(f) => Ok(Expr::Const(*f)),
            Value::Int(i) => Ok(Expr::Const(*i as f64)),
            _ => Err(EvalError::UnsupportedValue(format!("{value:?}"))),
        },
        Operator::VariableIdentifierRead { identifier } => Ok(Expr::Var(identifier.to_string())),
        Operator::FunctionIdentifier { identifier } => match children {
            // `f(x)` wraps its argument in a group, `f x` does not
            [argument] if matches!(argument.operator(), Operator::RootNode) => {
                let args = call_arguments(argument)
                    .into_iter()
                    .map(build)
                    .collect::<Result<Vec<Expr>, EvalError>>()?;
                Ok(Expr::Call {
                    name: identifier.to_string(),
                    args,
                })
            }
            _ => Err(EvalError::UnsupportedOperator(format!(
                "{identifier} must be followed by a parenthesized argument list"
            ))),
        },
        // Root node (the whole expression or a parenthesized group) - must have exactly one child
        Operator::RootNode => match children {
            [child] => build(child),
            [] => Err(EvalError::UnsupportedValue("empty expression".to_string())),
            _ => Err(EvalError::UnsupportedOperator(format!(
                "root node with {} children",
                children.len()
            ))),
        },
        other => Err(EvalError::UnsupportedOperator(format!("{other:?}"))),
    }
}

/// Builds a left-nested run of `+ - * / %` without recursing down its left spine.
fn chain(node: &Node, depth: usize) -> Result<Expr, EvalError> {
    let mut pending = Vec::new();
    let mut current = node;
    while let Some(combine) = left_associative(current.operator()) {
        // Incomplete input such as `x +` leaves an operator with a single child
        let [left, right] = current.children() else {
            return Err(operand_count(current, 2));
        };
        if pending.len() == MAX_CHAIN_LENGTH {
            return Err(EvalError::ChainTooLong(MAX_CHAIN_LENGTH));
        }
        pending.push((combine, right));
        current = left;
    }

    let mut expr = build_at_depth(current, depth + 1)?;
    for (combine, right) in pending.into_iter().rev() {
        expr = combine(Box::new(expr), Box::new(build_at_depth(right, depth + 1)?));
    }
    Ok(expr)
}

type Combine = fn(Box<Expr>, Box<Expr>) -> Expr;

fn left_associative(operator: &Operator) -> Option<Combine> {
    match operator {
        Operator::Add => Some(Expr::Add as Combine),
        Operator::Sub => Some(Expr::Sub as Combine),
        Operator::Mul => Some(Expr::Mul as Combine),
        Operator::Div => Some(Expr::Div as Combine),
        Operator::Mod => Some(Expr::Rem as Combine),
        _ => None,
    }
}

/// Builds `a^b^c` as `a^(b^c)` from evalexpr's `(a^b)^c`.
fn power(node: &Node, depth: usize) -> Result<Expr, EvalError> {
    let [left, right] = node.children() else {
        return Err(operand_count(node, 2));
    };
    let mut exponent = build_at_depth(right, depth + 1)?;
    let mut base = left;
    let mut levels = depth + 1;
    while let (Operator::Exp, [left, right]) = (base.operator(), base.children()) {
        levels += 1;
        if levels > MAX_NESTING_DEPTH {
            return Err(EvalError::RecursionLimitExceeded(MAX_NESTING_DEPTH));
        }
        exponent = raise(right, exponent, levels)?;
        base = left;
    }
    raise(base, exponent, levels)
}

/// `operand ^ exponent`, where a bare negation in front of the operand covers the whole
/// power: evalexpr reads `a^-b^c` as `(a^(-b))^c`, which becomes `a^(-(b^c))`.
fn raise(operand: &Node, exponent: Expr, depth: usize) -> Result<Expr, EvalError> {
    let mut negations = 0;
    let mut core = operand;
    while let (Operator::Neg, [inner]) = (core.operator(), core.children()) {
        negations += 1;
        core = inner;
    }
    if depth + negations > MAX_NESTING_DEPTH {
        return Err(EvalError::RecursionLimitExceeded(MAX_NESTING_DEPTH));
    }
    let mut expr = Expr::Pow(Box::new(build_at_depth(core, depth)?), Box::new(exponent));
    for _ in 0..negations {
        expr = Expr::Neg(Box::new(expr));
    }
    Ok(expr)
}

/// Splits the argument node of a call into individual arguments.
///
/// `f(x)` carries a parenthesized group around `x`, `max(a, b)` a group around a tuple,
/// and `f()` an empty group.
fn call_arguments(argument: &Node) -> Vec<&Node> {
    let mut node = argument;
    while let (Operator::RootNode, [inner]) = (node.operator(), node.children()) {
        node = inner;
    }
    match node.operator() {
        Operator::Tuple => node.children().iter().collect(),
        Operator::RootNode if node.children().is_empty() => Vec::new(),
        _ => vec![node],
    }
}

fn operand_count(node: &Node, expected: usize) -> EvalError {
    EvalError::UnsupportedOperator(format!(
        "{:?} expects {expected} operand(s), got {}",
        node.operator(),
        node.children().len()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalexpr::build_operator_tree;

    fn parse(text: &str) -> Result<Expr, EvalError> {
        let node = build_operator_tree(text)?;
        build_ast(&node)
    }

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Var(name.to_string()))
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(
            parse("2*x + 1").unwrap(),
            Expr::Add(
                Box::new(Expr::Mul(Box::new(Expr::Const(2.0)), var("x"))),
                Box::new(Expr::Const(1.0)),
            )
        );
        assert_eq!(
            parse("x^0.5").unwrap(),
            Expr::Pow(var("x"), Box::new(Expr::Const(0.5)))
        );
        assert_eq!(parse("-x").unwrap(), Expr::Neg(var("x")));
    }

    #[test]
    fn test_integer_literals_become_floats() {
        assert_eq!(
            parse("1/2").unwrap(),
            Expr::Div(Box::new(Expr::Const(1.0)), Box::new(Expr::Const(2.0)))
        );
    }

    #[test]
    fn test_calls() {
        assert_eq!(
            parse("sin(x)").unwrap(),
            Expr::Call {
                name: "sin".to_string(),
                args: vec![Expr::Var("x".to_string())],
            }
        );
        assert_eq!(
            parse("max(a, (b))").unwrap(),
            Expr::Call {
                name: "max".to_string(),
                args: vec![Expr::Var("a".to_string()), Expr::Var("b".to_string())],
            }
        );
        assert_eq!(
            parse("f((x+1)*2)").unwrap().called_functions().len(),
            1
        );
    }

    #[test]
    fn test_rejects_non_arithmetic() {
        assert!(matches!(parse("x == 1"), Err(EvalError::UnsupportedOperator(_))));
        assert!(matches!(parse("true"), Err(EvalError::UnsupportedValue(_))));
        assert!(matches!(parse("\"text\""), Err(EvalError::UnsupportedValue(_))));
        assert!(matches!(parse("a = 2"), Err(EvalError::UnsupportedOperator(_))));
        assert!(parse("").is_err());
        assert!(parse("x +").is_err());
        assert!(parse("-").is_err());
    }

    #[test]
    fn test_power_is_right_associative() {
        let expected = Expr::Pow(
            Box::new(Expr::Const(2.0)),
            Box::new(Expr::Pow(Box::new(Expr::Const(3.0)), Box::new(Expr::Const(2.0)))),
        );
        assert_eq!(parse("2^3^2").unwrap(), expected);
        assert_eq!(
            parse("(2^3)^2").unwrap(),
            Expr::Pow(
                Box::new(Expr::Pow(Box::new(Expr::Const(2.0)), Box::new(Expr::Const(3.0)))),
                Box::new(Expr::Const(2.0)),
            )
        );
        assert_eq!(parse("a^b^c^d").unwrap().to_string(), "(a^(b^(c^d)))");
        assert_eq!(parse("2*x^a^b").unwrap().to_string(), "(2 * (x^(a^b)))");
        assert_eq!(parse("E^-x^2").unwrap().to_string(), "(E^-((x^2)))");
        assert_eq!(parse("2^-1").unwrap().to_string(), "(2^-(1))");
        assert_eq!(parse("-x^2").unwrap().to_string(), "-((x^2))");
    }

    #[test]
    fn test_call_needs_parenthesized_arguments() {
        assert!(matches!(parse("sin x"), Err(EvalError::UnsupportedOperator(_))));
        assert!(matches!(parse("f 2"), Err(EvalError::UnsupportedOperator(_))));
        assert!(parse("sin (x)").is_ok());
    }

    #[test]
    fn test_long_chains_are_not_nesting() {
        let terms = 1000;
        let sum = vec!["x"; terms].join(" + ");
        assert!(matches!(parse(&sum).unwrap(), Expr::Add(..)));

        let mixed = (0..terms).map(|i| format!("{i}*x")).collect::<Vec<_>>().join(" - ");
        assert!(parse(&mixed).is_ok());

        let too_long = vec!["1"; MAX_CHAIN_LENGTH + 2].join("+");
        assert!(matches!(
            parse(&too_long),
            Err(EvalError::ChainTooLong(MAX_CHAIN_LENGTH))
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}x{}", "-(".repeat(MAX_NESTING_DEPTH), ")".repeat(MAX_NESTING_DEPTH));
        assert!(matches!(
            parse(&deep),
            Err(EvalError::RecursionLimitExceeded(MAX_NESTING_DEPTH))
        ));
        assert!(parse("-(-(x))").is_ok());
    }
}
