//! Caller-owned definitions the evaluator reads.
//!
//! Both [`Variable`] and [`FunctionDef`] are snapshots supplied by the caller on every
//! call. The evaluator never mutates or retains them.

use std::fmt;

/// Name of the independent variable when none is given.
pub const DEFAULT_INDEPENDENT_VAR: &str = "x";

/// Name a user function is called by when none is given.
pub const DEFAULT_DEPENDENT_VAR: &str = "f";

/// A named scalar variable, e.g. a slider value.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub value: f64,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Opaque identifier of a user function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(String);

impl FunctionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FunctionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FunctionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for FunctionId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// A user-defined function such as `g(t) = f(t)^2`.
///
/// Other expressions call it as `dependent_var(arg)`; the argument value is bound to
/// `independent_var` while `expr` is evaluated. Hidden functions cannot be called from
/// other expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub id: FunctionId,
    pub expr: String,
    /// Optional closed-form derivative supplied by the user
    pub derivative: Option<String>,
    pub independent_var: String,
    pub dependent_var: String,
    pub visible: bool,
}

impl FunctionDef {
    /// Creates a visible function `f(x) = expr`.
    pub fn new(id: impl Into<FunctionId>, expr: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expr: expr.into(),
            derivative: None,
            independent_var: DEFAULT_INDEPENDENT_VAR.to_string(),
            dependent_var: DEFAULT_DEPENDENT_VAR.to_string(),
            visible: true,
        }
    }

    /// Sets the name the function is called by.
    pub fn with_dependent_var(mut self, name: impl Into<String>) -> Self {
        self.dependent_var = name.into();
        self
    }

    /// Sets the name the argument is bound to.
    pub fn with_independent_var(mut self, name: impl Into<String>) -> Self {
        self.independent_var = name.into();
        self
    }

    pub fn with_derivative(mut self, derivative: impl Into<String>) -> Self {
        self.derivative = Some(derivative.into());
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// The function rendered as `name(var) = expr`.
    pub fn signature(&self) -> String {
        format!(
            "{}({}) = {}",
            self.dependent_var, self.independent_var, self.expr
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_def_defaults() {
        let def = FunctionDef::new("1", "x^2");
        assert_eq!(def.id, FunctionId::from("1"));
        assert_eq!(def.independent_var, "x");
        assert_eq!(def.dependent_var, "f");
        assert!(def.visible);
        assert!(def.derivative.is_none());
    }

    #[test]
    fn test_function_def_builder() {
        let def = FunctionDef::new(7u64, "t^3")
            .with_dependent_var("g")
            .with_independent_var("t")
            .with_derivative("3t^2")
            .with_visible(false);
        assert_eq!(def.id.as_str(), "7");
        assert_eq!(def.signature(), "g(t) = t^3");
        assert_eq!(def.derivative.as_deref(), Some("3t^2"));
        assert!(!def.visible);
    }
}
