//! Per-call evaluation settings.
//!
//! [`EvalConfig`] borrows everything an evaluation reads from the caller: the name of
//! the independent variable, the variable and function snapshots, the function being
//! evaluated (excluded from composition) and the finite-difference step. It is `Copy`,
//! so one configuration can be reused across many calls and threads.

use crate::types::{FunctionDef, FunctionId, Variable, DEFAULT_INDEPENDENT_VAR};

/// Finite-difference step used when none is given.
pub const DEFAULT_STEP: f64 = 1e-4;

/// Settings for a single evaluation, differentiation or sampling call.
///
/// # Example
/// ```
/// use plotexpr::{EvalConfig, Variable};
///
/// let vars = [Variable::new("a", 2.0)];
/// let config = EvalConfig::default()
///     .with_independent_var("t")
///     .with_variables(&vars)
///     .with_step(1e-5);
/// assert_eq!(config.independent_var, "t");
/// assert_eq!(config.variables.len(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EvalConfig<'a> {
    /// Name the evaluation point is bound to
    pub independent_var: &'a str,
    /// Function whose expression is being evaluated; never substituted into itself
    pub current_function: Option<&'a FunctionId>,
    /// User functions that may be called by their dependent variable name
    pub functions: &'a [FunctionDef],
    pub variables: &'a [Variable],
    /// Half-width of the central difference
    pub step: f64,
}

impl Default for EvalConfig<'_> {
    fn default() -> Self {
        Self {
            independent_var: DEFAULT_INDEPENDENT_VAR,
            current_function: None,
            functions: &[],
            variables: &[],
            step: DEFAULT_STEP,
        }
    }
}

impl<'a> EvalConfig<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_independent_var(mut self, name: &'a str) -> Self {
        self.independent_var = name;
        self
    }

    pub fn with_current_function(mut self, id: &'a FunctionId) -> Self {
        self.current_function = Some(id);
        self
    }

    pub fn with_functions(mut self, functions: &'a [FunctionDef]) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_variables(mut self, variables: &'a [Variable]) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Configuration for evaluating `def`'s own expression: its independent variable,
    /// and `def` excluded from composition.
    pub fn for_function(self, def: &'a FunctionDef) -> Self {
        Self {
            independent_var: &def.independent_var,
            current_function: Some(&def.id),
            ..self
        }
    }
}
