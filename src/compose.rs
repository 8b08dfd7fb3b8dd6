//! Calls from one expression into other user-defined functions.
//!
//! With `f(x) = a*sin(b*x) + c` defined, the expression `f(x)^2 + f(2x)` calls `f` twice.
//! A call `name(arg)` is resolved against the function list in order, considering only
//! definitions that
//!
//! - are called by `name` (their `dependent_var`),
//! - are visible,
//! - are not the function currently being evaluated.
//!
//! The argument is evaluated with the full pipeline, so `f(g(x))` works. The referenced
//! body is evaluated with the plain evaluator: the argument is bound to the function's
//! own independent variable and no further user functions are resolved inside it. A
//! chain of references therefore never re-enters the resolver, and a cycle such as
//! `f(x) = g(x)`, `g(x) = f(x)` ends after one level with an unknown-function failure.
//!
//! The first candidate producing a finite value wins. When all candidates fail the call
//! fails with the last candidate's error; when there is no candidate the name falls
//! through to the library.

use std::collections::BTreeSet;

use crate::config::EvalConfig;
use crate::context::{EvaluationContext, Scope, VariableMap};
use crate::errors::EvalError;
use crate::formula::Formula;
use crate::types::FunctionDef;

/// A user function prepared for calls: its definition and its parsed body.
struct Candidate<'a> {
    def: &'a FunctionDef,
    body: Result<Formula, String>,
}

impl Candidate<'_> {
    fn call(&self, args: &[f64], variables: &VariableMap) -> Result<f64, EvalError> {
        let [arg] = args else {
            return Err(EvalError::Arity {
                name: self.def.dependent_var.clone(),
                expected: 1,
                got: args.len(),
            });
        };
        match &self.body {
            Ok(body) => body
                .bind_simple(&self.def.independent_var, variables)
                .value(*arg),
            Err(reason) => Err(EvalError::InvalidFunction {
                name: self.def.dependent_var.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

/// Resolves calls to user functions for one expression under one configuration.
///
/// Only the functions the expression actually calls are parsed, once, when the
/// composer is built. The composer is `Sync` and can be shared by parallel evaluations.
pub struct Composer<'a> {
    candidates: Vec<Candidate<'a>>,
    variables: &'a VariableMap,
}

impl<'a> Composer<'a> {
    /// Prepares the user functions among `calls` that are eligible under `config`.
    pub fn new(calls: &BTreeSet<String>, config: &EvalConfig<'a>, variables: &'a VariableMap) -> Self {
        let candidates = config
            .functions
            .iter()
            .filter(|def| def.visible)
            .filter(|def| config.current_function != Some(&def.id))
            .filter(|def| calls.contains(&def.dependent_var))
            .map(|def| Candidate {
                def,
                body: Formula::parse(&def.expr).map_err(|e| e.to_string()),
            })
            .collect();
        Self {
            candidates,
            variables,
        }
    }

    /// A composer that resolves nothing; every call goes to the library.
    pub fn empty(variables: &'a VariableMap) -> Self {
        Self {
            candidates: Vec::new(),
            variables,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Returns `None` if no eligible user function is called `name`.
    pub fn resolve(&self, name: &str, args: &[f64]) -> Option<Result<f64, EvalError>> {
        let mut last = None;
        for candidate in self.candidates.iter().filter(|c| c.def.dependent_var == name) {
            let result = candidate.call(args, self.variables);
            if result.is_ok() {
                return Some(result);
            }
            last = Some(result);
        }
        last
    }

    /// Layers this composer over a plain evaluation context.
    pub fn scope<'b>(&'b self, context: EvaluationContext<'b>) -> ComposedScope<'b> {
        ComposedScope {
            context,
            composer: self,
        }
    }
}

/// Evaluation context that resolves user functions before library functions.
pub struct ComposedScope<'b> {
    context: EvaluationContext<'b>,
    composer: &'b Composer<'b>,
}

impl Scope for ComposedScope<'_> {
    fn value(&self, name: &str) -> Result<f64, EvalError> {
        self.context.value(name)
    }

    fn call(&self, name: &str, args: &[f64]) -> Result<f64, EvalError> {
        self.composer
            .resolve(name, args)
            .unwrap_or_else(|| self.context.call(name, args))
    }
}
