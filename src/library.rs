//! Constant and function library available to every expression.
//!
//! The library is fixed, read-only data: two named constants (`PI`, `E`) and a set of
//! unary and binary numeric functions. Lookups go through [`Builtin`], whose variants
//! are generated from a single table so that the name list, the parser and the
//! implementations cannot drift apart.
//!
//! No library name contains a digit. The normalizer inserts `*` between a digit and a
//! following letter or `(`, which would split names such as `log10` or `atan2`.

use std::str::FromStr;

use crate::errors::EvalError;

/// Error type for parsing library function names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownBuiltin;

macro_rules! define_builtins {
    (
        unary { $( $uname:ident => $uimp:expr ),+ $(,)? }
        binary { $( $bname:ident => $bimp:expr ),+ $(,)? }
    ) => {
        /// Functions of the expression library.
        #[allow(non_camel_case_types)] // variant names double as the expression spelling
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum Builtin {
            $( $uname, )+
            $( $bname, )+
        }

        impl Builtin {
            /// Returns the names of all library functions.
            pub fn names() -> &'static [&'static str] {
                &[ $( stringify!($uname), )+ $( stringify!($bname), )+ ]
            }

            /// Returns the name the function is called by in expressions.
            pub fn name(self) -> &'static str {
                match self {
                    $( Builtin::$uname => stringify!($uname), )+
                    $( Builtin::$bname => stringify!($bname), )+
                }
            }

            /// Returns the number of arguments the function takes.
            pub fn arity(self) -> usize {
                match self {
                    $( Builtin::$uname => 1, )+
                    $( Builtin::$bname => 2, )+
                }
            }

            fn apply_unchecked(self, args: &[f64]) -> f64 {
                match self {
                    $( Builtin::$uname => {
                        let f: fn(f64) -> f64 = $uimp;
                        f(args[0])
                    } )+
                    $( Builtin::$bname => {
                        let f: fn(f64, f64) -> f64 = $bimp;
                        f(args[0], args[1])
                    } )+
                }
            }
        }

        impl FromStr for Builtin {
            type Err = UnknownBuiltin;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( stringify!($uname) => Ok(Builtin::$uname), )+
                    $( stringify!($bname) => Ok(Builtin::$bname), )+
                    _ => Err(UnknownBuiltin),
                }
            }
        }
    };
}

define_builtins! {
    unary {
        sin => f64::sin,
        cos => f64::cos,
        tan => f64::tan,
        asin => f64::asin,
        acos => f64::acos,
        atan => f64::atan,
        sinh => f64::sinh,
        cosh => f64::cosh,
        tanh => f64::tanh,
        asinh => f64::asinh,
        acosh => f64::acosh,
        atanh => f64::atanh,
        sqrt => f64::sqrt,
        cbrt => f64::cbrt,
        abs => f64::abs,
        exp => f64::exp,
        ln => f64::ln,
        log => f64::log10,
        floor => f64::floor,
        ceil => f64::ceil,
        round => round_half_up,
        trunc => f64::trunc,
        sign => sign,
    }
    binary {
        min => f64::min,
        max => f64::max,
        pow => f64::powf,
        hypot => f64::hypot,
    }
}

impl Builtin {
    /// Applies the function to already evaluated arguments.
    ///
    /// # Errors
    /// Returns `EvalError::Arity` if `args` does not hold exactly [`Builtin::arity`] values.
    pub fn apply(self, args: &[f64]) -> Result<f64, EvalError> {
        if args.len() != self.arity() {
            return Err(EvalError::Arity {
                name: self.name().to_string(),
                expected: self.arity(),
                got: args.len(),
            });
        }
        Ok(self.apply_unchecked(args))
    }
}

/// Looks up a library constant by its exact (canonical) spelling.
///
/// The normalizer rewrites `pi` and `e` in any case to `PI` and `E`, so only the
/// canonical spelling needs to be recognized here.
pub fn constant(name: &str) -> Option<f64> {
    match name {
        "PI" => Some(std::f64::consts::PI),
        "E" => Some(std::f64::consts::E),
        _ => None,
    }
}

/// Rounds half-way cases toward positive infinity (`round(-2.5) == -2`).
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Sign of `x`; zero (of either sign) and NaN are returned unchanged.
fn sign(x: f64) -> f64 {
    if x == 0.0 || x.is_nan() {
        x
    } else {
        x.signum()
    }
}
