use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use plotexpr::{
    sample_formula, sample_formula_derivative, EvalConfig, Formula, FunctionDef, FunctionId,
    Variable,
};
use std::process;

#[derive(Parser)]
#[command(name = "plotexpr")]
#[command(about = "Evaluate, differentiate and sample math expressions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate an expression at a point
    Eval {
        #[command(flatten)]
        common: Common,
        /// Value of the independent variable
        #[arg(long, allow_negative_numbers = true)]
        at: f64,
    },
    /// Differentiate an expression numerically at a point
    Diff {
        #[command(flatten)]
        common: Common,
        /// Value of the independent variable
        #[arg(long, allow_negative_numbers = true)]
        at: f64,
        /// Half-width of the central difference
        #[arg(long, default_value_t = plotexpr::DEFAULT_STEP)]
        step: f64,
        /// Compute the second derivative instead
        #[arg(long)]
        second: bool,
    },
    /// Evaluate an expression over an evenly spaced range
    Sample {
        #[command(flatten)]
        common: Common,
        #[arg(long, allow_negative_numbers = true)]
        from: f64,
        #[arg(long, allow_negative_numbers = true)]
        to: f64,
        /// Number of points, both ends included
        #[arg(long, default_value_t = 11)]
        count: usize,
        /// Sample the numerical derivative instead of the value
        #[arg(long)]
        derivative: bool,
    },
}

#[derive(Args)]
struct Common {
    /// Mathematical expression, e.g. "a*sin(b*x) + c"
    expression: String,
    /// Variable binding NAME=VALUE (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE")]
    vars: Vec<String>,
    /// User function NAME=EXPR or NAME(VAR)=EXPR (repeatable)
    #[arg(long = "fn", value_name = "DEFINITION")]
    functions: Vec<String>,
    /// Name of the independent variable
    #[arg(long, default_value = "x")]
    independent: String,
    /// User function being edited; it is not substituted into the expression
    #[arg(long, value_name = "NAME")]
    current: Option<String>,
    /// Print the parsed expression tree before the result
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Eval { common, at } => {
            let (vars, funcs) = common.definitions()?;
            let config = common.config(&vars, &funcs);
            let formula = common.formula()?;
            println!("{}", formula.eval_at(at, &config)?);
        }
        Command::Diff {
            common,
            at,
            step,
            second,
        } => {
            let (vars, funcs) = common.definitions()?;
            let config = common.config(&vars, &funcs).with_step(step);
            let formula = common.formula()?;
            let value = if second {
                formula.second_derivative_at(at, &config)?
            } else {
                formula.derivative_at(at, &config)?
            };
            println!("{}", value);
        }
        Command::Sample {
            common,
            from,
            to,
            count,
            derivative,
        } => {
            let (vars, funcs) = common.definitions()?;
            let config = common.config(&vars, &funcs);
            let formula = common.formula()?;
            let points = if derivative {
                sample_formula_derivative(&formula, from, to, count, &config)
            } else {
                sample_formula(&formula, from, to, count, &config)
            };
            for point in points {
                match point.y {
                    Some(y) => println!("{}\t{}", point.x, y),
                    None => println!("{}\t{}", point.x, "-".dimmed()),
                }
            }
        }
    }
    Ok(())
}

impl Common {
    fn definitions(&self) -> Result<(Vec<Variable>, Vec<FunctionDef>), String> {
        let vars = self
            .vars
            .iter()
            .map(|text| parse_variable(text))
            .collect::<Result<Vec<_>, _>>()?;
        let funcs = self
            .functions
            .iter()
            .enumerate()
            .map(|(i, text)| parse_function(i as u64, text))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((vars, funcs))
    }

    fn config<'a>(&'a self, vars: &'a [Variable], funcs: &'a [FunctionDef]) -> EvalConfig<'a> {
        let config = EvalConfig::default()
            .with_independent_var(&self.independent)
            .with_variables(vars)
            .with_functions(funcs);
        let current = self
            .current
            .as_deref()
            .and_then(|name| funcs.iter().find(|def| def.dependent_var == name));
        match current {
            Some(def) => config.with_current_function(&def.id),
            None => config,
        }
    }

    /// Parses the expression, printing the parsed tree with `--verbose`.
    fn formula(&self) -> Result<Formula, plotexpr::EvalError> {
        let formula = Formula::parse(&self.expression)?;
        if self.verbose {
            eprintln!("{:?}", formula);
        }
        Ok(formula)
    }
}

/// Parses `NAME=VALUE`.
fn parse_variable(text: &str) -> Result<Variable, String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{text}'"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for '{}': {e}", name.trim()))?;
    Ok(Variable::new(name.trim(), value))
}

/// Parses `NAME=EXPR` or `NAME(VAR)=EXPR`.
fn parse_function(index: u64, text: &str) -> Result<FunctionDef, String> {
    let (head, expr) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=EXPR or NAME(VAR)=EXPR, got '{text}'"))?;
    let head = head.trim();
    let def = FunctionDef::new(FunctionId::from(index), expr.trim());
    match head.split_once('(') {
        Some((name, rest)) => {
            let var = rest
                .strip_suffix(')')
                .ok_or_else(|| format!("unclosed parameter list in '{head}'"))?;
            Ok(def
                .with_dependent_var(name.trim())
                .with_independent_var(var.trim()))
        }
        None => Ok(def.with_dependent_var(head)),
    }
}
