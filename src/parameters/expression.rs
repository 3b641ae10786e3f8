//! Bound expression parsing and evaluation
//!
//! Bound declarations such as `inclMax="Population.size / 2"` are small arithmetic
//! expressions over other parameters' values. This module parses them into an AST,
//! evaluates them against an [`EvaluationContext`], and extracts the identifiers they
//! mention. Identifiers may contain dots, so qualified parameter ids work as variables.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, anychar, char, multispace0, one_of},
    combinator::{map, recognize},
    multi::{fold_many0, many0, separated_list0},
    number::complete::double,
    sequence::{delimited, pair},
    IResult, Parser,
};
use std::collections::HashMap;
use thiserror::Error;

/// Error that can occur during expression parsing or evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Failed to parse expression: {message}")]
    ParseError { message: String },

    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("Undefined function: {name}")]
    UndefinedFunction { name: String },
}

/// Result type for expression evaluation
type ExprResult<T> = Result<T, ExpressionError>;

type ParseError<'a> = nom::error::Error<&'a str>;
type PResult<'a, T> = IResult<&'a str, T, ParseError<'a>>;

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Constant number
    Number(f64),

    /// Reference to another parameter's value
    Variable(String),

    /// Negation
    Neg(Box<Expression>),

    /// Binary operations
    Binary(BinaryOp, Box<Expression>, Box<Expression>),

    /// Function call
    Function(String, Vec<Expression>),
}

/// Binary operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Context for expression evaluation, providing variable values
pub trait EvaluationContext {
    /// Get the value of a variable
    fn get_variable(&self, name: &str) -> ExprResult<f64>;

    /// Check if a variable exists
    fn has_variable(&self, name: &str) -> bool;
}

impl EvaluationContext for HashMap<String, f64> {
    fn get_variable(&self, name: &str) -> ExprResult<f64> {
        self.get(name)
            .copied()
            .ok_or_else(|| ExpressionError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    fn has_variable(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl Expression {
    /// Parse an expression from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use dspace_rs::parameters::Expression;
    /// use std::collections::HashMap;
    ///
    /// let expr = Expression::parse("Population.size / 2 - 1").unwrap();
    /// let values = HashMap::from([("Population.size".to_string(), 10.0)]);
    /// assert_eq!(expr.evaluate(&values).unwrap(), 4.0);
    /// ```
    pub fn parse(input: &str) -> ExprResult<Self> {
        match additive(input.trim()) {
            Ok((remainder, expr)) if remainder.trim().is_empty() => Ok(expr),
            Ok((remainder, _)) => Err(ExpressionError::ParseError {
                message: format!("Unexpected trailing characters: '{}'", remainder),
            }),
            Err(e) => Err(ExpressionError::ParseError {
                message: e.to_string(),
            }),
        }
    }

    /// Evaluate the expression with the given context
    pub fn evaluate<C: EvaluationContext + ?Sized>(&self, context: &C) -> ExprResult<f64> {
        match self {
            Self::Number(n) => Ok(*n),

            Self::Variable(name) => context.get_variable(name),

            Self::Neg(expr) => Ok(-expr.evaluate(context)?),

            Self::Binary(op, left, right) => {
                let lhs = left.evaluate(context)?;
                let rhs = right.evaluate(context)?;

                match op {
                    BinaryOp::Add => Ok(lhs + rhs),
                    BinaryOp::Sub => Ok(lhs - rhs),
                    BinaryOp::Mul => Ok(lhs * rhs),
                    BinaryOp::Div if rhs == 0.0 => Err(ExpressionError::DivisionByZero),
                    BinaryOp::Div => Ok(lhs / rhs),
                    BinaryOp::Pow => Ok(lhs.powf(rhs)),
                }
            }

            Self::Function(name, args) => {
                let values = args
                    .iter()
                    .map(|arg| arg.evaluate(context))
                    .collect::<ExprResult<Vec<_>>>()?;
                call(name, &values)
            }
        }
    }

    /// Find all variable names used in the expression, sorted and deduplicated
    pub fn variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort();
        vars.dedup();
        vars
    }

    fn collect_variables(&self, vars: &mut Vec<String>) {
        match self {
            Self::Number(_) => {}
            Self::Variable(name) => vars.push(name.clone()),
            Self::Neg(expr) => expr.collect_variables(vars),
            Self::Binary(_, left, right) => {
                left.collect_variables(vars);
                right.collect_variables(vars);
            }
            Self::Function(_, args) => {
                for arg in args {
                    arg.collect_variables(vars);
                }
            }
        }
    }
}

/// Extract every identifier token from raw expression text.
///
/// Unlike [`Expression::parse`] this never fails: anything that is not an identifier
/// (operators, numbers, unknown syntax) is skipped.
///
/// ```
/// use dspace_rs::parameters::expression::identifiers;
///
/// assert_eq!(identifiers("max(a.b, 2e3) - size2"), vec!["max", "a.b", "size2"]);
/// ```
pub fn identifiers(input: &str) -> Vec<String> {
    let token = alt((
        map(identifier, Some),
        map(
            take_while1(|c: char| c.is_ascii_alphanumeric() || c == '.'),
            |_| None,
        ),
        map(anychar, |_| None),
    ));

    let scanned: PResult<'_, Vec<Option<String>>> = many0(token).parse(input);
    scanned
        .map(|(_, tokens)| tokens.into_iter().flatten().collect())
        .unwrap_or_default()
}

fn call(name: &str, args: &[f64]) -> ExprResult<f64> {
    let apply1 = |f: fn(f64) -> f64| match args {
        [x] => Ok(f(*x)),
        _ => Err(ExpressionError::InvalidOperation {
            message: format!("{}() requires 1 argument, got {}", name, args.len()),
        }),
    };

    match name {
        "abs" => apply1(f64::abs),
        "sqrt" => apply1(f64::sqrt),
        "exp" => apply1(f64::exp),
        "ln" | "log" => apply1(f64::ln),
        "log10" => apply1(f64::log10),
        "floor" => apply1(f64::floor),
        "ceil" => apply1(f64::ceil),
        "round" => apply1(f64::round),
        "min" | "max" if args.len() < 2 => Err(ExpressionError::InvalidOperation {
            message: format!("{}() requires at least 2 arguments, got {}", name, args.len()),
        }),
        "min" => Ok(args.iter().copied().fold(f64::INFINITY, f64::min)),
        "max" => Ok(args.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
        _ => Err(ExpressionError::UndefinedFunction {
            name: name.to_string(),
        }),
    }
}

// Parser functions using nom

fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = ParseError<'a>>
where
    F: Parser<&'a str, Output = O, Error = ParseError<'a>>,
{
    delimited(multispace0, inner, multispace0)
}

/// Identifier: a letter or underscore, then letters, digits, underscores or dots
fn identifier(input: &str) -> PResult<'_, String> {
    let (input, matched) = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_"), tag(".")))),
    ))
    .parse(input)?;
    Ok((input, matched.to_string()))
}

fn number(input: &str) -> PResult<'_, Expression> {
    // `double` also accepts "inf"/"nan", which would swallow identifiers
    if !input.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Float,
        )));
    }
    let (input, value) = double::<&str, ParseError<'_>>(input)?;
    Ok((input, Expression::Number(value)))
}

fn call_or_variable(input: &str) -> PResult<'_, Expression> {
    let (input, name) = identifier(input)?;

    let mut args = delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), additive),
        ws(char(')')),
    );
    match args.parse(input) {
        Ok((rest, args)) => Ok((rest, Expression::Function(name, args))),
        Err(nom::Err::Error(_)) => Ok((input, Expression::Variable(name))),
        Err(e) => Err(e),
    }
}

fn parens(input: &str) -> PResult<'_, Expression> {
    delimited(ws(char('(')), additive, ws(char(')'))).parse(input)
}

fn primary(input: &str) -> PResult<'_, Expression> {
    ws(alt((number, call_or_variable, parens))).parse(input)
}

fn unary(input: &str) -> PResult<'_, Expression> {
    let (rest, _) = multispace0::<&str, ParseError<'_>>(input)?;
    match char::<&str, ParseError<'_>>('-').parse(rest) {
        Ok((rest, _)) => {
            let (rest, expr) = unary(rest)?;
            Ok((rest, Expression::Neg(Box::new(expr))))
        }
        Err(_) => primary(rest),
    }
}

/// `^` binds tightest and associates to the right
fn power(input: &str) -> PResult<'_, Expression> {
    let (input, base) = unary(input)?;
    match ws(char('^')).parse(input) {
        Ok((rest, _)) => {
            let (rest, exponent) = power(rest)?;
            Ok((
                rest,
                Expression::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)),
            ))
        }
        Err(_) => Ok((input, base)),
    }
}

fn term(input: &str) -> PResult<'_, Expression> {
    let (input, first) = power(input)?;
    fold_many0(
        pair(ws(one_of("*/")), power),
        move || first.clone(),
        |acc, (op, rhs)| {
            let op = if op == '*' { BinaryOp::Mul } else { BinaryOp::Div };
            Expression::Binary(op, Box::new(acc), Box::new(rhs))
        },
    )
    .parse(input)
}

fn additive(input: &str) -> PResult<'_, Expression> {
    let (input, first) = term(input)?;
    fold_many0(
        pair(ws(one_of("+-")), term),
        move || first.clone(),
        |acc, (op, rhs)| {
            let op = if op == '+' { BinaryOp::Add } else { BinaryOp::Sub };
            Expression::Binary(op, Box::new(acc), Box::new(rhs))
        },
    )
    .parse(input)
}
