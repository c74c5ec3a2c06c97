use crate::math::{MathNumber, ParserError};
use std::fmt::{Display, Formatter};

/// Binary infix operators of the formula syntax.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum InfixOp {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
}

impl TryFrom<char> for InfixOp {
    type Error = ();

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '+' => Ok(InfixOp::Plus),
            '-' => Ok(InfixOp::Minus),
            '*' => Ok(InfixOp::Times),
            '/' => Ok(InfixOp::Divide),
            '^' => Ok(InfixOp::Power),
            _ => Err(()),
        }
    }
}

impl Display for InfixOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InfixOp::Plus => write!(f, "+"),
            InfixOp::Minus => write!(f, "-"),
            InfixOp::Times => write!(f, "*"),
            InfixOp::Divide => write!(f, "/"),
            InfixOp::Power => write!(f, "^"),
        }
    }
}

/// Enum of all possible tokens occurring in an infix formula.
#[derive(Clone, Debug, PartialEq)]
pub enum FormulaTokenData {
    /// Numeric literal.
    Number(MathNumber),
    /// Identifier or named constant.
    Name(String),
    /// Function call with a name and argument token groups.
    Call(String, Vec<FormulaToken>),
    /// A binary (or prefix) operator.
    Infix(InfixOp),
    /// A closed parentheses group.
    TokenList(Vec<FormulaToken>),
}

impl FormulaTokenData {
    pub fn at(self, position: usize) -> FormulaToken {
        FormulaToken {
            data: self,
            position,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormulaToken {
    pub position: usize,
    pub data: FormulaTokenData,
}

impl Display for FormulaTokenData {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormulaTokenData::Number(value) => write!(f, "{value}"),
            FormulaTokenData::Name(name) => write!(f, "{name}"),
            FormulaTokenData::Infix(op) => write!(f, "{op}"),
            FormulaTokenData::Call(name, args) => {
                let args = args
                    .iter()
                    .map(|arg| arg.data.to_string())
                    .collect::<Vec<_>>();
                write!(f, "{}({})", name, args.join(", "))
            }
            FormulaTokenData::TokenList(args) => {
                let args = args
                    .iter()
                    .map(|arg| arg.data.to_string())
                    .collect::<Vec<_>>();
                write!(f, "({})", args.join(" "))
            }
        }
    }
}

impl Display for FormulaToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.data)
    }
}

/// Tokenize an infix formula.
pub fn try_tokenize_formula(formula: &str) -> Result<Vec<FormulaToken>, ParserError> {
    let chars: Vec<char> = formula.chars().collect();
    let (tokens, length) = try_tokenize_recursive(&chars, 0, false, false)?;

    debug_assert!(length == chars.len());

    Ok(tokens)
}

/// Tokenize `input[start_at..]` and return the tokens together with the number of consumed
/// characters.
///
/// With `ends_with_comma` or `ends_with_parenthesis`, tokenizing stops after the first
/// matching delimiter at this nesting level (the delimiter is consumed). Otherwise the whole
/// remaining input is tokenized.
fn try_tokenize_recursive(
    input: &[char],
    start_at: usize,
    ends_with_comma: bool,
    ends_with_parenthesis: bool,
) -> Result<(Vec<FormulaToken>, usize), ParserError> {
    let mut result = Vec::new();
    let mut position = start_at;

    while position < input.len() {
        match input[position] {
            ',' => {
                return if ends_with_comma {
                    Ok((result, position - start_at + 1))
                } else if ends_with_parenthesis {
                    let message = "Found `,` inside a parenthesis group that is not an argument list";
                    Err(ParserError::at(position, message.to_string()))
                } else {
                    Err(ParserError::at(position, "Unexpected `,`".to_string()))
                };
            }
            ')' => {
                return if ends_with_parenthesis {
                    Ok((result, (position - start_at) + 1))
                } else {
                    let message = "Found `)` without a matching `(`";
                    Err(ParserError::at(position, message.to_string()))
                };
            }
            c if c.is_whitespace() => {
                position += 1;
            }
            c if InfixOp::try_from(c).is_ok() => {
                if let Ok(op) = InfixOp::try_from(c) {
                    result.push(FormulaTokenData::Infix(op).at(position));
                }
                position += 1;
            }
            '(' => {
                position += 1;
                let (group, length) = try_tokenize_recursive(input, position, false, true)?;
                result.push(FormulaTokenData::TokenList(group).at(position));
                position += length;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let (number, length) = collect_number(input, position)?;
                result.push(FormulaTokenData::Number(number).at(position));
                position += length;
            }
            c if is_valid_start_name(c) => {
                let identifier_start = position;
                let name = collect_identifier_str(input, position);
                position += name.len();
                let next = next_non_whitespace_character(input, position);
                if next < input.len() && input[next] == '(' {
                    let (args, length) = collect_function_arguments(input, position)?;
                    result.push(FormulaTokenData::Call(name, args).at(identifier_start));
                    position += length;
                } else {
                    result.push(FormulaTokenData::Name(name).at(identifier_start));
                }
            }
            c => {
                return Err(ParserError::at(position, format!("Unexpected `{c}`")));
            }
        }
    }

    if ends_with_parenthesis {
        let message = "Input ended while expecting `)`";
        return Err(ParserError::at(position, message.to_string()));
    }
    if ends_with_comma {
        let message = "Argument list is not terminated";
        return Err(ParserError::at(position, message.to_string()));
    }

    Ok((result, position - start_at))
}

/// Skip all whitespace at the given position.
fn next_non_whitespace_character(input: &[char], mut position: usize) -> usize {
    while position < input.len() && input[position].is_whitespace() {
        position += 1;
    }
    position
}

/// Letters, digits and `_`.
fn is_valid_in_name(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Letters and `_`.
fn is_valid_start_name(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Collects a name (identifier, constant or function) from the input characters.
fn collect_identifier_str(input: &[char], start_at: usize) -> String {
    let mut name = String::new();
    let mut position = start_at;
    while position < input.len() && is_valid_in_name(input[position]) {
        name.push(input[position]);
        position += 1;
    }
    name
}

/// Collects a numeric literal: digits with an optional fraction, followed by an optional
/// exponent (`1`, `0.5`, `.5`, `2e-3`, `1.5E+2`).
///
/// Literals without fraction and exponent are integers (unless they overflow `i64`),
/// literals with an exponent keep the e-notation, everything else is real.
fn collect_number(input: &[char], start_at: usize) -> Result<(MathNumber, usize), ParserError> {
    let mut position = start_at;
    let mut mantissa = String::new();
    while position < input.len() && (input[position].is_ascii_digit() || input[position] == '.') {
        mantissa.push(input[position]);
        position += 1;
    }

    let mut exponent = None;
    if position < input.len() && (input[position] == 'e' || input[position] == 'E') {
        let mut exp_position = position + 1;
        let mut exponent_str = String::new();
        if exp_position < input.len() && (input[exp_position] == '+' || input[exp_position] == '-')
        {
            exponent_str.push(input[exp_position]);
            exp_position += 1;
        }
        let digits_start = exp_position;
        while exp_position < input.len() && input[exp_position].is_ascii_digit() {
            exponent_str.push(input[exp_position]);
            exp_position += 1;
        }
        if exp_position == digits_start {
            let message = format!("Invalid exponent in number `{mantissa}`");
            return Err(ParserError::at(position, message));
        }
        let value = exponent_str.parse::<i32>().map_err(|e| {
            ParserError::at(position, format!("Invalid exponent `{exponent_str}`: {e}"))
        })?;
        exponent = Some(value);
        position = exp_position;
    }

    let length = position - start_at;
    let invalid = |e: &dyn std::fmt::Display| {
        ParserError::at(start_at, format!("Invalid number `{mantissa}`: {e}"))
    };

    let number = match exponent {
        Some(exponent) => MathNumber::ENotation {
            mantissa: mantissa.parse::<f64>().map_err(|e| invalid(&e))?,
            exponent,
        },
        None if mantissa.contains('.') => {
            MathNumber::Real(mantissa.parse::<f64>().map_err(|e| invalid(&e))?)
        }
        None => match mantissa.parse::<i64>() {
            Ok(value) => MathNumber::Integer(value),
            Err(_) => MathNumber::Real(mantissa.parse::<f64>().map_err(|e| invalid(&e))?),
        },
    };
    Ok((number, length))
}

/// Collects the arguments of a function call. The method guarantees that the items of the
/// returned list are separated by commas and have proper parentheses. Each argument is
/// a [`FormulaTokenData::TokenList`].
fn collect_function_arguments(
    input: &[char],
    start_at: usize,
) -> Result<(Vec<FormulaToken>, usize), ParserError> {
    let mut position = next_non_whitespace_character(input, start_at);

    if position >= input.len() || input[position] != '(' {
        let message = "Function name must be followed by `(`";
        return Err(ParserError::at(position, message.to_string()));
    }

    position = next_non_whitespace_character(input, position + 1);

    let mut args = Vec::new();
    loop {
        if position < input.len() && input[position] == ')' {
            if !args.is_empty() {
                return Err(ParserError::at(position, "Argument is empty".to_string()));
            }
            position += 1;
            break;
        }

        let (group, length) = try_tokenize_recursive(input, position, true, true)?;

        if group.is_empty() {
            return Err(ParserError::at(position, "Argument is empty".to_string()));
        }

        args.push(FormulaTokenData::TokenList(group).at(position));

        debug_assert!(length > 0);
        position += length;

        if input[position - 1] == ')' {
            break;
        }
        debug_assert_eq!(input[position - 1], ',');
        position = next_non_whitespace_character(input, position);
    }

    Ok((args, position - start_at))
}
