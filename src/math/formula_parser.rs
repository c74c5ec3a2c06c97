use crate::math::formula_token::{FormulaToken, FormulaTokenData, InfixOp, try_tokenize_formula};
use crate::math::{MathConstant, MathExpression, MathOperator, ParserError};
use FormulaTokenData::{Call, Infix, Name, Number, TokenList};

/// Parse an infix formula into a [`MathExpression`]. This is a wrapper for tokenize+parse.
///
/// Operator precedence (lowest to highest): `+ -`, `* /`, unary `-`, `^`. Addition,
/// subtraction, multiplication and division are left-associative, power is
/// right-associative.
pub(crate) fn parse_formula(formula: &str) -> Result<MathExpression, ParserError> {
    let tokens = try_tokenize_formula(formula)?;
    parse_formula_tokens(&tokens)
}

/// A utility function that allows us to properly handle empty token list errors.
fn before_or_empty<F: Fn(&[FormulaToken]) -> Result<MathExpression, ParserError>>(
    op: F,
    split_at: usize,
    tokens: &[FormulaToken],
) -> Result<MathExpression, ParserError> {
    let slice = &tokens[..split_at];
    if slice.is_empty() {
        let message = format!(
            "Found nothing at the left-hand-side of operator `{}`",
            tokens[split_at]
        );
        Err(ParserError::at(tokens[split_at].position, message))
    } else {
        op(slice)
    }
}

fn after_or_empty<F: Fn(&[FormulaToken]) -> Result<MathExpression, ParserError>>(
    op: F,
    split_at: usize,
    tokens: &[FormulaToken],
) -> Result<MathExpression, ParserError> {
    let slice = &tokens[(split_at + 1)..];
    if slice.is_empty() {
        let message = format!(
            "Found nothing at the right-hand-side of operator `{}`",
            tokens[split_at]
        );
        Err(ParserError::at(tokens[split_at].position, message))
    } else {
        op(slice)
    }
}

fn to_math_operator(op: InfixOp) -> MathOperator {
    match op {
        InfixOp::Plus => MathOperator::Plus,
        InfixOp::Minus => MathOperator::Minus,
        InfixOp::Times => MathOperator::Times,
        InfixOp::Divide => MathOperator::Divide,
        InfixOp::Power => MathOperator::Power,
    }
}

/// Parse `tokens` of a formula into an abstract syntax tree using recursive steps.
fn parse_formula_tokens(tokens: &[FormulaToken]) -> Result<MathExpression, ParserError> {
    if tokens.is_empty() {
        Err(ParserError::at(0, "Expression is empty".to_string()))
    } else {
        parse_1_add_sub(tokens)
    }
}

/// Recursive parsing step 1: extract binary `-` and `+` operators.
///
/// A `+`/`-` directly following another operator (or starting the expression) is a
/// prefix sign and is left for step 3.
fn parse_1_add_sub(tokens: &[FormulaToken]) -> Result<MathExpression, ParserError> {
    let split_at = tokens.iter().enumerate().rposition(|(i, t)| {
        matches!(t.data, Infix(InfixOp::Plus | InfixOp::Minus))
            && i > 0
            && !matches!(tokens[i - 1].data, Infix(_))
    });
    if let Some(split_at) = split_at {
        let Infix(op) = &tokens[split_at].data else {
            unreachable!("Parser invariant: split token must be infix.")
        };
        Ok(MathExpression::mk_binary(
            to_math_operator(*op),
            &before_or_empty(parse_1_add_sub, split_at, tokens)?,
            &after_or_empty(parse_2_mul_div, split_at, tokens)?,
        ))
    } else {
        parse_2_mul_div(tokens)
    }
}

/// Recursive parsing step 2: extract `/` and `*` operators.
fn parse_2_mul_div(tokens: &[FormulaToken]) -> Result<MathExpression, ParserError> {
    let split_at = tokens
        .iter()
        .rposition(|t| matches!(t.data, Infix(InfixOp::Times | InfixOp::Divide)));
    if let Some(split_at) = split_at {
        let Infix(op) = &tokens[split_at].data else {
            unreachable!("Parser invariant: split token must be infix.")
        };
        Ok(MathExpression::mk_binary(
            to_math_operator(*op),
            &before_or_empty(parse_2_mul_div, split_at, tokens)?,
            &after_or_empty(parse_3_sign, split_at, tokens)?,
        ))
    } else {
        parse_3_sign(tokens)
    }
}

/// Recursive parsing step 3: extract prefix signs. A minus sign directly followed by a
/// numeric literal is folded into a negative literal; `-(2)` stays a unary minus.
fn parse_3_sign(tokens: &[FormulaToken]) -> Result<MathExpression, ParserError> {
    match &tokens[0].data {
        Infix(InfixOp::Minus) => {
            if let [_, literal] = tokens
                && let Number(number) = &literal.data
            {
                return Ok(MathExpression::mk_number(number.negate()));
            }
            let operand = after_or_empty(parse_3_sign, 0, tokens)?;
            Ok(MathExpression::mk_apply(MathOperator::Minus, &[operand]))
        }
        Infix(InfixOp::Plus) => after_or_empty(parse_3_sign, 0, tokens),
        _ => parse_4_power(tokens),
    }
}

/// Recursive parsing step 4: extract `^` operators (right-associative).
fn parse_4_power(tokens: &[FormulaToken]) -> Result<MathExpression, ParserError> {
    let split_at = tokens
        .iter()
        .position(|t| matches!(t.data, Infix(InfixOp::Power)));
    if let Some(split_at) = split_at {
        Ok(MathExpression::mk_binary(
            MathOperator::Power,
            &before_or_empty(parse_5_others, split_at, tokens)?,
            &after_or_empty(parse_3_sign, split_at, tokens)?,
        ))
    } else {
        parse_5_others(tokens)
    }
}

/// Recursive parsing step 5: extract literals and recursively solve sub-formulae in
/// parentheses and in function calls.
fn parse_5_others(tokens: &[FormulaToken]) -> Result<MathExpression, ParserError> {
    match tokens.len() {
        0 => unreachable!("Parser invariant: Empty tokens are resolved."),
        // This should be a literal, a name, a call or a parenthesis group, anything
        // else does not make sense.
        1 => match &tokens[0].data {
            Infix(op) => Err(ParserError::at(
                tokens[0].position,
                format!("Unexpected operator `{op}`"),
            )),
            Number(number) => Ok(MathExpression::mk_number(*number)),
            Name(name) => match MathConstant::try_from(name.as_str()) {
                Ok(constant) => Ok(MathExpression::mk_constant(constant)),
                Err(()) => Ok(MathExpression::mk_identifier(name)),
            },
            Call(name, arguments) => parse_call(name, arguments, tokens[0].position),
            // recursively solve sub-formulae in parentheses
            TokenList(inner_tokens) => parse_formula_tokens(inner_tokens),
        },
        _ => {
            let token_str = tokens.iter().map(ToString::to_string).collect::<Vec<_>>();
            let token_str = token_str.join(" ");
            Err(ParserError::at(
                tokens[1].position,
                format!(
                    "Unexpected: `{token_str}`. Expecting number, identifier, function call, or parenthesis group"
                ),
            ))
        }
    }
}

fn parse_call(
    name: &str,
    arguments: &[FormulaToken],
    position: usize,
) -> Result<MathExpression, ParserError> {
    // `ci(pi)` names an identifier that would otherwise read as a constant.
    if name == "ci" {
        return match arguments {
            [argument] => match &argument.data {
                TokenList(inner) => match inner.as_slice() {
                    [FormulaToken { data: Name(id), .. }] => {
                        Ok(MathExpression::mk_identifier(id))
                    }
                    _ => Err(ParserError::at(
                        argument.position,
                        "Function `ci` expects a single name".to_string(),
                    )),
                },
                _ => unreachable!("Tokenizer invariant: Function arguments are token lists."),
            },
            _ => Err(ParserError::at(
                position,
                "Function `ci` expects a single name".to_string(),
            )),
        };
    }

    let mut args = Vec::new();
    for inner in arguments {
        let TokenList(inner_tokens) = &inner.data else {
            unreachable!("Tokenizer invariant: Function arguments are token lists.")
        };
        args.push(parse_formula_tokens(inner_tokens)?);
    }

    if name == "piecewise" {
        if args.is_empty() {
            let message = "Function `piecewise` expects at least one argument".to_string();
            return Err(ParserError::at(position, message));
        }
        let pieces = args
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect::<Vec<_>>();
        let otherwise = if args.len() % 2 == 1 {
            args.last()
        } else {
            None
        };
        return Ok(MathExpression::mk_piecewise(&pieces, otherwise));
    }

    let Some(op) = MathOperator::from_function_name(name) else {
        return Err(ParserError::at(position, format!("Unknown function `{name}`")));
    };
    if !op.arity().accepts(args.len()) {
        let message = format!(
            "Function `{name}` cannot be applied to {} argument(s)",
            args.len()
        );
        return Err(ParserError::at(position, message));
    }
    Ok(MathExpression::mk_apply(op, &args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{AggregateFn, MathNumber};

    fn id(name: &str) -> MathExpression {
        MathExpression::mk_identifier(name)
    }

    fn int(value: i64) -> MathExpression {
        MathExpression::mk_integer(value)
    }

    #[test]
    fn test_parse_simple_addition() {
        let result = parse_formula("3 + x");
        let expected = MathExpression::mk_binary(MathOperator::Plus, &int(3), &id("x"));
        assert_eq!(result, Ok(expected));
    }

    #[test]
    fn test_parse_left_associativity() {
        let result = parse_formula("10 - 7 - x");
        let expected = MathExpression::mk_binary(
            MathOperator::Minus,
            &MathExpression::mk_binary(MathOperator::Minus, &int(10), &int(7)),
            &id("x"),
        );
        assert_eq!(result, Ok(expected));

        let result = parse_formula("8 * 4 / 2");
        let expected = MathExpression::mk_binary(
            MathOperator::Divide,
            &MathExpression::mk_binary(MathOperator::Times, &int(8), &int(4)),
            &int(2),
        );
        assert_eq!(result, Ok(expected));
    }

    #[test]
    fn test_parse_power_binds_tighter_than_sign() {
        let result = parse_formula("-x^2^y");
        let expected = MathExpression::mk_apply(
            MathOperator::Minus,
            &[MathExpression::mk_binary(
                MathOperator::Power,
                &id("x"),
                &MathExpression::mk_binary(MathOperator::Power, &int(2), &id("y")),
            )],
        );
        assert_eq!(result, Ok(expected));
    }

    #[test]
    fn test_parse_negative_literals() {
        let result = parse_formula("x * -2.5");
        let expected = MathExpression::mk_binary(
            MathOperator::Times,
            &id("x"),
            &MathExpression::mk_real(-2.5),
        );
        assert_eq!(result, Ok(expected));

        let result = parse_formula("x - -2");
        let expected = MathExpression::mk_binary(MathOperator::Minus, &id("x"), &int(-2));
        assert_eq!(result, Ok(expected));
    }

    #[test]
    fn test_parse_functions_and_constants() {
        let result = parse_formula("max(a, 2 * pi) + sqrt(b)");
        let expected = MathExpression::mk_binary(
            MathOperator::Plus,
            &MathExpression::mk_apply(
                MathOperator::Aggregate(AggregateFn::Max),
                &[
                    id("a"),
                    MathExpression::mk_binary(
                        MathOperator::Times,
                        &int(2),
                        &MathExpression::mk_constant(MathConstant::Pi),
                    ),
                ],
            ),
            &MathExpression::mk_apply(MathOperator::Root, &[id("b")]),
        );
        assert_eq!(result, Ok(expected));
    }

    #[test]
    fn test_parse_piecewise() {
        let result = parse_formula("piecewise(1, lt(t, 5), 0)").unwrap();
        let expected = MathExpression::mk_piecewise(
            &[(
                int(1),
                MathExpression::mk_binary(MathOperator::Lt, &id("t"), &int(5)),
            )],
            Some(&int(0)),
        );
        assert_eq!(result, expected);
    }

    #[test]
    fn test_parse_e_notation() {
        let result = parse_formula("1.5e3").unwrap();
        assert_eq!(
            result.as_number(),
            Some(MathNumber::ENotation {
                mantissa: 1.5,
                exponent: 3
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_formula("3 + (5 * 2").unwrap_err();
        assert_eq!(err.message.as_str(), "Input ended while expecting `)`");

        let err = parse_formula("5 + @").unwrap_err();
        assert_eq!(err.message.as_str(), "Unexpected `@`");

        let err = parse_formula("foo(x)").unwrap_err();
        assert_eq!(err.message.as_str(), "Unknown function `foo`");

        let err = parse_formula("divide(x)").unwrap_err();
        assert_eq!(err.position, 0);

        let err = parse_formula("x *").unwrap_err();
        assert_eq!(err.position, 2);

        assert!(parse_formula("").is_err());
        assert!(parse_formula("x y").is_err());
        assert!(parse_formula("piecewise()").is_err());
    }

    #[test]
    fn test_parse_sign_folding() {
        assert_eq!(parse_formula("-2"), Ok(int(-2)));
        assert_eq!(
            parse_formula("(-2) ^ 2"),
            Ok(MathExpression::mk_binary(MathOperator::Power, &int(-2), &int(2)))
        );
        assert_eq!(
            parse_formula("-(2)"),
            Ok(MathExpression::mk_apply(MathOperator::Minus, &[int(2)]))
        );
        assert_eq!(
            parse_formula("-2 ^ 2"),
            Ok(MathExpression::mk_apply(
                MathOperator::Minus,
                &[MathExpression::mk_binary(MathOperator::Power, &int(2), &int(2))]
            ))
        );
    }

    #[test]
    fn test_parse_escaped_identifier() {
        assert_eq!(
            parse_formula("ci(pi) * pi"),
            Ok(MathExpression::mk_binary(
                MathOperator::Times,
                &id("pi"),
                &MathExpression::mk_constant(MathConstant::Pi),
            ))
        );
        assert!(parse_formula("ci(x + 1)").is_err());
        assert!(parse_formula("ci(a, b)").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for formula in [
            "a + b * c - d / e",
            "(a + b) * -(c ^ d)",
            "log(2, x) + log10(y) + ln(z)",
            "piecewise(a, gt(b, c), and(true, not(false)))",
            "sum(S1) / 2.0",
            "2e-3 * x",
            "(-2) ^ 2 + (-1.5e3) ^ x",
            "-(2) * -(x)",
            "ci(true) + ci(NaN) * true",
        ] {
            let parsed = parse_formula(formula).unwrap();
            let rendered = parsed.to_string();
            assert_eq!(parse_formula(&rendered), Ok(parsed), "formula `{formula}`");
        }
    }
}
