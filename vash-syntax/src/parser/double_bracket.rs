// This file is part of vash, a POSIX-style shell.
// Copyright (C) 2024 vash developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Syntax parser for the enhanced test command `[[ ... ]]`
//!
//! The tokens between `[[` and `]]` are shaped into a test expression:
//! negation, binary comparisons, unary operators, and the bare-operand form
//! that tests for a non-empty string. A longer operand sequence falls back to
//! a single binary expression whose right side joins the remaining tokens;
//! `&&` and `||` inside the brackets are not decomposed.

use super::compound_command::trailing_redirects;
use super::core::{Parser, Success};
use super::error::{ErrorKind, Failure};
use crate::syntax::{EnhancedTestStatement, Node, Redirect, TestExpression};
use crate::token::{Token, TokenKind};
use itertools::Itertools;

const BINARY_OPERATORS: [&str; 12] = [
    "==", "!=", "=", "<", ">", "=~", "-eq", "-ne", "-lt", "-le", "-gt", "-ge",
];

fn operand_text(token: &Token) -> String {
    match token.kind {
        TokenKind::Variable => format!("${}", token.value),
        _ => token.value.clone(),
    }
}

fn test_expression(tokens: &[Token]) -> Option<TestExpression> {
    let (first, rest) = tokens.split_first()?;

    if first.value == "!" {
        let negated = test_expression(rest)?;
        return Some(TestExpression::Negated {
            expression: Box::new(negated),
        });
    }

    match tokens {
        [left, operator, right] if BINARY_OPERATORS.contains(&operator.value.as_str()) => {
            return Some(TestExpression::Binary {
                left: operand_text(left),
                operator: operator.value.clone(),
                right: operand_text(right),
            });
        }
        [operator, operand]
            if operator.value.len() == 2 && operator.value.starts_with('-') =>
        {
            return Some(TestExpression::Unary {
                operator: operator.value.clone(),
                operand: operand_text(operand),
            });
        }
        [operand] => {
            return Some(TestExpression::Unary {
                operator: "-n".to_string(),
                operand: operand_text(operand),
            });
        }
        _ => {}
    }

    // Longer sequences collapse into one binary expression with the
    // remainder joined on the right.
    if tokens.len() >= 3 {
        return Some(TestExpression::Binary {
            left: operand_text(&tokens[0]),
            operator: tokens[1].value.clone(),
            right: tokens[2..].iter().map(operand_text).join(" "),
        });
    }
    None
}

/// Builds the enhanced test command parser.
pub(super) fn enhanced_test(redirection: &Parser<Redirect>) -> Parser<Node> {
    let redirection = redirection.clone();
    Parser::new(move |tokens, start| {
        if !tokens
            .get(start)
            .is_some_and(|t| t.kind == TokenKind::DoubleLBracket)
        {
            return Err(Failure::expected("`[[`", tokens, start));
        }
        let mut position = start + 1;

        let mut expression_tokens: Vec<Token> = Vec::new();
        let mut depth = 0u32;
        while let Some(token) = tokens.get(position) {
            match token.kind {
                TokenKind::DoubleRBracket if depth == 0 => break,
                TokenKind::DoubleLBracket => depth += 1,
                TokenKind::DoubleRBracket => depth -= 1,
                _ => {}
            }
            expression_tokens.push(token.clone());
            position += 1;
        }

        if !tokens
            .get(position)
            .is_some_and(|t| t.kind == TokenKind::DoubleRBracket)
        {
            return Err(Failure::new(
                ErrorKind::MissingTerminator,
                "expected `]]` to close test command",
                position,
            ));
        }
        position += 1;

        let Some(expression) = test_expression(&expression_tokens) else {
            return Err(Failure::new(
                ErrorKind::UnexpectedToken,
                "invalid test expression",
                position,
            ));
        };

        let (redirects, _, position) = trailing_redirects(&redirection, tokens, position);

        Ok(Success {
            value: Node::EnhancedTestStatement(EnhancedTestStatement {
                expression,
                redirects,
            }),
            position,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::testing::{control_grammar, kw, word};
    use crate::token::QuoteType;
    use assert_matches::assert_matches;

    fn parser() -> Parser<Node> {
        let (_, redirection) = control_grammar();
        enhanced_test(&redirection)
    }

    fn open() -> Token {
        kw(TokenKind::DoubleLBracket, "[[")
    }

    fn close() -> Token {
        kw(TokenKind::DoubleRBracket, "]]")
    }

    fn expression_of(node: Node) -> TestExpression {
        match node {
            Node::EnhancedTestStatement(test) => test.expression,
            other => panic!("not a test statement: {other:?}"),
        }
    }

    #[test]
    fn binary_string_comparison() {
        let tokens = [
            open(),
            kw(TokenKind::Variable, "a"), word("=="), word("b"),
            close(),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(expression_of(success.value), TestExpression::Binary { left, operator, right } => {
            assert_eq!(left, "$a");
            assert_eq!(operator, "==");
            assert_eq!(right, "b");
        });
        assert_eq!(success.position, 5);
    }

    #[test]
    fn numeric_comparison_operators() {
        for op in ["-eq", "-ne", "-lt", "-le", "-gt", "-ge"] {
            let tokens = [open(), word("1"), word(op), word("2"), close()];
            let success = parser().parse(&tokens, 0).unwrap();
            assert_matches!(
                expression_of(success.value),
                TestExpression::Binary { operator, .. } if operator == op
            );
        }
    }

    #[test]
    fn unary_file_test() {
        let tokens = [open(), word("-f"), word("/etc/passwd"), close()];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(expression_of(success.value), TestExpression::Unary { operator, operand } => {
            assert_eq!(operator, "-f");
            assert_eq!(operand, "/etc/passwd");
        });
    }

    #[test]
    fn bare_operand_tests_non_empty() {
        let tokens = [open(), kw(TokenKind::Variable, "x"), close()];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(expression_of(success.value), TestExpression::Unary { operator, operand } => {
            assert_eq!(operator, "-n");
            assert_eq!(operand, "$x");
        });
    }

    #[test]
    fn negation_wraps_expression() {
        let tokens = [open(), word("!"), word("-e"), word("file"), close()];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(expression_of(success.value), TestExpression::Negated { expression } => {
            assert_matches!(*expression, TestExpression::Unary { operator, .. } => {
                assert_eq!(operator, "-e");
            });
        });
    }

    #[test]
    fn string_operands_use_bare_content() {
        let tokens = [
            open(),
            kw(TokenKind::Variable, "s"), word("!="),
            kw(TokenKind::String, "ok").quoted(QuoteType::Double),
            close(),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(expression_of(success.value), TestExpression::Binary { right, .. } => {
            assert_eq!(right, "ok");
        });
    }

    #[test]
    fn compound_condition_collapses_to_binary() {
        // [[ -f "$f" && "$s" == "ok" ]] — the conjunction is kept as one
        // binary expression with the remainder joined.
        let tokens = [
            open(),
            word("-f"), kw(TokenKind::String, "$f").quoted(QuoteType::Double),
            word("&&"),
            kw(TokenKind::String, "$s").quoted(QuoteType::Double),
            word("=="), kw(TokenKind::String, "ok").quoted(QuoteType::Double),
            close(),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(expression_of(success.value), TestExpression::Binary { left, operator, right } => {
            assert_eq!(left, "-f");
            assert_eq!(operator, "$f");
            assert_eq!(right, "&& $s == ok");
        });
    }

    #[test]
    fn missing_close_is_an_error() {
        let tokens = [open(), word("-f"), word("x")];
        let failure = parser().parse(&tokens, 0).unwrap_err();
        assert_eq!(failure.kind, ErrorKind::MissingTerminator);
        assert!(failure.message.contains("`]]`"));
    }

    #[test]
    fn empty_expression_is_an_error() {
        let tokens = [open(), close()];
        let failure = parser().parse(&tokens, 0).unwrap_err();
        assert!(failure.message.contains("invalid test expression"));
    }

    #[test]
    fn regex_match_operator() {
        let tokens = [
            open(),
            kw(TokenKind::Variable, "line"), word("=~"), word("^[0-9]+$"),
            close(),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(
            expression_of(success.value),
            TestExpression::Binary { operator, .. } if operator == "=~"
        );
    }
}
