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

//! Syntax parser for the arithmetic command `(( ... ))`
//!
//! The expression is not evaluated; its tokens are collected up to the
//! closing `))`, tracking nested parentheses so `(1 + 2) * 3` does not end
//! the command early. The closing may also arrive as two separate `)`
//! tokens. The expression is stored as text, whitespace-normalized, with
//! variables `$`-prefixed.

use super::compound_command::trailing_redirects;
use super::core::{Parser, Success};
use super::error::{ErrorKind, Failure};
use crate::syntax::{ArithmeticEvaluation, Node, Redirect};
use crate::token::{Token, TokenKind};
use itertools::Itertools;

fn expression_text(tokens: &[Token]) -> String {
    let joined = tokens
        .iter()
        .map(|token| {
            if token.kind == TokenKind::Variable {
                format!("${}", token.value)
            } else {
                token.value.clone()
            }
        })
        .join(" ");
    joined.split_whitespace().join(" ")
}

/// Builds the arithmetic command parser.
pub(super) fn arithmetic_command(redirection: &Parser<Redirect>) -> Parser<Node> {
    let redirection = redirection.clone();
    Parser::new(move |tokens, start| {
        if !tokens
            .get(start)
            .is_some_and(|t| t.kind == TokenKind::DoubleLParen)
        {
            return Err(Failure::expected("`((`", tokens, start));
        }
        let mut position = start + 1;

        let mut expression_tokens: Vec<Token> = Vec::new();
        let mut paren_depth = 0i32;
        let mut closed = false;
        while let Some(token) = tokens.get(position) {
            match token.kind {
                TokenKind::DoubleRParen if paren_depth == 0 => break,
                TokenKind::LParen => paren_depth += 1,
                TokenKind::RParen => {
                    paren_depth -= 1;
                    if paren_depth < 0 {
                        // Two bare `)` tokens may close the command.
                        if tokens
                            .get(position + 1)
                            .is_some_and(|t| t.kind == TokenKind::RParen)
                        {
                            position += 2;
                            closed = true;
                            break;
                        }
                        return Err(Failure::new(
                            ErrorKind::UnexpectedToken,
                            "unbalanced parentheses in arithmetic command",
                            position,
                        ));
                    }
                }
                _ => {}
            }
            expression_tokens.push(token.clone());
            position += 1;
        }

        if !closed {
            match tokens.get(position) {
                Some(token) if token.kind == TokenKind::DoubleRParen => position += 1,
                _ => {
                    return Err(Failure::new(
                        ErrorKind::MissingTerminator,
                        "expected `))` to close arithmetic command",
                        position,
                    ));
                }
            }
        }

        let (redirects, background, position) = trailing_redirects(&redirection, tokens, position);

        Ok(Success {
            value: Node::ArithmeticEvaluation(ArithmeticEvaluation {
                expression: expression_text(&expression_tokens),
                redirects,
                background,
            }),
            position,
        })
    })
}
