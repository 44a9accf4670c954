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

//! Single-token recognizers
//!
//! One prebuilt parser per token kind the grammar cares about, plus the
//! composite recognizers (`word_like`, `redirect_operator`,
//! `statement_terminator`, the logical operators) that the command layers
//! share.

use super::core::{Parser, Success, token};
use super::error::Failure;
use crate::token::{Token, TokenKind};
use enumset::EnumSet;

/// Parser that accepts any token whose kind is in the given set.
fn token_in(set: EnumSet<TokenKind>, what: &'static str) -> Parser<Token> {
    Parser::new(move |tokens, position| match tokens.get(position) {
        Some(t) if set.contains(t.kind) => Ok(Success {
            value: t.clone(),
            position: position + 1,
        }),
        _ => Err(Failure::expected(what, tokens, position)),
    })
}

/// Registry of single-token parsers
pub(super) struct TokenParsers {
    pub pipe: Parser<Token>,
    pub ampersand: Parser<Token>,
    pub exclamation: Parser<Token>,
    pub lparen: Parser<Token>,
    pub rparen: Parser<Token>,
    pub lbrace: Parser<Token>,
    pub rbrace: Parser<Token>,
    /// `;` or newline
    pub statement_terminator: Parser<Token>,
    /// Any token that can serve as a command word
    pub word_like: Parser<Token>,
    /// Any redirection operator
    pub redirect_operator: Parser<Token>,
    /// `&&` or `||`
    pub logical_operator: Parser<Token>,
}

impl TokenParsers {
    pub fn new() -> Self {
        TokenParsers {
            pipe: token(TokenKind::Pipe),
            ampersand: token(TokenKind::Ampersand),
            exclamation: token(TokenKind::Exclamation),
            lparen: token(TokenKind::LParen),
            rparen: token(TokenKind::RParen),
            lbrace: token(TokenKind::LBrace),
            rbrace: token(TokenKind::RBrace),
            statement_terminator: token_in(TokenKind::SEPARATORS, "`;` or newline"),
            word_like: token_in(TokenKind::WORD_LIKE, "a word"),
            redirect_operator: token_in(
                TokenKind::REDIRECT_OPERATORS,
                "a redirection operator",
            ),
            logical_operator: token_in(
                TokenKind::AndIf | TokenKind::OrIf,
                "`&&` or `||`",
            ),
        }
    }
}
