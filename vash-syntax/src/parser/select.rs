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

//! Syntax parser for the select loop

use super::compound_command::{StatementGrammar, trailing_redirects};
use super::core::{Parser, Success};
use super::error::{ErrorKind, Failure};
use super::for_loop::{collect_items, do_body_done};
use crate::keyword::{Keyword, matches_keyword};
use crate::syntax::{Node, Redirect, SelectLoop};
use crate::token::TokenKind;

/// Builds the select loop parser.
pub(super) fn select_loop(
    grammar: &StatementGrammar,
    redirection: &Parser<Redirect>,
) -> Parser<Node> {
    let grammar = grammar.clone();
    let redirection = redirection.clone();
    Parser::new(move |tokens, start| {
        if !tokens
            .get(start)
            .is_some_and(|t| matches_keyword(t, Keyword::Select)) {
            return Err(Failure::expected("`select`", tokens, start));
        }
        let mut position = start + 1;

        let Some(name) = tokens.get(position).filter(|t| t.kind == TokenKind::Word) else {
            return Err(Failure::new(
                ErrorKind::UnexpectedToken,
                "expected variable name after `select`",
                position,
            ));
        };
        let variable = name.value.clone();
        position += 1;

        if !tokens
            .get(position)
            .is_some_and(|t| matches_keyword(t, Keyword::In)) {
            return Err(Failure::new(
                ErrorKind::MissingKeyword,
                "expected `in` after select variable",
                position,
            ));
        }
        position += 1;

        let (items, item_quote_types, after_items) = collect_items(tokens, position);
        let body = do_body_done(&grammar, tokens, after_items, "select")?;
        let (redirects, background, position) =
            trailing_redirects(&redirection, tokens, body.position);

        Ok(Success {
            value: Node::SelectLoop(SelectLoop {
                variable,
                items,
                item_quote_types,
                body: body.value,
                redirects,
                background,
            }),
            position,
        })
    })
}
