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

//! Syntax parsers for subshell and brace groups

use super::compound_command::{StatementGrammar, trailing_redirects};
use super::core::{Parser, Success, between};
use super::tokens::TokenParsers;
use crate::syntax::{BraceGroup, Node, Redirect, SubshellGroup};
use std::rc::Rc;

/// Builds the `( ... )` subshell group parser.
pub(super) fn subshell_group(
    token_parsers: &Rc<TokenParsers>,
    grammar: &StatementGrammar,
    redirection: &Parser<Redirect>,
) -> Parser<Node> {
    let inner = between(
        &token_parsers.lparen,
        &token_parsers.rparen,
        &grammar.statement_list,
    );
    let redirection = redirection.clone();
    Parser::new(move |tokens, start| {
        let statements = inner.parse(tokens, start)?;
        let (redirects, background, position) =
            trailing_redirects(&redirection, tokens, statements.position);
        Ok(Success {
            value: Node::SubshellGroup(SubshellGroup {
                statements: statements.value,
                redirects,
                background,
            }),
            position,
        })
    })
}

/// Builds the `{ ... }` brace group parser.
pub(super) fn brace_group(
    token_parsers: &Rc<TokenParsers>,
    grammar: &StatementGrammar,
    redirection: &Parser<Redirect>,
) -> Parser<Node> {
    let inner = between(
        &token_parsers.lbrace,
        &token_parsers.rbrace,
        &grammar.statement_list,
    );
    let redirection = redirection.clone();
    Parser::new(move |tokens, start| {
        let statements = inner.parse(tokens, start)?;
        let (redirects, background, position) =
            trailing_redirects(&redirection, tokens, statements.position);
        Ok(Success {
            value: Node::BraceGroup(BraceGroup {
                statements: statements.value,
                redirects,
                background,
            }),
            position,
        })
    })
}
