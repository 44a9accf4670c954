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

//! Shared helpers for the parser test modules

use super::compound_command::StatementGrammar;
use super::core::Parser;
use super::grammar::Grammar;
use super::redir;
use super::tokens::TokenParsers;
use crate::config::ParserConfig;
use crate::syntax::Redirect;
use crate::token::{Token, TokenKind};
use std::rc::Rc;

pub(super) fn word(value: &str) -> Token {
    Token::new(TokenKind::Word, value, 0)
}

pub(super) fn kw(kind: TokenKind, value: &str) -> Token {
    Token::new(kind, value, 0)
}

pub(super) fn semi() -> Token {
    Token::new(TokenKind::Semicolon, ";", 0)
}

pub(super) fn newline() -> Token {
    Token::new(TokenKind::Newline, "\n", 0)
}

/// Builds the fully wired statement grammar plus a redirection parser, for
/// testing individual compound-command parsers in isolation.
pub(super) fn control_grammar() -> (StatementGrammar, Parser<Redirect>) {
    let grammar = Grammar::new(&ParserConfig::default());
    let statement_grammar = StatementGrammar {
        statement: grammar.statement.clone(),
        statement_list: grammar.statement_list.clone(),
    };
    let redirection = redir::redirection(&Rc::new(TokenParsers::new()));
    (statement_grammar, redirection)
}
