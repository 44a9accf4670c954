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

//! Syntax parser for statement lists
//!
//! A statement list is any number of statements with optional separator runs
//! before, between, and after them. It never fails; an input that starts with
//! something other than a statement yields an empty list, which the driver
//! then rejects as an unconsumed-token error.

use super::core::{Parser, many, many1, optional};
use super::tokens::TokenParsers;
use crate::syntax::{CommandList, Node};
use std::rc::Rc;

/// Builds the statement list parser over the given statement parser.
pub(super) fn statement_list(
    statement: &Parser<Node>,
    token_parsers: &Rc<TokenParsers>,
) -> Parser<CommandList> {
    let separators = many1(&token_parsers.statement_terminator);
    let entry = optional(&separators)
        .then(statement)
        .then(&optional(&separators))
        .map(|((_, statement), _)| statement);
    many(&entry).map(|statements| CommandList { statements })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::parser::and_or::and_or_list;
    use crate::parser::pipeline::pipeline;
    use crate::parser::simple_command::simple_command;
    use crate::token::{Token, TokenKind};
    use assert_matches::assert_matches;

    fn tok(kind: TokenKind, value: &str) -> Token {
        Token::new(kind, value, 0)
    }

    fn parser() -> Parser<CommandList> {
        let token_parsers = Rc::new(TokenParsers::new());
        let element = simple_command(&token_parsers, &ParserConfig::default());
        let pipeline = pipeline(&element, &token_parsers);
        let statement = and_or_list(&pipeline, &token_parsers);
        statement_list(&statement, &token_parsers)
    }

    #[test]
    fn statements_separated_by_semicolons() {
        let tokens = [
            tok(TokenKind::Word, "a"),
            tok(TokenKind::Semicolon, ";"),
            tok(TokenKind::Word, "b"),
            tok(TokenKind::Newline, "\n"),
            tok(TokenKind::Word, "c"),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_eq!(success.value.statements.len(), 3);
        assert_eq!(success.position, 5);
    }

    #[test]
    fn leading_and_trailing_separators_are_consumed() {
        let tokens = [
            tok(TokenKind::Newline, "\n"),
            tok(TokenKind::Word, "a"),
            tok(TokenKind::Semicolon, ";"),
            tok(TokenKind::Newline, "\n"),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_eq!(success.value.statements.len(), 1);
        assert_eq!(success.position, 4);
    }

    #[test]
    fn empty_input_yields_empty_list() {
        let success = parser().parse(&[], 0).unwrap();
        assert_eq!(success.value.statements, []);
        assert_eq!(success.position, 0);
    }

    #[test]
    fn stops_before_unparsable_input() {
        let tokens = [
            tok(TokenKind::Word, "a"),
            tok(TokenKind::Semicolon, ";"),
            tok(TokenKind::RParen, ")"),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_eq!(success.value.statements.len(), 1);
        assert_eq!(success.position, 2);
    }

    #[test]
    fn statements_keep_source_order() {
        let tokens = [
            tok(TokenKind::Word, "first"),
            tok(TokenKind::Semicolon, ";"),
            tok(TokenKind::Word, "second"),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(&success.value.statements[0], Node::AndOrList(list) => {
            assert_matches!(&list.pipelines[0], Node::Pipeline(p) => {
                assert_matches!(&p.commands[0], Node::SimpleCommand(c) => {
                    assert_eq!(c.args, ["first"]);
                });
            });
        });
    }
}
