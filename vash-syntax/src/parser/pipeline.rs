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

//! Syntax parser for pipelines
//!
//! A pipeline is an optional `!` followed by commands separated by `|`. A
//! single non-negated command that is a compound form is returned bare, never
//! wrapped in a singleton [`Pipeline`].

use super::core::{Parser, Success, optional, separated_by};
use super::tokens::TokenParsers;
use crate::syntax::{Node, Pipeline};
use std::rc::Rc;

/// Builds the pipeline parser over the given command-element parser.
pub(super) fn pipeline(element: &Parser<Node>, token_parsers: &Rc<TokenParsers>) -> Parser<Node> {
    let inner = separated_by(element, &token_parsers.pipe);
    let negation = optional(&token_parsers.exclamation);
    Parser::new(move |tokens, start| {
        let bang = negation.parse(tokens, start)?;
        let negated = bang.value.is_some();
        let position = bang.position;

        let commands = inner.parse(tokens, position)?;
        let mut commands_value = commands.value;
        if !negated && commands_value.len() == 1 && commands_value[0].is_compound() {
            return Ok(Success {
                value: commands_value.remove(0),
                position: commands.position,
            });
        }
        Ok(Success {
            value: Node::Pipeline(Pipeline {
                commands: commands_value,
                negated,
            }),
            position: commands.position,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::parser::simple_command::simple_command;
    use crate::syntax::{CommandList, SubshellGroup};
    use crate::token::{Token, TokenKind};
    use assert_matches::assert_matches;

    fn tok(kind: TokenKind, value: &str) -> Token {
        Token::new(kind, value, 0)
    }

    fn parser() -> Parser<Node> {
        let token_parsers = Rc::new(TokenParsers::new());
        let element = simple_command(&token_parsers, &ParserConfig::default());
        pipeline(&element, &token_parsers)
    }

    #[test]
    fn single_command_still_wraps_in_pipeline() {
        let tokens = [tok(TokenKind::Word, "ls")];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::Pipeline(p) => {
            assert_eq!(p.commands.len(), 1);
            assert!(!p.negated);
        });
    }

    #[test]
    fn commands_separated_by_pipes() {
        let tokens = [
            tok(TokenKind::Word, "ls"),
            tok(TokenKind::Pipe, "|"),
            tok(TokenKind::Word, "sort"),
            tok(TokenKind::Pipe, "|"),
            tok(TokenKind::Word, "uniq"),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::Pipeline(p) => {
            assert_eq!(p.commands.len(), 3);
        });
        assert_eq!(success.position, 5);
    }

    #[test]
    fn leading_bang_negates() {
        let tokens = [tok(TokenKind::Exclamation, "!"), tok(TokenKind::Word, "false")];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::Pipeline(p) => {
            assert!(p.negated);
            assert_eq!(p.commands.len(), 1);
        });
    }

    #[test]
    fn lone_compound_is_returned_bare() {
        let element: Parser<Node> = Parser::new(|_, position| {
            Ok(Success {
                value: Node::SubshellGroup(SubshellGroup {
                    statements: CommandList::default(),
                    redirects: vec![],
                    background: false,
                }),
                position: position + 1,
            })
        });
        let token_parsers = Rc::new(TokenParsers::new());
        let parser = pipeline(&element, &token_parsers);
        let tokens = [tok(TokenKind::LParen, "(")];
        let success = parser.parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::SubshellGroup(_));
    }

    #[test]
    fn negated_compound_stays_wrapped() {
        let element: Parser<Node> = Parser::new(|_, position| {
            Ok(Success {
                value: Node::SubshellGroup(SubshellGroup {
                    statements: CommandList::default(),
                    redirects: vec![],
                    background: false,
                }),
                position: position + 1,
            })
        });
        let token_parsers = Rc::new(TokenParsers::new());
        let parser = pipeline(&element, &token_parsers);
        let tokens = [tok(TokenKind::Exclamation, "!"), tok(TokenKind::LParen, "(")];
        let success = parser.parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::Pipeline(p) => {
            assert!(p.negated);
            assert_matches!(&p.commands[0], Node::SubshellGroup(_));
        });
    }
}
