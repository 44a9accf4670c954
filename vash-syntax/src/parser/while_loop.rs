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

//! Syntax parsers for while and until loops

use super::compound_command::{StatementGrammar, collect_until, skip_separator};
use super::core::{ParseResult, Parser, Success};
use super::error::{ErrorKind, Failure};
use crate::keyword::{Keyword, matches_keyword};
use crate::syntax::{CommandList, Node, UntilLoop, WhileLoop};
use crate::token::Token;

/// Parses the common `<condition>; do <body>; done` tail of both loop forms.
///
/// Returns the condition, the body, and the position after `done`.
fn condition_do_done(
    grammar: &StatementGrammar,
    tokens: &[Token],
    start: usize,
    loop_name: &str,
) -> ParseResult<(CommandList, CommandList)> {
    let mut position = start;
    let mut condition_tokens: Vec<Token> = Vec::new();

    while position < tokens.len() {
        let token = &tokens[position];
        if matches_keyword(token, Keyword::Do) {
            break;
        }
        if token.kind.is_separator() {
            if let Some(next) = tokens.get(position + 1) {
                if matches_keyword(next, Keyword::Do) {
                    break;
                }
            }
        }
        condition_tokens.push(token.clone());
        position += 1;
    }

    if position >= tokens.len() {
        return Err(Failure::new(
            ErrorKind::EndOfInput,
            format!("expected `do` in {loop_name} loop"),
            position,
        ));
    }

    let condition = grammar.parse_sub_list(
        &condition_tokens,
        start,
        &format!("in {loop_name} condition"),
    )?;

    position = skip_separator(tokens, position);
    if !tokens
        .get(position)
        .is_some_and(|t| matches_keyword(t, Keyword::Do)) {
        return Err(Failure::new(
            ErrorKind::MissingKeyword,
            format!("expected `do` after {loop_name} condition"),
            position,
        ));
    }
    position += 1;
    position = skip_separator(tokens, position);

    let body_start = position;
    let (body_tokens, done_position) = collect_until(tokens, position, Keyword::Done, Some(Keyword::Do));
    if done_position >= tokens.len() {
        return Err(Failure::new(
            ErrorKind::EndOfInput,
            format!("expected `done` to close {loop_name} loop"),
            done_position,
        ));
    }
    let body = grammar.parse_sub_list(&body_tokens, body_start, &format!("in {loop_name} body"))?;

    Ok(Success {
        value: (condition, body),
        position: done_position + 1,
    })
}

/// Builds the while loop parser.
pub(super) fn while_loop(grammar: &StatementGrammar) -> Parser<Node> {
    let grammar = grammar.clone();
    Parser::new(move |tokens, start| {
        if !tokens
            .get(start)
            .is_some_and(|t| matches_keyword(t, Keyword::While)) {
            return Err(Failure::expected("`while`", tokens, start));
        }
        let tail = condition_do_done(&grammar, tokens, start + 1, "while")?;
        let (condition, body) = tail.value;
        Ok(Success {
            value: Node::WhileLoop(WhileLoop { condition, body }),
            position: tail.position,
        })
    })
}

/// Builds the until loop parser.
pub(super) fn until_loop(grammar: &StatementGrammar) -> Parser<Node> {
    let grammar = grammar.clone();
    Parser::new(move |tokens, start| {
        if !tokens
            .get(start)
            .is_some_and(|t| matches_keyword(t, Keyword::Until)) {
            return Err(Failure::expected("`until`", tokens, start));
        }
        let tail = condition_do_done(&grammar, tokens, start + 1, "until")?;
        let (condition, body) = tail.value;
        Ok(Success {
            value: Node::UntilLoop(UntilLoop { condition, body }),
            position: tail.position,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::testing::{control_grammar, newline, semi, word};
    use assert_matches::assert_matches;

    fn while_parser() -> Parser<Node> {
        let (grammar, _) = control_grammar();
        while_loop(&grammar)
    }

    #[test]
    fn minimum_while_loop() {
        let tokens = [
            word("while"), word("true"), semi(), word("do"),
            word("echo"), word("hi"), semi(), word("done"),
        ];
        let success = while_parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::WhileLoop(w) => {
            assert_eq!(w.condition.statements.len(), 1);
            assert_eq!(w.body.statements.len(), 1);
        });
        assert_eq!(success.position, 8);
    }

    #[test]
    fn newline_separators() {
        let tokens = [
            word("while"), word("true"), newline(), word("do"), newline(),
            word("work"), newline(), word("done"),
        ];
        let success = while_parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::WhileLoop(_));
        assert_eq!(success.position, 8);
    }

    #[test]
    fn nested_loops_close_correctly() {
        let tokens = [
            word("while"), word("a"), semi(), word("do"),
            word("while"), word("b"), semi(), word("do"), word("c"), semi(), word("done"), semi(),
            word("done"),
        ];
        let success = while_parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::WhileLoop(outer) => {
            assert_matches!(&outer.body.statements[0], Node::WhileLoop(inner) => {
                assert_eq!(inner.body.statements.len(), 1);
            });
        });
        assert_eq!(success.position, 13);
    }

    #[test]
    fn until_loop_parses() {
        let (grammar, _) = control_grammar();
        let tokens = [
            word("until"), word("false"), semi(), word("do"), word("x"), semi(), word("done"),
        ];
        let success = until_loop(&grammar).parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::UntilLoop(u) => {
            assert_eq!(u.condition.statements.len(), 1);
        });
    }

    #[test]
    fn missing_do_is_an_error() {
        let tokens = [word("while"), word("true"), semi(), word("echo")];
        let failure = while_parser().parse(&tokens, 0).unwrap_err();
        assert_eq!(failure.kind, ErrorKind::EndOfInput);
        assert!(failure.message.contains("`do`"));
    }

    #[test]
    fn missing_done_is_an_error() {
        let tokens = [word("while"), word("a"), semi(), word("do"), word("b")];
        let failure = while_parser().parse(&tokens, 0).unwrap_err();
        assert_eq!(failure.kind, ErrorKind::EndOfInput);
        assert!(failure.message.contains("`done`"));
    }
}
