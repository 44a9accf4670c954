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

//! Syntax parser for the if command

use super::compound_command::{StatementGrammar, skip_separator, trailing_redirects};
use super::core::{ParseResult, Parser, Success};
use super::error::{ErrorKind, Failure};
use crate::keyword::{Keyword, matches_keyword};
use crate::syntax::{CommandList, IfConditional, Node, Redirect};
use crate::token::Token;

/// Parses one condition plus `then` body pair, shared by the `if` head and
/// every `elif` clause.
///
/// The condition runs up to `then`; when the condition is non-empty, a `;` or
/// newline must separate it from the `then`. The body runs up to the `elif`,
/// `else`, or `fi` that belongs to this if command, skipping over nested if
/// commands.
fn condition_then(
    grammar: &StatementGrammar,
    tokens: &[Token],
    start: usize,
) -> ParseResult<(CommandList, CommandList)> {
    let mut position = start;
    let mut condition_tokens: Vec<Token> = Vec::new();
    let mut saw_separator = false;

    while position < tokens.len() {
        let token = &tokens[position];
        if matches_keyword(token, Keyword::Then) {
            if !condition_tokens.is_empty() && !saw_separator {
                return Err(Failure::new(
                    ErrorKind::UnexpectedToken,
                    "expected `;` or newline before `then`",
                    position,
                ));
            }
            break;
        }
        if token.kind.is_separator() {
            saw_separator = true;
            if let Some(next) = tokens.get(position + 1) {
                if matches_keyword(next, Keyword::Then) {
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
            "expected `then` in if command",
            position,
        ));
    }
    position = skip_separator(tokens, position);
    if !tokens
        .get(position)
        .is_some_and(|t| matches_keyword(t, Keyword::Then)) {
        return Err(Failure::new(
            ErrorKind::MissingKeyword,
            "expected `then` in if command",
            position,
        ));
    }
    let condition = grammar.parse_sub_list(&condition_tokens, start, "in if condition")?;

    position += 1; // past `then`
    position = skip_separator(tokens, position);

    let body_start = position;
    let mut body_tokens: Vec<Token> = Vec::new();
    let mut nesting = 0u32;
    while position < tokens.len() {
        let token = &tokens[position];
        if matches_keyword(token, Keyword::If) {
            nesting += 1;
        } else if matches_keyword(token, Keyword::Elif)
            || matches_keyword(token, Keyword::Else)
            || matches_keyword(token, Keyword::Fi)
        {
            if nesting == 0 {
                break;
            }
            if matches_keyword(token, Keyword::Fi) {
                nesting -= 1;
            }
        }
        body_tokens.push(token.clone());
        position += 1;
    }
    let body = grammar.parse_sub_list(&body_tokens, body_start, "in then body")?;

    Ok(Success {
        value: (condition, body),
        position,
    })
}

/// Builds the if command parser.
pub(super) fn if_command(
    grammar: &StatementGrammar,
    redirection: &Parser<Redirect>,
) -> Parser<Node> {
    let grammar = grammar.clone();
    let redirection = redirection.clone();
    Parser::new(move |tokens, start| {
        if !tokens
            .get(start)
            .is_some_and(|t| matches_keyword(t, Keyword::If)) {
            return Err(Failure::expected("`if`", tokens, start));
        }
        let mut position = start + 1;

        let head = condition_then(&grammar, tokens, position)?;
        let (condition, then_part) = head.value;
        position = head.position;

        let mut elif_parts = Vec::new();
        while tokens
            .get(position)
            .is_some_and(|t| matches_keyword(t, Keyword::Elif))
        {
            position += 1;
            let clause = condition_then(&grammar, tokens, position)?;
            elif_parts.push(clause.value);
            position = clause.position;
        }

        let mut else_part = None;
        if tokens
            .get(position)
            .is_some_and(|t| matches_keyword(t, Keyword::Else))
        {
            position += 1;
            position = skip_separator(tokens, position);
            let else_start = position;
            let mut else_tokens: Vec<Token> = Vec::new();
            let mut nesting = 0u32;
            while position < tokens.len() {
                let token = &tokens[position];
                if matches_keyword(token, Keyword::If) {
                    nesting += 1;
                } else if matches_keyword(token, Keyword::Fi) {
                    if nesting == 0 {
                        break;
                    }
                    nesting -= 1;
                }
                else_tokens.push(token.clone());
                position += 1;
            }
            else_part = Some(grammar.parse_sub_list(&else_tokens, else_start, "in else body")?);
        }

        match tokens.get(position) {
            Some(token) if matches_keyword(token, Keyword::Fi) => position += 1,
            Some(_) => {
                return Err(Failure::new(
                    ErrorKind::MissingTerminator,
                    "expected `fi` to close if command",
                    position,
                ));
            }
            None => {
                return Err(Failure::new(
                    ErrorKind::EndOfInput,
                    "expected `fi` to close if command",
                    position,
                ));
            }
        }

        let (redirects, background, position) = trailing_redirects(&redirection, tokens, position);

        Ok(Success {
            value: Node::IfConditional(IfConditional {
                condition,
                then_part,
                elif_parts,
                else_part,
                redirects,
                background,
            }),
            position,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::testing::{control_grammar, kw, semi, word};
    use crate::syntax::RedirOp;
    use crate::token::TokenKind;
    use assert_matches::assert_matches;

    fn parser() -> Parser<Node> {
        let (grammar, redirection) = control_grammar();
        if_command(&grammar, &redirection)
    }

    fn args_of(list: &CommandList) -> Vec<String> {
        let mut all = Vec::new();
        for statement in &list.statements {
            if let Node::AndOrList(and_or) = statement {
                if let Node::Pipeline(p) = &and_or.pipelines[0] {
                    if let Node::SimpleCommand(c) = &p.commands[0] {
                        all.extend(c.args.clone());
                    }
                }
            }
        }
        all
    }

    #[test]
    fn minimum_if_command() {
        let tokens = [word("if"), word("a"), semi(), word("then"), word("b"), semi(), word("fi")];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::IfConditional(cond) => {
            assert_eq!(args_of(&cond.condition), ["a"]);
            assert_eq!(args_of(&cond.then_part), ["b"]);
            assert_eq!(cond.elif_parts, []);
            assert_eq!(cond.else_part, None);
            assert!(!cond.background);
        });
        assert_eq!(success.position, 7);
    }

    #[test]
    fn if_with_elif_and_else() {
        let tokens = [
            word("if"), word("a"), semi(), word("then"), word("b"), semi(),
            word("elif"), word("c"), semi(), word("then"), word("d"), semi(),
            word("else"), word("e"), semi(), word("fi"),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::IfConditional(cond) => {
            assert_eq!(cond.elif_parts.len(), 1);
            assert_eq!(args_of(&cond.elif_parts[0].0), ["c"]);
            assert_eq!(args_of(&cond.elif_parts[0].1), ["d"]);
            assert_eq!(args_of(&cond.else_part.unwrap()), ["e"]);
        });
    }

    #[test]
    fn nested_if_in_then_body() {
        let tokens = [
            word("if"), word("a"), semi(), word("then"),
            word("if"), word("b"), semi(), word("then"), word("c"), semi(), word("fi"), semi(),
            word("fi"),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::IfConditional(cond) => {
            assert_eq!(cond.then_part.statements.len(), 1);
            assert_matches!(&cond.then_part.statements[0], Node::IfConditional(inner) => {
                assert_eq!(args_of(&inner.then_part), ["c"]);
            });
        });
    }

    #[test]
    fn typed_keyword_tokens_parse_identically() {
        let as_words = [
            word("if"), word("a"), semi(), word("then"), word("b"), semi(), word("fi"),
        ];
        let as_kinds = [
            kw(TokenKind::If, "if"), word("a"), semi(), kw(TokenKind::Then, "then"),
            word("b"), semi(), kw(TokenKind::Fi, "fi"),
        ];
        let from_words = parser().parse(&as_words, 0).unwrap();
        let from_kinds = parser().parse(&as_kinds, 0).unwrap();
        assert_eq!(from_words.value, from_kinds.value);
    }

    #[test]
    fn missing_separator_before_then() {
        let tokens = [word("if"), word("a"), word("then"), word("b"), semi(), word("fi")];
        let failure = parser().parse(&tokens, 0).unwrap_err();
        assert_eq!(failure.kind, ErrorKind::UnexpectedToken);
        assert!(failure.message.contains("before `then`"));
        assert_eq!(failure.position, 2);
    }

    #[test]
    fn missing_then() {
        let tokens = [word("if"), word("a"), semi(), word("fi")];
        let failure = parser().parse(&tokens, 0).unwrap_err();
        assert_eq!(failure.kind, ErrorKind::EndOfInput);
        assert!(failure.message.contains("`then`"));
    }

    #[test]
    fn missing_fi() {
        let tokens = [word("if"), word("a"), semi(), word("then"), word("b")];
        let failure = parser().parse(&tokens, 0).unwrap_err();
        assert_eq!(failure.kind, ErrorKind::EndOfInput);
        assert!(failure.message.contains("`fi`"));
    }

    #[test]
    fn trailing_redirects_and_background() {
        let tokens = [
            word("if"), word("a"), semi(), word("then"), word("b"), semi(), word("fi"),
            kw(TokenKind::RedirectOut, ">"), word("log"),
            kw(TokenKind::Ampersand, "&"),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::IfConditional(cond) => {
            assert_eq!(cond.redirects.len(), 1);
            assert_eq!(cond.redirects[0].r#type, RedirOp::Out);
            assert!(cond.background);
        });
        assert_eq!(success.position, 10);
    }

    #[test]
    fn not_an_if_command() {
        let failure = parser().parse(&[word("echo")], 0).unwrap_err();
        assert_eq!(failure.kind, ErrorKind::UnexpectedToken);
    }
}
