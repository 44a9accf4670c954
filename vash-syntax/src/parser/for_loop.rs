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

//! Syntax parsers for the for loop, traditional and C-style
//!
//! The C-style form is selected by the `((` following `for`; otherwise the
//! traditional form applies. A traditional loop without `in ...` iterates
//! over `"$@"`.

use super::compound_command::{StatementGrammar, collect_until, skip_separator};
use super::core::{ParseResult, Parser, Success};
use super::error::{ErrorKind, Failure};
use super::word::format_token_value;
use crate::keyword::{Keyword, matches_keyword};
use crate::syntax::{CStyleForLoop, CommandList, ForLoop, Node};
use crate::token::{QuoteType, Token, TokenKind};
use enumset::{EnumSet, enum_set};
use itertools::Itertools;

/// Kinds accepted as items of a `for` or `select` word list
pub(super) const ITEM_KINDS: EnumSet<TokenKind> = enum_set!(
    TokenKind::Word
        | TokenKind::String
        | TokenKind::Variable
        | TokenKind::CommandSub
        | TokenKind::CommandSubBacktick
        | TokenKind::ArithExpansion
        | TokenKind::ParamExpansion
);

/// Collects the word list between `in` and `do`, recording quote provenance.
pub(super) fn collect_items(
    tokens: &[Token],
    start: usize,
) -> (Vec<String>, Vec<Option<QuoteType>>, usize) {
    let mut items = Vec::new();
    let mut quote_types = Vec::new();
    let mut position = start;
    while let Some(token) = tokens.get(position) {
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
        if !ITEM_KINDS.contains(token.kind) {
            break;
        }
        items.push(format_token_value(token));
        quote_types.push(token.quote_type);
        position += 1;
    }
    (items, quote_types, position)
}

/// Parses `do <body>; done` and returns the body and the position after
/// `done`.
pub(super) fn do_body_done(
    grammar: &StatementGrammar,
    tokens: &[Token],
    start: usize,
    loop_name: &str,
) -> ParseResult<CommandList> {
    let mut position = skip_separator(tokens, start);
    if !tokens
        .get(position)
        .is_some_and(|t| matches_keyword(t, Keyword::Do)) {
        return Err(Failure::new(
            ErrorKind::MissingKeyword,
            format!("expected `do` in {loop_name} loop"),
            position,
        ));
    }
    position += 1;
    position = skip_separator(tokens, position);

    let body_start = position;
    let (body_tokens, done_position) =
        collect_until(tokens, position, Keyword::Done, Some(Keyword::Do));
    if done_position >= tokens.len() {
        return Err(Failure::new(
            ErrorKind::EndOfInput,
            format!("expected `done` to close {loop_name} loop"),
            done_position,
        ));
    }
    let body = grammar.parse_sub_list(&body_tokens, body_start, &format!("in {loop_name} body"))?;
    Ok(Success {
        value: body,
        position: done_position + 1,
    })
}

fn traditional_for(grammar: StatementGrammar) -> Parser<Node> {
    Parser::new(move |tokens, start| {
        if !tokens
            .get(start)
            .is_some_and(|t| matches_keyword(t, Keyword::For)) {
            return Err(Failure::expected("`for`", tokens, start));
        }
        let mut position = start + 1;

        let Some(name) = tokens.get(position).filter(|t| t.kind == TokenKind::Word) else {
            return Err(Failure::new(
                ErrorKind::UnexpectedToken,
                "expected variable name after `for`",
                position,
            ));
        };
        let variable = name.value.clone();
        position += 1;

        while tokens
            .get(position)
            .is_some_and(|t| t.kind == TokenKind::Newline)
        {
            position += 1;
        }

        let (items, item_quote_types, after_items) = if tokens
            .get(position)
            .is_some_and(|t| matches_keyword(t, Keyword::In))
        {
            position += 1;
            while tokens
                .get(position)
                .is_some_and(|t| t.kind == TokenKind::Newline)
            {
                position += 1;
            }
            collect_items(tokens, position)
        } else {
            // No word list: iterate over the positional parameters.
            (vec!["$@".to_string()], vec![Some(QuoteType::Double)], position)
        };

        let body = do_body_done(&grammar, tokens, after_items, "for")?;
        Ok(Success {
            value: Node::ForLoop(ForLoop {
                variable,
                items,
                item_quote_types,
                body: body.value,
            }),
            position: body.position,
        })
    })
}

fn c_style_for(grammar: StatementGrammar) -> Parser<Node> {
    Parser::new(move |tokens, start| {
        if !tokens
            .get(start)
            .is_some_and(|t| matches_keyword(t, Keyword::For)) {
            return Err(Failure::expected("`for`", tokens, start));
        }
        if !tokens
            .get(start + 1)
            .is_some_and(|t| t.kind == TokenKind::DoubleLParen || t.value == "((")
        {
            return Err(Failure::new(
                ErrorKind::UnexpectedToken,
                "not a C-style for loop",
                start,
            ));
        }
        let mut position = start + 2;

        let mut slots: [Vec<Token>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for (index, slot) in slots.iter_mut().enumerate() {
            let last = index == 2;
            loop {
                let Some(token) = tokens.get(position) else {
                    let expectation = if last {
                        "expected `))` to close C-style for loop"
                    } else {
                        "expected `;` in C-style for loop header"
                    };
                    return Err(Failure::new(ErrorKind::EndOfInput, expectation, position));
                };
                let closes = if last {
                    token.kind == TokenKind::DoubleRParen || token.value == "))"
                } else {
                    token.kind == TokenKind::Semicolon || token.value == ";"
                };
                if closes {
                    position += 1;
                    break;
                }
                slot.push(token.clone());
                position += 1;
            }
        }

        let body = do_body_done(&grammar, tokens, position, "for")?;
        let [init, condition, update] = slots;
        Ok(Success {
            value: Node::CStyleForLoop(CStyleForLoop {
                init_expr: join_expression(init),
                condition_expr: join_expression(condition),
                update_expr: join_expression(update),
                body: body.value,
            }),
            position: body.position,
        })
    })
}

fn join_expression(tokens: Vec<Token>) -> Option<String> {
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.iter().map(|t| t.value.as_str()).join(" "))
    }
}

/// Builds the for loop parser; the C-style form is tried first when enabled.
pub(super) fn for_loop(grammar: &StatementGrammar, c_style_enabled: bool) -> Parser<Node> {
    let traditional = traditional_for(grammar.clone());
    if c_style_enabled {
        c_style_for(grammar.clone()).or_else(&traditional)
    } else {
        traditional
    }
}
