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

//! Shared machinery for compound commands
//!
//! The control structures capture their bodies with a uniform algorithm:
//! scan forward to the closing keyword, counting nested openers, then
//! re-parse the captured slice as a statement list. This module holds that
//! machinery, the trailing-redirect capture that several constructs share,
//! the small `break`/`continue` parsers, and the combined control-structure
//! alternative.

use super::core::{Parser, Success};
use super::error::{ErrorKind, Failure};
use super::redir;
use super::tokens::TokenParsers;
use super::{case, for_loop, grouping, r#if, select, while_loop};
use crate::config::ParserConfig;
use crate::keyword::{Keyword, matches_keyword};
use crate::syntax::{BreakStatement, CommandList, ContinueStatement, Node, Redirect};
use crate::token::{Token, TokenKind};
use std::rc::Rc;

/// Handles to the cyclic statement grammar
///
/// Compound commands re-parse their captured bodies through these handles,
/// which are forward references resolved after the whole grammar is built.
#[derive(Clone)]
pub(super) struct StatementGrammar {
    pub statement: Parser<Node>,
    pub statement_list: Parser<CommandList>,
}

impl StatementGrammar {
    /// Re-parses a captured token slice as a statement list.
    ///
    /// The slice must be consumed completely. When it is not, the stuck
    /// position is re-parsed as a single statement to surface the inner
    /// diagnostic, and the failure is reported at `sub_start` plus the
    /// offset into the slice.
    pub fn parse_sub_list(
        &self,
        sub: &[Token],
        sub_start: usize,
        context: &str,
    ) -> Result<CommandList, Failure> {
        let list = self
            .statement_list
            .parse(sub, 0)
            .map_err(|f| Failure {
                position: sub_start + f.position,
                ..f
            })?;
        if list.position < sub.len() {
            let failure = match self.statement.parse(sub, list.position) {
                Err(f) => Failure {
                    position: sub_start + f.position,
                    ..f
                },
                Ok(_) => Failure::new(
                    ErrorKind::UnexpectedToken,
                    format!("unexpected token `{}`", sub[list.position].value),
                    sub_start + list.position,
                ),
            };
            return Err(failure.with_context(context));
        }
        Ok(list.value)
    }
}

/// Collects tokens up to a closing keyword, tracking nesting.
///
/// Every `nestable` keyword seen increments a nesting counter; the `end`
/// keyword closes a nested level when the counter is positive and otherwise
/// stops the scan. Returns the collected tokens and the position of the
/// closing keyword (the input length when it is missing).
pub(super) fn collect_until(
    tokens: &[Token],
    start: usize,
    end: Keyword,
    nestable: Option<Keyword>,
) -> (Vec<Token>, usize) {
    let mut collected = Vec::new();
    let mut position = start;
    let mut nesting = 0u32;

    while position < tokens.len() {
        let token = &tokens[position];
        if let Some(opener) = nestable {
            if matches_keyword(token, opener) {
                nesting += 1;
                collected.push(token.clone());
                position += 1;
                continue;
            }
        }
        if matches_keyword(token, end) {
            if nesting == 0 {
                return (collected, position);
            }
            nesting -= 1;
        }
        collected.push(token.clone());
        position += 1;
    }
    (collected, position)
}

/// Advances over a single `;` or newline, if present.
pub(super) fn skip_separator(tokens: &[Token], position: usize) -> usize {
    match tokens.get(position) {
        Some(token) if token.kind.is_separator() => position + 1,
        _ => position,
    }
}

/// Captures redirections and an optional `&` after a compound command.
pub(super) fn trailing_redirects(
    redirection: &Parser<Redirect>,
    tokens: &[Token],
    start: usize,
) -> (Vec<Redirect>, bool, usize) {
    let mut position = start;
    let mut redirects = Vec::new();
    loop {
        if let Some(token) = tokens.get(position) {
            if let Some(redirect) = redir::fd_dup_from_word(token) {
                redirects.push(redirect);
                position += 1;
                continue;
            }
        }
        match redirection.parse(tokens, position) {
            Ok(success) => {
                redirects.push(success.value);
                position = success.position;
            }
            Err(_) => break,
        }
    }
    let background = matches!(
        tokens.get(position),
        Some(token) if token.kind == TokenKind::Ampersand
    );
    if background {
        position += 1;
    }
    (redirects, background, position)
}

fn level_statement(
    keyword: Keyword,
    build: impl Fn(u32) -> Node + 'static,
) -> Parser<Node> {
    Parser::new(move |tokens, start| {
        let Some(token) = tokens.get(start) else {
            return Err(Failure::expected(&format!("`{keyword}`"), tokens, start));
        };
        if !matches_keyword(token, keyword) {
            return Err(Failure::expected(&format!("`{keyword}`"), tokens, start));
        }
        let mut position = start + 1;
        let mut level = 1;
        if let Some(next) = tokens.get(position) {
            if next.kind == TokenKind::Word {
                if let Ok(n) = next.value.parse() {
                    level = n;
                    position += 1;
                }
            }
        }
        Ok(Success {
            value: build(level),
            position,
        })
    })
}

/// Parser for `break [n]`.
pub(super) fn break_statement() -> Parser<Node> {
    level_statement(Keyword::Break, |level| {
        Node::BreakStatement(BreakStatement { level })
    })
}

/// Parser for `continue [n]`.
pub(super) fn continue_statement() -> Parser<Node> {
    level_statement(Keyword::Continue, |level| {
        Node::ContinueStatement(ContinueStatement { level })
    })
}

/// Builds the combined control-structure parser.
///
/// Alternatives are tried most-specific first: conditionals and loops, then
/// `select` (when the extension is on), groups, and the loop-control
/// statements.
pub(super) fn control_structure(
    token_parsers: &Rc<TokenParsers>,
    grammar: &StatementGrammar,
    config: &ParserConfig,
) -> Parser<Node> {
    let redirection = redir::redirection(token_parsers);

    let mut parser = r#if::if_command(grammar, &redirection)
        .or_else(&while_loop::while_loop(grammar))
        .or_else(&while_loop::until_loop(grammar))
        .or_else(&for_loop::for_loop(grammar, config.arithmetic_enabled()))
        .or_else(&case::case_command(grammar, &redirection));
    if config.keyword_extensions_enabled() {
        parser = parser.or_else(&select::select_loop(grammar, &redirection));
    }
    parser
        .or_else(&grouping::subshell_group(token_parsers, grammar, &redirection))
        .or_else(&grouping::brace_group(token_parsers, grammar, &redirection))
        .or_else(&break_statement())
        .or_else(&continue_statement())
}
