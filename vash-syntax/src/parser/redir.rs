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

//! Syntax parser for redirections
//!
//! Fd duplications reach the parser in three spellings: a dedicated
//! `RedirectDup` token (`2>&1`), a plain word matching the duplication shape,
//! and a digits word directly followed by an adjacent redirection operator.
//! All three normalize into the same [`Redirect`] form.

use super::core::{Parser, Success};
use super::error::{ErrorKind, Failure};
use super::tokens::TokenParsers;
use crate::syntax::{Redirect, RedirOp};
use crate::token::{Token, TokenKind};
use std::rc::Rc;

/// Decomposes fd-duplication text like `2>&1`, `>&-`, or `<&0`.
///
/// Returns the explicit source fd (if any), the direction character, and the
/// right-hand fd (`None` for the `-` close form).
fn parse_fd_dup(value: &str) -> Option<(Option<i32>, char, Option<i32>)> {
    let dir_index = value.find(['<', '>'])?;
    let (prefix, rest) = value.split_at(dir_index);
    if !prefix.is_empty() && !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut chars = rest.chars();
    let direction = chars.next()?;
    let rest = chars.as_str().strip_prefix('&')?;
    let target = if rest == "-" {
        None
    } else if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
        Some(rest.parse().ok()?)
    } else {
        return None;
    };
    let source = if prefix.is_empty() {
        None
    } else {
        Some(prefix.parse().ok()?)
    };
    Some((source, direction, target))
}

fn dup_redirect(source: i32, direction: char, target: Option<i32>) -> Redirect {
    let out = direction == '>';
    match target {
        None => Redirect::duplication(
            if out { RedirOp::CloseOut } else { RedirOp::CloseIn },
            source,
            None,
        ),
        Some(n) => Redirect::duplication(
            if out { RedirOp::DupOut } else { RedirOp::DupIn },
            source,
            Some(n),
        ),
    }
}

/// Tries to read a plain word as an fd duplication (`2>&1`, `>&-`, `<&0`).
pub(super) fn fd_dup_from_word(token: &Token) -> Option<Redirect> {
    if token.kind != TokenKind::Word {
        return None;
    }
    let (source, direction, target) = parse_fd_dup(&token.value)?;
    let source = source.unwrap_or(if direction == '>' { 1 } else { 0 });
    Some(dup_redirect(source, direction, target))
}

/// Builds the redirection parser.
pub(super) fn redirection(token_parsers: &Rc<TokenParsers>) -> Parser<Redirect> {
    let redirect_operator = token_parsers.redirect_operator.clone();
    let word_like = token_parsers.word_like.clone();
    Parser::new(move |tokens, start| {
        let mut position = start;

        // An fd prefix is consumed only when the operator directly follows
        // with no intervening whitespace; otherwise the digits are an
        // ordinary argument word.
        let mut explicit_fd = None;
        if let Some(t) = tokens.get(position) {
            if t.kind == TokenKind::Word
                && !t.value.is_empty()
                && t.value.bytes().all(|b| b.is_ascii_digit())
            {
                if let Some(next) = tokens.get(position + 1) {
                    if next.kind.is_redirect_operator() && next.adjacent_to_previous {
                        if let Ok(fd) = t.value.parse() {
                            explicit_fd = Some(fd);
                            position += 1;
                        }
                    }
                }
            }
        }

        let operator = redirect_operator
            .parse(tokens, position)
            .map_err(|f| Failure { position: start, ..f })?;
        let op_token = operator.value;
        let position = operator.position;

        match op_token.kind {
            TokenKind::RedirectDup => match parse_fd_dup(&op_token.value) {
                Some((source, direction, target)) => {
                    let default = if direction == '>' { 1 } else { 0 };
                    let source = explicit_fd.or(source).unwrap_or(default);
                    Ok(Success {
                        value: dup_redirect(source, direction, target),
                        position,
                    })
                }
                None => Err(Failure::new(
                    ErrorKind::InvalidRedirect,
                    format!("malformed fd duplication `{}`", op_token.value),
                    start,
                )),
            },
            TokenKind::Heredoc | TokenKind::HeredocStrip => {
                let delimiter = word_like.parse(tokens, position).map_err(|_| {
                    Failure::new(
                        ErrorKind::InvalidRedirect,
                        "expected here-document delimiter",
                        position,
                    )
                })?;
                let delimiter_token = delimiter.value;
                let r#type = if op_token.kind == TokenKind::Heredoc {
                    RedirOp::HereDoc
                } else {
                    RedirOp::HereDocStrip
                };
                let heredoc_quoted = delimiter_token.kind == TokenKind::String
                    || delimiter_token.quote_type.is_some();
                let redirect = Redirect {
                    r#type,
                    fd: explicit_fd,
                    dup_fd: None,
                    target: Some(delimiter_token.value),
                    heredoc_quoted,
                    heredoc_key: op_token.heredoc_key.clone(),
                    heredoc_content: None,
                };
                Ok(Success {
                    value: redirect,
                    position: delimiter.position,
                })
            }
            TokenKind::HereString => {
                let content = word_like.parse(tokens, position).map_err(|_| {
                    Failure::new(
                        ErrorKind::InvalidRedirect,
                        "expected content after `<<<`",
                        position,
                    )
                })?;
                let text = content.value.value;
                let redirect = Redirect {
                    r#type: RedirOp::HereString,
                    fd: explicit_fd,
                    dup_fd: None,
                    target: Some(text.clone()),
                    heredoc_quoted: true,
                    heredoc_key: None,
                    heredoc_content: Some(text),
                };
                Ok(Success {
                    value: redirect,
                    position: content.position,
                })
            }
            _ => {
                let r#type = match op_token.kind {
                    TokenKind::RedirectIn => RedirOp::In,
                    TokenKind::RedirectOut => RedirOp::Out,
                    TokenKind::RedirectAppend => RedirOp::Append,
                    TokenKind::RedirectErr => RedirOp::ErrOut,
                    _ => RedirOp::ErrAppend,
                };
                let target = word_like.parse(tokens, position).map_err(|_| {
                    Failure::new(
                        ErrorKind::InvalidRedirect,
                        format!("expected redirection target after `{}`", op_token.value),
                        position,
                    )
                })?;
                let mut redirect = Redirect::new(r#type, target.value.value);
                redirect.fd = explicit_fd;
                Ok(Success {
                    value: redirect,
                    position: target.position,
                })
            }
        }
    })
}
