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

//! Syntax parser for simple commands
//!
//! A simple command greedily collects words, redirections, and fd-duplication
//! words in any order, then an optional trailing `&`. Runs of adjacent
//! word-like tokens collapse into one composite argument, preserved both as a
//! flat string and as a structured [`Word`].
//!
//! [`Word`]: crate::syntax::Word

use super::core::{Parser, Success};
use super::error::{ErrorKind, Failure};
use super::redir;
use super::tokens::TokenParsers;
use super::word;
use crate::config::ParserConfig;
use crate::syntax::{Node, Redirect, SimpleCommand};
use crate::token::{Token, TokenKind};
use std::rc::Rc;

/// Splits collected word tokens into composite groups.
///
/// A token joins the previous group when it abuts it and its kind is
/// mergeable; otherwise it starts a new group.
fn group_adjacent_tokens(word_tokens: Vec<(usize, Token)>) -> Vec<Vec<(usize, Token)>> {
    let mut groups: Vec<Vec<(usize, Token)>> = Vec::new();
    for (position, token) in word_tokens {
        let merge = token.adjacent_to_previous
            && TokenKind::COMPOSITE_PARTS.contains(token.kind)
            && groups.last().is_some();
        if merge {
            if let Some(last) = groups.last_mut() {
                last.push((position, token));
                continue;
            }
        }
        groups.push(vec![(position, token)]);
    }
    groups
}

fn build_simple_command(
    word_tokens: Vec<(usize, Token)>,
    redirects: Vec<Redirect>,
    background: bool,
    build_words: bool,
) -> Result<SimpleCommand, Failure> {
    let mut command = SimpleCommand {
        redirects,
        background,
        ..SimpleCommand::default()
    };

    for group in group_adjacent_tokens(word_tokens) {
        let arg = group
            .iter()
            .map(|(_, token)| word::format_token_value(token))
            .collect::<String>();
        command.args.push(arg);

        if let [(position, token)] = &group[..] {
            command.arg_types.push(token.kind);
            command.quote_types.push(token.quote_type);
            if build_words {
                command.words.push(word::build_word_from_token(token, *position)?);
            }
        } else {
            command.arg_types.push(TokenKind::Word);
            command.quote_types.push(None);
            if build_words {
                command.words.push(word::build_composite_word(&group)?);
            }
        }
    }

    Ok(command)
}

/// Builds the simple command parser.
pub(super) fn simple_command(
    token_parsers: &Rc<TokenParsers>,
    config: &ParserConfig,
) -> Parser<Node> {
    let redirection = redir::redirection(token_parsers);
    let word_like = token_parsers.word_like.clone();
    let ampersand = token_parsers.ampersand.clone();
    let build_words = config.build_word_ast_nodes;
    Parser::new(move |tokens, start| {
        let mut position = start;
        let mut word_tokens: Vec<(usize, Token)> = Vec::new();
        let mut redirects: Vec<Redirect> = Vec::new();

        loop {
            if let Some(token) = tokens.get(position) {
                if let Some(redirect) = redir::fd_dup_from_word(token) {
                    redirects.push(redirect);
                    position += 1;
                    continue;
                }
            }
            if let Ok(success) = redirection.parse(tokens, position) {
                redirects.push(success.value);
                position = success.position;
                continue;
            }
            if let Ok(success) = word_like.parse(tokens, position) {
                word_tokens.push((position, success.value));
                position = success.position;
                continue;
            }
            break;
        }

        if word_tokens.is_empty() {
            return Err(Failure::new(
                ErrorKind::EmptyCommand,
                "expected a command",
                position,
            ));
        }

        let mut background = false;
        if let Ok(success) = ampersand.parse(tokens, position) {
            background = true;
            position = success.position;
        }

        let command = build_simple_command(word_tokens, redirects, background, build_words)?;
        Ok(Success {
            value: Node::SimpleCommand(command),
            position,
        })
    })
}
