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

//! Syntax parsers for array initialization and element assignment
//!
//! The lexer may fuse array syntax into a single word (`a[0]=x`), split it
//! completely (`a` `[` `0` `]` `=` `x`), or anything in between (`a=` `(`).
//! A detection step picks the form before the matching parser runs.

use super::core::{Parser, Success};
use super::error::{ErrorKind, Failure};
use super::word::format_token_value;
use crate::syntax::{ArrayElementAssignment, ArrayInitialization, Node};
use crate::token::{Token, TokenKind};
use enumset::{EnumSet, enum_set};

const ELEMENT_KINDS: EnumSet<TokenKind> = enum_set!(
    TokenKind::Word
        | TokenKind::String
        | TokenKind::Variable
        | TokenKind::CommandSub
        | TokenKind::CommandSubBacktick
        | TokenKind::ParamExpansion
);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ArrayForm {
    Initialization,
    ElementAssignment,
}

/// Finds the `=` or `+=` in fused assignment text.
fn find_assignment(value: &str) -> Option<(usize, bool)> {
    match value.find("+=") {
        Some(index) => Some((index, true)),
        None => value.find('=').map(|index| (index, false)),
    }
}

fn is_assignment_word(token: &Token) -> bool {
    token.kind == TokenKind::Word && (token.value == "=" || token.value == "+=")
}

/// Decides which array form, if any, begins at the position.
fn detect(tokens: &[Token], position: usize) -> Option<ArrayForm> {
    let token = tokens.get(position)?;
    if token.kind != TokenKind::Word {
        return None;
    }
    let value = &token.value;

    if let (Some(bracket), Some(_)) = (value.find('['), value.find(']')) {
        if let Some((equals, _)) = find_assignment(value) {
            if bracket < equals {
                return Some(ArrayForm::ElementAssignment);
            }
        }
    }

    if value.ends_with("+=") || value.ends_with('=') {
        if tokens
            .get(position + 1)
            .is_some_and(|t| t.kind == TokenKind::LParen)
        {
            return Some(ArrayForm::Initialization);
        }
    } else if tokens.get(position + 1).is_some_and(is_assignment_word)
        && tokens
            .get(position + 2)
            .is_some_and(|t| t.kind == TokenKind::LParen)
    {
        return Some(ArrayForm::Initialization);
    }

    if tokens
        .get(position + 1)
        .is_some_and(|t| t.kind == TokenKind::LBracket)
    {
        return Some(ArrayForm::ElementAssignment);
    }

    None
}

fn parse_initialization(tokens: &[Token], start: usize) -> Result<Success<Node>, Failure> {
    let Some(name_token) = tokens.get(start).filter(|t| t.kind == TokenKind::Word) else {
        return Err(Failure::expected("an array name", tokens, start));
    };
    let mut position = start + 1;

    let (name, is_append) = if let Some(rest) = name_token.value.strip_suffix("+=") {
        (rest.to_string(), true)
    } else if let Some(rest) = name_token.value.strip_suffix('=') {
        (rest.to_string(), false)
    } else {
        // Split spelling: the `=` or `+=` is its own word.
        let Some(assignment) = tokens.get(position).filter(|t| is_assignment_word(t)) else {
            return Err(Failure::new(
                ErrorKind::UnexpectedToken,
                "expected `=` after array name",
                position,
            ));
        };
        let is_append = assignment.value == "+=";
        position += 1;
        (name_token.value.clone(), is_append)
    };

    if !tokens
        .get(position)
        .is_some_and(|t| t.kind == TokenKind::LParen)
    {
        return Err(Failure::new(
            ErrorKind::UnexpectedToken,
            "expected `(` to begin array elements",
            position,
        ));
    }
    position += 1;

    let mut elements = Vec::new();
    let mut element_types = Vec::new();
    let mut element_quote_types = Vec::new();
    loop {
        let Some(token) = tokens.get(position) else {
            return Err(Failure::new(
                ErrorKind::MissingTerminator,
                "expected `)` to close array elements",
                position,
            ));
        };
        match token.kind {
            TokenKind::RParen => break,
            TokenKind::Newline => position += 1,
            kind if ELEMENT_KINDS.contains(kind) => {
                elements.push(format_token_value(token));
                element_types.push(kind);
                element_quote_types.push(token.quote_type);
                position += 1;
            }
            kind => {
                return Err(Failure::new(
                    ErrorKind::UnexpectedToken,
                    format!("unexpected {kind:?} token in array elements"),
                    position,
                ));
            }
        }
    }
    position += 1; // past `)`

    Ok(Success {
        value: Node::ArrayInitialization(ArrayInitialization {
            name,
            elements,
            element_types,
            element_quote_types,
            is_append,
        }),
        position,
    })
}

fn parse_element_assignment(tokens: &[Token], start: usize) -> Result<Success<Node>, Failure> {
    let Some(word_token) = tokens.get(start).filter(|t| t.kind == TokenKind::Word) else {
        return Err(Failure::expected("an array name", tokens, start));
    };
    let value = &word_token.value;
    let mut position = start + 1;

    // Fused spellings carry the brackets inside the word token.
    if let (Some(bracket), Some(close_bracket)) = (value.find('['), value.find(']')) {
        let name = value[..bracket].to_string();
        let index = value[bracket + 1..close_bracket].to_string();

        if !value.ends_with('=') && !value.ends_with("+=") {
            // Everything in one token: `a[0]=x` or `a[0]+=x`.
            let Some((equals, is_append)) = find_assignment(value) else {
                return Err(Failure::new(
                    ErrorKind::UnexpectedToken,
                    "expected `=` in array assignment",
                    start,
                ));
            };
            let assigned = &value[equals + if is_append { 2 } else { 1 }..];
            return Ok(Success {
                value: Node::ArrayElementAssignment(ArrayElementAssignment {
                    name,
                    index,
                    value: assigned.to_string(),
                    value_type: TokenKind::Word,
                    value_quote_type: None,
                    is_append,
                }),
                position,
            });
        }

        // `a[0]=` followed by the value as its own token.
        let is_append = value.ends_with("+=");
        let Some(value_token) = tokens.get(position) else {
            return Err(Failure::new(
                ErrorKind::UnexpectedToken,
                "expected a value after array assignment",
                position,
            ));
        };
        position += 1;
        return Ok(Success {
            value: Node::ArrayElementAssignment(ArrayElementAssignment {
                name,
                index,
                value: format_token_value(value_token),
                value_type: value_token.kind,
                value_quote_type: value_token.quote_type,
                is_append,
            }),
            position,
        });
    }

    // Fully split spelling: `a` `[` index tokens `]` `=` value.
    let name = value.clone();
    if !tokens
        .get(position)
        .is_some_and(|t| t.kind == TokenKind::LBracket)
    {
        return Err(Failure::new(
            ErrorKind::UnexpectedToken,
            "expected `[` after array name",
            position,
        ));
    }
    position += 1;

    let mut index = String::new();
    let mut depth = 0u32;
    loop {
        let Some(token) = tokens.get(position) else {
            return Err(Failure::new(
                ErrorKind::MissingTerminator,
                "expected `]` to close array index",
                position,
            ));
        };
        match token.kind {
            TokenKind::LBracket => depth += 1,
            TokenKind::RBracket if depth == 0 => break,
            TokenKind::RBracket => depth -= 1,
            _ => {}
        }
        index.push_str(&format_token_value(token));
        position += 1;
    }
    position += 1; // past `]`

    let Some(assignment) = tokens.get(position).filter(|t| is_assignment_word(t)) else {
        return Err(Failure::new(
            ErrorKind::UnexpectedToken,
            "expected `=` after array index",
            position,
        ));
    };
    let is_append = assignment.value == "+=";
    position += 1;

    let Some(value_token) = tokens.get(position) else {
        return Err(Failure::new(
            ErrorKind::UnexpectedToken,
            "expected a value after `=`",
            position,
        ));
    };
    position += 1;

    Ok(Success {
        value: Node::ArrayElementAssignment(ArrayElementAssignment {
            name,
            index,
            value: format_token_value(value_token),
            value_type: value_token.kind,
            value_quote_type: value_token.quote_type,
            is_append,
        }),
        position,
    })
}

/// Builds the array assignment parser, covering both forms.
pub(super) fn array_assignment() -> Parser<Node> {
    Parser::new(|tokens, start| match detect(tokens, start) {
        Some(ArrayForm::Initialization) => parse_initialization(tokens, start),
        Some(ArrayForm::ElementAssignment) => parse_element_assignment(tokens, start),
        None => Err(Failure::new(
            ErrorKind::UnexpectedToken,
            "not an array assignment",
            start,
        )),
    })
}
