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

//! Definition of errors that happen in the parser
//!
//! A [`Failure`] is the local, non-fatal form a combinator alternative
//! returns; siblings may still be tried at the same position. The first
//! failure that survives to the driver is reported as a [`ParseError`].

use crate::token::Token;
use thiserror::Error;

/// Classification of syntax errors
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A token other than the expected one was found.
    UnexpectedToken,
    /// A compound command is not closed (`fi`, `done`, `esac`, `))`, `]]`,
    /// `)`, `}`).
    MissingTerminator,
    /// A keyword the grammar requires is missing (`then`, `do`, `in`).
    MissingKeyword,
    /// A function name violates the naming rules.
    InvalidName,
    /// A command substitution contains a forbidden construct.
    InvalidCommandSubstitution,
    /// A redirection is malformed or missing its target.
    InvalidRedirect,
    /// A simple command has no words.
    EmptyCommand,
    /// The input ended inside a compound command.
    EndOfInput,
}

/// Non-fatal parse failure produced inside the combinator grammar
///
/// The position is an index into the token slice being parsed, not a byte
/// offset; the driver resolves it to the offending token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
    pub position: usize,
}

impl Failure {
    /// Creates a failure at the given token index.
    pub fn new(kind: ErrorKind, message: impl Into<String>, position: usize) -> Self {
        Failure {
            kind,
            message: message.into(),
            position,
        }
    }

    /// Creates an "expected X" failure, describing the found token or the
    /// end of input.
    pub fn expected(what: &str, tokens: &[Token], position: usize) -> Self {
        match tokens.get(position) {
            Some(token) => Failure::new(
                ErrorKind::UnexpectedToken,
                format!("expected {what}, got {:?} `{}`", token.kind, token.value),
                position,
            ),
            None => Failure::new(
                ErrorKind::EndOfInput,
                format!("expected {what}, but reached end of input"),
                position,
            ),
        }
    }

    /// Prefixes the message with a context description.
    #[must_use]
    pub fn with_context(mut self, context: &str) -> Self {
        self.message = format!("{context}: {}", self.message);
        self
    }
}

/// Explanation of a failure in parsing
///
/// `position` is the index of the offending token in the normalized token
/// stream; `token`, when present, carries the lexer's byte offset for
/// diagnostics.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub position: usize,
    pub token: Option<Token>,
}

impl ParseError {
    /// Converts a grammar failure into the public error form, attaching the
    /// offending token when the position points at one.
    #[must_use]
    pub fn from_failure(failure: Failure, tokens: &[Token]) -> Self {
        ParseError {
            kind: failure.kind,
            message: failure.message,
            position: failure.position,
            token: tokens.get(failure.position).cloned(),
        }
    }

    /// Creates an "unexpected token" error for a token the grammar left
    /// unconsumed.
    #[must_use]
    pub fn unexpected_token(tokens: &[Token], position: usize) -> Self {
        let message = match tokens.get(position) {
            Some(token) => format!(
                "unexpected token after valid input: {:?} `{}`",
                token.kind, token.value
            ),
            None => "unexpected end of input".to_string(),
        };
        ParseError {
            kind: ErrorKind::UnexpectedToken,
            message,
            position,
            token: tokens.get(position).cloned(),
        }
    }
}
