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

//! Shell language syntax and parser.
//!
//! This crate turns a pre-tokenized shell command stream into an abstract
//! syntax tree. It does not tokenize source code itself: a lexer produces the
//! [`token`]s (including quote removal, expansion recognition, and adjacency
//! metadata) and hands them to the [`parser`], which builds the [`syntax`]
//! tree that an executor consumes. Here-document bodies travel out of band in
//! a content map and are filled into the tree by a post-parse pass.
//!
//! The parser is assembled from small combinators (see [`parser::core`])
//! composed into the full grammar: simple commands, pipelines, and-or lists,
//! redirections, the control structures, function definitions, arithmetic
//! commands, enhanced tests, array assignments, and process substitution.
//!
//! ```
//! use vash_syntax::parser::ShellParser;
//! use vash_syntax::syntax::Node;
//! use vash_syntax::token::{Token, TokenKind};
//!
//! let tokens = [
//!     Token::new(TokenKind::Word, "echo", 0),
//!     Token::new(TokenKind::Word, "hello", 5),
//! ];
//! let program = ShellParser::new().parse(&tokens).unwrap();
//! assert!(matches!(program.items[0], Node::AndOrList(_)));
//! ```
//!
//! Parsing is synchronous and pure; the parser holds no state between calls
//! and independent instances may run on separate threads. The [`config`]
//! module controls which grammar extensions are active, and the [`registry`]
//! module offers name-based construction with optional parse metrics.

pub mod config;
pub mod keyword;
pub mod parser;
pub mod registry;
pub mod syntax;
pub mod token;
