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

//! Syntax parser for function definition commands
//!
//! Three forms are accepted: `name() { body }`, `function name { body }`,
//! and `function name() { body }`. The POSIX form is tried first. The name
//! must start with a letter or underscore, continue with letters, digits,
//! underscores, or hyphens, and must not be a reserved word.

use super::compound_command::StatementGrammar;
use super::core::{ParseResult, Parser, Success};
use super::error::{ErrorKind, Failure};
use crate::keyword::{Keyword, matches_keyword};
use crate::syntax::{CommandList, FunctionDef, Node};
use crate::token::{Token, TokenKind};

fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Parses and validates a function name token.
fn function_name(tokens: &[Token], position: usize) -> ParseResult<String> {
    let Some(token) = tokens.get(position).filter(|t| t.kind == TokenKind::Word) else {
        return Err(Failure::expected("a function name", tokens, position));
    };
    let name = &token.value;
    if !valid_name(name) {
        return Err(Failure::new(
            ErrorKind::InvalidName,
            format!("invalid function name `{name}`"),
            position,
        ));
    }
    if name
        .parse::<Keyword>()
        .is_ok_and(Keyword::is_reserved_word)
    {
        return Err(Failure::new(
            ErrorKind::InvalidName,
            format!("reserved word `{name}` cannot be a function name"),
            position,
        ));
    }
    Ok(Success {
        value: name.clone(),
        position: position + 1,
    })
}

/// Parses a `{ ... }` function body, counting nested braces, and re-parses
/// the captured tokens as a statement list.
fn function_body(
    grammar: &StatementGrammar,
    tokens: &[Token],
    start: usize,
) -> ParseResult<CommandList> {
    if !tokens
        .get(start)
        .is_some_and(|t| t.kind == TokenKind::LBrace || t.value == "{")
    {
        return Err(Failure::new(
            ErrorKind::UnexpectedToken,
            "expected `{` to begin function body",
            start,
        ));
    }
    let mut position = start + 1;
    if tokens
        .get(position)
        .is_some_and(|t| t.kind == TokenKind::Newline)
    {
        position += 1;
    }

    let body_start = position;
    let mut body_tokens: Vec<Token> = Vec::new();
    let mut depth = 1u32;
    while let Some(token) = tokens.get(position) {
        if token.kind == TokenKind::LBrace || token.value == "{" {
            depth += 1;
        } else if token.kind == TokenKind::RBrace || token.value == "}" {
            depth -= 1;
            if depth == 0 {
                break;
            }
        }
        body_tokens.push(token.clone());
        position += 1;
    }
    if depth > 0 {
        return Err(Failure::new(
            ErrorKind::MissingTerminator,
            "unclosed function body",
            position,
        ));
    }

    let body = grammar.parse_sub_list(&body_tokens, body_start, "in function body")?;
    Ok(Success {
        value: body,
        position: position + 1,
    })
}

fn skip_newlines(tokens: &[Token], mut position: usize) -> usize {
    while tokens
        .get(position)
        .is_some_and(|t| t.kind == TokenKind::Newline)
    {
        position += 1;
    }
    position
}

/// Expects `(` `)` at the given position.
fn parens(tokens: &[Token], position: usize) -> ParseResult<()> {
    let open = tokens
        .get(position)
        .is_some_and(|t| t.kind == TokenKind::LParen || t.value == "(");
    let close = tokens
        .get(position + 1)
        .is_some_and(|t| t.kind == TokenKind::RParen || t.value == ")");
    if open && close {
        Ok(Success {
            value: (),
            position: position + 2,
        })
    } else {
        Err(Failure::new(
            ErrorKind::UnexpectedToken,
            "expected `()` after function name",
            position,
        ))
    }
}

fn posix_function(grammar: StatementGrammar) -> Parser<Node> {
    Parser::new(move |tokens, start| {
        let name = function_name(tokens, start)
            .map_err(|f| Failure {
                position: start,
                ..f
            })?;
        let after_parens = parens(tokens, name.position)?;
        let position = skip_newlines(tokens, after_parens.position);
        let body = function_body(&grammar, tokens, position)?;
        Ok(Success {
            value: Node::FunctionDef(FunctionDef {
                name: name.value,
                body: body.value,
            }),
            position: body.position,
        })
    })
}

fn keyword_function(grammar: StatementGrammar, with_parens: bool) -> Parser<Node> {
    Parser::new(move |tokens, start| {
        if !tokens
            .get(start)
            .is_some_and(|t| matches_keyword(t, Keyword::Function)) {
            return Err(Failure::expected("`function`", tokens, start));
        }
        let name = function_name(tokens, start + 1)?;
        let mut position = name.position;
        if with_parens {
            position = parens(tokens, position)?.position;
        }
        position = skip_newlines(tokens, position);
        let body = function_body(&grammar, tokens, position)?;
        Ok(Success {
            value: Node::FunctionDef(FunctionDef {
                name: name.value,
                body: body.value,
            }),
            position: body.position,
        })
    })
}

/// Builds the function definition parser.
///
/// When the `function` keyword forms are disabled, only the POSIX form is
/// recognized.
pub(super) fn function_definition(
    grammar: &StatementGrammar,
    keyword_forms_enabled: bool,
) -> Parser<Node> {
    let posix = posix_function(grammar.clone());
    if keyword_forms_enabled {
        posix
            .or_else(&keyword_function(grammar.clone(), true))
            .or_else(&keyword_function(grammar.clone(), false))
    } else {
        posix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::testing::{control_grammar, kw, semi, word};
    use crate::syntax::Node;
    use assert_matches::assert_matches;

    fn parser() -> Parser<Node> {
        let (grammar, _) = control_grammar();
        function_definition(&grammar, true)
    }

    fn lparen() -> Token {
        kw(TokenKind::LParen, "(")
    }

    fn rparen() -> Token {
        kw(TokenKind::RParen, ")")
    }

    fn lbrace() -> Token {
        kw(TokenKind::LBrace, "{")
    }

    fn rbrace() -> Token {
        kw(TokenKind::RBrace, "}")
    }

    #[test]
    fn posix_form() {
        let tokens = [
            word("greet"), lparen(), rparen(), lbrace(),
            word("echo"), word("hi"), semi(), rbrace(),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::FunctionDef(f) => {
            assert_eq!(f.name, "greet");
            assert_eq!(f.body.statements.len(), 1);
        });
        assert_eq!(success.position, 8);
    }

    #[test]
    fn keyword_form_without_parens() {
        let tokens = [
            word("function"), word("cleanup"), lbrace(), word("rm"), semi(), rbrace(),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::FunctionDef(f) => {
            assert_eq!(f.name, "cleanup");
        });
    }

    #[test]
    fn keyword_form_with_parens() {
        let tokens = [
            word("function"), word("setup"), lparen(), rparen(), lbrace(),
            word("init"), semi(), rbrace(),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::FunctionDef(f) => {
            assert_eq!(f.name, "setup");
        });
    }

    #[test]
    fn nested_braces_in_body() {
        let tokens = [
            word("wrap"), lparen(), rparen(), lbrace(),
            lbrace(), word("inner"), semi(), rbrace(), semi(),
            rbrace(),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::FunctionDef(f) => {
            assert_matches!(&f.body.statements[0], Node::BraceGroup(_));
        });
        assert_eq!(success.position, 10);
    }

    #[test]
    fn empty_body() {
        let tokens = [word("noop"), lparen(), rparen(), lbrace(), rbrace()];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::FunctionDef(f) => {
            assert_eq!(f.body.statements, []);
        });
    }

    #[test]
    fn names_with_hyphens_and_underscores() {
        let tokens = [
            word("my-helper_2"), lparen(), rparen(), lbrace(), word("x"), semi(), rbrace(),
        ];
        let success = parser().parse(&tokens, 0).unwrap();
        assert_matches!(success.value, Node::FunctionDef(f) => {
            assert_eq!(f.name, "my-helper_2");
        });
    }

    #[test]
    fn invalid_names_are_rejected() {
        let tokens = [
            word("function"), word("2bad"), lbrace(), word("x"), semi(), rbrace(),
        ];
        let failure = parser().parse(&tokens, 0).unwrap_err();
        assert_eq!(failure.kind, ErrorKind::InvalidName);

        let tokens = [
            word("function"), word("if"), lbrace(), word("x"), semi(), rbrace(),
        ];
        let failure = parser().parse(&tokens, 0).unwrap_err();
        assert_eq!(failure.kind, ErrorKind::InvalidName);
        assert!(failure.message.contains("reserved word"));
    }

    #[test]
    fn unclosed_body_is_an_error() {
        let tokens = [word("f"), lparen(), rparen(), lbrace(), word("echo")];
        let failure = parser().parse(&tokens, 0).unwrap_err();
        assert_eq!(failure.kind, ErrorKind::MissingTerminator);
        assert!(failure.message.contains("unclosed function body"));
    }

    #[test]
    fn body_errors_carry_function_context() {
        // Typed keyword tokens, as the driver's normalization pass produces.
        let tokens = [
            word("f"), lparen(), rparen(), lbrace(),
            kw(TokenKind::If, "if"), word("x"), semi(),
            kw(TokenKind::Then, "then"), word("y"), semi(),
            rbrace(),
        ];
        let failure = parser().parse(&tokens, 0).unwrap_err();
        assert!(failure.message.contains("in function body"));
        assert!(failure.message.contains("`fi`"));
    }

    #[test]
    fn plain_command_is_not_a_function() {
        let tokens = [word("echo"), word("hi")];
        let failure = parser().parse(&tokens, 0).unwrap_err();
        assert_eq!(failure.position, 0);
    }
}
