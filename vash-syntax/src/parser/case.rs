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

//! Syntax parser for the case command
//!
//! Patterns arrive either as single word-like tokens or, for character-class
//! globs like `[a-z]*`, as a `[` token followed by the fragments of the
//! class; the parser reassembles the full glob text. Command collection
//! tracks nested case commands so an inner `esac` does not close the outer
//! one.

use super::compound_command::{StatementGrammar, skip_separator, trailing_redirects};
use super::core::{Parser, Success};
use super::error::{ErrorKind, Failure};
use super::word::format_token_value;
use crate::keyword::{Keyword, matches_keyword};
use crate::syntax::{
    CaseConditional, CaseContinuation, CaseItem, CasePattern, CommandList, Node, Redirect,
};
use crate::token::{Token, TokenKind};
use enumset::{EnumSet, enum_set};

const SUBJECT_KINDS: EnumSet<TokenKind> = enum_set!(
    TokenKind::Word
        | TokenKind::Variable
        | TokenKind::String
        | TokenKind::CommandSub
        | TokenKind::CommandSubBacktick
        | TokenKind::ArithExpansion
        | TokenKind::ParamExpansion
);

const PATTERN_KINDS: EnumSet<TokenKind> = enum_set!(
    TokenKind::Word
        | TokenKind::String
        | TokenKind::Variable
        | TokenKind::ParamExpansion
        | TokenKind::CommandSub
        | TokenKind::CommandSubBacktick
        | TokenKind::ArithExpansion
);

fn continuation_of(kind: TokenKind) -> Option<CaseContinuation> {
    match kind {
        TokenKind::DoubleSemicolon => Some(CaseContinuation::Break),
        TokenKind::SemicolonAmp => Some(CaseContinuation::FallThrough),
        TokenKind::AmpSemicolon => Some(CaseContinuation::Continue),
        _ => None,
    }
}

/// Reads one pattern value, reconstructing character-class globs that the
/// lexer split at the `[`.
fn pattern_value(tokens: &[Token], position: usize) -> Option<(String, usize)> {
    let token = tokens.get(position)?;

    if PATTERN_KINDS.contains(token.kind) {
        return Some((format_token_value(token), position + 1));
    }

    if token.kind == TokenKind::LBracket {
        let mut pattern = String::from("[");
        let mut position = position + 1;
        while let Some(t) = tokens.get(position) {
            if t.kind == TokenKind::RParen {
                break;
            }
            pattern.push_str(&t.value);
            position += 1;
            // Once the token containing `]` is consumed the class is closed;
            // trailing glob characters were part of that token's text.
            if t.value.contains(']') {
                break;
            }
        }
        return Some((pattern, position));
    }

    None
}

fn is_open_paren(token: &Token) -> bool {
    token.kind == TokenKind::LParen || token.value == "("
}

fn is_close_paren(token: &Token) -> bool {
    token.kind == TokenKind::RParen || token.value == ")"
}

/// Builds the case command parser.
pub(super) fn case_command(
    grammar: &StatementGrammar,
    redirection: &Parser<Redirect>,
) -> Parser<Node> {
    let grammar = grammar.clone();
    let redirection = redirection.clone();
    Parser::new(move |tokens, start| {
        if !tokens
            .get(start)
            .is_some_and(|t| matches_keyword(t, Keyword::Case)) {
            return Err(Failure::expected("`case`", tokens, start));
        }
        let mut position = start + 1;

        let Some(subject) = tokens
            .get(position)
            .filter(|t| SUBJECT_KINDS.contains(t.kind))
        else {
            return Err(Failure::new(
                ErrorKind::UnexpectedToken,
                "expected a word after `case`",
                position,
            ));
        };
        let expr = format_token_value(subject);
        position += 1;

        if !tokens
            .get(position)
            .is_some_and(|t| matches_keyword(t, Keyword::In)) {
            return Err(Failure::new(
                ErrorKind::MissingKeyword,
                "expected `in` after case subject",
                position,
            ));
        }
        position += 1;
        position = skip_separator(tokens, position);

        let mut items = Vec::new();
        while tokens
            .get(position)
            .is_some_and(|t| !matches_keyword(t, Keyword::Esac))
        {
            if tokens.get(position).is_some_and(is_open_paren) {
                position += 1;
            }

            let Some((first_pattern, next)) = pattern_value(tokens, position) else {
                break;
            };
            let mut patterns = vec![CasePattern::new(first_pattern)];
            position = next;

            while tokens
                .get(position)
                .is_some_and(|t| t.kind == TokenKind::Pipe)
            {
                position += 1;
                let Some((pattern, next)) = pattern_value(tokens, position) else {
                    return Err(Failure::new(
                        ErrorKind::UnexpectedToken,
                        "expected a pattern after `|`",
                        position,
                    ));
                };
                patterns.push(CasePattern::new(pattern));
                position = next;
            }

            if !tokens.get(position).is_some_and(is_close_paren) {
                return Err(Failure::new(
                    ErrorKind::MissingTerminator,
                    "expected `)` after case patterns",
                    position,
                ));
            }
            position += 1;
            position = skip_separator(tokens, position);

            // Collect the branch body up to the terminator, the next pattern
            // group, or the esac that closes this case.
            let body_start = position;
            let mut body_tokens: Vec<Token> = Vec::new();
            let mut nesting = 0u32;
            while let Some(token) = tokens.get(position) {
                if matches_keyword(token, Keyword::Case) {
                    nesting += 1;
                    body_tokens.push(token.clone());
                    position += 1;
                    continue;
                }
                if matches_keyword(token, Keyword::Esac) {
                    if nesting == 0 {
                        break;
                    }
                    nesting -= 1;
                    body_tokens.push(token.clone());
                    position += 1;
                    continue;
                }
                if nesting == 0 {
                    if continuation_of(token.kind).is_some() {
                        break;
                    }
                    let next = tokens.get(position + 1);
                    if PATTERN_KINDS.contains(token.kind)
                        && next.is_some_and(is_close_paren)
                    {
                        break;
                    }
                    if is_open_paren(token)
                        && next.is_some_and(|t| PATTERN_KINDS.contains(t.kind))
                    {
                        break;
                    }
                }
                body_tokens.push(token.clone());
                position += 1;
            }

            let commands = if body_tokens.is_empty() {
                CommandList::default()
            } else {
                grammar.parse_sub_list(&body_tokens, body_start, "in case branch")?
            };

            let mut terminator = CaseContinuation::default();
            if let Some(found) = tokens.get(position).and_then(|t| continuation_of(t.kind)) {
                terminator = found;
                position += 1;
            }
            position = skip_separator(tokens, position);

            items.push(CaseItem {
                patterns,
                commands,
                terminator,
            });
        }

        match tokens.get(position) {
            Some(token) if matches_keyword(token, Keyword::Esac) => position += 1,
            Some(_) => {
                return Err(Failure::new(
                    ErrorKind::MissingTerminator,
                    "expected `esac` to close case command",
                    position,
                ));
            }
            None => {
                return Err(Failure::new(
                    ErrorKind::EndOfInput,
                    "expected `esac` to close case command",
                    position,
                ));
            }
        }

        let (redirects, background, position) = trailing_redirects(&redirection, tokens, position);

        Ok(Success {
            value: Node::CaseConditional(CaseConditional {
                expr,
                items,
                redirects,
                background,
            }),
            position,
        })
    })
}
