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

//! Construction of [`Word`] values from expansion tokens
//!
//! Every word-like token maps onto a `Word` whose parts preserve the
//! contained expansions for later evaluation. Adjacent word-like tokens merge
//! into one composite word: the parts concatenate and the composite carries
//! no overall quotation.

use super::core::{Parser, Success};
use super::error::{ErrorKind, Failure};
use crate::syntax::{Expansion, Node, ProcessSubstitution, SubstitutionDirection, Word, WordPart};
use crate::token::{QuoteType, Token, TokenKind};

/// Formats a token the way it contributes to a flat `args` string.
///
/// Variables print with their `$` prefix restored; delimited expansions keep
/// their original text; everything else prints its bare value.
pub(super) fn format_token_value(token: &Token) -> String {
    match token.kind {
        TokenKind::Variable => format!("${}", token.value),
        _ => token.value.clone(),
    }
}

/// Builds a `Word` from a single word-like token.
pub(super) fn build_word_from_token(token: &Token, position: usize) -> Result<Word, Failure> {
    let quote_type = if token.kind == TokenKind::String {
        token.quote_type
    } else {
        None
    };
    Ok(Word {
        parts: word_parts(token, position)?,
        quote_type,
    })
}

/// Builds one composite `Word` from a run of adjacent word-like tokens.
pub(super) fn build_composite_word(group: &[(usize, Token)]) -> Result<Word, Failure> {
    let mut parts = Vec::new();
    for (position, token) in group {
        parts.extend(word_parts(token, *position)?);
    }
    Ok(Word {
        parts,
        quote_type: None,
    })
}

fn word_parts(token: &Token, position: usize) -> Result<Vec<WordPart>, Failure> {
    let quoted = token.quote_type == Some(QuoteType::Double);
    let part = match token.kind {
        TokenKind::String => WordPart::Literal {
            text: token.value.clone(),
            quoted: true,
            quote_char: token.quote_type,
        },
        TokenKind::Variable => WordPart::Expansion {
            expansion: Expansion::Variable {
                name: token.value.clone(),
            },
            quoted,
        },
        TokenKind::CommandSub => {
            let command = strip_delimiters(&token.value, "$(", ")");
            validate_command_substitution(&command, &token.value, position)?;
            WordPart::Expansion {
                expansion: Expansion::CommandSubstitution {
                    command,
                    backtick_style: false,
                },
                quoted,
            }
        }
        TokenKind::CommandSubBacktick => {
            let command = strip_delimiters(&token.value, "`", "`");
            validate_command_substitution(&command, &token.value, position)?;
            WordPart::Expansion {
                expansion: Expansion::CommandSubstitution {
                    command,
                    backtick_style: true,
                },
                quoted,
            }
        }
        TokenKind::ArithExpansion => WordPart::Expansion {
            expansion: Expansion::Arithmetic {
                expression: strip_delimiters(&token.value, "$((", "))"),
            },
            quoted,
        },
        TokenKind::ParamExpansion => WordPart::Expansion {
            expansion: parse_parameter_expansion(&token.value),
            quoted,
        },
        TokenKind::ProcessSubIn | TokenKind::ProcessSubOut => {
            let direction = if token.kind == TokenKind::ProcessSubIn {
                SubstitutionDirection::In
            } else {
                SubstitutionDirection::Out
            };
            match process_substitution_text(&token.value) {
                Some(command) => WordPart::Expansion {
                    expansion: Expansion::ProcessSubstitution { direction, command },
                    quoted,
                },
                None => {
                    return Err(Failure::new(
                        ErrorKind::UnexpectedToken,
                        format!("invalid process substitution: `{}`", token.value),
                        position,
                    ));
                }
            }
        }
        _ => WordPart::Literal {
            text: token.value.clone(),
            quoted: false,
            quote_char: None,
        },
    };
    Ok(vec![part])
}

fn strip_delimiters(value: &str, open: &str, close: &str) -> String {
    value
        .strip_prefix(open)
        .and_then(|v| v.strip_suffix(close))
        .unwrap_or(value)
        .to_string()
}

/// Extracts the command from `<(...)`/`>(...)` text.
///
/// A value whose closing `)` is missing is accepted as incomplete; the
/// command is everything after the opening delimiter.
fn process_substitution_text(value: &str) -> Option<String> {
    if value.len() < 3 {
        return None;
    }
    let rest = value
        .strip_prefix("<(")
        .or_else(|| value.strip_prefix(">("))?;
    Some(rest.strip_suffix(')').unwrap_or(rest).to_string())
}

/// Parses `${parameter[operator][word]}` text into its components.
///
/// Operators are matched longest-first at the earliest position after a
/// non-empty parameter name.
fn parse_parameter_expansion(raw: &str) -> Expansion {
    const OPERATORS: [&str; 10] = [":-", ":=", ":?", ":+", "##", "%%", "//", "#", "%", "/"];

    let inner = raw
        .strip_prefix("${")
        .and_then(|v| v.strip_suffix('}'))
        .unwrap_or(raw);

    let mut found: Option<(usize, &str)> = None;
    if inner.len() > 1 {
        for op in OPERATORS {
            if let Some(index) = inner[1..].find(op) {
                let index = index + 1;
                if found.is_none_or(|(best, _)| index < best) {
                    found = Some((index, op));
                }
            }
        }
    }

    match found {
        Some((index, op)) => Expansion::Parameter {
            parameter: inner[..index].to_string(),
            operator: Some(op.to_string()),
            word: Some(inner[index + op.len()..].to_string()),
        },
        None => Expansion::Parameter {
            parameter: inner.to_string(),
            operator: None,
            word: None,
        },
    }
}

/// Rejects command substitutions whose content begins a function definition.
///
/// The content is scanned, not parsed: a leading `function` keyword or a
/// `name ( ) {` prefix is rejected, as is content whose quoting never
/// closes (the scan cannot make sense of it).
fn validate_command_substitution(
    command: &str,
    original: &str,
    position: usize,
) -> Result<(), Failure> {
    if scan_is_valid(command) {
        Ok(())
    } else {
        Err(Failure::new(
            ErrorKind::InvalidCommandSubstitution,
            format!("invalid command substitution: `{original}`"),
            position,
        ))
    }
}

fn scan_is_valid(command: &str) -> bool {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    for c in command.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if !in_single => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            _ => {}
        }
    }
    if in_single || in_double || escaped {
        return false;
    }

    let trimmed = command.trim_start();
    if trimmed == "function"
        || trimmed
            .strip_prefix("function")
            .is_some_and(|rest| rest.starts_with(char::is_whitespace))
    {
        return false;
    }
    !is_function_definition_prefix(trimmed)
}

fn is_function_definition_prefix(s: &str) -> bool {
    let mut name_end = 0;
    for (i, c) in s.char_indices() {
        let valid = if i == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_' || c == '-'
        };
        if valid {
            name_end = i + c.len_utf8();
        } else {
            break;
        }
    }
    if name_end == 0 {
        return false;
    }
    let rest = s[name_end..].trim_start();
    let Some(after_open) = rest.strip_prefix('(') else {
        return false;
    };
    let Some(close) = after_open.find(')') else {
        return false;
    };
    after_open[close + 1..].trim_start().starts_with('{')
}

/// Parser for a standalone process substitution command.
pub(super) fn process_substitution_command() -> Parser<Node> {
    Parser::new(|tokens, position| {
        let Some(token) = tokens.get(position) else {
            return Err(Failure::expected("a process substitution", tokens, position));
        };
        let direction = match token.kind {
            TokenKind::ProcessSubIn => SubstitutionDirection::In,
            TokenKind::ProcessSubOut => SubstitutionDirection::Out,
            _ => return Err(Failure::expected("a process substitution", tokens, position)),
        };
        match process_substitution_text(&token.value) {
            Some(command) => Ok(Success {
                value: Node::ProcessSubstitution(ProcessSubstitution { direction, command }),
                position: position + 1,
            }),
            None => Err(Failure::new(
                ErrorKind::UnexpectedToken,
                format!("invalid process substitution: `{}`", token.value),
                position,
            )),
        }
    })
}
