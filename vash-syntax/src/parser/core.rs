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

//! Core parser combinator framework
//!
//! A [`Parser<T>`] is a pure function from a token slice and a position to a
//! [`ParseResult<T>`]. The primitives in this module compose such functions
//! into the full shell grammar. Backtracking happens only at [`or_else`] and
//! [`try_parse`] boundaries; the other combinators commit once their first
//! token matches, which keeps look-ahead bounded and error positions
//! predictable.
//!
//! [`or_else`]: Parser::or_else

use super::error::{ErrorKind, Failure};
use crate::keyword::{Keyword, matches_keyword};
use crate::token::{Token, TokenKind};
use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

/// Successful parse: the value and the position after the consumed tokens
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Success<T> {
    pub value: T,
    pub position: usize,
}

/// Result of running a parser at a position
///
/// A failure is local: the caller may try sibling alternatives at the same
/// position.
pub type ParseResult<T> = Result<Success<T>, Failure>;

/// Composable parsing function
///
/// Handles are cheap to clone; the underlying function is shared.
pub struct Parser<T> {
    run: Rc<dyn Fn(&[Token], usize) -> ParseResult<T>>,
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Parser {
            run: Rc::clone(&self.run),
        }
    }
}

impl<T: 'static> Parser<T> {
    /// Wraps a parsing function.
    pub fn new(run: impl Fn(&[Token], usize) -> ParseResult<T> + 'static) -> Self {
        Parser { run: Rc::new(run) }
    }

    /// Runs the parser.
    pub fn parse(&self, tokens: &[Token], position: usize) -> ParseResult<T> {
        (self.run)(tokens, position)
    }

    /// Transforms the success value.
    pub fn map<U: 'static>(&self, f: impl Fn(T) -> U + 'static) -> Parser<U> {
        let inner = self.clone();
        Parser::new(move |tokens, position| {
            let success = inner.parse(tokens, position)?;
            Ok(Success {
                value: f(success.value),
                position: success.position,
            })
        })
    }

    /// Sequences this parser with another, returning the pair of values.
    ///
    /// If the second parser fails, the failure is reported at the starting
    /// position: the pair fails as a whole and consumes nothing.
    pub fn then<U: 'static>(&self, next: &Parser<U>) -> Parser<(T, U)> {
        let first = self.clone();
        let second = next.clone();
        Parser::new(move |tokens, position| {
            let a = first.parse(tokens, position)?;
            match second.parse(tokens, a.position) {
                Ok(b) => Ok(Success {
                    value: (a.value, b.value),
                    position: b.position,
                }),
                Err(failure) => Err(Failure {
                    position,
                    ..failure
                }),
            }
        })
    }

    /// Tries this parser; on failure, tries the alternative at the same
    /// position. The first match wins.
    ///
    /// When both alternatives fail, the failure that progressed further into
    /// the input is reported, so a deep failure ("missing `fi`") is not
    /// masked by a shallow one from a later alternative.
    pub fn or_else(&self, alternative: &Parser<T>) -> Parser<T> {
        let preferred = self.clone();
        let fallback = alternative.clone();
        Parser::new(move |tokens, position| {
            match preferred.parse(tokens, position) {
                Ok(success) => Ok(success),
                Err(first) => match fallback.parse(tokens, position) {
                    Ok(success) => Ok(success),
                    Err(second) => Err(if first.position > second.position {
                        first
                    } else {
                        second
                    }),
                },
            }
        })
    }
}

/// Succeeds if the token at the current position has the given kind.
pub fn token(kind: TokenKind) -> Parser<Token> {
    Parser::new(move |tokens, position| match tokens.get(position) {
        Some(t) if t.kind == kind => Ok(Success {
            value: t.clone(),
            position: position + 1,
        }),
        _ => Err(Failure::expected(&format!("{kind:?}"), tokens, position)),
    })
}

/// Succeeds if the token at the current position has exactly the given text.
pub fn literal(value: impl Into<String>) -> Parser<Token> {
    let value = value.into();
    Parser::new(move |tokens, position| match tokens.get(position) {
        Some(t) if t.value == value => Ok(Success {
            value: t.clone(),
            position: position + 1,
        }),
        _ => Err(Failure::expected(&format!("`{value}`"), tokens, position)),
    })
}

/// Succeeds if the token represents the given keyword, in either its typed
/// or its `WORD` spelling.
pub fn keyword(keyword: Keyword) -> Parser<Token> {
    Parser::new(move |tokens, position| match tokens.get(position) {
        Some(t) if matches_keyword(t, keyword) => Ok(Success {
            value: t.clone(),
            position: position + 1,
        }),
        _ => Err(Failure::expected(
            &format!("`{keyword}`"),
            tokens,
            position,
        )),
    })
}

/// Parses zero or more occurrences. Never fails.
///
/// The repetition stops as soon as the inner parser fails or stops making
/// progress.
pub fn many<T: 'static>(parser: &Parser<T>) -> Parser<Vec<T>> {
    let inner = parser.clone();
    Parser::new(move |tokens, position| {
        let mut values = Vec::new();
        let mut position = position;
        while let Ok(success) = inner.parse(tokens, position) {
            if success.position == position {
                break;
            }
            values.push(success.value);
            position = success.position;
        }
        Ok(Success {
            value: values,
            position,
        })
    })
}

/// Parses one or more occurrences; fails if there is no first match.
pub fn many1<T: 'static>(parser: &Parser<T>) -> Parser<Vec<T>> {
    let inner = parser.clone();
    let rest = many(parser);
    Parser::new(move |tokens, position| {
        let first = inner.parse(tokens, position)?;
        let more = rest.parse(tokens, first.position)?;
        let mut values = vec![first.value];
        values.extend(more.value);
        Ok(Success {
            value: values,
            position: more.position,
        })
    })
}

/// Always succeeds, with `Some` value on a match and `None` otherwise.
pub fn optional<T: 'static>(parser: &Parser<T>) -> Parser<Option<T>> {
    let inner = parser.clone();
    Parser::new(move |tokens, position| match inner.parse(tokens, position) {
        Ok(success) => Ok(Success {
            value: Some(success.value),
            position: success.position,
        }),
        Err(_) => Ok(Success {
            value: None,
            position,
        }),
    })
}

/// Runs the parsers in order; fails at the starting position if any element
/// fails.
pub fn sequence<T: 'static>(parsers: Vec<Parser<T>>) -> Parser<Vec<T>> {
    Parser::new(move |tokens, position| {
        let mut values = Vec::with_capacity(parsers.len());
        let mut current = position;
        for parser in &parsers {
            match parser.parse(tokens, current) {
                Ok(success) => {
                    values.push(success.value);
                    current = success.position;
                }
                Err(failure) => {
                    return Err(Failure {
                        position,
                        ..failure
                    });
                }
            }
        }
        Ok(Success {
            value: values,
            position: current,
        })
    })
}

/// Parses a non-empty sequence of items separated by a separator.
///
/// Fails if the first item fails; a trailing separator is not consumed.
pub fn separated_by<T: 'static, S: 'static>(
    parser: &Parser<T>,
    separator: &Parser<S>,
) -> Parser<Vec<T>> {
    let item = parser.clone();
    let sep = separator.clone();
    Parser::new(move |tokens, position| {
        let first = item.parse(tokens, position)?;
        let mut values = vec![first.value];
        let mut current = first.position;
        loop {
            let Ok(sep_success) = sep.parse(tokens, current) else {
                break;
            };
            let Ok(item_success) = item.parse(tokens, sep_success.position) else {
                break;
            };
            values.push(item_success.value);
            current = item_success.position;
        }
        Ok(Success {
            value: values,
            position: current,
        })
    })
}

/// Parses `open`, then `body`, then `close`, returning the body value.
pub fn between<A: 'static, B: 'static, T: 'static>(
    open: &Parser<A>,
    close: &Parser<B>,
    body: &Parser<T>,
) -> Parser<T> {
    let open = open.clone();
    let close = close.clone();
    let body = body.clone();
    Parser::new(move |tokens, position| {
        let opened = open
            .parse(tokens, position)
            .map_err(|f| f.with_context("expected opening delimiter"))?;
        let content = body
            .parse(tokens, opened.position)
            .map_err(|f| f.with_context("expected content"))?;
        let closed = close
            .parse(tokens, content.position)
            .map_err(|f| f.with_context("expected closing delimiter"))?;
        Ok(Success {
            value: content.value,
            position: closed.position,
        })
    })
}

/// Runs the parser and discards its value.
pub fn skip<T: 'static>(parser: &Parser<T>) -> Parser<()> {
    parser.map(|_| ())
}

/// Defers construction of a parser until its first use, for recursive
/// grammars. The built parser is cached.
pub fn lazy<T: 'static>(factory: impl Fn() -> Parser<T> + 'static) -> Parser<T> {
    let cell: Rc<OnceCell<Parser<T>>> = Rc::new(OnceCell::new());
    Parser::new(move |tokens, position| cell.get_or_init(&factory).parse(tokens, position))
}

/// Explicit backtracking: runs the parser, reporting failure as a successful
/// `None` at the original position.
pub fn try_parse<T: 'static>(parser: &Parser<T>) -> Parser<Option<T>> {
    let inner = parser.clone();
    Parser::new(move |tokens, position| match inner.parse(tokens, position) {
        Ok(success) => Ok(Success {
            value: Some(success.value),
            position: success.position,
        }),
        Err(_) => Ok(Success {
            value: None,
            position,
        }),
    })
}

/// Prefixes failures of the parser with a context description.
pub fn with_error_context<T: 'static>(parser: &Parser<T>, context: impl Into<String>) -> Parser<T> {
    let inner = parser.clone();
    let context = context.into();
    Parser::new(move |tokens, position| {
        inner
            .parse(tokens, position)
            .map_err(|f| f.with_context(&context))
    })
}

/// A parser that always fails with the given message.
pub fn fail_with<T: 'static>(message: impl Into<String>) -> Parser<T> {
    let message = message.into();
    Parser::new(move |_tokens, position| {
        Err(Failure::new(
            ErrorKind::UnexpectedToken,
            message.clone(),
            position,
        ))
    })
}

/// Late-bound parser reference used to break grammar cycles
///
/// Handles obtained from [`parser`](Self::parser) may be composed before the
/// referent exists; using such a handle before [`define`](Self::define) is a
/// programming error and panics.
pub struct ForwardParser<T> {
    cell: Rc<RefCell<Option<Parser<T>>>>,
}

impl<T> Clone for ForwardParser<T> {
    fn clone(&self) -> Self {
        ForwardParser {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T> Default for ForwardParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ForwardParser<T> {
    /// Creates an undefined forward reference.
    #[must_use]
    pub fn new() -> Self {
        ForwardParser {
            cell: Rc::new(RefCell::new(None)),
        }
    }

    /// Supplies the actual parser.
    pub fn define(&self, parser: Parser<T>) {
        *self.cell.borrow_mut() = Some(parser);
    }
}

impl<T: 'static> ForwardParser<T> {
    /// Returns a parser handle that delegates to the defined parser.
    #[must_use]
    pub fn parser(&self) -> Parser<T> {
        let cell = Rc::clone(&self.cell);
        Parser::new(move |tokens, position| {
            let parser = cell
                .borrow()
                .clone()
                .expect("forward parser used before being defined");
            parser.parse(tokens, position)
        })
    }
}
