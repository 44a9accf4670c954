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

//! Syntax parser for and-or lists
//!
//! Pipelines joined by `&&` and `||`. A list with a single pipeline that is a
//! bare compound command collapses to the compound itself, and the operator
//! vector always holds one element fewer than the pipeline vector.

use super::core::{Parser, Success, many};
use super::tokens::TokenParsers;
use crate::syntax::{AndOr, AndOrList, Node};
use crate::token::TokenKind;
use std::rc::Rc;

/// Builds the and-or list parser over the given pipeline parser.
pub(super) fn and_or_list(
    pipeline: &Parser<Node>,
    token_parsers: &Rc<TokenParsers>,
) -> Parser<Node> {
    let first = pipeline.clone();
    let rest = many(&token_parsers.logical_operator.then(pipeline));
    Parser::new(move |tokens, start| {
        let head = first.parse(tokens, start)?;
        let tail = rest.parse(tokens, head.position)?;
        let pairs = tail.value;

        if pairs.is_empty() {
            if head.value.is_compound() {
                return Ok(Success {
                    value: head.value,
                    position: head.position,
                });
            }
            return Ok(Success {
                value: Node::AndOrList(AndOrList {
                    pipelines: vec![head.value],
                    operators: vec![],
                }),
                position: head.position,
            });
        }

        let mut pipelines = vec![head.value];
        let mut operators = Vec::new();
        for (operator, element) in pairs {
            operators.push(if operator.kind == TokenKind::AndIf {
                AndOr::AndThen
            } else {
                AndOr::OrElse
            });
            pipelines.push(element);
        }
        Ok(Success {
            value: Node::AndOrList(AndOrList {
                pipelines,
                operators,
            }),
            position: tail.position,
        })
    })
}
