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

//! Assembly of the complete command grammar
//!
//! Construction runs in two phases. The leaf layers are built first against
//! forward references for the statement and statement-list parsers; once the
//! composite command parser exists, the forwards are defined and the cycle
//! (commands contain statement lists contain commands) closes.
//!
//! The composite command parser prefers control structures, then the special
//! command forms, then and-or lists. A compound command followed by `|`,
//! `&&`, or `||` re-parses through the and-or layer so that pipelines may
//! contain control structures.

use super::and_or;
use super::array;
use super::arith;
use super::compound_command::{self, StatementGrammar};
use super::core::{ForwardParser, Parser, fail_with};
use super::double_bracket;
use super::function;
use super::list;
use super::pipeline;
use super::redir;
use super::simple_command;
use super::tokens::TokenParsers;
use super::word;
use crate::config::ParserConfig;
use crate::syntax::{CommandList, Node};
use crate::token::TokenKind;
use std::rc::Rc;

/// The wired-up grammar
pub(super) struct Grammar {
    /// Control structures, special commands, and and-or lists
    pub command: Parser<Node>,
    /// Function definitions or commands
    pub statement: Parser<Node>,
    /// The top-level parser
    pub statement_list: Parser<CommandList>,
}

fn special_command(token_parsers: &Rc<TokenParsers>, config: &ParserConfig) -> Parser<Node> {
    let redirection = redir::redirection(token_parsers);
    let mut alternatives: Vec<Parser<Node>> = Vec::new();
    if config.arithmetic_enabled() {
        alternatives.push(arith::arithmetic_command(&redirection));
    }
    if config.conditionals_enabled() {
        alternatives.push(double_bracket::enhanced_test(&redirection));
    }
    if config.arrays_enabled() {
        alternatives.push(array::array_assignment());
    }
    if config.process_substitution_enabled() {
        alternatives.push(word::process_substitution_command());
    }
    alternatives
        .into_iter()
        .reduce(|combined, next| combined.or_else(&next))
        .unwrap_or_else(|| fail_with("no special command form is enabled"))
}

impl Grammar {
    pub fn new(config: &ParserConfig) -> Self {
        let token_parsers = Rc::new(TokenParsers::new());

        let statement_fw = ForwardParser::<Node>::new();
        let statement_list_fw = ForwardParser::<CommandList>::new();
        let handles = StatementGrammar {
            statement: statement_fw.parser(),
            statement_list: statement_list_fw.parser(),
        };

        let simple = simple_command::simple_command(&token_parsers, config);
        let control = compound_command::control_structure(&token_parsers, &handles, config);
        let special = special_command(&token_parsers, config);

        let element = control.or_else(&special).or_else(&simple);
        let pipeline = pipeline::pipeline(&element, &token_parsers);
        let and_or = and_or::and_or_list(&pipeline, &token_parsers);

        let direct = control.or_else(&special);
        let command = {
            let direct = direct.clone();
            let and_or = and_or.clone();
            Parser::new(move |tokens, position| match direct.parse(tokens, position) {
                Ok(success) => match tokens.get(success.position).map(|t| t.kind) {
                    Some(TokenKind::Pipe | TokenKind::AndIf | TokenKind::OrIf) => {
                        and_or.parse(tokens, position)
                    }
                    _ => Ok(success),
                },
                Err(first) => match and_or.parse(tokens, position) {
                    Ok(success) => Ok(success),
                    Err(second) => Err(if first.position > second.position {
                        first
                    } else {
                        second
                    }),
                },
            })
        };

        let function_def =
            function::function_definition(&handles, config.keyword_extensions_enabled());
        let statement = function_def.or_else(&command);
        statement_fw.define(statement.clone());

        let statement_list = list::statement_list(&statement, &token_parsers);
        statement_list_fw.define(statement_list.clone());

        Grammar {
            command,
            statement,
            statement_list,
        }
    }
}
