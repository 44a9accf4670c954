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

//! Syntax parser for the shell language
//!
//! [`ShellParser`] drives the combinator grammar over a token slice: the
//! keyword pre-pass first, then the top-level statement list, a check that
//! every non-trivial token was consumed, and finally the here-document
//! population pass when content is supplied. Parsing is a pure, synchronous
//! function of the input; the parser keeps no references to the tokens after
//! it returns.

mod and_or;
mod arith;
mod array;
mod case;
mod compound_command;
pub mod core;
mod double_bracket;
mod error;
mod for_loop;
mod function;
mod grammar;
mod grouping;
mod heredoc;
mod r#if;
mod list;
mod pipeline;
mod redir;
mod select;
mod simple_command;
#[cfg(test)]
mod testing;
mod tokens;
mod while_loop;
mod word;

pub use self::error::{ErrorKind, Failure, ParseError};
pub use self::heredoc::populate_heredocs;

use self::grammar::Grammar;
use crate::config::ParserConfig;
use crate::keyword::normalize_keywords;
use crate::syntax::{Node, TopLevel};
use crate::token::{Token, TokenKind};
use std::collections::HashMap;

/// Shell command parser
///
/// The parser is built once from a [`ParserConfig`] and may be reused for any
/// number of inputs; independent instances are fully isolated.
pub struct ShellParser {
    config: ParserConfig,
    grammar: Grammar,
}

impl Default for ShellParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellParser {
    /// Creates a parser with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Creates a parser with the given configuration.
    #[must_use]
    pub fn with_config(config: ParserConfig) -> Self {
        let grammar = Grammar::new(&config);
        ShellParser { config, grammar }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Replaces the configuration and rebuilds the grammar.
    pub fn configure(&mut self, config: ParserConfig) {
        self.grammar = Grammar::new(&config);
        self.config = config;
    }

    /// Parses a token slice into a [`TopLevel`] program.
    ///
    /// Trailing newlines and the end-of-input token are ignored; any other
    /// unconsumed token is an error.
    pub fn parse(&self, tokens: &[Token]) -> Result<TopLevel, ParseError> {
        let tokens = normalize_keywords(tokens.to_vec());

        let mut start = 0;
        while start < tokens.len() && tokens[start].kind == TokenKind::Newline {
            start += 1;
        }
        if start >= tokens.len() {
            return self.finish(Vec::new(), &tokens);
        }

        let list = self
            .grammar
            .statement_list
            .parse(&tokens, start)
            .map_err(|failure| ParseError::from_failure(failure, &tokens))?;

        let mut position = list.position;
        while position < tokens.len()
            && matches!(tokens[position].kind, TokenKind::Newline | TokenKind::Eof)
        {
            position += 1;
        }
        if position < tokens.len() {
            // The statement list swallows inner failures when it stops early;
            // re-parse one statement at the stuck point so errors like a
            // missing `fi` are reported instead of a bare unexpected token.
            return match self.grammar.statement.parse(&tokens, position) {
                Err(failure) if failure.position > position => {
                    Err(ParseError::from_failure(failure, &tokens))
                }
                _ => Err(ParseError::unexpected_token(&tokens, position)),
            };
        }

        self.finish(list.value.statements, &tokens)
    }

    fn finish(&self, items: Vec<Node>, tokens: &[Token]) -> Result<TopLevel, ParseError> {
        if items.is_empty() && !self.config.empty_commands_allowed() {
            return Err(ParseError {
                kind: ErrorKind::EmptyCommand,
                message: "the input contains no commands".to_string(),
                position: 0,
                token: tokens.first().cloned(),
            });
        }
        Ok(TopLevel { items })
    }

    /// Parses and then populates here-document bodies from the content map.
    pub fn parse_with_heredocs(
        &self,
        tokens: &[Token],
        heredoc_contents: &HashMap<String, String>,
    ) -> Result<TopLevel, ParseError> {
        let mut program = self.parse(tokens)?;
        populate_heredocs(&mut program, heredoc_contents);
        Ok(program)
    }

    /// Parses as much of the input as possible.
    ///
    /// Falls back from the whole program to a single statement and then to a
    /// single command, returning the furthest successful parse and the
    /// position where it stopped. `(None, position)` means nothing parsed.
    pub fn parse_partial(&self, tokens: &[Token]) -> (Option<Node>, usize) {
        let tokens = normalize_keywords(tokens.to_vec());

        let mut start = 0;
        while start < tokens.len() && tokens[start].kind == TokenKind::Newline {
            start += 1;
        }
        if start >= tokens.len() {
            return (None, start);
        }

        if let Ok(success) = self.grammar.statement_list.parse(&tokens, start) {
            if !success.value.statements.is_empty() {
                return (Some(Node::CommandList(success.value)), success.position);
            }
        }
        if let Ok(success) = self.grammar.statement.parse(&tokens, start) {
            return (Some(success.value), success.position);
        }
        if let Ok(success) = self.grammar.command.parse(&tokens, start) {
            return (Some(success.value), success.position);
        }
        (None, start)
    }

    /// Returns true when [`parse`](Self::parse) would succeed and consume the
    /// whole input.
    #[must_use]
    pub fn can_parse(&self, tokens: &[Token]) -> bool {
        self.parse(tokens).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParsingMode;
    use crate::syntax::{
        AndOr, CaseContinuation, Node, RedirOp, SimpleCommand, TestExpression,
    };
    use crate::token::QuoteType;
    use assert_matches::assert_matches;

    fn t(kind: TokenKind, value: &str) -> Token {
        Token::new(kind, value, 0)
    }

    fn word(value: &str) -> Token {
        t(TokenKind::Word, value)
    }

    fn semi() -> Token {
        t(TokenKind::Semicolon, ";")
    }

    fn parse(tokens: &[Token]) -> TopLevel {
        ShellParser::new().parse(tokens).unwrap()
    }

    /// Digs the simple command out of the standard AndOrList/Pipeline
    /// wrapping.
    fn simple_command_of(node: &Node) -> &SimpleCommand {
        let Node::AndOrList(list) = node else {
            panic!("not an and-or list: {node:?}");
        };
        let Node::Pipeline(pipeline) = &list.pipelines[0] else {
            panic!("not a pipeline: {:?}", list.pipelines[0]);
        };
        let Node::SimpleCommand(command) = &pipeline.commands[0] else {
            panic!("not a simple command: {:?}", pipeline.commands[0]);
        };
        command
    }

    #[test]
    fn echo_with_redirect() {
        // echo hello > file.txt
        let tokens = [
            word("echo"),
            word("hello"),
            t(TokenKind::RedirectOut, ">"),
            word("file.txt"),
        ];
        let program = parse(&tokens);
        assert_eq!(program.items.len(), 1);
        let command = simple_command_of(&program.items[0]);
        assert_eq!(command.args, ["echo", "hello"]);
        assert_eq!(command.redirects.len(), 1);
        assert_eq!(command.redirects[0].r#type, RedirOp::Out);
        assert_eq!(command.redirects[0].target.as_deref(), Some("file.txt"));
        assert_eq!(command.redirects[0].fd, None);
    }

    #[test]
    fn if_else_statement() {
        // if test -f /etc/passwd; then echo ok; else echo no; fi
        let tokens = [
            word("if"), word("test"), word("-f"), word("/etc/passwd"), semi(),
            word("then"), word("echo"), word("ok"), semi(),
            word("else"), word("echo"), word("no"), semi(),
            word("fi"),
        ];
        let program = parse(&tokens);
        assert_matches!(&program.items[0], Node::IfConditional(cond) => {
            let condition = simple_command_of(&cond.condition.statements[0]);
            assert_eq!(condition.args, ["test", "-f", "/etc/passwd"]);
            let then = simple_command_of(&cond.then_part.statements[0]);
            assert_eq!(then.args, ["echo", "ok"]);
            assert_eq!(cond.elif_parts, []);
            let else_part = cond.else_part.as_ref().unwrap();
            let no = simple_command_of(&else_part.statements[0]);
            assert_eq!(no.args, ["echo", "no"]);
        });
    }

    #[test]
    fn for_loop_over_words() {
        // for i in 1 2 3; do echo $i; done
        let tokens = [
            word("for"), word("i"), word("in"), word("1"), word("2"), word("3"), semi(),
            word("do"), word("echo"), t(TokenKind::Variable, "i"), semi(), word("done"),
        ];
        let program = parse(&tokens);
        assert_matches!(&program.items[0], Node::ForLoop(f) => {
            assert_eq!(f.variable, "i");
            assert_eq!(f.items, ["1", "2", "3"]);
            assert_eq!(f.item_quote_types, [None, None, None]);
            let body = simple_command_of(&f.body.statements[0]);
            assert_eq!(body.args, ["echo", "$i"]);
        });
    }

    #[test]
    fn case_statement() {
        // case $x in a|b) echo AB;; *) echo other;; esac
        let tokens = [
            word("case"), t(TokenKind::Variable, "x"), word("in"),
            word("a"), t(TokenKind::Pipe, "|"), word("b"), t(TokenKind::RParen, ")"),
            word("echo"), word("AB"), t(TokenKind::DoubleSemicolon, ";;"),
            word("*"), t(TokenKind::RParen, ")"),
            word("echo"), word("other"), t(TokenKind::DoubleSemicolon, ";;"),
            word("esac"),
        ];
        let program = parse(&tokens);
        assert_matches!(&program.items[0], Node::CaseConditional(case) => {
            assert_eq!(case.expr, "$x");
            assert_eq!(case.items.len(), 2);
            let patterns: Vec<_> = case.items[0].patterns.iter().map(|p| p.pattern.as_str()).collect();
            assert_eq!(patterns, ["a", "b"]);
            assert_eq!(case.items[0].terminator, CaseContinuation::Break);
            assert_eq!(case.items[1].patterns[0].pattern, "*");
        });
    }

    #[test]
    fn function_definition() {
        // foo() { echo "$1"; }
        let tokens = [
            word("foo"), t(TokenKind::LParen, "("), t(TokenKind::RParen, ")"),
            t(TokenKind::LBrace, "{"),
            word("echo"), t(TokenKind::String, "$1").quoted(QuoteType::Double), semi(),
            t(TokenKind::RBrace, "}"),
        ];
        let program = parse(&tokens);
        assert_matches!(&program.items[0], Node::FunctionDef(f) => {
            assert_eq!(f.name, "foo");
            let body = simple_command_of(&f.body.statements[0]);
            assert_eq!(body.args, ["echo", "$1"]);
        });
    }

    #[test]
    fn arithmetic_command() {
        // (( x = (1 + 2) * 3 ))
        let tokens = [
            t(TokenKind::DoubleLParen, "(("),
            word("x"), word("="), word("(1"), word("+"), word("2)"), word("*"), word("3"),
            t(TokenKind::DoubleRParen, "))"),
        ];
        let program = parse(&tokens);
        assert_matches!(&program.items[0], Node::ArithmeticEvaluation(arith) => {
            assert_eq!(arith.expression, "x = (1 + 2) * 3");
        });
    }

    #[test]
    fn enhanced_test_collapses_compound_condition() {
        // [[ -f "$f" && "$s" == "ok" ]]
        let tokens = [
            t(TokenKind::DoubleLBracket, "[["),
            word("-f"), t(TokenKind::String, "$f").quoted(QuoteType::Double),
            word("&&"),
            t(TokenKind::String, "$s").quoted(QuoteType::Double),
            word("=="), t(TokenKind::String, "ok").quoted(QuoteType::Double),
            t(TokenKind::DoubleRBracket, "]]"),
        ];
        let program = parse(&tokens);
        assert_matches!(&program.items[0], Node::EnhancedTestStatement(test) => {
            assert_matches!(&test.expression, TestExpression::Binary { .. });
        });
    }

    #[test]
    fn array_initialization() {
        // arr=(one two three)
        let tokens = [
            word("arr="), t(TokenKind::LParen, "("),
            word("one"), word("two"), word("three"),
            t(TokenKind::RParen, ")"),
        ];
        let program = parse(&tokens);
        assert_matches!(&program.items[0], Node::ArrayInitialization(init) => {
            assert_eq!(init.name, "arr");
            assert_eq!(init.elements, ["one", "two", "three"]);
            assert!(!init.is_append);
        });
    }

    #[test]
    fn heredoc_contents_are_populated() {
        // cmd <<EOF ... EOF with the body supplied out of band
        let tokens = [
            word("cmd"),
            t(TokenKind::Heredoc, "<<").with_heredoc_key("heredoc_1"),
            word("EOF"),
        ];
        let contents = HashMap::from([("heredoc_1".to_string(), "hello\n".to_string())]);
        let program = ShellParser::new()
            .parse_with_heredocs(&tokens, &contents)
            .unwrap();
        let command = simple_command_of(&program.items[0]);
        assert_eq!(command.redirects[0].r#type, RedirOp::HereDoc);
        assert_eq!(command.redirects[0].target.as_deref(), Some("EOF"));
        assert_eq!(command.redirects[0].heredoc_content.as_deref(), Some("hello\n"));
    }

    #[test]
    fn empty_input_parses_to_empty_program() {
        assert_eq!(parse(&[]).items, []);
        let tokens = [t(TokenKind::Newline, "\n"), t(TokenKind::Eof, "")];
        assert_eq!(parse(&tokens).items, []);
    }

    #[test]
    fn trailing_newline_and_eof_are_ignored() {
        let tokens = [
            word("echo"),
            t(TokenKind::Newline, "\n"),
            t(TokenKind::Eof, ""),
        ];
        let program = parse(&tokens);
        assert_eq!(program.items.len(), 1);
    }

    #[test]
    fn unconsumed_token_is_an_error() {
        let tokens = [word("echo"), t(TokenKind::RParen, ")")];
        let error = ShellParser::new().parse(&tokens).unwrap_err();
        assert_eq!(error.kind, ErrorKind::UnexpectedToken);
        assert_eq!(error.position, 1);
        assert_matches!(&error.token, Some(token) if token.kind == TokenKind::RParen);
    }

    #[test]
    fn inner_failure_is_surfaced() {
        // `if` without `fi`: the error names the missing keyword rather than
        // reporting an unexpected `if` token.
        let tokens = [word("if"), word("a"), semi(), word("then"), word("b")];
        let error = ShellParser::new().parse(&tokens).unwrap_err();
        assert!(error.message.contains("`fi`"));
    }

    #[test]
    fn keyword_word_and_typed_forms_parse_identically() {
        let as_words = [
            word("while"), word("true"), semi(), word("do"), word("x"), semi(), word("done"),
        ];
        let as_kinds = [
            t(TokenKind::While, "while"), word("true"), semi(), t(TokenKind::Do, "do"),
            word("x"), semi(), t(TokenKind::Done, "done"),
        ];
        assert_eq!(parse(&as_words), parse(&as_kinds));
    }

    #[test]
    fn parsing_is_deterministic() {
        let tokens = [
            word("a"), t(TokenKind::AndIf, "&&"), word("b"),
            t(TokenKind::Pipe, "|"), word("c"), semi(), word("d"),
        ];
        assert_eq!(parse(&tokens), parse(&tokens));
    }

    #[test]
    fn and_or_list_operators() {
        let tokens = [
            word("a"), t(TokenKind::AndIf, "&&"), word("b"),
            t(TokenKind::OrIf, "||"), word("c"),
        ];
        let program = parse(&tokens);
        assert_matches!(&program.items[0], Node::AndOrList(list) => {
            assert_eq!(list.pipelines.len(), 3);
            assert_eq!(list.operators, [AndOr::AndThen, AndOr::OrElse]);
        });
    }

    #[test]
    fn adjacent_tokens_form_one_argument() {
        let tokens = [
            word("echo"),
            word("a"),
            t(TokenKind::Variable, "b").adjacent(),
            word("c").adjacent(),
        ];
        let program = parse(&tokens);
        let command = simple_command_of(&program.items[0]);
        assert_eq!(command.args, ["echo", "a$bc"]);
        assert_eq!(command.words.len(), 2);
        assert_eq!(command.words[1].parts.len(), 3);
    }

    #[test]
    fn control_structure_inside_pipeline() {
        // { produce; } | consume
        let tokens = [
            t(TokenKind::LBrace, "{"), word("produce"), semi(), t(TokenKind::RBrace, "}"),
            t(TokenKind::Pipe, "|"), word("consume"),
        ];
        let program = parse(&tokens);
        assert_matches!(&program.items[0], Node::AndOrList(list) => {
            assert_matches!(&list.pipelines[0], Node::Pipeline(p) => {
                assert_eq!(p.commands.len(), 2);
                assert_matches!(&p.commands[0], Node::BraceGroup(_));
            });
        });
    }

    #[test]
    fn standalone_control_structure_is_unwrapped() {
        let tokens = [
            word("while"), word("x"), semi(), word("do"), word("y"), semi(), word("done"),
        ];
        let program = parse(&tokens);
        // Neither a Pipeline nor an AndOrList wraps the loop.
        assert_matches!(&program.items[0], Node::WhileLoop(_));
    }

    #[test]
    fn parse_partial_returns_furthest_prefix() {
        let tokens = [word("echo"), word("hi"), semi(), t(TokenKind::RParen, ")")];
        let parser = ShellParser::new();
        let (node, position) = parser.parse_partial(&tokens);
        assert_matches!(node, Some(Node::CommandList(list)) if list.statements.len() == 1);
        assert_eq!(position, 3);
        // The prefix up to the reported position parses on its own.
        assert!(parser.can_parse(&tokens[..position]));
    }

    #[test]
    fn parse_partial_of_unparsable_input() {
        let tokens = [t(TokenKind::RParen, ")")];
        let (node, position) = ShellParser::new().parse_partial(&tokens);
        assert_eq!(node, None);
        assert_eq!(position, 0);
    }

    #[test]
    fn can_parse_checks_full_consumption() {
        let parser = ShellParser::new();
        assert!(parser.can_parse(&[word("ls")]));
        assert!(parser.can_parse(&[]));
        assert!(!parser.can_parse(&[word("ls"), t(TokenKind::RParen, ")")]));
        assert!(!parser.can_parse(&[word("if"), word("x"), semi()]));
    }

    #[test]
    fn strict_posix_mode_rejects_array_syntax() {
        let parser = ShellParser::with_config(ParserConfig {
            parsing_mode: ParsingMode::StrictPosix,
            ..ParserConfig::default()
        });
        let tokens = [
            word("arr="), t(TokenKind::LParen, "("), word("x"), t(TokenKind::RParen, ")"),
        ];
        assert!(parser.parse(&tokens).is_err());
    }

    #[test]
    fn empty_commands_can_be_disallowed() {
        let parser = ShellParser::with_config(ParserConfig {
            allow_empty_commands: false,
            ..ParserConfig::default()
        });
        let error = parser.parse(&[t(TokenKind::Newline, "\n")]).unwrap_err();
        assert_eq!(error.kind, ErrorKind::EmptyCommand);
        assert!(parser.parse(&[word("ls")]).is_ok());
    }

    #[test]
    fn configure_rebuilds_the_grammar() {
        let mut parser = ShellParser::new();
        let tokens = [
            t(TokenKind::DoubleLParen, "(("), word("x"), t(TokenKind::DoubleRParen, "))"),
        ];
        assert!(parser.parse(&tokens).is_ok());
        parser.configure(ParserConfig {
            enable_arithmetic: false,
            ..ParserConfig::default()
        });
        assert!(parser.parse(&tokens).is_err());
    }

    #[test]
    fn background_command() {
        let tokens = [word("sleep"), word("9"), t(TokenKind::Ampersand, "&")];
        let program = parse(&tokens);
        let command = simple_command_of(&program.items[0]);
        assert!(command.background);
    }

    #[test]
    fn process_substitution_as_argument() {
        let tokens = [
            word("diff"),
            t(TokenKind::ProcessSubIn, "<(sort a)"),
            t(TokenKind::ProcessSubIn, "<(sort b)"),
        ];
        let program = parse(&tokens);
        let command = simple_command_of(&program.items[0]);
        assert_eq!(command.args, ["diff", "<(sort a)", "<(sort b)"]);
        assert_eq!(command.words.len(), 3);
    }

    #[test]
    fn heredoc_pass_is_idempotent_through_the_api() {
        let tokens = [
            word("cmd"),
            t(TokenKind::Heredoc, "<<").with_heredoc_key("k"),
            word("END"),
        ];
        let contents = HashMap::from([("k".to_string(), "body\n".to_string())]);
        let parser = ShellParser::new();
        let mut once = parser.parse_with_heredocs(&tokens, &contents).unwrap();
        let twice = once.clone();
        populate_heredocs(&mut once, &contents);
        assert_eq!(once, twice);
    }
}
