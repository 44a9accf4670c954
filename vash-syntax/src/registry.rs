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

//! Parser registry and strategy wrapper
//!
//! A thin dispatch layer over the parser implementations: names and aliases
//! map to constructors, and a [`ParserStrategy`] holds the active
//! implementation so callers can hot-swap it. The registry collects
//! [`ParseMetrics`] per parse when tracing is enabled; it never affects
//! parsing semantics.

use crate::config::ParserConfig;
use crate::parser::{ParseError, ShellParser};
use crate::syntax::TopLevel;
use crate::token::Token;
use std::time::{Duration, Instant};

/// Measurements taken around one parse
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseMetrics {
    /// Number of tokens in the input
    pub tokens_consumed: usize,
    /// Number of top-level statements produced
    pub statements: usize,
    /// Wall-clock time of the parse
    pub elapsed: Duration,
}

struct RegistryEntry {
    name: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
    construct: fn(ParserConfig) -> ShellParser,
}

impl RegistryEntry {
    fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }
}

/// Name-based lookup of parser implementations
pub struct ParserRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserRegistry {
    /// Creates a registry holding the built-in implementations.
    #[must_use]
    pub fn new() -> Self {
        ParserRegistry {
            entries: vec![RegistryEntry {
                name: "combinator",
                aliases: &["default", "modular"],
                description: "modular parser built from composable combinators",
                construct: ShellParser::with_config,
            }],
        }
    }

    /// Constructs the named parser, accepting aliases.
    #[must_use]
    pub fn create(&self, name: &str, config: ParserConfig) -> Option<ShellParser> {
        self.entries
            .iter()
            .find(|entry| entry.matches(name))
            .map(|entry| (entry.construct)(config))
    }

    /// Lists the canonical implementation names.
    #[must_use]
    pub fn list_parsers(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }

    /// Returns the description of the named implementation.
    #[must_use]
    pub fn describe(&self, name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|entry| entry.matches(name))
            .map(|entry| entry.description)
    }
}

/// Swappable handle on the active parser implementation
pub struct ParserStrategy {
    registry: ParserRegistry,
    config: ParserConfig,
    active_name: &'static str,
    active: ShellParser,
    last_metrics: Option<ParseMetrics>,
}

impl Default for ParserStrategy {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl ParserStrategy {
    /// Creates a strategy using the default implementation.
    #[must_use]
    pub fn new(config: ParserConfig) -> Self {
        let registry = ParserRegistry::new();
        let active = ShellParser::with_config(config.clone());
        ParserStrategy {
            registry,
            config,
            active_name: "combinator",
            active,
            last_metrics: None,
        }
    }

    /// Returns the canonical name of the active implementation.
    #[must_use]
    pub fn active_name(&self) -> &str {
        self.active_name
    }

    /// Switches to another registered implementation.
    ///
    /// Returns false and leaves the strategy unchanged when the name is
    /// unknown.
    pub fn switch_to(&mut self, name: &str) -> bool {
        let Some(entry_name) = self
            .registry
            .entries
            .iter()
            .find(|entry| entry.matches(name))
            .map(|entry| entry.name)
        else {
            return false;
        };
        if let Some(parser) = self.registry.create(entry_name, self.config.clone()) {
            self.active = parser;
            self.active_name = entry_name;
            true
        } else {
            false
        }
    }

    /// Parses through the active implementation, recording metrics when the
    /// configuration enables tracing.
    pub fn parse(&mut self, tokens: &[Token]) -> Result<TopLevel, ParseError> {
        if !self.config.trace_parsing {
            self.last_metrics = None;
            return self.active.parse(tokens);
        }
        let started = Instant::now();
        let result = self.active.parse(tokens);
        let elapsed = started.elapsed();
        if let Ok(program) = &result {
            self.last_metrics = Some(ParseMetrics {
                tokens_consumed: tokens.len(),
                statements: program.items.len(),
                elapsed,
            });
        }
        result
    }

    /// Returns the metrics of the most recent successful traced parse.
    #[must_use]
    pub fn last_metrics(&self) -> Option<&ParseMetrics> {
        self.last_metrics.as_ref()
    }
}
