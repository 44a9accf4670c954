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

//! Parser configuration

/// Overall dialect the parser accepts
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ParsingMode {
    /// POSIX grammar only; the bash-style extensions are rejected.
    StrictPosix,
    /// POSIX grammar plus the bash-style extensions.
    #[default]
    BashCompat,
    /// Like `BashCompat`, tolerating inputs with no commands at all.
    Permissive,
}

/// Switches that select which parts of the grammar are active
///
/// The individual booleans gate single features; [`ParsingMode::StrictPosix`]
/// additionally turns all bash-style extensions off regardless of the
/// booleans.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParserConfig {
    /// Build structured [`Word`](crate::syntax::Word) values for simple
    /// command arguments in addition to the flat string form.
    pub build_word_ast_nodes: bool,
    /// Recognize `<(...)` and `>(...)`.
    pub enable_process_substitution: bool,
    /// Recognize array initialization and element assignment.
    pub enable_arrays: bool,
    /// Recognize `(( ... ))` and the C-style `for` loop.
    pub enable_arithmetic: bool,
    /// Recognize `[[ ... ]]`.
    pub allow_bash_conditionals: bool,
    /// Accept input that contains no commands.
    pub allow_empty_commands: bool,
    /// Grammar dialect.
    pub parsing_mode: ParsingMode,
    /// Collect parse metrics in the registry layer.
    pub trace_parsing: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            build_word_ast_nodes: true,
            enable_process_substitution: true,
            enable_arrays: true,
            enable_arithmetic: true,
            allow_bash_conditionals: true,
            allow_empty_commands: true,
            parsing_mode: ParsingMode::default(),
            trace_parsing: false,
        }
    }
}

impl ParserConfig {
    fn bash_extensions(&self) -> bool {
        self.parsing_mode != ParsingMode::StrictPosix
    }

    /// Whether array forms are parsed under this configuration.
    #[must_use]
    pub fn arrays_enabled(&self) -> bool {
        self.enable_arrays && self.bash_extensions()
    }

    /// Whether `(( ... ))` and C-style `for` are parsed.
    #[must_use]
    pub fn arithmetic_enabled(&self) -> bool {
        self.enable_arithmetic && self.bash_extensions()
    }

    /// Whether `[[ ... ]]` is parsed.
    #[must_use]
    pub fn conditionals_enabled(&self) -> bool {
        self.allow_bash_conditionals && self.bash_extensions()
    }

    /// Whether process substitution is parsed.
    #[must_use]
    pub fn process_substitution_enabled(&self) -> bool {
        self.enable_process_substitution && self.bash_extensions()
    }

    /// Whether `select` loops and the `function` keyword forms are parsed.
    #[must_use]
    pub fn keyword_extensions_enabled(&self) -> bool {
        self.bash_extensions()
    }

    /// Whether an input with no commands is accepted.
    #[must_use]
    pub fn empty_commands_allowed(&self) -> bool {
        self.allow_empty_commands || self.parsing_mode == ParsingMode::Permissive
    }
}
