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

//! Token types that make up the parser's input
//!
//! The parser does not tokenize source code itself. It consumes a stream of
//! [`Token`]s produced by a lexer, which is responsible for quote removal,
//! expansion recognition, adjacency tracking, and carrying here-document
//! bodies out of band. This module defines that input contract.

use enumset::{EnumSet, EnumSetType, enum_set};

/// Identifier for the lexical category of a token
///
/// The set is closed: a lexer must map every piece of input onto one of these
/// kinds. Reserved words may arrive either pre-classified (e.g. [`If`]) or as
/// plain [`Word`] tokens whose value spells the keyword; the parser accepts
/// both forms.
///
/// [`If`]: TokenKind::If
/// [`Word`]: TokenKind::Word
#[derive(Clone, Copy, Debug, EnumSetType, Eq, Hash, PartialEq)]
#[enumset(no_super_impls)]
pub enum TokenKind {
    /// Unquoted word
    Word,
    /// Quoted string with the surrounding quotes removed
    String,
    /// `$name` variable reference, with the `$` removed
    Variable,
    /// `${...}` parameter expansion, delimiters included
    ParamExpansion,
    /// `$(...)` command substitution, delimiters included
    CommandSub,
    /// `` `...` `` command substitution, delimiters included
    CommandSubBacktick,
    /// `$((...))` arithmetic expansion, delimiters included
    ArithExpansion,
    /// `<(...)` process substitution
    ProcessSubIn,
    /// `>(...)` process substitution
    ProcessSubOut,
    /// `|`
    Pipe,
    /// `;`
    Semicolon,
    /// Newline
    Newline,
    /// `&`
    Ampersand,
    /// `&&`
    AndIf,
    /// `||`
    OrIf,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `((`
    DoubleLParen,
    /// `))`
    DoubleRParen,
    /// `[[`
    DoubleLBracket,
    /// `]]`
    DoubleRBracket,
    /// `;;`
    DoubleSemicolon,
    /// `;&`
    SemicolonAmp,
    /// `;;&`
    AmpSemicolon,
    /// `<`
    RedirectIn,
    /// `>`
    RedirectOut,
    /// `>>`
    RedirectAppend,
    /// `2>`
    RedirectErr,
    /// `2>>`
    RedirectErrAppend,
    /// Fd duplication such as `2>&1` or `>&-`, carried as one token
    RedirectDup,
    /// `<<`
    Heredoc,
    /// `<<-`
    HeredocStrip,
    /// `<<<`
    HereString,
    /// End of input
    Eof,
    /// `!`
    Exclamation,
    If,
    Then,
    Else,
    Elif,
    Fi,
    For,
    Select,
    While,
    Until,
    Do,
    In,
    Done,
    Case,
    Esac,
    Function,
    Break,
    Continue,
    Return,
}

impl TokenKind {
    /// Kinds that can serve as a command word
    ///
    /// `Return` is included because the lexer classifies it as a keyword while
    /// the parser treats it as an ordinary command name.
    pub const WORD_LIKE: EnumSet<TokenKind> = enum_set!(
        TokenKind::Word
            | TokenKind::String
            | TokenKind::Variable
            | TokenKind::ParamExpansion
            | TokenKind::CommandSub
            | TokenKind::CommandSubBacktick
            | TokenKind::ArithExpansion
            | TokenKind::ProcessSubIn
            | TokenKind::ProcessSubOut
            | TokenKind::Return
    );

    /// Kinds that may be merged into a composite word when adjacent
    pub const COMPOSITE_PARTS: EnumSet<TokenKind> = enum_set!(
        TokenKind::Word
            | TokenKind::String
            | TokenKind::Variable
            | TokenKind::ParamExpansion
            | TokenKind::CommandSub
            | TokenKind::CommandSubBacktick
            | TokenKind::ArithExpansion
            | TokenKind::ProcessSubIn
            | TokenKind::ProcessSubOut
    );

    /// Expansion token kinds
    pub const EXPANSIONS: EnumSet<TokenKind> = enum_set!(
        TokenKind::Variable
            | TokenKind::ParamExpansion
            | TokenKind::CommandSub
            | TokenKind::CommandSubBacktick
            | TokenKind::ArithExpansion
            | TokenKind::ProcessSubIn
            | TokenKind::ProcessSubOut
    );

    /// Redirection operator kinds
    pub const REDIRECT_OPERATORS: EnumSet<TokenKind> = enum_set!(
        TokenKind::RedirectIn
            | TokenKind::RedirectOut
            | TokenKind::RedirectAppend
            | TokenKind::RedirectErr
            | TokenKind::RedirectErrAppend
            | TokenKind::RedirectDup
            | TokenKind::Heredoc
            | TokenKind::HeredocStrip
            | TokenKind::HereString
    );

    /// Statement separator kinds
    pub const SEPARATORS: EnumSet<TokenKind> =
        enum_set!(TokenKind::Semicolon | TokenKind::Newline);

    /// Case branch terminator kinds (`;;`, `;&`, `;;&`)
    pub const CASE_TERMINATORS: EnumSet<TokenKind> = enum_set!(
        TokenKind::DoubleSemicolon | TokenKind::SemicolonAmp | TokenKind::AmpSemicolon
    );

    /// Returns true if this kind can serve as a command word.
    #[must_use]
    pub fn is_word_like(self) -> bool {
        Self::WORD_LIKE.contains(self)
    }

    /// Returns true if this kind denotes an expansion.
    #[must_use]
    pub fn is_expansion(self) -> bool {
        Self::EXPANSIONS.contains(self)
    }

    /// Returns true if this kind is a redirection operator.
    #[must_use]
    pub fn is_redirect_operator(self) -> bool {
        Self::REDIRECT_OPERATORS.contains(self)
    }

    /// Returns true if this kind is a statement separator (`;` or newline).
    #[must_use]
    pub fn is_separator(self) -> bool {
        Self::SEPARATORS.contains(self)
    }
}

/// Kind of quotation a token originated from
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum QuoteType {
    /// `'...'`
    Single,
    /// `"..."`
    Double,
}

impl QuoteType {
    /// Returns the quotation character.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            QuoteType::Single => '\'',
            QuoteType::Double => '"',
        }
    }
}

/// Unit of the parser's input
///
/// Tokens are constructed by a lexer with [`Token::new`] and the builder-style
/// methods, then passed to the parser as a slice.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    /// Lexical category
    pub kind: TokenKind,
    /// Literal text
    ///
    /// For a [`Word`](TokenKind::Word) this is the raw source text; for a
    /// [`String`](TokenKind::String) it is the content with the surrounding
    /// quotes removed.
    pub value: String,
    /// Byte offset of the token in the source, for diagnostics
    pub position: usize,
    /// True if no whitespace separated this token from the previous one
    ///
    /// Adjacent word-like tokens are reassembled into one composite word by
    /// the parser.
    pub adjacent_to_previous: bool,
    /// Quotation the token originated from, if any
    pub quote_type: Option<QuoteType>,
    /// Key under which a here-document operator's body is looked up
    ///
    /// The lexer collects here-document bodies out of band and hands them to
    /// the parser in a separate map keyed by this identifier.
    pub heredoc_key: Option<String>,
}

impl Token {
    /// Creates a token with no adjacency, quotation, or here-document key.
    pub fn new(kind: TokenKind, value: impl Into<String>, position: usize) -> Self {
        Token {
            kind,
            value: value.into(),
            position,
            adjacent_to_previous: false,
            quote_type: None,
            heredoc_key: None,
        }
    }

    /// Marks this token as abutting the previous token.
    #[must_use]
    pub fn adjacent(mut self) -> Self {
        self.adjacent_to_previous = true;
        self
    }

    /// Records the quotation this token originated from.
    #[must_use]
    pub fn quoted(mut self, quote_type: QuoteType) -> Self {
        self.quote_type = Some(quote_type);
        self
    }

    /// Attaches a here-document content key to this token.
    #[must_use]
    pub fn with_heredoc_key(mut self, key: impl Into<String>) -> Self {
        self.heredoc_key = Some(key.into());
        self
    }
}
