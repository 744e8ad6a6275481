// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types, codes, and diagnostic rendering for the translator.

use std::fmt;

/// Categories of translation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgErrorKind {
    Syntax,
    Semantic,
    Resource,
}

/// Numeric error codes of the translation error table.
///
/// 0 is reserved for success and never appears here. Codes 1-19 are the
/// grammar and resolution errors; 20 reports symbol-table exhaustion,
/// which is an ordinary compilation error rather than a fatal fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    NumberExpected = 1,
    EqlExpected = 2,
    IdentExpected = 3,
    SeparatorExpected = 4,
    ProcSemicolonExpected = 5,
    PeriodExpected = 6,
    BecomesExpected = 7,
    CallIdentExpected = 8,
    ThenExpected = 9,
    EndExpected = 10,
    DoExpected = 11,
    RelationExpected = 12,
    RParenExpected = 13,
    FactorExpected = 14,
    UndeclaredIdent = 15,
    NotAVariable = 16,
    NotAProcedure = 17,
    NotWritable = 18,
    NotReadable = 19,
    SymbolCapacity = 20,
}

impl ErrorCode {
    pub fn message(self) -> &'static str {
        match self {
            Self::NumberExpected => "'=' must be followed by a number",
            Self::EqlExpected => "identifier must be followed by '='",
            Self::IdentExpected => "identifier expected",
            Self::SeparatorExpected => "',' or ';' missing in declaration",
            Self::ProcSemicolonExpected => "';' expected after procedure declaration",
            Self::PeriodExpected => "'.' expected at end of program",
            Self::BecomesExpected => "':=' expected in assignment",
            Self::CallIdentExpected => "'call' must be followed by an identifier",
            Self::ThenExpected => "'then' expected after condition",
            Self::EndExpected => "';' or 'end' expected",
            Self::DoExpected => "'do' expected after while condition",
            Self::RelationExpected => "relational operator expected",
            Self::RParenExpected => "')' expected",
            Self::FactorExpected => "expression cannot begin with this symbol",
            Self::UndeclaredIdent => "undeclared identifier",
            Self::NotAVariable => "identifier cannot be used as a variable",
            Self::NotAProcedure => "call of a constant or variable is meaningless",
            Self::NotWritable => "'write' must be followed by a constant or variable",
            Self::NotReadable => "'read' must be followed by a variable",
            Self::SymbolCapacity => "too many symbols declared",
        }
    }

    pub fn kind(self) -> CgErrorKind {
        match self {
            Self::UndeclaredIdent
            | Self::NotAVariable
            | Self::NotAProcedure
            | Self::NotWritable
            | Self::NotReadable => CgErrorKind::Semantic,
            Self::SymbolCapacity => CgErrorKind::Resource,
            _ => CgErrorKind::Syntax,
        }
    }
}

/// A reportable translation error: numeric code, source line, and an
/// optional offending lexeme.
#[derive(Debug, Clone)]
pub struct CgError {
    code: ErrorCode,
    line: u32,
    detail: Option<String>,
}

impl CgError {
    pub fn new(code: ErrorCode, line: u32) -> Self {
        Self {
            code,
            line,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn code_number(&self) -> u8 {
        self.code as u8
    }

    pub fn kind(&self) -> CgErrorKind {
        self.code.kind()
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn message(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{}: {detail}", self.code.message()),
            None => self.code.message().to_string(),
        }
    }

    /// Render in the diagnostic line format: `line: ERROR [code] - message`.
    pub fn format(&self) -> String {
        format!(
            "{}: ERROR [{}] - {}",
            self.line,
            self.code as u8,
            self.message()
        )
    }
}

impl fmt::Display for CgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for CgError {}

/// Fatal fault: the instruction store is full and emission cannot continue.
///
/// Deliberately not part of the numeric error table; translation aborts
/// and the caller must treat the run as unrecoverable.
#[derive(Debug, Clone, Copy)]
pub struct CodeLimitExceeded {
    pub limit: usize,
}

impl fmt::Display for CodeLimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "instruction store limit ({}) reached, emission halted",
            self.limit
        )
    }
}

impl std::error::Error for CodeLimitExceeded {}

/// Outcome of a failed translation run.
#[derive(Debug)]
pub enum TranslateError {
    /// An ordinary error from the fixed code table.
    Compile(CgError),
    /// The fatal instruction-capacity fault.
    CodeCapacity(CodeLimitExceeded),
}

impl TranslateError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CodeCapacity(_))
    }
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile(err) => write!(f, "{err}"),
            Self::CodeCapacity(fault) => write!(f, "{fault}"),
        }
    }
}

impl std::error::Error for TranslateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Compile(err) => Some(err),
            Self::CodeCapacity(fault) => Some(fault),
        }
    }
}

impl From<CgError> for TranslateError {
    fn from(err: CgError) -> Self {
        Self::Compile(err)
    }
}

impl From<CodeLimitExceeded> for TranslateError {
    fn from(fault: CodeLimitExceeded) -> Self {
        Self::CodeCapacity(fault)
    }
}
