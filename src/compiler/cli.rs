// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const LONG_ABOUT: &str = "Single-pass compiler for a small block-structured language \
(constants, variables, nested procedures, structured control flow, console I/O), \
emitting bytecode for a small register-based stack machine.

The instruction listing goes to stdout unless -o/--outfile names a file.
Diagnostics go to stderr unless -E/--error names a file.
--format json switches the listing and diagnostics to machine-readable output.";

#[derive(Parser, Debug)]
#[command(
    name = "plForge",
    version = VERSION,
    about = "Single-pass compiler for a small block-structured language targeting a stack machine",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(value_name = "FILE", help = "Source file to translate")]
    pub input: PathBuf,
    #[arg(
        short = 'o',
        long = "outfile",
        value_name = "FILE",
        long_help = "Write the instruction listing to FILE instead of stdout."
    )]
    pub outfile: Option<PathBuf>,
    #[arg(
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        long_help = "Select output format. text is the four-column listing; json emits a machine-readable listing and diagnostics."
    )]
    pub format: OutputFormat,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        long_help = "Suppress the success summary on the diagnostics sink. Errors are still reported."
    )]
    pub quiet: bool,
    #[arg(
        short = 'E',
        long = "error",
        value_name = "FILE",
        long_help = "Write diagnostics to FILE instead of stderr."
    )]
    pub error_file: Option<PathBuf>,
    #[arg(
        long = "tokens",
        action = ArgAction::SetTrue,
        long_help = "Dump the scanned token stream to the diagnostics sink before code generation."
    )]
    pub dump_tokens: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
