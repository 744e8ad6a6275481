// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for plForge.

use std::fs::{self, File};
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;

use plforge::compiler::cli::{Cli, OutputFormat};
use plforge::compiler::{output, Codegen};
use plforge::core::error::TranslateError;
use plforge::scanner::Scanner;

struct DiagnosticsSink {
    writer: Box<dyn Write>,
}

impl DiagnosticsSink {
    fn from_cli(cli: &Cli) -> io::Result<Self> {
        let writer: Box<dyn Write> = match &cli.error_file {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(io::stderr()),
        };
        Ok(Self { writer })
    }

    fn emit_line(&mut self, line: &str) {
        let _ = writeln!(self.writer, "{line}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut diagnostics = match DiagnosticsSink::from_cli(&cli) {
        Ok(sink) => sink,
        Err(err) => {
            eprintln!("cannot open diagnostics file: {err}");
            return ExitCode::from(1);
        }
    };

    let source = match fs::read_to_string(&cli.input) {
        Ok(source) => source,
        Err(err) => {
            diagnostics.emit_line(&format!("cannot read {}: {err}", cli.input.display()));
            return ExitCode::from(1);
        }
    };

    let tokens = match Scanner::new(&source).tokenize() {
        Ok(tokens) => tokens,
        Err(err) => {
            match cli.format {
                OutputFormat::Text => {
                    diagnostics.emit_line(&format!("{}: ERROR - {}", err.line, err.message));
                }
                OutputFormat::Json => {
                    diagnostics.emit_line(&output::scan_error_json(&err).to_string());
                }
            }
            return ExitCode::from(1);
        }
    };

    if cli.dump_tokens {
        for token in &tokens {
            diagnostics.emit_line(&format!("{:>5} {:?} {}", token.line, token.kind, token.text));
        }
    }

    let code = match Codegen::new(tokens).translate() {
        Ok(code) => code,
        Err(err) => {
            match cli.format {
                OutputFormat::Text => {
                    let line = match &err {
                        TranslateError::Compile(err) => err.format(),
                        TranslateError::CodeCapacity(fault) => format!("FATAL - {fault}"),
                    };
                    diagnostics.emit_line(&line);
                }
                OutputFormat::Json => {
                    diagnostics.emit_line(&output::translate_error_json(&err).to_string());
                }
            }
            return ExitCode::from(if err.is_fatal() { 2 } else { 1 });
        }
    };

    let written = match &cli.outfile {
        Some(path) => {
            File::create(path).and_then(|mut file| output::write_listing(&mut file, &code, cli.format))
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            output::write_listing(&mut lock, &code, cli.format)
        }
    };
    if let Err(err) = written {
        diagnostics.emit_line(&format!("cannot write listing: {err}"));
        return ExitCode::from(1);
    }

    if !cli.quiet {
        diagnostics.emit_line(&format!("{} instructions emitted", code.len()));
    }
    ExitCode::SUCCESS
}
