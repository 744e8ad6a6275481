// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Listing output in text and JSON form.

use std::io::{self, Write};

use serde_json::json;

use crate::compiler::cli::OutputFormat;
use crate::core::code::CodeStore;
use crate::core::error::TranslateError;
use crate::scanner::ScanError;

/// Write the listing in the selected format.
pub fn write_listing<W: Write>(
    sink: &mut W,
    code: &CodeStore,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => code.serialize(sink),
        OutputFormat::Json => writeln!(sink, "{}", listing_json(code)),
    }
}

pub fn listing_json(code: &CodeStore) -> serde_json::Value {
    let instructions: Vec<serde_json::Value> = code
        .instructions()
        .iter()
        .map(|instr| {
            json!({
                "mnemonic": instr.op.mnemonic(),
                "op": instr.op as u8,
                "r": instr.r,
                "l": instr.l,
                "m": instr.m,
            })
        })
        .collect();
    json!({ "count": code.len(), "instructions": instructions })
}

pub fn scan_error_json(err: &ScanError) -> serde_json::Value {
    json!({
        "error": {
            "stage": "scan",
            "line": err.line,
            "message": err.message,
        }
    })
}

pub fn translate_error_json(err: &TranslateError) -> serde_json::Value {
    match err {
        TranslateError::Compile(err) => json!({
            "error": {
                "stage": "codegen",
                "code": err.code_number(),
                "line": err.line(),
                "message": err.message(),
            }
        }),
        TranslateError::CodeCapacity(fault) => json!({
            "error": {
                "stage": "codegen",
                "fatal": true,
                "message": fault.to_string(),
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::code::Opcode;
    use crate::core::error::{CgError, ErrorCode};

    #[test]
    fn text_listing_matches_serialize() {
        let mut code = CodeStore::new();
        code.emit(Opcode::Inc, 0, 0, 5).expect("emit");
        code.emit(Opcode::SioHalt, 0, 0, 3).expect("emit");
        let mut out = Vec::new();
        write_listing(&mut out, &code, OutputFormat::Text).expect("write");
        assert_eq!(String::from_utf8(out).expect("utf8"), "6 0 0 5\n11 0 0 3\n");
    }

    #[test]
    fn json_listing_carries_mnemonics_and_fields() {
        let mut code = CodeStore::new();
        code.emit(Opcode::Lit, 1, 0, 42).expect("emit");
        let payload = listing_json(&code);
        assert_eq!(payload["count"], 1);
        assert_eq!(payload["instructions"][0]["mnemonic"], "LIT");
        assert_eq!(payload["instructions"][0]["op"], 1);
        assert_eq!(payload["instructions"][0]["m"], 42);
    }

    #[test]
    fn error_payload_carries_code_and_line() {
        let err = TranslateError::Compile(CgError::new(ErrorCode::PeriodExpected, 4));
        let payload = translate_error_json(&err);
        assert_eq!(payload["error"]["code"], 6);
        assert_eq!(payload["error"]["line"], 4);
    }
}
