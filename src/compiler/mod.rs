// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Fused recursive-descent parser and code generator.
//!
//! One method per grammar nonterminal; a single traversal validates
//! syntax, resolves names through the scope chain, drives the register
//! stack, and emits instructions, backpatching forward jumps as their
//! targets become known. No intermediate tree is built, and the first
//! error aborts the run.

pub mod cli;
pub mod output;


use crate::core::code::{CodeStore, Opcode};
use crate::core::cursor::TokenCursor;
use crate::core::error::{CgError, ErrorCode, TranslateError};
use crate::core::register::RegisterStack;
use crate::core::symbol_table::{Symbol, SymbolId, SymbolKind, SymbolTable};
use crate::scanner::{Token, TokenKind};

/// Stack cells reserved ahead of a block's locals for the frame header.
pub const FRAME_HEADER: i32 = 4;

type CgResult<T> = Result<T, TranslateError>;

/// Compilation context for one translation run.
///
/// Everything the grammar methods touch lives here; independent runs
/// share nothing and can proceed on separate threads.
pub struct Codegen {
    cursor: TokenCursor,
    symbols: SymbolTable,
    code: CodeStore,
    regs: RegisterStack,
    level: u32,
    scope: Option<SymbolId>,
}

impl Codegen {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_code_limit(tokens, crate::core::code::MAX_CODE_LENGTH)
    }

    /// Context with a custom instruction limit, so the capacity fault can
    /// be exercised without emitting hundreds of instructions.
    pub fn with_code_limit(tokens: Vec<Token>, limit: usize) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
            symbols: SymbolTable::new(),
            code: CodeStore::with_limit(limit),
            regs: RegisterStack::new(),
            level: 0,
            scope: None,
        }
    }

    /// Run the translation. On success the finished instruction sequence
    /// is returned and the context is spent.
    pub fn translate(mut self) -> Result<CodeStore, TranslateError> {
        self.program()?;
        debug_assert_eq!(self.regs.live(), 0, "live registers after translation");
        Ok(self.code)
    }

    fn err(&self, code: ErrorCode) -> TranslateError {
        TranslateError::Compile(CgError::new(code, self.cursor.line()))
    }

    fn err_at(&self, code: ErrorCode, detail: &str) -> TranslateError {
        TranslateError::Compile(CgError::new(code, self.cursor.line()).with_detail(detail))
    }

    fn expect(&mut self, kind: TokenKind, code: ErrorCode) -> CgResult<()> {
        if self.cursor.kind() != kind {
            return Err(self.err(code));
        }
        self.cursor.advance();
        Ok(())
    }

    fn resolve(&self, name: &str) -> CgResult<SymbolId> {
        self.symbols
            .lookup(self.scope, name)
            .ok_or_else(|| self.err_at(ErrorCode::UndeclaredIdent, name))
    }

    fn bind(&mut self, name: String, kind: SymbolKind, value: i32, address: usize) -> CgResult<SymbolId> {
        let symbol = Symbol {
            name,
            kind,
            value,
            level: self.level,
            scope: self.scope,
            address,
        };
        match self.symbols.add(symbol) {
            Ok(id) => Ok(id),
            Err(_) => Err(self.err(ErrorCode::SymbolCapacity)),
        }
    }

    fn number_value(&self) -> CgResult<i32> {
        let token = self.cursor.current();
        token
            .text
            .parse::<i32>()
            .map_err(|_| self.err_at(ErrorCode::NumberExpected, &token.text))
    }

    /// Variable access, load and store alike: declaration level minus
    /// current level.
    fn level_diff_access(&self, id: SymbolId) -> i32 {
        self.symbols.get(id).level as i32 - self.level as i32
    }

    /// Procedure call: current level minus declaration level.
    fn level_diff_call(&self, id: SymbolId) -> i32 {
        self.level as i32 - self.symbols.get(id).level as i32
    }

    fn program(&mut self) -> CgResult<()> {
        self.block(None)?;
        if self.cursor.kind() != TokenKind::Period {
            return Err(self.err(ErrorCode::PeriodExpected));
        }
        self.cursor.advance();
        self.code.emit(Opcode::SioHalt, 0, 0, 3)?;
        Ok(())
    }

    fn block(&mut self, owner: Option<SymbolId>) -> CgResult<()> {
        self.level += 1;
        let enclosing = self.scope;
        self.scope = owner;

        if self.cursor.kind() == TokenKind::ConstKw {
            self.const_declaration()?;
        }
        let locals = if self.cursor.kind() == TokenKind::VarKw {
            self.var_declaration()?
        } else {
            0
        };
        self.code.emit(Opcode::Inc, 0, 0, FRAME_HEADER + locals)?;

        // Procedure bodies are emitted inline; straight-line execution of
        // the block skips over them through these jumps, all patched to
        // the position after the last body.
        let mut skips = Vec::new();
        while self.cursor.kind() == TokenKind::ProcedureKw {
            skips.push(self.code.emit_jump(Opcode::Jmp, 0)?);
            self.proc_declaration()?;
        }
        let past_bodies = self.code.next_index();
        for slot in skips {
            self.code.patch(slot, past_bodies);
        }

        self.statement()?;
        self.code.emit(Opcode::Rtn, 0, 0, 0)?;

        self.scope = enclosing;
        self.level -= 1;
        Ok(())
    }

    fn const_declaration(&mut self) -> CgResult<()> {
        loop {
            self.cursor.advance();
            if self.cursor.kind() != TokenKind::Ident {
                return Err(self.err(ErrorCode::IdentExpected));
            }
            let name = self.cursor.current().text.clone();
            self.cursor.advance();
            self.expect(TokenKind::Eql, ErrorCode::EqlExpected)?;
            if self.cursor.kind() != TokenKind::Number {
                return Err(self.err(ErrorCode::NumberExpected));
            }
            let value = self.number_value()?;
            self.bind(name, SymbolKind::Constant, value, 0)?;
            self.cursor.advance();
            if self.cursor.kind() != TokenKind::Comma {
                break;
            }
        }
        self.expect(TokenKind::Semicolon, ErrorCode::SeparatorExpected)
    }

    /// Parse `var ident {, ident} ;` and return the local count. Frame
    /// offsets are assigned in declaration order from 0.
    fn var_declaration(&mut self) -> CgResult<i32> {
        let mut count = 0;
        loop {
            self.cursor.advance();
            if self.cursor.kind() != TokenKind::Ident {
                return Err(self.err(ErrorCode::IdentExpected));
            }
            let name = self.cursor.current().text.clone();
            self.bind(name, SymbolKind::Variable, 0, count as usize)?;
            count += 1;
            self.cursor.advance();
            if self.cursor.kind() != TokenKind::Comma {
                break;
            }
        }
        self.expect(TokenKind::Semicolon, ErrorCode::SeparatorExpected)?;
        Ok(count)
    }

    fn proc_declaration(&mut self) -> CgResult<()> {
        self.cursor.advance();
        if self.cursor.kind() != TokenKind::Ident {
            return Err(self.err(ErrorCode::IdentExpected));
        }
        let name = self.cursor.current().text.clone();
        // Bound before the body compiles so recursive calls resolve; the
        // recorded address is the body's first instruction.
        let entry = self.code.next_index();
        let id = self.bind(name, SymbolKind::Procedure, 0, entry)?;
        self.cursor.advance();
        self.expect(TokenKind::Semicolon, ErrorCode::ProcSemicolonExpected)?;
        self.block(Some(id))?;
        self.expect(TokenKind::Semicolon, ErrorCode::ProcSemicolonExpected)
    }

    fn statement(&mut self) -> CgResult<()> {
        match self.cursor.kind() {
            TokenKind::Ident => self.assignment()?,
            TokenKind::CallKw => self.call_statement()?,
            TokenKind::BeginKw => self.compound_statement()?,
            TokenKind::IfKw => self.if_statement()?,
            TokenKind::WhileKw => self.while_statement()?,
            TokenKind::ReadKw => self.read_statement()?,
            TokenKind::WriteKw => self.write_statement()?,
            // the empty statement
            _ => {}
        }
        debug_assert_eq!(self.regs.live(), 0, "live registers at statement boundary");
        Ok(())
    }

    fn assignment(&mut self) -> CgResult<()> {
        let name = self.cursor.current().text.clone();
        let id = self.resolve(&name)?;
        if self.symbols.get(id).kind != SymbolKind::Variable {
            return Err(self.err_at(ErrorCode::NotAVariable, &name));
        }
        let ldiff = self.level_diff_access(id);
        let address = self.symbols.get(id).address;
        self.cursor.advance();
        self.expect(TokenKind::Becomes, ErrorCode::BecomesExpected)?;
        self.expression()?;
        let r = self.regs.top();
        self.code.emit(Opcode::Sto, r, ldiff, address as i32)?;
        self.regs.release();
        Ok(())
    }

    fn call_statement(&mut self) -> CgResult<()> {
        self.cursor.advance();
        if self.cursor.kind() != TokenKind::Ident {
            return Err(self.err(ErrorCode::CallIdentExpected));
        }
        let name = self.cursor.current().text.clone();
        let id = self.resolve(&name)?;
        if self.symbols.get(id).kind != SymbolKind::Procedure {
            return Err(self.err_at(ErrorCode::NotAProcedure, &name));
        }
        let ldiff = self.level_diff_call(id);
        let entry = self.symbols.get(id).address;
        self.code.emit(Opcode::Cal, 0, ldiff, entry as i32)?;
        self.cursor.advance();
        Ok(())
    }

    fn compound_statement(&mut self) -> CgResult<()> {
        self.cursor.advance();
        self.statement()?;
        while self.cursor.kind() == TokenKind::Semicolon {
            self.cursor.advance();
            self.statement()?;
        }
        self.expect(TokenKind::EndKw, ErrorCode::EndExpected)
    }

    fn if_statement(&mut self) -> CgResult<()> {
        self.cursor.advance();
        self.condition()?;
        self.expect(TokenKind::ThenKw, ErrorCode::ThenExpected)?;
        let test = self.regs.top();
        let skip_then = self.code.emit_jump(Opcode::Jpc, test)?;
        self.regs.release();
        self.statement()?;
        if self.cursor.kind() == TokenKind::ElseKw {
            self.cursor.advance();
            let skip_else = self.code.emit_jump(Opcode::Jmp, 0)?;
            let else_start = self.code.next_index();
            self.code.patch(skip_then, else_start);
            self.statement()?;
            let past_else = self.code.next_index();
            self.code.patch(skip_else, past_else);
        } else {
            let past_then = self.code.next_index();
            self.code.patch(skip_then, past_then);
        }
        Ok(())
    }

    fn while_statement(&mut self) -> CgResult<()> {
        let loop_top = self.code.next_index();
        self.cursor.advance();
        self.condition()?;
        let test = self.regs.top();
        let exit = self.code.emit_jump(Opcode::Jpc, test)?;
        self.regs.release();
        self.expect(TokenKind::DoKw, ErrorCode::DoExpected)?;
        self.statement()?;
        self.code.emit(Opcode::Jmp, 0, 0, loop_top as i32)?;
        let past_body = self.code.next_index();
        self.code.patch(exit, past_body);
        Ok(())
    }

    fn read_statement(&mut self) -> CgResult<()> {
        self.cursor.advance();
        if self.cursor.kind() != TokenKind::Ident {
            return Err(self.err(ErrorCode::IdentExpected));
        }
        let name = self.cursor.current().text.clone();
        let id = self.resolve(&name)?;
        if self.symbols.get(id).kind != SymbolKind::Variable {
            return Err(self.err_at(ErrorCode::NotReadable, &name));
        }
        let ldiff = self.level_diff_access(id);
        let address = self.symbols.get(id).address;
        let r = self.regs.alloc();
        self.code.emit(Opcode::SioRead, r, 0, 2)?;
        self.code.emit(Opcode::Sto, r, ldiff, address as i32)?;
        self.regs.release();
        self.cursor.advance();
        Ok(())
    }

    fn write_statement(&mut self) -> CgResult<()> {
        self.cursor.advance();
        if self.cursor.kind() != TokenKind::Ident {
            return Err(self.err(ErrorCode::IdentExpected));
        }
        let name = self.cursor.current().text.clone();
        let id = self.resolve(&name)?;
        let kind = self.symbols.get(id).kind;
        match kind {
            SymbolKind::Constant => {
                let value = self.symbols.get(id).value;
                let r = self.regs.alloc();
                self.code.emit(Opcode::Lit, r, 0, value)?;
                self.code.emit(Opcode::SioWrite, r, 0, 1)?;
                self.regs.release();
            }
            SymbolKind::Variable => {
                let ldiff = self.level_diff_access(id);
                let address = self.symbols.get(id).address;
                let r = self.regs.alloc();
                self.code.emit(Opcode::Lod, r, ldiff, address as i32)?;
                self.code.emit(Opcode::SioWrite, r, 0, 1)?;
                self.regs.release();
            }
            SymbolKind::Procedure => {
                return Err(self.err_at(ErrorCode::NotWritable, &name));
            }
        }
        self.cursor.advance();
        Ok(())
    }

    fn condition(&mut self) -> CgResult<()> {
        if self.cursor.kind() == TokenKind::OddKw {
            self.cursor.advance();
            self.expression()?;
            let r = self.regs.top();
            self.code.emit(Opcode::Odd, r, r, 0)?;
            return Ok(());
        }
        self.expression()?;
        let op = match self.cursor.kind() {
            TokenKind::Eql => Opcode::Eql,
            TokenKind::Neq => Opcode::Neq,
            TokenKind::Lss => Opcode::Lss,
            TokenKind::Leq => Opcode::Leq,
            TokenKind::Gtr => Opcode::Gtr,
            TokenKind::Geq => Opcode::Geq,
            _ => return Err(self.err(ErrorCode::RelationExpected)),
        };
        self.cursor.advance();
        self.expression()?;
        self.combine(op)
    }

    fn expression(&mut self) -> CgResult<()> {
        let negate = match self.cursor.kind() {
            TokenKind::Plus => {
                self.cursor.advance();
                false
            }
            TokenKind::Minus => {
                self.cursor.advance();
                true
            }
            _ => false,
        };
        self.term()?;
        if negate {
            let r = self.regs.top();
            self.code.emit(Opcode::Neg, r, r, 0)?;
        }
        loop {
            let op = match self.cursor.kind() {
                TokenKind::Plus => Opcode::Add,
                TokenKind::Minus => Opcode::Sub,
                _ => break,
            };
            self.cursor.advance();
            self.term()?;
            self.combine(op)?;
        }
        Ok(())
    }

    fn term(&mut self) -> CgResult<()> {
        self.factor()?;
        loop {
            let op = match self.cursor.kind() {
                TokenKind::Star => Opcode::Mul,
                TokenKind::Slash => Opcode::Div,
                _ => break,
            };
            self.cursor.advance();
            self.factor()?;
            self.combine(op)?;
        }
        Ok(())
    }

    fn factor(&mut self) -> CgResult<()> {
        match self.cursor.kind() {
            TokenKind::Ident => {
                let name = self.cursor.current().text.clone();
                let id = self.resolve(&name)?;
                let kind = self.symbols.get(id).kind;
                match kind {
                    SymbolKind::Constant => {
                        let value = self.symbols.get(id).value;
                        let r = self.regs.alloc();
                        self.code.emit(Opcode::Lit, r, 0, value)?;
                    }
                    SymbolKind::Variable => {
                        let ldiff = self.level_diff_access(id);
                        let address = self.symbols.get(id).address;
                        let r = self.regs.alloc();
                        self.code.emit(Opcode::Lod, r, ldiff, address as i32)?;
                    }
                    SymbolKind::Procedure => {
                        return Err(self.err_at(ErrorCode::NotAVariable, &name));
                    }
                }
                self.cursor.advance();
            }
            TokenKind::Number => {
                let value = self.number_value()?;
                let r = self.regs.alloc();
                self.code.emit(Opcode::Lit, r, 0, value)?;
                self.cursor.advance();
            }
            TokenKind::LParen => {
                self.cursor.advance();
                self.expression()?;
                self.expect(TokenKind::RParen, ErrorCode::RParenExpected)?;
            }
            _ => return Err(self.err(ErrorCode::FactorExpected)),
        }
        Ok(())
    }

    /// Fold the two most recently produced registers with `op`, leaving
    /// the result in the lower one and releasing the upper.
    fn combine(&mut self, op: Opcode) -> CgResult<()> {
        let rhs = self.regs.top();
        self.regs.release();
        let lhs = self.regs.top();
        self.code.emit(op, lhs, lhs, rhs)?;
        Ok(())
    }
}
