//! Two-pass assembler for PASM, the PromethiumXS mnemonic source language.
//!
//! Pass 1 strips comments, records each `label:` at the running byte
//! address and sizes every instruction against the `prom_core::instr`
//! contract. Pass 2 re-walks the lines and emits the opcode byte plus the
//! operand encoding for its class. The output byte-matches what the CPU
//! decoder expects; the contract table is shared, never duplicated.
//!
//! Guest-facing mistakes (unknown mnemonics, malformed registers or
//! literals, unresolved labels) are logged diagnostics with best-effort
//! continuation, never hard failures.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use log::{debug, warn};

use prom_core::consts::{DOMAIN_COUNT, GFX_COUNT, GPR_COUNT, MODEL_NAME_MAX};
use prom_core::instr::{OperandClass, PromOpcode};

/// A resolved program, ready to be copied into the code domain.
pub struct PasmResult {
    pub program_bytes: Vec<u8>,
}

impl PasmResult {
    pub fn program_size(&self) -> usize {
        self.program_bytes.len()
    }
}

pub fn assemble_file<P: AsRef<Path>>(path: P) -> io::Result<PasmResult> {
    let source = fs::read_to_string(path)?;
    Ok(assemble_source(&source))
}

pub fn assemble_source(source: &str) -> PasmResult {
    let lines = scan(source);
    let labels = collect_labels(&lines);
    let mut program_bytes = Vec::new();

    for line in &lines {
        if let Parsed::Instruction { opcode, tokens } = &line.parsed {
            encode(*opcode, tokens, line.number, &labels, &mut program_bytes);
        }
    }

    PasmResult { program_bytes }
}

struct Line<'a> {
    number: usize,
    parsed: Parsed<'a>,
}

enum Parsed<'a> {
    Label(&'a str),
    Instruction { opcode: PromOpcode, tokens: Vec<&'a str> },
}

/// Comment stripping and tokenization shared by both passes.
fn scan(source: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        let text = match raw.find(';') {
            Some(at) => &raw[..at],
            None => raw,
        };
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        if let Some(label) = text.strip_suffix(':') {
            lines.push(Line { number, parsed: Parsed::Label(label.trim()) });
            continue;
        }

        let tokens: Vec<&str> = text.split_whitespace().collect();
        match PromOpcode::from_mnemonic(&tokens[0].to_uppercase()) {
            Some(opcode) => {
                lines.push(Line { number, parsed: Parsed::Instruction { opcode, tokens } })
            }
            // Skipped entirely: contributes no bytes in either pass, so
            // label addresses stay aligned.
            None => warn!("unknown mnemonic '{}' (line {}); skipping", tokens[0], number),
        }
    }
    lines
}

/// Pass 1: label addresses at the running instruction-size counter.
fn collect_labels(lines: &[Line<'_>]) -> HashMap<String, u32> {
    let mut labels = HashMap::new();
    let mut address = 0u32;

    for line in lines {
        match &line.parsed {
            Parsed::Label(name) => {
                debug!("label '{}' at address {} (line {})", name, address, line.number);
                labels.insert(name.to_string(), address);
            }
            Parsed::Instruction { opcode, tokens } => {
                address += instruction_size(*opcode, tokens) as u32;
            }
        }
    }
    labels
}

///
/// Encoded size of one instruction, opcode byte included. Fixed layouts
/// come straight from the contract table; the name-bearing display-list
/// ops size from their source operand.
///
fn instruction_size(opcode: PromOpcode, tokens: &[&str]) -> usize {
    if let Some(size) = opcode.fixed_size() {
        return size;
    }
    let name_len = tokens.get(1).map(|t| t.len().min(MODEL_NAME_MAX)).unwrap_or(0);
    let base = 2 + name_len;
    match opcode.operand_class() {
        OperandClass::NameF3 => base + 12,
        OperandClass::NameReg => base + 1,
        _ => base,
    }
}

/// Pass 2: one instruction into the output buffer.
fn encode(
    opcode: PromOpcode,
    tokens: &[&str],
    line: usize,
    labels: &HashMap<String, u32>,
    out: &mut Vec<u8>,
) {
    out.push(opcode as u8);

    match opcode.operand_class() {
        OperandClass::None => {}

        OperandClass::RegImm => {
            let (reg, imm) = split_reg_and_value(tokens, line);
            out.push(parse_register(reg, line));
            out.extend_from_slice(&parse_int(imm, line).to_le_bytes());
        }

        OperandClass::RegFloat => {
            let (reg, imm) = split_reg_and_value(tokens, line);
            out.push(parse_register(reg, line));
            out.extend_from_slice(&parse_float(imm, line).to_le_bytes());
        }

        OperandClass::RegAddr => {
            let (reg, addr) = split_reg_and_value(tokens, line);
            out.push(parse_register(reg, line));
            out.extend_from_slice(&parse_int(addr, line).to_le_bytes());
        }

        OperandClass::RegReg => {
            if tokens.len() < 3 {
                warn!("'{}' needs two registers (line {}); defaulting", opcode.mnemonic(), line);
            }
            out.push(parse_register(tokens.get(1).copied().unwrap_or("R0"), line));
            out.push(parse_register(tokens.get(2).copied().unwrap_or("R0"), line));
        }

        OperandClass::Reg => {
            out.push(parse_register(tokens.get(1).copied().unwrap_or("R0"), line));
        }

        OperandClass::Label => {
            let name = tokens.get(1).copied().unwrap_or("");
            let address = match labels.get(name) {
                Some(address) => *address,
                None => {
                    warn!("label '{}' not found (line {}); using address 0", name, line);
                    0
                }
            };
            out.extend_from_slice(&address.to_le_bytes());
        }

        OperandClass::Indexed => {
            if tokens.len() < 4 {
                warn!("'{}' needs domain, offset and register (line {})", opcode.mnemonic(), line);
            }
            out.push(parse_domain(tokens.get(1).copied().unwrap_or("0"), line));

            let offset = tokens.get(2).copied().unwrap_or("0");
            if is_register_token(offset) {
                out.push(PromOpcode::OFFSET_KIND_REGISTER);
                out.extend_from_slice(&(parse_register(offset, line) as u32).to_le_bytes());
            } else {
                out.push(PromOpcode::OFFSET_KIND_IMMEDIATE);
                out.extend_from_slice(&parse_int(offset, line).to_le_bytes());
            }

            out.push(parse_register(tokens.get(3).copied().unwrap_or("R0"), line));
        }

        OperandClass::IntNum => {
            let number = tokens.get(1).copied().unwrap_or("0");
            let value = parse_int(number, line);
            if !(0..=255).contains(&value) {
                warn!("interrupt number '{}' out of range (line {}); using 0", number, line);
                out.push(0);
            } else {
                out.push(value as u8);
            }
        }

        OperandClass::Name => {
            emit_name(tokens.get(1).copied(), opcode, line, out);
        }

        OperandClass::PrimType => {
            let value = parse_int(tokens.get(1).copied().unwrap_or("1"), line);
            if !(1..=3).contains(&value) {
                warn!("unknown primitive type '{}' (line {}); using Triangle", value, line);
                out.push(1);
            } else {
                out.push(value as u8);
            }
        }

        OperandClass::VertexF3 => {
            for i in 1..=3 {
                let token = tokens.get(i).copied().unwrap_or("0");
                out.extend_from_slice(&parse_float(token, line).to_le_bytes());
            }
        }

        OperandClass::NameF3 => {
            emit_name(tokens.get(1).copied(), opcode, line, out);
            // Position operands are optional and default to the origin.
            for i in 2..=4 {
                let token = tokens.get(i).copied().unwrap_or("0");
                out.extend_from_slice(&parse_float(token, line).to_le_bytes());
            }
        }

        OperandClass::NameReg => {
            emit_name(tokens.get(1).copied(), opcode, line, out);
            out.push(parse_register(tokens.get(2).copied().unwrap_or("R0"), line));
        }
    }
}

///
/// The immediate classes historically accepted both `MOV 5 R0` and
/// `MOV R0 5`; whichever operand parses as a register is the register.
///
fn split_reg_and_value<'a>(tokens: &[&'a str], line: usize) -> (&'a str, &'a str) {
    if tokens.len() < 3 {
        warn!("instruction needs a value and a register (line {}); defaulting", line);
    }
    let first = tokens.get(1).copied().unwrap_or("0");
    let second = tokens.get(2).copied().unwrap_or("R0");
    if is_register_token(first) {
        (first, second)
    } else {
        (second, first)
    }
}

fn is_register_token(token: &str) -> bool {
    let rest = match token.strip_prefix(&['R', 'r', 'G', 'g'][..]) {
        Some(rest) => rest,
        None => return false,
    };
    !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
}

///
/// `R<n>` selects a general register, `G<n>` a graphics register encoded
/// at n + 32. Malformed tokens default to R0 with a diagnostic.
///
fn parse_register(token: &str, line: usize) -> u8 {
    if let Some(rest) = token.strip_prefix(&['R', 'r'][..]) {
        if let Ok(index) = rest.parse::<usize>() {
            if index < GPR_COUNT {
                return index as u8;
            }
        }
    } else if let Some(rest) = token.strip_prefix(&['G', 'g'][..]) {
        if let Ok(index) = rest.parse::<usize>() {
            if index < GFX_COUNT {
                return (index + GPR_COUNT) as u8;
            }
        }
    }
    warn!("invalid register token '{}' (line {}); defaulting to R0", token, line);
    0
}

/// Integer literal: decimal, `0x` hex or `0b` binary, optionally negative.
fn parse_int(token: &str, line: usize) -> i32 {
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let parsed = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map(|v| v as i64)
    } else if let Some(bin) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        u32::from_str_radix(bin, 2).map(|v| v as i64)
    } else {
        body.parse::<i64>()
    };

    match parsed {
        Ok(value) => {
            let value = if negative { -value } else { value };
            value as i32
        }
        Err(_) => {
            warn!("invalid integer literal '{}' (line {}); using 0", token, line);
            0
        }
    }
}

fn parse_float(token: &str, line: usize) -> f32 {
    match token.parse::<f32>() {
        Ok(value) => value,
        Err(_) => {
            warn!("invalid float literal '{}' (line {}); using 0.0", token, line);
            0.0
        }
    }
}

/// Domain operand: a numeric index or a domain name.
fn parse_domain(token: &str, line: usize) -> u8 {
    let value = match token.to_uppercase().as_str() {
        "SYSTEM" => 0,
        "VIDEO" => 1,
        "AUDIO" => 2,
        "DPL" => 3,
        "CARTRIDGE" => 4,
        "IO" => 5,
        "CACHE" => 6,
        "SCRATCH" => 7,
        _ => parse_int(token, line),
    };
    if !(0..DOMAIN_COUNT as i32).contains(&value) {
        warn!("invalid memory domain '{}' (line {}); using System", token, line);
        return 0;
    }
    value as u8
}

fn emit_name(token: Option<&str>, opcode: PromOpcode, line: usize, out: &mut Vec<u8>) {
    let name = match token {
        Some(name) => name,
        None => {
            warn!("'{}' is missing its name operand (line {})", opcode.mnemonic(), line);
            ""
        }
    };
    let bytes = name.as_bytes();
    let len = bytes.len().min(MODEL_NAME_MAX);
    if bytes.len() > MODEL_NAME_MAX {
        warn!("name '{}' truncated to {} bytes (line {})", name, MODEL_NAME_MAX, line);
    }
    out.push(len as u8);
    out.extend_from_slice(&bytes[..len]);
}
