mod arith;
mod cf;
mod dlist;
mod float;
mod intrpt;
mod io;
mod ldst;
mod logic;

#[cfg(test)]
mod tests;

pub use arith::PromArith;
pub use cf::PromControlFlow;
pub use dlist::PromDisplay;
pub use float::PromFloat;
pub use intrpt::PromInterrupt;
pub use io::PromIo;
pub use ldst::PromLoadStore;
pub use logic::PromLogic;

///
/// The PromethiumXS opcode table. The byte values here and the operand
/// layouts below are the binary contract between the CPU's decoder and the
/// PASM assembler's encoder; neither side may diverge from this module.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[allow(clippy::upper_case_acronyms)]
pub enum PromOpcode {
    NOP = 0x00,
    MOV = 0x01,
    LOAD = 0x02,
    STORE = 0x03,
    ADD = 0x04,
    SUB = 0x05,
    MUL = 0x06,
    DIV = 0x07,
    MOD = 0x08,
    AND = 0x09,
    OR = 0x0A,
    XOR = 0x0B,
    NOT = 0x0C,
    SHL = 0x0D,
    SHR = 0x0E,
    CMP = 0x0F,
    JMP = 0x10,
    JZ = 0x11,
    JNZ = 0x12,
    JE = 0x13,
    JNE = 0x14,
    JG = 0x15,
    JL = 0x16,
    CALL = 0x17,
    RET = 0x18,
    PUSH = 0x19,
    POP = 0x1A,
    IN = 0x1B,
    OUT = 0x1C,
    HLT = 0x1D,
    RAND = 0x1E,
    TIME = 0x1F,
    INT = 0x20,
    IRET = 0x21,
    JGE = 0x22,
    JLE = 0x23,
    ADDI = 0x30,
    SUBI = 0x31,
    MULI = 0x32,
    DIVI = 0x33,
    ANDI = 0x34,
    ORI = 0x35,
    XORI = 0x36,
    SHLI = 0x37,
    SHRI = 0x38,
    CMPI = 0x39,
    LI = 0x3A,
    MODI = 0x3B,
    LOADI = 0x3C,
    STOREI = 0x3D,
    EI = 0x3E,
    DI = 0x3F,
    MOVF = 0x40,
    FADD = 0x41,
    FSUB = 0x42,
    FMUL = 0x43,
    FDIV = 0x44,
    FMOD = 0x45,
    ITOF = 0x46,
    FTOI = 0x47,
    DLSTART = 0x50,
    DLPRIMITIVE = 0x51,
    DLCOLOR = 0x52,
    DLVERTEX = 0x53,
    DLEND = 0x54,
    DLCALL = 0x55,
    STOREMODEL = 0x56,
    LOADMODEL = 0x57,
}

///
/// Operand layout classes. Little-endian 4-byte integers and IEEE-754
/// floats throughout; register indices are single bytes (0..32 general,
/// 32..64 graphics); strings are `[len u8][ASCII bytes]`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandClass {
    /// No operand bytes.
    None,
    /// `[reg][i32]` — immediate integer into a register.
    RegImm,
    /// `[reg][f32]` — immediate float into a register.
    RegFloat,
    /// `[reg][a32]` — register plus absolute System-domain address.
    RegAddr,
    /// `[reg][reg]`.
    RegReg,
    /// `[reg]`.
    Reg,
    /// `[a32]` — absolute target resolved from a label.
    Label,
    /// `[domain u8][kind u8][payload 4B][reg]`; kind 0 = immediate offset,
    /// kind 1 = register index in the payload's low byte.
    Indexed,
    /// `[u8]` — interrupt number.
    IntNum,
    /// `[str]`.
    Name,
    /// `[u8]` — primitive type.
    PrimType,
    /// `[f32][f32][f32]`.
    VertexF3,
    /// `[str][f32][f32][f32]`.
    NameF3,
    /// `[str][reg]`.
    NameReg,
}

impl PromOpcode {
    pub fn from_u8(value: u8) -> Option<PromOpcode> {
        use PromOpcode::*;
        let op = match value {
            0x00 => NOP,
            0x01 => MOV,
            0x02 => LOAD,
            0x03 => STORE,
            0x04 => ADD,
            0x05 => SUB,
            0x06 => MUL,
            0x07 => DIV,
            0x08 => MOD,
            0x09 => AND,
            0x0A => OR,
            0x0B => XOR,
            0x0C => NOT,
            0x0D => SHL,
            0x0E => SHR,
            0x0F => CMP,
            0x10 => JMP,
            0x11 => JZ,
            0x12 => JNZ,
            0x13 => JE,
            0x14 => JNE,
            0x15 => JG,
            0x16 => JL,
            0x17 => CALL,
            0x18 => RET,
            0x19 => PUSH,
            0x1A => POP,
            0x1B => IN,
            0x1C => OUT,
            0x1D => HLT,
            0x1E => RAND,
            0x1F => TIME,
            0x20 => INT,
            0x21 => IRET,
            0x22 => JGE,
            0x23 => JLE,
            0x30 => ADDI,
            0x31 => SUBI,
            0x32 => MULI,
            0x33 => DIVI,
            0x34 => ANDI,
            0x35 => ORI,
            0x36 => XORI,
            0x37 => SHLI,
            0x38 => SHRI,
            0x39 => CMPI,
            0x3A => LI,
            0x3B => MODI,
            0x3C => LOADI,
            0x3D => STOREI,
            0x3E => EI,
            0x3F => DI,
            0x40 => MOVF,
            0x41 => FADD,
            0x42 => FSUB,
            0x43 => FMUL,
            0x44 => FDIV,
            0x45 => FMOD,
            0x46 => ITOF,
            0x47 => FTOI,
            0x50 => DLSTART,
            0x51 => DLPRIMITIVE,
            0x52 => DLCOLOR,
            0x53 => DLVERTEX,
            0x54 => DLEND,
            0x55 => DLCALL,
            0x56 => STOREMODEL,
            0x57 => LOADMODEL,
            _ => return None,
        };
        Some(op)
    }

    pub fn from_mnemonic(mnemonic: &str) -> Option<PromOpcode> {
        use PromOpcode::*;
        let op = match mnemonic {
            "NOP" => NOP,
            "MOV" => MOV,
            "LOAD" => LOAD,
            "STORE" => STORE,
            "ADD" => ADD,
            "SUB" => SUB,
            "MUL" => MUL,
            "DIV" => DIV,
            "MOD" => MOD,
            "AND" => AND,
            "OR" => OR,
            "XOR" => XOR,
            "NOT" => NOT,
            "SHL" => SHL,
            "SHR" => SHR,
            "CMP" => CMP,
            "JMP" => JMP,
            "JZ" => JZ,
            "JNZ" => JNZ,
            "JE" => JE,
            "JNE" => JNE,
            "JG" => JG,
            "JL" => JL,
            "CALL" => CALL,
            "RET" => RET,
            "PUSH" => PUSH,
            "POP" => POP,
            "IN" => IN,
            "OUT" => OUT,
            "HLT" => HLT,
            "RAND" => RAND,
            "TIME" => TIME,
            "INT" => INT,
            "IRET" => IRET,
            "JGE" => JGE,
            "JLE" => JLE,
            "ADDI" => ADDI,
            "SUBI" => SUBI,
            "MULI" => MULI,
            "DIVI" => DIVI,
            "ANDI" => ANDI,
            "ORI" => ORI,
            "XORI" => XORI,
            "SHLI" => SHLI,
            "SHRI" => SHRI,
            "CMPI" => CMPI,
            "LI" => LI,
            "MODI" => MODI,
            "LOADI" => LOADI,
            "STOREI" => STOREI,
            "EI" => EI,
            "DI" => DI,
            "MOVF" => MOVF,
            "FADD" => FADD,
            "FSUB" => FSUB,
            "FMUL" => FMUL,
            "FDIV" => FDIV,
            "FMOD" => FMOD,
            "ITOF" => ITOF,
            "FTOI" => FTOI,
            "DLSTART" => DLSTART,
            "DLPRIMITIVE" => DLPRIMITIVE,
            "DLCOLOR" => DLCOLOR,
            "DLVERTEX" => DLVERTEX,
            "DLEND" => DLEND,
            "DLCALL" => DLCALL,
            "STOREMODEL" => STOREMODEL,
            "LOADMODEL" => LOADMODEL,
            _ => return None,
        };
        Some(op)
    }

    pub fn operand_class(self) -> OperandClass {
        use PromOpcode::*;
        match self {
            NOP | RET | HLT | IRET | EI | DI | DLEND => OperandClass::None,
            MOV | ADDI | SUBI | MULI | DIVI | ANDI | ORI | XORI | SHLI | SHRI | CMPI | LI
            | MODI => OperandClass::RegImm,
            MOVF => OperandClass::RegFloat,
            LOAD | STORE => OperandClass::RegAddr,
            ADD | SUB | MUL | DIV | MOD | AND | OR | XOR | SHL | SHR | CMP | IN | OUT | FADD
            | FSUB | FMUL | FDIV | FMOD => OperandClass::RegReg,
            NOT | PUSH | POP | RAND | TIME | ITOF | FTOI | LOADMODEL => OperandClass::Reg,
            JMP | JZ | JNZ | JE | JNE | JG | JL | JGE | JLE | CALL => OperandClass::Label,
            LOADI | STOREI => OperandClass::Indexed,
            INT => OperandClass::IntNum,
            DLSTART | DLCOLOR => OperandClass::Name,
            DLPRIMITIVE => OperandClass::PrimType,
            DLVERTEX => OperandClass::VertexF3,
            DLCALL => OperandClass::NameF3,
            STOREMODEL => OperandClass::NameReg,
        }
    }

    ///
    /// Total encoded size in bytes, opcode included, for the fixed-layout
    /// classes. Returns None for the string-bearing display-list ops whose
    /// size depends on the name; the assembler sizes those from the source
    /// operand during pass 1.
    ///
    pub fn fixed_size(self) -> Option<usize> {
        let size = match self.operand_class() {
            OperandClass::None => 1,
            OperandClass::Reg | OperandClass::IntNum | OperandClass::PrimType => 2,
            OperandClass::RegReg => 3,
            OperandClass::Label => 5,
            OperandClass::RegImm | OperandClass::RegFloat | OperandClass::RegAddr => 6,
            OperandClass::Indexed => 8,
            OperandClass::VertexF3 => 13,
            OperandClass::Name | OperandClass::NameF3 | OperandClass::NameReg => return None,
        };
        Some(size)
    }

    pub fn mnemonic(self) -> &'static str {
        use PromOpcode::*;
        match self {
            NOP => "NOP",
            MOV => "MOV",
            LOAD => "LOAD",
            STORE => "STORE",
            ADD => "ADD",
            SUB => "SUB",
            MUL => "MUL",
            DIV => "DIV",
            MOD => "MOD",
            AND => "AND",
            OR => "OR",
            XOR => "XOR",
            NOT => "NOT",
            SHL => "SHL",
            SHR => "SHR",
            CMP => "CMP",
            JMP => "JMP",
            JZ => "JZ",
            JNZ => "JNZ",
            JE => "JE",
            JNE => "JNE",
            JG => "JG",
            JL => "JL",
            CALL => "CALL",
            RET => "RET",
            PUSH => "PUSH",
            POP => "POP",
            IN => "IN",
            OUT => "OUT",
            HLT => "HLT",
            RAND => "RAND",
            TIME => "TIME",
            INT => "INT",
            IRET => "IRET",
            JGE => "JGE",
            JLE => "JLE",
            ADDI => "ADDI",
            SUBI => "SUBI",
            MULI => "MULI",
            DIVI => "DIVI",
            ANDI => "ANDI",
            ORI => "ORI",
            XORI => "XORI",
            SHLI => "SHLI",
            SHRI => "SHRI",
            CMPI => "CMPI",
            LI => "LI",
            MODI => "MODI",
            LOADI => "LOADI",
            STOREI => "STOREI",
            EI => "EI",
            DI => "DI",
            MOVF => "MOVF",
            FADD => "FADD",
            FSUB => "FSUB",
            FMUL => "FMUL",
            FDIV => "FDIV",
            FMOD => "FMOD",
            ITOF => "ITOF",
            FTOI => "FTOI",
            DLSTART => "DLSTART",
            DLPRIMITIVE => "DLPRIMITIVE",
            DLCOLOR => "DLCOLOR",
            DLVERTEX => "DLVERTEX",
            DLEND => "DLEND",
            DLCALL => "DLCALL",
            STOREMODEL => "STOREMODEL",
            LOADMODEL => "LOADMODEL",
        }
    }

    /// Offset-kind discriminator values used by the Indexed class.
    pub const OFFSET_KIND_IMMEDIATE: u8 = 0;
    pub const OFFSET_KIND_REGISTER: u8 = 1;
}

/// Every opcode, in table order. Drives the contract round-trip tests and
/// the debug console's opcode dump.
pub const OPCODE_TABLE: [PromOpcode; 68] = {
    use PromOpcode::*;
    [
        NOP, MOV, LOAD, STORE, ADD, SUB, MUL, DIV, MOD, AND, OR, XOR, NOT, SHL, SHR, CMP, JMP,
        JZ, JNZ, JE, JNE, JG, JL, CALL, RET, PUSH, POP, IN, OUT, HLT, RAND, TIME, INT, IRET,
        JGE, JLE, ADDI, SUBI, MULI, DIVI, ANDI, ORI, XORI, SHLI, SHRI, CMPI, LI, MODI, LOADI,
        STOREI, EI, DI, MOVF, FADD, FSUB, FMUL, FDIV, FMOD, ITOF, FTOI, DLSTART, DLPRIMITIVE,
        DLCOLOR, DLVERTEX, DLEND, DLCALL, STOREMODEL, LOADMODEL,
    ]
};
