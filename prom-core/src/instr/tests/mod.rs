use crate::cpu::PromCpu;
use crate::instr::PromOpcode;
use crate::mem::PromMemory;

mod cf;
mod dlist;
mod float;

///
/// Builds a CPU with `program` loaded at System offset 0, ready to step.
///
pub fn init_cpu(program: &[u8]) -> PromCpu {
    let mut mem = PromMemory::new();
    mem.load_program(program).unwrap();
    PromCpu::new(mem)
}

/// Small byte-wise program builder for tests; encodings follow the
/// `instr` contract table directly.
pub struct Prog {
    bytes: Vec<u8>,
}

impl Prog {
    pub fn new() -> Prog {
        Prog { bytes: Vec::new() }
    }

    pub fn op(mut self, op: PromOpcode) -> Self {
        self.bytes.push(op as u8);
        self
    }

    pub fn byte(mut self, value: u8) -> Self {
        self.bytes.push(value);
        self
    }

    pub fn int(mut self, value: i32) -> Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn float(mut self, value: f32) -> Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.bytes.push(name.len() as u8);
        self.bytes.extend_from_slice(name.as_bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

#[test]
fn end_of_program_is_a_graceful_halt() {
    let mut cpu = init_cpu(&Prog::new().op(PromOpcode::NOP).build());

    cpu.step().unwrap();
    assert!(cpu.running());

    cpu.step().unwrap();
    assert!(!cpu.running());

    // Stepping a halted CPU is a no-op, not an error.
    cpu.step().unwrap();
    assert!(!cpu.running());
}

#[test]
fn unknown_opcode_is_a_controlled_halt() {
    let mut cpu = init_cpu(&[0xEE, 0x00, 0x00]);
    cpu.step().unwrap();
    assert!(!cpu.running());
    assert_eq!(1, cpu.pc());
}

#[test]
fn truncated_instruction_halts_gracefully() {
    // MOV with only two of its four immediate bytes present.
    let mut cpu = init_cpu(&[PromOpcode::MOV as u8, 0x00, 0x12, 0x34]);
    cpu.step().unwrap();
    assert!(!cpu.running());
}

#[test]
fn opcode_table_roundtrips_through_bytes_and_mnemonics() {
    for op in crate::instr::OPCODE_TABLE {
        assert_eq!(Some(op), PromOpcode::from_u8(op as u8));
        assert_eq!(Some(op), PromOpcode::from_mnemonic(op.mnemonic()));
    }
}
