use crate::cpu::{ExecError, PromCpu};

///
/// Integer arithmetic family. Results wrap on overflow and update the ZERO
/// flag; division or modulo by zero is a logged guest mistake that leaves
/// the destination unmodified.
///
pub trait PromArith {
    fn add(&mut self) -> Result<(), ExecError>;
    fn sub(&mut self) -> Result<(), ExecError>;
    fn mul(&mut self) -> Result<(), ExecError>;
    fn div(&mut self) -> Result<(), ExecError>;
    fn modulo(&mut self) -> Result<(), ExecError>;

    fn addi(&mut self) -> Result<(), ExecError>;
    fn subi(&mut self) -> Result<(), ExecError>;
    fn muli(&mut self) -> Result<(), ExecError>;
    fn divi(&mut self) -> Result<(), ExecError>;
    fn modi(&mut self) -> Result<(), ExecError>;
}

fn checked_div(a: i32, b: i32) -> Option<i32> {
    if b == 0 {
        None
    } else {
        Some(a.wrapping_div(b))
    }
}

fn checked_rem(a: i32, b: i32) -> Option<i32> {
    if b == 0 {
        None
    } else {
        Some(a.wrapping_rem(b))
    }
}

impl PromArith for PromCpu {
    fn add(&mut self) -> Result<(), ExecError> {
        self.int_binop("ADD", |a, b| Some(a.wrapping_add(b)))
    }

    fn sub(&mut self) -> Result<(), ExecError> {
        self.int_binop("SUB", |a, b| Some(a.wrapping_sub(b)))
    }

    fn mul(&mut self) -> Result<(), ExecError> {
        self.int_binop("MUL", |a, b| Some(a.wrapping_mul(b)))
    }

    fn div(&mut self) -> Result<(), ExecError> {
        self.int_binop("DIV", checked_div)
    }

    fn modulo(&mut self) -> Result<(), ExecError> {
        self.int_binop("MOD", checked_rem)
    }

    fn addi(&mut self) -> Result<(), ExecError> {
        self.int_imm_op("ADDI", |a, b| Some(a.wrapping_add(b)))
    }

    fn subi(&mut self) -> Result<(), ExecError> {
        self.int_imm_op("SUBI", |a, b| Some(a.wrapping_sub(b)))
    }

    fn muli(&mut self) -> Result<(), ExecError> {
        self.int_imm_op("MULI", |a, b| Some(a.wrapping_mul(b)))
    }

    fn divi(&mut self) -> Result<(), ExecError> {
        self.int_imm_op("DIVI", checked_div)
    }

    fn modi(&mut self) -> Result<(), ExecError> {
        self.int_imm_op("MODI", checked_rem)
    }
}
