use crate::cpu::{ExecError, PromCpu};
use crate::regs::RegisterValue;

/// Bitwise family. Shift amounts are masked to the low five bits.
pub trait PromLogic {
    fn and(&mut self) -> Result<(), ExecError>;
    fn or(&mut self) -> Result<(), ExecError>;
    fn xor(&mut self) -> Result<(), ExecError>;
    fn not(&mut self) -> Result<(), ExecError>;
    fn shl(&mut self) -> Result<(), ExecError>;
    fn shr(&mut self) -> Result<(), ExecError>;

    fn andi(&mut self) -> Result<(), ExecError>;
    fn ori(&mut self) -> Result<(), ExecError>;
    fn xori(&mut self) -> Result<(), ExecError>;
    fn shli(&mut self) -> Result<(), ExecError>;
    fn shri(&mut self) -> Result<(), ExecError>;
}

impl PromLogic for PromCpu {
    fn and(&mut self) -> Result<(), ExecError> {
        self.int_binop("AND", |a, b| Some(a & b))
    }

    fn or(&mut self) -> Result<(), ExecError> {
        self.int_binop("OR", |a, b| Some(a | b))
    }

    fn xor(&mut self) -> Result<(), ExecError> {
        self.int_binop("XOR", |a, b| Some(a ^ b))
    }

    /// Unary complement: a single register operand, flipped in place.
    fn not(&mut self) -> Result<(), ExecError> {
        let Some(reg) = self.fetch_byte() else { return Ok(()) };
        let Some(a) = self.reg_int(reg) else { return Ok(()) };
        let result = !a;
        self.reg_write(reg, RegisterValue::Int(result));
        self.regs.update_zero(result == 0);
        Ok(())
    }

    fn shl(&mut self) -> Result<(), ExecError> {
        self.int_binop("SHL", |a, b| Some(a.wrapping_shl(b as u32)))
    }

    fn shr(&mut self) -> Result<(), ExecError> {
        self.int_binop("SHR", |a, b| Some(a.wrapping_shr(b as u32)))
    }

    fn andi(&mut self) -> Result<(), ExecError> {
        self.int_imm_op("ANDI", |a, b| Some(a & b))
    }

    fn ori(&mut self) -> Result<(), ExecError> {
        self.int_imm_op("ORI", |a, b| Some(a | b))
    }

    fn xori(&mut self) -> Result<(), ExecError> {
        self.int_imm_op("XORI", |a, b| Some(a ^ b))
    }

    fn shli(&mut self) -> Result<(), ExecError> {
        self.int_imm_op("SHLI", |a, b| Some(a.wrapping_shl(b as u32)))
    }

    fn shri(&mut self) -> Result<(), ExecError> {
        self.int_imm_op("SHRI", |a, b| Some(a.wrapping_shr(b as u32)))
    }
}
