use log::debug;

use crate::cpu::{ExecError, PromCpu};
use crate::regs::RegisterValue;

///
/// Float family. Values convert, bits do not: ITOF turns 5 into 5.0 and
/// FTOI truncates toward zero, flipping the register tag either way.
///
pub trait PromFloat {
    fn movf(&mut self) -> Result<(), ExecError>;
    fn fadd(&mut self) -> Result<(), ExecError>;
    fn fsub(&mut self) -> Result<(), ExecError>;
    fn fmul(&mut self) -> Result<(), ExecError>;
    fn fdiv(&mut self) -> Result<(), ExecError>;
    fn fmod(&mut self) -> Result<(), ExecError>;
    fn itof(&mut self) -> Result<(), ExecError>;
    fn ftoi(&mut self) -> Result<(), ExecError>;
}

impl PromFloat for PromCpu {
    fn movf(&mut self) -> Result<(), ExecError> {
        let Some(reg) = self.fetch_byte() else { return Ok(()) };
        let Some(imm) = self.fetch_float() else { return Ok(()) };
        debug!("MOVF: register {} <- {}", reg, imm);
        self.reg_write(reg, RegisterValue::Float(imm));
        Ok(())
    }

    fn fadd(&mut self) -> Result<(), ExecError> {
        self.float_binop("FADD", |a, b| Some(a + b))
    }

    fn fsub(&mut self) -> Result<(), ExecError> {
        self.float_binop("FSUB", |a, b| Some(a - b))
    }

    fn fmul(&mut self) -> Result<(), ExecError> {
        self.float_binop("FMUL", |a, b| Some(a * b))
    }

    fn fdiv(&mut self) -> Result<(), ExecError> {
        self.float_binop("FDIV", |a, b| if b == 0.0 { None } else { Some(a / b) })
    }

    fn fmod(&mut self) -> Result<(), ExecError> {
        self.float_binop("FMOD", |a, b| if b == 0.0 { None } else { Some(a % b) })
    }

    fn itof(&mut self) -> Result<(), ExecError> {
        let Some(reg) = self.fetch_byte() else { return Ok(()) };
        let Some(value) = self.reg_int(reg) else { return Ok(()) };
        self.reg_write(reg, RegisterValue::Float(value as f32));
        Ok(())
    }

    fn ftoi(&mut self) -> Result<(), ExecError> {
        let Some(reg) = self.fetch_byte() else { return Ok(()) };
        let Some(value) = self.reg_float(reg) else { return Ok(()) };
        self.reg_write(reg, RegisterValue::Int(value as i32));
        Ok(())
    }
}
