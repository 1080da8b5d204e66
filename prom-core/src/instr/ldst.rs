use log::{debug, warn};

use crate::cpu::{ExecError, PromCpu};
use crate::instr::PromOpcode;
use crate::mem::MemoryDomain;
use crate::regs::{CpuFlags, RegisterValue};

///
/// Data movement family: immediates, absolute System-domain load/store,
/// the domain-indexed LOADI/STOREI pair and the operand stack ops.
///
pub trait PromLoadStore {
    fn mov(&mut self) -> Result<(), ExecError>;
    fn li(&mut self) -> Result<(), ExecError>;
    fn load(&mut self) -> Result<(), ExecError>;
    fn store(&mut self) -> Result<(), ExecError>;
    fn loadi(&mut self) -> Result<(), ExecError>;
    fn storei(&mut self) -> Result<(), ExecError>;
    fn push_reg(&mut self) -> Result<(), ExecError>;
    fn pop_reg(&mut self) -> Result<(), ExecError>;
}

impl PromCpu {
    fn load_immediate(&mut self, mnem: &str) -> Result<(), ExecError> {
        let Some(reg) = self.fetch_byte() else { return Ok(()) };
        let Some(imm) = self.fetch_int() else { return Ok(()) };
        debug!("{}: register {} <- {}", mnem, reg, imm);
        self.reg_write(reg, RegisterValue::Int(imm));
        Ok(())
    }

    ///
    /// Decodes the `[domain][kind][payload][reg]` operand block shared by
    /// LOADI and STOREI. Returns the resolved (domain, offset, register);
    /// an unknown domain or an unreadable offset register raises the
    /// recoverable ERROR flag and yields None.
    ///
    fn fetch_indexed_operands(&mut self, mnem: &str) -> Option<(MemoryDomain, i32, u8)> {
        let domain_byte = self.fetch_byte()?;
        let kind = self.fetch_byte()?;
        let payload = self.fetch_int()?;
        let reg = self.fetch_byte()?;

        let Some(domain) = MemoryDomain::from_u8(domain_byte) else {
            warn!("{}: unknown memory domain {}; flagging", mnem, domain_byte);
            self.regs.cpu_flags.insert(CpuFlags::ERROR);
            return None;
        };

        let offset = if kind == PromOpcode::OFFSET_KIND_REGISTER {
            self.reg_int((payload & 0xFF) as u8)?
        } else {
            payload
        };
        Some((domain, offset, reg))
    }

    fn flag_indexed_fault(&mut self, mnem: &str, domain: MemoryDomain, offset: i32) {
        warn!("{}: {:?} offset {:#x} is out of range; flagging", mnem, domain, offset);
        self.regs.cpu_flags.insert(CpuFlags::ERROR);
    }
}

impl PromLoadStore for PromCpu {
    fn mov(&mut self) -> Result<(), ExecError> {
        self.load_immediate("MOV")
    }

    fn li(&mut self) -> Result<(), ExecError> {
        self.load_immediate("LI")
    }

    /// Absolute 4-byte load from the System domain.
    fn load(&mut self) -> Result<(), ExecError> {
        let Some(reg) = self.fetch_byte() else { return Ok(()) };
        let Some(addr) = self.fetch_int() else { return Ok(()) };
        if addr < 0 {
            self.flag_indexed_fault("LOAD", MemoryDomain::System, addr);
            return Ok(());
        }
        match self.mem.read_int(MemoryDomain::System, addr as usize) {
            Ok(value) => self.reg_write(reg, RegisterValue::Int(value)),
            Err(_) => self.flag_indexed_fault("LOAD", MemoryDomain::System, addr),
        }
        Ok(())
    }

    fn store(&mut self) -> Result<(), ExecError> {
        let Some(reg) = self.fetch_byte() else { return Ok(()) };
        let Some(addr) = self.fetch_int() else { return Ok(()) };
        let Some(value) = self.reg_int(reg) else { return Ok(()) };
        if addr < 0 {
            self.flag_indexed_fault("STORE", MemoryDomain::System, addr);
            return Ok(());
        }
        if self.mem.write_int(MemoryDomain::System, addr as usize, value).is_err() {
            self.flag_indexed_fault("STORE", MemoryDomain::System, addr);
        }
        Ok(())
    }

    ///
    /// Domain-indexed 4-byte load. Out-of-range access is misbehaving
    /// hardware, not a crashed host: the ERROR flag is raised and the
    /// machine keeps running.
    ///
    fn loadi(&mut self) -> Result<(), ExecError> {
        let Some((domain, offset, reg)) = self.fetch_indexed_operands("LOADI") else {
            return Ok(());
        };
        if offset < 0 {
            self.flag_indexed_fault("LOADI", domain, offset);
            return Ok(());
        }
        match self.mem.read_int(domain, offset as usize) {
            Ok(value) => self.reg_write(reg, RegisterValue::Int(value)),
            Err(_) => self.flag_indexed_fault("LOADI", domain, offset),
        }
        Ok(())
    }

    fn storei(&mut self) -> Result<(), ExecError> {
        let Some((domain, offset, reg)) = self.fetch_indexed_operands("STOREI") else {
            return Ok(());
        };
        let Some(value) = self.reg_int(reg) else { return Ok(()) };
        if offset < 0 {
            self.flag_indexed_fault("STOREI", domain, offset);
            return Ok(());
        }
        if self.mem.write_int(domain, offset as usize, value).is_err() {
            self.flag_indexed_fault("STOREI", domain, offset);
        }
        Ok(())
    }

    ///
    /// Moves a register's integer onto the bounded operand stack. Overflow
    /// is a guest bug with no defined degrade path, so it propagates.
    ///
    fn push_reg(&mut self) -> Result<(), ExecError> {
        let Some(reg) = self.fetch_byte() else { return Ok(()) };
        let Some(value) = self.reg_int(reg) else { return Ok(()) };
        self.mem.push(value)?;
        Ok(())
    }

    fn pop_reg(&mut self) -> Result<(), ExecError> {
        let Some(reg) = self.fetch_byte() else { return Ok(()) };
        let value = self.mem.pop()?;
        self.reg_write(reg, RegisterValue::Int(value));
        Ok(())
    }
}
