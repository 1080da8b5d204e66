use log::trace;
use rand::Rng;

use crate::cpu::{ExecError, PromCpu};
use crate::mem::MemoryDomain;
use crate::regs::{CpuFlags, RegisterValue};

///
/// Port I/O plus the two environment sources. IN/OUT move raw bytes
/// through the Io domain at the port register's value; what a device does
/// with those bytes is the host's contract, not the core's.
///
pub trait PromIo {
    fn in_port(&mut self) -> Result<(), ExecError>;
    fn out_port(&mut self) -> Result<(), ExecError>;
    fn rand_reg(&mut self) -> Result<(), ExecError>;
    fn time_reg(&mut self) -> Result<(), ExecError>;
}

impl PromCpu {
    fn port_addr(&mut self, mnem: &str, port_reg: u8) -> Option<usize> {
        let port = self.reg_int(port_reg)?;
        if port < 0 {
            log::warn!("{}: negative port {}; flagging", mnem, port);
            self.regs.cpu_flags.insert(CpuFlags::ERROR);
            return None;
        }
        Some(port as usize)
    }
}

impl PromIo for PromCpu {
    fn in_port(&mut self) -> Result<(), ExecError> {
        let Some(dst) = self.fetch_byte() else { return Ok(()) };
        let Some(port_reg) = self.fetch_byte() else { return Ok(()) };
        let Some(addr) = self.port_addr("IN", port_reg) else { return Ok(()) };
        match self.mem.read(MemoryDomain::Io, addr) {
            Ok(byte) => {
                trace!("IN: port {:#x} -> {}", addr, byte);
                self.reg_write(dst, RegisterValue::Int(byte as i32));
            }
            Err(_) => {
                log::warn!("IN: port {:#x} is out of range; flagging", addr);
                self.regs.cpu_flags.insert(CpuFlags::ERROR);
            }
        }
        Ok(())
    }

    fn out_port(&mut self) -> Result<(), ExecError> {
        let Some(src) = self.fetch_byte() else { return Ok(()) };
        let Some(port_reg) = self.fetch_byte() else { return Ok(()) };
        let Some(value) = self.reg_int(src) else { return Ok(()) };
        let Some(addr) = self.port_addr("OUT", port_reg) else { return Ok(()) };
        trace!("OUT: port {:#x} <- {}", addr, value & 0xFF);
        if self.mem.write(MemoryDomain::Io, addr, (value & 0xFF) as u8).is_err() {
            log::warn!("OUT: port {:#x} is out of range; flagging", addr);
            self.regs.cpu_flags.insert(CpuFlags::ERROR);
        }
        Ok(())
    }

    fn rand_reg(&mut self) -> Result<(), ExecError> {
        let Some(reg) = self.fetch_byte() else { return Ok(()) };
        let value: i32 = self.rng.gen();
        self.reg_write(reg, RegisterValue::Int(value));
        Ok(())
    }

    /// Monotonic tick count in milliseconds since the CPU was constructed.
    fn time_reg(&mut self) -> Result<(), ExecError> {
        let Some(reg) = self.fetch_byte() else { return Ok(()) };
        let ticks = self.epoch.elapsed().as_millis() as i32;
        self.reg_write(reg, RegisterValue::Int(ticks));
        Ok(())
    }
}
