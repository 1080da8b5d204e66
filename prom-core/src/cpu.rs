use std::time::Instant;

use log::{debug, error, trace, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::dlist::{DisplayListError, DisplayListManager};
use crate::instr::{
    PromArith, PromControlFlow, PromDisplay, PromFloat, PromInterrupt, PromIo, PromLoadStore,
    PromLogic, PromOpcode,
};
use crate::mem::{MemoryDomain, MemoryError, PromMemory};
use crate::regs::{PromRegisters, RegisterValue};

///
/// Hard failures the execution engine does not absorb: operand stack
/// faults and display-list protocol violations. Guest mistakes with a
/// defined degrade path (bad register index, division by zero, stray
/// indexed access) never surface here.
///
#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    DisplayList(#[from] DisplayListError),
}

///
/// The PromethiumXS execution engine. Fetches from offset 0 of the System
/// domain, decodes against the `instr` contract table and executes one
/// instruction per `step`. Single threaded; a host that drives `step` from
/// a worker thread while a UI reads memory must supply its own locking.
///
pub struct PromCpu {
    pub mem: PromMemory,
    pub regs: PromRegisters,
    pub dlist: DisplayListManager,

    pub(crate) pc: u32,
    pub(crate) running: bool,
    pub(crate) call_stack: Vec<u32>,
    pub(crate) ints_enabled: bool,
    /// Next free byte in the Dpl domain; DLCALL appends and advances.
    pub(crate) dpl_cursor: usize,
    pub(crate) epoch: Instant,
    pub(crate) rng: SmallRng,
}

impl PromCpu {
    pub fn new(mem: PromMemory) -> PromCpu {
        PromCpu {
            mem,
            regs: PromRegisters::new(),
            dlist: DisplayListManager::new(),
            pc: 0,
            running: true,
            call_stack: Vec::new(),
            ints_enabled: false,
            dpl_cursor: 0,
            epoch: Instant::now(),
            rng: SmallRng::from_entropy(),
        }
    }

    ///
    /// Returns the CPU to its power-on state: PC 0, running, empty call
    /// stack, zeroed registers and flags. Memory is left alone; callers
    /// that want a cold boot reset it separately.
    ///
    pub fn reset(&mut self) {
        self.pc = 0;
        self.running = true;
        self.call_stack.clear();
        self.ints_enabled = false;
        self.dpl_cursor = 0;
        self.regs.reset();
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    pub fn interrupts_enabled(&self) -> bool {
        self.ints_enabled
    }

    ///
    /// Executes a single instruction. Reaching the end of the loaded
    /// program is a graceful halt, not an error; the hard failures of
    /// `ExecError` are the only way this returns Err.
    ///
    pub fn step(&mut self) -> Result<(), ExecError> {
        if !self.running {
            return Ok(());
        }
        if (self.pc as usize) >= self.mem.program_size() {
            debug!("end of program reached at {:#08x}; halting", self.pc);
            self.running = false;
            return Ok(());
        }

        let at = self.pc;
        let Some(op_byte) = self.fetch_byte() else { return Ok(()) };
        let Some(opcode) = PromOpcode::from_u8(op_byte) else {
            error!("unknown opcode {:#04x} at {:#08x}; halting", op_byte, at);
            self.running = false;
            return Ok(());
        };
        trace!("{:08x}: {}", at, opcode.mnemonic());
        self.execute(opcode)
    }

    /// Runs until HLT, a controlled halt or a hard failure.
    pub fn run(&mut self) -> Result<(), ExecError> {
        while self.running && (self.pc as usize) < self.mem.program_size() {
            self.step()?;
        }
        self.running = false;
        Ok(())
    }

    fn execute(&mut self, opcode: PromOpcode) -> Result<(), ExecError> {
        use PromOpcode::*;
        match opcode {
            NOP => Ok(()),
            MOV => self.mov(),
            LOAD => self.load(),
            STORE => self.store(),
            ADD => self.add(),
            SUB => self.sub(),
            MUL => self.mul(),
            DIV => self.div(),
            MOD => self.modulo(),
            AND => self.and(),
            OR => self.or(),
            XOR => self.xor(),
            NOT => self.not(),
            SHL => self.shl(),
            SHR => self.shr(),
            CMP => self.cmp(),
            JMP => self.jmp(),
            JZ => self.jz(),
            JNZ => self.jnz(),
            JE => self.je(),
            JNE => self.jne(),
            JG => self.jg(),
            JL => self.jl(),
            CALL => self.call(),
            RET => self.ret(),
            PUSH => self.push_reg(),
            POP => self.pop_reg(),
            IN => self.in_port(),
            OUT => self.out_port(),
            HLT => {
                debug!("HLT encountered; halting");
                self.running = false;
                Ok(())
            }
            RAND => self.rand_reg(),
            TIME => self.time_reg(),
            INT => self.int_request(),
            IRET => self.iret(),
            JGE => self.jge(),
            JLE => self.jle(),
            ADDI => self.addi(),
            SUBI => self.subi(),
            MULI => self.muli(),
            DIVI => self.divi(),
            ANDI => self.andi(),
            ORI => self.ori(),
            XORI => self.xori(),
            SHLI => self.shli(),
            SHRI => self.shri(),
            CMPI => self.cmpi(),
            LI => self.li(),
            MODI => self.modi(),
            LOADI => self.loadi(),
            STOREI => self.storei(),
            EI => self.ei(),
            DI => self.di(),
            MOVF => self.movf(),
            FADD => self.fadd(),
            FSUB => self.fsub(),
            FMUL => self.fmul(),
            FDIV => self.fdiv(),
            FMOD => self.fmod(),
            ITOF => self.itof(),
            FTOI => self.ftoi(),
            DLSTART => self.dlstart(),
            DLPRIMITIVE => self.dlprimitive(),
            DLCOLOR => self.dlcolor(),
            DLVERTEX => self.dlvertex(),
            DLEND => self.dlend(),
            DLCALL => self.dlcall(),
            STOREMODEL => self.storemodel(),
            LOADMODEL => self.loadmodel(),
        }
    }

    // ------------------------------------------------------------------
    // Fetch helpers. Every operand fetch is bounded by the program length;
    // running off the end mid-instruction is the same graceful halt as
    // reaching it between instructions, so these return None after setting
    // the halt state.
    // ------------------------------------------------------------------

    pub(crate) fn fetch_byte(&mut self) -> Option<u8> {
        if (self.pc as usize) >= self.mem.program_size() {
            debug!("end of program reached while fetching at {:#08x}; halting", self.pc);
            self.running = false;
            return None;
        }
        let byte = self.mem.read(MemoryDomain::System, self.pc as usize).ok()?;
        self.pc += 1;
        Some(byte)
    }

    pub(crate) fn fetch_int(&mut self) -> Option<i32> {
        let mut raw = [0u8; 4];
        for slot in raw.iter_mut() {
            *slot = self.fetch_byte()?;
        }
        Some(i32::from_le_bytes(raw))
    }

    pub(crate) fn fetch_float(&mut self) -> Option<f32> {
        let mut raw = [0u8; 4];
        for slot in raw.iter_mut() {
            *slot = self.fetch_byte()?;
        }
        Some(f32::from_le_bytes(raw))
    }

    /// Length-prefixed ASCII string operand used by the display-list ops.
    pub(crate) fn fetch_name(&mut self) -> Option<String> {
        let len = self.fetch_byte()? as usize;
        let mut raw = Vec::with_capacity(len);
        for _ in 0..len {
            raw.push(self.fetch_byte()?);
        }
        Some(String::from_utf8_lossy(&raw).into_owned())
    }

    // ------------------------------------------------------------------
    // Register helpers. Indices 0..32 address the general bank, 32..64 the
    // graphics bank; anything beyond is a guest mistake that skips the
    // operation rather than faulting the machine.
    // ------------------------------------------------------------------

    pub(crate) fn reg_int(&self, index: u8) -> Option<i32> {
        match self.regs.get(index) {
            Some(reg) => Some(reg.as_int()),
            None => {
                warn!("invalid register index {}; skipping", index);
                None
            }
        }
    }

    pub(crate) fn reg_float(&self, index: u8) -> Option<f32> {
        match self.regs.get(index) {
            Some(reg) => Some(reg.as_float()),
            None => {
                warn!("invalid register index {}; skipping", index);
                None
            }
        }
    }

    pub(crate) fn reg_write(&mut self, index: u8, value: RegisterValue) {
        match self.regs.get_mut(index) {
            Some(reg) => *reg = value,
            None => warn!("invalid register index {}; dropping write", index),
        }
    }

    // ------------------------------------------------------------------
    // ALU scaffolding shared by the arith/logic/float families.
    // ------------------------------------------------------------------

    ///
    /// Two-register integer operation: `dst = f(dst, src)`. `f` returning
    /// None marks a division by zero, which leaves the destination and the
    /// flags untouched.
    ///
    pub(crate) fn int_binop(
        &mut self,
        mnem: &str,
        f: fn(i32, i32) -> Option<i32>,
    ) -> Result<(), ExecError> {
        let Some(dst) = self.fetch_byte() else { return Ok(()) };
        let Some(src) = self.fetch_byte() else { return Ok(()) };
        let (Some(a), Some(b)) = (self.reg_int(dst), self.reg_int(src)) else {
            return Ok(());
        };
        match f(a, b) {
            Some(result) => {
                trace!("{}: {} {} -> {}", mnem, a, b, result);
                self.reg_write(dst, RegisterValue::Int(result));
                self.regs.update_zero(result == 0);
            }
            None => warn!("{}: division by zero; register {} unmodified", mnem, dst),
        }
        Ok(())
    }

    /// Register-immediate integer operation: `reg = f(reg, imm)`.
    pub(crate) fn int_imm_op(
        &mut self,
        mnem: &str,
        f: fn(i32, i32) -> Option<i32>,
    ) -> Result<(), ExecError> {
        let Some(dst) = self.fetch_byte() else { return Ok(()) };
        let Some(imm) = self.fetch_int() else { return Ok(()) };
        let Some(a) = self.reg_int(dst) else { return Ok(()) };
        match f(a, imm) {
            Some(result) => {
                trace!("{}: {} {} -> {}", mnem, a, imm, result);
                self.reg_write(dst, RegisterValue::Int(result));
                self.regs.update_zero(result == 0);
            }
            None => warn!("{}: division by zero; register {} unmodified", mnem, dst),
        }
        Ok(())
    }

    /// Two-register float operation with the same zero-divisor policy.
    pub(crate) fn float_binop(
        &mut self,
        mnem: &str,
        f: fn(f32, f32) -> Option<f32>,
    ) -> Result<(), ExecError> {
        let Some(dst) = self.fetch_byte() else { return Ok(()) };
        let Some(src) = self.fetch_byte() else { return Ok(()) };
        let (Some(a), Some(b)) = (self.reg_float(dst), self.reg_float(src)) else {
            return Ok(());
        };
        match f(a, b) {
            Some(result) => {
                trace!("{}: {} {} -> {}", mnem, a, b, result);
                self.reg_write(dst, RegisterValue::Float(result));
                self.regs.update_zero(result == 0.0);
            }
            None => warn!("{}: division by zero; register {} unmodified", mnem, dst),
        }
        Ok(())
    }
}
