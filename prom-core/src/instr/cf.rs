use log::{debug, error};

use crate::cpu::{ExecError, PromCpu};
use crate::regs::CpuFlags;

///
/// Control flow family. Jump targets are absolute byte offsets into the
/// loaded program; a target outside it is a fatal halt, unlike the
/// recoverable operand mistakes elsewhere, because continuing would mean
/// executing arbitrary memory.
///
pub trait PromControlFlow {
    fn jmp(&mut self) -> Result<(), ExecError>;
    fn jz(&mut self) -> Result<(), ExecError>;
    fn jnz(&mut self) -> Result<(), ExecError>;
    fn je(&mut self) -> Result<(), ExecError>;
    fn jne(&mut self) -> Result<(), ExecError>;
    fn jg(&mut self) -> Result<(), ExecError>;
    fn jl(&mut self) -> Result<(), ExecError>;
    fn jge(&mut self) -> Result<(), ExecError>;
    fn jle(&mut self) -> Result<(), ExecError>;
    fn call(&mut self) -> Result<(), ExecError>;
    fn ret(&mut self) -> Result<(), ExecError>;
    fn cmp(&mut self) -> Result<(), ExecError>;
    fn cmpi(&mut self) -> Result<(), ExecError>;
}

impl PromCpu {
    fn branch(&mut self, mnem: &str, target: i32) {
        if target < 0 || (target as usize) >= self.mem.program_size() {
            error!("{}: target {:#x} is outside the program; halting", mnem, target);
            self.running = false;
            return;
        }
        self.pc = target as u32;
    }

    /// Conditional jump: the operand is always consumed, the branch only
    /// happens when any of `when` is set.
    fn branch_if(&mut self, mnem: &str, when: CpuFlags) -> Result<(), ExecError> {
        let Some(target) = self.fetch_int() else { return Ok(()) };
        if self.regs.cpu_flags.intersects(when) {
            self.branch(mnem, target);
        }
        Ok(())
    }

    fn branch_unless(&mut self, mnem: &str, unless: CpuFlags) -> Result<(), ExecError> {
        let Some(target) = self.fetch_int() else { return Ok(()) };
        if !self.regs.cpu_flags.intersects(unless) {
            self.branch(mnem, target);
        }
        Ok(())
    }
}

impl PromControlFlow for PromCpu {
    fn jmp(&mut self) -> Result<(), ExecError> {
        let Some(target) = self.fetch_int() else { return Ok(()) };
        self.branch("JMP", target);
        Ok(())
    }

    fn jz(&mut self) -> Result<(), ExecError> {
        self.branch_if("JZ", CpuFlags::ZERO | CpuFlags::EQUAL)
    }

    fn jnz(&mut self) -> Result<(), ExecError> {
        self.branch_unless("JNZ", CpuFlags::ZERO | CpuFlags::EQUAL)
    }

    fn je(&mut self) -> Result<(), ExecError> {
        self.branch_if("JE", CpuFlags::ZERO | CpuFlags::EQUAL)
    }

    fn jne(&mut self) -> Result<(), ExecError> {
        self.branch_unless("JNE", CpuFlags::ZERO | CpuFlags::EQUAL)
    }

    fn jg(&mut self) -> Result<(), ExecError> {
        self.branch_if("JG", CpuFlags::GREATER)
    }

    fn jl(&mut self) -> Result<(), ExecError> {
        self.branch_if("JL", CpuFlags::LESS)
    }

    fn jge(&mut self) -> Result<(), ExecError> {
        self.branch_if("JGE", CpuFlags::GREATER | CpuFlags::EQUAL)
    }

    fn jle(&mut self) -> Result<(), ExecError> {
        self.branch_if("JLE", CpuFlags::LESS | CpuFlags::EQUAL)
    }

    ///
    /// Saves the address of the instruction after the operand and jumps.
    /// The return stack is the CPU's own, separate from the PUSH/POP
    /// operand stack in memory.
    ///
    fn call(&mut self) -> Result<(), ExecError> {
        let Some(target) = self.fetch_int() else { return Ok(()) };
        self.call_stack.push(self.pc);
        debug!("CALL {:#x}, return address {:#x}", target, self.pc);
        self.branch("CALL", target);
        Ok(())
    }

    /// RET with no saved frame is a top-level return: a fatal halt.
    fn ret(&mut self) -> Result<(), ExecError> {
        match self.call_stack.pop() {
            Some(addr) => self.branch("RET", addr as i32),
            None => {
                error!("RET with an empty call stack; halting");
                self.running = false;
            }
        }
        Ok(())
    }

    ///
    /// Plain two-register compare sets exactly one of EQUAL/GREATER/LESS.
    /// Note it does not produce the composite GE/LE masks; only CMPI does.
    ///
    fn cmp(&mut self) -> Result<(), ExecError> {
        let Some(ra) = self.fetch_byte() else { return Ok(()) };
        let Some(rb) = self.fetch_byte() else { return Ok(()) };
        let (Some(a), Some(b)) = (self.reg_int(ra), self.reg_int(rb)) else {
            return Ok(());
        };

        self.regs.cpu_flags.remove(CpuFlags::COMPARISON_MASK);
        let outcome = match a.cmp(&b) {
            std::cmp::Ordering::Equal => CpuFlags::EQUAL,
            std::cmp::Ordering::Greater => CpuFlags::GREATER,
            std::cmp::Ordering::Less => CpuFlags::LESS,
        };
        self.regs.cpu_flags.insert(outcome);
        Ok(())
    }

    ///
    /// Register-immediate compare. Unlike CMP it also ORs in the derived
    /// GREATER_OR_EQUAL/LESS_OR_EQUAL masks; since those are composites of
    /// the base bits, an equal comparison lights GREATER and LESS as well.
    /// Long-standing behavior, kept as is.
    ///
    fn cmpi(&mut self) -> Result<(), ExecError> {
        let Some(reg) = self.fetch_byte() else { return Ok(()) };
        let Some(imm) = self.fetch_int() else { return Ok(()) };
        let Some(a) = self.reg_int(reg) else { return Ok(()) };

        self.regs.cpu_flags.remove(CpuFlags::COMPARISON_MASK);
        let outcome = match a.cmp(&imm) {
            std::cmp::Ordering::Equal => {
                CpuFlags::EQUAL | CpuFlags::GREATER_OR_EQUAL | CpuFlags::LESS_OR_EQUAL
            }
            std::cmp::Ordering::Greater => CpuFlags::GREATER | CpuFlags::GREATER_OR_EQUAL,
            std::cmp::Ordering::Less => CpuFlags::LESS | CpuFlags::LESS_OR_EQUAL,
        };
        self.regs.cpu_flags.insert(outcome);
        Ok(())
    }
}
