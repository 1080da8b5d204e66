#[cfg(test)]
mod tests;

use heapless::Vec as BoundedVec;
use log::{debug, trace};
use thiserror::Error;

use crate::consts::{DOMAIN_COUNT, DOMAIN_SIZE, STACK_MAX_DEPTH};

///
/// Named regions of the PromethiumXS address space. Every domain owns a
/// contiguous buffer of `DOMAIN_SIZE` bytes allocated once at construction.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryDomain {
    /// Main system RAM; programs execute from offset 0 of this domain.
    System,
    /// Video RAM consumed by the external rasterizer.
    Video,
    /// Audio buffers.
    Audio,
    /// Serialized display lists.
    Dpl,
    /// Cartridge ROM. Guest writes are dropped.
    Cartridge,
    /// Memory mapped peripherals.
    Io,
    /// High speed cache.
    Cache,
    /// Scratchpad for temporary storage.
    Scratch,
}

pub const DOMAIN_TABLE: [MemoryDomain; DOMAIN_COUNT] = [
    MemoryDomain::System,
    MemoryDomain::Video,
    MemoryDomain::Audio,
    MemoryDomain::Dpl,
    MemoryDomain::Cartridge,
    MemoryDomain::Io,
    MemoryDomain::Cache,
    MemoryDomain::Scratch,
];

impl MemoryDomain {
    pub fn from_u8(value: u8) -> Option<MemoryDomain> {
        DOMAIN_TABLE.get(value as usize).copied()
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("address {addr:#010x} is out of range for the {domain:?} domain")]
    OutOfRange { domain: MemoryDomain, addr: usize },

    #[error("operand stack overflow (maximum depth {STACK_MAX_DEPTH})")]
    StackOverflow,

    #[error("operand stack underflow")]
    StackUnderflow,

    #[error("program of {size} bytes does not fit the System domain")]
    ProgramTooLarge { size: usize },
}

///
/// The complete memory system: one fixed-size buffer per domain plus the
/// depth-bounded integer operand stack used by PUSH/POP.
///
pub struct PromMemory {
    domains: [Vec<u8>; DOMAIN_COUNT],
    stack: BoundedVec<i32, STACK_MAX_DEPTH>,
    program_size: usize,
}

impl PromMemory {
    pub fn new() -> PromMemory {
        PromMemory {
            domains: std::array::from_fn(|_| vec![0u8; DOMAIN_SIZE]),
            stack: BoundedVec::new(),
            program_size: 0,
        }
    }

    ///
    /// Reads a single byte from `domain` at `addr`. Out of range addresses
    /// are a host-level fault on every domain, ROM included.
    ///
    pub fn read(&self, domain: MemoryDomain, addr: usize) -> Result<u8, MemoryError> {
        if addr >= DOMAIN_SIZE {
            return Err(MemoryError::OutOfRange { domain, addr });
        }
        Ok(self.domains[domain.index()][addr])
    }

    ///
    /// Writes a single byte to `domain` at `addr`. An in-bounds write to the
    /// Cartridge domain is dropped: guest programs cannot patch ROM, and the
    /// write is not an error the way a bounds violation is.
    ///
    pub fn write(&mut self, domain: MemoryDomain, addr: usize, value: u8) -> Result<(), MemoryError> {
        if addr >= DOMAIN_SIZE {
            return Err(MemoryError::OutOfRange { domain, addr });
        }
        if domain == MemoryDomain::Cartridge {
            trace!("dropping ROM write: {:#010x} <- {:#04x}", addr, value);
            return Ok(());
        }
        self.domains[domain.index()][addr] = value;
        Ok(())
    }

    ///
    /// 4-byte little-endian integer view. The whole span must be in bounds.
    ///
    pub fn read_int(&self, domain: MemoryDomain, addr: usize) -> Result<i32, MemoryError> {
        let bytes = self.read_span(domain, addr)?;
        Ok(i32::from_le_bytes(bytes))
    }

    pub fn write_int(&mut self, domain: MemoryDomain, addr: usize, value: i32) -> Result<(), MemoryError> {
        self.write_span(domain, addr, value.to_le_bytes())
    }

    pub fn read_float(&self, domain: MemoryDomain, addr: usize) -> Result<f32, MemoryError> {
        let bytes = self.read_span(domain, addr)?;
        Ok(f32::from_le_bytes(bytes))
    }

    pub fn write_float(&mut self, domain: MemoryDomain, addr: usize, value: f32) -> Result<(), MemoryError> {
        self.write_span(domain, addr, value.to_le_bytes())
    }

    fn read_span(&self, domain: MemoryDomain, addr: usize) -> Result<[u8; 4], MemoryError> {
        let end = addr.checked_add(4).ok_or(MemoryError::OutOfRange { domain, addr })?;
        if end > DOMAIN_SIZE {
            return Err(MemoryError::OutOfRange { domain, addr });
        }
        let buf = &self.domains[domain.index()][addr..end];
        Ok([buf[0], buf[1], buf[2], buf[3]])
    }

    fn write_span(&mut self, domain: MemoryDomain, addr: usize, bytes: [u8; 4]) -> Result<(), MemoryError> {
        let end = addr.checked_add(4).ok_or(MemoryError::OutOfRange { domain, addr })?;
        if end > DOMAIN_SIZE {
            return Err(MemoryError::OutOfRange { domain, addr });
        }
        if domain == MemoryDomain::Cartridge {
            trace!("dropping 4-byte ROM write at {:#010x}", addr);
            return Ok(());
        }
        self.domains[domain.index()][addr..end].copy_from_slice(&bytes);
        Ok(())
    }

    ///
    /// Copies `len` bytes between domains under the same bounds and ROM
    /// rules as the single-byte accessors.
    ///
    pub fn copy_block(
        &mut self,
        src_domain: MemoryDomain,
        src_addr: usize,
        dst_domain: MemoryDomain,
        dst_addr: usize,
        len: usize,
    ) -> Result<(), MemoryError> {
        let src_end = src_addr
            .checked_add(len)
            .filter(|end| *end <= DOMAIN_SIZE)
            .ok_or(MemoryError::OutOfRange { domain: src_domain, addr: src_addr })?;
        let dst_end = dst_addr
            .checked_add(len)
            .filter(|end| *end <= DOMAIN_SIZE)
            .ok_or(MemoryError::OutOfRange { domain: dst_domain, addr: dst_addr })?;

        if dst_domain == MemoryDomain::Cartridge {
            trace!("dropping {} byte ROM block write at {:#010x}", len, dst_addr);
            return Ok(());
        }

        let block = self.domains[src_domain.index()][src_addr..src_end].to_vec();
        self.domains[dst_domain.index()][dst_addr..dst_end].copy_from_slice(&block);
        Ok(())
    }

    ///
    /// Copies an assembled program into the System domain at offset 0 and
    /// records its length, which bounds the CPU's fetch window.
    ///
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        if program.len() > DOMAIN_SIZE {
            return Err(MemoryError::ProgramTooLarge { size: program.len() });
        }
        self.domains[MemoryDomain::System.index()][..program.len()].copy_from_slice(program);
        self.program_size = program.len();
        debug!("loaded {} byte program into the System domain", program.len());
        Ok(())
    }

    ///
    /// Host-side cartridge image loader. This is the one path that may fill
    /// the Cartridge domain; guest-visible writes to it are dropped.
    ///
    pub fn load_cartridge(&mut self, image: &[u8]) -> Result<(), MemoryError> {
        if image.len() > DOMAIN_SIZE {
            return Err(MemoryError::OutOfRange {
                domain: MemoryDomain::Cartridge,
                addr: image.len(),
            });
        }
        self.domains[MemoryDomain::Cartridge.index()][..image.len()].copy_from_slice(image);
        debug!("loaded {} byte cartridge image", image.len());
        Ok(())
    }

    pub fn program_size(&self) -> usize {
        self.program_size
    }

    pub fn set_program_size(&mut self, size: usize) {
        self.program_size = size.min(DOMAIN_SIZE);
    }

    pub fn push(&mut self, value: i32) -> Result<(), MemoryError> {
        trace!("stack push {} (depth {})", value, self.stack.len());
        self.stack.push(value).map_err(|_| MemoryError::StackOverflow)
    }

    pub fn pop(&mut self) -> Result<i32, MemoryError> {
        let value = self.stack.pop().ok_or(MemoryError::StackUnderflow)?;
        trace!("stack pop {} (depth {})", value, self.stack.len());
        Ok(value)
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    ///
    /// Zeroes every domain except the Cartridge ROM, clears the operand
    /// stack and forgets the loaded program. Buffers are reused, never
    /// reallocated.
    ///
    pub fn reset(&mut self) {
        for domain in DOMAIN_TABLE {
            if domain == MemoryDomain::Cartridge {
                continue;
            }
            self.domains[domain.index()].fill(0);
        }
        self.stack.clear();
        self.program_size = 0;
    }

    ///
    /// Hex dump of a domain window through the log channel, 16 bytes per
    /// line. This is the surface the debug console drives.
    ///
    pub fn dump_domain(&self, domain: MemoryDomain, start: usize, len: usize) {
        let end = (start + len).min(DOMAIN_SIZE);
        debug!("memory dump for the {:?} domain:", domain);
        for line_start in (start..end).step_by(16) {
            let line_end = (line_start + 16).min(end);
            let bytes = &self.domains[domain.index()][line_start..line_end];
            let hex: Vec<String> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
            debug!("{:08X}: {}", line_start, hex.join(" "));
        }
    }
}

impl Default for PromMemory {
    fn default() -> Self {
        PromMemory::new()
    }
}
