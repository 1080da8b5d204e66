use bitflags::bitflags;
use log::info;

use crate::consts::{GFX_COUNT, GPR_COUNT};

bitflags! {
    ///
    /// CPU status flags. The comparison bits carry the outcome of the most
    /// recent CMP/CMPI; GREATER_OR_EQUAL and LESS_OR_EQUAL are composites of
    /// the base bits, not independent bits, which is what gives CMPI its
    /// distinctive behavior (see `PromControlFlow::cmpi`).
    ///
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CpuFlags: u16 {
        const ZERO      = 0x001;
        const CARRY     = 0x002;
        const OVERFLOW  = 0x004;
        const NEGATIVE  = 0x008;
        const GREATER   = 0x010;
        const LESS      = 0x020;
        const EQUAL     = 0x040;
        const NOT_EQUAL = 0x080;
        /// Recoverable fault from an out-of-range LOADI/STOREI access.
        const ERROR     = 0x100;

        const GREATER_OR_EQUAL = Self::GREATER.bits() | Self::EQUAL.bits();
        const LESS_OR_EQUAL    = Self::LESS.bits() | Self::EQUAL.bits();
    }
}

impl CpuFlags {
    /// Everything CMP/CMPI clear before recording a new outcome.
    pub const COMPARISON_MASK: CpuFlags = CpuFlags::GREATER
        .union(CpuFlags::LESS)
        .union(CpuFlags::EQUAL)
        .union(CpuFlags::NOT_EQUAL);
}

bitflags! {
    /// 3D pipeline state flags, owned by the graphics side of the console.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GfxFlags: u8 {
        const BUFFER_SWAP_PENDING = 0x01;
        const RENDER_COMPLETE     = 0x02;
        const ERROR               = 0x04;
    }
}

///
/// Which interpretation of a register cell is currently valid. Callers must
/// consult the tag before trusting either view of the bits.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterTag {
    Integer,
    Float,
    Model,
}

///
/// One 32-bit register cell. The variant is the tag, so the tag and the
/// stored representation can never disagree; the accessors still expose the
/// raw bit reinterpretation the hardware performs when a program reads a
/// cell through the "wrong" view.
///
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterValue {
    Int(i32),
    Float(f32),
    /// A display-list reference stored by STOREMODEL.
    Model(String),
}

impl RegisterValue {
    pub fn tag(&self) -> RegisterTag {
        match self {
            RegisterValue::Int(_) => RegisterTag::Integer,
            RegisterValue::Float(_) => RegisterTag::Float,
            RegisterValue::Model(_) => RegisterTag::Model,
        }
    }

    /// Integer view. Float bits are reinterpreted, model references read 0.
    pub fn as_int(&self) -> i32 {
        match self {
            RegisterValue::Int(v) => *v,
            RegisterValue::Float(f) => f.to_bits() as i32,
            RegisterValue::Model(_) => 0,
        }
    }

    /// Float view. Integer bits are reinterpreted, model references read 0.
    pub fn as_float(&self) -> f32 {
        match self {
            RegisterValue::Int(v) => f32::from_bits(*v as u32),
            RegisterValue::Float(f) => *f,
            RegisterValue::Model(_) => 0.0,
        }
    }

    pub fn as_model(&self) -> Option<&str> {
        match self {
            RegisterValue::Model(name) => Some(name),
            _ => None,
        }
    }
}

impl Default for RegisterValue {
    fn default() -> Self {
        RegisterValue::Int(0)
    }
}

///
/// The complete register set of the console: 32 general purpose registers,
/// 32 graphics registers and the two flag bitsets.
///
pub struct PromRegisters {
    pub gpr: [RegisterValue; GPR_COUNT],
    pub gfx: [RegisterValue; GFX_COUNT],
    pub cpu_flags: CpuFlags,
    pub gfx_flags: GfxFlags,
}

impl PromRegisters {
    pub fn new() -> PromRegisters {
        PromRegisters {
            gpr: std::array::from_fn(|_| RegisterValue::default()),
            gfx: std::array::from_fn(|_| RegisterValue::default()),
            cpu_flags: CpuFlags::empty(),
            gfx_flags: GfxFlags::empty(),
        }
    }

    ///
    /// Returns the register selected by a flat index: 0..32 picks a general
    /// register, 32..64 a graphics register. Anything above is invalid and
    /// yields None; the CPU logs and skips those operands.
    ///
    pub fn get(&self, index: u8) -> Option<&RegisterValue> {
        let index = index as usize;
        if index < GPR_COUNT {
            Some(&self.gpr[index])
        } else if index < GPR_COUNT + GFX_COUNT {
            Some(&self.gfx[index - GPR_COUNT])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, index: u8) -> Option<&mut RegisterValue> {
        let index = index as usize;
        if index < GPR_COUNT {
            Some(&mut self.gpr[index])
        } else if index < GPR_COUNT + GFX_COUNT {
            Some(&mut self.gfx[index - GPR_COUNT])
        } else {
            None
        }
    }

    /// ALU result side effect: only the ZERO flag tracks results.
    pub fn update_zero(&mut self, result_is_zero: bool) {
        self.cpu_flags.set(CpuFlags::ZERO, result_is_zero);
    }

    ///
    /// Zeroes every register, restores every tag to Integer and clears both
    /// flag sets.
    ///
    pub fn reset(&mut self) {
        for reg in self.gpr.iter_mut().chain(self.gfx.iter_mut()) {
            *reg = RegisterValue::default();
        }
        self.cpu_flags = CpuFlags::empty();
        self.gfx_flags = GfxFlags::empty();
    }

    /// Register dump through the log channel, the inspector UI's data feed.
    pub fn dump(&self) {
        info!("---- PromethiumXS register dump ----");
        for (i, reg) in self.gpr.iter().enumerate() {
            info!("R{}: {:?}", i, reg);
        }
        for (i, reg) in self.gfx.iter().enumerate() {
            info!("G{}: {:?}", i, reg);
        }
        info!("CPU flags: {:?}", self.cpu_flags);
        info!("GFX flags: {:?}", self.gfx_flags);
    }
}

impl Default for PromRegisters {
    fn default() -> Self {
        PromRegisters::new()
    }
}
