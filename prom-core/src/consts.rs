/* Number of memory domains in the PromethiumXS address space */
pub const DOMAIN_COUNT: usize = 8;

/* Byte capacity of each memory domain (4 MiB each, 32 MiB total) */
pub const DOMAIN_SIZE: usize = 4 * 1024 * 1024;

/* Maximum depth of the integer operand stack */
pub const STACK_MAX_DEPTH: usize = 256;

/* Number of general purpose registers */
pub const GPR_COUNT: usize = 32;

/* Number of graphics registers */
pub const GFX_COUNT: usize = 32;

/* Total addressable register file; indices at or above this are invalid */
pub const REG_COUNT: usize = GPR_COUNT + GFX_COUNT;

/* Marks the beginning of a serialized display list */
pub const DISPLAY_LIST_MAGIC: u8 = 0xD2;

/* Longest model name a display list header can carry */
pub const MODEL_NAME_MAX: usize = 255;

/* Size of the fixed header emitted by the 3D display list serializer */
pub const DISPLAY_LIST_3D_HEADER: usize = 16;
