/// Instruction memory size, in 32-bit words
pub const ROM_WORDS: usize = 1024;

/// Data memory size, in 32-bit words
pub const RAM_WORDS: usize = 1024;

/// Fetch address after reset
pub const RESET_VECTOR: u32 = 0;

/// addi x0, x0, 0
pub const NOP: u32 = 0x0000_0013;

/// Instructions between gdb interrupt polls while free-running
pub const POLL_INTERVAL: usize = 1024;

/// Default gdb port
pub const GDB_PORT: u16 = 3777;

/// Bad address error
pub const EFAULT: u8 = 14;
