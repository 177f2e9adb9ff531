use std::error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// (insn, pc)
    IllegalInsn(u32, u32),
    /// Program image does not fit in instruction memory (word count)
    ProgramTooLarge(usize),
    IoError(std::io::Error, String),
    /// (line, text)
    BadHexWord(usize, String),

    // Debug
    RepeatedBreakpoint(u32),
    BreakpointNotFound(u32),
    BadDebugAddr(u32),
    InternalError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IllegalInsn(insn, pc) => write!(f, "Illegal instruction: {:#010x} at {:#x}", insn, pc),
            Error::ProgramTooLarge(words) => write!(f, "Program too large: {} words", words),
            Error::BadHexWord(line, text) => write!(f, "Bad hex word on line {}: '{}'", line, text),
            Error::RepeatedBreakpoint(addr) => write!(f, "Repeated breakpoint at {:#x}", addr),
            Error::BreakpointNotFound(addr) => write!(f, "Breakpoint not found at {:#x}", addr),
            Error::BadDebugAddr(addr) => write!(f, "Address {:#x} is outside the debug memory map", addr),
            Error::InternalError(msg) => write!(f, "Internal error: {}", msg),
            Error::IoError(err, path) => {
                let msg = err.to_string();
                if path.is_empty() {
                    write!(f, "I/O error: {}", msg)
                } else {
                    write!(f, "I/O error on '{}': {}", path, msg)
                }
            }
        }
    }
}

impl error::Error for Error {}
