// Rvmc is a cycle-stepped multicycle RV32I emulator written in Rust.

pub mod alu;
pub mod config;
pub mod cpu;
pub mod debug;
pub mod error;
pub mod hex;
pub mod insn;
pub mod log;
pub mod machine;
pub mod mem;
pub mod regfile;
pub mod utils;

pub use error::{
    Error,
    Result,
};
pub use machine::Machine;
pub use regfile::Reg;
