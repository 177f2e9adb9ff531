//! The multicycle control sequencer.
//!
//! Each call to [`Cpu::tick`] performs the work of the current control
//! state and advances to the next one, so a single instruction spends
//! five to seven ticks in flight. Both backing stores have one tick of
//! read latency, which is what the FETCH_WAIT and MEMORY2 states model.

use crate::*;
use crate::alu::{alu, compare, AluOp};
use crate::config::RESET_VECTOR;
use crate::insn::{self, InsnDesc, OpFlags, OpKind};
use crate::mem::WordMem;
use crate::regfile::RegFile;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Fetch,
    FetchWait,
    Decode,
    Execute,
    Memory,
    Memory2,
    Writeback,
    /// Terminal. Entered when DECODE hits an undefined encoding; further
    /// ticks are no-ops.
    Halted,
}

/// Values carried across states for the instruction in flight.
#[derive(Debug, Default)]
struct Scratch {
    raw: u32,
    desc: InsnDesc,
    a: u32,
    b: u32,
    target: u32,
    alu_out: u32,
    next_pc: u32,
    load_val: u32,
}

#[derive(Debug)]
pub struct Cpu {
    pub pc: u32,
    pub regs: RegFile,
    pub stage: Stage,
    pub cycles: u64,
    pub retired: u64,
    scratch: Scratch,
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            pc: RESET_VECTOR,
            regs: RegFile::new(),
            stage: Stage::Fetch,
            cycles: 0,
            retired: 0,
            scratch: Scratch::default(),
        }
    }

    /// Clears the architectural state and parks the sequencer at FETCH,
    /// as if the reset line had been pulsed for one clock.
    pub fn reset(&mut self) {
        self.pc = RESET_VECTOR;
        self.regs.reset();
        self.stage = Stage::Fetch;
        self.cycles = 0;
        self.retired = 0;
        self.scratch = Scratch::default();
    }

    /// Advances the sequencer by one clock.
    ///
    /// The instruction store is only read in the fetch states and the data
    /// store only touched in the memory states; the register file commits
    /// in WRITEBACK. An undefined encoding halts the core and surfaces as
    /// `Error::IllegalInsn` exactly once.
    pub fn tick(&mut self, rom: &WordMem, ram: &mut WordMem) -> Result<()> {
        self.cycles += 1;
        match self.stage {
            Stage::Fetch => {
                // Address asserted; the word arrives next tick.
                self.scratch = Scratch::default();
                self.stage = Stage::FetchWait;
            }
            Stage::FetchWait => {
                self.scratch.raw = rom.read_word(self.pc);
                self.stage = Stage::Decode;
            }
            Stage::Decode => {
                let raw = self.scratch.raw;
                let desc = match insn::decode(raw) {
                    Some(desc) => desc,
                    None => {
                        warn!("illegal instruction {:#010x} at pc {:#x}", raw, self.pc);
                        self.stage = Stage::Halted;
                        return Err(Error::IllegalInsn(raw, self.pc));
                    }
                };
                self.scratch.a = self.regs.read(desc.rs1);
                self.scratch.b = self.regs.read(desc.rs2);
                self.scratch.target = if desc.op == OpKind::Jalr {
                    self.scratch.a.wrapping_add(desc.imm) & !1
                } else {
                    self.pc.wrapping_add(desc.imm)
                };
                self.scratch.desc = desc;
                self.stage = Stage::Execute;
            }
            Stage::Execute => {
                let desc = self.scratch.desc;
                let seq_pc = self.pc.wrapping_add(4);
                if desc.flags.contains(OpFlags::BRANCH) {
                    let taken = compare(desc.op.branch_cond(), self.scratch.a, self.scratch.b);
                    self.scratch.next_pc = if taken { self.scratch.target } else { seq_pc };
                } else if desc.flags.contains(OpFlags::JUMP) {
                    self.scratch.alu_out = seq_pc;
                    self.scratch.next_pc = self.scratch.target;
                } else if desc.flags.intersects(OpFlags::MEM_LOAD | OpFlags::MEM_STORE) {
                    self.scratch.alu_out = alu(AluOp::Add, self.scratch.a, desc.imm);
                    self.scratch.next_pc = seq_pc;
                } else {
                    let rhs = if desc.flags.contains(OpFlags::READS_RS2) {
                        self.scratch.b
                    } else {
                        desc.imm
                    };
                    self.scratch.alu_out = match desc.op {
                        OpKind::Lui => desc.imm,
                        OpKind::Auipc => alu(AluOp::Add, self.pc, desc.imm),
                        _ => alu(desc.op.alu_op(), self.scratch.a, rhs),
                    };
                    self.scratch.next_pc = seq_pc;
                }
                self.stage = if desc.flags.intersects(OpFlags::MEM_LOAD | OpFlags::MEM_STORE) {
                    Stage::Memory
                } else {
                    Stage::Writeback
                };
            }
            Stage::Memory => {
                let desc = self.scratch.desc;
                let addr = self.scratch.alu_out;
                if desc.flags.contains(OpFlags::MEM_STORE) {
                    match desc.op {
                        OpKind::Sb => ram.write_byte(addr, self.scratch.b as u8),
                        OpKind::Sh => ram.write_half(addr, self.scratch.b as u16),
                        _ => ram.write_word(addr, self.scratch.b),
                    }
                    self.stage = Stage::Writeback;
                } else {
                    // Load address asserted; data is valid next tick.
                    self.stage = Stage::Memory2;
                }
            }
            Stage::Memory2 => {
                let addr = self.scratch.alu_out;
                self.scratch.load_val = match self.scratch.desc.op {
                    OpKind::Lb => sign_extend!(ram.read_byte(addr), 8) as u32,
                    OpKind::Lbu => zero_extend!(ram.read_byte(addr), 8),
                    OpKind::Lh => sign_extend!(ram.read_half(addr), 16) as u32,
                    OpKind::Lhu => zero_extend!(ram.read_half(addr), 16),
                    _ => ram.read_word(addr),
                };
                self.stage = Stage::Writeback;
            }
            Stage::Writeback => {
                let desc = self.scratch.desc;
                if desc.flags.contains(OpFlags::WRITES_RD) {
                    let value = if desc.flags.contains(OpFlags::MEM_LOAD) {
                        self.scratch.load_val
                    } else {
                        self.scratch.alu_out
                    };
                    self.regs.write(desc.rd, value);
                }
                trace!("pc@{:#x}: retired {:?}, next pc {:#x}", self.pc, desc.op, self.scratch.next_pc);
                self.pc = self.scratch.next_pc;
                self.retired += 1;
                self.stage = Stage::Fetch;
            }
            Stage::Halted => {}
        }
        Ok(())
    }
}
