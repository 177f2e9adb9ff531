//! The assembled core: sequencer plus instruction and data stores, with
//! the harness operations for loading programs and inspecting state.

use std::collections::HashSet;

use crate::*;
use crate::config::{NOP, RAM_WORDS, ROM_WORDS};
use crate::cpu::{Cpu, Stage};
use crate::debug::ExecMode;
use crate::mem::WordMem;
use crate::regfile::Reg;

#[derive(Debug)]
pub struct Machine {
    pub cpu: Cpu,
    pub(crate) rom: WordMem,
    pub(crate) ram: WordMem,
    pub(crate) breakpoints: HashSet<u32>,
    pub(crate) exec_mode: ExecMode,
}

impl Machine {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            rom: WordMem::new(ROM_WORDS),
            ram: WordMem::new(RAM_WORDS),
            breakpoints: HashSet::new(),
            exec_mode: ExecMode::Continue,
        }
    }

    /// Writes `words` to the start of the instruction store and fills the
    /// remainder with `addi x0, x0, 0`.
    pub fn load_program(&mut self, words: &[u32]) -> Result<()> {
        if words.len() > ROM_WORDS {
            warn!("program of {} words does not fit in {} instruction words", words.len(), ROM_WORDS);
            return Err(Error::ProgramTooLarge(words.len()));
        }
        self.rom.load(words, NOP);
        Ok(())
    }

    /// Pulses the reset line: pc back to the reset vector, registers
    /// cleared, sequencer at FETCH. Memory contents are left alone.
    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    /// Runs `n` clock transitions. Stops early with an error if the core
    /// hits an undefined encoding; the core stays halted afterwards and
    /// further steps are no-ops.
    pub fn step(&mut self, n: u32) -> Result<()> {
        for _ in 0..n {
            self.cpu.tick(&self.rom, &mut self.ram)?;
        }
        Ok(())
    }

    /// Runs until one instruction retires. Returns false without stepping
    /// if the core is halted.
    pub fn step_insn(&mut self) -> Result<bool> {
        if self.cpu.stage == Stage::Halted {
            return Ok(false);
        }
        let before = self.cpu.retired;
        while self.cpu.retired == before {
            self.cpu.tick(&self.rom, &mut self.ram)?;
            if self.cpu.stage == Stage::Halted {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn read_register(&self, index: u8) -> u32 {
        self.cpu.regs.read(Reg::new(index))
    }

    /// Direct register seeding for tests and the debugger; not part of the
    /// instruction-driven write path.
    pub fn poke_register(&mut self, index: u8, value: u32) {
        self.cpu.regs.write(Reg::new(index), value);
    }

    pub fn read_data_word(&self, word_index: usize) -> u32 {
        self.ram.read_word((word_index as u32) << 2)
    }

    /// Direct data-memory seeding, same standing as [`Self::poke_register`].
    pub fn poke_data_word(&mut self, word_index: usize, value: u32) {
        self.ram.write_word((word_index as u32) << 2, value);
    }

    pub fn pc(&self) -> u32 {
        self.cpu.pc
    }

    pub fn halted(&self) -> bool {
        self.cpu.stage == Stage::Halted
    }

    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }
}
