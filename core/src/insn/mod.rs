//! Instruction decoding.

use bitflags::bitflags;

use crate::*;
use crate::config::NOP;
use crate::regfile::Reg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsnType {
    R,
    I,
    S,
    B,
    U,
    J,
}

bitflags! {
    /// Control signals resolved at decode time. They steer the sequencer's
    /// state transitions and the writeback/operand muxes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpFlags: u8 {
        const NONE = 0;
        /// Commits a result to rd in WRITEBACK.
        const WRITES_RD = 1 << 0;
        /// Second ALU operand is rs2 rather than the immediate.
        const READS_RS2 = 1 << 1;
        const MEM_LOAD = 1 << 2;
        const MEM_STORE = 1 << 3;
        const BRANCH = 1 << 4;
        const JUMP = 1 << 5;
    }
}

/// Decoder output: one instruction, fully field-extracted and classified.
#[derive(Debug, Clone, Copy)]
pub struct InsnDesc {
    pub op: OpKind,
    pub rd: Reg,
    pub rs1: Reg,
    pub rs2: Reg,
    /// Sign-extended per the encoding family; zero for R-type.
    pub imm: u32,
    pub flags: OpFlags,
    pub raw: u32,
}

/// The descriptor of `addi x0, x0, 0`.
impl Default for InsnDesc {
    fn default() -> Self {
        Self {
            op: OpKind::Addi,
            rd: Reg::new(0),
            rs1: Reg::new(0),
            rs2: Reg::new(0),
            imm: 0,
            flags: OpFlags::WRITES_RD,
            raw: NOP,
        }
    }
}

impl InsnDesc {
    pub fn extract_imm(raw: u32, insn_type: InsnType) -> u32 {
        use InsnType::*;
        match insn_type {
            // [31:20] imm[11:0]
            I => raw >> 20,
            // [31:25] imm[11:5], [11:7] imm[4:0]
            S => (((raw >> 25) & 0x7f) << 5) | ((raw >> 7) & 0x1f),
            // [31:25] imm[12, 10:5], [11:7] imm[4:1, 11]
            B => (((raw >> 31) & 0x1) << 12) | (((raw >> 25) & 0x3f) << 5) | (((raw >> 8) & 0xf) << 1) | (((raw >> 7) & 0x1) << 11),
            // [31:12] imm[31:12]
            U => raw & 0xfffff000,
            // [31:12] imm[20, 10:1, 11, 19:12]
            J => (((raw >> 31) & 0x1) << 20) | (((raw >> 21) & 0x3ff) << 1) | (((raw >> 20) & 0x1) << 11) | (((raw >> 12) & 0xff) << 12),
            _ => panic!("extract_imm called with unsupported instruction type: {:?}", insn_type),
        }
    }
}

pub mod rv32i;

pub use rv32i::{decode, OpKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_imm() {
        log::log_init(log::Level::Off);

        // I-type
        let addi = 0x02010113;
        let imm = InsnDesc::extract_imm(addi, InsnType::I);
        assert_eq!(imm, 0x20);

        let addi = 0x06400293;
        let imm = InsnDesc::extract_imm(addi, InsnType::I);
        assert_eq!(imm, 0x64);

        let addi = 0xfff00313;
        let imm = InsnDesc::extract_imm(addi, InsnType::I);
        assert_eq!(((imm as i32) << 20) >> 20, -1);

        let lw = 0x00842303;
        let imm = InsnDesc::extract_imm(lw, InsnType::I);
        assert_eq!(imm, 0x8);

        let lb = 0xFFC50483;
        let imm = InsnDesc::extract_imm(lb, InsnType::I);
        assert_eq!(((imm as i32) << 20) >> 20, -4);

        // S-type
        let sw = 0x00532623;
        let imm = InsnDesc::extract_imm(sw, InsnType::S);
        assert_eq!(imm, 12);

        let sb = 0xfe740c23;
        let imm = InsnDesc::extract_imm(sb, InsnType::S);
        assert_eq!(((imm as i32) << 20) >> 20, -8);

        // B-type
        let beq = 0x00000463;
        let imm = InsnDesc::extract_imm(beq, InsnType::B);
        assert_eq!(imm, 8);

        let bne = 0xffd11ee3;
        let imm = InsnDesc::extract_imm(bne, InsnType::B);
        assert_eq!(((imm as i32) << 19) >> 19, -4);

        // U-type
        let lui = 0x12345537;
        let imm = InsnDesc::extract_imm(lui, InsnType::U);
        assert_eq!(imm, 0x12345 << 12);

        // J-type
        let jal = 0x028000ef;
        let imm = InsnDesc::extract_imm(jal, InsnType::J);
        assert_eq!(imm, 40);

        let jal = 0xff80006f;
        let imm = InsnDesc::extract_imm(jal, InsnType::J);
        assert_eq!(((imm as i32) << 11) >> 11, -1046536);
        assert_eq!(sign_extend!(imm, 21), -1046536);
    }

    #[test]
    fn test_default_is_nop() {
        let desc = InsnDesc::default();
        assert_eq!(desc.op, OpKind::Addi);
        assert_eq!(desc.rd, Reg::new(0));
        assert_eq!(desc.imm, 0);
        assert_eq!(desc.raw, NOP);
    }
}
