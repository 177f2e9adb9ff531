//! RV32I base instruction set.

use crate::*;
use crate::alu::{AluOp, BranchCond};
use crate::insn::{InsnDesc, InsnType, OpFlags};
use crate::regfile::Reg;

pub const RV32I_OPCODE_LOAD: u8 = 0b0000011;
pub const RV32I_OPCODE_STORE: u8 = 0b0100011;
pub const RV32I_OPCODE_OP_IMM: u8 = 0b0010011;
pub const RV32I_OPCODE_OP: u8 = 0b0110011;
pub const RV32I_OPCODE_BRANCH: u8 = 0b1100011;
pub const RV32I_OPCODE_JAL: u8 = 0b1101111;
pub const RV32I_OPCODE_JALR: u8 = 0b1100111;
pub const RV32I_OPCODE_LUI: u8 = 0b0110111;
pub const RV32I_OPCODE_AUIPC: u8 = 0b0010111;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Lui,
    Auipc,
    Jal,
    Jalr,
    Beq,
    Bne,
    Blt,
    Bge,
    Bltu,
    Bgeu,
    Lb,
    Lh,
    Lw,
    Lbu,
    Lhu,
    Sb,
    Sh,
    Sw,
    Addi,
    Slti,
    Sltiu,
    Xori,
    Ori,
    Andi,
    Slli,
    Srli,
    Srai,
    Add,
    Sub,
    Sll,
    Slt,
    Sltu,
    Xor,
    Srl,
    Sra,
    Or,
    And,
}

impl OpKind {
    /// ALU function for EXECUTE. Ops that only need address or link
    /// arithmetic fall through to Add.
    pub fn alu_op(self) -> AluOp {
        match self {
            OpKind::Sub => AluOp::Sub,
            OpKind::Sll | OpKind::Slli => AluOp::Sll,
            OpKind::Slt | OpKind::Slti => AluOp::Slt,
            OpKind::Sltu | OpKind::Sltiu => AluOp::Sltu,
            OpKind::Xor | OpKind::Xori => AluOp::Xor,
            OpKind::Srl | OpKind::Srli => AluOp::Srl,
            OpKind::Sra | OpKind::Srai => AluOp::Sra,
            OpKind::Or | OpKind::Ori => AluOp::Or,
            OpKind::And | OpKind::Andi => AluOp::And,
            _ => AluOp::Add,
        }
    }

    pub fn branch_cond(self) -> BranchCond {
        match self {
            OpKind::Beq => BranchCond::Eq,
            OpKind::Bne => BranchCond::Ne,
            OpKind::Blt => BranchCond::Lt,
            OpKind::Bge => BranchCond::Ge,
            OpKind::Bltu => BranchCond::Ltu,
            OpKind::Bgeu => BranchCond::Geu,
            _ => panic!("branch_cond called on non-branch op: {:?}", self),
        }
    }
}

/// Decodes one instruction word. Returns `None` for any (opcode, funct3,
/// funct7) combination RV32I leaves undefined.
pub fn decode(raw: u32) -> Option<InsnDesc> {
    let opcode = (raw & 0x7f) as u8;
    let rd = Reg::new(((raw >> 7) & 0x1f) as u8);
    let funct3 = ((raw >> 12) & 0x07) as u8;
    let rs1 = Reg::new(((raw >> 15) & 0x1f) as u8);
    let rs2 = Reg::new(((raw >> 20) & 0x1f) as u8);
    let funct7 = ((raw >> 25) & 0x7f) as u8;

    let imm_i = sign_extend!(InsnDesc::extract_imm(raw, InsnType::I), 12) as u32;
    let imm_s = sign_extend!(InsnDesc::extract_imm(raw, InsnType::S), 12) as u32;
    let imm_b = sign_extend!(InsnDesc::extract_imm(raw, InsnType::B), 13) as u32;
    let imm_u = InsnDesc::extract_imm(raw, InsnType::U);
    let imm_j = sign_extend!(InsnDesc::extract_imm(raw, InsnType::J), 21) as u32;

    let build = |op: OpKind, flags: OpFlags, imm: u32| InsnDesc {
        op,
        rd,
        rs1,
        rs2,
        imm,
        flags,
        raw,
    };

    let desc = match opcode {
        RV32I_OPCODE_LUI => build(OpKind::Lui, OpFlags::WRITES_RD, imm_u),
        RV32I_OPCODE_AUIPC => build(OpKind::Auipc, OpFlags::WRITES_RD, imm_u),
        RV32I_OPCODE_JAL => build(OpKind::Jal, OpFlags::WRITES_RD | OpFlags::JUMP, imm_j),
        RV32I_OPCODE_JALR => match funct3 {
            0b000 => build(OpKind::Jalr, OpFlags::WRITES_RD | OpFlags::JUMP, imm_i),
            _ => return None,
        },
        RV32I_OPCODE_BRANCH => {
            let op = match funct3 {
                0b000 => OpKind::Beq,
                0b001 => OpKind::Bne,
                0b100 => OpKind::Blt,
                0b101 => OpKind::Bge,
                0b110 => OpKind::Bltu,
                0b111 => OpKind::Bgeu,
                _ => return None,
            };
            build(op, OpFlags::READS_RS2 | OpFlags::BRANCH, imm_b)
        }
        RV32I_OPCODE_LOAD => {
            let op = match funct3 {
                0b000 => OpKind::Lb,
                0b001 => OpKind::Lh,
                0b010 => OpKind::Lw,
                0b100 => OpKind::Lbu,
                0b101 => OpKind::Lhu,
                _ => return None,
            };
            build(op, OpFlags::WRITES_RD | OpFlags::MEM_LOAD, imm_i)
        }
        RV32I_OPCODE_STORE => {
            let op = match funct3 {
                0b000 => OpKind::Sb,
                0b001 => OpKind::Sh,
                0b010 => OpKind::Sw,
                _ => return None,
            };
            build(op, OpFlags::READS_RS2 | OpFlags::MEM_STORE, imm_s)
        }
        RV32I_OPCODE_OP_IMM => {
            let op = match funct3 {
                0b000 => OpKind::Addi,
                0b001 => match funct7 {
                    0 => OpKind::Slli,
                    _ => return None,
                },
                0b010 => OpKind::Slti,
                0b011 => OpKind::Sltiu,
                0b100 => OpKind::Xori,
                0b101 => match funct7 {
                    0 => OpKind::Srli,
                    0b0100000 => OpKind::Srai,
                    _ => return None,
                },
                0b110 => OpKind::Ori,
                0b111 => OpKind::Andi,
                _ => return None,
            };
            build(op, OpFlags::WRITES_RD, imm_i)
        }
        RV32I_OPCODE_OP => {
            let op = match (funct3, funct7) {
                (0b000, 0) => OpKind::Add,
                (0b000, 0b0100000) => OpKind::Sub,
                (0b001, 0) => OpKind::Sll,
                (0b010, 0) => OpKind::Slt,
                (0b011, 0) => OpKind::Sltu,
                (0b100, 0) => OpKind::Xor,
                (0b101, 0) => OpKind::Srl,
                (0b101, 0b0100000) => OpKind::Sra,
                (0b110, 0) => OpKind::Or,
                (0b111, 0) => OpKind::And,
                _ => return None,
            };
            build(op, OpFlags::WRITES_RD | OpFlags::READS_RS2, 0)
        }
        _ => return None,
    };

    Some(desc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fields() {
        log::log_init(log::Level::Off);

        // add x3, x1, x2
        let desc = decode(0x002081b3).unwrap();
        assert_eq!(desc.op, OpKind::Add);
        assert_eq!(desc.rd, Reg::new(3));
        assert_eq!(desc.rs1, Reg::new(1));
        assert_eq!(desc.rs2, Reg::new(2));
        assert!(desc.flags.contains(OpFlags::WRITES_RD | OpFlags::READS_RS2));

        // addi x1, x0, 42
        let desc = decode(0x02a00093).unwrap();
        assert_eq!(desc.op, OpKind::Addi);
        assert_eq!(desc.rd, Reg::new(1));
        assert_eq!(desc.imm, 42);
        assert!(!desc.flags.contains(OpFlags::READS_RS2));

        // lui x1, 0x12345
        let desc = decode(0x123450b7).unwrap();
        assert_eq!(desc.op, OpKind::Lui);
        assert_eq!(desc.imm, 0x12345000);
    }

    #[test]
    fn test_decode_negative_imm() {
        // addi x1, x0, -8
        let desc = decode(0xff800093).unwrap();
        assert_eq!(desc.op, OpKind::Addi);
        assert_eq!(desc.imm, 0xfffffff8);

        // bne x10, x0, -28
        let desc = decode(0xfe0512e3).unwrap();
        assert_eq!(desc.op, OpKind::Bne);
        assert_eq!(desc.imm as i32, -28);
    }

    #[test]
    fn test_decode_funct7_split() {
        // add vs sub differ only in bit 30
        assert_eq!(decode(0x002081b3).unwrap().op, OpKind::Add);
        assert_eq!(decode(0x402081b3).unwrap().op, OpKind::Sub);
        // srli vs srai
        assert_eq!(decode(0x0020d113).unwrap().op, OpKind::Srli);
        assert_eq!(decode(0x4010d113).unwrap().op, OpKind::Srai);
    }

    #[test]
    fn test_decode_nop() {
        let desc = decode(0x00000013).unwrap();
        assert_eq!(desc.op, OpKind::Addi);
        assert_eq!(desc.rd, Reg::new(0));
        assert_eq!(desc.rs1, Reg::new(0));
        assert_eq!(desc.imm, 0);
    }

    #[test]
    fn test_decode_rejects_undefined() {
        // all-ones and all-zeros are not valid encodings
        assert!(decode(0xffffffff).is_none());
        assert!(decode(0x00000000).is_none());
        // branch funct3 gaps (010, 011)
        assert!(decode(0x0020a063).is_none());
        assert!(decode(0x0020b063).is_none());
        // ld is RV64-only (load funct3 011)
        assert!(decode(0x0000b103).is_none());
        // slli with a nonzero funct7
        assert!(decode(0x40409113).is_none());
        // add with stray funct7 bits
        assert!(decode(0x082081b3).is_none());
        // fence and system opcodes are outside the supported subset
        assert!(decode(0x0ff0000f).is_none());
        assert!(decode(0x00000073).is_none());
    }

    #[test]
    fn test_jalr_funct3_checked() {
        assert_eq!(decode(0x00008167).unwrap().op, OpKind::Jalr);
        // jalr with funct3 != 000
        assert!(decode(0x00009167).is_none());
    }
}
