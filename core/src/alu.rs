//! Combinational arithmetic and branch comparison.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
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

/// Shift amounts use the low 5 bits of `b`.
pub fn alu(op: AluOp, a: u32, b: u32) -> u32 {
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Sll => a << (b & 0x1f),
        AluOp::Slt => ((a as i32) < (b as i32)) as u32,
        AluOp::Sltu => (a < b) as u32,
        AluOp::Xor => a ^ b,
        AluOp::Srl => a >> (b & 0x1f),
        AluOp::Sra => ((a as i32) >> (b & 0x1f)) as u32,
        AluOp::Or => a | b,
        AluOp::And => a & b,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchCond {
    Eq,
    Ne,
    Lt,
    Ge,
    Ltu,
    Geu,
}

pub fn compare(cond: BranchCond, a: u32, b: u32) -> bool {
    match cond {
        BranchCond::Eq => a == b,
        BranchCond::Ne => a != b,
        BranchCond::Lt => (a as i32) < (b as i32),
        BranchCond::Ge => (a as i32) >= (b as i32),
        BranchCond::Ltu => a < b,
        BranchCond::Geu => a >= b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sub_wrap() {
        assert_eq!(alu(AluOp::Add, 0xffffffff, 1), 0);
        assert_eq!(alu(AluOp::Sub, 0, 1), 0xffffffff);
        assert_eq!(alu(AluOp::Add, 10, 20), 30);
    }

    #[test]
    fn test_shifts() {
        assert_eq!(alu(AluOp::Sll, 1, 3), 8);
        assert_eq!(alu(AluOp::Srl, 0x40, 2), 0x10);
        // SRA drags the sign bit down
        assert_eq!(alu(AluOp::Sra, 0xfffffff8, 1), 0xfffffffc);
        assert_eq!(alu(AluOp::Srl, 0xfffffff8, 1), 0x7ffffffc);
        // only the low 5 bits of the shift amount count
        assert_eq!(alu(AluOp::Sll, 1, 32), 1);
        assert_eq!(alu(AluOp::Sll, 1, 35), 8);
    }

    #[test]
    fn test_set_less_than() {
        assert_eq!(alu(AluOp::Slt, 0xffffffff, 0), 1);
        assert_eq!(alu(AluOp::Sltu, 0xffffffff, 0), 0);
        assert_eq!(alu(AluOp::Slt, 5, 10), 1);
        assert_eq!(alu(AluOp::Slt, 10, 5), 0);
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(alu(AluOp::Xor, 0xff, 0x0f), 0xf0);
        assert_eq!(alu(AluOp::Or, 0xa0, 0x0f), 0xaf);
        assert_eq!(alu(AluOp::And, 0xff, 0x0f), 0x0f);
    }

    #[test]
    fn test_compare() {
        assert!(compare(BranchCond::Eq, 5, 5));
        assert!(compare(BranchCond::Ne, 5, 7));
        // -1 < 0 signed, but 0xffffffff > 0 unsigned
        assert!(compare(BranchCond::Lt, 0xffffffff, 0));
        assert!(!compare(BranchCond::Ltu, 0xffffffff, 0));
        assert!(compare(BranchCond::Ge, 10, 3));
        assert!(compare(BranchCond::Ge, 3, 3));
        assert!(compare(BranchCond::Geu, 0xffffffff, 0));
    }
}
