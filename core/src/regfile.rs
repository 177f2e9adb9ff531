//! Architectural register file.

/// A 5-bit register index. Construction masks out anything above x31,
/// so an out-of-range index cannot be represented.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reg(u8);

impl Reg {
    pub const fn new(index: u8) -> Self {
        Self(index & 0x1f)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub struct RegFile {
    x: [u32; 32],
}

impl RegFile {
    pub fn new() -> Self {
        Self { x: [0; 32] }
    }

    pub fn read(&self, r: Reg) -> u32 {
        self.x[r.index()]
    }

    /// Writes to x0 are dropped, which keeps it reading as zero.
    pub fn write(&mut self, r: Reg, value: u32) {
        if r.index() != 0 {
            self.x[r.index()] = value;
        }
    }

    pub fn reset(&mut self) {
        self.x = [0; 32];
    }
}
