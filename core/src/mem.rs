//! Word-organized backing stores for instructions and data.

/// A little-endian, word-organized memory addressed by byte address.
/// Addresses wrap modulo the byte span, so every address resolves to
/// some word; the low two bits select the lane for sub-word access.
#[derive(Debug)]
pub struct WordMem {
    words: Box<[u32]>,
}

impl WordMem {
    pub fn new(words: usize) -> Self {
        assert!(words.is_power_of_two(), "memory size must be a power of two");
        Self {
            words: vec![0; words].into_boxed_slice(),
        }
    }

    /// Byte span of the address window.
    pub fn span(&self) -> u32 {
        (self.words.len() * 4) as u32
    }

    fn index(&self, addr: u32) -> usize {
        ((addr % self.span()) >> 2) as usize
    }

    pub fn read_word(&self, addr: u32) -> u32 {
        self.words[self.index(addr)]
    }

    pub fn write_word(&mut self, addr: u32, value: u32) {
        let idx = self.index(addr);
        self.words[idx] = value;
    }

    pub fn read_byte(&self, addr: u32) -> u8 {
        let shift = (addr & 3) * 8;
        (self.read_word(addr) >> shift) as u8
    }

    /// Halfword lanes sit at even offsets; bit 0 of the address is ignored.
    pub fn read_half(&self, addr: u32) -> u16 {
        let shift = (addr & 2) * 8;
        (self.read_word(addr) >> shift) as u16
    }

    /// Replaces one byte of the containing word, preserving the rest.
    pub fn write_byte(&mut self, addr: u32, value: u8) {
        let shift = (addr & 3) * 8;
        let word = self.read_word(addr);
        let merged = (word & !(0xff << shift)) | ((value as u32) << shift);
        self.write_word(addr, merged);
    }

    /// Replaces one halfword of the containing word, preserving the rest.
    pub fn write_half(&mut self, addr: u32, value: u16) {
        let shift = (addr & 2) * 8;
        let word = self.read_word(addr);
        let merged = (word & !(0xffff << shift)) | ((value as u32) << shift);
        self.write_word(addr, merged);
    }

    /// Copies `image` to the start of memory and fills the rest with `fill`.
    pub fn load(&mut self, image: &[u32], fill: u32) {
        assert!(image.len() <= self.words.len(), "image larger than memory");
        self.words[..image.len()].copy_from_slice(image);
        self.words[image.len()..].fill(fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_rw() {
        let mut mem = WordMem::new(1024);
        mem.write_word(0, 0x12345678);
        assert_eq!(mem.read_word(0), 0x12345678);
        mem.write_word(8, 0xdeadbeef);
        assert_eq!(mem.read_word(8), 0xdeadbeef);
        assert_eq!(mem.read_word(4), 0);
    }

    #[test]
    fn test_little_endian_lanes() {
        let mut mem = WordMem::new(1024);
        mem.write_word(0, 0x000000ab);
        assert_eq!(mem.read_byte(0), 0xab);
        assert_eq!(mem.read_byte(1), 0);
        mem.write_word(4, 0xdeadbeef);
        assert_eq!(mem.read_byte(4), 0xef);
        assert_eq!(mem.read_byte(7), 0xde);
        assert_eq!(mem.read_half(4), 0xbeef);
        assert_eq!(mem.read_half(6), 0xdead);
    }

    #[test]
    fn test_subword_write_preserves_neighbors() {
        let mut mem = WordMem::new(1024);
        mem.write_word(0, 0xdeadbeef);
        mem.write_byte(1, 0xab);
        assert_eq!(mem.read_word(0), 0xdeadabef);
        mem.write_half(2, 0x1234);
        assert_eq!(mem.read_word(0), 0x1234abef);
    }

    #[test]
    fn test_store_back_is_idempotent() {
        let mut mem = WordMem::new(1024);
        mem.write_word(12, 0xcafebabe);
        let b = mem.read_byte(13);
        mem.write_byte(13, b);
        let h = mem.read_half(14);
        mem.write_half(14, h);
        assert_eq!(mem.read_word(12), 0xcafebabe);
    }

    #[test]
    fn test_address_wraparound() {
        let mut mem = WordMem::new(1024);
        assert_eq!(mem.span(), 4096);
        mem.write_word(0, 0x11111111);
        assert_eq!(mem.read_word(4096), 0x11111111);
        mem.write_word(4096 + 8, 0x22222222);
        assert_eq!(mem.read_word(8), 0x22222222);
    }

    #[test]
    fn test_load_fills_remainder() {
        let mut mem = WordMem::new(1024);
        mem.load(&[1, 2, 3], 0x13);
        assert_eq!(mem.read_word(0), 1);
        assert_eq!(mem.read_word(8), 3);
        assert_eq!(mem.read_word(12), 0x13);
        assert_eq!(mem.read_word(4092), 0x13);
    }
}
