//! CPU architectural state: the integer register file.

/// Integer register file x0..x31.
///
/// Writes to x0 are stored like any other register and cleared by
/// `clear_zero` once the instruction has finished, so x0 reads as zero at
/// every instruction boundary.
#[derive(Clone, Debug, Default)]
pub struct RegisterFile {
    regs: [u32; 32],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self { regs: [0; 32] }
    }

    #[inline]
    pub fn read(&self, reg: u8) -> u32 {
        self.regs[(reg & 0x1F) as usize]
    }

    #[inline]
    pub fn write(&mut self, reg: u8, value: u32) {
        self.regs[(reg & 0x1F) as usize] = value;
    }

    /// Force x0 back to zero.
    #[inline]
    pub fn clear_zero(&mut self) {
        self.regs[0] = 0;
    }

    pub fn snapshot(&self) -> &[u32; 32] {
        &self.regs
    }
}
