/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Gecko Emulator Types library.

--*/

mod macros;

/// Bus data width
pub type RvData = u32;

/// Bus address width
pub type RvAddr = u32;

emu_enum!(
    /// Bus IO Operation size
    #[derive(Debug, Eq, PartialEq, Copy, Clone)]
    pub RvSize;
    usize;
    {
        Byte = 1,
        HalfWord = 2,
        Word = 4,
    };
    Invalid
);

impl RvSize {
    /// Mask covering the low `self` bytes of a word.
    pub fn mask(self) -> RvData {
        match self {
            RvSize::Byte => 0xff,
            RvSize::HalfWord => 0xffff,
            RvSize::Word | RvSize::Invalid => 0xffff_ffff,
        }
    }
}
