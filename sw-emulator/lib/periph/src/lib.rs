/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Gecko Series 2 Emulator Peripheral library.

--*/

pub mod clock_tree;
mod cmu;
mod emu;

pub use clock_tree::{ClockTree, NodeId};
pub use cmu::{
    ClockConsumerQuery, Cmu, CmuConfig, Consumer, HfxoListener, Oscillator,
    LOCK_KEY as CMU_LOCK_KEY, WDOGLOCK_KEY as CMU_WDOGLOCK_KEY,
};
pub use emu::{EnergyMode, Emu, TransitionError, LOCK_KEY as EMU_LOCK_KEY};
