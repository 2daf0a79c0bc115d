/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Gecko Emulator Bus library.

--*/
mod bus;
mod lock;
mod register_bank;
pub mod testing;

pub use crate::bus::{Bus, BusError};
pub use crate::lock::{LockGate, LockGroup, LockedError};
pub use crate::register_bank::{
    AliasMode, BankState, Field, FieldAccess, FieldWrite, Register, RegisterBank, WINDOW_SIZE,
};
