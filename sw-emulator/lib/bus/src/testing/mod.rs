/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains exports for code useful for testing peripherals.

--*/
mod log;

pub use log::{capture_logs, Log};
