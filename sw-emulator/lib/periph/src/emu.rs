/*++

Licensed under the Apache-2.0 license.

File Name:

    emu.rs

Abstract:

    File contains the Series 2 energy management unit peripheral.

--*/

mod energy_mode;
mod regs;

use energy_mode::{EnergyModeMachine, Events};
use gecko_emu_bus::{Bus, BusError, LockGate, LockGroup, RegisterBank};
use gecko_emu_types::{RvAddr, RvData, RvSize};
use log::{debug, warn};
use regs::{Em4ctrl, Interrupt, Rstcause, Status, Templimits};
use std::cell::RefCell;
use std::rc::Rc;

pub use energy_mode::{EnergyMode, TransitionError};
pub use regs::LOCK_KEY;

/// 25 degrees Celsius
const DEFAULT_TEMPERATURE: u32 = 1193;

/// Largest temperature TEMP can report, in quarter Kelvin.
const MAX_TEMPERATURE: u32 = 0x7ff;

/// State the register hooks act on.
struct EmuContext {
    energy_mode: EnergyModeMachine,

    /// Number of EM4ENTRY values of the entry sequence written so far.
    em4_entry: usize,

    /// Quarter Kelvin
    temperature: u32,

    /// Quarter Kelvin, latched by CMD.TEMPAVGREQ
    temperature_avg: u32,
}

impl EmuContext {
    fn new(temperature: u32) -> Self {
        Self {
            energy_mode: EnergyModeMachine::new(),
            em4_entry: 0,
            temperature,
            temperature_avg: temperature,
        }
    }

    fn em4_entry_write(&mut self, val: u32) {
        if val == regs::EM4_ENTRY_SEQUENCE[self.em4_entry] {
            self.em4_entry += 1;
        } else {
            self.em4_entry = usize::from(val == regs::EM4_ENTRY_SEQUENCE[0]);
        }
        if self.em4_entry == regs::EM4_ENTRY_SEQUENCE.len() {
            self.em4_entry = 0;
            if let Err(err) = self.energy_mode.transition(Events::Shutoff, "EM4 entry") {
                warn!("EMU: {err}");
            }
        }
    }
}

struct EmuImpl {
    bank: RegisterBank<EmuContext>,
    ctx: EmuContext,
}

impl EmuImpl {
    fn new() -> Self {
        let locks = LockGate::new(&[(LockGroup::General, LOCK_KEY), (LockGroup::Test, LOCK_KEY)]);
        Self {
            bank: RegisterBank::new("EMU", regs::registers(), locks),
            ctx: EmuContext::new(DEFAULT_TEMPERATURE),
        }
    }

    /// Power-on reset. The temperature is not part of the device state.
    fn reset(&mut self) {
        self.bank.reset();
        self.ctx = EmuContext::new(self.ctx.temperature);
    }

    /// Reset on wake-up from EM4. EM4CTRL is retained.
    fn em4_reset(&mut self) {
        let em4ctrl = self.bank.state().reg::<Em4ctrl::Register>(regs::EM4CTRL);
        let temperature = self.ctx.temperature;
        self.bank.reset();
        self.ctx = EmuContext::new(temperature);

        let state = self.bank.state_mut();
        state.set(regs::EM4CTRL, Em4ctrl::EM4ENTRY.val(0).modify(em4ctrl.get()));
        state.set(regs::RSTCAUSE, Rstcause::EM4::SET.value);
        if em4ctrl.read(Em4ctrl::EM4IORETMODE) != 0 {
            state.modify(regs::STATUS, Status::EM4IORET::SET);
        }
    }
}

/// Energy management unit peripheral
#[derive(Clone)]
pub struct Emu {
    regs: Rc<RefCell<EmuImpl>>,
}

impl Emu {
    /// Create an instance of the EMU in its power-on reset state
    pub fn new() -> Self {
        Self {
            regs: Rc::new(RefCell::new(EmuImpl::new())),
        }
    }

    /// Power-on reset
    pub fn reset(&self) {
        self.regs.borrow_mut().reset();
        debug!("EMU: reset");
    }

    pub fn energy_mode(&self) -> EnergyMode {
        self.regs.borrow().ctx.energy_mode.mode()
    }

    fn transition(
        &self,
        event: Events,
        request: &'static str,
    ) -> Result<EnergyMode, TransitionError> {
        let result = self.regs.borrow_mut().ctx.energy_mode.transition(event, request);
        if let Err(err) = &result {
            warn!("EMU: {err}");
        }
        result
    }

    /// Enters EM1 from EM0.
    pub fn sleep(&self) -> Result<(), TransitionError> {
        self.transition(Events::Sleep, "sleep").map(|_| ())
    }

    /// Enters EM2 from EM0.
    pub fn deep_sleep(&self) -> Result<(), TransitionError> {
        self.transition(Events::DeepSleep, "deep sleep").map(|_| ())
    }

    /// Enters EM3 from EM0.
    pub fn stop(&self) -> Result<(), TransitionError> {
        self.transition(Events::Stop, "stop").map(|_| ())
    }

    /// Returns to EM0 from EM1, EM2 or EM3.
    pub fn wake_up(&self) -> Result<(), TransitionError> {
        let from = self.transition(Events::WakeUp, "wake up")?;
        if matches!(from, EnergyMode::Em2 | EnergyMode::Em3) {
            let mut emu = self.regs.borrow_mut();
            let state = emu.bank.state_mut();
            state.modify(regs::STATUS, Status::EM2ENTERED::SET);
            state.modify(regs::IF, Interrupt::EM23WAKEUP::SET);
        }
        Ok(())
    }

    /// Leaves EM4 through a reset that records EM4 as its cause.
    pub fn em4_wake_up(&self) -> Result<(), TransitionError> {
        self.transition(Events::Em4WakeUp, "EM4 wake-up")?;
        self.regs.borrow_mut().em4_reset();
        Ok(())
    }

    /// Temperature in quarter Kelvin.
    pub fn temperature(&self) -> u32 {
        self.regs.borrow().ctx.temperature
    }

    /// Reports a new temperature measurement, in quarter Kelvin.
    pub fn set_temperature(&self, quarter_kelvin: u32) {
        let temperature = if quarter_kelvin > MAX_TEMPERATURE {
            warn!("EMU: temperature {quarter_kelvin} out of range, reporting {MAX_TEMPERATURE}");
            MAX_TEMPERATURE
        } else {
            quarter_kelvin
        };

        let mut emu = self.regs.borrow_mut();
        emu.ctx.temperature = temperature;
        let state = emu.bank.state_mut();
        let limits = state.reg::<Templimits::Register>(regs::TEMPLIMITS);
        let kelvin = temperature >> 2;

        state.modify(regs::STATUS, Status::FIRSTTEMPDONE::SET);
        state.modify(regs::IF, Interrupt::TEMP::SET);
        if kelvin < limits.read(Templimits::TEMPLOW) {
            state.modify(regs::IF, Interrupt::TEMPLOW::SET);
        }
        if kelvin > limits.read(Templimits::TEMPHIGH) {
            state.modify(regs::IF, Interrupt::TEMPHIGH::SET);
        }
    }

    /// Returns true if an enabled interrupt flag is raised.
    pub fn irq_pending(&self) -> bool {
        let emu = self.regs.borrow();
        let state = emu.bank.state();
        state.get(regs::IF) & state.get(regs::IEN) != 0
    }
}

impl Default for Emu {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for Emu {
    /// Read data of specified size from given address
    fn read(&mut self, size: RvSize, addr: RvAddr) -> Result<RvData, BusError> {
        let emu = self.regs.borrow();
        emu.bank.read_sized(&emu.ctx, size, addr)
    }

    /// Write data of specified size to given address
    fn write(&mut self, size: RvSize, addr: RvAddr, val: RvData) -> Result<(), BusError> {
        let mut emu = self.regs.borrow_mut();
        let EmuImpl { bank, ctx } = &mut *emu;
        bank.write_sized(ctx, size, addr, val)
    }

    fn warm_reset(&mut self) {
        self.reset();
    }
}
