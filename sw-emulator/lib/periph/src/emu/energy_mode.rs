/*++

Licensed under the Apache-2.0 license.

File Name:

    energy_mode.rs

Abstract:

    File contains the energy mode state machine of the energy management
    unit.

--*/

use smlang::statemachine;

/// Energy mode of the device.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EnergyMode {
    /// Active
    Em0,

    /// Sleep
    Em1,

    /// Deep sleep
    Em2,

    /// Stop
    Em3,

    /// Shutoff
    Em4,
}

impl std::fmt::Display for EnergyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            EnergyMode::Em0 => write!(f, "EM0"),
            EnergyMode::Em1 => write!(f, "EM1"),
            EnergyMode::Em2 => write!(f, "EM2"),
            EnergyMode::Em3 => write!(f, "EM3"),
            EnergyMode::Em4 => write!(f, "EM4"),
        }
    }
}

/// A mode change was requested from a mode it cannot leave that way.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("{request} is not possible in {from}")]
pub struct TransitionError {
    pub from: EnergyMode,
    pub request: &'static str,
}

statemachine! {
    transitions: {
        // CurrentState Event = NextState
        *Em0 + Sleep = Em1,
        Em0 + DeepSleep = Em2,
        Em0 + Stop = Em3,
        Em0 + Shutoff = Em4,

        Em1 + WakeUp = Em0,
        Em2 + WakeUp = Em0,
        Em3 + WakeUp = Em0,

        // EM4 is only left through a reset.
        Em4 + Em4WakeUp = Em0
    }
}

/// State machine extended variables.
pub struct Context {}

impl StateMachineContext for Context {}

pub(super) struct EnergyModeMachine {
    state_machine: StateMachine<Context>,
}

impl EnergyModeMachine {
    pub fn new() -> Self {
        Self {
            state_machine: StateMachine::new(Context {}),
        }
    }

    pub fn mode(&self) -> EnergyMode {
        match self.state_machine.state() {
            States::Em0 => EnergyMode::Em0,
            States::Em1 => EnergyMode::Em1,
            States::Em2 => EnergyMode::Em2,
            States::Em3 => EnergyMode::Em3,
            States::Em4 => EnergyMode::Em4,
        }
    }

    /// Applies `event`, returning the mode that was left.
    pub fn transition(
        &mut self,
        event: Events,
        request: &'static str,
    ) -> Result<EnergyMode, TransitionError> {
        let from = self.mode();
        if self.state_machine.process_event(event).is_err() {
            return Err(TransitionError { from, request });
        }
        log::debug!("EMU: {request}: {from} -> {}", self.mode());
        Ok(from)
    }
}
