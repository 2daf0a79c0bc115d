/*++

Licensed under the Apache-2.0 license.

File Name:

    lock.rs

Abstract:

    File contains the lock gate protecting configuration registers from
    writes until the group's magic key has been written.

--*/

use smlang::statemachine;

/// Register groups that can be locked independently.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum LockGroup {
    /// Clock and power configuration registers.
    General,

    /// Watchdog clock selection registers.
    Watchdog,

    /// Test and debug registers.
    Test,
}

impl std::fmt::Display for LockGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LockGroup::General => write!(f, "General"),
            LockGroup::Watchdog => write!(f, "Watchdog"),
            LockGroup::Test => write!(f, "Test"),
        }
    }
}

/// A write was attempted to a register of a locked group.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("write to {register} ignored: {group} lock is engaged")]
pub struct LockedError {
    pub group: LockGroup,
    pub register: &'static str,
}

statemachine! {
    transitions: {
        // CurrentState Event = NextState
        *Unlocked + MatchingKey = Unlocked,
        Unlocked + WrongKey = Locked,
        Locked + MatchingKey = Unlocked,
        Locked + WrongKey = Locked
    }
}

/// State machine extended variables.
pub struct Context {
    /// Key that unlocks the group.
    key: u16,
}

impl Context {
    fn new(key: u16) -> Self {
        Self { key }
    }
}

impl StateMachineContext for Context {}

struct GroupLock {
    group: LockGroup,
    state_machine: StateMachine<Context>,
}

/// Locked/unlocked state for every lock group of one peripheral.
///
/// Groups that were not registered at construction are never locked.
pub struct LockGate {
    groups: Vec<GroupLock>,
}

impl LockGate {
    /// Create a gate with one lock per `(group, key)` pair. Every group starts
    /// unlocked.
    pub fn new(groups: &[(LockGroup, u16)]) -> Self {
        let mut result = Self { groups: Vec::new() };
        for &(group, key) in groups {
            assert!(
                result.find(group).is_none(),
                "lock group {group} registered twice"
            );
            result.groups.push(GroupLock {
                group,
                state_machine: StateMachine::new(Context::new(key)),
            });
        }
        result
    }

    fn find(&self, group: LockGroup) -> Option<&GroupLock> {
        self.groups.iter().find(|lock| lock.group == group)
    }

    /// Returns true if writes to registers of `group` are currently dropped.
    pub fn is_locked(&self, group: LockGroup) -> bool {
        self.find(group)
            .map(|lock| matches!(lock.state_machine.state(), States::Locked))
            .unwrap_or(false)
    }

    /// Presents `key` to the group's lock register.
    ///
    /// The matching key unlocks the group; any other value locks it. Returns
    /// true if the group is unlocked afterwards.
    pub fn attempt_unlock(&mut self, group: LockGroup, key: u32) -> bool {
        let Some(lock) = self.groups.iter_mut().find(|lock| lock.group == group) else {
            log::warn!("lock key written for unregistered group {group}");
            return true;
        };
        let event = if key == u32::from(lock.state_machine.context().key) {
            Events::MatchingKey
        } else {
            Events::WrongKey
        };
        let _ = lock.state_machine.process_event(event);
        let unlocked = matches!(lock.state_machine.state(), States::Unlocked);
        log::debug!(
            "{group} lock {}",
            if unlocked { "released" } else { "engaged" }
        );
        unlocked
    }

    /// Checks whether a write to `register` in `group` may proceed.
    pub fn guard_write(&self, group: LockGroup, register: &'static str) -> Result<(), LockedError> {
        if self.is_locked(group) {
            Err(LockedError { group, register })
        } else {
            Ok(())
        }
    }

    /// Returns every group to its reset state (unlocked).
    pub fn reset(&mut self) {
        for lock in self.groups.iter_mut() {
            let key = lock.state_machine.context().key;
            lock.state_machine = StateMachine::new(Context::new(key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERAL_KEY: u16 = 0x93f7;
    const WATCHDOG_KEY: u16 = 0x5257;

    fn gate() -> LockGate {
        LockGate::new(&[
            (LockGroup::General, GENERAL_KEY),
            (LockGroup::Watchdog, WATCHDOG_KEY),
        ])
    }

    #[test]
    fn test_starts_unlocked() {
        let gate = gate();
        assert!(!gate.is_locked(LockGroup::General));
        assert!(!gate.is_locked(LockGroup::Watchdog));
        assert_eq!(gate.guard_write(LockGroup::General, "CTRL"), Ok(()));
    }

    #[test]
    fn test_key_round_trip() {
        let mut gate = gate();
        assert!(!gate.attempt_unlock(LockGroup::General, 0));
        assert!(gate.is_locked(LockGroup::General));
        assert!(!gate.is_locked(LockGroup::Watchdog));
        assert_eq!(
            gate.guard_write(LockGroup::General, "CTRL"),
            Err(LockedError {
                group: LockGroup::General,
                register: "CTRL"
            })
        );

        assert!(gate.attempt_unlock(LockGroup::General, GENERAL_KEY.into()));
        assert!(!gate.is_locked(LockGroup::General));
        assert_eq!(gate.guard_write(LockGroup::General, "CTRL"), Ok(()));
    }

    #[test]
    fn test_other_group_key_locks() {
        let mut gate = gate();
        assert!(!gate.attempt_unlock(LockGroup::Watchdog, GENERAL_KEY.into()));
        assert!(gate.is_locked(LockGroup::Watchdog));
        assert!(!gate.attempt_unlock(LockGroup::Watchdog, 0x0001_5257));
        assert!(gate.attempt_unlock(LockGroup::Watchdog, WATCHDOG_KEY.into()));
    }

    #[test]
    fn test_unregistered_group_never_locks() {
        let mut gate = gate();
        assert!(gate.attempt_unlock(LockGroup::Test, 0));
        assert!(!gate.is_locked(LockGroup::Test));
    }

    #[test]
    fn test_reset_unlocks() {
        let mut gate = gate();
        gate.attempt_unlock(LockGroup::General, 1);
        gate.attempt_unlock(LockGroup::Watchdog, 1);
        gate.reset();
        assert!(!gate.is_locked(LockGroup::General));
        assert!(!gate.is_locked(LockGroup::Watchdog));
    }

    #[test]
    fn test_locked_error_message() {
        let err = LockedError {
            group: LockGroup::Watchdog,
            register: "WDOG0CLKCTRL",
        };
        assert_eq!(
            err.to_string(),
            "write to WDOG0CLKCTRL ignored: Watchdog lock is engaged"
        );
    }
}
