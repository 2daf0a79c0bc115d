/*++

Licensed under the Apache-2.0 license.

File Name:

    register_bank.rs

Abstract:

    File contains the table-driven register bank shared by the clock and
    energy management peripherals. A bank decodes the plain window and the
    SET/CLEAR/TOGGLE alias windows, masks field accesses, gates locked
    registers, and dispatches per-field hooks.

--*/

use crate::lock::{LockGate, LockGroup};
use crate::BusError;
use gecko_emu_types::{RvAddr, RvData, RvSize};
use log::{error, trace, warn};
use std::collections::BTreeMap;
use tock_registers::fields::{Field as BitField, FieldValue};
use tock_registers::{LocalRegisterCopy, RegisterLongName};

/// Size of a peripheral window covering the plain and alias views.
pub const WINDOW_SIZE: RvAddr = 0x4000;

const OFFSET_MASK: RvAddr = 0x0fff;
const ALIAS_MASK: RvAddr = 0x3000;

/// View of the register file selected by address bits 12 and 13.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AliasMode {
    Plain,
    Set,
    Clear,
    Toggle,
}

impl AliasMode {
    /// Splits a window-relative address into a register offset and the
    /// alias window it falls in.
    pub fn decode(addr: RvAddr) -> (RvAddr, AliasMode) {
        let mode = match addr & ALIAS_MASK {
            0x0000 => AliasMode::Plain,
            0x1000 => AliasMode::Set,
            0x2000 => AliasMode::Clear,
            _ => AliasMode::Toggle,
        };
        (addr & OFFSET_MASK, mode)
    }

    /// Value a write of `val` produces given the register's current readback.
    pub fn apply(self, current: u32, val: u32) -> u32 {
        match self {
            AliasMode::Plain => val,
            AliasMode::Set => current | val,
            AliasMode::Clear => current & !val,
            AliasMode::Toggle => current ^ val,
        }
    }
}

impl std::fmt::Display for AliasMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AliasMode::Plain => write!(f, "Plain"),
            AliasMode::Set => write!(f, "Set"),
            AliasMode::Clear => write!(f, "Clear"),
            AliasMode::Toggle => write!(f, "Toggle"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FieldAccess {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

/// Field-level view of a register write, handed to write hooks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FieldWrite {
    /// Field value stored before the write.
    pub old: u32,

    /// Field value after the alias operation was applied.
    pub new: u32,

    /// Window the write arrived through.
    pub mode: AliasMode,
}

impl FieldWrite {
    /// True if the field's new value is non-zero.
    pub fn is_set(&self) -> bool {
        self.new != 0
    }

    pub fn changed(&self) -> bool {
        self.old != self.new
    }
}

type WriteHook<C> = Box<dyn Fn(&mut C, &mut BankState, FieldWrite)>;
type ValueProvider<C> = Box<dyn Fn(&C, &BankState, u32) -> u32>;

fn low_mask(width: u8) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    }
}

/// A bit range of a register, with its access policy and optional hooks.
pub struct Field<C> {
    name: &'static str,
    shift: u8,
    width: u8,
    access: FieldAccess,
    domain: Option<&'static [u32]>,
    on_write: Option<WriteHook<C>>,
    provider: Option<ValueProvider<C>>,
}

impl<C> Field<C> {
    pub fn new(name: &'static str, shift: u8, width: u8, access: FieldAccess) -> Self {
        assert!(
            (1..=32).contains(&width),
            "field {name} has invalid width {width}"
        );
        assert!(
            u32::from(shift) + u32::from(width) <= 32,
            "field {name} extends past bit 31"
        );
        Self {
            name,
            shift,
            width,
            access,
            domain: None,
            on_write: None,
            provider: None,
        }
    }

    /// Builds a field from a `register_bitfields!` definition.
    pub fn from_bitfield<R: RegisterLongName>(
        name: &'static str,
        field: BitField<u32, R>,
        access: FieldAccess,
    ) -> Self {
        Self::new(
            name,
            field.shift as u8,
            field.mask.count_ones() as u8,
            access,
        )
    }

    pub fn read_write<R: RegisterLongName>(name: &'static str, field: BitField<u32, R>) -> Self {
        Self::from_bitfield(name, field, FieldAccess::ReadWrite)
    }

    pub fn read_only<R: RegisterLongName>(name: &'static str, field: BitField<u32, R>) -> Self {
        Self::from_bitfield(name, field, FieldAccess::ReadOnly)
    }

    pub fn write_only<R: RegisterLongName>(name: &'static str, field: BitField<u32, R>) -> Self {
        Self::from_bitfield(name, field, FieldAccess::WriteOnly)
    }

    /// Write-only 16-bit key field that feeds the lock of `group`.
    ///
    /// Alias-window writes are not key attempts.
    pub fn lock_key(name: &'static str, group: LockGroup) -> Self {
        Self::new(name, 0, 16, FieldAccess::WriteOnly).on_write(
            move |_: &mut C, state: &mut BankState, write: FieldWrite| {
                if write.mode == AliasMode::Plain {
                    state.locks_mut().attempt_unlock(group, write.new);
                }
            },
        )
    }

    /// Restricts the field to the encodings in `domain`. Values outside the
    /// domain are still stored but a warning is logged.
    pub fn with_domain(mut self, domain: &'static [u32]) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Registers a hook called after every write that reaches this field.
    pub fn on_write(mut self, hook: impl Fn(&mut C, &mut BankState, FieldWrite) + 'static) -> Self {
        self.on_write = Some(Box::new(hook));
        self
    }

    /// Registers a function computing the field's readback from the stored
    /// value.
    pub fn with_value_provider(
        mut self,
        provider: impl Fn(&C, &BankState, u32) -> u32 + 'static,
    ) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn access(&self) -> FieldAccess {
        self.access
    }

    /// Bits of the register covered by this field.
    pub fn mask(&self) -> u32 {
        low_mask(self.width) << self.shift
    }

    fn extract(&self, raw: u32) -> u32 {
        (raw & self.mask()) >> self.shift
    }
}

/// A 32-bit register: reset value, fields, and optional lock group.
pub struct Register<C> {
    name: &'static str,
    offset: RvAddr,
    reset_value: u32,
    fields: Vec<Field<C>>,
    lock_group: Option<LockGroup>,
}

impl<C> Register<C> {
    pub fn new(name: &'static str, offset: RvAddr, reset_value: u32) -> Self {
        assert!(
            offset & !OFFSET_MASK == 0 && offset % 4 == 0,
            "register {name} has invalid offset {offset:#x}"
        );
        Self {
            name,
            offset,
            reset_value,
            fields: Vec::new(),
            lock_group: None,
        }
    }

    /// Appends a field. Fields may not overlap.
    pub fn field(mut self, field: Field<C>) -> Self {
        if let Some(other) = self.fields.iter().find(|f| f.mask() & field.mask() != 0) {
            panic!(
                "field {} overlaps {} in register {}",
                field.name, other.name, self.name
            );
        }
        self.fields.push(field);
        self
    }

    /// Drops writes to this register while `group` is locked.
    pub fn locked_by(mut self, group: LockGroup) -> Self {
        self.lock_group = Some(group);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn offset(&self) -> RvAddr {
        self.offset
    }

    pub fn reset_value(&self) -> u32 {
        self.reset_value
    }

    pub fn lock_group(&self) -> Option<LockGroup> {
        self.lock_group
    }

    pub fn fields(&self) -> &[Field<C>] {
        &self.fields
    }

    fn writable_mask(&self) -> u32 {
        self.fields
            .iter()
            .filter(|f| f.access != FieldAccess::ReadOnly)
            .fold(0, |mask, f| mask | f.mask())
    }
}

/// Raw register storage and lock state, visible to hooks and providers.
pub struct BankState {
    raw: Vec<u32>,
    slots: BTreeMap<RvAddr, usize>,
    locks: LockGate,
}

impl BankState {
    fn slot(&self, offset: RvAddr) -> Option<usize> {
        self.slots.get(&offset).copied()
    }

    fn slot_of(&self, offset: RvAddr) -> usize {
        match self.slot(offset) {
            Some(slot) => slot,
            None => panic!("no register declared at offset {offset:#x}"),
        }
    }

    /// Stored value of the register at `offset`, without value providers.
    pub fn get(&self, offset: RvAddr) -> u32 {
        self.raw[self.slot_of(offset)]
    }

    /// Overwrites the stored value of the register at `offset`.
    pub fn set(&mut self, offset: RvAddr, val: u32) {
        let slot = self.slot_of(offset);
        self.raw[slot] = val;
    }

    /// Stored value of the register at `offset`, typed by its bitfields.
    pub fn reg<R: RegisterLongName>(&self, offset: RvAddr) -> LocalRegisterCopy<u32, R> {
        LocalRegisterCopy::new(self.get(offset))
    }

    /// Applies `field_val` to the stored value of the register at `offset`.
    pub fn modify<R: RegisterLongName>(&mut self, offset: RvAddr, field_val: FieldValue<u32, R>) {
        let slot = self.slot_of(offset);
        self.raw[slot] = field_val.modify(self.raw[slot]);
    }

    pub fn locks(&self) -> &LockGate {
        &self.locks
    }

    pub fn locks_mut(&mut self) -> &mut LockGate {
        &mut self.locks
    }
}

/// Register file of one peripheral instance.
///
/// `C` is the peripheral context handed to hooks and value providers.
pub struct RegisterBank<C> {
    name: &'static str,
    registers: Vec<Register<C>>,
    state: BankState,
}

impl<C> RegisterBank<C> {
    pub fn new(name: &'static str, registers: Vec<Register<C>>, locks: LockGate) -> Self {
        let mut slots = BTreeMap::new();
        for (slot, register) in registers.iter().enumerate() {
            if let Some(prev) = slots.insert(register.offset, slot) {
                panic!(
                    "{name}: {} and {} share offset {:#x}",
                    registers[prev].name, register.name, register.offset
                );
            }
        }
        let raw = registers.iter().map(|r| r.reset_value).collect();
        Self {
            name,
            registers,
            state: BankState { raw, slots, locks },
        }
    }

    pub fn state(&self) -> &BankState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut BankState {
        &mut self.state
    }

    /// Restores every register to its reset value and every lock group to its
    /// reset state. Hooks do not run.
    pub fn reset(&mut self) {
        for (raw, register) in self.state.raw.iter_mut().zip(&self.registers) {
            *raw = register.reset_value;
        }
        self.state.locks.reset();
    }

    fn readback(&self, ctx: &C, slot: usize) -> u32 {
        let raw = self.state.raw[slot];
        self.registers[slot].fields.iter().fold(0, |acc, field| {
            if field.access == FieldAccess::WriteOnly {
                return acc;
            }
            let stored = field.extract(raw);
            let val = match &field.provider {
                Some(provider) => provider(ctx, &self.state, stored),
                None => stored,
            };
            acc | ((val << field.shift) & field.mask())
        })
    }

    /// Value software would read from the register at `offset`.
    pub fn peek(&self, ctx: &C, offset: RvAddr) -> Option<u32> {
        self.state.slot(offset).map(|slot| self.readback(ctx, slot))
    }

    /// Reads a full word. Alias windows redirect to the plain register.
    pub fn read(&self, ctx: &C, addr: RvAddr) -> RvData {
        let (offset, mode) = AliasMode::decode(addr);
        if mode != AliasMode::Plain {
            warn!(
                "{}: reading from the {mode} window at {addr:#06x} is not supported, reading offset {offset:#05x}",
                self.name
            );
        }
        let Some(slot) = self.state.slot(offset) else {
            warn!("{}: read from undeclared offset {offset:#05x}", self.name);
            return 0;
        };
        let val = self.readback(ctx, slot);
        trace!("{}: {} -> {val:#010x}", self.name, self.registers[slot].name);
        val
    }

    /// Writes a full word through the plain or an alias window.
    pub fn write(&mut self, ctx: &mut C, addr: RvAddr, val: RvData) {
        let (offset, mode) = AliasMode::decode(addr);
        let Some(slot) = self.state.slot(offset) else {
            warn!(
                "{}: write of {val:#010x} to undeclared offset {offset:#05x} ignored",
                self.name
            );
            return;
        };
        let register = &self.registers[slot];
        if let Some(group) = register.lock_group {
            if let Err(err) = self.state.locks.guard_write(group, register.name) {
                error!("{}: {err}", self.name);
                return;
            }
        }

        let target = mode.apply(self.readback(ctx, slot), val);
        trace!(
            "{}: {} <- {target:#010x} ({mode} {val:#010x})",
            self.name,
            register.name
        );

        let old_raw = self.state.raw[slot];
        let writable = register.writable_mask();
        self.state.raw[slot] = (old_raw & !writable) | (target & writable);

        for field in register
            .fields
            .iter()
            .filter(|f| f.access != FieldAccess::ReadOnly)
        {
            let new = field.extract(target);
            if let Some(domain) = field.domain {
                if !domain.contains(&new) {
                    warn!(
                        "{}: {}.{} written with unsupported value {new:#x}",
                        self.name, register.name, field.name
                    );
                }
            }
            if let Some(hook) = &field.on_write {
                hook(
                    ctx,
                    &mut self.state,
                    FieldWrite {
                        old: field.extract(old_raw),
                        new,
                        mode,
                    },
                );
            }
        }
    }

    /// Bus-sized read. Narrow reads return the addressed lanes of the word.
    pub fn read_sized(&self, ctx: &C, size: RvSize, addr: RvAddr) -> Result<RvData, BusError> {
        if size == RvSize::Invalid {
            return Err(BusError::LoadAccessFault);
        }
        let shift = lane_shift(size, addr).ok_or(BusError::LoadAddrMisaligned)?;
        Ok((self.read(ctx, addr & !3) >> shift) & size.mask())
    }

    /// Bus-sized write.
    ///
    /// A narrow plain write merges into the current readback of the word. A
    /// narrow alias write places the value in its lanes with zeros elsewhere,
    /// leaving the other lanes untouched by the alias operation.
    pub fn write_sized(
        &mut self,
        ctx: &mut C,
        size: RvSize,
        addr: RvAddr,
        val: RvData,
    ) -> Result<(), BusError> {
        if size == RvSize::Invalid {
            return Err(BusError::StoreAccessFault);
        }
        let shift = lane_shift(size, addr).ok_or(BusError::StoreAddrMisaligned)?;
        let word_addr = addr & !3;
        let lane_mask = size.mask() << shift;
        let lane_val = (val & size.mask()) << shift;
        let word = match AliasMode::decode(word_addr) {
            (offset, AliasMode::Plain) if size != RvSize::Word => {
                let current = self.peek(ctx, offset).unwrap_or(0);
                (current & !lane_mask) | lane_val
            }
            _ => lane_val,
        };
        self.write(ctx, word_addr, word);
        Ok(())
    }
}

fn lane_shift(size: RvSize, addr: RvAddr) -> Option<u32> {
    let bytes = usize::from(size) as RvAddr;
    if addr % bytes != 0 {
        None
    } else {
        Some((addr & 3) * 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{capture_logs, Log};
    use std::fmt::Write;
    use tock_registers::register_bitfields;

    register_bitfields! [
        u32,

        Ctrl [
            MODE OFFSET(0) NUMBITS(8) [],
            STATUS OFFSET(8) NUMBITS(8) [],
            START OFFSET(16) NUMBITS(4) [],
        ],

        Sel [
            CLKSEL OFFSET(0) NUMBITS(3) [
                A = 1,
                B = 2,
            ],
        ],
    ];

    const CTRL: RvAddr = 0x04;
    const SEL: RvAddr = 0x08;
    const LOCK: RvAddr = 0x10;
    const KEY: u16 = 0x1234;

    const SET: RvAddr = 0x1000;
    const CLEAR: RvAddr = 0x2000;
    const TOGGLE: RvAddr = 0x3000;

    #[derive(Default)]
    struct Context {
        log: Log,
        start_count: u32,
    }

    fn bank() -> RegisterBank<Context> {
        RegisterBank::new(
            "TEST",
            vec![
                Register::new("CTRL", CTRL, 0x0000_1200)
                    .field(Field::read_write("MODE", Ctrl::MODE))
                    .field(Field::read_only("STATUS", Ctrl::STATUS))
                    .field(Field::write_only("START", Ctrl::START).on_write(
                        |ctx: &mut Context, _, write| {
                            writeln!(ctx.log.w(), "START {} {}", write.mode, write.new).unwrap();
                            if write.is_set() {
                                ctx.start_count += 1;
                            }
                        },
                    )),
                Register::new("SEL", SEL, 0x1)
                    .field(Field::read_write("CLKSEL", Sel::CLKSEL).with_domain(&[1, 2]))
                    .locked_by(LockGroup::General),
                Register::new("LOCK", LOCK, KEY.into())
                    .field(Field::lock_key("LOCKKEY", LockGroup::General)),
            ],
            LockGate::new(&[(LockGroup::General, KEY)]),
        )
    }

    #[test]
    fn test_decode() {
        assert_eq!(AliasMode::decode(0x0070), (0x070, AliasMode::Plain));
        assert_eq!(AliasMode::decode(0x1070), (0x070, AliasMode::Set));
        assert_eq!(AliasMode::decode(0x2070), (0x070, AliasMode::Clear));
        assert_eq!(AliasMode::decode(0x3070), (0x070, AliasMode::Toggle));
    }

    #[test]
    fn test_write_masks_read_only_and_reserved_bits() {
        let mut ctx = Context::default();
        let mut bank = bank();
        bank.write(&mut ctx, CTRL, 0xffff_ffff);
        // MODE takes the write, STATUS keeps its reset value, START and the
        // reserved bits read back as zero.
        assert_eq!(bank.read(&ctx, CTRL), 0x0000_12ff);
        assert_eq!(ctx.start_count, 1);
    }

    #[test]
    fn test_alias_algebra() {
        let mut ctx = Context::default();
        let mut bank = bank();
        bank.write(&mut ctx, CTRL, 0x0000_00a5);

        bank.write(&mut ctx, SET | CTRL, 0x0000_0050);
        assert_eq!(bank.read(&ctx, CTRL), 0x0000_12f5);

        bank.write(&mut ctx, CLEAR | CTRL, 0x0000_00f0);
        assert_eq!(bank.read(&ctx, CTRL), 0x0000_1205);

        bank.write(&mut ctx, TOGGLE | CTRL, 0x0000_00ff);
        assert_eq!(bank.read(&ctx, CTRL), 0x0000_12fa);

        // The read-only field is not affected by any window.
        bank.write(&mut ctx, TOGGLE | CTRL, 0x0000_ff00);
        assert_eq!(bank.read(&ctx, CTRL), 0x0000_12fa);
    }

    #[test]
    fn test_alias_writes_reach_write_only_hooks() {
        let mut ctx = Context::default();
        let mut bank = bank();
        bank.write(&mut ctx, SET | CTRL, 0x0001_0000);
        bank.write(&mut ctx, CLEAR | CTRL, 0x0001_0000);
        assert_eq!(ctx.log.take(), "START Set 1\nSTART Clear 0\n");
        assert_eq!(ctx.start_count, 1);
    }

    #[test]
    fn test_alias_read_redirects_with_warning() {
        let log = capture_logs();
        let mut ctx = Context::default();
        let mut bank = bank();
        bank.write(&mut ctx, CTRL, 0x42);
        log.take();

        assert_eq!(bank.read(&ctx, SET | CTRL), bank.read(&ctx, CTRL));
        assert_eq!(bank.read(&ctx, TOGGLE | SEL), 0x1);
        let text = log.take();
        assert!(text.contains("WARN"), "{text}");
        assert!(text.contains("not supported"), "{text}");
    }

    #[test]
    fn test_undeclared_offset() {
        let log = capture_logs();
        let mut ctx = Context::default();
        let mut bank = bank();
        assert_eq!(bank.read(&ctx, 0x0c), 0);
        bank.write(&mut ctx, 0x0c, 0xffff_ffff);
        assert_eq!(bank.read(&ctx, 0x0c), 0);
        assert!(log.take().contains("undeclared offset"));
    }

    #[test]
    fn test_out_of_domain_value_is_stored() {
        let log = capture_logs();
        let mut ctx = Context::default();
        let mut bank = bank();
        bank.write(&mut ctx, SEL, 0x7);
        assert_eq!(bank.read(&ctx, SEL), 0x7);
        assert!(log.take().contains("unsupported value 0x7"));
    }

    #[test]
    fn test_lock_round_trip() {
        let log = capture_logs();
        let mut ctx = Context::default();
        let mut bank = bank();

        bank.write(&mut ctx, LOCK, 0);
        assert!(bank.state().locks().is_locked(LockGroup::General));
        bank.write(&mut ctx, SEL, 0x2);
        assert_eq!(bank.read(&ctx, SEL), 0x1);
        assert!(log.take().contains("ERROR"));

        // The key field is write-only.
        assert_eq!(bank.read(&ctx, LOCK), 0);

        bank.write(&mut ctx, LOCK, KEY.into());
        assert!(!bank.state().locks().is_locked(LockGroup::General));
        bank.write(&mut ctx, SEL, 0x2);
        assert_eq!(bank.read(&ctx, SEL), 0x2);
    }

    #[test]
    fn test_alias_window_is_not_a_key_attempt() {
        let mut ctx = Context::default();
        let mut bank = bank();
        bank.write(&mut ctx, LOCK, 0);
        bank.write(&mut ctx, SET | LOCK, KEY.into());
        assert!(bank.state().locks().is_locked(LockGroup::General));

        bank.write(&mut ctx, LOCK, KEY.into());
        bank.write(&mut ctx, CLEAR | LOCK, 0xffff);
        assert!(!bank.state().locks().is_locked(LockGroup::General));
    }

    #[test]
    fn test_value_provider() {
        let mut ctx = Context::default();
        let mut bank: RegisterBank<Context> = RegisterBank::new(
            "TEST",
            vec![Register::new("COUNT", 0x0, 0).field(
                Field::new("COUNT", 4, 8, FieldAccess::ReadOnly)
                    .with_value_provider(|ctx: &Context, _, _| ctx.start_count * 2),
            )],
            LockGate::new(&[]),
        );
        ctx.start_count = 3;
        assert_eq!(bank.read(&ctx, 0x0), 0x60);
        bank.write(&mut ctx, 0x0, 0xffff_ffff);
        assert_eq!(bank.state().get(0x0), 0);
    }

    #[test]
    fn test_reset() {
        let mut ctx = Context::default();
        let mut bank = bank();
        bank.write(&mut ctx, CTRL, 0x33);
        bank.write(&mut ctx, SEL, 0x2);
        bank.write(&mut ctx, LOCK, 0);
        bank.reset();
        assert_eq!(bank.read(&ctx, CTRL), 0x1200);
        assert_eq!(bank.read(&ctx, SEL), 0x1);
        assert!(!bank.state().locks().is_locked(LockGroup::General));
    }

    #[test]
    fn test_state_helpers() {
        let mut bank = bank();
        bank.state_mut().modify(SEL, Sel::CLKSEL::B);
        assert_eq!(bank.state().reg::<Sel::Register>(SEL).read(Sel::CLKSEL), 2);
        bank.state_mut().set(CTRL, 0x0000_3400);
        assert_eq!(bank.state().reg::<Ctrl::Register>(CTRL).read(Ctrl::STATUS), 0x34);
    }

    #[test]
    fn test_narrow_reads() {
        let mut ctx = Context::default();
        let mut bank = bank();
        bank.write(&mut ctx, CTRL, 0xa5);
        assert_eq!(bank.read_sized(&ctx, RvSize::Byte, CTRL), Ok(0xa5));
        assert_eq!(bank.read_sized(&ctx, RvSize::Byte, CTRL + 1), Ok(0x12));
        assert_eq!(bank.read_sized(&ctx, RvSize::HalfWord, CTRL), Ok(0x12a5));
        assert_eq!(bank.read_sized(&ctx, RvSize::HalfWord, CTRL + 2), Ok(0));
        assert_eq!(
            bank.read_sized(&ctx, RvSize::HalfWord, CTRL + 1),
            Err(BusError::LoadAddrMisaligned)
        );
        assert_eq!(
            bank.read_sized(&ctx, RvSize::Invalid, CTRL),
            Err(BusError::LoadAccessFault)
        );
    }

    #[test]
    fn test_narrow_writes() {
        let mut ctx = Context::default();
        let mut bank = bank();
        bank.write(&mut ctx, CTRL, 0x0f);

        // Plain narrow writes merge into the current word.
        bank.write_sized(&mut ctx, RvSize::Byte, CTRL + 2, 0x1).unwrap();
        assert_eq!(bank.read(&ctx, CTRL), 0x120f);
        assert_eq!(ctx.start_count, 1);

        // Alias narrow writes only touch the addressed lanes.
        bank.write_sized(&mut ctx, RvSize::Byte, SET | CTRL, 0xf0).unwrap();
        assert_eq!(bank.read(&ctx, CTRL), 0x12ff);
        bank.write_sized(&mut ctx, RvSize::HalfWord, CLEAR | CTRL, 0x0003).unwrap();
        assert_eq!(bank.read(&ctx, CTRL), 0x12fc);

        assert_eq!(
            bank.write_sized(&mut ctx, RvSize::Word, CTRL + 2, 0),
            Err(BusError::StoreAddrMisaligned)
        );
    }

    #[test]
    #[should_panic(expected = "overlaps")]
    fn test_overlapping_fields_rejected() {
        let _: Register<Context> = Register::new("BAD", 0x0, 0)
            .field(Field::new("A", 0, 4, FieldAccess::ReadWrite))
            .field(Field::new("B", 3, 2, FieldAccess::ReadWrite));
    }

    #[test]
    #[should_panic(expected = "share offset")]
    fn test_duplicate_offsets_rejected() {
        let _: RegisterBank<Context> = RegisterBank::new(
            "TEST",
            vec![Register::new("A", 0x4, 0), Register::new("B", 0x4, 0)],
            LockGate::new(&[]),
        );
    }
}
