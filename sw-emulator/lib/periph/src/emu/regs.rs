/*++

Licensed under the Apache-2.0 license.

File Name:

    regs.rs

Abstract:

    File contains the register map of the Series 2 energy management unit.

--*/

use super::EmuContext;
use gecko_emu_bus::{BankState, Field, LockGroup, Register};
use gecko_emu_types::{emu_enum, RvAddr};
use tock_registers::register_bitfields;

pub(super) const IPVERSION: RvAddr = 0x000;
pub(super) const DECBOD: RvAddr = 0x008;
pub(super) const BOD3SENSE: RvAddr = 0x00c;
pub(super) const VREGVDDCMPCTRL: RvAddr = 0x018;
pub(super) const PD1PARETCTRL: RvAddr = 0x01c;
pub(super) const LOCK: RvAddr = 0x060;
pub(super) const IF: RvAddr = 0x064;
pub(super) const IEN: RvAddr = 0x068;
pub(super) const EM4CTRL: RvAddr = 0x06c;
pub(super) const CMD: RvAddr = 0x070;
pub(super) const CTRL: RvAddr = 0x074;
pub(super) const TEMPLIMITS: RvAddr = 0x078;
pub(super) const STATUS: RvAddr = 0x084;
pub(super) const TEMP: RvAddr = 0x088;
pub(super) const RSTCTRL: RvAddr = 0x090;
pub(super) const RSTCAUSE: RvAddr = 0x094;
pub(super) const TESTLOCK: RvAddr = 0x0d0;
pub(super) const TESTCTRL: RvAddr = 0x0d4;

/// Key unlocking the EMU configuration and test registers.
pub const LOCK_KEY: u16 = 0xade8;

/// Values software writes to EM4CTRL.EM4ENTRY, in order, to enter EM4.
pub(super) const EM4_ENTRY_SEQUENCE: [u32; 4] = [2, 3, 2, 3];

register_bitfields! [
    u32,

    pub Ipversion [
        IPVERSION OFFSET(0) NUMBITS(32) [],
    ],

    pub Decbod [
        DECBODEN OFFSET(0) NUMBITS(1) [],
        DECBODMASK OFFSET(1) NUMBITS(1) [],
        DECOVMBODEN OFFSET(4) NUMBITS(1) [],
        DECOVMBODMASK OFFSET(5) NUMBITS(1) [],
    ],

    pub Bod3sense [
        AVDDBODEN OFFSET(0) NUMBITS(1) [],
        VDDIO0BODEN OFFSET(1) NUMBITS(1) [],
        VDDIO1BODEN OFFSET(2) NUMBITS(1) [],
    ],

    pub Vregvddcmpctrl [
        VREGINCMPEN OFFSET(0) NUMBITS(1) [],
        THRESSEL OFFSET(1) NUMBITS(2) [],
    ],

    pub Pd1paretctrl [
        PD1PARETDIS OFFSET(0) NUMBITS(16) [],
    ],

    /// IF and IEN
    pub Interrupt [
        AVDDBOD OFFSET(16) NUMBITS(1) [],
        IOVDD0BOD OFFSET(17) NUMBITS(1) [],
        EM23WAKEUP OFFSET(24) NUMBITS(1) [],
        VSCALEDONE OFFSET(25) NUMBITS(1) [],
        TEMPAVG OFFSET(27) NUMBITS(1) [],
        TEMP OFFSET(29) NUMBITS(1) [],
        TEMPLOW OFFSET(30) NUMBITS(1) [],
        TEMPHIGH OFFSET(31) NUMBITS(1) [],
    ],

    pub Em4ctrl [
        EM4ENTRY OFFSET(0) NUMBITS(2) [],
        EM4IORETMODE OFFSET(4) NUMBITS(2) [
            DISABLE = 0,
            EM4EXIT = 1,
            SWUNLATCH = 2,
        ],
        BOD3SENSEEM4WU OFFSET(8) NUMBITS(1) [],
    ],

    pub Cmd [
        EM4UNLATCH OFFSET(1) NUMBITS(1) [],
        TEMPAVGREQ OFFSET(4) NUMBITS(1) [],
        EM01VSCALE1 OFFSET(9) NUMBITS(1) [],
        EM01VSCALE2 OFFSET(10) NUMBITS(1) [],
        RSTCAUSECLR OFFSET(17) NUMBITS(1) [],
    ],

    pub Ctrl [
        EM2DBGEN OFFSET(0) NUMBITS(1) [],
        TEMPAVGNUM OFFSET(3) NUMBITS(1) [],
        EM23VSCALE OFFSET(8) NUMBITS(2) [],
        FLASHPWRUPONDEMAND OFFSET(16) NUMBITS(1) [],
        EFPDIRECTMODEEN OFFSET(29) NUMBITS(1) [],
        EFPDRVDECOUPLE OFFSET(30) NUMBITS(1) [],
        EFPDRVDVDD OFFSET(31) NUMBITS(1) [],
    ],

    /// Limits in Kelvin
    pub Templimits [
        TEMPLOW OFFSET(0) NUMBITS(9) [],
        TEMPHIGH OFFSET(16) NUMBITS(9) [],
    ],

    pub Status [
        LOCK OFFSET(0) NUMBITS(1) [
            UNLOCKED = 0,
            LOCKED = 1,
        ],
        FIRSTTEMPDONE OFFSET(1) NUMBITS(1) [],
        TEMPACTIVE OFFSET(2) NUMBITS(1) [],
        TEMPAVGACTIVE OFFSET(3) NUMBITS(1) [],
        VSCALEBUSY OFFSET(4) NUMBITS(1) [],
        VSCALEFAILED OFFSET(5) NUMBITS(1) [],
        VSCALE OFFSET(6) NUMBITS(2) [
            VSCALE0 = 0,
            VSCALE1 = 1,
            VSCALE2 = 2,
        ],
        RACACTIVE OFFSET(9) NUMBITS(1) [],
        EM4IORET OFFSET(8) NUMBITS(1) [],
        EM2ENTERED OFFSET(10) NUMBITS(1) [],
    ],

    /// Temperature in quarter Kelvin
    pub Temp [
        TEMPLSB OFFSET(0) NUMBITS(2) [],
        TEMP OFFSET(2) NUMBITS(9) [],
        TEMPAVG OFFSET(16) NUMBITS(11) [],
    ],

    pub Rstctrl [
        WDOG0RMODE OFFSET(0) NUMBITS(1) [],
        WDOG1RMODE OFFSET(1) NUMBITS(1) [],
        SYSRMODE OFFSET(2) NUMBITS(1) [],
        LOCKUPRMODE OFFSET(3) NUMBITS(1) [],
        AVDDBODRMODE OFFSET(6) NUMBITS(1) [],
        IOVDD0BODRMODE OFFSET(7) NUMBITS(1) [],
        DECBODRMODE OFFSET(10) NUMBITS(1) [],
        SESYSRMODE OFFSET(11) NUMBITS(1) [],
        SELOCKUPRMODE OFFSET(12) NUMBITS(1) [],
    ],

    pub Rstcause [
        POR OFFSET(0) NUMBITS(1) [],
        PIN OFFSET(1) NUMBITS(1) [],
        EM4 OFFSET(2) NUMBITS(1) [],
        WDOG0 OFFSET(3) NUMBITS(1) [],
        WDOG1 OFFSET(4) NUMBITS(1) [],
        LOCKUP OFFSET(5) NUMBITS(1) [],
        SYSREQ OFFSET(6) NUMBITS(1) [],
        DVDDBOD OFFSET(7) NUMBITS(1) [],
        DVDDLEBOD OFFSET(8) NUMBITS(1) [],
        DECBOD OFFSET(9) NUMBITS(1) [],
        AVDDBOD OFFSET(10) NUMBITS(1) [],
        IOVDD0BOD OFFSET(11) NUMBITS(1) [],
        SETAMPER OFFSET(13) NUMBITS(1) [],
        VREGIN OFFSET(31) NUMBITS(1) [],
    ],

    pub Testctrl [
        BODMASK OFFSET(2) NUMBITS(1) [],
        REGDIS OFFSET(4) NUMBITS(1) [],
        EM2ENTRYTIMEOUTEN OFFSET(8) NUMBITS(1) [],
    ],
];

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub Em4IoRetMode;
    u32;
    {
        Disable = 0,
        Em4Exit = 1,
        SwUnlatch = 2,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub Em23VScale;
    u32;
    {
        Vscale0 = 0,
        Vscale2 = 2,
    };
    Invalid
);

type EmuField = Field<EmuContext>;

macro_rules! rw {
    ($reg:ident :: $field:ident) => {
        EmuField::read_write(stringify!($field), $reg::$field)
    };
}

macro_rules! ro {
    ($reg:ident :: $field:ident) => {
        EmuField::read_only(stringify!($field), $reg::$field)
    };
}

fn set_vscale(state: &mut BankState, vscale: u32) {
    state.modify(STATUS, Status::VSCALE.val(vscale));
    state.modify(IF, Interrupt::VSCALEDONE::SET);
}

fn interrupt_register(name: &'static str, offset: RvAddr) -> Register<EmuContext> {
    Register::new(name, offset, 0)
        .field(rw!(Interrupt::AVDDBOD))
        .field(rw!(Interrupt::IOVDD0BOD))
        .field(rw!(Interrupt::EM23WAKEUP))
        .field(rw!(Interrupt::VSCALEDONE))
        .field(rw!(Interrupt::TEMPAVG))
        .field(rw!(Interrupt::TEMP))
        .field(rw!(Interrupt::TEMPLOW))
        .field(rw!(Interrupt::TEMPHIGH))
}

pub(super) fn registers() -> Vec<Register<EmuContext>> {
    use LockGroup::{General, Test};

    vec![
        Register::new("IPVERSION", IPVERSION, 0x2).field(ro!(Ipversion::IPVERSION)),
        Register::new("DECBOD", DECBOD, 0x22)
            .field(rw!(Decbod::DECBODEN))
            .field(rw!(Decbod::DECBODMASK))
            .field(rw!(Decbod::DECOVMBODEN))
            .field(rw!(Decbod::DECOVMBODMASK))
            .locked_by(General),
        Register::new("BOD3SENSE", BOD3SENSE, 0)
            .field(rw!(Bod3sense::AVDDBODEN))
            .field(rw!(Bod3sense::VDDIO0BODEN))
            .field(rw!(Bod3sense::VDDIO1BODEN))
            .locked_by(General),
        Register::new("VREGVDDCMPCTRL", VREGVDDCMPCTRL, 0x6)
            .field(rw!(Vregvddcmpctrl::VREGINCMPEN))
            .field(rw!(Vregvddcmpctrl::THRESSEL))
            .locked_by(General),
        Register::new("PD1PARETCTRL", PD1PARETCTRL, 0)
            .field(rw!(Pd1paretctrl::PD1PARETDIS))
            .locked_by(General),
        Register::new("LOCK", LOCK, LOCK_KEY.into()).field(EmuField::lock_key("LOCKKEY", General)),
        interrupt_register("IF", IF),
        interrupt_register("IEN", IEN),
        Register::new("EM4CTRL", EM4CTRL, 0)
            .field(
                rw!(Em4ctrl::EM4ENTRY).on_write(|ctx: &mut EmuContext, _, write| {
                    ctx.em4_entry_write(write.new);
                }),
            )
            .field(rw!(Em4ctrl::EM4IORETMODE).with_domain(Em4IoRetMode::ENCODINGS))
            .field(rw!(Em4ctrl::BOD3SENSEEM4WU))
            .locked_by(General),
        Register::new("CMD", CMD, 0)
            .field(
                EmuField::write_only("EM4UNLATCH", Cmd::EM4UNLATCH).on_write(|_, state, write| {
                    if write.is_set() {
                        state.modify(STATUS, Status::EM4IORET::CLEAR);
                    }
                }),
            )
            .field(
                EmuField::write_only("TEMPAVGREQ", Cmd::TEMPAVGREQ).on_write(
                    |ctx: &mut EmuContext, state, write| {
                        if write.is_set() {
                            ctx.temperature_avg = ctx.temperature;
                            state.modify(IF, Interrupt::TEMPAVG::SET);
                        }
                    },
                ),
            )
            .field(
                EmuField::write_only("EM01VSCALE1", Cmd::EM01VSCALE1).on_write(
                    |_, state, write| {
                        if write.is_set() {
                            set_vscale(state, 1);
                        }
                    },
                ),
            )
            .field(
                EmuField::write_only("EM01VSCALE2", Cmd::EM01VSCALE2).on_write(
                    |_, state, write| {
                        if write.is_set() {
                            set_vscale(state, 2);
                        }
                    },
                ),
            )
            .field(
                EmuField::write_only("RSTCAUSECLR", Cmd::RSTCAUSECLR).on_write(
                    |_, state, write| {
                        if write.is_set() {
                            state.set(RSTCAUSE, 0);
                        }
                    },
                ),
            ),
        Register::new("CTRL", CTRL, 0x200)
            .field(rw!(Ctrl::EM2DBGEN))
            .field(rw!(Ctrl::TEMPAVGNUM))
            .field(rw!(Ctrl::EM23VSCALE).with_domain(Em23VScale::ENCODINGS))
            .field(rw!(Ctrl::FLASHPWRUPONDEMAND))
            .field(rw!(Ctrl::EFPDIRECTMODEEN))
            .field(rw!(Ctrl::EFPDRVDECOUPLE))
            .field(rw!(Ctrl::EFPDRVDVDD))
            .locked_by(General),
        Register::new("TEMPLIMITS", TEMPLIMITS, 0x01ff_0000)
            .field(rw!(Templimits::TEMPLOW))
            .field(rw!(Templimits::TEMPHIGH))
            .locked_by(General),
        Register::new("STATUS", STATUS, Status::VSCALE::VSCALE2.value)
            .field(ro!(Status::LOCK).with_value_provider(
                |_: &EmuContext, state: &BankState, _: u32| {
                    u32::from(state.locks().is_locked(General))
                },
            ))
            .field(ro!(Status::FIRSTTEMPDONE))
            .field(ro!(Status::TEMPACTIVE))
            .field(ro!(Status::TEMPAVGACTIVE))
            .field(ro!(Status::VSCALEBUSY))
            .field(ro!(Status::VSCALEFAILED))
            .field(ro!(Status::VSCALE))
            .field(ro!(Status::RACACTIVE))
            .field(ro!(Status::EM4IORET))
            .field(ro!(Status::EM2ENTERED)),
        Register::new("TEMP", TEMP, 0)
            .field(
                ro!(Temp::TEMPLSB)
                    .with_value_provider(|ctx: &EmuContext, _, _| ctx.temperature & 0x3),
            )
            .field(
                ro!(Temp::TEMP).with_value_provider(|ctx: &EmuContext, _, _| ctx.temperature >> 2),
            )
            .field(
                ro!(Temp::TEMPAVG)
                    .with_value_provider(|ctx: &EmuContext, _, _| ctx.temperature_avg),
            ),
        Register::new("RSTCTRL", RSTCTRL, 0x407)
            .field(rw!(Rstctrl::WDOG0RMODE))
            .field(rw!(Rstctrl::WDOG1RMODE))
            .field(rw!(Rstctrl::SYSRMODE))
            .field(rw!(Rstctrl::LOCKUPRMODE))
            .field(rw!(Rstctrl::AVDDBODRMODE))
            .field(rw!(Rstctrl::IOVDD0BODRMODE))
            .field(rw!(Rstctrl::DECBODRMODE))
            .field(rw!(Rstctrl::SESYSRMODE))
            .field(rw!(Rstctrl::SELOCKUPRMODE))
            .locked_by(General),
        Register::new("RSTCAUSE", RSTCAUSE, Rstcause::POR::SET.value)
            .field(ro!(Rstcause::POR))
            .field(ro!(Rstcause::PIN))
            .field(ro!(Rstcause::EM4))
            .field(ro!(Rstcause::WDOG0))
            .field(ro!(Rstcause::WDOG1))
            .field(ro!(Rstcause::LOCKUP))
            .field(ro!(Rstcause::SYSREQ))
            .field(ro!(Rstcause::DVDDBOD))
            .field(ro!(Rstcause::DVDDLEBOD))
            .field(ro!(Rstcause::DECBOD))
            .field(ro!(Rstcause::AVDDBOD))
            .field(ro!(Rstcause::IOVDD0BOD))
            .field(ro!(Rstcause::SETAMPER))
            .field(ro!(Rstcause::VREGIN)),
        Register::new("TESTLOCK", TESTLOCK, LOCK_KEY.into())
            .field(EmuField::lock_key("LOCKKEY", Test)),
        Register::new("TESTCTRL", TESTCTRL, 0)
            .field(rw!(Testctrl::BODMASK))
            .field(rw!(Testctrl::REGDIS))
            .field(rw!(Testctrl::EM2ENTRYTIMEOUTEN))
            .locked_by(Test),
    ]
}
