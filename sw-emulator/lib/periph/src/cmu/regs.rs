/*++

Licensed under the Apache-2.0 license.

File Name:

    regs.rs

Abstract:

    File contains the register map of the Series 2 clock management unit
    and the hooks binding its fields to the clock tree.

--*/

use super::topology::{Consumer, Nodes, Oscillator};
use super::CmuContext;
use crate::clock_tree::NodeId;
use gecko_emu_bus::{BankState, Field, LockGroup, Register};
use gecko_emu_types::{emu_enum, RvAddr};
use log::debug;
use tock_registers::fields::Field as BitField;
use tock_registers::{register_bitfields, RegisterLongName};

pub(super) const IPVERSION: RvAddr = 0x000;
pub(super) const CTRL: RvAddr = 0x004;
pub(super) const STATUS: RvAddr = 0x008;
pub(super) const LOCK: RvAddr = 0x010;
pub(super) const WDOGLOCK: RvAddr = 0x014;
pub(super) const IF: RvAddr = 0x020;
pub(super) const IEN: RvAddr = 0x024;
pub(super) const TEST: RvAddr = 0x030;
pub(super) const TESTHV: RvAddr = 0x034;
pub(super) const TESTCLKEN: RvAddr = 0x040;
pub(super) const CALCMD: RvAddr = 0x050;
pub(super) const CALCTRL: RvAddr = 0x054;
pub(super) const CALCNT: RvAddr = 0x058;
pub(super) const CLKEN0: RvAddr = 0x064;
pub(super) const CLKEN1: RvAddr = 0x068;
pub(super) const SYSCLKCTRL: RvAddr = 0x070;
pub(super) const SECLKCTRL: RvAddr = 0x074;
pub(super) const TRACECLKCTRL: RvAddr = 0x080;
pub(super) const EXPORTCLKCTRL: RvAddr = 0x090;
pub(super) const DPLLREFCLKCTRL: RvAddr = 0x100;
pub(super) const EM01GRPACLKCTRL: RvAddr = 0x120;
pub(super) const EM01GRPCCLKCTRL: RvAddr = 0x128;
pub(super) const EM23GRPACLKCTRL: RvAddr = 0x140;
pub(super) const EM4GRPACLKCTRL: RvAddr = 0x160;
pub(super) const IADCCLKCTRL: RvAddr = 0x180;
pub(super) const WDOG0CLKCTRL: RvAddr = 0x200;
pub(super) const WDOG1CLKCTRL: RvAddr = 0x208;
pub(super) const EUSART0CLKCTRL: RvAddr = 0x220;
pub(super) const SYNTHCLKCTRL: RvAddr = 0x230;
pub(super) const SYSRTC0CLKCTRL: RvAddr = 0x240;
pub(super) const LCDCLKCTRL: RvAddr = 0x250;
pub(super) const VDAC0CLKCTRL: RvAddr = 0x260;
pub(super) const PCNT0CLKCTRL: RvAddr = 0x270;
pub(super) const RADIOCLKCTRL: RvAddr = 0x280;
pub(super) const DAPCLKCTRL: RvAddr = 0x284;
pub(super) const LESENSEHFCLKCTRL: RvAddr = 0x290;
pub(super) const VDAC1CLKCTRL: RvAddr = 0x294;

/// Key unlocking the general configuration registers.
pub const LOCK_KEY: u16 = 0x93f7;

/// Key unlocking the watchdog clock selection registers.
pub const WDOGLOCK_KEY: u16 = 0x5257;

/// Largest value the calibration counter holds.
pub(super) const CALCNT_MAX: u64 = 0xf_ffff;

register_bitfields! [
    u32,

    pub Ipversion [
        IPVERSION OFFSET(0) NUMBITS(32) [],
    ],

    pub Ctrl [
        RUNNINGDEBUGSEL OFFSET(0) NUMBITS(8) [],
        FORCEEM1PCLKEN OFFSET(30) NUMBITS(1) [],
        FORCECLKIN0 OFFSET(31) NUMBITS(1) [],
    ],

    pub Status [
        CALRDY OFFSET(0) NUMBITS(1) [],
        REQUESTDEBUG OFFSET(15) NUMBITS(1) [],
        RUNNINGDEBUG OFFSET(16) NUMBITS(1) [],
        ISFORCEDCLKIN0 OFFSET(17) NUMBITS(1) [],
        WDOGLOCK OFFSET(30) NUMBITS(1) [
            UNLOCKED = 0,
            LOCKED = 1,
        ],
        LOCK OFFSET(31) NUMBITS(1) [
            UNLOCKED = 0,
            LOCKED = 1,
        ],
    ],

    /// IF and IEN
    pub Interrupt [
        CALRDY OFFSET(0) NUMBITS(1) [],
        CALOF OFFSET(1) NUMBITS(1) [],
    ],

    pub Test [
        CLKOUTHIDDENSEL OFFSET(0) NUMBITS(5) [],
        REQDEBUGSEL0 OFFSET(16) NUMBITS(8) [],
        REQDEBUGSEL1 OFFSET(24) NUMBITS(8) [],
    ],

    pub Testhv [
        PLSDEBUGEN OFFSET(0) NUMBITS(1) [],
    ],

    pub Testclken [
        BUSMATRIX OFFSET(2) NUMBITS(1) [],
        HOSTCPU OFFSET(3) NUMBITS(1) [],
        EMU OFFSET(4) NUMBITS(1) [],
        CMU OFFSET(5) NUMBITS(1) [],
        IMEMFLASH OFFSET(7) NUMBITS(1) [],
        CHIPTESTCTRL OFFSET(30) NUMBITS(1) [],
        SCRATCHPAD OFFSET(31) NUMBITS(1) [],
    ],

    pub Calcmd [
        CALSTART OFFSET(0) NUMBITS(1) [],
        CALSTOP OFFSET(1) NUMBITS(1) [],
    ],

    pub Calctrl [
        CALTOP OFFSET(0) NUMBITS(20) [],
        CONT OFFSET(23) NUMBITS(1) [],
        UPSEL OFFSET(24) NUMBITS(4) [],
        DOWNSEL OFFSET(28) NUMBITS(4) [],
    ],

    pub Calcnt [
        CALCNT OFFSET(0) NUMBITS(20) [],
    ],

    pub Clken0 [
        LDMA OFFSET(0) NUMBITS(1) [],
        LDMAXBAR OFFSET(1) NUMBITS(1) [],
        RADIOAES OFFSET(2) NUMBITS(1) [],
        GPCRC OFFSET(3) NUMBITS(1) [],
        TIMER0 OFFSET(4) NUMBITS(1) [],
        TIMER1 OFFSET(5) NUMBITS(1) [],
        TIMER2 OFFSET(6) NUMBITS(1) [],
        TIMER3 OFFSET(7) NUMBITS(1) [],
        TIMER4 OFFSET(8) NUMBITS(1) [],
        USART0 OFFSET(9) NUMBITS(1) [],
        IADC0 OFFSET(10) NUMBITS(1) [],
        AMUXCP0 OFFSET(11) NUMBITS(1) [],
        LETIMER0 OFFSET(12) NUMBITS(1) [],
        WDOG0 OFFSET(13) NUMBITS(1) [],
        I2C0 OFFSET(14) NUMBITS(1) [],
        I2C1 OFFSET(15) NUMBITS(1) [],
        SYSCFG OFFSET(16) NUMBITS(1) [],
        DPLL0 OFFSET(17) NUMBITS(1) [],
        HFRCO0 OFFSET(18) NUMBITS(1) [],
        HFRCOEM23 OFFSET(19) NUMBITS(1) [],
        HFXO0 OFFSET(20) NUMBITS(1) [],
        FSRCO OFFSET(21) NUMBITS(1) [],
        LFRCO OFFSET(22) NUMBITS(1) [],
        LFXO OFFSET(23) NUMBITS(1) [],
        ULFRCO OFFSET(24) NUMBITS(1) [],
        GPIO OFFSET(26) NUMBITS(1) [],
        PRS OFFSET(27) NUMBITS(1) [],
        BURAM OFFSET(28) NUMBITS(1) [],
        BURTC OFFSET(29) NUMBITS(1) [],
        SYSRTC0 OFFSET(30) NUMBITS(1) [],
        DCDC OFFSET(31) NUMBITS(1) [],
    ],

    pub Clken1 [
        AGC OFFSET(0) NUMBITS(1) [],
        MODEM OFFSET(1) NUMBITS(1) [],
        RFCRC OFFSET(2) NUMBITS(1) [],
        FRC OFFSET(3) NUMBITS(1) [],
        PROTIMER OFFSET(4) NUMBITS(1) [],
        RAC OFFSET(5) NUMBITS(1) [],
        SYNTH OFFSET(6) NUMBITS(1) [],
        RFSCRATCHPAD OFFSET(7) NUMBITS(1) [],
        HOSTMAILBOX OFFSET(8) NUMBITS(1) [],
        RFMAILBOX OFFSET(9) NUMBITS(1) [],
        SEMAILBOXHOST OFFSET(10) NUMBITS(1) [],
        BUFC OFFSET(11) NUMBITS(1) [],
        KEYSCAN OFFSET(13) NUMBITS(1) [],
        SMU OFFSET(14) NUMBITS(1) [],
        ICACHE0 OFFSET(15) NUMBITS(1) [],
        MSC OFFSET(16) NUMBITS(1) [],
        WDOG1 OFFSET(17) NUMBITS(1) [],
        ACMP0 OFFSET(18) NUMBITS(1) [],
        ACMP1 OFFSET(19) NUMBITS(1) [],
        VDAC0 OFFSET(20) NUMBITS(1) [],
        PCNT0 OFFSET(21) NUMBITS(1) [],
        EUSART0 OFFSET(22) NUMBITS(1) [],
        EUSART1 OFFSET(23) NUMBITS(1) [],
        RFECA0 OFFSET(25) NUMBITS(1) [],
        RFECA1 OFFSET(26) NUMBITS(1) [],
        DMEM OFFSET(27) NUMBITS(1) [],
        ECAIFADC OFFSET(28) NUMBITS(1) [],
        VDAC1 OFFSET(29) NUMBITS(1) [],
        MVP OFFSET(30) NUMBITS(1) [],
    ],

    pub Sysclkctrl [
        CLKSEL OFFSET(0) NUMBITS(3) [],
        LSPCLKPRESC OFFSET(8) NUMBITS(1) [],
        PCLKPRESC OFFSET(10) NUMBITS(1) [],
        HCLKPRESC OFFSET(12) NUMBITS(4) [
            DIV1 = 0,
            DIV2 = 1,
            DIV4 = 3,
            DIV8 = 7,
            DIV16 = 15,
        ],
        RHCLKPRESC OFFSET(16) NUMBITS(1) [],
    ],

    pub Seclkctrl [
        CLKSEL OFFSET(0) NUMBITS(2) [],
        DISCON OFFSET(31) NUMBITS(1) [],
    ],

    pub Traceclkctrl [
        CLKSEL OFFSET(0) NUMBITS(2) [],
        PRESC OFFSET(4) NUMBITS(2) [],
    ],

    pub Exportclkctrl [
        CLKOUTSEL0 OFFSET(0) NUMBITS(4) [],
        CLKOUTSEL1 OFFSET(8) NUMBITS(4) [],
        CLKOUTSEL2 OFFSET(16) NUMBITS(4) [],
        PRESC OFFSET(24) NUMBITS(5) [],
    ],

    /// Clock selection registers with a 2-bit selector
    pub ClkCtrl2 [
        CLKSEL OFFSET(0) NUMBITS(2) [],
    ],

    /// Clock selection registers with a 3-bit selector
    pub ClkCtrl3 [
        CLKSEL OFFSET(0) NUMBITS(3) [],
    ],

    pub Radioclkctrl [
        EN OFFSET(0) NUMBITS(1) [],
        FORCECLKENRADIO OFFSET(1) NUMBITS(1) [],
        DBGCLK OFFSET(31) NUMBITS(1) [],
    ],
];

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub SysclkSel;
    u32;
    {
        Fsrco = 1,
        Hfrcodpll = 2,
        Hfxo = 3,
        Clkin0 = 4,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub SeclkSel;
    u32;
    {
        Fsrco = 1,
        Hfrcose = 2,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub TraceclkSel;
    u32;
    {
        Disable = 0,
        Sysclk = 1,
        Hfrcoem23 = 2,
        Hfrcodpllrt = 3,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub ClkoutSel;
    u32;
    {
        Disabled = 0,
        Hclk = 1,
        Hfexpclk = 2,
        Ulfrco = 3,
        Lfrco = 4,
        Lfxo = 5,
        Hfrcodpll = 6,
        Hfxo = 7,
        Fsrco = 8,
        Hfrcoem23 = 9,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub CalUpSel;
    u32;
    {
        Disabled = 0,
        Prs = 1,
        Hfxo = 2,
        Lfxo = 3,
        Hfrcodpll = 4,
        Hfrcoem23 = 5,
        Pfmosc = 6,
        Biasosc = 7,
        Fsrco = 8,
        Lfrco = 9,
        Ulfrco = 10,
        Hfrcose = 11,
        Temposc = 12,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub CalDownSel;
    u32;
    {
        Disabled = 0,
        Hclk = 1,
        Prs = 2,
        Hfxo = 3,
        Lfxo = 4,
        Hfrcodpll = 5,
        Hfrcoem23 = 6,
        Pfmosc = 7,
        Biasosc = 8,
        Fsrco = 9,
        Lfrco = 10,
        Ulfrco = 11,
        Hfrcose = 12,
        Temposc = 13,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub DpllRefSel;
    u32;
    {
        Disabled = 0,
        Hfxo = 1,
        Lfxo = 2,
        Clkin0 = 3,
    };
    Invalid
);

emu_enum!(
    /// EM01GRPACLK and EM01GRPCCLK
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub Em01GrpSel;
    u32;
    {
        Disabled = 0,
        Hfrcodpll = 1,
        Hfxo = 2,
        Fsrco = 3,
        Hfrcoem23 = 4,
        Hfrcodpllrt = 5,
        Hfxort = 6,
    };
    Invalid
);

emu_enum!(
    /// Low-frequency group clocks: EM23GRPACLK, EM4GRPACLK, SYSRTCCLK, LCDCLK
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub LfGrpSel;
    u32;
    {
        Disabled = 0,
        Lfrco = 1,
        Lfxo = 2,
        Ulfrco = 3,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub IadcSel;
    u32;
    {
        Disabled = 0,
        Em01grpaclk = 1,
        Fsrco = 2,
        Hfrcoem23 = 3,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub WdogSel;
    u32;
    {
        Disabled = 0,
        Lfrco = 1,
        Lfxo = 2,
        Ulfrco = 3,
        Hclkdiv1024 = 4,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub Eusart0Sel;
    u32;
    {
        Disabled = 0,
        Em01grpcclk = 1,
        Hfrcoem23 = 2,
        Lfrco = 3,
        Lfxo = 4,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub SynthSel;
    u32;
    {
        Disabled = 0,
        Hfxo = 1,
        Clkin0 = 2,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub VdacSel;
    u32;
    {
        Disabled = 0,
        Em01grpaclk = 1,
        Em23grpaclk = 2,
        Fsrco = 3,
        Hfrcoem23 = 4,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub Pcnt0Sel;
    u32;
    {
        Disabled = 0,
        Em23grpaclk = 1,
        Pcnts0 = 2,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub DapSel;
    u32;
    {
        Disabled = 0,
        Fsrco = 1,
        Hfrcodpll = 2,
    };
    Invalid
);

emu_enum!(
    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub LesenseHfSel;
    u32;
    {
        Disabled = 0,
        Fsrco = 1,
        Hfrcoem23 = 2,
    };
    Invalid
);

const HCLKPRESC_DOMAIN: &[u32] = &[0, 1, 3, 7, 15];

type CmuField = Field<CmuContext>;

macro_rules! rw {
    ($reg:ident :: $field:ident) => {
        CmuField::read_write(stringify!($field), $reg::$field)
    };
}

macro_rules! ro {
    ($reg:ident :: $field:ident) => {
        CmuField::read_only(stringify!($field), $reg::$field)
    };
}

/// Selector field driving a mux of the clock tree.
fn mux_select<R: RegisterLongName>(
    field: BitField<u32, R>,
    domain: &'static [u32],
    mux: fn(&Nodes) -> NodeId,
) -> CmuField {
    CmuField::read_write("CLKSEL", field)
        .with_domain(domain)
        .on_write(move |ctx: &mut CmuContext, _, write| {
            let node = mux(&ctx.nodes);
            ctx.tree.select(node, write.new);
        })
}

/// Prescaler field driving a divider of the clock tree.
fn prescaler<R: RegisterLongName>(
    name: &'static str,
    field: BitField<u32, R>,
    divider: fn(&Nodes) -> NodeId,
    divisor: fn(u32) -> u32,
) -> CmuField {
    CmuField::read_write(name, field).on_write(move |ctx: &mut CmuContext, _, write| {
        let node = divider(&ctx.nodes);
        ctx.tree.set_divisor(node, divisor(write.new));
    })
}

/// Clock enable bit of a consumer.
fn clock_enable<R: RegisterLongName>(
    name: &'static str,
    field: BitField<u32, R>,
    consumer: Consumer,
) -> CmuField {
    CmuField::read_write(name, field).on_write(move |ctx: &mut CmuContext, _, write| {
        ctx.set_consumer_enabled(consumer, write.is_set());
    })
}

/// Enable bit that keeps an oscillator running without demand.
fn force_enable<R: RegisterLongName>(
    name: &'static str,
    field: BitField<u32, R>,
    osc: Oscillator,
) -> CmuField {
    CmuField::read_write(name, field).on_write(move |ctx: &mut CmuContext, _, write| {
        let node = ctx.nodes.source(osc);
        ctx.tree.set_force_enabled(node, write.is_set());
    })
}

fn lock_status(group: LockGroup) -> impl Fn(&CmuContext, &BankState, u32) -> u32 {
    move |_: &CmuContext, state: &BankState, _: u32| u32::from(state.locks().is_locked(group))
}

fn mux_ctrl2(
    name: &'static str,
    offset: RvAddr,
    domain: &'static [u32],
    mux: fn(&Nodes) -> NodeId,
) -> Register<CmuContext> {
    Register::new(name, offset, 0x1)
        .field(mux_select(ClkCtrl2::CLKSEL, domain, mux))
        .locked_by(LockGroup::General)
}

fn mux_ctrl3(
    name: &'static str,
    offset: RvAddr,
    domain: &'static [u32],
    mux: fn(&Nodes) -> NodeId,
) -> Register<CmuContext> {
    Register::new(name, offset, 0x1)
        .field(mux_select(ClkCtrl3::CLKSEL, domain, mux))
        .locked_by(LockGroup::General)
}

pub(super) fn registers() -> Vec<Register<CmuContext>> {
    use LockGroup::{General, Watchdog};

    vec![
        Register::new("IPVERSION", IPVERSION, 0x3).field(ro!(Ipversion::IPVERSION)),
        Register::new("CTRL", CTRL, 0)
            .field(rw!(Ctrl::RUNNINGDEBUGSEL))
            .field(rw!(Ctrl::FORCEEM1PCLKEN))
            .field(force_enable(
                "FORCECLKIN0",
                Ctrl::FORCECLKIN0,
                Oscillator::Clkin0,
            ))
            .locked_by(General),
        Register::new("STATUS", STATUS, Status::CALRDY::SET.value)
            .field(ro!(Status::CALRDY))
            .field(ro!(Status::REQUESTDEBUG))
            .field(ro!(Status::RUNNINGDEBUG))
            .field(
                ro!(Status::ISFORCEDCLKIN0).with_value_provider(|_, state: &BankState, _| {
                    state.reg::<Ctrl::Register>(CTRL).read(Ctrl::FORCECLKIN0)
                }),
            )
            .field(ro!(Status::WDOGLOCK).with_value_provider(lock_status(Watchdog)))
            .field(ro!(Status::LOCK).with_value_provider(lock_status(General))),
        Register::new("LOCK", LOCK, LOCK_KEY.into())
            .field(CmuField::lock_key("LOCKKEY", General)),
        Register::new("WDOGLOCK", WDOGLOCK, WDOGLOCK_KEY.into())
            .field(CmuField::lock_key("LOCKKEY", Watchdog)),
        Register::new("IF", IF, 0)
            .field(rw!(Interrupt::CALRDY))
            .field(rw!(Interrupt::CALOF)),
        Register::new("IEN", IEN, 0)
            .field(rw!(Interrupt::CALRDY))
            .field(rw!(Interrupt::CALOF)),
        Register::new("TEST", TEST, 0)
            .field(rw!(Test::CLKOUTHIDDENSEL))
            .field(rw!(Test::REQDEBUGSEL0))
            .field(rw!(Test::REQDEBUGSEL1)),
        Register::new("TESTHV", TESTHV, 0).field(rw!(Testhv::PLSDEBUGEN)),
        Register::new("TESTCLKEN", TESTCLKEN, 0xbc)
            .field(rw!(Testclken::BUSMATRIX))
            .field(rw!(Testclken::HOSTCPU))
            .field(rw!(Testclken::EMU))
            .field(rw!(Testclken::CMU))
            .field(rw!(Testclken::IMEMFLASH))
            .field(rw!(Testclken::CHIPTESTCTRL))
            .field(rw!(Testclken::SCRATCHPAD)),
        Register::new("CALCMD", CALCMD, 0)
            .field(
                CmuField::write_only("CALSTART", Calcmd::CALSTART).on_write(|_, state, write| {
                    if write.is_set() {
                        state.modify(STATUS, Status::CALRDY::SET);
                        state.modify(IF, Interrupt::CALRDY::SET);
                    }
                }),
            )
            .field(
                CmuField::write_only("CALSTOP", Calcmd::CALSTOP).on_write(|_, _, write| {
                    if write.is_set() {
                        debug!("CMU: calibration stopped");
                    }
                }),
            ),
        Register::new("CALCTRL", CALCTRL, 0)
            .field(rw!(Calctrl::CALTOP))
            .field(rw!(Calctrl::CONT))
            .field(
                CmuField::read_write("UPSEL", Calctrl::UPSEL)
                    .with_domain(CalUpSel::ENCODINGS)
                    .on_write(|ctx: &mut CmuContext, _, write| {
                        let node = ctx.nodes.cal_up;
                        ctx.tree.select(node, write.new);
                    }),
            )
            .field(
                CmuField::read_write("DOWNSEL", Calctrl::DOWNSEL)
                    .with_domain(CalDownSel::ENCODINGS)
                    .on_write(|ctx: &mut CmuContext, _, write| {
                        let node = ctx.nodes.cal_down;
                        ctx.tree.select(node, write.new);
                    }),
            )
            .locked_by(General),
        Register::new("CALCNT", CALCNT, 0).field(ro!(Calcnt::CALCNT).with_value_provider(
            |ctx: &CmuContext, state: &BankState, _| {
                let top = state.reg::<Calctrl::Register>(CALCTRL).read(Calctrl::CALTOP);
                ctx.calibration_count(top)
            },
        )),
        Register::new("CLKEN0", CLKEN0, 0)
            .field(rw!(Clken0::LDMA))
            .field(rw!(Clken0::LDMAXBAR))
            .field(rw!(Clken0::RADIOAES))
            .field(rw!(Clken0::GPCRC))
            .field(clock_enable("TIMER0", Clken0::TIMER0, Consumer::Timer0))
            .field(clock_enable("TIMER1", Clken0::TIMER1, Consumer::Timer1))
            .field(clock_enable("TIMER2", Clken0::TIMER2, Consumer::Timer2))
            .field(clock_enable("TIMER3", Clken0::TIMER3, Consumer::Timer3))
            .field(clock_enable("TIMER4", Clken0::TIMER4, Consumer::Timer4))
            .field(clock_enable("USART0", Clken0::USART0, Consumer::Usart0))
            .field(clock_enable("IADC0", Clken0::IADC0, Consumer::Iadc0))
            .field(rw!(Clken0::AMUXCP0))
            .field(clock_enable(
                "LETIMER0",
                Clken0::LETIMER0,
                Consumer::Letimer0,
            ))
            .field(clock_enable("WDOG0", Clken0::WDOG0, Consumer::Wdog0))
            .field(clock_enable("I2C0", Clken0::I2C0, Consumer::I2c0))
            .field(clock_enable("I2C1", Clken0::I2C1, Consumer::I2c1))
            .field(rw!(Clken0::SYSCFG))
            .field(clock_enable("DPLL0", Clken0::DPLL0, Consumer::Dpll0))
            .field(force_enable("HFRCO0", Clken0::HFRCO0, Oscillator::Hfrcodpll))
            .field(force_enable(
                "HFRCOEM23",
                Clken0::HFRCOEM23,
                Oscillator::Hfrcoem23,
            ))
            .field(force_enable("HFXO0", Clken0::HFXO0, Oscillator::Hfxo))
            .field(force_enable("FSRCO", Clken0::FSRCO, Oscillator::Fsrco))
            .field(force_enable("LFRCO", Clken0::LFRCO, Oscillator::Lfrco))
            .field(force_enable("LFXO", Clken0::LFXO, Oscillator::Lfxo))
            .field(force_enable("ULFRCO", Clken0::ULFRCO, Oscillator::Ulfrco))
            .field(rw!(Clken0::GPIO))
            .field(rw!(Clken0::PRS))
            .field(rw!(Clken0::BURAM))
            .field(clock_enable("BURTC", Clken0::BURTC, Consumer::Burtc))
            .field(clock_enable("SYSRTC0", Clken0::SYSRTC0, Consumer::Sysrtc0))
            .field(rw!(Clken0::DCDC))
            .locked_by(General),
        Register::new("CLKEN1", CLKEN1, 0)
            .field(rw!(Clken1::AGC))
            .field(rw!(Clken1::MODEM))
            .field(rw!(Clken1::RFCRC))
            .field(rw!(Clken1::FRC))
            .field(rw!(Clken1::PROTIMER))
            .field(rw!(Clken1::RAC))
            .field(clock_enable("SYNTH", Clken1::SYNTH, Consumer::Synth))
            .field(rw!(Clken1::RFSCRATCHPAD))
            .field(rw!(Clken1::HOSTMAILBOX))
            .field(rw!(Clken1::RFMAILBOX))
            .field(rw!(Clken1::SEMAILBOXHOST))
            .field(rw!(Clken1::BUFC))
            .field(rw!(Clken1::KEYSCAN))
            .field(rw!(Clken1::SMU))
            .field(rw!(Clken1::ICACHE0))
            .field(rw!(Clken1::MSC))
            .field(clock_enable("WDOG1", Clken1::WDOG1, Consumer::Wdog1))
            .field(rw!(Clken1::ACMP0))
            .field(rw!(Clken1::ACMP1))
            .field(clock_enable("VDAC0", Clken1::VDAC0, Consumer::Vdac0))
            .field(clock_enable("PCNT0", Clken1::PCNT0, Consumer::Pcnt0))
            .field(clock_enable("EUSART0", Clken1::EUSART0, Consumer::Eusart0))
            .field(clock_enable("EUSART1", Clken1::EUSART1, Consumer::Eusart1))
            .field(rw!(Clken1::RFECA0))
            .field(rw!(Clken1::RFECA1))
            .field(rw!(Clken1::DMEM))
            .field(rw!(Clken1::ECAIFADC))
            .field(clock_enable("VDAC1", Clken1::VDAC1, Consumer::Vdac1))
            .field(rw!(Clken1::MVP))
            .locked_by(General),
        Register::new("SYSCLKCTRL", SYSCLKCTRL, SysclkSel::Fsrco.into())
            .field(
                CmuField::read_write("CLKSEL", Sysclkctrl::CLKSEL)
                    .with_domain(SysclkSel::ENCODINGS)
                    .on_write(|ctx: &mut CmuContext, _, write| {
                        let node = ctx.nodes.sysclk;
                        ctx.tree.select(node, write.new);
                        if SysclkSel::from(write.new) == SysclkSel::Hfxo {
                            ctx.hfxo_selected = true;
                        }
                    }),
            )
            .field(prescaler(
                "LSPCLKPRESC",
                Sysclkctrl::LSPCLKPRESC,
                |n| n.lspclk,
                // DIV2 is encoded as 0.
                |v| 2 - v,
            ))
            .field(prescaler(
                "PCLKPRESC",
                Sysclkctrl::PCLKPRESC,
                |n| n.pclk,
                |v| v + 1,
            ))
            .field(
                prescaler("HCLKPRESC", Sysclkctrl::HCLKPRESC, |n| n.hclk, |v| v + 1)
                    .with_domain(HCLKPRESC_DOMAIN),
            )
            .field(rw!(Sysclkctrl::RHCLKPRESC))
            .locked_by(General),
        Register::new("SECLKCTRL", SECLKCTRL, SeclkSel::Fsrco.into())
            .field(mux_select(
                Seclkctrl::CLKSEL,
                SeclkSel::ENCODINGS,
                |n| n.seclk,
            ))
            .field(rw!(Seclkctrl::DISCON))
            .locked_by(General),
        Register::new("TRACECLKCTRL", TRACECLKCTRL, TraceclkSel::Sysclk.into())
            .field(mux_select(
                Traceclkctrl::CLKSEL,
                TraceclkSel::ENCODINGS,
                |n| n.trace,
            ))
            .field(prescaler(
                "PRESC",
                Traceclkctrl::PRESC,
                |n| n.traceclk,
                |v| v + 1,
            ))
            .locked_by(General),
        Register::new("EXPORTCLKCTRL", EXPORTCLKCTRL, 0)
            .field(
                CmuField::read_write("CLKOUTSEL0", Exportclkctrl::CLKOUTSEL0)
                    .with_domain(ClkoutSel::ENCODINGS)
                    .on_write(|ctx: &mut CmuContext, _, write| {
                        let node = ctx.nodes.clkout[0];
                        ctx.tree.select(node, write.new);
                    }),
            )
            .field(
                CmuField::read_write("CLKOUTSEL1", Exportclkctrl::CLKOUTSEL1)
                    .with_domain(ClkoutSel::ENCODINGS)
                    .on_write(|ctx: &mut CmuContext, _, write| {
                        let node = ctx.nodes.clkout[1];
                        ctx.tree.select(node, write.new);
                    }),
            )
            .field(
                CmuField::read_write("CLKOUTSEL2", Exportclkctrl::CLKOUTSEL2)
                    .with_domain(ClkoutSel::ENCODINGS)
                    .on_write(|ctx: &mut CmuContext, _, write| {
                        let node = ctx.nodes.clkout[2];
                        ctx.tree.select(node, write.new);
                    }),
            )
            .field(prescaler(
                "PRESC",
                Exportclkctrl::PRESC,
                |n| n.hfexpclk,
                |v| v + 1,
            ))
            .locked_by(General),
        Register::new("DPLLREFCLKCTRL", DPLLREFCLKCTRL, DpllRefSel::Disabled.into())
            .field(mux_select(
                ClkCtrl2::CLKSEL,
                DpllRefSel::ENCODINGS,
                |n| n.dpllref,
            ))
            .locked_by(General),
        mux_ctrl3(
            "EM01GRPACLKCTRL",
            EM01GRPACLKCTRL,
            Em01GrpSel::ENCODINGS,
            |n| n.em01grpa,
        ),
        mux_ctrl3(
            "EM01GRPCCLKCTRL",
            EM01GRPCCLKCTRL,
            Em01GrpSel::ENCODINGS,
            |n| n.em01grpc,
        ),
        mux_ctrl2(
            "EM23GRPACLKCTRL",
            EM23GRPACLKCTRL,
            LfGrpSel::ENCODINGS,
            |n| n.em23grpa,
        ),
        mux_ctrl2(
            "EM4GRPACLKCTRL",
            EM4GRPACLKCTRL,
            LfGrpSel::ENCODINGS,
            |n| n.em4grpa,
        ),
        mux_ctrl2("IADCCLKCTRL", IADCCLKCTRL, IadcSel::ENCODINGS, |n| n.iadc),
        Register::new("WDOG0CLKCTRL", WDOG0CLKCTRL, WdogSel::Lfrco.into())
            .field(mux_select(
                ClkCtrl3::CLKSEL,
                WdogSel::ENCODINGS,
                |n| n.wdog0,
            ))
            .locked_by(Watchdog),
        Register::new("WDOG1CLKCTRL", WDOG1CLKCTRL, WdogSel::Lfrco.into())
            .field(mux_select(
                ClkCtrl3::CLKSEL,
                WdogSel::ENCODINGS,
                |n| n.wdog1,
            ))
            .locked_by(Watchdog),
        mux_ctrl3(
            "EUSART0CLKCTRL",
            EUSART0CLKCTRL,
            Eusart0Sel::ENCODINGS,
            |n| n.eusart0,
        ),
        mux_ctrl2("SYNTHCLKCTRL", SYNTHCLKCTRL, SynthSel::ENCODINGS, |n| n.synth),
        mux_ctrl2(
            "SYSRTC0CLKCTRL",
            SYSRTC0CLKCTRL,
            LfGrpSel::ENCODINGS,
            |n| n.sysrtc,
        ),
        mux_ctrl2("LCDCLKCTRL", LCDCLKCTRL, LfGrpSel::ENCODINGS, |n| n.lcd),
        mux_ctrl3("VDAC0CLKCTRL", VDAC0CLKCTRL, VdacSel::ENCODINGS, |n| n.vdac0),
        mux_ctrl2("PCNT0CLKCTRL", PCNT0CLKCTRL, Pcnt0Sel::ENCODINGS, |n| n.pcnt0),
        Register::new("RADIOCLKCTRL", RADIOCLKCTRL, 0)
            .field(rw!(Radioclkctrl::EN))
            .field(rw!(Radioclkctrl::FORCECLKENRADIO))
            .field(rw!(Radioclkctrl::DBGCLK))
            .locked_by(General),
        mux_ctrl2("DAPCLKCTRL", DAPCLKCTRL, DapSel::ENCODINGS, |n| n.dap),
        mux_ctrl2(
            "LESENSEHFCLKCTRL",
            LESENSEHFCLKCTRL,
            LesenseHfSel::ENCODINGS,
            |n| n.lesensehf,
        ),
        mux_ctrl3("VDAC1CLKCTRL", VDAC1CLKCTRL, VdacSel::ENCODINGS, |n| n.vdac1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_map() {
        let registers = registers();
        assert_eq!(registers.len(), 37);
        assert!(registers
            .iter()
            .filter(|r| r.name().ends_with("CLKCTRL"))
            .all(|r| r.lock_group().is_some()));
        let wdog: Vec<_> = registers
            .iter()
            .filter(|r| r.lock_group() == Some(LockGroup::Watchdog))
            .map(|r| r.name())
            .collect();
        assert_eq!(wdog, ["WDOG0CLKCTRL", "WDOG1CLKCTRL"]);
        for name in ["LOCK", "WDOGLOCK", "STATUS", "IF", "IEN", "CALCMD", "CALCNT"] {
            let register = registers.iter().find(|r| r.name() == name).unwrap();
            assert_eq!(register.lock_group(), None, "{name}");
        }
    }

    #[test]
    fn test_selector_domains() {
        assert_eq!(SysclkSel::ENCODINGS, &[1, 2, 3, 4]);
        assert_eq!(SysclkSel::from(0), SysclkSel::Invalid);
        assert_eq!(WdogSel::from(4), WdogSel::Hclkdiv1024);
        assert_eq!(CalDownSel::Temposc.to_string(), "Temposc");
    }
}
