/*++

Licensed under the Apache-2.0 license.

File Name:

    cmu.rs

Abstract:

    File contains the Series 2 clock management unit peripheral.

--*/

mod regs;
mod topology;

use crate::clock_tree::ClockTree;
use gecko_emu_bus::{Bus, BusError, LockGate, LockGroup, RegisterBank};
use gecko_emu_types::{RvAddr, RvData, RvSize};
use log::debug;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tock_registers::{LocalRegisterCopy, RegisterLongName};
use topology::Nodes;

pub use regs::{LOCK_KEY, WDOGLOCK_KEY};
pub use topology::{Consumer, Oscillator};

/// Collaborator told when software switches SYSCLK to the HFXO.
pub trait HfxoListener {
    fn on_sysclk_select(&self);
}

/// Collaborator that may place demand on a clock it consumes.
pub trait ClockConsumerQuery {
    /// Returns true while the collaborator needs its input clock.
    fn requested(&self) -> bool;
}

/// Per-instance configuration of the CMU.
pub struct CmuConfig {
    /// Output frequency of every oscillator in Hz, indexed by [`Oscillator`].
    pub frequencies: [u64; Oscillator::ALL.len()],

    /// Listener notified on HFXO selection.
    pub hfxo: Option<Weak<dyn HfxoListener>>,

    /// DPLL polled for demand on its reference clock.
    pub dpll: Option<Weak<dyn ClockConsumerQuery>>,
}

impl CmuConfig {
    pub fn with_frequency(mut self, osc: Oscillator, hz: u64) -> Self {
        self.frequencies[osc as usize] = hz;
        self
    }

    pub fn with_hfxo(mut self, hfxo: Weak<dyn HfxoListener>) -> Self {
        self.hfxo = Some(hfxo);
        self
    }

    pub fn with_dpll(mut self, dpll: Weak<dyn ClockConsumerQuery>) -> Self {
        self.dpll = Some(dpll);
        self
    }
}

impl Default for CmuConfig {
    fn default() -> Self {
        Self {
            frequencies: Oscillator::ALL.map(Oscillator::nominal_frequency),
            hfxo: None,
            dpll: None,
        }
    }
}

/// State the register hooks act on.
struct CmuContext {
    tree: ClockTree,
    nodes: Nodes,

    /// CLKEN0.DPLL0
    dpll0_clken: bool,

    /// Last answer of the DPLL collaborator, false without one.
    dpll_requested: bool,

    /// DPLL feedback divider
    dpll_n: u32,

    /// DPLL reference divider
    dpll_m: u32,

    /// Set by a SYSCLKCTRL write selecting HFXO, consumed once the bank is
    /// released.
    hfxo_selected: bool,
}

impl CmuContext {
    fn new(frequencies: &[u64; Oscillator::ALL.len()]) -> Self {
        let (tree, nodes) = topology::build(frequencies);
        Self {
            tree,
            nodes,
            dpll0_clken: false,
            dpll_requested: false,
            hfxo_selected: false,
            dpll_n: 1,
            dpll_m: 1,
        }
    }

    fn set_consumer_enabled(&mut self, consumer: Consumer, enabled: bool) {
        let requested = if consumer == Consumer::Dpll0 {
            self.dpll0_clken = enabled;
            enabled && self.dpll_requested
        } else {
            enabled
        };
        let gate = self.nodes.gate(consumer);
        self.tree.set_gate_requested(gate, requested);
    }

    fn set_dpll_requested(&mut self, requested: bool) {
        if self.dpll_requested != requested {
            self.dpll_requested = requested;
            self.set_consumer_enabled(Consumer::Dpll0, self.dpll0_clken);
        }
    }

    /// Frequency counted by the calibration down counter. An HFXO reference
    /// is seen through the DPLL's N/M ratio.
    fn calibration_down_frequency(&self) -> u64 {
        let down = self.tree.frequency(self.nodes.cal_down_gate);
        let hfxo = self.nodes.source(Oscillator::Hfxo);
        if self.tree.parent(self.nodes.cal_down) != Some(hfxo) {
            return down;
        }
        match self.dpll_m {
            0 => 0,
            m => down.saturating_mul(u64::from(self.dpll_n)) / u64::from(m),
        }
    }

    /// Counter value reached by the down counter after `top` cycles of the up
    /// counter's clock.
    fn calibration_count(&self, top: u32) -> u32 {
        let up = self.tree.frequency(self.nodes.cal_up_gate);
        let down = self.calibration_down_frequency();
        if down == 0 {
            return 0;
        }
        let count = u64::from(top).saturating_mul(up) / down;
        count.min(regs::CALCNT_MAX) as u32
    }
}

struct CmuImpl {
    bank: RegisterBank<CmuContext>,
    ctx: CmuContext,
    frequencies: [u64; Oscillator::ALL.len()],
}

impl CmuImpl {
    fn new(frequencies: [u64; Oscillator::ALL.len()]) -> Self {
        let locks = LockGate::new(&[
            (LockGroup::General, LOCK_KEY),
            (LockGroup::Watchdog, WDOGLOCK_KEY),
        ]);
        Self {
            bank: RegisterBank::new("CMU", regs::registers(), locks),
            ctx: CmuContext::new(&frequencies),
            frequencies,
        }
    }

    fn reset(&mut self) {
        let dpll_requested = self.ctx.dpll_requested;
        self.bank.reset();
        self.ctx = CmuContext::new(&self.frequencies);
        self.ctx.dpll_requested = dpll_requested;
        debug!("CMU: reset");
    }

    fn reg<R: RegisterLongName>(&self, offset: RvAddr) -> LocalRegisterCopy<u32, R> {
        LocalRegisterCopy::new(self.bank.peek(&self.ctx, offset).unwrap_or(0))
    }
}

/// Clock management unit peripheral
#[derive(Clone)]
pub struct Cmu {
    regs: Rc<RefCell<CmuImpl>>,
    hfxo: Option<Weak<dyn HfxoListener>>,
    dpll: Option<Weak<dyn ClockConsumerQuery>>,
}

macro_rules! osc_queries {
    ($($osc:ident => $requested:ident, $enabled:ident;)*) => {
        $(
            #[doc = concat!("Returns true if a consumer needs ", stringify!($osc), ".")]
            pub fn $requested(&self) -> bool {
                self.osc_requested(Oscillator::$osc)
            }

            #[doc = concat!("Returns true if ", stringify!($osc), " is running.")]
            pub fn $enabled(&self) -> bool {
                self.osc_enabled(Oscillator::$osc)
            }
        )*
    };
}

impl Cmu {
    /// Create an instance of the CMU in its reset state
    pub fn new(config: CmuConfig) -> Self {
        Self {
            regs: Rc::new(RefCell::new(CmuImpl::new(config.frequencies))),
            hfxo: config.hfxo,
            dpll: config.dpll,
        }
    }

    /// Restores every register, every lock and the default clock topology.
    pub fn reset(&self) {
        self.regs.borrow_mut().reset();
    }

    /// Re-reads the DPLL's demand. Runs before the register state is borrowed
    /// so the collaborator may query this CMU.
    fn poll_dpll(&self) {
        let Some(dpll) = &self.dpll else {
            return;
        };
        let requested = dpll.upgrade().map_or(false, |dpll| dpll.requested());
        self.regs.borrow_mut().ctx.set_dpll_requested(requested);
    }

    fn notify_hfxo(&self) {
        match self.hfxo.as_ref().and_then(Weak::upgrade) {
            Some(hfxo) => hfxo.on_sysclk_select(),
            None => debug!("CMU: HFXO selected without a listener"),
        }
    }

    pub fn osc_requested(&self, osc: Oscillator) -> bool {
        self.poll_dpll();
        let cmu = self.regs.borrow();
        cmu.ctx.tree.is_requested(cmu.ctx.nodes.source(osc))
    }

    pub fn osc_enabled(&self, osc: Oscillator) -> bool {
        self.poll_dpll();
        let cmu = self.regs.borrow();
        cmu.ctx.tree.is_enabled(cmu.ctx.nodes.source(osc))
    }

    osc_queries! {
        Fsrco => osc_fsrco_requested, osc_fsrco_enabled;
        Hfrcodpll => osc_hfrcodpll_requested, osc_hfrcodpll_enabled;
        Hfrcoem23 => osc_hfrcoem23_requested, osc_hfrcoem23_enabled;
        Hfxo => osc_hfxo_requested, osc_hfxo_enabled;
        Lfxo => osc_lfxo_requested, osc_lfxo_enabled;
        Lfrco => osc_lfrco_requested, osc_lfrco_enabled;
        Ulfrco => osc_ulfrco_requested, osc_ulfrco_enabled;
        Clkin0 => osc_clkin0_requested, osc_clkin0_enabled;
        Hfrcose => osc_hfrcose_requested, osc_hfrcose_enabled;
    }

    /// Returns CLKEN0.DPLL0.
    pub fn osc_dpll_enabled(&self) -> bool {
        self.regs.borrow().ctx.dpll0_clken
    }

    /// Returns true if the consumer's clock is running.
    pub fn consumer_enabled(&self, consumer: Consumer) -> bool {
        self.poll_dpll();
        let cmu = self.regs.borrow();
        cmu.ctx.tree.is_enabled(cmu.ctx.nodes.gate(consumer))
    }

    /// Frequency in Hz delivered to the consumer, 0 if its clock is stopped.
    pub fn consumer_frequency(&self, consumer: Consumer) -> u64 {
        self.poll_dpll();
        let cmu = self.regs.borrow();
        cmu.ctx.tree.frequency(cmu.ctx.nodes.gate(consumer))
    }

    /// Frequency in Hz of the clock tree node called `name`, e.g. `"HCLK"`.
    pub fn clock_frequency(&self, name: &str) -> Option<u64> {
        self.poll_dpll();
        let cmu = self.regs.borrow();
        let node = cmu.ctx.tree.node_by_name(name)?;
        Some(cmu.ctx.tree.frequency(node))
    }

    /// Retunes an oscillator until the next reset.
    pub fn set_osc_frequency(&self, osc: Oscillator, hz: u64) {
        let mut cmu = self.regs.borrow_mut();
        let node = cmu.ctx.nodes.source(osc);
        cmu.ctx.tree.set_source_frequency(node, hz);
    }

    pub fn dpll_n(&self) -> u32 {
        self.regs.borrow().ctx.dpll_n
    }

    pub fn set_dpll_n(&self, n: u32) {
        self.regs.borrow_mut().ctx.dpll_n = n;
    }

    pub fn dpll_m(&self) -> u32 {
        self.regs.borrow().ctx.dpll_m
    }

    pub fn set_dpll_m(&self, m: u32) {
        self.regs.borrow_mut().ctx.dpll_m = m;
    }

    /// Returns true if an enabled interrupt flag is raised.
    pub fn irq_pending(&self) -> bool {
        let cmu = self.regs.borrow();
        let flags = cmu.reg::<regs::Interrupt::Register>(regs::IF).get();
        let enabled = cmu.reg::<regs::Interrupt::Register>(regs::IEN).get();
        flags & enabled != 0
    }
}

impl Default for Cmu {
    fn default() -> Self {
        Self::new(CmuConfig::default())
    }
}

impl Bus for Cmu {
    /// Read data of specified size from given address
    fn read(&mut self, size: RvSize, addr: RvAddr) -> Result<RvData, BusError> {
        self.poll_dpll();
        let cmu = self.regs.borrow();
        cmu.bank.read_sized(&cmu.ctx, size, addr)
    }

    /// Write data of specified size to given address
    fn write(&mut self, size: RvSize, addr: RvAddr, val: RvData) -> Result<(), BusError> {
        self.poll_dpll();
        let hfxo_selected = {
            let mut cmu = self.regs.borrow_mut();
            let CmuImpl { bank, ctx, .. } = &mut *cmu;
            bank.write_sized(ctx, size, addr, val)?;
            std::mem::take(&mut ctx.hfxo_selected)
        };
        if hfxo_selected {
            self.notify_hfxo();
        }
        Ok(())
    }

    fn poll(&mut self) {
        self.poll_dpll();
    }

    fn warm_reset(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::regs::*;
    use super::*;
    use gecko_emu_bus::testing::{capture_logs, Log};
    use gecko_emu_bus::AliasMode;
    use std::cell::Cell;
    use std::fmt::Write;

    const SET: RvAddr = 0x1000;
    const CLEAR: RvAddr = 0x2000;
    const TOGGLE: RvAddr = 0x3000;

    fn read(cmu: &mut Cmu, offset: RvAddr) -> RvData {
        cmu.read(RvSize::Word, offset).unwrap()
    }

    fn write(cmu: &mut Cmu, offset: RvAddr, val: RvData) {
        cmu.write(RvSize::Word, offset, val).unwrap()
    }

    struct FakeHfxo {
        log: Log,
    }

    impl HfxoListener for FakeHfxo {
        fn on_sysclk_select(&self) {
            writeln!(self.log.w(), "sysclk select").unwrap();
        }
    }

    struct FakeDpll {
        requested: Cell<bool>,
    }

    impl ClockConsumerQuery for FakeDpll {
        fn requested(&self) -> bool {
            self.requested.get()
        }
    }

    #[test]
    fn test_reset_defaults() {
        let mut cmu = Cmu::default();
        assert_eq!(read(&mut cmu, IPVERSION), 0x3);
        assert_eq!(read(&mut cmu, SYSCLKCTRL), 0x1);
        assert_eq!(read(&mut cmu, STATUS), 0x1);
        assert_eq!(read(&mut cmu, LOCK), 0);
        assert_eq!(read(&mut cmu, TESTCLKEN), 0xbc);
        assert_eq!(read(&mut cmu, WDOG0CLKCTRL), 0x1);

        assert!(cmu.osc_fsrco_requested());
        assert!(cmu.osc_fsrco_enabled());
        assert!(!cmu.osc_hfrcodpll_requested());
        assert!(!cmu.osc_hfxo_enabled());
        assert!(cmu.consumer_enabled(Consumer::Cpu));
        assert_eq!(cmu.consumer_frequency(Consumer::Cpu), 20_000_000);
        assert_eq!(cmu.dpll_n(), 1);
        assert_eq!(cmu.dpll_m(), 1);
        assert!(!cmu.irq_pending());
    }

    #[test]
    fn test_sysclk_reselection_moves_demand() {
        let mut cmu = Cmu::default();
        write(&mut cmu, SYSCLKCTRL, 0x2);
        assert!(cmu.osc_hfrcodpll_requested());
        assert!(cmu.osc_hfrcodpll_enabled());
        assert!(!cmu.osc_fsrco_requested());
        assert!(cmu.osc_fsrco_enabled());
        assert_eq!(cmu.consumer_frequency(Consumer::Cpu), 19_000_000);

        write(&mut cmu, SYSCLKCTRL, 0x1);
        assert!(!cmu.osc_hfrcodpll_requested());
        assert!(!cmu.osc_hfrcodpll_enabled());
        assert!(cmu.osc_fsrco_requested());
    }

    #[test]
    fn test_reserved_sysclk_selection_stops_cpu() {
        let log = capture_logs();
        let mut cmu = Cmu::default();
        write(&mut cmu, SYSCLKCTRL, 0x0);
        assert_eq!(read(&mut cmu, SYSCLKCTRL), 0x0);
        assert!(!cmu.consumer_enabled(Consumer::Cpu));
        assert!(!cmu.osc_fsrco_requested());
        assert!(log.contains("WARN CMU: SYSCLKCTRL.CLKSEL written with unsupported value 0x0"));
    }

    #[test]
    fn test_locked_ctrl_write_is_dropped() {
        let log = capture_logs();
        let mut cmu = Cmu::default();
        write(&mut cmu, LOCK, 0);
        assert_eq!(read(&mut cmu, STATUS) >> 31, 1);

        write(&mut cmu, CTRL, 0x8000_0000);
        assert_eq!(read(&mut cmu, CTRL), 0);
        assert!(!cmu.osc_clkin0_enabled());
        assert!(log.contains("ERROR CMU: write to CTRL ignored: General lock is engaged"));

        write(&mut cmu, LOCK, LOCK_KEY.into());
        assert_eq!(read(&mut cmu, STATUS) >> 31, 0);
        write(&mut cmu, CTRL, 0x8000_0000);
        assert_eq!(read(&mut cmu, CTRL), 0x8000_0000);
        assert!(cmu.osc_clkin0_enabled());
        assert_eq!(read(&mut cmu, STATUS) & (1 << 17), 1 << 17);
    }

    #[test]
    fn test_lock_alias_write_is_not_a_key_attempt() {
        let mut cmu = Cmu::default();
        write(&mut cmu, SET + LOCK, 0x1);
        assert_eq!(read(&mut cmu, STATUS) >> 31, 0);
        write(&mut cmu, LOCK, 0x1);
        write(&mut cmu, TOGGLE + LOCK, u32::from(LOCK_KEY));
        assert_eq!(read(&mut cmu, STATUS) >> 31, 1);
    }

    #[test]
    fn test_watchdog_lock_is_separate() {
        let mut cmu = Cmu::default();
        write(&mut cmu, WDOGLOCK, u32::from(LOCK_KEY));
        assert_eq!(read(&mut cmu, STATUS) >> 30, 0b01);

        write(&mut cmu, WDOG0CLKCTRL, 0x3);
        assert_eq!(read(&mut cmu, WDOG0CLKCTRL), 0x1);
        write(&mut cmu, SYSCLKCTRL, 0x2);
        assert_eq!(read(&mut cmu, SYSCLKCTRL), 0x2);

        write(&mut cmu, WDOGLOCK, u32::from(WDOGLOCK_KEY));
        write(&mut cmu, WDOG0CLKCTRL, 0x3);
        assert_eq!(read(&mut cmu, WDOG0CLKCTRL), 0x3);
    }

    #[test]
    fn test_clock_enable_aliases() {
        let mut cmu = Cmu::default();
        let timer0 = 1 << 4;
        write(&mut cmu, SET + CLKEN0, timer0);
        assert_eq!(read(&mut cmu, CLKEN0), timer0);
        assert!(cmu.consumer_enabled(Consumer::Timer0));
        assert!(cmu.osc_hfrcodpll_requested());

        write(&mut cmu, CLEAR + CLKEN0, timer0);
        assert_eq!(read(&mut cmu, CLKEN0), 0);
        assert!(!cmu.consumer_enabled(Consumer::Timer0));
        assert!(!cmu.osc_hfrcodpll_requested());

        write(&mut cmu, TOGGLE + CLKEN0, timer0);
        assert!(cmu.consumer_enabled(Consumer::Timer0));
        assert_eq!(
            cmu.consumer_frequency(Consumer::Timer0),
            Oscillator::Hfrcodpll.nominal_frequency()
        );
    }

    #[test]
    fn test_force_enable() {
        let mut cmu = Cmu::default();
        write(&mut cmu, CLKEN0, 1 << 20);
        assert!(cmu.osc_hfxo_enabled());
        assert!(!cmu.osc_hfxo_requested());
        write(&mut cmu, CLEAR + CLKEN0, 1 << 20);
        assert!(!cmu.osc_hfxo_enabled());
    }

    #[test]
    fn test_hfxo_listener() {
        let log = Log::new();
        let hfxo: Rc<dyn HfxoListener> = Rc::new(FakeHfxo { log: log.clone() });
        let mut cmu = Cmu::new(CmuConfig::default().with_hfxo(Rc::downgrade(&hfxo)));

        write(&mut cmu, SYSCLKCTRL, 0x2);
        assert_eq!(log.take(), "");
        write(&mut cmu, SYSCLKCTRL, 0x3);
        assert_eq!(log.take(), "sysclk select\n");
        assert!(cmu.osc_hfxo_requested());
        assert_eq!(cmu.consumer_frequency(Consumer::Cpu), 39_000_000);

        // The notification fires on every write selecting HFXO.
        write(&mut cmu, SET + SYSCLKCTRL, 0x0);
        assert_eq!(log.take(), "sysclk select\n");
    }

    #[test]
    fn test_dpll_demand_is_polled() {
        let dpll = Rc::new(FakeDpll {
            requested: Cell::new(false),
        });
        let query: Rc<dyn ClockConsumerQuery> = dpll.clone();
        let mut cmu = Cmu::new(CmuConfig::default().with_dpll(Rc::downgrade(&query)));

        write(&mut cmu, DPLLREFCLKCTRL, 0x1);
        write(&mut cmu, SET + CLKEN0, 1 << 17);
        assert!(cmu.osc_dpll_enabled());
        assert!(!cmu.osc_hfxo_requested());

        dpll.requested.set(true);
        assert!(cmu.osc_hfxo_requested());
        assert!(cmu.consumer_enabled(Consumer::Dpll0));

        write(&mut cmu, CLEAR + CLKEN0, 1 << 17);
        assert!(!cmu.osc_dpll_enabled());
        assert!(!cmu.osc_hfxo_requested());

        cmu.set_dpll_n(3000);
        cmu.set_dpll_m(1500);
        assert_eq!((cmu.dpll_n(), cmu.dpll_m()), (3000, 1500));
    }

    #[test]
    fn test_bus_poll_refreshes_dpll_demand() {
        let dpll = Rc::new(FakeDpll {
            requested: Cell::new(false),
        });
        let query: Rc<dyn ClockConsumerQuery> = dpll.clone();
        let mut cmu = Cmu::new(CmuConfig::default().with_dpll(Rc::downgrade(&query)));
        write(&mut cmu, DPLLREFCLKCTRL, 0x1);
        write(&mut cmu, CLKEN0, 1 << 17);

        let hfxo_requested = |cmu: &Cmu| {
            let cmu = cmu.regs.borrow();
            cmu.ctx.tree.is_requested(cmu.ctx.nodes.source(Oscillator::Hfxo))
        };
        dpll.requested.set(true);
        assert!(!hfxo_requested(&cmu));
        cmu.poll();
        assert!(hfxo_requested(&cmu));

        dpll.requested.set(false);
        cmu.poll();
        assert!(!hfxo_requested(&cmu));
    }

    #[test]
    fn test_dpll_without_collaborator_requests_nothing() {
        let mut cmu = Cmu::default();
        write(&mut cmu, DPLLREFCLKCTRL, 0x1);
        write(&mut cmu, SET + CLKEN0, 1 << 17);
        assert!(cmu.osc_dpll_enabled());
        assert!(!cmu.consumer_enabled(Consumer::Dpll0));
        assert!(!cmu.osc_hfxo_requested());
    }

    #[test]
    fn test_dropped_dpll_requests_nothing() {
        let query: Rc<dyn ClockConsumerQuery> = Rc::new(FakeDpll {
            requested: Cell::new(true),
        });
        let mut cmu = Cmu::new(CmuConfig::default().with_dpll(Rc::downgrade(&query)));
        write(&mut cmu, DPLLREFCLKCTRL, 0x1);
        write(&mut cmu, CLKEN0, 1 << 17);
        assert!(cmu.osc_hfxo_requested());

        drop(query);
        assert!(!cmu.osc_hfxo_requested());
    }

    #[test]
    fn test_calibration_count() {
        let mut cmu = Cmu::default();
        assert_eq!(read(&mut cmu, CALCNT), 0);

        // CALTOP = 100, UPSEL = FSRCO, DOWNSEL = LFRCO
        write(&mut cmu, CALCTRL, 100 | (8 << 24) | (10 << 28));
        assert!(cmu.osc_lfrco_requested());
        assert_eq!(read(&mut cmu, CALCNT), 100 * 20_000_000 / 32768);

        // Saturates at the counter width.
        write(&mut cmu, CALCTRL, 0xf_ffff | (8 << 24) | (10 << 28));
        assert_eq!(read(&mut cmu, CALCNT), 0xf_ffff);

        write(&mut cmu, IF, 0);
        write(&mut cmu, IEN, 0x1);
        assert!(!cmu.irq_pending());
        write(&mut cmu, CALCMD, 0x1);
        assert_eq!(read(&mut cmu, CALCMD), 0);
        assert_eq!(read(&mut cmu, IF), 0x1);
        assert!(cmu.irq_pending());
    }

    #[test]
    fn test_calibration_against_hfxo_uses_dpll_ratio() {
        let mut cmu = Cmu::default();

        // CALTOP = 39000, UPSEL = FSRCO, DOWNSEL = HFXO
        write(&mut cmu, CALCTRL, 39_000 | (8 << 24) | (3 << 28));
        assert!(cmu.osc_hfxo_requested());
        assert_eq!(read(&mut cmu, CALCNT), 20_000);

        cmu.set_dpll_n(2);
        assert_eq!(read(&mut cmu, CALCNT), 10_000);
        cmu.set_dpll_n(3);
        cmu.set_dpll_m(2);
        assert_eq!(read(&mut cmu, CALCNT), 13_333);
        cmu.set_dpll_m(0);
        assert_eq!(read(&mut cmu, CALCNT), 0);

        // Other references ignore the ratio.
        cmu.set_dpll_m(2);
        write(&mut cmu, CALCTRL, 100 | (8 << 24) | (10 << 28));
        assert_eq!(read(&mut cmu, CALCNT), 100 * 20_000_000 / 32768);
    }

    #[test]
    fn test_calibration_count_saturates_on_huge_frequencies() {
        let config = CmuConfig::default()
            .with_frequency(Oscillator::Fsrco, u64::MAX)
            .with_frequency(Oscillator::Hfxo, u64::MAX);
        let mut cmu = Cmu::new(config);
        write(&mut cmu, CALCTRL, 0xf_ffff | (8 << 24) | (10 << 28));
        assert_eq!(read(&mut cmu, CALCNT), 0xf_ffff);

        // Both products saturate.
        cmu.set_dpll_n(2);
        write(&mut cmu, CALCTRL, 0xf_ffff | (8 << 24) | (3 << 28));
        assert_eq!(read(&mut cmu, CALCNT), 1);
    }

    #[test]
    fn test_trace_clock_demand() {
        let mut cmu = Cmu::default();
        assert_eq!(cmu.clock_frequency("TRACECLK"), Some(20_000_000));

        write(&mut cmu, TRACECLKCTRL, 0x2);
        assert!(cmu.osc_hfrcoem23_requested());
        assert!(cmu.osc_hfrcoem23_enabled());
        assert_eq!(cmu.clock_frequency("TRACECLK"), Some(19_000_000));

        // SYSCLK divided by two
        write(&mut cmu, TRACECLKCTRL, 0x1 | (1 << 4));
        assert!(!cmu.osc_hfrcoem23_requested());
        assert_eq!(cmu.clock_frequency("TRACECLK"), Some(10_000_000));

        write(&mut cmu, TRACECLKCTRL, 0x0);
        assert_eq!(cmu.clock_frequency("TRACECLK"), Some(0));
    }

    #[test]
    fn test_unmodeled_consumer_selections_are_inert() {
        let mut cmu = Cmu::default();
        write(&mut cmu, LCDCLKCTRL, 0x2);
        write(&mut cmu, DAPCLKCTRL, 0x2);
        assert_eq!(read(&mut cmu, LCDCLKCTRL), 0x2);
        assert_eq!(read(&mut cmu, DAPCLKCTRL), 0x2);
        assert!(!cmu.osc_lfxo_requested());
        assert!(!cmu.osc_hfrcodpll_requested());
    }

    #[test]
    fn test_prescalers() {
        let mut cmu = Cmu::default();
        write(&mut cmu, SYSCLKCTRL, 0x1 | (1 << 12));
        assert_eq!(cmu.clock_frequency("HCLK"), Some(10_000_000));
        assert_eq!(cmu.consumer_frequency(Consumer::Cpu), 10_000_000);

        write(&mut cmu, SYSCLKCTRL, 0x1 | (1 << 8) | (1 << 10));
        assert_eq!(cmu.clock_frequency("HCLK"), Some(20_000_000));
        write(&mut cmu, CLKEN0, 1 << 14);
        assert_eq!(cmu.clock_frequency("PCLK"), Some(10_000_000));
        assert_eq!(cmu.consumer_frequency(Consumer::I2c0), 10_000_000);
        assert_eq!(cmu.clock_frequency("NOPE"), None);
    }

    #[test]
    fn test_configured_frequency() {
        let cmu = Cmu::new(CmuConfig::default().with_frequency(Oscillator::Fsrco, 10_000_000));
        assert_eq!(cmu.consumer_frequency(Consumer::Cpu), 10_000_000);

        cmu.set_osc_frequency(Oscillator::Fsrco, 40_000_000);
        assert_eq!(cmu.consumer_frequency(Consumer::Cpu), 40_000_000);
        cmu.reset();
        assert_eq!(cmu.consumer_frequency(Consumer::Cpu), 10_000_000);
    }

    #[test]
    fn test_narrow_accesses() {
        let mut cmu = Cmu::default();
        cmu.write(RvSize::Byte, SYSCLKCTRL + 1, 0x10).unwrap();
        assert_eq!(read(&mut cmu, SYSCLKCTRL), 0x1001);
        assert_eq!(cmu.read(RvSize::HalfWord, SYSCLKCTRL), Ok(0x1001));
        assert_eq!(cmu.read(RvSize::Byte, SYSCLKCTRL + 1), Ok(0x10));
        assert_eq!(
            cmu.write(RvSize::HalfWord, SYSCLKCTRL + 1, 0),
            Err(BusError::StoreAddrMisaligned)
        );
        assert_eq!(
            cmu.read(RvSize::Invalid, SYSCLKCTRL),
            Err(BusError::LoadAccessFault)
        );
    }

    #[test]
    fn test_warm_reset() {
        let mut cmu = Cmu::default();
        write(&mut cmu, SYSCLKCTRL, 0x2);
        write(&mut cmu, CLKEN0, 1 << 4);
        write(&mut cmu, LOCK, 0);
        cmu.set_dpll_n(7);

        cmu.warm_reset();
        assert_eq!(read(&mut cmu, SYSCLKCTRL), 0x1);
        assert_eq!(read(&mut cmu, CLKEN0), 0);
        assert_eq!(read(&mut cmu, STATUS), 0x1);
        assert!(cmu.osc_fsrco_requested());
        assert!(!cmu.osc_hfrcodpll_requested());
        assert!(!cmu.consumer_enabled(Consumer::Timer0));
        assert_eq!(cmu.dpll_n(), 1);
    }

    #[test]
    fn test_shared_handle() {
        let mut cmu = Cmu::default();
        let sibling = cmu.clone();
        write(&mut cmu, SYSCLKCTRL, 0x2);
        assert!(sibling.osc_hfrcodpll_requested());
        assert_eq!(AliasMode::decode(SET + SYSCLKCTRL), (SYSCLKCTRL, AliasMode::Set));
    }
}
