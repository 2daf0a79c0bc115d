/*++

Licensed under the Apache-2.0 license.

File Name:

    topology.rs

Abstract:

    File contains the fixed clock tree of the Series 2 clock management
    unit, built in its reset configuration.

--*/

use super::regs::{
    CalDownSel, CalUpSel, ClkoutSel, DapSel, DpllRefSel, Em01GrpSel, Eusart0Sel, IadcSel,
    LesenseHfSel, LfGrpSel, Pcnt0Sel, SeclkSel, SynthSel, SysclkSel, TraceclkSel, VdacSel,
    WdogSel,
};
use crate::clock_tree::{ClockTree, NodeId};

/// Clock sources of the unit.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Oscillator {
    Fsrco,
    Hfrcodpll,
    Hfrcoem23,
    Hfxo,
    Lfxo,
    Lfrco,
    Ulfrco,
    Clkin0,
    Hfrcose,
}

impl Oscillator {
    pub const ALL: [Oscillator; 9] = [
        Oscillator::Fsrco,
        Oscillator::Hfrcodpll,
        Oscillator::Hfrcoem23,
        Oscillator::Hfxo,
        Oscillator::Lfxo,
        Oscillator::Lfrco,
        Oscillator::Ulfrco,
        Oscillator::Clkin0,
        Oscillator::Hfrcose,
    ];

    /// Frequency in Hz used when the configuration does not override it.
    pub fn nominal_frequency(self) -> u64 {
        match self {
            Oscillator::Fsrco => 20_000_000,
            Oscillator::Hfrcodpll => 19_000_000,
            Oscillator::Hfrcoem23 => 19_000_000,
            Oscillator::Hfxo => 39_000_000,
            Oscillator::Lfxo => 32_768,
            Oscillator::Lfrco => 32_768,
            Oscillator::Ulfrco => 1_000,
            Oscillator::Clkin0 => 0,
            Oscillator::Hfrcose => 19_000_000,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Oscillator::Fsrco => "FSRCO",
            Oscillator::Hfrcodpll => "HFRCODPLL",
            Oscillator::Hfrcoem23 => "HFRCOEM23",
            Oscillator::Hfxo => "HFXO",
            Oscillator::Lfxo => "LFXO",
            Oscillator::Lfrco => "LFRCO",
            Oscillator::Ulfrco => "ULFRCO",
            Oscillator::Clkin0 => "CLKIN0",
            Oscillator::Hfrcose => "HFRCOSE",
        }
    }
}

/// Peripherals whose clock goes through a CMU enable gate.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Consumer {
    Cpu,
    Timer0,
    Timer1,
    Timer2,
    Timer3,
    Timer4,
    Usart0,
    Iadc0,
    Letimer0,
    Wdog0,
    Wdog1,
    I2c0,
    I2c1,
    Dpll0,
    Burtc,
    Sysrtc0,
    Eusart0,
    Eusart1,
    Vdac0,
    Vdac1,
    Pcnt0,
    Synth,
}

impl Consumer {
    pub const ALL: [Consumer; 22] = [
        Consumer::Cpu,
        Consumer::Timer0,
        Consumer::Timer1,
        Consumer::Timer2,
        Consumer::Timer3,
        Consumer::Timer4,
        Consumer::Usart0,
        Consumer::Iadc0,
        Consumer::Letimer0,
        Consumer::Wdog0,
        Consumer::Wdog1,
        Consumer::I2c0,
        Consumer::I2c1,
        Consumer::Dpll0,
        Consumer::Burtc,
        Consumer::Sysrtc0,
        Consumer::Eusart0,
        Consumer::Eusart1,
        Consumer::Vdac0,
        Consumer::Vdac1,
        Consumer::Pcnt0,
        Consumer::Synth,
    ];
}

/// Handles to the nodes the register hooks and queries need.
pub(super) struct Nodes {
    sources: [NodeId; Oscillator::ALL.len()],
    gates: [NodeId; Consumer::ALL.len()],
    pub sysclk: NodeId,
    pub hclk: NodeId,
    pub pclk: NodeId,
    pub lspclk: NodeId,
    pub hfexpclk: NodeId,
    pub traceclk: NodeId,
    pub trace: NodeId,
    pub seclk: NodeId,
    pub clkout: [NodeId; 3],
    pub cal_up: NodeId,
    pub cal_down: NodeId,
    pub cal_up_gate: NodeId,
    pub cal_down_gate: NodeId,
    pub dpllref: NodeId,
    pub em01grpa: NodeId,
    pub em01grpc: NodeId,
    pub em23grpa: NodeId,
    pub em4grpa: NodeId,
    pub iadc: NodeId,
    pub wdog0: NodeId,
    pub wdog1: NodeId,
    pub eusart0: NodeId,
    pub synth: NodeId,
    pub sysrtc: NodeId,
    pub lcd: NodeId,
    pub vdac0: NodeId,
    pub vdac1: NodeId,
    pub pcnt0: NodeId,
    pub dap: NodeId,
    pub lesensehf: NodeId,
}

impl Nodes {
    pub fn source(&self, osc: Oscillator) -> NodeId {
        self.sources[osc as usize]
    }

    pub fn gate(&self, consumer: Consumer) -> NodeId {
        self.gates[consumer as usize]
    }
}

fn sel<T: Into<u32>>(encoding: T, node: NodeId) -> (u32, Option<NodeId>) {
    (encoding.into(), Some(node))
}

/// Builds the tree in the state matching the register reset values.
pub(super) fn build(frequencies: &[u64; Oscillator::ALL.len()]) -> (ClockTree, Nodes) {
    let mut tree = ClockTree::new();

    let sources = Oscillator::ALL.map(|osc| {
        let hz = frequencies[osc as usize];
        if osc == Oscillator::Fsrco {
            tree.add_always_on_source(osc.name(), hz)
        } else {
            tree.add_source(osc.name(), hz)
        }
    });
    let src = |osc: Oscillator| sources[osc as usize];

    let sysclk = tree.add_mux(
        "SYSCLK",
        &[
            sel(SysclkSel::Fsrco, src(Oscillator::Fsrco)),
            sel(SysclkSel::Hfrcodpll, src(Oscillator::Hfrcodpll)),
            sel(SysclkSel::Hfxo, src(Oscillator::Hfxo)),
            sel(SysclkSel::Clkin0, src(Oscillator::Clkin0)),
        ],
        SysclkSel::Fsrco.into(),
    );
    let hclk = tree.add_divider("HCLK", sysclk, 1);
    let pclk = tree.add_divider("PCLK", hclk, 1);
    let lspclk = tree.add_divider("LSPCLK", pclk, 2);
    let hclkdiv1024 = tree.add_divider("HCLKDIV1024", hclk, 1024);
    let hfexpclk = tree.add_divider("HFEXPCLK", sysclk, 1);

    let trace = tree.add_mux(
        "TRACECLKSEL",
        &[
            sel(TraceclkSel::Sysclk, sysclk),
            sel(TraceclkSel::Hfrcoem23, src(Oscillator::Hfrcoem23)),
            sel(TraceclkSel::Hfrcodpllrt, src(Oscillator::Hfrcodpll)),
        ],
        TraceclkSel::Sysclk.into(),
    );
    let traceclk = tree.add_divider("TRACECLK", trace, 1);
    tree.add_gate("TRACE", traceclk, true);

    // The SE, LCD, DAP and LESENSE consumers are not modeled: SECLK, LCDCLK,
    // DAPCLK and LESENSEHFCLK hold a selection but place no demand.

    let seclk = tree.add_mux(
        "SECLK",
        &[
            sel(SeclkSel::Fsrco, src(Oscillator::Fsrco)),
            sel(SeclkSel::Hfrcose, src(Oscillator::Hfrcose)),
        ],
        SeclkSel::Fsrco.into(),
    );

    let clkout_inputs = [
        sel(ClkoutSel::Hclk, hclk),
        sel(ClkoutSel::Hfexpclk, hfexpclk),
        sel(ClkoutSel::Ulfrco, src(Oscillator::Ulfrco)),
        sel(ClkoutSel::Lfrco, src(Oscillator::Lfrco)),
        sel(ClkoutSel::Lfxo, src(Oscillator::Lfxo)),
        sel(ClkoutSel::Hfrcodpll, src(Oscillator::Hfrcodpll)),
        sel(ClkoutSel::Hfxo, src(Oscillator::Hfxo)),
        sel(ClkoutSel::Fsrco, src(Oscillator::Fsrco)),
        sel(ClkoutSel::Hfrcoem23, src(Oscillator::Hfrcoem23)),
    ];
    let clkout = [
        ("CLKOUT0SEL", "CLKOUT0"),
        ("CLKOUT1SEL", "CLKOUT1"),
        ("CLKOUT2SEL", "CLKOUT2"),
    ]
    .map(|(mux_name, pin_name)| {
        let mux = tree.add_mux(mux_name, &clkout_inputs, ClkoutSel::Disabled.into());
        tree.add_gate(pin_name, mux, true);
        mux
    });

    let cal_up = tree.add_mux(
        "CALUPSEL",
        &[
            sel(CalUpSel::Hfxo, src(Oscillator::Hfxo)),
            sel(CalUpSel::Lfxo, src(Oscillator::Lfxo)),
            sel(CalUpSel::Hfrcodpll, src(Oscillator::Hfrcodpll)),
            sel(CalUpSel::Hfrcoem23, src(Oscillator::Hfrcoem23)),
            sel(CalUpSel::Fsrco, src(Oscillator::Fsrco)),
            sel(CalUpSel::Lfrco, src(Oscillator::Lfrco)),
            sel(CalUpSel::Ulfrco, src(Oscillator::Ulfrco)),
            sel(CalUpSel::Hfrcose, src(Oscillator::Hfrcose)),
        ],
        CalUpSel::Disabled.into(),
    );
    let cal_up_gate = tree.add_gate("CALUP", cal_up, true);
    let cal_down = tree.add_mux(
        "CALDOWNSEL",
        &[
            sel(CalDownSel::Hclk, hclk),
            sel(CalDownSel::Hfxo, src(Oscillator::Hfxo)),
            sel(CalDownSel::Lfxo, src(Oscillator::Lfxo)),
            sel(CalDownSel::Hfrcodpll, src(Oscillator::Hfrcodpll)),
            sel(CalDownSel::Hfrcoem23, src(Oscillator::Hfrcoem23)),
            sel(CalDownSel::Fsrco, src(Oscillator::Fsrco)),
            sel(CalDownSel::Lfrco, src(Oscillator::Lfrco)),
            sel(CalDownSel::Ulfrco, src(Oscillator::Ulfrco)),
            sel(CalDownSel::Hfrcose, src(Oscillator::Hfrcose)),
        ],
        CalDownSel::Disabled.into(),
    );
    let cal_down_gate = tree.add_gate("CALDOWN", cal_down, true);

    let dpllref = tree.add_mux(
        "DPLLREFCLK",
        &[
            sel(DpllRefSel::Hfxo, src(Oscillator::Hfxo)),
            sel(DpllRefSel::Lfxo, src(Oscillator::Lfxo)),
            sel(DpllRefSel::Clkin0, src(Oscillator::Clkin0)),
        ],
        DpllRefSel::Disabled.into(),
    );

    let em01_inputs = [
        sel(Em01GrpSel::Hfrcodpll, src(Oscillator::Hfrcodpll)),
        sel(Em01GrpSel::Hfxo, src(Oscillator::Hfxo)),
        sel(Em01GrpSel::Fsrco, src(Oscillator::Fsrco)),
        sel(Em01GrpSel::Hfrcoem23, src(Oscillator::Hfrcoem23)),
        sel(Em01GrpSel::Hfrcodpllrt, src(Oscillator::Hfrcodpll)),
        sel(Em01GrpSel::Hfxort, src(Oscillator::Hfxo)),
    ];
    let em01grpa = tree.add_mux("EM01GRPACLK", &em01_inputs, Em01GrpSel::Hfrcodpll.into());
    let em01grpc = tree.add_mux("EM01GRPCCLK", &em01_inputs, Em01GrpSel::Hfrcodpll.into());

    let lf_inputs = [
        sel(LfGrpSel::Lfrco, src(Oscillator::Lfrco)),
        sel(LfGrpSel::Lfxo, src(Oscillator::Lfxo)),
        sel(LfGrpSel::Ulfrco, src(Oscillator::Ulfrco)),
    ];
    let em23grpa = tree.add_mux("EM23GRPACLK", &lf_inputs, LfGrpSel::Lfrco.into());
    let em4grpa = tree.add_mux("EM4GRPACLK", &lf_inputs, LfGrpSel::Lfrco.into());
    let sysrtc = tree.add_mux("SYSRTCCLK", &lf_inputs, LfGrpSel::Lfrco.into());
    let lcd = tree.add_mux("LCDCLK", &lf_inputs, LfGrpSel::Lfrco.into());

    let iadc = tree.add_mux(
        "IADCCLK",
        &[
            sel(IadcSel::Em01grpaclk, em01grpa),
            sel(IadcSel::Fsrco, src(Oscillator::Fsrco)),
            sel(IadcSel::Hfrcoem23, src(Oscillator::Hfrcoem23)),
        ],
        IadcSel::Em01grpaclk.into(),
    );

    let wdog_inputs = [
        sel(WdogSel::Lfrco, src(Oscillator::Lfrco)),
        sel(WdogSel::Lfxo, src(Oscillator::Lfxo)),
        sel(WdogSel::Ulfrco, src(Oscillator::Ulfrco)),
        sel(WdogSel::Hclkdiv1024, hclkdiv1024),
    ];
    let wdog0 = tree.add_mux("WDOG0CLK", &wdog_inputs, WdogSel::Lfrco.into());
    let wdog1 = tree.add_mux("WDOG1CLK", &wdog_inputs, WdogSel::Lfrco.into());

    let eusart0 = tree.add_mux(
        "EUSART0CLK",
        &[
            sel(Eusart0Sel::Em01grpcclk, em01grpc),
            sel(Eusart0Sel::Hfrcoem23, src(Oscillator::Hfrcoem23)),
            sel(Eusart0Sel::Lfrco, src(Oscillator::Lfrco)),
            sel(Eusart0Sel::Lfxo, src(Oscillator::Lfxo)),
        ],
        Eusart0Sel::Em01grpcclk.into(),
    );

    let synth = tree.add_mux(
        "SYNTHCLK",
        &[
            sel(SynthSel::Hfxo, src(Oscillator::Hfxo)),
            sel(SynthSel::Clkin0, src(Oscillator::Clkin0)),
        ],
        SynthSel::Hfxo.into(),
    );

    let vdac_inputs = [
        sel(VdacSel::Em01grpaclk, em01grpa),
        sel(VdacSel::Em23grpaclk, em23grpa),
        sel(VdacSel::Fsrco, src(Oscillator::Fsrco)),
        sel(VdacSel::Hfrcoem23, src(Oscillator::Hfrcoem23)),
    ];
    let vdac0 = tree.add_mux("VDAC0CLK", &vdac_inputs, VdacSel::Em01grpaclk.into());
    let vdac1 = tree.add_mux("VDAC1CLK", &vdac_inputs, VdacSel::Em01grpaclk.into());

    // PCNTS0 is a pin input and is not modeled.
    let pcnt0 = tree.add_mux(
        "PCNT0CLK",
        &[sel(Pcnt0Sel::Em23grpaclk, em23grpa)],
        Pcnt0Sel::Em23grpaclk.into(),
    );

    let dap = tree.add_mux(
        "DAPCLK",
        &[
            sel(DapSel::Fsrco, src(Oscillator::Fsrco)),
            sel(DapSel::Hfrcodpll, src(Oscillator::Hfrcodpll)),
        ],
        DapSel::Fsrco.into(),
    );
    let lesensehf = tree.add_mux(
        "LESENSEHFCLK",
        &[
            sel(LesenseHfSel::Fsrco, src(Oscillator::Fsrco)),
            sel(LesenseHfSel::Hfrcoem23, src(Oscillator::Hfrcoem23)),
        ],
        LesenseHfSel::Fsrco.into(),
    );

    let gates = Consumer::ALL.map(|consumer| {
        let (name, parent) = match consumer {
            Consumer::Cpu => ("CPU", hclk),
            Consumer::Timer0 => ("TIMER0", em01grpa),
            Consumer::Timer1 => ("TIMER1", em01grpa),
            Consumer::Timer2 => ("TIMER2", em01grpa),
            Consumer::Timer3 => ("TIMER3", em01grpa),
            Consumer::Timer4 => ("TIMER4", em01grpa),
            Consumer::Usart0 => ("USART0", em01grpc),
            Consumer::Iadc0 => ("IADC0", iadc),
            Consumer::Letimer0 => ("LETIMER0", em23grpa),
            Consumer::Wdog0 => ("WDOG0", wdog0),
            Consumer::Wdog1 => ("WDOG1", wdog1),
            Consumer::I2c0 => ("I2C0", lspclk),
            Consumer::I2c1 => ("I2C1", pclk),
            Consumer::Dpll0 => ("DPLL0", dpllref),
            Consumer::Burtc => ("BURTC", em4grpa),
            Consumer::Sysrtc0 => ("SYSRTC0", sysrtc),
            Consumer::Eusart0 => ("EUSART0", eusart0),
            Consumer::Eusart1 => ("EUSART1", em01grpc),
            Consumer::Vdac0 => ("VDAC0", vdac0),
            Consumer::Vdac1 => ("VDAC1", vdac1),
            Consumer::Pcnt0 => ("PCNT0", pcnt0),
            Consumer::Synth => ("SYNTH", synth),
        };
        tree.add_gate(name, parent, consumer == Consumer::Cpu)
    });

    let nodes = Nodes {
        sources,
        gates,
        sysclk,
        hclk,
        pclk,
        lspclk,
        hfexpclk,
        traceclk,
        trace,
        seclk,
        clkout,
        cal_up,
        cal_down,
        cal_up_gate,
        cal_down_gate,
        dpllref,
        em01grpa,
        em01grpc,
        em23grpa,
        em4grpa,
        iadc,
        wdog0,
        wdog1,
        eusart0,
        synth,
        sysrtc,
        lcd,
        vdac0,
        vdac1,
        pcnt0,
        dap,
        lesensehf,
    };
    (tree, nodes)
}
