//! The processor instance and its fetch-decode-execute loop.
//!
//! A [`Cpu`] is exclusively owned by whoever drives its run loop; the only
//! cross-thread signal into a running loop is the console-escape flag, an
//! atomic the host can set at any time and the loop samples at one defined
//! point per cycle. Everything else a front end wants (register pokes,
//! breakpoint changes) happens between `run` calls through the state
//! accessors.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, trace};

use crate::addr::Address;
use crate::bus::IoBus;
use crate::decode::{DecodedInstruction, Decoder, Radix};
use crate::execute::{execute, Flow};
use crate::fault::CpuError;
use crate::interrupt;
use crate::memory::MemoryBus;
use crate::state::CpuState;

/// Default bound on indirection-chain hops.
pub const DEFAULT_INDIRECTION_LIMIT: u32 = 64;

/// Immutable per-instance configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuConfig {
    /// Hop bound for indirection chains; exceeding it is a fatal error.
    pub indirection_limit: u32,
    /// Radix used for disassembly text.
    pub radix: Radix,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            indirection_limit: DEFAULT_INDIRECTION_LIMIT,
            radix: Radix::Octal,
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The program counter hit a breakpoint before executing.
    Breakpoint(u32),
    /// The console-escape flag was raised by another thread.
    ConsoleEscape,
    /// A HALT instruction retired.
    Halted,
    /// Decode or execution failed.
    Failed(CpuError),
}

/// Per-run options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Produce disassembly text for each executed instruction.
    pub disassemble: bool,
    /// Physical addresses that stop the loop before execution.
    pub breakpoints: HashSet<u32>,
}

/// Outcome of a run: the stop condition, its human-readable detail, and the
/// per-mnemonic execution histogram accumulated so far.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Why the loop returned.
    pub stop: StopReason,
    /// Detail text for post-mortem display.
    pub detail: String,
    /// Executed-instruction frequencies.
    pub instr_counts: BTreeMap<&'static str, u64>,
}

/// One emulated processor.
pub struct Cpu {
    state: CpuState,
    decoder: Decoder,
    config: CpuConfig,
    escape: Arc<AtomicBool>,
    boot_device: Option<u8>,
}

impl Cpu {
    /// Builds a processor, constructing its classifier lookup once.
    #[must_use]
    pub fn new(config: CpuConfig) -> Self {
        Self {
            state: CpuState::default(),
            decoder: Decoder::new(),
            config,
            escape: Arc::new(AtomicBool::new(false)),
            boot_device: None,
        }
    }

    /// The register block.
    #[must_use]
    pub const fn state(&self) -> &CpuState {
        &self.state
    }

    /// Mutable access to the register block, for front-end pokes between
    /// runs.
    pub const fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    /// The configuration this processor was built with.
    #[must_use]
    pub const fn config(&self) -> &CpuConfig {
        &self.config
    }

    /// A handle to the console-escape flag. Setting it from any thread
    /// stops the run loop at its next cycle boundary.
    #[must_use]
    pub fn escape_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.escape)
    }

    /// Restores power-on state.
    pub fn reset(&mut self) {
        info!("processor reset");
        self.state.reset();
        self.escape.store(false, Ordering::Release);
    }

    /// Resets and arranges to start at `entry_pc`, remembering the device
    /// the bootstrap came from for the host's benefit.
    pub fn boot(&mut self, device: u8, entry_pc: u32) {
        self.reset();
        self.boot_device = Some(device);
        self.state.set_pc(Address::from_phys(entry_pc));
        info!("boot from device {device:#o} at {entry_pc:#o}");
    }

    /// The device the last boot used, if any.
    #[must_use]
    pub const fn boot_device(&self) -> Option<u8> {
        self.boot_device
    }

    /// Classifies and decodes the instruction at the current program
    /// counter without executing it.
    ///
    /// # Errors
    ///
    /// Decode failures and operand-fetch faults, as [`CpuError`].
    pub fn decode_current(
        &self,
        mem: &dyn MemoryBus,
        disassemble: bool,
    ) -> Result<DecodedInstruction, CpuError> {
        let pc = self.state.pc();
        let opcode = mem
            .try_read_word(pc.phys())
            .ok_or(CpuError::MemoryFault { addr: pc.phys() })?;
        // Ring privileges only bind once translation is on; an unmapped
        // machine runs with the full legacy instruction set.
        let lef_mode = self.state.atu_on() && self.state.lef_mode();
        let io_on = !self.state.atu_on() || self.state.io_allowed();
        self.decoder.decode(
            opcode,
            pc,
            lef_mode,
            io_on,
            disassemble,
            self.config.radix,
            mem,
        )
    }

    /// Executes one already-decoded instruction, advancing the program
    /// counter. Stack faults and interrupts are handled internally and do
    /// not surface here.
    ///
    /// # Errors
    ///
    /// [`CpuError::Unimplemented`] and the handlers' fatal conditions.
    pub fn execute_one(
        &mut self,
        instr: &DecodedInstruction,
        mem: &mut dyn MemoryBus,
        bus: &mut dyn IoBus,
    ) -> Result<(), CpuError> {
        execute(
            &mut self.state,
            mem,
            bus,
            self.config.indirection_limit,
            instr,
        )
        .map(|_| ())
    }

    /// Runs the fetch-decode-execute loop until a stop condition.
    ///
    /// Stop conditions: a matched breakpoint, the console-escape flag, a
    /// retired HALT, decode failure, or execution failure. The report
    /// carries the per-instruction histogram accumulated up to the stop.
    pub fn run(
        &mut self,
        mem: &mut dyn MemoryBus,
        bus: &mut dyn IoBus,
        options: &RunOptions,
    ) -> RunReport {
        let mut counts: BTreeMap<&'static str, u64> = BTreeMap::new();
        let limit = self.config.indirection_limit;

        loop {
            // The one defined cross-thread cancellation point per cycle.
            if self.escape.swap(false, Ordering::AcqRel) {
                return report(StopReason::ConsoleEscape, "console escape", counts);
            }

            let pc = self.state.pc().phys();
            if options.breakpoints.contains(&pc) {
                debug!("breakpoint at {pc:#o}");
                return report(StopReason::Breakpoint(pc), "breakpoint", counts);
            }

            let instr = match self.decode_current(mem, options.disassemble) {
                Ok(instr) => instr,
                Err(err) => {
                    return report(StopReason::Failed(err.clone()), &err.to_string(), counts);
                }
            };
            if let Some(text) = &instr.text {
                trace!("{pc:#o}: {text}");
            }

            let flow = match execute(&mut self.state, mem, bus, limit, &instr) {
                Ok(flow) => flow,
                Err(err) => {
                    return report(StopReason::Failed(err.clone()), &err.to_string(), counts);
                }
            };
            *counts.entry(instr.mnemonic).or_insert(0) += 1;

            if flow == Flow::Halt {
                return report(StopReason::Halted, "halted", counts);
            }

            if let Err(err) = interrupt::poll(&mut self.state, mem, bus, limit) {
                return report(StopReason::Failed(err.clone()), &err.to_string(), counts);
            }
        }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new(CpuConfig::default())
    }
}

fn report(stop: StopReason, detail: &str, counts: BTreeMap<&'static str, u64>) -> RunReport {
    RunReport {
        stop,
        detail: detail.to_string(),
        instr_counts: counts,
    }
}

#[cfg(test)]
mod tests {
    use super::{Cpu, CpuConfig, RunOptions, StopReason};
    use crate::bus::NullBus;
    use crate::memory::{FlatMemory, MemoryBus};

    /// HALT encodes as DOC 0,CPU.
    const HALT: u16 = 0x663F;

    #[test]
    fn run_stops_cleanly_on_halt() {
        let mut cpu = Cpu::default();
        let mut mem = FlatMemory::new(0x1000);
        let mut bus = NullBus;
        // LDA 0 0; HALT.
        mem.load(0, &[0o020000, HALT]);
        let run = cpu.run(&mut mem, &mut bus, &RunOptions::default());
        assert_eq!(run.stop, StopReason::Halted);
        assert_eq!(run.instr_counts.get("LDA"), Some(&1));
        assert_eq!(run.instr_counts.get("HALT"), Some(&1));
        assert_eq!(cpu.state().pc().phys(), 2);
    }

    #[test]
    fn run_stops_on_breakpoints_before_executing() {
        let mut cpu = Cpu::default();
        let mut mem = FlatMemory::new(0x1000);
        let mut bus = NullBus;
        mem.load(0, &[0o020000, 0o020000, HALT]);
        let mut options = RunOptions::default();
        options.breakpoints.insert(1);
        let run = cpu.run(&mut mem, &mut bus, &options);
        assert_eq!(run.stop, StopReason::Breakpoint(1));
        assert_eq!(run.instr_counts.get("LDA"), Some(&1));
    }

    #[test]
    fn run_reports_decode_failures_with_the_histogram_so_far() {
        let mut cpu = Cpu::default();
        let mut mem = FlatMemory::new(0x1000);
        let mut bus = NullBus;
        // MUL's slot with accumulator bits set matches nothing: the legacy
        // entry declines the reserved tail and the extended entry is fully
        // fixed.
        mem.load(0, &[0o020000, 0xA4B8]);
        let run = cpu.run(&mut mem, &mut bus, &RunOptions::default());
        assert!(matches!(run.stop, StopReason::Failed(_)));
        assert!(run.detail.contains("no instruction"));
        assert_eq!(run.instr_counts.get("LDA"), Some(&1));
    }

    #[test]
    fn escape_flag_stops_the_loop() {
        let mut cpu = Cpu::default();
        let mut mem = FlatMemory::new(64);
        let mut bus = NullBus;
        cpu.escape_handle().store(true, std::sync::atomic::Ordering::Release);
        let run = cpu.run(&mut mem, &mut bus, &RunOptions::default());
        assert_eq!(run.stop, StopReason::ConsoleEscape);
    }

    #[test]
    fn boot_resets_and_sets_the_entry_point() {
        let mut cpu = Cpu::new(CpuConfig::default());
        cpu.state_mut().set_ac(0, 7);
        cpu.boot(0o27, 0o400);
        assert_eq!(cpu.state().ac(0), 0);
        assert_eq!(cpu.state().pc().phys(), 0o400);
        assert_eq!(cpu.boot_device(), Some(0o27));
    }
}
