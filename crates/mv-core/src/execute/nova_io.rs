//! Legacy programmed-I/O handlers, including the CPU pseudo-device.
//!
//! Three device-77 operations never reach the bus: READS (console data
//! switches), INTA (acknowledge the highest-priority interrupt) and IORST
//! (global I/O reset). The rest route to the bus collaborator by device
//! number; every bus call is a non-blocking register poke.

use log::debug;

use super::helpers::unimplemented;
use super::Flow;
use crate::bus::{IoBus, IoReg, IoTest, DEV_CPU};
use crate::decode::{DecodedInstruction, OperandPayload};
use crate::fault::CpuError;
use crate::state::CpuState;

pub fn execute(
    state: &mut CpuState,
    bus: &mut dyn IoBus,
    instr: &DecodedInstruction,
) -> Result<Flow, CpuError> {
    match (instr.mnemonic, instr.payload) {
        ("INTEN", OperandPayload::Implicit) => {
            state.set_ion(true);
            Ok(Flow::Advance)
        }
        ("INTDS", OperandPayload::Implicit) => {
            state.set_ion(false);
            Ok(Flow::Advance)
        }
        ("READS", OperandPayload::CpuAcc { ac }) => {
            state.set_ac16(usize::from(ac), state.switches());
            Ok(Flow::Advance)
        }
        ("INTA", OperandPayload::CpuAcc { ac }) => {
            let device = bus.highest_priority_interrupt().unwrap_or(0);
            state.set_ac16(usize::from(ac), u16::from(device));
            Ok(Flow::Advance)
        }
        ("MSKO", OperandPayload::CpuAcc { ac }) => {
            bus.set_irq_mask(state.ac16(usize::from(ac)));
            Ok(Flow::Advance)
        }
        ("IORST", OperandPayload::Implicit) => {
            debug!("global I/O reset");
            bus.set_irq_mask(0);
            bus.reset_all_io_devices();
            Ok(Flow::Advance)
        }
        ("HALT", OperandPayload::Implicit) => Ok(Flow::Halt),
        ("NIO", OperandPayload::IoFlags { flag, device }) => {
            if device != DEV_CPU && bus.is_attached(device) {
                bus.data_out(device, 0, IoReg::None, flag);
            }
            Ok(Flow::Advance)
        }
        (_, OperandPayload::IoData { ac, reg, out, flag, device }) => {
            if out {
                bus.data_out(device, state.ac16(usize::from(ac)), reg, flag);
            } else {
                let value = if bus.is_attached(device) {
                    bus.data_in(device, reg, flag)
                } else {
                    0
                };
                state.set_ac16(usize::from(ac), value);
            }
            Ok(Flow::Advance)
        }
        (_, OperandPayload::IoTestDev { test, device }) => {
            let (busy, done) = if device == DEV_CPU {
                // The CPU pseudo-device's Busy flag is the interrupt-on
                // state; its Done flag never sets.
                (state.ion(), false)
            } else {
                (bus.busy(device), bus.done(device))
            };
            let skip = match test {
                IoTest::BusySet => busy,
                IoTest::BusyClear => !busy,
                IoTest::DoneSet => done,
                IoTest::DoneClear => !done,
            };
            Ok(if skip { Flow::Skip } else { Flow::Advance })
        }
        _ => Err(unimplemented(instr)),
    }
}
