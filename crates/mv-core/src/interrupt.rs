//! Interrupt controller.
//!
//! One polling point per fetch-decode-execute cycle, after execution. No
//! instruction straddles the check: the bus's interrupt line is sampled,
//! and when it is up with interrupts enabled the controller disables
//! further interrupts, acknowledges the line, saves the program counter at
//! physical location 0 and vectors through the (indirectable) cell at
//! physical location 1.

use log::debug;

use crate::addr::Address;
use crate::bus::IoBus;
use crate::fault::CpuError;
use crate::memory::MemoryBus;
use crate::resolve::resolve_vector_word;
use crate::state::CpuState;

/// Physical word that receives the interrupted program counter.
pub const SAVED_PC_LOC: u32 = 0;
/// Physical word holding the interrupt service vector.
pub const VECTOR_LOC: u32 = 1;

/// Polls the interrupt line; returns whether control was redirected.
///
/// # Errors
///
/// [`CpuError::IndirectionLimit`] when the vector's indirection chain
/// exceeds `limit`.
pub fn poll(
    state: &mut CpuState,
    mem: &mut dyn MemoryBus,
    bus: &mut dyn IoBus,
    limit: u32,
) -> Result<bool, CpuError> {
    if !state.ion() || !bus.irq_pending() {
        return Ok(false);
    }

    state.set_ion(false);
    if let Some(device) = bus.highest_priority_interrupt() {
        debug!("interrupt from device {device:#o}");
        bus.clear_interrupt(device);
    }

    mem.write_word(SAVED_PC_LOC, (state.pc().offset() & 0x7FFF) as u16);
    let target = resolve_vector_word(state, mem, limit, VECTOR_LOC)?;
    state.set_pc(Address::from_phys(target));
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::{poll, SAVED_PC_LOC, VECTOR_LOC};
    use crate::addr::Address;
    use crate::bus::{IoBus, IoFlag, IoReg, NullBus};
    use crate::memory::{FlatMemory, MemoryBus};
    use crate::state::CpuState;

    /// A bus with one permanently pending interrupt line.
    struct PendingBus {
        cleared: Option<u8>,
    }

    impl IoBus for PendingBus {
        fn data_in(&mut self, _d: u8, _r: IoReg, _f: IoFlag) -> u16 {
            0
        }
        fn data_out(&mut self, _d: u8, _v: u16, _r: IoReg, _f: IoFlag) {}
        fn is_attached(&self, _d: u8) -> bool {
            true
        }
        fn is_io_device(&self, _d: u8) -> bool {
            true
        }
        fn busy(&self, _d: u8) -> bool {
            false
        }
        fn done(&self, _d: u8) -> bool {
            true
        }
        fn send_interrupt(&mut self, _d: u8) {}
        fn clear_interrupt(&mut self, device: u8) {
            self.cleared = Some(device);
        }
        fn irq_pending(&self) -> bool {
            self.cleared.is_none()
        }
        fn highest_priority_interrupt(&self) -> Option<u8> {
            Some(0o33)
        }
        fn set_irq_mask(&mut self, _m: u16) {}
        fn reset_all_io_devices(&mut self) {}
    }

    #[test]
    fn disabled_interrupts_are_never_taken() {
        let mut state = CpuState::default();
        let mut mem = FlatMemory::new(64);
        let mut bus = PendingBus { cleared: None };
        assert!(!poll(&mut state, &mut mem, &mut bus, 16).unwrap());
        assert!(bus.cleared.is_none());
    }

    #[test]
    fn a_pending_line_vectors_through_location_one() {
        let mut state = CpuState::default();
        state.set_ion(true);
        state.set_pc(Address::from_phys(0o2000));
        let mut mem = FlatMemory::new(0x1000);
        mem.write_word(VECTOR_LOC, 0o400);
        let mut bus = PendingBus { cleared: None };

        assert!(poll(&mut state, &mut mem, &mut bus, 16).unwrap());
        assert!(!state.ion());
        assert_eq!(bus.cleared, Some(0o33));
        assert_eq!(mem.read_word(SAVED_PC_LOC), 0o2000);
        assert_eq!(state.pc().phys(), 0o400);
    }

    #[test]
    fn the_vector_cell_is_indirectable() {
        let mut state = CpuState::default();
        state.set_ion(true);
        let mut mem = FlatMemory::new(0x1000);
        mem.write_word(VECTOR_LOC, 0x8000 | 0o500);
        mem.write_word(0o500, 0o600);
        let mut bus = PendingBus { cleared: None };

        poll(&mut state, &mut mem, &mut bus, 16).unwrap();
        assert_eq!(state.pc().phys(), 0o600);
    }

    #[test]
    fn a_quiet_bus_changes_nothing() {
        let mut state = CpuState::default();
        state.set_ion(true);
        let mut mem = FlatMemory::new(64);
        let mut bus = NullBus;
        assert!(!poll(&mut state, &mut mem, &mut bus, 16).unwrap());
        assert!(state.ion());
    }
}
