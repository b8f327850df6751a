//! Peripheral bus collaborator contract.
//!
//! Device controllers run in their own threads; from the CPU's side every
//! call here is a non-blocking register poke. The interrupt line is owned by
//! the bus: the core only polls and clears it.

/// The three programmed-I/O data registers of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoReg {
    /// Register A.
    A,
    /// Register B.
    B,
    /// Register C.
    C,
    /// No data transfer (flag-control-only operations).
    None,
}

/// Busy/Done flag control sent alongside an I/O transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoFlag {
    /// No flag change.
    None,
    /// Start the device (set Busy, clear Done).
    Start,
    /// Clear the device (clear Busy and Done).
    Clear,
    /// Pulse the device's special function.
    Pulse,
}

impl IoFlag {
    /// Decodes the 2-bit flag-control field.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b01 => Self::Start,
            0b10 => Self::Clear,
            0b11 => Self::Pulse,
            _ => Self::None,
        }
    }
}

/// Busy/Done test selector of the I/O skip instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoTest {
    /// Skip if Busy set.
    BusySet,
    /// Skip if Busy clear.
    BusyClear,
    /// Skip if Done set.
    DoneSet,
    /// Skip if Done clear.
    DoneClear,
}

impl IoTest {
    /// Decodes the 2-bit test field.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b00 => Self::BusySet,
            0b01 => Self::BusyClear,
            0b10 => Self::DoneSet,
            _ => Self::DoneClear,
        }
    }
}

/// Device-number space is 6 bits wide.
pub const DEVICE_COUNT: usize = 64;

/// The pseudo-device number aliasing CPU-internal registers.
pub const DEV_CPU: u8 = 0o77;

/// Peripheral bus contract consumed by the CPU core.
pub trait IoBus {
    /// Programmed input from a device register.
    fn data_in(&mut self, device: u8, reg: IoReg, flag: IoFlag) -> u16;

    /// Programmed output to a device register.
    fn data_out(&mut self, device: u8, value: u16, reg: IoReg, flag: IoFlag);

    /// Whether a controller is attached at `device`.
    fn is_attached(&self, device: u8) -> bool;

    /// Whether `device` is an I/O-capable controller (as opposed to a
    /// memory-channel-only slot).
    fn is_io_device(&self, device: u8) -> bool;

    /// Whether the device's Busy flag is set.
    fn busy(&self, device: u8) -> bool;

    /// Whether the device's Done flag is set.
    fn done(&self, device: u8) -> bool;

    /// Raises the interrupt line on behalf of `device`.
    fn send_interrupt(&mut self, device: u8);

    /// Lowers `device`'s contribution to the interrupt line.
    fn clear_interrupt(&mut self, device: u8);

    /// Whether any unmasked device is requesting an interrupt.
    fn irq_pending(&self) -> bool;

    /// The highest-priority interrupting device, if any.
    fn highest_priority_interrupt(&self) -> Option<u8>;

    /// Applies a new interrupt-disable mask.
    fn set_irq_mask(&mut self, mask: u16);

    /// Resets every attached controller.
    fn reset_all_io_devices(&mut self);
}

/// A bus with nothing attached. Reads return zero, writes vanish, the
/// interrupt line is never raised.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBus;

impl IoBus for NullBus {
    fn data_in(&mut self, _device: u8, _reg: IoReg, _flag: IoFlag) -> u16 {
        0
    }

    fn data_out(&mut self, _device: u8, _value: u16, _reg: IoReg, _flag: IoFlag) {}

    fn is_attached(&self, _device: u8) -> bool {
        false
    }

    fn is_io_device(&self, _device: u8) -> bool {
        false
    }

    fn busy(&self, _device: u8) -> bool {
        false
    }

    fn done(&self, _device: u8) -> bool {
        false
    }

    fn send_interrupt(&mut self, _device: u8) {}

    fn clear_interrupt(&mut self, _device: u8) {}

    fn irq_pending(&self) -> bool {
        false
    }

    fn highest_priority_interrupt(&self) -> Option<u8> {
        None
    }

    fn set_irq_mask(&mut self, _mask: u16) {}

    fn reset_all_io_devices(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::{IoFlag, IoTest};

    #[test]
    fn flag_control_field_decodes_all_four_values() {
        assert_eq!(IoFlag::from_bits(0), IoFlag::None);
        assert_eq!(IoFlag::from_bits(1), IoFlag::Start);
        assert_eq!(IoFlag::from_bits(2), IoFlag::Clear);
        assert_eq!(IoFlag::from_bits(3), IoFlag::Pulse);
    }

    #[test]
    fn test_field_decodes_all_four_values() {
        assert_eq!(IoTest::from_bits(0), IoTest::BusySet);
        assert_eq!(IoTest::from_bits(1), IoTest::BusyClear);
        assert_eq!(IoTest::from_bits(2), IoTest::DoneSet);
        assert_eq!(IoTest::from_bits(3), IoTest::DoneClear);
    }
}
