use std::sync::{Mutex, MutexGuard, PoisonError};

use log::info;

use super::{Pinctrl, PinmuxOps};
use crate::{regmap::RegisterMap, Error};

/// A pin controller shared between consumers
///
/// All operations on the controller are serialized by a single lock, so two
/// requests for the same group resolve as last-write-wins. Requests are made
/// by name; the function and group names are resolved against the function
/// group lists generated when the controller was bound, and a pair that is
/// not listed there never reaches the controller.
#[derive(Debug)]
pub struct PinctrlDevice<M> {
    pinctrl: Mutex<Pinctrl<M>>,
}

impl<M: RegisterMap> PinctrlDevice<M> {
    pub fn new(pinctrl: Pinctrl<M>) -> Self {
        Self {
            pinctrl: Mutex::new(pinctrl),
        }
    }

    /// Enable `function` on `group`
    pub fn select(&self, function: &str, group: &str) -> Result<(), Error> {
        let mut pinctrl = self.lock();

        let function_selector = pinctrl
            .function_selector(function)
            .ok_or_else(|| Error::UnknownFunction(function.to_string()))?;
        let group_selector = pinctrl
            .group_selector(group)
            .ok_or_else(|| Error::UnknownGroup(group.to_string()))?;

        let groups = pinctrl.function_groups(function_selector);
        if !groups.contains(&group) {
            return Err(Error::GroupNotInFunction {
                function: function.to_string(),
                group: group.to_string(),
                available: groups.join(", "),
            });
        }

        pinctrl.set_mux(function_selector, group_selector)?;
        info!("Group '{group}' muxed to function '{function}'");

        Ok(())
    }

    /// Run `f` with exclusive access to the controller
    pub fn with<R>(&self, f: impl FnOnce(&mut Pinctrl<M>) -> R) -> R {
        f(&mut self.lock())
    }

    /// Release the controller
    pub fn into_inner(self) -> Pinctrl<M> {
        self.pinctrl
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // A panicking holder can not leave a field half-written, so a poisoned
    // lock still guards a consistent controller.
    fn lock(&self) -> MutexGuard<'_, Pinctrl<M>> {
        self.pinctrl.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<M: RegisterMap> From<Pinctrl<M>> for PinctrlDevice<M> {
    fn from(pinctrl: Pinctrl<M>) -> Self {
        Self::new(pinctrl)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;
    use crate::{regmap::memory::MemoryMap, targets::Chip};

    fn maple() -> PinctrlDevice<MemoryMap> {
        Pinctrl::bind(Chip::Maple.pinctrl_config(), MemoryMap::new())
            .unwrap()
            .into()
    }

    #[test]
    fn select_by_name() {
        let device = maple();

        device.select("sys-led", "sys-led").unwrap();
        device.select("uart1", "uart1").unwrap();

        let pinctrl = device.into_inner();
        assert_eq!(pinctrl.map().get(0xa000), 1 << 15);
        assert_eq!(pinctrl.map().get(0x1000), 1 << 4);
    }

    #[test]
    fn unknown_names() {
        let device = maple();

        assert!(matches!(
            device.select("i2c", "jtag"),
            Err(Error::UnknownFunction(name)) if name == "i2c"
        ));
        assert!(matches!(
            device.select("gpio", "spi"),
            Err(Error::UnknownGroup(name)) if name == "spi"
        ));
    }

    #[test]
    fn unlisted_pair_is_rejected_before_the_controller() {
        let device = maple();

        let err = device.select("uart1", "jtag").unwrap_err();
        assert!(matches!(
            err,
            Error::GroupNotInFunction { ref available, .. } if available == "uart1"
        ));
        assert!(device.with(|pinctrl| pinctrl.map().writes().is_empty()));
    }

    #[test]
    fn concurrent_requests_are_serialized() {
        let device = Arc::new(maple());

        let handles = (0..8)
            .map(|n| {
                let device = Arc::clone(&device);
                thread::spawn(move || {
                    let function = if n % 2 == 0 { "uart1" } else { "spi-slave" };
                    device.select(function, "uart1").unwrap();
                    device.select("sys-led", "sys-led").unwrap();
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }

        device.with(|pinctrl| {
            // Every write touched exactly one field of its register
            for &(offset, value) in pinctrl.map().writes() {
                match offset {
                    0x1000 => assert_eq!(value & !(1 << 4), 0),
                    0xa000 => assert_eq!(value, 1 << 15),
                    _ => panic!("unexpected write to {offset:#x}"),
                }
            }
            assert_eq!(pinctrl.active_function(2).unwrap(), Some("sys-led"));
        });
    }
}
