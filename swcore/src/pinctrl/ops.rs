use crate::Error;

/// Group enumeration, as used by a pin control framework
///
/// Selectors are indices into the controller's group table, handed out by
/// the controller itself.
///
/// # Panics
///
/// The enumeration methods of both traits panic when given an out-of-range
/// selector.
pub trait PinctrlOps {
    /// Number of pin groups
    fn group_count(&self) -> usize;

    /// Name of the group at `selector`
    fn group_name(&self, selector: usize) -> &'static str;

    /// Pins of the group at `selector`
    fn group_pins(&self, selector: usize) -> &'static [u32];
}

/// Function enumeration and selection
pub trait PinmuxOps {
    /// Whether a pin may only be claimed by a single owner at a time, be it a
    /// GPIO request or a mux function
    const STRICT: bool;

    /// Number of functions
    fn function_count(&self) -> usize;

    /// Name of the function at `selector`
    fn function_name(&self, selector: usize) -> &'static str;

    /// Names of the groups the function at `selector` can be enabled on
    fn function_groups(&self, selector: usize) -> &[&'static str];

    /// Enable the function at `function` on the group at `group`
    fn set_mux(&mut self, function: usize, group: usize) -> Result<(), Error>;
}
