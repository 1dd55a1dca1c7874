//! Result codes shared by all state-changing operations

/// Errors returned by driver operations.
///
/// Every collaborator failure is translated into one of these at the
/// boundary. The driver owns no retry loop beyond the bounded abort poll
/// inside [`crate::Idac::restore`]; retry policy for [`Error::Busy`] and
/// [`Error::Locked`] belongs to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A numeric input is out of its documented range, or the addressed
    /// channel has no output destination configured. Checked before any
    /// side effect.
    BadParam,
    /// The block is free to lock but the action cannot proceed: outputs
    /// are still live, or the low-level capture failed transiently.
    Busy,
    /// The block is held by a different owner. The only recourse is to
    /// retry later.
    Locked,
}
