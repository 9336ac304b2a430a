//! ISR-safe registry wrapper using critical sections.

use super::primitives::CriticalSectionCell;
use crate::driver::registry::Registry;

/// ISR-safe registry wrapper using critical sections.
///
/// All access goes through `critical_section::with()`, disabling interrupts
/// for the duration of the closure. Keep closures short: a byte copy of at
/// most one drain or hardware buffer.
///
/// For lock-free operation split the port's tracker and pump instead and
/// hand the halves to their contexts.
///
/// # Example
///
/// ```ignore
/// static REGISTRY: SharedRegistry<'static> = SharedRegistry::new();
///
/// REGISTRY.with(|r| r.enable(PortId::Usart1, &PortConfig::new(), storage))?;
///
/// #[interrupt]
/// fn DMA1_CHANNEL4() {
///     REGISTRY.with(|r| r.on_tx_complete(PortId::Usart1)).ok();
/// }
/// ```
pub struct SharedRegistry<'a> {
    inner: CriticalSectionCell<Registry<'a>>,
}

impl<'a> SharedRegistry<'a> {
    /// Create a shared registry with every port disabled (const, suitable
    /// for static initialization).
    pub const fn new() -> Self {
        Self {
            inner: CriticalSectionCell::new(Registry::new()),
        }
    }

    /// Execute a closure with exclusive access to the registry.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Registry<'a>) -> R,
    {
        self.inner.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Registry<'a>) -> R,
    {
        self.inner.try_with(f)
    }
}

impl Default for SharedRegistry<'_> {
    fn default() -> Self {
        Self::new()
    }
}
