use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::traits::Delay;

/// Attente via `std::thread::sleep`.
///
/// # Example
/// ```
/// use sc_core::clock::SystemDelay;
/// use sc_core::traits::Delay;
/// let mut delay = SystemDelay;
/// delay.delay_us(10);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemDelay;

impl Delay for SystemDelay {
    #[inline]
    fn delay_us(&mut self, us: u64) {
        if us > 0 {
            std::thread::sleep(Duration::from_micros(us));
        }
    }
}

/// Jeton d'arrêt partagé entre l'hôte et la boucle.
///
/// La boucle le consulte à chaque frontière de cycle. Clonable, atomique,
/// `Send + Sync`.
///
/// # Example
/// ```
/// use sc_core::clock::CancelToken;
/// let token = CancelToken::new();
/// let handle = token.clone();
/// assert!(!token.is_cancelled());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Demande l'arrêt au prochain cycle.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// `true` une fois `cancel()` appelé sur n'importe quel clone.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
