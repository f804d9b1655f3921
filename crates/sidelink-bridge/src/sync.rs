use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering from poisoning.
///
/// No callback runs while any bridge lock is held, so a poisoned guard can
/// only come from a panic during a plain map or vec operation and the
/// protected data is still coherent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
