//! At-most-once computation per key
//!
//! The map lock is held only long enough to find or insert a key's cell.
//! Computation runs inside the cell's `OnceLock`, so concurrent first callers
//! for the same key block on that cell while other keys proceed.

use crate::config::compile_time::cache::MAX_CACHE_ENTRIES;
use crate::logging::codes;
use crate::{log_debug, log_error, log_warning};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Shared outcome of one computation
pub type Shared<V, E> = Result<Arc<V>, Arc<E>>;

type Cell<V, E> = Arc<OnceLock<Shared<V, E>>>;

pub struct SingleFlight<K, V, E> {
    cells: Mutex<HashMap<K, Cell<V, E>>>,
    capacity: usize,
    computations: AtomicUsize,
}

impl<K, V, E> SingleFlight<K, V, E>
where
    K: Eq + Hash + Clone + fmt::Display,
    E: fmt::Display,
{
    pub fn new() -> Self {
        Self::with_capacity(MAX_CACHE_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
            capacity,
            computations: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Cell<V, E>>> {
        self.cells.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the value for `key`, running `compute` only if no caller has
    /// before. Failures are kept and shared exactly like values.
    pub fn get_or_compute<F>(&self, key: &K, compute: F) -> Shared<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let cell = {
            let mut cells = self.lock();
            match cells.get(key) {
                Some(cell) => Some(Arc::clone(cell)),
                None if cells.len() >= self.capacity => None,
                None => {
                    let cell = Arc::new(OnceLock::new());
                    cells.insert(key.clone(), Arc::clone(&cell));
                    Some(cell)
                }
            }
        };

        let Some(cell) = cell else {
            log_warning!(code = codes::cache::CACHE_CAPACITY_EXCEEDED,
                "Cache is full, computing without memoization",
                "key" => key,
                "capacity" => self.capacity);
            self.computations.fetch_add(1, Ordering::Relaxed);
            return compute().map(Arc::new).map_err(Arc::new);
        };

        let mut computed_here = false;
        let outcome = cell.get_or_init(|| {
            computed_here = true;
            self.computations.fetch_add(1, Ordering::Relaxed);
            log_debug!("Computing cache entry", "key" => key);
            compute().map(Arc::new).map_err(Arc::new)
        });

        if !computed_here {
            if let Err(error) = outcome {
                log_error!(codes::cache::CACHED_FAILURE, "Serving cached failure",
                    "key" => key,
                    "error" => error);
            }
        }

        outcome.clone()
    }

    /// Completed outcome for `key`, without computing
    pub fn get(&self, key: &K) -> Option<Shared<V, E>> {
        let cell = self.lock().get(key).cloned()?;
        cell.get().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// How many times a compute function has actually run
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }
}

impl<K, V, E> Default for SingleFlight<K, V, E>
where
    K: Eq + Hash + Clone + fmt::Display,
    E: fmt::Display,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_computes_once_per_key() {
        let flights: SingleFlight<String, usize, String> = SingleFlight::new();
        let key = "stylesheet".to_string();

        let first = flights.get_or_compute(&key, || Ok(42)).unwrap();
        let second = flights.get_or_compute(&key, || Ok(7)).unwrap();

        assert_eq!(*first, 42);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(flights.computations(), 1);
        assert_eq!(flights.len(), 1);
    }

    #[test]
    fn test_failures_are_cached() {
        let flights: SingleFlight<String, usize, String> = SingleFlight::new();
        let key = "build".to_string();

        let first = flights.get_or_compute(&key, || Err("cycle".to_string()));
        let second = flights.get_or_compute(&key, || Ok(1));

        assert_eq!(first.unwrap_err().as_str(), "cycle");
        assert_eq!(second.unwrap_err().as_str(), "cycle");
        assert_eq!(flights.computations(), 1);
    }

    #[test]
    fn test_concurrent_first_callers_share_one_computation() {
        let flights: SingleFlight<String, usize, String> = SingleFlight::new();
        let barrier = Barrier::new(8);
        let key = "build".to_string();

        let results: Vec<Arc<usize>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        flights
                            .get_or_compute(&key, || {
                                thread::sleep(Duration::from_millis(20));
                                Ok(99)
                            })
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(flights.computations(), 1);
        assert!(results.iter().all(|value| Arc::ptr_eq(value, &results[0])));
    }

    #[test]
    fn test_capacity_exceeded_computes_uncached() {
        let flights: SingleFlight<String, usize, String> = SingleFlight::with_capacity(1);
        flights.get_or_compute(&"a".to_string(), || Ok(1)).unwrap();

        let b = "b".to_string();
        assert_eq!(*flights.get_or_compute(&b, || Ok(2)).unwrap(), 2);
        assert_eq!(*flights.get_or_compute(&b, || Ok(3)).unwrap(), 3);
        assert_eq!(flights.len(), 1);
        assert!(flights.get(&b).is_none());
        assert_eq!(flights.computations(), 3);
    }

    #[test]
    fn test_overflow_and_cached_failure_are_logged() {
        let flights: SingleFlight<String, usize, String> = SingleFlight::with_capacity(1);
        let a = "a".to_string();

        let (first, logger) = crate::logging::capture_events(|| flights.get_or_compute(&a, || Err("cycle".to_string())));
        assert!(first.is_err());
        assert!(!logger.has_error_with_code(codes::cache::CACHED_FAILURE));

        let (_, logger) = crate::logging::capture_events(|| flights.get_or_compute(&a, || Ok(1)));
        assert!(logger.has_error_with_code(codes::cache::CACHED_FAILURE));

        let (overflow, logger) = crate::logging::capture_events(|| flights.get_or_compute(&"b".to_string(), || Ok(2)));
        assert_eq!(*overflow.unwrap(), 2);
        assert!(logger.has_warning_with_code(codes::cache::CACHE_CAPACITY_EXCEEDED));
        assert!(logger.errors().is_empty());
    }

    #[test]
    fn test_get_does_not_compute() {
        let flights: SingleFlight<String, usize, String> = SingleFlight::new();
        let key = "constants".to_string();
        assert!(flights.get(&key).is_none());
        flights.get_or_compute(&key, || Ok(5)).unwrap();
        assert_eq!(*flights.get(&key).unwrap().unwrap(), 5);
    }
}
