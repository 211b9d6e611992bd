//! At most one in-flight task per key.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, warn};

use crate::errors::MarketDataError;

type Flight<T> = Shared<BoxFuture<'static, Result<T, MarketDataError>>>;
type FlightMap<K, T> = Mutex<HashMap<K, Flight<T>>>;

/// Deduplicates concurrent work by key.
///
/// The first caller for a key spawns the work on the runtime; later callers
/// await the same shared result. The work runs to completion even if every
/// caller goes away, and releases its slot itself when done.
pub struct SingleFlight<K, T> {
    in_flight: Arc<FlightMap<K, T>>,
}

impl<K, T> Default for SingleFlight<K, T> {
    fn default() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

fn lock<K, T>(map: &FlightMap<K, T>) -> MutexGuard<'_, HashMap<K, Flight<T>>> {
    map.lock().unwrap_or_else(|poisoned| {
        warn!("In-flight map lock poisoned, recovering");
        poisoned.into_inner()
    })
}

impl<K, T> SingleFlight<K, T>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `make()` for `key` unless a run is already in flight, in which
    /// case wait for that one instead.
    pub async fn run<F, Fut>(&self, key: K, make: F) -> Result<T, MarketDataError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, MarketDataError>> + Send + 'static,
    {
        let flight = {
            let mut in_flight = lock(&self.in_flight);
            match in_flight.get(&key) {
                Some(existing) => {
                    debug!("Joining in-flight task for {:?}", key);
                    existing.clone()
                }
                None => {
                    let flight = self.spawn(key.clone(), make());
                    in_flight.insert(key, flight.clone());
                    flight
                }
            }
        };
        flight.await
    }

    /// Number of keys with work in flight.
    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }

    fn spawn<Fut>(&self, key: K, work: Fut) -> Flight<T>
    where
        Fut: Future<Output = Result<T, MarketDataError>> + Send + 'static,
    {
        let slots = Arc::clone(&self.in_flight);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = work.await;
            lock(&slots).remove(&task_key);
            result
        });

        let slots = Arc::clone(&self.in_flight);
        async move {
            match handle.await {
                Ok(result) => result,
                Err(err) => {
                    // The task never reached its own cleanup.
                    lock(&slots).remove(&key);
                    Err(MarketDataError::Cache(format!(
                        "in-flight task for {:?} failed: {}",
                        key, err
                    )))
                }
            }
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_run() {
        let flights: Arc<SingleFlight<&'static str, u32>> = Arc::new(SingleFlight::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let flights = Arc::clone(&flights);
            let runs = Arc::clone(&runs);
            handles.push(tokio::spawn(async move {
                flights
                    .run("key", move || async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok(42)
                    })
                    .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 42);
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_errors_are_shared_and_slot_released() {
        let flights: SingleFlight<u8, ()> = SingleFlight::new();
        let err = flights
            .run(1, || async {
                Err(MarketDataError::Terminal {
                    terminal: "QMT".to_string(),
                    message: "down".to_string(),
                })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::Terminal { .. }));

        // A fresh run happens once the failed one is gone
        assert!(flights.run(1, || async { Ok(()) }).await.is_ok());
    }

    #[tokio::test]
    async fn test_abandoned_caller_does_not_cancel_work() {
        let flights: Arc<SingleFlight<u8, ()>> = Arc::new(SingleFlight::new());
        let done = Arc::new(AtomicUsize::new(0));

        let caller = {
            let flights = Arc::clone(&flights);
            let done = Arc::clone(&done);
            tokio::spawn(async move {
                flights
                    .run(7, move || async move {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        done.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        caller.abort();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert_eq!(flights.in_flight(), 0);
    }
}
