//! Admission service: the entry point the transport calls per request.

use std::sync::Arc;

use tracing::trace;

use super::registry::LimiterRegistry;
use super::window::{ClientId, LimiterKind, TimestampMs, WindowPolicy};

/// Decides whether requests are admitted, one limiter per client.
///
/// This struct is thread-safe and can be shared across multiple tasks.
/// Requests for the same client are serialized by that client's limiter;
/// requests for different clients never contend on a common lock.
pub struct AdmissionService {
    /// Algorithm used for every client of this service
    kind: LimiterKind,
    /// Limit and window every limiter is built with
    policy: WindowPolicy,
    /// Per-client limiters
    registry: Arc<LimiterRegistry>,
}

impl AdmissionService {
    /// Create a service of the given kind with its own registry.
    pub fn new(kind: LimiterKind) -> Self {
        Self::with_registry(kind, Arc::new(LimiterRegistry::new()))
    }

    /// Create a service backed by an existing registry.
    pub fn with_registry(kind: LimiterKind, registry: Arc<LimiterRegistry>) -> Self {
        Self {
            kind,
            policy: WindowPolicy::default(),
            registry,
        }
    }

    /// Decide on a request from `client_id` arriving at `timestamp_ms`.
    ///
    /// Timestamps for a given client must be non-decreasing across calls.
    pub fn evaluate(&self, client_id: ClientId, timestamp_ms: TimestampMs) -> bool {
        let kind = self.kind;
        let policy = self.policy;
        let limiter = self.registry.get_or_create(client_id, || kind.build(policy));

        let admitted = limiter.process_request(timestamp_ms);

        trace!(
            kind = %self.kind,
            client_id,
            timestamp_ms,
            admitted,
            "Admission decision"
        );

        admitted
    }

    /// The algorithm this service uses.
    pub fn kind(&self) -> LimiterKind {
        self.kind
    }

    /// Number of clients seen so far.
    pub fn tracked_clients(&self) -> usize {
        self.registry.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_service_creation() {
        let service = AdmissionService::new(LimiterKind::Sliding);
        assert_eq!(service.kind(), LimiterKind::Sliding);
        assert_eq!(service.tracked_clients(), 0);
    }

    #[test]
    fn test_burst_at_one_timestamp() {
        for kind in [LimiterKind::Fixed, LimiterKind::Sliding] {
            let service = AdmissionService::new(kind);

            for _ in 0..5 {
                assert!(service.evaluate(1, 100_000), "{kind} should admit");
            }
            assert!(!service.evaluate(1, 100_000), "{kind} should reject the 6th");
        }
    }

    #[test]
    fn test_fixed_window_sequence() {
        let service = AdmissionService::new(LimiterKind::Fixed);

        for t in 0..5 {
            assert!(service.evaluate(1, t));
        }
        assert!(!service.evaluate(1, 4_999));
        assert!(service.evaluate(1, 5_000));
    }

    #[test]
    fn test_sliding_window_sequence() {
        let service = AdmissionService::new(LimiterKind::Sliding);

        for t in 0..5 {
            assert!(service.evaluate(1, t));
        }
        assert!(!service.evaluate(1, 4_999));
        assert!(service.evaluate(1, 5_001));
    }

    #[test]
    fn test_clients_are_isolated() {
        for kind in [LimiterKind::Fixed, LimiterKind::Sliding] {
            let interleaved = AdmissionService::new(kind);
            let alone = AdmissionService::new(kind);

            let mut with_b = Vec::new();
            let mut without_b = Vec::new();
            for t in (0..20_000).step_by(300) {
                with_b.push(interleaved.evaluate(1, t));
                interleaved.evaluate(2, t);
                interleaved.evaluate(2, t);
                without_b.push(alone.evaluate(1, t));
            }

            assert_eq!(with_b, without_b);
            assert_eq!(interleaved.tracked_clients(), 2);
        }
    }

    #[test]
    fn test_replay_is_deterministic() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
        let mut t = 0u64;
        let sequence: Vec<(ClientId, TimestampMs)> = (0..2_000)
            .map(|_| {
                t += rng.gen_range(0..100);
                (rng.gen_range(0..4), t)
            })
            .collect();

        for kind in [LimiterKind::Fixed, LimiterKind::Sliding] {
            let run = |service: AdmissionService| -> Vec<bool> {
                sequence
                    .iter()
                    .map(|&(client, ts)| service.evaluate(client, ts))
                    .collect()
            };

            let first = run(AdmissionService::new(kind));
            let second = run(AdmissionService::new(kind));

            assert_eq!(first, second);
            assert!(first.contains(&false), "{kind} never rejected anything");
        }
    }

    #[test]
    fn test_concurrent_requests_for_new_client() {
        const THREADS: usize = 10;

        for kind in [LimiterKind::Fixed, LimiterKind::Sliding] {
            let registry = Arc::new(LimiterRegistry::new());
            let service = Arc::new(AdmissionService::with_registry(kind, Arc::clone(&registry)));
            let barrier = Arc::new(Barrier::new(THREADS));
            let admitted = Arc::new(AtomicUsize::new(0));

            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let service = Arc::clone(&service);
                    let barrier = Arc::clone(&barrier);
                    let admitted = Arc::clone(&admitted);
                    thread::spawn(move || {
                        barrier.wait();
                        if service.evaluate(99, 1_000) {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            assert_eq!(admitted.load(Ordering::SeqCst), 5, "{kind}");
            assert_eq!(registry.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_concurrent_tasks_share_one_limiter() {
        let service = Arc::new(AdmissionService::new(LimiterKind::Sliding));

        let tasks = (0..50).map(|_| {
            let service = Arc::clone(&service);
            tokio::task::spawn_blocking(move || service.evaluate(3, 42))
        });

        let results = futures::future::join_all(tasks).await;
        let admitted = results
            .into_iter()
            .map(|r| r.unwrap())
            .filter(|&ok| ok)
            .count();

        assert_eq!(admitted, 5);
        assert_eq!(service.tracked_clients(), 1);
    }
}
