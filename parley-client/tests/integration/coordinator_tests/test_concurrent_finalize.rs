use parley_client::{PeerIdentity, Role};

use crate::integration::{candidate, create_test_coordinator, init_tracing};

/// Candidates racing a finalize must each be applied exactly once.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_candidates_racing_finalize_apply_exactly_once() {
    init_tracing();

    for round in 0..20 {
        let t = create_test_coordinator(Role::Master, "master-1");
        let viewer = PeerIdentity::from("v1");

        let mut tasks = Vec::new();
        for n in 0..16u16 {
            let coordinator = t.coordinator.clone();
            let viewer = viewer.clone();
            tasks.push(tokio::spawn(async move {
                coordinator.submit_candidate(viewer, candidate(n)).await;
            }));
        }

        let coordinator = t.coordinator.clone();
        let finalize_for = viewer.clone();
        tasks.push(tokio::spawn(async move {
            tokio::task::yield_now().await;
            coordinator.finalize_peer_connection(finalize_for).await;
        }));

        for task in tasks {
            task.await.expect("task panicked");
        }

        let mut applied = t.engine.added_candidates().await;
        applied.sort_by_key(|c| c.candidate.clone());
        let mut expected: Vec<_> = (0..16u16).map(candidate).collect();
        expected.sort_by_key(|c| c.candidate.clone());

        assert_eq!(applied, expected, "round {round}: every candidate applied once");
        assert_eq!(t.coordinator.pending_candidates(&viewer).await, 0);
    }
}
