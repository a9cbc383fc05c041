//! Recompute scheduler driving the real services over the in-memory clinic

use std::sync::Arc;
use std::time::Duration;

use petclinic_core::{DiseaseRiskService, PedigreeService, PetLookup};
use petclinic_infra::{
    InMemoryClinicRepository, RecomputeScheduler, RecomputeSchedulerConfig, SimulatedRiskModel,
};

fn config(interval_ms: u64) -> RecomputeSchedulerConfig {
    RecomputeSchedulerConfig {
        interval: Duration::from_millis(interval_ms),
        initial_delay: Duration::ZERO,
        join_timeout: Duration::from_secs(2),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn scheduled_recalculation_keeps_invalidating_the_cache() {
    let repo = Arc::new(InMemoryClinicRepository::with_sample_data());
    let service = Arc::new(DiseaseRiskService::new(
        repo,
        Arc::new(SimulatedRiskModel::new(Duration::from_millis(10))),
    ));
    let mut scheduler = RecomputeScheduler::new("risk", service.clone(), config(30));

    scheduler.start().await.expect("start succeeds");
    for _ in 0..5 {
        service.fetch_recommended_visits(1).await.expect("pet 1 exists");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    scheduler.stop().await.expect("stop succeeds");

    assert!(service.risk_state().await.generation >= 2);
    assert!(service.cache_stats().invalidations >= 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancelled_service_stops_its_schedule() {
    let repo = Arc::new(InMemoryClinicRepository::with_sample_data());
    let service = Arc::new(DiseaseRiskService::new(
        repo,
        Arc::new(SimulatedRiskModel::new(Duration::from_secs(30))),
    ));
    let mut scheduler = RecomputeScheduler::new("risk", service.clone(), config(10));

    scheduler.start().await.expect("start succeeds");
    tokio::time::sleep(Duration::from_millis(50)).await;
    service.cancellation_token().cancel();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!scheduler.is_running());
    assert_eq!(service.cached_pets(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stop_interrupts_a_long_recalculation() {
    let repo = Arc::new(InMemoryClinicRepository::with_sample_data());
    let service = Arc::new(DiseaseRiskService::new(
        repo,
        Arc::new(SimulatedRiskModel::new(Duration::from_secs(2))),
    ));
    service.fetch_recommended_visits(1).await.expect("pet 1 exists");
    let config = RecomputeSchedulerConfig { join_timeout: Duration::from_millis(500), ..config(1_000) };
    let mut scheduler = RecomputeScheduler::new("risk", service.clone(), config);

    scheduler.start().await.expect("start succeeds");
    tokio::time::sleep(Duration::from_millis(100)).await;
    scheduler.stop().await.expect("stop interrupts the run in progress");

    assert!(!scheduler.is_running());
    assert_eq!(service.cached_pets(), 0);
    assert_eq!(service.risk_state().await.generation, 0);
    // the service itself was not cancelled and still recalculates on demand
    assert!(!service.cancellation_token().is_cancelled());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn scheduled_pedigree_updates_rename_the_beta_pet() {
    let repo = Arc::new(InMemoryClinicRepository::with_sample_data());
    let pedigree = Arc::new(PedigreeService::new(repo.clone()));
    pedigree.record_pedigree(2, "Basil, descendant of Hamsterdam champions").await;
    let mut scheduler = RecomputeScheduler::new("pedigree", pedigree.clone(), config(1_000));

    scheduler.start().await.expect("start succeeds");
    tokio::time::sleep(Duration::from_millis(100)).await;
    scheduler.stop().await.expect("stop succeeds");

    assert_eq!(repo.find_pet(2).await.expect("Basil exists").name, "Basil The Second");
    assert_eq!(
        pedigree.pedigree_text(2).await.as_deref(),
        Some("Basil The Second, descendant of Hamsterdam champions")
    );
}
