//! Care-tips fan-out over the shared worker pool

mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use petclinic_common::pool::{WorkerPool, WorkerPoolConfig};
use petclinic_core::{CareAdvisor, CareTipsService};
use petclinic_domain::{ClinicError, Owner, Pet, PetKind};
use support::{MockClinic, RecordingSink, SleepyAdvisor};

fn pool(workers: usize) -> WorkerPool {
    WorkerPool::new(WorkerPoolConfig::builder().workers(workers).build().unwrap())
}

fn service(clinic: MockClinic, advisor: Arc<SleepyAdvisor>, workers: usize) -> (CareTipsService, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let advisor: Arc<dyn CareAdvisor> = advisor;
    (CareTipsService::new(Arc::new(clinic), advisor, pool(workers), sink.clone()), sink)
}

#[tokio::test]
async fn empty_clinic_yields_banner_only() {
    let (service, sink) = service(MockClinic::default(), SleepyAdvisor::taking(Duration::ZERO), 2);

    let report = service.compose_care_tips().await.unwrap();

    assert_eq!(report, "General care tips from Spring PetClinic:\n");
    assert_eq!(sink.reports(), vec![report]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn report_keeps_owner_and_pet_order() {
    let advisor = SleepyAdvisor::taking(Duration::from_millis(20));
    let (service, _) = service(MockClinic::sample(), advisor.clone(), 4);

    let report = service.compose_care_tips().await.unwrap();

    assert_eq!(
        report,
        "General care tips from Spring PetClinic:\n\
         Dear George, here is your pet care tip(s):\n\t- Your 'Leo' should sleep more\n\t- Your 'Basil' should sleep more\n\n\
         Dear Betty, here is your pet care tip(s):\n\t- Your 'Rosy' should sleep more"
    );
    assert_eq!(advisor.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn single_worker_pool_does_not_deadlock() {
    let owners = (1..=6)
        .map(|id| Owner::new(id, format!("Owner{id}"), "Smith").with_pet(Pet::new(id, format!("Pet{id}"), PetKind::Dog)))
        .collect();
    let (service, _) = service(MockClinic::new(owners), SleepyAdvisor::taking(Duration::from_millis(5)), 1);

    let report = tokio::time::timeout(Duration::from_secs(5), service.compose_care_tips())
        .await
        .expect("report deadlocked")
        .unwrap();

    assert_eq!(report.matches("Dear ").count(), 6);
    assert_eq!(service.pool().metrics().active, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failing_pet_fails_the_whole_report() {
    let (service, sink) = service(MockClinic::sample(), SleepyAdvisor::failing_for("Basil"), 2);

    let err = service.compose_care_tips().await.unwrap_err();

    match err {
        ClinicError::Task(message) => assert!(message.contains("George"), "{message}"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(sink.reports().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_now_interrupts_pending_advice() {
    let (service, sink) = service(MockClinic::sample(), SleepyAdvisor::taking(Duration::from_secs(30)), 2);
    let pool = service.pool().clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        pool.shutdown_now().await;
    });
    let result = tokio::time::timeout(Duration::from_secs(5), service.compose_care_tips()).await.unwrap();

    assert!(matches!(result, Err(ClinicError::Interrupted(_))), "{result:?}");
    assert!(sink.reports().is_empty());
}

#[tokio::test]
async fn graceful_shutdown_completes_accepted_report() {
    let (service, sink) = service(MockClinic::sample(), SleepyAdvisor::taking(Duration::from_millis(5)), 1);
    let pool = service.pool().clone();

    let compose = service.compose_care_tips();
    tokio::pin!(compose);
    // Owner coordinators are accepted but have not submitted any pet task yet
    assert!(futures::poll!(compose.as_mut()).is_pending());
    assert_eq!(pool.metrics().submitted, 0);

    let (report, ()) = tokio::time::timeout(Duration::from_secs(5), async { tokio::join!(compose, pool.shutdown()) })
        .await
        .unwrap();

    let report = report.unwrap();
    assert_eq!(report.matches("should sleep more").count(), 3);
    assert_eq!(sink.reports(), vec![report]);
    assert!(!pool.is_open());
}

#[tokio::test]
async fn bounded_pool_exhaustion_fails_the_report() {
    let pool = WorkerPool::new(WorkerPoolConfig::builder().workers(1).max_queue(0).build().unwrap());
    let sink = Arc::new(RecordingSink::default());
    let advisor: Arc<dyn CareAdvisor> = SleepyAdvisor::taking(Duration::from_millis(20));
    let service = CareTipsService::new(Arc::new(MockClinic::sample()), advisor, pool, sink.clone());

    // George has two pets, more than the pool admits at once
    let result = service.compose_care_tips().await;

    assert!(matches!(result, Err(ClinicError::PoolExhausted(_))), "{result:?}");
    assert!(sink.reports().is_empty());
    assert!(service.pool().metrics().rejected >= 1);
}
