// tests/container_backend.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::time::{Duration, Instant};

use shellrunner::exec::ExecutionBackend;
use shellrunner::exec::container::{
    ContainerBackend, PodPhase, TIMEOUT_EXIT_CODE, TIMEOUT_MESSAGE,
};
use shellrunner_test_utils::builders::fast_container_settings;
use shellrunner_test_utils::fake_cluster::FakeCluster;

fn backend(cluster: &FakeCluster, max_timeout_secs: u64) -> ContainerBackend {
    ContainerBackend::with_connector(cluster.connector(), &fast_container_settings(max_timeout_secs))
}

/// The single pod this attempt created must be gone, and the client released.
fn assert_cleaned_up(cluster: &FakeCluster) {
    let created = cluster.created();
    assert_eq!(created.len(), 1, "exactly one pod per attempt");
    assert!(!cluster.exists(&created[0].name), "pod {} outlived its attempt", created[0].name);
    assert_eq!(cluster.open_handles(), 0, "cluster handle was not released");
}

#[tokio::test]
async fn succeeded_pod_returns_logs_and_is_deleted() {
    init_tracing();
    let cluster = FakeCluster::completing(PodPhase::Succeeded, "hello\n");

    let r = with_timeout(backend(&cluster, 30).run_command("echo hello", Duration::from_secs(5))).await;

    assert_eq!(r.exit_code(), 0);
    assert_eq!(r.stdout(), "hello");
    assert_eq!(r.stderr(), "");
    assert_cleaned_up(&cluster);
}

#[tokio::test]
async fn failed_pod_maps_to_exit_code_one() {
    init_tracing();
    let cluster = FakeCluster::completing(PodPhase::Failed, "sh: nope: not found");

    let r = with_timeout(backend(&cluster, 30).run_command("nope", Duration::from_secs(5))).await;

    assert_eq!(r.exit_code(), 1);
    assert_eq!(r.stdout(), "sh: nope: not found");
    assert_eq!(r.stderr(), "");
    assert_cleaned_up(&cluster);
}

#[tokio::test]
async fn timed_out_pod_is_deleted_and_reported_as_124() {
    init_tracing();
    let cluster = FakeCluster::hanging();

    // Requested 60s, clamped to the 1s ceiling.
    let started = Instant::now();
    let r = with_timeout(backend(&cluster, 1).run_command("sleep 100", Duration::from_secs(60))).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(r.exit_code(), TIMEOUT_EXIT_CODE);
    assert_eq!(r.stdout(), "");
    assert_eq!(r.stderr(), TIMEOUT_MESSAGE);
    assert_cleaned_up(&cluster);
}

#[tokio::test]
async fn log_failure_is_absorbed_and_pod_deleted() {
    init_tracing();
    let cluster = FakeCluster::completing(PodPhase::Succeeded, "unused").failing_logs();

    let r = with_timeout(backend(&cluster, 30).run_command("echo hi", Duration::from_secs(5))).await;

    assert_eq!(r.exit_code(), 1);
    assert_eq!(r.stdout(), "");
    assert!(r.stderr().contains("container execution failed"), "{}", r.stderr());
    assert!(r.stderr().contains("log stream reset"), "{}", r.stderr());
    assert_cleaned_up(&cluster);
}

#[tokio::test]
async fn create_error_after_pod_was_stored_still_cleans_up() {
    init_tracing();
    let cluster = FakeCluster::completing(PodPhase::Succeeded, "").failing_create_after_persisting();

    let r = with_timeout(backend(&cluster, 30).run_command("echo hi", Duration::from_secs(5))).await;

    assert_eq!(r.exit_code(), 1);
    assert!(r.stderr().contains("create request timed out"), "{}", r.stderr());
    assert_cleaned_up(&cluster);
}

#[tokio::test]
async fn pod_vanishing_while_awaited_is_an_error() {
    init_tracing();
    let cluster = FakeCluster::vanishing();

    let r = with_timeout(backend(&cluster, 30).run_command("echo hi", Duration::from_secs(5))).await;

    assert_eq!(r.exit_code(), 1);
    assert!(r.stderr().contains("disappeared"), "{}", r.stderr());
    assert_cleaned_up(&cluster);
}

#[tokio::test]
async fn unreachable_cluster_degrades_without_creating_anything() {
    init_tracing();
    let cluster = FakeCluster::completing(PodPhase::Succeeded, "").failing_open();

    let r = with_timeout(backend(&cluster, 30).run("echo hi", Duration::from_secs(5)))
        .await
        .expect("container backend never returns an error");

    assert_eq!(r.exit_code(), 1);
    assert!(r.stderr().contains("cluster unreachable"), "{}", r.stderr());
    assert!(cluster.created().is_empty());
    assert_eq!(cluster.open_handles(), 0);
}

#[tokio::test]
async fn failed_delete_does_not_mask_the_result() {
    init_tracing();
    let cluster = FakeCluster::completing(PodPhase::Succeeded, "done").failing_delete();

    let r = with_timeout(backend(&cluster, 30).run_command("echo done", Duration::from_secs(5))).await;

    assert_eq!(r.exit_code(), 0);
    assert_eq!(r.stdout(), "done");
    assert_eq!(cluster.open_handles(), 0);
}

#[tokio::test]
async fn hung_delete_is_abandoned_after_its_bound() {
    init_tracing();
    let cluster = FakeCluster::completing(PodPhase::Succeeded, "done").hanging_delete();

    let started = Instant::now();
    let r = with_timeout(backend(&cluster, 30).run_command("echo done", Duration::from_secs(5))).await;

    assert_eq!(r.exit_code(), 0);
    assert_eq!(r.stdout(), "done");
    // delete bound is 200ms in the fast settings
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(cluster.open_handles(), 0);
}

#[tokio::test]
async fn every_attempt_uses_a_fresh_pod_and_client() {
    init_tracing();
    let cluster = FakeCluster::completing(PodPhase::Succeeded, "ok");
    let backend = backend(&cluster, 30);

    for _ in 0..3 {
        with_timeout(backend.run_command("echo ok", Duration::from_secs(5))).await;
    }

    let created = cluster.created();
    assert_eq!(created.len(), 3);
    assert_ne!(created[0].name, created[1].name);
    assert_ne!(created[1].name, created[2].name);
    assert_eq!(cluster.live_pods(), 0);
    assert_eq!(cluster.opened(), 3);
    assert_eq!(cluster.open_handles(), 0);
}

#[tokio::test]
async fn pod_spec_carries_command_image_and_namespace() {
    init_tracing();
    let cluster = FakeCluster::completing(PodPhase::Succeeded, "");

    with_timeout(backend(&cluster, 30).run_command("uname -a", Duration::from_secs(5))).await;

    let spec = &cluster.created()[0];
    assert_eq!(spec.command, "uname -a");
    assert_eq!(spec.image, "busybox:latest");
    assert_eq!(spec.namespace, "shell-runner");
    assert_eq!(spec.entrypoint(), vec!["sh", "-c", "uname -a"]);
}

#[test]
fn requested_timeout_is_clamped_to_the_ceiling() {
    let cluster = FakeCluster::hanging();
    let backend = backend(&cluster, 30);

    assert_eq!(backend.effective_timeout(Duration::from_secs(60)), Duration::from_secs(30));
    assert_eq!(backend.effective_timeout(Duration::from_secs(5)), Duration::from_secs(5));
}
