// tests/watch_closures.rs

mod common;
use crate::common::{T0, T1, TestResult, init_tracing, invoice};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use regenwatch::engine::{WatchOptions, watch_fn};
use regenwatch::errors::WatchError;
use regenwatch::types::{Baseline, JobResult, WatchStatus, WatchedResource};

#[tokio::test(start_paused = true)]
async fn closure_form_completes_via_request_when_reads_are_empty() -> TestResult {
    init_tracing();

    let outcome = watch_fn(
        "INV-7",
        Baseline::new(3, Some(T0)),
        WatchOptions::default(),
        || async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Ok::<_, WatchError>(JobResult::Accepted)
        },
        || async { Ok::<Option<WatchedResource>, WatchError>(None) },
    )
    .await?;

    assert_eq!(outcome.status, WatchStatus::CompletedViaRequest);
    assert_eq!(outcome.attempts_made, 1);
    assert_eq!(outcome.final_state, None);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn closure_form_sees_server_side_version_bump() -> TestResult {
    init_tracing();

    // Simulated server: the job bumps the version 5s after it is accepted.
    let version = Arc::new(AtomicU64::new(3));

    let start_version = Arc::clone(&version);
    let start = move || {
        let version = Arc::clone(&start_version);
        async move {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                version.fetch_add(1, Ordering::SeqCst);
            });
            // The request itself hangs behind a slow proxy.
            tokio::time::sleep(Duration::from_secs(120)).await;
            Ok::<_, WatchError>(JobResult::Accepted)
        }
    };

    let read_version = Arc::clone(&version);
    let fetch = move || {
        let v = read_version.load(Ordering::SeqCst);
        async move {
            let modified = if v > 3 { T1 } else { T0 };
            Ok::<_, WatchError>(Some(invoice("INV-7", v, modified)))
        }
    };

    let outcome = watch_fn(
        "INV-7",
        Baseline::new(3, Some(T0)),
        WatchOptions::default(),
        start,
        fetch,
    )
    .await?;

    assert_eq!(outcome.status, WatchStatus::CompletedViaPoll);
    // Polls at 2s and 4s see v3; the poll at 6s sees v4.
    assert_eq!(outcome.attempts_made, 3);
    assert_eq!(outcome.final_state.map(|s| s.version), Some(4));

    Ok(())
}
