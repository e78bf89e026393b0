//! Bounded-concurrency batch runner.
//!
//! Items are pulled from a single shared cursor: the moment one worker
//! finishes, the next queued item starts. Results come back in submission
//! order regardless of completion order, one per item, always.

use std::future::Future;

use futures::stream::{self, StreamExt};
use stagekit_engine::BulkResult;

/// What a worker observed for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkResponse {
    pub status: u16,
    pub error: Option<String>,
}

/// Run `worker` over `items` with at most `concurrency` in flight.
///
/// A worker error is captured into that item's result and never aborts
/// siblings or the batch. `concurrency` is taken as supplied (floored at
/// 1); there is no implicit cap.
pub async fn run<W, Fut>(items: Vec<String>, concurrency: usize, worker: W) -> Vec<BulkResult>
where
    W: Fn(String) -> Fut,
    Fut: Future<Output = anyhow::Result<BulkResponse>>,
{
    let concurrency = concurrency.max(1);
    stream::iter(items.into_iter().map(|path| {
        let work = worker(path.clone());
        async move {
            match work.await {
                Ok(response) => BulkResult {
                    ok: (200..300).contains(&response.status),
                    status: response.status,
                    error: response.error,
                    path,
                },
                Err(err) => BulkResult {
                    ok: false,
                    status: 0,
                    error: Some(err.to_string()),
                    path,
                },
            }
        }
    }))
    .buffered(concurrency)
    .collect()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[tokio::test]
    async fn captures_worker_errors_per_item() {
        let results = run(
            vec!["/a".to_string(), "/b".to_string(), "/c".to_string()],
            2,
            |path| async move {
                if path == "/b" {
                    anyhow::bail!("connection reset");
                }
                Ok(BulkResponse {
                    status: 200,
                    error: None,
                })
            },
        )
        .await;

        assert_eq!(results.len(), 3);
        assert!(results[0].ok);
        assert!(!results[1].ok);
        assert_eq!(results[1].status, 0);
        assert_eq!(results[1].error.as_deref(), Some("connection reset"));
        assert!(results[2].ok);
    }

    #[tokio::test]
    async fn non_2xx_statuses_are_failures() {
        let results = run(vec!["/a".to_string()], 1, |_path| async {
            Ok(BulkResponse {
                status: 502,
                error: Some("bad gateway".to_string()),
            })
        })
        .await;
        assert!(!results[0].ok);
        assert_eq!(results[0].status, 502);
    }

    #[tokio::test]
    async fn results_keep_submission_order_for_any_concurrency() {
        let items: Vec<String> = (0..12).map(|i| format!("/{}", i)).collect();
        for concurrency in [1, 2, 3, 8, 16] {
            let results = run(items.clone(), concurrency, |path| async move {
                // Earlier items finish later, so completion order inverts
                // submission order whenever workers overlap.
                let index: usize = path[1..].parse().unwrap();
                for _ in 0..(12 - index) {
                    tokio::task::yield_now().await;
                }
                Ok(BulkResponse {
                    status: 200,
                    error: None,
                })
            })
            .await;

            let paths: Vec<&str> = results.iter().map(|r| r.path.as_str()).collect();
            let expected: Vec<&str> = items.iter().map(String::as_str).collect();
            assert_eq!(paths, expected, "concurrency {}", concurrency);
        }
    }

    #[tokio::test]
    async fn overlap_never_exceeds_concurrency() {
        let in_flight = Rc::new(Cell::new(0usize));
        let peak = Rc::new(Cell::new(0usize));

        let results = run(
            (0..16).map(|i| format!("/{}", i)).collect(),
            3,
            |_path| {
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                async move {
                    in_flight.set(in_flight.get() + 1);
                    peak.set(peak.get().max(in_flight.get()));
                    tokio::task::yield_now().await;
                    in_flight.set(in_flight.get() - 1);
                    Ok(BulkResponse {
                        status: 200,
                        error: None,
                    })
                }
            },
        )
        .await;

        assert_eq!(results.len(), 16);
        assert!(peak.get() <= 3, "peak overlap was {}", peak.get());
        assert!(peak.get() > 1, "workers never overlapped");
    }
}
