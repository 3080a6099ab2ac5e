//! Bounded worker pool driving the per-page pipeline (spec.md §5): a fixed
//! number of threads pull page-processing closures off a channel, a shared
//! cancellation flag lets the `Job` stop dispatching new work once one page
//! fails and `continue_on_soft_render_error` is unset.
//!
//! Shape (`mpsc::channel` + `Arc<Mutex<Receiver>>` + a fixed thread count)
//! generalises the earlier multi-document batch worker pool to arbitrary
//! `FnOnce` closures, since each page's work here is a whole pipeline run
//! rather than one of a handful of fixed batch operations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

/// One page's outcome: its 0-based index and the result of running it
/// through the pipeline.
pub type PageResult<E> = (u32, Result<(), E>);

/// Runs every `(page_no, job)` pair across `num_workers` threads, respecting
/// `cancelled`: once set, jobs not yet started are reported via
/// `cancelled_error` rather than run; jobs already dispatched to a worker
/// still complete. Returns results sorted by `page_no`, not completion
/// order, so callers don't need to re-sort before handing them to the
/// Assembler.
pub fn process_pages<F, E>(
    jobs: Vec<(u32, F)>,
    num_workers: usize,
    cancelled: Arc<AtomicBool>,
    cancelled_error: impl Fn() -> E + Send + Sync + 'static,
) -> Vec<PageResult<E>>
where
    F: FnOnce() -> Result<(), E> + Send + 'static,
    E: Send + 'static,
{
    let cancelled_error = Arc::new(cancelled_error);
    let (job_tx, job_rx) = mpsc::channel::<(u32, F)>();
    let job_rx = Arc::new(Mutex::new(job_rx));
    let (result_tx, result_rx) = mpsc::channel::<PageResult<E>>();

    let handles: Vec<_> = (0..num_workers.max(1))
        .map(|_| {
            let job_rx = Arc::clone(&job_rx);
            let result_tx = result_tx.clone();
            let cancelled = Arc::clone(&cancelled);
            let cancelled_error = Arc::clone(&cancelled_error);
            thread::spawn(move || loop {
                let next = {
                    let rx = match job_rx.lock() {
                        Ok(rx) => rx,
                        Err(_) => break,
                    };
                    rx.recv()
                };
                let (idx, job) = match next {
                    Ok(pair) => pair,
                    Err(_) => break,
                };
                if cancelled.load(Ordering::SeqCst) {
                    let _ = result_tx.send((idx, Err(cancelled_error())));
                    continue;
                }
                let result = job();
                let _ = result_tx.send((idx, result));
            })
        })
        .collect();

    for job in jobs {
        if job_tx.send(job).is_err() {
            break;
        }
    }
    drop(job_tx);
    drop(result_tx);

    let mut results: Vec<_> = result_rx.into_iter().collect();
    for handle in handles {
        let _ = handle.join();
    }

    results.sort_by_key(|(idx, _)| *idx);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct TestError(String);

    fn job(i: u32) -> Box<dyn FnOnce() -> Result<(), TestError> + Send> {
        Box::new(move || {
            if i == 3 {
                Err(TestError("boom".to_string()))
            } else {
                Ok(())
            }
        })
    }

    #[test]
    fn runs_every_job_and_sorts_results_by_page_no() {
        let jobs: Vec<(u32, _)> = (0..8).map(|i| (i, job(i))).collect();
        let cancelled = Arc::new(AtomicBool::new(false));
        let results = process_pages(jobs, 4, cancelled, || TestError("cancelled".to_string()));

        assert_eq!(results.len(), 8);
        let indices: Vec<u32> = results.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
        for (idx, result) in &results {
            assert_eq!(result.is_err(), *idx == 3);
        }
    }

    #[test]
    fn pre_cancelled_pool_reports_cancelled_error_for_every_job() {
        let jobs: Vec<(u32, _)> = vec![(0, job(0))];
        let cancelled = Arc::new(AtomicBool::new(true));
        let results = process_pages(jobs, 1, cancelled, || TestError("cancelled".to_string()));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1, Err(TestError("cancelled".to_string())));
    }

    #[test]
    fn single_worker_handles_all_jobs_sequentially() {
        let jobs: Vec<(u32, _)> = (0..5).filter(|&i| i != 3).map(|i| (i, job(i))).collect();
        let cancelled = Arc::new(AtomicBool::new(false));
        let results = process_pages(jobs, 1, cancelled, || TestError("cancelled".to_string()));
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }
}
