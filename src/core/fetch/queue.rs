// ─── Download Queue ───
// Bounded-concurrency task runner. Tasks are admitted FIFO while fewer
// than `max_parallel` are in flight, stream their bodies straight to
// disk, and retry on a fixed backoff until their budget runs out.
// Retry exhaustion is fatal for the whole batch. Drain detection is a
// cooperative fixed-interval poll, not completion events.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};

/// Default per-task retry budget.
pub const DEFAULT_RETRIES: u32 = 20;

/// Fixed (not exponential) pause before a failed task re-enters the queue.
const RETRY_BACKOFF: Duration = Duration::from_secs(3);

/// Reporting and drain-poll interval.
const TICK: Duration = Duration::from_millis(100);

/// One artifact download unit.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub url: String,
    pub dest: PathBuf,
    pub size: u64,
    pub sha1: Option<String>,
    pub retries: u32,
}

impl DownloadTask {
    pub fn new(url: impl Into<String>, dest: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            size,
            sha1: None,
            retries: DEFAULT_RETRIES,
        }
    }

    pub fn with_sha1(mut self, sha1: impl Into<String>) -> Self {
        self.sha1 = Some(sha1.into());
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

struct QueueState {
    pending: VecDeque<DownloadTask>,
    in_flight: usize,
    completed: usize,
    total_tasks: usize,
    fatal: Option<LauncherError>,
}

struct QueueInner {
    client: Client,
    max_parallel: usize,
    total_bytes: Option<u64>,
    state: Mutex<QueueState>,
    transferred: AtomicU64,
    started: Instant,
    bar: ProgressBar,
}

/// Bounded-concurrency download queue with aggregate progress reporting.
pub struct DownloadQueue {
    inner: Arc<QueueInner>,
    reporter: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl DownloadQueue {
    /// Construct a queue draining at most `max_parallel` tasks at once.
    /// `total_bytes` feeds the byte-fraction progress display; without it
    /// progress falls back to completed/total task counts.
    pub fn new(client: Client, max_parallel: usize, total_bytes: Option<u64>) -> Self {
        let bar = ProgressBar::new(total_bytes.unwrap_or(0));
        bar.set_style(
            ProgressStyle::with_template("[{bar:30.cyan/blue}] {percent:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█░ "),
        );

        let inner = Arc::new(QueueInner {
            client,
            max_parallel: max_parallel.max(1),
            total_bytes,
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                in_flight: 0,
                completed: 0,
                total_tasks: 0,
                fatal: None,
            }),
            transferred: AtomicU64::new(0),
            started: Instant::now(),
            bar,
        });

        let reporter = {
            let inner = Arc::clone(&inner);
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(TICK).await;
                    inner.update_progress(false);
                }
            })
        };

        Self {
            inner,
            reporter: Mutex::new(Some(reporter)),
        }
    }

    /// Enqueue a task. Accepted any time, including while draining.
    pub fn add_task(&self, task: DownloadTask) {
        {
            let mut state = self.inner.state.lock().unwrap();
            state.pending.push_back(task);
            state.total_tasks += 1;
            if self.inner.total_bytes.is_none() {
                self.inner.bar.set_length(state.total_tasks as u64);
            }
        }
        QueueInner::pump(&self.inner);
    }

    /// Pending and in-flight counts, in that order.
    pub fn counts(&self) -> (usize, usize) {
        let state = self.inner.state.lock().unwrap();
        (state.pending.len(), state.in_flight)
    }

    /// Block until the queue is fully drained, then finalize reporting.
    /// Returns the fatal error when any task exhausted its retry budget.
    pub async fn wait(&self) -> LauncherResult<()> {
        loop {
            {
                let state = self.inner.state.lock().unwrap();
                let drained = state.pending.is_empty() || state.fatal.is_some();
                if state.in_flight == 0 && drained {
                    break;
                }
            }
            tokio::time::sleep(TICK).await;
        }

        self.inner.update_progress(true);
        if let Some(handle) = self.reporter.lock().unwrap().take() {
            handle.abort();
        }
        self.inner.bar.finish();

        let mut state = self.inner.state.lock().unwrap();
        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl QueueInner {
    /// Admit pending tasks while capacity allows. Admission stops for
    /// good once a fatal failure is recorded.
    fn pump(inner: &Arc<Self>) {
        let mut admitted = Vec::new();
        {
            let mut state = inner.state.lock().unwrap();
            while state.fatal.is_none()
                && state.in_flight < inner.max_parallel
                && !state.pending.is_empty()
            {
                let task = state.pending.pop_front().unwrap();
                state.in_flight += 1;
                admitted.push(task);
            }
        }
        for task in admitted {
            let inner = Arc::clone(inner);
            tokio::spawn(async move {
                QueueInner::run_task(inner, task).await;
            });
        }
    }

    async fn run_task(inner: Arc<Self>, task: DownloadTask) {
        let result = inner.attempt(&task).await;

        match result {
            Ok(()) => {
                debug!("Downloaded {} -> {:?}", task.url, task.dest);
                let mut state = inner.state.lock().unwrap();
                state.completed += 1;
                state.in_flight -= 1;
            }
            Err(err) if task.retries > 0 => {
                warn!(
                    "Download of {} failed ({} retries left): {}",
                    task.url, task.retries, err
                );
                tokio::time::sleep(RETRY_BACKOFF).await;
                let mut state = inner.state.lock().unwrap();
                let mut task = task;
                task.retries -= 1;
                state.pending.push_back(task);
                state.in_flight -= 1;
            }
            Err(err) => {
                warn!("Download of {} failed permanently: {}", task.url, err);
                let mut state = inner.state.lock().unwrap();
                state.fatal = Some(LauncherError::RetriesExhausted {
                    url: task.url.clone(),
                    reason: err.to_string(),
                });
                state.in_flight -= 1;
            }
        }

        QueueInner::pump(&inner);
    }

    /// One attempt: stream the response body to the destination file,
    /// then verify the content hash when the task carries one. Partial
    /// files from failed attempts are left in place.
    async fn attempt(&self, task: &DownloadTask) -> LauncherResult<()> {
        if let Some(parent) = task.dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| LauncherError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let response = self.client.get(&task.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: task.url.clone(),
                status: status.as_u16(),
            });
        }

        let mut file =
            tokio::fs::File::create(&task.dest)
                .await
                .map_err(|source| LauncherError::Io {
                    path: task.dest.clone(),
                    source,
                })?;

        let mut hasher = task.sha1.as_ref().map(|_| Sha1::new());
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|source| LauncherError::Io {
                    path: task.dest.clone(),
                    source,
                })?;
            if let Some(hasher) = hasher.as_mut() {
                hasher.update(&chunk);
            }
            self.transferred
                .fetch_add(chunk.len() as u64, Ordering::Relaxed);
        }

        file.flush().await.map_err(|source| LauncherError::Io {
            path: task.dest.clone(),
            source,
        })?;
        drop(file);

        if let (Some(expected), Some(hasher)) = (task.sha1.as_deref(), hasher) {
            let actual = hex::encode(hasher.finalize());
            if actual != expected {
                return Err(LauncherError::Sha1Mismatch {
                    path: task.dest.clone(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        Ok(())
    }

    /// Recompute aggregate throughput and ETA on the fixed reporting tick.
    fn update_progress(&self, finished: bool) {
        let transferred = self.transferred.load(Ordering::Relaxed);
        let elapsed = self.started.elapsed().as_secs_f64().max(0.01);
        let speed = transferred as f64 / elapsed;

        let (completed, total_tasks, active) = {
            let state = self.state.lock().unwrap();
            (state.completed, state.total_tasks, state.in_flight)
        };

        match self.total_bytes {
            Some(total) => {
                self.bar.set_position(transferred.min(total));
                let eta = if speed > 0.0 {
                    (total.saturating_sub(transferred)) as f64 / speed
                } else {
                    f64::INFINITY
                };
                self.bar.set_message(if finished {
                    format!("done | {}/{} files", completed, total_tasks)
                } else {
                    format!(
                        "{}/s | {}/{} files | {} active | eta {:.1}s",
                        format_size(speed as u64),
                        completed,
                        total_tasks,
                        active,
                        eta
                    )
                });
            }
            None => {
                self.bar.set_position(completed as u64);
                self.bar.set_message(if finished {
                    format!("done | {}/{} files", completed, total_tasks)
                } else {
                    format!(
                        "{}/s | {}/{} files | {} active",
                        format_size(speed as u64),
                        completed,
                        total_tasks,
                        active
                    )
                });
            }
        }
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f < KIB {
        format!("{} B", bytes)
    } else if bytes_f < KIB * KIB {
        format!("{:.2} KB", bytes_f / KIB)
    } else if bytes_f < KIB * KIB * KIB {
        format!("{:.2} MB", bytes_f / (KIB * KIB))
    } else {
        format!("{:.2} GB", bytes_f / (KIB * KIB * KIB))
    }
}
