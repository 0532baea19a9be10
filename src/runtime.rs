//! Parallel evaluation of queries over partitioned domains.
//!
//! A query is a function from a slice of domain keys to an
//! [`IntervalSetMapping`]. The [`Runtime`] splits a domain into chunks,
//! evaluates the query on a pool of scoped worker threads, and folds the
//! chunk results together with a combiner in chunk order, so output never
//! depends on thread scheduling. Progress is reported through the `log`
//! facade; install a logger (tests here use `env_logger`) to see
//! `completed/total` lines.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::error::{Result, SpatiqError};
use crate::mapping::IntervalSetMapping;

/// Configuration for [`Runtime`].
///
/// Serializable so deployments can load it alongside their own settings.
///
/// # Example
///
/// ```rust
/// use spatiq::RuntimeConfig;
///
/// let json = r#"{
///     "workers": 4,
///     "chunk_size": 8,
///     "report_progress": false
/// }"#;
/// let config = RuntimeConfig::from_json(json).unwrap();
/// assert_eq!(config.workers, Some(4));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Worker thread count; `None` uses the machine's available parallelism.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Number of domain keys handed to each query invocation.
    #[serde(default = "RuntimeConfig::default_chunk_size")]
    pub chunk_size: usize,

    /// Emit `completed/total` progress lines through the `log` facade.
    #[serde(default = "RuntimeConfig::default_report_progress")]
    pub report_progress: bool,

    /// Fail the whole run on the first chunk error instead of collecting
    /// failures.
    #[serde(default)]
    pub abort_on_error: bool,
}

impl RuntimeConfig {
    const fn default_chunk_size() -> usize {
        1
    }

    const fn default_report_progress() -> bool {
        true
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_report_progress(mut self, report: bool) -> Self {
        self.report_progress = report;
        self
    }

    pub fn with_abort_on_error(mut self, abort: bool) -> Self {
        self.abort_on_error = abort;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(SpatiqError::InvalidConfig(
                "worker count must be greater than zero".into(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(SpatiqError::InvalidConfig(
                "chunk size must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RuntimeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: RuntimeConfig =
            toml::from_str(toml_str).map_err(|e| SpatiqError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SpatiqError::InvalidConfig(e.to_string()))
    }

    fn effective_workers(&self, chunk_count: usize) -> usize {
        let available = self
            .workers
            .unwrap_or_else(|| thread::available_parallelism().map_or(1, |n| n.get()));
        available.min(chunk_count).max(1)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: None,
            chunk_size: Self::default_chunk_size(),
            report_progress: Self::default_report_progress(),
            abort_on_error: false,
        }
    }
}

/// One chunk that failed, with the keys it covered.
#[derive(Debug)]
pub struct FailedChunk<K> {
    pub keys: Vec<K>,
    pub error: SpatiqError,
}

/// Result of a [`Runtime::run`]: the combined mapping of successful
/// chunks plus whatever failed.
#[derive(Debug)]
pub struct RunOutcome<K, P> {
    pub result: IntervalSetMapping<K, P>,
    pub failed: Vec<FailedChunk<K>>,
}

impl<K, P> RunOutcome<K, P> {
    /// Whether every chunk succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Chunked parallel executor for domain-partitioned queries.
///
/// # Examples
///
/// ```
/// use spatiq::{Interval, IntervalSetMapping, Result, Runtime, RuntimeConfig, mapping};
///
/// fn detect(chunk: &[u32]) -> Result<IntervalSetMapping<u32, ()>> {
///     let mut results = IntervalSetMapping::new();
///     for &key in chunk {
///         results.add_interval(key, Interval::from_temporal(0.0, f64::from(key) + 1.0, ())?);
///     }
///     Ok(results)
/// }
///
/// let runtime = Runtime::new(RuntimeConfig::default().with_workers(2))?;
/// let domain: Vec<u32> = (0..8).collect();
/// let outcome = runtime.run(&domain, detect, mapping::disjoint_combine)?;
///
/// assert!(outcome.is_complete());
/// assert_eq!(outcome.result.len(), 8);
/// # Ok::<(), spatiq::SpatiqError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Runtime {
    config: RuntimeConfig,
}

impl Runtime {
    /// Create a runtime with a validated configuration.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// A runtime with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: RuntimeConfig::default(),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Evaluate `query` over `domain` in parallel chunks and combine the
    /// results in chunk order.
    ///
    /// A failing chunk does not abort the run unless
    /// [`RuntimeConfig::abort_on_error`] is set; its keys and error are
    /// returned in [`RunOutcome::failed`] instead.
    pub fn run<K, P, F, C>(&self, domain: &[K], query: F, combine: C) -> Result<RunOutcome<K, P>>
    where
        K: Clone + Eq + Hash + Send + Sync,
        P: Send,
        F: Fn(&[K]) -> Result<IntervalSetMapping<K, P>> + Sync,
        C: Fn(
            IntervalSetMapping<K, P>,
            IntervalSetMapping<K, P>,
        ) -> Result<IntervalSetMapping<K, P>>,
    {
        let chunks: Vec<&[K]> = domain.chunks(self.config.chunk_size).collect();
        let total = chunks.len();
        let slots: Mutex<Vec<Option<Result<IntervalSetMapping<K, P>>>>> =
            Mutex::new((0..total).map(|_| None).collect());
        let next = Mutex::new(0usize);
        let completed = Mutex::new(0usize);
        let abort = AtomicBool::new(false);

        let workers = self.config.effective_workers(total);
        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| {
                    loop {
                        if self.config.abort_on_error && abort.load(Ordering::Relaxed) {
                            break;
                        }
                        let index = {
                            let mut guard = next.lock();
                            if *guard >= total {
                                break;
                            }
                            let index = *guard;
                            *guard += 1;
                            index
                        };
                        let outcome = query(chunks[index]);
                        if self.config.abort_on_error && outcome.is_err() {
                            abort.store(true, Ordering::Relaxed);
                        }
                        if self.config.report_progress {
                            let done = {
                                let mut count = completed.lock();
                                *count += 1;
                                *count
                            };
                            log::info!("runtime progress: {done}/{total} chunks");
                        }
                        slots.lock()[index] = Some(outcome);
                    }
                });
            }
        });

        let mut result = IntervalSetMapping::new();
        let mut failed = Vec::new();
        for (index, slot) in slots.into_inner().into_iter().enumerate() {
            match slot {
                Some(Ok(mapping)) => result = combine(result, mapping)?,
                Some(Err(error)) => {
                    if self.config.abort_on_error {
                        return Err(SpatiqError::ChunkFailed {
                            index,
                            source: Box::new(error),
                        });
                    }
                    log::warn!("runtime chunk {index} failed: {error}");
                    failed.push(FailedChunk {
                        keys: chunks[index].to_vec(),
                        error,
                    });
                }
                // Chunks skipped after an abort; only reachable when
                // abort_on_error is set, and the scan above returns on the
                // failing chunk first.
                None => {}
            }
        }
        Ok(RunOutcome { result, failed })
    }
}
