//! Phase kernels over row indices, on a crate-local rayon pool when available.

use crate::error::{try_vec, RowResult};
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::prelude::*;
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::ThreadPool;
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use std::sync::OnceLock;

/// Whether row phases may fan out across threads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExecMode {
    SingleThreaded,
    #[default]
    MultiThreaded,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExecConfig {
    pub mode: ExecMode,
    /// Inputs with fewer rows run sequentially.
    pub min_parallel_rows: usize,
    /// Target occupancy of the distinct hash map; clamped to `[0.05, 0.9]`.
    pub hash_load_factor: f64,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            mode: ExecMode::MultiThreaded,
            min_parallel_rows: 4096,
            hash_load_factor: 0.5,
        }
    }
}

impl ExecConfig {
    pub fn single_threaded() -> Self {
        Self {
            mode: ExecMode::SingleThreaded,
            ..Self::default()
        }
    }

    pub fn load_factor(&self) -> f64 {
        if self.hash_load_factor.is_nan() {
            return 0.5;
        }
        self.hash_load_factor.clamp(0.05, 0.9)
    }
}

/// Best-effort rayon thread pool owned by this crate.
///
/// Building the global pool can fail under resource pressure and rayon then
/// panics on first use. A crate-local pool lets callers fall back to serial
/// execution instead.
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
static RAYON_POOL: OnceLock<Option<ThreadPool>> = OnceLock::new();

#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
fn desired_rayon_threads() -> usize {
    let from_env = std::env::var("RAYON_NUM_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0);
    from_env.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    })
}

#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
fn build_rayon_pool() -> Option<ThreadPool> {
    let requested = desired_rayon_threads().max(1);
    let try_build = |n| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .thread_name(|i| format!("strata-rows-{i}"))
            .build()
    };

    match try_build(requested) {
        Ok(pool) => Some(pool),
        Err(err) if requested > 1 => {
            log::debug!("rayon pool with {requested} threads failed ({err}), retrying with 1");
            try_build(1).ok()
        }
        Err(err) => {
            log::debug!("rayon pool unavailable ({err}), running serially");
            None
        }
    }
}

/// Returns the crate-local rayon thread pool, if one could be created.
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
pub(crate) fn rayon_pool() -> Option<&'static ThreadPool> {
    RAYON_POOL.get_or_init(build_rayon_pool).as_ref()
}

/// Runs one phase over `0..n`; every call returns only after all rows finished.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Executor {
    Serial,
    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    Pool(&'static ThreadPool),
}

impl Executor {
    pub(crate) fn new(config: &ExecConfig, rows: usize) -> Self {
        if config.mode == ExecMode::SingleThreaded || rows < config.min_parallel_rows {
            return Executor::Serial;
        }
        #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
        {
            if let Some(pool) = rayon_pool() {
                return Executor::Pool(pool);
            }
        }
        Executor::Serial
    }

    pub(crate) fn is_parallel(&self) -> bool {
        !matches!(self, Executor::Serial)
    }

    /// `f(i)` for every `i` in `0..n`, in index order.
    pub(crate) fn map<T, F>(&self, what: &'static str, n: usize, f: F) -> RowResult<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        let mut out = try_vec(what, n)?;
        match self {
            Executor::Serial => out.extend((0..n).map(f)),
            #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
            Executor::Pool(pool) => {
                pool.install(|| (0..n).into_par_iter().map(f).collect_into_vec(&mut out))
            }
        }
        Ok(out)
    }

    /// The `Some` results of `f(i)` for `i` in `0..n`, in index order.
    pub(crate) fn filter_map<T, F>(&self, n: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> Option<T> + Sync + Send,
    {
        match self {
            Executor::Serial => (0..n).filter_map(f).collect(),
            #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
            Executor::Pool(pool) => pool.install(|| (0..n).into_par_iter().filter_map(f).collect()),
        }
    }

    pub(crate) fn for_each<F>(&self, n: usize, f: F)
    where
        F: Fn(usize) + Sync + Send,
    {
        match self {
            Executor::Serial => (0..n).for_each(f),
            #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
            Executor::Pool(pool) => pool.install(|| (0..n).into_par_iter().for_each(f)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_factor_is_clamped() {
        let mut config = ExecConfig::default();
        assert_eq!(config.load_factor(), 0.5);
        config.hash_load_factor = 2.0;
        assert_eq!(config.load_factor(), 0.9);
        config.hash_load_factor = 0.0;
        assert_eq!(config.load_factor(), 0.05);
        config.hash_load_factor = f64::NAN;
        assert_eq!(config.load_factor(), 0.5);
    }

    #[test]
    fn small_inputs_run_serially() {
        let exec = Executor::new(&ExecConfig::default(), 10);
        assert!(!exec.is_parallel());
        let exec = Executor::new(&ExecConfig::single_threaded(), 1 << 20);
        assert!(!exec.is_parallel());
    }

    #[test]
    fn kernels_preserve_index_order() {
        let config = ExecConfig {
            min_parallel_rows: 0,
            ..ExecConfig::default()
        };
        let exec = Executor::new(&config, 10_000);

        let squares = exec.map("squares", 10_000, |i| i * i).unwrap();
        assert_eq!(squares[9_999], 9_999 * 9_999);
        assert!(squares.windows(2).all(|w| w[0] < w[1]));

        let odds = exec.filter_map(10_000, |i| (i % 2 == 1).then_some(i));
        assert_eq!(odds.len(), 5_000);
        assert!(odds.windows(2).all(|w| w[0] < w[1]));

        let sum = std::sync::atomic::AtomicUsize::new(0);
        exec.for_each(100, |i| {
            sum.fetch_add(i, std::sync::atomic::Ordering::Relaxed);
        });
        assert_eq!(sum.into_inner(), 4950);
    }
}
