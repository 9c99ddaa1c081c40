//! CPU compute backend using Rayon for shared-memory parallelism.

use ndarray::{ArrayViewMut1, ArrayViewMut2};
use rayon::prelude::*;

use crate::backend::{BackendType, ComputeBackend, ComputeError, DeviceInfo};

/// CPU backend that parallelises row updates across threads via Rayon.
pub struct CpuBackend {
    num_threads: usize,
    /// Dedicated pool when a thread count was requested; `None` uses the
    /// global Rayon pool.
    pool: Option<rayon::ThreadPool>,
}

impl CpuBackend {
    /// Create a new CPU backend using all available threads.
    pub fn new() -> Self {
        Self {
            num_threads: rayon::current_num_threads(),
            pool: None,
        }
    }

    /// Create a CPU backend with a specified thread count.
    pub fn with_threads(num_threads: usize) -> Result<Self, ComputeError> {
        if num_threads == 0 {
            return Err(ComputeError::ThreadPool(
                "thread count must be at least 1".into(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| ComputeError::ThreadPool(e.to_string()))?;
        log::debug!("Built dedicated Rayon pool with {num_threads} threads");
        Ok(Self {
            num_threads,
            pool: Some(pool),
        })
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: format!("CPU ({} threads)", self.num_threads),
            backend_type: BackendType::Cpu,
            threads: self.num_threads,
        }
    }

    fn for_each_row(
        &self,
        mut field: ArrayViewMut2<'_, f64>,
        kernel: &(dyn Fn(usize, ArrayViewMut1<f64>) + Send + Sync),
    ) {
        let rows: Vec<ArrayViewMut1<f64>> = field.rows_mut().into_iter().collect();
        let run = move || {
            rows.into_par_iter()
                .enumerate()
                .for_each(|(i, row)| kernel(i, row));
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}
