//! Compute backend trait and device abstraction.
//!
//! The [`ComputeBackend`] trait abstracts over how a field update is spread
//! across threads, so that the stepping code in `polaris-core` stays
//! independent of the execution strategy.
//!
//! Every FDTD sub-step writes one field array while reading only arrays that
//! the sub-step does not write. Rows of the written array are therefore
//! independent and can be dispatched in any order.

use ndarray::{ArrayViewMut1, ArrayViewMut2};
use thiserror::Error;

/// Errors originating from compute backends.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

/// Describes the capabilities of a compute backend.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub backend_type: BackendType,
    pub threads: usize,
}

/// The type of compute backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Serial,
    Cpu,
}

/// Abstraction over compute backends.
///
/// Implementations must call `kernel` exactly once per row of `field`, passing
/// the row index along with a mutable view of that row. The order of calls is
/// unspecified.
pub trait ComputeBackend: Send + Sync {
    /// Return information about the device.
    fn device_info(&self) -> DeviceInfo;

    /// Apply `kernel` to every row of `field`.
    fn for_each_row(
        &self,
        field: ArrayViewMut2<'_, f64>,
        kernel: &(dyn Fn(usize, ArrayViewMut1<f64>) + Send + Sync),
    );
}

/// Single-threaded backend. Rows are visited in ascending order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl ComputeBackend for SerialBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: "Serial".into(),
            backend_type: BackendType::Serial,
            threads: 1,
        }
    }

    fn for_each_row(
        &self,
        mut field: ArrayViewMut2<'_, f64>,
        kernel: &(dyn Fn(usize, ArrayViewMut1<f64>) + Send + Sync),
    ) {
        for (i, row) in field.rows_mut().into_iter().enumerate() {
            kernel(i, row);
        }
    }
}
