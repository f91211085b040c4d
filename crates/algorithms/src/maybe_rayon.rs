//! Per-target work distribution.
//!
//! With the `parallel` feature, index ranges are mapped with rayon and the
//! results gathered back in index order. Without it (e.g. WASM builds) the
//! same helpers run sequentially, so output is identical either way.

use georegrid_core::Result;

#[cfg(feature = "parallel")]
mod imp {
    use georegrid_core::Result;
    use rayon::prelude::*;

    pub fn try_par_map<T, F>(n: usize, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> Result<T> + Sync + Send,
    {
        (0..n).into_par_iter().map(f).collect()
    }

    pub fn set_num_threads(threads: usize) {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok(); // Ignore if already initialized
    }

    pub fn num_threads() -> usize {
        rayon::current_num_threads()
    }
}

#[cfg(not(feature = "parallel"))]
mod imp {
    use georegrid_core::Result;

    pub fn try_par_map<T, F>(n: usize, f: F) -> Result<Vec<T>>
    where
        F: Fn(usize) -> Result<T>,
    {
        (0..n).map(f).collect()
    }

    pub fn set_num_threads(_threads: usize) {}

    pub fn num_threads() -> usize {
        1
    }
}

/// Map `f` over `0..n`, returning results in index order.
///
/// Stops at an error; which error wins is unspecified when several
/// indices fail.
pub(crate) fn try_par_map<T, F>(n: usize, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    imp::try_par_map(n, f)
}

/// Configure the global worker pool. No-op without the `parallel` feature.
pub fn set_num_threads(threads: usize) {
    imp::set_num_threads(threads)
}

/// Number of workers per-target work is spread over
pub fn num_threads() -> usize {
    imp::num_threads()
}
