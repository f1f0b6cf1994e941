use crate::foundation::error::{StitchError, StitchResult};

/// Where per-fragment work runs.
pub(crate) enum Executor {
    /// Plain loop on the calling thread.
    Sequential,
    /// rayon's global pool.
    Global,
    /// A dedicated pool owned by the compositor.
    Pool(rayon::ThreadPool),
}

impl Executor {
    pub(crate) fn new(parallel: bool, threads: Option<usize>) -> StitchResult<Self> {
        if let Some(n) = threads
            && n == 0
        {
            return Err(StitchError::request(
                "compositor 'threads' must be >= 1 when set",
            ));
        }
        if !parallel {
            return Ok(Self::Sequential);
        }
        match threads {
            None => Ok(Self::Global),
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map(Self::Pool)
                .map_err(|e| {
                    StitchError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}"))
                }),
        }
    }

    pub(crate) fn is_parallel(&self) -> bool {
        !matches!(self, Self::Sequential)
    }

    /// Run `f` inside the dedicated pool when there is one.
    pub(crate) fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match self {
            Self::Pool(pool) => pool.install(f),
            Self::Sequential | Self::Global => f(),
        }
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => f.write_str("Sequential"),
            Self::Global => f.write_str("Global"),
            Self::Pool(pool) => write!(f, "Pool({} threads)", pool.current_num_threads()),
        }
    }
}
