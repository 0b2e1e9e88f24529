use tokio::task::JoinError;

/// Run CPU-bound work such as password hashing on the blocking pool.
pub(crate) async fn offload<T, F>(work: F) -> Result<T, JoinError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[tokio::test]
    async fn test_offload_leaves_the_runtime_thread() {
        let runtime_thread = thread::current().id();

        let worker_thread = offload(|| thread::current().id()).await.unwrap();

        assert_ne!(worker_thread, runtime_thread);
    }
}
