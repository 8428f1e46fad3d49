use candlecache_core::CacheError;

/// Await `fut`, bounded by an optional deadline.
///
/// On timeout returns `CacheError::RequestTimeout("request")`; call sites remap
/// the label to something more specific when useful.
pub async fn with_request_deadline<F, T>(
    deadline: Option<std::time::Duration>,
    fut: F,
) -> Result<T, CacheError>
where
    F: core::future::Future<Output = T>,
{
    match deadline {
        Some(d) => tokio::time::timeout(d, fut)
            .await
            .map_err(|_| CacheError::request_timeout("request")),
        None => Ok(fut.await),
    }
}

/// Join a collection of tasks and apply an optional request-level deadline.
///
/// Results are returned in task order regardless of completion order. This
/// wraps `futures::future::join_all(tasks)` with [`with_request_deadline`].
pub async fn join_with_deadline<I, F, T>(
    tasks: I,
    deadline: Option<std::time::Duration>,
) -> Result<Vec<T>, CacheError>
where
    I: IntoIterator<Item = F>,
    F: core::future::Future<Output = T>,
{
    with_request_deadline(deadline, futures::future::join_all(tasks)).await
}

/// Attribute an error raised by a source call to that source.
///
/// Errors that already carry upstream or deadline context pass through.
pub fn tag_err(source_name: &str, e: CacheError) -> CacheError {
    match e {
        e @ (CacheError::Upstream { .. } | CacheError::RequestTimeout { .. }) => e,
        other => CacheError::upstream(source_name, other.to_string()),
    }
}
