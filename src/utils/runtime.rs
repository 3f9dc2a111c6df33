use anyhow::Result;

/// Every handler in scrolltime runs to completion before the next one starts, so one thread is
/// all the host needs.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
