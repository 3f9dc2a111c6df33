use tokio::select;
use tokio_util::sync::CancellationToken;

/// Resolves once ctrl-c is received or something else cancelled the token, for example the
/// browser closing stdin.
///
/// Tokio reads stdin on a blocking thread that can't be interrupted, so after ctrl-c the process
/// may only exit once stdin receives more input or is closed. When the browser owns the host this
/// doesn't matter, it always closes stdin. It mostly shows up with `serve` in a terminal.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => (),
    };
}
