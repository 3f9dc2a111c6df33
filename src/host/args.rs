use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "scrolltime-host", version, about = "Native messaging host for the scrolltime extension")]
pub struct HostArgs {
    /// Origin of the calling extension. Passed by the browser, unused.
    pub origin: Option<String>,
    /// Passed by Chrome on Windows, unused.
    #[arg(long = "parent-window")]
    pub parent_window: Option<String>,
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// This option is for debugging purposes only. Logs are written to stderr.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::HostArgs;

    #[test]
    fn test_accepts_browser_arguments() {
        let args = HostArgs::parse_from([
            "scrolltime-host",
            "chrome-extension://abcdefghijklmnop/",
            "--parent-window=1234",
        ]);
        assert_eq!(
            args.origin.as_deref(),
            Some("chrome-extension://abcdefghijklmnop/")
        );
        assert_eq!(args.parent_window.as_deref(), Some("1234"));
        assert!(args.dir.is_none());
    }
}
