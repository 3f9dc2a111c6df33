// The browser starts this binary. Stdout belongs to native messaging, so nothing but protocol
// frames may be printed there.

use anyhow::Result;
use clap::Parser;
use scrolltime::{
    host::{args::HostArgs, start_host},
    utils::{
        dir::application_path,
        logging::{enable_logging, HOST_PREFIX},
        runtime::single_thread_runtime,
    },
};
use tracing::{error, info};

fn main() -> Result<()> {
    let args = HostArgs::parse();
    let app_dir = application_path(args.dir.clone())?;
    enable_logging(HOST_PREFIX, &app_dir, args.log, args.log_console)?;
    info!("Started by {:?}", args.origin);

    single_thread_runtime()?
        .block_on(start_host(app_dir))
        .inspect_err(|e| error!("Host stopped with an error {e:?}"))
}
