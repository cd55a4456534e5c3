//! Linesync server binary.

use clap::Parser;
use linesync_server::{CliArgs, ServerConfig, SyncServer};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // The blocking HTTP client owns its own runtime, so the server is built
    // and dropped outside the async one.
    let server = SyncServer::new(ServerConfig::from(&args))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server.run())?;
    drop(runtime);

    drop(server);
    Ok(())
}
