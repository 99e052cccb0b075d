use crate::error::Result;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;

/// Install the global fmt subscriber.
///
/// Logs go to stderr, or to `log_file` without colours when one is given.
/// A second call is a no-op.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Logging already initialised");
    }
    Ok(())
}
