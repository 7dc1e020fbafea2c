//! Structured logging setup.

use tracing_subscriber::EnvFilter;

/// Install the `tsrank` log subscriber on stderr.
///
/// `RUST_LOG` wins when set; otherwise `tsrank` events at `info` and above
/// are shown: the CLI's "query compiled" line and alias overwrite warnings.
/// Rank construction and attachment log at `debug`. stdout carries nothing
/// but the generated SQL or JSON.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tsrank=info"));

    // A second call keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
