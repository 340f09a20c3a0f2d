//! Turns a [`WriterConfig`](crate::config::WriterConfig) into the boxed
//! `MakeWriter` the format layer writes through.

use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::WriterConfig;
use crate::core::LogResult;

/// Guard kept alive for the lifetime of the logger so buffered writes are
/// flushed on shutdown. A no-op unit when the `file` feature is disabled,
/// since there is nothing buffered to flush for stdout/stderr.
#[cfg(feature = "file")]
pub type Guard = tracing_appender::non_blocking::WorkerGuard;
#[cfg(not(feature = "file"))]
pub type Guard = ();

/// Build the writer for the configured sink.
///
/// Returns the boxed writer plus any guards that must outlive the
/// subscriber (non-blocking file writers flush on drop of their guard).
///
/// # Errors
///
/// Returns an error if the configured sink cannot be initialized.
pub fn make_writer(config: &WriterConfig) -> LogResult<(BoxMakeWriter, Vec<Guard>)> {
    match config {
        WriterConfig::Stdout => Ok((BoxMakeWriter::new(std::io::stdout), Vec::new())),
        WriterConfig::Stderr => Ok((BoxMakeWriter::new(std::io::stderr), Vec::new())),
        #[cfg(feature = "file")]
        WriterConfig::File {
            directory,
            file_name_prefix,
        } => {
            let appender = tracing_appender::rolling::daily(directory, file_name_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            Ok((BoxMakeWriter::new(non_blocking), vec![guard]))
        }
    }
}
