use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global diagnostics subscriber.
///
/// Verbosity follows `RUST_LOG` (default `warn`). With a log file, output is
/// appended there so it never interleaves with the chat transcript; without
/// one it goes to stderr.
pub fn init_tracing(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    }
    .map_err(|err| err as Box<dyn Error>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_with_file_creates_log() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("gyaan.log");
        // Another test may have installed a subscriber first; the file is
        // opened before installation either way.
        let _ = init_tracing(Some(&path));
        assert!(path.exists());
    }

    #[test]
    fn second_init_reports_error() {
        let _ = init_tracing(None);
        let err = init_tracing(None).expect_err("global subscriber already set");
        assert!(!err.to_string().is_empty());
    }
}
