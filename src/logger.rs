use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;

pub const LOG_FILE: &str = "slide_quiz.log";

/// Routes `log` records to a file; the terminal belongs to the UI.
/// Calling it more than once is harmless. If the file cannot be opened a
/// single warning goes to stderr before the UI starts and logging stays off.
pub fn init() {
    if let Err(e) = init_at(Path::new(LOG_FILE)) {
        eprintln!("slide-quiz: logging disabled, cannot open {}: {}", LOG_FILE, e);
    }
}

pub fn init_at(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_init_twice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.log");
        init_at(&path).unwrap();
        init_at(&path).unwrap();
        log::info!("logger test message");
        assert!(path.exists());
    }

    #[test]
    fn test_unwritable_log_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("quiz.log");
        assert!(init_at(&path).is_err());
        assert!(!path.exists());
    }
}
