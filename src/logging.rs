use std::io::Write;
use std::time::Instant;

use log::{Level, LevelFilter};

/// Installs a logger writing to stderr, debug records are only shown when `verbose` is set.
pub fn init(verbose: bool) {
    let level = if verbose { Level::Debug } else { Level::Warn };

    let logger = StderrLogger {
        level,
        start: Instant::now(),
    };

    if log::set_boxed_logger(Box::new(logger)).is_err() {
        eprintln!("A logger was already installed.");
        return;
    }

    log::set_max_level(match verbose {
        true => LevelFilter::Debug,
        false => LevelFilter::Warn,
    });
}

struct StderrLogger {
    level: Level,
    start: Instant,
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            // nowhere left to report a failing stderr
            let _ = writeln!(
                std::io::stderr().lock(),
                "{:0.3}: {} - {}",
                self.start.elapsed().as_secs_f32(),
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
