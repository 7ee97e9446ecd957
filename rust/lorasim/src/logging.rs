use log::{LevelFilter, Metadata, Record};
use std::sync::Once;

pub struct SimLogger {
    level: LevelFilter,
}

impl log::Log for SimLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!(
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static INIT: Once = Once::new();

/// Installs the process-wide logger. Only the first call has any effect.
pub fn init_logger(level: LevelFilter) {
    INIT.call_once(|| {
        let logger = SimLogger { level };
        if log::set_boxed_logger(Box::new(logger)).is_ok() {
            log::set_max_level(level);
        }
    });
}
