/// The level at which a [Store](crate::Store) logs its dispatches
/// through the `log` facade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
}

impl LogLevel {
    pub fn log<S: AsRef<str>>(&self, message: S) {
        match self {
            LogLevel::Trace => log::trace!("{}", message.as_ref()),
            LogLevel::Debug => log::debug!("{}", message.as_ref()),
            LogLevel::Info => log::info!("{}", message.as_ref()),
            LogLevel::Warn => log::warn!("{}", message.as_ref()),
        }
    }

    /// Whether a message at this level would be emitted, so callers
    /// can skip formatting large stores.
    pub fn enabled(&self) -> bool {
        log::log_enabled!(self.level())
    }

    fn level(&self) -> log::Level {
        match self {
            LogLevel::Trace => log::Level::Trace,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Trace
    }
}
