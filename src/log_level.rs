/// Verbosity accepted by `--log`. Diagnostics go to stderr, so any level
/// leaves the report on stdout unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::str::FromStr for LogLevel {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off"   => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn"  => Ok(LogLevel::Warn),
            "info"  => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _       => Err("log level must be one of off, error, warn, info, debug, trace")
        }
    }
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(log_level: &LogLevel) -> Self {
        match log_level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_convert() {
        let level: LogLevel = "debug".parse().unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert_eq!(log::LevelFilter::from(&level), log::LevelFilter::Debug);
        assert_eq!(log::LevelFilter::from(&LogLevel::Off), log::LevelFilter::Off);
        assert_eq!(
            "loud".parse::<LogLevel>(),
            Err("log level must be one of off, error, warn, info, debug, trace")
        );
    }
}
