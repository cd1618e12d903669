//! Logging bootstrap.
//!
//! The library only talks to the `log` facade. The binary calls
//! [`init_logging`] once at startup to route records to stderr through
//! flexi_logger, so diagnostics never mix with command output on stdout.
//!
//! `RUST_LOG` overrides the level chosen from `--verbose`.

use crate::error::{PostError, Result};
use flexi_logger::{Logger, LoggerHandle, WriteMode};
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    _handle: LoggerHandle,
}

/// Level used when `RUST_LOG` is unset.
pub fn level_for(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Starts the stderr logger. Repeated calls keep the first configuration.
pub fn init_logging(verbose: bool) -> Result<()> {
    let level = level_for(verbose);
    let state = LOGGER.get_or_try_init(|| -> Result<LoggingState> {
        let handle = Logger::try_with_env_or_str(level)
            .map_err(|err| PostError::Api(format!("invalid log level `{}`: {}", level, err)))?
            .log_to_stderr()
            .write_mode(WriteMode::Direct)
            .format(flexi_logger::default_format)
            .start()
            .map_err(|err| PostError::Api(format!("failed to start logger: {}", err)))?;

        log::debug!(
            "event=logging_init level={} version={}",
            level,
            env!("CARGO_PKG_VERSION")
        );
        Ok(LoggingState {
            level,
            _handle: handle,
        })
    })?;

    if state.level != level {
        log::debug!(
            "logging already initialized at `{}`, ignoring `{}`",
            state.level,
            level
        );
    }
    Ok(())
}
