use std::{fs::File, io::Write};

use env_logger::{Builder, Target, WriteStyle, fmt::Formatter};
use log::{Level, Record};

use crate::{
    Error, Result,
    options::{LogFormat, SolverOptions},
};

pub fn init_logger(options: &SolverOptions) -> Result<()> {
    let mut builder = builder(
        options.log_level.to_filter(),
        options.log_format,
        options.log_timestamp,
    );

    if let Some(log_path) = options.log_output_path() {
        let log_file = File::create(log_path).map_err(|e| {
            Error::other(format!(
                "failed to create log output file {}: {e}",
                log_path.display()
            ))
        })?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| Error::other(format!("logger init failed: {e}")))
}

fn builder(filter: log::LevelFilter, format: LogFormat, timestamp: bool) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(filter)
        .write_style(WriteStyle::Never)
        .format(move |buf: &mut Formatter, record: &Record<'_>| {
            if timestamp {
                write!(buf, "{} ", buf.timestamp_millis())?;
            }
            writeln!(buf, "{}", render(format, record))
        });
    builder
}

fn render(format: LogFormat, record: &Record<'_>) -> String {
    match format {
        LogFormat::Compact => format!("{} {}", level_tag(record.level()), record.args()),
        LogFormat::Pretty => format!(
            "{} [{}] {}",
            level_tag(record.level()),
            record.target(),
            record.args()
        ),
    }
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}
