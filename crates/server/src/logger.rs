//! Logger initialization for the server

use jiff::{Zoned, tz::TimeZone};
use logforth::{
    append::Stderr,
    filter::EnvFilter,
    layout::{JsonLayout, Layout},
};
use std::{fmt::Write, io::IsTerminal, str::FromStr, sync::Once};

static INIT: Once = Once::new();

/// How log lines are written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogStyle {
    /// Human readable, colored when stderr is a terminal.
    #[default]
    Color,
    /// Human readable, never colored.
    Text,
    /// One JSON object per line.
    Json,
}

/// Text layout: UTC timestamp, level, target, message.
#[derive(Debug)]
struct UtcLayout {
    color: bool,
}

impl UtcLayout {
    fn for_style(style: LogStyle) -> Self {
        Self {
            color: style == LogStyle::Color,
        }
    }

    fn level(&self, level: log::Level) -> String {
        let code = match level {
            log::Level::Error => 31,
            log::Level::Warn => 33,
            log::Level::Info => 32,
            log::Level::Debug => 34,
            log::Level::Trace => 35,
        };

        if self.color {
            format!("\x1b[{code}m{level:>5}\x1b[0m")
        } else {
            format!("{level:>5}")
        }
    }
}

impl Layout for UtcLayout {
    fn format(
        &self,
        record: &log::Record<'_>,
        _diagnostics: &[Box<dyn logforth::diagnostic::Diagnostic>],
    ) -> anyhow::Result<Vec<u8>> {
        let mut output = String::new();
        let now = Zoned::now().with_time_zone(TimeZone::UTC);

        write!(
            output,
            "{} {}  {}: {}",
            now.strftime("%Y-%m-%dT%H:%M:%S%.6fZ"),
            self.level(record.level()),
            record.target(),
            record.args()
        )?;

        Ok(output.into_bytes())
    }
}

/// Initialize the logger. Only the first call has any effect.
/// The log_filter should be a string like "info" or "server=debug,browser_rules=trace"
pub fn init(log_filter: &str, style: LogStyle) {
    let log_filter = log_filter.to_owned();
    INIT.call_once(move || apply_logger(log_filter, style));
}

fn apply_logger(log_filter: String, style: LogStyle) {
    let style = match style {
        LogStyle::Color if !std::io::stderr().is_terminal() => LogStyle::Text,
        style => style,
    };

    logforth::builder()
        .dispatch(move |d| {
            let filter = EnvFilter::from_str(&log_filter)
                .unwrap_or_else(|_| EnvFilter::from_str("info").expect("default filter should be valid"));

            let d = d.filter(filter);

            match style {
                LogStyle::Json => d.append(Stderr::default().with_layout(JsonLayout::default())),
                style => d.append(Stderr::default().with_layout(UtcLayout::for_style(style))),
            }
        })
        .apply();
}

#[cfg(test)]
mod tests {
    use logforth::layout::Layout;

    use super::{LogStyle, UtcLayout};

    fn format(style: LogStyle) -> String {
        let bytes = UtcLayout::for_style(style)
            .format(
                &log::Record::builder()
                    .level(log::Level::Warn)
                    .target("config::loader")
                    .args(format_args!("duplicate requirement"))
                    .build(),
                &[],
            )
            .unwrap();

        let line = String::from_utf8(bytes).unwrap();

        // drop the timestamp
        line.split_once(' ').unwrap().1.to_string()
    }

    #[test]
    fn text_layout() {
        assert_eq!(format(LogStyle::Text), " WARN  config::loader: duplicate requirement");
    }

    #[test]
    fn colored_layout() {
        assert_eq!(
            format(LogStyle::Color),
            "\x1b[33m WARN\x1b[0m  config::loader: duplicate requirement"
        );
    }
}
