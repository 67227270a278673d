use colored::Colorize;
use log::{Level, LevelFilter, Metadata, Record};
use std::io::Write;

/// Crates whose records are shown below trace level.
const OWN_TARGETS: [&str; 2] = ["dlc", "undlc"];

/// Writes records to stderr, stdout only carries links and containers.
///
/// Records of the http stack are dropped unless tracing, debug output should
/// only show the key exchange and container steps.
pub struct Logger;

static LOGGER: Logger = Logger;

impl Logger {
    pub fn init(level: LevelFilter) {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
            && (log::max_level() == LevelFilter::Trace || is_own_target(metadata.target()))
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(std::io::stderr().lock(), "{}", format_record(record));
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn is_own_target(target: &str) -> bool {
    let krate = target.split("::").next().unwrap_or_default();
    OWN_TARGETS.contains(&krate)
}

/// `info` is printed bare, `warn` and `error` get the same prefix as the
/// final error line, debugging levels name their module.
fn format_record(record: &Record) -> String {
    match record.level() {
        Level::Info => record.args().to_string(),
        Level::Warn => format!("{}: {}", "warning".bold().yellow(), record.args()),
        Level::Error => format!("{}: {}", "error".bold().red(), record.args()),
        Level::Debug => format!(
            "{} {} {}",
            "debug".bold().blue(),
            record.target().dimmed(),
            record.args()
        ),
        Level::Trace => {
            let location = match (record.file(), record.line()) {
                (Some(file), Some(line)) => format!("{}:{}", file, line),
                _ => "unknown".to_owned(),
            };

            format!(
                "{} {} {} {}",
                "trace".bold().purple(),
                record.target().dimmed(),
                location.dimmed(),
                record.args()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(level: Level, target: &str, args: std::fmt::Arguments) -> String {
        colored::control::set_override(false);
        format_record(
            &Record::builder()
                .level(level)
                .target(target)
                .file(Some("dlc/src/codec.rs"))
                .line(Some(40))
                .args(args)
                .build(),
        )
    }

    #[test]
    fn test_format_levels() {
        assert_eq!(
            format(Level::Info, "undlc::commands", format_args!("saved a.dlc")),
            "saved a.dlc"
        );
        assert_eq!(
            format(Level::Error, "undlc::commands", format_args!("unable to decrypt a.dlc")),
            "error: unable to decrypt a.dlc"
        );
        assert_eq!(
            format(Level::Warn, "dlc::text", format_args!("odd input")),
            "warning: odd input"
        );
        assert_eq!(
            format(Level::Debug, "dlc::codec", format_args!("registering new container key")),
            "debug dlc::codec registering new container key"
        );
        assert_eq!(
            format(Level::Trace, "dlc::codec", format_args!("decrypting 16 bytes")),
            "trace dlc::codec dlc/src/codec.rs:40 decrypting 16 bytes"
        );
    }

    #[test]
    fn test_own_targets() {
        assert!(is_own_target("dlc"));
        assert!(is_own_target("dlc::service"));
        assert!(is_own_target("undlc::commands::decode"));
        assert!(!is_own_target("reqwest::connect"));
        assert!(!is_own_target("dlcx"));
    }
}
