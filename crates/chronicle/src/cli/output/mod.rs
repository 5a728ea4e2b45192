//! Output formatting utilities

use std::fmt::{self, Display};

use console::style;

use crate::exit_codes;

#[cfg(windows)]
const TICK: &str = "√";
#[cfg(not(windows))]
const TICK: &str = "✔";

#[cfg(windows)]
const CROSS: &str = "×";
#[cfg(not(windows))]
const CROSS: &str = "✖";

/// A failure already shown to the user through [`Notifier::fail`]
#[derive(Debug)]
pub struct Reported(String);

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Reported {}

/// Fill each `{}` in `template` with the next argument, in bold
pub fn format_message(template: &str, args: &[&dyn Display]) -> String {
    let mut parts = template.split("{}");
    let mut out = parts.next().unwrap_or_default().to_string();
    let mut args = args.iter();

    for part in parts {
        if let Some(arg) = args.next() {
            out.push_str(&style(arg).bold().to_string());
        }
        out.push_str(part);
    }
    out
}

/// User-facing progress notices.
///
/// The first notice of a run is preceded by a blank line; every notice is
/// followed by one.
#[derive(Debug, Default)]
pub struct Notifier {
    lines: usize,
    quiet: bool,
    messages: Vec<String>,
}

impl Notifier {
    /// Notifier printing to stdout/stderr
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier that only records its messages
    #[cfg(test)]
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }

    /// Messages emitted so far, without styling
    #[cfg(test)]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    fn leading(&self) -> &'static str {
        if self.lines == 0 {
            "\n"
        } else {
            ""
        }
    }

    /// Report a completed step, e.g. `notify("created {}", &[&path])`
    pub fn notify(&mut self, template: &str, args: &[&dyn Display]) {
        let plain = args.iter().fold(template.to_string(), |acc, arg| {
            acc.replacen("{}", &arg.to_string(), 1)
        });
        self.messages.push(plain);

        if !self.quiet {
            println!(
                "{}{} {}\n",
                self.leading(),
                style(TICK).green(),
                format_message(template, args)
            );
        }
        self.lines += 1;
    }

    /// Report a fatal condition. The returned error ends the run with the
    /// error code without being printed again.
    pub fn fail(&mut self, message: &str) -> anyhow::Error {
        self.messages.push(message.to_string());
        if !self.quiet {
            eprintln!("{}{} {}\n", self.leading(), style(CROSS).red(), message);
        }
        self.lines += 1;
        Reported(message.to_string()).into()
    }
}

/// Print a fatal error and return the exit code to use.
///
/// Verbose mode shows the full cause chain dimmed, otherwise only the
/// message in red.
pub fn output_error(error: &anyhow::Error, verbose: bool) -> i32 {
    if error.is::<Reported>() {
        return exit_codes::ERROR;
    }
    if verbose {
        eprintln!("{}", style(format!("{:?}", error)).dim());
    } else {
        eprintln!("{}", style(error).red());
    }
    exit_codes::ERROR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message_fills_placeholders() {
        console::set_colors_enabled(false);
        assert_eq!(
            format_message("output changes to {}", &[&"changelog.md"]),
            "output changes to changelog.md"
        );
        assert_eq!(format_message("{} and {}", &[&1, &2]), "1 and 2");
        assert_eq!(format_message("no args", &[]), "no args");
        assert_eq!(format_message("missing {}", &[]), "missing ");
    }

    #[test]
    fn test_notifier_records_and_counts() {
        let mut notifier = Notifier::quiet();
        assert_eq!(notifier.leading(), "\n");

        notifier.notify("created {}", &[&"changelog.md"]);
        notifier.notify("appended changes to {}", &[&"out.md"]);

        assert_eq!(
            notifier.messages(),
            &["created changelog.md", "appended changes to out.md"]
        );
        assert_eq!(notifier.leading(), "");
    }

    #[test]
    fn test_fail_is_reported_once() {
        let mut notifier = Notifier::quiet();
        let err = notifier.fail("Could not fetch commits. Is this a new repository?");

        assert!(err.is::<Reported>());
        assert_eq!(err.to_string(), "Could not fetch commits. Is this a new repository?");
        assert_eq!(notifier.messages().len(), 1);
        assert_eq!(output_error(&err, false), exit_codes::ERROR);
        assert_eq!(output_error(&err, true), exit_codes::ERROR);
    }
}
