//! Publish command implementation

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::cli::{CommandContext, GlobalOptions, OutputFormat, PublishArgs};
use crate::client::{ElasticsearchClient, IndexResponse};
use crate::error::Result;
use crate::output;
use crate::report::ReadPolicy;
use crate::step::{PublishStep, StepInvocationContext};

/// JSON view of a publish run
#[derive(Serialize)]
struct PublishOutput<'a> {
    report: &'a str,
    index: String,
    targets_read: usize,
    documents: &'a [IndexResponse],
}

/// Run the publish step against the configured endpoint
pub async fn run(opts: &GlobalOptions, args: &PublishArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let settings = ctx.settings()?;
    let config = settings.get();

    let policy = if args.all_targets {
        ReadPolicy::All
    } else {
        ReadPolicy::LastOnly
    };
    let step = PublishStep::new(args.report.clone()).with_policy(policy);

    let spinner = spinner(&format!("Publishing {}", args.report));

    // Listener lines are the build log; keep stdout clean for JSON output.
    let sink: Box<dyn Write> = match ctx.format {
        OutputFormat::Pretty => Box::new(io::stdout()),
        OutputFormat::Json => Box::new(io::stderr()),
    };
    let mut listener = SuspendingWriter::new(sink, spinner.clone());

    let mut invocation = StepInvocationContext::new(&args.workspace, &mut listener);
    let result = step
        .perform(&mut invocation, config, |config| {
            ElasticsearchClient::from_config(config, &ctx.credentials)
        })
        .await;
    listener.flush()?;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let summary = result?;

    match ctx.format {
        OutputFormat::Pretty => {
            if summary.responses.is_empty() {
                println!("{} No scan targets in {}", "○".dimmed(), args.report);
            } else {
                println!(
                    "{} Published {} of {} target(s) to index {}",
                    "✓".green(),
                    summary.responses.len(),
                    summary.targets_read,
                    config.index_name().cyan()
                );
            }
        }
        OutputFormat::Json => {
            output::print_json(&PublishOutput {
                report: &args.report,
                index: config.index_name(),
                targets_read: summary.targets_read,
                documents: &summary.responses,
            })?;
        }
    }

    Ok(())
}

/// Writer that hides the spinner while complete lines are written, so log
/// lines are never drawn over. Partial lines wait for their newline.
struct SuspendingWriter<W: Write> {
    inner: W,
    spinner: Option<ProgressBar>,
    pending: Vec<u8>,
}

impl<W: Write> SuspendingWriter<W> {
    fn new(inner: W, spinner: Option<ProgressBar>) -> Self {
        Self {
            inner,
            spinner,
            pending: Vec::new(),
        }
    }

    fn write_through(&mut self, bytes: &[u8]) -> io::Result<()> {
        let inner = &mut self.inner;
        match self.spinner {
            Some(ref spinner) => spinner.suspend(|| {
                inner.write_all(bytes)?;
                inner.flush()
            }),
            None => {
                inner.write_all(bytes)?;
                inner.flush()
            }
        }
    }
}

impl<W: Write> Write for SuspendingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        if let Some(end) = self.pending.iter().rposition(|&b| b == b'\n') {
            let lines: Vec<u8> = self.pending.drain(..=end).collect();
            self.write_through(&lines)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.write_through(&rest)?;
        }
        self.inner.flush()
    }
}

/// Spinner on stderr, only when a person is watching
fn spinner(message: &str) -> Option<ProgressBar> {
    if !io::stderr().is_terminal() {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suspending_writer_emits_whole_lines() {
        let mut out = Vec::new();
        {
            let mut writer = SuspendingWriter::new(&mut out, Some(ProgressBar::hidden()));
            write!(writer, "Host: es port: ").unwrap();
            writeln!(writer, "9200 scheme: http").unwrap();
            assert!(writer.pending.is_empty());
            write!(writer, "IndexResponse[").unwrap();
            assert_eq!(writer.pending, b"IndexResponse[");
            writer.flush().unwrap();
        }

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Host: es port: 9200 scheme: http\nIndexResponse["
        );
    }

    #[test]
    fn test_suspending_writer_without_spinner() {
        let mut out = Vec::new();
        {
            let mut writer = SuspendingWriter::new(&mut out, None);
            writeln!(writer, "one").unwrap();
            writeln!(writer, "two").unwrap();
        }

        assert_eq!(String::from_utf8(out).unwrap(), "one\ntwo\n");
    }
}
