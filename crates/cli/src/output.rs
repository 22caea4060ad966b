//! Terminal output for the buildpack CLI.
//!
//! Status lines go through [`say`], which picks the stream and color from the
//! [`Tone`]. Results meant for scripts go through [`print_json`].

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

/// Characters of a lockfile sha shown outside verbose output.
const SHORT_SHA_CHARS: usize = 12;

const NO_LOCKFILE: &str = "(no lockfile)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
  Success,
  Info,
  Warning,
  Error,
}

impl Tone {
  fn symbol(self) -> &'static str {
    match self {
      Tone::Success => "✓",
      Tone::Info => "•",
      Tone::Warning => "⚠",
      Tone::Error => "✗",
    }
  }
}

/// Print a status line. Warnings and errors go to stderr.
pub fn say(tone: Tone, message: &str) {
  let symbol = tone.symbol();
  match tone {
    Tone::Success => println!("{} {}", symbol.if_supports_color(Stream::Stdout, |s| s.green()), message),
    Tone::Info => println!("{} {}", symbol.if_supports_color(Stream::Stdout, |s| s.blue()), message),
    Tone::Warning => eprintln!(
      "{} {}",
      symbol.if_supports_color(Stream::Stderr, |s| s.yellow()),
      message.if_supports_color(Stream::Stderr, |s| s.yellow())
    ),
    Tone::Error => eprintln!(
      "{} {}",
      symbol.if_supports_color(Stream::Stderr, |s| s.red()),
      message.if_supports_color(Stream::Stderr, |s| s.red())
    ),
  }
}

/// Print an indented `label: value` line.
pub fn field(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

/// The first few characters of a sha. Never splits a character, whatever
/// the layer metadata happens to contain.
pub fn short_sha(sha: &str) -> &str {
  match sha.char_indices().nth(SHORT_SHA_CHARS) {
    Some((end, _)) => &sha[..end],
    None => sha,
  }
}

/// Display form of a recorded `lockfile-sha`; absent and empty both mean the
/// build ran without `package-list.txt`.
pub fn describe_sha(sha: Option<&str>, full: bool) -> &str {
  match sha {
    None | Some("") => NO_LOCKFILE,
    Some(sha) if full => sha,
    Some(sha) => short_sha(sha),
  }
}

pub fn format_elapsed(elapsed: Duration) -> String {
  match elapsed.as_millis() {
    millis @ 0..=999 => format!("{}ms", millis),
    1_000..=59_999 => format!("{:.2}s", elapsed.as_secs_f64()),
    _ => format!("{}m {}s", elapsed.as_secs() / 60, elapsed.as_secs() % 60),
  }
}

/// What `build` reports once the layers are persisted.
#[derive(Debug)]
pub struct BuildSummary<'a> {
  pub rebuilt: bool,
  pub layer_path: Option<&'a Path>,
  pub fingerprint: &'a str,
  pub elapsed: Duration,
}

pub fn print_build_summary(summary: &BuildSummary<'_>) {
  let outcome = if summary.rebuilt { "rebuilt" } else { "reused" };
  say(Tone::Success, &format!("Conda environment {}", outcome));

  if let Some(path) = summary.layer_path {
    field("Layer", &path.display().to_string());
  }
  if summary.fingerprint.is_empty() {
    say(
      Tone::Warning,
      "No package-list.txt found; the environment is rebuilt on every build",
    );
  }
  field("Lockfile", describe_sha(Some(summary.fingerprint), false));
  field("Elapsed", &format_elapsed(summary.elapsed));
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
