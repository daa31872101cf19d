//! Directory listings.
//!
//! One line per child, sorted by the natural order of `type tag + name` so
//! that `file2` lands before `file10`. The name column is as wide as the
//! longest name in this listing — alignment adapts per directory rather than
//! using a global constant.

use std::cmp::Ordering;

use chrono::Local;
use skiff_store::{DirectoryEntry, Entry};

use crate::fmt::{format_size, unit};

/// Renders directory snapshots as aligned columnar text.
#[derive(Debug, Clone)]
pub struct DirectoryLister {
    quiet: bool,
}

impl DirectoryLister {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Format one line per child, natural-sorted, columns aligned.
    pub fn render(&self, dir: &DirectoryEntry) -> String {
        let mut children: Vec<(&String, &Entry)> = dir.items.iter().collect();
        children.sort_by(|a, b| {
            let left = format!("{}{}", a.1.type_tag(), a.0);
            let right = format!("{}{}", b.1.type_tag(), b.0);
            natural_cmp(&left, &right)
        });

        // Width in characters, not bytes, so multibyte names line up.
        let width = children
            .iter()
            .map(|(name, _)| name.chars().count())
            .max()
            .unwrap_or(0);

        let mut lines = Vec::with_capacity(children.len());
        for (name, entry) in children {
            match entry {
                Entry::Directory(d) => {
                    lines.push(format!("{name:<width$}  {}", unit(d.items.len(), "item")));
                }
                Entry::File(f) => {
                    let stamp = f
                        .created_at
                        .with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M:%S");
                    lines.push(format!(
                        "{name:<width$}  {:>10}  {stamp}",
                        format_size(f.size)
                    ));
                }
            }
        }
        lines.join("\n")
    }

    /// Write the listing to stdout, plus a count summary on stderr unless
    /// quiet.
    pub fn print(&self, dir: &DirectoryEntry) {
        let rendered = self.render(dir);
        if !rendered.is_empty() {
            println!("{rendered}");
        }
        if !self.quiet {
            eprintln!("{}", unit(dir.items.len(), "item"));
        }
    }
}

/// Case-insensitive, numeric-aware string comparison.
///
/// Digit runs compare as numbers (leading zeros ignored for magnitude),
/// everything else compares by lowercased character.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ia = a.chars().peekable();
    let mut ib = b.chars().peekable();

    loop {
        match (ia.peek().copied(), ib.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) => {
                if ca.is_ascii_digit() && cb.is_ascii_digit() {
                    let na = take_digits(&mut ia);
                    let nb = take_digits(&mut ib);
                    match compare_digit_runs(&na, &nb) {
                        Ordering::Equal => continue,
                        other => return other,
                    }
                }
                let la = ca.to_lowercase();
                let lb = cb.to_lowercase();
                match la.cmp(lb) {
                    Ordering::Equal => {
                        ia.next();
                        ib.next();
                    }
                    other => return other,
                }
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

/// Compare two digit runs numerically without parsing to an integer, so
/// arbitrarily long runs cannot overflow.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
