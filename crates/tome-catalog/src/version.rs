//! Deterministic ordering over version strings.
//!
//! Versions sort newest-first. The scheme:
//!
//! - A version is split into alternating runs of digits and non-digits.
//! - Digit runs compare numerically, other runs lexicographically.
//! - When one version is a prefix of the other, the longer one is newer
//!   (`1.0.1` is newer than `1.0`).
//! - A version containing no digits at all is a *named line* (`master`,
//!   `next`, `edge`) and is newer than any numeric version; two named lines
//!   compare lexicographically, later names being newer.
//! - At a run boundary, a digit run is newer than a non-digit run.
//!
//! The resulting relation is total, transitive, and antisymmetric, which is
//! what keeps a component's version list stable across rebuilds.

use std::cmp::Ordering;

/// Compare two version strings for newest-first ordering.
///
/// Returns [`Ordering::Less`] when `a` is newer than `b` (i.e. `a` sorts
/// before `b` in a descending version list).
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    newness(a, b).reverse()
}

/// Compare newness: `Greater` means `a` is newer than `b`.
fn newness(a: &str, b: &str) -> Ordering {
    match (is_named(a), is_named(b)) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => a.cmp(b),
        (false, false) => compare_runs(a, b),
    }
}

/// A named line carries no digits at all.
fn is_named(version: &str) -> bool {
    !version.bytes().any(|b| b.is_ascii_digit())
}

/// Compare two versions run by run.
fn compare_runs(a: &str, b: &str) -> Ordering {
    let mut runs_a = Runs::new(a);
    let mut runs_b = Runs::new(b);

    loop {
        match (runs_a.next(), runs_b.next()) {
            (None, None) => return Ordering::Equal,
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (Some(ra), Some(rb)) => {
                let ord = match (ra.numeric, rb.numeric) {
                    (true, true) => compare_numeric(ra.text, rb.text),
                    (false, false) => ra.text.cmp(rb.text),
                    // Digit run beats text run at the same position.
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Compare two digit runs numerically without overflow.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

struct Run<'a> {
    text: &'a str,
    numeric: bool,
}

/// Iterator over alternating digit / non-digit runs.
struct Runs<'a> {
    rest: &'a str,
}

impl<'a> Runs<'a> {
    fn new(version: &'a str) -> Self {
        Self { rest: version }
    }
}

impl<'a> Iterator for Runs<'a> {
    type Item = Run<'a>;

    fn next(&mut self) -> Option<Run<'a>> {
        let first = self.rest.chars().next()?;
        let numeric = first.is_ascii_digit();
        let end = self
            .rest
            .find(|c: char| c.is_ascii_digit() != numeric)
            .unwrap_or(self.rest.len());
        let (run, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(Run { text: run, numeric })
    }
}
