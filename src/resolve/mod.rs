//! Conflict resolution
//!
//! Applies the conflict table (interactively or scripted) and then the
//! override table to produce the final inclusion set.

use crate::domain::{ConflictChoice, Package, RuleSet};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, Write};

/// Supplies the operator's answer for each detected conflict.
///
/// This is the one blocking, human-in-the-loop seam in the run; tests and
/// the `--choose` flag plug in a scripted provider instead.
pub trait DecisionProvider {
    fn decide(&mut self, first: &str, second: &str) -> Result<ConflictChoice>;
}

/// Interactive provider reading answers from stdin.
///
/// Re-prompts until the trimmed input is exactly "1", "2", or "3". There is
/// no "keep both" option and no cancel path; EOF on stdin is a hard error
/// because the run cannot proceed without a decision.
pub struct ConsoleDecisions;

impl DecisionProvider for ConsoleDecisions {
    fn decide(&mut self, first: &str, second: &str) -> Result<ConflictChoice> {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            print!(
                "Conflict detected: {} vs {}. Choose (1={}, 2={}, 3=neither): ",
                console::style(first).cyan(),
                console::style(second).cyan(),
                first,
                second
            );
            std::io::stdout().flush()?;

            line.clear();
            let read = stdin.lock().read_line(&mut line)?;
            if read == 0 {
                anyhow::bail!("stdin closed while a conflict decision was pending");
            }
            if let Some(choice) = ConflictChoice::parse(&line) {
                return Ok(choice);
            }
        }
    }
}

/// Scripted provider consuming a fixed list of answers in order.
pub struct ScriptedDecisions {
    answers: std::vec::IntoIter<ConflictChoice>,
}

impl ScriptedDecisions {
    pub fn new(answers: Vec<ConflictChoice>) -> Self {
        Self { answers: answers.into_iter() }
    }

    /// Build from raw `--choose` values, rejecting anything but "1"/"2"/"3".
    pub fn from_raw(raw: &[String]) -> Result<Self> {
        let answers = raw
            .iter()
            .map(|value| {
                ConflictChoice::parse(value).with_context(|| {
                    format!("Invalid --choose value '{}' (expected 1, 2, or 3)", value)
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(answers))
    }
}

impl DecisionProvider for ScriptedDecisions {
    fn decide(&mut self, first: &str, second: &str) -> Result<ConflictChoice> {
        self.answers.next().with_context(|| {
            format!("No scripted answer left for conflict: {} vs {}", first, second)
        })
    }
}

/// Produce the final inclusion set from the valid-package map.
///
/// Every conflict rule whose two sides both exist in `packages` is put to the
/// decision provider, in table order. Presence checks run against the
/// original map, not the shrinking inclusion set, so a package already
/// removed by an earlier rule still triggers later prompts; the extra
/// removal is a no-op. Overrides apply after all conflicts are settled.
/// Once removed, a package is never re-added.
pub fn resolve_inclusion(
    packages: &BTreeMap<String, Package>,
    rules: &RuleSet,
    decisions: &mut dyn DecisionProvider,
) -> Result<BTreeSet<String>> {
    let mut included: BTreeSet<String> = packages.keys().cloned().collect();

    for rule in &rules.conflicts {
        if !packages.contains_key(&rule.first) || !packages.contains_key(&rule.second) {
            continue;
        }
        tracing::debug!("Conflict detected: {} vs {}", rule.first, rule.second);
        match decisions.decide(&rule.first, &rule.second)? {
            ConflictChoice::KeepFirst => {
                included.remove(&rule.second);
            }
            ConflictChoice::KeepSecond => {
                included.remove(&rule.first);
            }
            ConflictChoice::KeepNeither => {
                included.remove(&rule.first);
                included.remove(&rule.second);
            }
        }
    }

    for rule in &rules.overrides {
        if included.contains(&rule.dominant) && included.remove(&rule.excluded) {
            tracing::debug!(
                "Override: dropping {} because {} is present",
                rule.excluded,
                rule.dominant
            );
        }
    }

    Ok(included)
}
