//! Filter loading and first-match-wins matching.
//!
//! A filter file is a sequence of rule blocks separated by blank lines.
//! Each block compiles independently: bad blocks are reported and set
//! aside, good blocks stay in file order. Matching walks the rules in
//! order and the first predicate to return true wins.

mod handle;
mod split;

pub use handle::FilterHandle;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::expr::{self, EvalError, ParseError, Predicate};
use crate::item::Item;

/// One successfully compiled rule block.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    predicate: Predicate,
    query: String,
    raw_query: String,
    start_line: usize,
}

impl CompiledRule {
    /// The compiled text, comments stripped. Error offsets index into this
    /// form.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The block exactly as written, comments included.
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    /// 1-based line the block starts on in the source file.
    pub fn start_line(&self) -> usize {
        self.start_line
    }
}

/// A rule block that failed to compile, kept for reporting.
#[derive(Debug, Clone)]
pub struct RuleError {
    query: String,
    raw_query: String,
    start_line: usize,
    error: ParseError,
}

impl RuleError {
    /// The text that was handed to the compiler, comments stripped. The
    /// error offset indexes into this form.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The block exactly as written.
    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    /// 1-based line the block starts on in the source file.
    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn error(&self) -> &ParseError {
        &self.error
    }
}

/// Failure to read a filter file.
///
/// Rule problems never surface here; they are collected per block on the
/// loaded [`ItemFilter`].
#[derive(Debug, thiserror::Error)]
#[error("failed to read filter file {}", .path.display())]
pub struct LoadError {
    path: PathBuf,
    #[source]
    source: std::io::Error,
}

impl LoadError {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Result of scanning the rule list for one item.
#[derive(Debug)]
pub enum MatchOutcome<'a> {
    /// The first rule whose predicate returned true.
    Matched(&'a CompiledRule),
    /// No rule matched.
    NoMatch,
    /// A rule faulted at this item; the scan stopped there.
    Failed {
        rule: &'a CompiledRule,
        error: EvalError,
    },
}

/// An ordered, immutable set of compiled rules.
#[derive(Debug, Default)]
pub struct ItemFilter {
    rules: Vec<CompiledRule>,
    errors: Vec<RuleError>,
}

impl ItemFilter {
    /// Compile filter content. This never fails: blocks that do not
    /// compile are logged and recorded in [`errors`](ItemFilter::errors),
    /// and the remaining rules keep their file order.
    pub fn parse(content: &str) -> ItemFilter {
        let mut rules = Vec::new();
        let mut errors = Vec::new();

        for section in split::split_sections(content) {
            match expr::compile(&section.text) {
                Ok(predicate) => rules.push(CompiledRule {
                    predicate,
                    query: section.text,
                    raw_query: section.raw,
                    start_line: section.start_line,
                }),
                Err(err) => {
                    error!(
                        line = section.start_line,
                        query = %section.text,
                        error = %err,
                        "failed to compile rule"
                    );
                    errors.push(RuleError {
                        query: section.text,
                        raw_query: section.raw,
                        start_line: section.start_line,
                        error: err,
                    });
                }
            }
        }

        ItemFilter { rules, errors }
    }

    /// Read and compile a filter file. Only I/O can fail here.
    pub fn load(path: impl AsRef<Path>) -> Result<ItemFilter, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LoadError {
            path: path.to_path_buf(),
            source,
        })?;

        let filter = Self::parse(&content);
        info!(
            file = %path.display(),
            rules = filter.rules.len(),
            errors = filter.errors.len(),
            "loaded item filter"
        );
        Ok(filter)
    }

    /// Compiled rules in file order.
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Blocks that failed to compile, in file order.
    pub fn errors(&self) -> &[RuleError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Scan the rules in order and report what happened. A faulting rule
    /// ends the scan; later rules are not consulted for this item.
    pub fn evaluate(&self, item: &Item) -> MatchOutcome<'_> {
        for rule in &self.rules {
            match rule.predicate.eval(item) {
                Ok(true) => return MatchOutcome::Matched(rule),
                Ok(false) => {}
                Err(error) => return MatchOutcome::Failed { rule, error },
            }
        }
        MatchOutcome::NoMatch
    }

    /// First-match-wins check. Evaluation faults are logged and the item
    /// is kept out.
    pub fn matches(&self, item: &Item) -> bool {
        match self.evaluate(item) {
            MatchOutcome::Matched(rule) => {
                info!(
                    item = %item.base_name,
                    line = rule.start_line,
                    query = %rule.query,
                    "item matched rule"
                );
                true
            }
            MatchOutcome::NoMatch => false,
            MatchOutcome::Failed { rule, error } => {
                error!(
                    item = %item.base_name,
                    line = rule.start_line,
                    query = %rule.query,
                    error = %error,
                    "rule evaluation failed"
                );
                false
            }
        }
    }
}
