//! Per-node outcomes of an inlining pass.
//!
//! Failures never change the output document; this report is how a host
//! finds out which assets were skipped and why.

use crate::asset::AssetKind;
use crate::error::InlineError;

/// What happened to one candidate
#[derive(Debug)]
pub enum Outcome {
    Inlined,
    Skipped(InlineError),
    /// Resolved, but an ancestor was replaced earlier in the same pass, so
    /// the node is no longer part of the output.
    Superseded,
}

/// One candidate element
#[derive(Debug)]
pub struct InlineRecord {
    /// `src` value as written (empty when missing).
    pub src: String,
    pub kind: AssetKind,
    pub outcome: Outcome,
}

impl InlineRecord {
    #[inline]
    pub fn is_inlined(&self) -> bool {
        matches!(self.outcome, Outcome::Inlined)
    }

    pub fn error(&self) -> Option<&InlineError> {
        match &self.outcome {
            Outcome::Skipped(err) => Some(err),
            Outcome::Inlined | Outcome::Superseded => None,
        }
    }
}

/// Records in document order
#[derive(Debug, Default)]
pub struct InlineReport {
    records: Vec<InlineRecord>,
}

impl InlineReport {
    pub(crate) fn push(&mut self, src: String, outcome: Outcome) {
        let kind = AssetKind::from_src(&src);
        self.records.push(InlineRecord { src, kind, outcome });
    }

    #[inline]
    pub fn records(&self) -> &[InlineRecord] {
        &self.records
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of candidates that were inlined.
    pub fn inlined(&self) -> usize {
        self.records.iter().filter(|r| r.is_inlined()).count()
    }

    /// Candidates left untouched, with the reason.
    pub fn skipped(&self) -> impl Iterator<Item = (&InlineRecord, &InlineError)> {
        self.records
            .iter()
            .filter_map(|record| record.error().map(|err| (record, err)))
    }
}
