#![forbid(unsafe_code)]

use crate::model::StageSummary;

/// A stage label registered in the display order, possibly with zero cards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredStage {
    pub label: String,
    pub color: String,
}

/// One column of the reconciled board, left to right.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardColumn {
    pub label: String,
    pub color: String,
    pub card_count: usize,
}

/// Reconciles the two partial views of which stages exist: summaries derived
/// from live card data and the persisted display-order hint.
///
/// The hint decides left-to-right order and contributes empty columns for
/// registered labels with no cards. Labels present only in card data are
/// appended after the hint in first-seen order (the order `derived` arrives
/// in). Where both views know a label, card data wins on color: cards are the
/// color's source of truth.
///
/// The hint is never authoritative over which stages exist, so a stale hint
/// entry after a crashed rename degrades to an empty column rather than
/// hiding or duplicating cards.
pub fn merge_display_order(
    derived: &[StageSummary],
    hint: &[RegisteredStage],
) -> Vec<BoardColumn> {
    let mut out = Vec::with_capacity(hint.len() + derived.len());

    for registered in hint {
        match derived.iter().find(|s| s.label == registered.label) {
            Some(summary) => out.push(BoardColumn {
                label: summary.label.clone(),
                color: summary.color.clone(),
                card_count: summary.card_count,
            }),
            None => out.push(BoardColumn {
                label: registered.label.clone(),
                color: registered.color.clone(),
                card_count: 0,
            }),
        }
    }

    for summary in derived {
        if hint.iter().any(|r| r.label == summary.label) {
            continue;
        }
        out.push(BoardColumn {
            label: summary.label.clone(),
            color: summary.color.clone(),
            card_count: summary.card_count,
        });
    }

    out
}
