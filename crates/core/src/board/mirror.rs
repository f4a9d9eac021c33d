#![forbid(unsafe_code)]

use crate::model::Card;
use std::collections::BTreeMap;

/// Whether the mirror currently reflects server truth or a locally applied
/// reordering awaiting confirmation. Exactly one transition rule exists in
/// each direction: a drop makes the mirror speculative; a wholesale partition
/// replacement (or a full rebuild) makes it confirmed again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MirrorState {
    Confirmed,
    Speculative,
}

/// Captured at drag start; holds enough to apply a later drop. Dropping the
/// handle without calling [`BoardMirror::apply_drop`] is drag cancellation:
/// the mirror is never touched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragHandle {
    pub card_id: String,
    pub origin_stage: String,
    pub origin_index: usize,
}

/// Client-held copy of one pipeline's board, grouped by stage and ordered by
/// position. Mutated immediately on drop for visual feedback, then replaced
/// by the storage-returned truth or discarded on failure; never patched
/// incrementally once it has diverged.
#[derive(Clone, Debug)]
pub struct BoardMirror {
    partitions: BTreeMap<String, Vec<Card>>,
    state: MirrorState,
}

impl BoardMirror {
    pub fn from_cards(cards: Vec<Card>) -> Self {
        let mut mirror = Self {
            partitions: BTreeMap::new(),
            state: MirrorState::Confirmed,
        };
        mirror.rebuild(cards);
        mirror
    }

    pub fn state(&self) -> MirrorState {
        self.state
    }

    pub fn partition(&self, stage: &str) -> Option<&[Card]> {
        self.partitions.get(stage).map(Vec::as_slice)
    }

    pub fn stages(&self) -> Vec<&str> {
        self.partitions.keys().map(String::as_str).collect()
    }

    pub fn begin_drag(&self, card_id: &str) -> Option<DragHandle> {
        for (stage, cards) in &self.partitions {
            if let Some(index) = cards.iter().position(|c| c.id == card_id) {
                return Some(DragHandle {
                    card_id: card_id.to_string(),
                    origin_stage: stage.clone(),
                    origin_index: index,
                });
            }
        }
        None
    }

    /// Applies a drop: removes the card from its partition, inserts it into
    /// `target_stage` at `target_index` (clamped to the list length), and
    /// renumbers both affected lists. Returns `false` without mutating
    /// anything if the card is no longer present.
    pub fn apply_drop(&mut self, handle: &DragHandle, target_stage: &str, target_index: usize) -> bool {
        let origin = self
            .partitions
            .get(&handle.origin_stage)
            .and_then(|cards| cards.iter().position(|c| c.id == handle.card_id))
            .map(|index| (handle.origin_stage.clone(), index));

        // The card may have moved since drag start (e.g. a concurrent
        // refresh); fall back to a full scan before giving up.
        let (stage, index) = match origin {
            Some(found) => found,
            None => match self.locate(&handle.card_id) {
                Some(found) => found,
                None => return false,
            },
        };

        let mut card = match self.partitions.get_mut(&stage) {
            Some(cards) => {
                let card = cards.remove(index);
                renumber(cards);
                card
            }
            None => return false,
        };

        card.stage = target_stage.to_string();
        let target = self.partitions.entry(target_stage.to_string()).or_default();
        let insert_at = target_index.min(target.len());
        target.insert(insert_at, card);
        renumber(target);

        self.state = MirrorState::Speculative;
        true
    }

    /// Replaces the named partitions wholesale with storage-returned truth.
    /// An empty replacement list removes the column from the mirror.
    pub fn confirm(&mut self, replacements: Vec<(String, Vec<Card>)>) {
        for (stage, mut cards) in replacements {
            cards.sort_by_key(|c| c.position);
            if cards.is_empty() {
                self.partitions.remove(&stage);
            } else {
                self.partitions.insert(stage, cards);
            }
        }
        self.state = MirrorState::Confirmed;
    }

    /// Discards all speculative state and rebuilds from a full fetch.
    pub fn replace_all(&mut self, cards: Vec<Card>) {
        self.partitions.clear();
        self.rebuild(cards);
        self.state = MirrorState::Confirmed;
    }

    fn rebuild(&mut self, cards: Vec<Card>) {
        for card in cards {
            if card.is_deleted() {
                continue;
            }
            self.partitions
                .entry(card.stage.clone())
                .or_default()
                .push(card);
        }
        for cards in self.partitions.values_mut() {
            cards.sort_by_key(|c| c.position);
        }
    }

    fn locate(&self, card_id: &str) -> Option<(String, usize)> {
        for (stage, cards) in &self.partitions {
            if let Some(index) = cards.iter().position(|c| c.id == card_id) {
                return Some((stage.clone(), index));
            }
        }
        None
    }
}

fn renumber(cards: &mut Vec<Card>) {
    for (index, card) in cards.iter_mut().enumerate() {
        card.position = index as i64;
    }
}
