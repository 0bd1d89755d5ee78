use super::board_movement::BoardMovement;
use serde_json::json;
use std::fmt;

/// Ordered record of the movements applied to a board, oldest first.
///
/// Each entry links to the entry it was played after. Entries can only be
/// removed from the end, mirroring how movements are reverted.
#[derive(Debug, Clone, Default)]
pub struct MoveHistory {
    entries: Vec<BoardMovement>,
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, mut movement: BoardMovement) -> &BoardMovement {
        movement.set_depends_on(self.entries.len().checked_sub(1));
        self.entries.push(movement);
        &self.entries[self.entries.len() - 1]
    }

    pub(crate) fn pop(&mut self) -> Option<BoardMovement> {
        let mut last = self.entries.pop()?;
        last.set_depends_on(None);
        Some(last)
    }

    /// Put back an entry that could not be reverted
    pub(crate) fn restore(&mut self, movement: BoardMovement) {
        self.register(movement);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&BoardMovement> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&BoardMovement> {
        self.entries.last()
    }

    pub fn get(&self, index: usize) -> Option<&BoardMovement> {
        self.entries.get(index)
    }

    /// The entry `n` steps before the newest one (`0` is the newest)
    pub fn nth_back(&self, n: usize) -> Option<&BoardMovement> {
        self.entries.iter().rev().nth(n)
    }

    /// The entry a given entry was played after
    pub fn previous_of(&self, movement: &BoardMovement) -> Option<&BoardMovement> {
        movement.depends_on().and_then(|index| self.entries.get(index))
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &BoardMovement> + '_ {
        self.entries.iter()
    }

    pub fn iter_newest_first(&self) -> impl Iterator<Item = &BoardMovement> + '_ {
        self.entries.iter().rev()
    }

    pub fn notations(&self) -> Vec<String> {
        self.entries.iter().map(entry_label).collect()
    }

    /// The history as a JSON array, oldest first. Each entry carries
    /// `from`, `to`, `notation`, `capture`, `castling` and `promotion`.
    pub fn to_json(&self) -> serde_json::Value {
        let entries: Vec<serde_json::Value> = self
            .entries
            .iter()
            .map(|entry| {
                let movement = entry.movement();
                json!({
                    "from": movement.from.to_string(),
                    "to": movement.to.to_string(),
                    "notation": entry.notation(),
                    "capture": movement.is_capture(),
                    "castling": movement.castling_side().map(|side| side.notation()),
                    "promotion": movement.promotion().map(|promotion| promotion.kind.letter().to_string()),
                })
            })
            .collect();
        serde_json::Value::Array(entries)
    }
}

fn entry_label(entry: &BoardMovement) -> String {
    match entry.notation() {
        Some(notation) => notation.to_string(),
        None => entry.movement().to_string(),
    }
}

impl fmt::Display for MoveHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notations().join(" - "))
    }
}
