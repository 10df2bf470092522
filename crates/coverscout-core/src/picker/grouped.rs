// Flattening of an optionally grouped option list into one addressable
// sequence of header and item entries.
//
// Groups appear in order of first occurrence and are never re-sorted; items
// keep their relative order inside a group. Ungrouped items lead the
// sequence so that none of them ends up under a header it does not belong to.

use std::collections::HashMap;

use crate::model::PickerOption;

/// One entry of a grouped sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Group header row.
    Header { group: String },
    /// An option, addressed by its index in the list the sequence was built
    /// from.
    Item { option: usize },
}

impl Entry {
    pub fn is_header(&self) -> bool {
        matches!(self, Entry::Header { .. })
    }
}

/// Fixed row heights for the two entry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHeights {
    pub header: u32,
    pub item: u32,
}

impl Default for RowHeights {
    fn default() -> Self {
        RowHeights {
            header: 48,
            item: 48,
        }
    }
}

impl RowHeights {
    pub fn height_of(&self, entry: &Entry) -> u32 {
        match entry {
            Entry::Header { .. } => self.header,
            Entry::Item { .. } => self.item,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedSequence {
    entries: Vec<Entry>,
}

impl GroupedSequence {
    /// Build from a full option list; item entries index into `options`.
    pub fn build<T>(options: &[PickerOption<T>]) -> Self {
        Self::build_indexed(
            options
                .iter()
                .enumerate()
                .map(|(i, o)| (i, o.group.as_deref())),
        )
    }

    /// Build from `(option index, group)` pairs, e.g. a filtered subset.
    pub fn build_indexed<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = (usize, Option<&'a str>)>,
    {
        let mut ungrouped = Vec::new();
        let mut groups: Vec<(&'a str, Vec<usize>)> = Vec::new();
        let mut slot: HashMap<&'a str, usize> = HashMap::new();

        for (option, group) in items {
            match group {
                None => ungrouped.push(option),
                Some(name) => {
                    let at = *slot.entry(name).or_insert_with(|| {
                        groups.push((name, Vec::new()));
                        groups.len() - 1
                    });
                    groups[at].1.push(option);
                }
            }
        }

        let mut entries = Vec::with_capacity(ungrouped.len() + groups.len() * 2);
        entries.extend(ungrouped.into_iter().map(|option| Entry::Item { option }));
        for (name, members) in groups {
            entries.push(Entry::Header {
                group: name.to_string(),
            });
            entries.extend(members.into_iter().map(|option| Entry::Item { option }));
        }
        GroupedSequence { entries }
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn row_at(&self, i: usize) -> Option<&Entry> {
        self.entries.get(i)
    }

    pub fn is_header(&self, i: usize) -> bool {
        self.entries.get(i).is_some_and(Entry::is_header)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Estimated height of every entry, in sequence order.
    pub fn estimated_heights(&self, heights: RowHeights) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(move |e| heights.height_of(e))
    }

    /// Sequence position of the item entry for `option`.
    pub fn position_of(&self, option: usize) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| *e == Entry::Item { option })
    }

    /// First item entry strictly after (or before, when `forward` is false)
    /// position `from`; starts at the respective end when `from` is `None`.
    pub fn step_item(&self, from: Option<usize>, forward: bool) -> Option<usize> {
        let len = self.entries.len();
        if forward {
            let begin = from.map_or(0, |i| i + 1);
            (begin..len).find(|&i| !self.is_header(i))
        } else {
            let end = from.unwrap_or(len);
            (0..end.min(len)).rev().find(|&i| !self.is_header(i))
        }
    }
}
