// Candidate filtering: which options are still available to pick.
//
// A candidate is an option that is not already chosen and whose
// stringification contains the query. The filter is stable: candidates keep
// the relative order of the full option list and are never re-ranked.

use std::collections::HashSet;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::model::{OptionId, PickerOption};

/// Projection from an option to the text the query is matched against.
pub type Stringify<T> = fn(&PickerOption<T>) -> String;

/// Stringification that uses the display key.
pub fn label_text<T>(option: &PickerOption<T>) -> String {
    option.label.clone()
}

/// How query and option text are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    pub case_sensitive: bool,
    /// Strip diacritics before comparing ("munchen" finds "München").
    pub ignore_accents: bool,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        MatchPolicy {
            case_sensitive: false,
            ignore_accents: true,
        }
    }
}

impl MatchPolicy {
    pub fn exact() -> Self {
        MatchPolicy {
            case_sensitive: true,
            ignore_accents: false,
        }
    }

    /// Bring `text` into the form that is compared.
    pub fn normalize(&self, text: &str) -> String {
        let folded: String = if self.ignore_accents {
            text.nfd().filter(|c| !is_combining_mark(*c)).collect()
        } else {
            text.to_string()
        };
        if self.case_sensitive {
            folded
        } else {
            folded.to_lowercase()
        }
    }
}

// ---------------------------------------------------------------------------
// ChosenSet
// ---------------------------------------------------------------------------

/// Chosen option ids, in the order they were chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChosenSet {
    order: Vec<OptionId>,
    members: HashSet<OptionId>,
}

impl ChosenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `id`; returns `false` if it was already chosen.
    pub fn insert(&mut self, id: OptionId) -> bool {
        if !self.members.insert(id.clone()) {
            return false;
        }
        self.order.push(id);
        true
    }

    pub fn remove(&mut self, id: &OptionId) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        self.order.retain(|x| x != id);
        true
    }

    pub fn pop_last(&mut self) -> Option<OptionId> {
        let id = self.order.pop()?;
        self.members.remove(&id);
        Some(id)
    }

    pub fn contains(&self, id: &OptionId) -> bool {
        self.members.contains(id)
    }

    pub fn ids(&self) -> &[OptionId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    /// Drop every id for which `keep` returns false.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&OptionId) -> bool,
    {
        self.order.retain(|id| keep(id));
        let order = &self.order;
        self.members.retain(|id| order.contains(id));
    }
}

impl FromIterator<OptionId> for ChosenSet {
    fn from_iter<I: IntoIterator<Item = OptionId>>(iter: I) -> Self {
        let mut set = ChosenSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Indices (into `all`) of the options that are not chosen and match `query`.
pub fn candidate_indices<T>(
    all: &[PickerOption<T>],
    chosen: &ChosenSet,
    query: &str,
    policy: MatchPolicy,
    stringify: Stringify<T>,
) -> Vec<usize> {
    let needle = policy.normalize(query);
    all.iter()
        .enumerate()
        .filter(|(_, o)| !chosen.contains(&o.id))
        .filter(|(_, o)| needle.is_empty() || policy.normalize(&stringify(o)).contains(&needle))
        .map(|(i, _)| i)
        .collect()
}

/// The options of `all` that are still available to pick, in original order.
pub fn candidates<'a, T>(
    all: &'a [PickerOption<T>],
    chosen: &ChosenSet,
    query: &str,
    policy: MatchPolicy,
    stringify: Stringify<T>,
) -> Vec<&'a PickerOption<T>> {
    candidate_indices(all, chosen, query, policy, stringify)
        .into_iter()
        .map(|i| &all[i])
        .collect()
}

/// Filter with per-option match text computed once per option set rather
/// than on every keystroke.
pub struct FilterEngine<T> {
    policy: MatchPolicy,
    stringify: Stringify<T>,
    haystacks: Vec<String>,
}

impl<T> FilterEngine<T> {
    pub fn new(policy: MatchPolicy, stringify: Stringify<T>) -> Self {
        FilterEngine {
            policy,
            stringify,
            haystacks: Vec::new(),
        }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Precompute match text for a new option set.
    pub fn index(&mut self, options: &[PickerOption<T>]) {
        self.haystacks = options
            .iter()
            .map(|o| self.policy.normalize(&(self.stringify)(o)))
            .collect();
    }

    /// Same result as [`candidate_indices`], using the precomputed text.
    /// Falls back to computing it on the fly if `index` was not called for
    /// this option set.
    pub fn candidates(&self, all: &[PickerOption<T>], chosen: &ChosenSet, query: &str) -> Vec<usize> {
        if self.haystacks.len() != all.len() {
            return candidate_indices(all, chosen, query, self.policy, self.stringify);
        }
        let needle = self.policy.normalize(query);
        all.iter()
            .zip(&self.haystacks)
            .enumerate()
            .filter(|(_, (o, hay))| !chosen.contains(&o.id) && hay.contains(needle.as_str()))
            .map(|(i, _)| i)
            .collect()
    }
}
