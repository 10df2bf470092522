// Property tests for candidate filtering, the selection state machine and
// the visible-range computation.
//
// Verifies:
// 1. An empty query yields exactly the unchosen options, in input order
// 2. Candidates are a subset of the options, disjoint from the chosen set
// 3. Every candidate contains the normalized query
// 4. Selecting a candidate twice, or removing twice, changes nothing more,
//    and select then remove restores the candidates under any query
// 5. visible_range stays in bounds and covers every row the viewport touches
// 6. Without overscan, visible_range starts and ends at the viewport edges

use std::collections::HashSet;

use coverscout_core::model::{OptionId, PickerOption};
use coverscout_core::picker::filter::{candidate_indices, label_text, ChosenSet, MatchPolicy};
use coverscout_core::picker::prefix::PrefixHeights;
use coverscout_core::picker::window::visible_range;
use coverscout_core::picker::{MultiSelectController, PickerConfig};
use proptest::prelude::*;

// ===========================================================================
// Strategies
// ===========================================================================

fn arb_options() -> impl Strategy<Value = Vec<PickerOption<()>>> {
    prop::collection::vec("[a-zA-Zé ]{1,12}", 0..40).prop_map(|labels| {
        labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| PickerOption::new(i as u64, label, ()))
            .collect()
    })
}

fn arb_options_and_chosen() -> impl Strategy<Value = (Vec<PickerOption<()>>, ChosenSet)> {
    arb_options().prop_flat_map(|options| {
        let n = options.len();
        (Just(options), prop::collection::vec(any::<bool>(), n)).prop_map(|(options, mask)| {
            let chosen: ChosenSet = options
                .iter()
                .zip(mask)
                .filter(|(_, keep)| *keep)
                .map(|(o, _)| o.id.clone())
                .collect();
            (options, chosen)
        })
    })
}

fn arb_policy() -> impl Strategy<Value = MatchPolicy> {
    (any::<bool>(), any::<bool>()).prop_map(|(case_sensitive, ignore_accents)| MatchPolicy {
        case_sensitive,
        ignore_accents,
    })
}

// ===========================================================================
// Filtering
// ===========================================================================

proptest! {
    #[test]
    fn empty_query_is_options_minus_chosen((options, chosen) in arb_options_and_chosen(), policy in arb_policy()) {
        let found = candidate_indices(&options, &chosen, "", policy, label_text);
        let expected: Vec<usize> = options
            .iter()
            .enumerate()
            .filter(|(_, o)| !chosen.contains(&o.id))
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn candidates_are_unchosen_matching_subset(
        (options, chosen) in arb_options_and_chosen(),
        query in "[a-zé ]{0,3}",
        policy in arb_policy(),
    ) {
        let found = candidate_indices(&options, &chosen, &query, policy, label_text);
        let needle = policy.normalize(&query);

        let mut previous = None;
        for &i in &found {
            prop_assert!(i < options.len());
            prop_assert!(!chosen.contains(&options[i].id));
            prop_assert!(policy.normalize(&options[i].label).contains(&needle));
            // Input order is preserved.
            prop_assert!(previous.map_or(true, |p| p < i));
            previous = Some(i);
        }
    }
}

// ===========================================================================
// Selection state machine
// ===========================================================================

proptest! {
    #[test]
    fn select_and_remove_are_idempotent(
        options in arb_options(),
        query in "[a-zé ]{0,1}",
        pick in any::<prop::sample::Index>(),
    ) {
        let mut picker = MultiSelectController::new(options, PickerConfig::default(), label_text);
        picker.set_query(&query);
        let before: Vec<OptionId> = picker.candidates().iter().map(|o| o.id.clone()).collect();
        prop_assume!(!before.is_empty());
        let id = before[pick.index(before.len())].clone();

        prop_assert!(picker.select(&id).is_some());
        let after_first: Vec<OptionId> = picker.chosen_ids().to_vec();
        prop_assert!(picker.select(&id).is_none());
        prop_assert_eq!(picker.chosen_ids(), after_first.as_slice());
        prop_assert!(picker.candidates().iter().all(|o| o.id != id));
        prop_assert_eq!(picker.query(), query.as_str());

        prop_assert!(picker.remove(&id).is_some());
        prop_assert!(picker.remove(&id).is_none());
        prop_assert!(picker.chosen_ids().is_empty());
        let after: Vec<OptionId> = picker.candidates().iter().map(|o| o.id.clone()).collect();
        prop_assert_eq!(after, before);
    }

    #[test]
    fn chosen_and_candidates_partition_options(
        options in arb_options(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
    ) {
        prop_assume!(!options.is_empty());
        let ids: Vec<OptionId> = picks
            .iter()
            .map(|p| options[p.index(options.len())].id.clone())
            .collect();
        let total = options.len();
        let mut picker = MultiSelectController::new(options, PickerConfig::default(), label_text);
        picker.open();
        for id in &ids {
            picker.select(id);
        }

        let chosen: HashSet<&OptionId> = picker.chosen_ids().iter().collect();
        let candidates: HashSet<&OptionId> = picker.candidates().into_iter().map(|o| &o.id).collect();
        prop_assert!(chosen.is_disjoint(&candidates));
        prop_assert_eq!(chosen.len() + candidates.len(), total);
    }
}

// ===========================================================================
// Visible range
// ===========================================================================

proptest! {
    #[test]
    fn visible_range_is_bounded_and_covering(
        heights in prop::collection::vec(1u32..60, 0..200),
        scroll in 0u64..6000,
        viewport in 0u32..500,
        overscan in 0usize..8,
    ) {
        let prefix = PrefixHeights::from_heights(&heights);
        let n = heights.len();
        let range = visible_range(&prefix, scroll, viewport, overscan);

        prop_assert!(range.start <= range.end);
        prop_assert!(range.end <= n);

        let bottom = scroll + u64::from(viewport);
        for i in 0..n {
            let top = prefix.offset_of(i);
            let row_bottom = top + u64::from(heights[i]);
            let intersects = row_bottom > scroll && top < bottom;
            if intersects {
                prop_assert!(range.contains(&i), "row {} intersects but is outside {:?}", i, range);
            }
        }
    }

    #[test]
    fn visible_range_without_overscan_is_minimal(
        heights in prop::collection::vec(1u32..60, 1..200),
        scroll_at in 0.0f64..1.0,
        viewport in 1u32..500,
    ) {
        let prefix = PrefixHeights::from_heights(&heights);
        let n = heights.len();
        let scroll = ((prefix.total() as f64 * scroll_at) as u64).min(prefix.total() - 1);
        let range = visible_range(&prefix, scroll, viewport, 0);

        prop_assert!(range.start < range.end);
        prop_assert!(prefix.offset_of(range.start) <= scroll);
        let bottom = scroll + u64::from(viewport);
        prop_assert!(range.end == n || prefix.offset_of(range.end) >= bottom);
    }

    #[test]
    fn prefix_offsets_match_running_sum(heights in prop::collection::vec(0u32..100, 0..100)) {
        let prefix = PrefixHeights::from_heights(&heights);
        let mut sum = 0u64;
        for (i, h) in heights.iter().enumerate() {
            prop_assert_eq!(prefix.offset_of(i), sum);
            sum += u64::from(*h);
        }
        prop_assert_eq!(prefix.total(), sum);
    }
}
