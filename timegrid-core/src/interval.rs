//! Interval transforms over raw blocks.
//!
//! Three pure functions reconcile the sparse absolute-time representation
//! with the dense slot-indexed one:
//!
//! - [`slice`] carves a minute range out of a day's blocks (and optionally
//!   paints it with a label)
//! - [`optimize`] merges exactly contiguous same-label blocks
//! - [`materialize_schedule`] projects blocks onto grid slots
//!
//! All of them are total. Degenerate input (non-positive durations, empty
//! ranges, a zero step) yields an empty or unchanged result instead of an
//! error.

use crate::{is_valid_day, GridConfig, LabelId, RawBlock, SlotKey};
use std::collections::BTreeMap;

/// Half-open absolute minute range on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinuteRange {
    pub day: i32,
    pub start: i32,
    pub end: i32,
}

impl MinuteRange {
    pub fn contains(&self, day: i32, minute: i32) -> bool {
        self.day == day && self.start <= minute && minute < self.end
    }
}

/// Result of a slice: the rebuilt block list plus the middle regions that
/// were cut out of existing blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceOutcome {
    pub blocks: Vec<RawBlock>,
    /// Portions of previously covered time that were overwritten or erased.
    pub discarded: Vec<MinuteRange>,
}

/// Overwrite `[cell_start, cell_end)` on `day`.
///
/// Blocks on other days, or not intersecting the range, pass through
/// untouched. Each intersecting block leaves at most two fragments: the part
/// before `cell_start` and the part after `cell_end`. When `paint` is set, a
/// new block covering the range is appended after slicing.
pub fn slice(
    blocks: &[RawBlock],
    day: i32,
    cell_start: i32,
    cell_end: i32,
    paint: Option<&LabelId>,
) -> SliceOutcome {
    if cell_end <= cell_start {
        return SliceOutcome {
            blocks: blocks.iter().filter(|b| b.is_valid()).cloned().collect(),
            discarded: Vec::new(),
        };
    }

    let mut outcome = SliceOutcome {
        blocks: Vec::with_capacity(blocks.len() + 2),
        discarded: Vec::new(),
    };

    for block in blocks.iter().filter(|b| b.is_valid()) {
        if block.day_index != day || !block.overlaps(cell_start, cell_end) {
            outcome.blocks.push(block.clone());
            continue;
        }

        let b_start = block.start_minute;
        let b_end = block.end_minute();

        if b_start < cell_start {
            outcome.blocks.push(RawBlock {
                duration_minutes: cell_start - b_start,
                ..block.clone()
            });
        }
        if b_end > cell_end {
            outcome.blocks.push(RawBlock {
                start_minute: cell_end,
                duration_minutes: b_end - cell_end,
                ..block.clone()
            });
        }

        outcome.discarded.push(MinuteRange {
            day,
            start: b_start.max(cell_start),
            end: b_end.min(cell_end),
        });
    }

    if let Some(label_id) = paint {
        outcome.blocks.push(RawBlock::new(
            day,
            cell_start,
            cell_end - cell_start,
            label_id.clone(),
        ));
    }

    outcome
}

/// Sort blocks by `(day, start)` and merge exactly contiguous same-label
/// neighbours. Invalid blocks are dropped.
pub fn optimize(blocks: &[RawBlock]) -> Vec<RawBlock> {
    let mut sorted: Vec<RawBlock> = blocks.iter().filter(|b| b.is_valid()).cloned().collect();
    sorted.sort_by_key(|b| (b.day_index, b.start_minute));

    let mut merged: Vec<RawBlock> = Vec::with_capacity(sorted.len());
    for block in sorted {
        if let Some(prev) = merged.last_mut() {
            if prev.day_index == block.day_index
                && prev.label_id == block.label_id
                && prev.end_minute() == block.start_minute
            {
                prev.duration_minutes += block.duration_minutes;
                continue;
            }
        }
        merged.push(block);
    }
    merged
}

/// Project blocks onto slots.
///
/// A block `[start, end)` claims slots `floor((start - ws) / step)` through
/// `floor((end - 1 - ws) / step)` inclusive, so a block ending on a slot
/// boundary never spills into the next slot. Only visible slots are written.
/// Later blocks win conflicting slots.
pub fn materialize_schedule(config: &GridConfig, blocks: &[RawBlock]) -> BTreeMap<SlotKey, LabelId> {
    let mut schedule = BTreeMap::new();
    let step = config.step_minutes;
    let slot_count = config.slot_count();
    if step <= 0 || slot_count == 0 {
        return schedule;
    }
    let window_start = config.window_start();

    for block in blocks {
        if !block.is_valid() || !is_valid_day(block.day_index) {
            continue;
        }
        let min_slot = (block.start_minute - window_start).div_euclid(step);
        let max_slot = (block.end_minute() - 1 - window_start).div_euclid(step);

        let lo = min_slot.max(0);
        let hi = max_slot.min(slot_count - 1);
        for slot in lo..=hi {
            schedule.insert(SlotKey::new(block.day_index, slot), block.label_id.clone());
        }
    }
    schedule
}

/// Whether any two valid blocks on the same day intersect.
pub fn has_overlaps(blocks: &[RawBlock]) -> bool {
    let mut sorted: Vec<&RawBlock> = blocks.iter().filter(|b| b.is_valid()).collect();
    sorted.sort_by_key(|b| (b.day_index, b.start_minute));
    sorted
        .windows(2)
        .any(|w| w[0].day_index == w[1].day_index && w[0].end_minute() > w[1].start_minute)
}


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn paint_slots(config: &GridConfig, slots: &[(i32, i32)], label: &LabelId) -> Vec<RawBlock> {
        let mut blocks = Vec::new();
        for &(day, slot) in slots {
            if let Some((start, end)) = config.slot_range(slot) {
                blocks = slice(&blocks, day, start, end, Some(label)).blocks;
            }
        }
        optimize(&blocks)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Painting a contiguous run in any order optimizes to one block.
        #[test]
        fn prop_contiguous_paint_merges_to_single_block(
            (day, first, len, order) in (0i32..7, 0i32..20, 1i32..12).prop_flat_map(|(day, first, len)| {
                (Just(day), Just(first), Just(len), Just((first..first + len).collect::<Vec<_>>()).prop_shuffle())
            }),
        ) {
            let config = GridConfig::default();
            let slots: Vec<(i32, i32)> = order.into_iter().map(|s| (day, s)).collect();

            let blocks = paint_slots(&config, &slots, &LabelId::from("work"));
            prop_assert_eq!(blocks.len(), 1);
            prop_assert_eq!(blocks[0].start_minute, config.window_start() + first * 30);
            prop_assert_eq!(blocks[0].duration_minutes, len * 30);
        }

        /// Slicing never produces overlapping blocks from non-overlapping input.
        #[test]
        fn prop_slices_never_overlap(
            edits in proptest::collection::vec((0i32..7, 0i32..32, proptest::option::of(0u8..3)), 0..40),
        ) {
            let config = GridConfig::default();
            let labels = [LabelId::from("a"), LabelId::from("b"), LabelId::from("c")];
            let mut blocks = Vec::new();
            for (day, slot, label) in edits {
                if let Some((start, end)) = config.slot_range(slot) {
                    let paint = label.map(|l| &labels[l as usize]);
                    blocks = slice(&blocks, day, start, end, paint).blocks;
                }
                prop_assert!(!has_overlaps(&blocks));
            }
            prop_assert!(!has_overlaps(&optimize(&blocks)));
        }

        /// Optimize is idempotent.
        #[test]
        fn prop_optimize_idempotent(
            edits in proptest::collection::vec((0i32..7, 0i32..32, 0u8..2), 0..30),
        ) {
            let config = GridConfig::default();
            let labels = [LabelId::from("a"), LabelId::from("b")];
            let mut blocks = Vec::new();
            for (day, slot, label) in edits {
                if let Some((start, end)) = config.slot_range(slot) {
                    blocks = slice(&blocks, day, start, end, Some(&labels[label as usize])).blocks;
                }
            }
            let once = optimize(&blocks);
            let twice = optimize(&once);
            prop_assert_eq!(once, twice);
        }

        /// Optimizing does not change what is rendered.
        #[test]
        fn prop_optimize_preserves_materialized_view(
            edits in proptest::collection::vec((0i32..7, 0i32..32, proptest::option::of(0u8..2)), 0..30),
        ) {
            let config = GridConfig::default();
            let labels = [LabelId::from("a"), LabelId::from("b")];
            let mut blocks = Vec::new();
            for (day, slot, label) in edits {
                if let Some((start, end)) = config.slot_range(slot) {
                    let paint = label.map(|l| &labels[l as usize]);
                    blocks = slice(&blocks, day, start, end, paint).blocks;
                }
            }
            prop_assert_eq!(
                materialize_schedule(&config, &blocks),
                materialize_schedule(&config, &optimize(&blocks))
            );
        }
    }
}
