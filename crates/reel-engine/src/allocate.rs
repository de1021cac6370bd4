//! Clip duration allocation.
//!
//! Splits a part's duration budget equally across its candidate clips,
//! rounding each share *up* to the nearest millisecond so accumulated
//! rounding error can only lengthen the part, never shorten it.

use tracing::debug;

use reel_models::{ClipDescriptor, ClipPlan};

use crate::error::EngineResult;

/// Compute one [`ClipPlan`] per descriptor for a part.
///
/// Each clip's intended trim end is `min(per_clip_cap, share)` and the
/// actual trim end is additionally capped by the clip's native duration;
/// footage beyond what the source contains is never requested. `trim_start`
/// is always 0.
///
/// Known limitation: a short clip's shortfall is not reallocated onto its
/// siblings, so parts can come in under their duration budget.
///
/// Zero descriptors yield an empty plan list; the assembler treats that as
/// "skip part, contribute zero duration".
pub fn allocate(
    part_duration: f64,
    descriptors: &[ClipDescriptor],
    per_clip_cap: Option<f64>,
) -> EngineResult<Vec<ClipPlan>> {
    if descriptors.is_empty() {
        return Ok(Vec::new());
    }

    let raw_share = part_duration / descriptors.len() as f64;
    // Ceiling to the millisecond: the sum of shares is never short of the
    // budget by more than (n-1) ms.
    let share = (raw_share * 1000.0).ceil() / 1000.0;
    debug!(
        part_duration,
        clips = descriptors.len(),
        share,
        "Allocating part duration across clips"
    );

    let mut plans = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let intended = match per_clip_cap {
            Some(cap) => cap.min(share),
            None => share,
        };
        let trim_end = intended.min(descriptor.native_duration);
        plans.push(ClipPlan::new(descriptor.clone(), trim_end)?);
    }
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::ClipQuality;

    fn descriptor(id: u32, native: f64) -> ClipDescriptor {
        ClipDescriptor::new(
            "nature",
            format!("https://cdn.example.com/{}.mp4", id),
            native,
            ClipQuality::High,
        )
        .unwrap()
    }

    #[test]
    fn test_empty_descriptor_list() {
        let plans = allocate(20.0, &[], None).unwrap();
        assert!(plans.is_empty());
    }

    #[test]
    fn test_equal_split_short_clip_capped_by_native_duration() {
        // 20s over three clips: share is 20/3 ceiled to the ms (6.667); the
        // 5s clip caps below its share.
        let descriptors = vec![descriptor(1, 5.0), descriptor(2, 30.0), descriptor(3, 8.0)];
        let plans = allocate(20.0, &descriptors, None).unwrap();

        assert!((plans[0].trim_end - 5.0).abs() < 1e-9);
        assert!((plans[1].trim_end - 6.667).abs() < 1e-9);
        assert!((plans[2].trim_end - 6.667).abs() < 1e-9);

        let total: f64 = plans.iter().map(ClipPlan::planned_duration).sum();
        assert!((total - 18.334).abs() < 1e-9); // accepted under-time shortfall
    }

    #[test]
    fn test_share_sum_bound_when_no_clip_is_short() {
        let n = 7;
        let descriptors: Vec<_> = (0..n).map(|i| descriptor(i, 100.0)).collect();
        let part_duration = 10.0;
        let plans = allocate(part_duration, &descriptors, None).unwrap();

        let total: f64 = plans.iter().map(ClipPlan::planned_duration).sum();
        // Ceiling rounding: total in [D, D + n ms).
        assert!(total >= part_duration - 1e-9);
        assert!(total < part_duration + n as f64 * 0.001);
    }

    #[test]
    fn test_per_clip_cap_applies_before_native_cap() {
        let descriptors = vec![descriptor(1, 30.0), descriptor(2, 2.0)];
        let plans = allocate(20.0, &descriptors, Some(8.0)).unwrap();

        assert!((plans[0].trim_end - 8.0).abs() < 1e-9); // capped by per-clip cap
        assert!((plans[1].trim_end - 2.0).abs() < 1e-9); // capped by native duration
    }

    #[test]
    fn test_trim_never_exceeds_native_duration() {
        let descriptors: Vec<_> = [0.5, 1.0, 3.0, 50.0]
            .iter()
            .enumerate()
            .map(|(i, d)| descriptor(i as u32, *d))
            .collect();
        let plans = allocate(60.0, &descriptors, None).unwrap();
        for plan in &plans {
            assert!(plan.trim_end <= plan.descriptor.native_duration + 1e-9);
            assert_eq!(plan.trim_start, 0.0);
        }
    }

    #[test]
    fn test_single_descriptor_gets_whole_budget() {
        let plans = allocate(12.0, &[descriptor(1, 40.0)], None).unwrap();
        assert_eq!(plans.len(), 1);
        assert!((plans[0].trim_end - 12.0).abs() < 1e-9);
    }
}
