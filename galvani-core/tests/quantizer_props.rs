//! Quantizer properties over the full input range.

use galvani_core::{OutputLevel, Polarity, MAX_CODE, MAX_CURRENT_NA};
use proptest::prelude::*;

const MAX: i32 = MAX_CURRENT_NA as i32;

proptest! {
    #[test]
    fn level_is_always_in_range(current in -MAX..=MAX) {
        let level = OutputLevel::from_nanoamps(current).unwrap();
        prop_assert!(u32::from(level.code) <= MAX_CODE);
        prop_assert!(level.lsb.index() <= 5);
    }

    #[test]
    fn unsaturated_levels_are_within_half_a_step(current in -MAX..=MAX) {
        let level = OutputLevel::from_nanoamps(current).unwrap();
        // A clamped count deliberately under-represents; every other
        // level is within half a step of the request.
        prop_assume!(u32::from(level.code) < MAX_CODE);

        let produced = i64::from(level.magnitude_tenths_na());
        let requested = i64::from(current.unsigned_abs()) * 10;
        let half_step = i64::from(level.lsb.tenths_na() / 2);
        prop_assert!((produced - requested).abs() <= half_step);
    }

    #[test]
    fn polarity_is_symmetric(magnitude in 0..=MAX) {
        let source = OutputLevel::from_nanoamps(magnitude).unwrap();
        let sink = OutputLevel::from_nanoamps(-magnitude).unwrap();

        prop_assert_eq!(source.polarity, Polarity::Source);
        if magnitude > 0 {
            prop_assert_eq!(sink.polarity, Polarity::Sink);
        }
        prop_assert_eq!(source.lsb, sink.lsb);
        prop_assert_eq!(source.code, sink.code);
    }

    #[test]
    fn step_size_is_monotone_in_magnitude(magnitude in 0..MAX) {
        let finer = OutputLevel::from_nanoamps(magnitude).unwrap();
        let coarser = OutputLevel::from_nanoamps(magnitude + 1).unwrap();
        prop_assert!(coarser.lsb.index() >= finer.lsb.index());
    }

    #[test]
    fn out_of_range_is_rejected(current in (MAX + 1)..=i32::MAX) {
        prop_assert!(OutputLevel::from_nanoamps(current).is_err());
        prop_assert!(OutputLevel::from_nanoamps(-current).is_err());
    }
}
