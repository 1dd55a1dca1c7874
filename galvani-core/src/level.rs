//! Current quantization
//!
//! Maps a signed physical current in nanoamps onto the discrete
//! (polarity, step size, step count) triple the block latches. Six fixed
//! step sizes are available; the quantizer picks the finest one that still
//! reaches the requested magnitude within the 7-bit count, so the
//! quantization error stays within half a step.

use crate::error::Error;

/// Maximum step count a channel register holds (7-bit field).
pub const MAX_CODE: u32 = 127;

/// Maximum requestable output magnitude: 4800 nA × 127 counts.
pub const MAX_CURRENT_NA: u32 = 609_600;

// Step sizes in nA. The smallest is not integral, so it is carried in
// tenths-of-nA and the surrounding arithmetic is scaled to match.
const STEP_37_X10: u32 = 375;
const STEP_75: u32 = 75;
const STEP_300: u32 = 300;
const STEP_600: u32 = 600;
const STEP_2400: u32 = 2400;
const STEP_4800: u32 = 4800;

const SCALE_X10: u32 = 10;

/// Direction of current flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Current flows out of the pin
    #[default]
    Source = 0,
    /// Current flows into the pin
    Sink = 1,
}

/// The fixed step-size table, ordered finest to coarsest.
///
/// Indices are latched into hardware: each consecutive pair shares a
/// range setting, with the odd index enabling the second output leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lsb {
    /// 37.5 nA per count, up to 4762.5 nA
    #[default]
    Lsb37 = 0,
    /// 75 nA per count, up to 9525 nA
    Lsb75 = 1,
    /// 300 nA per count, up to 38.1 uA
    Lsb300 = 2,
    /// 600 nA per count, up to 76.2 uA
    Lsb600 = 3,
    /// 2.4 uA per count, up to 304.8 uA
    Lsb2400 = 4,
    /// 4.8 uA per count, up to 609.6 uA
    Lsb4800 = 5,
}

impl Lsb {
    /// Position in the step table, as latched into the range field.
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Step size in tenths of a nanoamp.
    pub const fn tenths_na(self) -> u32 {
        match self {
            Lsb::Lsb37 => STEP_37_X10,
            Lsb::Lsb75 => STEP_75 * SCALE_X10,
            Lsb::Lsb300 => STEP_300 * SCALE_X10,
            Lsb::Lsb600 => STEP_600 * SCALE_X10,
            Lsb::Lsb2400 => STEP_2400 * SCALE_X10,
            Lsb::Lsb4800 => STEP_4800 * SCALE_X10,
        }
    }

    /// Largest magnitude this step reaches at full count, in tenths of
    /// a nanoamp.
    pub const fn max_tenths_na(self) -> u32 {
        self.tenths_na() * MAX_CODE
    }
}

/// A fully specified output level: what the hardware actually produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputLevel {
    /// Current direction
    pub polarity: Polarity,
    /// Step size
    pub lsb: Lsb,
    /// Step count, 0..=127
    pub code: u8,
}

impl OutputLevel {
    /// Quantize a requested current into the nearest representable level.
    ///
    /// Positive values source current, negative values sink it. The
    /// finest step size that reaches the magnitude within 127 counts is
    /// selected, and the count is rounded half-up, so the produced level
    /// is within half a step of the request. Returns
    /// [`Error::BadParam`] if the magnitude exceeds [`MAX_CURRENT_NA`].
    ///
    /// Requesting 123_456 nA, for example, yields 51 counts of the
    /// 2.4 uA step: 122_400 nA sourced.
    pub fn from_nanoamps(current: i32) -> Result<Self, Error> {
        let magnitude = current.unsigned_abs();
        if magnitude > MAX_CURRENT_NA {
            return Err(Error::BadParam);
        }

        let polarity = if current < 0 {
            Polarity::Sink
        } else {
            Polarity::Source
        };

        // Per-step magnitude if all 127 counts were used; selects the
        // coarsest entry whose next-finer neighbour would fall short.
        let per_step = magnitude / MAX_CODE;

        let (lsb, code) = if per_step > STEP_2400 {
            (Lsb::Lsb4800, (magnitude + STEP_4800 / 2) / STEP_4800)
        } else if per_step > STEP_600 {
            (Lsb::Lsb2400, (magnitude + STEP_2400 / 2) / STEP_2400)
        } else if per_step > STEP_300 {
            (Lsb::Lsb600, (magnitude + STEP_600 / 2) / STEP_600)
        } else if per_step > STEP_75 {
            (Lsb::Lsb300, (magnitude + STEP_300 / 2) / STEP_300)
        } else if per_step * SCALE_X10 > STEP_37_X10 {
            (Lsb::Lsb75, (magnitude + STEP_75 / 2) / STEP_75)
        } else {
            (
                Lsb::Lsb37,
                (magnitude * SCALE_X10 + STEP_37_X10 / 2) / STEP_37_X10,
            )
        };

        Ok(OutputLevel {
            polarity,
            lsb,
            code: code.min(MAX_CODE) as u8,
        })
    }

    /// Magnitude this level actually produces, in tenths of a nanoamp.
    pub const fn magnitude_tenths_na(&self) -> u32 {
        self.lsb.tenths_na() * self.code as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_range_request_uses_2400_step() {
        let level = OutputLevel::from_nanoamps(123_456).unwrap();
        assert_eq!(level.polarity, Polarity::Source);
        assert_eq!(level.lsb, Lsb::Lsb2400);
        assert_eq!(level.code, 51);
        assert_eq!(level.magnitude_tenths_na(), 1_224_000);
    }

    #[test]
    fn small_sink_request_uses_finest_step() {
        let level = OutputLevel::from_nanoamps(-500).unwrap();
        assert_eq!(level.polarity, Polarity::Sink);
        assert_eq!(level.lsb, Lsb::Lsb37);
        assert_eq!(level.code, 13);
    }

    #[test]
    fn zero_is_source_at_zero_count() {
        let level = OutputLevel::from_nanoamps(0).unwrap();
        assert_eq!(level.polarity, Polarity::Source);
        assert_eq!(level.lsb, Lsb::Lsb37);
        assert_eq!(level.code, 0);
    }

    #[test]
    fn full_scale_is_exact() {
        let level = OutputLevel::from_nanoamps(609_600).unwrap();
        assert_eq!(level.lsb, Lsb::Lsb4800);
        assert_eq!(level.code, 127);

        let level = OutputLevel::from_nanoamps(-609_600).unwrap();
        assert_eq!(level.polarity, Polarity::Sink);
        assert_eq!(level.code, 127);
    }

    #[test]
    fn over_range_is_rejected() {
        assert_eq!(
            OutputLevel::from_nanoamps(609_601),
            Err(Error::BadParam)
        );
        assert_eq!(
            OutputLevel::from_nanoamps(-609_601),
            Err(Error::BadParam)
        );
        assert_eq!(
            OutputLevel::from_nanoamps(i32::MIN),
            Err(Error::BadParam)
        );
    }

    #[test]
    fn step_selection_boundaries() {
        // Largest magnitude still served by the 2.4 uA step.
        let level = OutputLevel::from_nanoamps(304_926).unwrap();
        assert_eq!(level.lsb, Lsb::Lsb2400);
        assert_eq!(level.code, 127);

        // One more nanoamp tips the estimate over to 4.8 uA.
        let level = OutputLevel::from_nanoamps(304_927).unwrap();
        assert_eq!(level.lsb, Lsb::Lsb4800);
        assert_eq!(level.code, 64);

        // 600 -> 2400 boundary.
        assert_eq!(OutputLevel::from_nanoamps(76_326).unwrap().lsb, Lsb::Lsb600);
        assert_eq!(
            OutputLevel::from_nanoamps(76_327).unwrap().lsb,
            Lsb::Lsb2400
        );

        // 300 -> 600 boundary.
        assert_eq!(OutputLevel::from_nanoamps(38_226).unwrap().lsb, Lsb::Lsb300);
        assert_eq!(OutputLevel::from_nanoamps(38_227).unwrap().lsb, Lsb::Lsb600);

        // 75 -> 300 boundary.
        assert_eq!(OutputLevel::from_nanoamps(9_651).unwrap().lsb, Lsb::Lsb75);
        assert_eq!(OutputLevel::from_nanoamps(9_652).unwrap().lsb, Lsb::Lsb300);

        // 37.5 -> 75 boundary.
        assert_eq!(OutputLevel::from_nanoamps(4_825).unwrap().lsb, Lsb::Lsb37);
        assert_eq!(OutputLevel::from_nanoamps(4_826).unwrap().lsb, Lsb::Lsb75);
    }

    #[test]
    fn count_saturates_at_step_boundary() {
        // 4825 nA still selects the finest step, whose full count only
        // reaches 4762.5 nA; the count clamps instead of overflowing.
        let level = OutputLevel::from_nanoamps(4_825).unwrap();
        assert_eq!(level.lsb, Lsb::Lsb37);
        assert_eq!(level.code, 127);
    }

    #[test]
    fn rounding_is_half_up() {
        // 12150 nA is exactly 40.5 steps of 300 -> rounds up to 41.
        let level = OutputLevel::from_nanoamps(12_150).unwrap();
        assert_eq!(level.lsb, Lsb::Lsb300);
        assert_eq!(level.code, 41);

        // One nanoamp less rounds down to 40.
        let level = OutputLevel::from_nanoamps(12_149).unwrap();
        assert_eq!(level.code, 40);
    }

    #[test]
    fn polarity_is_symmetric() {
        for magnitude in [1, 50, 500, 4_825, 9_525, 123_456, 609_600] {
            let source = OutputLevel::from_nanoamps(magnitude).unwrap();
            let sink = OutputLevel::from_nanoamps(-magnitude).unwrap();
            assert_eq!(source.polarity, Polarity::Source);
            assert_eq!(sink.polarity, Polarity::Sink);
            assert_eq!(source.lsb, sink.lsb);
            assert_eq!(source.code, sink.code);
        }
    }
}
