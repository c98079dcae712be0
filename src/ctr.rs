/// Expected organic click-through rate per SERP position.
///
/// Rates are whole percent (32.26 means 32.26%) and strictly decrease
/// with position. The goal projector relies on both properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CtrRow {
    pub position: u8,
    pub ctr: f64,
}

pub const SERP_CTR: [CtrRow; 10] = [
    CtrRow { position: 1, ctr: 32.26 },
    CtrRow { position: 2, ctr: 14.67 },
    CtrRow { position: 3, ctr: 8.55 },
    CtrRow { position: 4, ctr: 5.66 },
    CtrRow { position: 5, ctr: 3.93 },
    CtrRow { position: 6, ctr: 2.82 },
    CtrRow { position: 7, ctr: 2.11 },
    CtrRow { position: 8, ctr: 1.63 },
    CtrRow { position: 9, ctr: 1.30 },
    CtrRow { position: 10, ctr: 1.07 },
];

/// First-position CTR as a decimal fraction, used by the per-keyword
/// traffic estimate. Kept at the conventional 32% rather than the
/// table's 32.26 so traffic figures stay comparable across imports.
pub const FIRST_POSITION_CTR: f64 = 0.32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_positions_are_one_through_ten() {
        for (i, row) in SERP_CTR.iter().enumerate() {
            assert_eq!(row.position as usize, i + 1);
        }
    }

    #[test]
    fn ctr_strictly_decreases_with_position() {
        for pair in SERP_CTR.windows(2) {
            assert!(pair[0].ctr > pair[1].ctr);
        }
    }
}
