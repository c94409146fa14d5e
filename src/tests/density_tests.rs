#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::config::Density;
    use crate::density::{
        DensityKey, HOLES, PERMUTATION, PieceRow, QUANTUM_PANE_OFFSET, piece_negative_patterns,
        row_masks, single_gap_column, single_gap_mask, swiss_cheese_mask, tiled,
    };
    use crate::grid::full_mask;

    fn key_strategy() -> impl Strategy<Value = DensityKey> {
        (
            0i64..40,
            0i64..8,
            -1i64..7,
            -1i64..10,
            0i64..30,
            0i64..30,
            0i64..20,
            any::<i64>(),
        )
            .prop_map(
                |(row, cascade, piece_type, piece_column, level, first_level, first_garbage, seed)| {
                    DensityKey {
                        row,
                        cascade,
                        piece_type,
                        piece_column,
                        level,
                        first_level,
                        first_garbage,
                        seed,
                    }
                },
            )
    }

    #[test]
    fn test_permutation_covers_every_index_once() {
        let mut seen = [false; 32];
        for &value in &PERMUTATION {
            assert!(!seen[usize::from(value)], "duplicate {value}");
            seen[usize::from(value)] = true;
        }
        assert_eq!(HOLES.len(), 61);
    }

    #[test]
    fn test_quantum_panes_differ_for_same_key() {
        let key = DensityKey {
            row: 3,
            level: 5,
            ..DensityKey::default()
        };
        let masks = row_masks(Density::QuantumCheese, &key, 10, None);
        assert_eq!(masks[0], swiss_cheese_mask(&key, 10, 0));
        assert_eq!(masks[1], swiss_cheese_mask(&key, 10, QUANTUM_PANE_OFFSET));
    }

    #[test]
    fn test_preferred_masks_win() {
        let key = DensityKey::default();
        let masks = row_masks(Density::SwissCheese, &key, 10, Some([0b1, 0b10]));
        assert_eq!(masks, [0b1, 0b10]);
    }

    #[test]
    fn test_piece_negative_uses_cleared_rows() {
        let rows = [
            PieceRow {
                masks: [0b0000_0011, 0],
                cleared: true,
            },
            PieceRow {
                masks: [0b0000_0010, 0],
                cleared: false,
            },
        ];
        let patterns = piece_negative_patterns(&rows, 8, 1, false);
        assert_eq!(patterns[0], vec![0b1111_1100]);
        // Pane 1 never saw the piece: one gap under its column
        assert_eq!(patterns[1], vec![0b1111_1101]);
    }

    #[test]
    fn test_piece_negative_falls_back_to_all_rows_and_mirrors() {
        let rows = [
            PieceRow {
                masks: [0b001, 0b001],
                cleared: false,
            },
            PieceRow {
                masks: [0b011, 0b011],
                cleared: false,
            },
        ];
        let plain = piece_negative_patterns(&rows, 4, 0, false);
        let mirrored = piece_negative_patterns(&rows, 4, 0, true);
        assert_eq!(plain[0], vec![0b1110, 0b1100]);
        assert_eq!(mirrored[0], vec![0b1100, 0b1110]);
        assert_eq!(tiled(&plain, 3), [0b1100, 0b1100]);
    }

    proptest! {
        #[test]
        fn prop_density_is_deterministic(key in key_strategy(), cols in 4usize..=16) {
            for density in [Density::SingleGap, Density::SwissCheese, Density::QuantumCheese] {
                prop_assert_eq!(
                    row_masks(density, &key, cols, None),
                    row_masks(density, &DensityKey { ..key }, cols, None)
                );
            }
        }

        #[test]
        fn prop_single_gap_leaves_exactly_one_hole(key in key_strategy(), cols in 1usize..=64) {
            let mask = single_gap_mask(&key, cols);
            prop_assert!(single_gap_column(&key, cols) < cols);
            prop_assert_eq!(mask.count_ones() as usize, cols - 1);
            prop_assert_eq!(mask & !full_mask(cols), 0);
        }

        #[test]
        fn prop_swiss_cheese_stays_in_field_and_is_never_full(key in key_strategy(), cols in 1usize..=32) {
            let mask = swiss_cheese_mask(&key, cols, 0);
            prop_assert_eq!(mask & !full_mask(cols), 0);
            prop_assert!(mask != full_mask(cols));
        }
    }
}
