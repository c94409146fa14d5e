#[cfg(test)]
mod tests {
    use crate::cell;
    use crate::grid::{Grid, PaneRow, full_mask};
    use crate::piece::{Offset, Piece, Tetromino};

    #[test]
    fn test_full_mask() {
        assert_eq!(full_mask(1), 0b1);
        assert_eq!(full_mask(10), 0x3ff);
        assert_eq!(full_mask(64), u64::MAX);
    }

    #[test]
    fn test_shift_up_reports_overflow() {
        let mut grid = Grid::new(4, 3);
        grid.set(0, 2, 1, cell::S0);
        assert!(!grid.shift_up(1));
        assert!(grid.is_filled(0, 3, 1));
        assert!(grid.is_row_empty(0));
        assert!(grid.shift_up(1), "the block at the top falls off");
        assert_eq!(grid.count_blocks(), 0);
    }

    #[test]
    fn test_shift_down_returns_bottom_rows_first() {
        let mut grid = Grid::new(4, 2);
        grid.set(0, 0, 0, cell::S0);
        grid.set(1, 1, 1, cell::S1);
        grid.set(0, 2, 0, cell::SS);
        grid.set(1, 2, 0, cell::SS);
        let removed = grid.shift_down(2);
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].get(0, 0), cell::S0);
        assert_eq!(removed[1].get(1, 1), cell::S1);
        assert_eq!(grid.get(0, 0, 0), cell::SS);
        assert!(grid.is_row_empty(2));
    }

    #[test]
    fn test_place_row_degrades_shared_blocks_where_masks_differ() {
        let mut grid = Grid::new(2, 3);
        grid.place_row(0, cell::SS, [0b011, 0b110]);
        assert_eq!(grid.get(0, 0, 0), cell::S0);
        assert_eq!(grid.get(0, 0, 1), cell::SS);
        assert_eq!(grid.get(1, 0, 1), cell::SS);
        assert_eq!(grid.get(1, 0, 2), cell::S1);
        assert_eq!(grid.get(1, 0, 0), cell::NO);
    }

    #[test]
    fn test_place_row_single_pane_code_ignores_other_mask() {
        let mut grid = Grid::new(2, 3);
        grid.place_row(0, cell::S1, [0b111, 0b101]);
        assert_eq!(grid.row_mask(0, 0), 0);
        assert_eq!(grid.row_mask(1, 0), 0b101);
    }

    #[test]
    fn test_remove_block_takes_both_halves_of_shared_block() {
        let mut grid = Grid::new(2, 2);
        grid.place_row(0, cell::ST, [0b11, 0b11]);
        grid.remove_block(1, 0, 0);
        assert!(!grid.is_filled(0, 0, 0));
        assert!(!grid.is_filled(1, 0, 0));
        assert!(grid.is_filled(0, 0, 1));
    }

    #[test]
    fn test_column_height_per_pane() {
        let mut grid = Grid::new(5, 2);
        grid.set(1, 3, 0, cell::S1);
        assert_eq!(grid.column_height(0, [true, false]), 0);
        assert_eq!(grid.column_height(0, [false, true]), 4);
        assert_eq!(grid.column_height(0, [true, true]), 4);
    }

    #[test]
    fn test_push_flipped_swaps_panes_and_resets_markers() {
        let mut row = PaneRow::new(3);
        row.set(0, 0, cell::S0);
        row.set(0, 1, cell::PUSH_DOWN_ACTIVE);
        row.set(1, 2, cell::F1);
        let flipped = row.push_flipped();
        assert_eq!(flipped.get(1, 0), cell::S1);
        assert_eq!(flipped.get(1, 1), cell::PUSH_DOWN);
        assert_eq!(flipped.get(0, 2), cell::F0);
    }

    #[test]
    fn test_upgrade_classification_from_revision_zero() {
        assert_eq!(cell::upgrade_classification(cell::SS, 0), Some(cell::SS));
        assert_eq!(cell::upgrade_classification(14, 0), Some(cell::RAINBOW_BLAND));
        assert_eq!(cell::upgrade_classification(16, 0), Some(cell::R0));
        assert_eq!(cell::upgrade_classification(22, 0), Some(cell::R6));
        assert_eq!(cell::upgrade_classification(24, 0), None);
        assert_eq!(cell::upgrade_classification(cell::PUSH_UP, 1), Some(cell::PUSH_UP));
        assert_eq!(cell::upgrade_classification(99, 1), None);
    }

    #[test]
    fn test_cell_panes() {
        assert!(cell::spans_both_panes(cell::SS));
        assert!(cell::is_single_pane(cell::S0));
        assert!(cell::is_single_pane(cell::R3));
        assert!(!cell::is_single_pane(cell::NO));
        assert_eq!(cell::name(cell::SL_ACTIVE), "SL_ACTIVE");
        assert_eq!(cell::name(200), "INVALID");
    }

    #[test]
    fn test_piece_lock_and_occupancy() {
        let piece = Piece::tetromino(Tetromino::T, cell::S0);
        let mut grid = Grid::new(6, 5);
        let offset = Offset::new(1, 0);
        assert!(piece.fits(&grid, offset));
        assert_eq!(piece.occupancy(offset), vec![(0, [0b01110, 0]), (1, [0b00100, 0])]);
        piece.lock_into(&mut grid, offset);
        assert!(!piece.fits(&grid, offset));
        assert_eq!(grid.count_blocks(), 4);
    }

    #[test]
    fn test_shared_piece_occupies_both_panes() {
        let piece = Piece::tetromino(Tetromino::O, cell::SS);
        assert_eq!(piece.blocks.len(), 8);
        assert_eq!(piece.width(), 2);
        assert!(!piece.fits(&Grid::new(4, 4), Offset::new(3, 0)));
    }
}
