#![warn(clippy::all, clippy::pedantic)]

#[cfg(test)]
mod tests {
    use crate::attack::{Attack, DropBlock, GarbageRow, LevelChange, TargetCode};
    use crate::cell::{self, Cell};
    use crate::config::{
        AttackBehavior, BehaviorConfig, Composition, Include, Number, Queue, StartingTerrain,
        Target,
    };
    use crate::connectivity::{default_separates, has_sealed_row, is_connected};
    use crate::grid::{Grid, PaneRow, full_mask};
    use crate::progress::GameInfo;
    use crate::system::{AttackSystem, PushOutcome, Unleashed};
    use crate::tests::test_utils::{COLS, ROWS, engine_with, fill_rows, garbage_behavior};

    fn info() -> GameInfo {
        GameInfo::new(1, 0)
    }

    fn garbage_attack(codes: &[Cell]) -> Attack {
        let mut attack = Attack::new(TargetCode::CycleNext);
        attack.clear_rows = codes
            .iter()
            .enumerate()
            .map(|(i, &code)| GarbageRow::new(code, i as u32, 0, 4))
            .collect();
        attack
    }

    // Engine whose active slot holds `attack`
    fn armed(behavior: BehaviorConfig, attack: Attack) -> AttackSystem {
        let mut engine = engine_with(behavior);
        engine.enqueue_incoming_attack(attack);
        assert!(engine.dequeue_incoming_attacks_this_cycle());
        engine
    }

    fn marked_row(code: Cell, col: usize) -> PaneRow {
        let mut row = PaneRow::new(COLS);
        row.set(0, col, code);
        row
    }

    #[test]
    fn test_dequeue_merges_until_capacity() {
        let mut engine = engine_with(garbage_behavior(Number::All, Queue::PerCycle));
        let big = garbage_attack(&[cell::SS; 25]);
        engine.enqueue_incoming_attacks(vec![big.clone(), big]);

        assert!(engine.dequeue_incoming_attacks_this_cycle());
        assert_eq!(engine.active().garbage_row_count(), 25);
        assert_eq!(engine.active().target, TargetCode::Incoming);
        assert_eq!(engine.incoming_len(), 1);
    }

    #[test]
    fn test_dequeue_with_nothing_queued() {
        let mut engine = engine_with(BehaviorConfig::default());
        assert!(!engine.dequeue_incoming_attacks_this_cycle());
        assert!(!engine.has_garbage_rows());
        assert!(!engine.has_penalty_rows());
        assert!(!engine.has_push_rows());
        assert!(!engine.has_displace_rows());
        assert!(!engine.has_level_change());
        assert!(!engine.has_drop_blocks());
    }

    #[test]
    fn test_garbage_rows_enter_at_bottom() {
        let behavior = garbage_behavior(Number::All, Queue::PerCycle);
        let mut engine = armed(behavior, garbage_attack(&[cell::SS; 3]));
        assert!(engine.has_garbage_rows());
        let seed = engine.seed();

        let mut grid = Grid::new(ROWS, COLS);
        grid.set(0, 0, 7, cell::S0);
        let result = engine.unleash_garbage_rows(&mut grid, &info());

        assert_eq!(result, Unleashed { rows: 3, overflow: false });
        assert_eq!(grid.get(0, 3, 7), cell::S0, "existing blocks move up");
        for row in 0..3 {
            for pane in 0..2 {
                assert_eq!(grid.row_mask(pane, row).count_ones() as usize, COLS - 1);
            }
        }
        assert_eq!(engine.seed(), seed + 3);
        assert!(!engine.has_garbage_rows());
    }

    #[test]
    fn test_mixed_garbage_is_repaired() {
        let behavior = garbage_behavior(Number::All, Queue::PerCycle);
        let codes = [cell::S1, cell::S0, cell::SS, cell::ST, cell::S1];
        let mut engine = armed(behavior, garbage_attack(&codes));
        let mut grid = Grid::new(ROWS, COLS);
        let result = engine.unleash_garbage_rows(&mut grid, &info());

        assert_eq!(result.rows, codes.len());
        assert!(is_connected(&grid, codes.len(), &default_separates));
        assert!(!has_sealed_row(&grid, codes.len()));
    }

    #[test]
    fn test_level_up_rows_follow_clear_rows() {
        let behavior = garbage_behavior(Number::All, Queue::PerCycle);
        let mut attack = garbage_attack(&[cell::SS]);
        attack.level_up_rows = vec![GarbageRow::new(cell::ST, 0, 0, 0)];
        let mut engine = armed(behavior, attack);
        let mut grid = Grid::new(ROWS, COLS);
        engine.unleash_garbage_rows(&mut grid, &info());

        // First descriptor row is the top of the block
        assert!((0..COLS).all(|col| matches!(grid.get(1, 1, col), cell::SS | cell::NO)));
        assert!((0..COLS).any(|col| grid.get(1, 0, col) == cell::ST));
    }

    #[test]
    fn test_garbage_overflow_is_reported() {
        let behavior = garbage_behavior(Number::All, Queue::PerCycle);
        let mut engine = armed(behavior, garbage_attack(&[cell::SS]));
        let mut grid = Grid::new(ROWS, COLS);
        grid.set(1, ROWS - 1, 0, cell::S1);
        let result = engine.unleash_garbage_rows(&mut grid, &info());
        assert!(result.overflow);
    }

    #[test]
    fn test_preferred_masks_are_used() {
        let behavior = garbage_behavior(Number::All, Queue::PerCycle);
        let mut attack = garbage_attack(&[cell::SS]);
        attack.clear_rows[0].preferred = Some([0b11_1111_1110, 0b11_1111_1110]);
        let mut engine = armed(behavior, attack);
        let mut grid = Grid::new(ROWS, COLS);
        engine.unleash_garbage_rows(&mut grid, &info());
        assert_eq!(grid.row_mask(0, 0), 0b11_1111_1110);
        assert_eq!(grid.row_mask(1, 0), 0b11_1111_1110);
    }

    #[test]
    fn test_penalty_rows_alternate_gap() {
        let mut attack = Attack::new(TargetCode::Incoming);
        attack.penalty_rows = 3;
        let mut engine = armed(BehaviorConfig::default(), attack);
        assert!(engine.has_penalty_rows());

        let mut grid = Grid::new(ROWS, COLS);
        let result = engine.unleash_penalty_rows(&mut grid, &info());
        assert_eq!(result.rows, 3);
        let full = full_mask(COLS);
        for pane in 0..2 {
            assert_eq!(grid.row_mask(pane, 0), full & !1);
            assert_eq!(grid.row_mask(pane, 1), full >> 1);
            assert_eq!(grid.row_mask(pane, 2), full & !1);
        }
        assert_eq!(grid.get(0, 0, 5), cell::ST);
        assert!(!engine.has_penalty_rows());
    }

    fn push_behavior() -> BehaviorConfig {
        BehaviorConfig {
            push: AttackBehavior {
                composition: Composition::Standard,
                include: Include::Everything,
                target: Target::CycleNext,
                ..AttackBehavior::default()
            },
            ..BehaviorConfig::default()
        }
    }

    #[test]
    fn test_push_cross_wires_matched_rows() {
        let mut attack = Attack::new(TargetCode::Incoming);
        attack.push_out_rows = 2;
        attack.push_in_rows = vec![
            marked_row(cell::S0, 0),
            marked_row(cell::S0, 1),
            marked_row(cell::S0, 2),
        ];
        let mut engine = armed(push_behavior(), attack);
        assert!(engine.has_push_rows());

        let mut grid = Grid::new(ROWS, COLS);
        grid.set(0, 0, 9, cell::SS);
        let outcome = engine.unleash_push_rows(&mut grid);

        // Three rows in against two out: the one unmatched incoming row
        // still enters, so the field rises by one rather than staying level
        assert_eq!(
            outcome,
            PushOutcome {
                pushed_in: 1,
                pushed_out: 0,
                cross_wired: 2,
                sent: 2,
                overflow: false,
            }
        );
        // The oldest incoming row stays; the field rises by one
        assert_eq!(grid.get(0, 0, 0), cell::S0);
        assert_eq!(grid.get(0, 1, 9), cell::SS);

        let mut out = Vec::new();
        engine.copy_and_clear_outgoing_queue(&mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target, TargetCode::CycleNext);
        // Newest first, flipped into the other pane
        assert_eq!(out[0].push_in_rows[0].get(1, 2), cell::S1);
        assert_eq!(out[0].push_in_rows[1].get(1, 1), cell::S1);
        assert!(!engine.has_push_rows());
    }

    #[test]
    fn test_push_out_takes_bottom_rows() {
        let mut attack = Attack::new(TargetCode::Incoming);
        attack.push_out_rows = 2;
        let mut engine = armed(push_behavior(), attack);

        let mut grid = Grid::new(ROWS, COLS);
        grid.set(0, 0, 0, cell::PUSH_DOWN_ACTIVE);
        grid.set(1, 1, 1, cell::S1);
        grid.set(0, 2, 2, cell::S0);
        let outcome = engine.unleash_push_rows(&mut grid);

        assert_eq!(outcome.pushed_out, 2);
        assert_eq!(outcome.sent, 2);
        assert_eq!(grid.get(0, 0, 2), cell::S0);

        let mut out = Vec::new();
        engine.copy_and_clear_outgoing_queue(&mut out);
        let sent = &out[0].push_in_rows;
        assert_eq!(sent[0].get(1, 0), cell::PUSH_DOWN);
        assert_eq!(sent[1].get(0, 1), cell::S0);
    }

    #[test]
    fn test_push_in_overflow() {
        let mut attack = Attack::new(TargetCode::Incoming);
        attack.push_in_rows = vec![marked_row(cell::SS, 4)];
        let mut engine = armed(push_behavior(), attack);
        let mut grid = Grid::new(ROWS, COLS);
        grid.set(0, ROWS - 1, 3, cell::S0);
        let outcome = engine.unleash_push_rows(&mut grid);
        assert!(outcome.overflow);
        assert_eq!(outcome.sent, 0);
        assert_eq!(engine.outgoing_len(), 0);
    }

    #[test]
    fn test_displacement_accelerates_host() {
        let mut attack = Attack::new(TargetCode::Incoming);
        attack.displace_rows = 3;
        let mut engine = armed(BehaviorConfig::default(), attack);
        assert!(engine.has_displace_rows());

        let mut host = info();
        assert_eq!(engine.unleash_displace_rows(&mut host), 3);
        assert_eq!(host.displaced_rows, 3);
        assert_eq!(engine.unleash_displace_rows(&mut host), 0);
    }

    #[test]
    fn test_level_change_only_raises() {
        let level_change = |difference| {
            let mut attack = Attack::new(TargetCode::AllOthers);
            attack.level_change = Some(LevelChange {
                level: 0,
                difference,
            });
            attack
        };
        let mut host = info();
        host.level = 2;

        let mut engine = armed(BehaviorConfig::default(), level_change(4));
        assert!(engine.has_level_change());
        assert_eq!(engine.unleash_level_change(&mut host), Some(5));
        assert_eq!(host.level, 5);

        let mut engine = armed(BehaviorConfig::default(), level_change(-3));
        assert_eq!(engine.unleash_level_change(&mut host), None);
        assert_eq!(host.level, 5);
    }

    #[test]
    fn test_level_changes_from_two_senders_keep_the_larger() {
        let level_up = |level, difference| {
            let mut attack = Attack::new(TargetCode::AllOthers);
            attack.level_change = Some(LevelChange { level, difference });
            attack
        };
        let mut engine = engine_with(BehaviorConfig::default());
        engine.enqueue_incoming_attacks(vec![level_up(6, 5), level_up(3, 2)]);
        assert!(engine.dequeue_incoming_attacks_this_cycle());

        let mut host = info();
        assert_eq!(engine.unleash_level_change(&mut host), Some(6));
        assert_eq!(host.level, 6);
    }

    #[test]
    fn test_drop_blocks_land_on_columns() {
        let mut attack = Attack::new(TargetCode::AllOthers);
        attack.drop_blocks = vec![
            DropBlock {
                classification: cell::SS,
                cascade: 0,
            };
            3
        ];
        let mut engine = armed(BehaviorConfig::default(), attack);
        assert!(engine.has_drop_blocks());
        let seed = engine.seed();

        let mut grid = Grid::new(ROWS, COLS);
        assert_eq!(engine.unleash_drop_blocks(&mut grid, &info()), 3);
        assert_eq!(grid.count_blocks(), 6);
        assert_eq!(engine.seed(), seed + 3);
    }

    #[test]
    fn test_drop_blocks_lost_over_full_columns() {
        let mut attack = Attack::new(TargetCode::AllOthers);
        attack.drop_blocks = vec![DropBlock {
            classification: cell::S0,
            cascade: 0,
        }];
        let mut engine = armed(BehaviorConfig::default(), attack);
        let mut grid = Grid::new(ROWS, COLS);
        fill_rows(&mut grid, 0..ROWS, cell::ST);
        assert_eq!(engine.unleash_drop_blocks(&mut grid, &info()), 0);
        assert!(!engine.has_drop_blocks());
    }

    #[test]
    fn test_starting_terrain_from_behavior() {
        let behavior = BehaviorConfig {
            terrain: StartingTerrain {
                st: 1,
                ss: 2,
                s0: 1,
                s1: 1,
            },
            ..BehaviorConfig::default()
        };
        let mut engine = engine_with(behavior);
        let seed = engine.seed();
        let mut grid = Grid::new(ROWS, COLS);
        let result = engine.generate_starting_terrain(&mut grid, &info());

        assert_eq!(result.rows, 5);
        assert!(is_connected(&grid, 5, &default_separates));
        assert!(!has_sealed_row(&grid, 5));
        assert!(grid.is_row_empty(5));
        assert!((0..COLS).all(|col| matches!(grid.get(0, 0, col), cell::ST | cell::S0 | cell::NO)));
        assert_eq!(engine.seed(), seed + 5);
    }

    #[test]
    fn test_starting_terrain_falls_back_to_first_garbage() {
        let mut engine = engine_with(BehaviorConfig::default());
        let mut grid = Grid::new(ROWS, COLS);
        let result = engine.generate_starting_terrain(&mut grid, &GameInfo::new(1, 4));
        assert_eq!(result.rows, 4);

        let mut engine = engine_with(BehaviorConfig::default());
        let mut grid = Grid::new(ROWS, COLS);
        assert_eq!(
            engine.generate_starting_terrain(&mut grid, &info()),
            Unleashed::default()
        );
        assert_eq!(grid.count_blocks(), 0);
    }

    #[test]
    fn test_same_seed_same_terrain() {
        let behavior = BehaviorConfig {
            terrain: StartingTerrain {
                ss: 6,
                ..StartingTerrain::default()
            },
            ..BehaviorConfig::default()
        };
        let mut a = engine_with(behavior.clone());
        let mut b = engine_with(behavior);
        let (mut grid_a, mut grid_b) = (Grid::new(ROWS, COLS), Grid::new(ROWS, COLS));
        a.generate_starting_terrain(&mut grid_a, &info());
        b.generate_starting_terrain(&mut grid_b, &info());
        assert_eq!(grid_a, grid_b);
    }
}
