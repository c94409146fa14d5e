#[cfg(test)]
mod tests {
    use crate::attack::{Attack, GarbageRow, TargetCode};
    use crate::cell;
    use crate::queue::AttackQueue;

    fn garbage(target: TargetCode, count: usize) -> Attack {
        let mut attack = Attack::new(target);
        attack.clear_rows = (0..count)
            .map(|i| GarbageRow::new(cell::SS, i as u32, 0, 0))
            .collect();
        attack
    }

    #[test]
    fn test_push_ignores_empty_attacks() {
        let mut queue = AttackQueue::new();
        queue.push(Attack::new(TargetCode::CycleNext));
        assert!(queue.is_empty());
        queue.push(garbage(TargetCode::CycleNext, 1));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_copy_then_replace_round_trips() {
        let mut queue = AttackQueue::new();
        queue.push(garbage(TargetCode::CycleNext, 1));
        queue.push(garbage(TargetCode::All, 2));
        queue.push(garbage(TargetCode::CyclePrevious, 3));

        let mut copied = Vec::new();
        queue.copy_into(&mut copied);
        assert_eq!(queue.len(), 3, "copying leaves the queue intact");

        let mut restored = AttackQueue::new();
        restored.replace(copied);
        assert_eq!(restored, queue);
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut queue = AttackQueue::new();
        queue.push(garbage(TargetCode::CycleNext, 2));
        let mut out = Vec::new();
        queue.drain_into(&mut out);
        assert!(queue.is_empty());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_aggregate_merges_same_target_runs() {
        let mut queue = AttackQueue::new();
        queue.push(garbage(TargetCode::CycleNext, 1));
        queue.push(garbage(TargetCode::CycleNext, 2));
        queue.push(garbage(TargetCode::All, 1));
        queue.push(garbage(TargetCode::CycleNext, 1));

        let mut out = Vec::new();
        queue.aggregate_into(&mut out, 40);
        let shape: Vec<(TargetCode, usize)> = out
            .iter()
            .map(|a| (a.target, a.garbage_row_count()))
            .collect();
        assert_eq!(
            shape,
            vec![
                (TargetCode::CycleNext, 3),
                (TargetCode::All, 1),
                (TargetCode::CycleNext, 1)
            ]
        );
    }

    #[test]
    fn test_aggregate_never_drops_rows_over_capacity() {
        let mut queue = AttackQueue::new();
        for _ in 0..5 {
            queue.push(garbage(TargetCode::CycleNext, 3));
        }
        let mut out = Vec::new();
        queue.aggregate_into(&mut out, 7);
        let total: usize = out.iter().map(Attack::garbage_row_count).sum();
        assert_eq!(total, 15);
        assert!(out.iter().all(|a| a.garbage_row_count() <= 7));
    }
}
