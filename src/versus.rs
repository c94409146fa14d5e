#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Field dimensions and piece offsets are small
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

//! Headless versus host.
//!
//! Every player is an entity carrying a field, an attack engine and a seeded
//! randomizer. A cycle drops one piece per field, moves outgoing attacks
//! over a channel to their recipients, and applies whatever each engine
//! dequeues. Nothing here reads the clock, so a match is fully determined by
//! its configuration.

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, info, trace};

use crate::attack::{Attack, TargetCode};
use crate::cell::{self, Cell};
use crate::config::{BehaviorConfig, VersusConfig};
use crate::game::{LINES_PER_LEVEL, PANES};
use crate::grid::Grid;
use crate::piece::{Offset, Piece, Tetromino};
use crate::progress::GameInfo;
use crate::system::{AttackSystem, ClearEvent};

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Player {
    pub index: usize,
}

#[derive(Component, Debug, Clone)]
pub struct Field {
    pub grid: Grid,
    pub info: GameInfo,
    pub lines: u32,
    pub topped_out: bool,
    pub attacks_sent: u32,
    pub attacks_received: u32,
}

#[derive(Component, Debug, Clone)]
pub struct Engine(pub AttackSystem);

#[derive(Component, Debug, Clone)]
pub struct Randomizer(pub fastrand::Rng);

/// An attack on its way to one player.
#[derive(Debug, Clone)]
pub struct Parcel {
    pub from: usize,
    pub to: usize,
    pub attack: Attack,
}

#[derive(Resource, Debug, Clone)]
pub struct Transport {
    sender: Sender<Parcel>,
    receiver: Receiver<Parcel>,
}

impl Transport {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct MatchClock {
    pub cycle: u32,
    pub players: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerReport {
    pub index: usize,
    pub level: u32,
    pub lines: u32,
    pub blocks: usize,
    pub topped_out: bool,
    pub attacks_sent: u32,
    pub attacks_received: u32,
    pub displaced_rows: u32,
    /// Engine snapshot at the end of the match.
    pub snapshot: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchReport {
    pub cycles: u32,
    pub players: Vec<PlayerReport>,
}

impl MatchReport {
    /// Players still standing, or `None` while more than one is.
    #[must_use]
    pub fn winner(&self) -> Option<usize> {
        let mut standing = self.players.iter().filter(|p| !p.topped_out);
        match (standing.next(), standing.next()) {
            (Some(player), None) if self.players.len() > 1 => Some(player.index),
            _ => None,
        }
    }
}

pub fn spawn_player(world: &mut World, index: usize, config: &VersusConfig, behavior: &BehaviorConfig) {
    let seed = config.seed.wrapping_add(index as u64);
    let mut engine = AttackSystem::new(config.rows, config.cols, seed as i64);
    engine.set_behavior(behavior.clone());
    engine.finalize_configuration();
    let mut info = GameInfo::new(config.first_level, config.first_garbage);
    info.garbage_per_level = config.garbage_per_level;
    let mut grid = Grid::new(config.rows, config.cols);
    engine.generate_starting_terrain(&mut grid, &info);
    world.spawn((
        Player { index },
        Field {
            grid,
            info,
            lines: 0,
            topped_out: false,
            attacks_sent: 0,
            attacks_received: 0,
        },
        Engine(engine),
        Randomizer(fastrand::Rng::with_seed(seed)),
    ));
    debug!("Spawned player {index} with seed {seed}");
}

// Players in index order so every pass is deterministic
fn players(world: &mut World) -> Vec<(usize, Entity)> {
    let mut players: Vec<(usize, Entity)> = world
        .query::<(Entity, &Player)>()
        .iter(world)
        .map(|(entity, player)| (player.index, entity))
        .collect();
    players.sort_unstable();
    players
}

fn piece_height(piece: &Piece) -> i32 {
    piece.blocks.iter().map(|b| b.row).max().map_or(0, |row| row + 1)
}

// Lowest resting offset for the piece at `x`, if it fits at the top
fn landing(grid: &Grid, piece: &Piece, x: i32) -> Option<Offset> {
    let mut offset = Offset::new(x, grid.rows() as i32 - piece_height(piece));
    if offset.y < 0 || !piece.fits(grid, offset) {
        return None;
    }
    while offset.y > 0 && piece.fits(grid, Offset::new(x, offset.y - 1)) {
        offset.y -= 1;
    }
    Some(offset)
}

// Picks the column where the piece comes to rest lowest, ties at random
fn choose_placement(grid: &Grid, piece: &Piece, rng: &mut fastrand::Rng) -> Option<Offset> {
    let last = grid.cols() as i32 - piece.width();
    let candidates: Vec<Offset> = (0..=last).filter_map(|x| landing(grid, piece, x)).collect();
    let lowest = candidates.iter().map(|o| o.y).min()?;
    let best: Vec<Offset> = candidates.into_iter().filter(|o| o.y == lowest).collect();
    Some(best[rng.usize(..best.len())])
}

fn random_piece(rng: &mut fastrand::Rng) -> Piece {
    let kind = Tetromino::ALL[rng.usize(..Tetromino::ALL.len())];
    let classification = match rng.u8(..16) {
        0..=5 => cell::S0,
        6..=11 => cell::S1,
        12..=14 => cell::SS,
        _ => cell::PUSH_DOWN,
    };
    Piece::tetromino(kind, classification)
}

/// One cleared row per entry; `None` where the row stays.
fn find_clears(grid: &Grid) -> (Vec<Option<Cell>>, Vec<bool>) {
    let mut chromatic = vec![None; grid.rows()];
    let mut monochromatic = vec![false; grid.rows()];
    for row in 0..grid.rows() {
        match (grid.is_row_full(0, row), grid.is_row_full(1, row)) {
            (true, true) => monochromatic[row] = true,
            (true, false) => chromatic[row] = Some(cell::S0),
            (false, true) => chromatic[row] = Some(cell::S1),
            (false, false) => {}
        }
    }
    (chromatic, monochromatic)
}

fn cleared_panes(chromatic: Option<Cell>, monochromatic: bool) -> [bool; PANES] {
    if monochromatic {
        return [true, true];
    }
    match chromatic {
        Some(cell::S0) => [true, false],
        Some(cell::S1) => [false, true],
        _ => [false, false],
    }
}

// Grid with only the cleared cells, and the grid as the clear leaves it
// before the rows collapse
fn clear_views(grid: &Grid, chromatic: &[Option<Cell>], monochromatic: &[bool]) -> (Grid, Grid) {
    let mut inverted = Grid::new(grid.rows(), grid.cols());
    let mut activated = grid.clone();
    for row in 0..grid.rows() {
        let panes = cleared_panes(chromatic[row], monochromatic[row]);
        for pane in (0..PANES).filter(|&p| panes[p]) {
            for col in 0..grid.cols() {
                let code = grid.get(pane, row, col);
                inverted.set(pane, row, col, code);
                let active = match code {
                    cell::PUSH_DOWN => cell::PUSH_DOWN_ACTIVE,
                    cell::PUSH_UP => cell::PUSH_UP_ACTIVE,
                    other => other,
                };
                activated.set(pane, row, col, active);
            }
        }
    }
    (inverted, activated)
}

fn collapse(grid: &mut Grid, chromatic: &[Option<Cell>], monochromatic: &[bool]) -> u32 {
    let mut lines = 0;
    for row in (0..grid.rows()).rev() {
        let panes = cleared_panes(chromatic[row], monochromatic[row]);
        if panes == [false, false] {
            continue;
        }
        lines += 1;
        for pane in (0..PANES).filter(|&p| panes[p]) {
            for r in row..grid.rows() {
                for col in 0..grid.cols() {
                    let above = if r + 1 < grid.rows() { grid.get(pane, r + 1, col) } else { cell::NO };
                    grid.set(pane, r, col, above);
                }
            }
        }
    }
    // A both-pane block that lost one half belongs to the remaining pane
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            for pane in 0..PANES {
                let code = grid.get(pane, row, col);
                if cell::spans_both_panes(code) && grid.get(1 - pane, row, col) != code {
                    grid.set(pane, row, col, cell::pane_component(code, pane));
                }
            }
        }
    }
    lines
}

/// Drops one piece into every field and closes the engines' cycles.
pub fn play_cycle_system(world: &mut World) {
    let players = players(world);
    let mut query = world.query::<(&mut Field, &mut Engine, &mut Randomizer)>();
    for (index, entity) in players {
        let Ok((mut field, mut engine, mut rng)) = query.get_mut(world, entity) else {
            continue;
        };
        if field.topped_out {
            continue;
        }
        let field = &mut *field;
        let engine = &mut engine.0;
        let piece = random_piece(&mut rng.0);
        let spawn = Offset::new(0, field.grid.rows() as i32 - piece_height(&piece));
        engine.on_piece_about_to_enter(&piece, spawn);
        let Some(offset) = choose_placement(&field.grid, &piece, &mut rng.0) else {
            info!("Player {index} topped out");
            field.topped_out = true;
            continue;
        };
        engine.on_piece_about_to_lock(&field.grid, &piece, offset);
        piece.lock_into(&mut field.grid, offset);

        let mut first = true;
        loop {
            let (chromatic, monochromatic) = find_clears(&field.grid);
            if chromatic.iter().all(Option::is_none) && !monochromatic.contains(&true) {
                break;
            }
            let (inverted, activated) = clear_views(&field.grid, &chromatic, &monochromatic);
            let event = ClearEvent {
                before: &field.grid,
                after: &activated,
                inverted: &inverted,
                chromatic: &chromatic,
                monochromatic: &monochromatic,
            };
            engine.on_about_to_clear(first.then_some(&piece), &event);
            field.lines += collapse(&mut field.grid, &chromatic, &monochromatic);
            first = false;
        }

        let reached = field.info.first_level + field.lines / LINES_PER_LEVEL;
        if reached > field.info.level {
            let gained = reached - field.info.level;
            engine.on_about_to_level_up(&field.info, gained);
            field.info.level = reached;
            trace!("Player {index} reached level {reached}");
        }
        engine.end_cycle();
    }
}

// Recipients of one descriptor; divided targets get a share each
fn deliveries(from: usize, count: usize, cycle: u32, attack: Attack) -> Vec<(usize, Attack)> {
    let next = (from + 1) % count;
    let previous = (from + count - 1) % count;
    let everyone = || (0..count).collect::<Vec<_>>();
    let others = || (0..count).filter(|&p| p != from).collect::<Vec<_>>();
    let recipients = match attack.target {
        TargetCode::Incoming => vec![from],
        TargetCode::CycleNext => vec![next],
        TargetCode::CyclePrevious => vec![previous],
        TargetCode::CycleAlternate => vec![if cycle % 2 == 0 { next } else { previous }],
        TargetCode::All | TargetCode::AllDivided => everyone(),
        TargetCode::AllOthers | TargetCode::AllOthersDivided => others(),
    };
    if attack.target.is_divided() {
        let parts = attack.divide(recipients.len());
        recipients.into_iter().zip(parts).collect()
    } else {
        recipients.into_iter().map(|to| (to, attack.clone())).collect()
    }
}

/// Moves every outgoing descriptor to its recipients' incoming queues.
pub fn transport_system(world: &mut World) {
    let transport = world.resource::<Transport>().clone();
    let clock = *world.resource::<MatchClock>();
    let players = players(world);
    let mut query = world.query::<(&mut Field, &mut Engine)>();

    let mut outgoing = Vec::new();
    for &(index, entity) in &players {
        let Ok((mut field, mut engine)) = query.get_mut(world, entity) else {
            continue;
        };
        outgoing.clear();
        engine.0.aggregate_and_clear_outgoing_queue(&mut outgoing);
        for attack in outgoing.drain(..) {
            field.attacks_sent += 1;
            for (to, attack) in deliveries(index, clock.players, clock.cycle, attack) {
                // The receiver outlives every sender clone, so this cannot fail
                let _ = transport.sender.send(Parcel { from: index, to, attack });
            }
        }
    }

    for parcel in transport.receiver.try_iter() {
        let Some(&(_, entity)) = players.iter().find(|(index, _)| *index == parcel.to) else {
            continue;
        };
        let Ok((mut field, mut engine)) = query.get_mut(world, entity) else {
            continue;
        };
        if field.topped_out || parcel.attack.is_empty() {
            continue;
        }
        trace!("Delivering attack from player {} to {}", parcel.from, parcel.to);
        field.attacks_received += 1;
        engine.0.enqueue_incoming_attack(parcel.attack);
    }
}

/// Applies the attacks each engine dequeues this cycle.
pub fn unleash_system(world: &mut World) {
    let players = players(world);
    let mut query = world.query::<(&mut Field, &mut Engine)>();
    for (index, entity) in players {
        let Ok((mut field, mut engine)) = query.get_mut(world, entity) else {
            continue;
        };
        if field.topped_out {
            continue;
        }
        let field = &mut *field;
        let engine = &mut engine.0;
        if !engine.dequeue_incoming_attacks_this_cycle() {
            continue;
        }
        let mut overflow = false;
        if engine.has_garbage_rows() {
            overflow |= engine.unleash_garbage_rows(&mut field.grid, &field.info).overflow;
        }
        if engine.has_penalty_rows() {
            overflow |= engine.unleash_penalty_rows(&mut field.grid, &field.info).overflow;
        }
        if engine.has_push_rows() {
            overflow |= engine.unleash_push_rows(&mut field.grid).overflow;
        }
        if engine.has_displace_rows() {
            engine.unleash_displace_rows(&mut field.info);
        }
        if engine.has_level_change() {
            engine.unleash_level_change(&mut field.info);
        }
        if engine.has_drop_blocks() {
            engine.unleash_drop_blocks(&mut field.grid, &field.info);
        }
        if overflow {
            info!("Player {index} was buried");
            field.topped_out = true;
        }
    }
}

fn match_over(world: &mut World) -> bool {
    let clock = *world.resource::<MatchClock>();
    let standing = world
        .query::<&Field>()
        .iter(world)
        .filter(|field| !field.topped_out)
        .count();
    if clock.players > 1 { standing <= 1 } else { standing == 0 }
}

fn report(world: &mut World) -> MatchReport {
    let cycles = world.resource::<MatchClock>().cycle;
    let players = players(world);
    let mut query = world.query::<(&Field, &Engine)>();
    let players = players
        .into_iter()
        .filter_map(|(index, entity)| {
            let (field, engine) = query.get(world, entity).ok()?;
            let mut snapshot = Vec::new();
            engine.0.write_snapshot(&mut snapshot);
            Some(PlayerReport {
                index,
                level: field.info.level,
                lines: field.lines,
                blocks: field.grid.count_blocks(),
                topped_out: field.topped_out,
                attacks_sent: field.attacks_sent,
                attacks_received: field.attacks_received,
                displaced_rows: field.info.displaced_rows,
                snapshot,
            })
        })
        .collect();
    MatchReport { cycles, players }
}

/// Plays a whole match and reports how every player ended up.
#[must_use]
pub fn run_match(config: &VersusConfig, behavior: &BehaviorConfig) -> MatchReport {
    let mut world = World::new();
    world.insert_resource(Transport::new());
    world.insert_resource(MatchClock {
        cycle: 0,
        players: config.players,
    });
    for index in 0..config.players {
        spawn_player(&mut world, index, config, behavior);
    }
    info!(
        "Starting a {}-player match on {}x{} fields",
        config.players, config.rows, config.cols
    );

    while world.resource::<MatchClock>().cycle < config.cycles && !match_over(&mut world) {
        play_cycle_system(&mut world);
        transport_system(&mut world);
        unleash_system(&mut world);
        world.resource_mut::<MatchClock>().cycle += 1;
    }

    let report = report(&mut world);
    info!("Match finished after {} cycles", report.cycles);
    report
}
