use broadside::{Coord, Game, Phase, ShotOutcome, GRID_SIZE};
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A playing game with randomly placed fleets and a random number of
/// already-fired salvos.
fn random_game(seed: u64) -> Game {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut game = Game::new();
    game.randomize_placement(&mut rng).unwrap();
    game.start().unwrap();
    let salvos = rng.random_range(0..10usize);
    for _ in 0..salvos {
        if game.settings().game_ending {
            break;
        }
        let coord = random_coord(&mut rng);
        game.shoot(coord).unwrap();
    }
    game
}

fn random_coord(rng: &mut SmallRng) -> Coord {
    let col = rng.random_range(0..GRID_SIZE);
    let row = rng.random_range(0..GRID_SIZE);
    Coord::new(col, row).unwrap()
}

fn sunk_matches_hit_set(game: &Game) -> bool {
    game.grids().all(|grid| {
        grid.ships().iter().all(|ship| {
            let all_hit = ship
                .positions()
                .iter()
                .all(|p| grid.hit_positions().contains(p));
            ship.is_sunk() == all_hit
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn placement_attempts_cap_respected(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut game = Game::new();
        let failures = game.randomize_placement(&mut rng).unwrap();
        // two ships on a 5x5 grid always fit within the default cap
        prop_assert!(failures.is_empty());
        prop_assert!(game.placement_ready());
    }

    #[test]
    fn shoot_then_undo_is_identity(seed in any::<u64>()) {
        let mut game = random_game(seed);
        if game.settings().game_ending || game.phase() != Phase::Playing {
            return Ok(());
        }
        let mut rng = SmallRng::seed_from_u64(seed ^ 0x5eed);
        let coord = random_coord(&mut rng);

        let scores: Vec<u32> = game.teams().iter().map(|t| t.score).collect();
        let cells: Vec<_> = game.grids().map(|g| g.cells().clone()).collect();
        let hits: Vec<_> = game.grids().map(|g| g.hit_positions().to_vec()).collect();
        let history_len = game.history().len();

        game.shoot(coord).unwrap();
        game.undo_last_shot().unwrap();

        let scores_after: Vec<u32> = game.teams().iter().map(|t| t.score).collect();
        prop_assert_eq!(scores_after, scores);
        let cells_after: Vec<_> = game.grids().map(|g| g.cells().clone()).collect();
        prop_assert_eq!(cells_after, cells);
        let hits_after: Vec<_> = game.grids().map(|g| g.hit_positions().to_vec()).collect();
        prop_assert_eq!(hits_after, hits);
        prop_assert_eq!(game.history().len(), history_len);
    }

    #[test]
    fn second_salvo_at_a_coordinate_is_free(seed in any::<u64>()) {
        let mut game = random_game(seed);
        if game.settings().game_ending || game.phase() != Phase::Playing {
            return Ok(());
        }
        let mut rng = SmallRng::seed_from_u64(seed ^ 0xf00d);
        let coord = random_coord(&mut rng);
        game.shoot(coord).unwrap();
        if game.settings().game_ending {
            return Ok(());
        }
        let cells: Vec<_> = game.grids().map(|g| g.cells().clone()).collect();
        let report = game.shoot(coord).unwrap();
        prop_assert_eq!(report.total_points, 0);
        for shot in &report.results {
            prop_assert_eq!(shot.outcome, ShotOutcome::Already);
        }
        let cells_after: Vec<_> = game.grids().map(|g| g.cells().clone()).collect();
        prop_assert_eq!(cells_after, cells);
    }

    #[test]
    fn sunk_flag_always_mirrors_the_hit_set(seed in any::<u64>()) {
        let mut game = random_game(seed);
        prop_assert!(sunk_matches_hit_set(&game));
        if game.phase() == Phase::Playing && !game.settings().game_ending {
            let mut rng = SmallRng::seed_from_u64(seed ^ 0xdead);
            game.shoot(random_coord(&mut rng)).unwrap();
            prop_assert!(sunk_matches_hit_set(&game));
        }
        while game.undo_last_shot().is_some() {
            prop_assert!(sunk_matches_hit_set(&game));
        }
    }

    #[test]
    fn scores_never_go_negative_through_legal_undo(seed in any::<u64>()) {
        let mut game = random_game(seed);
        while game.undo_last_shot().is_some() {}
        for team in game.teams() {
            prop_assert_eq!(team.score, 0);
        }
    }

    #[test]
    fn snapshot_roundtrip_preserves_the_game(seed in any::<u64>()) {
        let game = random_game(seed);
        let snapshot = game.snapshot();
        let restored = Game::from_snapshot(snapshot.clone());
        prop_assert_eq!(restored.snapshot(), snapshot);
    }
}
