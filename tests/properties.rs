//! Property tests for collision, spawning and scoring

use byte_runner::consts::*;
use byte_runner::sim::{GameEvent, GravityMode, Rect, Spawner, TickInput, World, tick};
use proptest::prelude::*;

fn rect_strategy() -> impl Strategy<Value = Rect> {
    // Integer coordinates keep edge comparisons exact
    (-200i32..1000, -200i32..600, 1i32..200, 1i32..200)
        .prop_map(|(x, y, w, h)| Rect::new(x as f32, y as f32, w as f32, h as f32))
}

fn intervals_overlap(a0: f32, a1: f32, b0: f32, b1: f32) -> bool {
    a0 < b1 && b0 < a1
}

proptest! {
    #[test]
    fn overlap_is_symmetric(a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn overlap_matches_interval_model(a in rect_strategy(), b in rect_strategy()) {
        let expected = intervals_overlap(a.left(), a.right(), b.left(), b.right())
            && intervals_overlap(a.top(), a.bottom(), b.top(), b.bottom());
        prop_assert_eq!(a.overlaps(&b), expected);
    }

    #[test]
    fn touching_edges_never_overlap(a in rect_strategy(), w in 1i32..200, h in 1i32..200) {
        let right = Rect::new(a.right(), a.top(), w as f32, h as f32);
        let below = Rect::new(a.left(), a.bottom(), w as f32, h as f32);
        prop_assert!(!a.overlaps(&right));
        prop_assert!(!a.overlaps(&below));
    }

    #[test]
    fn spawn_intervals_stay_in_range(seed in any::<u64>(), draws in 1usize..50) {
        let mut spawner = Spawner::new(seed);
        for _ in 0..draws {
            // Jump straight to the next expiry
            let wait = spawner.timer_ms;
            prop_assert!(spawner.advance(wait).is_some());
            prop_assert!(spawner.timer_ms >= SPAWN_BASE_MS);
            prop_assert!(spawner.timer_ms < SPAWN_BASE_MS + SPAWN_JITTER_MS);
        }
    }

    #[test]
    fn obstacles_only_move_left_and_leave_for_a_reason(
        seed in any::<u64>(),
        speed in 1.0f32..40.0,
        jumps in proptest::collection::vec(any::<bool>(), 1..400),
    ) {
        let mut world = World::new_session(seed, speed);
        for jump in jumps {
            let before: Vec<(u32, f32)> =
                world.obstacles.iter().map(|o| (o.id, o.pos.x)).collect();
            let events = tick(&mut world, &TickInput { jump }, 1000.0 / 60.0, GravityMode::PerTick);
            let game_over = events.iter().any(|e| matches!(e, GameEvent::GameOver { .. }));

            for (id, x) in before {
                match world.obstacles.iter().find(|o| o.id == id) {
                    Some(obs) => prop_assert!(obs.pos.x < x),
                    None => {
                        let cleared = events.contains(&GameEvent::Cleared { id });
                        prop_assert!(cleared || game_over);
                        if cleared {
                            prop_assert!(x - speed + OBSTACLE_WIDTH <= 0.0);
                        }
                    }
                }
            }
            if game_over {
                break;
            }
        }
    }

    #[test]
    fn score_never_decreases(
        seed in any::<u64>(),
        deltas in proptest::collection::vec(-50.0f64..300.0, 1..200),
    ) {
        let mut world = World::new_session(seed, DEFAULT_SPEED);
        world.spawner.timer_ms = f64::MAX;
        let mut last = world.score;
        for dt in deltas {
            tick(&mut world, &TickInput::default(), dt, GravityMode::Scaled);
            prop_assert!(world.score >= last);
            last = world.score;
        }
    }
}
