mod common;

use common::{always, hover, never, SimBuilder};
use flapper_lib::model::state::Observation;
use std::sync::atomic::{AtomicBool, Ordering};
use flapper_lib::model::generation::{Termination, TickStatus};
use flapper_lib::model::state::{AgentId, DeathCause};

#[test]
fn test_first_tick_without_jump_follows_kinematic_rule() {
    let (ctl, mut run) = SimBuilder::new().with_agent(never()).build();
    ctl.tick(&mut run).unwrap();

    let agents = run.population().snapshots();
    assert_eq!(agents.len(), 1);
    // v = 0, t = 1: d = 0 * 1 + 1.5 * 1
    assert!((agents[0].y - 351.5).abs() < 1e-9);
    assert_eq!(agents[0].x, 230.0);
}

#[test]
fn test_forced_gap_obstacle_after_one_tick() {
    let (ctl, mut run) = SimBuilder::new()
        .with_agent(hover(360.0))
        .with_gap(250.0)
        .build();
    ctl.tick(&mut run).unwrap();

    let field = run.obstacles();
    let segment_height = field.segment().height;
    let obstacle = &field.obstacles()[0];
    assert_eq!(obstacle.x, 595.0);
    assert_eq!(obstacle.gap_center, 250.0);
    assert_eq!(obstacle.top, 250.0 - segment_height);
    assert_eq!(obstacle.top + segment_height, 250.0);
    assert_eq!(obstacle.bottom, 450.0);
}

#[test]
fn test_only_colliding_agent_is_culled() {
    // Pipe already over the agents' column: one agent sits in the gap, the
    // other inside the top segment.
    let (ctl, mut run) = SimBuilder::new()
        .with_agent_at(never(), 350.0)
        .with_agent_at(never(), 100.0)
        .with_obstacle_at(240.0, 250.0)
        .build();

    ctl.tick(&mut run).unwrap();

    let pop = run.population();
    assert_eq!(pop.alive_count(), 1);
    let alive = pop.snapshots();
    assert_eq!(alive[0].id, AgentId(0));
    assert!((alive[0].fitness - 0.1).abs() < 1e-9);

    let retired = pop.retired();
    assert_eq!(retired.len(), 1);
    assert_eq!(retired[0].id, AgentId(1));
    assert!((retired[0].fitness - (0.1 - 1.0)).abs() < 1e-9);
    let death = retired[0].death.unwrap();
    assert_eq!(death.cause, DeathCause::Collision);
    assert_eq!(death.tick, 1);
    assert_eq!(run.score(), 0);
}

#[test]
fn test_culled_fitness_is_frozen() {
    let (ctl, mut run) = SimBuilder::new()
        .with_agent_at(hover(360.0), 350.0)
        .with_agent_at(never(), 100.0)
        .with_obstacle_at(240.0, 250.0)
        .build();

    ctl.tick(&mut run).unwrap();
    let frozen = run.population().fitness_of(AgentId(1)).unwrap();

    for _ in 0..10 {
        ctl.tick(&mut run).unwrap();
        assert_eq!(run.population().fitness_of(AgentId(1)), Some(frozen));
        assert!(run
            .population()
            .snapshots()
            .iter()
            .all(|a| a.id != AgentId(1)));
    }
    let survivor = run.population().fitness_of(AgentId(0)).unwrap();
    assert!(survivor > frozen);
}

#[test]
fn test_pass_scores_once_and_rewards_every_survivor_once() {
    let (ctl, mut run) = SimBuilder::new()
        .with_agent(hover(360.0))
        .with_agent(hover(360.0))
        .with_obstacle_at(240.0, 250.0)
        .build();

    for _ in 0..2 {
        ctl.tick(&mut run).unwrap();
    }
    assert_eq!(run.score(), 0);
    assert_eq!(run.obstacles().len(), 1);

    // Third tick puts the pipe's left edge behind the agents.
    ctl.tick(&mut run).unwrap();
    assert_eq!(run.score(), 1);
    assert_eq!(run.obstacles().len(), 2);
    assert!(run.obstacles().obstacles()[0].passed);
    assert_eq!(run.obstacles().obstacles()[1].x, 600.0);

    for _ in 3..20 {
        assert_eq!(ctl.tick(&mut run).unwrap(), TickStatus::Running);
    }
    assert_eq!(run.score(), 1);
    for agent in run.population().snapshots() {
        assert!((agent.fitness - (20.0 * 0.1 + 5.0)).abs() < 1e-9);
    }
    assert_eq!(ctl.metrics().counter("obstacles.passed"), 1);
}

#[test]
fn test_expired_obstacles_are_removed() {
    // Replacement gaps at the very top with a tall opening keep the hovering
    // agent clear of every later pipe.
    let (ctl, mut run) = SimBuilder::new()
        .with_config(|c| {
            c.obstacles.gap_size = 600.0;
            c.obstacles.gap_center_min = 0;
            c.obstacles.gap_center_max = 1;
        })
        .with_agent(hover(360.0))
        .with_obstacle_at(240.0, 250.0)
        .build();

    // Right edge sits at 344 - 5t.
    for _ in 0..68 {
        ctl.tick(&mut run).unwrap();
    }
    assert_eq!(run.obstacles().obstacles()[0].serial, 0);
    assert_eq!(run.obstacles().obstacles()[0].x, -100.0);

    ctl.tick(&mut run).unwrap();
    assert_eq!(run.obstacles().len(), 1);
    assert_eq!(run.obstacles().obstacles()[0].serial, 1);
    assert_eq!(run.score(), 1);
}

#[test]
fn test_free_fall_population_goes_extinct_on_ground() {
    let (ctl, run) = SimBuilder::new().with_agents(5, never).build();
    let outcome = ctl.run_to_end(run, |_| false).unwrap();

    assert_eq!(outcome.termination, Termination::Extinct);
    assert!(outcome.ticks < 100);
    assert_eq!(outcome.results.len(), 5);
    for result in &outcome.results {
        assert_eq!(result.death.unwrap().cause, DeathCause::Ground);
    }
}

#[test]
fn test_constant_jumping_hits_ceiling() {
    let (ctl, run) = SimBuilder::new().with_agents(3, always).build();
    let outcome = ctl.run_to_end(run, |_| false).unwrap();

    assert_eq!(outcome.termination, Termination::Extinct);
    for result in &outcome.results {
        assert_eq!(result.death.unwrap().cause, DeathCause::Ceiling);
    }
    // 350 / 11 per tick
    assert_eq!(outcome.ticks, 32);
}

#[test]
fn test_non_finite_action_aborts_generation() {
    let (ctl, mut run) = SimBuilder::new()
        .with_agent(Box::new(|_: &Observation| f64::NAN))
        .build();
    assert!(ctl.tick(&mut run).is_err());
}

#[test]
fn test_failed_tick_leaves_generation_aborted() {
    // Fails on its first call only, so a run that kept going would tick on.
    let failed = AtomicBool::new(false);
    let flaky = move |_: &Observation| {
        if failed.swap(true, Ordering::SeqCst) {
            0.0
        } else {
            f64::NAN
        }
    };
    let (ctl, mut run) = SimBuilder::new()
        .with_agent(never())
        .with_agent(Box::new(flaky))
        .build();

    assert!(ctl.tick(&mut run).is_err());
    assert_eq!(run.finished(), Some(Termination::Aborted));

    assert_eq!(
        ctl.tick(&mut run).unwrap(),
        TickStatus::Finished(Termination::Aborted)
    );
    assert_eq!(run.tick(), 1);

    run.cancel();
    let outcome = ctl.run_to_end(run, |_| false).unwrap();
    assert_eq!(outcome.termination, Termination::Aborted);
    assert!(outcome.is_aborted());
    assert_eq!(outcome.ticks, 1);
    assert!(outcome.into_best().is_none());
}

#[test]
fn test_adjacent_deaths_keep_neighbours_intact() {
    let (ctl, mut run) = SimBuilder::new()
        .with_agent_at(never(), 350.0)
        .with_agent_at(never(), 100.0)
        .with_agent_at(never(), 150.0)
        .with_agent_at(never(), 350.0)
        .with_obstacle_at(240.0, 250.0)
        .build();

    let status = ctl.tick(&mut run).unwrap();
    assert_eq!(status, TickStatus::Running);

    let pop = run.population();
    let alive: Vec<(AgentId, f64)> = pop.snapshots().iter().map(|a| (a.id, a.fitness)).collect();
    assert_eq!(alive, vec![(AgentId(0), 0.1), (AgentId(3), 0.1)]);

    let retired: Vec<(AgentId, f64)> = pop.retired().iter().map(|r| (r.id, r.fitness)).collect();
    assert_eq!(retired.len(), 2);
    assert!(retired.contains(&(AgentId(1), 0.1 - 1.0)));
    assert!(retired.contains(&(AgentId(2), 0.1 - 1.0)));
    assert!(pop
        .retired()
        .iter()
        .all(|r| r.death.map(|d| d.cause) == Some(DeathCause::Collision)));
}

#[test]
fn test_results_carry_policies_back_in_id_order() {
    let (ctl, run) = SimBuilder::new()
        .with_agent_at(never(), 350.0)
        .with_agent_at(never(), 100.0)
        .with_agent_at(never(), 200.0)
        .with_obstacle_at(240.0, 250.0)
        .build();
    let outcome = ctl.run_to_end(run, |_| false).unwrap();

    let ids: Vec<AgentId> = outcome.results.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![AgentId(0), AgentId(1), AgentId(2)]);
    assert_eq!(outcome.results[1].death.unwrap().tick, 1);
}
