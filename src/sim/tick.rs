//! Fixed timestep fishing tick
//!
//! Advances one rod's fishing state by a single step: deferred work first,
//! then the float (substrate, bites, loot, tension, motion), then casting.

use glam::Vec2;

use super::cast::CastCommit;
use super::catch::bite_tier;
use super::diagnostics::{DiagnosticsSink, NullDiagnostics};
use super::host::{EntityHandle, EntityHost, LootPools, SpatialQuery};
use super::line::TensionOutcome;
use super::loot::{BaitItem, HookedLoot, LootKind, LootSelector};
use super::path::{FloatMotion, PathContext};
use super::rng::RandomSource;
use super::state::{Deferred, FishingEvent, FishingPhase, FishingState, Session};
use super::substrate::Substrate;
use crate::consts::{LINE_PULLBACK_MAX_SPEED, MAX_LOOT_DRAWS_PER_BITE, MAX_LOOT_DRAWS_PER_TICK};
use crate::settings::ViewMode;

/// Side-view land pull is applied as a velocity scaled by this
const LAND_PULL_SIDE_VIEW: f32 = 90.0;
/// Top-down land pull is applied as a translation scaled by this
const LAND_PULL_TOP_DOWN: f32 = 2.0;
/// Caught loot appears this far above the float
const LOOT_SPAWN_OFFSET: Vec2 = Vec2::new(0.0, 1.0);
/// Upward bias of the throw toward the angler
const LOOT_THROW_LIFT: Vec2 = Vec2::new(0.0, 2.0);
/// Returned bait is dropped beside the angler
const BAIT_DROP_OFFSET: Vec2 = Vec2::new(0.5, 0.0);

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Reel in / pull the float toward the angler
    pub attract: bool,
    /// Charge a cast; releasing commits it
    pub cast: bool,
}

/// Services the tick consumes
pub struct Env<'a, W: ?Sized, H: ?Sized, R> {
    pub world: &'a W,
    pub bodies: &'a mut H,
    pub rng: &'a mut R,
    pub diagnostics: Option<&'a mut dyn DiagnosticsSink>,
}

impl<'a, W: ?Sized, H: ?Sized, R> Env<'a, W, H, R> {
    pub fn new(world: &'a W, bodies: &'a mut H, rng: &'a mut R) -> Self {
        Self {
            world,
            bodies,
            rng,
            diagnostics: None,
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: &'a mut dyn DiagnosticsSink) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }
}

/// Advance the fishing state by one fixed timestep
pub fn tick<W, H, R>(state: &mut FishingState, input: &TickInput, dt: f32, env: &mut Env<'_, W, H, R>)
where
    W: SpatialQuery + LootPools + ?Sized,
    H: EntityHost + ?Sized,
    R: RandomSource,
{
    state.clock += dt as f64;
    state.time_ticks += 1;

    if state.phase.is_resolved() {
        state.phase = FishingPhase::Idle;
    }

    for task in state.scheduler.poll(state.clock) {
        match task {
            Deferred::SpawnFloat(commit) => spawn_float(state, &commit, env.bodies),
            Deferred::EnableCollider(handle) => env.bodies.set_collider_enabled(handle, true),
        }
    }

    attract_float(state, input, dt, env);
    cast_float(state, input, dt);
}

/// End the current attempt as a failed catch. Cancels a pending spawn.
pub fn abort<H>(state: &mut FishingState, bodies: &mut H)
where
    H: EntityHost + ?Sized,
{
    if state.session.is_none() {
        return;
    }
    log::info!("Fishing aborted");
    end_session(state, bodies, FishingPhase::Escaped);
    state.push_event(FishingEvent::CatchFailed);
}

/// Equip `bait`, dropping the previously equipped bait's item beside the angler
pub fn equip_bait<H>(state: &mut FishingState, bait: BaitItem, bodies: &mut H) -> Option<BaitItem>
where
    H: EntityHost + ?Sized,
{
    log::info!("Equipped bait {} ({:?})", bait.name, bait.tier);
    let previous = state.bait.replace(bait);
    if let Some(prev) = &previous {
        let item = bodies.spawn(&prev.item_id, state.rod.position + BAIT_DROP_OFFSET, 0.0);
        state.push_event(FishingEvent::BaitReturned {
            item_id: prev.item_id.clone(),
            item,
        });
    }
    previous
}

fn spawn_float<H>(state: &mut FishingState, commit: &CastCommit, bodies: &mut H)
where
    H: EntityHost + ?Sized,
{
    let Some(session) = state.session.as_mut() else {
        return;
    };

    let float = bodies.spawn(&state.settings.cast.float_prefab, state.rod.line_attachment, 0.0);
    if state.settings.view_mode == ViewMode::TopDown {
        bodies.set_collider_enabled(float, false);
    }
    bodies.apply_impulse(float, commit.impulse);

    session.float = Some(float);
    session.pending_spawn = None;
    session.cast_timer = 0.0;
    state.phase = FishingPhase::AttractingNoLoot(Substrate::InAir);
    state.push_event(FishingEvent::FloatCast { float });
}

fn cast_float(state: &mut FishingState, input: &TickInput, dt: f32) {
    if state.session.is_some() || state.line.is_broken {
        return;
    }

    let Some(commit) = state.cast.step(input.cast, dt, state.cast_direction) else {
        return;
    };

    let task = state.scheduler.schedule(
        state.clock,
        state.settings.cast.spawn_delay,
        Deferred::SpawnFloat(commit),
    );
    state.session = Some(Session::new(&commit, task));
    state.phase = FishingPhase::Casting;
}

fn attract_float<W, H, R>(state: &mut FishingState, input: &TickInput, dt: f32, env: &mut Env<'_, W, H, R>)
where
    W: SpatialQuery + LootPools + ?Sized,
    H: EntityHost + ?Sized,
    R: RandomSource,
{
    let Some(float) = state.float() else {
        return;
    };
    let Some(position) = env.bodies.position(float) else {
        log::warn!("Float {:?} vanished; ending session", float);
        end_session(state, env.bodies, FishingPhase::Escaped);
        return;
    };

    let view_mode = state.settings.view_mode;
    let Some(session) = state.session.as_mut() else {
        return;
    };

    let checking = match view_mode {
        ViewMode::TopDown => {
            session.cast_timer += dt;
            session.cast_timer > session.hang_time
        }
        ViewMode::SideView => true,
    };

    let hooked = session.loot.is_some() || session.biting;
    if !hooked {
        let reading = state.classifier.classify(env.world, env.bodies, float, checking);
        session.substrate = reading.substrate;
        session.liquid_body = reading.liquid_body;
        state.phase = FishingPhase::AttractingNoLoot(reading.substrate);
    }
    let substrate = session.substrate;

    if substrate == Substrate::Water && !hooked {
        let distance = state.rod.position.distance(position);
        if state.bite.step(
            dt,
            env.rng,
            &state.settings.catch_probability,
            state.bait.as_ref(),
            distance,
        ) {
            session.biting = true;
            session.bite_draws = 0;
            state.phase = FishingPhase::BitingCheck;
            log::info!(
                "Bite at {:.2} from the angler ({:?} odds)",
                distance,
                bite_tier(state.bait.as_ref())
            );
        }
    }

    state.line.current_length = state.rod.line_attachment.distance(position);
    if state.line.current_length > state.line.max_length && substrate != Substrate::Water {
        let direction = (state.rod.position - position).normalize_or_zero();
        let speed = ((state.line.current_length - state.line.max_length) / dt)
            .clamp(-LINE_PULLBACK_MAX_SPEED, LINE_PULLBACK_MAX_SPEED);
        env.bodies.set_velocity(float, direction * speed);
    }

    let hooked = session.loot.is_some() || session.biting;
    match (input.attract, substrate, hooked) {
        (_, _, true) => attract_with_loot(state, input, dt, float, position, env),
        (true, Substrate::InAir, false) => {
            log::info!("Float pulled back mid-air");
            end_session(state, env.bodies, FishingPhase::Escaped);
        }
        (true, Substrate::Land, false) => attract_on_land(state, dt, float, position, env.bodies),
        (true, Substrate::Water, false) => {
            let ctx = path_context(state);
            let motion = FloatMotion {
                float_position: position,
                evade: false,
                attracting: true,
                speed: state.settings.return_speed_without_loot,
                dt,
            };
            let delta = step_path(state, &ctx, &motion, env);
            env.bodies.set_position(float, position + delta);
            retrieve_if_close(state, position, env.bodies);
        }
        (false, _, false) => {}
    }
}

fn attract_on_land<H>(state: &mut FishingState, dt: f32, float: EntityHandle, position: Vec2, bodies: &mut H)
where
    H: EntityHost + ?Sized,
{
    let direction = (state.attraction_point() - position).normalize_or_zero();
    let speed = state.settings.return_speed_without_loot;

    match state.settings.view_mode {
        ViewMode::SideView => {
            let pull = direction * speed * LAND_PULL_SIDE_VIEW * dt;
            let vertical = bodies.velocity(float).map_or(0.0, |v| v.y);
            bodies.set_velocity(float, Vec2::new(pull.x, vertical));
        }
        ViewMode::TopDown => {
            let pull = direction * speed * LAND_PULL_TOP_DOWN * dt;
            bodies.set_position(float, position + pull);
        }
    }

    retrieve_if_close(state, position, bodies);
}

/// Take the float back once it is within catch distance of the angler
fn retrieve_if_close<H>(state: &mut FishingState, position: Vec2, bodies: &mut H)
where
    H: EntityHost + ?Sized,
{
    if state.rod.position.distance(position) > state.settings.catch_distance {
        return;
    }
    log::info!("Float retrieved without loot");
    end_session(state, bodies, FishingPhase::Escaped);
    state.push_event(FishingEvent::FloatRetrieved);
}

fn attract_with_loot<W, H, R>(
    state: &mut FishingState,
    input: &TickInput,
    dt: f32,
    float: EntityHandle,
    position: Vec2,
    env: &mut Env<'_, W, H, R>,
) where
    W: SpatialQuery + LootPools + ?Sized,
    H: EntityHost + ?Sized,
    R: RandomSource,
{
    let loot = match state.hooked_loot() {
        Some(loot) => loot.clone(),
        None => match hook_loot(state, env) {
            Some(loot) => loot,
            None => return,
        },
    };

    let tier = loot.entry.tier;
    let angle = state.tension.rod_angle(state.rod.facing, state.rod.position, position);
    let outcome = state
        .tension
        .update(&mut state.line, input.attract, loot.weight, tier, angle, dt);

    if outcome == TensionOutcome::ForcedStop {
        force_stop(state, env.bodies);
        return;
    }

    let speed = state.reel.step(
        input.attract,
        state.line.attract_speed,
        loot.weight,
        tier,
        dt,
        env.rng,
    );
    let ctx = path_context(state);
    let motion = FloatMotion {
        float_position: position,
        evade: loot.entry.kind == LootKind::Fish,
        attracting: input.attract,
        speed,
        dt,
    };
    let delta = step_path(state, &ctx, &motion, env);
    let moved = position + delta;
    env.bodies.set_position(float, moved);

    if input.attract && state.rod.position.distance(moved) <= state.settings.catch_distance {
        let item = grab_loot(state, &loot, moved, env.bodies);
        log::info!(
            "Caught {} ({:?}, {:.2})",
            loot.entry.id,
            loot.entry.tier,
            loot.weight
        );
        end_session(state, env.bodies, FishingPhase::Caught);
        state.push_event(FishingEvent::CatchSucceeded {
            loot_id: loot.entry.id,
            tier,
            weight: loot.weight,
            item,
        });
    }
}

/// Draw loot for a pending bite, within the per-tick and per-bite budgets
fn hook_loot<W, H, R>(state: &mut FishingState, env: &mut Env<'_, W, H, R>) -> Option<HookedLoot>
where
    W: SpatialQuery + LootPools + ?Sized,
    H: EntityHost + ?Sized,
    R: RandomSource,
{
    let session = state.session.as_mut()?;
    let pool = session
        .liquid_body
        .and_then(|body| env.world.loot_pool(body))
        .filter(|pool| !pool.is_empty());

    let Some(pool) = pool else {
        log::warn!("Bite dropped: no loot in this water");
        drop_bite(state);
        return None;
    };

    let budget = MAX_LOOT_DRAWS_PER_TICK.min(MAX_LOOT_DRAWS_PER_BITE - session.bite_draws);
    let (loot, used) = LootSelector::draw_bounded(pool, state.bait.as_ref(), env.rng, budget);
    session.bite_draws += used;

    match loot {
        Some(loot) => {
            session.consumed_bait = state.bait.take();
            session.loot = Some(loot.clone());
            session.biting = false;
            state.phase = FishingPhase::AttractingWithLoot;
            log::info!(
                "Hooked {} ({:?}, {:.2}) after {} draws",
                loot.entry.id,
                loot.entry.tier,
                loot.weight,
                session.bite_draws
            );
            state.push_event(FishingEvent::LootHooked {
                loot_id: loot.entry.id.clone(),
                tier: loot.entry.tier,
                weight: loot.weight,
            });
            Some(loot)
        }
        None => {
            if session.bite_draws >= MAX_LOOT_DRAWS_PER_BITE {
                log::warn!(
                    "Bite dropped: bait gate rejected {} draws",
                    session.bite_draws
                );
                drop_bite(state);
            }
            None
        }
    }
}

/// The bite got away before anything was hooked; bait stays equipped
fn drop_bite(state: &mut FishingState) {
    if let Some(session) = state.session.as_mut() {
        session.biting = false;
        session.bite_draws = 0;
        state.phase = FishingPhase::AttractingNoLoot(session.substrate);
    }
    state.bite.reset();
}

/// Spawn the caught item and throw it toward the angler
fn grab_loot<H>(state: &mut FishingState, loot: &HookedLoot, float_position: Vec2, bodies: &mut H) -> Option<EntityHandle>
where
    H: EntityHost + ?Sized,
{
    let Some(item_id) = loot.entry.item_id.as_deref() else {
        log::error!("Loot {} has no item to spawn", loot.entry.id);
        return None;
    };

    let angler = state.rod.position;
    let direction = ((angler - float_position) + LOOT_THROW_LIFT).normalize_or_zero();
    let distance = float_position.distance(angler);

    let item = bodies.spawn(item_id, float_position + LOOT_SPAWN_OFFSET, 0.0);
    if state.settings.view_mode == ViewMode::TopDown {
        bodies.set_collider_enabled(item, false);
        state
            .scheduler
            .schedule(state.clock, distance * 0.5, Deferred::EnableCollider(item));
    }
    bodies.apply_impulse(item, direction * distance * 2.0);
    Some(item)
}

/// Sustained overload: the attempt ends without loot
fn force_stop<H>(state: &mut FishingState, bodies: &mut H)
where
    H: EntityHost + ?Sized,
{
    let broken = state.line.is_broken;
    end_session(
        state,
        bodies,
        if broken {
            FishingPhase::LineBroken
        } else {
            FishingPhase::Escaped
        },
    );
    if broken {
        state.push_event(FishingEvent::LineBroken);
    }
    state.push_event(FishingEvent::CatchFailed);
}

/// Tear down the session. Safe to call when the float is already gone.
fn end_session<H>(state: &mut FishingState, bodies: &mut H, outcome: FishingPhase)
where
    H: EntityHost + ?Sized,
{
    if let Some(session) = state.session.take() {
        if let Some(float) = session.float {
            bodies.destroy(float);
        }
        if let Some(task) = session.pending_spawn {
            state.scheduler.cancel(task);
        }
    }

    state.line.finish();
    state.path.clear();
    state.reel.reset();
    state.bite.reset();
    state.classifier.reset();
    state.cast.reset();
    state.phase = outcome;
    log::info!("Session ended: {:?}", outcome);
}

fn path_context(state: &FishingState) -> PathContext {
    PathContext {
        view_mode: state.settings.view_mode,
        anchor: state.attraction_point(),
        max_line_length: state.line.max_length,
    }
}

fn step_path<W, H, R>(state: &mut FishingState, ctx: &PathContext, motion: &FloatMotion, env: &mut Env<'_, W, H, R>) -> Vec2
where
    W: SpatialQuery + LootPools + ?Sized,
    H: EntityHost + ?Sized,
    R: RandomSource,
{
    let mut null = NullDiagnostics;
    let diagnostics: &mut dyn DiagnosticsSink = match env.diagnostics.as_deref_mut() {
        Some(sink) => sink,
        None => &mut null,
    };
    state.path.step(ctx, motion, env.world, env.rng, diagnostics)
}
