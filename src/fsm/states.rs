//! Concrete mode handler functions and table builder.
//!
//! Each mode is defined by three plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  IDLE ──[pad stepped / interaction request]──▶ ACTIVE
//!    ▲                                             │
//!    └──────[no pad stepped for active_hold]───────┘
//!
//!  Any mode ──[safety request]──▶ SAFETY ──[safety clear]──▶ IDLE
//! ```
//!
//! IDLE→ACTIVE and SAFETY→IDLE are event driven and arrive through
//! `Fsm::force_transition`; the update handlers only handle the idle
//! decay, the animation clock and the safety guard.

use super::context::{ActuatorRequest, LoopContext};
use super::{Mode, StateDescriptor};
use crate::drivers::actuator::ActuatorPosition;
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static mode table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; Mode::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: Mode::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Active
        StateDescriptor {
            id: Mode::Active,
            name: "Active",
            on_enter: Some(active_enter),
            on_exit: Some(active_exit),
            on_update: active_update,
        },
        // Index 2: Safety
        StateDescriptor {
            id: Mode::Safety,
            name: "Safety",
            on_enter: Some(safety_enter),
            on_exit: Some(safety_exit),
            on_update: safety_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE: ambient animation, actuator parked
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut LoopContext) {
    ctx.extend_pending = false;
    ctx.retract_held = false;
    info!("IDLE: waiting for a visitor");
}

fn idle_update(ctx: &mut LoopContext) -> Option<Mode> {
    if ctx.safety_active {
        return Some(Mode::Safety);
    }

    ctx.advance_step(ctx.config.idle_step_increment);

    // An extend that finished after Active decayed leaves the actuator out.
    if ctx.actuator == ActuatorPosition::Extended && !ctx.retract_held {
        debug!("IDLE: actuator still extended, parking");
        ctx.request = Some(ActuatorRequest::Retract);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTIVE: visitor present, actuator out, faster animation
// ═══════════════════════════════════════════════════════════════════════════

fn active_enter(ctx: &mut LoopContext) {
    ctx.last_trigger_ms = ctx.now_ms;
    ctx.retract_held = false;
    ctx.extend_pending = true;
    ctx.request = Some(ActuatorRequest::Extend);
    info!("ACTIVE: visitor interaction started");
}

fn active_exit(ctx: &mut LoopContext) {
    ctx.extend_pending = false;
    ctx.request = Some(ActuatorRequest::Retract);
    info!("ACTIVE: interaction over after {}ms", ctx.ms_in_mode());
}

fn active_update(ctx: &mut LoopContext) -> Option<Mode> {
    if ctx.safety_active {
        return Some(Mode::Safety);
    }

    ctx.advance_step(ctx.config.active_step_increment);

    // Entered while the actuator was still retracting: issue the epoch's
    // single extend once it is parked.
    if ctx.extend_pending && ctx.actuator == ActuatorPosition::Parked {
        ctx.request = Some(ActuatorRequest::Extend);
    }

    if !ctx.any_stepped && ctx.ms_since_trigger() >= u64::from(ctx.config.active_hold_ms) {
        info!(
            "ACTIVE: no pad stepped for {}ms -> idle",
            ctx.ms_since_trigger()
        );
        return Some(Mode::Idle);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  SAFETY: actuator parked, animation frozen
// ═══════════════════════════════════════════════════════════════════════════

fn safety_enter(ctx: &mut LoopContext) {
    ctx.extend_pending = false;
    ctx.retract_held = false;
    ctx.request = Some(ActuatorRequest::ForceRetract);
    warn!("SAFETY: actuator forced to park, interaction suppressed");
}

fn safety_exit(ctx: &mut LoopContext) {
    info!("SAFETY: released after {}ms", ctx.ms_in_mode());
}

fn safety_update(ctx: &mut LoopContext) -> Option<Mode> {
    // Step stays frozen.  Leave only once the latch is released.
    if !ctx.safety_active {
        return Some(Mode::Idle);
    }
    None
}
