//! Animation state machine
//!
//! `Idle -> Sailing -> Colliding -> Split`, with `start` and `reset` as the
//! only ways back. Every mutation is followed by the same hook: present the
//! new frame, then (while sailing) measure and check for a collision.

use super::collision::observe;
use super::layout::Scene;
use super::state::{AnimEvent, AnimationState, Frame, Phase};
use super::ticker::TickSchedule;
use crate::consts::MAX_CATCHUP_TICKS;
use crate::settings::Settings;

/// The ship's lifecycle plus its motion schedule
#[derive(Debug, Clone)]
pub struct Animation {
    state: AnimationState,
    /// Present only while sailing
    schedule: Option<TickSchedule>,
    step_px: f64,
    period_ms: f64,
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl Animation {
    pub fn new(settings: &Settings) -> Self {
        let settings = settings.clone().validated();
        Self::with_speed(settings.step_px, settings.period_ms)
    }

    /// `step_px` per `period_ms`; both must be positive
    pub fn with_speed(step_px: f64, period_ms: f64) -> Self {
        Self {
            state: AnimationState::new(),
            schedule: None,
            step_px,
            period_ms,
        }
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn frame(&self) -> Frame {
        self.state.frame()
    }

    pub fn step_px(&self) -> f64 {
        self.step_px
    }

    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }

    /// Whether a motion schedule is live
    pub fn is_ticking(&self) -> bool {
        self.schedule.is_some()
    }

    /// When the next tick is due, if sailing
    pub fn next_tick_ms(&self) -> Option<f64> {
        self.schedule.as_ref().map(TickSchedule::next_due_ms)
    }

    pub fn drain_events(&mut self) -> Vec<AnimEvent> {
        self.state.drain_events()
    }

    /// Set sail from the origin. Restarts the run from any phase.
    pub fn start<S: Scene + ?Sized>(&mut self, now_ms: f64, scene: &mut S) {
        self.state.rewind(Phase::Sailing);
        // Replacing the schedule drops any pending ticks from the last run
        self.schedule = Some(TickSchedule::new(now_ms, self.period_ms));
        self.state.events.push(AnimEvent::Launched);
        log::info!("Set sail: {}px every {}ms", self.step_px, self.period_ms);
        self.commit(scene);
    }

    /// Back to the dock; stops all motion
    pub fn reset<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        self.schedule = None;
        self.state.rewind(Phase::Idle);
        self.state.events.push(AnimEvent::Reset);
        log::info!("Reset to idle");
        self.commit(scene);
    }

    /// The crash animation finished playing.
    ///
    /// Only meaningful while colliding; returns whether the hull split.
    pub fn crash_finished<S: Scene + ?Sized>(&mut self, scene: &mut S) -> bool {
        if self.state.phase != Phase::Colliding {
            return false;
        }
        self.state.phase = Phase::Split;
        self.state.events.push(AnimEvent::Split);
        log::info!("Hull split at offset {}", self.state.displayed_offset());
        self.commit(scene);
        true
    }

    /// Run every tick due at `now_ms`; returns how many ran.
    ///
    /// Stops as soon as the ship leaves `Sailing`. At most
    /// `MAX_CATCHUP_TICKS` run per call; older backlog is dropped.
    pub fn advance<S: Scene + ?Sized>(&mut self, now_ms: f64, scene: &mut S) -> u32 {
        let mut ran = 0;
        while let Some(schedule) = self.schedule.as_mut() {
            if ran >= MAX_CATCHUP_TICKS {
                if schedule.next_due_ms() <= now_ms {
                    log::debug!("Dropping tick backlog at {now_ms}ms");
                    schedule.rebase(now_ms);
                }
                break;
            }
            if !schedule.take_due(now_ms) {
                break;
            }
            ran += 1;
            self.tick(scene);
        }
        ran
    }

    /// One ticker period: move, then react
    fn tick<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        if self.state.phase != Phase::Sailing {
            return;
        }
        self.state.offset += self.step_px;
        self.state.ticks += 1;
        self.commit(scene);
    }

    /// Post-mutation hook: present, measure, maybe collide
    fn commit<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        scene.present(self.state.frame());
        if observe(&mut self.state, &*scene) {
            self.schedule = None;
            log::info!(
                "Iceberg hit after {} ticks, holding at offset {}",
                self.state.ticks,
                self.state.displayed_offset()
            );
            scene.present(self.state.frame());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{TICK_PERIOD_MS, TICK_STEP_PX};
    use crate::sim::collision::Geometry;
    use crate::sim::layout::FixedLayout;
    use proptest::prelude::*;

    fn sail(animation: &mut Animation, layout: &mut FixedLayout, from_ms: f64, periods: u32) {
        for i in 1..=periods {
            animation.advance(from_ms + i as f64 * TICK_PERIOD_MS, layout);
        }
    }

    #[test]
    fn test_start_enters_sailing_at_origin() {
        let mut layout = FixedLayout::default();
        let mut animation = Animation::default();
        assert_eq!(animation.phase(), Phase::Idle);
        assert!(!animation.is_ticking());

        animation.start(0.0, &mut layout);
        assert_eq!(animation.phase(), Phase::Sailing);
        assert_eq!(animation.state().offset, 0.0);
        assert!(animation.is_ticking());
        assert_eq!(layout.frame.phase, Phase::Sailing);
        assert_eq!(animation.drain_events(), vec![AnimEvent::Launched]);
    }

    #[test]
    fn test_offset_advances_one_step_per_period() {
        let mut layout = FixedLayout::default();
        let mut animation = Animation::default();
        animation.start(0.0, &mut layout);

        assert_eq!(animation.advance(29.0, &mut layout), 0);
        assert_eq!(animation.state().offset, 0.0);

        for n in 1..=10 {
            assert_eq!(animation.advance(n as f64 * TICK_PERIOD_MS, &mut layout), 1);
            assert_eq!(animation.state().offset, n as f64 * TICK_STEP_PX);
        }
        assert_eq!(layout.frame.offset, 40.0);
    }

    #[test]
    fn test_collision_pulls_ship_back_to_contact() {
        // Contact at 450, ticks land on 448 then 452
        let mut layout = FixedLayout::new(0.0, 150.0, 600.0);
        let mut animation = Animation::default();
        animation.start(0.0, &mut layout);
        animation.drain_events();

        sail(&mut animation, &mut layout, 0.0, 200);

        assert_eq!(animation.phase(), Phase::Colliding);
        assert_eq!(animation.state().offset, 452.0);
        assert_eq!(animation.state().collision_offset, Some(450.0));
        assert_eq!(animation.frame().offset, 450.0);
        assert_eq!(layout.frame.offset, 450.0);
        assert_eq!(layout.ship_right_edge(), Some(600.0));
        assert!(!animation.is_ticking());
        assert_eq!(
            animation.drain_events(),
            vec![AnimEvent::Collided {
                offset: 450.0,
                overlap: 2.0
            }]
        );
    }

    #[test]
    fn test_collision_from_measured_edges() {
        // One 50px tick puts the hull's right edge at 120 against an iceberg at 100
        let mut layout = FixedLayout::new(0.0, 70.0, 100.0);
        let mut animation = Animation::with_speed(50.0, TICK_PERIOD_MS);
        animation.start(0.0, &mut layout);
        animation.advance(TICK_PERIOD_MS, &mut layout);

        assert_eq!(animation.phase(), Phase::Colliding);
        assert_eq!(animation.state().collision_offset, Some(30.0));
    }

    #[test]
    fn test_no_tick_after_collision() {
        let mut layout = FixedLayout::new(0.0, 150.0, 600.0);
        let mut animation = Animation::default();
        animation.start(0.0, &mut layout);
        sail(&mut animation, &mut layout, 0.0, 200);
        assert_eq!(animation.phase(), Phase::Colliding);

        let offset = animation.state().offset;
        let ticks = animation.state().ticks;
        assert_eq!(animation.advance(1_000_000.0, &mut layout), 0);
        assert_eq!(animation.state().offset, offset);
        assert_eq!(animation.state().ticks, ticks);
    }

    #[test]
    fn test_late_poll_stops_at_collision_mid_batch() {
        // Contact at 8px: second tick hits
        let mut layout = FixedLayout::new(0.0, 92.0, 100.0);
        let mut animation = Animation::default();
        animation.start(0.0, &mut layout);

        let ran = animation.advance(5.0 * TICK_PERIOD_MS, &mut layout);
        assert_eq!(ran, 2);
        assert_eq!(animation.phase(), Phase::Colliding);
        assert_eq!(animation.state().offset, 8.0);
        assert_eq!(animation.state().collision_offset, Some(8.0));
    }

    #[test]
    fn test_catch_up_is_capped() {
        let mut layout = FixedLayout::default();
        let mut animation = Animation::default();
        animation.start(0.0, &mut layout);

        let ran = animation.advance(100.0 * TICK_PERIOD_MS, &mut layout);
        assert_eq!(ran, MAX_CATCHUP_TICKS);
        assert_eq!(
            animation.state().offset,
            MAX_CATCHUP_TICKS as f64 * TICK_STEP_PX
        );
        // Backlog dropped, grid re-anchored at the poll time
        assert_eq!(animation.next_tick_ms(), Some(101.0 * TICK_PERIOD_MS));
    }

    #[test]
    fn test_crash_finished_splits_once() {
        let mut layout = FixedLayout::new(0.0, 92.0, 100.0);
        let mut animation = Animation::default();
        animation.start(0.0, &mut layout);
        sail(&mut animation, &mut layout, 0.0, 5);
        assert_eq!(animation.phase(), Phase::Colliding);
        animation.drain_events();

        assert!(animation.crash_finished(&mut layout));
        assert_eq!(animation.phase(), Phase::Split);
        assert_eq!(animation.frame().offset, 8.0);
        assert!(layout.frame.phase.shows_split_hull());

        assert!(!animation.crash_finished(&mut layout));
        assert_eq!(animation.phase(), Phase::Split);
        assert_eq!(animation.drain_events(), vec![AnimEvent::Split]);
    }

    #[test]
    fn test_crash_finished_ignored_outside_colliding() {
        let mut layout = FixedLayout::default();
        let mut animation = Animation::default();
        assert!(!animation.crash_finished(&mut layout));
        assert_eq!(animation.phase(), Phase::Idle);

        animation.start(0.0, &mut layout);
        assert!(!animation.crash_finished(&mut layout));
        assert_eq!(animation.phase(), Phase::Sailing);
    }

    #[test]
    fn test_reset_stops_motion() {
        let mut layout = FixedLayout::default();
        let mut animation = Animation::default();
        animation.start(0.0, &mut layout);
        sail(&mut animation, &mut layout, 0.0, 10);

        animation.reset(&mut layout);
        assert_eq!(animation.phase(), Phase::Idle);
        assert_eq!(animation.state().offset, 0.0);
        assert_eq!(animation.state().collision_offset, None);
        assert!(!animation.is_ticking());
        assert_eq!(animation.advance(10_000.0, &mut layout), 0);
        assert_eq!(layout.frame.offset, 0.0);
    }

    #[test]
    fn test_reset_clears_collision_offset() {
        let mut layout = FixedLayout::new(0.0, 92.0, 100.0);
        let mut animation = Animation::default();
        animation.start(0.0, &mut layout);
        sail(&mut animation, &mut layout, 0.0, 5);
        animation.crash_finished(&mut layout);

        animation.reset(&mut layout);
        assert_eq!(animation.state().collision_offset, None);
        assert_eq!(animation.frame().offset, 0.0);
    }

    #[test]
    fn test_restart_while_sailing_begins_fresh_cycle() {
        let mut layout = FixedLayout::default();
        let mut animation = Animation::default();
        animation.start(0.0, &mut layout);
        sail(&mut animation, &mut layout, 0.0, 10);
        assert_eq!(animation.state().offset, 40.0);

        // Restart between grid points of the old schedule
        animation.start(310.0, &mut layout);
        assert_eq!(animation.state().offset, 0.0);
        assert_eq!(animation.next_tick_ms(), Some(340.0));

        // Old grid point (330) no longer fires
        assert_eq!(animation.advance(330.0, &mut layout), 0);
        assert_eq!(animation.advance(340.0, &mut layout), 1);
        assert_eq!(animation.state().offset, TICK_STEP_PX);
    }

    #[test]
    fn test_restart_after_split() {
        let mut layout = FixedLayout::new(0.0, 92.0, 100.0);
        let mut animation = Animation::default();
        animation.start(0.0, &mut layout);
        sail(&mut animation, &mut layout, 0.0, 5);
        animation.crash_finished(&mut layout);

        animation.start(1000.0, &mut layout);
        assert_eq!(animation.phase(), Phase::Sailing);
        assert_eq!(animation.state().collision_offset, None);
        assert_eq!(layout.frame.offset, 0.0);
    }

    #[test]
    fn test_start_already_overlapping_collides_immediately() {
        let mut layout = FixedLayout::new(0.0, 120.0, 100.0);
        let mut animation = Animation::default();
        animation.start(0.0, &mut layout);

        assert_eq!(animation.phase(), Phase::Colliding);
        assert_eq!(animation.state().collision_offset, Some(-20.0));
        assert!(!animation.is_ticking());
    }

    #[test]
    fn test_unmeasured_layout_skips_checks_until_ready() {
        let mut layout = FixedLayout::unmeasured(0.0, 92.0, 100.0);
        let mut animation = Animation::default();
        animation.start(0.0, &mut layout);
        sail(&mut animation, &mut layout, 0.0, 5);

        // Sailed through the iceberg without measuring
        assert_eq!(animation.phase(), Phase::Sailing);
        assert_eq!(animation.state().offset, 20.0);

        layout.laid_out = true;
        animation.advance(6.0 * TICK_PERIOD_MS, &mut layout);
        assert_eq!(animation.phase(), Phase::Colliding);
        // 24 raw, 16px overlap
        assert_eq!(animation.state().collision_offset, Some(8.0));
    }

    #[test]
    fn test_new_validates_settings() {
        let settings = Settings {
            step_px: -3.0,
            period_ms: 0.0,
            ..Settings::default()
        };
        let animation = Animation::new(&settings);
        assert_eq!(animation.step_px(), TICK_STEP_PX);
        assert_eq!(animation.period_ms(), TICK_PERIOD_MS);
    }

    #[derive(Debug, Clone)]
    enum Command {
        Start,
        Reset,
        CrashFinished,
        Wait(u32),
    }

    fn command() -> impl Strategy<Value = Command> {
        prop_oneof![
            1 => Just(Command::Start),
            1 => Just(Command::Reset),
            2 => Just(Command::CrashFinished),
            6 => (1u32..4000).prop_map(Command::Wait),
        ]
    }

    fn allowed(before: Phase, command: &Command, after: Phase) -> bool {
        match command {
            Command::Start => matches!(after, Phase::Sailing | Phase::Colliding),
            Command::Reset => after == Phase::Idle,
            Command::CrashFinished => match before {
                Phase::Colliding => after == Phase::Split,
                other => after == other,
            },
            Command::Wait(_) => match before {
                Phase::Sailing => matches!(after, Phase::Sailing | Phase::Colliding),
                other => after == other,
            },
        }
    }

    proptest! {
        #[test]
        fn prop_phase_follows_lifecycle(
            commands in prop::collection::vec(command(), 1..60),
            iceberg in 50.0f64..2000.0,
        ) {
            let mut layout = FixedLayout::new(0.0, 40.0, iceberg);
            let mut animation = Animation::default();
            let mut now = 0.0;

            for command in &commands {
                let before = animation.phase();
                match command {
                    Command::Start => animation.start(now, &mut layout),
                    Command::Reset => animation.reset(&mut layout),
                    Command::CrashFinished => {
                        animation.crash_finished(&mut layout);
                    }
                    Command::Wait(ms) => {
                        now += *ms as f64;
                        animation.advance(now, &mut layout);
                    }
                }
                let after = animation.phase();
                prop_assert!(allowed(before, command, after), "{before} -{command:?}-> {after}");
                prop_assert_eq!(animation.is_ticking(), after == Phase::Sailing);
                prop_assert_eq!(animation.state().collision_offset.is_some(), matches!(after, Phase::Colliding | Phase::Split));
            }
        }

        #[test]
        fn prop_sailing_offset_is_step_per_tick(
            waits in prop::collection::vec(1u32..200, 1..80),
        ) {
            // Iceberg far enough that it is never reached
            let mut layout = FixedLayout::new(0.0, 40.0, 1.0e9);
            let mut animation = Animation::default();
            animation.start(0.0, &mut layout);
            let mut now = 0.0;
            let mut last = 0.0;

            for ms in waits {
                now += ms as f64;
                let ran = animation.advance(now, &mut layout);
                let offset = animation.state().offset;
                prop_assert!(offset >= last);
                prop_assert_eq!(offset - last, ran as f64 * TICK_STEP_PX);
                prop_assert_eq!(offset, animation.state().ticks as f64 * TICK_STEP_PX);
                prop_assert_eq!(layout.frame.offset, offset);
                last = offset;
            }
        }

        #[test]
        fn prop_collision_offset_is_contact_point(
            ship_width in 10.0f64..300.0,
            gap in 0.0f64..1500.0,
            step in 1.0f64..60.0,
        ) {
            let mut layout = FixedLayout::new(0.0, ship_width, ship_width + gap);
            let mut animation = Animation::with_speed(step, TICK_PERIOD_MS);
            animation.start(0.0, &mut layout);
            let mut now = 0.0;
            while animation.phase() == Phase::Sailing {
                now += TICK_PERIOD_MS;
                animation.advance(now, &mut layout);
            }
            prop_assert_eq!(animation.phase(), Phase::Colliding);
            let contact = animation.state().collision_offset.unwrap_or(f64::NAN);
            prop_assert!((contact - gap).abs() < 1e-6);
            prop_assert!(animation.state().offset >= contact);
            prop_assert!(animation.state().offset - contact < step);
        }
    }
}
