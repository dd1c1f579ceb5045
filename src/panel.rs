//! Slide-up panel: tab selection, drag gestures and the open/close animation.
//!
//! The panel position is an offset in abstract units: `0` is fully open and `extent` is
//! fully closed. Callers feed it drag deltas and timestamps in milliseconds and call
//! [`PanelController::tick`] from their frame loop.

pub const DISPLACEMENT_THRESHOLD: f64 = 150.0;
/// Units per millisecond.
pub const VELOCITY_THRESHOLD: f64 = 0.5;
pub const CLOSE_DURATION_MS: f64 = 250.0;

const SPRING_STIFFNESS: f64 = 180.0;
const SPRING_DAMPING: f64 = 24.0;
const SPRING_REST_DISTANCE: f64 = 0.5;
const SPRING_REST_SPEED: f64 = 5.0;
const SPRING_STEP_MS: f64 = 4.0;
/// A drag that sat still this long before release has no flick velocity.
const VELOCITY_STALE_MS: f64 = 100.0;
const EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Album,
    Roster,
    Stats,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Album, Tab::Roster, Tab::Stats];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Album => "Album",
            Tab::Roster => "Roster",
            Tab::Stats => "Stats",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPhase {
    Closed,
    Opening,
    Open,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Idle,
    Dragging,
    Settling,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Animation {
    /// Velocity in units per second.
    Spring {
        target: f64,
        velocity: f64,
        last_ms: f64,
    },
    Timed {
        from: f64,
        to: f64,
        start_ms: f64,
        duration_ms: f64,
    },
}

impl Animation {
    fn target(&self) -> f64 {
        match self {
            Animation::Spring { target, .. } => *target,
            Animation::Timed { to, .. } => *to,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    start_offset: f64,
    last_offset: f64,
    last_ms: f64,
    /// Units per millisecond, positive when moving toward closed.
    velocity: f64,
    was_open: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelController {
    extent: f64,
    offset: f64,
    animation: Option<Animation>,
    drag: Option<DragState>,
    active_tab: Option<Tab>,
}

impl PanelController {
    pub fn new(extent: f64) -> Self {
        let extent = extent.max(1.0);
        Self {
            extent,
            offset: extent,
            animation: None,
            drag: None,
            active_tab: None,
        }
    }

    pub fn extent(&self) -> f64 {
        self.extent
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn active_tab(&self) -> Option<Tab> {
        self.active_tab
    }

    /// 0.0 when closed, 1.0 when fully open.
    pub fn open_fraction(&self) -> f64 {
        (1.0 - self.offset / self.extent).clamp(0.0, 1.0)
    }

    pub fn phase(&self) -> PanelPhase {
        if let Some(drag) = &self.drag {
            return if self.offset < drag.start_offset - EPS {
                PanelPhase::Opening
            } else if self.offset > drag.start_offset + EPS {
                PanelPhase::Closing
            } else if drag.was_open {
                PanelPhase::Open
            } else {
                PanelPhase::Closed
            };
        }
        if let Some(anim) = &self.animation {
            return if anim.target() <= EPS {
                PanelPhase::Opening
            } else {
                PanelPhase::Closing
            };
        }
        if self.offset <= EPS {
            PanelPhase::Open
        } else {
            PanelPhase::Closed
        }
    }

    pub fn gesture(&self) -> Gesture {
        if self.drag.is_some() {
            Gesture::Dragging
        } else if self.animation.is_some() {
            Gesture::Settling
        } else {
            Gesture::Idle
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.offset < self.extent - EPS || self.drag.is_some() || self.animation.is_some()
    }

    /// Toggle behaviour of the navigation bar.
    pub fn select_tab(&mut self, tab: Tab, now_ms: f64) {
        self.drag = None;
        match self.phase() {
            PanelPhase::Closed | PanelPhase::Closing => {
                self.active_tab = Some(tab);
                self.open(now_ms, 0.0);
            }
            PanelPhase::Open | PanelPhase::Opening => {
                if self.active_tab == Some(tab) {
                    self.close(now_ms);
                } else {
                    self.active_tab = Some(tab);
                }
            }
        }
    }

    /// Spring toward fully open. `velocity` is the flick speed in units/ms.
    pub fn open(&mut self, now_ms: f64, velocity: f64) {
        if self.active_tab.is_none() {
            self.active_tab = Some(Tab::Roster);
        }
        self.animation = Some(Animation::Spring {
            target: 0.0,
            velocity: velocity * 1000.0,
            last_ms: now_ms,
        });
    }

    pub fn close(&mut self, now_ms: f64) {
        self.animation = Some(Animation::Timed {
            from: self.offset,
            to: self.extent,
            start_ms: now_ms,
            duration_ms: CLOSE_DURATION_MS,
        });
    }

    /// Jump straight to fully open without animating.
    pub fn snap_open(&mut self, tab: Tab) {
        self.drag = None;
        self.animation = None;
        self.offset = 0.0;
        self.active_tab = Some(tab);
    }

    pub fn drag_start(&mut self, now_ms: f64) {
        let was_open = match self.animation {
            Some(anim) => anim.target() <= EPS,
            None => self.offset <= EPS,
        };
        self.animation = None;
        self.drag = Some(DragState {
            start_offset: self.offset,
            last_offset: self.offset,
            last_ms: now_ms,
            velocity: 0.0,
            was_open,
        });
    }

    /// Move the panel by `dy` units (positive is downward, toward closed).
    pub fn drag_move(&mut self, dy: f64, now_ms: f64) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let next = (self.offset + dy).clamp(0.0, self.extent);
        let dt = (now_ms - drag.last_ms).max(1.0);
        drag.velocity = (next - drag.last_offset) / dt;
        drag.last_offset = next;
        drag.last_ms = now_ms;
        self.offset = next;
    }

    /// Commit the drag to open or closed and start the settling animation.
    pub fn drag_end(&mut self, now_ms: f64) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        let velocity = if now_ms - drag.last_ms > VELOCITY_STALE_MS {
            0.0
        } else {
            drag.velocity
        };
        let moved_up = drag.start_offset - self.offset;

        let open = if velocity < -VELOCITY_THRESHOLD {
            true
        } else if velocity > VELOCITY_THRESHOLD {
            false
        } else if moved_up > DISPLACEMENT_THRESHOLD {
            true
        } else if -moved_up > DISPLACEMENT_THRESHOLD {
            false
        } else {
            drag.was_open
        };

        if open {
            self.open(now_ms, velocity);
        } else {
            self.close(now_ms);
        }
    }

    pub fn resize(&mut self, extent: f64) {
        let extent = extent.max(1.0);
        let scale = extent / self.extent;
        self.offset *= scale;
        match self.animation.as_mut() {
            Some(Animation::Timed { from, to, .. }) => {
                *from *= scale;
                *to *= scale;
            }
            Some(Animation::Spring { target, .. }) => *target *= scale,
            None => {}
        }
        if let Some(drag) = self.drag.as_mut() {
            drag.start_offset *= scale;
            drag.last_offset *= scale;
        }
        self.extent = extent;
    }

    /// Advance the running animation to `now_ms`.
    pub fn tick(&mut self, now_ms: f64) {
        let Some(anim) = self.animation else {
            return;
        };
        match anim {
            Animation::Timed {
                from,
                to,
                start_ms,
                duration_ms,
            } => {
                let t = ((now_ms - start_ms) / duration_ms).clamp(0.0, 1.0);
                self.offset = from + (to - from) * ease_out_cubic(t);
                if t >= 1.0 {
                    self.offset = to;
                    self.finish();
                }
            }
            Animation::Spring {
                target,
                mut velocity,
                mut last_ms,
            } => {
                let mut x = self.offset;
                while last_ms < now_ms {
                    let step_ms = (now_ms - last_ms).min(SPRING_STEP_MS);
                    let dt = step_ms / 1000.0;
                    let accel = -SPRING_STIFFNESS * (x - target) - SPRING_DAMPING * velocity;
                    velocity += accel * dt;
                    x += velocity * dt;
                    if x < 0.0 || x > self.extent {
                        x = x.clamp(0.0, self.extent);
                        velocity = 0.0;
                    }
                    last_ms += step_ms;
                }
                self.offset = x;
                if (x - target).abs() < SPRING_REST_DISTANCE && velocity.abs() < SPRING_REST_SPEED {
                    self.offset = target;
                    self.finish();
                } else {
                    self.animation = Some(Animation::Spring {
                        target,
                        velocity,
                        last_ms,
                    });
                }
            }
        }
    }

    fn finish(&mut self) {
        self.animation = None;
        if self.offset >= self.extent - EPS {
            self.active_tab = None;
        }
    }
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(panel: &mut PanelController, from_ms: f64) -> f64 {
        let mut now = from_ms;
        while panel.is_animating() && now < from_ms + 5_000.0 {
            now += 16.0;
            panel.tick(now);
        }
        now
    }

    #[test]
    fn starts_closed_and_idle() {
        let panel = PanelController::new(400.0);
        assert_eq!(panel.phase(), PanelPhase::Closed);
        assert_eq!(panel.gesture(), Gesture::Idle);
        assert_eq!(panel.active_tab(), None);
        assert!(!panel.is_visible());
    }

    #[test]
    fn tab_press_opens_with_spring() {
        let mut panel = PanelController::new(400.0);
        panel.select_tab(Tab::Stats, 0.0);
        assert_eq!(panel.phase(), PanelPhase::Opening);
        assert_eq!(panel.gesture(), Gesture::Settling);
        settle(&mut panel, 0.0);
        assert_eq!(panel.phase(), PanelPhase::Open);
        assert_eq!(panel.offset(), 0.0);
        assert_eq!(panel.active_tab(), Some(Tab::Stats));
    }

    #[test]
    fn same_tab_closes_other_tab_switches() {
        let mut panel = PanelController::new(400.0);
        panel.snap_open(Tab::Roster);
        panel.select_tab(Tab::Album, 0.0);
        assert_eq!(panel.phase(), PanelPhase::Open);
        assert_eq!(panel.active_tab(), Some(Tab::Album));

        panel.select_tab(Tab::Album, 0.0);
        assert_eq!(panel.phase(), PanelPhase::Closing);
        // Content stays until the slide finishes.
        assert_eq!(panel.active_tab(), Some(Tab::Album));
        panel.tick(CLOSE_DURATION_MS);
        assert_eq!(panel.phase(), PanelPhase::Closed);
        assert_eq!(panel.active_tab(), None);
    }

    #[test]
    fn close_is_timed() {
        let mut panel = PanelController::new(400.0);
        panel.snap_open(Tab::Stats);
        panel.close(1_000.0);
        panel.tick(1_125.0);
        let mid = panel.offset();
        assert!(mid > 200.0 && mid < 400.0, "ease-out is past halfway at t=0.5: {mid}");
        panel.tick(1_249.0);
        assert_eq!(panel.phase(), PanelPhase::Closing);
        panel.tick(1_250.0);
        assert_eq!(panel.phase(), PanelPhase::Closed);
        assert_eq!(panel.offset(), 400.0);
    }

    #[test]
    fn long_slow_drag_up_opens() {
        let mut panel = PanelController::new(400.0);
        panel.drag_start(0.0);
        assert_eq!(panel.gesture(), Gesture::Dragging);
        let mut now = 0.0;
        for _ in 0..16 {
            now += 50.0;
            panel.drag_move(-10.0, now);
        }
        assert_eq!(panel.phase(), PanelPhase::Opening);
        assert_eq!(panel.offset(), 240.0);
        panel.drag_end(now);
        settle(&mut panel, now);
        assert_eq!(panel.phase(), PanelPhase::Open);
        assert_eq!(panel.active_tab(), Some(Tab::Roster));
    }

    #[test]
    fn short_fast_flick_opens() {
        let mut panel = PanelController::new(400.0);
        panel.drag_start(0.0);
        panel.drag_move(-40.0, 20.0);
        panel.drag_end(25.0);
        assert_eq!(panel.phase(), PanelPhase::Opening);
        settle(&mut panel, 25.0);
        assert_eq!(panel.phase(), PanelPhase::Open);
    }

    #[test]
    fn small_slow_drag_snaps_back() {
        let mut panel = PanelController::new(400.0);
        panel.snap_open(Tab::Stats);
        panel.drag_start(0.0);
        panel.drag_move(30.0, 200.0);
        panel.drag_move(30.0, 400.0);
        panel.drag_end(420.0);
        settle(&mut panel, 420.0);
        assert_eq!(panel.phase(), PanelPhase::Open);
        assert_eq!(panel.active_tab(), Some(Tab::Stats));
    }

    #[test]
    fn slow_first_move_after_press_falls_back() {
        let mut panel = PanelController::new(400.0);
        // Pressed at 0, first row of movement a second later.
        panel.drag_start(0.0);
        panel.drag_move(-16.0, 1_000.0);
        panel.drag_end(1_060.0);
        assert_eq!(panel.phase(), PanelPhase::Closing);
        settle(&mut panel, 1_060.0);
        assert_eq!(panel.phase(), PanelPhase::Closed);
    }

    #[test]
    fn velocity_exactly_at_threshold_is_not_a_flick() {
        let mut panel = PanelController::new(400.0);
        panel.snap_open(Tab::Album);
        panel.drag_start(0.0);
        panel.drag_move(50.0, 100.0);
        panel.drag_end(100.0);
        settle(&mut panel, 100.0);
        assert_eq!(panel.phase(), PanelPhase::Open);
        assert_eq!(panel.active_tab(), Some(Tab::Album));
    }

    #[test]
    fn held_still_before_release_ignores_velocity() {
        let mut panel = PanelController::new(400.0);
        panel.snap_open(Tab::Stats);
        panel.drag_start(0.0);
        panel.drag_move(60.0, 10.0);
        panel.drag_end(500.0);
        settle(&mut panel, 500.0);
        assert_eq!(panel.phase(), PanelPhase::Open);
    }

    #[test]
    fn drag_down_past_threshold_closes() {
        let mut panel = PanelController::new(400.0);
        panel.snap_open(Tab::Roster);
        panel.drag_start(0.0);
        panel.drag_move(200.0, 1_000.0);
        assert_eq!(panel.phase(), PanelPhase::Closing);
        panel.drag_end(1_010.0);
        panel.tick(1_010.0 + CLOSE_DURATION_MS);
        assert_eq!(panel.phase(), PanelPhase::Closed);
        assert_eq!(panel.active_tab(), None);
    }

    #[test]
    fn drag_is_clamped_to_extent() {
        let mut panel = PanelController::new(100.0);
        panel.drag_start(0.0);
        panel.drag_move(50.0, 10.0);
        assert_eq!(panel.offset(), 100.0);
        panel.drag_move(-500.0, 20.0);
        assert_eq!(panel.offset(), 0.0);
    }

    #[test]
    fn new_animation_supersedes_running_one() {
        let mut panel = PanelController::new(400.0);
        panel.select_tab(Tab::Roster, 0.0);
        panel.tick(50.0);
        panel.select_tab(Tab::Roster, 50.0);
        assert_eq!(panel.phase(), PanelPhase::Closing);
        panel.tick(50.0 + CLOSE_DURATION_MS);
        assert_eq!(panel.phase(), PanelPhase::Closed);
    }

    #[test]
    fn resize_keeps_fraction() {
        let mut panel = PanelController::new(400.0);
        panel.drag_start(0.0);
        panel.drag_move(-100.0, 10.0);
        panel.resize(200.0);
        assert_eq!(panel.offset(), 150.0);
        assert!((panel.open_fraction() - 0.25).abs() < 1e-12);
    }
}
