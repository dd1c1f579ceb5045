use lineup_terminal::panel::{Gesture, PanelController, PanelPhase, Tab};

/// Terminal rows are 16 panel units in the TUI.
const ROW: f64 = 16.0;

fn run_until_idle(panel: &mut PanelController, mut now: f64) -> f64 {
    let deadline = now + 3_000.0;
    while panel.is_animating() && now < deadline {
        now += 16.0;
        panel.tick(now);
    }
    now
}

#[test]
fn row_by_row_drag_past_threshold_opens() {
    let mut panel = PanelController::new(24.0 * ROW);
    panel.drag_start(0.0);
    let mut now = 0.0;
    // Ten rows upward, slowly.
    for _ in 0..10 {
        now += 120.0;
        panel.drag_move(-ROW, now);
    }
    panel.drag_end(now + 200.0);
    let settled = run_until_idle(&mut panel, now + 200.0);
    assert_eq!(panel.phase(), PanelPhase::Open);
    assert_eq!(panel.gesture(), Gesture::Idle);
    assert!(settled - now < 2_000.0, "spring should settle quickly");
}

#[test]
fn short_drag_from_closed_falls_back() {
    let mut panel = PanelController::new(24.0 * ROW);
    panel.drag_start(0.0);
    panel.drag_move(-3.0 * ROW, 300.0);
    panel.drag_end(320.0);
    assert_eq!(panel.phase(), PanelPhase::Closing);
    run_until_idle(&mut panel, 320.0);
    assert_eq!(panel.phase(), PanelPhase::Closed);
    assert!(!panel.is_visible());
}

#[test]
fn flick_down_closes_and_clears_tab() {
    let mut panel = PanelController::new(24.0 * ROW);
    panel.snap_open(Tab::Album);
    panel.drag_start(1_000.0);
    panel.drag_move(2.0 * ROW, 1_020.0);
    panel.drag_end(1_030.0);
    assert_eq!(panel.phase(), PanelPhase::Closing);
    assert_eq!(panel.active_tab(), Some(Tab::Album));
    run_until_idle(&mut panel, 1_030.0);
    assert_eq!(panel.phase(), PanelPhase::Closed);
    assert_eq!(panel.active_tab(), None);
}

#[test]
fn nav_bar_toggle_sequence() {
    let mut panel = PanelController::new(300.0);
    panel.select_tab(Tab::Roster, 0.0);
    let now = run_until_idle(&mut panel, 0.0);
    assert_eq!(panel.phase(), PanelPhase::Open);

    panel.select_tab(Tab::Stats, now);
    assert_eq!(panel.phase(), PanelPhase::Open);
    assert_eq!(panel.active_tab(), Some(Tab::Stats));

    panel.select_tab(Tab::Stats, now);
    // Reopening mid-close switches straight back to opening.
    panel.tick(now + 100.0);
    panel.select_tab(Tab::Album, now + 100.0);
    assert_eq!(panel.phase(), PanelPhase::Opening);
    assert_eq!(panel.active_tab(), Some(Tab::Album));
    run_until_idle(&mut panel, now + 100.0);
    assert_eq!(panel.phase(), PanelPhase::Open);
}
