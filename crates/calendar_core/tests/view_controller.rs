use calendar_core::{CalendarView, ViewController, ViewRequest};
use std::time::{Duration, Instant};

const DELAY: Duration = Duration::from_millis(150);

#[test]
fn month_to_week_commits_only_after_delay() {
    let start = Instant::now();
    let mut view = ViewController::new(DELAY);
    assert_eq!(view.current(), CalendarView::Month);

    let request = view.request_view(CalendarView::Week, start);

    assert_eq!(request, ViewRequest::Scheduled { due_at: start + DELAY });
    assert!(view.is_transitioning());
    assert_eq!(view.current(), CalendarView::Month);

    assert_eq!(view.poll(start + Duration::from_millis(149)), None);
    assert!(view.is_transitioning());
    assert_eq!(view.current(), CalendarView::Month);

    assert_eq!(view.poll(start + DELAY), Some(CalendarView::Week));
    assert!(!view.is_transitioning());
    assert_eq!(view.current(), CalendarView::Week);
}

#[test]
fn requesting_current_view_is_a_no_op() {
    let now = Instant::now();
    let mut view = ViewController::new(DELAY);

    assert_eq!(
        view.request_view(CalendarView::Month, now),
        ViewRequest::Unchanged
    );
    assert!(!view.is_transitioning());
    assert_eq!(view.due_at(), None);
    assert_eq!(view.poll(now + DELAY), None);
}

#[test]
fn repeated_request_for_pending_target_keeps_original_deadline() {
    let start = Instant::now();
    let mut view = ViewController::new(DELAY);
    view.request_view(CalendarView::Day, start);

    let again = view.request_view(CalendarView::Day, start + Duration::from_millis(100));

    assert_eq!(again, ViewRequest::Unchanged);
    assert_eq!(view.due_at(), Some(start + DELAY));
}

#[test]
fn different_request_mid_transition_restarts_delay() {
    let start = Instant::now();
    let mut view = ViewController::new(DELAY);
    view.request_view(CalendarView::Week, start);

    let second_at = start + Duration::from_millis(100);
    let request = view.request_view(CalendarView::Agenda, second_at);

    assert_eq!(
        request,
        ViewRequest::Restarted {
            due_at: second_at + DELAY
        }
    );
    assert_eq!(view.target(), CalendarView::Agenda);
    assert_eq!(view.poll(start + DELAY), None);
    assert_eq!(view.current(), CalendarView::Month);
    assert_eq!(view.poll(second_at + DELAY), Some(CalendarView::Agenda));
    assert_eq!(view.current(), CalendarView::Agenda);
}

#[test]
fn view_keys_round_trip() {
    for view in CalendarView::ALL {
        assert_eq!(CalendarView::parse(view.key()), Some(view));
    }
    assert_eq!(CalendarView::parse(" Agenda "), Some(CalendarView::Agenda));
    assert_eq!(CalendarView::parse("year"), None);
}

#[test]
fn with_view_starts_stable_on_given_view() {
    let view = ViewController::with_view(CalendarView::Day, DELAY);
    assert_eq!(view.current(), CalendarView::Day);
    assert_eq!(view.target(), CalendarView::Day);
    assert!(!view.is_transitioning());
}
