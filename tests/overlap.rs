#![forbid(unsafe_code)]
use chrono::{DateTime, TimeZone, Utc};
use flotte::{overlaps, Window};

fn at(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, h, 0, 0).unwrap()
}

fn w(start: u32, end: u32) -> Window {
    Window::new(at(start), at(end)).unwrap()
}

#[test]
fn overlap_is_symmetric() {
    let cases = [
        (w(10, 12), w(11, 13)),
        (w(10, 12), w(12, 13)),
        (w(10, 12), w(13, 15)),
        (w(10, 18), w(11, 12)),
        (w(8, 9), w(9, 9)),
    ];
    for (a, b) in cases {
        assert_eq!(overlaps(&a, &b), overlaps(&b, &a), "{a} vs {b}");
    }
}

#[test]
fn window_overlaps_itself() {
    assert!(overlaps(&w(10, 12), &w(10, 12)));
    assert!(overlaps(&w(10, 10), &w(10, 10)));
}

#[test]
fn touching_endpoints_conflict() {
    assert!(overlaps(&w(10, 12), &w(12, 13)));
    assert!(overlaps(&w(12, 13), &w(10, 12)));
}

#[test]
fn disjoint_windows_do_not_overlap() {
    assert!(!overlaps(&w(10, 12), &w(13, 15)));
}

#[test]
fn containment_overlaps() {
    assert!(overlaps(&w(10, 18), &w(11, 12)));
    assert!(overlaps(&w(11, 12), &w(10, 18)));
}

#[test]
fn instant_window_inside_or_on_boundary() {
    assert!(overlaps(&w(10, 12), &Window::instant(at(11))));
    assert!(overlaps(&w(10, 12), &Window::instant(at(12))));
    assert!(!overlaps(&w(10, 12), &Window::instant(at(13))));
}

#[test]
fn inverted_window_is_rejected_at_construction() {
    assert!(Window::new(at(12), at(10)).is_none());
    assert!(Window::new(at(10), at(10)).is_some());
    assert_eq!(w(10, 12).duration_minutes(), 120);
}
