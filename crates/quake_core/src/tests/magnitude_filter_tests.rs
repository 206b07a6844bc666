use super::*;

use shared::domain::EventId;

fn event(id: &str, magnitude: Option<f64>) -> SeismicEvent {
    SeismicEvent {
        id: EventId::from(id),
        place: format!("place {id}"),
        magnitude,
        occurred_at_ms: 1_700_000_000_000,
        longitude: 10.0,
        latitude: 20.0,
        depth_km: None,
        detail_url: String::new(),
    }
}

fn threshold(value: f64) -> MagnitudeThreshold {
    MagnitudeThreshold::new(value).expect("threshold")
}

fn ids(events: &[SeismicEvent]) -> Vec<&str> {
    events.iter().map(|event| event.id.as_str()).collect()
}

fn sample() -> Vec<SeismicEvent> {
    vec![
        event("c", Some(2.0)),
        event("a", Some(5.5)),
        event("none", None),
        event("b", Some(2.0)),
        event("d", Some(7.1)),
    ]
}

#[test]
fn sorts_strongest_first_with_missing_as_zero() {
    let derived = derive(&sample(), MagnitudeThreshold::default());
    assert_eq!(ids(&derived), vec!["d", "a", "b", "c", "none"]);
}

#[test]
fn drops_events_below_threshold() {
    let derived = derive(&sample(), threshold(2.0));
    assert_eq!(ids(&derived), vec!["d", "a", "b", "c"]);

    let derived = derive(&sample(), threshold(5.5));
    assert_eq!(ids(&derived), vec!["d", "a"]);
}

#[test]
fn ties_do_not_depend_on_input_order() {
    let mut reversed = sample();
    reversed.reverse();
    assert_eq!(
        derive(&sample(), MagnitudeThreshold::default()),
        derive(&reversed, MagnitudeThreshold::default())
    );
}

#[test]
fn rederiving_with_same_inputs_is_idempotent() {
    let entities = sample();
    let first = derive(&entities, threshold(1.5));
    let second = derive(&entities, threshold(1.5));
    assert_eq!(first, second);
}

#[test]
fn raising_threshold_never_grows_the_list() {
    let entities = sample();
    let mut previous = usize::MAX;
    for step in 0..=80 {
        let len = derive(&entities, threshold(f64::from(step) / 10.0)).len();
        assert!(len <= previous, "threshold {step} grew the list");
        previous = len;
    }
    assert_eq!(previous, 0);
}

#[test]
fn does_not_mutate_source_order() {
    let entities = sample();
    let _ = derive(&entities, MagnitudeThreshold::default());
    assert_eq!(ids(&entities), vec!["c", "a", "none", "b", "d"]);
}
