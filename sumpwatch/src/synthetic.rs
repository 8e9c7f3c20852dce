//! Synthetic pump activity.
//!
//! Generates a plausible stream of on/off events for driving the monitor
//! without hardware. The timing follows how a sump pump actually behaves:
//! once it shuts off, the pit takes a while to refill, so the next start
//! is at least [`MIN_OFF_DWELL`] away; once running, it empties the pit
//! within a few minutes.
//!
//! Each cycle tries to emit an ON event and then an OFF event. Either
//! candidate can be dropped at random, modelling a missed reading. A
//! dropped candidate doesn't advance the clock or the sequence id.
//!
//! ```text
//!            accept ON (p = 0.8)               accept OFF (p = 0.2)
//!  clock += 45 min + [0, 100) min      clock += [0, 10) min
//! ```

use rand::Rng;
use time::{Duration, OffsetDateTime};

use crate::types::{Event, PumpState};

/// Minimum time between the pump stopping and starting again.
pub const MIN_OFF_DWELL: Duration = Duration::minutes(45);

/// Upper bound (exclusive) of the random wait added to [`MIN_OFF_DWELL`].
pub const MAX_EXTRA_OFF_DWELL: Duration = Duration::minutes(100);

/// Upper bound (exclusive) of how long the pump runs.
pub const MAX_ON_DWELL: Duration = Duration::minutes(10);

/// Chance an ON candidate is kept.
pub const ON_ACCEPT_PROBABILITY: f64 = 0.8;

/// Chance an OFF candidate is kept.
pub const OFF_ACCEPT_PROBABILITY: f64 = 0.2;

/// Largest stream the command-line tools will ask for.
pub const MAX_EVENTS: usize = 1_000_000;

/// Uniform delay in `[0, max)` at one-second resolution.
fn random_delay<R: Rng + ?Sized>(rng: &mut R, max: Duration) -> Duration {
    Duration::seconds(rng.gen_range(0..max.whole_seconds()))
}

/// Generate exactly `length` events starting from `start`.
///
/// Timestamps are non-decreasing and sequence ids run `1..=length`.
/// Determinism comes only from the caller's `rng`; seed it for
/// reproducible streams.
pub fn generate_with<R: Rng + ?Sized>(
    rng: &mut R,
    start: OffsetDateTime,
    length: usize,
) -> Vec<Event> {
    // A cycle can append two events, so the last one may overshoot.
    let mut events = Vec::with_capacity(length.min(MAX_EVENTS).saturating_add(1));
    let mut clock = start;
    let mut next_id = 1;

    while events.len() < length {
        if rng.gen_bool(ON_ACCEPT_PROBABILITY) {
            clock += MIN_OFF_DWELL + random_delay(rng, MAX_EXTRA_OFF_DWELL);
            events.push(Event {
                timestamp: clock,
                sequence_id: next_id,
                state: PumpState::On,
            });
            next_id += 1;
        }

        if rng.gen_bool(OFF_ACCEPT_PROBABILITY) {
            clock += random_delay(rng, MAX_ON_DWELL);
            events.push(Event {
                timestamp: clock,
                sequence_id: next_id,
                state: PumpState::Off,
            });
            next_id += 1;
        }
    }

    events.truncate(length);
    events
}

/// Generate `length` events starting now, with a fresh thread-local RNG.
pub fn generate(length: usize) -> Vec<Event> {
    generate_with(&mut rand::thread_rng(), OffsetDateTime::now_utc(), length)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;
    use test_case::test_case;
    use time::macros::datetime;

    use super::*;

    const START: OffsetDateTime = datetime!(2024-06-01 12:00:00 UTC);

    /// Every candidate accepted, every random delay zero.
    fn always_accept() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Check the properties every generated stream must have.
    fn assert_well_formed(events: &[Event], start: OffsetDateTime) {
        let mut previous = start;
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.sequence_id, i as u64 + 1);

            let gap = event.timestamp - previous;
            match event.state {
                PumpState::On => {
                    assert!(gap >= MIN_OFF_DWELL, "ON gap {gap} at #{}", event.sequence_id);
                    assert!(gap < MIN_OFF_DWELL + MAX_EXTRA_OFF_DWELL);
                }
                PumpState::Off => {
                    assert!(gap >= Duration::ZERO, "OFF gap {gap} at #{}", event.sequence_id);
                    assert!(gap < MAX_ON_DWELL);
                }
            }
            previous = event.timestamp;
        }
    }

    #[test_case(0; "empty")]
    #[test_case(1; "single")]
    #[test_case(2; "one_cycle")]
    #[test_case(7; "odd_overshoot")]
    #[test_case(500; "long")]
    fn returns_exact_length(length: usize) {
        let mut rng = StdRng::seed_from_u64(1);
        let events = generate_with(&mut rng, START, length);
        assert_eq!(events.len(), length);
    }

    #[test]
    fn four_events_alternate_when_nothing_is_dropped() {
        let events = generate_with(&mut always_accept(), START, 4);

        let states: Vec<_> = events.iter().map(|e| e.state).collect();
        assert_eq!(
            states,
            vec![PumpState::On, PumpState::Off, PumpState::On, PumpState::Off]
        );

        let ids: Vec<_> = events.iter().map(|e| e.sequence_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        assert_eq!(events[0].timestamp, START + MIN_OFF_DWELL);
        assert_eq!(events[2].timestamp, START + MIN_OFF_DWELL * 2);
        assert_well_formed(&events, START);
    }

    #[test]
    fn odd_length_truncates_trailing_off() {
        let events = generate_with(&mut always_accept(), START, 3);

        assert_eq!(events.len(), 3);
        assert_eq!(events[2].state, PumpState::On);
        assert_eq!(events[2].sequence_id, 3);
    }

    #[test]
    fn seeded_streams_are_well_formed() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let events = generate_with(&mut rng, START, 200);
            assert_well_formed(&events, START);
        }
    }

    #[test]
    fn same_seed_same_stream() {
        let a = generate_with(&mut StdRng::seed_from_u64(9), START, 50);
        let b = generate_with(&mut StdRng::seed_from_u64(9), START, 50);
        assert_eq!(a, b);
    }

    #[test]
    fn dropped_readings_produce_repeated_states() {
        // With OFF accepted only 20% of the time, a long stream is all but
        // certain to contain ON followed by ON.
        let events = generate_with(&mut StdRng::seed_from_u64(3), START, 200);

        let repeated_on = events
            .windows(2)
            .any(|w| w[0].state == PumpState::On && w[1].state == PumpState::On);
        assert!(repeated_on);
    }

    #[test]
    fn length_above_cap_is_not_truncated() {
        let length = MAX_EVENTS + 3;
        let events = generate_with(&mut always_accept(), START, length);

        assert_eq!(events.len(), length);
        assert_eq!(events.last().map(|e| e.sequence_id), Some(length as u64));
    }

    #[test]
    fn unseeded_generation_starts_after_now() {
        let before = OffsetDateTime::now_utc();
        let events = generate(10);

        assert_eq!(events.len(), 10);
        assert_well_formed(&events, before);
    }
}
