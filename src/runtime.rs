//! Single-consumer event loop.
//!
//! The loop waits for the next input event or the appliance's nearest
//! deadline, whichever comes first. Timers are polled, never fired from
//! another thread, so an event and a timeout can not race.

use crate::bootloader::Appliance;
use crate::input::{discard_keys_before_hang_up, HookState, InputEvent};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::time::Instant;
use tracing::{debug, info};

/// Monotonic time source.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Drive `appliance` until the event source disconnects.
///
/// Everything already queued is taken as one batch, and keys queued ahead
/// of a hang-up in that batch are dropped. When the source goes away the
/// line is treated as hung up.
pub fn run_event_loop<A>(appliance: &mut A, events: &Receiver<InputEvent>, clock: &dyn Clock)
where
    A: Appliance + ?Sized,
{
    loop {
        let first = match appliance.next_deadline() {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(clock.now());
                match events.recv_timeout(wait) {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Timeout) => {
                        appliance.poll(clock.now());
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match events.recv() {
                Ok(event) => event,
                Err(_) => break,
            },
        };

        let mut batch = vec![first];
        batch.extend(events.try_iter());
        let queued = batch.len();
        let batch = discard_keys_before_hang_up(batch);
        if batch.len() < queued {
            debug!(dropped = queued - batch.len(), "discarded keys queued before hang-up");
        }
        for event in batch {
            let now = clock.now();
            // Overdue timers go first so events are judged against current state.
            appliance.poll(now);
            appliance.handle(event, now);
        }
    }

    info!("event source closed, hanging up");
    appliance.handle(InputEvent::Hook(HookState::OnHook), clock.now());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::cell::Cell;
    use std::time::Duration;

    /// Appliance that records what it was given.
    #[derive(Default)]
    struct Probe {
        events: Vec<InputEvent>,
        polls: usize,
        deadline: Option<Instant>,
    }

    impl Appliance for Probe {
        fn handle(&mut self, event: InputEvent, _now: Instant) {
            self.events.push(event);
        }

        fn poll(&mut self, now: Instant) {
            self.polls += 1;
            if self.deadline.is_some_and(|deadline| now >= deadline) {
                self.deadline = None;
            }
        }

        fn next_deadline(&self) -> Option<Instant> {
            self.deadline
        }
    }

    struct StepClock {
        now: Cell<Instant>,
    }

    impl Clock for StepClock {
        fn now(&self) -> Instant {
            let now = self.now.get() + Duration::from_millis(1);
            self.now.set(now);
            now
        }
    }

    fn key(ch: char) -> InputEvent {
        InputEvent::Key(crate::menu::Key::from_char(ch).expect("keypad symbol"))
    }

    #[test]
    fn keys_queued_before_hang_up_are_dropped() {
        let (tx, rx) = unbounded();
        for event in [
            InputEvent::Hook(HookState::OffHook),
            key('1'),
            key('2'),
            InputEvent::Hook(HookState::OnHook),
            key('3'),
        ] {
            tx.send(event).expect("send");
        }
        drop(tx);

        let mut probe = Probe::default();
        run_event_loop(&mut probe, &rx, &SystemClock);
        assert_eq!(
            probe.events,
            vec![
                InputEvent::Hook(HookState::OffHook),
                InputEvent::Hook(HookState::OnHook),
                key('3'),
                InputEvent::Hook(HookState::OnHook),
            ]
        );
    }

    #[test]
    fn expired_deadline_is_polled_without_events() {
        let (tx, rx) = unbounded::<InputEvent>();
        let start = Instant::now();
        let clock = StepClock {
            now: Cell::new(start),
        };
        let mut probe = Probe {
            deadline: Some(start),
            ..Probe::default()
        };

        let sender = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            drop(tx);
        });
        run_event_loop(&mut probe, &rx, &clock);
        sender.join().expect("sender thread");

        assert!(probe.polls >= 1);
        assert_eq!(probe.deadline, None);
        assert_eq!(probe.events, vec![InputEvent::Hook(HookState::OnHook)]);
    }
}
