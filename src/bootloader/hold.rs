use std::time::{Duration, Instant};

/// Continuous-presence timer armed by a qualifying event.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldTimer {
    since: Option<Instant>,
}

impl HoldTimer {
    pub fn arm(&mut self, now: Instant) {
        self.since = Some(now);
    }

    pub fn cancel(&mut self) {
        self.since = None;
    }

    pub fn is_armed(&self) -> bool {
        self.since.is_some()
    }

    pub fn deadline(&self, threshold: Duration) -> Option<Instant> {
        self.since.map(|since| since + threshold)
    }

    pub fn elapsed(&self, threshold: Duration, now: Instant) -> bool {
        self.deadline(threshold).is_some_and(|deadline| now >= deadline)
    }
}

/// What a `*` event or a timer check means for the exit gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarSignal {
    /// Nothing to act on yet.
    Holding,
    /// The hold ended before the threshold: deliver one `*` press.
    ShortPress,
    /// The hold reached the threshold.
    LongPress,
}

/// Tracks a held `*` reported as repeated key events.
///
/// The hold lives while consecutive `*` events arrive no more than
/// `repeat_window` apart. A longer gap or any other key releases it.
#[derive(Debug, Clone, Copy)]
pub struct StarHold {
    repeat_window: Duration,
    first: Option<Instant>,
    last: Option<Instant>,
    /// Set after a long press so the rest of that same hold is swallowed.
    spent: bool,
}

impl StarHold {
    pub fn new(repeat_window: Duration) -> Self {
        Self {
            repeat_window,
            first: None,
            last: None,
            spent: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.first.is_some()
    }

    /// Forget any hold in progress.
    pub fn reset(&mut self) {
        self.first = None;
        self.last = None;
        self.spent = false;
    }

    /// Extend a hold that has already been acted on. Returns false (and
    /// forgets the hold) when this `*` belongs to a new press.
    pub fn continues(&mut self, now: Instant) -> bool {
        if self.is_active() && !self.released_by_gap(now) {
            self.last = Some(now);
            return true;
        }
        self.reset();
        false
    }

    /// Record a `*` event.
    pub fn press(&mut self, threshold: Duration, now: Instant) -> StarSignal {
        if self.released_by_gap(now) {
            let was_spent = self.spent;
            self.reset();
            self.first = Some(now);
            self.last = Some(now);
            return if was_spent {
                StarSignal::Holding
            } else {
                StarSignal::ShortPress
            };
        }
        let first = *self.first.get_or_insert(now);
        self.last = Some(now);
        if self.spent {
            return StarSignal::Holding;
        }
        if now.duration_since(first) >= threshold {
            self.spent = true;
            return StarSignal::LongPress;
        }
        StarSignal::Holding
    }

    /// A non-`*` key released the hold.
    pub fn release(&mut self) -> StarSignal {
        let signal = if self.is_active() && !self.spent {
            StarSignal::ShortPress
        } else {
            StarSignal::Holding
        };
        self.reset();
        signal
    }

    /// Timer check: a gap ends the hold, a hold still alive at the threshold fires.
    pub fn poll(&mut self, threshold: Duration, now: Instant) -> StarSignal {
        let Some(first) = self.first else {
            return StarSignal::Holding;
        };
        if self.released_by_gap(now) {
            return self.release();
        }
        if !self.spent && now.duration_since(first) >= threshold {
            self.spent = true;
            return StarSignal::LongPress;
        }
        StarSignal::Holding
    }

    /// Earliest instant at which [`StarHold::poll`] can change anything.
    pub fn deadline(&self, threshold: Duration) -> Option<Instant> {
        let (first, last) = (self.first?, self.last?);
        let gap = last + self.repeat_window + Duration::from_millis(1);
        if self.spent {
            Some(gap)
        } else {
            Some(gap.min(first + threshold))
        }
    }

    fn released_by_gap(&self, now: Instant) -> bool {
        self.last
            .is_some_and(|last| now.duration_since(last) > self.repeat_window)
    }
}
