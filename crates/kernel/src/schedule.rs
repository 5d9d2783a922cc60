use crate::clock::Frame;

type Callback<S> = Box<dyn FnMut(&Frame, &mut S)>;

struct Entry<S> {
    label: String,
    callback: Callback<S>,
}

/// Ordered list of per-frame update functions over a shared state `S`.
///
/// A single loop calls [`Scheduler::run`] once per displayed frame; every
/// registered callback is invoked synchronously in registration order.
pub struct Scheduler<S> {
    entries: Vec<Entry<S>>,
    runs: u64,
}

impl<S> Default for Scheduler<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            runs: 0,
        }
    }
}

impl<S> Scheduler<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback to the end of the run order.
    pub fn register<F>(&mut self, label: impl Into<String>, callback: F)
    where
        F: FnMut(&Frame, &mut S) + 'static,
    {
        let label = label.into();
        tracing::trace!(position = self.entries.len(), %label, "frame callback registered");
        self.entries.push(Entry {
            label,
            callback: Box::new(callback),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels in run order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Number of frames dispatched so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Invoke every callback once for `frame`.
    pub fn run(&mut self, frame: &Frame, state: &mut S) {
        let _span = tracing::trace_span!("frame", index = frame.index).entered();
        for entry in &mut self.entries {
            (entry.callback)(frame, state);
        }
        self.runs += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameClock;

    #[test]
    fn runs_in_registration_order() {
        let mut sched: Scheduler<Vec<&'static str>> = Scheduler::new();
        sched.register("a", |_, log| log.push("a"));
        sched.register("b", |_, log| log.push("b"));
        sched.register("c", |_, log| log.push("c"));

        let mut clock = FrameClock::started();
        let mut log = Vec::new();
        let frame = clock.advance(0.016).unwrap();
        sched.run(&frame, &mut log);
        assert_eq!(log, vec!["a", "b", "c"]);
        assert_eq!(sched.runs(), 1);
    }

    #[test]
    fn labels_follow_run_order() {
        let mut sched: Scheduler<()> = Scheduler::new();
        sched.register("one", |_, _| {});
        sched.register(String::from("two"), |_, _| {});
        assert_eq!(sched.labels().collect::<Vec<_>>(), vec!["one", "two"]);
        assert_eq!(sched.len(), 2);
    }

    #[test]
    fn callbacks_see_frame_time() {
        let mut sched: Scheduler<f64> = Scheduler::new();
        sched.register("capture", |frame, t| *t = frame.elapsed);
        let mut clock = FrameClock::started();
        let mut t = 0.0;
        for _ in 0..4 {
            let frame = clock.advance(0.5).unwrap();
            sched.run(&frame, &mut t);
        }
        assert!((t - 2.0).abs() < 1e-9);
    }

    #[test]
    fn nothing_runs_while_clock_suspended() {
        let mut sched: Scheduler<u32> = Scheduler::new();
        sched.register("count", |_, n| *n += 1);
        let mut clock = FrameClock::new();
        let mut n = 0;
        if let Some(frame) = clock.advance(0.016) {
            sched.run(&frame, &mut n);
        }
        assert_eq!(n, 0);
        assert_eq!(sched.runs(), 0);
    }
}
