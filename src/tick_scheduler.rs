use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Delivered to the host loop each period, tagged with the `start` call that
/// armed the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

/// At most one timer exists. `start` replaces a running timer, `stop` is a
/// no-op when idle.
pub trait TickScheduler {
    fn start(&mut self, period: Duration);
    fn stop(&mut self);
    fn is_running(&self) -> bool;

    /// False for ticks queued before the latest `start` or after a `stop`.
    fn is_current(&self, tick: Tick) -> bool;
}

/// Runs the timer as a tokio task that forwards ticks over a channel, so the
/// tracker itself is only ever touched from the host loop.
#[derive(Debug)]
pub struct IntervalScheduler {
    runtime: Handle,
    tx: UnboundedSender<Tick>,
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl IntervalScheduler {
    pub fn new(runtime: Handle, tx: UnboundedSender<Tick>) -> Self {
        Self {
            runtime,
            tx,
            task: None,
            generation: 0,
        }
    }
}

impl TickScheduler for IntervalScheduler {
    fn start(&mut self, period: Duration) {
        self.stop();
        self.generation += 1;
        let tick = Tick {
            generation: self.generation,
        };
        let tx = self.tx.clone();
        let period = period.max(Duration::from_millis(1));
        let task = self.runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            // First tick completes immediately; skip it.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(tick).is_err() {
                    tracing::debug!("tick receiver dropped, stopping timer");
                    break;
                }
            }
        });
        self.task = Some(task);
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn is_current(&self, tick: Tick) -> bool {
        self.task.is_some() && tick.generation == self.generation
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Debug, Default)]
struct ManualState {
    running: bool,
    period: Option<Duration>,
    starts: u32,
    stops: u32,
    generation: u64,
}

/// Scheduler double: records calls and never fires on its own.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_count(&self) -> u32 {
        self.state.borrow().starts
    }

    pub fn stop_count(&self) -> u32 {
        self.state.borrow().stops
    }

    pub fn period(&self) -> Option<Duration> {
        self.state.borrow().period
    }

    /// The tick the armed timer would deliver next.
    pub fn next_tick(&self) -> Tick {
        Tick {
            generation: self.state.borrow().generation,
        }
    }
}

impl TickScheduler for ManualScheduler {
    fn start(&mut self, period: Duration) {
        let mut state = self.state.borrow_mut();
        state.running = true;
        state.period = Some(period);
        state.starts += 1;
        state.generation += 1;
    }

    fn stop(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.running {
            state.running = false;
            state.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    fn is_current(&self, tick: Tick) -> bool {
        let state = self.state.borrow();
        state.running && tick.generation == state.generation
    }
}
