use std::{cell::Cell, rc::Rc};

pub type TimerCallback = Box<dyn FnOnce()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerId(pub i32);

pub trait Timers {
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> Option<TimerId>;
    fn clear_timeout(&self, id: TimerId);
}

#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[cfg(test)]
pub use manual::ManualTimers;


#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn manual_timers_run_in_due_order() {
        let timers = ManualTimers::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for (delay, label) in [(300, "late"), (100, "early"), (200, "middle")] {
            let seen = seen.clone();
            timers.set_timeout(delay, Box::new(move || seen.borrow_mut().push(label)));
        }

        timers.advance_by(250);
        assert_eq!(*seen.borrow(), vec!["early", "middle"]);
        assert_eq!(timers.now_ms(), 250);

        timers.advance_by(50);
        assert_eq!(*seen.borrow(), vec!["early", "middle", "late"]);
    }

    #[test]
    fn cleared_timer_never_fires() {
        let timers = ManualTimers::default();
        let fired = Rc::new(Cell::new(false));
        let id = {
            let fired = fired.clone();
            timers.set_timeout(10, Box::new(move || fired.set(true)))
        }
        .expect("manual timers always schedule");

        timers.clear_timeout(id);
        timers.advance_by(100);

        assert!(!fired.get());
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let observer = token.clone();

        token.cancel();
        assert!(observer.is_cancelled());
    }
}
