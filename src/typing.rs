use crate::timers::{CancelToken, TimerId, Timers};
use std::{
    any::Any,
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

pub const HERO_TITLE_SELECTOR: &str = ".hero-content h1 .text-gradient";

pub const START_DELAY_MS: u32 = 1_000;
pub const TYPE_DELAY_MS: u32 = 150;
pub const DELETE_DELAY_MS: u32 = 100;
pub const WORD_PAUSE_MS: u32 = 2_000;
pub const NEXT_WORD_PAUSE_MS: u32 = 500;

pub const DEFAULT_PHRASES: [&str; 4] = ["Your Name", "Developer", "Creator", "Innovator"];
pub const PHRASES_ATTRIBUTE: &str = "data-phrases";

pub fn parse_phrase_list(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tick {
    pub text: String,
    pub delay_ms: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhraseCycle {
    phrases: Vec<String>,
    text_index: usize,
    char_index: usize,
    is_deleting: bool,
}

impl PhraseCycle {
    pub fn new<I, S>(phrases: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases: Vec<String> = phrases.into_iter().map(Into::into).collect();
        if phrases.is_empty() {
            return None;
        }

        Some(Self {
            phrases,
            text_index: 0,
            char_index: 0,
            is_deleting: false,
        })
    }

    pub fn text_index(&self) -> usize {
        self.text_index
    }

    pub fn char_index(&self) -> usize {
        self.char_index
    }

    pub fn is_deleting(&self) -> bool {
        self.is_deleting
    }

    pub fn current(&self) -> &str {
        &self.phrases[self.text_index]
    }

    pub fn advance(&mut self) -> Tick {
        let current_len = self.current().chars().count();

        if self.is_deleting {
            self.char_index = self.char_index.saturating_sub(1);
        } else {
            self.char_index = (self.char_index + 1).min(current_len);
        }

        let text: String = self.current().chars().take(self.char_index).collect();
        let mut delay_ms = if self.is_deleting {
            DELETE_DELAY_MS
        } else {
            TYPE_DELAY_MS
        };

        if !self.is_deleting && self.char_index == current_len {
            delay_ms = WORD_PAUSE_MS;
            self.is_deleting = true;
        } else if self.is_deleting && self.char_index == 0 {
            self.is_deleting = false;
            self.text_index = (self.text_index + 1) % self.phrases.len();
            delay_ms = NEXT_WORD_PAUSE_MS;
        }

        Tick { text, delay_ms }
    }
}

/// Owns a running animation; dropping it cancels the animation and frees its state.
pub struct TypingHandle<T: Timers + ?Sized> {
    timers: Rc<T>,
    token: CancelToken,
    pending: Rc<Cell<Option<TimerId>>>,
    _state: Rc<dyn Any>,
}

impl<T: Timers + ?Sized> TypingHandle<T> {
    pub fn cancel(&self) {
        self.token.cancel();
        if let Some(id) = self.pending.take() {
            self.timers.clear_timeout(id);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<T: Timers + ?Sized> Drop for TypingHandle<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct TypingLoop<T: Timers + ?Sized, F> {
    timers: Rc<T>,
    token: CancelToken,
    pending: Rc<Cell<Option<TimerId>>>,
    cycle: RefCell<PhraseCycle>,
    render: RefCell<F>,
}

fn schedule_tick<T, F>(state: &Rc<TypingLoop<T, F>>, delay_ms: u32)
where
    T: Timers + ?Sized + 'static,
    F: FnMut(&str) + 'static,
{
    let weak: Weak<TypingLoop<T, F>> = Rc::downgrade(state);
    let id = state.timers.set_timeout(
        delay_ms,
        Box::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.pending.set(None);
            if state.token.is_cancelled() {
                return;
            }

            let tick = state.cycle.borrow_mut().advance();
            {
                let mut render = state.render.borrow_mut();
                (*render)(&tick.text);
            }
            schedule_tick(&state, tick.delay_ms);
        }),
    );
    state.pending.set(id);
}

/// Starts the animation; the first character appears after [`START_DELAY_MS`].
pub fn start_typing<T, I, S, F>(timers: Rc<T>, phrases: I, render: F) -> Option<TypingHandle<T>>
where
    T: Timers + ?Sized + 'static,
    I: IntoIterator<Item = S>,
    S: Into<String>,
    F: FnMut(&str) + 'static,
{
    let cycle = PhraseCycle::new(phrases)?;
    let token = CancelToken::new();
    let pending = Rc::new(Cell::new(None));

    let state = Rc::new(TypingLoop {
        timers: timers.clone(),
        token: token.clone(),
        pending: pending.clone(),
        cycle: RefCell::new(cycle),
        render: RefCell::new(render),
    });
    schedule_tick(&state, START_DELAY_MS);

    Some(TypingHandle {
        timers,
        token,
        pending,
        _state: state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timers::{ManualTimers, TimerCallback};

    fn ticks(cycle: &mut PhraseCycle, count: usize) -> Vec<Tick> {
        (0..count).map(|_| cycle.advance()).collect()
    }

    fn tick(text: &str, delay_ms: u32) -> Tick {
        Tick {
            text: text.to_string(),
            delay_ms,
        }
    }

    #[test]
    fn phrase_attribute_is_split_and_trimmed() {
        assert_eq!(
            parse_phrase_list(" Rustacean | | Builder|"),
            vec!["Rustacean".to_string(), "Builder".to_string()]
        );
        assert!(parse_phrase_list("  ").is_empty());
    }

    #[test]
    fn empty_phrase_list_is_refused() {
        assert!(PhraseCycle::new(Vec::<String>::new()).is_none());
    }

    #[test]
    fn single_phrase_types_pauses_deletes_and_restarts() {
        let mut cycle = PhraseCycle::new(["Ab"]).expect("non-empty");

        assert_eq!(
            ticks(&mut cycle, 4),
            vec![
                tick("A", TYPE_DELAY_MS),
                tick("Ab", WORD_PAUSE_MS),
                tick("A", DELETE_DELAY_MS),
                tick("", NEXT_WORD_PAUSE_MS),
            ]
        );
        assert_eq!(cycle.text_index(), 0);
        assert!(!cycle.is_deleting());
        assert_eq!(cycle.advance(), tick("A", TYPE_DELAY_MS));
    }

    #[test]
    fn phrase_of_length_n_takes_n_ticks_each_way() {
        let mut cycle = PhraseCycle::new(["Rust", "Yew"]).expect("non-empty");
        let typed = ticks(&mut cycle, 4);

        assert_eq!(typed.last(), Some(&tick("Rust", WORD_PAUSE_MS)));
        assert!(typed[..3].iter().all(|tick| tick.delay_ms == TYPE_DELAY_MS));
        assert!(cycle.is_deleting());

        let deleted = ticks(&mut cycle, 4);
        assert_eq!(deleted.last(), Some(&tick("", NEXT_WORD_PAUSE_MS)));
        assert!(deleted[..3].iter().all(|tick| tick.delay_ms == DELETE_DELAY_MS));
        assert_eq!(cycle.text_index(), 1);
        assert_eq!(cycle.current(), "Yew");
    }

    #[test]
    fn text_index_wraps_after_last_phrase() {
        let mut cycle = PhraseCycle::new(["a", "b"]).expect("non-empty");

        ticks(&mut cycle, 4);
        assert_eq!(cycle.text_index(), 0);
    }

    #[test]
    fn empty_phrase_advances_on_the_following_tick() {
        let mut cycle = PhraseCycle::new(["", "x"]).expect("non-empty");

        assert_eq!(cycle.advance(), tick("", WORD_PAUSE_MS));
        assert_eq!(cycle.advance(), tick("", NEXT_WORD_PAUSE_MS));
        assert_eq!(cycle.text_index(), 1);
        assert_eq!(cycle.advance(), tick("x", WORD_PAUSE_MS));
    }

    #[test]
    fn char_index_stays_within_phrase_bounds() {
        let phrases = ["", "é🦀", "Desarrollador", "x"];
        let mut cycle = PhraseCycle::new(phrases).expect("non-empty");

        for _ in 0..200 {
            let current_len = cycle.current().chars().count();
            let rendered = cycle.advance();
            assert!(rendered.text.chars().count() <= current_len);
            assert!(cycle.char_index() <= cycle.current().chars().count());
        }
    }

    #[test]
    fn multibyte_phrases_are_sliced_on_char_boundaries() {
        let mut cycle = PhraseCycle::new(["né"]).expect("non-empty");

        assert_eq!(cycle.advance().text, "n");
        assert_eq!(cycle.advance().text, "né");
    }

    #[test]
    fn start_typing_renders_after_initial_delay() {
        let timers = Rc::new(ManualTimers::default());
        let rendered = Rc::new(RefCell::new(Vec::new()));
        let sink = rendered.clone();

        let handle = start_typing(timers.clone(), ["Hi"], move |text: &str| {
            sink.borrow_mut().push(text.to_string())
        })
        .expect("non-empty phrases");

        timers.advance_by(u64::from(START_DELAY_MS) - 1);
        assert!(rendered.borrow().is_empty());

        timers.advance_by(1);
        assert_eq!(*rendered.borrow(), vec!["H"]);

        timers.advance_by(u64::from(TYPE_DELAY_MS));
        assert_eq!(*rendered.borrow(), vec!["H", "Hi"]);
        assert_eq!(timers.next_delay_ms(), Some(u64::from(WORD_PAUSE_MS)));
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn cancelled_animation_never_renders_again() {
        let timers = Rc::new(ManualTimers::default());
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();

        let handle = start_typing(timers.clone(), ["Hello"], move |_: &str| {
            counter.set(counter.get() + 1)
        })
        .expect("non-empty phrases");

        timers.advance_by(1_200);
        let before = count.get();
        assert!(before > 0);

        handle.cancel();
        timers.advance_by(60_000);

        assert_eq!(count.get(), before);
        assert_eq!(timers.pending_count(), 0);
    }

    #[derive(Default)]
    struct RetainingTimers {
        callbacks: RefCell<Vec<TimerCallback>>,
    }

    impl Timers for RetainingTimers {
        fn set_timeout(&self, _delay_ms: u32, callback: TimerCallback) -> Option<TimerId> {
            let mut callbacks = self.callbacks.borrow_mut();
            callbacks.push(callback);
            i32::try_from(callbacks.len()).ok().map(TimerId)
        }

        fn clear_timeout(&self, _id: TimerId) {}
    }

    #[test]
    fn released_handle_frees_loop_even_if_callback_is_retained() {
        let timers = Rc::new(RetainingTimers::default());
        let captured = Rc::new(());
        let alive = Rc::downgrade(&captured);

        let handle = start_typing(timers.clone(), ["Hi"], move |_: &str| {
            drop(Rc::clone(&captured))
        })
        .expect("non-empty phrases");
        assert!(alive.upgrade().is_some());

        handle.cancel();
        drop(handle);

        assert_eq!(timers.callbacks.borrow().len(), 1);
        assert!(alive.upgrade().is_none());

        let retained = timers.callbacks.borrow_mut().pop().expect("one callback");
        retained();
        assert!(timers.callbacks.borrow().is_empty());
    }

    #[test]
    fn dropping_the_handle_stops_the_animation() {
        let timers = Rc::new(ManualTimers::default());
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();

        let handle = start_typing(timers.clone(), ["Hello"], move |_: &str| {
            counter.set(counter.get() + 1)
        })
        .expect("non-empty phrases");
        drop(handle);

        timers.advance_by(60_000);
        assert_eq!(count.get(), 0);
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn start_typing_skips_empty_phrase_list() {
        let timers = Rc::new(ManualTimers::default());

        let handle = start_typing(timers.clone(), Vec::<&str>::new(), |_: &str| {});

        assert!(handle.is_none());
        assert_eq!(timers.pending_count(), 0);
    }
}
