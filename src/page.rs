use crate::{
    motion::shape_transform,
    navigation::{
        compute_active, fragment_target, navbar_scrolled, scroll_target, Section, ACTIVE_LOOKAHEAD,
    },
    reveal::{check_reveals, RevealTarget, REVEAL_MARGIN},
    theme::{load_theme, persist_theme, PreferenceStore, Theme},
};

pub trait PageSurface {
    fn scroll_y(&self) -> f64;
    fn viewport_height(&self) -> f64;
    fn sections(&self) -> Vec<Section>;
    fn section_top(&self, id: &str) -> Option<f64>;
    fn reveal_tops(&self) -> Vec<f64>;
    fn shape_count(&self) -> usize;

    fn set_navbar_scrolled(&self, scrolled: bool);
    fn set_active_section(&self, id: Option<&str>);
    fn reveal(&self, index: usize);
    fn set_shape_transform(&self, index: usize, transform: &str);
    fn smooth_scroll_to(&self, top: f64);
    fn apply_theme(&self, theme: Theme);
}

#[derive(Debug, Default)]
pub struct PageState {
    navbar_scrolled: Option<bool>,
    active_section: Option<Option<String>>,
    reveal_targets: Vec<RevealTarget>,
    theme: Theme,
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn active_section(&self) -> Option<&str> {
        self.active_section.as_ref().and_then(|id| id.as_deref())
    }

    pub fn revealed_count(&self) -> usize {
        self.reveal_targets.iter().filter(|target| target.visible).count()
    }

    pub fn on_scroll(&mut self, surface: &impl PageSurface) {
        let scroll_y = surface.scroll_y();

        let scrolled = navbar_scrolled(scroll_y);
        if self.navbar_scrolled != Some(scrolled) {
            surface.set_navbar_scrolled(scrolled);
            self.navbar_scrolled = Some(scrolled);
        }

        let sections = surface.sections();
        let active = compute_active(&sections, scroll_y, ACTIVE_LOOKAHEAD).map(str::to_string);
        if self.active_section.as_ref() != Some(&active) {
            surface.set_active_section(active.as_deref());
            self.active_section = Some(active);
        }

        for index in 0..surface.shape_count() {
            surface.set_shape_transform(index, &shape_transform(index, scroll_y));
        }

        self.check_reveals(surface);
    }

    fn check_reveals(&mut self, surface: &impl PageSurface) {
        let tops = surface.reveal_tops();
        for (index, top) in tops.iter().enumerate() {
            match self.reveal_targets.get_mut(index) {
                Some(target) => target.top = *top,
                None => self
                    .reveal_targets
                    .push(RevealTarget::new(format!("reveal-{index}"), *top)),
            }
        }

        let count = tops.len().min(self.reveal_targets.len());
        let revealed = check_reveals(
            &mut self.reveal_targets[..count],
            surface.viewport_height(),
            REVEAL_MARGIN,
        );
        for index in revealed {
            surface.reveal(index);
        }
    }

    /// Returns `true` when `href` is an in-page link the caller should keep
    /// the browser from following.
    pub fn on_nav_click(&self, surface: &impl PageSurface, href: &str) -> bool {
        let Some(id) = fragment_target(href) else {
            return false;
        };

        if let Some(top) = surface.section_top(id) {
            surface.smooth_scroll_to(scroll_target(top));
        }
        true
    }

    pub fn init_theme(&mut self, surface: &impl PageSurface, store: &impl PreferenceStore) {
        self.theme = load_theme(store);
        surface.apply_theme(self.theme);
    }

    pub fn on_theme_toggle(
        &mut self,
        surface: &impl PageSurface,
        store: &impl PreferenceStore,
    ) -> Theme {
        self.theme = self.theme.toggled();
        persist_theme(store, self.theme);
        surface.apply_theme(self.theme);
        self.theme
    }
}
