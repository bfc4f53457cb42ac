pub const NAVBAR_ID: &str = "mainNav";
pub const NAV_LINK_SELECTOR: &str = ".nav-link";
pub const SECTION_SELECTOR: &str = "section[id]";
pub const SCROLLED_CLASS: &str = "scrolled";
pub const ACTIVE_CLASS: &str = "active";

pub const ACTIVE_LOOKAHEAD: f64 = 200.0;
pub const NAVBAR_SCROLLED_THRESHOLD: f64 = 50.0;
pub const NAV_SCROLL_OFFSET: f64 = 80.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl Section {
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
        }
    }
}

/// Last section, in document order, whose `top - lookahead` is at or above
/// `scroll_y`. `None` while the page is still above the first section.
pub fn compute_active(sections: &[Section], scroll_y: f64, lookahead: f64) -> Option<&str> {
    sections
        .iter()
        .rev()
        .find(|section| section.top - lookahead <= scroll_y)
        .map(|section| section.id.as_str())
}

pub fn navbar_scrolled(scroll_y: f64) -> bool {
    scroll_y > NAVBAR_SCROLLED_THRESHOLD
}

pub fn fragment_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

pub fn link_is_active(href: &str, active: Option<&str>) -> bool {
    match (fragment_target(href), active) {
        (Some(target), Some(active)) => target == active,
        _ => false,
    }
}

pub fn scroll_target(section_top: f64) -> f64 {
    section_top - NAV_SCROLL_OFFSET
}
