pub const REVEAL_MARGIN: f64 = 150.0;

pub const REVEAL_SELECTOR: &str = ".skill-category, .project-card, .contact-item, .stat-item";
pub const FADE_IN_CLASS: &str = "fade-in";
pub const VISIBLE_CLASS: &str = "visible";

pub const REVEAL_OBSERVER_THRESHOLD: f64 = 0.1;
pub const REVEAL_OBSERVER_ROOT_MARGIN: &str = "0px 0px -50px 0px";

pub const SKILL_SELECTOR: &str = ".skill-item";
pub const SKILL_ANIMATE_CLASS: &str = "animate";
pub const SKILL_OBSERVER_THRESHOLD: f64 = 0.5;
const SKILL_MAX_DELAY_SECONDS: f64 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct RevealTarget {
    pub id: String,
    pub top: f64,
    pub visible: bool,
}

impl RevealTarget {
    pub fn new(id: impl Into<String>, top: f64) -> Self {
        Self {
            id: id.into(),
            top,
            visible: false,
        }
    }
}

pub fn check_reveals(
    targets: &mut [RevealTarget],
    viewport_height: f64,
    margin: f64,
) -> Vec<usize> {
    let threshold = viewport_height - margin;
    let mut revealed = Vec::new();

    for (index, target) in targets.iter_mut().enumerate() {
        if !target.visible && target.top < threshold {
            target.visible = true;
            revealed.push(index);
        }
    }

    revealed
}

pub fn skill_animation_delay(random_unit: f64) -> String {
    let seconds = random_unit.clamp(0.0, 1.0) * SKILL_MAX_DELAY_SECONDS;
    format!("{seconds:.3}s")
}
