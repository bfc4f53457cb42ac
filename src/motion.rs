pub const SHAPE_SELECTOR: &str = ".shape";
pub const PROJECT_CARD_SELECTOR: &str = ".project-card";
pub const LOADING_SELECTOR: &str = ".loading";
pub const LOADED_CLASS: &str = "loaded";

pub const CARD_HOVER_TRANSFORM: &str = "translateY(-10px) scale(1.02)";
pub const CARD_REST_TRANSFORM: &str = "translateY(0) scale(1)";

const PARALLAX_RATE: f64 = -0.5;
const PARALLAX_SPEED_STEP: f64 = 0.3;
const PARALLAX_ROTATION_RATE: f64 = 0.1;
const LOAD_STAGGER_MS: u32 = 100;

pub fn shape_transform(index: usize, scrolled: f64) -> String {
    let rate = scrolled * PARALLAX_RATE;
    let speed = (index as f64 + 1.0) * PARALLAX_SPEED_STEP;
    let rotation = scrolled * PARALLAX_ROTATION_RATE;
    // Keep "-0px" out of the style attribute.
    let offset = if rate == 0.0 { 0.0 } else { rate * speed };

    format!("translateY({offset}px) rotate({rotation}deg)")
}

pub fn card_transform(hovered: bool) -> &'static str {
    if hovered {
        CARD_HOVER_TRANSFORM
    } else {
        CARD_REST_TRANSFORM
    }
}

pub fn load_delay_ms(index: usize) -> u32 {
    u32::try_from(index)
        .unwrap_or(u32::MAX)
        .saturating_mul(LOAD_STAGGER_MS)
}
