//! Interactive polish for a static portfolio page.

pub mod contact;
pub mod motion;
pub mod navigation;
pub mod notify;
pub mod page;
pub mod reveal;
pub mod theme;
pub mod timers;
pub mod typing;
