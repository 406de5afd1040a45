// lyrics/mod.rs - top-level lyrics module re-exporting submodules
pub mod meting;
pub mod parse;
pub mod source;
pub mod types;

pub use meting::Track;
pub use types::LyricTimeline;
