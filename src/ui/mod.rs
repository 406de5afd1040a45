pub mod modern;
pub mod modern_helpers;
pub mod pipe;
pub mod progression;
pub mod styles;
pub mod transition;
