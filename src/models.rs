pub mod background;
pub mod colors;
pub mod elements;
pub mod fill;
pub mod presentation;
pub mod slide;
