pub mod assembler;
pub mod background;
pub mod color;
pub mod elements;
pub mod fill;
pub mod theme;
