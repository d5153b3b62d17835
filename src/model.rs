pub mod gemini_api_model;
pub mod grid;
pub mod stop;

pub use grid::*;
pub use stop::*;
