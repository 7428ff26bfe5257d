pub mod renderer;

pub use renderer::{cell_at, Cell, Renderer};
