pub mod line_vertex;
mod render;
pub mod renderer;
pub mod scene_lines;

pub use renderer::Renderer;
