pub mod canvas;
pub mod extractor;
pub mod renderer;

pub use extractor::extract_invoice;
pub use renderer::DanfeRenderer;
