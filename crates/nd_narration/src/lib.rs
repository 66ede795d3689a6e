pub mod google;
pub mod renderer;

pub use google::{chunk_text, GoogleSpeech, GoogleTranslator};
pub use renderer::NarrationRenderer;
