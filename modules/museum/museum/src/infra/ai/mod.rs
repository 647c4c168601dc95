//! Text and image generation adapters.

pub mod mock;
pub mod openai;

pub use mock::{MockImageGenerator, MockTextGenerator};
pub use openai::{OpenAiImageGenerator, OpenAiTextGenerator};
