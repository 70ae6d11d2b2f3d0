// handlers/protected/ai - coaching endpoints backed by the language model
pub mod adjust;
pub mod chat;
pub mod generate;

pub use adjust::post as adjust_post;
pub use chat::post as chat_post;
pub use generate::post as generate_post;
