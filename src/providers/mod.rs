pub mod openai;
pub mod unconfigured;
