pub mod error;
pub mod image_payload;
pub mod onboarding;
pub mod ports;
pub mod prompts;
pub mod repos;
pub mod response_parser;
pub mod service;
pub mod themes;
