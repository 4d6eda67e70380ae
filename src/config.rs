pub mod settings;
pub mod oauth;
pub mod google_fit;
pub mod gemini;
pub mod session;
pub mod redis;
pub mod cors;
