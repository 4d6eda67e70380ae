pub mod credentials;
pub mod google_fit;
pub mod health_data;
pub mod llm;
