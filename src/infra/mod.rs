pub mod github;
pub mod http;
pub mod mistral;
pub mod notion;
