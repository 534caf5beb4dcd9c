pub mod pull;
pub mod push;
