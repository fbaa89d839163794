pub mod config;
pub mod credentials;
pub mod report;
pub mod runtime;
pub mod storage;
pub mod token_provider;
pub mod tree;
