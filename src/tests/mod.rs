pub mod common;

mod token_provider_cache;
