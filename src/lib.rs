pub mod config;
pub mod countries;
pub mod decode;
pub mod emit;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
