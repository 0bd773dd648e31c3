// Industry insights: oracle-backed generation, cached per industry.

pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod service;
