//! Work generator adapters.

pub mod generators;

pub use generators::{
    build_generator, FallbackWorkGenerator, LocalWorkGenerator, NodeWorkGenerator,
};
