//! Core types and utilities

pub mod noise;
pub mod vec3;

pub use noise::{SimplexNoise, DEFAULT_NOISE_SEED};
pub use vec3::{safe_normalize, saturate, Mat4, Vec3};
