//! Aggregate roots - domain objects that own their related data
//!
//! `WorldModel` owns every character, quest, location and faction of a
//! session; ownership is enforced by Rust rather than by guard methods.

pub mod world_model;

pub use world_model::WorldModel;
