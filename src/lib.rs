//! Character Recs - hybrid attribute recommendations for tabletop characters
//!
//! Suggests feats, weapons, armor and a next class by blending item
//! co-occurrence, narrative similarity and popularity, with blend weights
//! tuned by leave-one-out evaluation.

pub mod blend;
pub mod core;
pub mod data;
pub mod eval;
pub mod pipeline;
pub mod rules;
pub mod scoring;
pub mod stats;
pub mod text;
pub mod tune;
