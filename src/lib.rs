//! Alien Invaders: a terminal arcade shooter.
//!
//! The crate is split the same way the game runs each frame:
//! `input` samples the keyboard, `session` drives the title/wave/pause/
//! win/lose state machine, `wave` + `compute` simulate a single wave, and
//! `render` projects everything into a [`render::RenderModel`] that any
//! [`render::Surface`] can draw.

pub mod audio;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod input;
pub mod render;
pub mod session;
pub mod wave;
