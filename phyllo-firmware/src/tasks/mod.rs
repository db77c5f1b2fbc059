//! Embassy tasks

pub mod button;
pub mod camera;
pub mod controller;
pub mod display;
pub mod indicators;
pub mod poll;
pub mod tick;
pub mod upload;
