//! A tiny scalar autograd library and the pieces needed to teach a linear
//! classifier which component of a vector is the largest.

#![deny(warnings)]

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod fit;
pub mod loss_functions;
pub mod metrics;
pub mod nn;
pub mod optim;
pub mod plot;
pub mod predict;
pub mod record;

pub use error::{Error, Result};
