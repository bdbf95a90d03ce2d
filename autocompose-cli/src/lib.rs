#![doc = include_str!("../README.md")]

pub mod cli;
pub mod error;
pub mod generate;
pub mod logging;
pub mod output;
