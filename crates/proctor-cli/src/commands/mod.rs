pub mod classifier;
pub mod config;
pub mod helpers;
pub mod run;
pub mod validate;
