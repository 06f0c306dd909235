// Classification loop, observers, and host plumbing for soundclass.

pub mod cli;
pub mod hotreload;
pub mod observer;
pub mod pipeline;
pub mod stats;
