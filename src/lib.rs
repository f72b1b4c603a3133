pub mod config;
pub mod mbox;
pub mod pipeline;
pub mod site;
pub mod thread;
