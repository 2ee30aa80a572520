pub mod bootstrap;
pub mod ip;
pub mod logging;
