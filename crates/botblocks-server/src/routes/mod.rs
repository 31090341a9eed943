pub mod log;
pub mod program;
pub mod rainbow;
pub mod robot;
pub mod run;
pub mod script;
