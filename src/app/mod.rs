pub mod display;
pub mod history;
