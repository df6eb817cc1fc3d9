pub mod controller;

pub use controller::{PopupController, ProbeReport, TabCheck};
