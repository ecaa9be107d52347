//! Screen modules for the intake TUI

pub mod form;
pub mod processing;
pub mod success;

pub use form::FormScreen;
pub use processing::ProcessingScreen;
pub use success::SuccessScreen;
