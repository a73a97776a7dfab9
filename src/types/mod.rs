pub mod chord;
pub mod key;
pub mod pitch;
