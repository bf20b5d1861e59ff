pub mod component;
pub mod port;
pub mod word;

pub use component::Component;
pub use port::PortDevice;
pub use word::{Color, Instruction, Sample, Word};
