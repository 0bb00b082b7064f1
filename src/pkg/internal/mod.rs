pub mod adaptors;
pub mod gateway;
