pub mod interaction;
pub mod transform;
