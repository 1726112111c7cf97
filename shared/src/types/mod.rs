pub mod events;
pub mod value;
