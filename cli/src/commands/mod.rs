pub mod encode;
pub mod pickle;
pub mod value;
