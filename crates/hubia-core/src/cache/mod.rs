pub mod key;
pub mod memo;
