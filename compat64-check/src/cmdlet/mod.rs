pub mod fallocate;
pub mod symbols;
pub mod verify;
