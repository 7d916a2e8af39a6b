pub use board::*;
pub use colors::*;
pub use errors::*;
pub use protocol::*;
pub use visualization::*;

#[cfg(test)]
mod arbitrary;
mod board;
mod colors;
mod errors;
mod protocol;
mod visualization;
