pub mod error;
pub mod instruction;
pub mod layout;

pub use error::DecodeError;
pub use instruction::{build_instruction, encode_instruction_data, DiscriminatorTable};
pub use layout::{decode, encode};

#[cfg(test)]
mod tests;
