use num_derive::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, FromPrimitive, PartialEq)]
pub enum SandwichGuardError {
    #[error("Invalid instruction")]
    InvalidInstruction = 0,

    #[error("Pool risk record not initialized")]
    NotInitialized = 1,

    #[error("Pool risk record already initialized")]
    AlreadyInitialized = 2,

    #[error("Invalid PDA")]
    InvalidPda = 3,

    #[error("Invalid authority")]
    InvalidAuthority = 4,

    #[error("Fee tiers must be strictly increasing")]
    InvalidFeeTiers = 5,

    #[error("Fee exceeds 10000 basis points")]
    FeeOutOfRange = 6,

    #[error("Risk thresholds must be strictly increasing")]
    InvalidThresholds = 7,

    #[error("Scaling parameter must be nonzero")]
    InvalidScalingParameter = 8,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 9,
}

impl PrintProgramError for SandwichGuardError {
    fn print<E>(&self) {
        use solana_program::msg;
        msg!("SandwichGuardError: {}", self);
    }
}

impl From<SandwichGuardError> for ProgramError {
    fn from(e: SandwichGuardError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for SandwichGuardError {
    fn type_of() -> &'static str {
        "SandwichGuardError"
    }
}
