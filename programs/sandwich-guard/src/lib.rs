// Sandwich-attack deterrence through dynamic per-trade fees
// Native Solana implementation - NO ANCHOR

pub mod engine;
pub mod error;
pub mod instruction;
pub mod processor;
pub mod state;

use processor::process_instruction;

// Declare program ID
solana_program::declare_id!("BRVBMMgAtQ2BmqYo4k7UbVKWQcFRbZj8C9enQNYEa194");

#[cfg(not(feature = "no-entrypoint"))]
solana_program::entrypoint!(process_instruction);
