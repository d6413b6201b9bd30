//! Standard action catalog. Mirrors the builtin code templates in
//! `codegen::templates`.

use super::{ActionMetadata, ParameterSpec, StaticRegistry};

pub const TRANSFER_TOKENS: &str = "transfer-tokens";
pub const SWAP_TOKENS: &str = "swap-tokens";
pub const STAKE_TOKENS: &str = "stake-tokens";
pub const MINT_NFT: &str = "mint-nft";
pub const GET_BALANCE: &str = "get-balance";

pub fn builtin_metadata() -> Vec<ActionMetadata> {
    vec![
        ActionMetadata::new(TRANSFER_TOKENS, "Transfer Tokens")
            .with_parameter(ParameterSpec::required("recipient", "Address"))
            .with_parameter(
                ParameterSpec::required("amount", "UFix64").with_range(Some(0.0), None),
            )
            .with_output("transferredAmount", "UFix64")
            .with_gas(150)
            .with_capabilities(&["BorrowValue"]),
        ActionMetadata::new(SWAP_TOKENS, "Swap Tokens")
            .with_parameter(ParameterSpec::required("tokenIn", "String"))
            .with_parameter(ParameterSpec::required("tokenOut", "String"))
            .with_parameter(
                ParameterSpec::required("amountIn", "UFix64").with_range(Some(0.0), None),
            )
            .with_parameter(ParameterSpec::optional("minAmountOut", "UFix64"))
            .with_output("amountOut", "UFix64")
            .with_gas(300)
            .with_capabilities(&["BorrowValue", "SaveValue"]),
        ActionMetadata::new(STAKE_TOKENS, "Stake Tokens")
            .with_parameter(ParameterSpec::required("nodeId", "String"))
            .with_parameter(
                ParameterSpec::required("amount", "UFix64").with_range(Some(0.0), None),
            )
            .with_output("stakedAmount", "UFix64")
            .with_gas(250)
            .with_capabilities(&["BorrowValue"])
            .with_conflicts(&["unstake-tokens"]),
        ActionMetadata::new(MINT_NFT, "Mint NFT")
            .with_parameter(ParameterSpec::required("recipient", "Address"))
            .with_parameter(ParameterSpec::required("name", "String"))
            .with_parameter(ParameterSpec::optional("description", "String"))
            .with_output("tokenId", "UInt64")
            .with_gas(200)
            .with_capabilities(&["BorrowValue", "Capabilities"]),
        ActionMetadata::new(GET_BALANCE, "Get Balance")
            .with_parameter(ParameterSpec::required("address", "Address"))
            .with_output("balance", "UFix64")
            .with_gas(50),
    ]
}

pub fn builtin_registry() -> StaticRegistry {
    StaticRegistry::new(builtin_metadata())
}

impl ActionMetadata {
    fn with_capabilities(mut self, caps: &[&str]) -> Self {
        self.required_capabilities = caps.iter().map(|c| c.to_string()).collect();
        self
    }

    fn with_conflicts(mut self, types: &[&str]) -> Self {
        self.conflicts_with = types.iter().map(|t| t.to_string()).collect();
        self
    }
}
