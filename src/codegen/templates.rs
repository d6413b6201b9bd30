//! Code templates keyed by action type.
//!
//! Template text uses `{{name}}` for a parameter value and `{{$name}}` for an
//! action-local temporary (`_<actionId>_<name>` after sanitizing).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::registry::catalog::{GET_BALANCE, MINT_NFT, STAKE_TOKENS, SWAP_TOKENS, TRANSFER_TOKENS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeTemplate {
    pub action_type: String,
    #[serde(default)]
    pub imports: Vec<ImportDecl>,
    /// `&Account` entitlements the `prepare` block needs.
    #[serde(default)]
    pub entitlements: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<TemplateParam>,
    #[serde(default)]
    pub body: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<TemplateOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub contract: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParam {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    /// Cadence expression used when the parameter is unset.
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOutput {
    pub name: String,
    #[serde(rename = "type")]
    pub output_type: String,
    pub expression: String,
}

impl CodeTemplate {
    pub fn parameter(&self, name: &str) -> Option<&TemplateParam> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateLibrary {
    templates: BTreeMap<String, CodeTemplate>,
}

impl TemplateLibrary {
    pub fn new(templates: impl IntoIterator<Item = CodeTemplate>) -> Self {
        TemplateLibrary {
            templates: templates
                .into_iter()
                .map(|t| (t.action_type.clone(), t))
                .collect(),
        }
    }

    /// Load a JSON array of templates.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let templates: Vec<CodeTemplate> =
            serde_json::from_str(json).map_err(|e| ConfigError::json("template library", e))?;
        Ok(Self::new(templates))
    }

    pub fn get(&self, action_type: &str) -> Option<&CodeTemplate> {
        self.templates.get(action_type)
    }

    /// Add or replace a template.
    pub fn insert(&mut self, template: CodeTemplate) {
        self.templates.insert(template.action_type.clone(), template);
    }

    pub fn extend(&mut self, other: TemplateLibrary) {
        self.templates.extend(other.templates);
    }

    pub fn builtin() -> Self {
        Self::new([
            transfer_tokens(),
            swap_tokens(),
            stake_tokens(),
            mint_nft(),
            get_balance(),
        ])
    }
}

// =============================================================================
// BUILTIN TEMPLATES
// =============================================================================

fn import(contract: &str, address: &str) -> ImportDecl {
    ImportDecl {
        contract: contract.into(),
        address: address.into(),
    }
}

fn param(name: &str, ty: &str) -> TemplateParam {
    TemplateParam {
        name: name.into(),
        param_type: ty.into(),
        default: None,
    }
}

fn param_or(name: &str, ty: &str, default: &str) -> TemplateParam {
    TemplateParam {
        default: Some(default.into()),
        ..param(name, ty)
    }
}

fn output(name: &str, ty: &str, expression: &str) -> TemplateOutput {
    TemplateOutput {
        name: name.into(),
        output_type: ty.into(),
        expression: expression.into(),
    }
}

fn lines(body: &[&str]) -> Vec<String> {
    body.iter().map(|l| l.to_string()).collect()
}

const FUNGIBLE_TOKEN: (&str, &str) = ("FungibleToken", "0xf233dcee88fe0abe");
const FLOW_TOKEN: (&str, &str) = ("FlowToken", "0x1654653399040a61");
const NON_FUNGIBLE_TOKEN: (&str, &str) = ("NonFungibleToken", "0x1d7e57aa55817448");

fn transfer_tokens() -> CodeTemplate {
    CodeTemplate {
        action_type: TRANSFER_TOKENS.into(),
        imports: vec![
            import(FUNGIBLE_TOKEN.0, FUNGIBLE_TOKEN.1),
            import(FLOW_TOKEN.0, FLOW_TOKEN.1),
        ],
        entitlements: vec!["BorrowValue".into()],
        parameters: vec![param("recipient", "Address"), param("amount", "UFix64")],
        body: lines(&[
            "let {{$vault}} <- signer.storage.borrow<auth(FungibleToken.Withdraw) &FlowToken.Vault>(from: /storage/flowTokenVault)!.withdraw(amount: {{amount}})",
            "getAccount({{recipient}}).capabilities.borrow<&{FungibleToken.Receiver}>(/public/flowTokenReceiver)!.deposit(from: <-{{$vault}})",
        ]),
        outputs: vec![output("transferredAmount", "UFix64", "{{amount}}")],
    }
}

fn swap_tokens() -> CodeTemplate {
    CodeTemplate {
        action_type: SWAP_TOKENS.into(),
        imports: vec![
            import(FUNGIBLE_TOKEN.0, FUNGIBLE_TOKEN.1),
            import("SwapRouter", "0xa6850776a94e6551"),
        ],
        entitlements: vec!["BorrowValue".into()],
        parameters: vec![
            param("tokenIn", "String"),
            param("tokenOut", "String"),
            param("amountIn", "UFix64"),
            param_or("minAmountOut", "UFix64", "0.0"),
        ],
        body: lines(&[
            "let {{$vaultIn}} <- signer.storage.borrow<auth(FungibleToken.Withdraw) &{FungibleToken.Vault}>(from: /storage/flowTokenVault)!.withdraw(amount: {{amountIn}})",
            "let {{$vaultOut}} <- SwapRouter.swapExactTokensForTokens(exactVaultIn: <-{{$vaultIn}}, amountOutMin: {{minAmountOut}}, tokenKeyPath: [{{tokenIn}}, {{tokenOut}}], deadline: getCurrentBlock().timestamp + 300.0)",
            "let {{$received}} = {{$vaultOut}}.balance",
            "signer.storage.borrow<&{FungibleToken.Receiver}>(from: /storage/flowTokenVault)!.deposit(from: <-{{$vaultOut}})",
        ]),
        outputs: vec![output("amountOut", "UFix64", "{{$received}}")],
    }
}

fn stake_tokens() -> CodeTemplate {
    CodeTemplate {
        action_type: STAKE_TOKENS.into(),
        imports: vec![import("FlowStakingCollection", "0x8d0e87b65159ae63")],
        entitlements: vec!["BorrowValue".into()],
        parameters: vec![param("nodeId", "String"), param("amount", "UFix64")],
        body: lines(&[
            "signer.storage.borrow<auth(FlowStakingCollection.CollectionOwner) &FlowStakingCollection.StakingCollection>(from: FlowStakingCollection.StakingCollectionStoragePath)!.stakeNewTokens(nodeID: {{nodeId}}, delegatorID: nil, amount: {{amount}})",
        ]),
        outputs: vec![output("stakedAmount", "UFix64", "{{amount}}")],
    }
}

fn mint_nft() -> CodeTemplate {
    CodeTemplate {
        action_type: MINT_NFT.into(),
        imports: vec![
            import(NON_FUNGIBLE_TOKEN.0, NON_FUNGIBLE_TOKEN.1),
            import("ExampleNFT", "0x1d7e57aa55817448"),
        ],
        entitlements: vec!["BorrowValue".into()],
        parameters: vec![
            param("recipient", "Address"),
            param("name", "String"),
            param_or("description", "String", "\"\""),
        ],
        body: lines(&[
            "let {{$minter}} = signer.storage.borrow<&ExampleNFT.NFTMinter>(from: ExampleNFT.MinterStoragePath)!",
            "let {{$receiver}} = getAccount({{recipient}}).capabilities.borrow<&{NonFungibleToken.Receiver}>(ExampleNFT.CollectionPublicPath)!",
            "let {{$nft}} <- {{$minter}}.mintNFT(name: {{name}}, description: {{description}}, thumbnail: \"\")",
            "let {{$id}} = {{$nft}}.id",
            "{{$receiver}}.deposit(token: <-{{$nft}})",
        ]),
        outputs: vec![output("tokenId", "UInt64", "{{$id}}")],
    }
}

fn get_balance() -> CodeTemplate {
    CodeTemplate {
        action_type: GET_BALANCE.into(),
        imports: vec![import(FUNGIBLE_TOKEN.0, FUNGIBLE_TOKEN.1)],
        entitlements: vec![],
        parameters: vec![param("address", "Address")],
        body: lines(&[
            "let {{$balance}} = getAccount({{address}}).capabilities.borrow<&{FungibleToken.Balance}>(/public/flowTokenBalance)!.balance",
        ]),
        outputs: vec![output("balance", "UFix64", "{{$balance}}")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_json_loads_templates() {
        let json = r#"[{"actionType":"noop","body":["log({{message}})"],"parameters":[{"name":"message","type":"String"}]}]"#;
        let lib = TemplateLibrary::from_json(json).unwrap();
        let t = lib.get("noop").unwrap();
        assert_eq!(t.body, vec!["log({{message}})".to_string()]);
        assert!(t.outputs.is_empty());
    }

    #[test]
    fn insert_replaces_builtin() {
        let mut lib = TemplateLibrary::builtin();
        let mut custom = lib.get(GET_BALANCE).unwrap().clone();
        custom.body = vec!["let {{$balance}} = 0.0".into()];
        lib.insert(custom);
        assert_eq!(lib.get(GET_BALANCE).unwrap().body.len(), 1);
        assert_eq!(lib.get(GET_BALANCE).unwrap().body[0], "let {{$balance}} = 0.0");
    }
}
