//! Wallet-connector settings handed to the external connection SDK.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WalletError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub icons: Vec<String>,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "Climate Foundation".to_string(),
            description: "Climate Foundation".to_string(),
            url: "https://www.kvcm.io".to_string(),
            icons: vec!["https://www.kvcm.io/favicon.ico".to_string()],
        }
    }
}

/// Which explorer wallets to hide. Serialized as `"ALL"` or a list of ids.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WalletFilter {
    All,
    #[default]
    None,
    Ids(Vec<String>),
}

impl Serialize for WalletFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("ALL"),
            Self::None => Vec::<String>::new().serialize(serializer),
            Self::Ids(ids) => ids.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for WalletFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Keyword(String),
            Ids(Vec<String>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Keyword(k) if k == "ALL" => Ok(Self::All),
            Raw::Keyword(k) => Err(serde::de::Error::custom(format!(
                "unknown wallet filter keyword {k:?} (expected \"ALL\" or a list of ids)"
            ))),
            Raw::Ids(ids) if ids.is_empty() => Ok(Self::None),
            Raw::Ids(ids) => Ok(Self::Ids(ids)),
        }
    }
}

/// MetaMask's explorer id.
pub const METAMASK_WALLET_ID: &str = "c57ca95b47569778a828d19178114f4db188b89b";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletConnectConfig {
    pub project_id: String,
    pub metadata: AppMetadata,
    /// Target chain ids (EIP-155).
    pub chains: Vec<u64>,
    pub recommended_wallet_ids: Vec<String>,
    pub excluded_wallet_ids: WalletFilter,
    pub terms_of_service_url: Option<String>,
    pub privacy_policy_url: Option<String>,
    pub enable_analytics: bool,
    pub enable_explorer: bool,
}

impl Default for WalletConnectConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            metadata: AppMetadata::default(),
            chains: vec![1],
            recommended_wallet_ids: vec![METAMASK_WALLET_ID.to_string()],
            excluded_wallet_ids: WalletFilter::All,
            terms_of_service_url: Some("https://www.kvcm.io/terms".to_string()),
            privacy_policy_url: Some("https://www.kvcm.io/privacy".to_string()),
            enable_analytics: true,
            enable_explorer: true,
        }
    }
}

impl WalletConnectConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        if self.project_id.trim().is_empty() {
            return Err(WalletError::MissingField { field: "projectId" });
        }
        if self.chains.is_empty() {
            return Err(WalletError::MissingField { field: "chains" });
        }
        if self.metadata.url.trim().is_empty() {
            return Err(WalletError::MissingField {
                field: "metadata.url",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_recommend_only_metamask() {
        let config = WalletConnectConfig::new("project");
        assert_eq!(config.chains, vec![1]);
        assert_eq!(config.recommended_wallet_ids, vec![METAMASK_WALLET_ID]);
        assert_eq!(config.excluded_wallet_ids, WalletFilter::All);
        config.validate().unwrap();
    }

    #[test]
    fn excluded_all_serializes_as_keyword() {
        let value = serde_json::to_value(WalletConnectConfig::new("p")).unwrap();
        assert_eq!(value["excludedWalletIds"], json!("ALL"));
        assert_eq!(value["projectId"], json!("p"));
    }

    #[test]
    fn parses_filter_forms() {
        let all: WalletFilter = serde_json::from_value(json!("ALL")).unwrap();
        assert_eq!(all, WalletFilter::All);
        let ids: WalletFilter = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(ids, WalletFilter::Ids(vec!["a".into(), "b".into()]));
        let none: WalletFilter = serde_json::from_value(json!([])).unwrap();
        assert_eq!(none, WalletFilter::None);
        assert!(serde_json::from_value::<WalletFilter>(json!("SOME")).is_err());
    }

    #[test]
    fn rejects_missing_project_id() {
        let err = WalletConnectConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("missing projectId"));
    }

    #[test]
    fn rejects_empty_chains() {
        let config = WalletConnectConfig {
            chains: vec![],
            ..WalletConnectConfig::new("p")
        };
        assert!(config.validate().is_err());
    }
}
