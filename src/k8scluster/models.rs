/// Container cluster API data models
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

const ORG_ID_HEADER: &str = "x-auth-resource-org";
const SPACE_ID_HEADER: &str = "x-auth-resource-space";
const ACCOUNT_ID_HEADER: &str = "x-auth-resource-account";

/// Tenant scope attached to every request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterTargetHeader {
    #[serde(default)]
    pub org_id: String,
    #[serde(default)]
    pub space_id: String,
    #[serde(default)]
    pub account_id: String,
}

impl ClusterTargetHeader {
    /// Convert the target into request headers, skipping empty fields
    pub fn to_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (ORG_ID_HEADER, &self.org_id),
            (SPACE_ID_HEADER, &self.space_id),
            (ACCOUNT_ID_HEADER, &self.account_id),
        ] {
            if value.is_empty() {
                continue;
            }
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header {}", name))?;
            headers.insert(HeaderName::from_static(name), value);
        }
        Ok(headers)
    }
}

/// Action requested on cluster workers
///
/// Sent as a plain string. Actions without a dedicated variant travel as
/// `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum WorkerAction {
    Add,
    Reboot,
    Reload,
    Other(String),
}

impl std::fmt::Display for WorkerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerAction::Add => write!(f, "add"),
            WorkerAction::Reboot => write!(f, "reboot"),
            WorkerAction::Reload => write!(f, "reload"),
            WorkerAction::Other(action) => write!(f, "{}", action),
        }
    }
}

impl std::str::FromStr for WorkerAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "" => Err("worker action cannot be empty".to_string()),
            "add" => Ok(WorkerAction::Add),
            "reboot" => Ok(WorkerAction::Reboot),
            "reload" => Ok(WorkerAction::Reload),
            other => Ok(WorkerAction::Other(other.to_string())),
        }
    }
}

impl TryFrom<String> for WorkerAction {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WorkerAction> for String {
    fn from(action: WorkerAction) -> Self {
        action.to_string()
    }
}

/// Request body for mutating worker operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerParam {
    pub action: WorkerAction,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub count: u32,
}

fn is_zero(count: &u32) -> bool {
    *count == 0
}

impl WorkerParam {
    pub fn new(action: WorkerAction, count: u32) -> Self {
        Self { action, count }
    }
}

/// Worker node as reported by the API
///
/// Missing or `null` fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Worker {
    #[serde(alias = "ID", alias = "Id", deserialize_with = "nullable")]
    pub id: String,
    #[serde(alias = "State", deserialize_with = "nullable")]
    pub state: String,
    #[serde(alias = "Status", deserialize_with = "nullable")]
    pub status: String,
    #[serde(
        rename = "machineType",
        alias = "MachineType",
        alias = "machine_type",
        deserialize_with = "nullable"
    )]
    pub machine_type: String,
    #[serde(
        rename = "privateIP",
        alias = "PrivateIP",
        alias = "privateIp",
        alias = "PrivateIp",
        alias = "private_ip",
        deserialize_with = "nullable"
    )]
    pub private_ip: String,
    #[serde(
        rename = "publicIP",
        alias = "PublicIP",
        alias = "publicIp",
        alias = "PublicIp",
        alias = "public_ip",
        deserialize_with = "nullable"
    )]
    pub public_ip: String,
    #[serde(
        rename = "privateVlan",
        alias = "PrivateVlan",
        alias = "privateVLAN",
        alias = "PrivateVLAN",
        alias = "private_vlan",
        deserialize_with = "nullable"
    )]
    pub private_vlan: String,
    #[serde(
        rename = "publicVlan",
        alias = "PublicVlan",
        alias = "publicVLAN",
        alias = "PublicVLAN",
        alias = "public_vlan",
        deserialize_with = "nullable"
    )]
    pub public_vlan: String,
    #[serde(
        rename = "kubeVersion",
        alias = "KubeVersion",
        alias = "kube_version",
        deserialize_with = "nullable"
    )]
    pub kube_version: String,
    #[serde(alias = "Billing", deserialize_with = "nullable")]
    pub billing: String,
    #[serde(
        rename = "errorMessage",
        alias = "ErrorMessage",
        alias = "error_message",
        deserialize_with = "nullable"
    )]
    pub error_message: String,
    #[serde(alias = "Isolation", deserialize_with = "nullable")]
    pub isolation: String,
}

fn nullable<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Error body returned by the API
#[allow(dead_code)]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub description: String,
    #[serde(rename = "incidentID", default)]
    pub incident_id: Option<String>,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_headers() {
        let target = ClusterTargetHeader {
            org_id: "abc".to_string(),
            space_id: "def".to_string(),
            account_id: "ghi".to_string(),
        };
        let headers = target.to_headers().unwrap();
        assert_eq!(headers.get("X-Auth-Resource-Org").unwrap(), "abc");
        assert_eq!(headers.get("X-Auth-Resource-Space").unwrap(), "def");
        assert_eq!(headers.get("X-Auth-Resource-Account").unwrap(), "ghi");
    }

    #[test]
    fn test_target_headers_skip_empty() {
        let target = ClusterTargetHeader {
            account_id: "ghi".to_string(),
            ..Default::default()
        };
        let headers = target.to_headers().unwrap();
        assert_eq!(headers.len(), 1);
        assert!(headers.get("X-Auth-Resource-Org").is_none());
    }

    #[test]
    fn test_target_headers_invalid_value() {
        let target = ClusterTargetHeader {
            org_id: "bad\nvalue".to_string(),
            ..Default::default()
        };
        assert!(target.to_headers().is_err());
    }

    #[test]
    fn test_worker_param_body() {
        let body = serde_json::to_value(WorkerParam::new(WorkerAction::Add, 1)).unwrap();
        assert_eq!(body, serde_json::json!({"action": "add", "count": 1}));

        let body = serde_json::to_value(WorkerParam::new(WorkerAction::Reboot, 0)).unwrap();
        assert_eq!(body, serde_json::json!({"action": "reboot"}));
    }

    #[test]
    fn test_worker_decodes_pascal_case() {
        let json = r#"{"Billing":"","ErrorMessage":"","Isolation":"","MachineType":"free","KubeVersion":"","PrivateIP":"","PublicIP":"","PrivateVlan":"vlan","PublicVlan":"vlan","state":"normal","status":"ready"}"#;
        let worker: Worker = serde_json::from_str(json).unwrap();
        assert_eq!(worker.machine_type, "free");
        assert_eq!(worker.private_vlan, "vlan");
        assert_eq!(worker.state, "normal");
        assert_eq!(worker.status, "ready");
        assert_eq!(worker.id, "");
    }

    #[test]
    fn test_worker_action_strings() {
        assert_eq!("reload".parse::<WorkerAction>().unwrap(), WorkerAction::Reload);
        assert_eq!(
            "update".parse::<WorkerAction>().unwrap(),
            WorkerAction::Other("update".to_string())
        );
        assert!("".parse::<WorkerAction>().is_err());

        let body = serde_json::to_value(WorkerParam::new(
            WorkerAction::Other("update".to_string()),
            0,
        ))
        .unwrap();
        assert_eq!(body, serde_json::json!({"action": "update"}));

        let param: WorkerParam = serde_json::from_str(r#"{"action":"reboot"}"#).unwrap();
        assert_eq!(param.action, WorkerAction::Reboot);
        assert_eq!(param.count, 0);
    }

    #[test]
    fn test_worker_null_fields() {
        let json = r#"{"id":"w1","errorMessage":null,"state":"normal","publicIP":null}"#;
        let worker: Worker = serde_json::from_str(json).unwrap();
        assert_eq!(worker.id, "w1");
        assert_eq!(worker.state, "normal");
        assert_eq!(worker.error_message, "");
        assert_eq!(worker.public_ip, "");
    }

    #[test]
    fn test_worker_key_variants() {
        let json = r#"{"id":"w1","privateIp":"10.0.0.4","PublicIp":"169.1.2.3","private_vlan":"1234","kube_version":"1.10.1"}"#;
        let worker: Worker = serde_json::from_str(json).unwrap();
        assert_eq!(worker.private_ip, "10.0.0.4");
        assert_eq!(worker.public_ip, "169.1.2.3");
        assert_eq!(worker.private_vlan, "1234");
        assert_eq!(worker.kube_version, "1.10.1");
    }

    #[test]
    fn test_worker_decodes_camel_case() {
        let json = r#"{"id":"kube-dal10-abc-w1","machineType":"b2c.4x16","privateIP":"10.0.0.4","publicIP":"169.1.2.3","kubeVersion":"1.10.1","errorMessage":"none"}"#;
        let worker: Worker = serde_json::from_str(json).unwrap();
        assert_eq!(worker.id, "kube-dal10-abc-w1");
        assert_eq!(worker.private_ip, "10.0.0.4");
        assert_eq!(worker.public_ip, "169.1.2.3");
        assert_eq!(worker.kube_version, "1.10.1");
        assert_eq!(worker.error_message, "none");
        assert_eq!(worker.billing, "");
    }
}
