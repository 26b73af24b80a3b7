use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// The five ranking tables exposed under `/api/rankings/{kind}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingKind {
    Developers,
    Workspaces,
    Groups,
    Tools,
    Functions,
}

impl RankingKind {
    pub const ALL: [RankingKind; 5] = [
        RankingKind::Developers,
        RankingKind::Workspaces,
        RankingKind::Groups,
        RankingKind::Tools,
        RankingKind::Functions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RankingKind::Developers => "developers",
            RankingKind::Workspaces => "workspaces",
            RankingKind::Groups => "groups",
            RankingKind::Tools => "tools",
            RankingKind::Functions => "functions",
        }
    }
}

impl fmt::Display for RankingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row type served by one of the ranking endpoints.
pub trait RankingEntity: DeserializeOwned + Serialize + Send + Sync + 'static {
    const KIND: RankingKind;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DeveloperRanking {
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub workspace_count: i64,
    pub total_users: i64,
    pub total_chats: i64,
    pub total_messages: i64,
    pub total_positive: i64,
    pub total_negative: i64,
}

impl RankingEntity for DeveloperRanking {
    const KIND: RankingKind = RankingKind::Developers;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WorkspaceRanking {
    pub id: String,
    pub name: String,
    pub developer_email: Option<String>,
    pub user_count: i64,
    pub chat_count: i64,
    pub message_count: i64,
    pub positive: i64,
    pub negative: i64,
}

impl RankingEntity for WorkspaceRanking {
    const KIND: RankingKind = RankingKind::Workspaces;
}

/// Per-member figures are computed and rounded by the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GroupRanking {
    pub group_id: String,
    pub group_name: String,
    pub member_count: i64,
    #[serde(default)]
    pub total_chats: i64,
    #[serde(default)]
    pub total_messages: i64,
    pub total_feedbacks: i64,
    pub chats_per_member: f64,
    pub messages_per_member: f64,
}

impl RankingEntity for GroupRanking {
    const KIND: RankingKind = RankingKind::Groups;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ToolRanking {
    pub id: String,
    pub name: String,
    pub creator_email: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl RankingEntity for ToolRanking {
    const KIND: RankingKind = RankingKind::Tools;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionType {
    Pipe,
    Filter,
    Action,
    #[serde(other)]
    Other,
}

impl From<String> for FunctionType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pipe" => FunctionType::Pipe,
            "filter" => FunctionType::Filter,
            "action" => FunctionType::Action,
            _ => FunctionType::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FunctionRanking {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub function_type: FunctionType,
    pub is_active: bool,
    pub is_global: bool,
    pub creator_email: Option<String>,
    pub updated_at: Option<String>,
}

impl RankingEntity for FunctionRanking {
    const KIND: RankingKind = RankingKind::Functions;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_path_segment() {
        for kind in RankingKind::ALL {
            let parsed: RankingKind =
                serde_json::from_value(serde_json::Value::String(kind.to_string())).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn function_type_decodes_wire_name() {
        let row: FunctionRanking = serde_json::from_str(
            r#"{"id":"f1","name":"Summariser","type":"filter","is_active":true,
                "is_global":false,"creator_email":null,"updated_at":"2024-05-01T03:15:22Z"}"#,
        )
        .unwrap();
        assert_eq!(row.function_type, FunctionType::Filter);

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["type"], "filter");
    }

    #[test]
    fn unknown_function_type_degrades() {
        let parsed: FunctionType = serde_json::from_str(r#""router""#).unwrap();
        assert_eq!(parsed, FunctionType::Other);
        assert_eq!(FunctionType::from("router".to_string()), FunctionType::Other);
        assert_eq!(FunctionType::from("pipe".to_string()), FunctionType::Pipe);
    }

    #[test]
    fn developer_row_requires_numeric_fields() {
        let missing = serde_json::from_str::<DeveloperRanking>(
            r#"{"user_id":"u1","email":"a@samsung.com","workspace_count":1}"#,
        );
        assert!(missing.is_err());
    }
}
