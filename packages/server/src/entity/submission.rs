use common::SubmissionStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Owner, as asserted by the upstream gateway.
    pub user_id: i32,

    pub problem_id: i32,
    #[sea_orm(belongs_to, from = "problem_id", to = "id")]
    pub problem: HasOne<super::problem::Entity>,

    /// NULL for standalone submissions.
    pub contest_id: Option<i32>,
    #[sea_orm(belongs_to, from = "contest_id", to = "id")]
    pub contest: HasOne<super::contest::Entity>,

    #[sea_orm(column_type = "Text")]
    pub source_code: String,
    /// Engine language identifier.
    pub language_id: i32,

    pub status: SubmissionStatus,
    /// NULL until an aggregated verdict is recorded.
    pub score: Option<i32>,
    /// Mean across test cases, in milliseconds.
    pub execution_time_ms: Option<i32>,
    /// Mean across test cases, in kilobytes.
    pub memory_used_kb: Option<i32>,
    /// JSON array of `common::TestResult`, in test-case order.
    #[sea_orm(column_type = "JsonBinary")]
    pub test_results: serde_json::Value,
    #[sea_orm(column_type = "Text", nullable)]
    pub judge_comment: Option<String>,

    pub submitted_at: DateTimeUtc,
    pub judged_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
