//! `SeaORM` Entity for transaction_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub transaction_id: String,
    pub line_no: i32,
    pub account_id: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub debit_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub credit_amount: Decimal,
    pub description: Option<String>,
    pub org_id: Option<String>,
    pub project_id: Option<String>,
    pub cost_center_id: Option<String>,
    pub work_item_id: Option<String>,
    pub analysis_work_item_id: Option<String>,
    pub classification_id: Option<String>,
    pub sub_tree_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction_line_items::Entity")]
    TransactionLineItems,
}

impl Related<super::transaction_line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionLineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
