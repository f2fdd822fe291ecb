use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::utils::timestamp::TimeParts;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "time")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub start_time: ChronoDateTime,
    pub hour: i32,
    pub day: i32,
    pub week: i32,
    pub month: i32,
    pub year: i32,
    pub weekday: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TimeParts> for ActiveModel {
    fn from(parts: &TimeParts) -> Self {
        ActiveModel {
            start_time: Set(parts.start_time),
            hour: Set(parts.hour),
            day: Set(parts.day),
            week: Set(parts.week),
            month: Set(parts.month),
            year: Set(parts.year),
            weekday: Set(parts.weekday),
        }
    }
}
