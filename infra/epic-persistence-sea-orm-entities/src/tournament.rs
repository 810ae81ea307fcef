use chrono::Utc;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tournaments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub game: String,
    pub game_image: Option<String>,
    pub location: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub rules: String,
    pub prize_pool: String,
    pub start_date: chrono::DateTime<Utc>,
    pub end_date: chrono::DateTime<Utc>,
    pub registration_deadline: chrono::DateTime<Utc>,
    pub team_size: i32,
    pub max_teams: i32,
    pub current_teams: i32,
    pub status: String,
    pub registration_fee: i32,
    /// JSON array of `{position, reward}`.
    #[sea_orm(column_type = "Text")]
    pub prizes: String,
    /// JSON array of `{stage, date, details}`.
    #[sea_orm(column_type = "Text")]
    pub schedule: String,
    pub organizer_name: String,
    pub organizer_contact: String,
    pub organizer_verified: bool,
    pub featured: bool,
    pub stream_link: Option<String>,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::registration::Entity")]
    Registration,
}

impl Related<super::registration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registration.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
