use chrono::Utc;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "registrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub tournament_id: Uuid,
    pub user_id: String,
    pub team_name: String,
    /// JSON array of `{name, email, gameId}`.
    #[sea_orm(column_type = "Text")]
    pub team_members: String,
    pub captain_name: String,
    pub captain_email: String,
    pub captain_phone: String,
    pub captain_game_id: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub payment_method: String,
    pub payment_status: String,
    pub status: String,
    pub transaction_id: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    pub agreed_to_terms: bool,
    pub registration_date: chrono::DateTime<Utc>,
    // Copies of user_id and team_name while the registration is active, NULL
    // once rejected. Unique together with tournament_id.
    pub active_user: Option<String>,
    pub active_team_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tournament::Entity",
        from = "Column::TournamentId",
        to = "super::tournament::Column::Id",
        on_delete = "Cascade"
    )]
    Tournament,
}

impl Related<super::tournament::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tournament.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
