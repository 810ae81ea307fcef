use epic_persistence_sea_orm_entities::registration;
use epic_server_app::domain::{
    RegistrationId, RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError, TournamentId,
    UserId,
    registration::{
        PaymentStatus, Registration, RegistrationFilter, RegistrationRepository,
        RegistrationStatus,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, SqlErr, prelude::Expr,
};

use crate::mapping::{model_to_registration, registration_to_active_model};

pub struct RegistrationRepositoryImpl {
    db: DatabaseConnection,
}

impl RegistrationRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn exists(&self, id: RegistrationId) -> Result<bool, DbErr> {
        Ok(registration::Entity::find_by_id(id.0)
            .one(&self.db)
            .await?
            .is_some())
    }

    fn to_registrations(models: Vec<registration::Model>) -> Result<Vec<Registration>, RepoError> {
        models
            .into_iter()
            .map(|m| model_to_registration(m).map_err(RepoError::StorageError))
            .collect()
    }
}

#[async_trait::async_trait]
impl RegistrationRepository for RegistrationRepositoryImpl {
    async fn create_registration(&self, registration: Registration) -> Result<(), RepoCreateError> {
        let model =
            registration_to_active_model(&registration).map_err(RepoCreateError::StorageError)?;
        // The unique (tournament, active_user) and (tournament, active_team_name)
        // indexes reject duplicates atomically.
        match model.insert(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(RepoCreateError::Conflict),
                _ => Err(RepoCreateError::StorageError(e.to_string())),
            },
        }
    }

    async fn get_registration(
        &self,
        id: RegistrationId,
    ) -> Result<Registration, RepoRetrieveError> {
        let model = registration::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?
            .ok_or(RepoRetrieveError::NotFound)?;
        model_to_registration(model).map_err(RepoRetrieveError::StorageError)
    }

    async fn find_by_tournament_and_user(
        &self,
        tournament_id: TournamentId,
        user_id: &UserId,
    ) -> Result<Option<Registration>, RepoError> {
        let model = registration::Entity::find()
            .filter(registration::Column::TournamentId.eq(tournament_id.0))
            .filter(registration::Column::ActiveUser.eq(user_id.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        model
            .map(|m| model_to_registration(m).map_err(RepoError::StorageError))
            .transpose()
    }

    async fn find_by_tournament(
        &self,
        tournament_id: TournamentId,
        filter: RegistrationFilter,
    ) -> Result<Vec<Registration>, RepoError> {
        let mut query = registration::Entity::find()
            .filter(registration::Column::TournamentId.eq(tournament_id.0));
        if let Some(user_id) = &filter.user_id {
            query = query.filter(registration::Column::UserId.eq(user_id.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(registration::Column::Status.eq(status.as_str()));
        }
        let models = query
            .order_by_asc(registration::Column::RegistrationDate)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Self::to_registrations(models)
    }

    async fn update_status(
        &self,
        id: RegistrationId,
        expected: RegistrationStatus,
        status: RegistrationStatus,
    ) -> Result<(), RepoUpdateError> {
        let mut query = registration::Entity::update_many()
            .col_expr(registration::Column::Status, Expr::value(status.as_str()));
        if !status.is_active() {
            query = query
                .col_expr(
                    registration::Column::ActiveUser,
                    Expr::value(Option::<String>::None),
                )
                .col_expr(
                    registration::Column::ActiveTeamName,
                    Expr::value(Option::<String>::None),
                );
        }
        let res = query
            .filter(registration::Column::Id.eq(id.0))
            .filter(registration::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        if res.rows_affected > 0 {
            return Ok(());
        }
        match self.exists(id).await {
            Ok(true) => Err(RepoUpdateError::Conflict),
            Ok(false) => Err(RepoUpdateError::NotFound),
            Err(e) => Err(RepoUpdateError::StorageError(e.to_string())),
        }
    }

    async fn update_payment(
        &self,
        id: RegistrationId,
        payment_status: PaymentStatus,
        transaction_id: Option<String>,
    ) -> Result<(), RepoUpdateError> {
        let mut query = registration::Entity::update_many().col_expr(
            registration::Column::PaymentStatus,
            Expr::value(payment_status.as_str()),
        );
        if let Some(transaction_id) = transaction_id {
            query = query.col_expr(
                registration::Column::TransactionId,
                Expr::value(transaction_id),
            );
        }
        let res = query
            .filter(registration::Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        if res.rows_affected > 0 {
            return Ok(());
        }
        // MySQL reports unchanged rows as unaffected.
        match self.exists(id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(RepoUpdateError::NotFound),
            Err(e) => Err(RepoUpdateError::StorageError(e.to_string())),
        }
    }

    async fn delete_registration(
        &self,
        id: RegistrationId,
        expected: RegistrationStatus,
    ) -> Result<(), RepoUpdateError> {
        let res = registration::Entity::delete_many()
            .filter(registration::Column::Id.eq(id.0))
            .filter(registration::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        if res.rows_affected > 0 {
            return Ok(());
        }
        match self.exists(id).await {
            Ok(true) => Err(RepoUpdateError::Conflict),
            Ok(false) => Err(RepoUpdateError::NotFound),
            Err(e) => Err(RepoUpdateError::StorageError(e.to_string())),
        }
    }

    async fn delete_by_tournament(&self, tournament_id: TournamentId) -> Result<u64, RepoError> {
        let res = registration::Entity::delete_many()
            .filter(registration::Column::TournamentId.eq(tournament_id.0))
            .exec(&self.db)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(res.rows_affected)
    }
}
