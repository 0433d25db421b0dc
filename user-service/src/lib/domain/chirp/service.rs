use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::chirp::errors::ChirpError;
use crate::domain::chirp::models::Chirp;
use crate::domain::chirp::models::ChirpId;
use crate::domain::chirp::models::CreateChirpCommand;
use crate::domain::chirp::models::ListChirpsQuery;
use crate::domain::chirp::ports::ChirpRepository;
use crate::domain::chirp::ports::ChirpServicePort;
use crate::domain::user::models::UserId;

/// Domain service implementation for chirp operations.
pub struct ChirpService<CR>
where
    CR: ChirpRepository,
{
    repository: Arc<CR>,
}

impl<CR> ChirpService<CR>
where
    CR: ChirpRepository,
{
    pub fn new(repository: Arc<CR>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<CR> ChirpServicePort for ChirpService<CR>
where
    CR: ChirpRepository,
{
    async fn create_chirp(&self, command: CreateChirpCommand) -> Result<Chirp, ChirpError> {
        let now = Utc::now();
        let chirp = Chirp {
            id: ChirpId::new(),
            body: command.body,
            author_id: command.author_id,
            created_at: now,
            updated_at: now,
        };

        let created_chirp = self.repository.create(chirp).await?;
        tracing::info!(
            chirp_id = %created_chirp.id,
            author_id = %created_chirp.author_id,
            "Chirp created"
        );

        Ok(created_chirp)
    }

    async fn get_chirp(&self, id: &ChirpId) -> Result<Chirp, ChirpError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ChirpError::NotFound(id.to_string()))
    }

    async fn list_chirps(&self, query: ListChirpsQuery) -> Result<Vec<Chirp>, ChirpError> {
        self.repository.list(&query).await
    }

    async fn delete_chirp(&self, id: &ChirpId, requester: &UserId) -> Result<(), ChirpError> {
        let chirp = self.get_chirp(id).await?;

        if chirp.author_id != *requester {
            tracing::warn!(
                chirp_id = %id,
                requester = %requester,
                "Chirp deletion refused: not the author"
            );
            return Err(ChirpError::Forbidden);
        }

        self.repository.delete(id).await?;
        tracing::info!(chirp_id = %id, "Chirp deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;
    use crate::domain::chirp::models::ChirpBody;
    use crate::domain::chirp::models::SortOrder;

    mock! {
        pub TestChirpRepository {}

        #[async_trait]
        impl ChirpRepository for TestChirpRepository {
            async fn create(&self, chirp: Chirp) -> Result<Chirp, ChirpError>;
            async fn find_by_id(&self, id: &ChirpId) -> Result<Option<Chirp>, ChirpError>;
            async fn list(&self, query: &ListChirpsQuery) -> Result<Vec<Chirp>, ChirpError>;
            async fn delete(&self, id: &ChirpId) -> Result<(), ChirpError>;
        }
    }

    fn chirp_by(author_id: UserId) -> Chirp {
        Chirp {
            id: ChirpId::new(),
            body: ChirpBody::new("Say my name.".to_string()).unwrap(),
            author_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_chirp_success() {
        let mut repository = MockTestChirpRepository::new();
        let author_id = UserId::new();

        repository
            .expect_create()
            .withf(move |chirp| chirp.author_id == author_id && chirp.body.as_str() == "Say my name.")
            .times(1)
            .returning(|chirp| Ok(chirp));

        let service = ChirpService::new(Arc::new(repository));

        let chirp = service
            .create_chirp(CreateChirpCommand {
                body: ChirpBody::new("Say my name.".to_string()).unwrap(),
                author_id,
            })
            .await
            .unwrap();

        assert_eq!(chirp.author_id, author_id);
        assert_eq!(chirp.created_at, chirp.updated_at);
    }

    #[tokio::test]
    async fn test_get_chirp_not_found() {
        let mut repository = MockTestChirpRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = ChirpService::new(Arc::new(repository));

        let result = service.get_chirp(&ChirpId::new()).await;
        assert!(matches!(result.unwrap_err(), ChirpError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_chirps_passes_filter_through() {
        let mut repository = MockTestChirpRepository::new();
        let author_id = UserId::new();
        let returned = vec![chirp_by(author_id)];

        repository
            .expect_list()
            .withf(move |query| {
                query.author_id == Some(author_id) && query.sort == SortOrder::Descending
            })
            .times(1)
            .returning(move |_| Ok(returned.clone()));

        let service = ChirpService::new(Arc::new(repository));

        let chirps = service
            .list_chirps(ListChirpsQuery {
                author_id: Some(author_id),
                sort: SortOrder::Descending,
            })
            .await
            .unwrap();
        assert_eq!(chirps.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_chirp_by_author() {
        let mut repository = MockTestChirpRepository::new();
        let author_id = UserId::new();
        let chirp = chirp_by(author_id);
        let chirp_id = chirp.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(chirp.clone())));
        repository
            .expect_delete()
            .withf(move |id| *id == chirp_id)
            .times(1)
            .returning(|_| Ok(()));

        let service = ChirpService::new(Arc::new(repository));

        assert!(service.delete_chirp(&chirp_id, &author_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_chirp_by_other_user_is_forbidden() {
        let mut repository = MockTestChirpRepository::new();
        let chirp = chirp_by(UserId::new());
        let chirp_id = chirp.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(chirp.clone())));
        repository.expect_delete().times(0);

        let service = ChirpService::new(Arc::new(repository));

        let result = service.delete_chirp(&chirp_id, &UserId::new()).await;
        assert!(matches!(result.unwrap_err(), ChirpError::Forbidden));
    }

    #[tokio::test]
    async fn test_delete_unknown_chirp() {
        let mut repository = MockTestChirpRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_delete().times(0);

        let service = ChirpService::new(Arc::new(repository));

        let result = service.delete_chirp(&ChirpId::new(), &UserId::new()).await;
        assert!(matches!(result.unwrap_err(), ChirpError::NotFound(_)));
    }
}
