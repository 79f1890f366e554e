//! Computer administration. Rate changes apply to sessions started after
//! the change; a running session keeps the rate it logged in with.

use tracing::info;

use netcafe_core::validation::{validate_computer_name, validate_rate};
use netcafe_core::{new_id, Computer, CoreError, Money, ValidationError};
use netcafe_store::Stores;

use crate::error::EngineResult;

#[derive(Debug)]
pub struct ComputerService {
    stores: Stores,
}

impl ComputerService {
    pub fn new(stores: Stores) -> Self {
        ComputerService { stores }
    }

    pub async fn register(&self, name: &str, rate_per_hour: Money) -> EngineResult<Computer> {
        validate_computer_name(name)?;
        validate_rate(rate_per_hour)?;

        let name = name.trim();
        let taken = self
            .stores
            .computers
            .find_all()
            .await?
            .iter()
            .any(|c| c.name == name);
        if taken {
            return Err(ValidationError::Duplicate {
                field: "computer name".to_string(),
                value: name.to_string(),
            }
            .into());
        }

        let computer = Computer {
            id: new_id(),
            name: name.to_string(),
            rate_per_hour,
            is_occupied: false,
        };
        self.stores.computers.save(&computer).await?;

        info!(computer = %computer.name, rate = %rate_per_hour, "Computer registered");
        Ok(computer)
    }

    pub async fn update_rate(&self, id: &str, rate_per_hour: Money) -> EngineResult<Computer> {
        validate_rate(rate_per_hour)?;

        let mut computer = self.find(id).await?;
        computer.rate_per_hour = rate_per_hour;
        self.stores.computers.save(&computer).await?;

        info!(computer = %computer.name, rate = %rate_per_hour, "Computer rate updated");
        Ok(computer)
    }

    pub async fn find(&self, id: &str) -> EngineResult<Computer> {
        self.stores
            .computers
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ComputerNotFound(id.to_string()).into())
    }

    pub async fn list(&self) -> EngineResult<Vec<Computer>> {
        Ok(self.stores.computers.find_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_update_rate() {
        let service = ComputerService::new(Stores::in_memory());
        let pc = service.register("PC-1", Money::from_minor(10_000)).await.unwrap();
        assert!(!pc.is_occupied);

        let updated = service.update_rate(&pc.id, Money::from_minor(12_000)).await.unwrap();
        assert_eq!(updated.rate_per_hour, Money::from_minor(12_000));
        assert_eq!(service.list().await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn test_duplicate_name_and_validation() {
        let service = ComputerService::new(Stores::in_memory());
        service.register("PC-1", Money::from_minor(10_000)).await.unwrap();

        let err = service.register("PC-1", Money::from_minor(10_000)).await.unwrap_err();
        assert!(matches!(
            err.core_error(),
            Some(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
        assert!(service.register("PC-2", Money::from_minor(-1)).await.is_err());
        assert!(service.register("", Money::zero()).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_computer() {
        let service = ComputerService::new(Stores::in_memory());
        let err = service.update_rate("missing", Money::zero()).await.unwrap_err();
        assert!(matches!(err.core_error(), Some(CoreError::ComputerNotFound(_))));
    }
}
