//! Business logic services

pub mod availability;
pub mod items;
pub mod lending;
pub mod messages;
pub mod notifications;

use std::sync::Arc;

use crate::{config::LendingConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub items: items::ItemsService,
    pub lending: lending::LendingService,
    pub messages: messages::MessagesService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, lending_config: LendingConfig) -> Self {
        let lending = lending::LendingService::new(
            Arc::new(repository.items.clone()),
            Arc::new(repository.availabilities.clone()),
            Arc::new(repository.lending.clone()),
            Arc::new(repository.messages.clone()),
            Arc::new(repository.users.clone()),
            lending_config,
        );

        let items = items::ItemsService::new(
            Arc::new(repository.items.clone()),
            Arc::new(repository.availabilities.clone()),
        );

        let messages = messages::MessagesService::new(
            Arc::new(repository.messages.clone()),
            Arc::new(repository.messages.clone()),
            Arc::new(repository.users.clone()),
        );

        Self {
            items,
            lending,
            messages,
            repository,
        }
    }

    /// Check that the backing database answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
