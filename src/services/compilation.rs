//! Curated compilation service

use tracing::{debug, info};

use crate::database::repositories::{CompilationRepository, EventRepository};
use crate::models::compilation::{
    Compilation, CompilationDto, NewCompilationRequest, UpdateCompilationRequest,
};
use crate::models::event::EventDto;
use crate::utils::errors::{EventBoardError, Result};

/// Compilation service for curated event selections
#[derive(Clone)]
pub struct CompilationService {
    compilations: CompilationRepository,
    events: EventRepository,
}

impl CompilationService {
    /// Create a new CompilationService instance
    pub fn new(compilations: CompilationRepository, events: EventRepository) -> Self {
        Self {
            compilations,
            events,
        }
    }

    /// Create a compilation; every member event must exist
    pub async fn create_compilation(
        &self,
        request: NewCompilationRequest,
    ) -> Result<CompilationDto> {
        debug!(title = %request.title, "Creating compilation");

        let event_ids = request.events.unwrap_or_default();
        self.ensure_events_exist(&event_ids).await?;

        let compilation = self
            .compilations
            .create(&request.title, request.pinned.unwrap_or(false))
            .await?;
        self.compilations.set_events(compilation.id, &event_ids).await?;

        info!(compilation_id = compilation.id, "Compilation created");
        self.to_dto(compilation).await
    }

    /// Patch a compilation's title, pinned flag or member set
    pub async fn update_compilation(
        &self,
        compilation_id: i64,
        request: UpdateCompilationRequest,
    ) -> Result<CompilationDto> {
        let mut compilation = self
            .compilations
            .find_by_id(compilation_id)
            .await?
            .ok_or(EventBoardError::CompilationNotFound { compilation_id })?;

        if let Some(title) = request.title {
            compilation.title = title;
        }
        if let Some(pinned) = request.pinned {
            compilation.pinned = pinned;
        }
        let compilation = self.compilations.update(&compilation).await?;

        if let Some(event_ids) = request.events {
            self.ensure_events_exist(&event_ids).await?;
            self.compilations.set_events(compilation_id, &event_ids).await?;
        }

        self.to_dto(compilation).await
    }

    /// Delete a compilation
    pub async fn delete_compilation(&self, compilation_id: i64) -> Result<()> {
        if !self.compilations.delete(compilation_id).await? {
            return Err(EventBoardError::CompilationNotFound { compilation_id });
        }
        info!(compilation_id = compilation_id, "Compilation deleted");
        Ok(())
    }

    /// Compilation by id, with member events resolved
    pub async fn get_compilation(&self, compilation_id: i64) -> Result<CompilationDto> {
        let compilation = self
            .compilations
            .find_by_id(compilation_id)
            .await?
            .ok_or(EventBoardError::CompilationNotFound { compilation_id })?;
        self.to_dto(compilation).await
    }

    /// Paginated compilation listing, optionally filtered by pinned flag
    pub async fn get_compilations(
        &self,
        pinned: Option<bool>,
        from: Option<i64>,
        size: Option<i64>,
    ) -> Result<Vec<CompilationDto>> {
        let compilations = self
            .compilations
            .list(pinned, size.unwrap_or(10), from.unwrap_or(0))
            .await?;

        let mut dtos = Vec::with_capacity(compilations.len());
        for compilation in compilations {
            dtos.push(self.to_dto(compilation).await?);
        }
        Ok(dtos)
    }

    async fn ensure_events_exist(&self, event_ids: &[i64]) -> Result<()> {
        let found = self.events.find_details_by_ids(event_ids).await?;
        if let Some(missing) = event_ids
            .iter()
            .find(|id| !found.iter().any(|e| e.id == **id))
        {
            return Err(EventBoardError::EventNotFound { event_id: *missing });
        }
        Ok(())
    }

    async fn to_dto(&self, compilation: Compilation) -> Result<CompilationDto> {
        let event_ids = self.compilations.event_ids(compilation.id).await?;
        let events: Vec<EventDto> = self
            .events
            .find_details_by_ids(&event_ids)
            .await?
            .into_iter()
            .map(EventDto::from)
            .collect();

        Ok(CompilationDto {
            id: compilation.id,
            title: compilation.title,
            pinned: compilation.pinned,
            events,
        })
    }
}
