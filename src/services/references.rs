//! Reference resolution on write and batch expansion on read.
//!
//! Records store bare id arrays. Writes check that every reference exists;
//! reads join the referenced records in one batch per kind and silently drop
//! ids whose target has since been deleted.

use std::collections::HashMap;

use bson::oid::ObjectId;

use crate::error::{AppError, AppResult};
use crate::models::{
    CollectionResponse, Project, ProjectCollection, ProjectResponse, TagSummary,
};
use crate::repositories::Store;

/// Map normalized tag names to ids, failing on the first write that names an
/// unknown tag. Order follows `names`.
pub async fn resolve_tag_names(store: &dyn Store, names: &[String]) -> AppResult<Vec<ObjectId>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let found: HashMap<String, ObjectId> = store
        .find_tags_by_names(names)
        .await?
        .into_iter()
        .map(|t| (t.name, t.id))
        .collect();

    let missing: Vec<&str> = names
        .iter()
        .filter(|n| !found.contains_key(n.as_str()))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Tags not found: {}",
            missing.join(", ")
        )));
    }

    Ok(names.iter().filter_map(|n| found.get(n).copied()).collect())
}

pub async fn ensure_projects_exist(store: &dyn Store, ids: &[ObjectId]) -> AppResult<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let found: Vec<ObjectId> = store
        .find_projects_by_ids(ids)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    let missing: Vec<String> = ids
        .iter()
        .filter(|id| !found.contains(id))
        .map(|id| id.to_hex())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Projects not found: {}",
            missing.join(", ")
        )));
    }

    Ok(())
}

/// Expand tag references for a batch of projects with a single tag lookup
pub async fn expand_projects(
    store: &dyn Store,
    projects: Vec<Project>,
) -> AppResult<Vec<ProjectResponse>> {
    let mut tag_ids: Vec<ObjectId> = projects.iter().flat_map(|p| p.tags.clone()).collect();
    tag_ids.sort();
    tag_ids.dedup();

    let tags: HashMap<ObjectId, TagSummary> = store
        .find_tags_by_ids(&tag_ids)
        .await?
        .iter()
        .map(|t| (t.id, TagSummary::from(t)))
        .collect();

    Ok(projects
        .into_iter()
        .map(|p| {
            let expanded = p.tags.iter().filter_map(|id| tags.get(id).cloned()).collect();
            ProjectResponse::new(p, expanded)
        })
        .collect())
}

pub async fn expand_project(store: &dyn Store, project: Project) -> AppResult<ProjectResponse> {
    expand_projects(store, vec![project])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Project expansion lost its record".to_string()))
}

/// Expand project references (and their tags) for a batch of collections
pub async fn expand_collections(
    store: &dyn Store,
    collections: Vec<ProjectCollection>,
) -> AppResult<Vec<CollectionResponse>> {
    let mut project_ids: Vec<ObjectId> = collections
        .iter()
        .flat_map(|c| c.projects.clone())
        .collect();
    project_ids.sort();
    project_ids.dedup();

    let projects = store.find_projects_by_ids(&project_ids).await?;
    let expanded: HashMap<String, ProjectResponse> = expand_projects(store, projects)
        .await?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    Ok(collections
        .into_iter()
        .map(|c| {
            let projects = c
                .projects
                .iter()
                .filter_map(|id| expanded.get(&id.to_hex()).cloned())
                .collect();
            CollectionResponse::new(c, projects)
        })
        .collect())
}

pub async fn expand_collection(
    store: &dyn Store,
    collection: ProjectCollection,
) -> AppResult<CollectionResponse> {
    expand_collections(store, vec![collection])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Collection expansion lost its record".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tag;
    use crate::repositories::{now, InMemoryStore, ProjectStore, TagStore};

    fn tag(name: &str) -> Tag {
        Tag {
            id: ObjectId::new(),
            name: name.to_string(),
            color: "#61dafb".to_string(),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn project(tags: Vec<ObjectId>) -> Project {
        Project {
            id: ObjectId::new(),
            name: "Portfolio".to_string(),
            description: None,
            stack: vec![],
            tags,
            image_url: String::new(),
            created_at: now(),
            updated_at: now(),
        }
    }

    #[tokio::test]
    async fn test_unknown_tag_names_are_listed() {
        let store = InMemoryStore::new();
        store.insert_tag(&tag("react")).await.unwrap();

        let names = vec!["react".to_string(), "vue".to_string(), "svelte".to_string()];
        let err = resolve_tag_names(&store, &names).await.unwrap_err();
        assert_eq!(err.public_message(), "Tags not found: vue, svelte");
    }

    #[tokio::test]
    async fn test_tag_ids_follow_name_order() {
        let store = InMemoryStore::new();
        let react = tag("react");
        let rust = tag("rust");
        store.insert_tag(&react).await.unwrap();
        store.insert_tag(&rust).await.unwrap();

        let ids = resolve_tag_names(&store, &["rust".to_string(), "react".to_string()])
            .await
            .unwrap();
        assert_eq!(ids, vec![rust.id, react.id]);
    }

    #[tokio::test]
    async fn test_missing_projects_are_listed() {
        let store = InMemoryStore::new();
        let existing = project(vec![]);
        store.insert_project(&existing).await.unwrap();
        let ghost = ObjectId::new();

        let err = ensure_projects_exist(&store, &[existing.id, ghost])
            .await
            .unwrap_err();
        assert_eq!(
            err.public_message(),
            format!("Projects not found: {}", ghost.to_hex())
        );
    }

    #[tokio::test]
    async fn test_dangling_tags_are_dropped() {
        let store = InMemoryStore::new();
        let react = tag("react");
        store.insert_tag(&react).await.unwrap();

        let view = expand_project(&store, project(vec![ObjectId::new(), react.id]))
            .await
            .unwrap();
        assert_eq!(view.tags.len(), 1);
        assert_eq!(view.tags[0].name, "react");
    }

    #[tokio::test]
    async fn test_collection_counts_resolved_projects() {
        let store = InMemoryStore::new();
        let kept = project(vec![]);
        store.insert_project(&kept).await.unwrap();

        let collection = ProjectCollection {
            id: ObjectId::new(),
            name: "Highlights".to_string(),
            description: String::new(),
            cover: String::new(),
            projects: vec![ObjectId::new(), kept.id],
            created_at: now(),
            updated_at: now(),
        };

        let view = expand_collection(&store, collection).await.unwrap();
        assert_eq!(view.projects_count, 1);
        assert_eq!(view.projects[0].id, kept.id.to_hex());
    }
}
