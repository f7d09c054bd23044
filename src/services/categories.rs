use std::collections::{HashMap, HashSet, VecDeque};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::category::Category;
use crate::domain::types::CategoryId;
use crate::dto::attributes::AttributeDefinitionDto;
use crate::dto::categories::{CategoryDetailsDto, CategoryDto, CategoryTreeDto};
use crate::forms::categories::{
    AddCategoryFormPayload, DeleteCategoryFormPayload, SetCategoryStatusFormPayload,
    UpdateCategoryFormPayload,
};
use crate::repository::{AttributeDefinitionReader, CategoryReader, CategoryWriter};

use super::{ServiceError, ServiceResult};

/// Collects `root` plus every category reachable by following child links,
/// walking an adjacency map built from the given snapshot. Iterative with a
/// visited set, so corrupted hierarchies cannot loop or overflow.
pub(crate) fn descendant_closure(
    root: CategoryId,
    categories: &[Category],
) -> HashSet<CategoryId> {
    let mut children_of: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
    for category in categories {
        if let Some(parent_id) = category.parent_id {
            children_of.entry(parent_id).or_default().push(category.id);
        }
    }

    let mut closure = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);
    while let Some(current) = queue.pop_front() {
        if let Some(children) = children_of.get(&current) {
            for &child in children {
                if closure.insert(child) {
                    queue.push_back(child);
                }
            }
        }
    }

    closure
}

/// Walks the ancestor chain upward from `new_parent_id`, reporting whether
/// `id` occurs on it. The walk is bounded by a visited set so it terminates
/// even if the stored hierarchy already contains a cycle.
fn would_create_cycle<R>(
    id: CategoryId,
    new_parent_id: CategoryId,
    repo: &R,
) -> ServiceResult<bool>
where
    R: CategoryReader,
{
    let mut visited = HashSet::new();
    let mut current = Some(new_parent_id);

    while let Some(cursor) = current {
        if cursor == id {
            return Ok(true);
        }
        if !visited.insert(cursor) {
            break;
        }
        current = match repo.get_category_by_id(cursor) {
            Ok(category) => category.and_then(|c| c.parent_id),
            Err(e) => {
                log::error!("Failed to walk category ancestors: {e}");
                return Err(ServiceError::Internal);
            }
        };
    }

    Ok(false)
}

fn category_details<R>(category: Category, repo: &R) -> ServiceResult<CategoryDetailsDto>
where
    R: CategoryReader + AttributeDefinitionReader,
{
    let attributes = match repo.list_attributes_by_category(category.id) {
        Ok(attributes) => attributes,
        Err(e) => {
            log::error!("Failed to list category attributes: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let children = match repo.list_categories() {
        Ok(categories) => categories
            .into_iter()
            .filter(|c| c.parent_id == Some(category.id))
            .map(CategoryDto::from)
            .collect(),
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            return Err(ServiceError::Internal);
        }
    };

    Ok(CategoryDetailsDto {
        id: category.id.get(),
        name: category.name.into_inner(),
        parent_id: category.parent_id.map(|id| id.get()),
        status: category.status.as_str().to_string(),
        attributes: attributes
            .into_iter()
            .map(AttributeDefinitionDto::from)
            .collect(),
        children,
    })
}

pub fn create_category<R>(
    payload: AddCategoryFormPayload,
    repo: &R,
) -> ServiceResult<CategoryDetailsDto>
where
    R: CategoryReader + CategoryWriter + AttributeDefinitionReader,
{
    if let Some(parent_id) = payload.parent_id {
        match repo.get_category_by_id(parent_id) {
            Ok(Some(_)) => {}
            Ok(None) => return Err(ServiceError::NotFound),
            Err(e) => {
                log::error!("Failed to get parent category: {e}");
                return Err(ServiceError::Internal);
            }
        }
    }

    let (category, attributes) = payload.into_parts();
    let created = match repo.create_category(&category, &attributes) {
        Ok(created) => created,
        Err(e) => {
            log::error!("Failed to create category: {e}");
            return Err(ServiceError::Internal);
        }
    };

    category_details(created, repo)
}

pub fn get_category<R>(id: CategoryId, repo: &R) -> ServiceResult<CategoryDetailsDto>
where
    R: CategoryReader + AttributeDefinitionReader,
{
    let category = match repo.get_category_by_id(id) {
        Ok(Some(category)) => category,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category: {e}");
            return Err(ServiceError::Internal);
        }
    };

    category_details(category, repo)
}

/// The full catalog hierarchy: roots with their nested subtrees, built from
/// one category-set load grouped by parent.
pub fn category_tree<R>(repo: &R) -> ServiceResult<Vec<CategoryTreeDto>>
where
    R: CategoryReader,
{
    let categories = match repo.list_categories() {
        Ok(categories) => categories,
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let mut children_of: HashMap<CategoryId, Vec<&Category>> = HashMap::new();
    for category in &categories {
        if let Some(parent_id) = category.parent_id {
            children_of.entry(parent_id).or_default().push(category);
        }
    }

    let mut visited = HashSet::new();
    Ok(categories
        .iter()
        .filter(|c| c.parent_id.is_none())
        .map(|root| subtree(root, &children_of, &mut visited))
        .collect())
}

fn subtree(
    category: &Category,
    children_of: &HashMap<CategoryId, Vec<&Category>>,
    visited: &mut HashSet<CategoryId>,
) -> CategoryTreeDto {
    visited.insert(category.id);

    let mut children = Vec::new();
    if let Some(kids) = children_of.get(&category.id) {
        for kid in kids {
            if visited.contains(&kid.id) {
                continue;
            }
            children.push(subtree(kid, children_of, visited));
        }
    }

    CategoryTreeDto {
        id: category.id.get(),
        name: category.name.as_str().to_string(),
        status: category.status.as_str().to_string(),
        children,
    }
}

/// The chain of categories from the root down to `id`.
///
/// Walks `parent_id` upward keeping a visited set; a repeated id stops the
/// walk without error so a corrupted hierarchy still yields a usable path.
pub fn category_path<R>(id: CategoryId, repo: &R) -> ServiceResult<Vec<CategoryDto>>
where
    R: CategoryReader,
{
    let mut current = match repo.get_category_by_id(id) {
        Ok(Some(category)) => Some(category),
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let mut path = Vec::new();
    let mut visited = HashSet::new();

    while let Some(category) = current {
        if !visited.insert(category.id) {
            break;
        }
        let parent_id = category.parent_id;
        path.push(category);

        current = match parent_id {
            Some(parent_id) => match repo.get_category_by_id(parent_id) {
                Ok(parent) => parent,
                Err(e) => {
                    log::error!("Failed to get parent category: {e}");
                    return Err(ServiceError::Internal);
                }
            },
            None => None,
        };
    }

    path.reverse();
    Ok(path.into_iter().map(CategoryDto::from).collect())
}

pub fn update_category<R>(
    payload: UpdateCategoryFormPayload,
    repo: &R,
) -> ServiceResult<CategoryDetailsDto>
where
    R: CategoryReader + CategoryWriter + AttributeDefinitionReader,
{
    let category = match repo.get_category_by_id(payload.category_id) {
        Ok(Some(category)) => category,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category: {e}");
            return Err(ServiceError::Internal);
        }
    };

    if payload.parent_id != category.parent_id {
        if let Some(new_parent_id) = payload.parent_id {
            match repo.get_category_by_id(new_parent_id) {
                Ok(Some(_)) => {}
                Ok(None) => return Err(ServiceError::NotFound),
                Err(e) => {
                    log::error!("Failed to get parent category: {e}");
                    return Err(ServiceError::Internal);
                }
            }

            if would_create_cycle(payload.category_id, new_parent_id, repo)? {
                return Err(ServiceError::Conflict(
                    "parent assignment would create a cycle in the category hierarchy"
                        .to_string(),
                ));
            }
        }
    }

    if let Err(e) = repo.update_category(
        payload.category_id,
        &payload.name,
        payload.parent_id,
        payload.attributes.as_deref(),
    ) {
        log::error!("Failed to update category: {e}");
        return Err(ServiceError::Internal);
    }

    get_category(payload.category_id, repo)
}

pub fn set_category_status<R>(
    payload: SetCategoryStatusFormPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<CategoryDto>
where
    R: CategoryReader + CategoryWriter,
{
    if !user.can_moderate() {
        return Err(ServiceError::Unauthorized);
    }

    match repo.get_category_by_id(payload.category_id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category: {e}");
            return Err(ServiceError::Internal);
        }
    }

    if let Err(e) = repo.set_category_status(payload.category_id, payload.status) {
        log::error!("Failed to set category status: {e}");
        return Err(ServiceError::Internal);
    }

    match repo.get_category_by_id(payload.category_id) {
        Ok(Some(category)) => Ok(CategoryDto::from(category)),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to reload category: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn delete_category<R>(payload: DeleteCategoryFormPayload, repo: &R) -> ServiceResult<()>
where
    R: CategoryReader + CategoryWriter,
{
    match repo.get_category_by_id(payload.category_id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category: {e}");
            return Err(ServiceError::Internal);
        }
    }

    match repo.count_child_categories(payload.category_id) {
        Ok(0) => {}
        Ok(_) => {
            return Err(ServiceError::Conflict(
                "cannot delete a category with child categories".to_string(),
            ));
        }
        Err(e) => {
            log::error!("Failed to count child categories: {e}");
            return Err(ServiceError::Internal);
        }
    }

    match repo.count_crops_in_category(payload.category_id) {
        Ok(0) => {}
        Ok(_) => {
            return Err(ServiceError::Conflict(
                "cannot delete a category with associated crops".to_string(),
            ));
        }
        Err(e) => {
            log::error!("Failed to count crops in category: {e}");
            return Err(ServiceError::Internal);
        }
    }

    if let Err(e) = repo.delete_category(payload.category_id) {
        log::error!("Failed to delete category: {e}");
        return Err(ServiceError::Internal);
    }

    Ok(())
}

/// Removes every rejected category that has neither child categories nor
/// crops. Returns the number of categories deleted.
pub fn delete_rejected_categories<R>(
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<usize>
where
    R: CategoryReader + CategoryWriter,
{
    use crate::domain::types::CategoryStatus;

    if !user.can_moderate() {
        return Err(ServiceError::Unauthorized);
    }

    let categories = match repo.list_categories() {
        Ok(categories) => categories,
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let parents: HashSet<CategoryId> = categories.iter().filter_map(|c| c.parent_id).collect();

    let mut eligible = Vec::new();
    for category in categories
        .iter()
        .filter(|c| c.status == CategoryStatus::Rejected)
    {
        if parents.contains(&category.id) {
            continue;
        }
        match repo.count_crops_in_category(category.id) {
            Ok(0) => eligible.push(category.id),
            Ok(_) => {}
            Err(e) => {
                log::error!("Failed to count crops in category: {e}");
                return Err(ServiceError::Internal);
            }
        }
    }

    match repo.delete_categories(&eligible) {
        Ok(deleted) => Ok(deleted),
        Err(e) => {
            log::error!("Failed to delete rejected categories: {e}");
            Err(ServiceError::Internal)
        }
    }
}
