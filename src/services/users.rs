//! Staff administration service

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User, UserClaims, UserQuery, UserStats},
    repository::Repository,
};

/// Who may apply an update to a staff record
fn check_update(claims: &UserClaims, id: i32, data: &UpdateUser) -> AppResult<()> {
    claims.require_self_or_admin(id)?;
    if data.role.is_some() && !claims.is_admin() {
        return Err(AppError::Authorization(
            "Only administrators can change roles".to_string(),
        ));
    }
    if data.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }
    Ok(())
}

fn check_delete(claims: &UserClaims, id: i32) -> AppResult<()> {
    claims.require_admin()?;
    if claims.user_id == id {
        return Err(AppError::BadRequest("You cannot delete your own account".to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    repository: Repository,
}

impl UserService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, claims: &UserClaims, query: &UserQuery) -> AppResult<Vec<User>> {
        claims.require_admin()?;
        self.repository.users.list(query).await
    }

    pub async fn get_by_id(&self, claims: &UserClaims, id: i32) -> AppResult<User> {
        claims.require_self_or_admin(id)?;
        self.repository.users.get_by_id(id).await
    }

    pub async fn create(&self, claims: &UserClaims, data: &CreateUser) -> AppResult<User> {
        claims.require_admin()?;
        let user = self.repository.users.create(data).await?;
        tracing::info!(
            user_id = user.id,
            role = %user.role,
            created_by = claims.user_id,
            "Staff member created"
        );
        Ok(user)
    }

    pub async fn update(&self, claims: &UserClaims, id: i32, data: &UpdateUser) -> AppResult<User> {
        check_update(claims, id, data)?;
        let user = self.repository.users.update(id, data).await?;
        tracing::info!(user_id = id, updated_by = claims.user_id, "Staff member updated");
        Ok(user)
    }

    pub async fn delete(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        check_delete(claims, id)?;
        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, deleted_by = claims.user_id, "Staff member deleted");
        Ok(())
    }

    pub async fn stats(&self, claims: &UserClaims, id: i32) -> AppResult<UserStats> {
        claims.require_self_or_admin(id)?;
        self.repository.users.stats(id).await
    }
}
