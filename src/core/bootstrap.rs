use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

/// Creates the configured administrator, or restores its role and password.
pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let email = admin.first_superuser_email.trim().to_lowercase();
    let now = primitive_now_utc();

    if let Some(user) = repositories::users::find_by_email(state.db(), &email).await? {
        let password_matches =
            security::verify_password(&admin.first_superuser_password, &user.hashed_password)
                .unwrap_or(false);

        if password_matches && user.role == UserRole::Admin {
            tracing::info!("Default superuser already up to date");
            return Ok(());
        }

        let hashed_password = if password_matches {
            user.hashed_password.clone()
        } else {
            security::hash_password(&admin.first_superuser_password)?
        };
        repositories::users::update_credentials(
            state.db(),
            &user.id,
            &hashed_password,
            UserRole::Admin,
            now,
        )
        .await?;

        tracing::info!(email = %email, "Updated default superuser");
        return Ok(());
    }

    let id = Uuid::new_v4().to_string();
    repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &id,
            email: &email,
            full_name: Some("Super Admin"),
            hashed_password: security::hash_password(&admin.first_superuser_password)?,
            role: UserRole::Admin,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    tracing::info!(email = %email, "Created default superuser");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ensure_superuser;
    use crate::core::security;
    use crate::db::types::UserRole;
    use crate::repositories;
    use crate::test_support;

    #[tokio::test]
    async fn creates_then_repairs_superuser() {
        let ctx = test_support::setup_test_context().await;
        let email = ctx.state.settings().admin().first_superuser_email.clone();

        ensure_superuser(&ctx.state).await.expect("first run");
        let created = repositories::users::find_by_email(ctx.state.db(), &email)
            .await
            .expect("lookup")
            .expect("superuser exists");
        assert_eq!(created.role, UserRole::Admin);

        sqlx::query("UPDATE users SET role = 'student', hashed_password = 'broken' WHERE id = $1")
            .bind(&created.id)
            .execute(ctx.state.db())
            .await
            .expect("demote");

        ensure_superuser(&ctx.state).await.expect("second run");
        let repaired = repositories::users::find_by_email(ctx.state.db(), &email)
            .await
            .expect("lookup")
            .expect("superuser exists");
        assert_eq!(repaired.id, created.id);
        assert_eq!(repaired.role, UserRole::Admin);
        assert!(security::verify_password(
            &ctx.state.settings().admin().first_superuser_password,
            &repaired.hashed_password
        )
        .expect("verify"));
    }
}
