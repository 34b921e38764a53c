//! Users and subscription history

use echoread_core::{
    prepare_insert, prepare_patch, EntityPatch, InsertSubscription, SubscriptionPatch, UpsertUser,
    UserProfilePatch,
};

use super::Database;
use crate::error::{Result, StoreError};
use crate::models::*;

impl Database {
    // === User Repository ===

    /// Create a user or refresh the profile of an existing one.
    ///
    /// `subscription_type` is only written when the row is created; an
    /// existing user's tier and reading stats are left alone.
    pub async fn upsert_user(&self, user: UpsertUser) -> Result<User> {
        let user = prepare_insert(user)?;

        let sql = format!(
            r#"
            INSERT INTO users (id, email, first_name, last_name, profile_image_url,
                               subscription_type)
            VALUES (COALESCE($1, gen_random_uuid()::text), $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                profile_image_url = EXCLUDED.profile_image_url,
                updated_at = NOW()
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, DbUser>(&sql)
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.profile_image_url)
            .bind(user.subscription_type.as_str())
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(user_id = %row.id, "Upserted user");
        Ok(row.into())
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, DbUser>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, DbUser>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Merge a profile patch into an existing user.
    pub async fn update_user_profile(&self, id: &str, patch: UserProfilePatch) -> Result<User> {
        let patch = prepare_patch::<User, _>(patch)?;
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM users WHERE id = $1 FOR UPDATE", USER_COLUMNS);
        let mut user: User = sqlx::query_as::<_, DbUser>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("user", id))?
            .into();

        // An unrecognised stored tier reads as free; only overwrite it when asked to.
        let tier = patch.subscription_type.map(|tier| tier.as_str());
        patch.apply(&mut user);

        let sql = format!(
            r#"
            UPDATE users
            SET email = $2, first_name = $3, last_name = $4, profile_image_url = $5,
                subscription_type = COALESCE($6, subscription_type),
                subscription_expires_at = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, DbUser>(&sql)
            .bind(id)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.profile_image_url)
            .bind(tier)
            .bind(user.subscription_expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    // === Subscription Repository ===

    pub async fn create_subscription(
        &self,
        subscription: InsertSubscription,
    ) -> Result<Subscription> {
        let subscription = prepare_insert(subscription)?;

        let sql = format!(
            r#"
            INSERT INTO subscriptions (user_id, type, status, start_date, end_date, amount,
                                       currency, payment_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            SUBSCRIPTION_COLUMNS
        );
        let row = sqlx::query_as::<_, DbSubscription>(&sql)
            .bind(&subscription.user_id)
            .bind(subscription.plan.as_str())
            .bind(subscription.status.as_str())
            .bind(subscription.start_date)
            .bind(subscription.end_date)
            .bind(subscription.amount)
            .bind(&subscription.currency)
            .bind(&subscription.payment_id)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(
            user_id = %row.user_id,
            plan = %row.plan,
            "Recorded subscription"
        );
        row.try_into()
    }

    /// The newest active subscription whose end date is still ahead.
    pub async fn get_active_subscription(&self, user_id: &str) -> Result<Option<Subscription>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM subscriptions
            WHERE user_id = $1 AND status = 'active' AND end_date > NOW()
            ORDER BY start_date DESC
            LIMIT 1
            "#,
            SUBSCRIPTION_COLUMNS
        );
        let row = sqlx::query_as::<_, DbSubscription>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Subscription::try_from).transpose()
    }

    /// Full subscription history, newest first.
    pub async fn list_subscriptions_for_user(&self, user_id: &str) -> Result<Vec<Subscription>> {
        let sql = format!(
            "SELECT {} FROM subscriptions WHERE user_id = $1 ORDER BY start_date DESC",
            SUBSCRIPTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, DbSubscription>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        subscriptions_from_rows(rows)
    }

    pub async fn update_subscription(
        &self,
        id: &str,
        patch: SubscriptionPatch,
    ) -> Result<Subscription> {
        let patch = prepare_patch::<Subscription, _>(patch)?;
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {} FROM subscriptions WHERE id = $1 FOR UPDATE",
            SUBSCRIPTION_COLUMNS
        );
        let mut subscription: Subscription = sqlx::query_as::<_, DbSubscription>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("subscription", id))?
            .try_into()?;

        patch.apply(&mut subscription);

        let sql = format!(
            r#"
            UPDATE subscriptions
            SET status = $2, end_date = $3, amount = $4, payment_id = $5
            WHERE id = $1
            RETURNING {}
            "#,
            SUBSCRIPTION_COLUMNS
        );
        let row = sqlx::query_as::<_, DbSubscription>(&sql)
            .bind(id)
            .bind(subscription.status.as_str())
            .bind(subscription.end_date)
            .bind(subscription.amount)
            .bind(&subscription.payment_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        row.try_into()
    }
}
