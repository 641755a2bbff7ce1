use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Plant {
    pub id: Uuid,
    pub name: String,
    pub variety: String,
    pub photo_url: String,
    /// Raw form value, kept as entered.
    pub date_planted: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Harvest {
    pub id: Uuid,
    pub plant_id: Uuid,
    /// Formatted as "<amount> <plant name>" at creation time.
    pub quantity: String,
    pub date: String,
}

impl Plant {
    pub async fn create(
        db: &PgPool,
        name: &str,
        variety: &str,
        photo_url: &str,
        date_planted: &str,
    ) -> anyhow::Result<Plant> {
        let plant = sqlx::query_as::<_, Plant>(
            r#"
            INSERT INTO plants (name, variety, photo_url, date_planted)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, variety, photo_url, date_planted, created_at
            "#,
        )
        .bind(name)
        .bind(variety)
        .bind(photo_url)
        .bind(date_planted)
        .fetch_one(db)
        .await?;
        Ok(plant)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Plant>> {
        let plant = sqlx::query_as::<_, Plant>(
            r#"
            SELECT id, name, variety, photo_url, date_planted, created_at
            FROM plants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(plant)
    }

    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Plant>> {
        let plants = sqlx::query_as::<_, Plant>(
            r#"
            SELECT id, name, variety, photo_url, date_planted, created_at
            FROM plants
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(plants)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        name: &str,
        variety: &str,
        photo_url: &str,
        date_planted: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE plants
            SET name = $2, variety = $3, photo_url = $4, date_planted = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(variety)
        .bind(photo_url)
        .bind(date_planted)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Deletes the plant and every harvest referencing it, atomically.
    /// Unrelated plants and harvests are untouched.
    pub async fn delete_cascade(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        let mut tx = db.begin().await.context("begin plant delete")?;
        sqlx::query("DELETE FROM harvests WHERE plant_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("delete harvests")?;
        sqlx::query("DELETE FROM plants WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("delete plant")?;
        tx.commit().await.context("commit plant delete")?;
        Ok(())
    }
}

impl Harvest {
    pub fn quantity_string(amount: &str, plant_name: &str) -> String {
        format!("{} {}", amount, plant_name)
    }

    pub async fn create(
        db: &PgPool,
        plant_id: Uuid,
        quantity: &str,
        date: &str,
    ) -> anyhow::Result<Harvest> {
        let harvest = sqlx::query_as::<_, Harvest>(
            r#"
            INSERT INTO harvests (plant_id, quantity, date)
            VALUES ($1, $2, $3)
            RETURNING id, plant_id, quantity, date
            "#,
        )
        .bind(plant_id)
        .bind(quantity)
        .bind(date)
        .fetch_one(db)
        .await?;
        Ok(harvest)
    }

    pub async fn list_for_plant(db: &PgPool, plant_id: Uuid) -> anyhow::Result<Vec<Harvest>> {
        let harvests = sqlx::query_as::<_, Harvest>(
            r#"
            SELECT id, plant_id, quantity, date
            FROM harvests
            WHERE plant_id = $1
            "#,
        )
        .bind(plant_id)
        .fetch_all(db)
        .await?;
        Ok(harvests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_combines_amount_and_plant_name() {
        assert_eq!(Harvest::quantity_string("5", "Tomato"), "5 Tomato");
        assert_eq!(
            Harvest::quantity_string("2 baskets", "Runner Bean"),
            "2 baskets Runner Bean"
        );
    }

    #[sqlx::test]
    async fn create_then_fetch_roundtrip(pool: PgPool) {
        let created = Plant::create(
            &pool,
            "Tomato",
            "Roma",
            "https://example.com/tomato.jpg",
            "2026-04-01",
        )
        .await
        .unwrap();

        let fetched = Plant::find(&pool, created.id)
            .await
            .unwrap()
            .expect("created plant is fetchable by id");
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.name, "Tomato");
        assert_eq!(fetched.variety, "Roma");
        assert_eq!(fetched.photo_url, "https://example.com/tomato.jpg");
        assert_eq!(fetched.date_planted, "2026-04-01");
    }

    #[sqlx::test]
    async fn cascade_delete_spares_unrelated_rows(pool: PgPool) {
        let doomed = Plant::create(&pool, "Tomato", "Roma", "a.jpg", "2026-04-01")
            .await
            .unwrap();
        let kept = Plant::create(&pool, "Runner Bean", "Scarlet", "b.jpg", "2026-05-01")
            .await
            .unwrap();

        Harvest::create(&pool, doomed.id, "5 Tomato", "2026-08-01")
            .await
            .unwrap();
        Harvest::create(&pool, doomed.id, "2 Tomato", "2026-08-02")
            .await
            .unwrap();
        let kept_harvest = Harvest::create(&pool, kept.id, "1 Runner Bean", "2026-08-03")
            .await
            .unwrap();

        Plant::delete_cascade(&pool, doomed.id).await.unwrap();

        assert!(Plant::find(&pool, doomed.id).await.unwrap().is_none());
        assert!(Harvest::list_for_plant(&pool, doomed.id)
            .await
            .unwrap()
            .is_empty());

        assert!(Plant::find(&pool, kept.id).await.unwrap().is_some());
        let survivors = Harvest::list_for_plant(&pool, kept.id).await.unwrap();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].id, kept_harvest.id);
        assert_eq!(survivors[0].quantity, "1 Runner Bean");
    }
}
