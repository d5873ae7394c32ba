use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create availability_slots table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS availability_slots (
            counsellor_id VARCHAR(255) NOT NULL,
            date_key VARCHAR(32) NOT NULL,
            time VARCHAR(16) NOT NULL,
            booked BOOLEAN NOT NULL DEFAULT FALSE,
            booked_by VARCHAR(255) NULL,
            session_id UUID NULL,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            version BIGINT NOT NULL DEFAULT 1,
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            PRIMARY KEY (counsellor_id, date_key, time),
            CONSTRAINT booked_has_session CHECK (booked = (session_id IS NOT NULL))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create appointments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id UUID PRIMARY KEY,
            student_id VARCHAR(255) NOT NULL,
            counsellor_id VARCHAR(255) NOT NULL,
            date_key VARCHAR(32) NOT NULL,
            time VARCHAR(16) NOT NULL,
            status VARCHAR(32) NOT NULL,
            student_name VARCHAR(255) NULL,
            student_email VARCHAR(255) NULL,
            counsellor_name VARCHAR(255) NULL,
            reason TEXT NULL,
            version BIGINT NOT NULL DEFAULT 1,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create ratings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ratings (
            id UUID PRIMARY KEY,
            counsellor_id VARCHAR(255) NOT NULL,
            student_id VARCHAR(255) NOT NULL,
            appointment_id UUID NULL,
            stars SMALLINT NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_stars CHECK (stars BETWEEN 1 AND 5)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create counsellor_ratings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS counsellor_ratings (
            counsellor_id VARCHAR(255) PRIMARY KEY,
            rating_count BIGINT NOT NULL DEFAULT 0,
            rating_sum BIGINT NOT NULL DEFAULT 0,
            rating DOUBLE PRECISION NOT NULL DEFAULT 0,
            version BIGINT NOT NULL DEFAULT 1,
            CONSTRAINT non_negative_totals CHECK (rating_count >= 0 AND rating_sum >= 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create appointment_notes table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointment_notes (
            appointment_id UUID NOT NULL,
            counsellor_id VARCHAR(255) NOT NULL,
            text TEXT NOT NULL DEFAULT '',
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            PRIMARY KEY (appointment_id, counsellor_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create notifications table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id UUID PRIMARY KEY,
            user_id VARCHAR(255) NOT NULL,
            kind VARCHAR(64) NOT NULL,
            title VARCHAR(255) NOT NULL,
            body TEXT NOT NULL,
            appointment_id UUID NOT NULL,
            status VARCHAR(32) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            read BOOLEAN NOT NULL DEFAULT FALSE
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes, one statement per query
    for statement in [
        // At most one live appointment per slot
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_appointments_active_slot \
         ON appointments(counsellor_id, date_key, time) WHERE status <> 'cancelled'",
        "CREATE INDEX IF NOT EXISTS idx_appointments_counsellor_id ON appointments(counsellor_id)",
        "CREATE INDEX IF NOT EXISTS idx_ratings_counsellor_id ON ratings(counsellor_id)",
        "CREATE INDEX IF NOT EXISTS idx_notifications_user_id \
         ON notifications(user_id, created_at DESC)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
