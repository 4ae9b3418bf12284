use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create reservations table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reservations (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL,
            space_id UUID NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'pending',
            total_price BIGINT NOT NULL,
            date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            cancelled_at TIMESTAMP WITH TIME ZONE NULL,
            CONSTRAINT reservations_valid_time_range CHECK (end_time > start_time),
            CONSTRAINT reservations_non_negative_price CHECK (total_price >= 0),
            CONSTRAINT reservations_known_status CHECK (
                status IN ('pending', 'confirmed', 'rejected', 'cancelled', 'done')
            )
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create reservation_details table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reservation_details (
            id UUID PRIMARY KEY,
            reservation_id UUID NOT NULL REFERENCES reservations(id) ON DELETE CASCADE,
            space_service_id UUID NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create bookings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL,
            space_id UUID NOT NULL,
            total_price BIGINT NOT NULL,
            date DATE NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT bookings_valid_time_range CHECK (end_time > start_time),
            CONSTRAINT bookings_non_negative_price CHECK (total_price >= 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create booking_services table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS booking_services (
            id UUID PRIMARY KEY,
            booking_id UUID NOT NULL REFERENCES bookings(id) ON DELETE CASCADE,
            space_service_id UUID NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity >= 1),
            price BIGINT NOT NULL CHECK (price >= 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_reservations_space_date ON reservations(space_id, date)",
        "CREATE INDEX IF NOT EXISTS idx_reservations_user_id ON reservations(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_reservations_status ON reservations(status)",
        "CREATE INDEX IF NOT EXISTS idx_reservation_details_reservation_id ON reservation_details(reservation_id)",
        "CREATE INDEX IF NOT EXISTS idx_bookings_space_date ON bookings(space_id, date)",
        "CREATE INDEX IF NOT EXISTS idx_bookings_user_id ON bookings(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_booking_services_booking_id ON booking_services(booking_id)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
