use async_trait::async_trait;
use mockall::mock;
use uuid::Uuid;
use waqitly_core::models::booking::{Booking, BookingFilter};
use waqitly_core::models::reservation::{Reservation, ReservationFilter};
use waqitly_core::repository::{
    BookingRepository, BookingUnit, ReservationRepository, ReservationUnit,
};

// Mock repositories for testing
mock! {
    pub ReservationRepo {}

    #[async_trait]
    impl ReservationRepository for ReservationRepo {
        async fn begin(&self) -> eyre::Result<Box<dyn ReservationUnit>>;

        async fn find_by_id(&self, id: Uuid) -> eyre::Result<Option<Reservation>>;

        async fn list(&self, filter: &ReservationFilter) -> eyre::Result<Vec<Reservation>>;
    }
}

mock! {
    pub BookingRepo {}

    #[async_trait]
    impl BookingRepository for BookingRepo {
        async fn begin(&self) -> eyre::Result<Box<dyn BookingUnit>>;

        async fn find_by_id(&self, id: Uuid) -> eyre::Result<Option<Booking>>;

        async fn list(&self, filter: &BookingFilter) -> eyre::Result<Vec<Booking>>;
    }
}
