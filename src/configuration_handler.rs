use crate::configuration::Configuration;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "barbershop-booking", about = "Barbershop slot availability and booking service")]
pub struct ConfigurationHandler {
    /// Port the HTTP server listens on
    #[arg(long, env = "BOOKING_PORT", default_value = "3000")]
    port: String,

    /// PostgreSQL connection URL. Bookings are kept in memory when omitted
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Password expected in the `x-admin-password` header of admin requests
    #[arg(long, env = "BOOKING_ADMIN_PASSWORD")]
    password: String,

    #[arg(long, env = "BOOKING_SLOT_GRANULARITY_MINUTES", default_value_t = 30)]
    slot_granularity_minutes: i32,

    /// Minimum distance between now and the earliest bookable slot
    #[arg(long, env = "BOOKING_LEAD_TIME_MINUTES", default_value_t = 60)]
    lead_time_minutes: i64,

    /// Offset of the barbershops' local time from UTC
    #[arg(
        long,
        env = "BOOKING_UTC_OFFSET_MINUTES",
        default_value_t = 0,
        allow_hyphen_values = true
    )]
    utc_offset_minutes: i32,

    /// Admit bookings as confirmed instead of pending
    #[arg(long, env = "BOOKING_AUTO_CONFIRM")]
    auto_confirm: bool,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn password(&self) -> String {
        self.password.clone()
    }

    fn port(&self) -> String {
        self.port.clone()
    }

    fn database_url(&self) -> Option<String> {
        self.database_url.clone()
    }

    fn slot_granularity_minutes(&self) -> i32 {
        self.slot_granularity_minutes
    }

    fn lead_time_minutes(&self) -> i64 {
        self.lead_time_minutes
    }

    fn utc_offset_minutes(&self) -> i32 {
        self.utc_offset_minutes
    }

    fn auto_confirm(&self) -> bool {
        self.auto_confirm
    }
}
