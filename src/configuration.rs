pub trait Configuration: Clone + Send + Sync + 'static {
    fn password(&self) -> String;
    fn port(&self) -> String;
    fn database_url(&self) -> Option<String>;
    fn slot_granularity_minutes(&self) -> i32;
    fn lead_time_minutes(&self) -> i64;
    fn utc_offset_minutes(&self) -> i32;
    fn auto_confirm(&self) -> bool;
}
