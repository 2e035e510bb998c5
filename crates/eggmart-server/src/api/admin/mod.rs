pub(super) mod analytics;
pub(super) mod notifications;
pub(super) mod orders;
pub(super) mod sales;
