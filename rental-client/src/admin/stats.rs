//! Dashboard figures computed from listings.
//!
//! Revenue is the plan's monthly price per subscription; a subscription whose
//! plan is missing from the list counts as zero. Daily series cover the last
//! `days` calendar days ending today, oldest first.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{Plan, PlanId, Reservation, Subscription, User, Vehicle};

/// Window used by the dashboard charts.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// One day of a chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyPoint<T> {
    /// Calendar day.
    pub date: NaiveDate,
    /// Value for that day.
    pub value: T,
}

fn price_index(plans: &[Plan]) -> HashMap<PlanId, Decimal> {
    plans.iter().map(|p| (p.id_plan, p.precio_mensual)).collect()
}

fn window(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
        .collect()
}

/// Sum of monthly prices over all subscriptions.
///
/// # Examples
///
/// ```
/// use rental_client::{admin::stats::total_revenue, models::{Plan, Subscription}};
///
/// let plans: Vec<Plan> = serde_json::from_str(
///     r#"[{"id_plan": 1, "nombre_plan": "Básico", "precio_mensual": "29.99"}]"#,
/// )?;
/// let subs: Vec<Subscription> = serde_json::from_str(
///     r#"[
///         {"id_suscripcion": 1, "fecha_inicio": "2025-03-01", "fecha_fin": "2025-04-01", "id_plan": 1, "id_estado": 1},
///         {"id_suscripcion": 2, "fecha_inicio": "2025-03-02", "fecha_fin": "2025-04-02", "id_plan": 9, "id_estado": 1}
///     ]"#,
/// )?;
/// assert_eq!(total_revenue(&subs, &plans).to_string(), "29.99");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[must_use]
pub fn total_revenue(subscriptions: &[Subscription], plans: &[Plan]) -> Decimal {
    let prices = price_index(plans);
    subscriptions.iter().filter_map(|s| prices.get(&s.id_plan)).copied().sum()
}

/// Revenue per day of `fecha_pago` over the last `days` days.
#[must_use]
pub fn daily_revenue(
    subscriptions: &[Subscription],
    plans: &[Plan],
    today: NaiveDate,
    days: u32,
) -> Vec<DailyPoint<Decimal>> {
    let prices = price_index(plans);
    let mut by_day: HashMap<NaiveDate, Decimal> = HashMap::new();
    for sub in subscriptions {
        if let (Some(paid), Some(price)) = (sub.fecha_pago, prices.get(&sub.id_plan)) {
            *by_day.entry(paid).or_default() += *price;
        }
    }
    window(today, days)
        .into_iter()
        .map(|date| DailyPoint { date, value: by_day.get(&date).copied().unwrap_or_default() })
        .collect()
}

/// Number of records per day over the last `days` days.
///
/// Records without a date are ignored.
#[must_use]
pub fn daily_counts<I>(dates: I, today: NaiveDate, days: u32) -> Vec<DailyPoint<usize>>
where
    I: IntoIterator<Item = Option<NaiveDate>>,
{
    let mut by_day: HashMap<NaiveDate, usize> = HashMap::new();
    for date in dates.into_iter().flatten() {
        *by_day.entry(date).or_default() += 1;
    }
    window(today, days)
        .into_iter()
        .map(|date| DailyPoint { date, value: by_day.get(&date).copied().unwrap_or(0) })
        .collect()
}

/// Everything the admin dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    /// Registered vehicles.
    pub vehicles: usize,
    /// Plans on offer.
    pub plans: usize,
    /// Reservations.
    pub reservations: usize,
    /// Users.
    pub users: usize,
    /// Subscriptions of any status.
    pub subscriptions: usize,
    /// See [`total_revenue`].
    pub total_revenue: Decimal,
    /// See [`daily_revenue`].
    pub revenue_daily: Vec<DailyPoint<Decimal>>,
    /// Vehicles by registration date.
    pub vehicles_daily: Vec<DailyPoint<usize>>,
    /// Reservations by registration date.
    pub reservations_daily: Vec<DailyPoint<usize>>,
}

/// Listings the dashboard is computed from.
#[derive(Debug, Clone, Copy)]
pub struct DashboardData<'a> {
    /// `GET /vehiculos`
    pub vehicles: &'a [Vehicle],
    /// `GET /planes`
    pub plans: &'a [Plan],
    /// `GET /reservaciones`
    pub reservations: &'a [Reservation],
    /// `GET /usuarios`
    pub users: &'a [User],
    /// `GET /suscripciones`
    pub subscriptions: &'a [Subscription],
}

impl DashboardStats {
    /// Computes all figures for a window of `days` ending `today`.
    #[must_use]
    pub fn compute(data: DashboardData<'_>, today: NaiveDate, days: u32) -> Self {
        Self {
            vehicles: data.vehicles.len(),
            plans: data.plans.len(),
            reservations: data.reservations.len(),
            users: data.users.len(),
            subscriptions: data.subscriptions.len(),
            total_revenue: total_revenue(data.subscriptions, data.plans),
            revenue_daily: daily_revenue(data.subscriptions, data.plans, today, days),
            vehicles_daily: daily_counts(
                data.vehicles.iter().map(|v| v.fecha_registro),
                today,
                days,
            ),
            reservations_daily: daily_counts(
                data.reservations.iter().map(|r| r.fecha_registro),
                today,
                days,
            ),
        }
    }
}
