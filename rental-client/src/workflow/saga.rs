//! Subscription purchase saga.
//!
//! Drives "browse plans → subscribe → pay → view → cancel" for one signed-in
//! user and keeps the local view consistent with what the server holds.
//!
//! # State Machine
//!
//! ```text
//! None ──subscribe──► SubscriptionPending ──created──► (payment) ──ok──► Active
//!                           │                              │
//!                           └──create failed──► None       └──failed──► SubscribedUnpaid
//! SubscribedUnpaid ──retry_payment ok──► Active
//! Active ──deactivate──► Deactivating ──confirmed──► None
//!                               └──not confirmed──► Active
//! ```
//!
//! Transitions take `&mut self`, so one workflow never runs two steps at
//! once. Nothing is retried automatically.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    card::CardDetails,
    period::{BillingWindow, Clock, SystemClock},
};
use crate::{
    api::{NewPayment, NewReservation, NewSubscription, RentalApi},
    audit::{AuditEvent, AuditEventType, audit_log},
    error::{RentalError, Result},
    models::{Plan, PlanId, Reservation, Subscription, SubscriptionStatus, VehicleId},
    session::Session,
    transport::{HttpTransport, Transport},
};

/// Heading shown above the current subscription.
pub const ACTIVE_BANNER_TITLE: &str = "Tu Suscripción Activa";

/// Shown after a paid subscription.
pub const SUBSCRIBED_MESSAGE: &str = "¡Suscripción realizada con éxito!";

/// Shown after a confirmed cancellation.
pub const DEACTIVATED_MESSAGE: &str = "Tu suscripción ha sido cancelada.";

/// Shown after a booked reservation.
pub const RESERVED_MESSAGE: &str = "Reserva realizada con éxito.";

/// Shown when the payment record of an active subscription could not be checked.
pub const PAYMENT_UNVERIFIED_MESSAGE: &str =
    "No se pudo verificar el pago de tu suscripción. Inténtalo más tarde.";

/// Shown when reservation dates are reversed.
pub const RESERVATION_DATES_MESSAGE: &str =
    "La fecha de inicio debe ser igual o anterior a la fecha de fin.";

/// Plan list as the purchase page shows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlansState {
    /// Not requested yet.
    #[default]
    NotLoaded,
    /// Loaded.
    Loaded(Vec<Plan>),
    /// Loading failed with this message.
    Failed(String),
}

impl PlansState {
    /// Loaded plans, or an empty slice.
    #[must_use]
    pub fn plans(&self) -> &[Plan] {
        match self {
            Self::Loaded(plans) => plans,
            Self::NotLoaded | Self::Failed(_) => &[],
        }
    }
}

/// Outcome of the last current-subscription check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CurrentSubscription {
    /// Not checked yet.
    #[default]
    Unchecked,
    /// The user has no active subscription.
    None,
    /// The user has this active subscription.
    Active(Subscription),
    /// The check failed; purchasing stays blocked.
    Unknown(String),
}

/// Where the saga is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubscriptionState {
    /// No subscription; purchasing allowed once verified.
    #[default]
    None,
    /// Subscription request in flight.
    SubscriptionPending,
    /// Subscription exists without a payment.
    SubscribedUnpaid {
        /// The unpaid record.
        subscription: Subscription,
        /// Amount still owed, when known.
        amount: Option<Decimal>,
    },
    /// Paid and active.
    Active(Subscription),
    /// Cancellation in flight.
    Deactivating(Subscription),
}

impl SubscriptionState {
    /// Label for logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SubscriptionPending => "pending",
            Self::SubscribedUnpaid { .. } => "unpaid",
            Self::Active(_) => "active",
            Self::Deactivating(_) => "deactivating",
        }
    }

    /// Subscription record held by the state, if any.
    #[must_use]
    pub const fn subscription(&self) -> Option<&Subscription> {
        match self {
            Self::SubscribedUnpaid { subscription, .. }
            | Self::Active(subscription)
            | Self::Deactivating(subscription) => Some(subscription),
            Self::None | Self::SubscriptionPending => None,
        }
    }
}

/// What the "active subscription" panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveBanner {
    /// Always [`ACTIVE_BANNER_TITLE`].
    pub title: &'static str,
    /// Name of the subscribed plan, when the plan list has it.
    pub plan_name: Option<String>,
    /// The subscription.
    pub subscription: Subscription,
}

/// Purchase workflow for one signed-in user.
#[derive(Debug)]
pub struct SubscriptionWorkflow<T: Transport = HttpTransport, C: Clock = SystemClock> {
    api: RentalApi<T>,
    session: Session,
    clock: C,
    plans: PlansState,
    current: CurrentSubscription,
    state: SubscriptionState,
    message: Option<String>,
}

impl<T: Transport> SubscriptionWorkflow<T, SystemClock> {
    /// Workflow on the system clock.
    #[must_use]
    pub fn new(api: RentalApi<T>, session: Session) -> Self {
        Self {
            api,
            session,
            clock: SystemClock,
            plans: PlansState::NotLoaded,
            current: CurrentSubscription::Unchecked,
            state: SubscriptionState::None,
            message: None,
        }
    }
}

impl<T: Transport, C: Clock> SubscriptionWorkflow<T, C> {
    /// Replaces the date source.
    #[must_use]
    pub fn with_clock<C2: Clock>(self, clock: C2) -> SubscriptionWorkflow<T, C2> {
        SubscriptionWorkflow {
            api: self.api,
            session: self.session,
            clock,
            plans: self.plans,
            current: self.current,
            state: self.state,
            message: self.message,
        }
    }

    /// API client.
    #[must_use]
    pub const fn api(&self) -> &RentalApi<T> {
        &self.api
    }

    /// Session in use.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Plan list state.
    #[must_use]
    pub const fn plans(&self) -> &PlansState {
        &self.plans
    }

    /// Last check result.
    #[must_use]
    pub const fn current(&self) -> &CurrentSubscription {
        &self.current
    }

    /// Saga state.
    #[must_use]
    pub const fn state(&self) -> &SubscriptionState {
        &self.state
    }

    /// Last user-facing message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Active-subscription panel, shown only for a paid active subscription.
    #[must_use]
    pub fn active_banner(&self) -> Option<ActiveBanner> {
        let SubscriptionState::Active(subscription) = &self.state else {
            return None;
        };
        Some(ActiveBanner {
            title: ACTIVE_BANNER_TITLE,
            plan_name: self.find_plan(subscription.id_plan).map(|p| p.nombre_plan.clone()),
            subscription: subscription.clone(),
        })
    }

    /// Whether a purchase would be accepted right now.
    #[must_use]
    pub fn can_purchase(&self) -> bool {
        matches!(self.state, SubscriptionState::None)
            && matches!(self.current, CurrentSubscription::None)
    }

    fn find_plan(&self, id: PlanId) -> Option<&Plan> {
        self.plans.plans().iter().find(|p| p.id_plan == id)
    }

    fn fail(&mut self, error: RentalError) -> RentalError {
        self.message = Some(error.user_message());
        error
    }

    /// Page load: plans, then current subscription and payment reconciliation.
    ///
    /// A plan-list failure is kept in [`plans`](Self::plans) and does not stop
    /// the subscription check.
    ///
    /// # Errors
    ///
    /// Returns the reconciliation error, if any.
    pub async fn load(&mut self) -> Result<()> {
        self.load_plans().await;
        self.reconcile().await
    }

    /// `GET /planes` into [`plans`](Self::plans).
    #[instrument(skip(self))]
    pub async fn load_plans(&mut self) -> &PlansState {
        self.plans = match self.api.list_plans().await {
            Ok(plans) => {
                info!(count = plans.len(), "plans loaded");
                PlansState::Loaded(plans)
            }
            Err(e) => {
                warn!(error = %e, "plan list unavailable");
                PlansState::Failed(e.user_message())
            }
        };
        &self.plans
    }

    /// Fetches the user's active subscription.
    ///
    /// Status 1 is active; any other status, a 404 or an empty list means none.
    /// A failed request is recorded as [`CurrentSubscription::Unknown`], which
    /// blocks purchasing until a later check succeeds. Updates the saga state
    /// only when it is idle, active or unpaid.
    #[instrument(skip(self))]
    pub async fn fetch_current(&mut self) -> &CurrentSubscription {
        self.current = match self.api.client_subscriptions(&self.session).await {
            Ok(subscriptions) => subscriptions
                .into_iter()
                .filter(Subscription::is_active)
                .max_by_key(|s| (s.fecha_inicio, s.id_suscripcion))
                .map_or(CurrentSubscription::None, CurrentSubscription::Active),
            Err(e) => {
                warn!(error = %e, "current subscription check failed");
                CurrentSubscription::Unknown(e.user_message())
            }
        };

        let next = match (&self.current, &self.state) {
            (
                CurrentSubscription::Active(sub),
                SubscriptionState::None | SubscriptionState::Active(_),
            ) => Some(SubscriptionState::Active(sub.clone())),
            (
                CurrentSubscription::None,
                SubscriptionState::Active(_) | SubscriptionState::SubscribedUnpaid { .. },
            ) => Some(SubscriptionState::None),
            _ => None,
        };
        if let Some(next) = next {
            self.state = next;
        }
        &self.current
    }

    /// Checks the current subscription and flags it if it has no payment.
    ///
    /// An active subscription with no `GET /pagos` entry for its id moves the
    /// saga to [`SubscriptionState::SubscribedUnpaid`]. If the payment list is
    /// unavailable the subscription stays active and
    /// [`PAYMENT_UNVERIFIED_MESSAGE`] is shown.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::SubscriptionCheckFailed`] if the subscription
    /// check failed.
    #[instrument(skip(self))]
    pub async fn reconcile(&mut self) -> Result<()> {
        let current = self.fetch_current().await.clone();
        let subscription = match current {
            CurrentSubscription::Active(subscription) => subscription,
            CurrentSubscription::Unknown(message) => {
                return Err(self.fail(RentalError::SubscriptionCheckFailed(message)));
            }
            CurrentSubscription::None | CurrentSubscription::Unchecked => return Ok(()),
        };

        let payments = match self.api.list_payments(&self.session).await {
            Ok(payments) => payments,
            Err(e) => {
                warn!(
                    subscription = %subscription.id_suscripcion,
                    error = %e,
                    "payment check unavailable"
                );
                self.message = Some(PAYMENT_UNVERIFIED_MESSAGE.to_owned());
                return Ok(());
            }
        };
        if payments.iter().any(|p| p.id_suscripcion == subscription.id_suscripcion) {
            return Ok(());
        }

        warn!(subscription = %subscription.id_suscripcion, "active subscription has no payment");
        let mut event = AuditEvent::new(AuditEventType::OrphanDetected, Uuid::new_v4())
            .with_subscription(subscription.id_suscripcion)
            .with_plan(subscription.id_plan);
        if let Some(user) = self.session.user_id() {
            event = event.with_user(user);
        }
        audit_log(&event);

        let amount = self.find_plan(subscription.id_plan).map(|p| p.precio_mensual);
        let id = subscription.id_suscripcion;
        self.state = SubscriptionState::SubscribedUnpaid { subscription, amount };
        self.message = Some(
            RentalError::OrphanedSubscription {
                subscription_id: id,
                reason: "no payment recorded".to_owned(),
            }
            .user_message(),
        );
        Ok(())
    }

    /// Buys `plan`: creates the subscription, then records its payment.
    ///
    /// Card fields are checked first; a blank field aborts with no request.
    /// The subscription runs one calendar month from today and is paid today
    /// for the plan's monthly price.
    ///
    /// # Errors
    ///
    /// - [`RentalError::Validation`] for an incomplete card
    /// - [`RentalError::SubscriptionCheckFailed`] when the current subscription
    ///   could not be verified
    /// - [`RentalError::InvalidState`] unless the saga is idle
    /// - [`RentalError::OrphanedSubscription`] when the subscription was
    ///   created but the payment failed
    /// - any error from the subscription request
    #[instrument(skip(self, plan, card), fields(plan = %plan.id_plan))]
    pub async fn subscribe(&mut self, plan: &Plan, card: &CardDetails) -> Result<Subscription> {
        if let Err(e) = card.validate() {
            return Err(self.fail(e));
        }
        let user_id = match self.session.require() {
            Ok(creds) => creds.user_id(),
            Err(e) => return Err(self.fail(e)),
        };
        if !matches!(self.state, SubscriptionState::None) {
            return Err(self.fail(RentalError::InvalidState {
                state: self.state.name(),
                action: "subscribe",
            }));
        }
        if matches!(self.current, CurrentSubscription::Unchecked) {
            self.fetch_current().await;
        }
        match &self.current {
            CurrentSubscription::Unknown(message) => {
                let message = message.clone();
                return Err(self.fail(RentalError::SubscriptionCheckFailed(message)));
            }
            CurrentSubscription::Active(_) => {
                return Err(self.fail(RentalError::InvalidState {
                    state: self.state.name(),
                    action: "subscribe",
                }));
            }
            CurrentSubscription::None | CurrentSubscription::Unchecked => {}
        }

        let window = match BillingWindow::starting(self.clock.today()) {
            Ok(window) => window,
            Err(e) => return Err(self.fail(e)),
        };
        let request_id = Uuid::new_v4();
        audit_log(
            &AuditEvent::new(AuditEventType::SubscriptionRequested, request_id)
                .with_user(user_id)
                .with_plan(plan.id_plan)
                .with_amount(plan.precio_mensual),
        );

        self.state = SubscriptionState::SubscriptionPending;
        self.message = None;
        let body = NewSubscription {
            fecha_inicio: window.start,
            fecha_fin: window.end,
            fecha_pago: window.payment_date,
            id_usuario: user_id,
            id_plan: plan.id_plan,
            id_estado: SubscriptionStatus::Active,
        };
        let subscription = match self.api.create_subscription(&self.session, &body).await {
            Ok(subscription) => subscription,
            Err(e) => {
                self.state = SubscriptionState::None;
                return Err(self.fail(e));
            }
        };
        info!(subscription = %subscription.id_suscripcion, "subscription created");
        audit_log(
            &AuditEvent::new(AuditEventType::SubscriptionCreated, request_id)
                .with_user(user_id)
                .with_plan(plan.id_plan)
                .with_subscription(subscription.id_suscripcion),
        );

        self.pay(subscription, plan.precio_mensual, request_id).await
    }

    /// Records the missing payment of a [`SubscriptionState::SubscribedUnpaid`]
    /// subscription without creating a new one.
    ///
    /// # Errors
    ///
    /// - [`RentalError::InvalidState`] unless the saga is unpaid
    /// - [`RentalError::OrphanedSubscription`] if the payment fails again
    #[instrument(skip(self))]
    pub async fn retry_payment(&mut self) -> Result<Subscription> {
        let SubscriptionState::SubscribedUnpaid { subscription, amount } = &self.state else {
            return Err(self.fail(RentalError::InvalidState {
                state: self.state.name(),
                action: "retry payment",
            }));
        };
        let subscription = subscription.clone();
        let known_amount = *amount;

        let amount = match known_amount {
            Some(amount) => amount,
            None => match self.plan_price(subscription.id_plan).await {
                Ok(amount) => amount,
                Err(e) => return Err(self.fail(e)),
            },
        };

        self.pay(subscription, amount, Uuid::new_v4()).await
    }

    async fn plan_price(&mut self, plan_id: PlanId) -> Result<Decimal> {
        if self.find_plan(plan_id).is_none() {
            self.load_plans().await;
        }
        self.find_plan(plan_id).map(|p| p.precio_mensual).ok_or_else(|| {
            RentalError::InvalidResponse(format!("plan {plan_id} not found in plan list"))
        })
    }

    async fn pay(
        &mut self,
        subscription: Subscription,
        amount: Decimal,
        request_id: Uuid,
    ) -> Result<Subscription> {
        let body = NewPayment {
            id_suscripcion: subscription.id_suscripcion,
            fecha_registro: self.clock.today(),
            monto: amount,
        };
        let user_id = self.session.user_id();

        match self.api.create_payment(&self.session, &body).await {
            Ok(payment) => {
                if let Some(id) = payment.and_then(|p| p.id_pago) {
                    info!(
                        payment = %id,
                        subscription = %subscription.id_suscripcion,
                        "payment recorded"
                    );
                }
                let mut event = AuditEvent::new(AuditEventType::PaymentRecorded, request_id)
                    .with_subscription(subscription.id_suscripcion)
                    .with_amount(amount);
                if let Some(user) = user_id {
                    event = event.with_user(user);
                }
                audit_log(&event);

                self.current = CurrentSubscription::Active(subscription.clone());
                self.state = SubscriptionState::Active(subscription.clone());
                self.message = Some(SUBSCRIBED_MESSAGE.to_owned());
                Ok(subscription)
            }
            Err(e) => {
                warn!(subscription = %subscription.id_suscripcion, error = %e, "payment failed");
                let mut event = AuditEvent::new(AuditEventType::PaymentFailed, request_id)
                    .with_subscription(subscription.id_suscripcion)
                    .with_amount(amount)
                    .with_error(e.to_string());
                if let Some(user) = user_id {
                    event = event.with_user(user);
                }
                audit_log(&event);

                let subscription_id = subscription.id_suscripcion;
                self.current = CurrentSubscription::Active(subscription.clone());
                self.state =
                    SubscriptionState::SubscribedUnpaid { subscription, amount: Some(amount) };
                Err(self.fail(RentalError::OrphanedSubscription {
                    subscription_id,
                    reason: e.to_string(),
                }))
            }
        }
    }

    /// Sets the current subscription inactive.
    ///
    /// With nothing current this is a no-op. The local subscription is cleared
    /// only when the response reports status inactive; any other reported
    /// status leaves it in place and returns an error.
    ///
    /// # Errors
    ///
    /// - [`RentalError::InvalidState`] while a step is in flight
    /// - [`RentalError::InvalidResponse`] when the server does not confirm
    /// - any error from the update request
    #[instrument(skip(self))]
    pub async fn deactivate(&mut self) -> Result<()> {
        let subscription = match &self.state {
            SubscriptionState::None => return Ok(()),
            SubscriptionState::Active(sub)
            | SubscriptionState::SubscribedUnpaid { subscription: sub, .. } => sub.clone(),
            SubscriptionState::SubscriptionPending | SubscriptionState::Deactivating(_) => {
                let state = self.state.name();
                return Err(self.fail(RentalError::InvalidState { state, action: "deactivate" }));
            }
        };

        let previous = std::mem::replace(
            &mut self.state,
            SubscriptionState::Deactivating(subscription.clone()),
        );
        let result = self
            .api
            .update_subscription_status(
                &self.session,
                subscription.id_suscripcion,
                SubscriptionStatus::Inactive,
            )
            .await;

        match result {
            Ok(updated) if updated.id_estado == SubscriptionStatus::Inactive => {
                let mut event =
                    AuditEvent::new(AuditEventType::SubscriptionDeactivated, Uuid::new_v4())
                        .with_subscription(subscription.id_suscripcion);
                if let Some(user) = self.session.user_id() {
                    event = event.with_user(user);
                }
                audit_log(&event);

                self.state = SubscriptionState::None;
                self.current = CurrentSubscription::None;
                self.message = Some(DEACTIVATED_MESSAGE.to_owned());
                Ok(())
            }
            Ok(updated) => {
                warn!(status = updated.id_estado.code(), "deactivation not confirmed");
                self.state = previous;
                Err(self.fail(RentalError::InvalidResponse(format!(
                    "subscription {} reported status {} after deactivation",
                    subscription.id_suscripcion,
                    updated.id_estado.code()
                ))))
            }
            Err(e) => {
                self.state = previous;
                Err(self.fail(e))
            }
        }
    }

    /// Books `vehicle` from `from` to `to` under the active subscription.
    ///
    /// # Errors
    ///
    /// - [`RentalError::InvalidState`] without a paid active subscription
    /// - [`RentalError::Validation`] when `from` is after `to`
    /// - any error from the reservation request
    #[instrument(skip(self))]
    pub async fn book_reservation(
        &mut self,
        vehicle: VehicleId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Option<Reservation>> {
        let SubscriptionState::Active(subscription) = &self.state else {
            return Err(self.fail(RentalError::InvalidState {
                state: self.state.name(),
                action: "reserve",
            }));
        };
        let subscription_id = subscription.id_suscripcion;
        if from > to {
            return Err(self.fail(RentalError::Validation(RESERVATION_DATES_MESSAGE.to_owned())));
        }

        let body = NewReservation {
            fecha_desde: from,
            fecha_hasta: to,
            id_suscripcion: subscription_id,
            id_vehiculo: vehicle,
        };
        match self.api.create_reservation(&self.session, &body).await {
            Ok(reservation) => {
                let mut event = AuditEvent::new(AuditEventType::ReservationCreated, Uuid::new_v4())
                    .with_subscription(subscription_id)
                    .with_vehicle(vehicle);
                if let Some(r) = &reservation {
                    event = event.with_reservation(r.id_reservacion);
                }
                audit_log(&event);
                self.message = Some(RESERVED_MESSAGE.to_owned());
                Ok(reservation)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// All of the user's subscriptions, for the "my subscriptions" view.
    ///
    /// # Errors
    ///
    /// Returns any request error.
    #[instrument(skip(self))]
    pub async fn list_user_subscriptions(&mut self) -> Result<Vec<Subscription>> {
        match self.api.client_subscriptions(&self.session).await {
            Ok(subscriptions) => Ok(subscriptions),
            Err(e) => Err(self.fail(e)),
        }
    }
}
