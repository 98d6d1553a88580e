//! Signs in and buys the cheapest plan.
//!
//! Runs against the local development API unless `RENTAL_CONFIG` names a
//! TOML configuration file.
//!
//! ```bash
//! export RENTAL_EMAIL=ana@example.com
//! export RENTAL_PASSWORD=<password>
//! cargo run --example subscribe
//! ```

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "examples are allowed to use println"
)]

use std::env;

use rental_client::{
    ClientConfig, RentalApi, RentalError, SubscriptionWorkflow, auth,
    workflow::{CardDetails, PlansState},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match env::var("RENTAL_CONFIG") {
        Ok(path) => ClientConfig::from_file(path)?,
        Err(_) => ClientConfig::default(),
    };
    let api = RentalApi::from_config(&config)?;

    let email = env::var("RENTAL_EMAIL").map_err(|_| "RENTAL_EMAIL is not set")?;
    let password = env::var("RENTAL_PASSWORD").map_err(|_| "RENTAL_PASSWORD is not set")?;

    println!("1. Signing in as {email}...");
    let session = auth::login(&api, &email, &password).await?;

    println!("2. Loading plans and the current subscription...");
    let mut workflow = SubscriptionWorkflow::new(api, session);
    workflow.load().await?;

    if let Some(banner) = workflow.active_banner() {
        println!("   {}: {}", banner.title, banner.plan_name.unwrap_or_default());
        return Ok(());
    }

    let plan = match workflow.plans() {
        PlansState::Loaded(plans) => plans.iter().min_by_key(|p| p.precio_mensual).cloned(),
        PlansState::Failed(message) => return Err(message.clone().into()),
        PlansState::NotLoaded => None,
    };
    let Some(plan) = plan else {
        println!("   No plans available");
        return Ok(());
    };

    println!("3. Subscribing to {} (${}/mes)...", plan.nombre_plan, plan.precio_mensual);
    let card = CardDetails::new("Ana López", "4111 1111 1111 1111", "12/27", "123");
    match workflow.subscribe(&plan, &card).await {
        Ok(subscription) => {
            println!(
                "   Subscription #{} runs {} -> {}",
                subscription.id_suscripcion, subscription.fecha_inicio, subscription.fecha_fin
            );
        }
        Err(e @ RentalError::OrphanedSubscription { .. }) => {
            eprintln!("   {}", e.user_message());
            println!("4. Retrying the payment once...");
            workflow.retry_payment().await?;
        }
        Err(e) => return Err(e.into()),
    }

    if let Some(message) = workflow.message() {
        println!("\n{message}");
    }
    Ok(())
}
