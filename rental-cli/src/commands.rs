//! Command handlers.

use std::path::PathBuf;

use chrono::Local;
use rental_client::{
    ClientConfig, RentalApi, Result, Session, SubscriptionWorkflow,
    admin::{AdminConsole, CategoryForm, PlanForm, VehicleForm},
    auth::{self, RegistrationForm},
    error::RentalError,
    models::{CategoryId, PlanId, ReservationId, RoleId, Subscription, VehicleId},
    session::{FileSessionStore, SessionStore},
    workflow::{CardDetails, CurrentSubscription, PlansState, SubscriptionState},
};
use tracing::debug;

use crate::{AdminCommand, CardArgs, Cli, Command, RegisterArgs};

const SESSION_FILE_NAME: &str = ".rental-session.json";

fn default_session_file() -> PathBuf {
    std::env::var_os("HOME")
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(SESSION_FILE_NAME)
}

fn load_config(path: Option<&PathBuf>) -> Result<ClientConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            ClientConfig::from_file(path)
        }
        None => Ok(ClientConfig::default()),
    }
}

fn print_subscription(sub: &Subscription) {
    println!(
        "#{} plan {} {} -> {} [{}]",
        sub.id_suscripcion,
        sub.id_plan,
        sub.fecha_inicio,
        sub.fecha_fin,
        sub.id_estado.as_str()
    );
}

fn print_outcome(workflow: &SubscriptionWorkflow) {
    if let Some(message) = workflow.message() {
        println!("{message}");
    }
    match workflow.active_banner() {
        Some(banner) => {
            println!("{}", banner.title);
            if let Some(name) = banner.plan_name {
                println!("  Plan: {name}");
            }
            println!("  Desde: {}", banner.subscription.fecha_inicio);
            println!("  Hasta: {}", banner.subscription.fecha_fin);
        }
        None => {
            if let SubscriptionState::SubscribedUnpaid { subscription, .. } = workflow.state() {
                println!(
                    "La suscripción #{} no tiene pago registrado. Usa `rental pay-pending`.",
                    subscription.id_suscripcion
                );
            }
        }
    }
}

/// Runs one command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;
    let store = FileSessionStore::new(cli.session_file.unwrap_or_else(default_session_file));
    let api = RentalApi::from_config(&config)?;

    match cli.command {
        Command::Login { email, password } => {
            let session = auth::login(&api, &email, &password).await?;
            store.save(&session)?;
            let name = session.credentials().and_then(|c| c.name()).unwrap_or(email.as_str());
            println!("Bienvenido, {name}.");
        }
        Command::Logout => {
            store.clear()?;
            println!("Sesión cerrada.");
        }
        Command::Register(args) => register(&api, args).await?,
        Command::Roles => {
            for role in auth::roles(&api).await? {
                println!("{}\t{}", role.id_rol, role.nombre_rol);
            }
        }
        Command::Profile => {
            let user = auth::profile(&api, &store.load()?).await?;
            println!("{} <{}>", user.nombres, user.email);
            if let Some(role) = user.role_name() {
                println!("Rol: {role}");
            }
        }
        Command::Plans => {
            for plan in api.list_plans().await? {
                println!(
                    "{}\t{}\t${}/mes\t{}",
                    plan.id_plan,
                    plan.nombre_plan,
                    plan.precio_mensual,
                    plan.distance_label()
                );
            }
        }
        Command::Status => status(api, store.load()?).await?,
        Command::Subscribe { plan, card } => subscribe(api, store.load()?, plan, card).await?,
        Command::PayPending => {
            let mut workflow = SubscriptionWorkflow::new(api, store.load()?);
            workflow.load().await?;
            let result = workflow.retry_payment().await;
            print_outcome(&workflow);
            result?;
        }
        Command::Cancel => {
            let mut workflow = SubscriptionWorkflow::new(api, store.load()?);
            workflow.load().await?;
            if workflow.state().subscription().is_none() {
                println!("No tienes una suscripción activa.");
                return Ok(());
            }
            let result = workflow.deactivate().await;
            print_outcome(&workflow);
            result?;
        }
        Command::Reserve { vehicle, from, to } => {
            let mut workflow = SubscriptionWorkflow::new(api, store.load()?);
            workflow.load().await?;
            let reservation =
                workflow.book_reservation(VehicleId::new(vehicle), from, to).await?;
            print_outcome(&workflow);
            if let Some(r) = reservation {
                println!("Reserva #{} ({} días)", r.id_reservacion, r.days());
            }
        }
        Command::Subscriptions => {
            let mut workflow = SubscriptionWorkflow::new(api, store.load()?);
            for sub in workflow.list_user_subscriptions().await? {
                print_subscription(&sub);
            }
        }
        Command::Vehicles => {
            for vehicle in api.list_vehicles().await? {
                println!("{}\t{}", vehicle.id_vehiculo, vehicle.label());
            }
        }
        Command::Categories => {
            for category in api.list_categories().await? {
                println!(
                    "{}\t{}\t{}",
                    category.id_categoria, category.nombre_categoria, category.descripcion
                );
            }
        }
        Command::Admin(command) => admin(AdminConsole::new(api, store.load()?), command).await?,
    }
    Ok(())
}

async fn register(api: &RentalApi, args: RegisterArgs) -> Result<()> {
    let form = RegistrationForm {
        nombres: args.name,
        email: args.email,
        telefono: args.phone,
        dui: args.dui,
        id_rol: Some(RoleId::new(args.role)),
        password: args.password,
        confirm_password: args.confirm_password,
    };
    auth::register(api, &form).await?;
    println!("Tu cuenta ha sido creada. Ahora puedes iniciar sesión.");
    Ok(())
}

async fn status(api: RentalApi, session: Session) -> Result<()> {
    let mut workflow = SubscriptionWorkflow::new(api, session);
    let loaded = workflow.load().await;

    if let PlansState::Failed(message) = workflow.plans() {
        println!("{message}");
    }
    print_outcome(&workflow);
    if matches!(workflow.current(), CurrentSubscription::None) {
        println!("No tienes una suscripción activa.");
    }
    loaded
}

async fn subscribe(api: RentalApi, session: Session, plan_id: u64, card: CardArgs) -> Result<()> {
    let card = CardDetails::new(card.holder, card.card_number, card.expiry, card.cvv);
    card.validate()?;
    let mut workflow = SubscriptionWorkflow::new(api, session);
    workflow.load().await?;

    let plan_id = PlanId::new(plan_id);
    let Some(plan) = workflow.plans().plans().iter().find(|p| p.id_plan == plan_id).cloned() else {
        return Err(RentalError::Validation(format!("El plan {plan_id} no existe.")));
    };

    let result = workflow.subscribe(&plan, &card).await;
    print_outcome(&workflow);
    result.map(|_| ())
}

async fn admin(console: AdminConsole, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::Stats { days } => {
            let stats = console.dashboard(Local::now().date_naive(), days).await?;
            println!("Vehículos: {}", stats.vehicles);
            println!("Planes: {}", stats.plans);
            println!("Reservaciones: {}", stats.reservations);
            println!("Usuarios: {}", stats.users);
            println!("Suscripciones: {}", stats.subscriptions);
            println!("Ganancias totales: ${}", stats.total_revenue);
            for point in &stats.revenue_daily {
                println!("  {}  ${}", point.date, point.value);
            }
        }
        AdminCommand::Reservations => {
            for r in console.reservations().await? {
                let status = r
                    .suscripcion
                    .as_ref()
                    .map_or("-", |s| s.id_estado.as_str());
                println!(
                    "#{}\t{} -> {}\tsuscripción {}\t{status}",
                    r.id_reservacion, r.fecha_desde, r.fecha_hasta, r.id_suscripcion
                );
            }
        }
        AdminCommand::Users => {
            for user in console.users().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    user.id_usuario,
                    user.nombres,
                    user.email,
                    user.role_name().unwrap_or("-")
                );
            }
        }
        AdminCommand::AcceptReservation { id } => {
            console.accept_reservation(ReservationId::new(id)).await?;
            println!("Reservación #{id} aceptada.");
        }
        AdminCommand::AddCategory { name, description } => {
            console.add_category(&CategoryForm::new(name, description)).await?;
            println!("Categoría agregada.");
        }
        AdminCommand::AddVehicle { make, model, year, plate, category } => {
            let mut form = VehicleForm::new(make, model, year, plate);
            if let Some(id) = category {
                form = form.with_category(CategoryId::new(id));
            }
            console.add_vehicle(&form).await?;
            println!("Vehículo agregado.");
        }
        AdminCommand::AddPlan { name, description, price, km, category } => {
            console.add_plan(&PlanForm::new(name, description, price, km, category)).await?;
            println!("¡Plan agregado con éxito!");
        }
    }
    Ok(())
}
