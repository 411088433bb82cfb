//! Command handlers
//!
//! The auth commands talk straight to the API and feed the session store.
//! Every other command is protected content: it passes the access gate
//! first, and a non-allowing verdict renders a screen instead of running the
//! command.

use color_eyre::Result;
use tracing::info;

use crate::api::{self, ApiClient};
use crate::config::Config;
use crate::gate::{self, Verdict};
use crate::model::AuthToken;
use crate::opt::{
    Command, ConsultationsCmd, ExchangesCmd, MenusCmd, NewPatientOpts, PatientsCmd, PlansCmd,
    PreferencesCmd, RegisterOpts, SnacksCmd,
};
use crate::session::SessionStore;

pub async fn run(command: Command, config: &Config, session: &mut SessionStore) -> Result<()> {
    match command {
        Command::Login { email, password } => login(config, session, email, password).await,
        Command::Register(opts) => register(config, session, opts).await,
        Command::Logout => logout(session).await,
        Command::Status => {
            status(session);
            Ok(())
        }
        Command::Refresh => refresh(config, session).await,
        Command::ChangePassword { current, new } => {
            change_password(config, session, &current, &new).await
        }
        Command::Upgrade { plan } => upgrade(config, session, &plan).await,
        protected => {
            match gate::evaluate(session, target(&protected)) {
                Verdict::Allow => {}
                verdict => {
                    render_verdict(&verdict);
                    return Ok(());
                }
            }

            // Allow implies an authenticated session, so a token exists.
            let client = ApiClient::new(&config.api, session.token().cloned())?;
            dispatch(protected, &client, session).await
        }
    }
}

/// The gate target for a protected command, preserved in the redirect verdict
/// so the user knows what to retry after signing in
fn target(command: &Command) -> &'static str {
    match command {
        Command::Patients(_) => "patients",
        Command::Consultations(_) => "consultations",
        Command::Menus(_) => "menus",
        Command::Snacks(_) => "snacks",
        Command::Exchanges(_) => "exchanges",
        Command::Plans(_) => "plans",
        Command::Preferences(_) => "preferences",
        // Auth commands are dispatched before the gate is consulted.
        Command::Login { .. }
        | Command::Register(_)
        | Command::Logout
        | Command::Status
        | Command::Refresh
        | Command::ChangePassword { .. }
        | Command::Upgrade { .. } => unreachable!("auth commands bypass the gate"),
    }
}

fn render_verdict(verdict: &Verdict) {
    match verdict {
        Verdict::Allow => {}
        Verdict::Loading => println!("The session is still loading, try again in a moment."),
        Verdict::RedirectToLogin { from } => {
            println!("You are not signed in.");
            println!(
                "Run `nutriyess login --email <email> --password <password>`, \
                 then retry `nutriyess {from}`."
            );
        }
        Verdict::TrialActive {
            days_remaining,
            patient_limit,
        } => {
            println!("Trial period");
            println!("You have {days_remaining} day(s) of free trial remaining.");
            println!(
                "All NutriYess features are available during the trial, \
                 limited to {patient_limit} patient(s)."
            );
            println!("Re-run the command to continue.");
        }
        Verdict::TrialExpired => {
            println!("Subscription required");
            println!(
                "Your trial period has expired. To keep using NutriYess \
                 you need an active subscription."
            );
            println!(
                "Run `nutriyess upgrade <plan>` to subscribe, \
                 or `nutriyess logout` to close the session."
            );
        }
    }
}

async fn login(
    config: &Config,
    session: &mut SessionStore,
    email: String,
    password: String,
) -> Result<()> {
    let client = ApiClient::new(&config.api, None)?;
    let resp = client
        .login(&api::Credentials { email, password })
        .await?;

    store_token_response(session, resp).await
}

async fn register(config: &Config, session: &mut SessionStore, opts: RegisterOpts) -> Result<()> {
    let client = ApiClient::new(&config.api, None)?;
    let resp = client
        .register(&api::Registration {
            email: opts.email,
            password: opts.password,
            first_name: opts.first_name,
            last_name: opts.last_name,
            phone: opts.phone,
            professional_license: opts.professional_license,
            specialization: opts.specialization,
            clinic_name: opts.clinic_name,
            clinic_address: opts.clinic_address,
            bio: opts.bio,
        })
        .await?;

    println!("Account created.");
    store_token_response(session, resp).await
}

/// Stores what login/registration returned and reports the session state
async fn store_token_response(
    session: &mut SessionStore,
    resp: api::TokenResponse,
) -> Result<()> {
    let name = resp.user.full_name();
    let subscription = resp.subscription_info;

    if let Some(message) = &subscription.message {
        println!("{message}");
    }

    session
        .login(
            resp.user,
            AuthToken::new(resp.access_token),
            Some(subscription),
        )
        .await?;

    info!(user = %name, "Session stored");
    println!("Signed in as {name}.");
    Ok(())
}

async fn logout(session: &mut SessionStore) -> Result<()> {
    session.logout().await?;
    println!("Signed out.");
    Ok(())
}

fn status(session: &SessionStore) {
    let Some(user) = session.user() else {
        println!("Not signed in.");
        return;
    };

    println!("Signed in as {} <{}>", user.full_name(), user.email);
    match session.subscription() {
        Some(subscription) => {
            println!(
                "Subscription: {} (active: {})",
                subscription.status, subscription.is_active
            );
            println!("Days remaining: {}", session.days_remaining());
            println!("Patient limit: {}", session.patient_limit());
            if let Some(message) = &subscription.message {
                println!("{message}");
            }
        }
        None => println!("No subscription data stored; run `nutriyess refresh`."),
    }
}

async fn refresh(config: &Config, session: &mut SessionStore) -> Result<()> {
    let Some(client) = authed_client(config, session)? else {
        println!("Not signed in.");
        return Ok(());
    };

    let user = client.me().await?;
    session.update_user(user).await?;

    let snapshot = client.subscription_status().await?;
    if let Some(message) = &snapshot.message {
        println!("{message}");
    }
    println!(
        "Subscription: {} (active: {}), {} day(s) remaining",
        snapshot.status, snapshot.is_active, snapshot.days_remaining
    );
    session.update_subscription(snapshot).await?;
    Ok(())
}

async fn change_password(
    config: &Config,
    session: &SessionStore,
    current: &str,
    new: &str,
) -> Result<()> {
    let Some(client) = authed_client(config, session)? else {
        println!("Not signed in.");
        return Ok(());
    };

    let ack = client.change_password(current, new).await?;
    println!("{}", ack.message);
    Ok(())
}

async fn upgrade(config: &Config, session: &mut SessionStore, plan: &str) -> Result<()> {
    let Some(client) = authed_client(config, session)? else {
        println!("Not signed in.");
        return Ok(());
    };

    let receipt = client.upgrade_subscription(plan).await?;
    println!("{}", receipt.message);

    // The gate reads the stored snapshot, so pick up the new state right away
    // instead of waiting for the next sign-in.
    let snapshot = client.subscription_status().await?;
    session.update_subscription(snapshot).await?;
    Ok(())
}

fn authed_client(config: &Config, session: &SessionStore) -> Result<Option<ApiClient>> {
    match session.token() {
        Some(token) => Ok(Some(ApiClient::new(&config.api, Some(token.clone()))?)),
        None => Ok(None),
    }
}

async fn dispatch(command: Command, client: &ApiClient, session: &SessionStore) -> Result<()> {
    match command {
        Command::Patients(cmd) => patients(cmd, client, session).await,
        Command::Consultations(cmd) => consultations(cmd, client).await,
        Command::Menus(cmd) => menus(cmd, client).await,
        Command::Snacks(cmd) => snacks(cmd, client).await,
        Command::Exchanges(cmd) => exchanges(cmd, client).await,
        Command::Plans(cmd) => plans(cmd, client).await,
        Command::Preferences(cmd) => preferences(cmd, client).await,
        // Auth commands never reach the protected dispatch.
        _ => Ok(()),
    }
}

async fn patients(cmd: PatientsCmd, client: &ApiClient, session: &SessionStore) -> Result<()> {
    match cmd {
        PatientsCmd::List => {
            let patients = client.patients().await?;
            for patient in &patients {
                println!(
                    "#{:<5} {:<30} {:>6.1} kg {:>6.1} cm",
                    patient.id,
                    patient.full_name(),
                    patient.weight,
                    patient.height,
                );
            }
            println!(
                "{} of {} patient slots used",
                patients.len(),
                session.patient_limit()
            );
        }
        PatientsCmd::Get { id } => {
            let patient = client.patient(id).await?;
            print_patient(&patient);
        }
        PatientsCmd::Search { query } => {
            let patients = client.search_patients(&query).await?;
            if patients.is_empty() {
                println!("No patients match \"{query}\".");
            }
            for patient in &patients {
                println!(
                    "#{:<5} {} ({})",
                    patient.id,
                    patient.full_name(),
                    patient.identification
                );
            }
        }
        PatientsCmd::Create(opts) => {
            let patient = client.create_patient(&new_patient(opts)).await?;
            println!("Created patient #{}: {}", patient.id, patient.full_name());
        }
        PatientsCmd::Update { id, patient } => {
            let patient = client.update_patient(id, &new_patient(patient)).await?;
            println!("Updated patient #{}: {}", patient.id, patient.full_name());
        }
        PatientsCmd::Delete { id } => {
            let ack = client.delete_patient(id).await?;
            println!("{}", ack.message);
        }
        PatientsCmd::Calculations { id } => {
            let calc = client.patient_calculations(id).await?;
            println!("BMI: {:.1} ({})", calc.bmi, calc.bmi_category);
            println!("Ideal weight: {:.1} kg", calc.ideal_weight);
            println!("Adjusted weight: {:.1} kg", calc.adjusted_weight);
            println!("TMB: {:.0} kcal", calc.tmb);
            println!("Caloric requirement: {:.0} kcal", calc.caloric_requirement);
            println!(
                "Macros: {:.0} g protein / {:.0} g carbs / {:.0} g fat",
                calc.proteins_g, calc.carbs_g, calc.fats_g
            );
        }
    }
    Ok(())
}

fn new_patient(opts: NewPatientOpts) -> api::patients::NewPatient {
    api::patients::NewPatient {
        first_name: opts.first_name,
        last_name: opts.last_name,
        identification: opts.identification,
        birth_date: opts.birth_date,
        gender: opts.gender,
        weight: opts.weight,
        height: opts.height,
        email: opts.email,
        phone: opts.phone,
        patient_type: opts.patient_type,
        activity_level: opts.activity_level,
    }
}

fn print_patient(patient: &api::patients::Patient) {
    println!("#{} {}", patient.id, patient.full_name());
    println!("Identification: {}", patient.identification);
    println!("Born: {} ({})", patient.birth_date, patient.gender);
    println!("Weight: {:.1} kg, height: {:.1} cm", patient.weight, patient.height);
    if let Some(patient_type) = &patient.patient_type {
        println!("Type: {patient_type}");
    }
    if let Some(activity_level) = &patient.activity_level {
        println!("Activity: {activity_level}");
    }
    if let Some(email) = &patient.email {
        println!("Email: {email}");
    }
    if let Some(phone) = &patient.phone {
        println!("Phone: {phone}");
    }
    if let Some(allergies) = &patient.allergies {
        println!("Allergies: {allergies}");
    }
}

async fn consultations(cmd: ConsultationsCmd, client: &ApiClient) -> Result<()> {
    match cmd {
        ConsultationsCmd::Upcoming => {
            let upcoming = client.upcoming_consultations().await?;
            if upcoming.is_empty() {
                println!("No upcoming appointments.");
            }
            for entry in &upcoming {
                let weight = entry
                    .last_weight
                    .map(|weight| format!(", last weight {weight:.1} kg"))
                    .unwrap_or_default();
                println!(
                    "{} - {} (patient #{}{weight})",
                    entry.next_appointment.format("%Y-%m-%d %H:%M"),
                    entry.patient_name,
                    entry.patient_id,
                );
            }
        }
        ConsultationsCmd::List { patient_id } => {
            for entry in client.consultations_for(patient_id).await? {
                let weight = entry
                    .weight
                    .map(|weight| format!("{weight:.1} kg"))
                    .unwrap_or_else(|| "-".to_owned());
                println!(
                    "#{:<5} {} weight: {}",
                    entry.id,
                    entry.consultation_date.format("%Y-%m-%d %H:%M"),
                    weight,
                );
            }
        }
        ConsultationsCmd::Get { id } => {
            let entry = client.consultation(id).await?;
            println!(
                "#{} patient #{} on {}",
                entry.id,
                entry.patient_id,
                entry.consultation_date.format("%Y-%m-%d %H:%M")
            );
            if let Some(weight) = entry.weight {
                println!("Weight: {weight:.1} kg");
            }
            if let Some(bmi) = entry.bmi {
                println!("BMI: {bmi:.1}");
            }
            if let Some(change) = entry.weight_change {
                println!("Weight change: {change:+.1} kg");
            }
            if let Some(notes) = &entry.notes {
                println!("Notes: {notes}");
            }
            if let Some(recommendations) = &entry.recommendations {
                println!("Recommendations: {recommendations}");
            }
            if let Some(next) = entry.next_appointment {
                println!("Next appointment: {}", next.format("%Y-%m-%d %H:%M"));
            }
        }
        ConsultationsCmd::Create {
            patient_id,
            weight,
            notes,
            next_appointment,
        } => {
            let entry = client
                .create_consultation(&api::consultations::NewConsultation {
                    patient_id,
                    consultation_date: None,
                    weight,
                    notes,
                    next_appointment,
                })
                .await?;
            println!("Recorded consultation #{}", entry.id);
        }
        ConsultationsCmd::Delete { id } => {
            let ack = client.delete_consultation(id).await?;
            println!("{}", ack.message);
        }
    }
    Ok(())
}

async fn menus(cmd: MenusCmd, client: &ApiClient) -> Result<()> {
    match cmd {
        MenusCmd::List { category } => {
            for menu in client.menus(category.as_deref()).await? {
                let calories = menu
                    .calories
                    .map(|kcal| format!("{kcal:.0} kcal"))
                    .unwrap_or_else(|| "-".to_owned());
                println!("#{:<5} [{}] {} ({calories})", menu.id, menu.category, menu.name);
            }
        }
        MenusCmd::Get { id } => {
            let menu = client.menu(id).await?;
            println!("#{} [{}] {}", menu.id, menu.category, menu.name);
            if let Some(description) = &menu.description {
                println!("{description}");
            }
            if let Some(calories) = menu.calories {
                println!("Calories: {calories:.0} kcal");
            }
        }
        MenusCmd::Delete { id } => {
            let ack = client.delete_menu(id).await?;
            println!("{}", ack.message);
        }
        MenusCmd::Seed => {
            let ack = client.seed_default_menus().await?;
            println!("{}", ack.message);
        }
    }
    Ok(())
}

async fn snacks(cmd: SnacksCmd, client: &ApiClient) -> Result<()> {
    match cmd {
        SnacksCmd::List => {
            for snack in client.snacks().await? {
                let mut flags = Vec::new();
                if snack.is_vegetarian {
                    flags.push("vegetarian");
                }
                if snack.is_vegan {
                    flags.push("vegan");
                }
                if snack.is_diabetic_friendly {
                    flags.push("diabetic-friendly");
                }
                let flags = if flags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", flags.join(", "))
                };
                println!("#{:<5} {}{flags}", snack.id, snack.name);
            }
        }
        SnacksCmd::Seed => {
            let ack = client.seed_default_snacks().await?;
            println!("{}", ack.message);
        }
    }
    Ok(())
}

async fn exchanges(cmd: ExchangesCmd, client: &ApiClient) -> Result<()> {
    match cmd {
        ExchangesCmd::List { category } => {
            for exchange in client.food_exchanges(category.as_deref()).await? {
                let portion = exchange
                    .portion_size
                    .clone()
                    .unwrap_or_else(|| "-".to_owned());
                println!(
                    "#{:<5} [{}] {} (portion: {portion})",
                    exchange.id, exchange.category, exchange.name,
                );
            }
        }
        ExchangesCmd::Seed => {
            let ack = client.seed_default_exchanges().await?;
            println!("{}", ack.message);
        }
        ExchangesCmd::SeedColombian => {
            let ack = client.seed_colombian_foods().await?;
            println!("{}", ack.message);
        }
    }
    Ok(())
}

async fn plans(cmd: PlansCmd, client: &ApiClient) -> Result<()> {
    match cmd {
        PlansCmd::List { patient_id } => {
            for plan in client.meal_plans_for(patient_id).await? {
                let name = plan.name.clone().unwrap_or_else(|| "(unnamed)".to_owned());
                let calories = plan
                    .total_calories
                    .map(|kcal| format!("{kcal:.0} kcal"))
                    .unwrap_or_else(|| "-".to_owned());
                println!("#{:<5} {} from {} ({calories})", plan.id, name, plan.date_created);
            }
        }
        PlansCmd::Get { id } => {
            let plan = client.meal_plan(id).await?;
            println!(
                "#{} {} from {}",
                plan.id,
                plan.name.as_deref().unwrap_or("(unnamed)"),
                plan.date_created
            );
            if let Some(notes) = &plan.notes {
                println!("{notes}");
            }
            for item in &plan.items {
                println!(
                    "  {} - {} ({})",
                    item.meal_time.as_deref().unwrap_or("-"),
                    item.food_item.as_deref().unwrap_or("-"),
                    item.portion.as_deref().unwrap_or("-"),
                );
            }
        }
        PlansCmd::Delete { id } => {
            let ack = client.delete_meal_plan(id).await?;
            println!("{}", ack.message);
        }
    }
    Ok(())
}

async fn preferences(cmd: PreferencesCmd, client: &ApiClient) -> Result<()> {
    match cmd {
        PreferencesCmd::Get { patient_id } => {
            let prefs = client.preferences_for(patient_id).await?;
            println!("Preferences for patient #{}", prefs.patient_id);
            if let Some(favorite) = &prefs.favorite_foods {
                println!("Likes: {favorite}");
            }
            if let Some(disliked) = &prefs.disliked_foods {
                println!("Dislikes: {disliked}");
            }
            if let Some(allergies) = &prefs.allergies {
                println!("Allergies: {allergies}");
            }
            if let Some(restrictions) = &prefs.cultural_restrictions {
                println!("Restrictions: {restrictions}");
            }
            if let Some(budget) = &prefs.budget_level {
                println!("Budget: {budget}");
            }
            if let Some(time) = &prefs.cooking_time_available {
                println!("Cooking time: {time}");
            }
            if let Some(snacks) = prefs.snacks_per_day {
                println!("Snacks per day: {snacks}");
            }
            if let Some(notes) = &prefs.additional_notes {
                println!("{notes}");
            }
        }
        PreferencesCmd::Recommendations { patient_id } => {
            let recommendations = client.recommendations_for(patient_id).await?;
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
        }
    }
    Ok(())
}
