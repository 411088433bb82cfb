//! Command line interface definition

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "nutriyess", about = "NutriYess patient management terminal client")]
pub struct Opt {
    /// Config file path; built-in defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<clio::Input>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session locally
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a nutritionist account and sign in
    Register(RegisterOpts),
    /// Drop the stored session
    Logout,
    /// Show who is signed in and the subscription state
    Status,
    /// Re-fetch the profile and subscription snapshot from the API
    Refresh,
    /// Change the account password
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
    /// Upgrade the subscription plan
    Upgrade {
        /// Target plan: basic, professional or enterprise
        plan: String,
    },
    /// Patient records
    #[command(subcommand)]
    Patients(PatientsCmd),
    /// Consultation log
    #[command(subcommand)]
    Consultations(ConsultationsCmd),
    /// Menu catalog
    #[command(subcommand)]
    Menus(MenusCmd),
    /// Snack catalog
    #[command(subcommand)]
    Snacks(SnacksCmd),
    /// Food exchange catalog
    #[command(subcommand)]
    Exchanges(ExchangesCmd),
    /// Per-patient meal plans
    #[command(subcommand)]
    Plans(PlansCmd),
    /// Patient preferences and menu recommendations
    #[command(subcommand)]
    Preferences(PreferencesCmd),
}

#[derive(Debug, Args)]
pub struct RegisterOpts {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub professional_license: Option<String>,
    #[arg(long)]
    pub specialization: Option<String>,
    #[arg(long)]
    pub clinic_name: Option<String>,
    #[arg(long)]
    pub clinic_address: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum PatientsCmd {
    /// List all patients
    List,
    /// Show a single patient record
    Get { id: i64 },
    /// Search patients by name or identification
    Search { query: String },
    /// Register a new patient
    Create(NewPatientOpts),
    /// Replace a patient record
    Update {
        id: i64,
        #[command(flatten)]
        patient: NewPatientOpts,
    },
    /// Remove a patient record
    Delete { id: i64 },
    /// Server-side nutritional calculations (BMI, TMB, macros)
    Calculations { id: i64 },
}

#[derive(Debug, Args)]
pub struct NewPatientOpts {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub identification: String,
    /// Birth date (YYYY-MM-DD)
    #[arg(long)]
    pub birth_date: NaiveDate,
    /// masculino, femenino or otro
    #[arg(long)]
    pub gender: String,
    /// Current weight in kg
    #[arg(long)]
    pub weight: f64,
    /// Height in cm
    #[arg(long)]
    pub height: f64,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// sano, hospitalizado, uci, deportista, adolescente, adulto_mayor or
    /// embarazada
    #[arg(long)]
    pub patient_type: Option<String>,
    /// sedentario, ligero, moderado, activo or muy_activo
    #[arg(long)]
    pub activity_level: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ConsultationsCmd {
    /// Upcoming appointments across all patients
    Upcoming,
    /// Consultation history of a patient
    List { patient_id: i64 },
    /// Show a single consultation
    Get { id: i64 },
    /// Record a consultation
    Create {
        #[arg(long)]
        patient_id: i64,
        /// Weight measured at the consultation, in kg
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
        /// Next appointment (YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        next_appointment: Option<NaiveDateTime>,
    },
    /// Remove a consultation entry
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum MenusCmd {
    /// List menus, optionally filtered by category
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Show a single menu
    Get { id: i64 },
    /// Remove a menu
    Delete { id: i64 },
    /// Load the curated default menus into the account
    Seed,
}

#[derive(Debug, Subcommand)]
pub enum SnacksCmd {
    /// List the snack catalog
    List,
    /// Load the curated default snacks
    Seed,
}

#[derive(Debug, Subcommand)]
pub enum ExchangesCmd {
    /// List food exchanges, optionally filtered by category
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Load the default exchange list
    Seed,
    /// Load the Colombian food list
    SeedColombian,
}

#[derive(Debug, Subcommand)]
pub enum PlansCmd {
    /// Meal plans of a patient
    List { patient_id: i64 },
    /// Show a single meal plan with its items
    Get { id: i64 },
    /// Remove a meal plan
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum PreferencesCmd {
    /// Show a patient's taste and restriction profile
    Get { patient_id: i64 },
    /// Menu recommendations derived from the preferences
    Recommendations { patient_id: i64 },
}
