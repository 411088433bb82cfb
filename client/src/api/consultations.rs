//! Consultation log access

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{ApiClient, Error, StatusMessage};

/// Consultation entry, reduced to the clinical fields the client displays
#[derive(Debug, Clone, Deserialize)]
pub struct Consultation {
    pub id: i64,
    pub patient_id: i64,
    pub consultation_date: NaiveDateTime,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub bmi: Option<f64>,
    #[serde(default)]
    pub weight_change: Option<f64>,
    #[serde(default)]
    pub caloric_requirement: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub recommendations: Option<String>,
    #[serde(default)]
    pub next_appointment: Option<NaiveDateTime>,
}

/// Minimal consultation entry form; measurements beyond weight are recorded
/// through the full workflow, not this client
#[derive(Debug, Clone, Serialize)]
pub struct NewConsultation {
    pub patient_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultation_date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_appointment: Option<NaiveDateTime>,
}

/// Row of the upcoming-appointments feed
#[derive(Debug, Clone, Deserialize)]
pub struct UpcomingAppointment {
    pub consultation_id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub next_appointment: NaiveDateTime,
    #[serde(default)]
    pub last_weight: Option<f64>,
}

impl ApiClient {
    pub async fn consultations_for(&self, patient_id: i64) -> Result<Vec<Consultation>, Error> {
        self.get(&format!("/consultations/patient/{patient_id}"))
            .await
    }

    pub async fn consultation(&self, id: i64) -> Result<Consultation, Error> {
        self.get(&format!("/consultations/{id}")).await
    }

    pub async fn create_consultation(
        &self,
        consultation: &NewConsultation,
    ) -> Result<Consultation, Error> {
        self.post("/consultations", consultation).await
    }

    pub async fn delete_consultation(&self, id: i64) -> Result<StatusMessage, Error> {
        self.delete(&format!("/consultations/{id}")).await
    }

    pub async fn upcoming_consultations(&self) -> Result<Vec<UpcomingAppointment>, Error> {
        self.get("/consultations/upcoming/all").await
    }
}
