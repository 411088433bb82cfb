//! Patient records and derived nutritional calculations

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ApiClient, Error, StatusMessage};

/// Patient record as returned by the API.
///
/// The backend carries a long tail of anthropometric and clinical columns;
/// only the fields the client displays are modeled, the rest is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub identification: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    /// kg
    pub weight: f64,
    /// cm
    pub height: f64,
    #[serde(default)]
    pub patient_type: Option<String>,
    #[serde(default)]
    pub activity_level: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields for creating a patient. The optional anthropometrics are left to
/// later consultations.
#[derive(Debug, Clone, Serialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub identification: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub weight: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
}

/// Server-side nutritional calculations for a patient. All of this is
/// computed by the backend; the client only displays it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Calculations {
    pub bmi: f64,
    pub bmi_category: String,
    pub ideal_weight: f64,
    pub adjusted_weight: f64,
    pub caloric_requirement: f64,
    /// Basal metabolic rate (tasa metabolica basal)
    pub tmb: f64,
    pub proteins_g: f64,
    pub carbs_g: f64,
    pub fats_g: f64,
}

impl ApiClient {
    pub async fn patients(&self) -> Result<Vec<Patient>, Error> {
        self.get("/patients").await
    }

    pub async fn patient(&self, id: i64) -> Result<Patient, Error> {
        self.get(&format!("/patients/{id}")).await
    }

    pub async fn create_patient(&self, patient: &NewPatient) -> Result<Patient, Error> {
        self.post("/patients", patient).await
    }

    pub async fn update_patient(&self, id: i64, patient: &NewPatient) -> Result<Patient, Error> {
        self.put(&format!("/patients/{id}"), patient).await
    }

    pub async fn delete_patient(&self, id: i64) -> Result<StatusMessage, Error> {
        self.delete(&format!("/patients/{id}")).await
    }

    /// Search by name or identification
    pub async fn search_patients(&self, query: &str) -> Result<Vec<Patient>, Error> {
        self.get(&format!("/patients/search/{query}")).await
    }

    pub async fn patient_calculations(&self, id: i64) -> Result<Calculations, Error> {
        self.get(&format!("/patients/{id}/calculations")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::model::AuthToken;
    use serde_json::json;
    use warp::Filter;

    #[tokio::test]
    async fn calculations_parse_all_derived_fields() {
        let route = warp::get()
            .and(warp::path!("patients" / i64 / "calculations"))
            .map(|_id| {
                warp::reply::json(&json!({
                    "bmi": 27.1,
                    "bmi_category": "Sobrepeso",
                    "ideal_weight": 63.5,
                    "adjusted_weight": 68.2,
                    "caloric_requirement": 1980.0,
                    "tmb": 1450.0,
                    "proteins_g": 99.0,
                    "carbs_g": 247.5,
                    "fats_g": 66.0
                }))
            });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let api = config::Api {
            base_url: format!("http://{addr}"),
            timeout: 5,
        };
        let client = ApiClient::new(&api, Some(AuthToken::new("tok"))).unwrap();

        let calc = client.patient_calculations(7).await.unwrap();
        assert_eq!(calc.bmi_category, "Sobrepeso");
        assert_eq!(calc.tmb, 1450.0);
        assert_eq!(calc.proteins_g, 99.0);
    }

    #[tokio::test]
    async fn patient_list_tolerates_extra_columns() {
        let route = warp::get().and(warp::path!("patients")).map(|| {
            warp::reply::json(&json!([{
                "id": 7,
                "first_name": "Ana",
                "last_name": "Mora",
                "identification": "CC-1001",
                "birth_date": "1991-04-12",
                "gender": "femenino",
                "weight": 64.0,
                "height": 162.0,
                "triceps_skinfold": 14.5,
                "has_diabetes": 0,
                "created_at": "2026-01-05T09:00:00"
            }]))
        });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let api = config::Api {
            base_url: format!("http://{addr}"),
            timeout: 5,
        };
        let client = ApiClient::new(&api, Some(AuthToken::new("tok"))).unwrap();

        let patients = client.patients().await.unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].full_name(), "Ana Mora");
        assert_eq!(patients[0].patient_type, None);
    }
}
