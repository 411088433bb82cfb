//! Menu, snack and food-exchange catalogs, per-patient meal plans and
//! preferences
//!
//! Pure list/detail plumbing. The catalogs support server-side seeding with
//! curated default data; the client only triggers it.

use chrono::NaiveDate;
use serde::Deserialize;

use super::{ApiClient, Error, StatusMessage};

#[derive(Debug, Clone, Deserialize)]
pub struct Menu {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub proteins: Option<f64>,
    #[serde(default)]
    pub carbohydrates: Option<f64>,
    #[serde(default)]
    pub fats: Option<f64>,
    #[serde(default)]
    pub is_custom: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Snack {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_vegan: bool,
    #[serde(default)]
    pub is_diabetic_friendly: bool,
    #[serde(default)]
    pub is_custom: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoodExchange {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub portion_size: Option<String>,
    /// grams
    #[serde(default)]
    pub portion_weight: Option<f64>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub proteins: Option<f64>,
    #[serde(default)]
    pub carbohydrates: Option<f64>,
    #[serde(default)]
    pub fats: Option<f64>,
    #[serde(default)]
    pub fiber: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MealPlanItem {
    #[serde(default)]
    pub meal_time: Option<String>,
    #[serde(default)]
    pub food_item: Option<String>,
    #[serde(default)]
    pub portion: Option<String>,
    #[serde(default)]
    pub calories: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MealPlan {
    pub id: i64,
    pub patient_id: i64,
    pub date_created: NaiveDate,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub total_calories: Option<f64>,
    #[serde(default)]
    pub total_proteins: Option<f64>,
    #[serde(default)]
    pub total_carbohydrates: Option<f64>,
    #[serde(default)]
    pub total_fats: Option<f64>,
    #[serde(default)]
    pub items: Vec<MealPlanItem>,
}

/// Patient taste and restriction profile, displayed as stored
#[derive(Debug, Clone, Deserialize)]
pub struct Preferences {
    pub patient_id: i64,
    #[serde(default)]
    pub favorite_foods: Option<String>,
    #[serde(default)]
    pub disliked_foods: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub cultural_restrictions: Option<String>,
    #[serde(default)]
    pub budget_level: Option<String>,
    #[serde(default)]
    pub cooking_time_available: Option<String>,
    #[serde(default)]
    pub snacks_per_day: Option<i64>,
    #[serde(default)]
    pub additional_notes: Option<String>,
}

impl ApiClient {
    pub async fn menus(&self, category: Option<&str>) -> Result<Vec<Menu>, Error> {
        match category {
            Some(category) => {
                self.get_with_query("/menus", &[("category", category)])
                    .await
            }
            None => self.get("/menus").await,
        }
    }

    pub async fn menu(&self, id: i64) -> Result<Menu, Error> {
        self.get(&format!("/menus/{id}")).await
    }

    pub async fn delete_menu(&self, id: i64) -> Result<StatusMessage, Error> {
        self.delete(&format!("/menus/{id}")).await
    }

    pub async fn seed_default_menus(&self) -> Result<StatusMessage, Error> {
        self.post_empty("/menus/seed-default-menus").await
    }

    pub async fn snacks(&self) -> Result<Vec<Snack>, Error> {
        self.get("/snacks").await
    }

    pub async fn seed_default_snacks(&self) -> Result<StatusMessage, Error> {
        self.post_empty("/snacks/seed-default-snacks").await
    }

    pub async fn food_exchanges(&self, category: Option<&str>) -> Result<Vec<FoodExchange>, Error> {
        match category {
            Some(category) => {
                self.get_with_query("/food-exchanges", &[("category", category)])
                    .await
            }
            None => self.get("/food-exchanges").await,
        }
    }

    pub async fn seed_default_exchanges(&self) -> Result<StatusMessage, Error> {
        self.post_empty("/food-exchanges/seed-default-exchanges")
            .await
    }

    pub async fn seed_colombian_foods(&self) -> Result<StatusMessage, Error> {
        self.post_empty("/food-exchanges/seed-colombian-foods").await
    }

    pub async fn meal_plans_for(&self, patient_id: i64) -> Result<Vec<MealPlan>, Error> {
        self.get(&format!("/meal-plans/patient/{patient_id}")).await
    }

    pub async fn meal_plan(&self, id: i64) -> Result<MealPlan, Error> {
        self.get(&format!("/meal-plans/{id}")).await
    }

    pub async fn delete_meal_plan(&self, id: i64) -> Result<StatusMessage, Error> {
        self.delete(&format!("/meal-plans/{id}")).await
    }

    pub async fn preferences_for(&self, patient_id: i64) -> Result<Preferences, Error> {
        self.get(&format!("/preferences/patient/{patient_id}")).await
    }

    /// Menu recommendations derived from the patient's preferences. The
    /// shape is backend-defined and display-only, so it stays untyped.
    pub async fn recommendations_for(&self, patient_id: i64) -> Result<serde_json::Value, Error> {
        self.get(&format!("/preferences/patient/{patient_id}/recommendations"))
            .await
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
    async fn menu_category_filter_goes_into_the_query_string() {
        let route = warp::get()
            .and(warp::path!("menus"))
            .and(warp::query::<Vec<(String, String)>>())
            .map(|query: Vec<(String, String)>| {
                let category = query
                    .iter()
                    .find(|(key, _)| key == "category")
                    .map(|(_, value)| value.clone())
                    .unwrap_or_default();
                warp::reply::json(&json!([{
                    "id": 1,
                    "name": "Semana base",
                    "category": category
                }]))
            });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let api = config::Api {
            base_url: format!("http://{addr}"),
            timeout: 5,
        };
        let client = ApiClient::new(&api, Some(AuthToken::new("tok"))).unwrap();

        let menus = client.menus(Some("diabetes")).await.unwrap();
        assert_eq!(menus[0].category, "diabetes");

        let menus = client.menus(None).await.unwrap();
        assert_eq!(menus[0].category, "");
    }
}
