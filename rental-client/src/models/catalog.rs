//! Plans, categories and vehicles.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CategoryId, PlanId, VehicleId, dates};

/// A purchasable pricing tier.
///
/// # Examples
///
/// ```
/// use rental_client::models::Plan;
///
/// let plan: Plan = serde_json::from_str(
///     r#"{"id_plan":1,"nombre_plan":"Básico","descripcion":"Ciudad",
///         "precio_mensual":"29.99","limite_km":null,"id_categoria":2}"#,
/// )?;
/// assert_eq!(plan.distance_label(), "Ilimitado");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan identifier.
    pub id_plan: PlanId,
    /// Display name.
    pub nombre_plan: String,
    /// Description shown on the plan card.
    #[serde(default)]
    pub descripcion: String,
    /// Monthly fee. Sent and received as decimal text.
    pub precio_mensual: Decimal,
    /// Distance allowance in kilometres; `None` means unlimited.
    #[serde(default)]
    pub limite_km: Option<u32>,
    /// Vehicle category this plan covers.
    #[serde(default)]
    pub id_categoria: Option<CategoryId>,
    /// Embedded category, when the endpoint expands it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<PlanCategory>,
}

impl Plan {
    /// Human-readable distance allowance.
    #[must_use]
    pub fn distance_label(&self) -> String {
        match self.limite_km {
            Some(km) if km > 0 => format!("{km} km"),
            _ => "Ilimitado".to_owned(),
        }
    }

    /// Name of the covered category, when known.
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.categoria.as_ref().map(|c| c.nombre_categoria.as_str())
    }
}

/// Category summary embedded in plan and vehicle payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanCategory {
    /// Category identifier, when present in the embedding.
    #[serde(default)]
    pub id_categoria: Option<CategoryId>,
    /// Category name.
    pub nombre_categoria: String,
    /// Category description.
    #[serde(default)]
    pub descripcion: Option<String>,
}

/// A vehicle category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category identifier.
    pub id_categoria: CategoryId,
    /// Category name.
    pub nombre_categoria: String,
    /// Category description.
    #[serde(default)]
    pub descripcion: String,
}

/// A rentable vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Vehicle identifier.
    pub id_vehiculo: VehicleId,
    /// Make.
    pub marca: String,
    /// Model.
    pub modelo: String,
    /// Model year, as the API stores it.
    pub anio: String,
    /// Licence plate.
    pub placa: String,
    /// Registration date.
    #[serde(default, with = "dates::option_date")]
    pub fecha_registro: Option<NaiveDate>,
    /// Photo URL.
    #[serde(default)]
    pub foto: Option<String>,
    /// Category reference.
    #[serde(default)]
    pub id_categoria: Option<CategoryId>,
    /// Embedded category, when the endpoint expands it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<PlanCategory>,
}

impl Vehicle {
    /// `"Toyota Corolla (2020)"` style label.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {} ({})", self.marca, self.modelo, self.anio)
    }
}
