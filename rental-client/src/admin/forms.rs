//! Admin catalogue forms.
//!
//! Each form holds the raw text the administrator typed and turns it into a
//! request body only after validation passes, so a rejected form never
//! reaches the network.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::{
    api::{CategoryPayload, PlanPayload, VehiclePayload},
    error::{RentalError, Result},
    models::{Category, CategoryId, Plan, Vehicle},
};

/// Shown when a vehicle or category field is blank.
pub const FIELDS_INCOMPLETE_MESSAGE: &str = "Por favor, llena todos los campos correctamente.";

/// Shown when a plan field is blank.
pub const PLAN_FIELDS_MESSAGE: &str = "Por favor, completa todos los campos.";

/// Shown when the vehicle year is outside [`MIN_YEAR`]..=[`MAX_YEAR`].
pub const YEAR_RANGE_MESSAGE: &str =
    "Intente de nuevo, campos inválidos: El año debe estar entre 1900 y 2030.";

/// Shown when the plate is shorter than [`MIN_PLATE_LEN`].
pub const PLATE_LENGTH_MESSAGE: &str = "La placa debe tener al menos 6 dígitos.";

/// Shown when the plan price is not a non-negative amount.
pub const PLAN_PRICE_MESSAGE: &str = "El precio mensual debe ser un número mayor o igual a 0.";

/// Shown when the distance limit is not a whole number.
pub const PLAN_DISTANCE_MESSAGE: &str = "El límite de km debe ser un número entero.";

/// Oldest accepted model year.
pub const MIN_YEAR: u16 = 1900;

/// Newest accepted model year.
pub const MAX_YEAR: u16 = 2030;

/// Minimum plate length after trimming.
pub const MIN_PLATE_LEN: usize = 6;

/// Status sent with newly created vehicles.
const NEW_VEHICLE_STATUS: u8 = 1;

/// Category assigned when the form leaves it unset.
const DEFAULT_CATEGORY: CategoryId = CategoryId::new(1);

fn blank(fields: &[&str]) -> bool {
    fields.iter().any(|f| f.trim().is_empty())
}

/// Vehicle create/edit form.
///
/// # Examples
///
/// ```
/// use rental_client::admin::VehicleForm;
///
/// let form = VehicleForm::new("Toyota", "Corolla", "2021", "P123456");
/// let payload = form.create_payload()?;
/// assert_eq!(payload.id_estado, Some(1));
///
/// assert!(VehicleForm::new("Toyota", "Corolla", "1899", "P123456").validate().is_err());
/// # Ok::<(), rental_client::error::RentalError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleForm {
    /// Make.
    pub marca: String,
    /// Model.
    pub modelo: String,
    /// Model year as typed.
    pub anio: String,
    /// License plate.
    pub placa: String,
    /// Category; [`CategoryId`] 1 when unset.
    pub id_categoria: Option<CategoryId>,
}

impl VehicleForm {
    /// Form with the four text fields and no category.
    #[must_use]
    pub fn new(
        marca: impl Into<String>,
        modelo: impl Into<String>,
        anio: impl Into<String>,
        placa: impl Into<String>,
    ) -> Self {
        Self {
            marca: marca.into(),
            modelo: modelo.into(),
            anio: anio.into(),
            placa: placa.into(),
            id_categoria: None,
        }
    }

    /// Form prefilled from an existing vehicle.
    #[must_use]
    pub fn from_vehicle(vehicle: &Vehicle) -> Self {
        Self {
            marca: vehicle.marca.clone(),
            modelo: vehicle.modelo.clone(),
            anio: vehicle.anio.clone(),
            placa: vehicle.placa.clone(),
            id_categoria: vehicle.id_categoria,
        }
    }

    /// Sets the category.
    #[must_use]
    pub const fn with_category(mut self, id: CategoryId) -> Self {
        self.id_categoria = Some(id);
        self
    }

    /// Checks the form.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Validation`] when a field is blank, the year is
    /// not a number between [`MIN_YEAR`] and [`MAX_YEAR`], or the plate is
    /// shorter than [`MIN_PLATE_LEN`].
    pub fn validate(&self) -> Result<()> {
        if blank(&[&self.marca, &self.modelo, &self.anio, &self.placa]) {
            return Err(RentalError::Validation(FIELDS_INCOMPLETE_MESSAGE.to_owned()));
        }
        match self.anio.trim().parse::<u16>() {
            Ok(year) if (MIN_YEAR..=MAX_YEAR).contains(&year) => {}
            _ => return Err(RentalError::Validation(YEAR_RANGE_MESSAGE.to_owned())),
        }
        if self.placa.trim().chars().count() < MIN_PLATE_LEN {
            return Err(RentalError::Validation(PLATE_LENGTH_MESSAGE.to_owned()));
        }
        Ok(())
    }

    fn payload(&self, id_estado: Option<u8>) -> Result<VehiclePayload> {
        self.validate()?;
        Ok(VehiclePayload {
            marca: self.marca.trim().to_owned(),
            modelo: self.modelo.trim().to_owned(),
            anio: self.anio.trim().to_owned(),
            placa: self.placa.trim().to_owned(),
            id_categoria: self.id_categoria.unwrap_or(DEFAULT_CATEGORY),
            id_estado,
        })
    }

    /// Body for `POST /vehiculos`; new vehicles start with status 1.
    ///
    /// # Errors
    ///
    /// Returns the [`validate`](Self::validate) error.
    pub fn create_payload(&self) -> Result<VehiclePayload> {
        self.payload(Some(NEW_VEHICLE_STATUS))
    }

    /// Body for `PUT /vehiculos/{id}`; the status is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns the [`validate`](Self::validate) error.
    pub fn update_payload(&self) -> Result<VehiclePayload> {
        self.payload(None)
    }
}

/// Category create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryForm {
    /// Name.
    pub nombre_categoria: String,
    /// Description.
    pub descripcion: String,
}

impl CategoryForm {
    /// Form with both fields.
    #[must_use]
    pub fn new(nombre_categoria: impl Into<String>, descripcion: impl Into<String>) -> Self {
        Self { nombre_categoria: nombre_categoria.into(), descripcion: descripcion.into() }
    }

    /// Form prefilled from an existing category.
    #[must_use]
    pub fn from_category(category: &Category) -> Self {
        Self::new(category.nombre_categoria.clone(), category.descripcion.clone())
    }

    /// Validated request body.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Validation`] when either field is blank.
    pub fn payload(&self) -> Result<CategoryPayload> {
        if blank(&[&self.nombre_categoria, &self.descripcion]) {
            return Err(RentalError::Validation(FIELDS_INCOMPLETE_MESSAGE.to_owned()));
        }
        Ok(CategoryPayload {
            nombre_categoria: self.nombre_categoria.trim().to_owned(),
            descripcion: self.descripcion.trim().to_owned(),
        })
    }
}

/// Plan create/edit form.
///
/// # Examples
///
/// ```
/// use rental_client::admin::PlanForm;
///
/// let form = PlanForm::new("Básico", "Plan de entrada", "29.99", "1000", "1");
/// let payload = form.payload()?;
/// assert_eq!(payload.precio_mensual.to_string(), "29.99");
/// assert_eq!(payload.limite_km, 1000);
/// # Ok::<(), rental_client::error::RentalError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanForm {
    /// Plan name.
    pub nombre_plan: String,
    /// Description.
    pub descripcion: String,
    /// Monthly price as typed.
    pub precio_mensual: String,
    /// Distance limit as typed.
    pub limite_km: String,
    /// Category id as typed.
    pub id_categoria: String,
}

impl PlanForm {
    /// Form with all five fields.
    #[must_use]
    pub fn new(
        nombre_plan: impl Into<String>,
        descripcion: impl Into<String>,
        precio_mensual: impl Into<String>,
        limite_km: impl Into<String>,
        id_categoria: impl Into<String>,
    ) -> Self {
        Self {
            nombre_plan: nombre_plan.into(),
            descripcion: descripcion.into(),
            precio_mensual: precio_mensual.into(),
            limite_km: limite_km.into(),
            id_categoria: id_categoria.into(),
        }
    }

    /// Form prefilled from an existing plan.
    #[must_use]
    pub fn from_plan(plan: &Plan) -> Self {
        Self {
            nombre_plan: plan.nombre_plan.clone(),
            descripcion: plan.descripcion.clone(),
            precio_mensual: plan.precio_mensual.to_string(),
            limite_km: plan.limite_km.map(|km| km.to_string()).unwrap_or_default(),
            id_categoria: plan.id_categoria.map(|id| id.to_string()).unwrap_or_default(),
        }
    }

    /// Validated request body.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Validation`] when a field is blank, the price is
    /// not a non-negative decimal, or the distance limit or category is not a
    /// whole number.
    pub fn payload(&self) -> Result<PlanPayload> {
        if blank(&[
            &self.nombre_plan,
            &self.descripcion,
            &self.precio_mensual,
            &self.limite_km,
            &self.id_categoria,
        ]) {
            return Err(RentalError::Validation(PLAN_FIELDS_MESSAGE.to_owned()));
        }

        let precio_mensual = Decimal::from_str(self.precio_mensual.trim())
            .ok()
            .filter(|price| !price.is_sign_negative())
            .ok_or_else(|| RentalError::Validation(PLAN_PRICE_MESSAGE.to_owned()))?;
        let limite_km = self
            .limite_km
            .trim()
            .parse::<u32>()
            .map_err(|_| RentalError::Validation(PLAN_DISTANCE_MESSAGE.to_owned()))?;
        let id_categoria = self
            .id_categoria
            .trim()
            .parse::<u64>()
            .map(CategoryId::new)
            .map_err(|_| RentalError::Validation(PLAN_FIELDS_MESSAGE.to_owned()))?;

        Ok(PlanPayload {
            nombre_plan: self.nombre_plan.trim().to_owned(),
            descripcion: self.descripcion.trim().to_owned(),
            precio_mensual,
            limite_km,
            id_categoria,
        })
    }
}
