//! Per-seller shipping configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validation::{ValidationError, clock_time, non_negative, optional, required};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPartner {
    pub name: String,
    #[serde(default = "enabled")]
    pub is_active: bool,
    #[serde(default)]
    pub priority: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingZone {
    pub zone_name: String,
    #[serde(default)]
    pub states: Vec<String>,
    pub rate: Decimal,
    pub delivery_days: u32,
}

/// Defaults used when a product has no dimensions. Weight in kg, sizes in cm.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageDimensions {
    pub default_weight: Option<Decimal>,
    pub default_length: Option<Decimal>,
    pub default_width: Option<Decimal>,
    pub default_height: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

impl Address {
    fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReturnAddress {
    #[serde(flatten)]
    pub address: Address,
    pub same_as_pickup: bool,
}

impl Default for ReturnAddress {
    fn default() -> Self {
        Self {
            address: Address::default(),
            same_as_pickup: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupSlot {
    pub day: String,
    /// `HH:MM-HH:MM`.
    pub time_slot: String,
    #[serde(default = "enabled")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodSettings {
    pub enabled: bool,
    pub min_order_value: Decimal,
    pub max_order_value: Decimal,
    pub extra_charge: Decimal,
}

impl Default for CodSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            min_order_value: Decimal::ZERO,
            max_order_value: Decimal::from(10_000),
            extra_charge: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackingSettings {
    pub enabled: bool,
    pub provider: String,
    pub auto_notify: bool,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "Shiprocket".to_string(),
            auto_notify: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkShipping {
    pub auto_generate_labels: bool,
}

/// How one seller ships: rates, zones, partners, addresses and COD limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingSettings {
    pub default_shipping_rate: Decimal,
    pub free_shipping_threshold: Decimal,
    /// Days between order and dispatch.
    pub processing_time: u32,
    pub delivery_partners: Vec<DeliveryPartner>,
    pub shipping_zones: Vec<ShippingZone>,
    pub package_dimensions: PackageDimensions,
    pub pickup_address: Address,
    pub return_address: ReturnAddress,
    pub pickup_schedule: Vec<PickupSlot>,
    pub cod_settings: CodSettings,
    pub tracking_settings: TrackingSettings,
    pub bulk_shipping: BulkShipping,
}

impl Default for ShippingSettings {
    fn default() -> Self {
        Self {
            default_shipping_rate: Decimal::ZERO,
            free_shipping_threshold: Decimal::from(500),
            processing_time: 2,
            delivery_partners: Vec::new(),
            shipping_zones: Vec::new(),
            package_dimensions: PackageDimensions::default(),
            pickup_address: Address::default(),
            return_address: ReturnAddress::default(),
            pickup_schedule: Vec::new(),
            cod_settings: CodSettings::default(),
            tracking_settings: TrackingSettings::default(),
            bulk_shipping: BulkShipping::default(),
        }
    }
}

const fn enabled() -> bool {
    true
}

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Longest dispatch delay a seller may promise.
pub const MAX_PROCESSING_DAYS: u32 = 30;

impl ShippingSettings {
    /// Normalize money to paise and check limits.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for negative or sub-paisa amounts, a COD
    /// minimum above its maximum, duplicate zone names, an unknown pickup
    /// day or a malformed time slot.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.default_shipping_rate =
            non_negative("defaultShippingRate", self.default_shipping_rate)?;
        self.free_shipping_threshold =
            non_negative("freeShippingThreshold", self.free_shipping_threshold)?;
        if self.processing_time > MAX_PROCESSING_DAYS {
            return Err(ValidationError(format!(
                "processingTime cannot exceed {MAX_PROCESSING_DAYS} days"
            )));
        }

        let cod = &mut self.cod_settings;
        cod.min_order_value = non_negative("codSettings.minOrderValue", cod.min_order_value)?;
        cod.max_order_value = non_negative("codSettings.maxOrderValue", cod.max_order_value)?;
        cod.extra_charge = non_negative("codSettings.extraCharge", cod.extra_charge)?;
        if cod.min_order_value > cod.max_order_value {
            return Err(ValidationError::new(
                "codSettings.minOrderValue cannot exceed maxOrderValue",
            ));
        }

        for partner in &mut self.delivery_partners {
            partner.name = required("deliveryPartners.name", Some(&partner.name))?;
        }

        let mut zone_names: Vec<String> = Vec::new();
        for zone in &mut self.shipping_zones {
            zone.zone_name = required("shippingZones.zoneName", Some(&zone.zone_name))?;
            zone.rate = non_negative("shippingZones.rate", zone.rate)?;
            let key = zone.zone_name.to_lowercase();
            if zone_names.contains(&key) {
                return Err(ValidationError(format!(
                    "shipping zone {} is listed twice",
                    zone.zone_name
                )));
            }
            zone_names.push(key);
        }

        for slot in &mut self.pickup_schedule {
            slot.day = slot.day.trim().to_lowercase();
            if !WEEKDAYS.contains(&slot.day.as_str()) {
                return Err(ValidationError(format!("{} is not a weekday", slot.day)));
            }
            let Some((from, to)) = slot.time_slot.trim().split_once('-') else {
                return Err(ValidationError::new("pickupSchedule.timeSlot must be HH:MM-HH:MM"));
            };
            clock_time("pickupSchedule.timeSlot", from.trim())?;
            clock_time("pickupSchedule.timeSlot", to.trim())?;
        }

        if let Some(pincode) = optional(self.pickup_address.pincode.as_deref()) {
            if pincode.len() != 6 || !pincode.chars().all(|c| c.is_ascii_digit()) {
                return Err(ValidationError::new("pickupAddress.pincode must be 6 digits"));
            }
            self.pickup_address.pincode = Some(pincode);
        }
        if self.return_address.same_as_pickup {
            self.return_address.address = Address::default();
        } else if self.return_address.address.is_empty() {
            return Err(ValidationError::new(
                "returnAddress is required when it differs from the pickup address",
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn settings(value: serde_json::Value) -> ShippingSettings {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults() {
        let defaults = ShippingSettings::default();
        assert_eq!(defaults.free_shipping_threshold, Decimal::from(500));
        assert_eq!(defaults.processing_time, 2);
        assert_eq!(defaults.cod_settings.max_order_value, Decimal::from(10_000));
        assert_eq!(defaults.tracking_settings.provider, "Shiprocket");
        assert!(defaults.return_address.same_as_pickup);
    }

    #[test]
    fn test_cod_bounds_and_precision() {
        let inverted = settings(serde_json::json!({
            "codSettings": { "minOrderValue": 5000, "maxOrderValue": 1000 }
        }));
        assert!(inverted.validate().is_err());

        let tiny = settings(serde_json::json!({ "codSettings": { "extraCharge": "0.004" } }));
        assert_eq!(
            tiny.validate().unwrap_err(),
            ValidationError::new("codSettings.extraCharge cannot have more than 2 decimal places")
        );
    }

    #[test]
    fn test_zones_and_pickup_schedule() {
        let dup = settings(serde_json::json!({
            "shippingZones": [
                { "zoneName": "North", "rate": 60, "deliveryDays": 4 },
                { "zoneName": "north", "rate": 70, "deliveryDays": 5 }
            ]
        }));
        assert!(dup.validate().is_err());

        let schedule = settings(serde_json::json!({
            "pickupSchedule": [{ "day": " Monday ", "timeSlot": "10:00-13:00" }]
        }))
        .validate()
        .unwrap();
        assert_eq!(schedule.pickup_schedule[0].day, "monday");
        assert!(schedule.pickup_schedule[0].is_active);

        let bad_slot = settings(serde_json::json!({
            "pickupSchedule": [{ "day": "friday", "timeSlot": "morning" }]
        }));
        assert!(bad_slot.validate().is_err());
    }

    #[test]
    fn test_return_address_rules() {
        let missing = settings(serde_json::json!({ "returnAddress": { "sameAsPickup": false } }));
        assert!(missing.validate().is_err());

        let own = settings(serde_json::json!({
            "pickupAddress": { "pincode": "560001" },
            "returnAddress": { "sameAsPickup": false, "city": "Pune", "pincode": "411001" }
        }))
        .validate()
        .unwrap();
        assert_eq!(own.return_address.address.city.as_deref(), Some("Pune"));

        let bad_pin = settings(serde_json::json!({ "pickupAddress": { "pincode": "5600" } }));
        assert!(bad_pin.validate().is_err());
    }
}
