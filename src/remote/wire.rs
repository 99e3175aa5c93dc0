//! Shapes exchanged with the spreadsheet backend.

use crate::core::normalize::{FieldText, normalize_field};
use crate::errors::{AppError, AppResult};
use crate::models::reservation::Reservation;
use crate::models::snapshot::{DepartmentRule, Snapshot};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Error code the backend uses when the identity key is already taken.
pub const DUPLICATE: &str = "DUPLICATE";

/// One sheet row. Cells may be strings, numbers or empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireRecord {
    #[serde(rename = "data", alias = "date", default)]
    pub date: Value,
    #[serde(rename = "nome", alias = "name", alias = "occupant", default)]
    pub occupant: Value,
    #[serde(rename = "setor", alias = "department", default)]
    pub department: Value,
    #[serde(rename = "local", alias = "location", default)]
    pub location: Value,
    #[serde(rename = "baia", alias = "bay", default)]
    pub bay: Value,
    #[serde(rename = "assento", alias = "seat", default)]
    pub seat: Value,
    #[serde(
        rename = "timestamp",
        alias = "createdAt",
        alias = "created_at",
        default,
        skip_serializing_if = "Value::is_null"
    )]
    pub created_at: Value,
}

impl WireRecord {
    pub fn to_reservation(&self) -> Reservation {
        let created_at = normalize_field(&self.created_at);
        let reservation = Reservation::new(
            &self.date.field_text(),
            &self.location.field_text(),
            &self.bay.field_text(),
            &self.seat.field_text(),
            &self.occupant.field_text(),
            &self.department.field_text(),
        );
        if created_at.is_empty() {
            reservation
        } else {
            reservation.with_created_at(created_at)
        }
    }
}

impl From<&Reservation> for WireRecord {
    fn from(r: &Reservation) -> Self {
        Self {
            date: Value::from(r.date.clone()),
            occupant: Value::from(r.occupant.clone()),
            department: Value::from(r.department.clone()),
            location: Value::from(r.location.clone()),
            bay: Value::from(r.bay.clone()),
            seat: Value::from(r.seat.clone()),
            created_at: r.created_at.clone().map(Value::from).unwrap_or(Value::Null),
        }
    }
}

/// Read answer: either a bare list or an envelope with department rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadPayload {
    Envelope {
        reservations: Vec<WireRecord>,
        #[serde(default)]
        config: Vec<Value>,
    },
    Bare(Vec<WireRecord>),
}

impl ReadPayload {
    pub fn records(&self) -> &[WireRecord] {
        match self {
            ReadPayload::Envelope { reservations, .. } => reservations,
            ReadPayload::Bare(records) => records,
        }
    }

    /// Turn the payload into a snapshot tagged with the fetch sequence `seq`.
    pub fn into_snapshot(self, seq: u64) -> Snapshot {
        let rules = match &self {
            ReadPayload::Envelope { config, .. } => parse_rules(config),
            ReadPayload::Bare(_) => Vec::new(),
        };

        let mut skipped = 0usize;
        let reservations: Vec<Reservation> = self
            .records()
            .iter()
            .map(WireRecord::to_reservation)
            .filter(|r| {
                let keep = !r.key().is_incomplete();
                if !keep {
                    skipped += 1;
                }
                keep
            })
            .collect();

        if skipped > 0 {
            debug!(seq, skipped, "ignored rows with an empty identity field");
        }

        Snapshot::new(seq, reservations, rules)
    }
}

/// Department rules come as objects carrying a location and either a list
/// (`setores` / `departments`) or a single department (`setor` / `department`).
/// Anything else is ignored.
fn parse_rules(config: &[Value]) -> Vec<DepartmentRule> {
    let mut rules: Vec<DepartmentRule> = Vec::new();

    for item in config {
        let Value::Object(obj) = item else {
            continue;
        };

        let location = obj
            .get("local")
            .or_else(|| obj.get("location"))
            .map(normalize_field)
            .unwrap_or_default();
        if location.is_empty() {
            continue;
        }

        let mut departments: Vec<String> = Vec::new();
        if let Some(Value::Array(list)) = obj.get("setores").or_else(|| obj.get("departments")) {
            departments.extend(list.iter().map(normalize_field));
        }
        if let Some(single) = obj.get("setor").or_else(|| obj.get("department")) {
            departments.push(normalize_field(single));
        }
        departments.retain(|d| !d.is_empty());

        match rules.iter_mut().find(|r| r.location == location) {
            Some(rule) => {
                for d in departments {
                    if !rule.departments.contains(&d) {
                        rule.departments.push(d);
                    }
                }
            }
            None => rules.push(DepartmentRule {
                location,
                departments,
            }),
        }
    }

    rules
}

/// Form fields of a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingForm {
    pub data: String,
    pub nome: String,
    pub setor: String,
    pub local: String,
    pub baia: String,
    pub assento: String,
}

impl From<&Reservation> for BookingForm {
    fn from(r: &Reservation) -> Self {
        Self {
            data: r.date.clone(),
            nome: r.occupant.clone(),
            setor: r.department.clone(),
            local: r.location.clone(),
            baia: r.bay.clone(),
            assento: r.seat.clone(),
        }
    }
}

impl BookingForm {
    pub fn to_reservation(&self) -> Reservation {
        Reservation::new(
            &self.data,
            &self.local,
            &self.baia,
            &self.assento,
            &self.nome,
            &self.setor,
        )
    }
}

/// Write answer: `{ success: true }` or `{ success: false, error, message }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WriteResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(DUPLICATE.to_string()),
            message: Some(message.into()),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        !self.success && self.error.as_deref() == Some(DUPLICATE)
    }

    /// Human readable reason of a failed write.
    pub fn reason(&self) -> String {
        match (&self.error, &self.message) {
            (_, Some(m)) if !m.trim().is_empty() => m.clone(),
            (Some(e), _) => e.clone(),
            _ => "unknown backend error".to_string(),
        }
    }
}

/// Decode the body of a read.
pub fn decode_read(body: &str) -> AppResult<ReadPayload> {
    serde_json::from_str(body).map_err(|e| AppError::Parse(format!("reservation list: {e}")))
}

/// Decode the body of a write.
pub fn decode_write(body: &str) -> AppResult<WriteResponse> {
    serde_json::from_str(body).map_err(|e| AppError::Parse(format!("write reply: {e}")))
}
