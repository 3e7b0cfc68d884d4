use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hris_core::EmployeeId;

/// Tag of a trigger event.
///
/// Serialized as the human-facing label (`"High Attrition Risk"`); unknown
/// labels survive a round trip through [`TriggerKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TriggerKind {
    HighAttritionRisk,
    PayrollAnomaly,
    HighAbsence,
    Other(String),
}

impl TriggerKind {
    pub fn as_str(&self) -> &str {
        match self {
            TriggerKind::HighAttritionRisk => "High Attrition Risk",
            TriggerKind::PayrollAnomaly => "Payroll Anomaly",
            TriggerKind::HighAbsence => "High Absence",
            TriggerKind::Other(label) => label,
        }
    }
}

impl core::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TriggerKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "High Attrition Risk" => TriggerKind::HighAttritionRisk,
            "Payroll Anomaly" => TriggerKind::PayrollAnomaly,
            "High Absence" => TriggerKind::HighAbsence,
            _ => TriggerKind::Other(value),
        }
    }
}

impl From<TriggerKind> for String {
    fn from(value: TriggerKind) -> Self {
        match value {
            TriggerKind::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// A trigger decided by the rules engine but not yet persisted.
///
/// Timestamp and sequence are assigned by the store at insertion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrigger {
    pub event_type: TriggerKind,
    pub message: String,
    /// Weak reference: the employee may since have been removed.
    pub employee_id: Option<EmployeeId>,
}

impl NewTrigger {
    pub fn new(event_type: TriggerKind, message: impl Into<String>) -> Self {
        Self {
            event_type,
            message: message.into(),
            employee_id: None,
        }
    }

    pub fn for_employee(mut self, employee_id: EmployeeId) -> Self {
        self.employee_id = Some(employee_id);
        self
    }
}

/// A persisted trigger. Immutable once committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub id: Uuid,
    /// Insertion order within the store (1-based, gap-free).
    pub sequence: u64,
    pub event_type: TriggerKind,
    pub message: String,
    pub employee_id: Option<EmployeeId>,
    /// Wall-clock insertion time, serialized as ISO-8601.
    pub timestamp: DateTime<Utc>,
}

impl TriggerEvent {
    pub fn commit(draft: NewTrigger, sequence: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            sequence,
            event_type: draft.event_type,
            message: draft.message,
            employee_id: draft.employee_id,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn kinds_serialize_as_labels() {
        let json = serde_json::to_string(&TriggerKind::HighAbsence).unwrap();
        assert_eq!(json, "\"High Absence\"");

        let back: TriggerKind = serde_json::from_str("\"Payroll Anomaly\"").unwrap();
        assert_eq!(back, TriggerKind::PayrollAnomaly);

        let custom: TriggerKind = serde_json::from_str("\"Contract Expiry\"").unwrap();
        assert_eq!(custom, TriggerKind::Other("Contract Expiry".to_string()));
        assert_eq!(custom.as_str(), "Contract Expiry");
    }

    #[test]
    fn committed_event_keeps_draft_fields_and_iso_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 9, 30, 12, 0, 0).unwrap();
        let draft = NewTrigger::new(TriggerKind::HighAbsence, "Employee 1 (E101) has 7 absences.")
            .for_employee(EmployeeId::from("E101"));

        let event = TriggerEvent::commit(draft, 3, at);
        assert_eq!(event.sequence, 3);
        assert_eq!(event.employee_id.as_ref().map(|e| e.as_str()), Some("E101"));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["timestamp"], "2025-09-30T12:00:00Z");
        assert_eq!(json["event_type"], "High Absence");
    }
}
