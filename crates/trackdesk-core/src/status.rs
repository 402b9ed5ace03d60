//! Shipment lifecycle statuses as the backend spells them.
//!
//! The backend stores status as a free-form label. The six labels below form
//! the fixed lifecycle; anything else round-trips through [`TrackStatus::Other`].

use std::fmt;

use serde::{Deserialize, Serialize};

const REGISTERED: &str = "Дата регистрации клиентом";
const LEFT_ORIGIN: &str = "Выехал из склада Китая";
const IN_TRANSIT: &str = "В транзитном складе";
const AT_ALMATY: &str = "В Алматы (Склад)";
const AT_ASTANA: &str = "В Астане (Склад)";
const DELIVERED: &str = "Выдан клиенту";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrackStatus {
    Registered,
    LeftOrigin,
    InTransit,
    AtAlmaty,
    AtAstana,
    Delivered,
    Other(String),
}

impl TrackStatus {
    /// The fixed lifecycle in order.
    pub const LIFECYCLE: [TrackStatus; 6] = [
        TrackStatus::Registered,
        TrackStatus::LeftOrigin,
        TrackStatus::InTransit,
        TrackStatus::AtAlmaty,
        TrackStatus::AtAstana,
        TrackStatus::Delivered,
    ];

    pub fn label(&self) -> &str {
        match self {
            TrackStatus::Registered => REGISTERED,
            TrackStatus::LeftOrigin => LEFT_ORIGIN,
            TrackStatus::InTransit => IN_TRANSIT,
            TrackStatus::AtAlmaty => AT_ALMATY,
            TrackStatus::AtAstana => AT_ASTANA,
            TrackStatus::Delivered => DELIVERED,
            TrackStatus::Other(s) => s,
        }
    }

    /// Whether a parcel in this status sits at a final holding point and can be
    /// handed to its client.
    pub fn is_deliverable(&self) -> bool {
        matches!(self, TrackStatus::AtAlmaty | TrackStatus::AtAstana)
    }

    /// Parse a CLI shorthand (`registered`, `left-origin`, `transit`, `almaty`,
    /// `astana`, `delivered`) or a full backend label.
    pub fn parse_arg(s: &str) -> TrackStatus {
        match s.trim().to_ascii_lowercase().as_str() {
            "registered" => TrackStatus::Registered,
            "left-origin" | "departed" => TrackStatus::LeftOrigin,
            "transit" | "in-transit" => TrackStatus::InTransit,
            "almaty" => TrackStatus::AtAlmaty,
            "astana" => TrackStatus::AtAstana,
            "delivered" => TrackStatus::Delivered,
            _ => TrackStatus::from(s.trim().to_string()),
        }
    }
}

impl From<String> for TrackStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            REGISTERED => TrackStatus::Registered,
            LEFT_ORIGIN => TrackStatus::LeftOrigin,
            IN_TRANSIT => TrackStatus::InTransit,
            AT_ALMATY => TrackStatus::AtAlmaty,
            AT_ASTANA => TrackStatus::AtAstana,
            DELIVERED => TrackStatus::Delivered,
            _ => TrackStatus::Other(s),
        }
    }
}

impl From<TrackStatus> for String {
    fn from(s: TrackStatus) -> Self {
        match s {
            TrackStatus::Other(s) => s,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for TrackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_string() {
        for status in TrackStatus::LIFECYCLE {
            let label: String = status.clone().into();
            assert_eq!(TrackStatus::from(label), status);
        }
    }

    #[test]
    fn unknown_label_is_preserved() {
        let s = TrackStatus::from("Customs hold".to_string());
        assert_eq!(s, TrackStatus::Other("Customs hold".into()));
        assert_eq!(s.label(), "Customs hold");
    }

    #[test]
    fn only_warehouse_statuses_are_deliverable() {
        let deliverable: Vec<TrackStatus> = TrackStatus::LIFECYCLE
            .into_iter()
            .filter(|s| s.is_deliverable())
            .collect();
        assert_eq!(deliverable, vec![TrackStatus::AtAlmaty, TrackStatus::AtAstana]);
    }

    #[test]
    fn serde_uses_backend_label() {
        let json = serde_json::to_string(&TrackStatus::Delivered).unwrap();
        assert_eq!(json, "\"Выдан клиенту\"");
        let parsed: TrackStatus = serde_json::from_str("\"В Астане (Склад)\"").unwrap();
        assert_eq!(parsed, TrackStatus::AtAstana);
    }

    #[test]
    fn parse_arg_accepts_shorthand_and_labels() {
        assert_eq!(TrackStatus::parse_arg("Almaty"), TrackStatus::AtAlmaty);
        assert_eq!(TrackStatus::parse_arg("delivered"), TrackStatus::Delivered);
        assert_eq!(TrackStatus::parse_arg("В транзитном складе"), TrackStatus::InTransit);
    }
}
