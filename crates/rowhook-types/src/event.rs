//! Row change event kinds a trigger can subscribe to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A row-level change event emitted by the table service.
///
/// Serialized using the table service's dotted names (`rows.created`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "rows.created")]
    RowsCreated,
    #[serde(rename = "rows.updated")]
    RowsUpdated,
    #[serde(rename = "rows.deleted")]
    RowsDeleted,
}

impl EventKind {
    /// All event kinds, in display order.
    pub const ALL: [EventKind; 3] = [
        EventKind::RowsCreated,
        EventKind::RowsDeleted,
        EventKind::RowsUpdated,
    ];

    /// Wire name used by the table service.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::RowsCreated => "rows.created",
            EventKind::RowsUpdated => "rows.updated",
            EventKind::RowsDeleted => "rows.deleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rows.created" => Ok(EventKind::RowsCreated),
            "rows.updated" => Ok(EventKind::RowsUpdated),
            "rows.deleted" => Ok(EventKind::RowsDeleted),
            other => Err(format!("unknown event kind: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_wire_names() {
        assert_eq!(EventKind::RowsCreated.to_string(), "rows.created");
        assert_eq!(EventKind::RowsUpdated.to_string(), "rows.updated");
        assert_eq!(EventKind::RowsDeleted.to_string(), "rows.deleted");
    }

    #[test]
    fn test_event_kind_serde_matches_wire_name() {
        for kind in EventKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            let parsed: EventKind = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_event_kind_from_str_rejects_unknown() {
        assert_eq!("rows.deleted".parse::<EventKind>(), Ok(EventKind::RowsDeleted));
        let err = "field.created".parse::<EventKind>().unwrap_err();
        assert!(err.contains("field.created"));
    }
}
