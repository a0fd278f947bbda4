//! Ticket priority, set by a manager on approval.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Priority assigned when a manager approves a ticket. Absent until then.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
}

impl TicketPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketPriority {
    type Err = ticketdesk_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ticketdesk_core::AppError::validation(format!(
                "Invalid ticket priority: '{s}'. Expected one of: low, medium, high"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("low".parse::<TicketPriority>().unwrap(), TicketPriority::Low);
        assert_eq!("HIGH".parse::<TicketPriority>().unwrap(), TicketPriority::High);
        assert!("urgent".parse::<TicketPriority>().is_err());
    }
}
