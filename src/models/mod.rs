//! Rostering domain models.
//!
//! Provides the core data types for describing a rostering problem and its
//! solutions.
//!
//! # Domain Mappings
//!
//! | u-roster | Security company | Hospital | Field service |
//! |----------|------------------|----------|---------------|
//! | Agent | Guard / Operator | Nurse | Technician |
//! | Meeting | Site visit / Watch | Ward shift | Call-out |
//! | Roster | Staff list | Ward team | Crew |
//! | Schedule | Duty plan | Shift plan | Dispatch plan |

mod agent;
mod meeting;
mod schedule;

pub use agent::{Agent, AgentId, AgentLedger, Roster};
pub use meeting::{Meeting, WILDCARD_SKILL};
pub use schedule::Schedule;
