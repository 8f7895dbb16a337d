//! Moderation state machine over the `is_confirmed` flag.
//!
//! ```text
//!   pending ──approve──▶ confirmed
//!   confirmed ──back_to_moderation──▶ pending
//!   either ──delete (bulk)──▶ removed
//! ```

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use decorshop_core::{DomainError, DomainResult, ProductId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationState {
    Pending,
    Confirmed,
}

impl ModerationState {
    pub fn from_confirmed(is_confirmed: bool) -> Self {
        if is_confirmed { Self::Confirmed } else { Self::Pending }
    }

    pub fn is_confirmed(self) -> bool {
        self == Self::Confirmed
    }

    /// Single-product transition. Re-applying a transition to a product
    /// already in the target state is a conflict.
    pub fn apply(self, transition: ModerationTransition) -> DomainResult<Self> {
        match transition.target() {
            target if target != self => Ok(target),
            Self::Confirmed => Err(DomainError::conflict("product is already confirmed")),
            Self::Pending => Err(DomainError::conflict("product is already pending moderation")),
        }
    }
}

/// Single-product moderation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationTransition {
    Approve,
    /// Also accepted as `reject`.
    #[serde(alias = "reject")]
    BackToModeration,
}

impl ModerationTransition {
    pub fn target(self) -> ModerationState {
        match self {
            Self::Approve => ModerationState::Confirmed,
            Self::BackToModeration => ModerationState::Pending,
        }
    }
}

impl FromStr for ModerationTransition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "approve" => Ok(Self::Approve),
            "back_to_moderation" | "reject" => Ok(Self::BackToModeration),
            other => Err(DomainError::validation(format!("unknown moderation action '{other}'"))),
        }
    }
}

/// Bulk admin action over a list of product ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Confirm,
    Unconfirm,
    Delete,
}

impl BulkAction {
    /// State the affected rows end up in; `None` for deletion.
    pub fn target(self) -> Option<ModerationState> {
        match self {
            Self::Confirm => Some(ModerationState::Confirmed),
            Self::Unconfirm => Some(ModerationState::Pending),
            Self::Delete => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Unconfirm => "unconfirm",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for BulkAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "confirm" => Ok(Self::Confirm),
            "unconfirm" => Ok(Self::Unconfirm),
            "delete" => Ok(Self::Delete),
            other => Err(DomainError::validation(format!(
                "unknown bulk action '{other}' (expected confirm, unconfirm or delete)"
            ))),
        }
    }
}

/// Keep only positive integer ids from an untrusted JSON list.
///
/// Integral floats (`3.0`) count as integers; strings, fractions, nulls and
/// non-positive numbers are dropped. Duplicates collapse onto their first
/// occurrence.
pub fn sanitize_ids(raw: &[Value]) -> Vec<ProductId> {
    let mut seen = HashSet::new();
    raw.iter()
        .filter_map(integral)
        .filter_map(ProductId::from_raw)
        .filter(|id| seen.insert(*id))
        .collect()
}

fn integral(value: &Value) -> Option<i64> {
    let number = value.as_number()?;
    if let Some(i) = number.as_i64() {
        return Some(i);
    }
    let f = number.as_f64()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}
