use crate::error::ApiError;

/// Direction of an engagement vote on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Upvote,
    Downvote,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Upvote => "upvote",
            VoteDirection::Downvote => "downvote",
        }
    }

    /// Counter column this direction increments.
    pub fn column(&self) -> &'static str {
        match self {
            VoteDirection::Upvote => "upvotes",
            VoteDirection::Downvote => "downvotes",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "upvote" => Ok(VoteDirection::Upvote),
            "downvote" => Ok(VoteDirection::Downvote),
            _ => Err(ApiError::NotFound),
        }
    }
}

/// Counter deltas and the new stored direction for a tracked vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub upvote_delta: i32,
    pub downvote_delta: i32,
    pub new_direction: Option<VoteDirection>,
}

/// Tracked-mode vote transition: a repeated vote retracts, an opposite vote
/// flips both counters, a first vote increments and records its direction.
pub fn apply_vote(previous: Option<VoteDirection>, requested: VoteDirection) -> VoteOutcome {
    match previous {
        None => VoteOutcome {
            upvote_delta: (requested == VoteDirection::Upvote) as i32,
            downvote_delta: (requested == VoteDirection::Downvote) as i32,
            new_direction: Some(requested),
        },
        Some(prev) if prev == requested => VoteOutcome {
            upvote_delta: -((requested == VoteDirection::Upvote) as i32),
            downvote_delta: -((requested == VoteDirection::Downvote) as i32),
            new_direction: None,
        },
        Some(_) => VoteOutcome {
            upvote_delta: if requested == VoteDirection::Upvote { 1 } else { -1 },
            downvote_delta: if requested == VoteDirection::Downvote { 1 } else { -1 },
            new_direction: Some(requested),
        },
    }
}
