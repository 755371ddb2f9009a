//! Execution ordering for merge tokens.
//!
//! Tokens are ordered by a fixed rank per kind and direction so that
//! dependent changes land after the changes they depend on: relationships
//! are dropped before the columns and tables they use, tables exist before
//! columns are added to them, and FK constraints come last.

use std::cmp::Ordering;

use crate::token::{MergeDirection, MergerToken, TokenOp};

/// Rank of a token. Lower ranks execute first.
pub fn token_rank(token: &MergerToken) -> u32 {
    match token.op() {
        TokenOp::DropRelationship { .. } => 10,
        TokenOp::DropColumn { .. } => 20,
        TokenOp::DropTable { .. } => 30,
        TokenOp::CreateTable { .. } => 40,
        TokenOp::AddColumn { .. } => match token.direction() {
            MergeDirection::ToDb => 50,
            MergeDirection::ToModel => 51,
        },
        TokenOp::SetColumnType { .. } => 60,
        TokenOp::SetAllowNull { .. } => 61,
        TokenOp::SetValueForNull { .. } => 62,
        TokenOp::SetNotNull { .. } => 63,
        TokenOp::SetPrimaryKey { .. } => 64,
        TokenOp::AddRelationship { .. } => 70,
        TokenOp::Reverse { .. } => 0,
    }
}

/// Compare two tokens by rank.
pub fn compare_tokens(a: &MergerToken, b: &MergerToken) -> Ordering {
    token_rank(a).cmp(&token_rank(b))
}

/// Sort tokens in place into execution order. Equal ranks keep their relative order.
pub fn sort_tokens(tokens: &mut [MergerToken]) {
    tokens.sort_by(compare_tokens);
}

/// Sorted copy of `tokens`.
pub fn sorted(tokens: &[MergerToken]) -> Vec<MergerToken> {
    let mut tokens = tokens.to_vec();
    sort_tokens(&mut tokens);
    tokens
}
