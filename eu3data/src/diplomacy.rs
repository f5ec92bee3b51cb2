//! Diplomatic agreements from the save's `diplomacy` block.
//!
//! Each child is `relation_type = { first = TAG second = TAG start_date = ... }`:
//! vassals, alliances, royal marriages, unions, guarantees and so on.

use eu3data_derive::TolerantDeserialize;
use eu3txt::{EU3TxtParseNode, from_node};
use serde::Serialize;

#[derive(Debug, Default, TolerantDeserialize)]
struct AgreementData {
    first: Option<String>,
    second: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agreement {
    /// Relation type (vassal, alliance, union, royal_marriage, guarantee, ...)
    pub kind: String,
    /// First country (overlord for subjects, either party for bilateral)
    pub first: String,
    /// Second country (subject for subjects, other party for bilateral)
    pub second: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diplomacy {
    agreements: Vec<Agreement>,
}

impl Diplomacy {
    pub fn from_node(node: &EU3TxtParseNode) -> Self {
        let mut agreements = Vec::new();
        for (key, body) in node.assignments() {
            let Some(kind) = key.key_string() else {
                continue;
            };
            if !body.is_list() {
                continue;
            }
            let data: AgreementData = match from_node(body) {
                Ok(data) => data,
                Err(e) => {
                    log::warn!("Skipping malformed {} agreement: {}", kind, e);
                    continue;
                }
            };
            match (data.first, data.second) {
                (Some(first), Some(second)) => agreements.push(Agreement {
                    kind,
                    first,
                    second,
                    start_date: data.start_date,
                    end_date: data.end_date,
                }),
                _ => log::debug!("Skipping {} agreement without both parties", kind),
            }
        }
        Self { agreements }
    }

    pub fn agreements(&self) -> &[Agreement] {
        &self.agreements
    }

    /// Agreements in which `tag` is either party.
    pub fn agreements_of<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Agreement> + 'a {
        self.agreements
            .iter()
            .filter(move |a| a.first == tag || a.second == tag)
    }

    pub fn is_empty(&self) -> bool {
        self.agreements.is_empty()
    }
}
