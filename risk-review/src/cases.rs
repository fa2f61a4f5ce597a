//! Investigation cases.
//!
//! A case groups related flagged signals (purchasers, devices, IPs, orders)
//! under one record with a note trail. Cases move
//! open -> investigating -> resolved -> closed; closed is terminal and
//! nothing is ever deleted.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use risk_core::{Case, CaseEntity, CaseNote, CaseStatus, Severity};

use crate::error::ReviewError;

#[derive(Default)]
pub struct CaseBook {
    state: Mutex<CaseBookState>,
}

#[derive(Default)]
struct CaseBookState {
    cases: HashMap<String, Case>,
    next_id: u64,
}

impl CaseBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_case(
        &self,
        title: impl Into<String>,
        priority: Severity,
        entities: Vec<CaseEntity>,
        orders: Vec<String>,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> Case {
        let mut state = self.lock();
        state.next_id += 1;
        let case = Case {
            case_id: format!("case-{:05}", state.next_id),
            title: title.into(),
            status: CaseStatus::Open,
            priority,
            entities,
            orders,
            notes: Vec::new(),
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.cases.insert(case.case_id.clone(), case.clone());
        case
    }

    pub fn get(&self, case_id: &str) -> Option<Case> {
        self.lock().cases.get(case_id).cloned()
    }

    /// Every case, newest first.
    pub fn all(&self) -> Vec<Case> {
        let mut cases: Vec<Case> = self.lock().cases.values().cloned().collect();
        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        cases
    }

    pub fn add_note(
        &self,
        case_id: &str,
        by: &str,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ReviewError> {
        let mut state = self.lock();
        let case = state
            .cases
            .get_mut(case_id)
            .ok_or_else(|| ReviewError::CaseNotFound(case_id.to_string()))?;
        case.notes.push(CaseNote {
            at: now,
            by: by.to_string(),
            text: text.into(),
        });
        case.updated_at = now;
        Ok(())
    }

    /// Moves a case along its lifecycle. A closed case never changes again.
    pub fn set_status(
        &self,
        case_id: &str,
        status: CaseStatus,
        now: DateTime<Utc>,
    ) -> Result<(), ReviewError> {
        let mut state = self.lock();
        let case = state
            .cases
            .get_mut(case_id)
            .ok_or_else(|| ReviewError::CaseNotFound(case_id.to_string()))?;
        if case.status == CaseStatus::Closed {
            return Err(ReviewError::CaseClosed(case_id.to_string()));
        }
        case.status = status;
        case.updated_at = now;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CaseBookState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("case book lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
