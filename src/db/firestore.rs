// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed [`AttendanceStore`].
//!
//! Collections:
//! - `users` (document ID = user ID)
//! - `universities` (document ID = university ID)
//! - `sessions` (document ID = session ID)
//! - `attendance` (document ID = [`AttendanceRecord::pair_key`])
//!
//! Attendance uses the pair key as document ID so a second record for the same
//! (session, student) cannot be written beside the first.

use crate::db::{collections, AttendanceStore, StoreError};
use crate::models::{AttendanceRecord, Role, Session, University, User};
use chrono::{DateTime, Utc};
use firestore::errors::FirestoreError;
use firestore::{FirestoreConsistencySelector, FirestoreWritePrecondition};

/// Attempts at the attendance transaction before giving up on contention.
const COMMIT_ATTEMPTS: usize = 5;

enum CommitOutcome {
    Committed(Session),
    Contended,
}

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// A read inside the attendance transaction failed; contention retries.
fn read_failure(e: FirestoreError) -> Result<CommitOutcome, StoreError> {
    match e {
        FirestoreError::DatabaseError(e) if e.retry_possible => Ok(CommitOutcome::Contended),
        e => Err(backend(e)),
    }
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Backend(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client. Every operation returns an error.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client
            .as_ref()
            .ok_or_else(|| StoreError::Backend("Database not connected (offline mode)".to_string()))
    }

    async fn sessions_with_code(&self, code: &str) -> Result<Vec<Session>, StoreError> {
        let code = code.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SESSIONS)
            .filter(move |q| q.for_all([q.field("code").eq(code.clone())]))
            .obj()
            .query()
            .await
            .map_err(backend)
    }

    /// One attempt at the attendance transaction.
    ///
    /// Both reads go through a client bound to the transaction, so a
    /// concurrent commit touching the same pair document or session aborts
    /// one of the two instead of losing an increment. The pair document is
    /// written with an `Exists(false)` precondition, so storage itself rejects
    /// a second record for the pair.
    async fn try_commit_attendance(
        &self,
        record: &AttendanceRecord,
    ) -> Result<CommitOutcome, StoreError> {
        let client = self.get_client()?;
        let doc_id = record.key();

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to begin transaction: {}", e)))?;
        let tx_client = client.clone_with_consistency_selector(
            FirestoreConsistencySelector::Transaction(transaction.transaction_id().clone()),
        );

        // 1. Duplicate check on the pair document
        let existing: Option<AttendanceRecord> = match tx_client
            .fluent()
            .select()
            .by_id_in(collections::ATTENDANCE)
            .obj()
            .one(&doc_id)
            .await
        {
            Ok(doc) => doc,
            Err(e) => {
                let _ = transaction.rollback().await;
                return read_failure(e);
            }
        };
        if existing.is_some() {
            let _ = transaction.rollback().await;
            return Err(StoreError::Duplicate);
        }

        // 2. Read the session, confirm it is still open, bump the counter
        let session: Option<Session> = match tx_client
            .fluent()
            .select()
            .by_id_in(collections::SESSIONS)
            .obj()
            .one(&record.session_id)
            .await
        {
            Ok(doc) => doc,
            Err(e) => {
                let _ = transaction.rollback().await;
                return read_failure(e);
            }
        };
        let Some(mut session) = session else {
            let _ = transaction.rollback().await;
            return Err(StoreError::NotFound(format!("session {}", record.session_id)));
        };
        if !session.is_open(record.timestamp) {
            let _ = transaction.rollback().await;
            return Err(StoreError::SessionClosed(session.id));
        }
        session.record_attendance();

        // 3. Queue both writes
        client
            .fluent()
            .update()
            .in_col(collections::ATTENDANCE)
            .precondition(FirestoreWritePrecondition::Exists(false))
            .document_id(&doc_id)
            .object(record)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                StoreError::Backend(format!("Failed to add attendance to transaction: {}", e))
            })?;

        client
            .fluent()
            .update()
            .in_col(collections::SESSIONS)
            .document_id(&session.id)
            .object(&session)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                StoreError::Backend(format!("Failed to add session to transaction: {}", e))
            })?;

        // 4. Commit
        match transaction.commit().await {
            Ok(_) => {}
            // The pair document appeared after our read
            Err(FirestoreError::DataConflictError(_)) => return Err(StoreError::Duplicate),
            Err(FirestoreError::DatabaseError(e)) if e.retry_possible => {
                return Ok(CommitOutcome::Contended)
            }
            Err(e) => {
                return Err(StoreError::Backend(format!(
                    "Transaction commit failed: {}",
                    e
                )))
            }
        }

        tracing::debug!(
            session_id = %record.session_id,
            student_id = %record.student_id,
            attendance_count = session.attendance_count,
            "Attendance committed"
        );

        Ok(CommitOutcome::Committed(session))
    }
}

impl AttendanceStore for FirestoreDb {
    // ─── Session Operations ──────────────────────────────────────

    /// Query-then-write: the code check is not atomic across instances.
    async fn insert_session(&self, session: &Session, now: DateTime<Utc>) -> Result<(), StoreError> {
        let held = self
            .sessions_with_code(&session.code)
            .await?
            .iter()
            .any(|s| s.is_open(now));
        if held {
            return Err(StoreError::CodeInUse(session.code.clone()));
        }

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SESSIONS)
            .document_id(&session.id)
            .object(session)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SESSIONS)
            .obj()
            .one(id)
            .await
            .map_err(backend)
    }

    async fn list_sessions(&self, university_id: Option<&str>) -> Result<Vec<Session>, StoreError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::SESSIONS);

        let mut sessions: Vec<Session> = if let Some(university_id) = university_id {
            let university_id = university_id.to_string();
            query
                .filter(move |q| q.for_all([q.field("university_id").eq(university_id.clone())]))
                .obj()
                .query()
                .await
                .map_err(backend)?
        } else {
            query.obj().query().await.map_err(backend)?
        };

        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(sessions)
    }

    async fn find_open_session_by_code(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, StoreError> {
        Ok(self
            .sessions_with_code(code)
            .await?
            .into_iter()
            .filter(|s| s.is_open(now))
            .max_by_key(|s| s.start_time))
    }

    async fn close_session(&self, id: &str) -> Result<Option<Session>, StoreError> {
        let Some(mut session) = self.get_session(id).await? else {
            return Ok(None);
        };
        if !session.is_active {
            return Ok(Some(session));
        }

        session.close();
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SESSIONS)
            .document_id(id)
            .object(&session)
            .execute()
            .await
            .map_err(backend)?;
        Ok(Some(session))
    }

    // ─── Attendance Operations ───────────────────────────────────

    /// Write the record and the incremented session count in one transaction,
    /// retrying when Firestore aborts it over contention.
    async fn commit_attendance(&self, record: &AttendanceRecord) -> Result<Session, StoreError> {
        for attempt in 1..=COMMIT_ATTEMPTS {
            match self.try_commit_attendance(record).await? {
                CommitOutcome::Committed(session) => return Ok(session),
                CommitOutcome::Contended => {
                    tracing::debug!(
                        session_id = %record.session_id,
                        student_id = %record.student_id,
                        attempt,
                        "Attendance transaction aborted, retrying"
                    );
                }
            }
        }

        Err(StoreError::Backend(format!(
            "Attendance transaction still contended after {} attempts",
            COMMIT_ATTEMPTS
        )))
    }

    async fn has_attendance(&self, session_id: &str, student_id: &str) -> Result<bool, StoreError> {
        let record: Option<AttendanceRecord> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ATTENDANCE)
            .obj()
            .one(&AttendanceRecord::pair_key(session_id, student_id))
            .await
            .map_err(backend)?;
        Ok(record.is_some())
    }

    async fn attendance_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let student_id = student_id.to_string();
        let mut records: Vec<AttendanceRecord> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ATTENDANCE)
            .filter(move |q| q.for_all([q.field("student_id").eq(student_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(backend)?;
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    async fn attendance_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let session_id = session_id.to_string();
        let mut records: Vec<AttendanceRecord> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ATTENDANCE)
            .filter(move |q| q.for_all([q.field("session_id").eq(session_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(backend)?;
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(records)
    }

    // ─── User Operations ─────────────────────────────────────────

    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(id)
            .await
            .map_err(backend)
    }

    async fn find_user_by_username(
        &self,
        username: &str,
        role: Role,
    ) -> Result<Option<User>, StoreError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("role").eq(role.as_str())]))
            .obj()
            .query()
            .await
            .map_err(backend)?;

        // Firestore equality is case-sensitive
        Ok(users
            .into_iter()
            .find(|u| u.username.eq_ignore_ascii_case(username)))
    }

    async fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }

    // ─── University Operations ───────────────────────────────────

    async fn list_universities(&self) -> Result<Vec<University>, StoreError> {
        let mut universities: Vec<University> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::UNIVERSITIES)
            .obj()
            .query()
            .await
            .map_err(backend)?;
        universities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(universities)
    }

    async fn get_university(&self, id: &str) -> Result<Option<University>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::UNIVERSITIES)
            .obj()
            .one(id)
            .await
            .map_err(backend)
    }

    async fn upsert_university(&self, university: &University) -> Result<(), StoreError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::UNIVERSITIES)
            .document_id(&university.id)
            .object(university)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn delete_university(&self, id: &str) -> Result<bool, StoreError> {
        if self.get_university(id).await?.is_none() {
            return Ok(false);
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::UNIVERSITIES)
            .document_id(id)
            .execute()
            .await
            .map_err(backend)?;
        Ok(true)
    }
}
