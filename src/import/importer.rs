//! Account provisioning for the admin tooling

use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;
use crate::database::{AccountRepository, DatabaseService, NewAccount, ProfileRepository};
use crate::models::{AppRole, Profile, UpsertProfileRequest};
use crate::services::auth::{hash_password_async, MIN_PASSWORD_LENGTH};
use crate::utils::errors::{KarmaHubError, Result};
use crate::utils::helpers::{is_valid_email, normalize_email};
use super::record::{normalize_record, ValidRecord};
use super::reader::Sheet;
use super::report::{ImportFailure, ImportResults, ImportSkip, ImportSuccess};

pub const IMPORT_ROW_DELAY: Duration = Duration::from_millis(100);
pub const CONFIRM_DELAY: Duration = Duration::from_millis(50);

/// Details for `create-admin`
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
    pub name: String,
    pub college: Option<String>,
}

/// Summary of a `confirm-emails` run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfirmSummary {
    pub confirmed: usize,
    pub failed: usize,
}

enum RowOutcome {
    Created(ImportSuccess),
    Skipped(String),
}

#[derive(Clone)]
pub struct UserImporter {
    accounts: AccountRepository,
    profiles: ProfileRepository,
    row_delay: Duration,
}

impl UserImporter {
    pub fn new(database: &DatabaseService) -> Self {
        Self {
            accounts: database.accounts.clone(),
            profiles: database.profiles.clone(),
            row_delay: IMPORT_ROW_DELAY,
        }
    }

    pub fn with_row_delay(mut self, delay: Duration) -> Self {
        self.row_delay = delay;
        self
    }

    /// Create accounts and profiles for every valid row of a sheet
    pub async fn import_sheet(&self, sheet: &Sheet) -> ImportResults {
        let mut results = ImportResults::default();
        let total = sheet.rows.len();

        for (index, raw) in sheet.rows.iter().enumerate() {
            let row = index + 2;
            let record = normalize_record(raw);
            info!(row, progress = %format!("{}/{}", index + 1, total), email = record.email.as_deref().unwrap_or("NO EMAIL"), "Processing import row");

            let valid = match record.validate() {
                Ok(valid) => valid,
                Err(reason) => {
                    warn!(row, reason = %reason, "Skipping import row");
                    results.skipped.push(ImportSkip { row, email: record.email.clone(), reason });
                    continue;
                }
            };

            match self.import_record(row, &valid).await {
                Ok(RowOutcome::Created(success)) => results.success.push(success),
                Ok(RowOutcome::Skipped(reason)) => {
                    warn!(row, email = %valid.email, reason = %reason, "Skipping import row");
                    results.skipped.push(ImportSkip { row, email: Some(valid.email.clone()), reason });
                }
                Err(e) => {
                    warn!(row, email = %valid.email, error = %e, recoverable = e.is_recoverable(), "Import row failed");
                    results.failed.push(ImportFailure {
                        row,
                        email: Some(valid.email.clone()),
                        error: e.to_string(),
                    });
                }
            }

            tokio::time::sleep(self.row_delay).await;
        }

        info!(
            created = results.success.len(),
            skipped = results.skipped.len(),
            failed = results.failed.len(),
            "Import finished"
        );
        results
    }

    async fn import_record(&self, row: usize, record: &ValidRecord) -> Result<RowOutcome> {
        if self.accounts.find_by_email(&record.email).await?.is_some() {
            return Ok(RowOutcome::Skipped("Already exists".to_string()));
        }

        let password_hash = hash_password_async(record.password.clone()).await?;
        let created = self
            .accounts
            .create_with_profile(NewAccount {
                email: record.email.clone(),
                password_hash,
                email_confirmed: true,
                name: record.name.clone(),
                role: record.role,
            })
            .await;

        let (account, _) = match created {
            Ok(pair) => pair,
            Err(KarmaHubError::Conflict(_)) => return Ok(RowOutcome::Skipped("Already exists".to_string())),
            Err(e) => return Err(e),
        };

        let upsert = self
            .profiles
            .upsert(UpsertProfileRequest {
                id: account.id,
                name: record.name.clone(),
                email: record.email.clone(),
                role: record.role,
                college: record.college.clone(),
                branch: record.branch.clone(),
                year: record.year,
                bio: record.bio.clone(),
                linkedin_url: record.linkedin_url.clone(),
            })
            .await;

        let warning = match upsert {
            Ok(_) => None,
            Err(e) => {
                warn!(row, user_id = %account.id, error = %e, "Profile details were not saved");
                Some("Profile creation failed".to_string())
            }
        };

        Ok(RowOutcome::Created(ImportSuccess {
            row,
            email: record.email.clone(),
            user_id: account.id,
            password: record.password.clone(),
            warning,
        }))
    }

    /// Create an admin account, or reset the password of an existing one
    pub async fn create_admin(&self, admin: AdminAccount) -> Result<Profile> {
        let email = normalize_email(&admin.email);
        if !is_valid_email(&email) {
            return Err(KarmaHubError::InvalidInput("Please enter a valid email address".to_string()));
        }
        if admin.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(KarmaHubError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        let password_hash = hash_password_async(admin.password.clone()).await?;

        let id = match self.accounts.find_by_email(&email).await? {
            Some(account) => {
                info!(user_id = %account.id, "Admin account exists, resetting password");
                self.accounts.reset_password(account.id, &password_hash).await?;
                account.id
            }
            None => {
                let (account, _) = self
                    .accounts
                    .create_with_profile(NewAccount {
                        email: email.clone(),
                        password_hash,
                        email_confirmed: true,
                        name: admin.name.clone(),
                        role: AppRole::Admin,
                    })
                    .await?;
                account.id
            }
        };

        let profile = self
            .profiles
            .upsert(UpsertProfileRequest {
                id,
                name: admin.name,
                email,
                role: AppRole::Admin,
                college: admin.college,
                branch: None,
                year: None,
                bio: Some("Campus Administrator".to_string()),
                linkedin_url: None,
            })
            .await?;

        info!(user_id = %profile.id, "Admin account ready");
        Ok(profile)
    }

    /// Confirm every account listed as created in a results file
    pub async fn confirm_emails(&self, results_file: &Path) -> Result<ConfirmSummary> {
        let results = ImportResults::load(results_file)?;
        let mut summary = ConfirmSummary::default();

        for user in &results.success {
            match self.confirm_one(user.user_id).await {
                Ok(()) => summary.confirmed += 1,
                Err(e) => {
                    warn!(user_id = %user.user_id, email = %user.email, error = %e, "Failed to confirm email");
                    summary.failed += 1;
                }
            }
            tokio::time::sleep(CONFIRM_DELAY).await;
        }

        info!(confirmed = summary.confirmed, failed = summary.failed, "Email confirmation finished");
        Ok(summary)
    }

    async fn confirm_one(&self, id: Uuid) -> Result<()> {
        if self.accounts.confirm_email(id).await? {
            Ok(())
        } else {
            Err(KarmaHubError::NotFound { kind: "Account", id })
        }
    }
}
