//! Bulk import tests: file parsing without a database, provisioning with one

mod helpers;

use std::io::Write;
use std::time::Duration;
use serial_test::serial;
use KarmaHub::import::{normalize_record, read_sheet, AdminAccount, UserImporter};
use KarmaHub::models::AppRole;
use KarmaHub::services::auth::verify_password;

const STUDENTS_CSV: &str = "\
First Name,Middle Name,Last Name,Email ID,Mobile Number,Department,Year of Study,Role
Asha,,Rao,Asha.Rao@College.edu,+91 98450 12345,CSE,3,
Vikram,Kumar,Shetty,vikram@college.edu,90000-54321,ECE,second,ADMIN
Nobody,,,,,,,
Short,,Phone,short@college.edu,12-34,ME,1,
Bad,,Mail,not-an-email,9876501234,ME,1,
";

fn write_csv(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_csv_rows_normalize() {
    let file = write_csv(STUDENTS_CSV);
    let sheet = read_sheet(file.path()).unwrap();
    assert_eq!(sheet.rows.len(), 5);

    let asha = normalize_record(&sheet.rows[0]).validate().unwrap();
    assert_eq!(asha.name, "Asha Rao");
    assert_eq!(asha.email, "asha.rao@college.edu");
    assert_eq!(asha.password, "12345");
    assert_eq!(asha.year, Some(3));

    let vikram = normalize_record(&sheet.rows[1]).validate().unwrap();
    assert_eq!(vikram.name, "Vikram Kumar Shetty");
    assert_eq!(vikram.role, AppRole::Admin);
    assert_eq!(vikram.year, None);
}

#[tokio::test]
#[serial]
async fn test_import_creates_confirmed_accounts() {
    let test_db = require_db!();
    let db = test_db.service();
    let importer = UserImporter::new(&db).with_row_delay(Duration::ZERO);

    let file = write_csv(STUDENTS_CSV);
    let sheet = read_sheet(file.path()).unwrap();
    let results = importer.import_sheet(&sheet).await;

    assert_eq!(results.success.len(), 2);
    assert_eq!(results.skipped.len(), 3);
    assert!(results.failed.is_empty());
    assert_eq!(results.success[0].row, 2);
    let reasons: Vec<(usize, &str)> = results.skipped.iter().map(|s| (s.row, s.reason.as_str())).collect();
    assert_eq!(
        reasons,
        vec![
            (4, "Missing required fields (name, email, or mobile)"),
            (5, "Invalid mobile number"),
            (6, "Invalid email format"),
        ]
    );

    let account = db.accounts.find_by_email("asha.rao@college.edu").await.unwrap().unwrap();
    assert!(account.email_confirmed);
    assert!(verify_password("12345", &account.password_hash));
    let profile = db.profiles.find_by_id(account.id).await.unwrap().unwrap();
    assert_eq!(profile.branch.as_deref(), Some("CSE"));

    // running the same file again skips everyone who already exists
    let rerun = importer.import_sheet(&sheet).await;
    assert!(rerun.success.is_empty());
    assert_eq!(rerun.skipped.iter().filter(|s| s.reason == "Already exists").count(), 2);

    let dir = tempfile::tempdir().unwrap();
    let report = results.write(dir.path(), chrono::Utc::now()).unwrap();
    sqlx::query("UPDATE accounts SET email_confirmed = FALSE").execute(&test_db.pool).await.unwrap();
    let summary = importer.confirm_emails(&report.results_file).await.unwrap();
    assert_eq!(summary.confirmed, 2);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
#[serial]
async fn test_create_admin_resets_existing_password() {
    let test_db = require_db!();
    let db = test_db.service();
    let importer = UserImporter::new(&db);

    let admin = AdminAccount {
        email: "admin@college.edu".to_string(),
        password: "first-pass".to_string(),
        name: "System Admin".to_string(),
        college: Some("BNMIT".to_string()),
    };
    let created = importer.create_admin(admin.clone()).await.unwrap();
    assert_eq!(created.role, AppRole::Admin);

    let again = importer
        .create_admin(AdminAccount { password: "second-pass".to_string(), ..admin })
        .await
        .unwrap();
    assert_eq!(again.id, created.id);

    let account = db.accounts.find_by_email("admin@college.edu").await.unwrap().unwrap();
    assert!(verify_password("second-pass", &account.password_hash));
    assert!(!verify_password("first-pass", &account.password_hash));
}
